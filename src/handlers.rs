use actix_web::http::header::ContentType;
use actix_web::{web, HttpResponse, Result};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::error::AppError;
use crate::models::{ClassificationRequest, PredictForm};
use crate::pages;
use crate::service::PredictionService;

fn html(body: String) -> HttpResponse {
    HttpResponse::Ok()
        .content_type(ContentType::html())
        .body(body)
}

pub async fn index() -> HttpResponse {
    html(pages::index_page())
}

pub async fn about() -> HttpResponse {
    html(pages::about_page())
}

pub async fn predict_form() -> HttpResponse {
    html(pages::predict_form(None))
}

pub async fn health() -> &'static str {
    "Healthy"
}

#[instrument(skip_all, fields(request_id = %Uuid::new_v4()))]
pub async fn predict(
    service: web::Data<PredictionService>,
    form: web::Form<PredictForm>,
) -> Result<HttpResponse, AppError> {
    let request = ClassificationRequest::try_from(form.into_inner())?;
    info!(chars = request.speech_body().len(), "Classifying speech");

    // Inference is CPU bound; keep it off the async workers.
    let service = service.into_inner();
    let result = web::block(move || service.classify(&request)).await??;

    Ok(html(pages::predict_result(&result)))
}

/// Raises the url-encoded body limit to `max_body_bytes` and maps extractor
/// failures on the prediction form to a rendered 400 page.
pub fn form_config(max_body_bytes: usize) -> web::FormConfig {
    web::FormConfig::default()
        .limit(max_body_bytes)
        .error_handler(|err, _req| AppError::MalformedForm(err.to_string()).into())
}
