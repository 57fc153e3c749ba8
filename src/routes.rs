use actix_web::web;

use crate::handlers;

/// Largest accepted `POST /predict` body unless configured otherwise.
pub const DEFAULT_MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

/// Registers every route of the front-end.
///
/// Callers provide the `web::Data<PredictionService>` as app data.
pub fn configure(max_body_bytes: usize) -> impl FnOnce(&mut web::ServiceConfig) {
    move |cfg: &mut web::ServiceConfig| {
        cfg.app_data(handlers::form_config(max_body_bytes))
            .service(web::resource("/").route(web::get().to(handlers::index)))
            .service(web::resource("/index").route(web::get().to(handlers::index)))
            .service(web::resource("/about").route(web::get().to(handlers::about)))
            .service(web::resource("/submit").route(web::get().to(handlers::about)))
            .service(
                web::resource("/predict")
                    .route(web::get().to(handlers::predict_form))
                    .route(web::post().to(handlers::predict)),
            )
            .service(web::resource("/health").route(web::get().to(handlers::health)));
    }
}
