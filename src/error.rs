use actix_web::error::BlockingError;
use actix_web::http::header::ContentType;
use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use thiserror::Error;
use tracing::error;

use crate::classifier::ModelError;
use crate::pages;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid bind address {0:?}: expected host:port")]
    BindAddr(String),

    #[error("worker count cannot be 0")]
    Workers,

    #[error("max body size cannot be 0")]
    MaxBodyBytes,
}

/// Errors surfaced by the HTTP handlers.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Please enter a speech to classify (missing field `{0}`).")]
    MissingField(&'static str),

    #[error("The submitted form could not be read: {0}")]
    MalformedForm(String),

    #[error(transparent)]
    Inference(#[from] ModelError),

    #[error("prediction worker failed: {0}")]
    Worker(String),
}

impl From<BlockingError> for AppError {
    fn from(e: BlockingError) -> Self {
        AppError::Worker(e.to_string())
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::MissingField(_) | AppError::MalformedForm(_) => StatusCode::BAD_REQUEST,
            AppError::Inference(_) | AppError::Worker(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let body = match self {
            AppError::MissingField(_) | AppError::MalformedForm(_) => {
                pages::predict_form(Some(&self.to_string()))
            }
            AppError::Inference(_) | AppError::Worker(_) => {
                error!("Prediction failed: {self}");
                pages::error_page("Something went wrong while classifying the speech.")
            }
        };

        HttpResponse::build(self.status_code())
            .content_type(ContentType::html())
            .body(body)
    }
}
