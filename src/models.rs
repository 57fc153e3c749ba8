use serde::Deserialize;

use crate::error::AppError;

/// Raw `application/x-www-form-urlencoded` body of `POST /predict`.
#[derive(Debug, Deserialize)]
pub struct PredictForm {
    pub speech_body: Option<String>,
}

/// A validated request to classify one speech.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassificationRequest {
    speech_body: String,
}

impl ClassificationRequest {
    pub fn speech_body(&self) -> &str {
        &self.speech_body
    }
}

impl TryFrom<PredictForm> for ClassificationRequest {
    type Error = AppError;

    fn try_from(form: PredictForm) -> Result<Self, Self::Error> {
        match form.speech_body {
            Some(speech_body) if !speech_body.trim().is_empty() => Ok(Self { speech_body }),
            _ => Err(AppError::MissingField("speech_body")),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClassProbability {
    pub label: String,
    /// Percentage rounded to one decimal place.
    pub percent: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClassificationResult {
    pub predicted_label: String,
    /// Ordered like the classifier's label set.
    pub class_probabilities: Vec<ClassProbability>,
}
