use std::sync::Arc;

use tracing::info;

use crate::classifier::{Classifier, ModelError};
use crate::models::{ClassProbability, ClassificationRequest, ClassificationResult};

/// Wraps the loaded classifier for the request handlers.
///
/// Built once at startup and shared read-only between workers.
pub struct PredictionService {
    classifier: Arc<dyn Classifier>,
}

impl PredictionService {
    pub fn new(classifier: Arc<dyn Classifier>) -> Self {
        Self { classifier }
    }

    pub fn labels(&self) -> &[String] {
        self.classifier.labels()
    }

    pub fn classify(
        &self,
        request: &ClassificationRequest,
    ) -> Result<ClassificationResult, ModelError> {
        let batch = [request.speech_body()];

        let predicted_label = self
            .classifier
            .predict(&batch)?
            .into_iter()
            .next()
            .ok_or_else(|| ModelError::Inference("classifier returned no label".into()))?;

        let probabilities = self
            .classifier
            .predict_proba(&batch)?
            .into_iter()
            .next()
            .ok_or_else(|| ModelError::Inference("classifier returned no probabilities".into()))?;

        let labels = self.classifier.labels();
        if probabilities.len() != labels.len() {
            return Err(ModelError::Inference(format!(
                "expected {} probabilities, got {}",
                labels.len(),
                probabilities.len()
            )));
        }

        let class_probabilities = labels
            .iter()
            .zip(probabilities)
            .map(|(label, p)| ClassProbability {
                label: label.clone(),
                percent: to_percent(p),
            })
            .collect();

        info!(label = %predicted_label, "Speech classified");

        Ok(ClassificationResult {
            predicted_label,
            class_probabilities,
        })
    }
}

/// Scales a probability to a percentage with one decimal place.
fn to_percent(probability: f64) -> f64 {
    (probability * 1000.0).round() / 10.0
}
