//! Pre-trained text classifier.
//!
//! The web layer only sees the [`Classifier`] trait. [`LinearTextModel`] is the
//! bundled implementation: a bag-of-words vectorizer followed by a linear
//! estimator, deserialized from a JSON artifact exported by the training
//! pipeline.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use ndarray::{Array1, Array2};
use regex::Regex;
use serde::Deserialize;
use thiserror::Error;

/// Tokens of two or more word characters.
const TOKEN_PATTERN: &str = r"(?u)\b\w\w+\b";

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("failed to read model artifact {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to decode model artifact: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("invalid model artifact: {0}")]
    Invalid(String),

    #[error("inference failed: {0}")]
    Inference(String),
}

/// A pre-trained classifier over free text.
///
/// Both operations take a batch and return one entry per input, in order.
/// Probability vectors are ordered like [`Classifier::labels`].
pub trait Classifier: Send + Sync {
    fn labels(&self) -> &[String];

    fn predict(&self, batch: &[&str]) -> Result<Vec<String>, ModelError>;

    fn predict_proba(&self, batch: &[&str]) -> Result<Vec<Vec<f64>>, ModelError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Norm {
    L1,
    L2,
}

#[derive(Debug, Deserialize)]
struct Artifact {
    labels: Vec<String>,
    vectorizer: VectorizerSpec,
    estimator: EstimatorSpec,
}

#[derive(Debug, Deserialize)]
struct VectorizerSpec {
    vocabulary: HashMap<String, usize>,
    #[serde(default = "default_lowercase")]
    lowercase: bool,
    #[serde(default = "default_ngram_range")]
    ngram_range: (usize, usize),
    #[serde(default)]
    idf: Option<Vec<f64>>,
    #[serde(default)]
    norm: Option<Norm>,
}

fn default_lowercase() -> bool {
    true
}

fn default_ngram_range() -> (usize, usize) {
    (1, 1)
}

#[derive(Debug, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum EstimatorSpec {
    Logistic {
        coef: Vec<Vec<f64>>,
        intercept: Vec<f64>,
    },
    MultinomialNb {
        class_log_prior: Vec<f64>,
        feature_log_prob: Vec<Vec<f64>>,
    },
}

/// Turns raw text into a fixed-width feature vector.
struct Vectorizer {
    vocabulary: HashMap<String, usize>,
    lowercase: bool,
    ngram_range: (usize, usize),
    idf: Option<Array1<f64>>,
    norm: Option<Norm>,
    token_pattern: Regex,
    width: usize,
}

impl Vectorizer {
    fn tokenize(&self, text: &str) -> Vec<String> {
        let text = if self.lowercase {
            text.to_lowercase()
        } else {
            text.to_owned()
        };
        let words: Vec<&str> = self
            .token_pattern
            .find_iter(&text)
            .map(|m| m.as_str())
            .collect();

        let (min_n, max_n) = self.ngram_range;
        let mut grams = Vec::new();
        for n in min_n..=max_n {
            grams.extend(words.windows(n).map(|w| w.join(" ")));
        }
        grams
    }

    fn transform(&self, text: &str) -> Array1<f64> {
        let mut features = Array1::<f64>::zeros(self.width);
        for gram in self.tokenize(text) {
            if let Some(&index) = self.vocabulary.get(&gram) {
                features[index] += 1.0;
            }
        }

        if let Some(idf) = &self.idf {
            features *= idf;
        }

        let magnitude = match self.norm {
            Some(Norm::L1) => features.iter().map(|v| v.abs()).sum::<f64>(),
            Some(Norm::L2) => features.dot(&features).sqrt(),
            None => 0.0,
        };
        if magnitude > 0.0 {
            features /= magnitude;
        }
        features
    }
}

enum Estimator {
    Logistic {
        coef: Array2<f64>,
        intercept: Array1<f64>,
    },
    MultinomialNb {
        class_log_prior: Array1<f64>,
        feature_log_prob: Array2<f64>,
    },
}

impl Estimator {
    fn probabilities(&self, features: &Array1<f64>) -> Array1<f64> {
        match self {
            Estimator::Logistic { coef, intercept } => {
                let decision = coef.dot(features) + intercept;
                if decision.len() == 1 {
                    let positive = sigmoid(decision[0]);
                    Array1::from(vec![1.0 - positive, positive])
                } else {
                    softmax(&decision)
                }
            }
            Estimator::MultinomialNb {
                class_log_prior,
                feature_log_prob,
            } => softmax(&(feature_log_prob.dot(features) + class_log_prior)),
        }
    }
}

fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

fn softmax(scores: &Array1<f64>) -> Array1<f64> {
    let max = scores.fold(f64::NEG_INFINITY, |acc, &v| acc.max(v));
    let exp = scores.mapv(|v| (v - max).exp());
    let total = exp.sum();
    exp / total
}

/// First index holding the maximum value.
fn argmax(values: &[f64]) -> Option<usize> {
    values
        .iter()
        .enumerate()
        .fold(None, |best: Option<(usize, f64)>, (i, &v)| match best {
            Some((_, top)) if v <= top => best,
            _ => Some((i, v)),
        })
        .map(|(i, _)| i)
}

fn matrix(rows: Vec<Vec<f64>>, width: usize, name: &str) -> Result<Array2<f64>, ModelError> {
    let height = rows.len();
    if let Some(row) = rows.iter().find(|r| r.len() != width) {
        return Err(ModelError::Invalid(format!(
            "{name} rows must have {width} columns, found {}",
            row.len()
        )));
    }
    let flat: Vec<f64> = rows.into_iter().flatten().collect();
    Array2::from_shape_vec((height, width), flat)
        .map_err(|e| ModelError::Invalid(format!("{name}: {e}")))
}

/// Bag-of-words vectorizer plus linear estimator, loaded from a JSON artifact.
pub struct LinearTextModel {
    labels: Vec<String>,
    vectorizer: Vectorizer,
    estimator: Estimator,
}

impl std::fmt::Debug for LinearTextModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LinearTextModel")
            .field("labels", &self.labels)
            .field("features", &self.vectorizer.width)
            .finish()
    }
}

impl LinearTextModel {
    /// Reads and validates the artifact at `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ModelError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|source| ModelError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&raw)
    }

    pub fn from_json(raw: &str) -> Result<Self, ModelError> {
        let artifact: Artifact = serde_json::from_str(raw)?;
        Self::from_artifact(artifact)
    }

    pub fn feature_count(&self) -> usize {
        self.vectorizer.width
    }

    fn distribution(&self, text: &str) -> Result<Vec<f64>, ModelError> {
        let features = self.vectorizer.transform(text);
        let probabilities = self.estimator.probabilities(&features);
        if probabilities.iter().any(|p| !p.is_finite()) {
            return Err(ModelError::Inference(
                "classifier produced a non-finite probability".into(),
            ));
        }
        Ok(probabilities.to_vec())
    }
}

impl LinearTextModel {
    fn from_artifact(artifact: Artifact) -> Result<Self, ModelError> {
        let Artifact {
            labels,
            vectorizer,
            estimator,
        } = artifact;

        if labels.len() < 2 {
            return Err(ModelError::Invalid(format!(
                "expected at least two labels, found {}",
                labels.len()
            )));
        }

        let (min_n, max_n) = vectorizer.ngram_range;
        if min_n == 0 || min_n > max_n {
            return Err(ModelError::Invalid(format!(
                "ngram_range ({min_n}, {max_n}) is not a valid range"
            )));
        }

        let estimator = match estimator {
            EstimatorSpec::Logistic { coef, intercept } => {
                let width = coef.first().map_or(0, Vec::len);
                let coef = matrix(coef, width, "coef")?;
                let rows = coef.nrows();
                let expected_rows = rows == labels.len() || (rows == 1 && labels.len() == 2);
                if !expected_rows {
                    return Err(ModelError::Invalid(format!(
                        "coef has {rows} rows for {} labels",
                        labels.len()
                    )));
                }
                if intercept.len() != rows {
                    return Err(ModelError::Invalid(format!(
                        "intercept has {} entries, expected {rows}",
                        intercept.len()
                    )));
                }
                Estimator::Logistic {
                    coef,
                    intercept: Array1::from(intercept),
                }
            }
            EstimatorSpec::MultinomialNb {
                class_log_prior,
                feature_log_prob,
            } => {
                let width = feature_log_prob.first().map_or(0, Vec::len);
                let feature_log_prob = matrix(feature_log_prob, width, "feature_log_prob")?;
                if feature_log_prob.nrows() != labels.len() {
                    return Err(ModelError::Invalid(format!(
                        "feature_log_prob has {} rows for {} labels",
                        feature_log_prob.nrows(),
                        labels.len()
                    )));
                }
                if class_log_prior.len() != labels.len() {
                    return Err(ModelError::Invalid(format!(
                        "class_log_prior has {} entries for {} labels",
                        class_log_prior.len(),
                        labels.len()
                    )));
                }
                Estimator::MultinomialNb {
                    class_log_prior: Array1::from(class_log_prior),
                    feature_log_prob,
                }
            }
        };

        let width = match &estimator {
            Estimator::Logistic { coef, .. } => coef.ncols(),
            Estimator::MultinomialNb {
                feature_log_prob, ..
            } => feature_log_prob.ncols(),
        };

        if let Some((term, index)) = vectorizer.vocabulary.iter().find(|(_, &i)| i >= width) {
            return Err(ModelError::Invalid(format!(
                "vocabulary term {term:?} maps to column {index}, beyond {width} features"
            )));
        }

        if let Some(idf) = &vectorizer.idf {
            if idf.len() != width {
                return Err(ModelError::Invalid(format!(
                    "idf has {} entries, expected {width}",
                    idf.len()
                )));
            }
        }

        let token_pattern =
            Regex::new(TOKEN_PATTERN).map_err(|e| ModelError::Invalid(e.to_string()))?;

        Ok(Self {
            labels,
            vectorizer: Vectorizer {
                vocabulary: vectorizer.vocabulary,
                lowercase: vectorizer.lowercase,
                ngram_range: vectorizer.ngram_range,
                idf: vectorizer.idf.map(Array1::from),
                norm: vectorizer.norm,
                token_pattern,
                width,
            },
            estimator,
        })
    }
}

impl Classifier for LinearTextModel {
    fn labels(&self) -> &[String] {
        &self.labels
    }

    fn predict(&self, batch: &[&str]) -> Result<Vec<String>, ModelError> {
        batch
            .iter()
            .map(|text| {
                let probabilities = self.distribution(text)?;
                argmax(&probabilities)
                    .map(|i| self.labels[i].clone())
                    .ok_or_else(|| ModelError::Inference("empty probability vector".into()))
            })
            .collect()
    }

    fn predict_proba(&self, batch: &[&str]) -> Result<Vec<Vec<f64>>, ModelError> {
        batch.iter().map(|text| self.distribution(text)).collect()
    }
}
