//! Domain model for predictions, evaluation counts, and training jobs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::errors::{Error, Result};
use super::probs::ClassProbs;

/// One SHAP attribution: a feature name and its signed contribution to the
/// model output. Serialized as a two-element `[name, value]` array.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(from = "(String, f64)", into = "(String, f64)")]
pub struct Attribution {
    pub feature: String,
    pub value: f64,
}

impl Attribution {
    pub fn new(feature: impl Into<String>, value: f64) -> Self {
        Self {
            feature: feature.into(),
            value,
        }
    }

    /// Contribution strength regardless of direction.
    pub fn magnitude(&self) -> f64 {
        self.value.abs()
    }
}

impl From<(String, f64)> for Attribution {
    fn from((feature, value): (String, f64)) -> Self {
        Self { feature, value }
    }
}

impl From<Attribution> for (String, f64) {
    fn from(attr: Attribution) -> Self {
        (attr.feature, attr.value)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TabularExplanation {
    #[serde(default)]
    pub shap: Vec<Attribution>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Explanation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tabular: Option<TabularExplanation>,
}

/// One inference result for a single target.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    /// Target identifier (KOI/TIC designation), display-only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub object_id: Option<String>,
    pub probs: ClassProbs,
    /// Model's self-reported certainty in [0, 1]. Independent of the class
    /// probabilities.
    pub conf: f64,
    /// Opaque model version tag.
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explain: Option<Explanation>,
    /// Per-timestep curve importance, display-only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub importance: Option<Vec<f64>>,
}

impl Prediction {
    /// SHAP attributions if the payload carried an explanation, otherwise
    /// an empty slice.
    pub fn attributions(&self) -> &[Attribution] {
        self.explain
            .as_ref()
            .and_then(|e| e.tabular.as_ref())
            .map(|t| t.shap.as_slice())
            .unwrap_or(&[])
    }
}

/// Response shape of the inference endpoint.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PredictionResponse {
    pub predictions: Vec<Prediction>,
}

impl PredictionResponse {
    /// Decode a scoring response. Probability-shape tolerance lives on
    /// [`ClassProbs`]; anything else malformed is a decode error.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| Error::Decode(e.to_string()))
    }
}

/// A scored sample with ground truth, the unit of confusion-matrix
/// computation.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct LabeledSample {
    pub probability: f64,
    pub is_positive: bool,
}

impl LabeledSample {
    pub fn new(probability: f64, is_positive: bool) -> Self {
        Self {
            probability,
            is_positive,
        }
    }
}

impl From<(f64, bool)> for LabeledSample {
    fn from((probability, is_positive): (f64, bool)) -> Self {
        Self {
            probability,
            is_positive,
        }
    }
}

/// Confusion counts at a fixed threshold. Field names are spelled out;
/// the wire uses the usual short keys.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfusionMatrix {
    #[serde(rename = "tp")]
    pub true_positives: usize,
    #[serde(rename = "fp")]
    pub false_positives: usize,
    #[serde(rename = "tn")]
    pub true_negatives: usize,
    #[serde(rename = "fn")]
    pub false_negatives: usize,
}

impl ConfusionMatrix {
    /// Number of samples the counts were computed over.
    pub fn total(&self) -> usize {
        self.true_positives + self.false_positives + self.true_negatives + self.false_negatives
    }
}

/// Statistics derived from a confusion matrix. Every field is 0 when its
/// denominator is 0, so values are always finite.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DerivedMetrics {
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub mcc: f64,
}

/// Vetting disposition for a single target.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Disposition {
    Confirmed,
    Candidate,
    FalsePositive,
}

impl Disposition {
    pub fn display_name(&self) -> &'static str {
        match self {
            Disposition::Confirmed => "Confirmed Planet",
            Disposition::Candidate => "Candidate Planet",
            Disposition::FalsePositive => "Needs Verification",
        }
    }
}

impl std::fmt::Display for Disposition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Lifecycle state reported by the training-job endpoint.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Pending,
    Running,
    Completed,
    Failed,
}

impl JobStatus {
    /// Completed and failed jobs never change again; polling stops on them.
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }
}

/// Snapshot of a training job as reported by the backend.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TrainingJob {
    pub job_id: String,
    pub status: JobStatus,
    /// Percent complete, 0 to 100.
    pub progress: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metrics: Option<TrainingMetrics>,
}

/// Held-out metrics reported alongside a finished training job. All fields
/// optional; older backends omit some.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TrainingMetrics {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accuracy: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub precision: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recall: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub f1_score: Option<f64>,
}

/// Server-side evaluation payload for a trained model, display-only.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ModelMetrics {
    pub pr_auc: f64,
    pub mcc: f64,
    pub ece: f64,
    pub confusion: ConfusionMatrix,
    /// Plot name to URL.
    #[serde(default)]
    pub plots: HashMap<String, String>,
}

/// Handle to an uploaded dataset.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DatasetRef {
    pub dataset_id: String,
    pub object_key: String,
    pub size: u64,
    pub filename: String,
    pub uploaded_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;

    #[test]
    fn prediction_decodes_with_shap_pairs() {
        let json = indoc! {r#"
            {
              "object_id": "KOI-7016",
              "probs": {"POSITIVE": 0.87, "NEGATIVE": 0.13},
              "conf": 0.91,
              "version": "cnn-v3",
              "explain": {
                "tabular": {
                  "shap": [["koi_period", 0.31], ["koi_depth", -0.12]]
                }
              }
            }
        "#};

        let prediction: Prediction = serde_json::from_str(json).unwrap();
        assert_eq!(prediction.object_id.as_deref(), Some("KOI-7016"));
        assert_eq!(prediction.attributions().len(), 2);
        assert_eq!(prediction.attributions()[0].feature, "koi_period");
        assert_eq!(prediction.attributions()[1].value, -0.12);
    }

    #[test]
    fn prediction_without_explanation_has_no_attributions() {
        let json = r#"{"probs": {"CONF": 0.5, "PC": 0.3, "FP": 0.2}, "conf": 0.8, "version": "v1"}"#;
        let prediction: Prediction = serde_json::from_str(json).unwrap();
        assert!(prediction.attributions().is_empty());
        assert!(prediction.importance.is_none());
    }

    #[test]
    fn response_decodes_or_reports_decode_error() {
        let json = r#"{"predictions": [{"probs": {}, "conf": 0.5, "version": "v1"}]}"#;
        let response = PredictionResponse::from_json(json).unwrap();
        assert_eq!(response.predictions.len(), 1);

        let err = PredictionResponse::from_json("{not json").unwrap_err();
        assert!(matches!(err, Error::Decode(_)));
    }

    #[test]
    fn confusion_matrix_uses_wire_keys() {
        let json = r#"{"tp": 3, "fp": 1, "tn": 4, "fn": 2}"#;
        let matrix: ConfusionMatrix = serde_json::from_str(json).unwrap();
        assert_eq!(matrix.true_positives, 3);
        assert_eq!(matrix.false_negatives, 2);
        assert_eq!(matrix.total(), 10);

        let back = serde_json::to_value(matrix).unwrap();
        assert_eq!(back["fn"], 2);
    }

    #[test]
    fn training_job_decodes_lowercase_status() {
        let json = indoc! {r#"
            {
              "job_id": "job-42",
              "status": "running",
              "progress": 55,
              "created_at": "2025-06-01T10:00:00Z",
              "updated_at": "2025-06-01T10:05:00Z",
              "started_at": "2025-06-01T10:00:30Z"
            }
        "#};

        let job: TrainingJob = serde_json::from_str(json).unwrap();
        assert_eq!(job.status, JobStatus::Running);
        assert!(!job.status.is_terminal());
        assert_eq!(job.progress, 55);
        assert!(job.metrics.is_none());
    }

    #[test]
    fn terminal_statuses() {
        assert!(JobStatus::Completed.is_terminal());
        assert!(JobStatus::Failed.is_terminal());
        assert!(!JobStatus::Pending.is_terminal());
    }

    #[test]
    fn disposition_display_names() {
        assert_eq!(Disposition::Confirmed.display_name(), "Confirmed Planet");
        assert_eq!(Disposition::Candidate.display_name(), "Candidate Planet");
        assert_eq!(
            Disposition::FalsePositive.display_name(),
            "Needs Verification"
        );
    }
}
