pub mod errors;
pub mod probs;
pub mod types;

pub use errors::{Error, Result, ResultExt};
pub use probs::{ClassProbs, RawProbs};
pub use types::{
    Attribution, ConfusionMatrix, DatasetRef, DerivedMetrics, Disposition, Explanation,
    JobStatus, LabeledSample, ModelMetrics, Prediction, PredictionResponse, TabularExplanation,
    TrainingJob, TrainingMetrics,
};
