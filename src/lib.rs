// Export modules for library usage
pub mod cli;
pub mod commands;
pub mod config;
pub mod core;
pub mod io;
pub mod metrics;
pub mod monitor;
pub mod policy;
pub mod session;
pub mod shap;
pub mod synthetic;
pub mod threshold;

// Re-export commonly used types
pub use crate::core::{
    Attribution, ClassProbs, ConfusionMatrix, DerivedMetrics, Disposition, Explanation, JobStatus,
    LabeledSample, Prediction, PredictionResponse, TrainingJob,
};

pub use crate::metrics::{
    compute_confusion, derive_metrics, normalized_entropy, prediction_uncertainty, MetricGrade,
};

pub use crate::policy::{classify, disposition_counts, DispositionCounts};

pub use crate::threshold::{
    evaluate_at, PredictionSet, ThresholdAdvice, ThresholdController, ThresholdMetrics,
    DEFAULT_THRESHOLD,
};

pub use crate::monitor::{estimate_remaining, JobMonitor, JobStatusSource, MonitorState};

pub use crate::session::{Session, View};

pub use crate::shap::top_attributions;

pub use crate::io::output::{create_writer, OutputFormat, OutputWriter};
