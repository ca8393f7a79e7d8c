//! Interactive decision-threshold state and its derived metrics
//!
//! [`ThresholdController`] owns the current threshold and the active
//! prediction set, recomputes [`ThresholdMetrics`] synchronously on every
//! change, and pushes the fresh snapshot to subscribers before the call
//! returns. Presentation layers read, they never compute.

use serde::{Deserialize, Serialize};

use crate::core::{ClassProbs, ConfusionMatrix, DerivedMetrics, LabeledSample};
use crate::metrics::{
    compute_confusion, derive_metrics, MetricGrade, F1_EXCELLENT_FLOOR, F1_GOOD_FLOOR,
    MCC_MODERATE_FLOOR,
};

/// Threshold used when the caller does not supply one.
pub const DEFAULT_THRESHOLD: f64 = 0.5;

/// Evaluation snapshot at one threshold. Recomputed wholesale on every
/// change and never persisted; the wire shape flattens to the dial's
/// `{threshold, tp, fp, tn, fn, precision, recall, f1, mcc}` record.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ThresholdMetrics {
    pub threshold: f64,
    #[serde(flatten)]
    pub counts: ConfusionMatrix,
    #[serde(flatten)]
    pub derived: DerivedMetrics,
}

/// The predictions a controller evaluates against.
///
/// Ground truth is only available in evaluation harnesses; the common
/// inference-time case is an unlabeled set, where the only observable
/// statistic is the classification split.
#[derive(Clone, Debug, PartialEq)]
pub enum PredictionSet {
    Labeled(Vec<LabeledSample>),
    Unlabeled(Vec<ClassProbs>),
}

impl Default for PredictionSet {
    fn default() -> Self {
        PredictionSet::Unlabeled(Vec::new())
    }
}

impl PredictionSet {
    pub fn len(&self) -> usize {
        match self {
            PredictionSet::Labeled(samples) => samples.len(),
            PredictionSet::Unlabeled(probs) => probs.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Evaluate a prediction set at a threshold.
///
/// Labeled sets get the full confusion matrix and derived statistics.
/// Unlabeled sets fall back to the classification split: predictions whose
/// positive-class probability meets the threshold count as confirmed, and
/// precision, recall, and F1 all report the confirmed ratio (MCC needs
/// ground truth and stays 0). Empty sets evaluate to all zeros.
pub fn evaluate_at(threshold: f64, predictions: &PredictionSet) -> ThresholdMetrics {
    match predictions {
        PredictionSet::Labeled(samples) => {
            let counts = compute_confusion(threshold, samples);
            ThresholdMetrics {
                threshold,
                counts,
                derived: derive_metrics(&counts),
            }
        }
        PredictionSet::Unlabeled(probs) => fallback_split(threshold, probs),
    }
}

fn fallback_split(threshold: f64, probs: &[ClassProbs]) -> ThresholdMetrics {
    let total = probs.len();
    let confirmed = probs
        .iter()
        .filter(|p| p.positive_probability() >= threshold)
        .count();
    let ratio = if total == 0 {
        0.0
    } else {
        confirmed as f64 / total as f64
    };

    ThresholdMetrics {
        threshold,
        counts: ConfusionMatrix {
            true_positives: confirmed,
            false_positives: total - confirmed,
            true_negatives: 0,
            false_negatives: 0,
        },
        derived: DerivedMetrics {
            precision: ratio,
            recall: ratio,
            f1: ratio,
            mcc: 0.0,
        },
    }
}

type Subscriber = Box<dyn FnMut(&ThresholdMetrics) + Send>;

/// Stateful threshold holder backing the tuning dial.
///
/// Every mutation clamps, recomputes, and notifies subscribers before it
/// returns; there is no debouncing here, so a dragged slider produces one
/// recomputation per step. Callers that want smoothing debounce upstream.
pub struct ThresholdController {
    initial_threshold: f64,
    threshold: f64,
    predictions: PredictionSet,
    metrics: ThresholdMetrics,
    subscribers: Vec<Subscriber>,
}

impl ThresholdController {
    /// Controller over an empty prediction set. The initial threshold is
    /// clamped to [0, 1] (NaN falls back to [`DEFAULT_THRESHOLD`]) and
    /// becomes the `reset` target.
    pub fn new(initial_threshold: f64) -> Self {
        Self::with_predictions(initial_threshold, PredictionSet::default())
    }

    pub fn with_predictions(initial_threshold: f64, predictions: PredictionSet) -> Self {
        let initial = if initial_threshold.is_nan() {
            DEFAULT_THRESHOLD
        } else {
            initial_threshold.clamp(0.0, 1.0)
        };
        let mut controller = Self {
            initial_threshold: initial,
            threshold: initial,
            predictions,
            metrics: ThresholdMetrics::default(),
            subscribers: Vec::new(),
        };
        controller.recompute();
        controller
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// The snapshot from the most recent recomputation.
    pub fn metrics(&self) -> &ThresholdMetrics {
        &self.metrics
    }

    pub fn predictions(&self) -> &PredictionSet {
        &self.predictions
    }

    /// Register a callback invoked with the fresh metrics after every
    /// recomputation, starting with the next one.
    pub fn subscribe(&mut self, subscriber: impl FnMut(&ThresholdMetrics) + Send + 'static) {
        self.subscribers.push(Box::new(subscriber));
    }

    /// Clamp to [0, 1], store, recompute, notify. A NaN input is ignored
    /// and keeps the current value without recomputing, so the stored
    /// threshold never leaves the unit interval.
    pub fn set_threshold(&mut self, threshold: f64) {
        if threshold.is_nan() {
            log::warn!("ignoring NaN threshold, keeping {:.3}", self.threshold);
            return;
        }
        self.threshold = threshold.clamp(0.0, 1.0);
        self.recompute();
    }

    /// Restore the construction-time threshold and recompute.
    pub fn reset(&mut self) {
        self.threshold = self.initial_threshold;
        self.recompute();
    }

    /// Replace the active prediction set and recompute.
    pub fn set_predictions(&mut self, predictions: PredictionSet) {
        self.predictions = predictions;
        self.recompute();
    }

    fn recompute(&mut self) {
        self.metrics = evaluate_at(self.threshold, &self.predictions);
        log::debug!(
            "threshold {:.3} over {} predictions: f1 {:.3}, mcc {:.3}",
            self.threshold,
            self.predictions.len(),
            self.metrics.derived.f1,
            self.metrics.derived.mcc
        );
        for subscriber in &mut self.subscribers {
            subscriber(&self.metrics);
        }
    }
}

/// Tuning guidance derived from a metrics snapshot: the dial's F1
/// traffic light, its low-MCC imbalance hint, and the suggestion line.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ThresholdAdvice {
    pub f1_grade: MetricGrade,
    pub imbalance_suspected: bool,
    pub suggestion: String,
}

impl ThresholdAdvice {
    pub fn for_metrics(metrics: &ThresholdMetrics) -> Self {
        Self::with_floors(
            metrics,
            F1_EXCELLENT_FLOOR,
            F1_GOOD_FLOOR,
            MCC_MODERATE_FLOOR,
        )
    }

    /// Advice against explicit grade bands, for callers with configured
    /// floors.
    pub fn with_floors(
        metrics: &ThresholdMetrics,
        f1_excellent: f64,
        f1_good: f64,
        mcc_imbalance: f64,
    ) -> Self {
        let f1_grade = MetricGrade::with_floors(metrics.derived.f1, f1_excellent, f1_good);
        let imbalance_suspected = metrics.derived.mcc < mcc_imbalance;

        let mut suggestion = match f1_grade {
            MetricGrade::Excellent => {
                "The current threshold performs excellently with a high F1 score."
            }
            MetricGrade::Good => "The current threshold performs well, consider further tuning.",
            MetricGrade::Poor => "Consider adjusting the threshold for a better F1 score.",
        }
        .to_string();
        if imbalance_suspected {
            suggestion.push_str(" Low MCC, there may be a class imbalance issue.");
        }

        Self {
            f1_grade,
            imbalance_suspected,
            suggestion,
        }
    }
}
