//! Confusion counts, derived statistics, and uncertainty scoring
//!
//! Every function here is total: empty inputs, zero counts, and degenerate
//! distributions produce zeros rather than NaN or panics. Thresholds
//! compare inclusively, so a probability exactly at the threshold counts
//! as predicted-positive.

use serde::{Deserialize, Serialize};

use crate::core::{ClassProbs, ConfusionMatrix, DerivedMetrics, LabeledSample};

/// Default F1 floor for an excellent grade.
pub const F1_EXCELLENT_FLOOR: f64 = 0.8;
/// Default F1 floor for a good grade.
pub const F1_GOOD_FLOOR: f64 = 0.6;
/// Default MCC floor for an excellent grade.
pub const MCC_STRONG_FLOOR: f64 = 0.5;
/// Default MCC floor below which class imbalance is suspected.
pub const MCC_MODERATE_FLOOR: f64 = 0.3;

/// Count confusion-matrix cells for labeled samples at a decision threshold.
///
/// A sample is predicted positive when its probability is at or above the
/// threshold. The four counts always sum to `samples.len()`.
///
/// # Examples
///
/// ```
/// use exovet::core::LabeledSample;
/// use exovet::metrics::compute_confusion;
///
/// let samples = [
///     LabeledSample::new(0.9, true),
///     LabeledSample::new(0.3, false),
/// ];
/// let counts = compute_confusion(0.5, &samples);
/// assert_eq!(counts.true_positives, 1);
/// assert_eq!(counts.true_negatives, 1);
/// assert_eq!(counts.total(), samples.len());
/// ```
pub fn compute_confusion(threshold: f64, samples: &[LabeledSample]) -> ConfusionMatrix {
    let mut counts = ConfusionMatrix::default();
    for sample in samples {
        let predicted_positive = sample.probability >= threshold;
        match (predicted_positive, sample.is_positive) {
            (true, true) => counts.true_positives += 1,
            (true, false) => counts.false_positives += 1,
            (false, false) => counts.true_negatives += 1,
            (false, true) => counts.false_negatives += 1,
        }
    }
    counts
}

/// Derive precision, recall, F1, and Matthews correlation from confusion
/// counts. Each statistic is 0 when its denominator is 0, so the result is
/// finite for any input including the all-zero matrix.
pub fn derive_metrics(counts: &ConfusionMatrix) -> DerivedMetrics {
    let tp = counts.true_positives as f64;
    let fp = counts.false_positives as f64;
    let tn = counts.true_negatives as f64;
    let missed = counts.false_negatives as f64;

    let precision = if tp + fp > 0.0 { tp / (tp + fp) } else { 0.0 };
    let recall = if tp + missed > 0.0 {
        tp / (tp + missed)
    } else {
        0.0
    };
    let f1 = if precision + recall > 0.0 {
        2.0 * precision * recall / (precision + recall)
    } else {
        0.0
    };

    // Factors multiplied in f64: the product overflows u64 well before the
    // sample counts themselves get large.
    let mcc_denominator = ((tp + fp) * (tp + missed) * (tn + fp) * (tn + missed)).sqrt();
    let mcc = if mcc_denominator > 0.0 {
        (tp * tn - fp * missed) / mcc_denominator
    } else {
        0.0
    };

    DerivedMetrics {
        precision,
        recall,
        f1,
        mcc,
    }
}

impl DerivedMetrics {
    /// True when the MCC is low enough that class imbalance is the likely
    /// explanation for otherwise healthy-looking precision and recall.
    pub fn imbalance_suspected(&self) -> bool {
        self.mcc < MCC_MODERATE_FLOOR
    }
}

/// Shannon entropy of a class distribution, normalized to [0, 1] by the
/// maximum entropy for that many classes.
///
/// Zero-probability terms contribute nothing. Distributions of one class
/// or fewer score 0; the result is clamped so slightly denormalized inputs
/// stay in range.
///
/// # Examples
///
/// ```
/// use exovet::metrics::normalized_entropy;
///
/// assert_eq!(normalized_entropy(&[1.0, 0.0]), 0.0);
/// assert!((normalized_entropy(&[0.5, 0.5]) - 1.0).abs() < 1e-12);
/// ```
pub fn normalized_entropy(distribution: &[f64]) -> f64 {
    if distribution.len() <= 1 {
        return 0.0;
    }

    let entropy: f64 = distribution
        .iter()
        .filter(|p| **p > 0.0)
        .map(|p| -p * p.log2())
        .sum();
    let max_entropy = (distribution.len() as f64).log2();

    (entropy / max_entropy).clamp(0.0, 1.0)
}

/// Uncertainty of one prediction: the normalized entropy of its class
/// distribution (two classes for binary models, three for ternary).
pub fn prediction_uncertainty(probs: &ClassProbs) -> f64 {
    normalized_entropy(&probs.distribution())
}

/// Traffic-light grade for a metric value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum MetricGrade {
    Excellent,
    Good,
    Poor,
}

impl MetricGrade {
    /// Grade against explicit floors. `excellent_floor` must not be below
    /// `good_floor`; callers get that from validated config.
    pub fn with_floors(value: f64, excellent_floor: f64, good_floor: f64) -> Self {
        match value {
            v if v >= excellent_floor => MetricGrade::Excellent,
            v if v >= good_floor => MetricGrade::Good,
            _ => MetricGrade::Poor,
        }
    }

    /// Grade an F1 score with the default floors.
    pub fn from_f1(f1: f64) -> Self {
        Self::with_floors(f1, F1_EXCELLENT_FLOOR, F1_GOOD_FLOOR)
    }

    /// Grade an MCC value with the default floors.
    pub fn from_mcc(mcc: f64) -> Self {
        Self::with_floors(mcc, MCC_STRONG_FLOOR, MCC_MODERATE_FLOOR)
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            MetricGrade::Excellent => "Excellent",
            MetricGrade::Good => "Good",
            MetricGrade::Poor => "Poor",
        }
    }
}

impl std::fmt::Display for MetricGrade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn samples(pairs: &[(f64, bool)]) -> Vec<LabeledSample> {
        pairs.iter().map(|&p| LabeledSample::from(p)).collect()
    }

    #[test]
    fn known_split_at_half_threshold() {
        let set = samples(&[(0.9, true), (0.3, false), (0.6, false), (0.4, true)]);
        let counts = compute_confusion(0.5, &set);

        assert_eq!(counts.true_positives, 1);
        assert_eq!(counts.false_positives, 1);
        assert_eq!(counts.true_negatives, 1);
        assert_eq!(counts.false_negatives, 1);

        let derived = derive_metrics(&counts);
        assert_eq!(derived.precision, 0.5);
        assert_eq!(derived.recall, 0.5);
        assert_eq!(derived.f1, 0.5);
        assert_eq!(derived.mcc, 0.0);
    }

    #[test]
    fn threshold_boundary_is_inclusive() {
        let set = samples(&[(0.5, true)]);
        let counts = compute_confusion(0.5, &set);
        assert_eq!(counts.true_positives, 1);
        assert_eq!(counts.false_negatives, 0);
    }

    #[test]
    fn empty_input_yields_zero_counts() {
        let counts = compute_confusion(0.5, &[]);
        assert_eq!(counts, ConfusionMatrix::default());
        assert_eq!(counts.total(), 0);
    }

    #[test]
    fn zero_denominators_yield_zero_metrics() {
        let derived = derive_metrics(&ConfusionMatrix::default());
        assert_eq!(derived.precision, 0.0);
        assert_eq!(derived.recall, 0.0);
        assert_eq!(derived.f1, 0.0);
        assert_eq!(derived.mcc, 0.0);
    }

    #[test]
    fn all_negative_samples_leave_precision_zero() {
        // Nothing predicted positive: tp + fp == 0.
        let set = samples(&[(0.1, false), (0.2, false)]);
        let derived = derive_metrics(&compute_confusion(0.5, &set));
        assert_eq!(derived.precision, 0.0);
        assert_eq!(derived.recall, 0.0);
    }

    #[test]
    fn perfect_classifier_scores_one() {
        let set = samples(&[(0.9, true), (0.8, true), (0.2, false), (0.1, false)]);
        let derived = derive_metrics(&compute_confusion(0.5, &set));
        assert_eq!(derived.precision, 1.0);
        assert_eq!(derived.recall, 1.0);
        assert_eq!(derived.f1, 1.0);
        assert_eq!(derived.mcc, 1.0);
    }

    #[test]
    fn inverted_classifier_scores_negative_mcc() {
        let set = samples(&[(0.9, false), (0.8, false), (0.2, true), (0.1, true)]);
        let derived = derive_metrics(&compute_confusion(0.5, &set));
        assert_eq!(derived.mcc, -1.0);
    }

    #[test]
    fn entropy_of_one_hot_is_zero() {
        assert_eq!(normalized_entropy(&[1.0, 0.0]), 0.0);
        assert_eq!(normalized_entropy(&[0.0, 0.0, 1.0]), 0.0);
    }

    #[test]
    fn entropy_of_uniform_is_one() {
        assert!((normalized_entropy(&[0.5, 0.5]) - 1.0).abs() < 1e-12);
        let third = 1.0 / 3.0;
        assert!((normalized_entropy(&[third, third, third]) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn entropy_of_skewed_binary() {
        let value = normalized_entropy(&[0.9, 0.1]);
        assert!((value - 0.469).abs() < 1e-3);
    }

    #[test]
    fn entropy_of_single_class_is_zero() {
        assert_eq!(normalized_entropy(&[1.0]), 0.0);
        assert_eq!(normalized_entropy(&[]), 0.0);
    }

    #[test]
    fn entropy_is_clamped_for_denormalized_input() {
        assert_eq!(normalized_entropy(&[2.0, 2.0]), 0.0);
        assert!(normalized_entropy(&[0.6, 0.6]) <= 1.0);
    }

    #[test]
    fn uncertainty_reads_the_variant_distribution() {
        let binary = ClassProbs::Binary {
            positive: 0.9,
            negative: 0.1,
        };
        assert!((prediction_uncertainty(&binary) - 0.469).abs() < 1e-3);

        let ternary = ClassProbs::Ternary {
            conf: 1.0,
            pc: 0.0,
            fp: 0.0,
        };
        assert_eq!(prediction_uncertainty(&ternary), 0.0);
    }

    #[test]
    fn imbalance_suspected_below_the_mcc_floor() {
        let suspect = DerivedMetrics {
            mcc: 0.2,
            ..Default::default()
        };
        assert!(suspect.imbalance_suspected());

        let healthy = DerivedMetrics {
            mcc: 0.3,
            ..Default::default()
        };
        assert!(!healthy.imbalance_suspected());
    }

    #[test]
    fn grades_band_at_default_floors() {
        assert_eq!(MetricGrade::from_f1(0.85), MetricGrade::Excellent);
        assert_eq!(MetricGrade::from_f1(0.8), MetricGrade::Excellent);
        assert_eq!(MetricGrade::from_f1(0.7), MetricGrade::Good);
        assert_eq!(MetricGrade::from_f1(0.59), MetricGrade::Poor);

        assert_eq!(MetricGrade::from_mcc(0.5), MetricGrade::Excellent);
        assert_eq!(MetricGrade::from_mcc(0.3), MetricGrade::Good);
        assert_eq!(MetricGrade::from_mcc(0.1), MetricGrade::Poor);
    }
}
