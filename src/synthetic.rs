//! Deterministic demo data
//!
//! Stand-ins for a live scoring backend: a labeled sample set with the
//! 30/70 class mix the demo dial ships with, and a batch of fallback-style
//! predictions. Everything is derived from a seed so repeated runs (and
//! tests) see identical data.

use crate::core::{
    Attribution, ClassProbs, Explanation, LabeledSample, Prediction, TabularExplanation,
};

/// Default demo set size.
pub const DEFAULT_SAMPLES: usize = 1000;

const SHAP_FEATURES: [&str; 5] = [
    "koi_model_snr",
    "koi_duration",
    "koi_depth",
    "koi_period",
    "koi_steff",
];

/// Pseudo-random fraction in [0, 1) for the given seed and draw index.
/// Knuth's multiplicative hash: deterministic spread, not a statistical
/// RNG.
fn unit_fraction(seed: u64, draw: u64) -> f64 {
    let hash = seed
        .wrapping_add(draw.wrapping_mul(0x9E37_79B9))
        .wrapping_mul(2_654_435_761);
    (hash % 10_000) as f64 / 10_000.0
}

/// Labeled scoring set: roughly 30% positives, positives scored in
/// [0.6, 0.9), negatives in [0.2, 0.5).
pub fn labeled_samples(count: usize, seed: u64) -> Vec<LabeledSample> {
    (0..count as u64)
        .map(|i| {
            let is_positive = unit_fraction(seed, 2 * i) < 0.3;
            let spread = unit_fraction(seed, 2 * i + 1) * 0.3 - 0.1;
            let base = if is_positive { 0.7 } else { 0.3 };
            LabeledSample::new((base + spread).clamp(0.0, 1.0), is_positive)
        })
        .collect()
}

/// Batch of binary predictions shaped like the scoring API's fallback
/// output: TARGET-n identifiers, confidence as the larger class
/// probability, and a small cycling SHAP block per target.
pub fn predictions(count: usize, seed: u64) -> Vec<Prediction> {
    labeled_samples(count, seed)
        .into_iter()
        .enumerate()
        .map(|(i, sample)| {
            let positive = sample.probability;
            Prediction {
                object_id: Some(format!("TARGET-{}", i + 1)),
                probs: ClassProbs::Binary {
                    positive,
                    negative: 1.0 - positive,
                },
                conf: positive.max(1.0 - positive),
                version: "v1.0.0-demo".to_string(),
                explain: Some(Explanation {
                    tabular: Some(TabularExplanation {
                        shap: shap_block(i),
                    }),
                }),
                importance: None,
            }
        })
        .collect()
}

/// Per-target SHAP values on the usual KOI features, cycling the way the
/// scoring API's fallback does so neighbours differ but runs repeat.
fn shap_block(i: usize) -> Vec<Attribution> {
    let values = [
        0.3 - (i % 3) as f64 * 0.1,
        0.2 - (i % 2) as f64 * 0.1,
        0.15 - (i % 4) as f64 * 0.05,
        0.1 - (i % 3) as f64 * 0.03,
        0.08 - (i % 2) as f64 * 0.04,
    ];
    SHAP_FEATURES
        .iter()
        .zip(values)
        .map(|(feature, value)| Attribution::new(*feature, value))
        .collect()
}
