//! Class-probability shapes emitted by the inference backend
//!
//! Binary models report `POSITIVE`/`NEGATIVE`, ternary models report
//! `CONF`/`PC`/`FP`. The wire allows any subset of the five keys; this
//! module resolves a payload into exactly one shape at decode time so the
//! rest of the crate can match on it without re-checking key presence.

use serde::{Deserialize, Serialize};

/// Probability payload as it appears on the wire. All five keys are
/// optional; absent keys read as 0.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RawProbs {
    #[serde(rename = "POSITIVE", default, skip_serializing_if = "Option::is_none")]
    pub positive: Option<f64>,
    #[serde(rename = "NEGATIVE", default, skip_serializing_if = "Option::is_none")]
    pub negative: Option<f64>,
    #[serde(rename = "CONF", default, skip_serializing_if = "Option::is_none")]
    pub conf: Option<f64>,
    #[serde(rename = "PC", default, skip_serializing_if = "Option::is_none")]
    pub pc: Option<f64>,
    #[serde(rename = "FP", default, skip_serializing_if = "Option::is_none")]
    pub fp: Option<f64>,
}

impl RawProbs {
    fn has_binary_keys(&self) -> bool {
        self.positive.is_some() || self.negative.is_some()
    }
}

/// Resolved probability shape. Constructed once from [`RawProbs`] when a
/// prediction is decoded; downstream code matches exhaustively and never
/// consults raw keys again.
///
/// Binary keys take precedence when a payload carries both shapes: binary
/// models emit all five keys with the ternary slots zeroed, so presence of
/// `POSITIVE`/`NEGATIVE` is the reliable signal.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawProbs", into = "RawProbs")]
pub enum ClassProbs {
    /// Two-class output: planet candidate vs. not.
    Binary { positive: f64, negative: f64 },
    /// Three-class output: confirmed, planetary candidate, false positive.
    Ternary { conf: f64, pc: f64, fp: f64 },
}

impl From<RawProbs> for ClassProbs {
    fn from(raw: RawProbs) -> Self {
        if raw.has_binary_keys() {
            ClassProbs::Binary {
                positive: raw.positive.unwrap_or(0.0),
                negative: raw.negative.unwrap_or(0.0),
            }
        } else {
            // A payload with no keys at all lands here as all zeros;
            // classification treats that as needs-verification.
            ClassProbs::Ternary {
                conf: raw.conf.unwrap_or(0.0),
                pc: raw.pc.unwrap_or(0.0),
                fp: raw.fp.unwrap_or(0.0),
            }
        }
    }
}

impl From<ClassProbs> for RawProbs {
    fn from(probs: ClassProbs) -> Self {
        match probs {
            ClassProbs::Binary { positive, negative } => RawProbs {
                positive: Some(positive),
                negative: Some(negative),
                ..RawProbs::default()
            },
            ClassProbs::Ternary { conf, pc, fp } => RawProbs {
                conf: Some(conf),
                pc: Some(pc),
                fp: Some(fp),
                ..RawProbs::default()
            },
        }
    }
}

impl ClassProbs {
    /// Probability that the target is a planet: `POSITIVE` for binary
    /// models, `CONF` for ternary ones. This is the value decision
    /// thresholds compare against.
    pub fn positive_probability(&self) -> f64 {
        match self {
            ClassProbs::Binary { positive, .. } => *positive,
            ClassProbs::Ternary { conf, .. } => *conf,
        }
    }

    /// The full class distribution, for entropy scoring.
    pub fn distribution(&self) -> Vec<f64> {
        match self {
            ClassProbs::Binary { positive, negative } => vec![*positive, *negative],
            ClassProbs::Ternary { conf, pc, fp } => vec![*conf, *pc, *fp],
        }
    }

    /// True when every component is zero, which happens for payloads that
    /// carried none of the probability keys.
    pub fn is_unpopulated(&self) -> bool {
        self.distribution().iter().all(|p| *p == 0.0)
    }

    /// Number of classes in this shape.
    pub fn num_classes(&self) -> usize {
        match self {
            ClassProbs::Binary { .. } => 2,
            ClassProbs::Ternary { .. } => 3,
        }
    }
}
