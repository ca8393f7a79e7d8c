//! Disposition classification for probability shapes
//!
//! One rule per shape, applied uniformly everywhere a label is produced.
//! Binary models compare the positive probability against the decision
//! threshold (inclusive). Ternary models take the argmax of the three
//! classes; the threshold does not enter into it.

use serde::{Deserialize, Serialize};

use crate::core::{ClassProbs, Disposition};

/// Classify one probability shape into a vetting disposition.
///
/// Ternary ties resolve toward the earlier class: CONF over PC over FP.
/// An all-zero ternary payload (no probability keys on the wire) is
/// flagged for verification rather than letting the tie order call it
/// confirmed.
///
/// Total over all inputs; NaN components never panic, they simply lose
/// every comparison.
pub fn classify(probs: &ClassProbs, threshold: f64) -> Disposition {
    match probs {
        ClassProbs::Binary { positive, .. } => {
            if *positive >= threshold {
                Disposition::Confirmed
            } else {
                Disposition::Candidate
            }
        }
        ClassProbs::Ternary { conf, pc, fp } => {
            if probs.is_unpopulated() {
                return Disposition::FalsePositive;
            }
            if *conf >= *pc && *conf >= *fp {
                Disposition::Confirmed
            } else if *pc >= *fp {
                Disposition::Candidate
            } else {
                Disposition::FalsePositive
            }
        }
    }
}

/// How a prediction set splits across the three dispositions.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispositionCounts {
    pub confirmed: usize,
    pub candidate: usize,
    pub false_positive: usize,
}

impl DispositionCounts {
    pub fn total(&self) -> usize {
        self.confirmed + self.candidate + self.false_positive
    }

    /// Share of the set classified confirmed; 0 for an empty set.
    pub fn confirmed_ratio(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            0.0
        } else {
            self.confirmed as f64 / total as f64
        }
    }
}

/// Classify every shape in a set and tally the dispositions.
pub fn disposition_counts(probs: &[ClassProbs], threshold: f64) -> DispositionCounts {
    let mut counts = DispositionCounts::default();
    for p in probs {
        match classify(p, threshold) {
            Disposition::Confirmed => counts.confirmed += 1,
            Disposition::Candidate => counts.candidate += 1,
            Disposition::FalsePositive => counts.false_positive += 1,
        }
    }
    counts
}


#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;

    fn arb_probs() -> impl Strategy<Value = ClassProbs> {
        prop_oneof![
            (0.0..=1.0f64, 0.0..=1.0f64)
                .prop_map(|(positive, negative)| ClassProbs::Binary { positive, negative }),
            (0.0..=1.0f64, 0.0..=1.0f64, 0.0..=1.0f64)
                .prop_map(|(conf, pc, fp)| ClassProbs::Ternary { conf, pc, fp }),
        ]
    }

    proptest! {
        #[test]
        fn classify_is_total(probs in arb_probs(), threshold in 0.0..=1.0f64) {
            // Any disposition is acceptable; the point is no panic and a
            // stable answer.
            let first = classify(&probs, threshold);
            let second = classify(&probs, threshold);
            assert_eq!(first, second);
        }

        #[test]
        fn counts_cover_the_whole_set(
            set in prop::collection::vec(arb_probs(), 0..50),
            threshold in 0.0..=1.0f64
        ) {
            let counts = disposition_counts(&set, threshold);
            assert_eq!(counts.total(), set.len());
        }
    }
}
