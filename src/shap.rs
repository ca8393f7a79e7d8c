//! Top-K SHAP attribution selection for display

use crate::core::Attribution;

/// Default number of attributions shown per target.
pub const DEFAULT_TOP_K: usize = 8;

/// Select the `k` strongest attributions by absolute value.
///
/// The result is ordered by ascending magnitude with signs preserved, so a
/// horizontal bar chart draws it top to bottom and ends on the most
/// important feature. Equal magnitudes keep their input order; `k` of zero
/// or an empty input returns empty, `k` past the end returns everything.
///
/// # Examples
///
/// ```
/// use exovet::core::Attribution;
/// use exovet::shap::top_attributions;
///
/// let attrs = [
///     Attribution::new("koi_period", 0.3),
///     Attribution::new("koi_duration", -0.1),
///     Attribution::new("koi_depth", 0.5),
/// ];
/// let top = top_attributions(&attrs, 2);
/// assert_eq!(top[0].feature, "koi_period");
/// assert_eq!(top[1].feature, "koi_depth");
/// ```
pub fn top_attributions(attributions: &[Attribution], k: usize) -> Vec<Attribution> {
    let mut sorted = attributions.to_vec();
    sorted.sort_by(|a, b| a.magnitude().total_cmp(&b.magnitude()));
    let start = sorted.len().saturating_sub(k);
    sorted.split_off(start)
}


#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;

    fn arb_attributions() -> impl Strategy<Value = Vec<Attribution>> {
        prop::collection::vec(
            ("[a-z]{1,8}", -10.0..10.0f64).prop_map(|(feature, value)| Attribution {
                feature,
                value,
            }),
            0..30,
        )
    }

    proptest! {
        #[test]
        fn output_length_is_min_of_k_and_len(input in arb_attributions(), k in 0usize..40) {
            let top = top_attributions(&input, k);
            assert_eq!(top.len(), k.min(input.len()));
        }

        #[test]
        fn output_is_sorted_ascending_by_magnitude(input in arb_attributions(), k in 0usize..40) {
            let top = top_attributions(&input, k);
            for pair in top.windows(2) {
                assert!(pair[0].magnitude() <= pair[1].magnitude());
            }
        }

        #[test]
        fn nothing_excluded_outranks_the_selection(input in arb_attributions(), k in 1usize..40) {
            let top = top_attributions(&input, k);
            if let Some(weakest_kept) = top.first() {
                let excluded = input.len() - top.len();
                let mut sorted = input.clone();
                sorted.sort_by(|a, b| a.magnitude().total_cmp(&b.magnitude()));
                for attr in &sorted[..excluded] {
                    assert!(attr.magnitude() <= weakest_kept.magnitude());
                }
            }
        }
    }
}
