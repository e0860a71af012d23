//! Boundary mapping property tests
//!
//! Tests for base-pair to bin boundary scaling.

use fast_plothic::core::{map_boundaries, scale_round_half_up, ChromosomeBoundary, PlotHicError};
use proptest::prelude::*;

// ============================================================================
// Generators
// ============================================================================

/// Chromosome lengths (some may be tiny) for 1..12 chromosomes
fn arb_lengths() -> impl Strategy<Value = Vec<u64>> {
    prop::collection::vec(prop_oneof![1u64..10, 1000u64..5_000_000], 1..12)
}

fn cumulative(lengths: &[u64]) -> Vec<ChromosomeBoundary> {
    let mut end = 0;
    lengths
        .iter()
        .enumerate()
        .map(|(i, len)| {
            end += len;
            ChromosomeBoundary::new(format!("chr{}", i + 1), end, i + 1)
        })
        .collect()
}

// ============================================================================
// Property Tests
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Property: bin ends never decrease and the last equals the matrix dimension
    #[test]
    fn test_bin_ends_monotone(lengths in arb_lengths(), dim in 1usize..5000) {
        let boundaries = cumulative(&lengths);
        let extent = boundaries.last().unwrap().bp_end;
        let bins = map_boundaries(&boundaries, dim, extent).unwrap();

        prop_assert_eq!(bins.len(), boundaries.len());
        for pair in bins.windows(2) {
            prop_assert!(pair[0].bin_end <= pair[1].bin_end);
        }
        prop_assert_eq!(bins.last().unwrap().bin_end, dim);
    }

    /// Property: names and order indices pass through unchanged
    #[test]
    fn test_metadata_preserved(lengths in arb_lengths(), dim in 1usize..5000) {
        let boundaries = cumulative(&lengths);
        let extent = boundaries.last().unwrap().bp_end;
        let bins = map_boundaries(&boundaries, dim, extent).unwrap();
        for (b, bin) in boundaries.iter().zip(&bins) {
            prop_assert_eq!(&b.name, &bin.name);
            prop_assert_eq!(b.order_index, bin.order_index);
        }
    }

    /// Property: each bin end is within half a bin of the exact scaled value
    #[test]
    fn test_rounding_error_bounded(lengths in arb_lengths(), dim in 1usize..5000) {
        let boundaries = cumulative(&lengths);
        let extent = boundaries.last().unwrap().bp_end;
        let bins = map_boundaries(&boundaries, dim, extent).unwrap();
        for (b, bin) in boundaries.iter().zip(&bins) {
            let exact = b.bp_end as f64 * dim as f64 / extent as f64;
            prop_assert!((bin.bin_end as f64 - exact).abs() <= 0.5 + 1e-9);
        }
    }

    /// Property: round half up agrees with floor(x + 1/2)
    #[test]
    fn test_round_half_up(value in 0u64..1_000_000, num in 0u64..10_000, den in 1u64..10_000) {
        let expected = (2 * value * num + den) / (2 * den);
        prop_assert_eq!(scale_round_half_up(value, num, den), expected);
    }

    /// Property: an extent past the last boundary is rejected
    #[test]
    fn test_extent_mismatch_rejected(lengths in arb_lengths(), extra in 1u64..1000) {
        let boundaries = cumulative(&lengths);
        let extent = boundaries.last().unwrap().bp_end + extra;
        let err = map_boundaries(&boundaries, 100, extent).unwrap_err();
        prop_assert!(matches!(err, PlotHicError::Configuration(_)), "unexpected error: {}", err);
    }
}
