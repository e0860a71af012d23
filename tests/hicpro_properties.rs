//! HiC-Pro input property tests
//!
//! Tests for sparse matrix loading and abs.bed boundary extraction.

use fast_plothic::core::{DataShapeError, PlotHicError};
use fast_plothic::formats::{parse_abs_bed_reader, parse_order_reader, parse_sparse_matrix_reader};
use proptest::prelude::*;
use std::io::Cursor;

// ============================================================================
// Generators
// ============================================================================

/// Upper-triangle sparse entries (1-based) for a matrix of size `dim`
fn arb_entries() -> impl Strategy<Value = (usize, Vec<(usize, usize, u32)>)> {
    (1usize..40).prop_flat_map(|dim| {
        let entry = (1..=dim, 1..=dim, 1u32..1000).prop_map(|(a, b, v)| (a.min(b), a.max(b), v));
        (Just(dim), prop::collection::vec(entry, 0..60))
    })
}

fn arb_chrom_bins() -> impl Strategy<Value = Vec<usize>> {
    prop::collection::vec(1usize..20, 1..10)
}

fn sparse_text(entries: &[(usize, usize, u32)]) -> String {
    entries
        .iter()
        .map(|(r, c, v)| format!("{}\t{}\t{}\n", r, c, v))
        .collect()
}

fn abs_bed_text(bins_per_chrom: &[usize], bin_size: u64) -> String {
    let mut text = String::new();
    let mut index = 1;
    for (c, &n) in bins_per_chrom.iter().enumerate() {
        for k in 0..n as u64 {
            text.push_str(&format!(
                "chr{}\t{}\t{}\t{}\n",
                c + 1,
                k * bin_size,
                (k + 1) * bin_size,
                index
            ));
            index += 1;
        }
    }
    text
}

// ============================================================================
// Property Tests
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Property: the loaded matrix is symmetric and holds every entry
    #[test]
    fn test_sparse_matrix_symmetric((dim, entries) in arb_entries()) {
        let m = parse_sparse_matrix_reader(Cursor::new(sparse_text(&entries)), dim).unwrap();
        prop_assert_eq!(m.dim(), (dim, dim));
        prop_assert_eq!(&m, &m.t().to_owned());

        // Later lines overwrite earlier ones
        let mut last = std::collections::HashMap::new();
        for &(r, c, v) in &entries {
            last.insert((r, c), v);
        }
        for ((r, c), v) in last {
            prop_assert_eq!(m[[r - 1, c - 1]], v as f64);
        }
    }

    /// Property: an index past the declared dimension is a shape error
    #[test]
    fn test_out_of_bounds_rejected(dim in 1usize..40, over in 1usize..10) {
        let text = format!("1\t{}\t1\n", dim + over);
        let err = parse_sparse_matrix_reader(Cursor::new(text), dim).unwrap_err();
        let is_out_of_bounds = matches!(err, PlotHicError::DataShape(DataShapeError::EntryOutOfBounds { .. }));
        prop_assert!(is_out_of_bounds);
    }

    /// Property: chromosome bin ends are the running bin totals
    #[test]
    fn test_abs_bed_cumulative_ends(bins in arb_chrom_bins(), bin_size in 1u64..100_000) {
        let boundaries = parse_abs_bed_reader(Cursor::new(abs_bed_text(&bins, bin_size))).unwrap();
        prop_assert_eq!(boundaries.len(), bins.len());

        let mut end = 0;
        for (i, (b, n)) in boundaries.iter().zip(&bins).enumerate() {
            end += n;
            prop_assert_eq!(b.bin_end, end);
            prop_assert_eq!(&b.name, &format!("chr{}", i + 1));
            prop_assert_eq!(b.order_index, i + 1);
        }
    }

    /// Property: an order file lists names by position, whatever the line order
    #[test]
    fn test_order_positions(names in Just((1..=8).map(|i| format!("chr{}", i)).collect::<Vec<_>>()).prop_shuffle()) {
        let text: String = names
            .iter()
            .enumerate()
            .rev()
            .map(|(pos, name)| format!("{}\t{}\n", name, pos + 1))
            .collect();
        let order = parse_order_reader(Cursor::new(text)).unwrap();
        prop_assert_eq!(order, names);
    }
}
