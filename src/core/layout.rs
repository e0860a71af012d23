//! Chromosome boundaries in base-pair and bin space
//!
//! Chromosome ends along the 1-D genome coordinate are scaled onto the
//! realized matrix dimension with a single rounding rule (round half up,
//! exact integer arithmetic), so boundaries are reproducible and never
//! decrease. Zero-width segments are possible at coarse resolutions and are
//! kept.

use crate::core::error::{ConfigurationError, Result};
use std::collections::HashSet;

/// A chromosome's cumulative end along the genome coordinate
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ChromosomeBoundary {
    /// Chromosome name
    pub name: String,
    /// Cumulative end in base pairs (exclusive)
    pub bp_end: u64,
    /// 1-based display position in the target order
    pub order_index: usize,
}

impl ChromosomeBoundary {
    pub fn new(name: impl Into<String>, bp_end: u64, order_index: usize) -> Self {
        Self {
            name: name.into(),
            bp_end,
            order_index,
        }
    }
}

/// A chromosome's end in matrix index space
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BinBoundary {
    /// Chromosome name
    pub name: String,
    /// Cumulative end in bins (exclusive)
    pub bin_end: usize,
    /// 1-based display position in the target order
    pub order_index: usize,
}

impl BinBoundary {
    pub fn new(name: impl Into<String>, bin_end: usize, order_index: usize) -> Self {
        Self {
            name: name.into(),
            bin_end,
            order_index,
        }
    }

    /// Build boundaries from pre-computed bin ends (genome order)
    ///
    /// Used for inputs that already carry bin indices, such as HiC-Pro
    /// `abs.bed` files. Order indices default to genome order.
    pub fn from_bin_ends<I, S>(ends: I) -> Result<Vec<BinBoundary>>
    where
        I: IntoIterator<Item = (S, usize)>,
        S: Into<String>,
    {
        let boundaries: Vec<BinBoundary> = ends
            .into_iter()
            .enumerate()
            .map(|(i, (name, end))| BinBoundary::new(name, end, i + 1))
            .collect();
        if boundaries.is_empty() {
            return Err(ConfigurationError::InvalidBoundaries("no chromosomes".to_string()).into());
        }
        check_unique_names(boundaries.iter().map(|b| b.name.as_str()))?;
        for pair in boundaries.windows(2) {
            if pair[1].bin_end < pair[0].bin_end {
                return Err(ConfigurationError::InvalidBoundaries(format!(
                    "{} ends at bin {} before {} at bin {}",
                    pair[1].name, pair[1].bin_end, pair[0].name, pair[0].bin_end
                ))
                .into());
            }
        }
        Ok(boundaries)
    }
}

/// Round `value * numerator / denominator` half up, without floating point
///
/// # Examples
/// ```
/// use fast_plothic::core::scale_round_half_up;
/// assert_eq!(scale_round_half_up(1000, 30, 3000), 10);
/// assert_eq!(scale_round_half_up(1050, 2, 1400), 2); // 1.5 -> 2
/// assert_eq!(scale_round_half_up(1049, 2, 1400), 1);
/// ```
#[inline]
pub fn scale_round_half_up(value: u64, numerator: u64, denominator: u64) -> u64 {
    let scaled = value as u128 * numerator as u128 * 2 + denominator as u128;
    (scaled / (denominator as u128 * 2)) as u64
}

/// Map base-pair boundaries onto a matrix of dimension `matrix_dim`
///
/// `bin_end = round_half_up(bp_end * matrix_dim / genome_extent)`. Output is
/// in input (genome) order. The last boundary must sit at `genome_extent`,
/// which makes the last bin end equal `matrix_dim`.
pub fn map_boundaries(
    boundaries: &[ChromosomeBoundary],
    matrix_dim: usize,
    genome_extent: u64,
) -> Result<Vec<BinBoundary>> {
    if genome_extent == 0 {
        return Err(ConfigurationError::InvalidExtent(genome_extent).into());
    }
    validate_bp_boundaries(boundaries)?;

    if let Some(last) = boundaries.last() {
        if last.bp_end != genome_extent {
            return Err(ConfigurationError::InvalidBoundaries(format!(
                "last chromosome {} ends at {} bp but the genome extent is {} bp",
                last.name, last.bp_end, genome_extent
            ))
            .into());
        }
    }

    Ok(boundaries
        .iter()
        .map(|b| BinBoundary {
            name: b.name.clone(),
            bin_end: scale_round_half_up(b.bp_end, matrix_dim as u64, genome_extent) as usize,
            order_index: b.order_index,
        })
        .collect())
}

/// Check that boundaries exist, have distinct names and never decrease
pub fn validate_bp_boundaries(boundaries: &[ChromosomeBoundary]) -> Result<()> {
    if boundaries.is_empty() {
        return Err(ConfigurationError::InvalidBoundaries("no chromosomes".to_string()).into());
    }
    check_unique_names(boundaries.iter().map(|b| b.name.as_str()))?;
    for pair in boundaries.windows(2) {
        if pair[1].bp_end < pair[0].bp_end {
            return Err(ConfigurationError::InvalidBoundaries(format!(
                "{} ends at {} bp before {} at {} bp",
                pair[1].name, pair[1].bp_end, pair[0].name, pair[0].bp_end
            ))
            .into());
        }
    }
    Ok(())
}

/// Fail on the first chromosome name seen twice
pub(crate) fn check_unique_names<'a, I>(names: I) -> Result<()>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut seen = HashSet::new();
    for name in names {
        if !seen.insert(name) {
            return Err(ConfigurationError::DuplicateChromosome(name.to_string()).into());
        }
    }
    Ok(())
}

/// Tick position of one chromosome in the displayed matrix
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LabelPosition {
    pub name: String,
    /// Cumulative bin end of the chromosome's segment
    pub position: usize,
}

/// Tick positions for the genome-order (not reordered) layout
pub fn genome_labels(boundaries: &[BinBoundary]) -> Vec<LabelPosition> {
    boundaries
        .iter()
        .map(|b| LabelPosition {
            name: b.name.clone(),
            position: b.bin_end,
        })
        .collect()
}
