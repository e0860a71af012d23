//! Chromosome-level reordering of a contact matrix
//!
//! Each chromosome owns the contiguous bin range `[previous end, bin_end)`
//! of the genome-order matrix. Reordering concatenates those ranges in the
//! target order into one permutation and applies it to rows and columns
//! together, which keeps a symmetric matrix symmetric.

use crate::core::assembler::ContactMatrix;
use crate::core::error::{ConfigurationError, DataShapeError, Result};
use crate::core::layout::{check_unique_names, genome_labels, BinBoundary, LabelPosition};
use log::info;
use ndarray::Axis;
use std::collections::{HashMap, HashSet};

/// A bijection over `[0, N)` applied identically to both matrix axes
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Permutation {
    indices: Vec<usize>,
}

impl Permutation {
    /// The no-op permutation of length `n`
    pub fn identity(n: usize) -> Self {
        Self {
            indices: (0..n).collect(),
        }
    }

    /// Wrap an index list, checking that it covers `[0, len)` exactly once
    pub fn from_indices(indices: Vec<usize>) -> Result<Self> {
        let len = indices.len();
        let mut seen = vec![false; len];
        for &i in &indices {
            if i >= len {
                return Err(DataShapeError::InvalidPermutation {
                    len,
                    reason: format!("index {} out of range", i),
                }
                .into());
            }
            if std::mem::replace(&mut seen[i], true) {
                return Err(DataShapeError::InvalidPermutation {
                    len,
                    reason: format!("index {} repeated", i),
                }
                .into());
            }
        }
        Ok(Self { indices })
    }

    /// Concatenate half-open index ranges that tile `[0, n)`
    pub(crate) fn from_segments<I>(segments: I) -> Self
    where
        I: IntoIterator<Item = std::ops::Range<usize>>,
    {
        Self {
            indices: segments.into_iter().flatten().collect(),
        }
    }

    /// The permutation that undoes this one
    ///
    /// # Examples
    /// ```
    /// use fast_plothic::core::Permutation;
    /// let p = Permutation::from_indices(vec![2, 3, 0, 1]).unwrap();
    /// assert_eq!(p.inverse().as_slice(), &[2, 3, 0, 1]);
    ///
    /// let p = Permutation::from_indices(vec![1, 2, 0]).unwrap();
    /// assert_eq!(p.inverse().as_slice(), &[2, 0, 1]);
    /// ```
    pub fn inverse(&self) -> Self {
        let mut inverse = vec![0; self.indices.len()];
        for (new_pos, &old_pos) in self.indices.iter().enumerate() {
            inverse[old_pos] = new_pos;
        }
        Self { indices: inverse }
    }

    /// New matrix with `result[i, j] = matrix[p[i], p[j]]`
    pub fn apply(&self, matrix: &ContactMatrix) -> ContactMatrix {
        if self.indices.is_empty() {
            return ContactMatrix::zeros((0, 0));
        }
        matrix
            .select(Axis(0), &self.indices)
            .select(Axis(1), &self.indices)
    }

    pub fn as_slice(&self) -> &[usize] {
        &self.indices
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// True when the permutation leaves every index in place
    pub fn is_identity(&self) -> bool {
        self.indices.iter().enumerate().all(|(i, &p)| i == p)
    }
}

/// Output of [`reorder`]
#[derive(Debug, Clone, PartialEq)]
pub struct ReorderedMatrix {
    /// Matrix in display order
    pub matrix: ContactMatrix,
    /// One tick per chromosome, in display order
    pub labels: Vec<LabelPosition>,
    /// Index list that produced `matrix` from the genome-order input
    pub permutation: Permutation,
}

/// Display order from the boundaries' `order_index` fields
///
/// Duplicated order indices are a configuration error.
pub fn target_order_from_boundaries(boundaries: &[BinBoundary]) -> Result<Vec<String>> {
    let mut by_index: Vec<&BinBoundary> = boundaries.iter().collect();
    by_index.sort_by_key(|b| b.order_index);
    for pair in by_index.windows(2) {
        if pair[0].order_index == pair[1].order_index {
            return Err(ConfigurationError::InvalidBoundaries(format!(
                "{} and {} share order index {}",
                pair[0].name, pair[1].name, pair[0].order_index
            ))
            .into());
        }
    }
    Ok(by_index.into_iter().map(|b| b.name.clone()).collect())
}

/// Build the bin-level permutation and tick labels for a target order
///
/// Validates the order completely before anything is allocated.
pub fn plan_reorder(
    boundaries: &[BinBoundary],
    target_order: &[String],
) -> Result<(Permutation, Vec<LabelPosition>)> {
    check_unique_names(boundaries.iter().map(|b| b.name.as_str()))?;
    let mut segments: HashMap<&str, std::ops::Range<usize>> = HashMap::with_capacity(boundaries.len());
    let mut prev_end = 0;
    for b in boundaries {
        segments.insert(b.name.as_str(), prev_end..b.bin_end);
        prev_end = b.bin_end;
    }

    let mut seen: HashSet<&str> = HashSet::with_capacity(target_order.len());
    for name in target_order {
        if !segments.contains_key(name.as_str()) {
            return Err(ConfigurationError::UnknownChromosome(name.clone()).into());
        }
        if !seen.insert(name.as_str()) {
            return Err(ConfigurationError::DuplicateChromosome(name.clone()).into());
        }
    }
    if let Some(missing) = boundaries.iter().find(|b| !seen.contains(b.name.as_str())) {
        return Err(ConfigurationError::MissingChromosome(missing.name.clone()).into());
    }

    let mut labels = Vec::with_capacity(target_order.len());
    let mut position = 0;
    let mut ordered = Vec::with_capacity(target_order.len());
    for name in target_order {
        let range = segments[name.as_str()].clone();
        position += range.len();
        labels.push(LabelPosition {
            name: name.clone(),
            position,
        });
        ordered.push(range);
    }

    Ok((Permutation::from_segments(ordered), labels))
}

/// Reorder a genome-order matrix into `target_order`
///
/// `target_order == None` keeps the genome order and returns genome-order
/// labels. The last boundary must equal the matrix dimension.
///
/// # Examples
/// ```
/// use fast_plothic::core::{reorder, BinBoundary};
/// use ndarray::Array2;
///
/// let matrix = Array2::from_shape_fn((30, 30), |(i, j)| (i + j) as f64);
/// let bins = BinBoundary::from_bin_ends(vec![("chr1", 12), ("chr2", 30)]).unwrap();
/// let order = vec!["chr2".to_string(), "chr1".to_string()];
///
/// let out = reorder(matrix, &bins, Some(order.as_slice())).unwrap();
/// assert_eq!(out.labels[0].position, 18);
/// assert_eq!(out.labels[1].position, 30);
/// assert_eq!(out.matrix[[0, 0]], 24.0);
/// ```
pub fn reorder(
    matrix: ContactMatrix,
    boundaries: &[BinBoundary],
    target_order: Option<&[String]>,
) -> Result<ReorderedMatrix> {
    let (rows, cols) = matrix.dim();
    if rows != cols {
        return Err(DataShapeError::NotSquare { rows, cols }.into());
    }
    let boundary_end = boundaries.last().map(|b| b.bin_end).unwrap_or(0);
    if boundary_end != rows {
        return Err(DataShapeError::BoundaryMismatch {
            boundary_end,
            matrix_dim: rows,
        }
        .into());
    }

    let order = match target_order {
        None => {
            return Ok(ReorderedMatrix {
                matrix,
                labels: genome_labels(boundaries),
                permutation: Permutation::identity(rows),
            })
        }
        Some(order) => order,
    };

    let (permutation, labels) = plan_reorder(boundaries, order)?;
    if permutation.len() != rows {
        return Err(DataShapeError::BoundaryMismatch {
            boundary_end: permutation.len(),
            matrix_dim: rows,
        }
        .into());
    }
    info!("Reordering {} chromosomes: {:?}", order.len(), order);
    let matrix = if permutation.is_identity() {
        matrix
    } else {
        permutation.apply(&matrix)
    };

    Ok(ReorderedMatrix {
        matrix,
        labels,
        permutation,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::PlotHicError;

    fn matrix(n: usize) -> ContactMatrix {
        ContactMatrix::from_shape_fn((n, n), |(i, j)| (i * 100 + j) as f64)
    }

    fn bins() -> Vec<BinBoundary> {
        BinBoundary::from_bin_ends(vec![("chr1", 12), ("chr2", 30)]).unwrap()
    }

    fn order(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_swap_two_chromosomes() {
        let target = order(&["chr2", "chr1"]);
        let out = reorder(matrix(30), &bins(), Some(target.as_slice())).unwrap();

        assert_eq!(out.matrix.dim(), (30, 30));
        // chr2 bins 12..30 come first
        assert_eq!(out.matrix[[0, 0]], matrix(30)[[12, 12]]);
        assert_eq!(out.matrix[[17, 17]], matrix(30)[[29, 29]]);
        // chr1 bins 0..12 follow
        assert_eq!(out.matrix[[18, 18]], matrix(30)[[0, 0]]);
        assert_eq!(out.matrix[[18, 0]], matrix(30)[[0, 12]]);

        assert_eq!(
            out.labels,
            vec![
                LabelPosition { name: "chr2".into(), position: 18 },
                LabelPosition { name: "chr1".into(), position: 30 },
            ]
        );
    }

    #[test]
    fn test_no_target_order_is_identity() {
        let out = reorder(matrix(30), &bins(), None).unwrap();
        assert_eq!(out.matrix, matrix(30));
        assert!(out.permutation.is_identity());
        assert_eq!(out.labels[0].position, 12);
        assert_eq!(out.labels[1].position, 30);
    }

    #[test]
    fn test_unknown_chromosome() {
        let target = order(&["chr2", "chr1", "chr3"]);
        let err = reorder(matrix(30), &bins(), Some(target.as_slice())).unwrap_err();
        assert!(matches!(
            err,
            PlotHicError::Configuration(ConfigurationError::UnknownChromosome(ref name)) if name == "chr3"
        ));
    }

    #[test]
    fn test_missing_chromosome() {
        let target = order(&["chr2"]);
        let err = reorder(matrix(30), &bins(), Some(target.as_slice())).unwrap_err();
        assert!(matches!(
            err,
            PlotHicError::Configuration(ConfigurationError::MissingChromosome(ref name)) if name == "chr1"
        ));
    }

    #[test]
    fn test_duplicate_chromosome() {
        let target = order(&["chr2", "chr2", "chr1"]);
        let err = reorder(matrix(30), &bins(), Some(target.as_slice())).unwrap_err();
        assert!(matches!(
            err,
            PlotHicError::Configuration(ConfigurationError::DuplicateChromosome(_))
        ));
    }

    #[test]
    fn test_boundary_mismatch() {
        let err = reorder(matrix(29), &bins(), None).unwrap_err();
        assert!(matches!(
            err,
            PlotHicError::DataShape(DataShapeError::BoundaryMismatch { boundary_end: 30, matrix_dim: 29 })
        ));
    }

    #[test]
    fn test_not_square() {
        let err = reorder(ContactMatrix::zeros((30, 29)), &bins(), None).unwrap_err();
        assert!(matches!(err, PlotHicError::DataShape(DataShapeError::NotSquare { .. })));
    }

    #[test]
    fn test_zero_width_segment() {
        let bins = BinBoundary::from_bin_ends(vec![("chr1", 4), ("tiny", 4), ("chr2", 10)]).unwrap();
        let target = order(&["tiny", "chr2", "chr1"]);
        let out = reorder(matrix(10), &bins, Some(target.as_slice())).unwrap();
        let positions: Vec<usize> = out.labels.iter().map(|l| l.position).collect();
        assert_eq!(positions, vec![0, 6, 10]);
        assert_eq!(out.permutation.as_slice(), &[4, 5, 6, 7, 8, 9, 0, 1, 2, 3]);
    }

    #[test]
    fn test_inverse_restores() {
        let target = order(&["chr2", "chr1"]);
        let original = matrix(30);
        let out = reorder(original.clone(), &bins(), Some(target.as_slice())).unwrap();
        let restored = out.permutation.inverse().apply(&out.matrix);
        assert_eq!(restored, original);
    }

    #[test]
    fn test_shared_name_in_boundaries_rejected() {
        let bins = vec![BinBoundary::new("chr1", 12, 1), BinBoundary::new("chr1", 30, 2)];
        let target = order(&["chr1"]);
        let err = reorder(matrix(30), &bins, Some(target.as_slice())).unwrap_err();
        assert!(matches!(
            err,
            PlotHicError::Configuration(ConfigurationError::DuplicateChromosome(ref name)) if name == "chr1"
        ));
    }

    #[test]
    fn test_decreasing_bin_ends_rejected() {
        // chr1 covers 0..20 of a 10-bin matrix
        let bins = vec![BinBoundary::new("chr1", 20, 1), BinBoundary::new("chr2", 10, 2)];
        let target = order(&["chr2", "chr1"]);
        let err = reorder(matrix(10), &bins, Some(target.as_slice())).unwrap_err();
        assert!(matches!(
            err,
            PlotHicError::DataShape(DataShapeError::BoundaryMismatch { boundary_end: 20, matrix_dim: 10 })
        ));
    }

    #[test]
    fn test_from_indices_rejects_non_bijection() {
        assert!(Permutation::from_indices(vec![1, 0, 2]).is_ok());
        for bad in [vec![5], vec![0, 0], vec![0, 2]] {
            let err = Permutation::from_indices(bad).unwrap_err();
            assert!(matches!(
                err,
                PlotHicError::DataShape(DataShapeError::InvalidPermutation { .. })
            ));
        }
    }

    #[test]
    fn test_target_order_from_boundaries() {
        let bins = vec![
            BinBoundary::new("chr1", 10, 3),
            BinBoundary::new("chr2", 20, 1),
            BinBoundary::new("chr3", 30, 2),
        ];
        assert_eq!(
            target_order_from_boundaries(&bins).unwrap(),
            order(&["chr2", "chr3", "chr1"])
        );

        let dup = vec![BinBoundary::new("chr1", 10, 1), BinBoundary::new("chr2", 20, 1)];
        assert!(target_order_from_boundaries(&dup).is_err());
    }
}
