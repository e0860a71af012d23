//! Range query sources
//!
//! A contact source answers "dense sub-matrix for rows x columns at a fixed
//! resolution" queries, and each query is bounded in size. The assembler
//! only talks to sources through [`RangeQuerySource`]; the handle is borrowed
//! for the duration of one assembly and never stored.
//!
//! Coordinates are base pairs, half-open. A query `[start, end)` covers bins
//! `floor(start / res) .. ceil(end / res)`.

use crate::core::error::{SourceError, SourceResult};
use ndarray::{s, Array2};
use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};

/// Name of the pseudo-chromosome spanning the whole assembly
pub const ASSEMBLY_CHROM: &str = "assembly";

/// Kind of contact values requested from the source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub enum DataType {
    #[default]
    Observed,
    Expected,
    ObservedOverExpected,
}

impl DataType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DataType::Observed => "observed",
            DataType::Expected => "expected",
            DataType::ObservedOverExpected => "oe",
        }
    }
}

impl std::fmt::Display for DataType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Normalization method applied by the source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub enum Normalization {
    #[default]
    None,
    Vc,
    VcSqrt,
    Kr,
    Scale,
}

impl Normalization {
    pub fn as_str(&self) -> &'static str {
        match self {
            Normalization::None => "NONE",
            Normalization::Vc => "VC",
            Normalization::VcSqrt => "VC_SQRT",
            Normalization::Kr => "KR",
            Normalization::Scale => "SCALE",
        }
    }
}

impl std::fmt::Display for Normalization {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Data type and normalization passed with every query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct QueryOptions {
    pub data_type: DataType,
    pub normalization: Normalization,
}

/// One bounded sub-matrix request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubmatrixQuery {
    pub row_start: u64,
    pub row_end: u64,
    pub col_start: u64,
    pub col_end: u64,
    pub resolution: u32,
    pub options: QueryOptions,
}

impl SubmatrixQuery {
    /// Shape the source must return: `(row bins, column bins)`
    pub fn expected_shape(&self) -> (usize, usize) {
        (
            bin_span(self.row_start, self.row_end, self.resolution),
            bin_span(self.col_start, self.col_end, self.resolution),
        )
    }

    /// First row bin and first column bin covered by the query
    pub fn first_bins(&self) -> (usize, usize) {
        let res = self.resolution as u64;
        ((self.row_start / res) as usize, (self.col_start / res) as usize)
    }
}

/// Number of bins touched by `[start, end)` at `resolution`
///
/// # Examples
/// ```
/// use fast_plothic::core::bin_span;
/// assert_eq!(bin_span(0, 400, 100), 4);
/// assert_eq!(bin_span(2800, 3000, 100), 2);
/// assert_eq!(bin_span(0, 250, 100), 3);
/// assert_eq!(bin_span(100, 100, 100), 0);
/// ```
#[inline]
pub fn bin_span(start: u64, end: u64, resolution: u32) -> usize {
    let res = resolution as u64;
    if end <= start {
        return 0;
    }
    (end.div_ceil(res) - start / res) as usize
}

/// An opaque contact data source answering bounded range queries
pub trait RangeQuerySource {
    /// Resolutions (bp per bin) this source can serve
    fn resolutions(&self) -> Vec<u32>;

    /// Chromosome name -> length in bp, in source order
    fn chromosome_lengths(&self) -> Vec<(String, u64)>;

    /// Dense sub-matrix for the query, shaped `query.expected_shape()`
    fn submatrix(&self, query: &SubmatrixQuery) -> SourceResult<Array2<f64>>;

    /// Total assembly length in bp
    ///
    /// Uses the `assembly` pseudo-chromosome when present, otherwise the
    /// sum of all chromosome lengths.
    fn assembly_length(&self) -> SourceResult<u64> {
        let lengths = self.chromosome_lengths();
        if let Some((_, len)) = lengths.iter().find(|(name, _)| name == ASSEMBLY_CHROM) {
            return Ok(*len);
        }
        if lengths.is_empty() {
            return Err(SourceError::Range("source reports no chromosomes".to_string()));
        }
        Ok(lengths.iter().map(|(_, len)| *len).sum())
    }
}

/// Bounds checks shared by the bundled sources
fn validate_query(
    query: &SubmatrixQuery,
    assembly_length: u64,
    query_limit: Option<usize>,
) -> SourceResult<()> {
    if query.options.data_type != DataType::Observed
        || query.options.normalization != Normalization::None
    {
        return Err(SourceError::UnsupportedQuery(format!(
            "{} / {} (only observed / NONE available)",
            query.options.data_type, query.options.normalization
        )));
    }
    if query.row_start > query.row_end || query.col_start > query.col_end {
        return Err(SourceError::Range(format!(
            "start after end in query {}-{} x {}-{}",
            query.row_start, query.row_end, query.col_start, query.col_end
        )));
    }
    if query.row_end > assembly_length || query.col_end > assembly_length {
        return Err(SourceError::Range(format!(
            "query {}-{} x {}-{} exceeds assembly length {}",
            query.row_start, query.row_end, query.col_start, query.col_end, assembly_length
        )));
    }
    if let Some(limit) = query_limit {
        let (rows, cols) = query.expected_shape();
        if rows > limit || cols > limit {
            return Err(SourceError::Range(format!(
                "query of {}x{} bins exceeds the {}-bin query limit",
                rows, cols, limit
            )));
        }
    }
    Ok(())
}

/// In-memory source backed by one dense bin matrix per resolution
///
/// Records every query it answers, which makes it useful for checking the
/// order and bounds of the assembler's tile requests.
pub struct DenseSource {
    chromosomes: Vec<(String, u64)>,
    matrices: HashMap<u32, Array2<f64>>,
    query_limit: Option<usize>,
    queries: RefCell<Vec<SubmatrixQuery>>,
}

impl DenseSource {
    /// Create a source over the given chromosomes (genome order)
    pub fn new(chromosomes: Vec<(String, u64)>) -> Self {
        Self {
            chromosomes,
            matrices: HashMap::new(),
            query_limit: None,
            queries: RefCell::new(Vec::new()),
        }
    }

    /// Register the full bin matrix for a resolution
    pub fn with_matrix(mut self, resolution: u32, matrix: Array2<f64>) -> Self {
        self.matrices.insert(resolution, matrix);
        self
    }

    /// Limit each query to `bins` bins per axis
    pub fn with_query_limit(mut self, bins: usize) -> Self {
        self.query_limit = Some(bins);
        self
    }

    /// Queries answered so far, in call order
    pub fn queries(&self) -> Vec<SubmatrixQuery> {
        self.queries.borrow().clone()
    }

    /// Number of queries answered so far
    pub fn query_count(&self) -> usize {
        self.queries.borrow().len()
    }
}

impl RangeQuerySource for DenseSource {
    fn resolutions(&self) -> Vec<u32> {
        let mut res: Vec<u32> = self.matrices.keys().copied().collect();
        res.sort_unstable_by(|a, b| b.cmp(a));
        res
    }

    fn chromosome_lengths(&self) -> Vec<(String, u64)> {
        self.chromosomes.clone()
    }

    fn submatrix(&self, query: &SubmatrixQuery) -> SourceResult<Array2<f64>> {
        let matrix = self.matrices.get(&query.resolution).ok_or_else(|| {
            SourceError::UnsupportedQuery(format!("resolution {}", query.resolution))
        })?;
        validate_query(query, self.assembly_length()?, self.query_limit)?;

        let (rows, cols) = query.expected_shape();
        let (row0, col0) = query.first_bins();
        let mut tile = Array2::<f64>::zeros((rows, cols));

        // Bins past the stored matrix read as zero
        let row1 = (row0 + rows).min(matrix.nrows());
        let col1 = (col0 + cols).min(matrix.ncols());
        if row0 < row1 && col0 < col1 {
            tile.slice_mut(s![..row1 - row0, ..col1 - col0])
                .assign(&matrix.slice(s![row0..row1, col0..col1]));
        }

        self.queries.borrow_mut().push(*query);
        Ok(tile)
    }
}

/// Sparse contact source keyed by bin pairs, one table per resolution
///
/// Contacts are stored symmetrically, so inserting `(i, j)` also answers
/// queries for `(j, i)`.
pub struct SparseContactSource {
    chromosomes: Vec<(String, u64)>,
    contacts: BTreeMap<u32, BTreeMap<(usize, usize), f64>>,
    query_limit: Option<usize>,
}

impl SparseContactSource {
    pub fn new(chromosomes: Vec<(String, u64)>) -> Self {
        Self {
            chromosomes,
            contacts: BTreeMap::new(),
            query_limit: None,
        }
    }

    /// Limit each query to `bins` bins per axis
    pub fn with_query_limit(mut self, bins: usize) -> Self {
        self.query_limit = Some(bins);
        self
    }

    /// Declare a resolution even if it holds no contacts yet
    pub fn add_resolution(&mut self, resolution: u32) {
        self.contacts.entry(resolution).or_default();
    }

    /// Set the contact value between two bins at a resolution
    pub fn insert_contact(&mut self, resolution: u32, bin_a: usize, bin_b: usize, value: f64) {
        let table = self.contacts.entry(resolution).or_default();
        table.insert((bin_a, bin_b), value);
        table.insert((bin_b, bin_a), value);
    }

    /// Number of stored (directed) bin pairs at a resolution
    pub fn contact_count(&self, resolution: u32) -> usize {
        self.contacts.get(&resolution).map(|t| t.len()).unwrap_or(0)
    }
}

impl RangeQuerySource for SparseContactSource {
    fn resolutions(&self) -> Vec<u32> {
        self.contacts.keys().rev().copied().collect()
    }

    fn chromosome_lengths(&self) -> Vec<(String, u64)> {
        self.chromosomes.clone()
    }

    fn submatrix(&self, query: &SubmatrixQuery) -> SourceResult<Array2<f64>> {
        let table = self.contacts.get(&query.resolution).ok_or_else(|| {
            SourceError::UnsupportedQuery(format!("resolution {}", query.resolution))
        })?;
        validate_query(query, self.assembly_length()?, self.query_limit)?;

        let (rows, cols) = query.expected_shape();
        let (row0, col0) = query.first_bins();
        let mut tile = Array2::<f64>::zeros((rows, cols));
        if rows == 0 || cols == 0 {
            return Ok(tile);
        }

        for (&(i, j), &value) in table.range((row0, 0)..(row0 + rows, 0)) {
            if j >= col0 && j < col0 + cols {
                tile[[i - row0, j - col0]] = value;
            }
        }
        Ok(tile)
    }
}
