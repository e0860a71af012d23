//! Error types for FastPlotHiC
//!
//! Defines all error types used throughout the library. Assembly and
//! reordering are all-or-nothing: every error surfaces to the caller and no
//! partial matrix is ever returned.

use thiserror::Error;

/// Main error type for FastPlotHiC operations
#[derive(Debug, Error)]
pub enum PlotHicError {
    /// Invalid request or chromosome layout
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    /// A bounded range query against the contact source failed
    #[error("Source query error: {0}")]
    SourceQuery(#[from] SourceError),

    /// Matrix or tile dimensions disagree with what was requested
    #[error("Data shape error: {0}")]
    DataShape(#[from] DataShapeError),

    /// Auxiliary text file parsing errors
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Invalid requests: resolution, extent or chromosome order problems
#[derive(Debug, Error)]
pub enum ConfigurationError {
    /// Requested resolution is not offered and fallback is disabled
    #[error("Resolution {requested} not in {available:?}")]
    UnsupportedResolution { requested: u32, available: Vec<u32> },

    /// The source reports no resolutions at all
    #[error("Contact source reports no resolutions")]
    NoResolutions,

    /// Extent must be a positive number of base pairs
    #[error("Invalid matrix extent: {0} bp")]
    InvalidExtent(u64),

    /// Tile size must be a positive number of bins
    #[error("Invalid query tile size: {0} bins")]
    InvalidTileSize(usize),

    /// Target order names a chromosome absent from the boundaries
    #[error("Chromosome in target order not found in boundaries: {0}")]
    UnknownChromosome(String),

    /// Target order omits a chromosome present in the boundaries
    #[error("Chromosome missing from target order: {0}")]
    MissingChromosome(String),

    /// Target order lists the same chromosome more than once
    #[error("Chromosome listed more than once in target order: {0}")]
    DuplicateChromosome(String),

    /// Boundaries are empty, decreasing, or do not end at the extent
    #[error("Invalid chromosome boundaries: {0}")]
    InvalidBoundaries(String),
}

/// Errors raised by a range query source
#[derive(Debug, Error)]
pub enum SourceError {
    /// Query bounds exceed the assembly extent or the per-query limit
    #[error("Range error: {0}")]
    Range(String),

    /// Data type / normalization / resolution the source cannot serve
    #[error("Unsupported query: {0}")]
    UnsupportedQuery(String),

    /// I/O error while reading contact data
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Dimension mismatches between what was asked for and what was produced
#[derive(Debug, Error)]
pub enum DataShapeError {
    /// A fetched tile does not have the requested bin span
    #[error("Tile shape mismatch at rows {row_start}-{row_end}, cols {col_start}-{col_end}: expected {expected:?}, got {actual:?}")]
    TileShape {
        row_start: u64,
        row_end: u64,
        col_start: u64,
        col_end: u64,
        expected: (usize, usize),
        actual: (usize, usize),
    },

    /// Contact matrix is not square
    #[error("Contact matrix is not square: {rows}x{cols}")]
    NotSquare { rows: usize, cols: usize },

    /// Bin boundaries do not cover the matrix exactly
    #[error("Bin boundaries end at {boundary_end} but matrix dimension is {matrix_dim}")]
    BoundaryMismatch { boundary_end: usize, matrix_dim: usize },

    /// Index list is not a bijection over `[0, len)`
    #[error("Not a permutation of 0..{len}: {reason}")]
    InvalidPermutation { len: usize, reason: String },

    /// Sparse entry falls outside the declared matrix
    #[error("Entry ({row}, {col}) outside {dim}x{dim} matrix")]
    EntryOutOfBounds { row: usize, col: usize, dim: usize },
}

/// Errors that can occur while parsing auxiliary text files
#[derive(Debug, Error)]
#[error("Line {line}: {message}")]
pub struct ParseError {
    /// Line number where the error occurred (1-based; 0 for whole-file errors)
    pub line: usize,
    /// Human-readable error message
    pub message: String,
}

impl ParseError {
    pub fn new(line: usize, message: impl Into<String>) -> Self {
        Self {
            line,
            message: message.into(),
        }
    }

    /// Create an invalid number error
    pub fn invalid_number(field: &str, value: &str, line: usize) -> Self {
        Self::new(line, format!("Invalid {} '{}'", field, value))
    }
}

/// Result type alias for FastPlotHiC operations
pub type Result<T> = std::result::Result<T, PlotHicError>;

/// Result type alias for source queries
pub type SourceResult<T> = std::result::Result<T, SourceError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configuration_error_display() {
        let err = ConfigurationError::UnsupportedResolution {
            requested: 123,
            available: vec![1000, 500],
        };
        assert_eq!(err.to_string(), "Resolution 123 not in [1000, 500]");
    }

    #[test]
    fn test_from_conversions() {
        let err: PlotHicError = ConfigurationError::UnknownChromosome("chr9".into()).into();
        assert!(matches!(err, PlotHicError::Configuration(_)));

        let err: PlotHicError = SourceError::Range("too wide".into()).into();
        assert!(matches!(err, PlotHicError::SourceQuery(_)));
    }

    #[test]
    fn test_parse_error_display() {
        let err = ParseError::invalid_number("bin index", "abc", 7);
        assert_eq!(err.to_string(), "Line 7: Invalid bin index 'abc'");
    }
}
