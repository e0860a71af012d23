//! FastPlotHiC - whole-genome Hi-C contact maps from bounded range queries
//!
//! Builds a dense whole-genome contact matrix from a source that only
//! answers size-limited sub-matrix queries, maps chromosome boundaries onto
//! the realized matrix, and reorders chromosomes for display.
//!
//! # Features
//!
//! - Deterministic tiled assembly with exact integer tile edges
//! - Explicit resolution fallback policy
//! - Chromosome reordering as a single symmetric permutation
//! - HiC-Pro, Juicebox assembly and contact dump inputs (gzip, bzip2)
//!
//! # Example
//!
//! ```
//! use fast_plothic::core::{
//!     build_genome_contact, ChromosomeBoundary, DenseSource, GenomeContactRequest,
//! };
//! use ndarray::Array2;
//!
//! let source = DenseSource::new(vec![("chr1".into(), 1000), ("chr2".into(), 2000)])
//!     .with_matrix(100, Array2::ones((30, 30)));
//! let request = GenomeContactRequest {
//!     resolution: Some(100),
//!     boundaries: vec![
//!         ChromosomeBoundary::new("chr1", 1000, 2),
//!         ChromosomeBoundary::new("chr2", 3000, 1),
//!     ],
//!     reorder: true,
//!     ..GenomeContactRequest::default()
//! };
//!
//! let map = build_genome_contact(&source, &request).unwrap();
//! assert_eq!(map.matrix.dim(), (30, 30));
//! assert_eq!(map.labels[0].name, "chr2");
//! ```

pub mod core;
pub mod formats;
