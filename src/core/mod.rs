//! Core contact matrix functionality
//!
//! This module contains the range query source contract, resolution
//! negotiation, the tiled matrix assembler, chromosome boundary mapping
//! and the matrix reorderer.

mod assembler;
pub mod error;
pub mod io;
mod layout;
mod pipeline;
mod reorder;
mod resolution;
mod source;

pub use assembler::{
    nonempty_bins, AssemblerConfig, ContactMatrix, TileBounds, TilePlan, TiledMatrixAssembler,
    TrimPolicy, QUERY_TILE_BINS,
};
pub use error::{
    ConfigurationError, DataShapeError, ParseError, PlotHicError, Result, SourceError, SourceResult,
};
pub use io::{
    create_writer, detect_compression, ByteLineIterator, CompressionFormat, IoStrategy,
    LineIterator, SmartReader, DEFAULT_BUFFER_SIZE, LARGE_BUFFER_SIZE, MMAP_THRESHOLD,
};
pub use layout::{
    genome_labels, map_boundaries, scale_round_half_up, validate_bp_boundaries, BinBoundary,
    ChromosomeBoundary, LabelPosition,
};
pub use pipeline::{build_genome_contact, build_hicpro_contact, GenomeContactMap, GenomeContactRequest};
pub use reorder::{plan_reorder, reorder, target_order_from_boundaries, Permutation, ReorderedMatrix};
pub use resolution::{negotiate_resolution, FallbackPolicy, ResolutionChoice, DEFAULT_RESOLUTION_RANK};
pub use source::{
    bin_span, DataType, DenseSource, Normalization, QueryOptions, RangeQuerySource,
    SparseContactSource, SubmatrixQuery, ASSEMBLY_CHROM,
};
