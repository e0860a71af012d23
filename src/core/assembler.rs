//! Tiled whole-genome matrix assembly
//!
//! A contact source refuses queries wider than `resolution * tile_bins` base
//! pairs. To materialize `[0, extent) x [0, extent)` the assembler:
//! 1. Splits the extent into an evenly spaced grid of bin-aligned tiles
//! 2. Queries every (row tile, column tile) cell in row-major order
//! 3. Writes each tile at its global offset in a padded dense matrix
//! 4. Removes the alignment padding according to [`TrimPolicy`]
//!
//! Tile edges are computed with exact integer arithmetic, so the same
//! request always produces the same grid and a bit-identical matrix.

use crate::core::error::{ConfigurationError, DataShapeError, Result};
use crate::core::source::{bin_span, QueryOptions, RangeQuerySource, SubmatrixQuery};
use log::{debug, info};
use ndarray::{s, Array2, Axis};
use rayon::prelude::*;

/// Dense, square contact matrix in bin coordinates
pub type ContactMatrix = Array2<f64>;

/// Maximum bins per axis in a single source query
pub const QUERY_TILE_BINS: usize = 1400;

/// How alignment padding is removed after tiled assembly
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TrimPolicy {
    /// Drop every bin whose row and column are both entirely zero
    #[default]
    EmptyBins,
    /// Cut the matrix to exactly `ceil(extent / resolution)` bins
    Padding,
    /// Return the padded, grid-aligned matrix untouched
    Keep,
}

/// Assembler settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AssemblerConfig {
    /// Bins per axis per query
    pub tile_bins: usize,
    /// Padding removal after tiled assembly
    pub trim: TrimPolicy,
    /// Data type and normalization for every query
    pub query: QueryOptions,
}

impl Default for AssemblerConfig {
    fn default() -> Self {
        Self {
            tile_bins: QUERY_TILE_BINS,
            trim: TrimPolicy::default(),
            query: QueryOptions::default(),
        }
    }
}

/// One tile edge along either axis
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileBounds {
    /// First bin (inclusive)
    pub bin_start: usize,
    /// Last bin (exclusive)
    pub bin_end: usize,
    /// First base pair (inclusive)
    pub bp_start: u64,
    /// Last base pair (exclusive), clipped to the extent
    pub bp_end: u64,
}

impl TileBounds {
    pub fn len(&self) -> usize {
        self.bin_end - self.bin_start
    }

    pub fn is_empty(&self) -> bool {
        self.bin_end == self.bin_start
    }
}

/// Query grid for one `(resolution, extent)` request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TilePlan {
    pub resolution: u32,
    pub extent: u64,
    /// `ceil(extent / resolution)`
    pub total_bins: usize,
    /// Tiles per axis; 1 when the extent fits in a single query
    pub tile_count: usize,
    /// Bins per tile (the last tile may be shorter)
    pub tile_width: usize,
}

impl TilePlan {
    /// Lay out the grid for a request
    ///
    /// # Examples
    /// ```
    /// use fast_plothic::core::TilePlan;
    ///
    /// let plan = TilePlan::new(100, 3000, 4).unwrap();
    /// assert_eq!(plan.tile_count, 8);
    /// assert_eq!(plan.tile_width, 4);
    /// assert_eq!(plan.padded_dim(), 32);
    /// ```
    pub fn new(resolution: u32, extent: u64, tile_bins: usize) -> Result<Self> {
        if extent == 0 {
            return Err(ConfigurationError::InvalidExtent(extent).into());
        }
        if tile_bins == 0 {
            return Err(ConfigurationError::InvalidTileSize(tile_bins).into());
        }
        if resolution == 0 {
            return Err(ConfigurationError::UnsupportedResolution {
                requested: resolution,
                available: vec![],
            }
            .into());
        }

        let total_bins = bin_span(0, extent, resolution);
        let max_span = resolution as u64 * tile_bins as u64;
        if extent <= max_span {
            return Ok(Self {
                resolution,
                extent,
                total_bins,
                tile_count: 1,
                tile_width: total_bins,
            });
        }

        let tile_count = (extent / max_span) as usize + 1;
        // ceil(total / count) <= tile_bins because count * tile_bins > extent / res
        let tile_width = total_bins.div_ceil(tile_count);
        Ok(Self {
            resolution,
            extent,
            total_bins,
            tile_count,
            tile_width,
        })
    }

    /// True when the whole extent is fetched with one query
    pub fn is_single(&self) -> bool {
        self.tile_count == 1
    }

    /// Dimension of the grid-aligned matrix before trimming
    pub fn padded_dim(&self) -> usize {
        self.tile_count * self.tile_width
    }

    /// Tile edges along one axis, in index order
    pub fn bounds(&self) -> Vec<TileBounds> {
        let res = self.resolution as u64;
        (0..self.tile_count)
            .map(|k| {
                let bin_start = (k * self.tile_width).min(self.total_bins);
                let bin_end = ((k + 1) * self.tile_width).min(self.total_bins);
                TileBounds {
                    bin_start,
                    bin_end,
                    bp_start: (bin_start as u64 * res).min(self.extent),
                    bp_end: (bin_end as u64 * res).min(self.extent),
                }
            })
            .collect()
    }
}

/// Assembles a whole-genome matrix from bounded range queries
#[derive(Debug, Clone, Default)]
pub struct TiledMatrixAssembler {
    config: AssemblerConfig,
}

impl TiledMatrixAssembler {
    pub fn new(config: AssemblerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AssemblerConfig {
        &self.config
    }

    /// Grid that `assemble` would use for this request
    pub fn plan(&self, resolution: u32, extent: u64) -> Result<TilePlan> {
        TilePlan::new(resolution, extent, self.config.tile_bins)
    }

    /// Materialize `[0, extent) x [0, extent)` at `resolution`
    ///
    /// The resolution must already be one the source supports (see
    /// [`negotiate_resolution`](crate::core::negotiate_resolution)). Source
    /// failures are returned unchanged; a wrongly shaped tile aborts with
    /// [`DataShapeError::TileShape`].
    pub fn assemble<S: RangeQuerySource + ?Sized>(
        &self,
        source: &S,
        resolution: u32,
        extent: u64,
    ) -> Result<ContactMatrix> {
        let plan = self.plan(resolution, extent)?;

        if plan.is_single() {
            info!("Extracting {} bp at {} bp resolution in one query", extent, resolution);
            let query = self.query(0, extent, 0, extent, resolution);
            return self.fetch(source, &query);
        }

        info!(
            "Extracting {} bp at {} bp resolution in {}x{} tiles of {} bins",
            extent, resolution, plan.tile_count, plan.tile_count, plan.tile_width
        );
        let bounds = plan.bounds();
        let padded_dim = plan.padded_dim();
        let mut matrix = ContactMatrix::zeros((padded_dim, padded_dim));

        for row in &bounds {
            for col in &bounds {
                if row.is_empty() || col.is_empty() {
                    continue;
                }
                let query = self.query(row.bp_start, row.bp_end, col.bp_start, col.bp_end, resolution);
                debug!(
                    "Tile rows {}-{} cols {}-{}",
                    query.row_start, query.row_end, query.col_start, query.col_end
                );
                let tile = self.fetch(source, &query)?;
                matrix
                    .slice_mut(s![row.bin_start..row.bin_end, col.bin_start..col.bin_end])
                    .assign(&tile);
            }
        }

        let trimmed = match self.config.trim {
            TrimPolicy::Keep => matrix,
            TrimPolicy::Padding => matrix
                .slice(s![..plan.total_bins, ..plan.total_bins])
                .to_owned(),
            TrimPolicy::EmptyBins => {
                let keep = nonempty_bins(&matrix);
                if keep.is_empty() {
                    ContactMatrix::zeros((0, 0))
                } else {
                    matrix.select(Axis(0), &keep).select(Axis(1), &keep)
                }
            }
        };
        info!(
            "Assembled {}x{} matrix (padded {}x{})",
            trimmed.nrows(),
            trimmed.ncols(),
            padded_dim,
            padded_dim
        );
        Ok(trimmed)
    }

    fn query(&self, row_start: u64, row_end: u64, col_start: u64, col_end: u64, resolution: u32) -> SubmatrixQuery {
        SubmatrixQuery {
            row_start,
            row_end,
            col_start,
            col_end,
            resolution,
            options: self.config.query,
        }
    }

    fn fetch<S: RangeQuerySource + ?Sized>(&self, source: &S, query: &SubmatrixQuery) -> Result<ContactMatrix> {
        let tile = source.submatrix(query)?;
        let expected = query.expected_shape();
        if tile.dim() != expected {
            return Err(DataShapeError::TileShape {
                row_start: query.row_start,
                row_end: query.row_end,
                col_start: query.col_start,
                col_end: query.col_end,
                expected,
                actual: tile.dim(),
            }
            .into());
        }
        Ok(tile)
    }
}

/// Indices whose row or column holds at least one non-zero value
///
/// A bin is dropped only when both its row and its column are entirely
/// zero, so applying the result to both axes keeps the matrix square.
pub fn nonempty_bins(matrix: &ContactMatrix) -> Vec<usize> {
    let dim = matrix.nrows().min(matrix.ncols());
    let keep: Vec<bool> = (0..dim)
        .into_par_iter()
        .map(|i| {
            matrix.row(i).iter().any(|&v| v != 0.0) || matrix.column(i).iter().any(|&v| v != 0.0)
        })
        .collect();
    keep.iter()
        .enumerate()
        .filter_map(|(i, &k)| if k { Some(i) } else { None })
        .collect()
}
