//! End-to-end contact map construction
//!
//! `.hic`-style sources go through resolution negotiation, tiled assembly,
//! boundary mapping and (optionally) reordering. HiC-Pro matrices already
//! carry bin boundaries, so only the reordering stage applies to them.

use crate::core::assembler::{AssemblerConfig, ContactMatrix, TiledMatrixAssembler};
use crate::core::error::{ConfigurationError, Result};
use crate::core::layout::{map_boundaries, validate_bp_boundaries, BinBoundary, ChromosomeBoundary, LabelPosition};
use crate::core::reorder::{reorder, target_order_from_boundaries};
use crate::core::resolution::{negotiate_resolution, FallbackPolicy, ResolutionChoice};
use crate::core::source::RangeQuerySource;
use log::info;

/// Everything needed to build one whole-genome contact map
#[derive(Debug, Clone, Default)]
pub struct GenomeContactRequest {
    /// Requested bin size; `None` picks the default rank
    pub resolution: Option<u32>,
    /// Genome extent in bp; defaults to the last boundary or the source length
    pub extent: Option<u64>,
    /// Chromosome ends in genome order; may be empty
    pub boundaries: Vec<ChromosomeBoundary>,
    /// Reorder chromosomes by their `order_index`
    pub reorder: bool,
    pub fallback: FallbackPolicy,
    pub assembler: AssemblerConfig,
}

/// A finished contact map
#[derive(Debug, Clone, PartialEq)]
pub struct GenomeContactMap {
    /// Negotiated resolution; `None` for inputs that are already binned
    pub resolution: Option<ResolutionChoice>,
    /// Matrix in display order
    pub matrix: ContactMatrix,
    /// Chromosome ticks in display order
    pub labels: Vec<LabelPosition>,
    /// Bin boundaries in genome order
    pub bins: Vec<BinBoundary>,
}

/// Build a contact map from a range query source
///
/// The request is validated completely before the first query is issued.
pub fn build_genome_contact<S: RangeQuerySource + ?Sized>(
    source: &S,
    request: &GenomeContactRequest,
) -> Result<GenomeContactMap> {
    if !request.boundaries.is_empty() {
        validate_bp_boundaries(&request.boundaries)?;
    }
    if request.reorder && request.boundaries.is_empty() {
        return Err(ConfigurationError::InvalidBoundaries(
            "reordering needs chromosome boundaries".to_string(),
        )
        .into());
    }

    let extent = match (request.extent, request.boundaries.last()) {
        (Some(extent), _) => extent,
        (None, Some(last)) => last.bp_end,
        (None, None) => source.assembly_length()?,
    };
    if extent == 0 {
        return Err(ConfigurationError::InvalidExtent(extent).into());
    }
    if let Some(last) = request.boundaries.last() {
        if last.bp_end != extent {
            return Err(ConfigurationError::InvalidBoundaries(format!(
                "last chromosome {} ends at {} bp but the genome extent is {} bp",
                last.name, last.bp_end, extent
            ))
            .into());
        }
    }
    let target_order = if request.reorder {
        // Order indices are checked before any query is spent
        let placeholder: Vec<BinBoundary> = request
            .boundaries
            .iter()
            .map(|b| BinBoundary::new(b.name.clone(), 0, b.order_index))
            .collect();
        Some(target_order_from_boundaries(&placeholder)?)
    } else {
        None
    };

    let choice = negotiate_resolution(&source.resolutions(), request.resolution, request.fallback)?;
    let assembler = TiledMatrixAssembler::new(request.assembler);
    // Fail on bad tile settings before querying
    assembler.plan(choice.resolution, extent)?;

    let matrix = assembler.assemble(source, choice.resolution, extent)?;
    let dim = matrix.nrows();

    let bins = if request.boundaries.is_empty() {
        BinBoundary::from_bin_ends(vec![("genome".to_string(), dim)])?
    } else {
        map_boundaries(&request.boundaries, dim, extent)?
    };
    info!("Mapped {} chromosome boundaries onto {} bins", bins.len(), dim);

    let reordered = reorder(matrix, &bins, target_order.as_deref())?;
    Ok(GenomeContactMap {
        resolution: Some(choice),
        matrix: reordered.matrix,
        labels: reordered.labels,
        bins,
    })
}

/// Reorder an already binned matrix (HiC-Pro input)
pub fn build_hicpro_contact(
    matrix: ContactMatrix,
    bins: Vec<BinBoundary>,
    target_order: Option<&[String]>,
) -> Result<GenomeContactMap> {
    let reordered = reorder(matrix, &bins, target_order)?;
    Ok(GenomeContactMap {
        resolution: None,
        matrix: reordered.matrix,
        labels: reordered.labels,
        bins,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::PlotHicError;
    use crate::core::source::DenseSource;
    use crate::core::TrimPolicy;

    fn source() -> DenseSource {
        let chroms = vec![("chr1".to_string(), 1000), ("chr2".to_string(), 2000)];
        let matrix = ContactMatrix::from_shape_fn((30, 30), |(i, j)| 1.0 + (i + j) as f64);
        DenseSource::new(chroms)
            .with_matrix(100, matrix)
            .with_matrix(1000, ContactMatrix::ones((3, 3)))
    }

    fn boundaries() -> Vec<ChromosomeBoundary> {
        vec![
            ChromosomeBoundary::new("chr1", 1000, 2),
            ChromosomeBoundary::new("chr2", 3000, 1),
        ]
    }

    fn request() -> GenomeContactRequest {
        GenomeContactRequest {
            resolution: Some(100),
            boundaries: boundaries(),
            assembler: AssemblerConfig {
                tile_bins: 4,
                ..AssemblerConfig::default()
            },
            ..GenomeContactRequest::default()
        }
    }

    #[test]
    fn test_genome_order() {
        let map = build_genome_contact(&source(), &request()).unwrap();
        assert_eq!(map.matrix.dim(), (30, 30));
        assert_eq!(map.bins[0].bin_end, 10);
        assert_eq!(map.labels[1].position, 30);
        assert_eq!(map.resolution.map(|c| c.resolution), Some(100));
    }

    #[test]
    fn test_reordered() {
        let req = GenomeContactRequest {
            reorder: true,
            ..request()
        };
        let map = build_genome_contact(&source(), &req).unwrap();
        assert_eq!(map.labels[0].name, "chr2");
        assert_eq!(map.labels[0].position, 20);
        assert_eq!(map.labels[1].position, 30);
        // chr2 starts at genome bin 10
        assert_eq!(map.matrix[[0, 0]], 21.0);
    }

    #[test]
    fn test_extent_defaults_to_source() {
        let req = GenomeContactRequest {
            resolution: Some(1000),
            ..GenomeContactRequest::default()
        };
        let map = build_genome_contact(&source(), &req).unwrap();
        assert_eq!(map.matrix.dim(), (3, 3));
        assert_eq!(map.labels.len(), 1);
    }

    #[test]
    fn test_invalid_request_issues_no_query() {
        let src = source();
        let req = GenomeContactRequest {
            boundaries: vec![
                ChromosomeBoundary::new("chr1", 1000, 1),
                ChromosomeBoundary::new("chr2", 3000, 1),
            ],
            reorder: true,
            ..request()
        };
        assert!(build_genome_contact(&src, &req).is_err());
        assert_eq!(src.query_count(), 0);

        let req = GenomeContactRequest {
            resolution: Some(250),
            fallback: FallbackPolicy::Strict,
            ..request()
        };
        let err = build_genome_contact(&src, &req).unwrap_err();
        assert!(matches!(
            err,
            PlotHicError::Configuration(ConfigurationError::UnsupportedResolution { .. })
        ));
        assert_eq!(src.query_count(), 0);
    }

    #[test]
    fn test_extent_past_boundaries_issues_no_query() {
        let src = source();
        let req = GenomeContactRequest {
            extent: Some(4000),
            ..request()
        };
        let err = build_genome_contact(&src, &req).unwrap_err();
        assert!(matches!(
            err,
            PlotHicError::Configuration(ConfigurationError::InvalidBoundaries(_))
        ));
        assert_eq!(src.query_count(), 0);
    }

    #[test]
    fn test_padding_trim() {
        let req = GenomeContactRequest {
            assembler: AssemblerConfig {
                tile_bins: 4,
                trim: TrimPolicy::Keep,
                ..AssemblerConfig::default()
            },
            ..request()
        };
        let map = build_genome_contact(&source(), &req).unwrap();
        assert_eq!(map.matrix.dim(), (32, 32));
        // 1000 * 32 / 3000 = 10.67 -> 11
        assert_eq!(map.bins[0].bin_end, 11);
        assert_eq!(map.bins[1].bin_end, 32);
    }

    #[test]
    fn test_hicpro_contact() {
        let bins = BinBoundary::from_bin_ends(vec![("chr1", 2), ("chr2", 3)]).unwrap();
        let matrix = ContactMatrix::from_shape_fn((3, 3), |(i, j)| (i * 3 + j) as f64);
        let order = vec!["chr2".to_string(), "chr1".to_string()];
        let map = build_hicpro_contact(matrix, bins, Some(order.as_slice())).unwrap();
        assert!(map.resolution.is_none());
        assert_eq!(map.matrix[[0, 0]], 8.0);
        assert_eq!(map.labels[0].position, 1);
        assert_eq!(map.labels[1].position, 3);
    }
}
