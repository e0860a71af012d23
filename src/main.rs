//! FastPlotHiC CLI entry point
//!
//! Builds whole-genome Hi-C contact maps and writes them as a dense matrix
//! plus chromosome tick labels.

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use fast_plothic::core::{
    build_genome_contact, build_hicpro_contact, AssemblerConfig, ChromosomeBoundary, DataType,
    FallbackPolicy, GenomeContactMap, GenomeContactRequest, Normalization, QueryOptions,
    SparseContactSource, TrimPolicy,
};
use fast_plothic::formats;
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Resolution fallback policy (CLI enum)
#[derive(Clone, Copy, Debug, Default, ValueEnum)]
enum FallbackArg {
    /// Use the closest supported resolution
    #[default]
    #[value(name = "nearest")]
    Nearest,
    /// Refuse unsupported resolutions
    #[value(name = "strict")]
    Strict,
}

impl From<FallbackArg> for FallbackPolicy {
    fn from(arg: FallbackArg) -> Self {
        match arg {
            FallbackArg::Nearest => FallbackPolicy::Nearest,
            FallbackArg::Strict => FallbackPolicy::Strict,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, ValueEnum)]
enum TrimArg {
    /// Drop all-zero bins
    #[default]
    #[value(name = "empty")]
    Empty,
    /// Cut to ceil(extent / resolution) bins
    #[value(name = "padding")]
    Padding,
    /// Keep the padded matrix
    #[value(name = "keep")]
    Keep,
}

impl From<TrimArg> for TrimPolicy {
    fn from(arg: TrimArg) -> Self {
        match arg {
            TrimArg::Empty => TrimPolicy::EmptyBins,
            TrimArg::Padding => TrimPolicy::Padding,
            TrimArg::Keep => TrimPolicy::Keep,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum DataTypeArg {
    #[value(name = "observed")]
    Observed,
    #[value(name = "expected")]
    Expected,
    #[value(name = "oe")]
    ObservedOverExpected,
}

impl From<DataTypeArg> for DataType {
    fn from(arg: DataTypeArg) -> Self {
        match arg {
            DataTypeArg::Observed => DataType::Observed,
            DataTypeArg::Expected => DataType::Expected,
            DataTypeArg::ObservedOverExpected => DataType::ObservedOverExpected,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum NormalizationArg {
    #[value(name = "NONE")]
    None,
    #[value(name = "VC")]
    Vc,
    #[value(name = "VC_SQRT")]
    VcSqrt,
    #[value(name = "KR")]
    Kr,
    #[value(name = "SCALE")]
    Scale,
}

impl From<NormalizationArg> for Normalization {
    fn from(arg: NormalizationArg) -> Self {
        match arg {
            NormalizationArg::None => Normalization::None,
            NormalizationArg::Vc => Normalization::Vc,
            NormalizationArg::VcSqrt => Normalization::VcSqrt,
            NormalizationArg::Kr => Normalization::Kr,
            NormalizationArg::Scale => Normalization::Scale,
        }
    }
}

#[derive(Parser)]
#[command(name = "fast-plothic")]
#[command(about = "Whole-genome Hi-C contact maps from bounded range queries")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Assemble a whole-genome map from binned contact dumps
    Hic {
        /// Contact dump per resolution, as RES=PATH (repeatable)
        #[arg(long = "contacts", required = true, value_parser = parse_contacts)]
        contacts: Vec<(u32, PathBuf)>,
        /// Chromosome boundary file (name, cumulative end, order index)
        #[arg(long = "chrom-txt", conflicts_with = "assembly")]
        chrom_txt: Option<PathBuf>,
        /// Juicebox .assembly file to derive boundaries from
        #[arg(long)]
        assembly: Option<PathBuf>,
        /// Name prefix for chromosomes derived from --assembly
        #[arg(long, default_value = "Chr")]
        prefix: String,
        /// Resolution in bp (default: the fourth finest available)
        #[arg(short = 'r', long)]
        resolution: Option<u32>,
        /// What to do when the resolution is not available
        #[arg(long, default_value = "nearest")]
        fallback: FallbackArg,
        /// Bins per axis per query
        #[arg(long = "tile-bins", default_value = "1400")]
        tile_bins: usize,
        /// How to remove tile padding
        #[arg(long, default_value = "empty")]
        trim: TrimArg,
        /// Reorder chromosomes by their order index
        #[arg(long)]
        order: bool,
        #[arg(long = "data-type", default_value = "observed")]
        data_type: DataTypeArg,
        #[arg(long, default_value = "NONE")]
        normalization: NormalizationArg,
        /// Output matrix (TSV, gzip if ending in .gz)
        #[arg(short = 'o', long, default_value = "GenomeContact.tsv")]
        output: PathBuf,
    },
    /// Build a map from HiC-Pro matrix output
    Hicpro {
        /// Sparse matrix file (row col value, 1-based)
        matrix: PathBuf,
        /// abs.bed file matching the matrix
        abs_bed: PathBuf,
        /// Chromosome order file (name position)
        #[arg(long = "order-file")]
        order_file: Option<PathBuf>,
        #[arg(short = 'o', long, default_value = "GenomeContact.tsv")]
        output: PathBuf,
    },
    /// Print chromosome boundaries derived from a .assembly file
    Assembly {
        assembly: PathBuf,
        #[arg(long, default_value = "Chr")]
        prefix: String,
    },
}

fn parse_contacts(value: &str) -> Result<(u32, PathBuf), String> {
    let (res, path) = value
        .split_once('=')
        .ok_or_else(|| format!("expected RES=PATH, got '{}'", value))?;
    let res: u32 = res
        .parse()
        .map_err(|_| format!("invalid resolution '{}'", res))?;
    if res == 0 {
        return Err("resolution must be positive".to_string());
    }
    Ok((res, PathBuf::from(path)))
}

fn load_boundaries(
    chrom_txt: Option<&Path>,
    assembly: Option<&Path>,
    prefix: &str,
) -> anyhow::Result<Vec<ChromosomeBoundary>> {
    match (chrom_txt, assembly) {
        (Some(path), _) => {
            eprintln!("Loading chromosome boundaries: {:?}", path);
            formats::parse_chrom_txt(path).with_context(|| format!("Failed to parse {:?}", path))
        }
        (None, Some(path)) => {
            eprintln!("Loading assembly: {:?}", path);
            let asm = formats::parse_assembly(path).with_context(|| format!("Failed to parse {:?}", path))?;
            Ok(asm.to_boundaries(prefix))
        }
        (None, None) => anyhow::bail!("one of --chrom-txt or --assembly is required"),
    }
}

/// Per-chromosome lengths from cumulative ends
fn chromosome_lengths(boundaries: &[ChromosomeBoundary]) -> Vec<(String, u64)> {
    let mut prev = 0;
    boundaries
        .iter()
        .map(|b| {
            let len = b.bp_end - prev;
            prev = b.bp_end;
            (b.name.clone(), len)
        })
        .collect()
}

fn print_stats(map: &GenomeContactMap, output: &Path, start: Instant) {
    eprintln!("\n=== Contact Map Statistics ===");
    if let Some(choice) = map.resolution {
        eprintln!("Resolution:      {} bp", choice.resolution);
        if choice.substituted {
            eprintln!("  (requested:    {:?})", choice.requested);
        }
    }
    eprintln!("Matrix size:     {}x{}", map.matrix.nrows(), map.matrix.ncols());
    eprintln!("Chromosomes:     {}", map.labels.len());
    eprintln!("Output:          {:?}", output);
    eprintln!("Time elapsed:    {:.2}s", start.elapsed().as_secs_f64());
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    let start = Instant::now();

    match cli.command {
        Commands::Hic {
            contacts,
            chrom_txt,
            assembly,
            prefix,
            resolution,
            fallback,
            tile_bins,
            trim,
            order,
            data_type,
            normalization,
            output,
        } => {
            let boundaries = load_boundaries(chrom_txt.as_deref(), assembly.as_deref(), &prefix)?;

            let mut source =
                SparseContactSource::new(chromosome_lengths(&boundaries)).with_query_limit(tile_bins);
            for (res, path) in &contacts {
                eprintln!("Loading contacts at {} bp: {:?}", res, path);
                formats::load_contact_dump(path, *res, &mut source)
                    .with_context(|| format!("Failed to load {:?}", path))?;
            }

            let request = GenomeContactRequest {
                resolution,
                extent: None,
                boundaries,
                reorder: order,
                fallback: fallback.into(),
                assembler: AssemblerConfig {
                    tile_bins,
                    trim: trim.into(),
                    query: QueryOptions {
                        data_type: data_type.into(),
                        normalization: normalization.into(),
                    },
                },
            };
            let map = build_genome_contact(&source, &request)?;
            formats::write_contact_map(&output, &map.matrix, &map.labels)?;
            print_stats(&map, &output, start);
        }

        Commands::Hicpro {
            matrix,
            abs_bed,
            order_file,
            output,
        } => {
            eprintln!("Loading HiC-Pro matrix: {:?}", matrix);
            let data = formats::load_hicpro(&matrix, &abs_bed)?;
            let target_order = order_file
                .as_ref()
                .map(formats::parse_order_file)
                .transpose()?;

            let map = build_hicpro_contact(data.matrix, data.boundaries, target_order.as_deref())?;
            formats::write_contact_map(&output, &map.matrix, &map.labels)?;
            print_stats(&map, &output, start);
        }

        Commands::Assembly { assembly, prefix } => {
            let asm = formats::parse_assembly(&assembly)?;
            for b in asm.to_boundaries(&prefix) {
                println!("{}\t{}\t{}", b.name, b.bp_end, b.order_index);
            }
            eprintln!(
                "{} scaffolds, {} chromosomes, {} bp",
                asm.scaffolds.len(),
                asm.chromosomes.len(),
                asm.total_length()
            );
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_contacts() {
        assert_eq!(parse_contacts("500000=a.txt").unwrap(), (500000, PathBuf::from("a.txt")));
        assert!(parse_contacts("a.txt").is_err());
        assert!(parse_contacts("0=a.txt").is_err());
    }

    #[test]
    fn test_chromosome_lengths() {
        let boundaries = vec![
            ChromosomeBoundary::new("chr1", 1000, 1),
            ChromosomeBoundary::new("chr2", 3000, 2),
        ];
        assert_eq!(
            chromosome_lengths(&boundaries),
            vec![("chr1".to_string(), 1000), ("chr2".to_string(), 2000)]
        );
    }
}
