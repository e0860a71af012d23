//! File format adapters
//!
//! Readers for the auxiliary inputs (chromosome text, HiC-Pro, Juicebox
//! assembly, contact dumps) and writers for the finished contact map.

pub mod assembly;
pub mod chrom_txt;
pub mod dump;
pub mod hicpro;
pub mod output;

pub use assembly::{parse_assembly, parse_assembly_reader, Assembly, AssemblyChromosome, Scaffold};
pub use chrom_txt::{parse_chrom_txt, parse_chrom_txt_reader};
pub use dump::{load_contact_dump, load_contact_dump_reader};
pub use hicpro::{
    load_hicpro, parse_abs_bed_reader, parse_order_file, parse_order_reader,
    parse_sparse_matrix_reader, HicProData,
};
pub use output::{labels_path, write_contact_map, write_dense_matrix, write_labels};
