//! Matrix and label output
//!
//! The dense matrix is written as tab-separated rows (gzip when the path ends
//! in `.gz`). Chromosome ticks go to a sidecar `<output>.labels` file with one
//! `name<TAB>position` line per chromosome in display order.

use crate::core::error::Result;
use crate::core::io::create_writer;
use crate::core::{ContactMatrix, LabelPosition};
use log::info;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Write a dense matrix as TSV
pub fn write_dense_matrix<W: Write>(writer: &mut W, matrix: &ContactMatrix) -> Result<()> {
    for row in matrix.rows() {
        let mut first = true;
        for value in row.iter() {
            if !first {
                writer.write_all(b"\t")?;
            }
            write!(writer, "{}", value)?;
            first = false;
        }
        writer.write_all(b"\n")?;
    }
    Ok(())
}

/// Write chromosome tick labels
pub fn write_labels<W: Write>(writer: &mut W, labels: &[LabelPosition]) -> Result<()> {
    for label in labels {
        writeln!(writer, "{}\t{}", label.name, label.position)?;
    }
    Ok(())
}

/// Path of the label sidecar for a matrix output path
pub fn labels_path(output: &Path) -> PathBuf {
    let mut name = output.as_os_str().to_os_string();
    name.push(".labels");
    PathBuf::from(name)
}

/// Write the matrix to `output` and its labels next to it
pub fn write_contact_map(output: &Path, matrix: &ContactMatrix, labels: &[LabelPosition]) -> Result<PathBuf> {
    let mut writer = create_writer(output)?;
    write_dense_matrix(&mut writer, matrix)?;
    writer.flush()?;

    let label_path = labels_path(output);
    let mut label_writer = create_writer(&label_path)?;
    write_labels(&mut label_writer, labels)?;
    label_writer.flush()?;

    info!(
        "Wrote {}x{} matrix to {} and {} labels to {}",
        matrix.nrows(),
        matrix.ncols(),
        output.display(),
        labels.len(),
        label_path.display()
    );
    Ok(label_path)
}
