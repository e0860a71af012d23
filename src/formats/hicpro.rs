//! HiC-Pro matrix input
//!
//! HiC-Pro ships contacts as a sparse `row col value` matrix (1-based bin
//! indices, upper triangle) and an `abs.bed` file mapping bins to genome
//! intervals (`chrom start end index`). Bin boundaries come straight from
//! the bed file, so the base-pair to bin mapping step is skipped.
//!
//! An optional order file lists `name position` pairs, where position is the
//! 1-based display slot of each chromosome.

use crate::core::error::{DataShapeError, ParseError, Result};
use crate::core::io::{split_fields, ByteLineIterator, LineIterator, SmartReader};
use crate::core::{BinBoundary, ContactMatrix};
use log::info;
use std::collections::HashMap;
use std::io::BufRead;
use std::path::Path;

/// A HiC-Pro matrix with its chromosome bin boundaries
#[derive(Debug, Clone, PartialEq)]
pub struct HicProData {
    pub matrix: ContactMatrix,
    pub boundaries: Vec<BinBoundary>,
}

/// Load a HiC-Pro sparse matrix and its `abs.bed`
pub fn load_hicpro<P: AsRef<Path>, Q: AsRef<Path>>(matrix_path: P, abs_bed_path: Q) -> Result<HicProData> {
    info!("HiCPro abs bed file: {}", abs_bed_path.as_ref().display());
    let boundaries = parse_abs_bed_reader(SmartReader::open_auto(abs_bed_path)?)?;
    let dim = boundaries.last().map(|b| b.bin_end).unwrap_or(0);

    info!("HiCPro matrix file: {} ({} bins)", matrix_path.as_ref().display(), dim);
    let matrix = parse_sparse_matrix_reader(SmartReader::open_auto(matrix_path)?, dim)?;
    Ok(HicProData { matrix, boundaries })
}

/// Chromosome bin ends from an `abs.bed` reader
///
/// Each chromosome ends at the index of its last bin. Chromosomes must
/// appear in one contiguous block and indices must increase.
pub fn parse_abs_bed_reader<R: BufRead>(reader: R) -> Result<Vec<BinBoundary>> {
    let mut lines = LineIterator::new(reader);
    let mut ends: Vec<(String, usize)> = Vec::new();
    let mut line_number = 0;
    let mut last_index = 0;

    while let Some(line) = lines.next_line() {
        let line = line?;
        line_number += 1;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let fields: Vec<&str> = trimmed.split_whitespace().collect();
        if fields.len() < 4 {
            return Err(ParseError::new(
                line_number,
                format!("expected 'chrom start end index', got '{}'", trimmed),
            )
            .into());
        }
        let index: usize = fields[3]
            .parse()
            .map_err(|_| ParseError::invalid_number("bin index", fields[3], line_number))?;
        if index <= last_index {
            return Err(ParseError::new(
                line_number,
                format!("bin index {} does not follow {}", index, last_index),
            )
            .into());
        }
        last_index = index;

        let chrom = fields[0];
        match ends.last_mut() {
            Some((name, end)) if name == chrom => *end = index,
            _ => {
                if ends.iter().any(|(name, _)| name == chrom) {
                    return Err(ParseError::new(
                        line_number,
                        format!("chromosome '{}' is not contiguous", chrom),
                    )
                    .into());
                }
                ends.push((chrom.to_string(), index));
            }
        }
    }

    BinBoundary::from_bin_ends(ends)
}

/// Dense symmetric matrix from a sparse `row col value` reader (1-based)
pub fn parse_sparse_matrix_reader<R: BufRead>(reader: R, dim: usize) -> Result<ContactMatrix> {
    let mut lines = ByteLineIterator::new(reader);
    let mut matrix = ContactMatrix::zeros((dim, dim));
    let mut line_number = 0;

    while let Some(line) = lines.next_line() {
        let line = line?;
        line_number += 1;
        let mut fields = split_fields(line);
        let (row, col, value) = match (fields.next(), fields.next(), fields.next()) {
            (None, _, _) => continue,
            (Some(r), Some(c), Some(v)) => (r, c, v),
            _ => {
                return Err(ParseError::new(line_number, "expected 'row col value'").into());
            }
        };

        let row = parse_bin_index(row, line_number)?;
        let col = parse_bin_index(col, line_number)?;
        let value: f64 = parse_field(value, "contact value", line_number)?;
        if row >= dim || col >= dim {
            return Err(DataShapeError::EntryOutOfBounds { row, col, dim }.into());
        }
        matrix[[row, col]] = value;
        matrix[[col, row]] = value;
    }

    Ok(matrix)
}

/// Target order from a `name position` reader
///
/// Positions must be exactly `1..=n`.
pub fn parse_order_reader<R: BufRead>(reader: R) -> Result<Vec<String>> {
    let mut lines = LineIterator::new(reader);
    let mut by_position: HashMap<usize, String> = HashMap::new();
    let mut line_number = 0;

    while let Some(line) = lines.next_line() {
        let line = line?;
        line_number += 1;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let fields: Vec<&str> = trimmed.split_whitespace().collect();
        if fields.len() < 2 {
            return Err(ParseError::new(line_number, "expected 'name position'").into());
        }
        let position: usize = fields[1]
            .parse()
            .map_err(|_| ParseError::invalid_number("position", fields[1], line_number))?;
        if by_position.insert(position, fields[0].to_string()).is_some() {
            return Err(ParseError::new(line_number, format!("position {} used twice", position)).into());
        }
    }

    let mut order = Vec::with_capacity(by_position.len());
    for position in 1..=by_position.len() {
        match by_position.remove(&position) {
            Some(name) => order.push(name),
            None => {
                return Err(ParseError::new(0, format!("no chromosome at position {}", position)).into());
            }
        }
    }
    Ok(order)
}

/// Parse an order file from a path
pub fn parse_order_file<P: AsRef<Path>>(path: P) -> Result<Vec<String>> {
    parse_order_reader(SmartReader::open_auto(path)?)
}

fn parse_bin_index(field: &[u8], line_number: usize) -> Result<usize> {
    let index: usize = parse_field(field, "bin index", line_number)?;
    if index == 0 {
        return Err(ParseError::new(line_number, "bin indices are 1-based").into());
    }
    Ok(index - 1)
}

fn parse_field<T: std::str::FromStr>(field: &[u8], what: &str, line_number: usize) -> Result<T> {
    let text = std::str::from_utf8(field)
        .map_err(|_| ParseError::new(line_number, format!("{} is not UTF-8", what)))?;
    text.parse()
        .map_err(|_| ParseError::invalid_number(what, text, line_number).into())
}
