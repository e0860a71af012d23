//! Chromosome boundary text file
//!
//! One chromosome per line, whitespace separated:
//!
//! ```text
//! # name  cumulative_end  order_index
//! Chr1    26000000        2
//! Chr2    50500000        1
//! ```
//!
//! `cumulative_end` is the chromosome's end on the whole-genome (assembly)
//! coordinate. `order_index` is the 1-based display position; when the
//! column is absent the file order is used. Lines are returned sorted into
//! genome order by `cumulative_end`.

use crate::core::error::{ParseError, Result};
use crate::core::io::{LineIterator, SmartReader};
use crate::core::ChromosomeBoundary;
use std::collections::HashSet;
use std::io::BufRead;
use std::path::Path;

/// Parse a chromosome boundary file (plain, gzip or bzip2)
pub fn parse_chrom_txt<P: AsRef<Path>>(path: P) -> Result<Vec<ChromosomeBoundary>> {
    let reader = SmartReader::open_auto(path)?;
    parse_chrom_txt_reader(reader)
}

/// Parse chromosome boundaries from any buffered reader
pub fn parse_chrom_txt_reader<R: BufRead>(reader: R) -> Result<Vec<ChromosomeBoundary>> {
    let mut lines = LineIterator::new(reader);
    let mut boundaries = Vec::new();
    let mut names = HashSet::new();
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
            return Err(ParseError::new(
                line_number,
                format!("expected 'name cumulative_end [order_index]', got '{}'", trimmed),
            )
            .into());
        }

        let name = fields[0].to_string();
        let bp_end: u64 = fields[1]
            .parse()
            .map_err(|_| ParseError::invalid_number("cumulative end", fields[1], line_number))?;
        let order_index: usize = match fields.get(2) {
            Some(value) => value
                .parse()
                .map_err(|_| ParseError::invalid_number("order index", value, line_number))?,
            None => boundaries.len() + 1,
        };
        if order_index == 0 {
            return Err(ParseError::new(line_number, "order index is 1-based").into());
        }
        if !names.insert(name.clone()) {
            return Err(ParseError::new(line_number, format!("duplicate chromosome '{}'", name)).into());
        }

        boundaries.push(ChromosomeBoundary {
            name,
            bp_end,
            order_index,
        });
    }

    boundaries.sort_by_key(|b| b.bp_end);
    Ok(boundaries)
}
