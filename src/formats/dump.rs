//! Contact dump input
//!
//! Juicer-style `dump` output: one `pos1 pos2 value` line per contact, with
//! positions in base pairs on the whole-genome coordinate. Positions are
//! binned by integer division with the resolution; a repeated bin pair keeps
//! the last value.

use crate::core::error::{ParseError, Result};
use crate::core::io::{split_fields, ByteLineIterator, SmartReader};
use crate::core::SparseContactSource;
use log::info;
use std::io::BufRead;
use std::path::Path;

/// Load a dump file into `source` at `resolution`, returning the line count
pub fn load_contact_dump<P: AsRef<Path>>(
    path: P,
    resolution: u32,
    source: &mut SparseContactSource,
) -> Result<usize> {
    let path = path.as_ref();
    let count = load_contact_dump_reader(SmartReader::open_auto(path)?, resolution, source)?;
    info!("Loaded {} contacts at {} bp from {}", count, resolution, path.display());
    Ok(count)
}

/// Load dump lines from any buffered reader
pub fn load_contact_dump_reader<R: BufRead>(
    reader: R,
    resolution: u32,
    source: &mut SparseContactSource,
) -> Result<usize> {
    if resolution == 0 {
        return Err(ParseError::new(0, "resolution must be positive").into());
    }
    source.add_resolution(resolution);

    let mut lines = ByteLineIterator::new(reader);
    let mut line_number = 0;
    let mut count = 0;
    let res = resolution as u64;

    while let Some(line) = lines.next_line() {
        let line = line?;
        line_number += 1;
        if line.first() == Some(&b'#') {
            continue;
        }
        let mut fields = split_fields(line);
        let (pos1, pos2, value) = match (fields.next(), fields.next(), fields.next()) {
            (None, _, _) => continue,
            (Some(a), Some(b), Some(v)) => (a, b, v),
            _ => return Err(ParseError::new(line_number, "expected 'pos1 pos2 value'").into()),
        };

        let pos1: u64 = parse_ascii(pos1, "position", line_number)?;
        let pos2: u64 = parse_ascii(pos2, "position", line_number)?;
        let value: f64 = parse_ascii(value, "contact value", line_number)?;
        if value.is_nan() {
            continue;
        }
        source.insert_contact(resolution, (pos1 / res) as usize, (pos2 / res) as usize, value);
        count += 1;
    }

    Ok(count)
}

fn parse_ascii<T: std::str::FromStr>(field: &[u8], what: &str, line_number: usize) -> Result<T> {
    let text = std::str::from_utf8(field)
        .map_err(|_| ParseError::new(line_number, format!("{} is not UTF-8", what)))?;
    text.parse()
        .map_err(|_| ParseError::invalid_number(what, text, line_number).into())
}
