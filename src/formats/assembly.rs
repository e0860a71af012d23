//! Juicebox `.assembly` files
//!
//! Scaffold lines (`>name index length`) come first, followed by one line per
//! chromosome listing signed scaffold indices (a negative index is a
//! reverse-complemented scaffold). A chromosome's length is the sum of its
//! scaffolds' lengths.

use crate::core::error::{ParseError, Result};
use crate::core::io::{LineIterator, SmartReader};
use crate::core::ChromosomeBoundary;
use std::collections::HashMap;
use std::io::BufRead;
use std::path::Path;

/// A scaffold declared by a `>` line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scaffold {
    pub name: String,
    pub index: u64,
    pub length: u64,
}

/// One chromosome (super-scaffold) of the assembly
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssemblyChromosome {
    /// 1-based chromosome number, in file order
    pub number: usize,
    /// Signed scaffold indices
    pub scaffolds: Vec<i64>,
    /// Sum of the member scaffold lengths
    pub length: u64,
}

/// A parsed `.assembly` file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Assembly {
    pub scaffolds: Vec<Scaffold>,
    pub chromosomes: Vec<AssemblyChromosome>,
}

impl Assembly {
    /// Total assembly length over all chromosomes
    pub fn total_length(&self) -> u64 {
        self.chromosomes.iter().map(|c| c.length).sum()
    }

    /// Cumulative boundaries named `{prefix}{number}`, in file order
    pub fn to_boundaries(&self, prefix: &str) -> Vec<ChromosomeBoundary> {
        let mut cumulative = 0;
        self.chromosomes
            .iter()
            .map(|c| {
                cumulative += c.length;
                ChromosomeBoundary::new(format!("{}{}", prefix, c.number), cumulative, c.number)
            })
            .collect()
    }
}

/// Parse an assembly file from a path
pub fn parse_assembly<P: AsRef<Path>>(path: P) -> Result<Assembly> {
    parse_assembly_reader(SmartReader::open_auto(path)?)
}

/// Parse an assembly from any buffered reader
pub fn parse_assembly_reader<R: BufRead>(reader: R) -> Result<Assembly> {
    let mut lines = LineIterator::new(reader);
    let mut assembly = Assembly::default();
    let mut lengths: HashMap<u64, u64> = HashMap::new();
    let mut line_number = 0;

    while let Some(line) = lines.next_line() {
        let line = line?;
        line_number += 1;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        if let Some(header) = trimmed.strip_prefix('>') {
            let fields: Vec<&str> = header.split_whitespace().collect();
            if fields.len() < 3 {
                return Err(ParseError::new(line_number, "expected '>name index length'").into());
            }
            let index: u64 = fields[1]
                .parse()
                .map_err(|_| ParseError::invalid_number("scaffold index", fields[1], line_number))?;
            let length: u64 = fields[2]
                .parse()
                .map_err(|_| ParseError::invalid_number("scaffold length", fields[2], line_number))?;
            if lengths.insert(index, length).is_some() {
                return Err(ParseError::new(line_number, format!("scaffold index {} declared twice", index)).into());
            }
            assembly.scaffolds.push(Scaffold {
                name: fields[0].to_string(),
                index,
                length,
            });
            continue;
        }

        let mut scaffolds = Vec::new();
        let mut length = 0;
        for field in trimmed.split_whitespace() {
            let signed: i64 = field
                .parse()
                .map_err(|_| ParseError::invalid_number("scaffold index", field, line_number))?;
            let scaffold_len = lengths.get(&signed.unsigned_abs()).ok_or_else(|| {
                ParseError::new(line_number, format!("unknown scaffold index {}", signed))
            })?;
            length += scaffold_len;
            scaffolds.push(signed);
        }
        assembly.chromosomes.push(AssemblyChromosome {
            number: assembly.chromosomes.len() + 1,
            scaffolds,
            length,
        });
    }

    Ok(assembly)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const ASSEMBLY: &str = "\
>scaffold_1 1 1000
>scaffold_2 2 500
>scaffold_3 3 250
>hic_gap_1 4 500
1 -3
2 4
";

    #[test]
    fn test_parse_assembly() {
        let asm = parse_assembly_reader(Cursor::new(ASSEMBLY)).unwrap();
        assert_eq!(asm.scaffolds.len(), 4);
        assert_eq!(asm.chromosomes.len(), 2);
        assert_eq!(asm.chromosomes[0].scaffolds, vec![1, -3]);
        assert_eq!(asm.chromosomes[0].length, 1250);
        assert_eq!(asm.chromosomes[1].length, 1000);
        assert_eq!(asm.total_length(), 2250);
    }

    #[test]
    fn test_to_boundaries() {
        let asm = parse_assembly_reader(Cursor::new(ASSEMBLY)).unwrap();
        let boundaries = asm.to_boundaries("Chr");
        assert_eq!(
            boundaries,
            vec![
                ChromosomeBoundary::new("Chr1", 1250, 1),
                ChromosomeBoundary::new("Chr2", 2250, 2),
            ]
        );
    }

    #[test]
    fn test_unknown_scaffold() {
        let err = parse_assembly_reader(Cursor::new(">s1 1 10\n1 7\n")).unwrap_err();
        assert!(err.to_string().contains("unknown scaffold index 7"));
    }

    #[test]
    fn test_bad_header() {
        assert!(parse_assembly_reader(Cursor::new(">s1 1\n")).is_err());
        assert!(parse_assembly_reader(Cursor::new(">s1 1 10\n>s2 1 20\n")).is_err());
    }
}
