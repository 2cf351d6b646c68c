//! FASTA reading and writing.
//!
//! This module parses FASTA input files into collections and writes the
//! merged supermatrix back out. Both single-line and multi-line sequences
//! are supported on input; output wraps sequence data at 60 columns.
//!
//! ## FASTA Format
//!
//! ```text
//! >sequence_identifier optional description
//! ACGTACGTACGT...
//! >another_sequence
//! TGCATGCATGCA...
//! ```

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use thiserror::Error;

use crate::model::{GeneAlignment, Sequence};

/// Output line width for sequence data.
const LINE_WIDTH: usize = 60;

/// Errors that can occur during FASTA parsing.
#[derive(Error, Debug)]
pub enum FastaError {
    #[error("Empty FASTA file")]
    EmptyFile,

    #[error("Invalid FASTA format: {0}")]
    InvalidFormat(String),

    #[error("Sequence without header at line {0}")]
    SequenceWithoutHeader(usize),
}

/// Result type for FASTA operations.
pub type FastaResult<T> = Result<T, FastaError>;

/// Parses FASTA content into a collection.
///
/// The taxon identifier is everything between '>' and the first
/// whitespace; the rest of the header line is a free-form description
/// and is dropped. A taxon appearing twice keeps the later record.
///
/// # Examples
///
/// ```
/// use seqcat::formats::fasta::parse_fasta_str;
///
/// let collection = parse_fasta_str(">T1\nACGT\n>T2\nTGCA\n").unwrap();
/// assert_eq!(collection.taxon_count(), 2);
/// ```
pub fn parse_fasta_str(content: &str) -> FastaResult<GeneAlignment> {
    let mut collection = GeneAlignment::new();
    let mut current_id: Option<&str> = None;
    let mut current_seq = String::new();
    let mut line_number = 0;
    let mut record_count = 0usize;

    for line in content.lines() {
        line_number += 1;
        let line = line.trim();

        // Skip empty lines
        if line.is_empty() {
            continue;
        }

        if let Some(header) = line.strip_prefix('>') {
            // Save previous record; empty bodies are kept and surface
            // later as a length mismatch.
            if let Some(id) = current_id.take() {
                collection.insert(id, std::mem::take(&mut current_seq));
            }

            let id = header.split_whitespace().next().unwrap_or(header);
            if id.is_empty() {
                return Err(FastaError::InvalidFormat(format!(
                    "Empty sequence identifier at line {}",
                    line_number
                )));
            }

            current_id = Some(id);
            record_count += 1;
        } else {
            if current_id.is_none() {
                return Err(FastaError::SequenceWithoutHeader(line_number));
            }

            // Fast append: most FASTA lines don't have internal whitespace
            if line.bytes().all(|b| !b.is_ascii_whitespace()) {
                current_seq.push_str(line);
            } else {
                current_seq.extend(line.chars().filter(|c| !c.is_ascii_whitespace()));
            }
        }
    }

    // Don't forget the last record
    if let Some(id) = current_id {
        collection.insert(id, current_seq);
    }

    if record_count == 0 {
        return Err(FastaError::EmptyFile);
    }

    Ok(collection)
}

/// Writes sequences as FASTA, wrapping data at 60 columns.
///
/// Parent directories of `path` are created if needed.
pub fn write_fasta<P: AsRef<Path>>(path: P, sequences: &[Sequence]) -> io::Result<()> {
    super::ensure_parent_dir(path.as_ref())?;
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    for sequence in sequences {
        writeln!(writer, ">{}", sequence.id)?;
        for chunk in sequence.data.as_bytes().chunks(LINE_WIDTH) {
            writer.write_all(chunk)?;
            writer.write_all(b"\n")?;
        }
    }
    writer.flush()
}
