//! NEXUS reading and writing.
//!
//! Reads the DATA and CHARACTERS blocks commonly used for sequence
//! alignments, and writes the merged supermatrix as a data block with an
//! optional assumptions block carrying the CHARSET partition map.
//!
//! ## NEXUS Format
//!
//! ```text
//! #NEXUS
//! BEGIN DATA;
//!   DIMENSIONS NTAX=3 NCHAR=10;
//!   FORMAT DATATYPE=DNA GAP=- MISSING=?;
//!   MATRIX
//!     seq1 ACGTACGTAC
//!     seq2 TGCATGCATG
//!     seq3 AAAACCCCGG
//!   ;
//! END;
//! ```
//!
//! ## Supported Features
//!
//! - DATA and CHARACTERS blocks
//! - DIMENSIONS command (NTAX, NCHAR; both required)
//! - FORMAT command (DATATYPE, GAP, MISSING, INTERLEAVE, MATCHCHAR)
//! - MATRIX command (sequential and interleaved)
//!
//! ## Relaxed Parsing
//!
//! - Case insensitive commands
//! - Flexible whitespace, commands spanning multiple lines
//! - Quoted and unquoted taxon names
//! - Bracketed comments anywhere

use std::collections::HashMap;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use thiserror::Error;

use crate::model::{GeneAlignment, Supermatrix};

/// Errors that can occur during NEXUS parsing.
#[derive(Error, Debug)]
pub enum NexusError {
    #[error("Not a NEXUS file (must start with #NEXUS)")]
    NotNexus,

    #[error("Empty NEXUS file")]
    EmptyFile,

    #[error("No DATA or CHARACTERS block found")]
    NoDataBlock,

    #[error("Missing DIMENSIONS command in {block} block")]
    MissingDimensions { block: String },

    #[error("Missing MATRIX command in {block} block")]
    MissingMatrix { block: String },

    #[error("NTAX not specified in DIMENSIONS")]
    MissingNtax,

    #[error("NCHAR not specified in DIMENSIONS")]
    MissingNchar,

    #[error("Expected {expected} sequences (NTAX), found {found}")]
    SequenceCountMismatch { expected: usize, found: usize },

    #[error("Sequence '{name}' has length {found}, expected {expected} (NCHAR)")]
    SequenceLengthMismatch {
        name: String,
        expected: usize,
        found: usize,
    },

    #[error("Unterminated MATRIX (missing ';')")]
    UnterminatedMatrix,

    #[error("Empty taxon name in MATRIX")]
    EmptyName,
}

/// Result type for NEXUS operations.
pub type NexusResult<T> = Result<T, NexusError>;

/// Parses NEXUS content into a collection.
pub fn parse_nexus_str(content: &str) -> NexusResult<GeneAlignment> {
    let lines: Vec<&str> = content.lines().collect();

    let first_non_empty = lines
        .iter()
        .find(|line| !line.trim().is_empty())
        .ok_or(NexusError::EmptyFile)?;

    if !first_non_empty
        .trim()
        .to_ascii_uppercase()
        .starts_with("#NEXUS")
    {
        return Err(NexusError::NotNexus);
    }

    let (block, block_lines) = find_data_block(&lines)?;
    parse_data_block(&block, &block_lines)
}

/// Finds the first DATA or CHARACTERS block and returns its name and lines.
fn find_data_block<'a>(lines: &[&'a str]) -> NexusResult<(String, Vec<&'a str>)> {
    let mut block_name = None;
    let mut block_lines: Vec<&str> = Vec::new();

    for line in lines {
        let upper = line.trim().to_ascii_uppercase();

        match &block_name {
            None => {
                if upper.starts_with("BEGIN") {
                    if upper.contains("DATA") {
                        block_name = Some("DATA".to_string());
                    } else if upper.contains("CHARACTERS") {
                        block_name = Some("CHARACTERS".to_string());
                    }
                }
            }
            Some(_) => {
                if upper.starts_with("END") {
                    break;
                }
                block_lines.push(line);
            }
        }
    }

    match block_name {
        Some(name) => Ok((name, block_lines)),
        None => Err(NexusError::NoDataBlock),
    }
}

/// Splits a block into its preamble commands and the raw MATRIX text.
///
/// Commands may span lines; they end at ';'. Matrix lines are kept raw
/// (comments included) so the tokenizer can handle comments that span
/// lines, except for the terminating line which is comment-stripped to
/// locate the closing ';'.
struct BlockParts {
    commands: Vec<String>,
    matrix_text: String,
    saw_matrix: bool,
    matrix_terminated: bool,
}

fn split_block(lines: &[&str]) -> BlockParts {
    let mut parts = BlockParts {
        commands: Vec::new(),
        matrix_text: String::new(),
        saw_matrix: false,
        matrix_terminated: false,
    };
    let mut command = String::new();
    let mut in_matrix = false;

    for line in lines {
        if parts.matrix_terminated {
            break;
        }

        if in_matrix {
            let visible = remove_nexus_comments(line);
            let visible = visible.trim();
            if visible.ends_with(';') {
                let clean = visible.trim_end_matches(';').trim_end();
                if !clean.is_empty() {
                    parts.matrix_text.push_str(clean);
                    parts.matrix_text.push('\n');
                }
                in_matrix = false;
                parts.matrix_terminated = true;
            } else {
                parts.matrix_text.push_str(line);
                parts.matrix_text.push('\n');
            }
            continue;
        }

        let visible = remove_nexus_comments(line);
        let trimmed = visible.trim();
        if trimmed.is_empty() {
            continue;
        }

        let upper = trimmed.to_ascii_uppercase();
        if upper.starts_with("MATRIX") {
            // Flush any command left open by a missing ';'
            if !command.is_empty() {
                parts.commands.push(std::mem::take(&mut command));
            }
            parts.saw_matrix = true;
            in_matrix = true;
            // Data may follow on the MATRIX line itself
            let after = trimmed["MATRIX".len()..].trim();
            if !after.is_empty() {
                if after.ends_with(';') {
                    let clean = after.trim_end_matches(';').trim_end();
                    if !clean.is_empty() {
                        parts.matrix_text.push_str(clean);
                        parts.matrix_text.push('\n');
                    }
                    in_matrix = false;
                    parts.matrix_terminated = true;
                } else {
                    parts.matrix_text.push_str(after);
                    parts.matrix_text.push('\n');
                }
            }
        } else {
            if !command.is_empty() {
                command.push(' ');
            }
            command.push_str(trimmed);
            if trimmed.ends_with(';') {
                parts.commands.push(std::mem::take(&mut command));
            }
        }
    }

    if !command.is_empty() {
        parts.commands.push(command);
    }
    parts
}

/// Parses the content of a DATA or CHARACTERS block.
fn parse_data_block(block: &str, lines: &[&str]) -> NexusResult<GeneAlignment> {
    let parts = split_block(lines);

    let mut saw_dimensions = false;
    let mut ntax: Option<usize> = None;
    let mut nchar: Option<usize> = None;
    let mut interleave = false;
    let mut matchchar: Option<char> = None;

    for command in &parts.commands {
        let upper = command.to_ascii_uppercase();
        if upper.starts_with("DIMENSIONS") {
            saw_dimensions = true;
            if let Some(value) = extract_param(command, "NTAX") {
                ntax = value.parse().ok();
            }
            if let Some(value) = extract_param(command, "NCHAR") {
                nchar = value.parse().ok();
            }
        } else if upper.starts_with("FORMAT") {
            interleave = upper.contains("INTERLEAVE");
            if let Some(value) = extract_param(command, "MATCHCHAR") {
                matchchar = value.chars().next();
            }
        }
        // Other commands (TITLE, OPTIONS, ...) are ignored
    }

    if !parts.saw_matrix {
        return Err(NexusError::MissingMatrix {
            block: block.to_string(),
        });
    }
    if !parts.matrix_terminated {
        return Err(NexusError::UnterminatedMatrix);
    }
    if !saw_dimensions {
        return Err(NexusError::MissingDimensions {
            block: block.to_string(),
        });
    }
    let ntax = ntax.ok_or(NexusError::MissingNtax)?;
    let nchar = nchar.ok_or(NexusError::MissingNchar)?;

    let token_lines = tokenize_matrix(&parts.matrix_text);
    let mut records = if interleave {
        parse_interleaved(&token_lines)?
    } else {
        let tokens: Vec<String> = token_lines.into_iter().flatten().collect();
        parse_sequential(&tokens, nchar)?
    };

    if records.len() != ntax {
        return Err(NexusError::SequenceCountMismatch {
            expected: ntax,
            found: records.len(),
        });
    }
    for (name, data) in &records {
        if data.len() != nchar {
            return Err(NexusError::SequenceLengthMismatch {
                name: name.clone(),
                expected: nchar,
                found: data.len(),
            });
        }
    }

    if let Some(mc) = matchchar {
        apply_matchchar(&mut records, mc);
    }

    Ok(GeneAlignment::from_pairs(records))
}

/// Removes NEXUS comments (bracketed text) from a line.
fn remove_nexus_comments(line: &str) -> String {
    let mut result = String::new();
    let mut in_comment = false;

    for c in line.chars() {
        if c == '[' {
            in_comment = true;
        } else if c == ']' {
            in_comment = false;
        } else if !in_comment {
            result.push(c);
        }
    }

    result
}

/// Extracts a parameter value from a NEXUS command, case-insensitively.
/// The returned slice keeps the original case of the value.
fn extract_param<'a>(command: &'a str, param: &str) -> Option<&'a str> {
    let upper = command.to_ascii_uppercase();
    let idx = upper.find(param)?;
    let after = &command[idx + param.len()..];

    let eq_idx = after.find('=')?;
    let after_eq = &after[eq_idx + 1..];

    // Value ends at whitespace, ';', or end
    let end = after_eq
        .find(|c: char| c.is_whitespace() || c == ';')
        .unwrap_or(after_eq.len());

    let value = after_eq[..end].trim();
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}

/// Tokenizes matrix text into per-line token groups: whitespace-separated,
/// quote-aware, with bracketed comments (possibly spanning lines) removed
/// and ';' dropped. Interleaved parsing relies on the line structure;
/// sequential parsing flattens it.
fn tokenize_matrix(content: &str) -> Vec<Vec<String>> {
    let mut lines: Vec<Vec<String>> = Vec::new();
    let mut line: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut in_comment = false;
    let mut in_single_quote = false;
    let mut in_double_quote = false;

    for c in content.chars() {
        if in_comment {
            if c == ']' {
                in_comment = false;
            }
            continue;
        }

        if c == '\n' {
            if !current.is_empty() {
                line.push(std::mem::take(&mut current));
            }
            if !line.is_empty() {
                lines.push(std::mem::take(&mut line));
            }
            // Quotes do not span lines
            in_single_quote = false;
            in_double_quote = false;
            continue;
        }

        match c {
            '[' if !in_single_quote && !in_double_quote => {
                if !current.is_empty() {
                    line.push(std::mem::take(&mut current));
                }
                in_comment = true;
            }
            '\'' if !in_double_quote => {
                in_single_quote = !in_single_quote;
                current.push(c);
            }
            '"' if !in_single_quote => {
                in_double_quote = !in_double_quote;
                current.push(c);
            }
            c if c.is_whitespace() && !in_single_quote && !in_double_quote => {
                if !current.is_empty() {
                    line.push(std::mem::take(&mut current));
                }
            }
            ';' => {}
            c => current.push(c),
        }
    }

    if !current.is_empty() {
        line.push(current);
    }
    if !line.is_empty() {
        lines.push(line);
    }

    lines
}

/// Removes surrounding quotes from a token if present.
fn unquote(token: &str) -> String {
    let token = token.trim();
    if token.len() >= 2
        && ((token.starts_with('\'') && token.ends_with('\''))
            || (token.starts_with('"') && token.ends_with('"')))
    {
        token[1..token.len() - 1].to_string()
    } else {
        token.to_string()
    }
}

/// Sequential matrix: name token, then data tokens until NCHAR is reached.
fn parse_sequential(tokens: &[String], nchar: usize) -> NexusResult<Vec<(String, String)>> {
    let mut records: Vec<(String, String)> = Vec::new();
    let mut i = 0;

    while i < tokens.len() {
        let name = unquote(&tokens[i]);
        if name.is_empty() {
            return Err(NexusError::EmptyName);
        }
        i += 1;

        let mut data = String::with_capacity(nchar);
        while i < tokens.len() && data.len() < nchar {
            data.push_str(&tokens[i]);
            i += 1;
        }
        records.push((name, data));
    }

    Ok(records)
}

/// Interleaved matrix: each line names a taxon and carries its next data
/// chunk(s); names repeat across blocks and chunks accumulate in file
/// order. Record order follows the first block.
fn parse_interleaved(token_lines: &[Vec<String>]) -> NexusResult<Vec<(String, String)>> {
    let mut records: Vec<(String, String)> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for line in token_lines {
        let name = unquote(&line[0]);
        if name.is_empty() {
            return Err(NexusError::EmptyName);
        }

        let idx = match index.get(&name) {
            Some(&idx) => idx,
            None => {
                records.push((name.clone(), String::new()));
                index.insert(name, records.len() - 1);
                records.len() - 1
            }
        };
        for chunk in &line[1..] {
            records[idx].1.push_str(chunk);
        }
    }

    Ok(records)
}

/// MATCHCHAR substitution: occurrences in later rows copy the residue of
/// the first row at the same column.
fn apply_matchchar(records: &mut [(String, String)], matchchar: char) {
    if records.len() < 2 {
        return;
    }

    let reference: Vec<char> = records[0].1.chars().collect();
    for (_, data) in records.iter_mut().skip(1) {
        *data = data
            .chars()
            .enumerate()
            .map(|(i, c)| {
                if c == matchchar {
                    reference.get(i).copied().unwrap_or(c)
                } else {
                    c
                }
            })
            .collect();
    }
}

/// Writes the supermatrix as a NEXUS data block.
///
/// With `charsets` set, an assumptions block carrying the CHARSET lines
/// follows the data block. The FORMAT line records the matrix's own
/// missing-data character. Parent directories of `path` are created if
/// needed.
pub fn write_nexus<P: AsRef<Path>>(
    path: P,
    matrix: &Supermatrix,
    charsets: Option<&str>,
) -> io::Result<()> {
    super::ensure_parent_dir(path.as_ref())?;
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);

    writeln!(writer, "#NEXUS")?;
    writeln!(writer)?;
    writeln!(writer, "Begin data;")?;
    writeln!(
        writer,
        "  Dimensions ntax={} nchar={};",
        matrix.taxon_count(),
        matrix.alignment_length()
    )?;
    writeln!(
        writer,
        "  Format datatype=dna missing={} gap=-;",
        matrix.missing
    )?;
    writeln!(writer, "  Matrix")?;
    for sequence in &matrix.sequences {
        writeln!(writer, "{:<15} {}", sequence.id, sequence.data)?;
    }
    writeln!(writer, "  ;")?;
    writeln!(writer, "End;")?;

    if let Some(charsets) = charsets {
        writeln!(writer)?;
        writeln!(writer, "Begin assumptions;")?;
        writeln!(writer, "{}", charsets.trim_end())?;
        writeln!(writer, "End;")?;
    }

    writer.flush()
}
