//! Multi-format reading and writing of sequence collections.
//!
//! Supports automatic format detection for:
//! - FASTA (.fasta, .fa, .fna, .faa, .fas)
//! - NEXUS (.nex, .nexus, .nxs)
//! - GenBank (.gb, .gbk, .gbff)
//!
//! Format detection priority:
//! 1. Explicit format selection (-f option)
//! 2. File extension
//! 3. Content-based detection
//!
//! Writers for the merged supermatrix live in the per-format submodules;
//! the plain CHARSET partition file is written from here.

pub mod fasta;
pub mod genbank;
pub mod nexus;

use std::ffi::OsStr;
use std::fs::{self, File};
use std::io::{self, BufReader, Read};
use std::path::Path;

use thiserror::Error;

use crate::model::GeneAlignment;

/// Detected file format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Fasta,
    Nexus,
    Genbank,
}

impl std::fmt::Display for FileFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FileFormat::Fasta => write!(f, "FASTA"),
            FileFormat::Nexus => write!(f, "NEXUS"),
            FileFormat::Genbank => write!(f, "GenBank"),
        }
    }
}

/// Errors that can occur while reading a collection.
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("Failed to open file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Empty file")]
    EmptyFile,

    #[error("Could not determine file format.\n\
             Hint: Use -f/--format to specify the format explicitly:\n  \
             seqcat -f fasta <files>    # FASTA format\n  \
             seqcat -f nexus <files>    # NEXUS format\n  \
             seqcat -f genbank <files>  # GenBank format")]
    UnknownFormat,

    #[error("FASTA error: {0}")]
    FastaError(#[from] fasta::FastaError),

    #[error("NEXUS error: {0}")]
    NexusError(#[from] nexus::NexusError),

    #[error("GenBank error: {0}")]
    GenbankError(#[from] genbank::GenbankError),
}

/// Result type for reading operations.
pub type ParseResult<T> = Result<T, ParseError>;

/// Detects format from file extension.
pub fn detect_format_from_extension<P: AsRef<Path>>(path: P) -> Option<FileFormat> {
    let ext = path.as_ref().extension().and_then(OsStr::to_str)?;
    match ext.to_lowercase().as_str() {
        // FASTA extensions
        "fa" | "fas" | "fasta" | "fna" | "faa" | "ffn" | "frn" => Some(FileFormat::Fasta),
        // NEXUS extensions
        "nex" | "nexus" | "nxs" => Some(FileFormat::Nexus),
        // GenBank extensions
        "gb" | "gbk" | "gbff" | "genbank" => Some(FileFormat::Genbank),
        _ => None,
    }
}

/// Detects the file format by examining the content.
pub fn detect_format_from_content(content: &str) -> Option<FileFormat> {
    for line in content.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        // NEXUS: starts with #NEXUS (case-insensitive) - most specific
        if trimmed.to_uppercase().starts_with("#NEXUS") {
            return Some(FileFormat::Nexus);
        }

        // FASTA: starts with > - very clear indicator
        if trimmed.starts_with('>') {
            return Some(FileFormat::Fasta);
        }

        // GenBank: flat files open with an uppercase LOCUS line
        if trimmed.starts_with("LOCUS ") || trimmed.starts_with("LOCUS\t") {
            return Some(FileFormat::Genbank);
        }

        // First non-empty line doesn't match any known format
        return None;
    }

    None
}

/// Tries to parse with multiple formats, returning the first success.
fn try_parse_formats(
    content: &str,
    formats: &[FileFormat],
) -> ParseResult<(GeneAlignment, FileFormat)> {
    let mut last_error = None;

    for &format in formats {
        match parse_content(content, format) {
            Ok(collection) => return Ok((collection, format)),
            Err(e) => last_error = Some(e),
        }
    }

    Err(last_error.unwrap_or(ParseError::UnknownFormat))
}

/// Parses content with a specific format.
fn parse_content(content: &str, format: FileFormat) -> ParseResult<GeneAlignment> {
    match format {
        FileFormat::Fasta => fasta::parse_fasta_str(content).map_err(ParseError::FastaError),
        FileFormat::Nexus => nexus::parse_nexus_str(content).map_err(ParseError::NexusError),
        FileFormat::Genbank => {
            genbank::parse_genbank_str(content).map_err(ParseError::GenbankError)
        }
    }
}

/// Reads one input file into a collection, with optional forced format.
///
/// Detection priority:
/// 1. Explicit format (if provided)
/// 2. File extension
/// 3. Content-based detection
/// 4. Try all formats (FASTA first as most common, then NEXUS, then GenBank)
pub fn read_collection_with_options<P: AsRef<Path>>(
    path: P,
    forced_format: Option<FileFormat>,
) -> ParseResult<GeneAlignment> {
    let file = File::open(&path)?;
    let metadata = file.metadata()?;
    let file_size = metadata.len() as usize;

    if file_size == 0 {
        return Err(ParseError::EmptyFile);
    }

    let mut reader = BufReader::with_capacity(1024 * 1024, file);
    let mut content = String::with_capacity(file_size);
    reader.read_to_string(&mut content)?;

    // 1. Use explicit format if provided
    if let Some(format) = forced_format {
        return parse_content(&content, format);
    }

    // 2. Try to detect from extension
    if let Some(format) = detect_format_from_extension(&path) {
        match parse_content(&content, format) {
            Ok(collection) => return Ok(collection),
            Err(_) => {
                // Extension didn't work, fall through to content detection
            }
        }
    }

    // 3. Try content-based detection
    if let Some(format) = detect_format_from_content(&content) {
        return parse_content(&content, format);
    }

    // 4. Last resort: try all formats in order of likelihood
    match try_parse_formats(
        &content,
        &[FileFormat::Fasta, FileFormat::Nexus, FileFormat::Genbank],
    ) {
        Ok((collection, _)) => Ok(collection),
        Err(_) => Err(ParseError::UnknownFormat),
    }
}

/// Reads one input file, automatically detecting the format.
/// Convenience wrapper around read_collection_with_options.
pub fn read_collection<P: AsRef<Path>>(path: P) -> ParseResult<GeneAlignment> {
    read_collection_with_options(path, None)
}

/// Reads one input file with an explicit format.
pub fn read_collection_as<P: AsRef<Path>>(
    path: P,
    format: FileFormat,
) -> ParseResult<GeneAlignment> {
    read_collection_with_options(path, Some(format))
}

/// Writes CHARSET partition text to a file, creating parent directories.
///
/// The text is written with exactly one trailing newline.
pub fn write_partition_file<P: AsRef<Path>>(path: P, charsets: &str) -> io::Result<()> {
    ensure_parent_dir(path.as_ref())?;
    fs::write(path, format!("{}\n", charsets.trim_end()))
}

/// Creates the parent directory of an output path if it does not exist.
pub(crate) fn ensure_parent_dir(path: &Path) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_detect_fasta() {
        let content = ">seq1\nACGT\n";
        assert_eq!(detect_format_from_content(content), Some(FileFormat::Fasta));
    }

    #[test]
    fn test_detect_nexus() {
        let content = "#NEXUS\nBEGIN DATA;\n";
        assert_eq!(detect_format_from_content(content), Some(FileFormat::Nexus));

        // Case insensitive
        let content2 = "#nexus\nbegin data;\n";
        assert_eq!(detect_format_from_content(content2), Some(FileFormat::Nexus));
    }

    #[test]
    fn test_detect_genbank() {
        let content = "LOCUS       AB000001     9 bp    DNA     linear   PLN 01-JAN-2020\n";
        assert_eq!(
            detect_format_from_content(content),
            Some(FileFormat::Genbank)
        );
    }

    #[test]
    fn test_detect_unknown() {
        let content = "This is not a valid sequence file\n";
        assert_eq!(detect_format_from_content(content), None);
    }

    #[test]
    fn test_detect_with_leading_empty_lines() {
        let content = "\n\n  \n>seq1\nACGT\n";
        assert_eq!(detect_format_from_content(content), Some(FileFormat::Fasta));
    }

    #[test]
    fn test_detect_from_extension() {
        assert_eq!(detect_format_from_extension("test.fa"), Some(FileFormat::Fasta));
        assert_eq!(detect_format_from_extension("test.fasta"), Some(FileFormat::Fasta));
        assert_eq!(detect_format_from_extension("test.nex"), Some(FileFormat::Nexus));
        assert_eq!(detect_format_from_extension("test.nexus"), Some(FileFormat::Nexus));
        assert_eq!(detect_format_from_extension("test.gb"), Some(FileFormat::Genbank));
        assert_eq!(detect_format_from_extension("test.gbff"), Some(FileFormat::Genbank));
        assert_eq!(detect_format_from_extension("test.GBK"), Some(FileFormat::Genbank));
        assert_eq!(detect_format_from_extension("test.txt"), None);
        assert_eq!(detect_format_from_extension("test.aln"), None);
    }

    #[test]
    fn test_read_collection_empty_file() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let err = read_collection(file.path()).unwrap_err();
        assert!(matches!(err, ParseError::EmptyFile));
    }

    #[test]
    fn test_read_collection_detects_fasta_without_extension() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, ">T1\nACGT\n>T2\nTGCA\n").unwrap();
        let collection = read_collection(file.path()).unwrap();
        assert_eq!(collection.taxon_count(), 2);
        assert_eq!(collection.get("T1"), Some("ACGT"));
    }

    #[test]
    fn test_read_collection_forced_format_wins() {
        // Misleading .nex extension; forcing FASTA must bypass detection.
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gene.nex");
        fs::write(&path, ">T1\nACGT\n").unwrap();

        assert!(read_collection_as(&path, FileFormat::Nexus).is_err());
        let collection = read_collection_as(&path, FileFormat::Fasta).unwrap();
        assert_eq!(collection.get("T1"), Some("ACGT"));
    }

    #[test]
    fn test_read_collection_extension_mismatch_recovers() {
        // Auto mode retries by content when the extension parser fails.
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gene.fasta");
        fs::write(&path, "#NEXUS\nBegin data;\nDimensions ntax=1 nchar=4;\nMatrix\nT1 ACGT\n;\nEnd;\n")
            .unwrap();
        let collection = read_collection(&path).unwrap();
        assert_eq!(collection.get("T1"), Some("ACGT"));
    }

    #[test]
    fn test_write_partition_file_creates_parents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("run_partition.txt");
        write_partition_file(&path, "CHARSET gene1 = 1-3;").unwrap();
        let written = fs::read_to_string(&path).unwrap();
        assert_eq!(written, "CHARSET gene1 = 1-3;\n");
    }
}
