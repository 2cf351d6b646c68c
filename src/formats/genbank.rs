//! GenBank flat-file reading.
//!
//! Record parsing is delegated to the `gb-io` crate; this module only
//! maps records onto the taxon model. The taxon label is the first word
//! of the source organism when present, falling back to the locus name,
//! then the accession, then a positional `record_N` label. Matching on
//! the organism's first word keeps GenBank inputs mergeable with FASTA
//! files naming the same taxa.

use gb_io::reader::SeqReader;
use gb_io::seq::Seq;
use thiserror::Error;

use crate::model::GeneAlignment;

/// Errors that can occur during GenBank parsing.
#[derive(Error, Debug)]
pub enum GenbankError {
    #[error("Empty GenBank file")]
    EmptyFile,

    #[error("Failed to parse GenBank data: {0}")]
    Parse(#[from] gb_io::reader::GbParserError),
}

/// Result type for GenBank operations.
pub type GenbankResult<T> = Result<T, GenbankError>;

/// Parses GenBank flat-file content into a collection.
pub fn parse_genbank_str(content: &str) -> GenbankResult<GeneAlignment> {
    let mut collection = GeneAlignment::new();
    let mut record_count = 0usize;

    for record in SeqReader::new(content.as_bytes()) {
        let record = record?;
        record_count += 1;
        let taxon = taxon_label(&record, record_count);
        let data = String::from_utf8_lossy(&record.seq).into_owned();
        collection.insert(taxon, data);
    }

    if record_count == 0 {
        return Err(GenbankError::EmptyFile);
    }

    Ok(collection)
}

/// Picks the taxon label for one record.
fn taxon_label(record: &Seq, index: usize) -> String {
    record
        .source
        .as_ref()
        .and_then(|source| source.organism.as_deref())
        .and_then(|organism| organism.split_whitespace().next())
        .map(str::to_string)
        .or_else(|| record.name.clone())
        .or_else(|| record.accession.clone())
        .unwrap_or_else(|| format!("record_{index}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(organism: &str, locus: &str, seq: &str) -> String {
        let lines = [
            format!(
                "LOCUS       {:<16} {} bp    DNA     linear   PLN 01-JAN-2020",
                locus,
                seq.len()
            ),
            "DEFINITION  test record.".to_string(),
            format!("ACCESSION   {locus}"),
            "SOURCE      test isolate".to_string(),
            format!("  ORGANISM  {organism}"),
            "            Eukaryota.".to_string(),
            "ORIGIN".to_string(),
            format!("{:>9} {}", 1, seq.to_lowercase()),
            "//".to_string(),
        ];
        let mut text = lines.join("\n");
        text.push('\n');
        text
    }

    #[test]
    fn test_parse_single_record_uses_organism() {
        let content = record("Taxon1 voucher X12", "AB000001", "ACGTACGTA");
        let collection = parse_genbank_str(&content).unwrap();
        assert_eq!(collection.taxon_count(), 1);
        assert_eq!(collection.get("Taxon1"), Some("acgtacgta"));
    }

    #[test]
    fn test_parse_multiple_records() {
        let content = format!(
            "{}{}",
            record("Taxon1", "AB000001", "ACGTACGTA"),
            record("Taxon2", "AB000002", "TTTTACGTA")
        );
        let collection = parse_genbank_str(&content).unwrap();
        assert_eq!(collection.taxon_count(), 2);
        let taxa: Vec<&str> = collection.taxa().collect();
        assert_eq!(taxa, vec!["Taxon1", "Taxon2"]);
    }

    #[test]
    fn test_parse_empty_content() {
        assert!(matches!(
            parse_genbank_str(""),
            Err(GenbankError::EmptyFile)
        ));
    }

    #[test]
    fn test_taxon_label_fallbacks() {
        let mut record = Seq::empty();
        record.name = Some("LOC123".to_string());
        assert_eq!(taxon_label(&record, 1), "LOC123");

        record.name = None;
        record.accession = Some("AB000001".to_string());
        assert_eq!(taxon_label(&record, 1), "AB000001");

        record.accession = None;
        assert_eq!(taxon_label(&record, 4), "record_4");
    }
}
