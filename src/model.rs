//! Data model for gene collections and the merged supermatrix.
//!
//! This module contains the structures shared by the whole crate:
//! - [`Sequence`]: one taxon row (identifier plus residue data)
//! - [`GeneAlignment`]: the sequences read from a single input file
//! - [`Supermatrix`]: the concatenated alignment with its partition map
//!
//! A [`GeneAlignment`] keeps its taxa in a sorted map, so every consumer
//! observes the same deterministic taxon order regardless of input order.

use std::collections::BTreeMap;

use thiserror::Error;

use crate::partition::Partition;
use crate::stats::{compute_stats, AlignmentStats};

/// Represents a single sequence with its identifier and data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sequence {
    /// The taxon identifier (from FASTA header, NEXUS label, or GenBank organism)
    pub id: String,
    /// The sequence data (nucleotides or amino acids, gaps and filler included)
    pub data: String,
}

impl Sequence {
    /// Creates a new sequence.
    pub fn new(id: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            data: data.into(),
        }
    }

    /// Returns the length of the sequence.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns true if the sequence is empty.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Gets a character at a specific position.
    pub fn char_at(&self, pos: usize) -> Option<char> {
        self.data.chars().nth(pos)
    }
}

/// Error raised when the sequences of one collection disagree in length.
///
/// Concatenation is positional, so every sequence of a gene must cover the
/// same number of columns before it can contribute to the supermatrix.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("sequences have inconsistent lengths: {lengths:?}")]
pub struct LengthMismatch {
    /// The distinct lengths observed, sorted ascending.
    pub lengths: Vec<usize>,
}

/// The sequences read from a single input file, keyed by taxon.
///
/// Inserting a taxon that is already present replaces its sequence; the
/// last record in a file wins. Iteration order is always lexicographic.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GeneAlignment {
    taxa: BTreeMap<String, String>,
}

impl GeneAlignment {
    /// Creates an empty collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a collection from (taxon, sequence) pairs.
    pub fn from_pairs<I, S, T>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (S, T)>,
        S: Into<String>,
        T: Into<String>,
    {
        let mut collection = Self::new();
        for (taxon, data) in pairs {
            collection.insert(taxon, data);
        }
        collection
    }

    /// Inserts one taxon, replacing any previous sequence under that name.
    pub fn insert(&mut self, taxon: impl Into<String>, data: impl Into<String>) {
        let taxon = taxon.into();
        debug_assert!(!taxon.is_empty(), "taxon identifiers must be non-empty");
        self.taxa.insert(taxon, data.into());
    }

    /// Looks up the sequence for a taxon.
    pub fn get(&self, taxon: &str) -> Option<&str> {
        self.taxa.get(taxon).map(String::as_str)
    }

    /// Iterates over taxon identifiers in lexicographic order.
    pub fn taxa(&self) -> impl Iterator<Item = &str> {
        self.taxa.keys().map(String::as_str)
    }

    /// Iterates over (taxon, sequence) pairs in lexicographic order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.taxa.iter().map(|(t, s)| (t.as_str(), s.as_str()))
    }

    /// Returns the number of taxa in this collection.
    pub fn taxon_count(&self) -> usize {
        self.taxa.len()
    }

    /// Returns true if the collection holds no taxa.
    pub fn is_empty(&self) -> bool {
        self.taxa.is_empty()
    }

    /// Returns the shared sequence length of this collection.
    ///
    /// An empty collection has length 0. If the sequences disagree, the
    /// error lists every distinct length observed.
    pub fn consistent_length(&self) -> Result<usize, LengthMismatch> {
        let mut lengths: Vec<usize> = self.taxa.values().map(String::len).collect();
        lengths.sort_unstable();
        lengths.dedup();
        match lengths.as_slice() {
            [] => Ok(0),
            [len] => Ok(*len),
            _ => Err(LengthMismatch { lengths }),
        }
    }
}

/// The concatenated alignment: one row per taxon, plus the partition map
/// recording which columns came from which input file.
///
/// Rows are sorted by taxon identifier and all have the same length.
/// Taxa absent from an input file are padded with `missing` over that
/// file's columns.
#[derive(Debug, Clone, PartialEq)]
pub struct Supermatrix {
    /// Concatenated rows, sorted by taxon identifier
    pub sequences: Vec<Sequence>,
    /// One partition per input file, in input order
    pub partitions: Vec<Partition>,
    /// The filler character used for absent taxa
    pub missing: char,
}

impl Supermatrix {
    /// Returns the number of taxa (rows).
    pub fn taxon_count(&self) -> usize {
        self.sequences.len()
    }

    /// Returns the total alignment length in columns.
    pub fn alignment_length(&self) -> usize {
        self.sequences.first().map_or(0, Sequence::len)
    }

    /// Returns true if the supermatrix holds no rows.
    pub fn is_empty(&self) -> bool {
        self.sequences.is_empty()
    }

    /// Gets a row by index.
    pub fn get(&self, index: usize) -> Option<&Sequence> {
        self.sequences.get(index)
    }

    /// Looks up the concatenated sequence for a taxon.
    pub fn sequence_for(&self, taxon: &str) -> Option<&str> {
        self.sequences
            .iter()
            .find(|s| s.id == taxon)
            .map(|s| s.data.as_str())
    }

    /// Finds the partition covering a 1-indexed column.
    ///
    /// Returns the partition's index alongside it. Zero-width partitions
    /// cover no columns and are never returned.
    pub fn partition_at(&self, column: usize) -> Option<(usize, &Partition)> {
        self.partitions
            .iter()
            .enumerate()
            .find(|(_, p)| p.contains(column))
    }

    /// Computes summary statistics for this supermatrix.
    pub fn stats(&self) -> AlignmentStats {
        compute_stats(&self.sequences, self.missing)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequence_creation() {
        let seq = Sequence::new("seq1", "ACGT");
        assert_eq!(seq.id, "seq1");
        assert_eq!(seq.data, "ACGT");
        assert_eq!(seq.len(), 4);
    }

    #[test]
    fn test_sequence_char_at() {
        let seq = Sequence::new("seq1", "ACGT");
        assert_eq!(seq.char_at(0), Some('A'));
        assert_eq!(seq.char_at(3), Some('T'));
        assert_eq!(seq.char_at(4), None);
    }

    #[test]
    fn test_collection_sorted_iteration() {
        let collection = GeneAlignment::from_pairs([("T3", "AA"), ("T1", "CC"), ("T2", "GG")]);
        let taxa: Vec<&str> = collection.taxa().collect();
        assert_eq!(taxa, vec!["T1", "T2", "T3"]);
    }

    #[test]
    fn test_collection_duplicate_taxon_replaces() {
        let collection = GeneAlignment::from_pairs([("T1", "AAAA"), ("T1", "CCCC")]);
        assert_eq!(collection.taxon_count(), 1);
        assert_eq!(collection.get("T1"), Some("CCCC"));
    }

    #[test]
    fn test_consistent_length_ok() {
        let collection = GeneAlignment::from_pairs([("T1", "ACGT"), ("T2", "TGCA")]);
        assert_eq!(collection.consistent_length(), Ok(4));
    }

    #[test]
    fn test_consistent_length_empty_collection() {
        assert_eq!(GeneAlignment::new().consistent_length(), Ok(0));
    }

    #[test]
    fn test_consistent_length_mismatch_lists_distinct_sorted() {
        let collection =
            GeneAlignment::from_pairs([("T1", "ACGT"), ("T2", "TG"), ("T3", "GGGG")]);
        let err = collection.consistent_length().unwrap_err();
        assert_eq!(err.lengths, vec![2, 4]);
    }

    #[test]
    fn test_supermatrix_partition_at() {
        let matrix = Supermatrix {
            sequences: vec![Sequence::new("T1", "AAACCC")],
            partitions: vec![
                Partition::new("gene1", 1, 3),
                Partition::new("gene2", 4, 3),
                Partition::new("gene3", 4, 6),
            ],
            missing: '?',
        };
        assert_eq!(matrix.partition_at(1).map(|(i, _)| i), Some(0));
        assert_eq!(matrix.partition_at(3).map(|(i, _)| i), Some(0));
        // Column 4 belongs to gene3; the zero-width gene2 covers nothing.
        let (idx, partition) = matrix.partition_at(4).unwrap();
        assert_eq!(idx, 2);
        assert_eq!(partition.label, "gene3");
        assert_eq!(matrix.partition_at(7), None);
    }

    #[test]
    fn test_supermatrix_accessors() {
        let matrix = Supermatrix {
            sequences: vec![
                Sequence::new("T1", "AAACCC"),
                Sequence::new("T2", "GGGTTT"),
            ],
            partitions: vec![Partition::new("gene1", 1, 6)],
            missing: '?',
        };
        assert_eq!(matrix.taxon_count(), 2);
        assert_eq!(matrix.alignment_length(), 6);
        assert_eq!(matrix.sequence_for("T2"), Some("GGGTTT"));
        assert_eq!(matrix.sequence_for("T9"), None);
    }
}
