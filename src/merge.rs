//! Concatenation of gene collections into a supermatrix.
//!
//! Merging walks the input collections in order, appending each taxon's
//! sequence to its output row, or a run of filler characters where the
//! taxon is absent from that file. Every collection is length-validated
//! before any row is built, so a bad input never produces partial output.

use std::collections::BTreeSet;

use thiserror::Error;

use crate::model::{GeneAlignment, LengthMismatch, Sequence, Supermatrix};
use crate::partition::Partition;

/// Error raised when a collection cannot be merged.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MergeError {
    /// One input collection failed length validation.
    #[error("gene{gene}: {source}")]
    InconsistentLengths {
        /// 1-based index of the offending collection, by input order
        gene: usize,
        source: LengthMismatch,
    },
}

impl MergeError {
    /// 1-based index of the input collection the error refers to.
    pub fn gene(&self) -> usize {
        match self {
            MergeError::InconsistentLengths { gene, .. } => *gene,
        }
    }
}

pub type MergeResult<T> = Result<T, MergeError>;

/// Collects the distinct taxon identifiers across all collections.
///
/// The result is the sorted union; a taxon appearing in several files
/// contributes a single entry.
pub fn resolve_taxa(collections: &[GeneAlignment]) -> BTreeSet<&str> {
    collections
        .iter()
        .flat_map(GeneAlignment::taxa)
        .collect()
}

/// Concatenates the collections into a [`Supermatrix`].
///
/// Rows are created for the full taxon union up front; a taxon missing
/// from a collection is padded with `missing` over that collection's
/// columns, never dropped and never added mid-merge. Partition records
/// follow input order with labels `gene1`, `gene2`, ... and contiguous
/// 1-indexed ranges; an empty collection yields a zero-width record.
pub fn merge(collections: &[GeneAlignment], missing: char) -> MergeResult<Supermatrix> {
    // Validate every collection before building anything.
    let mut gene_lengths = Vec::with_capacity(collections.len());
    for (index, collection) in collections.iter().enumerate() {
        let length = collection
            .consistent_length()
            .map_err(|source| MergeError::InconsistentLengths {
                gene: index + 1,
                source,
            })?;
        gene_lengths.push(length);
    }
    let total_length: usize = gene_lengths.iter().sum();

    // One row per taxon in the union, fixed before concatenation starts.
    let mut rows: Vec<Sequence> = resolve_taxa(collections)
        .into_iter()
        .map(|taxon| Sequence {
            id: taxon.to_string(),
            data: String::with_capacity(total_length),
        })
        .collect();

    let mut partitions = Vec::with_capacity(collections.len());
    let mut start = 1usize;
    for (index, (collection, &gene_length)) in
        collections.iter().zip(&gene_lengths).enumerate()
    {
        for row in &mut rows {
            match collection.get(&row.id) {
                Some(sequence) => row.data.push_str(sequence),
                None => row
                    .data
                    .extend(std::iter::repeat(missing).take(gene_length)),
            }
        }
        let end = start + gene_length - 1;
        partitions.push(Partition::new(format!("gene{}", index + 1), start, end));
        start = end + 1;
    }

    Ok(Supermatrix {
        sequences: rows,
        partitions,
        missing,
    })
}
