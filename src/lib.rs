//! # seqcat - Supermatrix concatenation tool
//!
//! Merges per-gene sequence alignments into one concatenated,
//! taxon-aligned supermatrix, tracking where each gene lands in the
//! merged coordinate system.
//!
//! ## Architecture
//!
//! The merging core is pure and does no I/O:
//! - `model`: Gene alignments, the merged supermatrix, and its rows
//! - `merge`: Taxon union, length validation, and concatenation
//! - `partition`: Gene partition records and codon-position sub-ranges
//! - `stats`: Missing-data summary over the merged matrix
//!
//! Around it sit the boundary layers:
//! - `formats`: FASTA, NEXUS, and GenBank readers plus the writers
//! - `view`, `event`, `ui`, `controller`: optional terminal viewer of
//!   the merged supermatrix (Vim-style navigation)

pub mod controller;
pub mod event;
pub mod formats;
pub mod merge;
pub mod model;
pub mod partition;
pub mod stats;
pub mod ui;
pub mod view;
