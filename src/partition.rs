//! Partition bookkeeping for the concatenated alignment.
//!
//! Each input file occupies a contiguous, 1-indexed, inclusive column range
//! of the supermatrix. A [`Partition`] records that range; CHARSET text
//! rendering and the codon-position expansion live here as well.
//!
//! Codon sub-partitions stay declarative: a [`StrideRange`] names every
//! third column without materializing the positions, matching the NEXUS
//! stride notation (`2-300\3`) understood by PAUP*, MrBayes and IQ-TREE.

use std::fmt;

/// One input file's span in the supermatrix.
///
/// `start` and `end` are 1-indexed and inclusive. An empty input file
/// yields a zero-width record with `end == start - 1`, kept so the
/// partition list always lines up with the input file list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Partition {
    /// Partition label (`gene1`, `gene2`, ... by input order)
    pub label: String,
    /// First column, 1-indexed
    pub start: usize,
    /// Last column, inclusive
    pub end: usize,
}

impl Partition {
    /// Creates a partition record.
    ///
    /// Panics if the range is malformed (`end + 1 < start`); widths below
    /// zero cannot arise from concatenation and indicate a caller bug.
    pub fn new(label: impl Into<String>, start: usize, end: usize) -> Self {
        assert!(start >= 1, "partition columns are 1-indexed");
        assert!(
            end + 1 >= start,
            "partition has negative width: {}-{}",
            start,
            end
        );
        Self {
            label: label.into(),
            start,
            end,
        }
    }

    /// Number of columns covered; zero for an empty input file.
    pub fn width(&self) -> usize {
        self.end + 1 - self.start
    }

    /// Returns true if this partition covers no columns.
    pub fn is_empty(&self) -> bool {
        self.end < self.start
    }

    /// Returns true if the 1-indexed column falls inside this partition.
    pub fn contains(&self, column: usize) -> bool {
        column >= self.start && column <= self.end
    }

    /// Reading-frame position (1, 2 or 3) of a column within this gene,
    /// counting from the partition start.
    pub fn codon_position(&self, column: usize) -> Option<u8> {
        if self.contains(column) {
            Some(((column - self.start) % 3) as u8 + 1)
        } else {
            None
        }
    }

    /// Expands this partition into its three codon-position ranges.
    ///
    /// Position N covers columns `start + N - 1, start + N + 2, ...` up to
    /// `end`. Ranges may be empty for genes narrower than three columns.
    pub fn codon_positions(&self) -> [StrideRange; 3] {
        assert!(
            self.end + 1 >= self.start,
            "partition {} has negative width: {}-{}",
            self.label,
            self.start,
            self.end
        );
        [
            StrideRange::new(self.start, self.end, 3),
            StrideRange::new(self.start + 1, self.end, 3),
            StrideRange::new(self.start + 2, self.end, 3),
        ]
    }
}

/// A sampled column range: `start`, `start + step`, ... up to `end`.
///
/// Displays in NEXUS stride notation, e.g. `4-300\3`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StrideRange {
    /// First sampled column, 1-indexed
    pub start: usize,
    /// Upper bound, inclusive
    pub end: usize,
    /// Distance between sampled columns
    pub step: usize,
}

impl StrideRange {
    /// Creates a stride range.
    pub fn new(start: usize, end: usize, step: usize) -> Self {
        debug_assert!(step > 0, "stride step must be positive");
        Self { start, end, step }
    }

    /// Returns true if no column is sampled (`start` past `end`).
    pub fn is_empty(&self) -> bool {
        self.start > self.end
    }

    /// Iterates over the sampled columns, materialized on demand.
    pub fn positions(&self) -> impl Iterator<Item = usize> {
        (self.start..=self.end).step_by(self.step)
    }
}

impl fmt::Display for StrideRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}\\{}", self.start, self.end, self.step)
    }
}

/// Renders the CHARSET lines for a partition list.
///
/// One `CHARSET label = start-end;` line per partition, in order. With
/// `codon` set, each partition is followed by its three `_pos1`/`_pos2`/
/// `_pos3` stride lines. The text carries no trailing newline.
pub fn charset_text(partitions: &[Partition], codon: bool) -> String {
    let mut lines = Vec::with_capacity(partitions.len() * if codon { 4 } else { 1 });
    for partition in partitions {
        lines.push(format!(
            "CHARSET {} = {}-{};",
            partition.label, partition.start, partition.end
        ));
        if codon {
            let [pos1, pos2, pos3] = partition.codon_positions();
            lines.push(format!("CHARSET {}_pos1 = {};", partition.label, pos1));
            lines.push(format!("CHARSET {}_pos2 = {};", partition.label, pos2));
            lines.push(format!("CHARSET {}_pos3 = {};", partition.label, pos3));
        }
    }
    lines.join("\n")
}
