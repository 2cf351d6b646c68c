//! Summary statistics over a merged alignment.

use crate::model::Sequence;

/// Counts derived from a merged alignment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AlignmentStats {
    /// Number of rows
    pub num_taxa: usize,
    /// Alignment length in columns
    pub alignment_length: usize,
    /// Occurrences of the missing-data character
    pub missing_count: usize,
    /// Missing-data proportion as a percentage, rounded to two decimals
    pub missing_percent: f64,
}

impl AlignmentStats {
    fn zero() -> Self {
        Self {
            num_taxa: 0,
            alignment_length: 0,
            missing_count: 0,
            missing_percent: 0.0,
        }
    }
}

/// Computes summary counts for an alignment.
///
/// The scan counts literal occurrences of `missing` anywhere in the rows;
/// filler introduced by merging and characters already present in the
/// inputs are indistinguishable here. An empty alignment yields all-zero
/// stats.
pub fn compute_stats(sequences: &[Sequence], missing: char) -> AlignmentStats {
    if sequences.is_empty() {
        return AlignmentStats::zero();
    }

    let num_taxa = sequences.len();
    let alignment_length = sequences[0].len();
    let missing_count: usize = sequences
        .iter()
        .map(|s| s.data.matches(missing).count())
        .sum();

    let total_positions = num_taxa * alignment_length;
    let missing_percent = if total_positions == 0 {
        0.0
    } else {
        round2(missing_count as f64 / total_positions as f64 * 100.0)
    };

    AlignmentStats {
        num_taxa,
        alignment_length,
        missing_count,
        missing_percent,
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows(data: &[(&str, &str)]) -> Vec<Sequence> {
        data.iter().map(|(id, seq)| Sequence::new(*id, *seq)).collect()
    }

    #[test]
    fn test_stats_counts_and_rounds() {
        // 3 taxa x 8 columns, two '?' fillers: 2/24 = 8.333... -> 8.33
        let sequences = rows(&[
            ("T1", "AAAAAAAA"),
            ("T2", "CCCCCC??"),
            ("T3", "GGGGGGGG"),
        ]);
        let stats = compute_stats(&sequences, '?');
        assert_eq!(stats.num_taxa, 3);
        assert_eq!(stats.alignment_length, 8);
        assert_eq!(stats.missing_count, 2);
        assert!((stats.missing_percent - 8.33).abs() < 1e-9);
    }

    #[test]
    fn test_stats_counts_embedded_filler() {
        // Input-borne '?' counts the same as padding.
        let sequences = rows(&[("T1", "A?G"), ("T2", "???")]);
        let stats = compute_stats(&sequences, '?');
        assert_eq!(stats.missing_count, 4);
        assert!((stats.missing_percent - 66.67).abs() < 1e-9);
    }

    #[test]
    fn test_stats_respects_missing_char() {
        let sequences = rows(&[("T1", "NN?A")]);
        let stats = compute_stats(&sequences, 'N');
        assert_eq!(stats.missing_count, 2);
        assert!((stats.missing_percent - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_stats_empty_alignment() {
        let stats = compute_stats(&[], '?');
        assert_eq!(stats.num_taxa, 0);
        assert_eq!(stats.alignment_length, 0);
        assert_eq!(stats.missing_count, 0);
        assert_eq!(stats.missing_percent, 0.0);
    }

    #[test]
    fn test_stats_zero_length_rows() {
        let sequences = rows(&[("T1", ""), ("T2", "")]);
        let stats = compute_stats(&sequences, '?');
        assert_eq!(stats.num_taxa, 2);
        assert_eq!(stats.alignment_length, 0);
        assert_eq!(stats.missing_percent, 0.0);
    }

    #[test]
    fn test_stats_no_missing_data() {
        let sequences = rows(&[("T1", "ACGT"), ("T2", "TGCA")]);
        let stats = compute_stats(&sequences, '?');
        assert_eq!(stats.missing_count, 0);
        assert_eq!(stats.missing_percent, 0.0);
    }
}
