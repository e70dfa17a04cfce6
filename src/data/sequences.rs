// ============================================================
// Layer 4 - Padding and Truncation
// ============================================================
// The model takes a fixed input shape, so every token sequence
// is forced to exactly `maxlen` ids:
//
//   maxlen = 5, Post/Post
//     [4, 9, 2]             -> [4, 9, 2, 0, 0]
//     [4, 9, 2, 7, 3, 8, 1] -> [4, 9, 2, 7, 3]
//
//   maxlen = 5, Pre/Pre
//     [4, 9, 2]             -> [0, 0, 4, 9, 2]
//     [4, 9, 2, 7, 3, 8, 1] -> [2, 7, 3, 8, 1]

use serde::{Deserialize, Serialize};

/// Which side receives the padding value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Padding {
    Pre,
    #[default]
    Post,
}

/// Which side loses ids when a sequence is too long
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Truncating {
    Pre,
    #[default]
    Post,
}

/// Pad or truncate one sequence to exactly `maxlen` ids.
pub fn pad_sequence(
    seq:        &[u32],
    maxlen:     usize,
    padding:    Padding,
    truncating: Truncating,
    value:      u32,
) -> Vec<u32> {
    let kept: &[u32] = if seq.len() > maxlen {
        match truncating {
            Truncating::Post => &seq[..maxlen],
            Truncating::Pre  => &seq[seq.len() - maxlen..],
        }
    } else {
        seq
    };

    let fill = maxlen - kept.len();
    let mut out = Vec::with_capacity(maxlen);
    match padding {
        Padding::Post => {
            out.extend_from_slice(kept);
            out.resize(maxlen, value);
        }
        Padding::Pre => {
            out.resize(fill, value);
            out.extend_from_slice(kept);
        }
    }
    out
}

/// Apply `pad_sequence` to every sequence.
pub fn pad_sequences(
    seqs:       &[Vec<u32>],
    maxlen:     usize,
    padding:    Padding,
    truncating: Truncating,
    value:      u32,
) -> Vec<Vec<u32>> {
    seqs.iter()
        .map(|s| pad_sequence(s, maxlen, padding, truncating, value))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_post_padding() {
        let out = pad_sequence(&[4, 9, 2], 5, Padding::Post, Truncating::Post, 0);
        assert_eq!(out, vec![4, 9, 2, 0, 0]);
    }

    #[test]
    fn test_pre_padding() {
        let out = pad_sequence(&[4, 9, 2], 5, Padding::Pre, Truncating::Post, 0);
        assert_eq!(out, vec![0, 0, 4, 9, 2]);
    }

    #[test]
    fn test_post_truncation_keeps_head() {
        let out = pad_sequence(&[4, 9, 2, 7, 3, 8, 1], 5, Padding::Post, Truncating::Post, 0);
        assert_eq!(out, vec![4, 9, 2, 7, 3]);
    }

    #[test]
    fn test_pre_truncation_keeps_tail() {
        let out = pad_sequence(&[4, 9, 2, 7, 3, 8, 1], 5, Padding::Post, Truncating::Pre, 0);
        assert_eq!(out, vec![2, 7, 3, 8, 1]);
    }

    #[test]
    fn test_empty_sequence_is_all_padding() {
        let out = pad_sequence(&[], 4, Padding::Post, Truncating::Post, 0);
        assert_eq!(out, vec![0; 4]);
    }

    #[test]
    fn test_every_output_has_maxlen() {
        let seqs = vec![vec![], vec![1; 3], vec![2; 50], vec![3; 120]];
        for padded in pad_sequences(&seqs, 50, Padding::Post, Truncating::Post, 0) {
            assert_eq!(padded.len(), 50);
        }
    }
}
