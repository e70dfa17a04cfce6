// ============================================================
// Layer 4 - Dataset Statistics
// ============================================================
// Two quick looks at the training split before any training:
//
//   - how long the tweets are (to sanity check maxlen)
//   - how many examples each emotion has (class imbalance)

use std::collections::BTreeMap;

use crate::domain::tweet::Tweet;

#[derive(Debug, Clone, PartialEq)]
pub struct LengthStats {
    /// word count -> number of tweets
    pub histogram: BTreeMap<usize, usize>,
    pub min:       usize,
    pub max:       usize,
    pub mean:      f64,
}

impl LengthStats {
    pub fn from_tweets(tweets: &[Tweet]) -> Self {
        let mut histogram = BTreeMap::new();
        let mut total = 0usize;
        for t in tweets {
            let n = t.word_count();
            *histogram.entry(n).or_insert(0) += 1;
            total += n;
        }
        Self {
            min:  histogram.keys().next().copied().unwrap_or(0),
            max:  histogram.keys().next_back().copied().unwrap_or(0),
            mean: if tweets.is_empty() { 0.0 } else { total as f64 / tweets.len() as f64 },
            histogram,
        }
    }

    /// How many tweets have more than `maxlen` words and will be cut.
    pub fn longer_than(&self, maxlen: usize) -> usize {
        self.histogram.range(maxlen + 1..).map(|(_, c)| c).sum()
    }
}

/// label -> number of tweets, sorted by label
pub fn class_distribution(tweets: &[Tweet]) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for t in tweets {
        *counts.entry(t.label.clone()).or_insert(0) += 1;
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tweets() -> Vec<Tweet> {
        vec![
            Tweet::new("i feel sad", "sadness"),
            Tweet::new("so happy today friends", "joy"),
            Tweet::new("yay", "joy"),
        ]
    }

    #[test]
    fn test_length_stats() {
        let stats = LengthStats::from_tweets(&tweets());
        assert_eq!(stats.min, 1);
        assert_eq!(stats.max, 4);
        assert!((stats.mean - 8.0 / 3.0).abs() < 1e-9);
        assert_eq!(stats.histogram.get(&3), Some(&1));
        assert_eq!(stats.longer_than(2), 2);
        assert_eq!(stats.longer_than(50), 0);
    }

    #[test]
    fn test_class_distribution() {
        let dist = class_distribution(&tweets());
        assert_eq!(dist.get("joy"), Some(&2));
        assert_eq!(dist.get("sadness"), Some(&1));
    }

    #[test]
    fn test_empty_input() {
        let stats = LengthStats::from_tweets(&[]);
        assert_eq!(stats.max, 0);
        assert_eq!(stats.mean, 0.0);
    }
}
