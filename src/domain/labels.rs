// ============================================================
// Layer 3 - Label Encoder
// ============================================================
// A bijection between emotion names and class ids.
//
// The encoder is fitted on whatever labels appear in the
// training split. Classes are kept in sorted order so the same
// data always produces the same ids, which also fixes the row
// and column order of the confusion matrix.
//
//   ["joy", "anger", "joy", "fear"]
//       -> classes: [anger, fear, joy]
//       -> anger = 0, fear = 1, joy = 2

use std::collections::{BTreeSet, HashMap};

use crate::error::EmotionError;

#[derive(Debug, Clone)]
pub struct LabelEncoder {
    /// id -> label
    classes:  Vec<String>,
    /// label -> id
    index_of: HashMap<String, usize>,
}

impl LabelEncoder {
    /// Build the mapping from every label observed in `labels`.
    pub fn fit<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let unique: BTreeSet<String> = labels
            .into_iter()
            .map(|l| l.as_ref().to_string())
            .collect();

        let classes: Vec<String> = unique.into_iter().collect();
        let index_of = classes
            .iter()
            .enumerate()
            .map(|(i, c)| (c.clone(), i))
            .collect();

        Self { classes, index_of }
    }

    pub fn encode(&self, label: &str) -> Result<usize, EmotionError> {
        self.index_of
            .get(label)
            .copied()
            .ok_or_else(|| EmotionError::UnknownLabel(label.to_string()))
    }

    pub fn encode_all<'a, I>(&self, labels: I) -> Result<Vec<usize>, EmotionError>
    where
        I: IntoIterator<Item = &'a str>,
    {
        labels.into_iter().map(|l| self.encode(l)).collect()
    }

    pub fn decode(&self, id: usize) -> Result<&str, EmotionError> {
        self.classes
            .get(id)
            .map(String::as_str)
            .ok_or(EmotionError::UnknownClassId { id, classes: self.classes.len() })
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    /// Fail unless exactly `expected` distinct classes were observed.
    pub fn ensure_class_count(&self, expected: usize) -> Result<(), EmotionError> {
        if self.classes.len() == expected {
            Ok(())
        } else {
            Err(EmotionError::ClassCount {
                expected,
                found:  self.classes.len(),
                labels: self.classes.clone(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn six() -> LabelEncoder {
        LabelEncoder::fit(["sadness", "joy", "love", "anger", "fear", "surprise", "joy"])
    }

    #[test]
    fn test_ids_are_sorted_and_dense() {
        let enc = six();
        assert_eq!(
            enc.classes(),
            &["anger", "fear", "joy", "love", "sadness", "surprise"]
        );
        assert_eq!(enc.encode("anger").unwrap(), 0);
        assert_eq!(enc.encode("surprise").unwrap(), 5);
    }

    #[test]
    fn test_encode_decode_is_a_bijection() {
        let enc = six();
        for id in 0..enc.len() {
            let label = enc.decode(id).unwrap();
            assert_eq!(enc.encode(label).unwrap(), id);
        }
    }

    #[test]
    fn test_unknown_label_is_rejected() {
        let enc = six();
        assert!(matches!(
            enc.encode("boredom"),
            Err(EmotionError::UnknownLabel(l)) if l == "boredom"
        ));
        assert!(enc.decode(6).is_err());
    }

    #[test]
    fn test_class_count_check() {
        assert!(six().ensure_class_count(6).is_ok());
        let small = LabelEncoder::fit(["joy", "fear"]);
        assert!(matches!(
            small.ensure_class_count(6),
            Err(EmotionError::ClassCount { found: 2, .. })
        ));
    }

    #[test]
    fn test_encode_all() {
        let enc = six();
        let ids = enc.encode_all(["joy", "anger", "joy"]).unwrap();
        assert_eq!(ids, vec![2, 0, 2]);
    }
}
