//! Lexicon-based sentiment backend.

use std::collections::HashMap;

use unicode_segmentation::UnicodeSegmentation;

use super::{SentimentModel, LABEL_NEGATIVE, LABEL_POSITIVE};
use crate::error::Result;

/// Dictionary-based sentiment model.
///
/// Scores a text as the sum of per-word polarity weights from its lexicon;
/// non-negative totals classify as positive. Words are lowercased before
/// lookup, so the lexicon only needs lowercase entries.
pub struct LexiconModel {
    lexicon: HashMap<String, f64>,
}

impl LexiconModel {
    /// Model backed by the lexicon compiled into the library.
    pub fn bundled() -> Self {
        // Lines are `word<space>weight`; `#` starts a comment.
        let lexicon = include_str!("../../resources/sentiment_lexicon_en.txt")
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .filter_map(|line| {
                let (word, weight) = line.split_once(' ')?;
                Some((word.to_string(), weight.trim().parse::<f64>().ok()?))
            })
            .collect();
        Self { lexicon }
    }

    /// Model with a caller-supplied lexicon (positive weights > 0).
    pub fn with_lexicon(lexicon: HashMap<String, f64>) -> Self {
        Self { lexicon }
    }

    fn score(&self, text: &str) -> f64 {
        text.unicode_words()
            .map(|word| {
                self.lexicon
                    .get(&word.to_lowercase())
                    .copied()
                    .unwrap_or(0.0)
            })
            .sum()
    }
}

impl SentimentModel for LexiconModel {
    fn predict(&self, text: &str) -> Result<String> {
        let label = if self.score(text) >= 0.0 {
            LABEL_POSITIVE
        } else {
            LABEL_NEGATIVE
        };
        Ok(label.to_string())
    }
}
