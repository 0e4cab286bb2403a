//! Word tokenization and emoji extraction.

pub mod emoji;

use std::collections::HashSet;

use unicode_segmentation::UnicodeSegmentation;

use crate::error::Result;
use crate::language::{Language, StopWordProvider};

/// Unicode-aware word tokenizer with optional stop-word removal.
///
/// Texts are joined with a single space and segmented along UAX-29 word
/// boundaries, so punctuation and emoji never surface as word tokens and
/// contractions stay whole. Stop words are compared exactly and
/// case-sensitively against the provider's list for the chat language.
pub struct Tokenizer {
    stop_words: Box<dyn StopWordProvider>,
}

impl Tokenizer {
    pub fn new(stop_words: Box<dyn StopWordProvider>) -> Self {
        Self { stop_words }
    }

    /// Tokenize `texts` in original textual order.
    pub fn tokenize(
        &self,
        texts: &[&str],
        language: &Language,
        remove_stop_words: bool,
    ) -> Result<Vec<String>> {
        let joined = texts.join(" ");

        if remove_stop_words {
            let stop_words: HashSet<String> =
                self.stop_words.stop_words(language)?.into_iter().collect();
            Ok(joined
                .unicode_words()
                .filter(|word| !stop_words.contains(*word))
                .map(str::to_string)
                .collect())
        } else {
            Ok(joined.unicode_words().map(str::to_string).collect())
        }
    }
}
