//! Embedding-based sentiment backend.
//!
//! Mirrors the shape of a small neural classifier: a vocabulary maps cleaned
//! tokens to ids, a [`SequenceTokenizer`] pads or truncates every input to a
//! fixed sequence length with dedicated `[PAD]`/`[UNK]` tokens, and the model
//! scores the mean of per-token weights through a sigmoid.

use std::collections::HashMap;
use std::path::Path;

use super::{SentimentModel, LABEL_NEGATIVE, LABEL_POSITIVE};
use crate::error::{Error, Result};

/// Padding token, always id 0 in built vocabularies.
pub const PAD_TOKEN: &str = "[PAD]";
/// Unknown-word token, always id 1 in built vocabularies.
pub const UNK_TOKEN: &str = "[UNK]";

/// Token-to-id mapping for the sequence tokenizer.
#[derive(Debug, Clone)]
pub struct Vocabulary {
    index: HashMap<String, usize>,
    pad_id: usize,
    unk_id: usize,
}

impl Vocabulary {
    /// Build a vocabulary from raw texts, ranked by token frequency.
    ///
    /// Ids 0 and 1 are reserved for `[PAD]` and `[UNK]`; the remaining ids go
    /// to the most frequent tokens until `max_tokens` entries exist. Frequency
    /// ties break lexicographically so the result is deterministic.
    pub fn build(texts: &[&str], max_tokens: usize) -> Self {
        let mut frequencies: HashMap<String, usize> = HashMap::new();
        for text in texts {
            for token in clean_text(text).split_whitespace() {
                *frequencies.entry(token.to_string()).or_insert(0) += 1;
            }
        }

        let mut ranked: Vec<(String, usize)> = frequencies.into_iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

        let mut index = HashMap::new();
        index.insert(PAD_TOKEN.to_string(), 0);
        index.insert(UNK_TOKEN.to_string(), 1);
        let mut current_id = 2;
        for (token, _) in ranked {
            if current_id >= max_tokens {
                break;
            }
            index.insert(token, current_id);
            current_id += 1;
        }

        Self {
            index,
            pad_id: 0,
            unk_id: 1,
        }
    }

    /// Load a vocabulary file with one token per line; line number is the id.
    ///
    /// The file must contain the `[PAD]` and `[UNK]` tokens; a missing or
    /// unreadable file fails with [`Error::ModelNotFound`].
    pub fn from_path(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| Error::ModelNotFound(format!("{}: {}", path.display(), e)))?;

        let mut index = HashMap::new();
        for (id, token) in contents.lines().map(str::trim).enumerate() {
            if !token.is_empty() {
                index.insert(token.to_string(), id);
            }
        }

        let pad_id = *index
            .get(PAD_TOKEN)
            .ok_or_else(|| Error::ModelNotFound(format!("{}: missing {}", path.display(), PAD_TOKEN)))?;
        let unk_id = *index
            .get(UNK_TOKEN)
            .ok_or_else(|| Error::ModelNotFound(format!("{}: missing {}", path.display(), UNK_TOKEN)))?;

        Ok(Self {
            index,
            pad_id,
            unk_id,
        })
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn id(&self, token: &str) -> Option<usize> {
        self.index.get(token).copied()
    }

    pub fn pad_id(&self) -> usize {
        self.pad_id
    }

    pub fn unk_id(&self) -> usize {
        self.unk_id
    }
}

/// Strip everything outside `A-Za-z0-9(),!?'` and backtick, collapse
/// whitespace, lowercase.
fn clean_text(text: &str) -> String {
    let mut replaced = String::with_capacity(text.len());
    for ch in text.chars() {
        if ch.is_ascii_alphanumeric() || matches!(ch, '(' | ')' | ',' | '!' | '?' | '\'' | '`') {
            replaced.push(ch.to_ascii_lowercase());
        } else {
            replaced.push(' ');
        }
    }
    replaced.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Encodes text into fixed-length token-id sequences.
#[derive(Debug, Clone)]
pub struct SequenceTokenizer {
    vocabulary: Vocabulary,
    sequence_length: usize,
}

impl SequenceTokenizer {
    pub fn new(vocabulary: Vocabulary, sequence_length: usize) -> Self {
        Self {
            vocabulary,
            sequence_length,
        }
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    pub fn sequence_length(&self) -> usize {
        self.sequence_length
    }

    /// Encode `text`, truncating or padding to the fixed sequence length.
    pub fn encode(&self, text: &str) -> Vec<usize> {
        let cleaned = clean_text(text);
        let mut ids: Vec<usize> = Vec::with_capacity(self.sequence_length);

        for token in cleaned.split_whitespace() {
            if ids.len() >= self.sequence_length {
                break;
            }
            ids.push(
                self.vocabulary
                    .id(token)
                    .unwrap_or_else(|| self.vocabulary.unk_id()),
            );
        }

        while ids.len() < self.sequence_length {
            ids.push(self.vocabulary.pad_id());
        }

        ids
    }
}

/// Sentiment model scoring the mean per-token weight through a sigmoid.
pub struct EmbeddingModel {
    tokenizer: SequenceTokenizer,
    weights: Vec<f32>,
}

impl EmbeddingModel {
    /// Wrap a tokenizer and weight table.
    ///
    /// The table must cover every vocabulary id; a short table fails with
    /// [`Error::ModelNotFound`] at construction rather than during inference.
    pub fn new(tokenizer: SequenceTokenizer, weights: Vec<f32>) -> Result<Self> {
        if weights.len() < tokenizer.vocabulary().len() {
            return Err(Error::ModelNotFound(format!(
                "weight table holds {} entries for a vocabulary of {}",
                weights.len(),
                tokenizer.vocabulary().len()
            )));
        }
        Ok(Self { tokenizer, weights })
    }

    /// Load vocabulary and weights from files (one token / one weight per
    /// line, aligned by line number).
    pub fn from_paths(
        vocabulary_path: &Path,
        weights_path: &Path,
        sequence_length: usize,
    ) -> Result<Self> {
        let vocabulary = Vocabulary::from_path(vocabulary_path)?;

        let contents = std::fs::read_to_string(weights_path)
            .map_err(|e| Error::ModelNotFound(format!("{}: {}", weights_path.display(), e)))?;
        let weights = contents
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(|line| {
                line.parse::<f32>().map_err(|e| {
                    Error::ModelNotFound(format!("{}: {}", weights_path.display(), e))
                })
            })
            .collect::<Result<Vec<f32>>>()?;

        Self::new(SequenceTokenizer::new(vocabulary, sequence_length), weights)
    }

    fn score(&self, text: &str) -> Result<f32> {
        let pad_id = self.tokenizer.vocabulary().pad_id();
        let mut sum = 0.0f32;
        let mut count = 0usize;

        for id in self.tokenizer.encode(text) {
            if id == pad_id {
                continue;
            }
            let weight = self.weights.get(id).copied().ok_or_else(|| {
                Error::PredictionFailed(format!("token id {} outside weight table", id))
            })?;
            sum += weight;
            count += 1;
        }

        let mean = if count == 0 { 0.0 } else { sum / count as f32 };
        Ok(1.0 / (1.0 + (-mean).exp()))
    }
}

impl SentimentModel for EmbeddingModel {
    fn predict(&self, text: &str) -> Result<String> {
        let label = if self.score(text)? > 0.5 {
            LABEL_POSITIVE
        } else {
            LABEL_NEGATIVE
        };
        Ok(label.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn make_vocabulary() -> Vocabulary {
        Vocabulary::build(&["good good good bad bad fine"], 16)
    }

    #[test]
    fn test_build_ranks_by_frequency_with_lexicographic_ties() {
        let vocabulary = make_vocabulary();
        assert_eq!(vocabulary.id(PAD_TOKEN), Some(0));
        assert_eq!(vocabulary.id(UNK_TOKEN), Some(1));
        assert_eq!(vocabulary.id("good"), Some(2));
        assert_eq!(vocabulary.id("bad"), Some(3));
        assert_eq!(vocabulary.id("fine"), Some(4));
    }

    #[test]
    fn test_build_is_deterministic() {
        let a = Vocabulary::build(&["x y z z y x"], 8);
        let b = Vocabulary::build(&["x y z z y x"], 8);
        for token in ["x", "y", "z"] {
            assert_eq!(a.id(token), b.id(token));
        }
    }

    #[test]
    fn test_encode_pads_and_truncates() {
        let tokenizer = SequenceTokenizer::new(make_vocabulary(), 4);

        let padded = tokenizer.encode("good bad");
        assert_eq!(padded, vec![2, 3, 0, 0]);

        let truncated = tokenizer.encode("good bad fine good bad");
        assert_eq!(truncated, vec![2, 3, 4, 2]);
    }

    #[test]
    fn test_encode_maps_unknown_tokens() {
        let tokenizer = SequenceTokenizer::new(make_vocabulary(), 3);
        let ids = tokenizer.encode("good unseen");
        assert_eq!(ids, vec![2, 1, 0]);
    }

    #[test]
    fn test_clean_text_matches_training_convention() {
        assert_eq!(clean_text("Hello, World! 😀  #tag"), "hello, world! tag");
        assert_eq!(clean_text("  spaced   out  "), "spaced out");
    }

    #[test]
    fn test_prediction_follows_weights() {
        let tokenizer = SequenceTokenizer::new(make_vocabulary(), 8);
        // ids: PAD, UNK, good, bad, fine
        let weights = vec![0.0, 0.0, 2.0, -2.0, 0.5];
        let model = EmbeddingModel::new(tokenizer, weights).unwrap();

        assert_eq!(model.predict("good good fine").unwrap(), LABEL_POSITIVE);
        assert_eq!(model.predict("bad bad").unwrap(), LABEL_NEGATIVE);
    }

    #[test]
    fn test_short_weight_table_is_rejected() {
        let tokenizer = SequenceTokenizer::new(make_vocabulary(), 8);
        let result = EmbeddingModel::new(tokenizer, vec![0.0, 0.0]);
        assert!(matches!(result, Err(Error::ModelNotFound(_))));
    }

    #[test]
    fn test_from_paths_round_trip_and_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let vocab_path = dir.path().join("vocab.txt");
        let weights_path = dir.path().join("weights.txt");

        let mut vocab = std::fs::File::create(&vocab_path).unwrap();
        writeln!(vocab, "{}\n{}\ngood\nbad", PAD_TOKEN, UNK_TOKEN).unwrap();
        std::fs::write(&weights_path, "0.0\n0.0\n1.5\n-1.5\n").unwrap();

        let model = EmbeddingModel::from_paths(&vocab_path, &weights_path, 4).unwrap();
        assert_eq!(model.predict("good").unwrap(), LABEL_POSITIVE);

        let missing = EmbeddingModel::from_paths(&dir.path().join("absent.txt"), &weights_path, 4);
        assert!(matches!(missing, Err(Error::ModelNotFound(_))));
    }
}
