//! Sentiment classification behind a pluggable backend.
//!
//! The engine only depends on the [`SentimentModel`] contract: text in,
//! `"Positive"` or `"Negative"` out, failures as errors (no sentinel labels).
//! Two backends ship with the crate:
//!
//! - [`LexiconModel`]: a pretrained word-polarity lexicon, the default
//! - [`EmbeddingModel`]: a fixed-length sequence tokenizer plus a per-token
//!   weight table loaded from model files
//!
//! Backends are selected at construction through [`SentimentBackend`]; no
//! dispatch happens per prediction beyond one virtual call.

pub mod embedding;
pub mod lexicon;

pub use embedding::{EmbeddingModel, SequenceTokenizer, Vocabulary};
pub use lexicon::LexiconModel;

use std::path::PathBuf;

use crate::error::Result;

/// Label returned for positive text.
pub const LABEL_POSITIVE: &str = "Positive";
/// Label returned for negative text.
pub const LABEL_NEGATIVE: &str = "Negative";

/// Contract every sentiment backend implements.
pub trait SentimentModel: Send + Sync {
    /// Classify one text as [`LABEL_POSITIVE`] or [`LABEL_NEGATIVE`].
    fn predict(&self, text: &str) -> Result<String>;

    /// Classify a batch, preserving input order and count.
    ///
    /// Any backend failure aborts the whole batch; there are no partial
    /// results.
    fn predict_batch(&self, texts: &[&str]) -> Result<Vec<String>> {
        texts.iter().map(|text| self.predict(text)).collect()
    }
}

/// Backend selector used at classifier construction time.
#[derive(Debug, Clone)]
pub enum SentimentBackend {
    /// Bundled word-polarity lexicon.
    Lexicon,
    /// Embedding model loaded from vocabulary and weight files.
    Embedding {
        vocabulary: PathBuf,
        weights: PathBuf,
        sequence_length: usize,
    },
}

impl Default for SentimentBackend {
    fn default() -> Self {
        SentimentBackend::Lexicon
    }
}

/// Uniform entry point to sentiment classification.
pub struct SentimentClassifier {
    model: Box<dyn SentimentModel>,
}

impl SentimentClassifier {
    /// Build a classifier for the selected backend.
    ///
    /// Fails with [`Error::ModelNotFound`](crate::Error::ModelNotFound) when
    /// the backend's model resources are missing or invalid.
    pub fn new(backend: &SentimentBackend) -> Result<Self> {
        let model: Box<dyn SentimentModel> = match backend {
            SentimentBackend::Lexicon => Box::new(LexiconModel::bundled()),
            SentimentBackend::Embedding {
                vocabulary,
                weights,
                sequence_length,
            } => Box::new(EmbeddingModel::from_paths(
                vocabulary,
                weights,
                *sequence_length,
            )?),
        };
        Ok(Self { model })
    }

    /// Wrap an externally constructed model.
    pub fn with_model(model: Box<dyn SentimentModel>) -> Self {
        Self { model }
    }

    pub fn classify(&self, text: &str) -> Result<String> {
        self.model.predict(text)
    }

    pub fn classify_batch(&self, texts: &[&str]) -> Result<Vec<String>> {
        self.model.predict_batch(texts)
    }
}
