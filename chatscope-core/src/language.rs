//! Chat language identification and stop-word resources.
//!
//! The dominant language of a chat drives tokenization and stop-word removal.
//! Detection samples a slice of the text messages and runs them through
//! `whatlang`; stop-word lists are resources keyed by language code, obtained
//! through an explicit [`StopWordProvider`] passed into the tokenizer rather
//! than a hidden global lookup.

use std::path::PathBuf;

use crate::error::{Error, Result};
use crate::types::ChatMessage;

/// Language of a chat.
///
/// English and German carry bundled stop-word lists; any other recognized
/// language is supported for detection and tokenization but has no list, so
/// stop-word removal fails with [`Error::LanguageNotSupported`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Language {
    English,
    German,
    Other(String),
}

impl Language {
    /// ISO language code ("en", "de", or the detector's code for others).
    pub fn code(&self) -> &str {
        match self {
            Language::English => "en",
            Language::German => "de",
            Language::Other(code) => code,
        }
    }

    pub fn from_code(code: &str) -> Self {
        match code {
            "en" | "eng" => Language::English,
            "de" | "deu" => Language::German,
            other => Language::Other(other.to_string()),
        }
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Default fraction of text messages sampled for language detection.
pub const DEFAULT_SAMPLE_RATIO: f64 = 0.1;
/// Default lower bound on the language detection sample size.
pub const DEFAULT_MIN_SAMPLE_SIZE: usize = 100;

/// Identify the dominant language from a sample of the text messages.
///
/// The sample size is `min(count, max(round(count * sample_ratio),
/// min_sample_size))`; messages are taken at a fixed stride so repeated runs
/// over the same chat give the same answer. Fails with
/// [`Error::LanguageNotRecognized`] when the chat holds no text or the
/// detector produces no result.
pub fn identify_language(
    messages: &[ChatMessage],
    sample_ratio: f64,
    min_sample_size: usize,
) -> Result<Language> {
    let texts: Vec<&str> = messages
        .iter()
        .filter_map(ChatMessage::as_text)
        .map(|text| text.message.as_str())
        .collect();

    if texts.is_empty() {
        return Err(Error::LanguageNotRecognized);
    }

    let proportional = (texts.len() as f64 * sample_ratio).round() as usize;
    let sample_size = texts.len().min(proportional.max(min_sample_size));
    let stride = (texts.len() / sample_size).max(1);
    let sampled = texts
        .iter()
        .step_by(stride)
        .take(sample_size)
        .copied()
        .collect::<Vec<&str>>()
        .join(" ");

    let info = whatlang::detect(&sampled).ok_or(Error::LanguageNotRecognized)?;
    let language = match info.lang() {
        whatlang::Lang::Eng => Language::English,
        whatlang::Lang::Deu => Language::German,
        other => Language::Other(other.code().to_string()),
    };

    tracing::debug!(
        language = %language,
        sample_size,
        confidence = info.confidence(),
        "Identified chat language"
    );

    Ok(language)
}

// ============================================
// Stop-word providers
// ============================================

/// Source of stop-word lists, keyed by language.
pub trait StopWordProvider: Send + Sync {
    /// The stop words for `language`, in resource order.
    ///
    /// Fails with [`Error::LanguageNotSupported`] when no list exists for the
    /// language and [`Error::LoadStopWordsFailed`] when the resource cannot
    /// be read.
    fn stop_words(&self, language: &Language) -> Result<Vec<String>>;
}

/// Stop-word lists compiled into the library.
#[derive(Debug, Clone, Copy, Default)]
pub struct BundledStopWords;

impl StopWordProvider for BundledStopWords {
    fn stop_words(&self, language: &Language) -> Result<Vec<String>> {
        let contents = match language {
            Language::English => include_str!("../resources/stop_words_en.txt"),
            Language::German => include_str!("../resources/stop_words_de.txt"),
            other => return Err(Error::LanguageNotSupported(other.code().to_string())),
        };

        Ok(contents
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect())
    }
}

/// Stop-word lists loaded from `stop_words_{code}.txt` files in a directory.
///
/// Lets deployments override or extend the bundled lists via the
/// `stop_words_dir` configuration option.
#[derive(Debug, Clone)]
pub struct FileStopWords {
    dir: PathBuf,
}

impl FileStopWords {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl StopWordProvider for FileStopWords {
    fn stop_words(&self, language: &Language) -> Result<Vec<String>> {
        let code = match language {
            Language::English | Language::German => language.code(),
            other => return Err(Error::LanguageNotSupported(other.code().to_string())),
        };

        let path = self.dir.join(format!("stop_words_{}.txt", code));
        let contents = std::fs::read_to_string(&path).map_err(|e| {
            tracing::warn!(path = %path.display(), error = %e, "Failed to load stop words");
            Error::LoadStopWordsFailed {
                language: code.to_string(),
                message: e.to_string(),
            }
        })?;

        Ok(contents
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TextMessage;
    use chrono::{TimeZone, Utc};

    fn text(message: &str) -> ChatMessage {
        ChatMessage::Text(TextMessage::new(
            "alice",
            Utc.with_ymd_and_hms(2023, 9, 18, 9, 0, 0).unwrap(),
            message,
        ))
    }

    #[test]
    fn test_identifies_english() {
        let messages = vec![
            text("the quick brown fox jumps over the lazy dog"),
            text("could you please send me the report before the meeting tomorrow"),
        ];
        let language = identify_language(&messages, 0.1, 100).unwrap();
        assert_eq!(language, Language::English);
    }

    #[test]
    fn test_identifies_german() {
        let messages = vec![
            text("der schnelle braune Fuchs springt über den faulen Hund"),
            text("kannst du mir bitte den Bericht vor dem Treffen morgen schicken"),
        ];
        let language = identify_language(&messages, 0.1, 100).unwrap();
        assert_eq!(language, Language::German);
    }

    #[test]
    fn test_empty_chat_is_not_recognized() {
        assert!(matches!(
            identify_language(&[], 0.1, 100),
            Err(Error::LanguageNotRecognized)
        ));
    }

    #[test]
    fn test_bundled_lists_exist_for_english_and_german() {
        let provider = BundledStopWords;
        let english = provider.stop_words(&Language::English).unwrap();
        assert!(english.iter().any(|word| word == "the"));

        let german = provider.stop_words(&Language::German).unwrap();
        assert!(german.iter().any(|word| word == "und"));
    }

    #[test]
    fn test_bundled_rejects_resourceless_language() {
        let provider = BundledStopWords;
        let result = provider.stop_words(&Language::Other("fra".to_string()));
        assert!(matches!(result, Err(Error::LanguageNotSupported(code)) if code == "fra"));
    }

    #[test]
    fn test_file_provider_reads_and_reports_missing_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("stop_words_en.txt"), "the\nand\n").unwrap();

        let provider = FileStopWords::new(dir.path());
        let words = provider.stop_words(&Language::English).unwrap();
        assert_eq!(words, vec!["the".to_string(), "and".to_string()]);

        let missing = provider.stop_words(&Language::German);
        assert!(matches!(missing, Err(Error::LoadStopWordsFailed { .. })));
    }

    #[test]
    fn test_language_codes_round_trip() {
        assert_eq!(Language::from_code("en"), Language::English);
        assert_eq!(Language::from_code("deu"), Language::German);
        assert_eq!(Language::from_code("fra").code(), "fra");
    }
}
