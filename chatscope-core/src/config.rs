//! Configuration loading and management
//!
//! Configuration is loaded from `~/.config/chatscope/config.toml`
//!
//! This module follows the XDG Base Directory Specification:
//! - Config: `$XDG_CONFIG_HOME/chatscope/` (~/.config/chatscope/)
//! - State/Logs: `$XDG_STATE_HOME/chatscope/` (~/.local/state/chatscope/)

use crate::analytics::temporal::BucketTimezone;
use crate::error::{Error, Result};
use crate::language;
use crate::sentiment::SentimentBackend;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Returns a best-effort home directory path.
fn home_dir() -> PathBuf {
    std::env::var_os("HOME")
        .map(PathBuf::from)
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Returns XDG_CONFIG_HOME or ~/.config
fn xdg_config_home() -> PathBuf {
    std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".config"))
}

/// Returns XDG_STATE_HOME or ~/.local/state
fn xdg_state_home() -> PathBuf {
    std::env::var("XDG_STATE_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".local/state"))
}

/// Main configuration struct
#[derive(Debug, Deserialize, Default)]
pub struct Config {
    /// Analyzer configuration
    #[serde(default)]
    pub analyzer: AnalyzerConfig,

    /// Sentiment backend configuration
    #[serde(default)]
    pub sentiment: SentimentConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Analyzer configuration
#[derive(Debug, Deserialize)]
pub struct AnalyzerConfig {
    /// Timezone used to resolve timestamps into calendar buckets
    #[serde(default)]
    pub timezone: BucketTimezone,

    /// Fraction of text messages sampled for language detection
    #[serde(default = "default_sample_ratio")]
    pub sample_ratio: f64,

    /// Lower bound on the language detection sample size
    #[serde(default = "default_min_sample_size")]
    pub min_sample_size: usize,

    /// Directory holding `stop_words_{code}.txt` overrides (bundled lists
    /// are used when unset)
    #[serde(default)]
    pub stop_words_dir: Option<PathBuf>,
}

fn default_sample_ratio() -> f64 {
    language::DEFAULT_SAMPLE_RATIO
}

fn default_min_sample_size() -> usize {
    language::DEFAULT_MIN_SAMPLE_SIZE
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            timezone: BucketTimezone::default(),
            sample_ratio: default_sample_ratio(),
            min_sample_size: default_min_sample_size(),
            stop_words_dir: None,
        }
    }
}

/// Which sentiment backend to construct
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SentimentModelKind {
    Lexicon,
    Embedding,
}

/// Sentiment backend configuration
#[derive(Debug, Deserialize)]
pub struct SentimentConfig {
    /// Backend selector
    #[serde(default = "default_sentiment_model")]
    pub model: SentimentModelKind,

    /// Vocabulary file for the embedding backend (one token per line)
    #[serde(default)]
    pub vocabulary_path: Option<PathBuf>,

    /// Weight file for the embedding backend (one weight per line)
    #[serde(default)]
    pub weights_path: Option<PathBuf>,

    /// Fixed input sequence length for the embedding backend
    #[serde(default = "default_sequence_length")]
    pub sequence_length: usize,
}

fn default_sentiment_model() -> SentimentModelKind {
    SentimentModelKind::Lexicon
}

fn default_sequence_length() -> usize {
    128
}

impl Default for SentimentConfig {
    fn default() -> Self {
        Self {
            model: default_sentiment_model(),
            vocabulary_path: None,
            weights_path: None,
            sequence_length: default_sequence_length(),
        }
    }
}

impl SentimentConfig {
    /// Resolve this configuration into a backend selector.
    pub fn backend(&self) -> Result<SentimentBackend> {
        match self.model {
            SentimentModelKind::Lexicon => Ok(SentimentBackend::Lexicon),
            SentimentModelKind::Embedding => {
                let vocabulary = self.vocabulary_path.clone().ok_or_else(|| {
                    Error::Config("sentiment.vocabulary_path is required for the embedding model".to_string())
                })?;
                let weights = self.weights_path.clone().ok_or_else(|| {
                    Error::Config("sentiment.weights_path is required for the embedding model".to_string())
                })?;
                Ok(SentimentBackend::Embedding {
                    vocabulary,
                    weights,
                    sequence_length: self.sequence_length,
                })
            }
        }
    }
}

/// Logging configuration
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    /// Log level filter (used when RUST_LOG is not set)
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl Config {
    /// Load configuration from the default path, falling back to defaults
    /// when no config file exists.
    pub fn load() -> Result<Self> {
        let path = Self::config_path();
        if !path.exists() {
            return Ok(Self::default());
        }
        Self::load_from(&path)
    }

    /// Load configuration from an explicit TOML file.
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        toml::from_str(&contents).map_err(|e| Error::Config(e.to_string()))
    }

    /// Returns the configuration directory
    pub fn config_dir() -> PathBuf {
        xdg_config_home().join("chatscope")
    }

    /// Returns the configuration file path
    pub fn config_path() -> PathBuf {
        Self::config_dir().join("config.toml")
    }

    /// Returns the state directory (logs)
    pub fn state_dir() -> PathBuf {
        xdg_state_home().join("chatscope")
    }

    /// Returns the log file path
    pub fn log_path() -> PathBuf {
        Self::state_dir().join("chatscope.log")
    }
}
