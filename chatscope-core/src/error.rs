//! Error types for chatscope-core

use chrono::{DateTime, Utc};
use std::path::PathBuf;
use thiserror::Error;

/// Main error type for the chatscope-core library
#[derive(Error, Debug)]
pub enum Error {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// No permission to access the chat archive
    #[error("no permission to access the chat file: {0}")]
    ChatFileNoAccess(PathBuf),

    /// Failed to create a working directory for extraction
    #[error("failed to create directory: {0}")]
    CreateDirectoryFailed(PathBuf),

    /// Failed to unzip the chat archive
    #[error("failed to unzip the chat archive")]
    UnzipFailed,

    /// The archive does not contain a recognizable chat file
    #[error("the chat file is invalid")]
    InvalidChatFile,

    /// A message extractor failed to produce chat data
    #[error("failed to extract chat data: {0}")]
    ExtractDataFailed(String),

    /// The requested user does not appear in the chat
    #[error("user not found in chat: {0}")]
    UserNotFound(String),

    /// A query time range with start after end
    #[error("invalid time range: start {start} is after end {end}")]
    InvalidTimeRange {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },

    /// Language auto-detection produced no result
    #[error("failed to identify the chat language")]
    LanguageNotRecognized,

    /// Recognized language without a stop-word list
    #[error("language not supported: {0}")]
    LanguageNotSupported(String),

    /// Stop-word resource exists but could not be read
    #[error("failed to load stop words for {language}: {message}")]
    LoadStopWordsFailed { language: String, message: String },

    /// Sentiment model resources missing or invalid at construction
    #[error("sentiment model not found: {0}")]
    ModelNotFound(String),

    /// Sentiment backend failed during inference
    #[error("sentiment prediction failed: {0}")]
    PredictionFailed(String),

    /// Bucketed sentiment query hit an unlabeled text message
    #[error("the sentiments are not analyzed")]
    SentimentNotAnalyzed,

    /// Operation requires at least one text message
    #[error("no text message in the chat")]
    NoTextMessage,
}

/// Result type alias for chatscope-core
pub type Result<T> = std::result::Result<T, Error>;
