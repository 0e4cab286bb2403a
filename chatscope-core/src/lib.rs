//! # chatscope-core
//!
//! Core library for chatscope - an analytics engine for exported chat logs.
//!
//! This library provides:
//! - Domain types for normalized chat messages and metadata
//! - A filtered, grouped and time-bucketed aggregate query engine
//! - Word tokenization, emoji extraction and sentiment classification
//! - Configuration management and logging infrastructure
//!
//! ## Architecture
//!
//! External collaborators (archive extraction, platform-specific parsing)
//! produce a [`ChatData`] value once; a [`ChatAnalyzer`] takes exclusive
//! ownership of it and answers every query through the same pipeline:
//! Filter → (Bucketer | Tokenizer | Classifier) → aggregation → sorted result.
//!
//! The analyzer is synchronous and single-threaded by contract: sentiment
//! analysis mutates message state in place under `&mut self`, so one instance
//! must not be shared across threads without external serialization.
//!
//! ## Example
//!
//! ```rust,no_run
//! use chatscope_core::{ChatAnalyzer, ChatData, Config, Frequency};
//!
//! let config = Config::load().expect("failed to load config");
//! let data = ChatData::from_json(r#"{"messages": [], "metadata": {}, "is_sentiment_analyzed": false}"#)
//!     .expect("failed to read chat data");
//!
//! let analyzer = ChatAnalyzer::new(data, &config).expect("failed to create analyzer");
//! let histogram = analyzer
//!     .message_count_by_frequency(Frequency::Month, None, None, None, None)
//!     .expect("query failed");
//! println!("{} active months", histogram.len());
//! ```

// Re-export commonly used items at the crate root
pub use analytics::{BucketTimezone, DateBucketKey, Frequency, MessageFilter, TemporalBucketer};
pub use analyzer::ChatAnalyzer;
pub use config::Config;
pub use error::{Error, Result};
pub use ingest::{ArchiveExtractor, MessageExtractor};
pub use language::{BundledStopWords, FileStopWords, Language, StopWordProvider};
pub use sentiment::{SentimentBackend, SentimentClassifier, SentimentModel};
pub use types::*;

// Public modules
pub mod analytics;
pub mod analyzer;
pub mod config;
pub mod error;
pub mod ingest;
pub mod language;
pub mod logging;
pub mod sentiment;
pub mod text;
pub mod types;
