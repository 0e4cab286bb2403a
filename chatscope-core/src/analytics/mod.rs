//! Analytics module for chatscope
//!
//! Provides the building blocks of the query engine:
//! - [`filter`]: user / message-type / time-window predicates
//! - [`temporal`]: calendar bucketing at year through hour granularity
//! - [`engine`]: aggregation primitives (counts, rankings, durations,
//!   sentiment histograms, reply-latency)
//!
//! Every public query on [`ChatAnalyzer`](crate::ChatAnalyzer) composes these
//! the same way: Filter → (Bucketer | Tokenizer | Classifier) → aggregate →
//! sorted result.

pub mod engine;
pub mod filter;
pub mod temporal;

pub use filter::MessageFilter;
pub use temporal::{BucketTimezone, DateBucketKey, Frequency, TemporalBucketer};
