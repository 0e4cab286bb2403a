//! Aggregation primitives shared by the analyzer facade.
//!
//! Every query follows the same pipeline: filter the message collection, map
//! it into the relevant domain (bucket keys, tokens, emoji, sentiment labels),
//! then aggregate. The helpers here implement the aggregation step over
//! already-filtered text messages; the [`ChatAnalyzer`](crate::ChatAnalyzer)
//! facade composes them with [`MessageFilter`](super::MessageFilter).

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};

use super::temporal::{DateBucketKey, Frequency, TemporalBucketer};
use crate::error::{Error, Result};
use crate::types::{DateInterval, SentimentBucket, SentimentCount, TextMessage};

/// Count occurrences of each item.
pub fn count_occurrences<I>(items: I) -> HashMap<String, usize>
where
    I: IntoIterator<Item = String>,
{
    let mut counts = HashMap::new();
    for item in items {
        *counts.entry(item).or_insert(0) += 1;
    }
    counts
}

/// Sort counts descending and keep the top `n`.
///
/// Ties are broken lexicographically ascending so results are deterministic.
/// When `n` exceeds the number of distinct items, everything is returned.
pub fn most_common(counts: HashMap<String, usize>, n: usize) -> Vec<(String, usize)> {
    let mut entries: Vec<(String, usize)> = counts.into_iter().collect();
    entries.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    entries.truncate(n);
    entries
}

/// Count sentiment labels per calendar bucket.
///
/// Buckets come back chronologically sorted; labels within a bucket sort
/// lexicographically. Hitting an unlabeled message fails with
/// [`Error::SentimentNotAnalyzed`], which is unreachable when the caller runs
/// the analysis-on-demand transition first.
pub fn sentiment_counts(
    messages: &[&TextMessage],
    bucketer: &TemporalBucketer,
    frequency: Frequency,
) -> Result<Vec<SentimentBucket>> {
    let mut counts: BTreeMap<DateBucketKey, BTreeMap<String, usize>> = BTreeMap::new();

    for message in messages {
        let label = message
            .sentiment_label
            .as_ref()
            .ok_or(Error::SentimentNotAnalyzed)?;
        let key = bucketer.bucket_key(message.timestamp, frequency);
        *counts
            .entry(key)
            .or_default()
            .entry(label.clone())
            .or_insert(0) += 1;
    }

    Ok(counts
        .into_iter()
        .map(|(date, labels)| SentimentBucket {
            date,
            counts: labels
                .into_iter()
                .map(|(sentiment, count)| SentimentCount { sentiment, count })
                .collect(),
        })
        .collect())
}

/// Interval between the earliest and latest text message.
pub fn chat_duration(messages: &[&TextMessage]) -> Result<DateInterval> {
    let mut timestamps: Vec<DateTime<Utc>> =
        messages.iter().map(|message| message.timestamp).collect();
    timestamps.sort();

    match (timestamps.first(), timestamps.last()) {
        (Some(&start), Some(&end)) => Ok(DateInterval { start, end }),
        _ => Err(Error::NoTextMessage),
    }
}

/// Character length of the longest message, 0 when there is none.
pub fn longest_message(messages: &[&TextMessage]) -> usize {
    messages
        .iter()
        .map(|message| message.message.chars().count())
        .max()
        .unwrap_or(0)
}

/// Mean character length, 0.0 when there is no message.
///
/// The zero default is deliberate and asymmetric with [`chat_duration`]: an
/// empty mean is a sensible neutral value, an empty interval is not.
pub fn average_message_length(messages: &[&TextMessage]) -> f64 {
    if messages.is_empty() {
        return 0.0;
    }
    let total: usize = messages
        .iter()
        .map(|message| message.message.chars().count())
        .sum();
    total as f64 / messages.len() as f64
}

/// Mean first-response latency of `user`, in seconds.
///
/// Walks all text messages in chronological order, tracking the time of the
/// most recent message from someone else. The first message `user` sends after
/// another user spoke counts as one reply sample; consecutive messages from
/// `user` do not add samples until someone else speaks again. This is a
/// turn-taking heuristic, not thread-level reply matching.
///
/// Fails with [`Error::NoTextMessage`] when no sample was collected, i.e. the
/// user never replied to anyone.
pub fn average_reply_time(messages: &[&TextMessage], user: &str) -> Result<f64> {
    let mut sorted: Vec<&TextMessage> = messages.to_vec();
    sorted.sort_by_key(|message| message.timestamp);

    let mut reply_seconds = 0.0;
    let mut samples: u32 = 0;
    let mut last_other_time: Option<DateTime<Utc>> = None;
    let mut replied = false;

    for message in sorted {
        if message.user == user {
            if !replied {
                if let Some(last) = last_other_time {
                    let elapsed = (message.timestamp - last).num_milliseconds().abs();
                    reply_seconds += elapsed as f64 / 1000.0;
                    samples += 1;
                    replied = true;
                }
            }
        } else {
            last_other_time = Some(message.timestamp);
            replied = false;
        }
    }

    if samples == 0 {
        return Err(Error::NoTextMessage);
    }

    Ok(reply_seconds / f64::from(samples))
}
