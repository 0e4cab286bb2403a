//! The chat analyzer facade.
//!
//! [`ChatAnalyzer`] owns one chat's data together with its detected language
//! and exposes the full query surface: counts, temporal histograms, word and
//! emoji rankings, sentiment trends and reply-latency metrics, each available
//! chat-wide or per user. Every query follows the same pipeline: filter the
//! messages, map them through the bucketer / tokenizer / classifier, then
//! aggregate into a sorted result.
//!
//! The analyzer is synchronous and not safe for concurrent use: sentiment
//! analysis mutates message state in place under `&mut self`, so callers
//! serialize access to one instance (see the crate docs).

use std::collections::{BTreeMap, BTreeSet, HashMap};

use chrono::{DateTime, Utc};

use crate::analytics::engine;
use crate::analytics::temporal::{DateBucketKey, Frequency, TemporalBucketer};
use crate::analytics::MessageFilter;
use crate::config::Config;
use crate::error::Result;
use crate::ingest::MessageExtractor;
use crate::language::{
    self, BundledStopWords, FileStopWords, Language, StopWordProvider,
};
use crate::sentiment::SentimentClassifier;
use crate::text::{emoji, Tokenizer};
use crate::types::{
    ChatData, ChatMessage, ChatMetadata, DateInterval, EmojiCount, MessageCount, MessageType,
    SentimentBucket, TextMessage, UserWordCounts, WordCount,
};

/// Analytics query engine over one chat export.
pub struct ChatAnalyzer {
    data: ChatData,
    language: Language,
    bucketer: TemporalBucketer,
    tokenizer: Tokenizer,
    classifier: SentimentClassifier,
}

impl ChatAnalyzer {
    /// Create an analyzer, detecting the chat language from a message sample.
    pub fn new(data: ChatData, config: &Config) -> Result<Self> {
        let language = language::identify_language(
            &data.messages,
            config.analyzer.sample_ratio,
            config.analyzer.min_sample_size,
        )?;
        Self::with_language(data, language, config)
    }

    /// Create an analyzer with an explicitly chosen language.
    pub fn with_language(data: ChatData, language: Language, config: &Config) -> Result<Self> {
        let stop_words: Box<dyn StopWordProvider> = match &config.analyzer.stop_words_dir {
            Some(dir) => Box::new(FileStopWords::new(dir)),
            None => Box::new(BundledStopWords),
        };
        let classifier = SentimentClassifier::new(&config.sentiment.backend()?)?;

        tracing::info!(
            messages = data.messages.len(),
            language = %language,
            "Created chat analyzer"
        );

        Ok(Self {
            data,
            language,
            bucketer: TemporalBucketer::new(config.analyzer.timezone),
            tokenizer: Tokenizer::new(stop_words),
            classifier,
        })
    }

    /// Create an analyzer from raw chat-log text via a [`MessageExtractor`].
    pub fn from_extractor(
        extractor: &dyn MessageExtractor,
        chat_text: &str,
        config: &Config,
    ) -> Result<Self> {
        let data = extractor.extract(chat_text)?;
        Self::new(data, config)
    }

    /// Replace the sentiment classifier (only before the first analysis run).
    pub fn set_classifier(&mut self, classifier: SentimentClassifier) {
        self.classifier = classifier;
    }

    pub fn chat_data(&self) -> &ChatData {
        &self.data
    }

    /// Counters computed once at ingestion; never recomputed here.
    pub fn metadata(&self) -> &ChatMetadata {
        &self.data.metadata
    }

    pub fn language(&self) -> &Language {
        &self.language
    }

    pub fn set_language(&mut self, language: Language) {
        self.language = language;
    }

    pub fn is_sentiment_analyzed(&self) -> bool {
        self.data.is_sentiment_analyzed
    }

    // ============================================
    // Users
    // ============================================

    /// Distinct senders, in deterministic (sorted) order.
    pub fn unique_users(&self) -> BTreeSet<String> {
        self.data
            .messages
            .iter()
            .map(|message| message.user().to_string())
            .collect()
    }

    pub fn user_count(&self) -> usize {
        self.unique_users().len()
    }

    // ============================================
    // Filtering pipeline
    // ============================================

    fn filter_messages(
        &self,
        user: Option<&str>,
        message_type: Option<MessageType>,
        start_time: Option<DateTime<Utc>>,
        end_time: Option<DateTime<Utc>>,
    ) -> Result<Vec<&ChatMessage>> {
        let filter = MessageFilter {
            user: user.map(str::to_string),
            message_type,
            start_time,
            end_time,
        };
        filter.apply(&self.data.messages)
    }

    fn filtered_text(
        &self,
        user: Option<&str>,
        start_time: Option<DateTime<Utc>>,
        end_time: Option<DateTime<Utc>>,
    ) -> Result<Vec<&TextMessage>> {
        Ok(self
            .filter_messages(user, Some(MessageType::Text), start_time, end_time)?
            .into_iter()
            .filter_map(ChatMessage::as_text)
            .collect())
    }

    // ============================================
    // Days
    // ============================================

    /// Distinct calendar days with at least one matching message, as
    /// day-bucket labels.
    pub fn unique_days(
        &self,
        user: Option<&str>,
        message_type: Option<MessageType>,
        start_time: Option<DateTime<Utc>>,
        end_time: Option<DateTime<Utc>>,
    ) -> Result<BTreeSet<String>> {
        let filtered = self.filter_messages(user, message_type, start_time, end_time)?;
        Ok(filtered
            .iter()
            .map(|message| {
                self.bucketer
                    .bucket_key(message.timestamp(), Frequency::Day)
                    .render(Frequency::Day)
            })
            .collect())
    }

    pub fn unique_days_by_user(
        &self,
        message_type: Option<MessageType>,
        start_time: Option<DateTime<Utc>>,
        end_time: Option<DateTime<Utc>>,
    ) -> Result<BTreeMap<String, BTreeSet<String>>> {
        let mut days = BTreeMap::new();
        for user in self.unique_users() {
            let user_days = self.unique_days(Some(&user), message_type, start_time, end_time)?;
            days.insert(user, user_days);
        }
        Ok(days)
    }

    pub fn day_count(
        &self,
        user: Option<&str>,
        message_type: Option<MessageType>,
        start_time: Option<DateTime<Utc>>,
        end_time: Option<DateTime<Utc>>,
    ) -> Result<usize> {
        Ok(self
            .unique_days(user, message_type, start_time, end_time)?
            .len())
    }

    pub fn day_count_by_user(
        &self,
        message_type: Option<MessageType>,
        start_time: Option<DateTime<Utc>>,
        end_time: Option<DateTime<Utc>>,
    ) -> Result<BTreeMap<String, usize>> {
        let mut counts = BTreeMap::new();
        for user in self.unique_users() {
            let count = self.day_count(Some(&user), message_type, start_time, end_time)?;
            counts.insert(user, count);
        }
        Ok(counts)
    }

    // ============================================
    // Message counts
    // ============================================

    pub fn message_count(
        &self,
        user: Option<&str>,
        message_type: Option<MessageType>,
        start_time: Option<DateTime<Utc>>,
        end_time: Option<DateTime<Utc>>,
    ) -> Result<usize> {
        Ok(self
            .filter_messages(user, message_type, start_time, end_time)?
            .len())
    }

    pub fn message_count_by_user(
        &self,
        message_type: Option<MessageType>,
        start_time: Option<DateTime<Utc>>,
        end_time: Option<DateTime<Utc>>,
    ) -> Result<BTreeMap<String, usize>> {
        let mut counts = BTreeMap::new();
        for user in self.unique_users() {
            let count = self.message_count(Some(&user), message_type, start_time, end_time)?;
            counts.insert(user, count);
        }
        Ok(counts)
    }

    /// Message count per calendar bucket, unsorted.
    pub fn message_count_by_frequency(
        &self,
        frequency: Frequency,
        user: Option<&str>,
        message_type: Option<MessageType>,
        start_time: Option<DateTime<Utc>>,
        end_time: Option<DateTime<Utc>>,
    ) -> Result<HashMap<DateBucketKey, usize>> {
        let filtered = self.filter_messages(user, message_type, start_time, end_time)?;
        let mut counts = HashMap::new();
        for message in filtered {
            let key = self.bucketer.bucket_key(message.timestamp(), frequency);
            *counts.entry(key).or_insert(0) += 1;
        }
        Ok(counts)
    }

    pub fn message_count_by_frequency_by_user(
        &self,
        frequency: Frequency,
        message_type: Option<MessageType>,
        start_time: Option<DateTime<Utc>>,
        end_time: Option<DateTime<Utc>>,
    ) -> Result<BTreeMap<String, HashMap<DateBucketKey, usize>>> {
        let mut counts = BTreeMap::new();
        for user in self.unique_users() {
            let user_counts = self.message_count_by_frequency(
                frequency,
                Some(&user),
                message_type,
                start_time,
                end_time,
            )?;
            counts.insert(user, user_counts);
        }
        Ok(counts)
    }

    /// One chronologically sorted histogram per requested frequency.
    ///
    /// Each frequency is bucketed independently over the same filtered set;
    /// this is a family of 1-D histograms, not a joint bucketing.
    pub fn message_counts_by_frequencies(
        &self,
        frequencies: &[Frequency],
        user: Option<&str>,
        message_type: Option<MessageType>,
        start_time: Option<DateTime<Utc>>,
        end_time: Option<DateTime<Utc>>,
    ) -> Result<HashMap<Frequency, Vec<MessageCount>>> {
        let filtered = self.filter_messages(user, message_type, start_time, end_time)?;

        let mut histograms = HashMap::new();
        for &frequency in frequencies {
            let mut counts: BTreeMap<DateBucketKey, usize> = BTreeMap::new();
            for message in &filtered {
                let key = self.bucketer.bucket_key(message.timestamp(), frequency);
                *counts.entry(key).or_insert(0) += 1;
            }
            histograms.insert(
                frequency,
                counts
                    .into_iter()
                    .map(|(date, count)| MessageCount { date, count })
                    .collect(),
            );
        }
        Ok(histograms)
    }

    pub fn message_counts_by_frequencies_by_user(
        &self,
        frequencies: &[Frequency],
        message_type: Option<MessageType>,
        start_time: Option<DateTime<Utc>>,
        end_time: Option<DateTime<Utc>>,
    ) -> Result<BTreeMap<String, HashMap<Frequency, Vec<MessageCount>>>> {
        let mut histograms = BTreeMap::new();
        for user in self.unique_users() {
            let user_histograms = self.message_counts_by_frequencies(
                frequencies,
                Some(&user),
                message_type,
                start_time,
                end_time,
            )?;
            histograms.insert(user, user_histograms);
        }
        Ok(histograms)
    }

    // ============================================
    // Words
    // ============================================

    fn tokens(
        &self,
        remove_stop_words: bool,
        user: Option<&str>,
        start_time: Option<DateTime<Utc>>,
        end_time: Option<DateTime<Utc>>,
    ) -> Result<Vec<String>> {
        let filtered = self.filtered_text(user, start_time, end_time)?;
        let texts: Vec<&str> = filtered
            .iter()
            .map(|message| message.message.as_str())
            .collect();
        self.tokenizer
            .tokenize(&texts, &self.language, remove_stop_words)
    }

    pub fn word_count(
        &self,
        remove_stop_words: bool,
        user: Option<&str>,
        start_time: Option<DateTime<Utc>>,
        end_time: Option<DateTime<Utc>>,
    ) -> Result<usize> {
        Ok(self
            .tokens(remove_stop_words, user, start_time, end_time)?
            .len())
    }

    pub fn word_count_by_user(
        &self,
        remove_stop_words: bool,
        start_time: Option<DateTime<Utc>>,
        end_time: Option<DateTime<Utc>>,
    ) -> Result<BTreeMap<String, usize>> {
        let mut counts = BTreeMap::new();
        for user in self.unique_users() {
            let count = self.word_count(remove_stop_words, Some(&user), start_time, end_time)?;
            counts.insert(user, count);
        }
        Ok(counts)
    }

    pub fn unique_word_count(
        &self,
        remove_stop_words: bool,
        user: Option<&str>,
        start_time: Option<DateTime<Utc>>,
        end_time: Option<DateTime<Utc>>,
    ) -> Result<usize> {
        let tokens = self.tokens(remove_stop_words, user, start_time, end_time)?;
        let unique: BTreeSet<String> = tokens.into_iter().collect();
        Ok(unique.len())
    }

    pub fn unique_word_count_by_user(
        &self,
        remove_stop_words: bool,
        start_time: Option<DateTime<Utc>>,
        end_time: Option<DateTime<Utc>>,
    ) -> Result<BTreeMap<String, usize>> {
        let mut counts = BTreeMap::new();
        for user in self.unique_users() {
            let count =
                self.unique_word_count(remove_stop_words, Some(&user), start_time, end_time)?;
            counts.insert(user, count);
        }
        Ok(counts)
    }

    /// The `n` most frequent words, count descending with lexicographic
    /// tie-break.
    pub fn most_common_words(
        &self,
        n: usize,
        remove_stop_words: bool,
        user: Option<&str>,
        start_time: Option<DateTime<Utc>>,
        end_time: Option<DateTime<Utc>>,
    ) -> Result<Vec<WordCount>> {
        let tokens = self.tokens(remove_stop_words, user, start_time, end_time)?;
        let ranked = engine::most_common(engine::count_occurrences(tokens), n);
        Ok(ranked
            .into_iter()
            .map(|(word, count)| WordCount { word, count })
            .collect())
    }

    pub fn most_common_words_by_user(
        &self,
        n: usize,
        remove_stop_words: bool,
        start_time: Option<DateTime<Utc>>,
        end_time: Option<DateTime<Utc>>,
    ) -> Result<Vec<UserWordCounts>> {
        let mut rankings = Vec::new();
        for user in self.unique_users() {
            let word_counts =
                self.most_common_words(n, remove_stop_words, Some(&user), start_time, end_time)?;
            rankings.push(UserWordCounts { user, word_counts });
        }
        Ok(rankings)
    }

    // ============================================
    // Emoji
    // ============================================

    fn filtered_emojis(
        &self,
        user: Option<&str>,
        start_time: Option<DateTime<Utc>>,
        end_time: Option<DateTime<Utc>>,
    ) -> Result<Vec<String>> {
        let filtered = self.filtered_text(user, start_time, end_time)?;
        Ok(filtered
            .iter()
            .flat_map(|message| emoji::emojis_in(&message.message))
            .map(str::to_string)
            .collect())
    }

    pub fn emoji_count(
        &self,
        user: Option<&str>,
        start_time: Option<DateTime<Utc>>,
        end_time: Option<DateTime<Utc>>,
    ) -> Result<usize> {
        Ok(self.filtered_emojis(user, start_time, end_time)?.len())
    }

    pub fn emoji_count_by_user(
        &self,
        start_time: Option<DateTime<Utc>>,
        end_time: Option<DateTime<Utc>>,
    ) -> Result<BTreeMap<String, usize>> {
        let mut counts = BTreeMap::new();
        for user in self.unique_users() {
            let count = self.emoji_count(Some(&user), start_time, end_time)?;
            counts.insert(user, count);
        }
        Ok(counts)
    }

    pub fn unique_emoji_count(
        &self,
        user: Option<&str>,
        start_time: Option<DateTime<Utc>>,
        end_time: Option<DateTime<Utc>>,
    ) -> Result<usize> {
        let emojis = self.filtered_emojis(user, start_time, end_time)?;
        let unique: BTreeSet<String> = emojis.into_iter().collect();
        Ok(unique.len())
    }

    pub fn unique_emoji_count_by_user(
        &self,
        start_time: Option<DateTime<Utc>>,
        end_time: Option<DateTime<Utc>>,
    ) -> Result<BTreeMap<String, usize>> {
        let mut counts = BTreeMap::new();
        for user in self.unique_users() {
            let count = self.unique_emoji_count(Some(&user), start_time, end_time)?;
            counts.insert(user, count);
        }
        Ok(counts)
    }

    pub fn most_common_emojis(
        &self,
        n: usize,
        user: Option<&str>,
        start_time: Option<DateTime<Utc>>,
        end_time: Option<DateTime<Utc>>,
    ) -> Result<Vec<EmojiCount>> {
        let emojis = self.filtered_emojis(user, start_time, end_time)?;
        let ranked = engine::most_common(engine::count_occurrences(emojis), n);
        Ok(ranked
            .into_iter()
            .map(|(emoji, count)| EmojiCount { emoji, count })
            .collect())
    }

    pub fn most_common_emojis_by_user(
        &self,
        n: usize,
        start_time: Option<DateTime<Utc>>,
        end_time: Option<DateTime<Utc>>,
    ) -> Result<BTreeMap<String, Vec<EmojiCount>>> {
        let mut rankings = BTreeMap::new();
        for user in self.unique_users() {
            let ranked = self.most_common_emojis(n, Some(&user), start_time, end_time)?;
            rankings.insert(user, ranked);
        }
        Ok(rankings)
    }

    // ============================================
    // Sentiment
    // ============================================

    /// Run sentiment analysis over every text message, once.
    ///
    /// The classifier labels all text messages in chat order as one batch; on
    /// failure no label is assigned. Subsequent calls are no-ops gated by
    /// [`ChatData::is_sentiment_analyzed`].
    pub fn analyze_sentiment(&mut self) -> Result<&[ChatMessage]> {
        if self.data.is_sentiment_analyzed {
            return Ok(&self.data.messages);
        }

        let texts: Vec<&str> = self
            .data
            .messages
            .iter()
            .filter_map(ChatMessage::as_text)
            .map(|message| message.message.as_str())
            .collect();
        let labels = self.classifier.classify_batch(&texts)?;

        let mut labels = labels.into_iter();
        for message in &mut self.data.messages {
            if let ChatMessage::Text(text) = message {
                text.sentiment_label = labels.next();
            }
        }
        self.data.is_sentiment_analyzed = true;

        tracing::info!(
            labeled = self.data.metadata.number_of_texts,
            "Sentiment analysis complete"
        );

        Ok(&self.data.messages)
    }

    /// Sentiment label counts per calendar bucket.
    ///
    /// Runs the one-time sentiment analysis first when needed. Buckets are
    /// chronologically sorted; labels within a bucket sort lexicographically.
    pub fn sentiment_by_frequency(
        &mut self,
        frequency: Frequency,
        user: Option<&str>,
        start_time: Option<DateTime<Utc>>,
        end_time: Option<DateTime<Utc>>,
    ) -> Result<Vec<SentimentBucket>> {
        self.analyze_sentiment()?;
        let filtered = self.filtered_text(user, start_time, end_time)?;
        engine::sentiment_counts(&filtered, &self.bucketer, frequency)
    }

    pub fn sentiment_by_frequencies(
        &mut self,
        frequencies: &[Frequency],
        user: Option<&str>,
        start_time: Option<DateTime<Utc>>,
        end_time: Option<DateTime<Utc>>,
    ) -> Result<HashMap<Frequency, Vec<SentimentBucket>>> {
        self.analyze_sentiment()?;
        let filtered = self.filtered_text(user, start_time, end_time)?;

        let mut buckets = HashMap::new();
        for &frequency in frequencies {
            buckets.insert(
                frequency,
                engine::sentiment_counts(&filtered, &self.bucketer, frequency)?,
            );
        }
        Ok(buckets)
    }

    // ============================================
    // Lengths, durations, reply times
    // ============================================

    /// Character length of the longest text message, 0 when there is none.
    pub fn longest_message(
        &self,
        user: Option<&str>,
        start_time: Option<DateTime<Utc>>,
        end_time: Option<DateTime<Utc>>,
    ) -> Result<usize> {
        let filtered = self.filtered_text(user, start_time, end_time)?;
        Ok(engine::longest_message(&filtered))
    }

    pub fn longest_message_by_user(
        &self,
        start_time: Option<DateTime<Utc>>,
        end_time: Option<DateTime<Utc>>,
    ) -> Result<BTreeMap<String, usize>> {
        let mut lengths = BTreeMap::new();
        for user in self.unique_users() {
            let length = self.longest_message(Some(&user), start_time, end_time)?;
            lengths.insert(user, length);
        }
        Ok(lengths)
    }

    /// Interval between the user's (or chat's) first and last text message.
    ///
    /// Always spans the full history; time-window filters do not apply to
    /// durations. Fails with
    /// [`Error::NoTextMessage`](crate::Error::NoTextMessage) when the
    /// filtered set is empty.
    pub fn chat_duration(&self, user: Option<&str>) -> Result<DateInterval> {
        let filtered = self.filtered_text(user, None, None)?;
        engine::chat_duration(&filtered)
    }

    pub fn chat_duration_by_user(&self) -> Result<BTreeMap<String, DateInterval>> {
        let mut durations = BTreeMap::new();
        for user in self.unique_users() {
            let interval = self.chat_duration(Some(&user))?;
            durations.insert(user, interval);
        }
        Ok(durations)
    }

    /// Mean character length of text messages, 0.0 when there is none.
    pub fn average_message_length(
        &self,
        user: Option<&str>,
        start_time: Option<DateTime<Utc>>,
        end_time: Option<DateTime<Utc>>,
    ) -> Result<f64> {
        let filtered = self.filtered_text(user, start_time, end_time)?;
        Ok(engine::average_message_length(&filtered))
    }

    pub fn average_message_length_by_user(
        &self,
        start_time: Option<DateTime<Utc>>,
        end_time: Option<DateTime<Utc>>,
    ) -> Result<BTreeMap<String, f64>> {
        let mut lengths = BTreeMap::new();
        for user in self.unique_users() {
            let length = self.average_message_length(Some(&user), start_time, end_time)?;
            lengths.insert(user, length);
        }
        Ok(lengths)
    }

    /// Mean first-response latency of `user` in seconds.
    ///
    /// The scan spans every user's text messages within the window; the user
    /// filter is deliberately not applied because turn-taking needs the other
    /// side of the conversation. Fails with
    /// [`Error::NoTextMessage`](crate::Error::NoTextMessage) when the user
    /// never replied to anyone.
    pub fn average_reply_time(
        &self,
        user: &str,
        start_time: Option<DateTime<Utc>>,
        end_time: Option<DateTime<Utc>>,
    ) -> Result<f64> {
        let filtered = self.filtered_text(None, start_time, end_time)?;
        engine::average_reply_time(&filtered, user)
    }

    pub fn average_reply_time_by_user(
        &self,
        start_time: Option<DateTime<Utc>>,
        end_time: Option<DateTime<Utc>>,
    ) -> Result<BTreeMap<String, f64>> {
        let filtered = self.filtered_text(None, start_time, end_time)?;
        let mut times = BTreeMap::new();
        for user in self.unique_users() {
            let time = engine::average_reply_time(&filtered, &user)?;
            times.insert(user, time);
        }
        Ok(times)
    }
}
