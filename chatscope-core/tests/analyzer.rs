//! Integration tests for the chat analyzer query surface
//!
//! These tests drive the full facade over a synthetic two-day chat and check
//! the cross-query invariants: per-user partitioning, ranking order, sentiment
//! idempotence, reply-time turn-taking and the documented error asymmetries.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};

use chatscope_core::sentiment::{SentimentClassifier, SentimentModel};
use chatscope_core::{
    AttachmentKind, AttachmentMessage, ChatAnalyzer, ChatData, ChatMessage, Config, Error,
    Frequency, Language, MessageType, TextMessage,
};

fn ts(day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2023, 9, day, hour, minute, 0).unwrap()
}

fn text(user: &str, day: u32, hour: u32, minute: u32, message: &str) -> ChatMessage {
    ChatMessage::Text(TextMessage::new(user, ts(day, hour, minute), message))
}

fn photo(user: &str, day: u32, hour: u32) -> ChatMessage {
    ChatMessage::Attachment(AttachmentMessage {
        user: user.to_string(),
        timestamp: ts(day, hour, 0),
        kind: AttachmentKind::Photo,
        file_name: "IMG-0001".to_string(),
        extension: "jpg".to_string(),
    })
}

/// Two days of chatter between alice and bob, plus carol who only ever sent
/// a photo.
fn make_chat() -> ChatData {
    ChatData::from_messages(vec![
        text("alice", 18, 9, 0, "good morning bob, what a lovely day 😀"),
        text("bob", 18, 9, 30, "morning alice! the weather is great"),
        text("alice", 18, 10, 0, "lunch at the usual place?"),
        text("bob", 18, 10, 15, "sure, see you at noon"),
        photo("carol", 18, 12),
        text("alice", 19, 9, 0, "traffic was awful today 😀"),
        text("bob", 19, 9, 20, "terrible, took me an hour"),
        text("alice", 19, 21, 0, "sleep well"),
    ])
}

fn make_analyzer() -> ChatAnalyzer {
    ChatAnalyzer::with_language(make_chat(), Language::English, &Config::default()).unwrap()
}

// ============================================
// Users and partitioning
// ============================================

#[test]
fn test_unique_users_match_user_count_and_per_user_maps() {
    let analyzer = make_analyzer();

    assert_eq!(analyzer.unique_users().len(), analyzer.user_count());
    assert_eq!(analyzer.user_count(), 3);

    let day_counts = analyzer.day_count_by_user(None, None, None).unwrap();
    assert_eq!(day_counts.len(), analyzer.user_count());
}

#[test]
fn test_message_count_partitions_across_users() {
    let analyzer = make_analyzer();

    let total = analyzer.message_count(None, None, None, None).unwrap();
    let by_user = analyzer.message_count_by_user(None, None, None).unwrap();

    assert_eq!(total, 8);
    assert_eq!(by_user.values().sum::<usize>(), total);
}

#[test]
fn test_message_type_filter() {
    let analyzer = make_analyzer();

    let texts = analyzer
        .message_count(None, Some(MessageType::Text), None, None)
        .unwrap();
    let photos = analyzer
        .message_count(None, Some(MessageType::Photo), None, None)
        .unwrap();

    assert_eq!(texts, 7);
    assert_eq!(photos, 1);
    assert_eq!(analyzer.metadata().number_of_texts, texts);
    assert_eq!(analyzer.metadata().number_of_photos, photos);
}

// ============================================
// Temporal queries
// ============================================

#[test]
fn test_unique_days_render_as_day_labels() {
    let analyzer = make_analyzer();

    let days = analyzer.unique_days(None, None, None, None).unwrap();
    assert_eq!(days.len(), 2);
    assert!(days.contains("18/9/2023"));
    assert!(days.contains("19/9/2023"));
}

#[test]
fn test_histograms_sorted_chronologically_per_frequency() {
    let analyzer = make_analyzer();

    let histograms = analyzer
        .message_counts_by_frequencies(
            &[Frequency::Day, Frequency::Weekday, Frequency::Hour],
            None,
            None,
            None,
            None,
        )
        .unwrap();

    let days = &histograms[&Frequency::Day];
    assert_eq!(days.len(), 2);
    assert!(days[0].date < days[1].date);
    assert_eq!(days[0].count, 5);
    assert_eq!(days[1].count, 3);

    // 2023-09-18 is a Monday, 2023-09-19 a Tuesday.
    let weekdays = &histograms[&Frequency::Weekday];
    assert_eq!(weekdays[0].date.weekday, Some(1));
    assert_eq!(weekdays[1].date.weekday, Some(2));

    // Hour buckets merge across days: 9h holds messages from both days.
    let hours = &histograms[&Frequency::Hour];
    let nine = hours.iter().find(|c| c.date.hour == Some(9)).unwrap();
    assert_eq!(nine.count, 4);
    assert_eq!(nine.date.render_hour_range(), "09-10");
}

#[test]
fn test_time_window_is_inclusive_and_validated() {
    let analyzer = make_analyzer();

    let windowed = analyzer
        .message_count(None, None, Some(ts(18, 9, 0)), Some(ts(18, 10, 0)))
        .unwrap();
    assert_eq!(windowed, 3);

    let inverted = analyzer.message_count(None, None, Some(ts(19, 0, 0)), Some(ts(18, 0, 0)));
    assert!(matches!(inverted, Err(Error::InvalidTimeRange { .. })));
}

// ============================================
// Words and emoji
// ============================================

#[test]
fn test_stop_word_removal_never_increases_word_count() {
    let analyzer = make_analyzer();

    let with_stop_words = analyzer.word_count(false, None, None, None).unwrap();
    let without = analyzer.word_count(true, None, None, None).unwrap();

    assert!(without <= with_stop_words);
    assert!(with_stop_words > 0);
}

#[test]
fn test_stop_word_removal_requires_supported_language() {
    let mut analyzer = make_analyzer();
    analyzer.set_language(Language::Other("fra".to_string()));

    assert!(analyzer.word_count(false, None, None, None).is_ok());
    assert!(matches!(
        analyzer.word_count(true, None, None, None),
        Err(Error::LanguageNotSupported(_))
    ));
}

#[test]
fn test_most_common_words_is_consistent_with_full_ranking() {
    let analyzer = make_analyzer();

    let top_three = analyzer
        .most_common_words(3, false, None, None, None)
        .unwrap();
    let everything = analyzer
        .most_common_words(usize::MAX, false, None, None, None)
        .unwrap();

    assert!(top_three.len() <= 3);
    assert_eq!(&everything[..top_three.len()], &top_three[..]);
    for pair in everything.windows(2) {
        assert!(pair[0].count >= pair[1].count);
    }
}

#[test]
fn test_emoji_counts_per_user() {
    let analyzer = make_analyzer();

    assert_eq!(analyzer.emoji_count(None, None, None).unwrap(), 2);
    assert_eq!(analyzer.unique_emoji_count(None, None, None).unwrap(), 1);

    let by_user = analyzer.emoji_count_by_user(None, None).unwrap();
    assert_eq!(by_user["alice"], 2);
    assert_eq!(by_user["bob"], 0);
    assert_eq!(by_user["carol"], 0);

    let top = analyzer.most_common_emojis(1, None, None, None).unwrap();
    assert_eq!(top[0].emoji, "😀");
    assert_eq!(top[0].count, 2);
}

// ============================================
// Sentiment
// ============================================

struct CountingModel {
    calls: Arc<AtomicUsize>,
}

impl SentimentModel for CountingModel {
    fn predict(&self, text: &str) -> chatscope_core::Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let label = if text.contains("awful") || text.contains("terrible") {
            "Negative"
        } else {
            "Positive"
        };
        Ok(label.to_string())
    }
}

struct FailingModel;

impl SentimentModel for FailingModel {
    fn predict(&self, _text: &str) -> chatscope_core::Result<String> {
        Err(Error::PredictionFailed("model unavailable".to_string()))
    }
}

#[test]
fn test_sentiment_analysis_runs_exactly_once() {
    let mut analyzer = make_analyzer();
    let calls = Arc::new(AtomicUsize::new(0));
    analyzer.set_classifier(SentimentClassifier::with_model(Box::new(CountingModel {
        calls: Arc::clone(&calls),
    })));

    analyzer.analyze_sentiment().unwrap();
    assert!(analyzer.is_sentiment_analyzed());
    assert_eq!(calls.load(Ordering::SeqCst), 7);

    // Second run is a no-op: no further model calls, identical state.
    let before: Vec<ChatMessage> = analyzer.chat_data().messages.clone();
    analyzer.analyze_sentiment().unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 7);
    assert_eq!(analyzer.chat_data().messages, before);
}

#[test]
fn test_failed_analysis_assigns_no_partial_labels() {
    let mut analyzer = make_analyzer();
    analyzer.set_classifier(SentimentClassifier::with_model(Box::new(FailingModel)));

    assert!(matches!(
        analyzer.analyze_sentiment(),
        Err(Error::PredictionFailed(_))
    ));
    assert!(!analyzer.is_sentiment_analyzed());
    assert!(analyzer
        .chat_data()
        .messages
        .iter()
        .filter_map(ChatMessage::as_text)
        .all(|message| message.sentiment_label.is_none()));
}

#[test]
fn test_sentiment_buckets_sorted_with_sorted_labels() {
    let mut analyzer = make_analyzer();
    let buckets = analyzer
        .sentiment_by_frequency(Frequency::Day, None, None, None)
        .unwrap();

    assert_eq!(buckets.len(), 2);
    assert!(buckets[0].date < buckets[1].date);
    for bucket in &buckets {
        for pair in bucket.counts.windows(2) {
            assert!(pair[0].sentiment < pair[1].sentiment);
        }
    }

    let day_two = &buckets[1];
    let total: usize = day_two.counts.iter().map(|c| c.count).sum();
    assert_eq!(total, 3);
}

// ============================================
// Durations and reply times
// ============================================

#[test]
fn test_chat_duration_spans_full_history() {
    let analyzer = make_analyzer();

    let interval = analyzer.chat_duration(None).unwrap();
    assert_eq!(interval.start, ts(18, 9, 0));
    assert_eq!(interval.end, ts(19, 21, 0));
    assert_eq!(
        interval.duration(),
        chrono::Duration::hours(36)
    );
}

#[test]
fn test_duration_error_vs_longest_message_zero() {
    let analyzer = make_analyzer();

    // carol never sent a text message.
    assert!(matches!(
        analyzer.chat_duration(Some("carol")),
        Err(Error::NoTextMessage)
    ));
    assert_eq!(analyzer.longest_message(Some("carol"), None, None).unwrap(), 0);
    assert_eq!(
        analyzer
            .average_message_length(Some("carol"), None, None)
            .unwrap(),
        0.0
    );
}

#[test]
fn test_average_reply_time_counts_first_responses_only() {
    let data = ChatData::from_messages(vec![
        text("a", 18, 9, 0, "first message"),
        text("b", 18, 9, 10, "b replies"),
        text("a", 18, 9, 15, "a replies in five minutes"),
        text("a", 18, 9, 16, "and follows up immediately"),
        text("b", 18, 9, 30, "b again"),
        text("a", 18, 9, 45, "a replies in fifteen minutes"),
    ]);
    let analyzer =
        ChatAnalyzer::with_language(data, Language::English, &Config::default()).unwrap();

    // Samples for a: 5 min and 15 min; the follow-up adds nothing.
    let average = analyzer.average_reply_time("a", None, None).unwrap();
    assert!((average - 600.0).abs() < f64::EPSILON);

    // b has two samples: 10 minutes after a's opener and 14 minutes after
    // a's follow-up.
    let b_average = analyzer.average_reply_time("b", None, None).unwrap();
    assert!((b_average - 720.0).abs() < f64::EPSILON);
}

#[test]
fn test_reply_time_without_any_reply_fails() {
    let data = ChatData::from_messages(vec![
        text("a", 18, 9, 0, "talking"),
        text("a", 18, 10, 0, "to myself"),
    ]);
    let analyzer =
        ChatAnalyzer::with_language(data, Language::English, &Config::default()).unwrap();

    assert!(matches!(
        analyzer.average_reply_time("a", None, None),
        Err(Error::NoTextMessage)
    ));
}

// ============================================
// Error surface
// ============================================

#[test]
fn test_unknown_user_is_rejected_everywhere() {
    let analyzer = make_analyzer();

    assert!(matches!(
        analyzer.message_count(Some("mallory"), None, None, None),
        Err(Error::UserNotFound(_))
    ));
    assert!(matches!(
        analyzer.most_common_words(5, false, Some("mallory"), None, None),
        Err(Error::UserNotFound(_))
    ));
    assert!(matches!(
        analyzer.chat_duration(Some("mallory")),
        Err(Error::UserNotFound(_))
    ));
}

#[test]
fn test_language_detection_on_real_chat() {
    let analyzer = ChatAnalyzer::new(make_chat(), &Config::default()).unwrap();
    assert_eq!(analyzer.language(), &Language::English);
}
