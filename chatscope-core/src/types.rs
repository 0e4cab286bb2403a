//! Core domain types for chatscope
//!
//! These types represent the canonical data model that normalizes messages
//! from exported chat archives, independent of the platform they came from.
//!
//! ## Terminology
//!
//! | Term | Definition |
//! |------|------------|
//! | **ChatMessage** | One message in a chat, as a closed sum over variants |
//! | **TextMessage** | A plain text message; the only variant carrying a sentiment label |
//! | **Attachment** | A media or file message (photo, video, voice, sticker, file) |
//! | **ChatMetadata** | Per-type counters computed once at ingestion |
//! | **ChatData** | The message sequence plus metadata owned by one analyzer |
//!
//! Messages are immutable after ingestion with one exception: the
//! `sentiment_label` of a [`TextMessage`] is assigned exactly once by
//! sentiment analysis. Consumers match exhaustively on the message variant
//! instead of downcasting.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::analytics::temporal::DateBucketKey;
use crate::text::emoji;

// ============================================
// Message types
// ============================================

/// Type of message within a chat
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageType {
    Text,
    Sticker,
    VoiceMessage,
    Photo,
    Video,
    ViewOncePhoto,
    ViewOnceVideo,
    File,
    Location,
    Contact,
    Poll,
}

impl MessageType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageType::Text => "text",
            MessageType::Sticker => "sticker",
            MessageType::VoiceMessage => "voice_message",
            MessageType::Photo => "photo",
            MessageType::Video => "video",
            MessageType::ViewOncePhoto => "view_once_photo",
            MessageType::ViewOnceVideo => "view_once_video",
            MessageType::File => "file",
            MessageType::Location => "location",
            MessageType::Contact => "contact",
            MessageType::Poll => "poll",
        }
    }
}

impl std::fmt::Display for MessageType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for MessageType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "text" => Ok(MessageType::Text),
            "sticker" => Ok(MessageType::Sticker),
            "voice_message" => Ok(MessageType::VoiceMessage),
            "photo" => Ok(MessageType::Photo),
            "video" => Ok(MessageType::Video),
            "view_once_photo" => Ok(MessageType::ViewOncePhoto),
            "view_once_video" => Ok(MessageType::ViewOnceVideo),
            "file" => Ok(MessageType::File),
            "location" => Ok(MessageType::Location),
            "contact" => Ok(MessageType::Contact),
            "poll" => Ok(MessageType::Poll),
            _ => Err(format!("unknown message type: {}", s)),
        }
    }
}

/// Kind of attachment carried by an [`AttachmentMessage`].
///
/// A strict subset of [`MessageType`]: the media kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttachmentKind {
    Sticker,
    VoiceMessage,
    Photo,
    Video,
    ViewOncePhoto,
    ViewOnceVideo,
    File,
}

impl AttachmentKind {
    /// The message type this attachment kind reports as.
    pub fn message_type(&self) -> MessageType {
        match self {
            AttachmentKind::Sticker => MessageType::Sticker,
            AttachmentKind::VoiceMessage => MessageType::VoiceMessage,
            AttachmentKind::Photo => MessageType::Photo,
            AttachmentKind::Video => MessageType::Video,
            AttachmentKind::ViewOncePhoto => MessageType::ViewOncePhoto,
            AttachmentKind::ViewOnceVideo => MessageType::ViewOnceVideo,
            AttachmentKind::File => MessageType::File,
        }
    }
}

// ============================================
// Message variants
// ============================================

/// A plain text message.
///
/// `sentiment_label` is `None` until sentiment analysis runs; it is assigned
/// exactly once and holds `"Positive"` or `"Negative"` afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TextMessage {
    pub user: String,
    pub timestamp: DateTime<Utc>,
    pub message: String,
    pub sentiment_label: Option<String>,
}

impl TextMessage {
    pub fn new(user: impl Into<String>, timestamp: DateTime<Utc>, message: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            timestamp,
            message: message.into(),
            sentiment_label: None,
        }
    }
}

/// A media or file message referencing an attached file.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AttachmentMessage {
    pub user: String,
    pub timestamp: DateTime<Utc>,
    pub kind: AttachmentKind,
    pub file_name: String,
    pub extension: String,
}

/// A shared location.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LocationMessage {
    pub user: String,
    pub timestamp: DateTime<Utc>,
    pub name: String,
    pub city: String,
    pub latitude: String,
    pub longitude: String,
}

/// A shared contact card.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContactMessage {
    pub user: String,
    pub timestamp: DateTime<Utc>,
    pub display_name: String,
}

/// A poll with its options and vote counts.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PollMessage {
    pub user: String,
    pub timestamp: DateTime<Utc>,
    pub question: String,
    pub options: Vec<PollOption>,
}

/// One selectable option of a [`PollMessage`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PollOption {
    pub option: String,
    pub count: usize,
}

/// A chat message, as a closed sum over all supported variants.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChatMessage {
    Text(TextMessage),
    Attachment(AttachmentMessage),
    Location(LocationMessage),
    Contact(ContactMessage),
    Poll(PollMessage),
}

impl ChatMessage {
    /// Display name of the sender.
    pub fn user(&self) -> &str {
        match self {
            ChatMessage::Text(m) => &m.user,
            ChatMessage::Attachment(m) => &m.user,
            ChatMessage::Location(m) => &m.user,
            ChatMessage::Contact(m) => &m.user,
            ChatMessage::Poll(m) => &m.user,
        }
    }

    /// When the message was sent.
    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            ChatMessage::Text(m) => m.timestamp,
            ChatMessage::Attachment(m) => m.timestamp,
            ChatMessage::Location(m) => m.timestamp,
            ChatMessage::Contact(m) => m.timestamp,
            ChatMessage::Poll(m) => m.timestamp,
        }
    }

    /// The message type reported by this variant.
    pub fn message_type(&self) -> MessageType {
        match self {
            ChatMessage::Text(_) => MessageType::Text,
            ChatMessage::Attachment(m) => m.kind.message_type(),
            ChatMessage::Location(_) => MessageType::Location,
            ChatMessage::Contact(_) => MessageType::Contact,
            ChatMessage::Poll(_) => MessageType::Poll,
        }
    }

    /// Borrow the text payload, if this is a text message.
    pub fn as_text(&self) -> Option<&TextMessage> {
        match self {
            ChatMessage::Text(m) => Some(m),
            _ => None,
        }
    }
}

// ============================================
// Chat metadata
// ============================================

/// Aggregate per-type counters for a chat.
///
/// Computed once at ingestion via [`ChatMetadata::from_messages`] and never
/// recomputed by the query engine.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatMetadata {
    pub number_of_users: usize,
    pub number_of_messages: usize,
    pub number_of_texts: usize,
    pub number_of_photos: usize,
    pub number_of_videos: usize,
    pub number_of_voice_messages: usize,
    pub number_of_stickers: usize,
    pub number_of_emojis: usize,
    pub number_of_files: usize,
    pub number_of_view_once_photos: usize,
    pub number_of_view_once_videos: usize,
    pub number_of_locations: usize,
    pub number_of_contacts: usize,
    pub number_of_polls: usize,
}

impl ChatMetadata {
    /// Count users, messages per type and emoji occurrences in one pass.
    pub fn from_messages(messages: &[ChatMessage]) -> Self {
        let mut metadata = ChatMetadata {
            number_of_messages: messages.len(),
            ..ChatMetadata::default()
        };
        let mut users = BTreeSet::new();

        for message in messages {
            users.insert(message.user());
            match message.message_type() {
                MessageType::Text => {
                    metadata.number_of_texts += 1;
                    if let Some(text) = message.as_text() {
                        metadata.number_of_emojis += emoji::emoji_count(&text.message);
                    }
                }
                MessageType::Sticker => metadata.number_of_stickers += 1,
                MessageType::VoiceMessage => metadata.number_of_voice_messages += 1,
                MessageType::Photo => metadata.number_of_photos += 1,
                MessageType::Video => metadata.number_of_videos += 1,
                MessageType::ViewOncePhoto => metadata.number_of_view_once_photos += 1,
                MessageType::ViewOnceVideo => metadata.number_of_view_once_videos += 1,
                MessageType::File => metadata.number_of_files += 1,
                MessageType::Location => metadata.number_of_locations += 1,
                MessageType::Contact => metadata.number_of_contacts += 1,
                MessageType::Poll => metadata.number_of_polls += 1,
            }
        }

        metadata.number_of_users = users.len();
        metadata
    }
}

// ============================================
// Chat data
// ============================================

/// The normalized contents of one chat export.
///
/// Message order is ingestion order, which usually but not necessarily equals
/// timestamp order; queries that need chronological order sort themselves.
/// An analyzer instance takes exclusive ownership of this value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatData {
    pub messages: Vec<ChatMessage>,
    pub metadata: ChatMetadata,
    pub is_sentiment_analyzed: bool,
}

impl ChatData {
    pub fn new(messages: Vec<ChatMessage>, metadata: ChatMetadata) -> Self {
        Self {
            messages,
            metadata,
            is_sentiment_analyzed: false,
        }
    }

    /// Build chat data with metadata derived from the messages.
    pub fn from_messages(messages: Vec<ChatMessage>) -> Self {
        let metadata = ChatMetadata::from_messages(&messages);
        Self::new(messages, metadata)
    }

    /// Serialize to JSON for interchange with other tools.
    pub fn to_json(&self) -> crate::error::Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Deserialize from the JSON interchange format.
    pub fn from_json(json: &str) -> crate::error::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

// ============================================
// Query result records
// ============================================

/// A word and how often it occurred.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WordCount {
    pub word: String,
    pub count: usize,
}

/// Most common words of one user.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserWordCounts {
    pub user: String,
    pub word_counts: Vec<WordCount>,
}

/// Message count within one calendar bucket.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageCount {
    pub date: DateBucketKey,
    pub count: usize,
}

/// An emoji and how often it occurred.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EmojiCount {
    pub emoji: String,
    pub count: usize,
}

/// Count of one sentiment label within a bucket.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SentimentCount {
    pub sentiment: String,
    pub count: usize,
}

/// Sentiment label counts within one calendar bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentimentBucket {
    pub date: DateBucketKey,
    pub counts: Vec<SentimentCount>,
}

/// Closed interval between the earliest and latest message of a chat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateInterval {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl DateInterval {
    pub fn duration(&self) -> chrono::Duration {
        self.end - self.start
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn ts(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2023, 9, 18, hour, 0, 0).unwrap()
    }

    fn text(user: &str, hour: u32, message: &str) -> ChatMessage {
        ChatMessage::Text(TextMessage::new(user, ts(hour), message))
    }

    #[test]
    fn test_metadata_counts_partition_message_total() {
        let messages = vec![
            text("alice", 9, "hello there 😀"),
            text("bob", 10, "hi"),
            ChatMessage::Attachment(AttachmentMessage {
                user: "alice".to_string(),
                timestamp: ts(11),
                kind: AttachmentKind::Photo,
                file_name: "IMG-0001".to_string(),
                extension: "jpg".to_string(),
            }),
            ChatMessage::Location(LocationMessage {
                user: "bob".to_string(),
                timestamp: ts(12),
                name: "Cafe".to_string(),
                city: "Berlin".to_string(),
                latitude: "52.52".to_string(),
                longitude: "13.40".to_string(),
            }),
        ];

        let metadata = ChatMetadata::from_messages(&messages);

        assert_eq!(metadata.number_of_users, 2);
        assert_eq!(metadata.number_of_messages, 4);
        assert_eq!(metadata.number_of_texts, 2);
        assert_eq!(metadata.number_of_photos, 1);
        assert_eq!(metadata.number_of_locations, 1);
        assert_eq!(metadata.number_of_emojis, 1);

        let by_type = metadata.number_of_texts
            + metadata.number_of_photos
            + metadata.number_of_videos
            + metadata.number_of_voice_messages
            + metadata.number_of_stickers
            + metadata.number_of_files
            + metadata.number_of_view_once_photos
            + metadata.number_of_view_once_videos
            + metadata.number_of_locations
            + metadata.number_of_contacts
            + metadata.number_of_polls;
        assert_eq!(by_type, metadata.number_of_messages);
    }

    #[test]
    fn test_message_accessors() {
        let message = text("alice", 9, "hello");
        assert_eq!(message.user(), "alice");
        assert_eq!(message.message_type(), MessageType::Text);
        assert_eq!(message.as_text().unwrap().message, "hello");

        let sticker = ChatMessage::Attachment(AttachmentMessage {
            user: "bob".to_string(),
            timestamp: ts(10),
            kind: AttachmentKind::Sticker,
            file_name: "STK-0001".to_string(),
            extension: "webp".to_string(),
        });
        assert_eq!(sticker.message_type(), MessageType::Sticker);
        assert!(sticker.as_text().is_none());
    }

    #[test]
    fn test_chat_data_json_round_trip() {
        let data = ChatData::from_messages(vec![text("alice", 9, "hello"), text("bob", 10, "hi")]);

        let json = data.to_json().expect("serialize");
        let restored = ChatData::from_json(&json).expect("deserialize");

        assert_eq!(restored.messages, data.messages);
        assert_eq!(restored.metadata, data.metadata);
        assert!(!restored.is_sentiment_analyzed);
    }

    #[test]
    fn test_message_type_round_trip() {
        for message_type in [
            MessageType::Text,
            MessageType::ViewOncePhoto,
            MessageType::VoiceMessage,
            MessageType::Poll,
        ] {
            let parsed: MessageType = message_type.as_str().parse().unwrap();
            assert_eq!(parsed, message_type);
        }
        assert!("carrier_pigeon".parse::<MessageType>().is_err());
    }
}
