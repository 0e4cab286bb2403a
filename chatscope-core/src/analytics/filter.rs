//! Message filtering for queries.

use chrono::{DateTime, Utc};

use crate::error::{Error, Result};
use crate::types::{ChatMessage, MessageType};

/// Predicates applied to the message collection before aggregation.
///
/// All fields are optional; a message passes when every given constraint
/// matches. The time range is inclusive on both ends. Filtering never mutates
/// the underlying messages and preserves their relative order.
#[derive(Debug, Clone, Default)]
pub struct MessageFilter {
    pub user: Option<String>,
    pub message_type: Option<MessageType>,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
}

impl MessageFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn user(mut self, user: impl Into<String>) -> Self {
        self.user = Some(user.into());
        self
    }

    pub fn message_type(mut self, message_type: MessageType) -> Self {
        self.message_type = Some(message_type);
        self
    }

    pub fn start_time(mut self, start_time: DateTime<Utc>) -> Self {
        self.start_time = Some(start_time);
        self
    }

    pub fn end_time(mut self, end_time: DateTime<Utc>) -> Self {
        self.end_time = Some(end_time);
        self
    }

    /// Apply the filter, returning a borrowed view of the matching messages.
    ///
    /// Fails with [`Error::UserNotFound`] when a user constraint names a user
    /// that never appears in `messages`, and with [`Error::InvalidTimeRange`]
    /// when both bounds are given and start is after end. Validation happens
    /// before any result is produced.
    pub fn apply<'a>(&self, messages: &'a [ChatMessage]) -> Result<Vec<&'a ChatMessage>> {
        if let Some(user) = self.user.as_deref() {
            if !messages.iter().any(|message| message.user() == user) {
                return Err(Error::UserNotFound(user.to_string()));
            }
        }

        if let (Some(start), Some(end)) = (self.start_time, self.end_time) {
            if start > end {
                return Err(Error::InvalidTimeRange { start, end });
            }
        }

        Ok(messages
            .iter()
            .filter(|message| {
                self.user
                    .as_deref()
                    .map_or(true, |user| message.user() == user)
                    && self
                        .message_type
                        .map_or(true, |message_type| message.message_type() == message_type)
                    && self
                        .start_time
                        .map_or(true, |start| message.timestamp() >= start)
                    && self.end_time.map_or(true, |end| message.timestamp() <= end)
            })
            .collect())
    }
}
