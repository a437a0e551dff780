use chrono::{DateTime, Utc};
use std::fmt;

/// Name shown when a contact lookup does not resolve.
pub const UNKNOWN_CONTACT: &str = "Unknown contact";

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContactId(pub String);

impl ContactId {
    pub fn new(id: impl Into<String>) -> Self {
        ContactId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContactId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One roster entry. `last_message` and `timestamp` are display strings and are
/// not derived from the conversation.
#[derive(Debug, Clone, PartialEq)]
pub struct Contact {
    pub id: ContactId,
    pub name: String,
    /// Picture as a data URI; `None` falls back to initials.
    pub avatar: Option<String>,
    pub last_message: String,
    pub timestamp: String,
    pub unread_count: u32,
    pub is_online: bool,
    pub last_seen: Option<String>,
    pub is_typing: bool,
    pub is_pinned: bool,
}

/// Avatar fallback: the first two characters of a name.
pub fn initials(name: &str) -> String {
    name.chars().take(2).collect()
}

impl Contact {
    pub fn initials(&self) -> String {
        initials(&self.name)
    }

    pub fn presence_line(&self) -> String {
        if self.is_online {
            "Online".to_string()
        } else if let Some(seen) = &self.last_seen {
            format!("Last seen {}", seen)
        } else {
            "Offline".to_string()
        }
    }

    pub fn preview(&self) -> &str {
        if self.is_typing {
            "typing..."
        } else {
            &self.last_message
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MessageId(pub String);

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sender {
    Me,
    Other,
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum DeliveryStatus {
    Sending,   // Submitted, no acknowledgment yet
    Sent,      // Single checkmark stage, never produced by the simulated receipts
    Delivered, // Reached the recipient's device
    Read,      // Seen by the recipient, terminal
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum MessageKind {
    Text,
    Voice,
    Image,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    pub id: MessageId,
    pub text: String,
    pub sender: Sender,
    pub timestamp: DateTime<Utc>,
    pub status: DeliveryStatus,
    pub kind: MessageKind,
}

/// A short-lived confirmation shown on top of the current screen.
#[derive(Debug, Clone, PartialEq)]
pub struct Notice {
    pub title: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

impl Notice {
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Notice {
            title: title.into(),
            description: description.into(),
            created_at: Utc::now(),
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>, timeout_secs: i64) -> bool {
        (now - self.created_at).num_seconds() >= timeout_secs
    }
}
