use chrono::{DateTime, Duration, Utc};
use log::{debug, info};

use crate::models::{DeliveryStatus, Message, MessageId, MessageKind, Sender};

/// The single, append-only message sequence of the open chat. Insertion order is
/// display order.
#[derive(Debug, Clone, Default)]
pub struct Conversation {
    messages: Vec<Message>,
    last_id_millis: i64,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    /// The three-message history the application starts with.
    pub fn seeded(now: DateTime<Utc>) -> Self {
        let seed = [
            ("1", "Hey! How are you doing?", Sender::Other, 10),
            ("2", "I'm doing great! Just working on this new chat app called Whispr 🚀", Sender::Me, 5),
            ("3", "That sounds amazing! What features does it have?", Sender::Other, 2),
        ];

        let messages = seed
            .into_iter()
            .map(|(id, text, sender, secs_ago)| Message {
                id: MessageId(id.to_string()),
                text: text.to_string(),
                sender,
                timestamp: now - Duration::seconds(secs_ago),
                status: DeliveryStatus::Read,
                kind: MessageKind::Text,
            })
            .collect();

        Conversation {
            messages,
            last_id_millis: 0,
        }
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn get(&self, id: &MessageId) -> Option<&Message> {
        self.messages.iter().find(|m| &m.id == id)
    }

    /// Append an outgoing text message in the `Sending` state. Text that is empty
    /// after trimming is ignored and `None` is returned.
    pub fn send(&mut self, text: &str, now: DateTime<Utc>) -> Option<MessageId> {
        if text.trim().is_empty() {
            debug!("Ignoring empty message");
            return None;
        }

        let id = self.next_id(now);
        self.messages.push(Message {
            id: id.clone(),
            text: text.to_string(),
            sender: Sender::Me,
            timestamp: now,
            status: DeliveryStatus::Sending,
            kind: MessageKind::Text,
        });
        info!("Queued message {} ({} chars)", id, text.chars().count());

        Some(id)
    }

    /// Replace the status of the message with `id`. Nothing else is touched.
    /// Returns `false` when no message matches.
    pub fn apply_status(&mut self, id: &MessageId, status: DeliveryStatus) -> bool {
        match self.messages.iter_mut().find(|m| &m.id == id) {
            Some(message) => {
                debug!("Message {} status {:?} -> {:?}", id, message.status, status);
                message.status = status;
                true
            }
            None => {
                debug!("Status {:?} for unknown message {}", status, id);
                false
            }
        }
    }

    // Creation time in milliseconds, bumped so ids stay strictly increasing.
    fn next_id(&mut self, now: DateTime<Utc>) -> MessageId {
        let millis = now.timestamp_millis().max(self.last_id_millis + 1);
        self.last_id_millis = millis;
        MessageId(millis.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_text_is_ignored() {
        let mut conversation = Conversation::new();
        let now = Utc::now();

        assert_eq!(conversation.send("", now), None);
        assert_eq!(conversation.send("   \n\t ", now), None);
        assert!(conversation.is_empty());
    }

    #[test]
    fn test_send_keeps_original_text() {
        let mut conversation = Conversation::new();
        let id = conversation.send("  hi there ", Utc::now()).unwrap();

        let message = conversation.get(&id).unwrap();
        assert_eq!(message.text, "  hi there ");
        assert_eq!(message.sender, Sender::Me);
        assert_eq!(message.status, DeliveryStatus::Sending);
        assert_eq!(message.kind, MessageKind::Text);
    }

    #[test]
    fn test_ids_do_not_collide_within_same_millisecond() {
        let mut conversation = Conversation::new();
        let now = Utc::now();

        let first = conversation.send("one", now).unwrap();
        let second = conversation.send("two", now).unwrap();

        assert_ne!(first, second);
        assert_eq!(first.0, now.timestamp_millis().to_string());
        assert_eq!(second.0, (now.timestamp_millis() + 1).to_string());
    }

    #[test]
    fn test_apply_status_only_touches_target() {
        let mut conversation = Conversation::seeded(Utc::now());
        let id = conversation.send("hello", Utc::now()).unwrap();
        let before = conversation.messages().to_vec();

        assert!(conversation.apply_status(&id, DeliveryStatus::Delivered));

        let after = conversation.messages();
        assert_eq!(after.len(), before.len());
        for (old, new) in before.iter().zip(after) {
            if old.id == id {
                assert_eq!(new.status, DeliveryStatus::Delivered);
                assert_eq!(new.text, old.text);
                assert_eq!(new.timestamp, old.timestamp);
            } else {
                assert_eq!(old, new);
            }
        }
    }

    #[test]
    fn test_apply_status_unknown_id_is_noop() {
        let mut conversation = Conversation::seeded(Utc::now());
        let before = conversation.messages().to_vec();

        assert!(!conversation.apply_status(&MessageId("nope".to_string()), DeliveryStatus::Read));
        assert_eq!(conversation.messages(), before.as_slice());
    }
}
