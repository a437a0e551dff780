use chrono::Utc;
use log::{debug, info};
use rand::seq::SliceRandom;
use rand::Rng;
use std::path::Path;

use crate::conversation::Conversation;
use crate::delivery::DeliveryTracker;
use crate::models::{Contact, ContactId, MessageId, Notice, UNKNOWN_CONTACT};
use crate::roster::Roster;

pub const EMOJIS: [&str; 8] = ["😀", "😂", "❤️", "👍", "🎉", "🔥", "💯", "🚀"];

/// State behind the conversation screen: roster, search, selection, the open
/// conversation and the voice recording flag.
pub struct ChatSession {
    roster: Roster,
    conversation: Conversation,
    selected: ContactId,
    search_query: String,
    recording: bool,
}

impl ChatSession {
    pub fn new(roster: Roster, conversation: Conversation) -> Self {
        let selected = roster
            .contacts()
            .first()
            .map(|c| c.id.clone())
            .unwrap_or_else(|| ContactId::new(""));

        ChatSession {
            roster,
            conversation,
            selected,
            search_query: String::new(),
            recording: false,
        }
    }

    /// Seeded roster and history, with the first contact selected.
    pub fn seeded() -> Self {
        Self::new(Roster::seeded(), Conversation::seeded(Utc::now()))
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    pub fn conversation_mut(&mut self) -> &mut Conversation {
        &mut self.conversation
    }

    pub fn search_query(&self) -> &str {
        &self.search_query
    }

    pub fn set_search(&mut self, query: &str) {
        self.search_query = query.to_string();
    }

    pub fn visible_contacts(&self) -> Vec<&Contact> {
        self.roster.visible(&self.search_query)
    }

    pub fn selected_id(&self) -> &ContactId {
        &self.selected
    }

    pub fn selected_contact(&self) -> Option<&Contact> {
        self.roster.get(&self.selected)
    }

    pub fn select(&mut self, id: &ContactId) {
        self.selected = id.clone();
    }

    pub fn select_next(&mut self) {
        self.step_selection(1);
    }

    pub fn select_previous(&mut self) {
        self.step_selection(-1);
    }

    // Moves within the visible order; wraps at both ends.
    fn step_selection(&mut self, step: isize) {
        let visible: Vec<ContactId> = self.visible_contacts().iter().map(|c| c.id.clone()).collect();
        if visible.is_empty() {
            return;
        }

        let len = visible.len() as isize;
        let next = match visible.iter().position(|id| id == &self.selected) {
            Some(current) => (current as isize + step).rem_euclid(len),
            None => 0,
        };
        self.selected = visible[next as usize].clone();
    }

    pub fn is_recording(&self) -> bool {
        self.recording
    }

    /// Append `text` to the conversation and hand its id to `tracker`.
    pub fn send(&mut self, text: &str, tracker: &dyn DeliveryTracker) -> Option<MessageId> {
        let id = self.conversation.send(text, Utc::now())?;
        tracker.track(&id);
        Some(id)
    }

    pub fn toggle_pin(&mut self, id: &ContactId) -> Notice {
        self.roster.toggle_pin(id)
    }

    fn selected_name(&self) -> &str {
        self.selected_contact()
            .map(|c| c.name.as_str())
            .unwrap_or(UNKNOWN_CONTACT)
    }

    pub fn voice_call(&self) -> Notice {
        info!("Voice call requested for {}", self.selected);
        Notice::new("Voice call initiated", format!("Calling {}...", self.selected_name()))
    }

    pub fn video_call(&self) -> Notice {
        info!("Video call requested for {}", self.selected);
        Notice::new(
            "Video call initiated",
            format!("Starting video call with {}...", self.selected_name()),
        )
    }

    /// Only the file name is used; nothing is uploaded. No path, or a path that
    /// does not name a file, does nothing.
    pub fn attach(&self, path: Option<&Path>) -> Option<Notice> {
        let path = path.filter(|p| !p.as_os_str().is_empty())?;
        if !path.is_file() {
            debug!("Attachment {} is not a file, ignoring", path.display());
            return None;
        }

        let name = path.file_name()?.to_string_lossy().into_owned();
        info!("Attached {}", name);
        Some(Notice::new("File attached", format!("{} ready to send", name)))
    }

    pub fn toggle_recording(&mut self) -> Notice {
        self.recording = !self.recording;
        info!("Voice recording: {}", self.recording);
        if self.recording {
            Notice::new("Recording started", "Press Ctrl+R again to stop recording")
        } else {
            Notice::new("Recording stopped", "Voice message ready to send")
        }
    }
}

pub fn random_emoji<R: Rng + ?Sized>(rng: &mut R) -> &'static str {
    EMOJIS.choose(rng).copied().unwrap_or("😀")
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::cell::RefCell;

    #[derive(Default)]
    struct RecordingTracker {
        tracked: RefCell<Vec<MessageId>>,
    }

    impl DeliveryTracker for RecordingTracker {
        fn track(&self, id: &MessageId) {
            self.tracked.borrow_mut().push(id.clone());
        }
    }

    #[test]
    fn test_send_tracks_only_created_messages() {
        let mut session = ChatSession::seeded();
        let tracker = RecordingTracker::default();

        assert!(session.send("   ", &tracker).is_none());
        let id = session.send("hello", &tracker).unwrap();

        assert_eq!(tracker.tracked.borrow().as_slice(), &[id]);
        assert_eq!(session.conversation().len(), 4);
    }

    #[test]
    fn test_selection_wraps_in_visible_order() {
        let mut session = ChatSession::seeded();
        assert_eq!(session.selected_id().as_str(), "1");

        session.select_previous();
        assert_eq!(session.selected_id().as_str(), "4");
        session.select_next();
        assert_eq!(session.selected_id().as_str(), "1");
        session.select_next();
        assert_eq!(session.selected_id().as_str(), "2");
    }

    #[test]
    fn test_call_notices_use_selected_name() {
        let mut session = ChatSession::seeded();
        session.select(&ContactId::new("3"));

        assert_eq!(session.voice_call().description, "Calling Mike Torres...");
        assert_eq!(
            session.video_call().description,
            "Starting video call with Mike Torres..."
        );

        session.select(&ContactId::new("ghost"));
        assert_eq!(session.voice_call().description, format!("Calling {}...", UNKNOWN_CONTACT));
    }

    #[test]
    fn test_recording_toggle() {
        let mut session = ChatSession::seeded();

        assert_eq!(session.toggle_recording().title, "Recording started");
        assert!(session.is_recording());
        assert_eq!(session.toggle_recording().title, "Recording stopped");
        assert!(!session.is_recording());
    }

    #[test]
    fn test_attach_without_file_is_noop() {
        let session = ChatSession::seeded();

        assert!(session.attach(None).is_none());
        assert!(session.attach(Some(Path::new(""))).is_none());
        assert!(session.attach(Some(Path::new("/definitely/not/here.pdf"))).is_none());
    }

    #[test]
    fn test_attach_reports_file_name() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.pdf");
        std::fs::write(&path, b"%PDF").unwrap();

        let notice = ChatSession::seeded().attach(Some(&path)).unwrap();
        assert_eq!(notice.title, "File attached");
        assert_eq!(notice.description, "report.pdf ready to send");
    }

    #[test]
    fn test_random_emoji_comes_from_palette() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..20 {
            assert!(EMOJIS.contains(&random_emoji(&mut rng)));
        }
    }
}
