use log::{debug, info};

use crate::models::{Contact, ContactId, Notice, UNKNOWN_CONTACT};

/// The ordered contact list shown in the sidebar. Insertion order is preserved;
/// display order is computed on demand by [`Roster::visible`].
#[derive(Debug, Clone, Default)]
pub struct Roster {
    contacts: Vec<Contact>,
}

impl Roster {
    pub fn new(contacts: Vec<Contact>) -> Self {
        Roster { contacts }
    }

    /// The roster the application starts with.
    pub fn seeded() -> Self {
        Roster::new(vec![
            Contact {
                id: ContactId::new("1"),
                name: "Alex Johnson".to_string(),
                avatar: None,
                last_message: "That sounds amazing! What features does it have?".to_string(),
                timestamp: "2:34 PM".to_string(),
                unread_count: 0,
                is_online: true,
                last_seen: None,
                is_typing: true,
                is_pinned: true,
            },
            Contact {
                id: ContactId::new("2"),
                name: "Sarah Chen".to_string(),
                avatar: None,
                last_message: "See you tomorrow! 👋".to_string(),
                timestamp: "1:15 PM".to_string(),
                unread_count: 2,
                is_online: false,
                last_seen: Some("5 minutes ago".to_string()),
                is_typing: false,
                is_pinned: false,
            },
            Contact {
                id: ContactId::new("3"),
                name: "Mike Torres".to_string(),
                avatar: None,
                last_message: "Thanks for the help!".to_string(),
                timestamp: "Yesterday".to_string(),
                unread_count: 0,
                is_online: true,
                last_seen: None,
                is_typing: false,
                is_pinned: false,
            },
            Contact {
                id: ContactId::new("4"),
                name: "Emma Wilson".to_string(),
                avatar: None,
                last_message: "Let me know when you arrive".to_string(),
                timestamp: "Yesterday".to_string(),
                unread_count: 1,
                is_online: false,
                last_seen: Some("2 hours ago".to_string()),
                is_typing: false,
                is_pinned: false,
            },
        ])
    }

    pub fn contacts(&self) -> &[Contact] {
        &self.contacts
    }

    pub fn get(&self, id: &ContactId) -> Option<&Contact> {
        self.contacts.iter().find(|c| &c.id == id)
    }

    /// Contacts whose name contains `query` (case-insensitive), pinned first.
    /// `sort_by_key` is stable, so ties keep roster order.
    pub fn visible(&self, query: &str) -> Vec<&Contact> {
        let needle = query.to_lowercase();
        let mut visible: Vec<&Contact> = self
            .contacts
            .iter()
            .filter(|c| c.name.to_lowercase().contains(&needle))
            .collect();
        visible.sort_by_key(|c| !c.is_pinned);
        visible
    }

    /// Flip the pin flag of `id` and describe the new state. An unknown id leaves
    /// the roster untouched and still yields a notice.
    pub fn toggle_pin(&mut self, id: &ContactId) -> Notice {
        let Some(contact) = self.contacts.iter_mut().find(|c| &c.id == id) else {
            debug!("Pin toggle for unknown contact {}", id);
            return pin_notice(UNKNOWN_CONTACT, true);
        };

        contact.is_pinned = !contact.is_pinned;
        info!("Contact {} pinned: {}", contact.id, contact.is_pinned);
        pin_notice(&contact.name, contact.is_pinned)
    }
}

fn pin_notice(name: &str, pinned: bool) -> Notice {
    if pinned {
        Notice::new("Chat pinned", format!("{} has been pinned to top", name))
    } else {
        Notice::new("Chat unpinned", format!("{} has been unpinned", name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contact(id: &str, name: &str, pinned: bool) -> Contact {
        Contact {
            id: ContactId::new(id),
            name: name.to_string(),
            avatar: None,
            last_message: String::new(),
            timestamp: String::new(),
            unread_count: 0,
            is_online: false,
            last_seen: None,
            is_typing: false,
            is_pinned: pinned,
        }
    }

    fn ids(contacts: &[&Contact]) -> Vec<String> {
        contacts.iter().map(|c| c.id.to_string()).collect()
    }

    #[test]
    fn test_pinned_sort_is_stable() {
        let roster = Roster::new(vec![
            contact("A", "Ann", false),
            contact("B", "Bob", true),
            contact("C", "Cid", false),
            contact("D", "Dee", true),
        ]);

        assert_eq!(ids(&roster.visible("")), vec!["B", "D", "A", "C"]);
    }

    #[test]
    fn test_filter_ignores_case() {
        let roster = Roster::seeded();

        let names: Vec<&str> = roster.visible("sar").iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Sarah Chen"]);

        let names: Vec<&str> = roster.visible("MIKE").iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Mike Torres"]);
    }

    #[test]
    fn test_filter_then_sort() {
        let mut roster = Roster::seeded();
        roster.toggle_pin(&ContactId::new("4"));

        // "o" hits Alex Johnson, Mike Torres and Emma Wilson; Alex and Emma are pinned
        assert_eq!(ids(&roster.visible("o")), vec!["1", "4", "3"]);
    }

    #[test]
    fn test_toggle_pin_notice_wording() {
        let mut roster = Roster::seeded();

        let notice = roster.toggle_pin(&ContactId::new("2"));
        assert_eq!(notice.title, "Chat pinned");
        assert_eq!(notice.description, "Sarah Chen has been pinned to top");

        let notice = roster.toggle_pin(&ContactId::new("2"));
        assert_eq!(notice.title, "Chat unpinned");
        assert_eq!(notice.description, "Sarah Chen has been unpinned");
    }

    #[test]
    fn test_toggle_pin_unknown_id() {
        let mut roster = Roster::seeded();
        let before = roster.contacts().to_vec();

        let notice = roster.toggle_pin(&ContactId::new("missing"));

        assert_eq!(roster.contacts(), before.as_slice());
        assert!(notice.description.contains(UNKNOWN_CONTACT));
    }
}
