//! Append-only event log.
//!
//! The single observable record of everything the session produces. Entries
//! are never mutated once appended; the only removal is [`EventLog::clear`].

use chrono::Utc;
use reverb_tester_shared::{EventLogEntry, NewLogEntry};

#[derive(Debug, Clone, Default)]
pub struct EventLog {
    entries: Vec<EventLogEntry>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stamp `entry` with an id and the current time and append it.
    pub fn append(&mut self, entry: NewLogEntry) -> &EventLogEntry {
        let entry = EventLogEntry {
            id: uuid::Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            kind: entry.kind,
            channel: entry.channel,
            event: entry.event,
            payload: entry.payload,
            message: entry.message,
        };
        crate::logging::mirror_entry(&entry);
        self.entries.push(entry);
        &self.entries[self.entries.len() - 1]
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn entries(&self) -> &[EventLogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn last(&self) -> Option<&EventLogEntry> {
        self.entries.last()
    }

    /// Entries tagged with `channel`, in log order.
    pub fn for_channel<'a>(&'a self, channel: &'a str) -> impl Iterator<Item = &'a EventLogEntry> + 'a {
        self.entries
            .iter()
            .filter(move |e| e.channel.as_deref() == Some(channel))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reverb_tester_shared::LogKind;

    #[test]
    fn appends_in_order_with_fresh_ids() {
        let mut log = EventLog::new();
        let first = log.append(NewLogEntry::system("one")).id.clone();
        let second = log.append(NewLogEntry::error("two").channel("orders")).id.clone();

        assert_ne!(first, second);
        assert_eq!(log.len(), 2);
        assert_eq!(log.entries()[0].message.as_deref(), Some("one"));
        assert_eq!(log.entries()[1].kind, LogKind::Error);
        assert!(log.entries()[0].timestamp <= log.entries()[1].timestamp);
    }

    #[test]
    fn filters_by_channel() {
        let mut log = EventLog::new();
        log.append(NewLogEntry::system("global"));
        log.append(NewLogEntry::new(LogKind::Event).channel("chat.1").event("MessageSent"));
        log.append(NewLogEntry::new(LogKind::Event).channel("chat.2").event("MessageSent"));

        let chat1: Vec<_> = log.for_channel("chat.1").collect();
        assert_eq!(chat1.len(), 1);
        assert_eq!(chat1[0].event.as_deref(), Some("MessageSent"));
    }

    #[test]
    fn clear_empties_the_log() {
        let mut log = EventLog::new();
        log.append(NewLogEntry::system("x"));
        log.clear();
        assert!(log.is_empty());
        assert!(log.last().is_none());
    }
}
