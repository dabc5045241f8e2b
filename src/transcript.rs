//! Append-only record of one run: raw JSON blocks, role-tagged messages and
//! inline notices, in the order they happened.

use std::fmt;

use serde_json::Value;

use crate::notice::ErrorNotice;
use crate::Role;

#[derive(Debug, Clone, PartialEq)]
pub enum TranscriptEntry {
    Block { title: String, payload: Value },
    Message { role: Role, label: String, payload: Value },
    Info(String),
    Error(ErrorNotice),
}

/// Front-end hook. Called synchronously as entries land, so the newest one
/// can be brought into view immediately.
pub trait TranscriptListener: Send {
    fn on_append(&mut self, entry: &TranscriptEntry);

    fn on_clear(&mut self) {}

    fn on_pending(&mut self, _pending: bool) {}
}

#[derive(Default)]
pub struct Transcript {
    entries: Vec<TranscriptEntry>,
    listeners: Vec<Box<dyn TranscriptListener>>,
}

impl fmt::Debug for Transcript {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transcript")
            .field("entries", &self.entries)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_listener(&mut self, listener: impl TranscriptListener + 'static) {
        self.listeners.push(Box::new(listener));
    }

    pub fn push_block(&mut self, title: impl Into<String>, payload: Value) {
        self.push(TranscriptEntry::Block {
            title: title.into(),
            payload,
        });
    }

    pub fn push_message(&mut self, role: Role, label: impl Into<String>, payload: Value) {
        self.push(TranscriptEntry::Message {
            role,
            label: label.into(),
            payload,
        });
    }

    pub fn push_info(&mut self, text: impl Into<String>) {
        self.push(TranscriptEntry::Info(text.into()));
    }

    pub fn push_error(&mut self, notice: ErrorNotice) {
        self.push(TranscriptEntry::Error(notice));
    }

    fn push(&mut self, entry: TranscriptEntry) {
        for listener in &mut self.listeners {
            listener.on_append(&entry);
        }
        self.entries.push(entry);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        for listener in &mut self.listeners {
            listener.on_clear();
        }
    }

    pub fn announce_pending(&mut self, pending: bool) {
        for listener in &mut self.listeners {
            listener.on_pending(pending);
        }
    }

    pub fn entries(&self) -> &[TranscriptEntry] {
        &self.entries
    }

    pub fn latest(&self) -> Option<&TranscriptEntry> {
        self.entries.last()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn infos(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().filter_map(|e| match e {
            TranscriptEntry::Info(text) => Some(text.as_str()),
            _ => None,
        })
    }

    pub fn errors(&self) -> impl Iterator<Item = &ErrorNotice> {
        self.entries.iter().filter_map(|e| match e {
            TranscriptEntry::Error(notice) => Some(notice),
            _ => None,
        })
    }

    pub fn messages(&self) -> impl Iterator<Item = (Role, &str, &Value)> {
        self.entries.iter().filter_map(|e| match e {
            TranscriptEntry::Message { role, label, payload } => Some((*role, label.as_str(), payload)),
            _ => None,
        })
    }
}
