use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum number of entries retained in one repository's conversation log.
pub const MAX_ENTRIES: usize = 10;

/// Whether a conversation entry records a question or an answer.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    /// A question the user submitted.
    Question,

    /// The assembled answer text, possibly empty or partial if the stream
    /// failed before completion.
    Answer,
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntryKind::Question => write!(f, "question"),
            EntryKind::Answer => write!(f, "answer"),
        }
    }
}

/// One committed entry in a repository's conversation log.
///
/// Entries are immutable once created; their order in the log is the order
/// in which they were committed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationEntry {
    /// Question or answer.
    pub kind: EntryKind,
    /// The text of the question or the fully assembled answer.
    pub content: String,
}

impl ConversationEntry {
    /// Create a question entry.
    pub fn question(content: impl Into<String>) -> Self {
        Self {
            kind: EntryKind::Question,
            content: content.into(),
        }
    }

    /// Create an answer entry.
    pub fn answer(content: impl Into<String>) -> Self {
        Self {
            kind: EntryKind::Answer,
            content: content.into(),
        }
    }
}

/// The ordered, bounded conversation log for one repository.
///
/// Entries are oldest-first. The log never exceeds [`MAX_ENTRIES`]; pushing
/// past the cap evicts the oldest entries from the front. Entries alternate
/// question/answer loosely only: the most recent entry may be a question
/// whose stream never produced an answer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationLog {
    /// Committed entries, oldest first.
    pub entries: Vec<ConversationEntry>,
}

impl ConversationLog {
    /// Create an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry, evicting the oldest entries if the cap is exceeded.
    pub fn push(&mut self, entry: ConversationEntry) {
        self.entries.push(entry);
        if self.entries.len() > MAX_ENTRIES {
            let overflow = self.entries.len() - MAX_ENTRIES;
            self.entries.drain(..overflow);
        }
    }

    /// The number of entries in the log.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if the log holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, to_value};

    #[test]
    fn entry_serialization() {
        let entry = ConversationEntry::question("What does X do?");
        let json = to_value(&entry).unwrap();

        assert_eq!(
            json,
            json!({
                "kind": "question",
                "content": "What does X do?"
            })
        );
    }

    #[test]
    fn entry_deserialization() {
        let json = json!({
            "kind": "answer",
            "content": "It computes X."
        });

        let entry: ConversationEntry = serde_json::from_value(json).unwrap();
        assert_eq!(entry.kind, EntryKind::Answer);
        assert_eq!(entry.content, "It computes X.");
    }

    #[test]
    fn push_under_cap_keeps_everything() {
        let mut log = ConversationLog::new();
        for i in 0..MAX_ENTRIES {
            log.push(ConversationEntry::question(format!("q{i}")));
        }
        assert_eq!(log.len(), MAX_ENTRIES);
        assert_eq!(log.entries[0].content, "q0");
    }

    #[test]
    fn push_past_cap_evicts_oldest_first() {
        let mut log = ConversationLog::new();
        for i in 0..15 {
            log.push(ConversationEntry::question(format!("q{i}")));
        }
        assert_eq!(log.len(), MAX_ENTRIES);
        assert_eq!(log.entries[0].content, "q5");
        assert_eq!(log.entries[MAX_ENTRIES - 1].content, "q14");
    }

    #[test]
    fn log_round_trips_through_json() {
        let mut log = ConversationLog::new();
        log.push(ConversationEntry::question("What does X do?"));
        log.push(ConversationEntry::answer("It computes X."));

        let encoded = serde_json::to_string(&log).unwrap();
        let decoded: ConversationLog = serde_json::from_str(&encoded).unwrap();
        assert_eq!(log, decoded);
    }
}
