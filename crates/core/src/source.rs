//! Conversation sources — read-only adapters over the live turn list.
//!
//! The engine never owns the conversation. Each pipeline invocation takes
//! a fresh snapshot through [`ConversationSource`]; the host is free to
//! mutate the underlying store between invocations and the next snapshot
//! picks the changes up. Staleness is never assumed to be safe.

use std::sync::RwLock;

use tracing::trace;

use crate::turn::{Conversation, Speaker, Turn};

/// Read-only view of an ordered turn sequence.
pub trait ConversationSource {
    /// A shallow copy of the current turn list, oldest first.
    fn snapshot(&self) -> Vec<Turn>;
}

impl<T: ConversationSource + ?Sized> ConversationSource for &T {
    fn snapshot(&self) -> Vec<Turn> {
        (**self).snapshot()
    }
}

impl<T: ConversationSource + ?Sized> ConversationSource for std::sync::Arc<T> {
    fn snapshot(&self) -> Vec<Turn> {
        (**self).snapshot()
    }
}

impl<T: ConversationSource + ?Sized> ConversationSource for Box<T> {
    fn snapshot(&self) -> Vec<Turn> {
        (**self).snapshot()
    }
}

/// Source backed by an in-memory [`Conversation`] behind a lock.
///
/// The lock models the store's externally-mutable nature: a settings
/// surface or chat loop pushes turns while the pipeline reads snapshots.
pub struct InMemorySource {
    inner: RwLock<Conversation>,
}

impl InMemorySource {
    pub fn new(conversation: Conversation) -> Self {
        Self {
            inner: RwLock::new(conversation),
        }
    }

    /// Append a turn to the underlying conversation.
    pub fn push(&self, turn: Turn) {
        self.inner.write().unwrap().push(turn);
    }
}

impl ConversationSource for InMemorySource {
    fn snapshot(&self) -> Vec<Turn> {
        self.inner.read().unwrap().turns.clone()
    }
}

impl From<Conversation> for InMemorySource {
    fn from(conversation: Conversation) -> Self {
        Self::new(conversation)
    }
}

/// Source that reconstructs turns from a plain-text transcript.
///
/// An alternate substrate behind the same read-only interface: instead of
/// a structured store, turns are parsed out of `Name: text` lines. Lines
/// that open with the user or other display name start a new turn;
/// anything else continues the previous turn. Leading unattributed lines
/// are dropped.
pub struct TranscriptSource {
    turns: Vec<Turn>,
}

impl TranscriptSource {
    /// Parse a transcript, attributing lines by the two display names.
    pub fn parse(text: &str, user_name: &str, other_name: &str) -> Self {
        let user_prefix = format!("{user_name}:");
        let other_prefix = format!("{other_name}:");
        let mut turns: Vec<Turn> = Vec::new();

        for line in text.lines() {
            let speaker_and_rest = line
                .strip_prefix(&user_prefix)
                .map(|rest| (Speaker::User, rest))
                .or_else(|| {
                    line.strip_prefix(&other_prefix)
                        .map(|rest| (Speaker::Other, rest))
                });

            match speaker_and_rest {
                Some((Speaker::User, rest)) => turns.push(Turn::user(rest.trim_start())),
                Some((Speaker::Other, rest)) => turns.push(Turn::other(rest.trim_start())),
                None => match turns.last_mut() {
                    Some(last) => {
                        last.text.push('\n');
                        last.text.push_str(line);
                    }
                    None => trace!(line, "Dropping unattributed leading transcript line"),
                },
            }
        }

        Self { turns }
    }
}

impl ConversationSource for TranscriptSource {
    fn snapshot(&self) -> Vec<Turn> {
        self.turns.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn in_memory_snapshot_reflects_pushes() {
        let source = InMemorySource::new(Conversation::new());
        assert!(source.snapshot().is_empty());

        source.push(Turn::user("hi"));
        source.push(Turn::other("hello"));

        let snap = source.snapshot();
        assert_eq!(snap.len(), 2);
        assert_eq!(snap[0].speaker, Speaker::User);
        assert_eq!(snap[1].speaker, Speaker::Other);
    }

    #[test]
    fn snapshot_is_a_copy() {
        let source = InMemorySource::new(Conversation::new());
        source.push(Turn::user("original"));

        let mut snap = source.snapshot();
        snap[0].text = "mutated".into();

        // The store is untouched by snapshot mutation.
        assert_eq!(source.snapshot()[0].text, "original");
    }

    #[test]
    fn transcript_parses_simple_exchange() {
        let text = "Alice: hello\nBot: hi Alice\nAlice: how are you?";
        let source = TranscriptSource::parse(text, "Alice", "Bot");
        let turns = source.snapshot();

        assert_eq!(turns.len(), 3);
        assert_eq!(turns[0].speaker, Speaker::User);
        assert_eq!(turns[0].text, "hello");
        assert_eq!(turns[1].speaker, Speaker::Other);
        assert_eq!(turns[1].text, "hi Alice");
    }

    #[test]
    fn transcript_continuation_lines_attach() {
        let text = "Alice: first line\nsecond line\nBot: reply";
        let turns = TranscriptSource::parse(text, "Alice", "Bot").snapshot();

        assert_eq!(turns.len(), 2);
        assert_eq!(turns[0].text, "first line\nsecond line");
    }

    #[test]
    fn transcript_drops_unattributed_leading_lines() {
        let text = "scene setting\nAlice: hello";
        let turns = TranscriptSource::parse(text, "Alice", "Bot").snapshot();

        assert_eq!(turns.len(), 1);
        assert_eq!(turns[0].text, "hello");
    }

    #[test]
    fn empty_transcript_is_empty() {
        let turns = TranscriptSource::parse("", "Alice", "Bot").snapshot();
        assert!(turns.is_empty());
    }
}
