//! Pipeline composition — selector → rewrite → formatter, plus the raw
//! last-turn queries that macros rely on.
//!
//! The pipeline owns nothing but its two injected collaborators. Every
//! method takes a fresh conversation snapshot and a fresh configuration
//! value, so host-side edits are visible on the very next call. Malformed
//! configuration degrades to skipped rules or empty output; no method
//! here can fail.

use promptloom_config::ConfigProvider;
use promptloom_core::{ConversationSource, Speaker, Turn};

use crate::format::{OutputStyle, format_history, format_turn};
use crate::select::select_turns;

/// The history formatting pipeline.
pub struct HistoryPipeline<S, C> {
    source: S,
    config: C,
}

impl<S, C> HistoryPipeline<S, C>
where
    S: ConversationSource,
    C: ConfigProvider,
{
    pub fn new(source: S, config: C) -> Self {
        Self { source, config }
    }

    /// Select, rewrite and render the conversation as one text block.
    pub fn build_formatted_history(&self, style: OutputStyle) -> String {
        let turns = self.source.snapshot();
        let config = self.config.history_config();
        let selected = select_turns(&turns, &config.selection);
        format_history(&selected, &config.formatting, style)
    }

    /// Render the last `n` raw turns, bypassing skip/drop/windowing.
    ///
    /// Backs the parameterized "last N turns" macro.
    pub fn build_last_turns(&self, n: usize, style: OutputStyle) -> String {
        let turns = self.source.snapshot();
        let config = self.config.history_config();
        let start = turns.len().saturating_sub(n);
        format_history(&turns[start..], &config.formatting, style)
    }

    /// The newest turn of the given speaker in the raw conversation.
    ///
    /// Independent of the selector: skip/drop/windowing never hide a turn
    /// from this query. "Last message" macros must see the absolute
    /// latest turn of the role.
    pub fn last_matching_turn(&self, speaker: Speaker) -> Option<Turn> {
        self.source
            .snapshot()
            .into_iter()
            .rev()
            .find(|t| t.speaker == speaker)
    }

    /// The newest turn of either speaker.
    pub fn last_turn(&self) -> Option<Turn> {
        self.source.snapshot().pop()
    }

    /// Single-block rendering of [`last_matching_turn`]; empty string
    /// when the conversation has no such turn.
    ///
    /// [`last_matching_turn`]: Self::last_matching_turn
    pub fn last_matching_turn_formatted(&self, speaker: Speaker, style: OutputStyle) -> String {
        let config = self.config.history_config();
        self.last_matching_turn(speaker)
            .map(|t| format_turn(&t, &config.formatting, style))
            .unwrap_or_default()
    }

    /// Single-block rendering of the newest turn of either speaker.
    pub fn last_turn_formatted(&self, style: OutputStyle) -> String {
        let config = self.config.history_config();
        self.last_turn()
            .map(|t| format_turn(&t, &config.formatting, style))
            .unwrap_or_default()
    }
}
