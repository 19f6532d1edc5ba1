//! CLI subcommands.

pub mod expand;
pub mod format;
pub mod init;
pub mod last;

use std::path::Path;

use promptloom_config::HistoryConfig;
use promptloom_core::{Conversation, ConversationSource, InMemorySource, TranscriptSource};

/// Load the config from the given path, or `./promptloom.toml`.
///
/// A missing file is fine — defaults apply.
pub(crate) fn load_config(path: Option<&Path>) -> Result<HistoryConfig, Box<dyn std::error::Error>> {
    let path = path.unwrap_or(Path::new("promptloom.toml"));
    Ok(HistoryConfig::load_from(path)?)
}

/// Load a transcript file as a conversation source.
///
/// JSON by default; `plain` switches to `Name: text` line parsing using
/// the configured display names.
pub(crate) fn load_source(
    path: &Path,
    plain: bool,
    config: &HistoryConfig,
) -> Result<Box<dyn ConversationSource>, Box<dyn std::error::Error>> {
    let source: Box<dyn ConversationSource> = if plain {
        let text = std::fs::read_to_string(path)?;
        Box::new(TranscriptSource::parse(
            &text,
            &config.formatting.user.display_name,
            &config.formatting.other.display_name,
        ))
    } else {
        let conversation = Conversation::from_json_file(path)?;
        Box::new(InMemorySource::new(conversation))
    };

    tracing::debug!(turns = source.snapshot().len(), "Loaded transcript");
    Ok(source)
}
