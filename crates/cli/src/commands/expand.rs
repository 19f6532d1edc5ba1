//! `promptloom expand` — run macro expansion over a template.
//!
//! This is the pre-send hook exercised from the shell: the template is an
//! outgoing prompt payload and every `{{history}}`-style placeholder is
//! replaced before printing.

use std::path::Path;
use std::sync::Arc;

use promptloom_config::StaticProvider;
use promptloom_engine::HistoryPipeline;
use promptloom_macros::builtin_registry;

pub fn run(
    template: &Path,
    transcript: &Path,
    plain: bool,
    config_path: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = super::load_config(config_path)?;
    let source = super::load_source(transcript, plain, &config)?;
    let template_text = std::fs::read_to_string(template)?;

    let pipeline = Arc::new(HistoryPipeline::new(source, StaticProvider::new(config)));
    let registry = builtin_registry(pipeline);

    println!("{}", registry.expand(&template_text));
    Ok(())
}
