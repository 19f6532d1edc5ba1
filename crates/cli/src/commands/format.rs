//! `promptloom format` — render a transcript as formatted history.
//!
//! Prints the finished block to stdout, which is the "copy formatted
//! history" surface: pipe it wherever it needs to go.

use std::path::Path;

use promptloom_config::StaticProvider;
use promptloom_engine::{HistoryPipeline, OutputStyle};

pub fn run(
    transcript: &Path,
    style: &str,
    last: Option<usize>,
    plain: bool,
    config_path: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let style: OutputStyle = style.parse()?;
    let config = super::load_config(config_path)?;
    let source = super::load_source(transcript, plain, &config)?;

    let pipeline = HistoryPipeline::new(source, StaticProvider::new(config));
    let text = match last {
        Some(n) => pipeline.build_last_turns(n, style),
        None => pipeline.build_formatted_history(style),
    };

    println!("{text}");
    Ok(())
}
