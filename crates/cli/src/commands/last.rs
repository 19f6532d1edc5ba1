//! `promptloom last` — show the newest turn for a speaker.

use std::path::Path;

use promptloom_config::StaticProvider;
use promptloom_core::Speaker;
use promptloom_engine::{HistoryPipeline, OutputStyle};

pub fn run(
    speaker: &str,
    transcript: &Path,
    formatted: bool,
    plain: bool,
    config_path: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let speaker: Speaker = speaker.parse()?;
    let config = super::load_config(config_path)?;
    let source = super::load_source(transcript, plain, &config)?;

    let pipeline = HistoryPipeline::new(source, StaticProvider::new(config));

    if formatted {
        println!(
            "{}",
            pipeline.last_matching_turn_formatted(speaker, OutputStyle::default())
        );
    } else {
        match pipeline.last_matching_turn(speaker) {
            Some(turn) => println!("{}", turn.text),
            None => println!(),
        }
    }

    Ok(())
}
