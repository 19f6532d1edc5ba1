//! `promptloom init` — write a starter config file.

use std::path::Path;

use promptloom_config::HistoryConfig;

pub fn run(path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    if path.exists() {
        println!("⚠️  {} already exists, leaving it alone.", path.display());
        return Ok(());
    }

    std::fs::write(path, HistoryConfig::default_toml())?;
    println!("✅ Wrote starter config to {}", path.display());
    println!("   Edit [selection] and [formatting] to taste.");

    Ok(())
}
