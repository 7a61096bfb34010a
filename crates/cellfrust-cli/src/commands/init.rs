//! Initialize a new experiment directory.

use anyhow::{Context, Result};
use colored::Colorize;
use std::path::PathBuf;

use crate::config::{Config, CONFIG_FILE};

pub fn run(path: Option<PathBuf>) -> Result<()> {
    let base_path = match path {
        Some(path) => path,
        None => std::env::current_dir().context("Failed to read current directory")?,
    };

    println!("{} Initializing cellfrust experiment...", "→".blue());

    let config = Config::default();
    for dir in [&config.paths.input_dir, &config.paths.output_dir] {
        let dir = base_path.join(dir);
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create {}", dir.display()))?;
        println!("  {} Created {}", "✓".green(), dir.display());
    }

    let config_path = base_path.join(CONFIG_FILE);
    if !config_path.exists() {
        config.save(&config_path)?;
        println!("  {} Created {}", "✓".green(), config_path.display());
    } else {
        println!("  {} {} already exists", "•".yellow(), config_path.display());
    }

    println!();
    println!("{} Experiment initialized!", "✓".green().bold());
    println!();
    println!("Next steps:");
    println!(
        "  {} put training_set.csv, labels.csv and test_set.csv in {}",
        "1.".blue(),
        config.paths.input_dir.display()
    );
    println!("  {} cellfrust gen-lists && cellfrust gen-criticals", "2.".blue());
    println!("  {} cellfrust run", "3.".blue());

    Ok(())
}
