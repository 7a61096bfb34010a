//! Shuffle critical windows between detectors.

use anyhow::Result;
use cellfrust::prelude::*;
use colored::Colorize;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use super::files;
use crate::config::Config;
use crate::io;

pub fn run(config: &Config) -> Result<()> {
    let left_path = config.paths.input(files::LEFT_CRITICALS);
    let right_path = config.paths.input(files::RIGHT_CRITICALS);
    let mut left: Vec<Vec<f64>> = io::read_table(&left_path)?;
    let mut right: Vec<Vec<f64>> = io::read_table(&right_path)?;

    let mut rng = ChaCha8Rng::seed_from_u64(config.experiment.seed);
    shuffle_critical_windows(&mut left, &mut right, &mut rng)?;

    io::write_float_table(&left_path, &left)?;
    io::write_float_table(&right_path, &right)?;
    println!(
        "{} Shuffled critical windows of {} detectors",
        "✓".green(),
        left.len().to_string().cyan()
    );
    Ok(())
}
