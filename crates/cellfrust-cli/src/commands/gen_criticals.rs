//! Generate critical windows and the sample queue.

use anyhow::Result;
use cellfrust::prelude::*;
use colored::Colorize;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use super::files;
use crate::config::Config;
use crate::io;

pub fn run(config: &Config) -> Result<()> {
    let params = &config.experiment;
    let training_set: Vec<Vec<f64>> = io::read_table(&config.paths.input(files::TRAINING_SET))?;
    let labels: Vec<i64> = io::read_list(&config.paths.input(files::TRAINING_LABELS))?;

    let mut rng = ChaCha8Rng::seed_from_u64(params.seed);
    let windows = critical_windows(
        &training_set,
        &labels,
        params.presenter_sets,
        params.max_nu,
        &mut rng,
    )?;

    io::write_float_table(&config.paths.input(files::LEFT_CRITICALS), &windows.left)?;
    io::write_float_table(&config.paths.input(files::RIGHT_CRITICALS), &windows.right)?;
    io::write_table(
        &config.paths.input(files::SAMPLES_QUEUE),
        std::slice::from_ref(&windows.samples_queue),
    )?;

    println!(
        "{} Wrote critical windows for {} detectors and a queue of {} samples to {}",
        "✓".green(),
        windows.left.len().to_string().cyan(),
        windows.samples_queue.len().to_string().cyan(),
        config.paths.input_dir.display()
    );
    Ok(())
}
