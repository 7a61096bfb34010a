//! Generate random detector preference lists.

use anyhow::{Context, Result};
use cellfrust::prelude::*;
use colored::Colorize;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use super::files;
use crate::config::Config;
use crate::io;

pub fn run(config: &Config) -> Result<()> {
    let params = &config.experiment;
    let training_path = config.paths.input(files::TRAINING_SET);
    let training_set: Vec<Vec<f64>> = io::read_table(&training_path)?;
    let features = training_set
        .first()
        .map(Vec::len)
        .with_context(|| format!("{} is empty", training_path.display()))?;
    let layout = Layout::new(features, params.presenter_sets)?;

    let mut rng = ChaCha8Rng::seed_from_u64(params.seed);
    let lists = random_preference_lists(layout.n_detectors(), layout.n_presenters(), &mut rng);

    let out = config.paths.input(files::UNTRAINED_LISTS);
    io::write_table(&out, &lists)?;
    println!(
        "{} Wrote {} preference lists of length {} to {}",
        "✓".green(),
        lists.len().to_string().cyan(),
        layout.detector_list_len().to_string().cyan(),
        out.display()
    );
    Ok(())
}
