//! Run a full experiment.
//!
//! With `train` set: an untrained run, the training run (whose preference
//! lists are exported), and a trained run, each from a clean store. With
//! `monitor` set: calibration over every training sample, then monitoring
//! and scoring of every test sample, and ROC/AUC when class labels exist.

use anyhow::{bail, Context, Result};
use cellfrust::prelude::*;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use super::files;
use crate::config::Config;
use crate::io;

pub fn run(mut config: Config, seed: Option<u64>, verbose: bool) -> Result<()> {
    if let Some(seed) = seed {
        config.experiment.seed = seed;
    }
    let params = config.experiment.clone();
    let paths = &config.paths;

    println!("{} Loading inputs from {}...", "→".blue(), paths.input_dir.display());
    let training_set: Vec<Vec<f64>> = io::read_table(&paths.input(files::TRAINING_SET))?;
    let features = match training_set.first() {
        Some(sample) if !sample.is_empty() => sample.len(),
        _ => bail!("{} has no samples", paths.input(files::TRAINING_SET).display()),
    };
    let layout = Layout::new(features, params.presenter_sets)?;

    let lists: Vec<Vec<Rank>> = io::read_table(&paths.input(files::UNTRAINED_LISTS))?;
    let left = io::read_table(&paths.input(files::LEFT_CRITICALS))?;
    let right = io::read_table(&paths.input(files::RIGHT_CRITICALS))?;
    let agents = AgentStore::new(layout, lists, left, right)
        .context("Input tables do not fit the agent layout")?;
    let mut colony = Colony::new(agents, &params)?;

    println!(
        "  {} presenters, {} detectors, {} training samples",
        layout.n_presenters().to_string().cyan(),
        layout.n_detectors().to_string().cyan(),
        training_set.len().to_string().cyan()
    );

    let mut reports = Vec::new();

    if params.train {
        let queue: Vec<usize> = io::read_list(&paths.input(files::SAMPLES_QUEUE))?;

        let report = phase(&mut colony, "untrained", |c| {
            c.run_frustration("untrained", &training_set, &queue)
        })?;
        reports.push(report);
        export_lifetimes(&colony, &paths.output(files::UNTRAINED_TAUS))?;

        let report = phase(&mut colony, "training", |c| c.run_training(&training_set, &queue))?;
        reports.push(report);
        io::write_table(
            &paths.output(files::TRAINED_LISTS),
            &colony.agents().detector_preference_rows(),
        )?;

        let report = phase(&mut colony, "trained", |c| {
            c.run_frustration("trained", &training_set, &queue)
        })?;
        reports.push(report);
        export_lifetimes(&colony, &paths.output(files::TRAINED_TAUS))?;
    } else {
        let trained = paths.output(files::TRAINED_LISTS);
        if trained.exists() {
            let rows: Vec<Vec<Rank>> = io::read_table(&trained)?;
            colony
                .agents_mut()
                .set_detector_preferences(rows)
                .with_context(|| format!("Invalid preference lists in {}", trained.display()))?;
            println!("  {} Loaded trained lists from {}", "•".yellow(), trained.display());
        }
    }

    if params.monitor {
        let calibration_histograms = monitor_samples(&mut colony, &training_set, "calibrating", verbose)?;
        let calibration = Calibration::fit(&calibration_histograms, params.calibration_percentile)?;
        write_json(&paths.output(files::CALIBRATION), &calibration)?;
        println!(
            "  Activation tau: {}",
            calibration.activation_tau.to_string().cyan()
        );

        let test_set: Vec<Vec<f64>> = io::read_table(&paths.input(files::TEST_SET))?;
        let test_histograms = monitor_samples(&mut colony, &test_set, "monitoring", verbose)?;
        let responses = test_histograms
            .iter()
            .map(|histograms| calibration.collective_response(histograms))
            .collect::<std::result::Result<Vec<u64>, _>>()?;
        io::write_column(&paths.output(files::RESPONSES), &responses)?;

        let classes_path = paths.input(files::TEST_CLASSES);
        if classes_path.exists() {
            let classes: Vec<i32> = io::read_list(&classes_path)?;
            let curve = roc_curve(&responses, &classes)?;
            super::roc::write_curve(&paths.output_dir, &curve)?;
            println!(
                "  AUC: {}",
                format!("{:.2}%", curve.auc_percent()).green().bold()
            );
        }
    }

    write_json(&paths.output(files::PHASES), &reports)?;

    println!();
    println!("{} Experiment complete!", "✓".green().bold());
    println!("  Outputs in {}", paths.output_dir.display());
    Ok(())
}

/// Run one phase from a clean store and print its summary.
fn phase<F>(colony: &mut Colony, name: &str, body: F) -> Result<PhaseReport>
where
    F: FnOnce(&mut Colony) -> cellfrust::core::error::Result<PhaseReport>,
{
    println!("{} Running {} phase...", "→".blue(), name.cyan());
    colony.agents_mut().reset_phase_state();
    let report = body(colony).with_context(|| format!("{name} phase failed"))?;

    let stats = lifetime_stats(colony.agents().detector_lifetimes());
    println!(
        "  {} rounds, {} pairings, {} dissociations, {} demotions",
        report.rounds.to_string().cyan(),
        report.pairings().to_string().cyan(),
        report.dissociations.to_string().cyan(),
        report.demotions.to_string().cyan()
    );
    println!(
        "  Detector episodes: {} (mean {:.2}, max {})",
        stats.episodes.to_string().cyan(),
        stats.mean_duration,
        stats.max_duration
    );
    info!(phase = name, threshold = ?report.education_threshold, "phase exported");
    Ok(report)
}

/// Monitor every sample from a clean store, returning detector histograms.
fn monitor_samples(
    colony: &mut Colony,
    samples: &[Vec<f64>],
    label: &str,
    verbose: bool,
) -> Result<Vec<Vec<LifetimeHistogram>>> {
    println!(
        "{} {} {} samples...",
        "→".blue(),
        label,
        samples.len().to_string().cyan()
    );

    let pb = ProgressBar::new(samples.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} samples")
            .context("Invalid progress template")?
            .progress_chars("#>-"),
    );

    let mut histograms = Vec::with_capacity(samples.len());
    for (index, sample) in samples.iter().enumerate() {
        colony.agents_mut().reset_phase_state();
        let report = colony
            .run_monitoring(sample)
            .with_context(|| format!("Failed to monitor sample {index}"))?;
        if verbose {
            pb.println(format!(
                "  sample {index}: {} pairings, {} paired at end",
                report.pairings(),
                report.paired_at_end
            ));
        }
        histograms.push(colony.detector_lifetimes());
        pb.inc(1);
    }
    pb.finish_and_clear();
    Ok(histograms)
}

/// Two rows per agent: sorted durations, then counts.
fn export_lifetimes(colony: &Colony, path: &std::path::Path) -> Result<()> {
    let rows: Vec<Vec<u64>> = lifetime_rows(colony.agents())
        .into_iter()
        .flat_map(|rows| [rows.durations, rows.counts])
        .collect();
    io::write_table(path, &rows)
}

fn write_json<T: serde::Serialize>(path: &std::path::Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    let json = serde_json::to_string_pretty(value).context("Failed to serialize")?;
    std::fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))
}
