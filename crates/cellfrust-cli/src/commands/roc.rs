//! Compute the ROC curve and AUC of exported responses.

use anyhow::Result;
use cellfrust::prelude::*;
use colored::Colorize;
use std::path::Path;

use super::files;
use crate::config::Config;
use crate::io;

pub fn run(config: &Config) -> Result<()> {
    let responses: Vec<u64> = io::read_list(&config.paths.output(files::RESPONSES))?;
    let classes: Vec<i32> = io::read_list(&config.paths.input(files::TEST_CLASSES))?;
    let curve = roc_curve(&responses, &classes)?;
    write_curve(&config.paths.output_dir, &curve)?;
    println!(
        "{} AUC: {}",
        "✓".green().bold(),
        format!("{:.2}%", curve.auc_percent()).cyan()
    );
    Ok(())
}

/// Write `roc_curve.csv` (FPR %, TPR %) and `auc.csv` (AUC %).
pub fn write_curve(output_dir: &Path, curve: &RocCurve) -> Result<()> {
    let rows: Vec<Vec<String>> = curve
        .percent_rows()
        .map(|(fpr, tpr)| vec![fpr.to_string(), format!("{tpr:.2}")])
        .collect();
    io::write_table(&output_dir.join(files::ROC_CURVE), &rows)?;
    io::write_column(
        &output_dir.join(files::AUC),
        &[format!("{:.2}", curve.auc_percent())],
    )?;
    Ok(())
}
