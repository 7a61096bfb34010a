//! Delimited numeric tables.
//!
//! Every input and output of an experiment is a headerless comma-separated
//! table of numbers. Rows may differ in length (histogram rows do); shape
//! checks belong to the code that consumes a table.

use anyhow::{Context, Result};
use std::fmt::Display;
use std::path::Path;
use std::str::FromStr;

/// Read a table of numbers, one `Vec` per line.
pub fn read_table<T>(path: &Path) -> Result<Vec<Vec<T>>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .with_context(|| format!("Failed to open table: {}", path.display()))?;

    let mut rows = Vec::new();
    for (line, record) in reader.records().enumerate() {
        let record =
            record.with_context(|| format!("Failed to read {} line {}", path.display(), line + 1))?;
        let row = record
            .iter()
            .filter(|field| !field.is_empty())
            .map(|field| {
                field.parse::<T>().with_context(|| {
                    format!("Invalid value `{field}` in {} line {}", path.display(), line + 1)
                })
            })
            .collect::<Result<Vec<T>>>()?;
        rows.push(row);
    }
    Ok(rows)
}

/// Read a list of numbers laid out either as one row or one value per line.
pub fn read_list<T>(path: &Path) -> Result<Vec<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    Ok(read_table(path)?.into_iter().flatten().collect())
}

/// Write rows of numbers using their `Display` form.
pub fn write_table<T: Display>(path: &Path, rows: &[Vec<T>]) -> Result<()> {
    write_rows(path, rows.iter().map(|row| row.iter().map(ToString::to_string).collect()))
}

/// Write rows of floats with six decimals.
pub fn write_float_table(path: &Path, rows: &[Vec<f64>]) -> Result<()> {
    write_rows(
        path,
        rows.iter()
            .map(|row| row.iter().map(|value| format!("{value:.6}")).collect()),
    )
}

/// Write a list of numbers, one value per line.
pub fn write_column<T: Display>(path: &Path, values: &[T]) -> Result<()> {
    write_rows(path, values.iter().map(|value| vec![value.to_string()]))
}

fn write_rows<I>(path: &Path, rows: I) -> Result<()>
where
    I: IntoIterator<Item = Vec<String>>,
{
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    for row in rows {
        writer
            .write_record(&row)
            .with_context(|| format!("Failed to write {}", path.display()))?;
    }
    writer
        .flush()
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn floats_are_written_with_six_decimals() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("left_criticals.csv");
        write_float_table(&path, &[vec![0.5, 1.0], vec![0.25, 2.125]]).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text, "0.500000,1.000000\n0.250000,2.125000\n");
        let back: Vec<Vec<f64>> = read_table(&path).unwrap();
        assert_eq!(back, vec![vec![0.5, 1.0], vec![0.25, 2.125]]);
    }

    #[test]
    fn ragged_rows_are_kept() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("taus.csv");
        write_table(&path, &[vec![0u64, 3, 7], vec![2]]).unwrap();

        let back: Vec<Vec<u64>> = read_table(&path).unwrap();
        assert_eq!(back[0], vec![0, 3, 7]);
        assert_eq!(back[1], vec![2]);
    }

    #[test]
    fn lists_accept_rows_or_columns() {
        let dir = tempfile::tempdir().unwrap();
        let row = dir.path().join("row.csv");
        let column = dir.path().join("column.csv");
        std::fs::write(&row, "3, 1, 2\n").unwrap();
        write_column(&column, &[-1i32, 1, -1]).unwrap();

        assert_eq!(read_list::<usize>(&row).unwrap(), vec![3, 1, 2]);
        assert_eq!(read_list::<i32>(&column).unwrap(), vec![-1, 1, -1]);
    }

    #[test]
    fn bad_values_name_the_line() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.csv");
        std::fs::write(&path, "1,2\n3,x\n").unwrap();
        let err = read_table::<u32>(&path).unwrap_err();
        assert!(format!("{err:#}").contains("line 2"));
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(read_table::<f64>(&dir.path().join("missing.csv")).is_err());
    }
}
