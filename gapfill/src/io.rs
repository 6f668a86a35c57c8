// gapfill/src/io.rs

//! CSV input/output and output-directory management.
//!
//! The input table keeps its column order end to end: the time and value
//! columns are located by name, every other column passes through
//! untouched and is reassembled into the same position on write.

use anyhow::Context;

use gapfill_core::series::{RawRecord, Sample, Series, TimeFormat};

/// Column layout of one input file.
#[derive(Debug, Clone)]
pub struct TableLayout {
    pub columns: Vec<String>,
    pub time_idx: usize,
    pub value_idx: usize,
}

impl TableLayout {
    /// Locates the time and value columns in a header row.
    pub fn from_headers(
        headers: &csv::StringRecord,
        time_column: &str,
        value_column: &str,
    ) -> anyhow::Result<Self> {
        let columns: Vec<String> = headers.iter().map(|cell| cell.trim().to_string()).collect();

        let time_idx = columns
            .iter()
            .position(|name| name == time_column)
            .with_context(|| format!("missing timestamp column '{}'", time_column))?;
        let value_idx = columns
            .iter()
            .position(|name| name == value_column)
            .with_context(|| format!("missing value column '{}'", value_column))?;
        if time_idx == value_idx {
            anyhow::bail!("timestamp and value column cannot both be '{}'", time_column);
        }

        anyhow::Ok(TableLayout {
            columns,
            time_idx,
            value_idx,
        })
    }

    /// Splits one data row into timestamp, value and passthrough cells.
    /// Short rows are padded with empty cells.
    pub fn split_row(&self, row: &csv::StringRecord) -> RawRecord {
        let cell = |idx: usize| row.get(idx).unwrap_or("").to_string();

        let passthrough = (0..self.columns.len())
            .filter(|&idx| idx != self.time_idx && idx != self.value_idx)
            .map(|idx| cell(idx))
            .collect();

        RawRecord {
            timestamp: cell(self.time_idx),
            value: cell(self.value_idx),
            passthrough,
        }
    }

    /// Reassembles one sample into a row in the original column order.
    pub fn assemble_row(&self, sample: &Sample, format: &TimeFormat) -> Vec<String> {
        let mut passthrough = sample.passthrough.iter();

        (0..self.columns.len())
            .map(|idx| {
                if idx == self.time_idx {
                    format.format(&sample.timestamp)
                } else if idx == self.value_idx {
                    sample.value.to_string()
                } else {
                    passthrough.next().cloned().unwrap_or_default()
                }
            })
            .collect()
    }
}

/// Lists the `.csv` files of the input directory (case-insensitive), sorted
/// by name so the batch order is stable.
pub fn list_input_files(input_dir: &std::path::Path) -> anyhow::Result<Vec<std::path::PathBuf>> {
    let mut files: Vec<std::path::PathBuf> = std::fs::read_dir(input_dir)
        .with_context(|| format!("cannot read input directory {}", input_dir.display()))?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| {
            path.is_file()
                && path
                    .extension()
                    .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"))
        })
        .collect();

    files.sort();
    anyhow::Ok(files)
}

/// Creates the output directory if needed and clears artifacts left over
/// from a previous run (`.csv`, `.png`, `.json`). Anything else is kept.
pub fn prepare_output_dir(output_dir: &std::path::Path) -> anyhow::Result<()> {
    std::fs::create_dir_all(output_dir)
        .with_context(|| format!("cannot create output directory {}", output_dir.display()))?;

    for entry in std::fs::read_dir(output_dir)? {
        let path = entry?.path();
        if !path.is_file() {
            continue;
        }
        let stale = path.extension().is_some_and(|ext| {
            ext.eq_ignore_ascii_case("csv")
                || ext.eq_ignore_ascii_case("png")
                || ext.eq_ignore_ascii_case("json")
        });
        if stale {
            std::fs::remove_file(&path)
                .with_context(|| format!("cannot remove stale artifact {}", path.display()))?;
        }
    }

    anyhow::Ok(())
}

/// Reads one input file into raw records.
///
/// # Returns
/// * `(TableLayout, Vec<RawRecord>)` - Column layout plus one record per
///   readable data row. Malformed rows are skipped with a warning.
pub fn read_records(
    path: &std::path::Path,
    time_column: &str,
    value_column: &str,
) -> anyhow::Result<(TableLayout, Vec<RawRecord>)> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("cannot open {}", path.display()))?;

    let layout = TableLayout::from_headers(reader.headers()?, time_column, value_column)?;

    let mut records = Vec::new();
    for row in reader.records() {
        match row {
            Ok(row) => records.push(layout.split_row(&row)),
            Err(error) => {
                log::warn!("{}: skipping unreadable row: {}", path.display(), error);
            }
        }
    }

    anyhow::Ok((layout, records))
}

/// Writes a series back out with the original columns, header included.
pub fn write_series(
    path: &std::path::Path,
    layout: &TableLayout,
    series: &Series,
    format: &TimeFormat,
) -> anyhow::Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("cannot create {}", path.display()))?;

    writer.write_record(&layout.columns)?;
    for sample in series.samples() {
        writer.write_record(layout.assemble_row(sample, format))?;
    }
    writer.flush()?;

    anyhow::Ok(())
}
