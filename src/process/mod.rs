// src/process/mod.rs
use anyhow::{Context, Result};
use csv::ReaderBuilder;
use serde_json::{Map, Value};
use std::collections::HashSet;
use tracing::{debug, info, instrument, warn};

/// One data row, keyed by header name. Key order follows the header.
pub type Record = Map<String, Value>;

/// All records of one export, in input order.
pub type Dataset = Vec<Record>;

/// Bookkeeping from one [`transform`] call; never affects the output.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TransformSummary {
    /// Records emitted.
    pub records: usize,
    /// Data rows dropped because their field count differed from the header.
    pub skipped: usize,
    /// Removal-set columns that actually appeared in the header.
    pub removed_columns: Vec<String>,
}

/// Parse `body` as delimited text with a header row and drop every column
/// named in `removal` from each record.
///
/// - the first line names the columns; blank lines are ignored
/// - `"`-quoted fields may contain the delimiter or newlines
/// - all values stay strings, nothing is coerced
/// - a data row with a different field count than the header is skipped
///   (logged and counted in [`TransformSummary::skipped`])
///
/// An empty body yields an empty dataset.
#[instrument(level = "info", skip(body, removal), fields(bytes = body.len()))]
pub fn transform<S: AsRef<str>>(
    body: &str,
    delimiter: u8,
    removal: &[S],
) -> Result<(Dataset, TransformSummary)> {
    let mut rdr = ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .flexible(true) // row width is checked against the header below
        .from_reader(body.as_bytes());

    let headers = rdr.headers().context("reading CSV header row")?.clone();

    let removal: HashSet<&str> = removal.iter().map(|s| s.as_ref()).collect();
    let keep: Vec<bool> = headers.iter().map(|h| !removal.contains(h)).collect();

    let mut summary = TransformSummary {
        removed_columns: headers
            .iter()
            .filter(|h| removal.contains(h))
            .map(str::to_string)
            .collect(),
        ..Default::default()
    };
    debug!(
        columns = headers.len(),
        removed = ?summary.removed_columns,
        "parsed header"
    );

    let mut dataset = Dataset::new();
    for result in rdr.records() {
        let row = result?;

        if row.len() != headers.len() {
            let line = row.position().map(|p| p.line()).unwrap_or_default();
            warn!(
                line,
                expected = headers.len(),
                found = row.len(),
                "skipping row with wrong field count"
            );
            summary.skipped += 1;
            continue;
        }

        let mut record = Record::new();
        for ((name, value), keep) in headers.iter().zip(row.iter()).zip(&keep) {
            if *keep {
                record.insert(name.to_string(), Value::String(value.to_string()));
            }
        }
        dataset.push(record);
    }

    summary.records = dataset.len();
    info!(
        records = summary.records,
        skipped = summary.skipped,
        "transformed"
    );
    Ok((dataset, summary))
}
