// src/run.rs
use anyhow::Result;
use std::{fmt, path::PathBuf, time::Instant};
use tracing::{info, warn};

use crate::{
    config::Config,
    fetch::{FetchOutcome, Fetcher},
    output, process,
};

/// How a run ended, short of a hard error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    Saved { path: PathBuf, records: usize },
    DownloadFailed { status: u16 },
}

/// The single status line printed for the user.
impl fmt::Display for RunOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunOutcome::Saved { path, .. } => write!(
                f,
                "Downloaded latest data, JSON file saved to {}",
                path.display()
            ),
            RunOutcome::DownloadFailed { status } => write!(
                f,
                "Failed to download CSV file. Status code: {}",
                status
            ),
        }
    }
}

/// Fetch the export, strip the configured columns and write the JSON file.
///
/// Nothing on disk is touched unless the download returned 200.
pub fn run<F: Fetcher + ?Sized>(fetcher: &F, config: &Config) -> Result<RunOutcome> {
    let start = Instant::now();

    let body = match fetcher.fetch(&config.url)? {
        FetchOutcome::Success { body } => body,
        FetchOutcome::Failure { status } => {
            warn!(status, url = %config.url, "download failed; leaving output untouched");
            return Ok(RunOutcome::DownloadFailed { status });
        }
    };

    let (dataset, summary) = process::transform(&body, config.delimiter, &config.removal)?;
    if summary.skipped > 0 {
        warn!(skipped = summary.skipped, "malformed rows dropped");
    }

    output::write_json(&dataset, &config.output)?;

    info!(
        records = summary.records,
        removed = ?summary.removed_columns,
        elapsed = ?start.elapsed(),
        "run complete"
    );
    Ok(RunOutcome::Saved {
        path: config.output.clone(),
        records: summary.records,
    })
}
