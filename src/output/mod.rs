// src/output/mod.rs
use anyhow::{anyhow, Context, Result};
use std::{
    fs,
    io::{BufWriter, ErrorKind, Write},
    path::{Path, PathBuf},
};
use tracing::{debug, info, instrument, warn};

use crate::process::Record;

/// Write `dataset` to `path` as a pretty-printed JSON array (2-space indent,
/// UTF-8, no ASCII escaping), replacing whatever was there.
///
/// If `path` is a symlink the file it points to is replaced, not the link.
/// The JSON goes to a hidden temp file beside that file first and is renamed
/// over it, so readers never see a half-written file. The parent directory
/// must already exist.
#[instrument(
    level = "info",
    skip(dataset, path),
    fields(path = %path.as_ref().display(), records = dataset.len())
)]
pub fn write_json<P: AsRef<Path>>(dataset: &[Record], path: P) -> Result<()> {
    let target = resolve_target(path.as_ref())?;
    let path = target.as_path();
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| anyhow!("output path {:?} has no file name", path))?;
    let tmp_path: PathBuf = path.with_file_name(format!(".{}.tmp", file_name));

    if let Err(e) = write_pretty(dataset, &tmp_path) {
        if let Err(cleanup) = fs::remove_file(&tmp_path) {
            if cleanup.kind() != ErrorKind::NotFound {
                warn!(tmp = %tmp_path.display(), error = %cleanup, "could not remove temp file");
            }
        }
        return Err(e);
    }

    fs::rename(&tmp_path, path)
        .with_context(|| format!("renaming {:?} -> {:?}", tmp_path, path))?;

    info!("wrote JSON");
    Ok(())
}

/// Follow symlinks to the real file; a path that does not exist yet is used as is.
fn resolve_target(path: &Path) -> Result<PathBuf> {
    match fs::canonicalize(path) {
        Ok(resolved) => {
            if resolved != path {
                debug!(from = %path.display(), to = %resolved.display(), "resolved output path");
            }
            Ok(resolved)
        }
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(path.to_path_buf()),
        Err(e) => Err(e).with_context(|| format!("resolving {:?}", path)),
    }
}

fn write_pretty(dataset: &[Record], tmp_path: &Path) -> Result<()> {
    let file = fs::File::create(tmp_path).with_context(|| format!("creating {:?}", tmp_path))?;
    let mut out = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut out, dataset).context("serializing JSON")?;
    out.flush().with_context(|| format!("writing {:?}", tmp_path))?;
    Ok(())
}
