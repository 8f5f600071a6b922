use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use deadlines_core::{RunConfig, Snapshot};
use deadlines_parser::{decode_payload, PayloadEncoding};
use tracing::debug;

pub const CONFIG_ENV: &str = "DEADLINES_CONFIG";

/// Reads every source file in the order given. Files are re-read on each call
/// so a watcher always sees the latest snapshot on disk.
pub fn load_snapshot(paths: &[PathBuf]) -> Result<Snapshot> {
    let mut sources = Vec::with_capacity(paths.len());
    for path in paths {
        sources.push(load_payload(path)?);
    }
    Ok(Snapshot::new(sources))
}

fn load_payload(path: &Path) -> Result<serde_json::Value> {
    let encoding = path
        .extension()
        .and_then(|ext| ext.to_str())
        .and_then(PayloadEncoding::from_extension)
        .ok_or_else(|| {
            anyhow!(
                "{} has no recognised extension (expected .json, .yml or .yaml)",
                path.display()
            )
        })?;
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read source {}", path.display()))?;
    let payload = decode_payload(&text, encoding)
        .with_context(|| format!("failed to decode source {}", path.display()))?;
    debug!(path = %path.display(), ?encoding, "source loaded");
    Ok(payload)
}

/// `--config` wins, then `DEADLINES_CONFIG`; with neither, every series is shown.
pub fn load_config(explicit: Option<&Path>) -> Result<RunConfig> {
    let path = match explicit {
        Some(path) => Some(path.to_path_buf()),
        None => env::var_os(CONFIG_ENV).map(PathBuf::from),
    };
    let Some(path) = path else {
        return Ok(RunConfig::default());
    };

    let raw = fs::read_to_string(&path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    RunConfig::from_toml_str(&raw).with_context(|| format!("invalid config {}", path.display()))
}
