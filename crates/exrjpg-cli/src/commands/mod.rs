//! CLI command implementations

pub mod convert;
pub mod list;
pub mod spaces;

use anyhow::{Context, Result};
use exrjpg_ocio::Config;
use std::path::Path;
use std::time::Duration;

/// Loads the OCIO config from `path`, or from `$OCIO` when absent.
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(p) => Config::from_file(p)
            .with_context(|| format!("Failed to load OCIO config: {}", p.display())),
        None => Config::from_env().context("No --config given"),
    }
}

/// Format a duration for display
pub fn format_duration(d: Duration) -> String {
    let ms = d.as_secs_f64() * 1000.0;
    if ms >= 1000.0 {
        format!("{:.2} s", ms / 1000.0)
    } else {
        format!("{:.0} ms", ms)
    }
}

/// File name of a path, or the whole path if it has none.
pub fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
