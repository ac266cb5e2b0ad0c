//! Error report for failed configuration runs.
//!
//! A host that drives the engine non-interactively leaves a small JSON file
//! next to the install script when a run fails, so the installer front end can
//! show why. A successful run removes any stale report.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::consts::CONFIG_ERROR_FILENAME;
use crate::error::EngineError;

/// Contents of `config_error.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorReport {
  /// `"user"` or `"system"`.
  pub kind: String,
  pub message: String,
}

impl ErrorReport {
  pub fn from_error(error: &EngineError) -> Self {
    Self {
      kind: error.status().as_str().to_string(),
      message: error.message(),
    }
  }
}

/// Location of the report for an install script at `script_path`.
pub fn report_path(script_path: &Path) -> PathBuf {
  match script_path.parent() {
    Some(dir) => dir.join(CONFIG_ERROR_FILENAME),
    None => PathBuf::from(CONFIG_ERROR_FILENAME),
  }
}

pub fn write_report(path: &Path, report: &ErrorReport) -> io::Result<()> {
  let content = serde_json::to_string_pretty(report).map_err(io::Error::other)?;
  debug!(path = %path.display(), kind = %report.kind, "writing error report");
  fs::write(path, content)
}

/// Remove a stale report. A missing file is not an error.
pub fn clear_report(path: &Path) -> io::Result<()> {
  match fs::remove_file(path) {
    Ok(()) => Ok(()),
    Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
    Err(e) => Err(e),
  }
}
