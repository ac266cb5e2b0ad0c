//! Install script generation.
//!
//! The install script is the finalized configuration handed to the downstream
//! installer: one entry per module, in declaration order, with its config
//! values and port bindings.
//!
//! # Example Script
//!
//! ```json
//! [
//!   {
//!     "id": "app",
//!     "key": "webapp",
//!     "config_port": {"port": 8080, "mode": "prod"},
//!     "input_ports": {"db": {"key": "postgres", "id": "pg"}}
//!   }
//! ]
//! ```
//!
//! # Submodules
//!
//! - [`report`] - Error report written when a run fails

pub mod report;

use std::collections::BTreeMap;
use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::codec;
use crate::module::{Module, ResourceRef};
use crate::resource::ResourceStore;

/// Errors from producing or persisting an install script.
#[derive(Debug, Error)]
pub enum InstallError {
  /// Required config ports are unset or ports are unbound.
  #[error("install script is incomplete: {}", .problems.join("; "))]
  Incomplete { problems: Vec<String> },

  #[error("failed to serialize install script: {0}")]
  Serialize(#[source] serde_json::Error),

  #[error("failed to create install script directory: {0}")]
  CreateDir(#[source] io::Error),

  #[error("failed to write install script: {0}")]
  Write(#[source] io::Error),

  #[error("failed to back up previous install script: {0}")]
  Backup(#[source] io::Error),

  #[error("failed to read install script: {0}")]
  Read(#[source] io::Error),

  #[error("failed to parse install script: {0}")]
  Parse(#[source] serde_json::Error),
}

/// Options for [`InstallScript::write`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriteOptions {
  /// Rename an existing script to `<path>.prev` before replacing it.
  pub backup_previous: bool,
}

/// One module's finalized configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScriptEntry {
  pub id: String,
  pub key: String,
  #[serde(default)]
  pub config_port: Map<String, Value>,
  #[serde(default)]
  pub input_ports: BTreeMap<String, ResourceRef>,
}

/// The complete install script.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InstallScript {
  pub entries: Vec<ScriptEntry>,
}

impl InstallScript {
  /// Render finalized modules, in order.
  ///
  /// Unset ports with a `source` take the value it resolves to in `store`.
  /// Fails if any required config port resolves to nothing or any port is
  /// unbound, listing every problem found.
  pub fn from_modules<'a>(
    modules: impl IntoIterator<Item = &'a Module>,
    store: &ResourceStore,
  ) -> Result<Self, InstallError> {
    let mut entries = Vec::new();
    let mut problems = Vec::new();

    for module in modules {
      let config_port = codec::resolved_values(module, store);
      for port in module
        .config_ports
        .iter()
        .filter(|p| p.required && !config_port.contains_key(&p.name))
      {
        problems.push(format!(
          "required config port '{}' on module '{}' is unset",
          port.name, module.id
        ));
      }

      let mut input_ports = BTreeMap::new();
      for port in &module.ports {
        match &port.bound {
          Some(target) => {
            input_ports.insert(port.name.clone(), target.clone());
          }
          None => problems.push(format!("port '{}' on module '{}' is not bound", port.name, module.id)),
        }
      }

      entries.push(ScriptEntry {
        id: module.id.clone(),
        key: module.key.clone(),
        config_port,
        input_ports,
      });
    }

    if !problems.is_empty() {
      return Err(InstallError::Incomplete { problems });
    }
    Ok(Self { entries })
  }

  pub fn to_json(&self) -> Result<String, InstallError> {
    serde_json::to_string_pretty(self).map_err(InstallError::Serialize)
  }

  /// Persist the script at `path`.
  ///
  /// The content goes to `<path>.tmp` first and is renamed into place, so the
  /// target either holds the complete new script or is left as it was. A
  /// backup taken for [`WriteOptions::backup_previous`] is moved back if the
  /// new script cannot be put in place.
  pub fn write(&self, path: &Path, options: WriteOptions) -> Result<(), InstallError> {
    self.write_with(path, options, |from, to| fs::rename(from, to))
  }

  fn write_with<R>(&self, path: &Path, options: WriteOptions, rename: R) -> Result<(), InstallError>
  where
    R: Fn(&Path, &Path) -> io::Result<()>,
  {
    let content = self.to_json()?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
      fs::create_dir_all(parent).map_err(InstallError::CreateDir)?;
    }

    let temp_path = sibling_path(path, ".tmp");
    info!(
      path = %path.display(),
      entries = self.entries.len(),
      "writing install script"
    );

    if let Err(e) = fs::write(&temp_path, &content) {
      let _ = fs::remove_file(&temp_path);
      return Err(InstallError::Write(e));
    }

    let mut backup = None;
    if options.backup_previous && path.exists() {
      let prev = previous_path(path);
      debug!(from = %path.display(), to = %prev.display(), "backing up previous install script");
      if let Err(e) = rename(path, &prev) {
        let _ = fs::remove_file(&temp_path);
        return Err(InstallError::Backup(e));
      }
      backup = Some(prev);
    }

    if let Err(e) = rename(&temp_path, path) {
      warn!(path = %path.display(), error = %e, "failed to move install script into place");
      let _ = fs::remove_file(&temp_path);
      if let Some(prev) = backup {
        if let Err(restore) = rename(&prev, path) {
          warn!(path = %prev.display(), error = %restore, "failed to restore previous install script");
        }
      }
      return Err(InstallError::Write(e));
    }

    Ok(())
  }

  pub fn load(path: &Path) -> Result<Self, InstallError> {
    let content = fs::read_to_string(path).map_err(InstallError::Read)?;
    serde_json::from_str(&content).map_err(InstallError::Parse)
  }

  pub fn get(&self, id: &str) -> Option<&ScriptEntry> {
    self.entries.iter().find(|e| e.id == id)
  }
}

/// Where an existing script is moved by [`WriteOptions::backup_previous`].
pub fn previous_path(path: &Path) -> PathBuf {
  sibling_path(path, ".prev")
}

fn sibling_path(path: &Path, suffix: &str) -> PathBuf {
  let mut name = OsString::from(path.as_os_str());
  name.push(suffix);
  PathBuf::from(name)
}
