mod resource;
mod run;
mod types;
mod values;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use cfgengine_lib::{ConfigEngine, Session};

pub use resource::cmd_resource;
pub use run::{Override, RunOptions, cmd_run, parse_override};
pub use types::cmd_types;
pub use values::cmd_values;

/// The two input documents every command loads.
#[derive(Debug, Clone, Args)]
pub struct DocumentArgs {
  /// Resource-definition document (JSON)
  pub resource_defs: PathBuf,

  /// Install-specification document (JSON)
  pub install_spec: PathBuf,
}

impl DocumentArgs {
  /// Start a session over both documents.
  pub fn open(&self) -> Result<Session> {
    let mut session = Session::new();
    session.init(&self.resource_defs, &self.install_spec).with_context(|| {
      format!(
        "Failed to load {} and {}",
        self.resource_defs.display(),
        self.install_spec.display()
      )
    })?;
    Ok(session)
  }
}
