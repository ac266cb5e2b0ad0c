//! Implementation of the `cfgengine run` command.
//!
//! Drives the whole protocol against one pair of documents:
//! - Discovery pass over every module
//! - Value pass: overrides (and prompts) are edited into each module's value
//!   text, committed, and the module's ports bound
//! - Install script write
//!
//! On failure an error report is left next to the install script; on success
//! a stale report is removed.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::{Context, Result, bail};
use tracing::{debug, info};

use cfgengine_lib::codec::{UNSET_MARKER, escape};
use cfgengine_lib::install::WriteOptions;
use cfgengine_lib::install::report::{ErrorReport, clear_report, report_path, write_report};
use cfgengine_lib::{ConfigEngine, EngineError, Session, Status};

use super::DocumentArgs;
use crate::output::{format_elapsed, print_error, print_stat, print_success};
use crate::prompts;

/// A `--set module.port=value` override.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Override {
  pub module: String,
  pub port: String,
  pub value: String,
}

/// Parse `module.port=value`. The value may contain `=` and `.`.
pub fn parse_override(arg: &str) -> Result<Override, String> {
  let (target, value) = arg
    .split_once('=')
    .ok_or_else(|| format!("expected MODULE.PORT=VALUE, got '{}'", arg))?;
  let (module, port) = target
    .split_once('.')
    .ok_or_else(|| format!("expected MODULE.PORT before '=', got '{}'", target))?;
  if module.is_empty() || port.is_empty() {
    return Err(format!("empty module or port name in '{}'", arg));
  }
  Ok(Override {
    module: module.to_string(),
    port: port.to_string(),
    value: value.to_string(),
  })
}

#[derive(Debug, Clone)]
pub struct RunOptions {
  pub output: PathBuf,
  pub overrides: Vec<Override>,
  pub backup_previous: bool,
  pub interactive: bool,
}

struct RunSummary {
  modules: usize,
  ports_bound: usize,
  elapsed: Duration,
}

pub fn cmd_run(documents: &DocumentArgs, options: &RunOptions) -> Result<()> {
  let report = report_path(&options.output);

  match run(documents, options) {
    Ok(summary) => {
      clear_report(&report).with_context(|| format!("Failed to remove stale error report: {}", report.display()))?;

      let written = dunce::canonicalize(&options.output).unwrap_or_else(|_| options.output.clone());
      print_success(format_args!("Install script written to {}", written.display()));
      print_stat("Modules", summary.modules);
      print_stat("Ports bound", summary.ports_bound);
      print_stat("Elapsed", format_elapsed(summary.elapsed));
      Ok(())
    }
    Err(e) => {
      let error_report = match e.downcast_ref::<EngineError>() {
        Some(engine) => ErrorReport::from_error(engine),
        None => ErrorReport {
          kind: Status::SystemError.as_str().to_string(),
          message: format!("{:#}", e),
        },
      };
      print_error(&error_report.message);
      write_report(&report, &error_report)
        .with_context(|| format!("Failed to write error report: {}", report.display()))?;
      info!(path = %report.display(), kind = %error_report.kind, "error report written");
      Err(e.context("Configuration failed"))
    }
  }
}

fn run(documents: &DocumentArgs, options: &RunOptions) -> Result<RunSummary> {
  let start = Instant::now();
  let mut session = documents.open()?.with_write_options(WriteOptions {
    backup_previous: options.backup_previous,
  });
  check_overrides(&session, &options.overrides)?;

  // Discovery pass.
  while session.next() {
    let Ok(module) = session.current_module() else {
      break;
    };
    let id = module.id.clone();
    let types = session.config_port_types()?;
    debug!(module = %id, ports = types.lines().count(), "discovered config ports");
  }
  session.reinit();

  // Value pass.
  let mut ports_bound = 0;
  while session.next() {
    let Ok(module) = session.current_module() else {
      break;
    };
    let id = module.id.clone();

    let mut text = apply_overrides(&id, &session.config_ports()?, &options.overrides);
    if options.interactive {
      text = prompt_values(&id, &text)?;
    }
    session.set_config_ports(&text)?;
    session.bind_ports_of_current()?;
    ports_bound += session.current_module()?.ports.len();
  }

  session.write_install_file(&options.output)?;

  Ok(RunSummary {
    modules: session.modules().len(),
    ports_bound,
    elapsed: start.elapsed(),
  })
}

/// Reject overrides naming a module or config port that does not exist, or
/// a module id shared by resources of different keys.
fn check_overrides(session: &Session, overrides: &[Override]) -> Result<(), EngineError> {
  for o in overrides {
    let matches: Vec<_> = session.modules().iter().filter(|m| m.id == o.module).collect();
    if matches.len() > 1 {
      let keys: Vec<_> = matches.iter().map(|m| m.key.as_str()).collect();
      return Err(EngineError::user(format!(
        "override '{}.{}' is ambiguous: module id '{}' is used by keys {}",
        o.module,
        o.port,
        o.module,
        keys.join(", ")
      )));
    }
    let known = matches.first().is_some_and(|m| m.config_port(&o.port).is_some());
    if !known {
      return Err(EngineError::user(format!(
        "override names unknown config port '{}.{}'",
        o.module, o.port
      )));
    }
  }
  Ok(())
}

/// Rewrite the lines of `text` that an override targets.
///
/// An override value of `!unset` clears the port.
fn apply_overrides(module: &str, text: &str, overrides: &[Override]) -> String {
  text
    .lines()
    .map(|line| {
      let name = line.split_once('=').map_or(line, |(name, _)| name);
      match overrides.iter().rev().find(|o| o.module == module && o.port == name) {
        Some(o) => format!("{}={}\n", name, render_override(&o.value)),
        None => format!("{}\n", line),
      }
    })
    .collect()
}

fn render_override(value: &str) -> String {
  if value == UNSET_MARKER {
    UNSET_MARKER.to_string()
  } else {
    escape::escape_value(value)
  }
}

fn prompt_values(module: &str, text: &str) -> Result<String> {
  let mut edited = String::with_capacity(text.len());
  for line in text.lines() {
    let Some((name, current)) = line.split_once('=') else {
      bail!("Malformed value line for module '{}': {}", module, line);
    };
    let value = match prompts::ask_value(&format!("{}.{}", module, name), current)? {
      Some(answer) => render_override(&answer),
      None => current.to_string(),
    };
    edited.push_str(&format!("{}={}\n", name, value));
  }
  Ok(edited)
}
