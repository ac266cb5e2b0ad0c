//! Process-wide logging sink for engine API calls.
//!
//! A host application may register one callback receiving
//! `(area, subarea, severity, message)`. Registration happens at most once,
//! before the first engine call; a later registration attempt is rejected.
//! Without a registered callback, messages go to standard output as
//! `[area][subarea][severity] message`.
//!
//! Internal diagnostics use `tracing`; this sink only carries the API-level
//! messages a host UI wants to display.

use std::fmt;
use std::io::{self, Write};
use std::sync::OnceLock;

use thiserror::Error;

use crate::consts::LOG_AREA;

/// Subarea used for API entry/exit messages.
pub const API_SUBAREA: &str = "API";

/// Message severity, numerically compatible with common logging levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
  Debug = 10,
  Info = 20,
  Warning = 30,
  Error = 40,
}

impl Severity {
  pub fn value(self) -> i32 {
    self as i32
  }
}

impl fmt::Display for Severity {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.value())
  }
}

/// Signature of a registered logging callback.
pub type LoggerFn = dyn Fn(&str, &str, Severity, &str) + Send + Sync;

static LOGGER: OnceLock<Box<LoggerFn>> = OnceLock::new();

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LoggerError {
  #[error("a logger callback is already registered")]
  AlreadyRegistered,
}

/// Register the process-wide logging callback.
pub fn register_logger<F>(logger: F) -> Result<(), LoggerError>
where
  F: Fn(&str, &str, Severity, &str) + Send + Sync + 'static,
{
  LOGGER
    .set(Box::new(logger))
    .map_err(|_| LoggerError::AlreadyRegistered)
}

/// Whether a callback has been registered.
pub fn is_registered() -> bool {
  LOGGER.get().is_some()
}

/// Send a message to the registered callback, or to stdout.
pub fn log(area: &str, subarea: &str, severity: Severity, message: &str) {
  match LOGGER.get() {
    Some(logger) => logger(area, subarea, severity, message),
    None => {
      let mut stdout = io::stdout().lock();
      let _ = writeln!(stdout, "{}", format_line(area, subarea, severity, message));
      let _ = stdout.flush();
    }
  }
}

/// Log an engine API call under the `Config`/`API` area.
pub fn log_api_call(severity: Severity, message: &str) {
  log(LOG_AREA, API_SUBAREA, severity, message);
}

/// Fallback line format used when no callback is registered.
pub fn format_line(area: &str, subarea: &str, severity: Severity, message: &str) -> String {
  format!("[{}][{}][{}] {}", area, subarea, severity, message)
}
