//! Terminal and JSON output for cfgengine commands.
//!
//! Status lines go through [`print_success`]/[`print_error`]; labelled values
//! through [`print_stat`]. `--format json` output is pretty-printed with
//! [`print_json`].

use std::fmt::Display;
use std::time::Duration;

use anyhow::Context;
use clap::ValueEnum;
use owo_colors::{OwoColorize, Stream};

/// Output format for commands that report documents or resources.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
  #[default]
  Text,
  Json,
}

impl OutputFormat {
  pub fn is_json(self) -> bool {
    self == OutputFormat::Json
  }
}

pub mod symbols {
  pub const SUCCESS: &str = "✓";
  pub const ERROR: &str = "✗";
  pub const MODULE: &str = "•";
}

/// Elapsed time rounded to milliseconds, e.g. `1s 250ms`.
pub fn format_elapsed(elapsed: Duration) -> String {
  let rounded = Duration::from_millis(elapsed.as_millis() as u64);
  if rounded.is_zero() {
    return "0ms".to_string();
  }
  humantime::format_duration(rounded).to_string()
}

/// `id (key)`, the way modules are named in listings.
pub fn module_label(id: &str, key: &str) -> String {
  format!("{} ({})", id, key)
}

pub fn print_module_header(id: &str, key: &str) {
  println!(
    "{} {}",
    symbols::MODULE.if_supports_color(Stream::Stdout, |s| s.blue()),
    module_label(id, key).if_supports_color(Stream::Stdout, |s| s.bold())
  );
}

pub fn print_success(message: impl Display) {
  println!(
    "{} {}",
    symbols::SUCCESS.if_supports_color(Stream::Stdout, |s| s.green()),
    message
  );
}

pub fn print_error(message: impl Display) {
  let message = message.to_string();
  eprintln!(
    "{} {}",
    symbols::ERROR.if_supports_color(Stream::Stderr, |s| s.red()),
    message.if_supports_color(Stream::Stderr, |s| s.red())
  );
}

/// Print `label: value`, indented under the preceding line.
pub fn print_stat(label: &str, value: impl Display) {
  println!(
    "  {}: {}",
    label.if_supports_color(Stream::Stdout, |s| s.dimmed()),
    value
  );
}

pub fn print_json<T: serde::Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
  let json = serde_json::to_string_pretty(value).context("Failed to serialize to JSON")?;
  println!("{}", json);
  Ok(())
}
