use anyhow::{Result, bail};
use std::io::{self, IsTerminal, Write};

/// Ask for a new value for `label`, showing the current one.
///
/// Returns `None` when the answer is empty (keep the current value).
pub fn ask_value(label: &str, current: &str) -> Result<Option<String>> {
  if !io::stdin().is_terminal() || !io::stderr().is_terminal() {
    bail!("Cannot prompt for values in non-interactive mode. Use --set instead.");
  }

  write!(io::stderr(), "{} [{}]: ", label, current)?;
  io::stderr().flush()?;

  let mut input = String::new();
  io::stdin().read_line(&mut input)?;

  let answer = input.trim_end_matches(['\r', '\n']);
  if answer.is_empty() {
    Ok(None)
  } else {
    Ok(Some(answer.to_string()))
  }
}
