//! Value escaping for the port text format.
//!
//! One value occupies exactly one line, so line breaks are escaped. The
//! literal [`UNSET_MARKER`] marks an unset value; a real value starting with
//! `!` gets its first character escaped so it can never collide with it.
//!
//! | raw            | escaped |
//! |----------------|---------|
//! | `\`            | `\\`    |
//! | newline        | `\n`    |
//! | carriage return| `\r`    |
//! | leading `!`    | `\!`    |

/// Marker written in place of a value for unset ports.
pub const UNSET_MARKER: &str = "!unset";

/// Escape a raw value for a single line.
pub fn escape_value(raw: &str) -> String {
  let mut out = String::with_capacity(raw.len());
  for (i, c) in raw.chars().enumerate() {
    match c {
      '\\' => out.push_str("\\\\"),
      '\n' => out.push_str("\\n"),
      '\r' => out.push_str("\\r"),
      '!' if i == 0 => out.push_str("\\!"),
      c => out.push(c),
    }
  }
  out
}

/// Render an optional value, using [`UNSET_MARKER`] for `None`.
pub fn render_value(value: Option<&str>) -> String {
  match value {
    Some(raw) => escape_value(raw),
    None => UNSET_MARKER.to_string(),
  }
}

/// Reverse [`render_value`].
///
/// Returns `Ok(None)` for the unset marker, or `Err` with the offending escape
/// sequence.
pub fn unescape_value(text: &str) -> Result<Option<String>, String> {
  if text == UNSET_MARKER {
    return Ok(None);
  }

  let mut out = String::with_capacity(text.len());
  let mut chars = text.chars();
  while let Some(c) = chars.next() {
    if c != '\\' {
      out.push(c);
      continue;
    }
    match chars.next() {
      Some('\\') => out.push('\\'),
      Some('n') => out.push('\n'),
      Some('r') => out.push('\r'),
      Some('!') => out.push('!'),
      Some(other) => return Err(format!("\\{}", other)),
      None => return Err("\\".to_string()),
    }
  }
  Ok(Some(out))
}
