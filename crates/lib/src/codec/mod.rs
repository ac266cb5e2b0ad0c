//! Port codec: the line-oriented text form of a module's config ports.
//!
//! The codec lets an external editor (a UI, a human with a text editor) change
//! config values without knowing anything about modules. There are two forms,
//! both with one line per config port in declaration order:
//!
//! ```text
//! port:int                 port=8080
//! mode:enum(dev|prod)      mode=prod
//! admin:string             admin=!unset
//! ```
//!
//! The types form (left) is read-only and used by the discovery pass. The
//! values form (right) is read, edited in place, [`parse`]d back and committed
//! with [`apply_values`]. Values are escaped as described in [`escape`].
//!
//! Both forms show only what is stored on the module. A port that takes its
//! value from a `source` stays unset in the text; [`resolved_value`] reads the
//! value it would fall back to.
//!
//! # Submodules
//!
//! - [`escape`] - Value escaping and the unset marker

pub mod escape;

use serde_json::{Map, Value};
use thiserror::Error;
use tracing::debug;

use crate::error::EngineError;
use crate::module::{ConfigPort, Module, PortValue};
use crate::resource::ResourceStore;

pub use escape::UNSET_MARKER;

/// Errors from parsing edited port text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
  /// A line has no `=` between name and value.
  #[error("line {line}: expected 'name=value', got '{text}'")]
  MissingSeparator { line: usize, text: String },

  /// The text has a different number of lines than the module has config ports.
  #[error("expected {expected} config port line(s), found {found}")]
  LineCount { expected: usize, found: usize },

  /// A line names a different port than the module declares at that position.
  #[error("line {line}: expected config port '{expected}', found '{found}'")]
  NameMismatch {
    line: usize,
    expected: String,
    found: String,
  },

  /// A value contains an unknown escape sequence.
  #[error("line {line}: invalid escape sequence '{sequence}'")]
  InvalidEscape { line: usize, sequence: String },
}

/// One parsed `name=value` line. `value` is `None` for the unset marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedPort {
  pub name: String,
  pub value: Option<String>,
}

impl ParsedPort {
  pub fn new(name: impl Into<String>, value: Option<&str>) -> Self {
    Self {
      name: name.into(),
      value: value.map(str::to_string),
    }
  }
}

/// List each config port as `name:type`, one per line.
pub fn types_as_string(module: &Module) -> String {
  module
    .config_ports
    .iter()
    .map(|p| format!("{}:{}\n", p.name, p.port_type))
    .collect()
}

/// List each config port as `name=value`, one per line.
///
/// Unset ports are written as the unset marker.
pub fn values_as_string(module: &Module) -> String {
  module
    .config_ports
    .iter()
    .map(|p| {
      let rendered = p.value.as_ref().map(|v| v.to_string());
      format!("{}={}\n", p.name, escape::render_value(rendered.as_deref()))
    })
    .collect()
}

/// The value `port` resolves to: its own value, else its source's.
pub fn resolved_value(module: &Module, port: &ConfigPort, store: &ResourceStore) -> Option<PortValue> {
  port.value.clone().or_else(|| resolve_source(module, port, store))
}

/// Resolved values of every config port as a JSON object, in declaration
/// order. Ports that resolve to nothing are omitted.
pub fn resolved_values(module: &Module, store: &ResourceStore) -> Map<String, Value> {
  module
    .config_ports
    .iter()
    .filter_map(|p| resolved_value(module, p, store).map(|v| (p.name.clone(), v.to_json())))
    .collect()
}

/// Resolve an unset port from the resource bound on its source port.
fn resolve_source(module: &Module, port: &ConfigPort, store: &ResourceStore) -> Option<PortValue> {
  let source = port.source.as_ref()?;
  let Some(target) = module.port(&source.port).and_then(|p| p.target()) else {
    debug!(module = %module.id, port = %port.name, source_port = %source.port, "source port not bound");
    return None;
  };
  let resource = match store.lookup_ref(target) {
    Ok(resource) => resource,
    Err(e) => {
      debug!(module = %module.id, port = %port.name, error = %e, "source resource not found");
      return None;
    }
  };
  let raw = resource.property(&source.property)?;
  match port.port_type.from_json(raw) {
    Ok(value) => Some(value),
    Err(reason) => {
      debug!(module = %module.id, port = %port.name, %reason, "source value does not fit port type");
      None
    }
  }
}

/// Parse edited value text against the ports `module` declares.
///
/// The text must have exactly one line per config port, in declaration order.
/// Missing, extra, renamed or reordered lines are rejected.
pub fn parse(module: &Module, text: &str) -> Result<Vec<ParsedPort>, CodecError> {
  let lines: Vec<&str> = text.lines().collect();
  if lines.len() != module.config_ports.len() {
    return Err(CodecError::LineCount {
      expected: module.config_ports.len(),
      found: lines.len(),
    });
  }

  lines
    .iter()
    .zip(&module.config_ports)
    .enumerate()
    .map(|(i, (line, port))| {
      let line_no = i + 1;
      let (name, raw) = line.split_once('=').ok_or_else(|| CodecError::MissingSeparator {
        line: line_no,
        text: line.to_string(),
      })?;
      if name != port.name {
        return Err(CodecError::NameMismatch {
          line: line_no,
          expected: port.name.clone(),
          found: name.to_string(),
        });
      }
      let value =
        escape::unescape_value(raw).map_err(|sequence| CodecError::InvalidEscape { line: line_no, sequence })?;
      Ok(ParsedPort {
        name: name.to_string(),
        value,
      })
    })
    .collect()
}

/// Commit parsed values onto `module`'s config ports.
///
/// Every value is checked against its port's declared type (and fixed value)
/// before anything is written: either all ports change or none do.
pub fn apply_values(module: &mut Module, parsed: &[ParsedPort]) -> Result<(), EngineError> {
  if parsed.len() != module.config_ports.len() {
    return Err(
      CodecError::LineCount {
        expected: module.config_ports.len(),
        found: parsed.len(),
      }
      .into(),
    );
  }

  let mut staged = Vec::with_capacity(parsed.len());
  for (i, (entry, port)) in parsed.iter().zip(&module.config_ports).enumerate() {
    if entry.name != port.name {
      return Err(
        CodecError::NameMismatch {
          line: i + 1,
          expected: port.name.clone(),
          found: entry.name.clone(),
        }
        .into(),
      );
    }
    let value = match &entry.value {
      None if port.fixed_value.is_some() => {
        return Err(invalid(module, port, "value is fixed and cannot be unset"));
      }
      None => None,
      Some(raw) => {
        let value = port.port_type.parse_value(raw).map_err(|r| invalid(module, port, &r))?;
        port.validate(&value).map_err(|r| invalid(module, port, &r))?;
        Some(value)
      }
    };
    staged.push(value);
  }

  for (port, value) in module.config_ports.iter_mut().zip(staged) {
    port.value = value;
  }
  debug!(module = %module.id, count = parsed.len(), "applied config port values");
  Ok(())
}

fn invalid(module: &Module, port: &ConfigPort, reason: &str) -> EngineError {
  EngineError::user(format!(
    "invalid value for config port '{}' on module '{}': {}",
    port.name, module.id, reason
  ))
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::module::{Port, PortSource, PortType, ResourceRef};
  use crate::resource::Resource;
  use serde_json::json;

  fn module() -> Module {
    let mut module = Module::new("app", "webapp");
    module.config_ports = vec![
      ConfigPort::new("port", PortType::Int).with_value(PortValue::Int(8080)),
      ConfigPort::new("mode", PortType::Enum(vec!["dev".to_string(), "prod".to_string()])),
      ConfigPort::new("debug", PortType::Bool).with_value(PortValue::Bool(false)),
      ConfigPort::new("motd", PortType::String).with_value(PortValue::String("hi\nthere".to_string())),
    ];
    module
  }

  #[test]
  fn types_form_lists_ports_in_order_without_values() {
    assert_eq!(
      types_as_string(&module()),
      "port:int\nmode:enum(dev|prod)\ndebug:bool\nmotd:string\n"
    );
  }

  #[test]
  fn types_form_of_empty_module_is_empty() {
    assert_eq!(types_as_string(&Module::new("m", "k")), "");
  }

  #[test]
  fn values_form_marks_unset_and_escapes() {
    let text = values_as_string(&module());
    assert_eq!(text, "port=8080\nmode=!unset\ndebug=false\nmotd=hi\\nthere\n");
  }

  #[test]
  fn unedited_values_round_trip() {
    let module = module();
    let text = values_as_string(&module);
    let parsed = parse(&module, &text).unwrap();
    assert_eq!(
      parsed,
      vec![
        ParsedPort::new("port", Some("8080")),
        ParsedPort::new("mode", None),
        ParsedPort::new("debug", Some("false")),
        ParsedPort::new("motd", Some("hi\nthere")),
      ]
    );

    let mut copy = module.clone();
    apply_values(&mut copy, &parsed).unwrap();
    assert_eq!(copy, module);
  }

  #[test]
  fn edited_values_are_applied() {
    let mut module = module();
    let parsed = parse(&module, "port=9090\nmode=prod\ndebug=true\nmotd=\n").unwrap();
    apply_values(&mut module, &parsed).unwrap();

    assert_eq!(module.config_port("port").unwrap().value, Some(PortValue::Int(9090)));
    assert_eq!(
      module.config_port("mode").unwrap().value,
      Some(PortValue::String("prod".to_string()))
    );
    assert_eq!(module.config_port("debug").unwrap().value, Some(PortValue::Bool(true)));
    assert_eq!(
      module.config_port("motd").unwrap().value,
      Some(PortValue::String(String::new()))
    );
  }

  #[test]
  fn parse_rejects_wrong_line_count() {
    let err = parse(&module(), "port=1\nmode=dev\n").unwrap_err();
    assert_eq!(err, CodecError::LineCount { expected: 4, found: 2 });
  }

  #[test]
  fn parse_rejects_reordered_lines() {
    let err = parse(&module(), "mode=dev\nport=1\ndebug=true\nmotd=x\n").unwrap_err();
    assert_eq!(
      err,
      CodecError::NameMismatch {
        line: 1,
        expected: "port".to_string(),
        found: "mode".to_string()
      }
    );
  }

  #[test]
  fn parse_rejects_missing_separator() {
    let err = parse(&module(), "port=1\nmode\ndebug=true\nmotd=x\n").unwrap_err();
    assert!(matches!(err, CodecError::MissingSeparator { line: 2, .. }));
  }

  #[test]
  fn parse_rejects_bad_escape() {
    let err = parse(&module(), "port=1\nmode=dev\ndebug=true\nmotd=\\q\n").unwrap_err();
    assert!(matches!(err, CodecError::InvalidEscape { line: 4, .. }));
  }

  #[test]
  fn parse_splits_on_first_equals() {
    let mut module = Module::new("m", "k");
    module.config_ports.push(ConfigPort::new("expr", PortType::String));
    let parsed = parse(&module, "expr=a=b\n").unwrap();
    assert_eq!(parsed[0].value.as_deref(), Some("a=b"));
  }

  #[test]
  fn invalid_value_leaves_every_port_unchanged() {
    let mut module = module();
    let before = module.clone();
    let parsed = parse(&module, "port=9090\nmode=prod\ndebug=maybe\nmotd=x\n").unwrap();

    let err = apply_values(&mut module, &parsed).unwrap_err();
    match err {
      EngineError::User(msg) => {
        assert!(msg.contains("'debug'"), "message should name the port: {}", msg);
      }
      other => panic!("expected user error, got: {}", other),
    }
    assert_eq!(module, before);
  }

  #[test]
  fn non_numeric_int_names_the_port() {
    let mut module = module();
    let parsed = parse(&module, "port=eighty\nmode=dev\ndebug=true\nmotd=x\n").unwrap();
    let err = apply_values(&mut module, &parsed).unwrap_err();
    assert!(matches!(err, EngineError::User(msg) if msg.contains("'port'") && msg.contains("not an integer")));
  }

  #[test]
  fn enum_choice_out_of_range_is_rejected() {
    let mut module = module();
    let parsed = parse(&module, "port=1\nmode=staging\ndebug=true\nmotd=x\n").unwrap();
    assert!(apply_values(&mut module, &parsed).is_err());
  }

  #[test]
  fn fixed_port_cannot_change_or_unset() {
    let mut module = Module::new("m", "k");
    let mut user = ConfigPort::new("user", PortType::String).with_value(PortValue::String("www".to_string()));
    user.fixed_value = Some(PortValue::String("www".to_string()));
    module.config_ports.push(user);

    assert!(apply_values(&mut module, &[ParsedPort::new("user", Some("root"))]).is_err());
    assert!(apply_values(&mut module, &[ParsedPort::new("user", None)]).is_err());
    assert!(apply_values(&mut module, &[ParsedPort::new("user", Some("www"))]).is_ok());
  }

  #[test]
  fn apply_rejects_mismatched_entries() {
    let mut module = module();
    let err = apply_values(&mut module, &[ParsedPort::new("port", Some("1"))]).unwrap_err();
    assert!(matches!(err, EngineError::Codec(CodecError::LineCount { .. })));
  }

  fn sourced_module() -> (Module, ResourceStore) {
    let mut store = ResourceStore::new();
    let mut config = Map::new();
    config.insert("host".to_string(), json!("db.local"));
    store.register(Resource::new("postgres", "pg").with_config(config));

    let mut module = Module::new("app", "webapp");
    let mut host = ConfigPort::new("db_host", PortType::String);
    host.source = Some(PortSource {
      port: "db".to_string(),
      property: "host".to_string(),
    });
    module.config_ports.push(host);
    let mut db = Port::new("db");
    db.staged = Some(ResourceRef::new("postgres", "pg"));
    module.ports.push(db);
    (module, store)
  }

  #[test]
  fn unset_source_port_resolves_from_store() {
    let (mut module, store) = sourced_module();
    let port = module.config_ports[0].clone();
    assert_eq!(
      resolved_value(&module, &port, &store),
      Some(PortValue::String("db.local".to_string()))
    );
    assert_eq!(resolved_values(&module, &store)["db_host"], json!("db.local"));

    // Unresolvable sources fall back to unset.
    module.port_mut("db").unwrap().staged = Some(ResourceRef::new("postgres", "gone"));
    assert_eq!(resolved_value(&module, &port, &store), None);
    assert!(resolved_values(&module, &store).is_empty());
  }

  #[test]
  fn sourced_port_round_trips_as_unset() {
    let (mut module, _store) = sourced_module();
    let text = values_as_string(&module);
    assert_eq!(text, "db_host=!unset\n");

    let parsed = parse(&module, &text).unwrap();
    assert_eq!(parsed, vec![ParsedPort::new("db_host", None)]);

    // Committing the unedited text keeps the port following its source.
    apply_values(&mut module, &parsed).unwrap();
    assert!(module.config_ports[0].value.is_none());
  }

  #[test]
  fn explicit_value_wins_over_source() {
    let (mut module, store) = sourced_module();
    module.config_ports[0].value = Some(PortValue::String("override".to_string()));
    let port = module.config_ports[0].clone();
    assert_eq!(
      resolved_value(&module, &port, &store),
      Some(PortValue::String("override".to_string()))
    );
  }
}
