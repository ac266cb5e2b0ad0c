//! Config port types and values.
//!
//! The engine supports a fixed set of primitive kinds: strings, integers,
//! booleans and enumerated choices. [`PortType`] describes a port's declared
//! kind; [`PortValue`] is a value that has been checked against one.

use std::fmt;

use serde_json::Value;

/// Declared kind of a config port.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PortType {
  String,
  Int,
  Bool,
  /// One of a fixed list of choices.
  Enum(Vec<String>),
}

impl PortType {
  /// Parse the textual form of a value into a typed value.
  pub fn parse_value(&self, raw: &str) -> Result<PortValue, String> {
    match self {
      PortType::String => Ok(PortValue::String(raw.to_string())),
      PortType::Int => raw
        .trim()
        .parse::<i64>()
        .map(PortValue::Int)
        .map_err(|_| format!("'{}' is not an integer", raw)),
      PortType::Bool => match raw.trim() {
        "true" => Ok(PortValue::Bool(true)),
        "false" => Ok(PortValue::Bool(false)),
        other => Err(format!("'{}' is not a boolean (expected true or false)", other)),
      },
      PortType::Enum(choices) => {
        if choices.iter().any(|c| c == raw) {
          Ok(PortValue::String(raw.to_string()))
        } else {
          Err(format!("'{}' is not one of {}", raw, choices.join(", ")))
        }
      }
    }
  }

  /// Convert a JSON scalar from an input document into a typed value.
  pub fn from_json(&self, value: &Value) -> Result<PortValue, String> {
    match (self, value) {
      (PortType::String, Value::String(s)) => Ok(PortValue::String(s.clone())),
      (PortType::Int, Value::Number(n)) => n
        .as_i64()
        .map(PortValue::Int)
        .ok_or_else(|| format!("{} is not a 64-bit integer", n)),
      (PortType::Bool, Value::Bool(b)) => Ok(PortValue::Bool(*b)),
      (PortType::Enum(_), Value::String(s)) => self.parse_value(s),
      (port_type, other) => Err(format!("expected {}, got {}", port_type, other)),
    }
  }

  pub fn accepts(&self, value: &PortValue) -> bool {
    match (self, value) {
      (PortType::String, PortValue::String(_)) => true,
      (PortType::Int, PortValue::Int(_)) => true,
      (PortType::Bool, PortValue::Bool(_)) => true,
      (PortType::Enum(choices), PortValue::String(s)) => choices.contains(s),
      _ => false,
    }
  }
}

impl fmt::Display for PortType {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      PortType::String => f.write_str("string"),
      PortType::Int => f.write_str("int"),
      PortType::Bool => f.write_str("bool"),
      PortType::Enum(choices) => write!(f, "enum({})", choices.join("|")),
    }
  }
}

/// A typed config value.
///
/// Enum choices are carried as strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PortValue {
  String(String),
  Int(i64),
  Bool(bool),
}

impl PortValue {
  pub fn to_json(&self) -> Value {
    match self {
      PortValue::String(s) => Value::String(s.clone()),
      PortValue::Int(n) => Value::from(*n),
      PortValue::Bool(b) => Value::Bool(*b),
    }
  }
}

impl fmt::Display for PortValue {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      PortValue::String(s) => f.write_str(s),
      PortValue::Int(n) => write!(f, "{}", n),
      PortValue::Bool(b) => write!(f, "{}", b),
    }
  }
}
