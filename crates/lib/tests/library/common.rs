//! Shared fixtures for library integration tests.

use std::fs;
use std::path::PathBuf;

use tempfile::TempDir;

/// A web application needing a database, plus the database itself.
pub const WEB_DEFS: &str = r#"{
  "resource_def_version": "1.0",
  "resource_definitions": [
    {
      "key": "postgres",
      "display_name": "PostgreSQL",
      "config_port": [
        {"name": "host", "type": "string", "default": "localhost"},
        {"name": "port", "type": "int", "default": 5432}
      ]
    },
    {
      "key": "webapp",
      "config_port": [
        {"name": "listen", "type": "int", "default": 8080},
        {"name": "mode", "type": "enum", "choices": ["dev", "prod"]},
        {"name": "debug", "type": "bool", "required": false},
        {"name": "db_host", "type": "string", "source": {"port": "db", "property": "host"}}
      ],
      "input_ports": [{"name": "db", "key": "postgres"}]
    }
  ]
}"#;

pub const WEB_SPEC: &str = r#"[
  {"id": "pg", "key": "postgres"},
  {"id": "app", "key": "webapp", "input_ports": {"db": {"key": "postgres", "id": "pg"}}}
]"#;

/// Write both documents into a fresh temp directory.
pub fn write_documents(defs: &str, spec: &str) -> (TempDir, PathBuf, PathBuf) {
  let temp = TempDir::new().unwrap();
  let defs_path = temp.path().join("resource_defs.json");
  let spec_path = temp.path().join("install_spec.json");
  fs::write(&defs_path, defs).unwrap();
  fs::write(&spec_path, spec).unwrap();
  (temp, defs_path, spec_path)
}
