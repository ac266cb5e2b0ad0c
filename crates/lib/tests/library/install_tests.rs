//! Install script persistence through a session.

use std::fs;

use cfgengine_lib::install::{InstallScript, WriteOptions, previous_path};
use cfgengine_lib::{ConfigEngine, Session};

use super::common::write_documents;

const DEFS: &str = r#"{
  "resource_def_version": "1.0",
  "resource_definitions": [
    {"key": "alpha", "config_port": [{"name": "p1", "type": "int"}]},
    {"key": "beta", "config_port": [{"name": "p2", "type": "bool"}]}
  ]
}"#;

const SPEC: &str = r#"[{"id": "A", "key": "alpha"}, {"id": "B", "key": "beta"}]"#;

fn configured(options: WriteOptions) -> (tempfile::TempDir, Session) {
  let (temp, defs, spec) = write_documents(DEFS, SPEC);
  let mut session = Session::new().with_write_options(options);
  session.init(&defs, &spec).unwrap();

  session.next();
  session.set_config_ports("p1=5\n").unwrap();
  session.next();
  session.set_config_ports("p2=true\n").unwrap();
  (temp, session)
}

#[test]
fn script_lists_modules_in_order() {
  let (temp, session) = configured(WriteOptions::default());
  let path = temp.path().join("install.script");
  session.write_install_file(&path).unwrap();

  let content = fs::read_to_string(&path).unwrap();
  let a = content.find("\"A\"").unwrap();
  let b = content.find("\"B\"").unwrap();
  assert!(a < b);

  let script = InstallScript::load(&path).unwrap();
  assert_eq!(script.entries.len(), 2);
}

#[test]
fn previous_script_is_backed_up() {
  let (temp, session) = configured(WriteOptions { backup_previous: true });
  let path = temp.path().join("install.script");
  fs::write(&path, "[]").unwrap();

  session.write_install_file(&path).unwrap();
  assert_eq!(fs::read_to_string(previous_path(&path)).unwrap(), "[]");
}

#[test]
fn failed_write_keeps_existing_script() {
  let (temp, mut session) = configured(WriteOptions { backup_previous: true });
  let path = temp.path().join("install.script");
  fs::write(&path, "[]").unwrap();

  // Unset a required port so rendering fails before anything is touched.
  session.reinit();
  session.next();
  session.set_config_ports("p1=!unset\n").unwrap();

  assert!(session.write_install_file(&path).is_err());
  assert_eq!(fs::read_to_string(&path).unwrap(), "[]");
  assert!(!previous_path(&path).exists());
}
