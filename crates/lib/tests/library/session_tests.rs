//! End-to-end runs of the two-pass configuration protocol.

use cfgengine_lib::codec;
use cfgengine_lib::cursor::CursorState;
use cfgengine_lib::install::InstallScript;
use cfgengine_lib::module::PortValue;
use cfgengine_lib::resource::LookupError;
use cfgengine_lib::{ConfigEngine, EngineError, Session, Status};
use serde_json::json;

use super::common::{WEB_DEFS, WEB_SPEC, write_documents};

fn loaded() -> (tempfile::TempDir, Session) {
  let (temp, defs, spec) = write_documents(WEB_DEFS, WEB_SPEC);
  let mut session = Session::new();
  session.init(&defs, &spec).unwrap();
  (temp, session)
}

#[test]
fn discovery_pass_lists_types_in_order() {
  let (_temp, mut session) = loaded();

  let mut types = Vec::new();
  while session.has_next() {
    session.next();
    if let Ok(module) = session.current_module() {
      types.push((module.id.clone(), session.config_port_types().unwrap()));
    }
  }

  assert_eq!(
    types,
    [
      ("pg".to_string(), "host:string\nport:int\n".to_string()),
      (
        "app".to_string(),
        "listen:int\nmode:enum(dev|prod)\ndebug:bool\ndb_host:string\n".to_string()
      ),
    ]
  );
  assert_eq!(session.position(), CursorState::AfterLast);
}

#[test]
fn full_protocol_writes_script() {
  let (temp, mut session) = loaded();

  while session.next() {
    if session.current_module().is_err() {
      break;
    }
    let _ = session.config_port_types().unwrap();
  }
  session.reinit();

  // app comes second, so pg's host is still the default while app is edited.
  assert!(session.next());
  let pg_text = session.config_ports().unwrap();
  assert_eq!(pg_text, "host=localhost\nport=5432\n");
  session.set_config_ports(&pg_text).unwrap();
  session.bind_ports_of_current().unwrap();

  // db_host stays unset in the text and follows the bound database.
  assert!(session.next());
  let text = session.config_ports().unwrap();
  assert_eq!(text, "listen=8080\nmode=!unset\ndebug=!unset\ndb_host=!unset\n");
  session
    .set_config_ports(&text.replace("mode=!unset", "mode=prod"))
    .unwrap();
  session.bind_ports_of_current().unwrap();
  assert!(session.current_module().unwrap().config_port("db_host").unwrap().value.is_none());

  // Move the database after app was committed.
  session.reinit();
  session.next();
  session
    .set_config_ports(&pg_text.replace("localhost", "db.internal"))
    .unwrap();

  let path = temp.path().join("install.script");
  session.write_install_file(&path).unwrap();

  let script = InstallScript::load(&path).unwrap();
  let ids: Vec<_> = script.entries.iter().map(|e| e.id.as_str()).collect();
  assert_eq!(ids, ["pg", "app"]);

  let app = script.get("app").unwrap();
  assert_eq!(app.config_port["mode"], json!("prod"));
  assert_eq!(app.config_port["db_host"], json!("db.internal"));
  assert!(!app.config_port.contains_key("debug"));
  assert_eq!(app.input_ports["db"].id, "pg");

  assert_eq!(
    script.get("pg").unwrap().config_port["host"],
    json!("db.internal")
  );
}

#[test]
fn explicit_value_stops_following_source() {
  let (temp, mut session) = loaded();
  session.next();
  session.bind_ports_of_current().unwrap();
  session.next();
  let text = session
    .config_ports()
    .unwrap()
    .replace("mode=!unset", "mode=dev")
    .replace("db_host=!unset", "db_host=replica.internal");
  session.set_config_ports(&text).unwrap();
  session.bind_ports_of_current().unwrap();

  let path = temp.path().join("install.script");
  session.write_install_file(&path).unwrap();
  let script = InstallScript::load(&path).unwrap();
  assert_eq!(script.get("app").unwrap().config_port["db_host"], json!("replica.internal"));
}

/// Parsing the unedited value text gives back exactly the stored values.
fn assert_round_trip(session: &Session) {
  let module = session.current_module().unwrap();
  let parsed = codec::parse(module, &session.config_ports().unwrap()).unwrap();
  let stored: Vec<_> = module
    .config_ports
    .iter()
    .map(|p| (p.name.clone(), p.value.as_ref().map(|v| v.to_string())))
    .collect();
  let parsed: Vec<_> = parsed.into_iter().map(|p| (p.name, p.value)).collect();
  assert_eq!(parsed, stored);
}

#[test]
fn unedited_value_text_round_trips() {
  let defs = r#"{
    "resource_def_version": "1.0",
    "resource_definitions": [
      {"key": "src", "config_port": [{"name": "url", "type": "string", "default": "http://a"}]},
      {
        "key": "all",
        "config_port": [
          {"name": "s", "type": "string", "required": false},
          {"name": "n", "type": "int", "required": false},
          {"name": "b", "type": "bool", "required": false},
          {"name": "e", "type": "enum", "choices": ["x", "y"], "required": false},
          {"name": "from", "type": "string", "source": {"port": "up", "property": "url"}}
        ],
        "input_ports": [{"name": "up", "key": "src"}]
      }
    ]
  }"#;
  let spec = r#"[
    {"id": "u", "key": "src"},
    {"id": "m", "key": "all", "input_ports": {"up": {"key": "src", "id": "u"}}}
  ]"#;
  let (_temp, defs, spec) = write_documents(defs, spec);
  let mut session = Session::new();
  session.init(&defs, &spec).unwrap();
  session.next();
  session.next();

  // Everything unset, the sourced port included.
  assert_round_trip(&session);
  assert!(session.config_ports().unwrap().ends_with("from=!unset\n"));

  // Values colliding with the marker or spanning lines survive.
  session
    .set_config_ports("s=\\!unset\\n\\\\\nn=-42\nb=true\ne=y\nfrom=!unset\n")
    .unwrap();
  assert_eq!(
    session.current_module().unwrap().config_port("s").unwrap().value,
    Some(PortValue::String("!unset\n\\".to_string()))
  );
  assert_round_trip(&session);

  // Committing the unedited text changes nothing.
  let before = session.current_module().unwrap().clone();
  let text = session.config_ports().unwrap();
  session.set_config_ports(&text).unwrap();
  assert_eq!(session.current_module().unwrap(), &before);
}

#[test]
fn value_pass_without_discovery() {
  let (temp, mut session) = loaded();

  session.next();
  session.bind_ports_of_current().unwrap();
  session.next();
  let text = session.config_ports().unwrap().replace("mode=!unset", "mode=dev");
  session.set_config_ports(&text).unwrap();
  session.bind_ports_of_current().unwrap();

  session.write_install_file(&temp.path().join("install.script")).unwrap();
}

#[test]
fn stale_edit_is_rejected() {
  let (_temp, mut session) = loaded();
  session.next();

  let err = session.set_config_ports("host=a\n").unwrap_err();
  assert!(matches!(err, EngineError::Codec(_)));
  assert_eq!(err.status(), Status::UserError);

  let err = session.set_config_ports("port=1\nhost=a\n").unwrap_err();
  assert!(matches!(err, EngineError::Codec(_)));
}

#[test]
fn enum_choice_is_checked() {
  let (_temp, mut session) = loaded();
  session.next();
  session.next();

  let text = session.config_ports().unwrap().replace("mode=!unset", "mode=staging");
  let err = session.set_config_ports(&text).unwrap_err();
  assert_eq!(err.status(), Status::UserError);
  assert!(err.to_string().contains("mode"));
  assert!(session.config_ports().unwrap().contains("mode=!unset"));
}

#[test]
fn missing_binding_blocks_write() {
  let (temp, mut session) = loaded();
  session.next();
  session.next();
  let text = session.config_ports().unwrap().replace("mode=!unset", "mode=dev");
  session.set_config_ports(&text).unwrap();

  let err = session
    .write_install_file(&temp.path().join("install.script"))
    .unwrap_err();
  assert_eq!(err.status(), Status::SystemError);
  assert!(err.to_string().contains("not bound"));
}

#[test]
fn resources_are_looked_up_by_key_and_id() {
  let (_temp, session) = loaded();

  let pg = session.get_resource("postgres", "pg").unwrap();
  assert_eq!(pg.property("port"), Some(&json!(5432)));

  let err = session.get_resource("postgres", "other").unwrap_err();
  assert!(matches!(err, EngineError::Lookup(LookupError::NotFound { .. })));
}

#[test]
fn bind_port_rejects_wrong_resource_key() {
  let (_temp, mut session) = loaded();
  session.next();
  session.next();

  let err = session.bind_port("db", "webapp", "app").unwrap_err();
  assert_eq!(err.status(), Status::UserError);
  assert!(err.to_string().contains("accepts 'postgres'"));
}

#[test]
fn malformed_document_is_user_error() {
  let (_temp, defs, spec) = write_documents("{ nope", WEB_SPEC);
  let err = Session::new().init(&defs, &spec).unwrap_err();
  assert!(matches!(err, EngineError::User(_)));
}

#[test]
fn unsupported_version_is_user_error() {
  let defs = WEB_DEFS.replace("\"1.0\"", "\"2.0\"");
  let (_temp, defs, spec) = write_documents(&defs, WEB_SPEC);
  let err = Session::new().init(&defs, &spec).unwrap_err();
  assert!(matches!(err, EngineError::User(msg) if msg.contains("2.0")));
}

#[test]
fn enum_choice_with_separator_fails_init() {
  let defs = WEB_DEFS.replace(r#"["dev", "prod"]"#, r#"["dev", "prod|staging"]"#);
  let (_temp, defs, spec) = write_documents(&defs, WEB_SPEC);
  let err = Session::new().init(&defs, &spec).unwrap_err();
  assert!(matches!(err, EngineError::User(msg) if msg.contains("prod|staging")));
}
