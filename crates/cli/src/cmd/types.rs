//! Implementation of the `cfgengine types` command.
//!
//! Runs the discovery pass only: walks every module and prints the type of
//! each config port.

use anyhow::Result;
use serde::Serialize;

use cfgengine_lib::ConfigEngine;

use super::DocumentArgs;
use crate::output::{OutputFormat, print_json, print_module_header};

#[derive(Debug, Serialize)]
struct ModuleTypes {
  id: String,
  key: String,
  config_port: Vec<PortType>,
}

#[derive(Debug, Serialize)]
struct PortType {
  name: String,
  #[serde(rename = "type")]
  port_type: String,
}

pub fn cmd_types(documents: &DocumentArgs, format: OutputFormat) -> Result<()> {
  let mut session = documents.open()?;

  let mut modules = Vec::new();
  while session.next() {
    let Ok(module) = session.current_module() else {
      break;
    };
    let (id, key) = (module.id.clone(), module.key.clone());
    let text = session.config_port_types()?;
    let config_port = text
      .lines()
      .filter_map(|line| line.split_once(':'))
      .map(|(name, port_type)| PortType {
        name: name.to_string(),
        port_type: port_type.to_string(),
      })
      .collect();
    modules.push(ModuleTypes { id, key, config_port });
  }

  if format.is_json() {
    return print_json(&modules);
  }

  for module in &modules {
    print_module_header(&module.id, &module.key);
    for port in &module.config_port {
      println!("    {}: {}", port.name, port.port_type);
    }
  }
  Ok(())
}
