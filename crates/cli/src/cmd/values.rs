//! Implementation of the `cfgengine values` command.
//!
//! Prints each module's value text as the value pass presents it. Ports that
//! take their value from a source are shown unset.

use anyhow::Result;
use serde::Serialize;
use serde_json::{Map, Value};

use cfgengine_lib::ConfigEngine;
use cfgengine_lib::module::Module;

use super::DocumentArgs;
use crate::output::{OutputFormat, module_label, print_json};

#[derive(Debug, Serialize)]
struct ModuleValues {
  id: String,
  key: String,
  /// Typed values; unset ports are `null`.
  values: Map<String, Value>,
}

impl ModuleValues {
  fn new(module: &Module) -> Self {
    let values = module
      .config_ports
      .iter()
      .map(|p| (p.name.clone(), p.value.as_ref().map_or(Value::Null, |v| v.to_json())))
      .collect();
    Self {
      id: module.id.clone(),
      key: module.key.clone(),
      values,
    }
  }
}

pub fn cmd_values(documents: &DocumentArgs, format: OutputFormat) -> Result<()> {
  let mut session = documents.open()?;

  let mut modules = Vec::new();
  let mut texts = Vec::new();
  while session.next() {
    let Ok(module) = session.current_module() else {
      break;
    };
    modules.push(ModuleValues::new(module));
    texts.push(session.config_ports()?);
  }

  if format.is_json() {
    return print_json(&modules);
  }

  for (module, text) in modules.iter().zip(&texts) {
    println!("# {}", module_label(&module.id, &module.key));
    print!("{}", text);
  }
  Ok(())
}
