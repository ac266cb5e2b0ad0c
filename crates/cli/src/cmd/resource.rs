//! Implementation of the `cfgengine resource` command.

use anyhow::Result;

use cfgengine_lib::ConfigEngine;

use super::DocumentArgs;
use crate::output::{OutputFormat, print_json, print_stat};

pub fn cmd_resource(documents: &DocumentArgs, key: &str, id: &str, format: OutputFormat) -> Result<()> {
  let session = documents.open()?;
  let resource = session.get_resource(key, id)?;

  if format.is_json() {
    return print_json(resource);
  }

  println!("{}", resource.resource_ref());
  for (name, value) in &resource.config_port {
    print_stat(name, value);
  }
  Ok(())
}
