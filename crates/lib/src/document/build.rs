//! Validation of input documents and construction of modules.
//!
//! Checks performed here (all reported as [`DocumentError::Invalid`]):
//! - duplicate definition keys
//! - duplicate or malformed config/input port names within a definition
//! - enum ports without choices
//! - defaults and fixed values that do not fit their port type
//! - instances of undeclared resource types
//! - duplicate `(key, id)` instances
//! - instance values for undeclared config ports, or of the wrong type
//! - staged bindings for undeclared input ports
//!
//! Staged bindings are NOT resolved here. A binding to an unknown resource only
//! fails when it is bound.

use std::collections::HashSet;

use tracing::{debug, info};

use super::{DocumentError, InstallSpec, ResourceDefinition, ResourceDefinitions, ResourceInstance, check_name};
use crate::module::{ConfigPort, Module, Port};
use crate::resource::{Resource, ResourceStore};

/// Build the module sequence and resource store from validated documents.
///
/// Modules come out in install-specification order. Each module is also
/// registered in the store under `(key, id)` with its initial config values.
pub fn build(defs: &ResourceDefinitions, spec: &InstallSpec) -> Result<(Vec<Module>, ResourceStore), DocumentError> {
  check_definitions(defs)?;

  let mut modules = Vec::with_capacity(spec.len());
  let mut store = ResourceStore::new();

  for instance in &spec.instances {
    let def = defs.get(&instance.key).ok_or_else(|| {
      DocumentError::Invalid(format!(
        "instance '{}' references undeclared resource type '{}'",
        instance.id, instance.key
      ))
    })?;
    let module = build_module(def, instance)?;

    let resource = Resource::new(&module.key, &module.id).with_config(module.config_values());
    if !store.register(resource) {
      return Err(DocumentError::Invalid(format!(
        "duplicate instance '{}' of resource type '{}'",
        instance.id, instance.key
      )));
    }
    debug!(
      module = %module.id,
      key = %module.key,
      config_ports = module.config_ports.len(),
      ports = module.ports.len(),
      "built module"
    );
    modules.push(module);
  }

  info!(
    definitions = defs.resource_definitions.len(),
    modules = modules.len(),
    "loaded install specification"
  );
  Ok((modules, store))
}

fn check_definitions(defs: &ResourceDefinitions) -> Result<(), DocumentError> {
  let mut keys = HashSet::new();
  for def in &defs.resource_definitions {
    if !keys.insert(def.key.as_str()) {
      return Err(DocumentError::Invalid(format!("duplicate resource definition '{}'", def.key)));
    }

    let mut names = HashSet::new();
    for port in &def.config_port {
      let port_type = port.port_type(&def.key)?;
      if let Some(value) = &port.default {
        port.typed_value(&port_type, value, "default", &def.key)?;
      }
      if let Some(value) = &port.fixed_value {
        port.typed_value(&port_type, value, "fixed value", &def.key)?;
      }
      if !names.insert(port.name.as_str()) {
        return Err(DocumentError::Invalid(format!(
          "duplicate config port '{}' in '{}'",
          port.name, def.key
        )));
      }
    }

    let mut names = HashSet::new();
    for port in &def.input_ports {
      check_name("input port", &port.name, &def.key)?;
      if !names.insert(port.name.as_str()) {
        return Err(DocumentError::Invalid(format!(
          "duplicate input port '{}' in '{}'",
          port.name, def.key
        )));
      }
    }
  }
  Ok(())
}

/// Instantiate one definition.
///
/// Value precedence: instance value, then fixed value, then default.
fn build_module(def: &ResourceDefinition, instance: &ResourceInstance) -> Result<Module, DocumentError> {
  let mut module = Module::new(&instance.id, &instance.key);

  for name in instance.config_port.keys() {
    if !def.config_port.iter().any(|p| &p.name == name) {
      return Err(DocumentError::Invalid(format!(
        "instance '{}' sets undeclared config port '{}'",
        instance.id, name
      )));
    }
  }
  for name in instance.input_ports.keys() {
    if !def.input_ports.iter().any(|p| &p.name == name) {
      return Err(DocumentError::Invalid(format!(
        "instance '{}' binds undeclared input port '{}'",
        instance.id, name
      )));
    }
  }

  for port_def in &def.config_port {
    let port_type = port_def.port_type(&def.key)?;
    let mut port = ConfigPort::new(&port_def.name, port_type.clone());
    port.required = port_def.required;
    port.source = port_def.source.clone();

    if let Some(fixed) = &port_def.fixed_value {
      port.fixed_value = Some(port_def.typed_value(&port_type, fixed, "fixed value", &def.key)?);
    }
    let default = match &port_def.default {
      Some(value) => Some(port_def.typed_value(&port_type, value, "default", &def.key)?),
      None => None,
    };

    port.value = match instance.config_port.get(&port_def.name) {
      Some(value) => {
        let value = port_def.typed_value(&port_type, value, "value", &instance.id)?;
        port
          .validate(&value)
          .map_err(|reason| DocumentError::Invalid(format!("config port '{}' in '{}': {}", port.name, instance.id, reason)))?;
        Some(value)
      }
      None => port.fixed_value.clone().or(default),
    };
    module.config_ports.push(port);
  }

  for port_def in &def.input_ports {
    let mut port = Port::new(&port_def.name);
    port.key = port_def.key.clone();
    port.staged = instance.input_ports.get(&port_def.name).cloned();
    module.ports.push(port);
  }

  Ok(module)
}
