//! Binding module ports to resources.
//!
//! A port binding is only recorded once its `(key, id)` resolves in the
//! [`ResourceStore`]. [`bind_all_ports`] is NOT transactional: it stops at the
//! first port that fails to bind and keeps the bindings it already made in
//! that call. Callers that depend on partial binding rely on this.

use tracing::{debug, warn};

use super::ResourceStore;
use crate::error::EngineError;
use crate::module::{Module, ResourceRef};

/// Bind one named port of `module` to the resource `(key, id)`.
///
/// Overwrites any existing binding on that port.
pub fn bind_port(store: &ResourceStore, module: &mut Module, port: &str, key: &str, id: &str) -> Result<(), EngineError> {
  let module_id = module.id.clone();
  let target = module
    .port_mut(port)
    .ok_or_else(|| EngineError::user(format!("module '{}' has no port named '{}'", module_id, port)))?;

  store.lookup(key, id)?;

  if let Some(expected) = &target.key {
    if expected != key {
      return Err(EngineError::user(format!(
        "port '{}' on module '{}' accepts '{}' resources, not '{}'",
        port, module_id, expected, key
      )));
    }
  }

  debug!(module = %module_id, port, key, id, "binding port");
  target.bound = Some(ResourceRef::new(key, id));
  Ok(())
}

/// Bind every port of `module` using its staged `(key, id)` pairs.
///
/// Ports with no staged pair keep an existing binding. Returns the number of
/// bound ports. On failure, ports earlier in declaration order stay bound.
pub fn bind_all_ports(store: &ResourceStore, module: &mut Module) -> Result<usize, EngineError> {
  let staged: Vec<(String, Option<ResourceRef>, bool)> = module
    .ports
    .iter()
    .map(|p| (p.name.clone(), p.staged.clone(), p.bound.is_some()))
    .collect();

  let mut bound = 0;
  for (name, target, already_bound) in staged {
    let Some(target) = target else {
      if already_bound {
        bound += 1;
        continue;
      }
      warn!(module = %module.id, port = %name, bound, "port has no staged binding");
      return Err(EngineError::user(format!(
        "port '{}' on module '{}' has no staged binding",
        name, module.id
      )));
    };
    if let Err(e) = bind_port(store, module, &name, &target.key, &target.id) {
      warn!(module = %module.id, port = %name, bound, error = %e, "stopping after partial bind");
      return Err(e);
    }
    bound += 1;
  }
  Ok(bound)
}
