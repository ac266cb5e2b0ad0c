//! Resource store.
//!
//! Resources are named values keyed by `(key, id)`. Every module in the
//! install specification registers itself as a resource under its definition
//! key and instance id, carrying its config values. Lookups never create
//! entries: an unknown `(key, id)` is always [`LookupError::NotFound`].
//!
//! # Submodules
//!
//! - [`binding`] - Binding module ports to resources

pub mod binding;

pub use binding::{bind_all_ports, bind_port};

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::debug;

use crate::module::ResourceRef;

/// A named value held in the [`ResourceStore`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resource {
  pub key: String,
  pub id: String,
  /// Current config values, in declaration order.
  #[serde(default)]
  pub config_port: Map<String, Value>,
}

impl Resource {
  pub fn new(key: impl Into<String>, id: impl Into<String>) -> Self {
    Self {
      key: key.into(),
      id: id.into(),
      config_port: Map::new(),
    }
  }

  pub fn with_config(mut self, config_port: Map<String, Value>) -> Self {
    self.config_port = config_port;
    self
  }

  pub fn resource_ref(&self) -> ResourceRef {
    ResourceRef::new(&self.key, &self.id)
  }

  /// Read one config property.
  pub fn property(&self, name: &str) -> Option<&Value> {
    self.config_port.get(name)
  }

  /// Compact JSON rendering handed across the engine boundary.
  pub fn to_json_string(&self) -> String {
    // Serializing strings and JSON values cannot fail.
    serde_json::to_string(self).unwrap_or_default()
  }
}

/// Errors from resource lookups.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupError {
  /// No resource is registered under this `(key, id)`.
  #[error("resource not found: key '{key}', id '{id}'")]
  NotFound { key: String, id: String },
}

/// Resources indexed by `(key, id)`.
#[derive(Debug, Default, Clone)]
pub struct ResourceStore {
  resources: BTreeMap<(String, String), Resource>,
}

impl ResourceStore {
  pub fn new() -> Self {
    Self::default()
  }

  /// Register a resource.
  ///
  /// Returns `false` and leaves the store unchanged if `(key, id)` is taken.
  pub fn register(&mut self, resource: Resource) -> bool {
    let slot = (resource.key.clone(), resource.id.clone());
    if self.resources.contains_key(&slot) {
      return false;
    }
    debug!(key = %resource.key, id = %resource.id, "registering resource");
    self.resources.insert(slot, resource);
    true
  }

  /// Look up a resource by `(key, id)`.
  pub fn lookup(&self, key: &str, id: &str) -> Result<&Resource, LookupError> {
    self
      .resources
      .get(&(key.to_string(), id.to_string()))
      .ok_or_else(|| LookupError::NotFound {
        key: key.to_string(),
        id: id.to_string(),
      })
  }

  pub fn lookup_ref(&self, target: &ResourceRef) -> Result<&Resource, LookupError> {
    self.lookup(&target.key, &target.id)
  }

  pub fn contains(&self, key: &str, id: &str) -> bool {
    self.lookup(key, id).is_ok()
  }

  /// Overwrite config values of an existing resource.
  ///
  /// Properties not named in `values` keep their current value.
  pub fn override_config(&mut self, key: &str, id: &str, values: Map<String, Value>) -> Result<(), LookupError> {
    let resource = self
      .resources
      .get_mut(&(key.to_string(), id.to_string()))
      .ok_or_else(|| LookupError::NotFound {
        key: key.to_string(),
        id: id.to_string(),
      })?;

    debug!(key, id, count = values.len(), "overriding resource config");
    for (name, value) in values {
      resource.config_port.insert(name, value);
    }
    Ok(())
  }

  pub fn len(&self) -> usize {
    self.resources.len()
  }

  pub fn is_empty(&self) -> bool {
    self.resources.is_empty()
  }

  pub fn iter(&self) -> impl Iterator<Item = &Resource> {
    self.resources.values()
  }
}
