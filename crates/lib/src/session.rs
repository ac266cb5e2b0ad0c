//! Configuration session and the engine contract.
//!
//! [`ConfigEngine`] is the operation set a host (CLI, GUI, foreign-language
//! binding) drives; [`Session`] is the in-process implementation.
//!
//! # Protocol
//!
//! 1. `init` loads both documents. The cursor starts before the first module.
//! 2. Discovery pass: `next` through the modules reading `config_port_types`.
//! 3. `reinit` rewinds the cursor. Committed values are kept.
//! 4. Value pass: for each module read `config_ports`, edit the text, commit it
//!    with `set_config_ports`, then `bind_ports_of_current`.
//! 5. `write_install_file` persists the result.
//!
//! Discovery is informational: the value pass works without it.

use std::path::Path;

use tracing::{debug, info};

use crate::codec;
use crate::cursor::{CursorState, ModuleCursor};
use crate::document::{self, DocumentError, InstallSpec, ResourceDefinitions};
use crate::error::EngineError;
use crate::install::{InstallError, InstallScript, WriteOptions};
use crate::logger::{self, Severity};
use crate::module::Module;
use crate::resource::{self, Resource, ResourceStore};

/// Operations of the configuration engine.
///
/// Cursor-dependent operations fail with a user error when the cursor is on a
/// sentinel position.
pub trait ConfigEngine {
  /// Load the resource-definition and install-specification documents.
  ///
  /// On failure the previous state is left untouched.
  fn init(&mut self, resource_defs: &Path, install_spec: &Path) -> Result<(), EngineError>;

  fn has_next(&self) -> bool;

  fn has_prev(&self) -> bool;

  fn next(&mut self) -> bool;

  fn prev(&mut self) -> bool;

  /// Rewind the cursor to before the first module.
  fn reinit(&mut self);

  fn current_module(&self) -> Result<&Module, EngineError>;

  /// `name:type` lines for the current module.
  fn config_port_types(&self) -> Result<String, EngineError>;

  /// `name=value` lines for the current module.
  fn config_ports(&self) -> Result<String, EngineError>;

  /// Parse edited value text and commit it onto the current module.
  fn set_config_ports(&mut self, text: &str) -> Result<(), EngineError>;

  /// Bind a port of the current module to the resource `(key, id)`.
  fn bind_port(&mut self, port: &str, key: &str, id: &str) -> Result<(), EngineError>;

  /// Bind every port of the current module from its staged pairs.
  ///
  /// Not transactional: bindings made before a failure are kept.
  fn bind_ports_of_current(&mut self) -> Result<(), EngineError>;

  fn get_resource(&self, key: &str, id: &str) -> Result<&Resource, EngineError>;

  /// The resource registered for the current module.
  fn current_resource(&self) -> Result<&Resource, EngineError>;

  fn write_install_file(&self, path: &Path) -> Result<(), EngineError>;
}

/// In-process configuration engine.
#[derive(Debug, Default)]
pub struct Session {
  modules: Vec<Module>,
  store: ResourceStore,
  cursor: ModuleCursor,
  write_options: WriteOptions,
}

impl Session {
  /// An empty session; call [`ConfigEngine::init`] to load documents.
  pub fn new() -> Self {
    Self::default()
  }

  /// Build a session from already-parsed documents.
  pub fn from_documents(defs: &ResourceDefinitions, spec: &InstallSpec) -> Result<Self, EngineError> {
    let (modules, store) = document::build(defs, spec).map_err(document_error)?;
    Ok(Self {
      cursor: ModuleCursor::new(modules.len()),
      modules,
      store,
      write_options: WriteOptions::default(),
    })
  }

  pub fn with_write_options(mut self, options: WriteOptions) -> Self {
    self.write_options = options;
    self
  }

  pub fn set_write_options(&mut self, options: WriteOptions) {
    self.write_options = options;
  }

  /// All modules in declaration order.
  pub fn modules(&self) -> &[Module] {
    &self.modules
  }

  pub fn store(&self) -> &ResourceStore {
    &self.store
  }

  pub fn position(&self) -> CursorState {
    self.cursor.position()
  }

  fn current_index(&self) -> Result<usize, EngineError> {
    self.cursor.index().ok_or_else(|| EngineError::user("no current module"))
  }

  fn load(resource_defs: &Path, install_spec: &Path) -> Result<Self, EngineError> {
    let defs = ResourceDefinitions::load(resource_defs).map_err(document_error)?;
    let spec = InstallSpec::load(install_spec).map_err(document_error)?;
    Self::from_documents(&defs, &spec)
  }

  /// Parse and apply value text on the current module, then push the committed
  /// values into its resource so source lookups see them.
  fn commit_values(&mut self, text: &str) -> Result<(), EngineError> {
    let index = self.current_index()?;
    let module = &mut self.modules[index];
    let parsed = codec::parse(module, text)?;
    codec::apply_values(module, &parsed)?;

    debug!(module = %module.id, ports = parsed.len(), "committed config ports");
    self.store.override_config(&module.key, &module.id, module.config_values())?;
    Ok(())
  }
}

impl ConfigEngine for Session {
  fn init(&mut self, resource_defs: &Path, install_spec: &Path) -> Result<(), EngineError> {
    api_entry("init");
    let result = Session::load(resource_defs, install_spec);

    match api_exit("init", result) {
      Ok(loaded) => {
        info!(
          resource_defs = %resource_defs.display(),
          install_spec = %install_spec.display(),
          modules = loaded.modules.len(),
          "session initialized"
        );
        self.modules = loaded.modules;
        self.store = loaded.store;
        self.cursor = loaded.cursor;
        Ok(())
      }
      Err(e) => Err(e.normalize()),
    }
  }

  fn has_next(&self) -> bool {
    api_entry("has_next");
    self.cursor.has_next()
  }

  fn has_prev(&self) -> bool {
    api_entry("has_prev");
    self.cursor.has_prev()
  }

  fn next(&mut self) -> bool {
    api_entry("next");
    let moved = self.cursor.next();
    debug!(position = ?self.cursor.position(), moved, "cursor next");
    moved
  }

  fn prev(&mut self) -> bool {
    api_entry("prev");
    let moved = self.cursor.prev();
    debug!(position = ?self.cursor.position(), moved, "cursor prev");
    moved
  }

  fn reinit(&mut self) {
    api_entry("reinit");
    self.cursor.reset();
  }

  fn current_module(&self) -> Result<&Module, EngineError> {
    let index = self.current_index()?;
    Ok(&self.modules[index])
  }

  fn config_port_types(&self) -> Result<String, EngineError> {
    api_entry("get_config_port_types_as_string");
    let result = self.current_module().map(codec::types_as_string);
    api_exit("get_config_port_types_as_string", result)
  }

  fn config_ports(&self) -> Result<String, EngineError> {
    api_entry("get_config_ports_as_string");
    let result = self.current_module().map(codec::values_as_string);
    api_exit("get_config_ports_as_string", result)
  }

  fn set_config_ports(&mut self, text: &str) -> Result<(), EngineError> {
    api_entry("set_config_ports_from_string");
    let result = self.commit_values(text);
    api_exit("set_config_ports_from_string", result)
  }

  fn bind_port(&mut self, port: &str, key: &str, id: &str) -> Result<(), EngineError> {
    api_entry("set_ports");
    let result = self
      .current_index()
      .and_then(|index| resource::bind_port(&self.store, &mut self.modules[index], port, key, id));
    api_exit("set_ports", result)
  }

  fn bind_ports_of_current(&mut self) -> Result<(), EngineError> {
    api_entry("set_ports_of_current");
    let result = self.current_index().and_then(|index| {
      let count = resource::bind_all_ports(&self.store, &mut self.modules[index])?;
      debug!(module = %self.modules[index].id, count, "bound ports");
      Ok(())
    });
    api_exit("set_ports_of_current", result)
  }

  fn get_resource(&self, key: &str, id: &str) -> Result<&Resource, EngineError> {
    api_entry("get_resource");
    let result = self.store.lookup(key, id).map_err(EngineError::from);
    api_exit("get_resource", result)
  }

  fn current_resource(&self) -> Result<&Resource, EngineError> {
    api_entry("get_current_resource");
    let result = self
      .current_module()
      .and_then(|module| self.store.lookup_ref(&module.resource_ref()).map_err(EngineError::from));
    api_exit("get_current_resource", result)
  }

  fn write_install_file(&self, path: &Path) -> Result<(), EngineError> {
    api_entry("write_install_file");
    let result = InstallScript::from_modules(&self.modules, &self.store)
      .and_then(|script| script.write(path, self.write_options))
      .map_err(install_error);
    api_exit("write_install_file", result).map_err(EngineError::normalize)
  }
}

/// Map a document failure onto the boundary taxonomy.
fn document_error(err: DocumentError) -> EngineError {
  if err.is_system() {
    EngineError::system(err.to_string())
  } else {
    EngineError::user(err.to_string())
  }
}

fn install_error(err: InstallError) -> EngineError {
  EngineError::system(err.to_string())
}

fn api_entry(name: &str) {
  logger::log_api_call(Severity::Debug, name);
}

fn api_exit<T>(name: &str, result: Result<T, EngineError>) -> Result<T, EngineError> {
  if let Err(e) = &result {
    logger::log_api_call(
      Severity::Error,
      &format!("{} failed ({} error): {}", name, e.status(), e.message()),
    );
  }
  result
}
