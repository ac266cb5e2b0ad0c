//! cfgengine-lib: Core types and logic for the configuration engine
//!
//! This crate drives a resumable install-configuration workflow:
//! - `Session`: owns the modules, the resource store and the cursor
//! - `Module`: an installable unit with typed config ports and connection ports
//! - `codec`: line-oriented text form of a module's config ports
//! - `ResourceStore`: resources keyed by `(key, id)`, with lookups and overrides
//! - `install`: renders the finalized modules into an install script

pub mod codec;
pub mod consts;
pub mod cursor;
pub mod document;
pub mod error;
pub mod install;
pub mod logger;
pub mod module;
pub mod resource;
pub mod session;

pub use error::{EngineError, Status};
pub use session::{ConfigEngine, Session};
