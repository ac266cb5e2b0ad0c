//! Boundary error type for the configuration engine.
//!
//! Every fallible engine operation reports exactly one of success,
//! [`Status::UserError`] or [`Status::SystemError`] to its caller. Lower layers
//! keep their own error types ([`CodecError`], [`LookupError`]) which are carried
//! unmodified inside [`EngineError`] until a caller asks for the final status.

use std::fmt;

use thiserror::Error;

use crate::codec::CodecError;
use crate::resource::LookupError;

/// Errors surfaced by [`crate::session::ConfigEngine`] operations.
#[derive(Debug, Error)]
pub enum EngineError {
  /// Bad or inconsistent input, fixable by the caller.
  #[error("user error: {0}")]
  User(String),

  /// Failure of the engine or its environment (I/O, broken invariant).
  #[error("system error: {0}")]
  System(String),

  /// Malformed or stale port text.
  #[error(transparent)]
  Codec(#[from] CodecError),

  /// Reference to a resource that is not registered.
  #[error(transparent)]
  Lookup(#[from] LookupError),
}

impl EngineError {
  pub fn user(message: impl Into<String>) -> Self {
    EngineError::User(message.into())
  }

  pub fn system(message: impl Into<String>) -> Self {
    EngineError::System(message.into())
  }

  /// Collapse this error onto the two-way boundary taxonomy.
  pub fn status(&self) -> Status {
    match self {
      EngineError::System(_) => Status::SystemError,
      EngineError::User(_) | EngineError::Codec(_) | EngineError::Lookup(_) => Status::UserError,
    }
  }

  /// The human-readable message without the taxonomy prefix.
  pub fn message(&self) -> String {
    match self {
      EngineError::User(msg) | EngineError::System(msg) => msg.clone(),
      EngineError::Codec(e) => e.to_string(),
      EngineError::Lookup(e) => e.to_string(),
    }
  }

  /// Normalize into exactly `User` or `System`, keeping the message.
  pub fn normalize(self) -> Self {
    match self.status() {
      Status::SystemError => EngineError::System(self.message()),
      _ => EngineError::User(self.message()),
    }
  }
}

/// Outcome reported across the engine boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
  Ok,
  UserError,
  SystemError,
}

impl Status {
  /// Numeric status code: `0` on success, `-1` on any error.
  pub fn code(self) -> i32 {
    match self {
      Status::Ok => 0,
      Status::UserError | Status::SystemError => -1,
    }
  }

  pub fn as_str(self) -> &'static str {
    match self {
      Status::Ok => "ok",
      Status::UserError => "user",
      Status::SystemError => "system",
    }
  }
}

impl fmt::Display for Status {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl<T> From<&Result<T, EngineError>> for Status {
  fn from(result: &Result<T, EngineError>) -> Self {
    match result {
      Ok(_) => Status::Ok,
      Err(e) => e.status(),
    }
  }
}
