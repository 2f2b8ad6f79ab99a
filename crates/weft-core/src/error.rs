//! Error types for `weft-core`.
//!
//! Every variant of [`Error`] is a terminal outcome of a single decision
//! evaluation. Nothing in this crate retries or partially applies a decision.

use std::fmt;

use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// No identity was presented and the resource is not public.
  #[error("authentication required")]
  Unauthenticated,

  /// An identity was presented but lacks the privilege for the operation.
  #[error("{0}")]
  Forbidden(String),

  #[error("invalid payload: {0}")]
  Validation(#[from] ValidationError),

  #[error("resource not found")]
  NotFound,
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

// ─── Validation ──────────────────────────────────────────────────────────────

/// A single problem found in a submitted payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
  /// Position of the offending entry when the payload is a list.
  #[serde(skip_serializing_if = "Option::is_none")]
  pub index:   Option<usize>,
  pub field:   String,
  pub message: String,
}

impl FieldError {
  pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
    Self {
      index:   None,
      field:   field.into(),
      message: message.into(),
    }
  }

  pub fn at(
    index: usize,
    field: impl Into<String>,
    message: impl Into<String>,
  ) -> Self {
    Self {
      index: Some(index),
      ..Self::new(field, message)
    }
  }
}

impl fmt::Display for FieldError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self.index {
      Some(i) => write!(f, "entry {i}: {} {}", self.field, self.message),
      None => write!(f, "{} {}", self.field, self.message),
    }
  }
}

/// A rejected payload. Always holds at least one [`FieldError`]; the payload
/// as a whole is refused, never applied in part.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationError {
  pub errors: Vec<FieldError>,
}

impl ValidationError {
  pub fn single(error: FieldError) -> Self { Self { errors: vec![error] } }
}

impl fmt::Display for ValidationError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    for (i, e) in self.errors.iter().enumerate() {
      if i > 0 {
        f.write_str("; ")?;
      }
      write!(f, "{e}")?;
    }
    Ok(())
  }
}

impl std::error::Error for ValidationError {}
