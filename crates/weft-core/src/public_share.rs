//! Gate for replacing a resource's public-exposure flags.
//!
//! The submitted object replaces the stored flags wholesale. Flags the
//! caller leaves out are stored as absent, not carried over.

use serde_json::{Map, Value};

use crate::{Error, FieldError, Result, ValidationError, share::PublicShare};

/// Validate and authorize a public-share payload, returning the flags to
/// store.
///
/// Checks, in order:
/// 1. the payload is an object with a boolean `enabled` (400);
/// 2. the requester owns the resource (403, "owner");
/// 3. a visible (`hidden != true`) share may only be made writeable by an
///    administrator (403, "administrator").
pub fn apply(
  payload: &Value,
  is_owner: bool,
  is_administrator: bool,
  current: &PublicShare,
) -> Result<PublicShare> {
  let next = parse(payload)?;

  if !is_owner {
    return Err(Error::Forbidden(
      "only an owner can change public sharing".into(),
    ));
  }

  if next.writeable == Some(true)
    && next.hidden != Some(true)
    && !is_administrator
  {
    return Err(Error::Forbidden(
      "only an administrator can make a listed public share writeable".into(),
    ));
  }

  tracing::debug!(previous = ?current, next = ?next, "public share replaced");
  Ok(next)
}

fn parse(payload: &Value) -> Result<PublicShare, ValidationError> {
  let Some(obj) = payload.as_object() else {
    return Err(ValidationError::single(FieldError::new(
      "public",
      "must be an object",
    )));
  };

  let mut errors = Vec::new();

  let enabled = match obj.get("enabled") {
    Some(Value::Bool(b)) => Some(*b),
    None => {
      errors.push(FieldError::new("enabled", "is required"));
      None
    }
    Some(_) => {
      errors.push(FieldError::new("enabled", "must be a boolean"));
      None
    }
  };
  let hidden = optional_flag(obj, "hidden", &mut errors);
  let writeable = optional_flag(obj, "writeable", &mut errors);

  match enabled {
    Some(enabled) if errors.is_empty() => Ok(PublicShare {
      enabled,
      hidden,
      writeable,
    }),
    _ => Err(ValidationError { errors }),
  }
}

/// `null` is treated like an absent key.
fn optional_flag(
  obj: &Map<String, Value>,
  key: &str,
  errors: &mut Vec<FieldError>,
) -> Option<bool> {
  match obj.get(key) {
    None | Some(Value::Null) => None,
    Some(Value::Bool(b)) => Some(*b),
    Some(_) => {
      errors.push(FieldError::new(key, "must be a boolean"));
      None
    }
  }
}
