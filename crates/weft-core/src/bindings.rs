//! Validation of a submitted access list.
//!
//! The list is checked as a whole: one bad entry rejects everything, and
//! every problem found is reported together. Valid lists are returned exactly
//! as submitted. Duplicates are kept and there is no size cap.

use serde_json::{Map, Value};

use crate::{
  FieldError, ValidationError,
  share::{AccessRole, RoleBinding, SubjectType},
};

const SUBJECT_ID: &str = "subjectId";
const SUBJECT_TYPE: &str = "subjectType";
const ROLE: &str = "role";

/// Validate an access-list payload.
///
/// An empty array is valid and clears every binding. A missing
/// `subjectType` defaults to `user`; an explicit `null` is rejected.
pub fn validate(payload: &Value) -> Result<Vec<RoleBinding>, ValidationError> {
  let Some(entries) = payload.as_array() else {
    return Err(ValidationError::single(FieldError::new(
      "access",
      "must be an array",
    )));
  };

  let mut bindings = Vec::with_capacity(entries.len());
  let mut errors = Vec::new();

  for (i, entry) in entries.iter().enumerate() {
    match entry.as_object() {
      Some(obj) => match validate_entry(i, obj) {
        Ok(b) => bindings.push(b),
        Err(mut errs) => errors.append(&mut errs),
      },
      None => errors.push(FieldError::at(i, "entry", "must be an object")),
    }
  }

  if errors.is_empty() {
    Ok(bindings)
  } else {
    Err(ValidationError { errors })
  }
}

fn validate_entry(
  i: usize,
  obj: &Map<String, Value>,
) -> Result<RoleBinding, Vec<FieldError>> {
  let mut errors = Vec::new();

  let subject_id = match obj.get(SUBJECT_ID) {
    Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
    _ => {
      errors.push(FieldError::at(i, SUBJECT_ID, "must be a non-empty string"));
      None
    }
  };

  let subject_type = match obj.get(SUBJECT_TYPE) {
    None => Some(SubjectType::default()),
    Some(Value::String(s)) => s.parse::<SubjectType>().ok(),
    Some(_) => None,
  };
  if subject_type.is_none() {
    errors.push(FieldError::at(
      i,
      SUBJECT_TYPE,
      "must be one of user, mail, group",
    ));
  }

  let role = match obj.get(ROLE) {
    Some(Value::String(s)) => s.parse::<AccessRole>().ok(),
    _ => None,
  };
  if role.is_none() {
    errors.push(FieldError::at(
      i,
      ROLE,
      "must be one of owner, contributor, reader",
    ));
  }

  match (subject_id, subject_type, role) {
    (Some(subject_id), Some(subject_type), Some(role)) => Ok(RoleBinding {
      subject_id,
      subject_type,
      role,
    }),
    _ => Err(errors),
  }
}
