//! Visibility predicate for list queries.
//!
//! Unlike [`crate::access::decide`], this does not judge a single resource; it
//! describes which resources an enumeration may return. Storage backends
//! translate it into their own query language.

use crate::{Error, Result, identity::Identity};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VisibilityFilter {
  /// Publicly shared and not hidden. Hidden resources never appear here, not
  /// even for their owner.
  Public,
  /// Created by the subject, or carrying a `user` binding for it. `mail`
  /// bindings are not consulted.
  Mine { subject_id: String },
}

/// Build the filter for a listing request.
///
/// A private listing needs an identity; without one it fails with
/// [`Error::Unauthenticated`].
pub fn build(is_public: bool, identity: Option<&Identity>) -> Result<VisibilityFilter> {
  if is_public {
    return Ok(VisibilityFilter::Public);
  }
  let identity = identity.ok_or(Error::Unauthenticated)?;
  Ok(VisibilityFilter::Mine {
    subject_id: identity.subject_id.clone(),
  })
}

#[cfg(test)]
impl VisibilityFilter {
  /// In-memory form of the predicate the store evaluates in SQL.
  fn matches(&self, resource: &crate::resource::Resource) -> bool {
    match self {
      Self::Public => resource.share.is_listed(),
      Self::Mine { subject_id } => {
        resource.owner_id == *subject_id
          || resource.share.access.iter().any(|b| {
            b.subject_type == crate::share::SubjectType::User
              && b.subject_id == *subject_id
          })
      }
    }
  }
}
