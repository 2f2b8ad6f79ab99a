//! The access-decision engine.
//!
//! [`decide`] maps a requester and a resource snapshot to the three flags
//! `is_owner`, `is_writeable` and `is_readable`. [`check_anonymous`] and
//! [`check_operation`] layer the per-operation gate and the 401/403 ordering
//! on top of it.
//!
//! Both are pure and synchronous; all state comes from the arguments.

use serde::Serialize;

use crate::{
  Error, Result,
  admin::is_administrator,
  identity::Identity,
  resource::{Resource, ResourceKind},
  share::{AccessRole, RoleBinding, ShareState, SubjectType},
};

// ─── Decision ────────────────────────────────────────────────────────────────

/// What a requester may do with one resource.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Access {
  pub is_owner:     bool,
  pub is_writeable: bool,
  pub is_readable:  bool,
}

/// The first binding in the access list that applies to `identity`.
///
/// `user` bindings match on subject id and `mail` bindings on the token's
/// mail claim. `group` bindings never match.
pub fn find_binding<'a>(
  identity: &Identity,
  share: &'a ShareState,
) -> Option<&'a RoleBinding> {
  share.access.iter().find(|b| match b.subject_type {
    SubjectType::User => b.subject_id == identity.subject_id,
    SubjectType::Mail => identity.mail.as_deref() == Some(b.subject_id.as_str()),
    SubjectType::Group => false,
  })
}

/// Compute the access flags for `identity` (or an anonymous requester) on
/// `resource`.
pub fn decide(identity: Option<&Identity>, resource: &Resource) -> Access {
  let share = &resource.share;
  let role = identity
    .and_then(|i| find_binding(i, share))
    .map(|b| b.role);

  let is_owner = identity.is_some_and(|i| i.subject_id == resource.owner_id)
    || role == Some(AccessRole::Owner);

  let is_writeable = is_owner
    || role == Some(AccessRole::Contributor)
    || share.is_public_writeable();

  // Administrators read everything; the override stops at reading.
  let is_readable = is_writeable
    || role == Some(AccessRole::Reader)
    || share.is_public()
    || is_administrator(identity);

  Access {
    is_owner,
    is_writeable,
    is_readable,
  }
}

// ─── Operations ──────────────────────────────────────────────────────────────

/// A request against a single resource, classified by the flag it needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
  /// Fetch by id. Needs `is_readable`.
  Read,
  /// Category or content mutation. Needs `is_writeable`.
  Write,
  /// Needs `is_owner`.
  Delete,
  /// Replace `share.access`. Needs `is_owner`.
  ShareAccess,
  /// Replace `share.public`. Needs `is_owner` (plus the public-share gate).
  SharePublic,
}

impl Operation {
  pub fn permitted(self, access: Access) -> bool {
    match self {
      Self::Read => access.is_readable,
      Self::Write => access.is_writeable,
      Self::Delete | Self::ShareAccess | Self::SharePublic => access.is_owner,
    }
  }

  fn denial(self, kind: ResourceKind) -> String {
    match self {
      Self::Read => format!("you do not have access to this {kind}"),
      Self::Write => format!("you do not have write access to this {kind}"),
      Self::Delete => format!("only an owner can delete this {kind}"),
      Self::ShareAccess => {
        format!("only an owner can change who this {kind} is shared with")
      }
      Self::SharePublic => {
        format!("only an owner can change public sharing of this {kind}")
      }
    }
  }
}

// ─── Gates ───────────────────────────────────────────────────────────────────

/// Refuse anonymous requesters outright on non-public resources.
///
/// Runs before any binding is looked at, so an anonymous requester can only
/// ever see a 401 for a private resource.
pub fn check_anonymous(
  identity: Option<&Identity>,
  resource: &Resource,
) -> Result<()> {
  if identity.is_none() && !resource.share.is_public() {
    return Err(Error::Unauthenticated);
  }
  Ok(())
}

/// Gate `op` on already-computed flags.
pub fn check_operation(
  identity: Option<&Identity>,
  access: Access,
  op: Operation,
  kind: ResourceKind,
) -> Result<()> {
  if op.permitted(access) {
    return Ok(());
  }
  match identity {
    None => Err(Error::Unauthenticated),
    Some(_) => Err(Error::Forbidden(op.denial(kind))),
  }
}
