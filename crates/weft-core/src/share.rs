//! Share state: the plain value describing who may see and change a resource.
//!
//! Storage backends translate to and from these types; none of the access
//! logic lives on them.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

// ─── Enumerations ────────────────────────────────────────────────────────────

/// Privilege granted by a binding: `owner > contributor > reader`.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Serialize,
  Deserialize,
  Display,
  EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum AccessRole {
  Owner,
  Contributor,
  Reader,
}

/// What a binding's `subjectId` refers to.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Default,
  Serialize,
  Deserialize,
  Display,
  EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum SubjectType {
  /// A user id, compared against the token `sub`.
  #[default]
  User,
  /// A mail address, compared against the token `mail`.
  Mail,
  /// Accepted on input but never matched: there is no membership resolver.
  Group,
}

// ─── Bindings ────────────────────────────────────────────────────────────────

/// One entry of a resource's access list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleBinding {
  pub subject_id:   String,
  pub subject_type: SubjectType,
  pub role:         AccessRole,
}

impl RoleBinding {
  pub fn user(subject_id: impl Into<String>, role: AccessRole) -> Self {
    Self {
      subject_id: subject_id.into(),
      subject_type: SubjectType::User,
      role,
    }
  }

  pub fn mail(address: impl Into<String>, role: AccessRole) -> Self {
    Self {
      subject_id: address.into(),
      subject_type: SubjectType::Mail,
      role,
    }
  }
}

// ─── Public exposure ─────────────────────────────────────────────────────────

/// Public-exposure flags.
///
/// Replaced wholesale on every update, so `hidden` and `writeable` may be
/// absent after a caller omits them. Absent means `false`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicShare {
  pub enabled:   bool,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub hidden:    Option<bool>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub writeable: Option<bool>,
}

impl PublicShare {
  /// The flags every resource is created with.
  pub fn disabled() -> Self {
    Self {
      enabled:   false,
      hidden:    Some(false),
      writeable: Some(false),
    }
  }

  pub fn is_hidden(&self) -> bool { self.hidden.unwrap_or(false) }

  pub fn is_writeable(&self) -> bool { self.writeable.unwrap_or(false) }
}

impl Default for PublicShare {
  fn default() -> Self { Self::disabled() }
}

// ─── ShareState ──────────────────────────────────────────────────────────────

/// The complete `share` field of a resource.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShareState {
  pub public: PublicShare,
  #[serde(default)]
  pub access: Vec<RoleBinding>,
}

impl ShareState {
  pub fn is_public(&self) -> bool { self.public.enabled }

  pub fn is_public_writeable(&self) -> bool {
    self.public.enabled && self.public.is_writeable()
  }

  /// Public and not hidden, i.e. eligible for public listings.
  pub fn is_listed(&self) -> bool {
    self.public.enabled && !self.public.is_hidden()
  }
}
