//! Requester identity, resolved from claims that were verified upstream.
//!
//! Anonymous requesters are represented by the absence of an [`Identity`]
//! (`Option<Identity>`), never by a placeholder value.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::{Error, Result};

/// A global role carried in the token. Only [`Role::Administrator`] changes
/// any access decision.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  PartialOrd,
  Ord,
  Hash,
  Serialize,
  Deserialize,
  Display,
  EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Role {
  Subscriber,
  OrgSubscriber,
  Customer,
  Administrator,
}

/// An authenticated requester.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
  pub subject_id: String,
  pub roles:      BTreeSet<Role>,
  pub mail:       Option<String>,
}

impl Identity {
  pub fn new(subject_id: impl Into<String>) -> Self {
    Self {
      subject_id: subject_id.into(),
      roles:      BTreeSet::new(),
      mail:       None,
    }
  }

  pub fn with_role(mut self, role: Role) -> Self {
    self.roles.insert(role);
    self
  }

  pub fn with_mail(mut self, mail: impl Into<String>) -> Self {
    self.mail = Some(mail.into());
    self
  }

  pub fn has_role(&self, role: Role) -> bool { self.roles.contains(&role) }
}

/// Claims handed over by the token-verification stage.
///
/// Only ever constructed from a token whose signature, algorithm and
/// timestamps have already been checked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifiedClaims {
  pub sub:   String,
  #[serde(default)]
  pub roles: Vec<String>,
  #[serde(default)]
  pub mail:  Option<String>,
}

/// Turn verified claims into an [`Identity`].
///
/// `None` in yields `Ok(None)` (anonymous). Claims that are present but
/// unusable (blank `sub`, an unknown role) fail closed with
/// [`Error::Unauthenticated`] rather than producing a partial identity.
pub fn resolve(claims: Option<&VerifiedClaims>) -> Result<Option<Identity>> {
  let Some(claims) = claims else {
    return Ok(None);
  };

  if claims.sub.trim().is_empty() {
    return Err(Error::Unauthenticated);
  }

  let roles = claims
    .roles
    .iter()
    .map(|r| r.parse::<Role>().map_err(|_| Error::Unauthenticated))
    .collect::<Result<BTreeSet<_>>>()?;

  let mail = claims.mail.clone().filter(|m| !m.is_empty());

  Ok(Some(Identity {
    subject_id: claims.sub.clone(),
    roles,
    mail,
  }))
}
