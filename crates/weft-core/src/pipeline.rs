//! The per-request authorization pipeline.
//!
//! A request moves through four stages, each consuming the previous context
//! and returning a new one:
//!
//! ```text
//! RequestContext --load--> LoadedContext --decide--> DecidedContext --gate--> Authorized
//! ```
//!
//! The first failing stage ends the request. Storage I/O happens between
//! stages, in the caller; the stages themselves are pure.

use serde_json::Value;

use crate::{
  Error, Result,
  access::{self, Access, Operation},
  admin::is_administrator,
  bindings,
  identity::{self, Identity, VerifiedClaims},
  public_share,
  resource::Resource,
  visibility::{self, VisibilityFilter},
};

// ─── Resolve ─────────────────────────────────────────────────────────────────

/// Stage 1: who is asking.
#[derive(Debug, Clone)]
pub struct RequestContext {
  identity: Option<Identity>,
}

impl RequestContext {
  pub fn resolve(claims: Option<&VerifiedClaims>) -> Result<Self> {
    Ok(Self {
      identity: identity::resolve(claims)?,
    })
  }

  pub fn anonymous() -> Self { Self { identity: None } }

  pub fn identity(&self) -> Option<&Identity> { self.identity.as_ref() }

  /// For operations that need a requester but no resource (create, private
  /// listing).
  pub fn require_identity(&self) -> Result<&Identity> {
    self.identity.as_ref().ok_or(Error::Unauthenticated)
  }

  pub fn visibility(&self, is_public: bool) -> Result<VisibilityFilter> {
    visibility::build(is_public, self.identity.as_ref())
  }

  /// Stage 2: attach the resource snapshot fetched by the caller.
  ///
  /// Anonymous requesters see [`Error::Unauthenticated`] for missing
  /// resources too, so they cannot tell "absent" from "private".
  pub fn load(self, resource: Option<Resource>) -> Result<LoadedContext> {
    match resource {
      Some(resource) => Ok(LoadedContext {
        identity: self.identity,
        resource,
      }),
      None if self.identity.is_none() => Err(Error::Unauthenticated),
      None => Err(Error::NotFound),
    }
  }
}

// ─── Load ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct LoadedContext {
  identity: Option<Identity>,
  resource: Resource,
}

impl LoadedContext {
  /// Stage 3: compute the access flags.
  pub fn decide(self) -> Result<DecidedContext> {
    access::check_anonymous(self.identity.as_ref(), &self.resource)?;
    let access = access::decide(self.identity.as_ref(), &self.resource);
    Ok(DecidedContext {
      identity: self.identity,
      resource: self.resource,
      access,
    })
  }
}

// ─── Decide ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct DecidedContext {
  identity: Option<Identity>,
  resource: Resource,
  access:   Access,
}

impl DecidedContext {
  pub fn identity(&self) -> Option<&Identity> { self.identity.as_ref() }

  pub fn resource(&self) -> &Resource { &self.resource }

  /// Stage 4: gate a plain operation.
  pub fn gate(self, op: Operation) -> Result<Authorized> {
    access::check_operation(
      self.identity.as_ref(),
      self.access,
      op,
      self.resource.kind,
    )?;
    Ok(Authorized {
      identity:  self.identity,
      resource:  self.resource,
      access:    self.access,
      operation: op,
    })
  }

  /// Gate and apply a replacement access list.
  ///
  /// Ownership is checked on the stored resource before the payload is even
  /// parsed.
  pub fn replace_access(self, payload: &Value) -> Result<Authorized> {
    let mut authorized = self.gate(Operation::ShareAccess)?;
    authorized.resource.share.access = bindings::validate(payload)?;
    Ok(authorized)
  }

  /// Gate and apply replacement public-share flags.
  pub fn replace_public(self, payload: &Value) -> Result<Authorized> {
    if self.identity.is_none() {
      return Err(Error::Unauthenticated);
    }
    let next = public_share::apply(
      payload,
      self.access.is_owner,
      is_administrator(self.identity.as_ref()),
      &self.resource.share.public,
    )?;

    let mut resource = self.resource;
    resource.share.public = next;
    Ok(Authorized {
      identity: self.identity,
      resource,
      access: self.access,
      operation: Operation::SharePublic,
    })
  }
}

// ─── Authorized ──────────────────────────────────────────────────────────────

/// A request that passed every gate, carrying the resource as it should be
/// stored (share replacements already applied).
#[derive(Debug, Clone)]
pub struct Authorized {
  identity:  Option<Identity>,
  resource:  Resource,
  access:    Access,
  operation: Operation,
}

impl Authorized {
  pub fn identity(&self) -> Option<&Identity> { self.identity.as_ref() }

  pub fn access(&self) -> Access { self.access }

  pub fn operation(&self) -> Operation { self.operation }

  pub fn resource(&self) -> &Resource { &self.resource }

  pub fn into_resource(self) -> Resource { self.resource }

  /// Apply a field edit to the resource before it is saved.
  ///
  /// Ownership, kind and share state belong to their own gates; an edit that
  /// touches them is discarded.
  pub fn edit(&mut self, f: impl FnOnce(&mut Resource)) {
    let owner_id = self.resource.owner_id.clone();
    let kind = self.resource.kind;
    let share = self.resource.share.clone();
    f(&mut self.resource);
    self.resource.owner_id = owner_id;
    self.resource.kind = kind;
    self.resource.share = share;
  }
}
