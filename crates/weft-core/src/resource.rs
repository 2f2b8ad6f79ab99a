//! Shared resources: workflows, templates and macros.
//!
//! All kinds share one model and are authorized by the same engine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use uuid::Uuid;

use crate::share::ShareState;

/// The kind of a shared resource.
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
pub enum ResourceKind {
  Workflow,
  Template,
  Macro,
}

/// A resource as loaded from the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Resource {
  pub id:         Uuid,
  pub kind:       ResourceKind,
  /// The creator. Never changes; further owners are granted through bindings.
  pub owner_id:   String,
  pub name:       String,
  pub category:   Option<String>,
  /// Opaque definition body (workflow graph, template text, ...).
  pub content:    serde_json::Value,
  pub share:      ShareState,
  /// Incremented by the store on every save.
  pub revision:   u64,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

/// Input to [`crate::store::ResourceStore::create`].
///
/// `id`, `share`, `revision` and the timestamps are always set by the store.
#[derive(Debug, Clone)]
pub struct NewResource {
  pub kind:     ResourceKind,
  pub owner_id: String,
  pub name:     String,
  pub category: Option<String>,
  pub content:  serde_json::Value,
}

impl NewResource {
  /// Convenience constructor with an empty body and no category.
  pub fn new(
    kind: ResourceKind,
    owner_id: impl Into<String>,
    name: impl Into<String>,
  ) -> Self {
    Self {
      kind,
      owner_id: owner_id.into(),
      name: name.into(),
      category: None,
      content: serde_json::Value::Null,
    }
  }

  /// Materialise the resource a store should persist for this input.
  pub fn into_resource(self, id: Uuid, now: DateTime<Utc>) -> Resource {
    Resource {
      id,
      kind: self.kind,
      owner_id: self.owner_id,
      name: self.name,
      category: self.category,
      content: self.content,
      share: ShareState::default(),
      revision: 0,
      created_at: now,
      updated_at: now,
    }
  }
}

/// A private workflow owned by `owner_id`, for tests across the crate.
#[cfg(test)]
pub(crate) fn fixture(owner_id: &str) -> Resource {
  NewResource::new(ResourceKind::Workflow, owner_id, "fixture")
    .into_resource(Uuid::nil(), DateTime::<Utc>::UNIX_EPOCH)
}
