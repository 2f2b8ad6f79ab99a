//! The `ResourceStore` trait and supporting query types.
//!
//! The trait is implemented by storage backends (e.g. `weft-store-sqlite`).
//! Higher layers (`weft-api`) depend on this abstraction, not on any concrete
//! backend.

use std::future::Future;

use uuid::Uuid;

use crate::{
  resource::{NewResource, Resource, ResourceKind},
  visibility::VisibilityFilter,
};

// ─── Query type ──────────────────────────────────────────────────────────────

/// Default page size for [`ResourceStore::query`].
pub const DEFAULT_LIMIT: usize = 100;

/// Parameters for [`ResourceStore::query`].
#[derive(Debug, Clone)]
pub struct ResourceQuery {
  /// Which resources the requester may enumerate.
  pub visibility: VisibilityFilter,
  /// Restrict to a single resource kind.
  pub kind:       Option<ResourceKind>,
  pub limit:      Option<usize>,
  pub offset:     Option<usize>,
}

impl ResourceQuery {
  pub fn new(visibility: VisibilityFilter) -> Self {
    Self {
      visibility,
      kind: None,
      limit: None,
      offset: None,
    }
  }
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over a Weft resource store backend.
///
/// `save` replaces the whole document. Two writers that both load and then
/// save race, and the later save wins outright. Callers that want to detect
/// this pass the revision they loaded as `expected_revision`.
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes (e.g. tokio with `axum`).
pub trait ResourceStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Persist a new resource with default (private, unshared) share state.
  fn create(
    &self,
    input: NewResource,
  ) -> impl Future<Output = Result<Resource, Self::Error>> + Send + '_;

  /// Retrieve a resource by id. Returns `None` if not found.
  fn load_by_id(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Resource>, Self::Error>> + Send + '_;

  /// Replace the stored document with `resource`, bumping its revision and
  /// `updated_at`. `owner_id`, `kind` and `created_at` are never rewritten.
  ///
  /// Returns the stored resource, or `None` if no row was written: the
  /// resource is gone, or `expected_revision` was given and no longer matches.
  fn save(
    &self,
    resource: Resource,
    expected_revision: Option<u64>,
  ) -> impl Future<Output = Result<Option<Resource>, Self::Error>> + Send + '_;

  /// Delete a resource together with its bindings. Returns `false` if it did
  /// not exist.
  fn delete(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// List resources matching `query`, most recently updated first.
  fn query<'a>(
    &'a self,
    query: &'a ResourceQuery,
  ) -> impl Future<Output = Result<Vec<Resource>, Self::Error>> + Send + 'a;
}
