//! Handlers for the per-kind resource collections.
//!
//! `{collection}` is the plural of a [`ResourceKind`]: `workflows`,
//! `templates` or `macros`.
//!
//! | Method   | Path | Gate |
//! |----------|------|------|
//! | `GET`    | `/{collection}[?public=true]` | identity unless `public` |
//! | `POST`   | `/{collection}` | identity |
//! | `GET`    | `/{collection}/{id}` | readable |
//! | `PUT`    | `/{collection}/{id}` | writeable |
//! | `DELETE` | `/{collection}/{id}` | owner |
//! | `POST`   | `/{collection}/{id}/category` | writeable |
//! | `POST`   | `/{collection}/{id}/share/access` | owner, then payload |
//! | `POST`   | `/{collection}/{id}/share/public` | payload, owner, administrator |

use axum::{
  Json,
  extract::{
    Path, Query, State,
    rejection::{JsonRejection, QueryRejection},
  },
  http::{HeaderMap, StatusCode, header},
  response::IntoResponse,
};
use serde::Deserialize;
use serde_json::{Value, json};
use uuid::Uuid;
use weft_core::{
  access::Operation,
  pipeline::{Authorized, DecidedContext, RequestContext},
  resource::{NewResource, Resource, ResourceKind},
  store::{ResourceQuery, ResourceStore},
};

use crate::{
  AppState,
  auth::Requester,
  error::ApiError,
  etag::{compute_etag, expected_revision},
};

// ─── Helpers ─────────────────────────────────────────────────────────────────

/// Map a collection path segment onto its resource kind.
fn collection_kind(collection: &str) -> Result<ResourceKind, ApiError> {
  collection
    .strip_suffix('s')
    .and_then(|k| k.parse().ok())
    .ok_or(ApiError::NotFound)
}

fn requester_id(ctx: &RequestContext) -> Option<String> {
  ctx.identity().map(|i| i.subject_id.clone())
}

/// Load the resource named by the path and run it through the pipeline up to
/// the access decision.
///
/// An id that is not a UUID, or that names a resource of another kind, is
/// treated exactly like a missing resource.
async fn decide<S>(
  state: &AppState<S>,
  ctx: RequestContext,
  collection: &str,
  id: &str,
) -> Result<DecidedContext, ApiError>
where
  S: ResourceStore + 'static,
{
  let kind = collection_kind(collection)?;
  let requester = requester_id(&ctx);

  let resource = match Uuid::parse_str(id) {
    Ok(id) => state.store.load_by_id(id).await.map_err(ApiError::store)?,
    Err(_) => None,
  }
  .filter(|r| r.kind == kind);

  ctx.load(resource).and_then(|l| l.decide()).map_err(|e| {
    tracing::warn!(%kind, id, ?requester, error = %e, "request denied");
    ApiError::from(e)
  })
}

/// Run a gate on the decided context and log the outcome.
fn authorize(
  decided: DecidedContext,
  gate: impl FnOnce(DecidedContext) -> weft_core::Result<Authorized>,
) -> Result<Authorized, ApiError> {
  let id = decided.resource().id;
  let requester = decided.identity().map(|i| i.subject_id.clone());
  match gate(decided) {
    Ok(authorized) => {
      tracing::debug!(
        %id,
        ?requester,
        op = ?authorized.operation(),
        access = ?authorized.access(),
        "access granted"
      );
      Ok(authorized)
    }
    Err(weft_core::Error::Validation(v)) => {
      tracing::debug!(%id, ?requester, error = %v, "payload rejected");
      Err(ApiError::Validation(v))
    }
    Err(e) => {
      tracing::warn!(%id, ?requester, error = %e, "request denied");
      Err(e.into())
    }
  }
}

/// Persist an authorized mutation.
async fn persist<S>(
  state: &AppState<S>,
  authorized: Authorized,
  expected: Option<u64>,
) -> Result<Resource, ApiError>
where
  S: ResourceStore + 'static,
{
  let id = authorized.resource().id;
  let op = authorized.operation();
  let requester = authorized.identity().map(|i| i.subject_id.clone());

  let saved = state
    .store
    .save(authorized.into_resource(), expected)
    .await
    .map_err(ApiError::store)?;

  match saved {
    Some(r) => {
      tracing::info!(%id, ?op, ?requester, revision = r.revision, "resource updated");
      Ok(r)
    }
    None if expected.is_some() => Err(ApiError::PreconditionFailed),
    None => Err(ApiError::NotFound),
  }
}

fn success() -> Json<Value> { Json(json!({ "success": true })) }

/// Malformed JSON is handed to the engine as `null` so the usual gate order
/// (and the usual 400) applies.
fn payload(body: Result<Json<Value>, JsonRejection>) -> Value {
  body.map(|Json(v)| v).unwrap_or(Value::Null)
}

// ─── List ────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ListParams {
  #[serde(default)]
  pub public: bool,
  pub limit:  Option<usize>,
  pub offset: Option<usize>,
}

/// `GET /{collection}[?public=true][&limit=..][&offset=..]`
pub async fn list<S>(
  State(state): State<AppState<S>>,
  Path(collection): Path<String>,
  Requester(ctx): Requester,
  params: Result<Query<ListParams>, QueryRejection>,
) -> Result<Json<Vec<Resource>>, ApiError>
where
  S: ResourceStore + 'static,
{
  let kind = collection_kind(&collection)?;
  let Query(params) = params.map_err(|e| ApiError::BadRequest(e.body_text()))?;
  let visibility = ctx.visibility(params.public).map_err(|e| {
    tracing::warn!(%kind, error = %e, "listing denied");
    ApiError::from(e)
  })?;

  let mut query = ResourceQuery::new(visibility);
  query.kind = Some(kind);
  query.limit = params.limit;
  query.offset = params.offset;

  let resources = state.store.query(&query).await.map_err(ApiError::store)?;
  Ok(Json(resources))
}

// ─── Create ──────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CreateBody {
  pub name:     String,
  #[serde(default)]
  pub category: Option<String>,
  #[serde(default)]
  pub content:  Value,
}

/// `POST /{collection}`: the requester becomes the owner.
pub async fn create<S>(
  State(state): State<AppState<S>>,
  Path(collection): Path<String>,
  Requester(ctx): Requester,
  body: Result<Json<CreateBody>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError>
where
  S: ResourceStore + 'static,
{
  let kind = collection_kind(&collection)?;
  let owner = ctx.require_identity()?.subject_id.clone();
  let Json(body) = body.map_err(|e| ApiError::BadRequest(e.body_text()))?;

  let mut input = NewResource::new(kind, owner, body.name);
  input.category = body.category;
  input.content = body.content;

  let resource = state.store.create(input).await.map_err(ApiError::store)?;
  tracing::info!(
    id = %resource.id,
    %kind,
    owner = %resource.owner_id,
    "resource created"
  );
  Ok((StatusCode::CREATED, Json(resource)))
}

// ─── Get one ─────────────────────────────────────────────────────────────────

/// `GET /{collection}/{id}`
pub async fn get_one<S>(
  State(state): State<AppState<S>>,
  Path((collection, id)): Path<(String, String)>,
  Requester(ctx): Requester,
) -> Result<impl IntoResponse, ApiError>
where
  S: ResourceStore + 'static,
{
  let decided = decide(&state, ctx, &collection, &id).await?;
  let resource = authorize(decided, |d| d.gate(Operation::Read))?.into_resource();
  let etag = compute_etag(&resource);
  Ok(([(header::ETAG, etag)], Json(resource)))
}

// ─── Update ──────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct UpdateBody {
  pub name:    Option<String>,
  pub content: Option<Value>,
}

/// `PUT /{collection}/{id}`: replace name and/or content.
pub async fn update<S>(
  State(state): State<AppState<S>>,
  Path((collection, id)): Path<(String, String)>,
  headers: HeaderMap,
  Requester(ctx): Requester,
  body: Result<Json<UpdateBody>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError>
where
  S: ResourceStore + 'static,
{
  let decided = decide(&state, ctx, &collection, &id).await?;
  let mut authorized = authorize(decided, |d| d.gate(Operation::Write))?;
  let expected = expected_revision(&headers, authorized.resource())?;
  let Json(body) = body.map_err(|e| ApiError::BadRequest(e.body_text()))?;

  authorized.edit(|r| {
    if let Some(name) = body.name {
      r.name = name;
    }
    if let Some(content) = body.content {
      r.content = content;
    }
  });

  let saved = persist(&state, authorized, expected).await?;
  Ok(([(header::ETAG, compute_etag(&saved))], success()))
}

// ─── Category ────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CategoryBody {
  pub category: Option<String>,
}

/// `POST /{collection}/{id}/category`: `null` clears the category.
pub async fn set_category<S>(
  State(state): State<AppState<S>>,
  Path((collection, id)): Path<(String, String)>,
  headers: HeaderMap,
  Requester(ctx): Requester,
  body: Result<Json<CategoryBody>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError>
where
  S: ResourceStore + 'static,
{
  let decided = decide(&state, ctx, &collection, &id).await?;
  let mut authorized = authorize(decided, |d| d.gate(Operation::Write))?;
  let expected = expected_revision(&headers, authorized.resource())?;
  let Json(body) = body.map_err(|e| ApiError::BadRequest(e.body_text()))?;

  authorized.edit(|r| r.category = body.category);

  let saved = persist(&state, authorized, expected).await?;
  Ok(([(header::ETAG, compute_etag(&saved))], success()))
}

// ─── Delete ──────────────────────────────────────────────────────────────────

/// `DELETE /{collection}/{id}`
pub async fn delete_one<S>(
  State(state): State<AppState<S>>,
  Path((collection, id)): Path<(String, String)>,
  Requester(ctx): Requester,
) -> Result<Json<Value>, ApiError>
where
  S: ResourceStore + 'static,
{
  let decided = decide(&state, ctx, &collection, &id).await?;
  let authorized = authorize(decided, |d| d.gate(Operation::Delete))?;
  let resource_id = authorized.resource().id;

  if !state
    .store
    .delete(resource_id)
    .await
    .map_err(ApiError::store)?
  {
    return Err(ApiError::NotFound);
  }

  tracing::info!(
    id = %resource_id,
    requester = ?authorized.identity().map(|i| &i.subject_id),
    "resource deleted"
  );
  Ok(success())
}

// ─── Sharing ─────────────────────────────────────────────────────────────────

/// `POST /{collection}/{id}/share/access`: replace the access list.
pub async fn share_access<S>(
  State(state): State<AppState<S>>,
  Path((collection, id)): Path<(String, String)>,
  headers: HeaderMap,
  Requester(ctx): Requester,
  body: Result<Json<Value>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError>
where
  S: ResourceStore + 'static,
{
  let decided = decide(&state, ctx, &collection, &id).await?;
  let payload = payload(body);
  let authorized = authorize(decided, |d| d.replace_access(&payload))?;
  let expected = expected_revision(&headers, authorized.resource())?;

  let saved = persist(&state, authorized, expected).await?;
  Ok(([(header::ETAG, compute_etag(&saved))], success()))
}

/// `POST /{collection}/{id}/share/public`: replace the public-share flags.
pub async fn share_public<S>(
  State(state): State<AppState<S>>,
  Path((collection, id)): Path<(String, String)>,
  headers: HeaderMap,
  Requester(ctx): Requester,
  body: Result<Json<Value>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError>
where
  S: ResourceStore + 'static,
{
  let decided = decide(&state, ctx, &collection, &id).await?;
  let payload = payload(body);
  let authorized = authorize(decided, |d| d.replace_public(&payload))?;
  let expected = expected_revision(&headers, authorized.resource())?;

  let saved = persist(&state, authorized, expected).await?;
  Ok(([(header::ETAG, compute_etag(&saved))], success()))
}
