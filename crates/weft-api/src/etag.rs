//! ETag computation and `If-Match` handling for resources.
//!
//! An ETag is a SHA-256 hash over the resource id, its revision and its
//! `updated_at` timestamp. Every successful save bumps the revision, so any
//! write produces a new tag.

use axum::http::{HeaderMap, header};
use sha2::{Digest, Sha256};
use weft_core::resource::Resource;

use crate::error::ApiError;

/// Compute the quoted ETag for `resource`.
pub fn compute_etag(resource: &Resource) -> String {
  let mut hasher = Sha256::new();
  hasher.update(resource.id.as_bytes());
  hasher.update(resource.revision.to_le_bytes());
  hasher.update(resource.updated_at.timestamp_micros().to_le_bytes());
  format!("\"{}\"", hex::encode(hasher.finalize()))
}

/// Strip surrounding double-quotes (and a weak `W/` prefix) from an ETag.
pub fn strip_etag_quotes(s: &str) -> &str {
  let s = s.trim();
  let s = s.strip_prefix("W/").unwrap_or(s);
  s.trim_matches('"')
}

/// Check the request's `If-Match` header against `resource`.
///
/// Returns the revision the store must still hold for the write to go
/// through, or `None` when the request carries no precondition.
pub fn expected_revision(
  headers: &HeaderMap,
  resource: &Resource,
) -> Result<Option<u64>, ApiError> {
  let Some(value) = headers.get(header::IF_MATCH) else {
    return Ok(None);
  };
  let value = value.to_str().map_err(|_| ApiError::PreconditionFailed)?;

  let current = compute_etag(resource);
  let current = strip_etag_quotes(&current);
  let matched = value
    .split(',')
    .map(strip_etag_quotes)
    .any(|tag| tag == "*" || tag == current);

  if matched {
    Ok(Some(resource.revision))
  } else {
    Err(ApiError::PreconditionFailed)
  }
}
