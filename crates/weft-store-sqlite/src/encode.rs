//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! All timestamps are stored as RFC 3339 strings. Share state and content are
//! stored as compact JSON. UUIDs are stored as hyphenated lowercase strings.

use chrono::{DateTime, Utc};
use weft_core::{
  resource::{Resource, ResourceKind},
  share::{PublicShare, RoleBinding, ShareState},
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ────────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── ResourceKind ─────────────────────────────────────────────────────────────

pub fn encode_kind(k: ResourceKind) -> String { k.to_string() }

pub fn decode_kind(s: &str) -> Result<ResourceKind> {
  s.parse()
    .map_err(|_| Error::Decode(format!("unknown resource kind: {s:?}")))
}

// ─── Share state ─────────────────────────────────────────────────────────────

pub fn encode_public(p: &PublicShare) -> Result<String> {
  Ok(serde_json::to_string(p)?)
}

pub fn encode_access(access: &[RoleBinding]) -> Result<String> {
  Ok(serde_json::to_string(access)?)
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Column list matching the field order of [`RawResource`].
pub const RESOURCE_COLUMNS: &str = "resource_id, kind, owner_id, name, \
                                    category, content_json, share_public, \
                                    share_access, revision, created_at, \
                                    updated_at";

/// Raw values read directly from a `resources` row.
pub struct RawResource {
  pub resource_id:  String,
  pub kind:         String,
  pub owner_id:     String,
  pub name:         String,
  pub category:     Option<String>,
  pub content_json: String,
  pub share_public: String,
  pub share_access: String,
  pub revision:     i64,
  pub created_at:   String,
  pub updated_at:   String,
}

impl RawResource {
  /// Map a row selected with [`RESOURCE_COLUMNS`].
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      resource_id:  row.get(0)?,
      kind:         row.get(1)?,
      owner_id:     row.get(2)?,
      name:         row.get(3)?,
      category:     row.get(4)?,
      content_json: row.get(5)?,
      share_public: row.get(6)?,
      share_access: row.get(7)?,
      revision:     row.get(8)?,
      created_at:   row.get(9)?,
      updated_at:   row.get(10)?,
    })
  }

  pub fn into_resource(self) -> Result<Resource> {
    let public: PublicShare = serde_json::from_str(&self.share_public)?;
    let access: Vec<RoleBinding> = serde_json::from_str(&self.share_access)?;

    Ok(Resource {
      id:         decode_uuid(&self.resource_id)?,
      kind:       decode_kind(&self.kind)?,
      owner_id:   self.owner_id,
      name:       self.name,
      category:   self.category,
      content:    serde_json::from_str(&self.content_json)?,
      share:      ShareState { public, access },
      revision:   self.revision as u64,
      created_at: decode_dt(&self.created_at)?,
      updated_at: decode_dt(&self.updated_at)?,
    })
  }
}
