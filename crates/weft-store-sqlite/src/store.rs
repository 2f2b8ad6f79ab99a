//! [`SqliteStore`], the SQLite implementation of [`ResourceStore`].

use std::path::Path;

use chrono::Utc;
use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use weft_core::{
  resource::{NewResource, Resource},
  store::{DEFAULT_LIMIT, ResourceQuery, ResourceStore},
  visibility::VisibilityFilter,
};

use crate::{
  Result,
  encode::{
    RESOURCE_COLUMNS, RawResource, encode_access, encode_dt, encode_kind,
    encode_public, encode_uuid,
  },
  error::Error,
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Weft resource store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, for tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

/// SQL condition and bound subject for a visibility filter.
///
/// The subject binds to `?1` in the query built by [`ResourceStore::query`].
fn visibility_clause(filter: &VisibilityFilter) -> (&'static str, Option<String>) {
  match filter {
    VisibilityFilter::Public => (
      "json_extract(share_public, '$.enabled') = 1
       AND coalesce(json_extract(share_public, '$.hidden'), 0) = 0",
      None,
    ),
    // Only `user` bindings count here; `mail` bindings are left out.
    VisibilityFilter::Mine { subject_id } => (
      "(owner_id = ?1 OR EXISTS (
         SELECT 1 FROM json_each(resources.share_access) AS b
         WHERE json_extract(b.value, '$.subjectType') = 'user'
           AND json_extract(b.value, '$.subjectId') = ?1
       ))",
      Some(subject_id.clone()),
    ),
  }
}

// ─── ResourceStore impl ──────────────────────────────────────────────────────

impl ResourceStore for SqliteStore {
  type Error = Error;

  async fn create(&self, input: NewResource) -> Result<Resource> {
    let resource = input.into_resource(Uuid::new_v4(), Utc::now());

    let id_str       = encode_uuid(resource.id);
    let kind_str     = encode_kind(resource.kind);
    let owner_id     = resource.owner_id.clone();
    let name         = resource.name.clone();
    let category     = resource.category.clone();
    let content_str  = resource.content.to_string();
    let public_str   = encode_public(&resource.share.public)?;
    let access_str   = encode_access(&resource.share.access)?;
    let revision     = resource.revision as i64;
    let created_str  = encode_dt(resource.created_at);
    let updated_str  = encode_dt(resource.updated_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO resources (
             resource_id, kind, owner_id, name, category, content_json,
             share_public, share_access, revision, created_at, updated_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
          rusqlite::params![
            id_str,
            kind_str,
            owner_id,
            name,
            category,
            content_str,
            public_str,
            access_str,
            revision,
            created_str,
            updated_str,
          ],
        )?;
        Ok(())
      })
      .await?;

    tracing::debug!(id = %resource.id, kind = %resource.kind, "resource created");
    Ok(resource)
  }

  async fn load_by_id(&self, id: Uuid) -> Result<Option<Resource>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawResource> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            &format!(
              "SELECT {RESOURCE_COLUMNS} FROM resources WHERE resource_id = ?1"
            ),
            rusqlite::params![id_str],
            RawResource::from_row,
          )
          .optional()?)
      })
      .await?;

    raw.map(RawResource::into_resource).transpose()
  }

  async fn save(
    &self,
    resource:          Resource,
    expected_revision: Option<u64>,
  ) -> Result<Option<Resource>> {
    let now = Utc::now();

    let id_str      = encode_uuid(resource.id);
    let name        = resource.name.clone();
    let category    = resource.category.clone();
    let content_str = resource.content.to_string();
    let public_str  = encode_public(&resource.share.public)?;
    let access_str  = encode_access(&resource.share.access)?;
    let updated_str = encode_dt(now);
    let expected    = expected_revision.map(|r| r as i64);

    // `owner_id`, `kind` and `created_at` are never in SET. The row comes
    // back from the same statement so the caller sees exactly its own write.
    let written: Option<RawResource> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            &format!(
              "UPDATE resources
               SET name = ?2, category = ?3, content_json = ?4,
                   share_public = ?5, share_access = ?6,
                   revision = revision + 1, updated_at = ?7
               WHERE resource_id = ?1
                 AND (?8 IS NULL OR revision = ?8)
               RETURNING {RESOURCE_COLUMNS}"
            ),
            rusqlite::params![
              id_str,
              name,
              category,
              content_str,
              public_str,
              access_str,
              updated_str,
              expected,
            ],
            RawResource::from_row,
          )
          .optional()?)
      })
      .await?;

    let Some(raw) = written else {
      tracing::debug!(
        id = %resource.id,
        ?expected_revision,
        "save matched no row"
      );
      return Ok(None);
    };

    let saved = raw.into_resource()?;
    tracing::debug!(id = %saved.id, revision = saved.revision, "resource saved");
    Ok(Some(saved))
  }

  async fn delete(&self, id: Uuid) -> Result<bool> {
    let id_str = encode_uuid(id);

    let removed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM resources WHERE resource_id = ?1",
          rusqlite::params![id_str],
        )?)
      })
      .await?;

    Ok(removed > 0)
  }

  async fn query(&self, query: &ResourceQuery) -> Result<Vec<Resource>> {
    let (visible, subject) = visibility_clause(&query.visibility);
    let kind_str   = query.kind.map(encode_kind);
    let limit_val  = query.limit.unwrap_or(DEFAULT_LIMIT) as i64;
    let offset_val = query.offset.unwrap_or(0) as i64;

    let raws: Vec<RawResource> = self
      .conn
      .call(move |conn| {
        let mut conds: Vec<&'static str> = vec![visible];
        if kind_str.is_some() {
          conds.push("kind = ?2");
        }

        let sql = format!(
          "SELECT {RESOURCE_COLUMNS}
           FROM resources
           WHERE {}
           ORDER BY updated_at DESC, resource_id
           LIMIT ?3 OFFSET ?4",
          conds.join(" AND ")
        );

        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(
            rusqlite::params![
              subject.as_deref(),
              kind_str.as_deref(),
              limit_val,
              offset_val,
            ],
            RawResource::from_row,
          )?
          .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawResource::into_resource).collect()
  }
}
