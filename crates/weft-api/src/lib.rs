//! JSON REST API for Weft.
//!
//! Exposes an axum [`Router`] backed by any [`weft_core::store::ResourceStore`].
//! Every resource route runs the request through the authorization pipeline
//! in `weft_core::pipeline`; this crate only adds bearer-token verification,
//! HTTP status mapping and ETags.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", weft_api::api_router(state))
//! ```

pub mod auth;
pub mod error;
pub mod etag;
pub mod resources;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post},
};
use weft_core::store::ResourceStore;

pub use auth::{AuthConfig, TokenVerifier};
pub use error::ApiError;

/// Shared state handed to every handler.
pub struct AppState<S> {
  pub store:    Arc<S>,
  pub verifier: Arc<TokenVerifier>,
}

impl<S> AppState<S> {
  pub fn new(store: Arc<S>, auth: &AuthConfig) -> Self {
    Self {
      store,
      verifier: Arc::new(TokenVerifier::new(auth)),
    }
  }
}

impl<S> Clone for AppState<S> {
  fn clone(&self) -> Self {
    Self {
      store:    Arc::clone(&self.store),
      verifier: Arc::clone(&self.verifier),
    }
  }
}

/// Build a fully-materialised API router for `state`.
///
/// Collections are `/workflows`, `/templates` and `/macros`; any other
/// collection segment is a 404.
pub fn api_router<S>(state: AppState<S>) -> Router<()>
where
  S: ResourceStore + 'static,
{
  Router::new()
    .route(
      "/{collection}",
      get(resources::list::<S>).post(resources::create::<S>),
    )
    .route(
      "/{collection}/{id}",
      get(resources::get_one::<S>)
        .put(resources::update::<S>)
        .delete(resources::delete_one::<S>),
    )
    .route(
      "/{collection}/{id}/category",
      post(resources::set_category::<S>),
    )
    .route(
      "/{collection}/{id}/share/access",
      post(resources::share_access::<S>),
    )
    .route(
      "/{collection}/{id}/share/public",
      post(resources::share_public::<S>),
    )
    .with_state(state)
}

#[cfg(test)]
mod tests {
  use axum::{
    body::Body,
    http::{HeaderMap, Method, Request, StatusCode, header},
  };
  use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
  use chrono::Utc;
  use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};
  use serde_json::{Value, json};
  use tower::ServiceExt as _;
  use uuid::Uuid;
  use weft_store_sqlite::SqliteStore;

  use super::*;

  const SECRET: &str = "test-secret";

  // ─── Harness ───────────────────────────────────────────────────────────────

  struct Harness {
    app:   Router,
    store: Arc<SqliteStore>,
  }

  type Reply = (StatusCode, HeaderMap, Value);

  impl Harness {
    async fn new() -> Self {
      let store = Arc::new(SqliteStore::open_in_memory().await.unwrap());
      let auth = AuthConfig {
        jwt_secret:  SECRET.into(),
        leeway_secs: 30,
        issuer:      None,
      };
      let app = api_router(AppState::new(Arc::clone(&store), &auth));
      Self { app, store }
    }

    async fn send(&self, req: Request<Body>) -> Reply {
      let res = self.app.clone().oneshot(req).await.unwrap();
      let status = res.status();
      let headers = res.headers().clone();
      let bytes = axum::body::to_bytes(res.into_body(), usize::MAX)
        .await
        .unwrap();
      let body = if bytes.is_empty() {
        Value::Null
      } else {
        serde_json::from_slice(&bytes).unwrap()
      };
      (status, headers, body)
    }

    async fn call(
      &self,
      method: Method,
      uri: &str,
      token: Option<&str>,
      body: Option<Value>,
    ) -> Reply {
      let mut req = Request::builder().method(method).uri(uri);
      if let Some(t) = token {
        req = req.header(header::AUTHORIZATION, format!("Bearer {t}"));
      }
      let req = match body {
        Some(b) => req
          .header(header::CONTENT_TYPE, "application/json")
          .body(Body::from(b.to_string())),
        None => req.body(Body::empty()),
      };
      self.send(req.unwrap()).await
    }

    async fn get(&self, uri: &str, token: Option<&str>) -> Reply {
      self.call(Method::GET, uri, token, None).await
    }

    async fn post(&self, uri: &str, token: Option<&str>, body: Value) -> Reply {
      self.call(Method::POST, uri, token, Some(body)).await
    }

    /// Create a workflow owned by the token's subject; returns its URI.
    async fn workflow(&self, token: &str, name: &str) -> String {
      let (status, _, body) = self
        .post("/workflows", Some(token), json!({ "name": name }))
        .await;
      assert_eq!(status, StatusCode::CREATED);
      format!("/workflows/{}", body["id"].as_str().unwrap())
    }

    async fn stored(&self, uri: &str) -> weft_core::resource::Resource {
      let id: Uuid = uri.rsplit('/').next().unwrap().parse().unwrap();
      self.store.load_by_id(id).await.unwrap().unwrap()
    }
  }

  fn sign(claims: &Value) -> String {
    encode(
      &Header::new(Algorithm::HS256),
      claims,
      &EncodingKey::from_secret(SECRET.as_bytes()),
    )
    .unwrap()
  }

  fn exp() -> i64 { Utc::now().timestamp() + 3600 }

  fn token(sub: &str, roles: &[&str]) -> String {
    sign(&json!({ "sub": sub, "roles": roles, "exp": exp() }))
  }

  fn subscriber(sub: &str) -> String { token(sub, &["subscriber"]) }

  fn message(body: &Value) -> String {
    body["message"].as_str().unwrap_or_default().to_lowercase()
  }

  // ─── End-to-end scenarios ──────────────────────────────────────────────────

  #[tokio::test]
  async fn anonymous_read_of_private_resource_is_401() {
    let h = Harness::new().await;
    let uri = h.workflow(&subscriber("u1"), "wf").await;

    let (status, headers, _) = h.get(&uri, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(headers.contains_key(header::WWW_AUTHENTICATE));
  }

  #[tokio::test]
  async fn public_share_opens_anonymous_read() {
    let h = Harness::new().await;
    let u1 = subscriber("u1");
    let uri = h.workflow(&u1, "wf").await;

    let (status, _, body) = h
      .post(
        &format!("{uri}/share/public"),
        Some(&u1),
        json!({ "enabled": true, "hidden": false }),
      )
      .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "success": true }));

    let (status, _, body) = h.get(&uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["share"]["public"]["enabled"], json!(true));
  }

  #[tokio::test]
  async fn reader_binding_reads_but_cannot_write() {
    let h = Harness::new().await;
    let (u1, u2) = (subscriber("u1"), subscriber("u2"));
    let uri = h.workflow(&u1, "wf").await;

    let (status, ..) = h
      .post(
        &format!("{uri}/share/access"),
        Some(&u1),
        json!([{ "subjectId": "u2", "subjectType": "user", "role": "reader" }]),
      )
      .await;
    assert_eq!(status, StatusCode::OK);

    assert_eq!(h.get(&uri, Some(&u2)).await.0, StatusCode::OK);
    let (status, ..) = h
      .post(&format!("{uri}/category"), Some(&u2), json!({ "category": "x" }))
      .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
  }

  #[tokio::test]
  async fn contributor_binding_writes_but_cannot_delete() {
    let h = Harness::new().await;
    let (u1, u2) = (subscriber("u1"), subscriber("u2"));
    let uri = h.workflow(&u1, "wf").await;

    h.post(
      &format!("{uri}/share/access"),
      Some(&u1),
      json!([{ "subjectId": "u2", "role": "contributor" }]),
    )
    .await;

    let (status, ..) = h
      .post(
        &format!("{uri}/category"),
        Some(&u2),
        json!({ "category": "ops" }),
      )
      .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(h.stored(&uri).await.category.as_deref(), Some("ops"));

    let (status, ..) = h.call(Method::DELETE, &uri, Some(&u2), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
  }

  #[tokio::test]
  async fn stranger_cannot_change_public_share() {
    let h = Harness::new().await;
    let uri = h.workflow(&subscriber("u1"), "wf").await;

    let (status, _, body) = h
      .post(
        &format!("{uri}/share/public"),
        Some(&subscriber("u3")),
        json!({ "enabled": true }),
      )
      .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(message(&body).contains("owner"));
    assert!(!h.stored(&uri).await.share.is_public());
  }

  #[tokio::test]
  async fn listed_writeable_share_needs_administrator() {
    let h = Harness::new().await;
    let payload = json!({ "enabled": true, "writeable": true, "hidden": false });

    let owner = subscriber("u1");
    let uri = h.workflow(&owner, "wf").await;
    let (status, _, body) = h
      .post(&format!("{uri}/share/public"), Some(&owner), payload.clone())
      .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(message(&body).contains("administrator"));

    let admin = token("a1", &["administrator"]);
    let uri = h.workflow(&admin, "wf").await;
    let (status, ..) = h
      .post(&format!("{uri}/share/public"), Some(&admin), payload)
      .await;
    assert_eq!(status, StatusCode::OK);
    let (_, _, body) = h.get(&uri, None).await;
    assert_eq!(body["share"]["public"]["writeable"], json!(true));
  }

  // ─── Sharing ───────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn hidden_writeable_share_skips_administrator_gate() {
    let h = Harness::new().await;
    let owner = subscriber("u1");
    let uri = h.workflow(&owner, "wf").await;

    let (status, ..) = h
      .post(
        &format!("{uri}/share/public"),
        Some(&owner),
        json!({ "enabled": true, "writeable": true, "hidden": true }),
      )
      .await;
    assert_eq!(status, StatusCode::OK);
  }

  #[tokio::test]
  async fn public_writeable_resource_accepts_anonymous_edits() {
    let h = Harness::new().await;
    let admin = token("a1", &["administrator"]);
    let uri = h.workflow(&admin, "wf").await;
    h.post(
      &format!("{uri}/share/public"),
      Some(&admin),
      json!({ "enabled": true, "writeable": true }),
    )
    .await;

    let (status, ..) = h
      .post(&format!("{uri}/category"), None, json!({ "category": "open" }))
      .await;
    assert_eq!(status, StatusCode::OK);

    // Writing still stops short of owner-only operations.
    let (status, ..) = h.call(Method::DELETE, &uri, None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
  }

  #[tokio::test]
  async fn anonymous_write_to_read_only_public_resource_is_401() {
    let h = Harness::new().await;
    let owner = subscriber("u1");
    let uri = h.workflow(&owner, "wf").await;
    h.post(
      &format!("{uri}/share/public"),
      Some(&owner),
      json!({ "enabled": true }),
    )
    .await;

    let (status, ..) = h
      .post(&format!("{uri}/category"), None, json!({ "category": "x" }))
      .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let (status, ..) = h
      .post(&format!("{uri}/share/public"), None, json!({ "enabled": false }))
      .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
  }

  #[tokio::test]
  async fn public_share_payload_is_validated_before_ownership() {
    let h = Harness::new().await;
    let uri = h.workflow(&subscriber("u1"), "wf").await;

    let (status, ..) = h
      .post(
        &format!("{uri}/share/public"),
        Some(&subscriber("u3")),
        json!({ "hidden": true }),
      )
      .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
  }

  #[tokio::test]
  async fn invalid_access_list_is_rejected_atomically() {
    let h = Harness::new().await;
    let u1 = subscriber("u1");
    let uri = h.workflow(&u1, "wf").await;
    let share = format!("{uri}/share/access");

    let original = json!([{ "subjectId": "u2", "role": "reader" }]);
    h.post(&share, Some(&u1), original).await;
    let before = h.stored(&uri).await;

    let (status, _, body) = h
      .post(
        &share,
        Some(&u1),
        json!([
          { "subjectId": "u3", "role": "reader" },
          { "subjectId": "u4", "role": "wizard" },
        ]),
      )
      .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["errors"][0]["index"], json!(1));
    assert_eq!(body["errors"][0]["field"], json!("role"));

    let after = h.stored(&uri).await;
    assert_eq!(after.share.access, before.share.access);
    assert_eq!(after.revision, before.revision);
  }

  #[tokio::test]
  async fn access_payload_is_checked_only_after_ownership() {
    let h = Harness::new().await;
    let u1 = subscriber("u1");
    let uri = h.workflow(&u1, "wf").await;
    let share = format!("{uri}/share/access");

    let (status, ..) = h
      .post(&share, Some(&subscriber("u3")), json!("garbage"))
      .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, ..) = h.post(&share, Some(&u1), json!("garbage")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let req = Request::builder()
      .method(Method::POST)
      .uri(&share)
      .header(header::AUTHORIZATION, format!("Bearer {u1}"))
      .header(header::CONTENT_TYPE, "application/json")
      .body(Body::from("{not json"))
      .unwrap();
    assert_eq!(h.send(req).await.0, StatusCode::BAD_REQUEST);
  }

  #[tokio::test]
  async fn access_replacement_is_idempotent_and_keeps_duplicates() {
    let h = Harness::new().await;
    let u1 = subscriber("u1");
    let uri = h.workflow(&u1, "wf").await;
    let list = json!([
      { "subjectId": "u2", "subjectType": "user", "role": "reader" },
      { "subjectId": "u2", "subjectType": "user", "role": "contributor" },
    ]);

    for _ in 0..2 {
      let (status, ..) = h
        .post(&format!("{uri}/share/access"), Some(&u1), list.clone())
        .await;
      assert_eq!(status, StatusCode::OK);
    }

    let (_, _, body) = h.get(&uri, Some(&u1)).await;
    assert_eq!(body["share"]["access"], list);
  }

  #[tokio::test]
  async fn empty_list_revokes_granted_ownership() {
    let h = Harness::new().await;
    let (u1, u2) = (subscriber("u1"), subscriber("u2"));
    let uri = h.workflow(&u1, "wf").await;
    let share = format!("{uri}/share/access");

    h.post(&share, Some(&u1), json!([{ "subjectId": "u2", "role": "owner" }]))
      .await;
    // A granted owner may manage sharing too.
    let (status, ..) = h
      .post(&share, Some(&u2), json!([{ "subjectId": "u2", "role": "owner" }]))
      .await;
    assert_eq!(status, StatusCode::OK);

    h.post(&share, Some(&u1), json!([])).await;
    assert_eq!(h.get(&uri, Some(&u2)).await.0, StatusCode::FORBIDDEN);
    assert_eq!(h.post(&share, Some(&u2), json!([])).await.0, StatusCode::FORBIDDEN);
  }

  #[tokio::test]
  async fn concurrent_access_replacements_both_succeed() {
    let h = Harness::new().await;
    let u1 = subscriber("u1");
    let uri = h.workflow(&u1, "wf").await;
    let share = format!("{uri}/share/access");

    let a = json!([{ "subjectId": "a", "role": "reader" }]);
    let b = json!([{ "subjectId": "b", "role": "reader" }]);
    let (ra, rb) = tokio::join!(
      h.post(&share, Some(&u1), a),
      h.post(&share, Some(&u1), b)
    );
    assert_eq!(ra.0, StatusCode::OK);
    assert_eq!(rb.0, StatusCode::OK);

    let stored = h.stored(&uri).await;
    assert_eq!(stored.share.access.len(), 1);
    assert_eq!(stored.revision, 2);
  }

  // ─── Reads, writes and listings ────────────────────────────────────────────

  #[tokio::test]
  async fn administrator_reads_everything_but_cannot_delete() {
    let h = Harness::new().await;
    let uri = h.workflow(&subscriber("u1"), "wf").await;
    let admin = token("root", &["administrator"]);

    assert_eq!(h.get(&uri, Some(&admin)).await.0, StatusCode::OK);
    let (status, _, body) = h.call(Method::DELETE, &uri, Some(&admin), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(message(&body).contains("owner"));
  }

  #[tokio::test]
  async fn owner_can_delete() {
    let h = Harness::new().await;
    let u1 = subscriber("u1");
    let uri = h.workflow(&u1, "wf").await;

    let (status, _, body) = h.call(Method::DELETE, &uri, Some(&u1), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "success": true }));
    assert_eq!(h.get(&uri, Some(&u1)).await.0, StatusCode::NOT_FOUND);
  }

  #[tokio::test]
  async fn missing_resources_look_the_same_as_private_ones_to_anonymous() {
    let h = Harness::new().await;
    let u1 = subscriber("u1");
    let missing = format!("/workflows/{}", Uuid::new_v4());

    assert_eq!(h.get(&missing, None).await.0, StatusCode::UNAUTHORIZED);
    assert_eq!(h.get(&missing, Some(&u1)).await.0, StatusCode::NOT_FOUND);
    assert_eq!(
      h.get("/workflows/not-a-uuid", Some(&u1)).await.0,
      StatusCode::NOT_FOUND
    );
  }

  #[tokio::test]
  async fn resources_are_only_reachable_through_their_own_collection() {
    let h = Harness::new().await;
    let u1 = subscriber("u1");
    let uri = h.workflow(&u1, "wf").await;
    let id = uri.rsplit('/').next().unwrap();

    let (status, ..) = h.get(&format!("/templates/{id}"), Some(&u1)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, ..) = h.get(&format!("/folders/{id}"), Some(&u1)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
  }

  #[tokio::test]
  async fn create_requires_identity_and_a_name() {
    let h = Harness::new().await;
    let u1 = subscriber("u1");

    let (status, ..) = h.post("/macros", None, json!({ "name": "m" })).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, ..) = h.post("/macros", Some(&u1), json!({})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _, body) = h
      .post(
        "/macros",
        Some(&u1),
        json!({ "name": "m", "category": "c", "content": { "keys": "ctrl+k" } }),
      )
      .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["ownerId"], json!("u1"));
    assert_eq!(body["kind"], json!("macro"));
    assert_eq!(body["share"]["public"]["enabled"], json!(false));
    assert_eq!(body["share"]["access"], json!([]));
  }

  #[tokio::test]
  async fn if_match_guards_against_lost_updates() {
    let h = Harness::new().await;
    let u1 = subscriber("u1");
    let uri = h.workflow(&u1, "wf").await;

    let (_, headers, _) = h.get(&uri, Some(&u1)).await;
    let etag = headers[header::ETAG].to_str().unwrap().to_string();

    let put = |name: &'static str| {
      Request::builder()
        .method(Method::PUT)
        .uri(&uri)
        .header(header::AUTHORIZATION, format!("Bearer {u1}"))
        .header(header::IF_MATCH, &etag)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(json!({ "name": name }).to_string()))
        .unwrap()
    };

    let (status, headers, _) = h.send(put("first")).await;
    assert_eq!(status, StatusCode::OK);
    assert_ne!(headers[header::ETAG].to_str().unwrap(), etag);

    let (status, ..) = h.send(put("second")).await;
    assert_eq!(status, StatusCode::PRECONDITION_FAILED);
    assert_eq!(h.stored(&uri).await.name, "first");
  }

  #[tokio::test]
  async fn put_replaces_name_and_content() {
    let h = Harness::new().await;
    let u1 = subscriber("u1");
    let uri = h.workflow(&u1, "wf").await;

    let (status, ..) = h
      .call(
        Method::PUT,
        &uri,
        Some(&u1),
        Some(json!({ "name": "renamed", "content": { "steps": [] } })),
      )
      .await;
    assert_eq!(status, StatusCode::OK);

    let stored = h.stored(&uri).await;
    assert_eq!(stored.name, "renamed");
    assert_eq!(stored.content, json!({ "steps": [] }));
    assert_eq!(stored.owner_id, "u1");
  }

  #[tokio::test]
  async fn public_listing_omits_private_and_hidden() {
    let h = Harness::new().await;
    let u1 = subscriber("u1");
    h.workflow(&u1, "private").await;
    for (name, hidden) in [("listed", false), ("hidden", true)] {
      let uri = h.workflow(&u1, name).await;
      h.post(
        &format!("{uri}/share/public"),
        Some(&u1),
        json!({ "enabled": true, "hidden": hidden }),
      )
      .await;
    }

    for requester in [None, Some(u1.as_str())] {
      let (status, _, body) = h.get("/workflows?public=true", requester).await;
      assert_eq!(status, StatusCode::OK);
      let names: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["name"].as_str().unwrap())
        .collect();
      assert_eq!(names, vec!["listed"]);
    }
  }

  #[tokio::test]
  async fn private_listing_requires_identity_and_skips_mail_bindings() {
    let h = Harness::new().await;
    let u1 = subscriber("u1");
    let u2 = sign(&json!({
      "sub": "u2",
      "roles": ["subscriber"],
      "mail": "u2@example.com",
      "exp": exp(),
    }));

    assert_eq!(h.get("/workflows", None).await.0, StatusCode::UNAUTHORIZED);

    let by_user = h.workflow(&u1, "by-user").await;
    h.post(
      &format!("{by_user}/share/access"),
      Some(&u1),
      json!([{ "subjectId": "u2", "role": "reader" }]),
    )
    .await;
    let by_mail = h.workflow(&u1, "by-mail").await;
    h.post(
      &format!("{by_mail}/share/access"),
      Some(&u1),
      json!([{ "subjectId": "u2@example.com", "subjectType": "mail", "role": "reader" }]),
    )
    .await;

    // Direct access honours the mail binding...
    assert_eq!(h.get(&by_mail, Some(&u2)).await.0, StatusCode::OK);

    // ...the listing does not.
    let (status, _, body) = h.get("/workflows", Some(&u2)).await;
    assert_eq!(status, StatusCode::OK);
    let names: Vec<&str> = body
      .as_array()
      .unwrap()
      .iter()
      .map(|r| r["name"].as_str().unwrap())
      .collect();
    assert_eq!(names, vec!["by-user"]);
  }

  #[tokio::test]
  async fn malformed_listing_query_is_a_json_400() {
    let h = Harness::new().await;
    let u1 = subscriber("u1");

    for uri in ["/workflows?public=1", "/workflows?limit=many"] {
      let (status, _, body) = h.get(uri, Some(&u1)).await;
      assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
      assert!(!message(&body).is_empty(), "{uri}");
    }
  }

  // ─── Token rejection ───────────────────────────────────────────────────────

  #[tokio::test]
  async fn invalid_tokens_are_401_even_on_public_resources() {
    let h = Harness::new().await;
    let u1 = subscriber("u1");
    let uri = h.workflow(&u1, "wf").await;
    h.post(
      &format!("{uri}/share/public"),
      Some(&u1),
      json!({ "enabled": true }),
    )
    .await;
    assert_eq!(h.get(&uri, None).await.0, StatusCode::OK);

    let now = Utc::now().timestamp();
    let b64 = |v: Value| URL_SAFE_NO_PAD.encode(v.to_string());

    let unsigned = format!(
      "{}.{}.",
      b64(json!({ "alg": "none", "typ": "JWT" })),
      b64(json!({ "sub": "u1", "exp": exp() })),
    );

    let wrong_secret = encode(
      &Header::new(Algorithm::HS256),
      &json!({ "sub": "u1", "exp": exp() }),
      &EncodingKey::from_secret(b"someone-else"),
    )
    .unwrap();

    let other_alg = encode(
      &Header::new(Algorithm::HS384),
      &json!({ "sub": "u1", "exp": exp() }),
      &EncodingKey::from_secret(SECRET.as_bytes()),
    )
    .unwrap();

    let tampered = {
      let parts: Vec<&str> = u1.split('.').collect();
      let forged = b64(json!({ "sub": "root", "roles": ["administrator"], "exp": exp() }));
      format!("{}.{}.{}", parts[0], forged, parts[2])
    };

    let tampered_header = {
      let parts: Vec<&str> = u1.split('.').collect();
      let forged = b64(json!({ "alg": "HS256", "typ": "JWT", "kid": "other" }));
      format!("{}.{}.{}", forged, parts[1], parts[2])
    };

    let cases = [
      ("alg none", unsigned),
      ("wrong secret", wrong_secret),
      ("other algorithm", other_alg),
      ("tampered payload", tampered),
      ("tampered header", tampered_header),
      ("expired", sign(&json!({ "sub": "u1", "exp": now - 3600 }))),
      ("no exp", sign(&json!({ "sub": "u1" }))),
      (
        "issued in the future",
        sign(&json!({ "sub": "u1", "exp": exp(), "iat": now + 3600 })),
      ),
      (
        "non-string roles",
        sign(&json!({ "sub": "u1", "roles": [1], "exp": exp() })),
      ),
      ("empty subject", sign(&json!({ "sub": "", "exp": exp() }))),
      ("null subject", sign(&json!({ "sub": null, "exp": exp() }))),
      ("unknown role", token("u1", &["wizard"])),
      ("garbage", "not.a.jwt".to_string()),
    ];

    for (label, bad) in cases {
      let (status, headers, _) = h.get(&uri, Some(&bad)).await;
      assert_eq!(status, StatusCode::UNAUTHORIZED, "{label}");
      assert!(headers.contains_key(header::WWW_AUTHENTICATE), "{label}");
    }

    let req = Request::builder()
      .uri(&uri)
      .header(header::AUTHORIZATION, "Basic dTE6cGFzcw==")
      .body(Body::empty())
      .unwrap();
    assert_eq!(h.send(req).await.0, StatusCode::UNAUTHORIZED);
  }

  #[tokio::test]
  async fn lowercase_bearer_scheme_is_accepted() {
    let h = Harness::new().await;
    let u1 = subscriber("u1");
    let uri = h.workflow(&u1, "wf").await;

    let req = Request::builder()
      .uri(&uri)
      .header(header::AUTHORIZATION, format!("bearer {u1}"))
      .body(Body::empty())
      .unwrap();
    let (status, _, body) = h.send(req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], json!("wf"));
  }
}
