//! Bearer-token verification and the [`Requester`] extractor.
//!
//! Tokens are HS256 JWTs. A request without an `Authorization` header is
//! anonymous; a request with one that fails verification in any way is
//! rejected with 401 rather than downgraded to anonymous.

use axum::{
  extract::FromRequestParts,
  http::{HeaderValue, header, request::Parts},
};
use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey, Validation};
use serde::Deserialize;
use thiserror::Error;
use weft_core::{identity::VerifiedClaims, pipeline::RequestContext, store::ResourceStore};

use crate::{AppState, error::ApiError};

/// Token verification settings for this server instance.
#[derive(Clone)]
pub struct AuthConfig {
  /// Shared HMAC secret.
  pub jwt_secret:  String,
  /// Clock skew tolerated on `exp`, `nbf` and `iat`, in seconds.
  pub leeway_secs: u64,
  /// Required `iss` claim, if any.
  pub issuer:      Option<String>,
}

/// Why a presented token was refused. Only logged; the client sees a bare 401.
#[derive(Debug, Error)]
pub enum TokenError {
  #[error("authorization header is not a bearer token")]
  NotBearer,

  #[error("{0}")]
  Jwt(#[from] jsonwebtoken::errors::Error),

  #[error("token has no subject")]
  MissingSubject,

  #[error("token issued in the future")]
  IssuedInFuture,
}

#[derive(Debug, Deserialize)]
struct TokenClaims {
  #[serde(default)]
  sub:   Option<String>,
  #[serde(default)]
  roles: Vec<String>,
  #[serde(default)]
  mail:  Option<String>,
  #[serde(default)]
  iat:   Option<i64>,
}

// ─── Verifier ────────────────────────────────────────────────────────────────

pub struct TokenVerifier {
  key:        DecodingKey,
  validation: Validation,
  leeway:     i64,
}

impl TokenVerifier {
  pub fn new(config: &AuthConfig) -> Self {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.leeway = config.leeway_secs;
    validation.validate_nbf = true;
    validation.set_required_spec_claims(&["exp", "sub"]);
    if let Some(iss) = &config.issuer {
      validation.set_issuer(&[iss.as_str()]);
    }

    Self {
      key: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
      validation,
      leeway: i64::try_from(config.leeway_secs).unwrap_or(i64::MAX),
    }
  }

  /// Verify a compact JWS and extract the claims the engine cares about.
  ///
  /// Role strings are passed through untouched; unknown roles are rejected
  /// when the claims are resolved into an identity.
  pub fn verify(&self, token: &str) -> Result<VerifiedClaims, TokenError> {
    let claims =
      jsonwebtoken::decode::<TokenClaims>(token, &self.key, &self.validation)?
        .claims;

    let sub = claims
      .sub
      .filter(|s| !s.trim().is_empty())
      .ok_or(TokenError::MissingSubject)?;

    if let Some(iat) = claims.iat
      && iat > Utc::now().timestamp().saturating_add(self.leeway)
    {
      return Err(TokenError::IssuedInFuture);
    }

    Ok(VerifiedClaims {
      sub,
      roles: claims.roles,
      mail: claims.mail,
    })
  }

  /// Verify the raw value of an `Authorization` header.
  pub fn verify_header(
    &self,
    value: &HeaderValue,
  ) -> Result<VerifiedClaims, TokenError> {
    // The scheme name is case-insensitive.
    let token = value
      .to_str()
      .ok()
      .and_then(|v| v.split_once(' '))
      .filter(|(scheme, _)| scheme.eq_ignore_ascii_case("bearer"))
      .map(|(_, token)| token.trim())
      .filter(|t| !t.is_empty())
      .ok_or(TokenError::NotBearer)?;
    self.verify(token)
  }
}

// ─── Extractor ───────────────────────────────────────────────────────────────

/// The resolved requester, anonymous or identified.
pub struct Requester(pub RequestContext);

impl<S> FromRequestParts<AppState<S>> for Requester
where
  S: ResourceStore + 'static,
{
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<S>,
  ) -> Result<Self, Self::Rejection> {
    let Some(value) = parts.headers.get(header::AUTHORIZATION) else {
      return Ok(Requester(RequestContext::anonymous()));
    };

    let claims = state.verifier.verify_header(value).map_err(|e| {
      tracing::warn!(reason = %e, "rejected bearer token");
      ApiError::Unauthenticated
    })?;

    let ctx = RequestContext::resolve(Some(&claims)).map_err(|e| {
      tracing::warn!(sub = %claims.sub, reason = %e, "rejected token claims");
      ApiError::from(e)
    })?;
    Ok(Requester(ctx))
  }
}
