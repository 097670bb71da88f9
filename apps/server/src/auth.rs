//! Caller identity.
//!
//! Every endpoint is public; identity only widens what detail retrieval may
//! show. Bearer tokens are ID tokens from the external identity provider,
//! verified against its JWKS, and the token subject is mapped to a local
//! user. With `auth.dev_user_header` on, `X-Dev-User-Id` names the local
//! user directly.

use axum::{
    extract::{FromRequestParts, State},
    http::{header, request::Parts, HeaderMap},
    response::{IntoResponse, Response},
};
use jsonwebtoken::jwk::{AlgorithmParameters, JwkSet};
use jsonwebtoken::{decode, decode_header, Algorithm, DecodingKey, TokenData, Validation};
use serde::{Deserialize, Serialize};
use std::{
    convert::Infallible,
    sync::Arc,
    time::{Duration, Instant},
};
use tokio::sync::RwLock;

use crate::{models::Viewer, state::AppState, Config};

pub const DEV_USER_HEADER: &str = "x-dev-user-id";

/// Verified token identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Principal {
    pub subject: String,
}

#[derive(Debug, Clone)]
pub enum AuthError {
    InvalidToken(String),
    Misconfigured(String),
    Upstream(String),
}

impl From<AuthError> for crate::Error {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidToken(msg) => crate::Error::Unauthorized(msg),
            AuthError::Misconfigured(msg) => {
                crate::Error::Internal(format!("Authentication misconfigured: {msg}"))
            }
            AuthError::Upstream(msg) => {
                crate::Error::Internal(format!("Authentication upstream error: {msg}"))
            }
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct OidcDiscovery {
    pub issuer: Option<String>,
    pub jwks_uri: String,
}

#[derive(Debug, Default)]
struct JwksCache {
    jwks_uri: Option<String>,
    jwks: Option<JwkSet>,
    fetched_at: Option<Instant>,
}

#[derive(Clone)]
pub struct AuthManager {
    config: Arc<Config>,
    http: reqwest::Client,
    jwks_cache: Arc<RwLock<JwksCache>>,
}

impl AuthManager {
    pub fn new(config: Arc<Config>) -> Result<Self, AuthError> {
        let timeout = Duration::from_secs(config.auth.http_timeout_seconds);
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AuthError::Misconfigured(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            config,
            http,
            jwks_cache: Arc::new(RwLock::new(JwksCache::default())),
        })
    }

    pub fn enabled(&self) -> bool {
        self.config.auth.enabled
    }

    pub fn dev_header_enabled(&self) -> bool {
        self.config.auth.dev_user_header
    }

    /// Verify the bearer token, if any. No token means an anonymous caller.
    pub async fn authenticate_headers(
        &self,
        headers: &HeaderMap,
    ) -> Result<Option<Principal>, AuthError> {
        if !self.enabled() {
            return Ok(None);
        }
        let Some(token) = bearer_token(headers)? else {
            return Ok(None);
        };

        let issuer = self
            .config
            .auth
            .issuer_url
            .clone()
            .ok_or_else(|| AuthError::Misconfigured("auth.issuer_url is not set".to_string()))?;
        let audience = self
            .config
            .auth
            .audience
            .clone()
            .ok_or_else(|| AuthError::Misconfigured("auth.audience is not set".to_string()))?;

        let token_data = self
            .decode_and_validate_jwt(token, &issuer, &audience)
            .await?;
        principal_from_claims(&token_data.claims)
            .ok_or_else(|| AuthError::InvalidToken("Token has no subject".to_string()))
            .map(Some)
    }

    async fn decode_and_validate_jwt(
        &self,
        token: &str,
        issuer: &str,
        audience: &str,
    ) -> Result<TokenData<serde_json::Value>, AuthError> {
        let header = decode_header(token)
            .map_err(|e| AuthError::InvalidToken(format!("Failed to decode JWT header: {e}")))?;

        let kid = header
            .kid
            .clone()
            .ok_or_else(|| AuthError::InvalidToken("JWT header missing 'kid'".to_string()))?;

        if header.alg != Algorithm::RS256 {
            return Err(AuthError::InvalidToken(format!(
                "Unsupported JWT alg '{:?}' (only RS256 is supported)",
                header.alg
            )));
        }

        let jwks = self.get_jwks().await?;
        let jwk = jwks
            .find(&kid)
            .ok_or_else(|| AuthError::InvalidToken(format!("No matching JWK for kid '{kid}'")))?;
        let decoding_key = decoding_key_from_jwk(jwk)?;

        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_issuer(&[issuer]);
        validation.set_audience(&[audience]);
        validation.leeway = 60;

        decode::<serde_json::Value>(token, &decoding_key, &validation)
            .map_err(|e| AuthError::InvalidToken(format!("{e}")))
    }

    async fn get_jwks(&self) -> Result<JwkSet, AuthError> {
        let ttl = Duration::from_secs(self.config.auth.jwks_cache_ttl_seconds);

        {
            let cache = self.jwks_cache.read().await;
            if let (Some(jwks), Some(fetched_at)) = (&cache.jwks, cache.fetched_at) {
                if fetched_at.elapsed() <= ttl {
                    return Ok(jwks.clone());
                }
            }
        }

        let jwks_uri = self.get_jwks_uri().await?;
        let jwks = self.fetch_jwks(&jwks_uri).await?;

        let mut cache = self.jwks_cache.write().await;
        cache.jwks = Some(jwks.clone());
        cache.jwks_uri = Some(jwks_uri);
        cache.fetched_at = Some(Instant::now());
        Ok(jwks)
    }

    async fn get_jwks_uri(&self) -> Result<String, AuthError> {
        if let Some(uri) = self.config.auth.jwks_url.clone() {
            return Ok(uri);
        }

        {
            let cache = self.jwks_cache.read().await;
            if let Some(uri) = cache.jwks_uri.clone() {
                return Ok(uri);
            }
        }

        Ok(self.oidc_discovery().await?.jwks_uri)
    }

    async fn oidc_discovery(&self) -> Result<OidcDiscovery, AuthError> {
        let issuer = self
            .config
            .auth
            .issuer_url
            .clone()
            .ok_or_else(|| AuthError::Misconfigured("auth.issuer_url is not set".to_string()))?;

        let url = format!(
            "{}/.well-known/openid-configuration",
            issuer.trim_end_matches('/')
        );

        let res = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| AuthError::Upstream(format!("OIDC discovery failed: {e}")))?;
        if !res.status().is_success() {
            return Err(AuthError::Upstream(format!(
                "OIDC discovery returned HTTP {}",
                res.status()
            )));
        }

        res.json()
            .await
            .map_err(|e| AuthError::Upstream(format!("OIDC discovery JSON parse failed: {e}")))
    }

    async fn fetch_jwks(&self, jwks_uri: &str) -> Result<JwkSet, AuthError> {
        let res = self
            .http
            .get(jwks_uri)
            .send()
            .await
            .map_err(|e| AuthError::Upstream(format!("JWKS fetch failed: {e}")))?;
        if !res.status().is_success() {
            return Err(AuthError::Upstream(format!(
                "JWKS fetch returned HTTP {}",
                res.status()
            )));
        }
        res.json::<JwkSet>()
            .await
            .map_err(|e| AuthError::Upstream(format!("JWKS JSON parse failed: {e}")))
    }
}

fn decoding_key_from_jwk(jwk: &jsonwebtoken::jwk::Jwk) -> Result<DecodingKey, AuthError> {
    match &jwk.algorithm {
        AlgorithmParameters::RSA(rsa) => DecodingKey::from_rsa_components(&rsa.n, &rsa.e)
            .map_err(|e| AuthError::InvalidToken(format!("Failed to build RSA decoding key: {e}"))),
        _ => Err(AuthError::InvalidToken(
            "Unsupported JWK type (only RSA keys are supported)".to_string(),
        )),
    }
}

/// `Authorization: Bearer <token>`, if present.
fn bearer_token(headers: &HeaderMap) -> Result<Option<&str>, AuthError> {
    let Some(authz) = headers.get(header::AUTHORIZATION) else {
        return Ok(None);
    };
    let authz = authz.to_str().map_err(|_| {
        AuthError::InvalidToken("Authorization header is not valid UTF-8".to_string())
    })?;

    authz
        .strip_prefix("Bearer ")
        .or_else(|| authz.strip_prefix("bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(Some)
        .ok_or_else(|| {
            AuthError::InvalidToken("Authorization header must be 'Bearer <token>'".to_string())
        })
}

/// Local user id from `X-Dev-User-Id`, if present.
fn dev_user_id(headers: &HeaderMap) -> Result<Option<i32>, AuthError> {
    let Some(value) = headers.get(DEV_USER_HEADER) else {
        return Ok(None);
    };
    value
        .to_str()
        .ok()
        .and_then(|v| v.trim().parse::<i32>().ok())
        .map(Some)
        .ok_or_else(|| AuthError::InvalidToken("X-Dev-User-Id must be an integer".to_string()))
}

fn principal_from_claims(claims: &serde_json::Value) -> Option<Principal> {
    let subject = claims
        .get("sub")
        .and_then(|v| v.as_str())
        .filter(|s| !s.is_empty())?
        .to_string();

    Some(Principal { subject })
}

/// Resolve the caller to a local user, or `None` for anonymous callers.
///
/// Credentials that name no local user are rejected rather than downgraded
/// to anonymous.
async fn resolve_viewer(state: &AppState, headers: &HeaderMap) -> crate::Result<Option<Viewer>> {
    if state.auth.dev_header_enabled() {
        if let Some(user_id) = dev_user_id(headers)? {
            return state
                .users
                .find_by_id(user_id)
                .await?
                .map(Some)
                .ok_or_else(|| unregistered(&user_id.to_string()));
        }
    }

    match state.auth.authenticate_headers(headers).await? {
        Some(principal) => state
            .users
            .find_by_firebase_uid(&principal.subject)
            .await?
            .map(Some)
            .ok_or_else(|| unregistered(&principal.subject)),
        None => Ok(None),
    }
}

fn unregistered(subject: &str) -> crate::Error {
    tracing::debug!(subject = %subject, "No local user for caller");
    crate::Error::Unauthorized("User not registered".to_string())
}

/// Extractor for the viewer attached by [`viewer_middleware`].
#[derive(Debug, Clone, Copy)]
pub struct OptionalViewer(pub Option<Viewer>);

#[async_trait::async_trait]
impl<S> FromRequestParts<S> for OptionalViewer
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(OptionalViewer(parts.extensions.get::<Viewer>().copied()))
    }
}

/// Middleware attaching the resolved `Viewer`, if any, to the request.
pub async fn viewer_middleware(
    State(state): State<AppState>,
    mut req: axum::extract::Request,
    next: axum::middleware::Next,
) -> Response {
    match resolve_viewer(&state, req.headers()).await {
        Ok(Some(viewer)) => {
            req.extensions_mut().insert(viewer);
            next.run(req).await
        }
        Ok(None) => next.run(req).await,
        Err(err) => err.into_response(),
    }
}
