use async_once_cell::OnceCell;
use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts, HeaderMap, StatusCode},
};
use jsonwebtoken::{
    decode, decode_header, encode, errors::ErrorKind, jwk::JwkSet, Algorithm, DecodingKey,
    EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use std::marker::PhantomData;
use thiserror::Error;
use time::{Duration, OffsetDateTime};
use url::Url;

use base::setting::{Auth as AuthSettings, AuthProvider};

use super::{AppState, Error};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("Authorization header is expected.")]
    HeaderMissing,
    #[error("{0}")]
    InvalidHeader(&'static str),
    #[error("Token expired.")]
    TokenExpired,
    #[error("{0}")]
    InvalidClaims(&'static str),
    #[error("Permission not found.")]
    Unauthorized,
    #[error("Could not fetch signing keys: {0}")]
    KeySet(String),
}

impl AuthError {
    pub fn code(&self) -> &'static str {
        match self {
            AuthError::HeaderMissing => "authorization_header_missing",
            AuthError::InvalidHeader(_) => "invalid_header",
            AuthError::TokenExpired => "token_expired",
            AuthError::InvalidClaims(_) => "invalid_claims",
            AuthError::Unauthorized => "unauthorized",
            AuthError::KeySet(_) => "key_set_unavailable",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AuthError::KeySet(_) => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::UNAUTHORIZED,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,
    pub exp: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub permissions: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
}

impl Claims {
    /// Grants come from the `permissions` list and the space separated `scope`.
    pub fn require(&self, permission: &str) -> Result<(), AuthError> {
        if self.permissions.is_none() && self.scope.is_none() {
            return Err(AuthError::InvalidClaims("Permissions not included in JWT."));
        }
        let listed = self
            .permissions
            .iter()
            .flatten()
            .any(|p| p == permission);
        let scoped = self
            .scope
            .iter()
            .flat_map(|s| s.split_whitespace())
            .any(|s| s == permission);
        if listed || scoped {
            Ok(())
        } else {
            Err(AuthError::Unauthorized)
        }
    }
}

pub fn bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let header = headers
        .get(AUTHORIZATION)
        .ok_or(AuthError::HeaderMissing)?
        .to_str()
        .map_err(|_| AuthError::InvalidHeader("Authorization header must be bearer token."))?;
    let parts: Vec<&str> = header.split_whitespace().collect();
    match parts.as_slice() {
        [] => Err(AuthError::HeaderMissing),
        [scheme, ..] if !scheme.eq_ignore_ascii_case("bearer") => Err(AuthError::InvalidHeader(
            "Authorization header must start with \"Bearer\".",
        )),
        [_] => Err(AuthError::InvalidHeader("Token not found.")),
        [_, token] => Ok(*token),
        _ => Err(AuthError::InvalidHeader(
            "Authorization header must be bearer token.",
        )),
    }
}

enum Keys {
    Secret(DecodingKey),
    Jwks { url: Url, set: OnceCell<JwkSet> },
}

/// Verifies bearer tokens, either against a shared secret or against the
/// key set published by an identity provider.
pub struct Authority {
    keys: Keys,
    audience: Option<String>,
    issuer: Option<String>,
}

impl Authority {
    pub fn from_settings(settings: &AuthSettings) -> Self {
        let keys = match (settings.provider, &settings.jwks_url) {
            (AuthProvider::Jwks, Some(url)) => Keys::Jwks {
                url: url.to_owned(),
                set: OnceCell::new(),
            },
            _ => Keys::Secret(DecodingKey::from_secret(settings.jwt_secret.as_bytes())),
        };
        Self {
            keys,
            audience: settings.audience.to_owned(),
            issuer: settings.issuer.to_owned(),
        }
    }

    pub fn local(secret: &str) -> Self {
        Self {
            keys: Keys::Secret(DecodingKey::from_secret(secret.as_bytes())),
            audience: None,
            issuer: None,
        }
    }

    pub fn with_audience(mut self, audience: impl Into<String>) -> Self {
        self.audience = Some(audience.into());
        self
    }

    pub fn with_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.issuer = Some(issuer.into());
        self
    }

    fn validation(&self, algorithm: Algorithm) -> Validation {
        let mut validation = Validation::new(algorithm);
        if let Some(audience) = &self.audience {
            validation.set_audience(&[audience]);
            validation.required_spec_claims.insert("aud".to_string());
        }
        if let Some(issuer) = &self.issuer {
            validation.set_issuer(&[issuer]);
            validation.required_spec_claims.insert("iss".to_string());
        }
        validation
    }

    pub async fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        let (key, algorithm) = match &self.keys {
            Keys::Secret(key) => (key.clone(), Algorithm::HS256),
            Keys::Jwks { url, set } => {
                let header = decode_header(token)
                    .map_err(|_| AuthError::InvalidHeader("Authorization malformed."))?;
                let kid = header
                    .kid
                    .ok_or(AuthError::InvalidHeader("Authorization malformed."))?;
                let set = set.get_or_try_init(fetch_key_set(url)).await?;
                let jwk = set.find(kid.as_str()).ok_or(AuthError::InvalidHeader(
                    "Unable to find the appropriate key.",
                ))?;
                let key = DecodingKey::from_jwk(jwk).map_err(|_| {
                    AuthError::InvalidHeader("Unable to find the appropriate key.")
                })?;
                (key, Algorithm::RS256)
            }
        };
        match decode::<Claims>(token, &key, &self.validation(algorithm)) {
            Ok(token_data) => {
                tracing::trace!(?token_data, "Claims for request");
                Ok(token_data.claims)
            }
            Err(e) => Err(match e.kind() {
                ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                ErrorKind::InvalidAudience | ErrorKind::InvalidIssuer => AuthError::InvalidClaims(
                    "Incorrect claims. Please, check the audience and issuer.",
                ),
                ErrorKind::MissingRequiredClaim(claim) if claim == "aud" || claim == "iss" => {
                    AuthError::InvalidClaims(
                        "Incorrect claims. Please, check the audience and issuer.",
                    )
                }
                _ => AuthError::InvalidHeader("Unable to parse authentication token."),
            }),
        }
    }
}

async fn fetch_key_set(url: &Url) -> Result<JwkSet, AuthError> {
    tracing::info!(%url, "Fetching token signing keys");
    let res = reqwest::get(url.clone())
        .await
        .and_then(|res| res.error_for_status())
        .map_err(|e| AuthError::KeySet(e.to_string()))?;
    res.json::<JwkSet>()
        .await
        .map_err(|e| AuthError::KeySet(e.to_string()))
}

/// Signs an HS256 token for the local provider.
pub fn issue_token(
    secret: &str,
    subject: Option<&str>,
    permissions: &[String],
    ttl: Duration,
) -> Result<String, jsonwebtoken::errors::Error> {
    let claims = Claims {
        sub: subject.map(str::to_owned),
        exp: (OffsetDateTime::now_utc() + ttl).unix_timestamp() as usize,
        permissions: Some(permissions.to_vec()),
        scope: None,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

#[async_trait]
impl FromRequestParts<AppState> for Claims {
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        if let Some(claims) = parts.extensions.get::<Claims>() {
            return Ok(claims.clone());
        }
        let token = bearer_token(&parts.headers)?;
        let claims = state.authority.verify(token).await?;
        parts.extensions.insert(claims.clone());
        Ok(claims)
    }
}

pub trait Permission: Send + Sync {
    const NAME: &'static str;
}

macro_rules! permissions {
    ($($name:ident => $value:literal;)*) => {
        $(
            pub struct $name;

            impl Permission for $name {
                const NAME: &'static str = $value;
            }
        )*
    };
}

permissions! {
    GetDrinksDetail => "get:drinks-detail";
    PostDrinks => "post:drinks";
    PatchDrinks => "patch:drinks";
    DeleteDrinks => "delete:drinks";
}

/// Claims of a request whose token carries the permission `P`.
pub struct Authorized<P: Permission>(pub Claims, PhantomData<P>);

#[async_trait]
impl<P: Permission> FromRequestParts<AppState> for Authorized<P> {
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let claims = Claims::from_request_parts(parts, state).await?;
        claims.require(P::NAME)?;
        tracing::debug!(permission = P::NAME, subject = ?claims.sub, "Authorized request");
        Ok(Self(claims, PhantomData))
    }
}
