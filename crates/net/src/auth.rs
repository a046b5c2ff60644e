use std::sync::Arc;

use axum::extract::{FromRef, FromRequestParts};
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::profile::ProfileError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub email: String,
    pub exp: u64,
    #[serde(default)]
    pub sub: Option<String>,
}

/// HS256 bearer-token verifier shared by every authenticated route.
#[derive(Clone)]
pub struct JwtVerifier {
    inner: Arc<(DecodingKey, Validation)>,
}

impl JwtVerifier {
    pub fn new(secret: &str) -> Self {
        let key = DecodingKey::from_secret(secret.as_bytes());
        let validation = Validation::new(Algorithm::HS256);
        Self {
            inner: Arc::new((key, validation)),
        }
    }

    pub fn verify(&self, token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
        let (key, validation) = &*self.inner;
        decode::<Claims>(token, key, validation).map(|data| data.claims)
    }
}

/// Caller identity taken from a verified token's `email` claim.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub email: String,
}

impl<S> FromRequestParts<S> for AuthUser
where
    JwtVerifier: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ProfileError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .ok_or_else(|| ProfileError::Unauthorized("Missing bearer token".to_string()))?;

        let claims = JwtVerifier::from_ref(state).verify(token.trim()).map_err(|e| {
            warn!(error = %e, "Rejected bearer token");
            ProfileError::Unauthorized("Invalid token".to_string())
        })?;

        if claims.email.is_empty() {
            return Err(ProfileError::Unauthorized("Token has no email claim".to_string()));
        }

        Ok(AuthUser { email: claims.email })
    }
}
