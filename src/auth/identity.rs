//! Request-scoped caller identity.

use std::convert::Infallible;

use axum::{extract::FromRequestParts, http::request::Parts};
use serde::{Deserialize, Serialize};

use super::errors::AuthError;
use crate::jwt::SessionClaims;

/// The authenticated caller of a request, projected from verified claims.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallerIdentity {
    #[serde(rename = "sub")]
    pub subject_id: String,
    pub email: String,
    #[serde(default)]
    pub name: Option<String>,
}

impl From<SessionClaims> for CallerIdentity {
    fn from(claims: SessionClaims) -> Self {
        Self {
            subject_id: claims.sub,
            email: claims.email,
            name: claims.name,
        }
    }
}

impl From<&SessionClaims> for CallerIdentity {
    fn from(claims: &SessionClaims) -> Self {
        claims.clone().into()
    }
}

/// Extractor for handlers on protected routes.
///
/// Reads the identity the access middleware stored on the request. A handler
/// mounted without the middleware rejects every request.
pub struct Caller(pub CallerIdentity);

impl<S> FromRequestParts<S> for Caller
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CallerIdentity>()
            .cloned()
            .map(Caller)
            .ok_or_else(AuthError::not_authenticated)
    }
}

/// Optional identity extractor - never fails.
pub struct MaybeCaller(pub Option<CallerIdentity>);

impl<S> FromRequestParts<S> for MaybeCaller
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(MaybeCaller(parts.extensions.get::<CallerIdentity>().cloned()))
    }
}
