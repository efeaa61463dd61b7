//! Route access policy.
//!
//! Each route is either `Public` or `Protected` (the default). Protected
//! routes need a verified, unexpired session token; every failure is the
//! same rejection so callers cannot tell missing from expired from tampered.

use std::sync::Arc;

use axum::http::HeaderMap;
use tracing::debug;

use super::errors::AuthError;
use super::identity::CallerIdentity;
use super::transport::extract_token;
use crate::jwt::{JwtConfig, JwtError, unix_now};

/// Static route classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Access {
    Public,
    #[default]
    Protected,
}

/// Outcome of judging a single request.
#[derive(Debug)]
pub enum AccessDecision {
    /// Proceed. Protected routes always carry the resolved identity.
    Allowed(Option<CallerIdentity>),
    Rejected(AuthError),
}

/// Decides whether requests may reach their handlers.
#[derive(Clone)]
pub struct SessionGuard {
    jwt: Arc<JwtConfig>,
}

impl SessionGuard {
    pub fn new(jwt: Arc<JwtConfig>) -> Self {
        Self { jwt }
    }

    /// Judge a request against the current time.
    ///
    /// Errors only when the system clock is unusable, which is a server fault
    /// and must not look like an authentication failure.
    pub fn evaluate(
        &self,
        access: Access,
        headers: &HeaderMap,
    ) -> Result<AccessDecision, JwtError> {
        match access {
            Access::Public => Ok(AccessDecision::Allowed(None)),
            Access::Protected => Ok(self.evaluate_at(access, headers, unix_now()?)),
        }
    }

    /// Judge a request as of `now` (Unix seconds).
    pub fn evaluate_at(&self, access: Access, headers: &HeaderMap, now: u64) -> AccessDecision {
        if access == Access::Public {
            return AccessDecision::Allowed(None);
        }

        let Some(token) = extract_token(headers) else {
            debug!("No session token on protected route");
            return AccessDecision::Rejected(AuthError::not_authenticated());
        };

        match self.jwt.verify_at(token, now) {
            Ok(claims) => AccessDecision::Allowed(Some(CallerIdentity::from(claims))),
            Err(e) => {
                debug!(error = %e, "Rejected session token");
                AccessDecision::Rejected(AuthError::token_invalid())
            }
        }
    }
}
