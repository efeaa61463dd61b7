//! Authentication error types.

use axum::{
    Json,
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Serialize;

/// Why a request was not authenticated. Only ever logged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthErrorKind {
    /// No session token on the request.
    NotAuthenticated,
    /// Token present but expired, tampered, malformed or from another secret.
    TokenInvalid,
    /// Wrong credentials at login.
    CredentialMismatch,
}

/// Authentication failure. Every kind produces the same 401 response.
#[derive(Debug)]
pub struct AuthError {
    kind: AuthErrorKind,
}

impl AuthError {
    pub fn not_authenticated() -> Self {
        Self {
            kind: AuthErrorKind::NotAuthenticated,
        }
    }

    pub fn token_invalid() -> Self {
        Self {
            kind: AuthErrorKind::TokenInvalid,
        }
    }

    pub fn credential_mismatch() -> Self {
        Self {
            kind: AuthErrorKind::CredentialMismatch,
        }
    }

    pub fn kind(&self) -> AuthErrorKind {
        self.kind
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        #[derive(Serialize)]
        struct ErrorResponse {
            error: &'static str,
        }

        let mut response = (
            StatusCode::UNAUTHORIZED,
            Json(ErrorResponse {
                error: "Unauthorized",
            }),
        )
            .into_response();

        response
            .headers_mut()
            .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));

        response
    }
}
