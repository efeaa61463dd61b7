//! Login, registration, logout and "who am I".

use axum::{
    Json,
    extract::State,
    http::HeaderMap,
    response::IntoResponse,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info};

use super::error::{ApiError, ResultExt};
use crate::auth::{
    AuthError, Caller, CallerIdentity, CookieSettings, GuardedRouter, SessionGuard, transport,
};
use crate::db::{Database, NewUser, UserLookup};
use crate::jwt::JwtConfig;
use crate::password::PasswordHasher;
use crate::validation::{MIN_PASSWORD_LENGTH, looks_like_email, password_long_enough};

#[derive(Clone)]
pub struct AuthState {
    pub db: Database,
    pub jwt: Arc<JwtConfig>,
    pub passwords: PasswordHasher,
    pub cookies: CookieSettings,
}

pub fn router(state: AuthState) -> axum::Router {
    GuardedRouter::new(SessionGuard::new(state.jwt.clone()))
        .public("/register", post(register))
        .public("/login", post(login))
        // Public so a caller with an expired session can still drop the cookie.
        .public("/logout", post(logout))
        .route("/me", get(me))
        .with_state(state)
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RegisterRequest {
    email: String,
    password: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    phone_number: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct LoginRequest {
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    phone_number: Option<String>,
    password: String,
}

#[derive(Serialize)]
struct SessionResponse {
    ok: bool,
    user: CallerIdentity,
}

#[derive(Serialize)]
struct OkResponse {
    ok: bool,
}

/// Mint a session for the user and attach it as a cookie.
fn session_response(
    state: &AuthState,
    subject: &str,
    email: &str,
    name: Option<&str>,
) -> Result<(HeaderMap, Json<SessionResponse>), ApiError> {
    let minted = state
        .jwt
        .mint(subject, email, name)
        .internal_err("Failed to mint session token")?;

    let mut headers = HeaderMap::new();
    transport::attach(&mut headers, state.cookies, &minted.token, minted.ttl)
        .internal_err("Failed to build session cookie")?;

    let body = SessionResponse {
        ok: true,
        user: CallerIdentity::from(minted.claims),
    };
    Ok((headers, Json(body)))
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

async fn register(
    State(state): State<AuthState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let email = payload.email.trim();

    if !looks_like_email(email) {
        return Err(ApiError::bad_request("Invalid email address"));
    }

    if !password_long_enough(&payload.password) {
        return Err(ApiError::bad_request(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LENGTH
        )));
    }

    let name = non_empty(payload.name);
    let phone_number = non_empty(payload.phone_number);

    let digest = state
        .passwords
        .hash_blocking(payload.password)
        .await
        .internal_err("Failed to hash password")?;

    let result = state
        .db
        .users()
        .create(&NewUser {
            email,
            name: name.as_deref(),
            phone_number: phone_number.as_deref(),
            password_digest: &digest,
        })
        .await;

    let user = match result {
        Ok(user) => user,
        Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
            return Err(ApiError::conflict("Email is already registered"));
        }
        Err(e) => return Err(ApiError::db_error("Failed to create user", e)),
    };

    info!(user = %user.resource_id, "User registered");

    session_response(
        &state,
        &user.resource_id,
        &user.email,
        user.name.as_deref(),
    )
}

async fn login(
    State(state): State<AuthState>,
    Json(payload): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let email = non_empty(payload.email);
    let phone_number = non_empty(payload.phone_number);

    let lookup = match (&email, &phone_number) {
        (Some(email), _) => UserLookup::Email(email),
        (None, Some(phone)) => UserLookup::PhoneNumber(phone),
        (None, None) => {
            return Err(ApiError::bad_request("Email or phone number is required"));
        }
    };

    let credentials = state
        .db
        .users()
        .find_credentials(lookup)
        .await
        .db_err("Failed to look up user")?;

    // Unknown users still pay for a bcrypt verify and fail the same way.
    let digest = credentials.as_ref().and_then(|c| c.digest.clone());

    let matches = state
        .passwords
        .verify_account_blocking(payload.password, digest)
        .await
        .internal_err("Failed to verify password")?;

    let credentials = match credentials {
        Some(credentials) if matches => credentials,
        _ => {
            let e = AuthError::credential_mismatch();
            debug!(reason = ?e.kind(), "Login rejected");
            return Err(e.into());
        }
    };

    info!(user = %credentials.subject_id, "User logged in");

    session_response(
        &state,
        &credentials.subject_id,
        &credentials.email,
        credentials.name.as_deref(),
    )
}

async fn logout(State(state): State<AuthState>) -> Result<impl IntoResponse, ApiError> {
    let mut headers = HeaderMap::new();
    transport::clear(&mut headers, state.cookies).internal_err("Failed to build session cookie")?;
    Ok((headers, Json(OkResponse { ok: true })))
}

async fn me(Caller(identity): Caller) -> Json<CallerIdentity> {
    Json(identity)
}
