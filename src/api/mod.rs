mod auth;
mod error;
mod workouts;

use axum::{Json, Router, routing::get};
use serde_json::{Value, json};
use std::sync::Arc;

use crate::auth::{CookieSettings, GuardedRouter, SessionGuard};
use crate::db::Database;
use crate::jwt::JwtConfig;
use crate::password::PasswordHasher;

pub use auth::AuthState;
pub use error::ApiError;
pub use workouts::WorkoutsState;

/// Create the API router.
pub fn create_api_router(
    db: Database,
    jwt: Arc<JwtConfig>,
    passwords: PasswordHasher,
    cookies: CookieSettings,
) -> Router {
    let guard = SessionGuard::new(jwt.clone());

    let auth_state = AuthState {
        db: db.clone(),
        jwt,
        passwords,
        cookies,
    };

    let workouts_state = WorkoutsState { db };

    let health_routes = GuardedRouter::new(guard.clone())
        .public("/health", get(health))
        .with_state(());

    Router::new()
        .merge(health_routes)
        .nest("/auth", auth::router(auth_state))
        .nest("/workouts", workouts::router(workouts_state, guard))
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
