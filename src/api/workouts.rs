use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use serde::{Deserialize, Serialize};

use super::error::{ApiError, ResultExt, validate_uuid};
use crate::auth::{Caller, GuardedRouter, SessionGuard};
use crate::db::{Database, NewWorkout, Workout, WorkoutUpdate};

#[derive(Clone)]
pub struct WorkoutsState {
    pub db: Database,
}

pub fn router(state: WorkoutsState, guard: SessionGuard) -> axum::Router {
    GuardedRouter::new(guard)
        .route("/", get(list_workouts).post(create_workout))
        .route(
            "/{id}",
            get(get_workout).put(update_workout).delete(delete_workout),
        )
        .with_state(state)
}

#[derive(Deserialize)]
struct CreateWorkoutRequest {
    name: String,
    date: String,
    #[serde(default)]
    notes: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateWorkoutRequest {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    date: Option<String>,
    #[serde(default)]
    notes: Option<String>,
    #[serde(default)]
    completed_at: Option<String>,
}

#[derive(Serialize)]
struct DeleteResponse {
    success: bool,
}

async fn list_workouts(
    State(state): State<WorkoutsState>,
    Caller(caller): Caller,
) -> Result<Json<Vec<Workout>>, ApiError> {
    let workouts = state
        .db
        .workouts()
        .list(&caller.subject_id)
        .await
        .db_err("Failed to list workouts")?;
    Ok(Json(workouts))
}

async fn create_workout(
    State(state): State<WorkoutsState>,
    Caller(caller): Caller,
    Json(payload): Json<CreateWorkoutRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let name = payload.name.trim();
    if name.is_empty() {
        return Err(ApiError::bad_request("Workout name cannot be empty"));
    }
    let date = payload.date.trim();
    if date.is_empty() {
        return Err(ApiError::bad_request("Workout date cannot be empty"));
    }

    let workout = state
        .db
        .workouts()
        .create(
            &caller.subject_id,
            &NewWorkout {
                name,
                date,
                notes: payload.notes.as_deref(),
            },
        )
        .await
        .db_err("Failed to create workout")?
        // Valid token for a user that no longer exists.
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    Ok((StatusCode::CREATED, Json(workout)))
}

async fn get_workout(
    State(state): State<WorkoutsState>,
    Caller(caller): Caller,
    Path(id): Path<String>,
) -> Result<Json<Workout>, ApiError> {
    validate_uuid(&id)?;

    let workout = state
        .db
        .workouts()
        .get(&id, &caller.subject_id)
        .await
        .db_err("Failed to get workout")?
        .ok_or_else(|| ApiError::not_found("Workout not found"))?;

    Ok(Json(workout))
}

async fn update_workout(
    State(state): State<WorkoutsState>,
    Caller(caller): Caller,
    Path(id): Path<String>,
    Json(payload): Json<UpdateWorkoutRequest>,
) -> Result<Json<Workout>, ApiError> {
    validate_uuid(&id)?;

    let name = payload.name.as_deref().map(str::trim);
    if name.is_some_and(str::is_empty) {
        return Err(ApiError::bad_request("Workout name cannot be empty"));
    }
    let date = payload.date.as_deref().map(str::trim);
    if date.is_some_and(str::is_empty) {
        return Err(ApiError::bad_request("Workout date cannot be empty"));
    }

    let update = WorkoutUpdate {
        name,
        date,
        notes: payload.notes.as_deref(),
        completed_at: payload.completed_at.as_deref(),
    };

    let workout = state
        .db
        .workouts()
        .update(&id, &caller.subject_id, &update)
        .await
        .db_err("Failed to update workout")?
        .ok_or_else(|| ApiError::not_found("Workout not found"))?;

    Ok(Json(workout))
}

async fn delete_workout(
    State(state): State<WorkoutsState>,
    Caller(caller): Caller,
    Path(id): Path<String>,
) -> Result<Json<DeleteResponse>, ApiError> {
    validate_uuid(&id)?;

    let deleted = state
        .db
        .workouts()
        .delete(&id, &caller.subject_id)
        .await
        .db_err("Failed to delete workout")?;

    if !deleted {
        return Err(ApiError::not_found("Workout not found"));
    }

    Ok(Json(DeleteResponse { success: true }))
}
