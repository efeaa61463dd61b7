use serde::{Deserialize, Serialize};
use sqlx::sqlite::SqlitePool;

/// Workouts, always accessed through the owning user's resource id.
#[derive(Clone)]
pub struct WorkoutStore {
    pool: SqlitePool,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Workout {
    #[serde(rename = "id")]
    pub resource_id: String,
    pub name: String,
    pub date: String,
    pub notes: Option<String>,
    pub completed_at: Option<String>,
    pub created_at: String,
}

#[derive(Debug, Clone)]
pub struct NewWorkout<'a> {
    pub name: &'a str,
    pub date: &'a str,
    pub notes: Option<&'a str>,
}

/// Fields to change on a workout. `None` leaves a field as it is.
#[derive(Debug, Clone, Default)]
pub struct WorkoutUpdate<'a> {
    pub name: Option<&'a str>,
    pub date: Option<&'a str>,
    pub notes: Option<&'a str>,
    pub completed_at: Option<&'a str>,
}

const WORKOUT_COLUMNS: &str =
    "w.resource_id, w.name, w.date, w.notes, w.completed_at, w.created_at";

impl WorkoutStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a workout for the given owner. Returns None if the owner does
    /// not exist.
    pub async fn create(
        &self,
        owner: &str,
        workout: &NewWorkout<'_>,
    ) -> Result<Option<Workout>, sqlx::Error> {
        let resource_id = uuid::Uuid::new_v4().to_string();

        let result = sqlx::query(
            "INSERT INTO workouts (resource_id, user_id, name, date, notes)
             SELECT ?, id, ?, ?, ? FROM users WHERE resource_id = ?",
        )
        .bind(&resource_id)
        .bind(workout.name)
        .bind(workout.date)
        .bind(workout.notes)
        .bind(owner)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }

        self.get(&resource_id, owner).await
    }

    /// List the owner's workouts, newest date first.
    pub async fn list(&self, owner: &str) -> Result<Vec<Workout>, sqlx::Error> {
        let query = format!(
            "SELECT {} FROM workouts w JOIN users u ON w.user_id = u.id
             WHERE u.resource_id = ? ORDER BY w.date DESC, w.id DESC",
            WORKOUT_COLUMNS
        );
        sqlx::query_as(sqlx::AssertSqlSafe(query))
            .bind(owner)
            .fetch_all(&self.pool)
            .await
    }

    /// Get one of the owner's workouts.
    pub async fn get(
        &self,
        resource_id: &str,
        owner: &str,
    ) -> Result<Option<Workout>, sqlx::Error> {
        let query = format!(
            "SELECT {} FROM workouts w JOIN users u ON w.user_id = u.id
             WHERE w.resource_id = ? AND u.resource_id = ?",
            WORKOUT_COLUMNS
        );
        sqlx::query_as(sqlx::AssertSqlSafe(query))
            .bind(resource_id)
            .bind(owner)
            .fetch_optional(&self.pool)
            .await
    }

    /// Update one of the owner's workouts. Returns None if the owner has no
    /// such workout.
    pub async fn update(
        &self,
        resource_id: &str,
        owner: &str,
        update: &WorkoutUpdate<'_>,
    ) -> Result<Option<Workout>, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE workouts SET
                name = COALESCE(?, name),
                date = COALESCE(?, date),
                notes = COALESCE(?, notes),
                completed_at = COALESCE(?, completed_at)
             WHERE resource_id = ?
             AND user_id = (SELECT id FROM users WHERE resource_id = ?)",
        )
        .bind(update.name)
        .bind(update.date)
        .bind(update.notes)
        .bind(update.completed_at)
        .bind(resource_id)
        .bind(owner)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }

        self.get(resource_id, owner).await
    }

    /// Delete one of the owner's workouts.
    pub async fn delete(&self, resource_id: &str, owner: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "DELETE FROM workouts WHERE resource_id = ?
             AND user_id = (SELECT id FROM users WHERE resource_id = ?)",
        )
        .bind(resource_id)
        .bind(owner)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
