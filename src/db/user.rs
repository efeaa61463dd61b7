use sqlx::sqlite::SqlitePool;

#[derive(Clone)]
pub struct UserStore {
    pool: SqlitePool,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    /// Opaque stable identifier, used as the session subject.
    pub resource_id: String,
    pub email: String,
    pub name: Option<String>,
    pub phone_number: Option<String>,
}

/// What login needs to check a password and mint a session.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UserCredentials {
    pub digest: Option<String>,
    pub subject_id: String,
    pub email: String,
    pub name: Option<String>,
}

/// Fields for inserting a user.
#[derive(Debug, Clone)]
pub struct NewUser<'a> {
    pub email: &'a str,
    pub name: Option<&'a str>,
    pub phone_number: Option<&'a str>,
    pub password_digest: &'a str,
}

/// Identifier a user logs in with.
#[derive(Debug, Clone, Copy)]
pub enum UserLookup<'a> {
    Email(&'a str),
    PhoneNumber(&'a str),
}

impl UserStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a user with a fresh resource id.
    /// Fails with a unique violation if the email is taken.
    pub async fn create(&self, new_user: &NewUser<'_>) -> Result<User, sqlx::Error> {
        let resource_id = uuid::Uuid::new_v4().to_string();

        let result = sqlx::query(
            "INSERT INTO users (resource_id, email, password_digest, phone_number, name)
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&resource_id)
        .bind(new_user.email)
        .bind(new_user.password_digest)
        .bind(new_user.phone_number)
        .bind(new_user.name)
        .execute(&self.pool)
        .await?;

        Ok(User {
            id: result.last_insert_rowid(),
            resource_id,
            email: new_user.email.to_string(),
            name: new_user.name.map(str::to_string),
            phone_number: new_user.phone_number.map(str::to_string),
        })
    }

    /// Look up the credentials of a user by email or phone number.
    pub async fn find_credentials(
        &self,
        lookup: UserLookup<'_>,
    ) -> Result<Option<UserCredentials>, sqlx::Error> {
        let (query, value) = match lookup {
            UserLookup::Email(email) => (
                "SELECT password_digest AS digest, resource_id AS subject_id, email, name
                 FROM users WHERE email = ?",
                email,
            ),
            UserLookup::PhoneNumber(phone) => (
                "SELECT password_digest AS digest, resource_id AS subject_id, email, name
                 FROM users WHERE phone_number = ? ORDER BY id LIMIT 1",
                phone,
            ),
        };

        sqlx::query_as(query)
            .bind(value)
            .fetch_optional(&self.pool)
            .await
    }
}
