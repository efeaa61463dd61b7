//! HTTP client for the auth and workouts endpoints.
//!
//! The session token lives in the client's cookie store; this client never
//! reads it. The shared [`SessionState`] is updated from response bodies.

use reqwest::{StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::session::SessionState;
use crate::auth::CallerIdentity;
use crate::db::Workout;
use crate::validation::looks_like_email;

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),
    #[error("not authenticated")]
    Unauthorized,
    #[error("server returned {status}: {message}")]
    Status { status: StatusCode, message: String },
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct LoginRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    email: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    phone_number: Option<&'a str>,
    password: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<&'a str>,
}

#[derive(Deserialize)]
struct SessionResponse {
    user: CallerIdentity,
}

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

#[derive(Clone)]
pub struct ApiClient {
    base: Url,
    client: reqwest::Client,
    session: SessionState,
}

impl ApiClient {
    pub fn new(base: &str, session: SessionState) -> Result<Self, ClientError> {
        let base = Url::parse(base)?;
        let client = reqwest::Client::builder().cookie_store(true).build()?;
        Ok(Self {
            base,
            client,
            session,
        })
    }

    pub fn session(&self) -> &SessionState {
        &self.session
    }

    /// Log in with an e-mail address or a phone number.
    pub async fn login(
        &self,
        identifier: &str,
        password: &str,
    ) -> Result<CallerIdentity, ClientError> {
        let identifier = identifier.trim();
        let body = if looks_like_email(identifier) {
            LoginRequest {
                email: Some(identifier),
                phone_number: None,
                password,
            }
        } else {
            LoginRequest {
                email: None,
                phone_number: Some(identifier),
                password,
            }
        };

        let response = self
            .client
            .post(self.base.join("/api/auth/login")?)
            .json(&body)
            .send()
            .await?;
        let session: SessionResponse = parse(response).await?;

        self.session.sign_in(session.user.clone());
        Ok(session.user)
    }

    pub async fn register(&self, request: &RegisterRequest<'_>) -> Result<CallerIdentity, ClientError> {
        let response = self
            .client
            .post(self.base.join("/api/auth/register")?)
            .json(request)
            .send()
            .await?;
        let session: SessionResponse = parse(response).await?;

        self.session.sign_in(session.user.clone());
        Ok(session.user)
    }

    /// Drop the session cookie. The local state is cleared even if the
    /// request fails.
    pub async fn logout(&self) -> Result<(), ClientError> {
        self.session.sign_out();
        let response = self
            .client
            .post(self.base.join("/api/auth/logout")?)
            .send()
            .await?;
        let _: serde_json::Value = parse(response).await?;
        Ok(())
    }

    /// Ask the server who the cookie belongs to and update the state.
    /// Returns `None` when there is no valid session.
    pub async fn restore_session(&self) -> Result<Option<CallerIdentity>, ClientError> {
        match self.get::<CallerIdentity>("/api/auth/me").await {
            Ok(identity) => {
                self.session.sign_in(identity.clone());
                Ok(Some(identity))
            }
            Err(ClientError::Unauthorized) => {
                debug!("No valid session on the server");
                self.session.sign_out();
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    pub async fn workouts(&self) -> Result<Vec<Workout>, ClientError> {
        self.get("/api/workouts").await
    }

    /// GET a JSON resource. A 401 signs the local session out.
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        let response = self.client.get(self.base.join(path)?).send().await?;
        let result = parse(response).await;
        if matches!(result, Err(ClientError::Unauthorized)) {
            self.session.sign_out();
        }
        result
    }
}

async fn parse<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ClientError> {
    let status = response.status();
    if status == StatusCode::UNAUTHORIZED {
        return Err(ClientError::Unauthorized);
    }
    if !status.is_success() {
        let message = match response.json::<ErrorBody>().await {
            Ok(body) => body.error,
            Err(_) => status.to_string(),
        };
        return Err(ClientError::Status { status, message });
    }
    Ok(response.json().await?)
}
