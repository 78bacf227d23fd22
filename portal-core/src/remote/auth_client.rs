//! ``src/remote/auth_client.rs``
//! ============================================================================
//! # Auth Client: `POST /auth/login` and `POST /auth/signup`
//!
//! Both endpoints take `{email, password}` and answer `{token}`. Failures
//! carry an `{error}` body which is shown to the user verbatim.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use crate::error::{AuthError, server_error_message};

#[derive(Debug, Clone, Serialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    token: String,
}

#[derive(Debug, Clone)]
pub struct AuthClient {
    http: Client,
    base_url: String,
}

impl AuthClient {
    pub fn new(http: Client, base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub async fn login(&self, credentials: &Credentials) -> Result<String, AuthError> {
        self.exchange("/auth/login", credentials).await
    }

    pub async fn signup(&self, credentials: &Credentials) -> Result<String, AuthError> {
        self.exchange("/auth/signup", credentials).await
    }

    #[instrument(level = "debug", skip(self, credentials), fields(email = %credentials.email))]
    async fn exchange(&self, path: &str, credentials: &Credentials) -> Result<String, AuthError> {
        let resp = self
            .http
            .post(format!("{}{}", self.base_url, path))
            .json(credentials)
            .send()
            .await
            .map_err(|e| AuthError::Network(e.to_string()))?;

        let status = resp.status();
        let body = resp
            .text()
            .await
            .map_err(|e| AuthError::Network(e.to_string()))?;

        if !status.is_success() {
            warn!(status = status.as_u16(), path, "Authentication rejected");
            return Err(match server_error_message(&body) {
                Some(msg) => AuthError::Rejected(msg),
                None => AuthError::Rejected(format!("Request failed with status code {}", status.as_u16())),
            });
        }

        let parsed: TokenResponse = serde_json::from_str(&body)
            .map_err(|e| AuthError::Unexpected(e.to_string()))?;

        if parsed.token.is_empty() {
            return Err(AuthError::Unexpected("empty token".to_string()));
        }

        info!(path, "Authenticated");
        Ok(parsed.token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{Json, Router, http::StatusCode, response::IntoResponse, routing::post};
    use serde_json::{Value, json};

    async fn login(Json(body): Json<Value>) -> axum::response::Response {
        if body["password"] == "hunter2" {
            Json(json!({"token": "t-123"})).into_response()
        } else {
            (StatusCode::UNAUTHORIZED, Json(json!({"error": "Invalid credentials"}))).into_response()
        }
    }

    async fn signup() -> axum::response::Response {
        (StatusCode::CONFLICT, "plain text").into_response()
    }

    async fn spawn_server() -> String {
        let app = Router::new()
            .route("/auth/login", post(login))
            .route("/auth/signup", post(signup));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    #[tokio::test]
    async fn login_returns_token() {
        let client = AuthClient::new(Client::new(), spawn_server().await);
        let token = client
            .login(&Credentials::new("me@example.com", "hunter2"))
            .await
            .unwrap();
        assert_eq!(token, "t-123");
    }

    #[tokio::test]
    async fn server_error_message_is_surfaced() {
        let client = AuthClient::new(Client::new(), spawn_server().await);
        let err = client
            .login(&Credentials::new("me@example.com", "wrong"))
            .await
            .unwrap_err();
        assert_eq!(err, AuthError::Rejected("Invalid credentials".to_string()));
    }

    #[tokio::test]
    async fn rejection_without_error_body_names_status() {
        let client = AuthClient::new(Client::new(), spawn_server().await);
        let err = client
            .signup(&Credentials::new("me@example.com", "x"))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Request failed with status code 409");
    }
}
