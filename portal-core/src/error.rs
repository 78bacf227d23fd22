//! src/error.rs
//! ============================================================================
//! # Error types for the portal client
//!
//! `DirectoryError` is the classified failure returned by every authenticated
//! call against the remote file service. `AuthError` covers the login and
//! signup endpoints. `AppError` is the unified error for everything local
//! (configuration, token persistence, saving downloads, terminal I/O).

use reqwest::StatusCode;
use serde::Deserialize;
use std::{io, path::PathBuf};
use thiserror::Error;

/// Classified failure of a file-directory request.
///
/// The client never lets a transport error escape unclassified; the
/// controller is the only place that turns one of these into a status line.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DirectoryError {
    /// HTTP 401: the session token was rejected.
    #[error("Unauthorized (401)")]
    Unauthorized,

    /// HTTP 5xx.
    #[error("Server error ({status})")]
    ServerFault { status: u16 },

    /// HTTP 404 or a response whose payload is empty.
    #[error("{0}")]
    NotFound(String),

    /// No response was received at all.
    #[error("Backend unreachable: {0}")]
    NetworkUnreachable(String),

    /// Any other status, or a body that could not be decoded.
    #[error("{0}")]
    Unknown(String),
}

impl DirectoryError {
    /// Detail used when a download completes with a zero-length body.
    pub const EMPTY_FILE: &'static str = "File is empty";

    pub fn empty_payload() -> Self {
        Self::NotFound(Self::EMPTY_FILE.to_string())
    }

    /// Classify a non-success HTTP status. Returns `None` for 2xx.
    pub fn from_status(status: StatusCode, body: &str) -> Option<Self> {
        if status.is_success() {
            return None;
        }

        let error = match status {
            StatusCode::UNAUTHORIZED => Self::Unauthorized,
            StatusCode::NOT_FOUND => Self::NotFound(
                server_error_message(body).unwrap_or_else(|| "Not found (404)".to_string()),
            ),
            s if s.is_server_error() => Self::ServerFault { status: s.as_u16() },
            s => Self::Unknown(
                server_error_message(body)
                    .unwrap_or_else(|| format!("Unexpected status {}", s.as_u16())),
            ),
        };

        Some(error)
    }

    /// Classify an error raised by the HTTP stack itself.
    pub fn from_transport(err: &reqwest::Error) -> Self {
        if let Some(status) = err.status() {
            return Self::from_status(status, "")
                .unwrap_or_else(|| Self::Unknown(err.to_string()));
        }

        if err.is_decode() {
            Self::Unknown(format!("Malformed response: {err}"))
        } else if err.is_builder() {
            Self::Unknown(err.to_string())
        } else {
            // connect, timeout, request and body errors all mean no usable response
            Self::NetworkUnreachable(err.to_string())
        }
    }
}

/// Failure of the login / signup endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// The server answered with an `{ "error": ... }` body.
    #[error("{0}")]
    Rejected(String),

    #[error("{0}")]
    Network(String),

    #[error("An unexpected error occurred. Please try again.")]
    Unexpected(String),
}

/// Unified error type for local operations.
#[derive(Debug, Error)]
pub enum AppError {
    /// Standard IO error, auto-converted from `io::Error`.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// TOML config parsing error.
    #[error("Config parse error: {0}")]
    Config(#[from] toml::de::Error),

    /// Config file I/O error with path.
    #[error("Failed to read config file {path:?}: {source}")]
    ConfigIo {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Serialization or deserialization error (e.g., JSON).
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// Session token could not be persisted or removed.
    #[error("Token store error at {path:?}: {reason}")]
    TokenStore { path: PathBuf, reason: String },

    /// Downloaded bytes could not be written to disk.
    #[error("Could not save {name}: {reason}")]
    SaveFailed { name: String, reason: String },

    /// Terminal I/O or rendering error.
    #[error("Terminal error: {0}")]
    Terminal(String),

    /// Any other error, with description.
    #[error("Unexpected error: {0}")]
    Other(String),
}

impl AppError {
    #[must_use]
    /// Attach extra context to an error.
    pub fn with_context<S: Into<String>>(self, ctx: S) -> Self {
        Self::Other(format!("{}: {}", ctx.into(), self))
    }

    pub fn token_store<P: Into<PathBuf>, S: Into<String>>(path: P, reason: S) -> Self {
        Self::TokenStore {
            path: path.into(),
            reason: reason.into(),
        }
    }

    pub fn save_failed<S1: Into<String>, S2: Into<String>>(name: S1, reason: S2) -> Self {
        Self::SaveFailed {
            name: name.into(),
            reason: reason.into(),
        }
    }
}

// Allow conversion from `anyhow::Error` as fallback.
impl From<anyhow::Error> for AppError {
    fn from(e: anyhow::Error) -> Self {
        Self::Other(e.to_string())
    }
}

#[derive(Deserialize)]
struct ServerErrorBody {
    error: String,
}

/// Extract the `error` field of a JSON error body, if there is one.
pub fn server_error_message(body: &str) -> Option<String> {
    serde_json::from_str::<ServerErrorBody>(body)
        .ok()
        .map(|b| b.error)
        .filter(|msg| !msg.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_status_is_not_an_error() {
        assert_eq!(DirectoryError::from_status(StatusCode::OK, ""), None);
        assert_eq!(DirectoryError::from_status(StatusCode::NO_CONTENT, ""), None);
    }

    #[test]
    fn statuses_map_onto_taxonomy() {
        assert_eq!(
            DirectoryError::from_status(StatusCode::UNAUTHORIZED, ""),
            Some(DirectoryError::Unauthorized)
        );
        assert_eq!(
            DirectoryError::from_status(StatusCode::INTERNAL_SERVER_ERROR, ""),
            Some(DirectoryError::ServerFault { status: 500 })
        );
        assert_eq!(
            DirectoryError::from_status(StatusCode::BAD_GATEWAY, ""),
            Some(DirectoryError::ServerFault { status: 502 })
        );
        assert!(matches!(
            DirectoryError::from_status(StatusCode::NOT_FOUND, ""),
            Some(DirectoryError::NotFound(_))
        ));
        assert_eq!(
            DirectoryError::from_status(StatusCode::FORBIDDEN, ""),
            Some(DirectoryError::Unknown("Unexpected status 403".to_string()))
        );
    }

    #[test]
    fn server_message_is_preferred_for_unknown_statuses() {
        let err = DirectoryError::from_status(
            StatusCode::BAD_REQUEST,
            r#"{"error":"No file uploaded"}"#,
        );
        assert_eq!(err, Some(DirectoryError::Unknown("No file uploaded".to_string())));
    }

    #[test]
    fn empty_payload_reads_as_empty_file() {
        assert_eq!(DirectoryError::empty_payload().to_string(), "File is empty");
    }

    #[test]
    fn server_error_message_ignores_blank_and_garbage() {
        assert_eq!(server_error_message(r#"{"error":"  "}"#), None);
        assert_eq!(server_error_message("<html>"), None);
        assert_eq!(
            server_error_message(r#"{"error":"Email taken"}"#).as_deref(),
            Some("Email taken")
        );
    }
}
