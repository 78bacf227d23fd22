//! ``src/remote/directory_client.rs``
//! ============================================================================
//! # Remote File Directory Client
//!
//! Issues the authenticated list / search / download / upload calls against
//! the file service and classifies every failure into a [`DirectoryError`].
//! There are no retries here: retrying is always a user action.
//!
//! Endpoints (all carry `Authorization: Bearer <token>`):
//! - `GET  /files`                  → `[{id, name, uploadDate}]`
//! - `GET  /search?query=<text>`    → same shape
//! - `GET  /download?query=<name>`  → raw bytes, empty body is a failure
//! - `POST /upload` (multipart `file`)

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{Client, RequestBuilder, Response, multipart};
use tracing::{debug, instrument, warn};

use crate::error::{AppError, DirectoryError};
use crate::model::file_record::FileRecord;

/// A search string that is known not to be blank.
///
/// Blank input never reaches the search endpoint; it means "list all".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery(String);

impl SearchQuery {
    /// Returns `None` for empty or whitespace-only input.
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SearchQuery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// File contents to upload, with the name the server should store.
#[derive(Debug, Clone)]
pub struct UploadBlob {
    pub file_name: String,
    pub bytes: Bytes,
}

impl UploadBlob {
    pub fn new(file_name: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes: bytes.into(),
        }
    }
}

/// Operations against the remote directory. Callers check token presence.
#[async_trait]
pub trait DirectoryApi: Send + Sync {
    async fn list_all(&self, token: &str) -> Result<Vec<FileRecord>, DirectoryError>;

    async fn search(
        &self,
        token: &str,
        query: &SearchQuery,
    ) -> Result<Vec<FileRecord>, DirectoryError>;

    /// Full body of the named file. A zero-length body is `NotFound`.
    async fn download(&self, token: &str, name: &str) -> Result<Bytes, DirectoryError>;

    async fn upload(&self, token: &str, file: UploadBlob) -> Result<(), DirectoryError>;
}

/// `reqwest`-backed directory client.
#[derive(Debug, Clone)]
pub struct HttpDirectoryClient {
    http: Client,
    base_url: String,
}

impl HttpDirectoryClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self, AppError> {
        let http = Client::builder()
            .build()
            .map_err(|e| AppError::Other(format!("HTTP client init failed: {e}")))?;
        Ok(Self::with_client(http, base_url))
    }

    /// Share an existing connection pool (e.g. with the auth client).
    pub fn with_client(http: Client, base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn send(req: RequestBuilder) -> Result<Response, DirectoryError> {
        let resp = req
            .send()
            .await
            .map_err(|e| DirectoryError::from_transport(&e))?;

        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }

        let body = resp.text().await.unwrap_or_default();
        let err = DirectoryError::from_status(status, &body)
            .unwrap_or_else(|| DirectoryError::Unknown(format!("Unexpected status {status}")));
        warn!(status = status.as_u16(), error = %err, "Directory request rejected");
        Err(err)
    }

    async fn fetch_records(req: RequestBuilder) -> Result<Vec<FileRecord>, DirectoryError> {
        let resp = Self::send(req).await?;
        resp.json::<Vec<FileRecord>>()
            .await
            .map_err(|e| DirectoryError::Unknown(format!("Malformed response: {e}")))
    }
}

#[async_trait]
impl DirectoryApi for HttpDirectoryClient {
    #[instrument(level = "debug", skip(self, token))]
    async fn list_all(&self, token: &str) -> Result<Vec<FileRecord>, DirectoryError> {
        let req = self.http.get(self.url("/files")).bearer_auth(token);
        let records = Self::fetch_records(req).await?;
        debug!(count = records.len(), "Listed files");
        Ok(records)
    }

    #[instrument(level = "debug", skip(self, token), fields(query = %query))]
    async fn search(
        &self,
        token: &str,
        query: &SearchQuery,
    ) -> Result<Vec<FileRecord>, DirectoryError> {
        let req = self
            .http
            .get(self.url("/search"))
            .query(&[("query", query.as_str())])
            .bearer_auth(token);
        let records = Self::fetch_records(req).await?;
        debug!(count = records.len(), "Search returned");
        Ok(records)
    }

    #[instrument(level = "debug", skip(self, token))]
    async fn download(&self, token: &str, name: &str) -> Result<Bytes, DirectoryError> {
        let req = self
            .http
            .get(self.url("/download"))
            .query(&[("query", name)])
            .bearer_auth(token);

        let resp = Self::send(req).await?;
        let body = resp
            .bytes()
            .await
            .map_err(|e| DirectoryError::from_transport(&e))?;

        if body.is_empty() {
            warn!(name, "Download returned an empty body");
            return Err(DirectoryError::empty_payload());
        }

        debug!(name, bytes = body.len(), "Downloaded file");
        Ok(body)
    }

    #[instrument(level = "debug", skip(self, token, file), fields(file_name = %file.file_name, bytes = file.bytes.len()))]
    async fn upload(&self, token: &str, file: UploadBlob) -> Result<(), DirectoryError> {
        let part = multipart::Part::bytes(file.bytes.to_vec())
            .file_name(file.file_name)
            .mime_str("application/octet-stream")
            .map_err(|e| DirectoryError::Unknown(format!("MIME error: {e}")))?;
        let form = multipart::Form::new().part("file", part);

        let req = self
            .http
            .post(self.url("/upload"))
            .bearer_auth(token)
            .multipart(form);

        Self::send(req).await?;
        debug!("Upload accepted");
        Ok(())
    }
}
