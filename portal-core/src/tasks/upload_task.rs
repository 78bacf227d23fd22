//! ``src/tasks/upload_task.rs``
//! ============================================================================
//! # Upload Task: read a local file and `POST /upload` it

use std::{path::PathBuf, sync::Arc};
use thiserror::Error;
use tokio::{sync::mpsc, task::JoinHandle};
use tracing::{Instrument, info, info_span, warn};

use crate::controller::event_loop::{SessionEpoch, TaskResult};
use crate::error::DirectoryError;
use crate::remote::directory_client::{DirectoryApi, UploadBlob};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UploadFailure {
    /// The local file could not be read.
    #[error("cannot read {path:?}: {reason}")]
    Read { path: PathBuf, reason: String },

    #[error(transparent)]
    Remote(#[from] DirectoryError),
}

pub fn spawn_upload(
    session: SessionEpoch,
    path: PathBuf,
    file_name: String,
    client: Arc<dyn DirectoryApi>,
    token: String,
    task_tx: mpsc::UnboundedSender<TaskResult>,
) -> JoinHandle<()> {
    let span = info_span!("upload", file = %file_name);

    tokio::spawn(
        async move {
            let result = match tokio::fs::read(&path).await {
                Ok(bytes) => {
                    info!(marker = "UPLOAD_TASK", bytes = bytes.len(), "Uploading");
                    client
                        .upload(&token, UploadBlob::new(file_name.clone(), bytes))
                        .await
                        .map_err(UploadFailure::Remote)
                }
                Err(e) => Err(UploadFailure::Read {
                    path: path.clone(),
                    reason: e.to_string(),
                }),
            };

            if let Err(e) = &result {
                warn!(marker = "UPLOAD_TASK", error = %e, "Upload failed");
            }

            let _ = task_tx.send(TaskResult::Upload {
                session,
                file_name,
                result,
            });
        }
        .instrument(span),
    )
}
