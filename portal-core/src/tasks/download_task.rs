//! ``src/tasks/download_task.rs``
//! ============================================================================
//! # Download Task: fetch a file and hand it to the save sink
//!
//! Runs independently of the listing loading flag and never touches the
//! file view; its only effect on the UI is the status line.

use std::sync::Arc;
use thiserror::Error;
use tokio::{sync::mpsc, task::JoinHandle};
use tracing::{Instrument, info, info_span, warn};

use crate::controller::event_loop::{SessionEpoch, TaskResult};
use crate::error::DirectoryError;
use crate::fs::download_sink::FileSaver;
use crate::remote::directory_client::DirectoryApi;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DownloadFailure {
    #[error(transparent)]
    Remote(#[from] DirectoryError),

    #[error("{0}")]
    Save(String),
}

pub fn spawn_download(
    session: SessionEpoch,
    name: String,
    client: Arc<dyn DirectoryApi>,
    saver: Arc<dyn FileSaver>,
    token: String,
    task_tx: mpsc::UnboundedSender<TaskResult>,
) -> JoinHandle<()> {
    let span = info_span!("download", name = %name);

    tokio::spawn(
        async move {
            let result = match client.download(&token, &name).await {
                Ok(bytes) if bytes.is_empty() => {
                    Err(DownloadFailure::Remote(DirectoryError::empty_payload()))
                }
                Ok(bytes) => {
                    let file_name = name.clone();
                    // disk writes stay off the async workers
                    tokio::task::spawn_blocking(move || saver.save(&file_name, &bytes))
                        .await
                        .map_err(|e| DownloadFailure::Save(e.to_string()))
                        .and_then(|saved| saved.map_err(|e| DownloadFailure::Save(e.to_string())))
                }
                Err(e) => Err(DownloadFailure::Remote(e)),
            };

            match &result {
                Ok(path) => info!(marker = "DOWNLOAD_TASK", path = %path.display(), "Download complete"),
                Err(e) => warn!(marker = "DOWNLOAD_TASK", error = %e, "Download failed"),
            }

            let _ = task_tx.send(TaskResult::Download {
                session,
                name,
                result,
            });
        }
        .instrument(span),
    )
}
