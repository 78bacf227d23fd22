//! ``src/tasks/listing_task.rs``
//! ============================================================================
//! # Listing Task: one `GET /files` or `GET /search` round trip
//!
//! The task always reports back exactly once, tagged with the request id the
//! controller issued, even if the client future panics.

use futures::FutureExt;
use std::{panic::AssertUnwindSafe, sync::Arc, time::Instant};
use tokio::{sync::mpsc, task::JoinHandle};
use tracing::{Instrument, info, info_span, warn};

use crate::controller::event_loop::{RequestId, TaskResult};
use crate::error::DirectoryError;
use crate::remote::directory_client::{DirectoryApi, SearchQuery};

/// Which listing the controller asked for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListingRequest {
    All,
    Search(SearchQuery),
}

impl ListingRequest {
    pub fn label(&self) -> &'static str {
        match self {
            Self::All => "list_all",
            Self::Search(_) => "search",
        }
    }
}

pub fn spawn_listing_fetch(
    request_id: RequestId,
    request: ListingRequest,
    client: Arc<dyn DirectoryApi>,
    token: String,
    task_tx: mpsc::UnboundedSender<TaskResult>,
) -> JoinHandle<()> {
    let span = info_span!(
        "listing_fetch",
        request_id,
        operation_type = request.label()
    );

    tokio::spawn(
        async move {
            let started = Instant::now();

            let call = async {
                match &request {
                    ListingRequest::All => client.list_all(&token).await,
                    ListingRequest::Search(query) => client.search(&token, query).await,
                }
            };

            let result = AssertUnwindSafe(call)
                .catch_unwind()
                .await
                .unwrap_or_else(|_| Err(DirectoryError::Unknown("listing task panicked".to_string())));

            match &result {
                Ok(records) => info!(
                    marker = "LISTING_TASK",
                    count = records.len(),
                    duration_ms = started.elapsed().as_millis(),
                    "Listing fetched"
                ),
                Err(e) => warn!(
                    marker = "LISTING_TASK",
                    error = %e,
                    duration_ms = started.elapsed().as_millis(),
                    "Listing failed"
                ),
            }

            let _ = task_tx.send(TaskResult::Listing {
                request_id,
                request,
                result,
            });
        }
        .instrument(span),
    )
}
