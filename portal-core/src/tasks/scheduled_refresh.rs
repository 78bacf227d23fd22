//! ``src/tasks/scheduled_refresh.rs``
//! ============================================================================
//! # Scheduled Refresh: the delayed re-listing after an upload
//!
//! The backing store is eventually consistent, so a fresh upload may not be
//! listed immediately. The refresh is an explicit task with a cancellation
//! handle; dropping or cancelling the handle stops it from firing.

use std::time::Duration;
use tokio::{sync::mpsc, task::JoinHandle};
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

use crate::controller::event_loop::TaskResult;

/// Handle to a pending refresh. Cancels the refresh when dropped.
#[derive(Debug)]
pub struct ScheduledRefresh {
    id: u64,
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

impl ScheduledRefresh {
    /// Sends `TaskResult::RefreshDue { schedule_id: id }` after `delay`.
    pub fn schedule(id: u64, delay: Duration, task_tx: mpsc::UnboundedSender<TaskResult>) -> Self {
        let cancel = CancellationToken::new();
        let child = cancel.clone();

        let handle = tokio::spawn(async move {
            tokio::select! {
                () = child.cancelled() => {
                    trace!(schedule_id = id, "Scheduled refresh cancelled");
                }
                () = tokio::time::sleep(delay) => {
                    debug!(schedule_id = id, delay_ms = delay.as_millis(), "Scheduled refresh due");
                    let _ = task_tx.send(TaskResult::RefreshDue { schedule_id: id });
                }
            }
        });

        Self { id, cancel, handle }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Drop for ScheduledRefresh {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
