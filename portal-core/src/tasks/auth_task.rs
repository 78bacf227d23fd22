//! ``src/tasks/auth_task.rs``
//! ============================================================================
//! # Auth Task: login or signup off the event loop

use tokio::{sync::mpsc, task::JoinHandle};
use tracing::{Instrument, info_span};

use crate::controller::event_loop::TaskResult;
use crate::model::ui_state::AuthMode;
use crate::remote::auth_client::{AuthClient, Credentials};

pub fn spawn_auth(
    mode: AuthMode,
    credentials: Credentials,
    client: AuthClient,
    task_tx: mpsc::UnboundedSender<TaskResult>,
) -> JoinHandle<()> {
    let span = info_span!("auth", mode = ?mode);

    tokio::spawn(
        async move {
            let result = match mode {
                AuthMode::Login => client.login(&credentials).await,
                AuthMode::Signup => client.signup(&credentials).await,
            };
            let _ = task_tx.send(TaskResult::Auth { result });
        }
        .instrument(span),
    )
}
