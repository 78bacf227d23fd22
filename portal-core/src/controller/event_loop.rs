//! ``src/controller/event_loop.rs``
//! ============================================================================
//! # Event Loop: terminal events and task results in, actions out
//!
//! Everything that can change application state arrives here, one event at a
//! time, so the controller never sees two mutations concurrently. Background
//! tasks report through the `TaskResult` channel.

use crossterm::event::{Event as TermEvent, EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use futures::StreamExt;
use std::path::PathBuf;
use tokio::sync::mpsc;
use tracing::{debug, trace, warn};

use crate::controller::actions::Action;
use crate::error::{AuthError, DirectoryError};
use crate::model::file_record::FileRecord;
use crate::model::ui_state::{Screen, UIOverlay, UIState};
use crate::tasks::download_task::DownloadFailure;
use crate::tasks::listing_task::ListingRequest;
use crate::tasks::upload_task::UploadFailure;

/// Monotonically increasing id attached to each listing fetch.
pub type RequestId = u64;

/// Bumped whenever a session ends (logout or a rejected token).
pub type SessionEpoch = u64;

/// Completion messages from background tasks.
#[derive(Debug, Clone)]
pub enum TaskResult {
    Listing {
        request_id: RequestId,
        request: ListingRequest,
        result: Result<Vec<FileRecord>, DirectoryError>,
    },

    Upload {
        session: SessionEpoch,
        file_name: String,
        result: Result<(), UploadFailure>,
    },

    Download {
        session: SessionEpoch,
        name: String,
        result: Result<PathBuf, DownloadFailure>,
    },

    /// The post-upload delay elapsed.
    RefreshDue { schedule_id: u64 },

    Auth { result: Result<String, AuthError> },
}

pub struct EventLoop {
    task_rx: mpsc::UnboundedReceiver<TaskResult>,
    event_stream: EventStream,
    event_count: u64,
}

impl EventLoop {
    pub fn new(task_rx: mpsc::UnboundedReceiver<TaskResult>) -> Self {
        Self {
            task_rx,
            event_stream: EventStream::new(),
            event_count: 0,
        }
    }

    pub fn event_count(&self) -> u64 {
        self.event_count
    }

    /// Waits for the next terminal event or task result.
    pub async fn next_action(&mut self, ui: &UIState) -> Action {
        let action = tokio::select! {
            maybe_event = self.event_stream.next() => match maybe_event {
                Some(Ok(event)) => {
                    trace!("Terminal event received: {:?}", event);
                    map_terminal_event(event, ui)
                }
                Some(Err(e)) => {
                    warn!(error = %e, "Terminal event stream error");
                    Action::NoOp
                }
                None => Action::Quit,
            },

            Some(result) = self.task_rx.recv() => Action::TaskResult(result),
        };

        self.event_count += 1;
        debug!(?action, "Next action");
        action
    }
}

pub fn map_terminal_event(event: TermEvent, ui: &UIState) -> Action {
    match event {
        TermEvent::Key(key) if key.kind == KeyEventKind::Press => map_key(key, ui),
        TermEvent::Resize(width, height) => Action::Resize(width, height),
        _ => Action::NoOp,
    }
}

/// Key bindings depend on which surface has focus.
pub fn map_key(key: KeyEvent, ui: &UIState) -> Action {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return Action::Quit;
    }

    match (ui.screen, ui.overlay) {
        (Screen::Entry, _) => match key.code {
            KeyCode::Esc => Action::Quit,
            KeyCode::Tab | KeyCode::Down | KeyCode::Up => Action::LoginNextField,
            KeyCode::F(2) => Action::ToggleAuthMode,
            KeyCode::Enter => Action::SubmitInput,
            KeyCode::Backspace => Action::InputBackspace,
            KeyCode::Char(c) => Action::InputChar(c),
            _ => Action::NoOp,
        },

        (Screen::Files, UIOverlay::SearchPrompt | UIOverlay::UploadPrompt) => match key.code {
            KeyCode::Esc => Action::CloseOverlay,
            KeyCode::Enter => Action::SubmitInput,
            KeyCode::Backspace => Action::InputBackspace,
            KeyCode::Char(c) => Action::InputChar(c),
            _ => Action::NoOp,
        },

        (Screen::Files, UIOverlay::Help) => match key.code {
            KeyCode::Esc | KeyCode::Char('?' | 'q') => Action::CloseOverlay,
            _ => Action::NoOp,
        },

        (Screen::Files, UIOverlay::None) => match key.code {
            KeyCode::Char('q') => Action::Quit,
            KeyCode::Char('r') | KeyCode::F(5) => Action::Refresh,
            KeyCode::Char('/') => Action::OpenSearchPrompt,
            KeyCode::Char('u') => Action::OpenUploadPrompt,
            KeyCode::Char('d') | KeyCode::Enter => Action::DownloadSelected,
            KeyCode::Char('L') => Action::Logout,
            KeyCode::Char('?') => Action::ToggleHelp,
            KeyCode::Up | KeyCode::Char('k') => Action::MoveSelectionUp,
            KeyCode::Down | KeyCode::Char('j') => Action::MoveSelectionDown,
            KeyCode::Home | KeyCode::Char('g') => Action::SelectFirst,
            KeyCode::End | KeyCode::Char('G') => Action::SelectLast,
            _ => Action::NoOp,
        },
    }
}
