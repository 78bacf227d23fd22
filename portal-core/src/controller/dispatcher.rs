//! src/controller/dispatcher.rs
//! ============================================================================
//! # Dispatcher: routes actions to the UI state and the sync controller
//!
//! Single owner of [`UIState`] and [`SyncController`]. The event loop feeds it
//! one [`Action`] at a time; the renderer borrows both read-only between
//! actions.

use std::{path::PathBuf, sync::Arc};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::controller::{
    actions::Action,
    event_loop::TaskResult,
    sync_controller::{Navigation, SyncController},
};
use crate::error::AuthError;
use crate::model::ui_state::{Screen, UIOverlay, UIState};
use crate::remote::auth_client::{AuthClient, Credentials};
use crate::session::token_store::TokenProvider;
use crate::tasks::auth_task::spawn_auth;

pub struct Dispatcher {
    sync: SyncController,
    ui: UIState,
    auth: AuthClient,
    tokens: Arc<dyn TokenProvider>,
    task_tx: mpsc::UnboundedSender<TaskResult>,
    handled: u64,
}

impl Dispatcher {
    pub fn new(
        sync: SyncController,
        auth: AuthClient,
        tokens: Arc<dyn TokenProvider>,
        task_tx: mpsc::UnboundedSender<TaskResult>,
    ) -> Self {
        Self {
            sync,
            ui: UIState::new(),
            auth,
            tokens,
            task_tx,
            handled: 0,
        }
    }

    pub fn ui(&self) -> &UIState {
        &self.ui
    }

    pub fn ui_mut(&mut self) -> &mut UIState {
        &mut self.ui
    }

    pub fn sync(&self) -> &SyncController {
        &self.sync
    }

    pub fn handled(&self) -> u64 {
        self.handled
    }

    /// Show the files surface and list everything. Used at startup when a
    /// persisted session exists.
    pub fn enter_files(&mut self) {
        self.ui.screen = Screen::Files;
        self.ui.selected = 0;
        self.handle(Action::Mount);
    }

    /// Returns `false` when the application should exit.
    pub fn handle(&mut self, action: Action) -> bool {
        self.handled += 1;

        match action {
            Action::Quit => {
                info!("Quit requested");
                return false;
            }
            Action::NoOp => return true,
            Action::Resize(width, height) => debug!(width, height, "Terminal resized"),

            Action::MoveSelectionUp
            | Action::MoveSelectionDown
            | Action::SelectFirst
            | Action::SelectLast => self.dispatch_selection(action),

            Action::ToggleHelp
            | Action::OpenSearchPrompt
            | Action::OpenUploadPrompt
            | Action::CloseOverlay
            | Action::InputChar(_)
            | Action::InputBackspace
            | Action::SubmitInput
            | Action::LoginNextField
            | Action::ToggleAuthMode => self.dispatch_ui(action),

            Action::Mount
            | Action::Refresh
            | Action::SearchSubmitted(_)
            | Action::UploadRequested(_)
            | Action::DownloadSelected
            | Action::DownloadClicked(_)
            | Action::Logout => self.dispatch_sync(action),

            Action::TaskResult(result) => self.dispatch_task_result(result),
        }

        self.ui.request_redraw();
        true
    }

    fn dispatch_selection(&mut self, action: Action) {
        let len = self.sync.files().len();
        match action {
            Action::MoveSelectionUp => self.ui.select_prev(),
            Action::MoveSelectionDown => self.ui.select_next(len),
            Action::SelectFirst => self.ui.selected = 0,
            Action::SelectLast => self.ui.select_last(len),
            _ => {}
        }
    }

    fn dispatch_ui(&mut self, action: Action) {
        match action {
            Action::ToggleHelp => {
                if self.ui.overlay == UIOverlay::Help {
                    self.ui.close_overlay();
                } else {
                    self.ui.open_overlay(UIOverlay::Help, "");
                }
            }
            Action::OpenSearchPrompt => {
                let prefill = self.ui.search_term.clone();
                self.ui.open_overlay(UIOverlay::SearchPrompt, &prefill);
            }
            Action::OpenUploadPrompt => self.ui.open_overlay(UIOverlay::UploadPrompt, ""),
            Action::CloseOverlay => self.ui.close_overlay(),

            Action::InputChar(c) => match self.ui.screen {
                Screen::Entry => self.ui.login.focused_mut().push(c),
                Screen::Files => self.ui.input.push(c),
            },
            Action::InputBackspace => {
                match self.ui.screen {
                    Screen::Entry => self.ui.login.focused_mut().pop(),
                    Screen::Files => self.ui.input.pop(),
                };
            }

            Action::LoginNextField => self.ui.login.next_field(),
            Action::ToggleAuthMode => self.ui.login.toggle_mode(),

            Action::SubmitInput => self.submit_input(),
            _ => {}
        }
    }

    fn submit_input(&mut self) {
        match (self.ui.screen, self.ui.overlay) {
            (Screen::Entry, _) => self.submit_login(),

            (Screen::Files, UIOverlay::SearchPrompt) => {
                let query = std::mem::take(&mut self.ui.input);
                self.ui.close_overlay();
                self.handle(Action::SearchSubmitted(query));
            }

            (Screen::Files, UIOverlay::UploadPrompt) => {
                let path = PathBuf::from(self.ui.input.trim());
                self.ui.close_overlay();
                self.handle(Action::UploadRequested(path));
            }

            _ => debug!("Submit with nothing to submit"),
        }
    }

    fn submit_login(&mut self) {
        let form = &mut self.ui.login;
        if form.submitting {
            debug!("Auth already in flight");
            return;
        }
        if !form.is_complete() {
            form.error = Some("Email and password are required.".to_string());
            return;
        }

        form.error = None;
        form.submitting = true;
        let credentials = Credentials::new(form.email.trim(), form.password.clone());
        info!(mode = ?form.mode, "Submitting credentials");
        spawn_auth(form.mode, credentials, self.auth.clone(), self.task_tx.clone());
    }

    fn dispatch_sync(&mut self, action: Action) {
        let nav = match action {
            Action::Mount => self.sync.mount(),
            Action::Refresh => self.sync.refresh(),
            Action::SearchSubmitted(query) => {
                self.ui.search_term = query.trim().to_string();
                self.sync.submit_search(&query)
            }
            Action::UploadRequested(path) => self.sync.upload(&path),
            Action::DownloadSelected => {
                let Some(name) = self
                    .sync
                    .files()
                    .get(self.ui.selected)
                    .map(|record| record.name.clone())
                else {
                    debug!("Download requested with no selection");
                    return;
                };
                self.sync.download(&name)
            }
            Action::DownloadClicked(name) => self.sync.download(&name),
            Action::Logout => self.sync.logout(),
            _ => Navigation::Stay,
        };
        self.navigate(nav);
    }

    fn dispatch_task_result(&mut self, result: TaskResult) {
        match result {
            TaskResult::Auth { result } => self.apply_auth(result),
            other => {
                let listing = matches!(other, TaskResult::Listing { .. });
                let nav = self.sync.apply(other);
                if listing {
                    self.ui.clamp_selection(self.sync.files().len());
                }
                self.navigate(nav);
            }
        }
    }

    fn apply_auth(&mut self, result: Result<String, AuthError>) {
        if !self.ui.login.submitting {
            debug!("Ignoring auth result with no pending submission");
            return;
        }
        self.ui.login.submitting = false;

        match result {
            Ok(token) => {
                if let Err(e) = self.tokens.set(token) {
                    warn!(error = %e, "Failed to persist token");
                    self.ui.login.error = Some(e.to_string());
                    return;
                }
                info!("Authenticated");
                self.ui.login.reset();
                self.enter_files();
            }
            Err(e) => {
                warn!(error = %e, "Authentication failed");
                self.ui.login.error = Some(e.to_string());
            }
        }
    }

    fn navigate(&mut self, nav: Navigation) {
        if nav == Navigation::Entry && self.ui.screen != Screen::Entry {
            info!("Leaving files surface for entry");
            self.ui.show_entry();
        }
    }
}
