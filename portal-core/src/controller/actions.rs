//! src/controller/actions.rs
//! ============================================================================
//! # Actions: Centralized Application Commands
//!
//! Defines the `Action` enum: every user intent emitted by the presentation
//! surfaces plus every internal event (task results) the dispatcher reacts
//! to. Raw terminal events are mapped to these in the event loop.

use std::path::PathBuf;

use crate::controller::event_loop::TaskResult;

/// Represents a high-level action that the application can perform.
#[derive(Debug, Clone)]
pub enum Action {
    /// Quit the application.
    Quit,

    /// A terminal resize event.
    Resize(u16, u16),

    /// Event consumed, nothing to do.
    NoOp,

    // --- file table ---
    MoveSelectionUp,

    MoveSelectionDown,

    SelectFirst,

    SelectLast,

    // --- overlays and text input ---
    ToggleHelp,

    /// Open the search prompt, prefilled with the last query.
    OpenSearchPrompt,

    /// Open the upload prompt for a local file path.
    OpenUploadPrompt,

    CloseOverlay,

    InputChar(char),

    InputBackspace,

    /// Enter pressed inside a prompt or the login form.
    SubmitInput,

    // --- entry surface ---
    /// Switch focus between email and password.
    LoginNextField,

    /// Switch between sign-in and sign-up.
    ToggleAuthMode,

    // --- synchronization intents ---
    /// Files surface shown; list everything if a session exists.
    Mount,

    Refresh,

    SearchSubmitted(String),

    UploadRequested(PathBuf),

    /// Download whatever row is selected in the file table.
    DownloadSelected,

    DownloadClicked(String),

    Logout,

    /// A result from a background task.
    TaskResult(TaskResult),
}
