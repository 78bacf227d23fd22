//! lib.rs: main library entry for the File Storage Portal TUI
//! -----------------------------------------------------------
//! Exposes the session, remote, model, controller, task and view modules.
//! The binary in `main.rs` wires them into a single event loop.

/// --- Error handling (directory, auth and application errors) ---
pub mod error;

/// --- Configuration: API endpoint, sync timing, download dir, logging ---
pub mod config;

/// --- Session token persistence ---
pub mod session {
    pub mod token_store;
    pub use token_store::{FileTokenStore, MemoryTokenStore, TokenProvider};
}

/// --- Remote API clients ---
pub mod remote {
    pub mod auth_client;
    pub use auth_client::{AuthClient, Credentials};

    pub mod directory_client;
    pub use directory_client::{DirectoryApi, HttpDirectoryClient, SearchQuery, UploadBlob};
}

/// --- State/data models ---
pub mod model {
    pub mod file_record;
    pub use file_record::FileRecord;

    pub mod sync_state;
    pub use sync_state::{FileSetView, StatusTone, SyncStatus};

    pub mod ui_state;
    pub use ui_state::{AuthMode, LoginField, LoginForm, Screen, UIOverlay, UIState};
}

/// --- Controller: intents, synchronization state machine, event loop ---
pub mod controller {
    pub mod actions;
    pub use actions::Action;

    pub mod sync_controller;
    pub use sync_controller::{Navigation, SyncController};

    pub mod dispatcher;
    pub use dispatcher::Dispatcher;

    pub mod event_loop;
    pub use event_loop::{EventLoop, RequestId, SessionEpoch, TaskResult};
}

/// --- Background tasks (network round trips and timers) ---
pub mod tasks {
    pub mod auth_task;
    pub mod download_task;
    pub mod listing_task;
    pub mod scheduled_refresh;
    pub mod upload_task;
}

/// --- Local filesystem side effects ---
pub mod fs {
    pub mod download_sink;
    pub use download_sink::{DirectorySaver, FileSaver};
}

/// --- UI rendering ---
pub mod view {
    pub mod theme;
    pub mod ui;
    pub use ui::UIRenderer;

    pub mod components {
        pub mod file_table;
        pub use file_table::FileTable;
        pub mod help_overlay;
        pub use help_overlay::HelpOverlay;
        pub mod input_prompt_overlay;
        pub use input_prompt_overlay::InputPromptOverlay;
        pub mod login_form;
        pub use login_form::LoginFormView;
        pub mod status_bar;
        pub use status_bar::StatusBar;
    }
}

pub mod logging;
pub use logging::Logger;

pub use config::Config;
pub use error::{AppError, AuthError, DirectoryError};
