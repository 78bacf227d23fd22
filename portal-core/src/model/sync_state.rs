//! ``src/model/sync_state.rs``
//! ============================================================================
//! # Synchronization state: the local file view and the status line
//!
//! The two are deliberately independent fields on the controller: a failed
//! search leaves the previous listing visible next to the fresh error.

use crate::model::file_record::FileRecord;

/// Local copy of the user's files, in server response order.
///
/// Only ever replaced wholesale; there is no partial update path.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileSetView {
    records: Vec<FileRecord>,
}

impl FileSetView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn replace(&mut self, records: Vec<FileRecord>) {
        self.records = records;
    }

    pub fn discard(&mut self) {
        self.records.clear();
    }

    pub fn records(&self) -> &[FileRecord] {
        &self.records
    }

    pub fn get(&self, index: usize) -> Option<&FileRecord> {
        self.records.get(index)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// What the single status line currently says.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SyncStatus {
    #[default]
    Idle,
    Loading,
    /// Informational, neither success nor failure (e.g. no search matches).
    Info(String),
    Success(String),
    Error(String),
}

/// Colour class of the status line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusTone {
    Neutral,
    Info,
    Success,
    Error,
}

impl SyncStatus {
    pub fn info(message: impl Into<String>) -> Self {
        Self::Info(message.into())
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::Success(message.into())
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::Error(message.into())
    }

    /// Visible text; empty for `Idle`.
    pub fn message(&self) -> &str {
        match self {
            Self::Idle => "",
            Self::Loading => "Loading files...",
            Self::Info(msg) | Self::Success(msg) | Self::Error(msg) => msg,
        }
    }

    pub fn tone(&self) -> StatusTone {
        match self {
            Self::Idle => StatusTone::Neutral,
            Self::Loading | Self::Info(_) => StatusTone::Info,
            Self::Success(_) => StatusTone::Success,
            Self::Error(_) => StatusTone::Error,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }
}
