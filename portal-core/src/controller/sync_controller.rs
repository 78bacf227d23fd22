//! ``src/controller/sync_controller.rs``
//! ============================================================================
//! # Synchronization Controller
//!
//! Owns the local [`FileSetView`], the single [`SyncStatus`] line and the
//! listing loading flag. Four triggers re-fetch the listing: mount, refresh,
//! search submission and a successful upload (after a delay). Downloads run
//! beside all of that and only ever touch the status line.
//!
//! All methods run on the event loop task; network work is spawned and its
//! outcome comes back through [`SyncController::apply`].
//!
//! Ordering: each listing fetch carries a [`RequestId`]. Only the response to
//! the most recently issued id is applied; anything older is dropped.
//! Uploads and downloads carry the [`SessionEpoch`] they started in, and a
//! result from an ended session is dropped.

use std::{path::Path, sync::Arc, time::Duration};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::controller::event_loop::{RequestId, SessionEpoch, TaskResult};
use crate::error::DirectoryError;
use crate::fs::download_sink::FileSaver;
use crate::model::file_record::FileRecord;
use crate::model::sync_state::{FileSetView, SyncStatus};
use crate::remote::directory_client::{DirectoryApi, SearchQuery};
use crate::session::token_store::TokenProvider;
use crate::tasks::{
    download_task::{DownloadFailure, spawn_download},
    listing_task::{ListingRequest, spawn_listing_fetch},
    scheduled_refresh::ScheduledRefresh,
    upload_task::{UploadFailure, spawn_upload},
};

pub const MSG_AUTH_FAILED: &str = "Authentication failed. Please login again.";
pub const MSG_SERVER_ERROR: &str = "Server error. Please try again.";
pub const MSG_NETWORK_ERROR: &str = "Network error. Check if backend is running.";
pub const MSG_LIST_FAILED: &str = "Failed to load files. Please try again.";
pub const MSG_SEARCH_FAILED: &str = "Search failed. Please try again.";
pub const MSG_NO_FILE_SELECTED: &str = "Please select a file first.";
pub const MSG_UPLOAD_NO_SESSION: &str = "Authentication error. Please log in again.";
pub const MSG_DOWNLOAD_NO_SESSION: &str = "Please login again.";
pub const MSG_UPLOAD_BUSY: &str = "An upload is already in progress.";

/// Where the UI should be after a controller call.
#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    Stay,
    /// Leave for the login surface.
    Entry,
}

pub struct SyncController {
    client: Arc<dyn DirectoryApi>,
    tokens: Arc<dyn TokenProvider>,
    saver: Arc<dyn FileSaver>,
    task_tx: mpsc::UnboundedSender<TaskResult>,
    refresh_delay: Duration,

    files: FileSetView,
    status: SyncStatus,
    loading: bool,
    uploading: bool,

    latest_request: RequestId,
    session: SessionEpoch,
    next_schedule_id: u64,
    pending_refresh: Option<ScheduledRefresh>,
}

impl SyncController {
    pub fn new(
        client: Arc<dyn DirectoryApi>,
        tokens: Arc<dyn TokenProvider>,
        saver: Arc<dyn FileSaver>,
        task_tx: mpsc::UnboundedSender<TaskResult>,
        refresh_delay: Duration,
    ) -> Self {
        Self {
            client,
            tokens,
            saver,
            task_tx,
            refresh_delay,
            files: FileSetView::new(),
            status: SyncStatus::Idle,
            loading: false,
            uploading: false,
            latest_request: 0,
            session: 0,
            next_schedule_id: 0,
            pending_refresh: None,
        }
    }

    pub fn files(&self) -> &FileSetView {
        &self.files
    }

    pub fn status(&self) -> &SyncStatus {
        &self.status
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn is_uploading(&self) -> bool {
        self.uploading
    }

    pub fn has_pending_refresh(&self) -> bool {
        self.pending_refresh.is_some()
    }

    pub fn latest_request(&self) -> RequestId {
        self.latest_request
    }

    pub fn session(&self) -> SessionEpoch {
        self.session
    }

    pub fn has_session(&self) -> bool {
        self.tokens.is_present()
    }

    // ------------------------------------------------------------------
    // triggers
    // ------------------------------------------------------------------

    /// Files surface became visible.
    pub fn mount(&mut self) -> Navigation {
        self.request_listing(ListingRequest::All)
    }

    pub fn refresh(&mut self) -> Navigation {
        self.request_listing(ListingRequest::All)
    }

    /// Blank input lists everything instead of searching for "".
    pub fn submit_search(&mut self, raw: &str) -> Navigation {
        match SearchQuery::parse(raw) {
            Some(query) => self.request_listing(ListingRequest::Search(query)),
            None => self.refresh(),
        }
    }

    pub fn upload(&mut self, path: &Path) -> Navigation {
        let Some(file_name) = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
        else {
            self.status = SyncStatus::error(MSG_NO_FILE_SELECTED);
            return Navigation::Stay;
        };

        if self.uploading {
            self.status = SyncStatus::info(MSG_UPLOAD_BUSY);
            return Navigation::Stay;
        }

        let Some(token) = self.tokens.get() else {
            self.status = SyncStatus::error(MSG_UPLOAD_NO_SESSION);
            return Navigation::Entry;
        };

        info!(file = %file_name, path = %path.display(), "Starting upload");
        self.uploading = true;
        self.status = SyncStatus::info(format!("Uploading {file_name}..."));
        spawn_upload(
            self.session,
            path.to_path_buf(),
            file_name,
            self.client.clone(),
            token,
            self.task_tx.clone(),
        );
        Navigation::Stay
    }

    /// Sets the success status and schedules the delayed re-listing.
    ///
    /// A newer schedule replaces (and cancels) an older one.
    pub fn upload_succeeded(&mut self, file_name: &str) {
        self.status = SyncStatus::success(format!("File \"{file_name}\" uploaded successfully!"));

        self.next_schedule_id += 1;
        self.pending_refresh = Some(ScheduledRefresh::schedule(
            self.next_schedule_id,
            self.refresh_delay,
            self.task_tx.clone(),
        ));
        debug!(
            schedule_id = self.next_schedule_id,
            delay_ms = self.refresh_delay.as_millis(),
            "Post-upload refresh scheduled"
        );
    }

    /// Not gated by the loading flag and never touches the file view.
    pub fn download(&mut self, name: &str) -> Navigation {
        let Some(token) = self.tokens.get() else {
            self.status = SyncStatus::error(MSG_DOWNLOAD_NO_SESSION);
            return Navigation::Entry;
        };

        info!(name, "Starting download");
        self.status = SyncStatus::info(format!("Downloading {name}..."));
        spawn_download(
            self.session,
            name.to_string(),
            self.client.clone(),
            self.saver.clone(),
            token,
            self.task_tx.clone(),
        );
        Navigation::Stay
    }

    pub fn logout(&mut self) -> Navigation {
        self.end_session();
        self.files.discard();
        self.status = SyncStatus::Idle;

        info!("Logged out");
        Navigation::Entry
    }

    // ------------------------------------------------------------------
    // task results
    // ------------------------------------------------------------------

    pub fn apply(&mut self, result: TaskResult) -> Navigation {
        match result {
            TaskResult::Listing {
                request_id,
                request,
                result,
            } => self.apply_listing(request_id, &request, result),

            TaskResult::RefreshDue { schedule_id } => {
                let is_current = self
                    .pending_refresh
                    .as_ref()
                    .is_some_and(|pending| pending.id() == schedule_id);
                if !is_current {
                    debug!(schedule_id, "Ignoring superseded refresh");
                    return Navigation::Stay;
                }
                self.pending_refresh = None;
                self.refresh()
            }

            TaskResult::Upload {
                session,
                file_name,
                result,
            } => {
                if session != self.session {
                    debug!(file = %file_name, session, "Upload finished after its session ended");
                    return Navigation::Stay;
                }
                self.uploading = false;
                match result {
                    Ok(()) => {
                        self.upload_succeeded(&file_name);
                        Navigation::Stay
                    }
                    Err(UploadFailure::Remote(DirectoryError::Unauthorized)) => {
                        self.unauthorized()
                    }
                    Err(e) => {
                        self.status = SyncStatus::error(format!("Upload failed: {e}"));
                        Navigation::Stay
                    }
                }
            }

            TaskResult::Download {
                session,
                name,
                result,
            } => {
                if session != self.session {
                    debug!(name, session, "Download finished after its session ended");
                    return Navigation::Stay;
                }
                match result {
                    Ok(_) => {
                        self.status = SyncStatus::success(format!("Downloaded {name} successfully!"));
                        Navigation::Stay
                    }
                    Err(DownloadFailure::Remote(DirectoryError::Unauthorized)) => {
                        self.unauthorized()
                    }
                    Err(e) => {
                        self.status = SyncStatus::error(format!("Download failed: {e}."));
                        Navigation::Stay
                    }
                }
            }

            TaskResult::Auth { .. } => {
                debug!("Auth result is handled by the dispatcher");
                Navigation::Stay
            }
        }
    }

    fn request_listing(&mut self, request: ListingRequest) -> Navigation {
        if self.loading {
            debug!(
                operation_type = request.label(),
                "Listing refused: a fetch is already in flight"
            );
            return Navigation::Stay;
        }

        let Some(token) = self.tokens.get() else {
            debug!("No session token, redirecting to entry");
            return Navigation::Entry;
        };

        self.latest_request += 1;
        self.loading = true;
        self.status = SyncStatus::Loading;

        debug!(
            request_id = self.latest_request,
            operation_type = request.label(),
            "Listing requested"
        );
        spawn_listing_fetch(
            self.latest_request,
            request,
            self.client.clone(),
            token,
            self.task_tx.clone(),
        );
        Navigation::Stay
    }

    fn apply_listing(
        &mut self,
        request_id: RequestId,
        request: &ListingRequest,
        result: Result<Vec<FileRecord>, DirectoryError>,
    ) -> Navigation {
        if request_id != self.latest_request {
            debug!(
                request_id,
                latest = self.latest_request,
                "Discarding stale listing response"
            );
            return Navigation::Stay;
        }

        self.loading = false;

        match result {
            Ok(records) => {
                let empty = records.is_empty();
                self.files.replace(records);
                self.status = match request {
                    ListingRequest::Search(query) if empty => {
                        SyncStatus::info(format!("No files found matching \"{query}\"."))
                    }
                    _ => SyncStatus::Idle,
                };
                Navigation::Stay
            }
            Err(DirectoryError::Unauthorized) => self.unauthorized(),
            Err(DirectoryError::ServerFault { .. }) => {
                self.status = SyncStatus::error(MSG_SERVER_ERROR);
                Navigation::Stay
            }
            Err(DirectoryError::NetworkUnreachable(_)) => {
                self.status = SyncStatus::error(MSG_NETWORK_ERROR);
                Navigation::Stay
            }
            Err(_) => {
                self.status = SyncStatus::error(match request {
                    ListingRequest::All => MSG_LIST_FAILED,
                    ListingRequest::Search(_) => MSG_SEARCH_FAILED,
                });
                Navigation::Stay
            }
        }
    }

    /// The server rejected the token. The file view is left as it was.
    fn unauthorized(&mut self) -> Navigation {
        warn!("Session rejected by server, clearing token");
        self.end_session();
        self.status = SyncStatus::error(MSG_AUTH_FAILED);
        Navigation::Entry
    }

    /// Everything still in flight belongs to the ended session: listings
    /// resolve as stale, upload/download results carry an old epoch.
    fn end_session(&mut self) {
        if let Err(e) = self.tokens.clear() {
            warn!(error = %e, "Failed to remove persisted token");
        }
        self.pending_refresh = None;
        self.loading = false;
        self.uploading = false;
        self.latest_request += 1;
        self.session += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::remote::directory_client::UploadBlob;
    use crate::session::token_store::MemoryTokenStore;
    use async_trait::async_trait;
    use bytes::Bytes;
    use parking_lot::Mutex;
    use std::{collections::VecDeque, path::PathBuf};
    use tokio::sync::Semaphore;

    /// Scripted directory: pops one canned response per call.
    #[derive(Default)]
    struct FakeDirectory {
        listings: Mutex<VecDeque<Result<Vec<FileRecord>, DirectoryError>>>,
        downloads: Mutex<VecDeque<Result<Bytes, DirectoryError>>>,
        uploads: Mutex<VecDeque<Result<(), DirectoryError>>>,
        calls: Mutex<Vec<String>>,
        /// When set, listings wait for a permit before answering.
        gate: Option<Arc<Semaphore>>,
        /// Tokens the server answers with 401, whatever is scripted.
        revoked: Vec<String>,
    }

    impl FakeDirectory {
        fn with_listings(
            listings: impl IntoIterator<Item = Result<Vec<FileRecord>, DirectoryError>>,
        ) -> Self {
            Self {
                listings: Mutex::new(listings.into_iter().collect()),
                ..Self::default()
            }
        }

        fn gated(mut self, gate: Arc<Semaphore>) -> Self {
            self.gate = Some(gate);
            self
        }

        fn revoking(mut self, token: &str) -> Self {
            self.revoked.push(token.to_string());
            self
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().clone()
        }

        fn count_calls(&self, call: &str) -> usize {
            self.calls.lock().iter().filter(|c| *c == call).count()
        }

        fn check(&self, token: &str) -> Result<(), DirectoryError> {
            if self.revoked.iter().any(|t| t == token) {
                Err(DirectoryError::Unauthorized)
            } else {
                Ok(())
            }
        }

        async fn next_listing(&self, token: &str) -> Result<Vec<FileRecord>, DirectoryError> {
            if let Some(gate) = &self.gate {
                gate.acquire().await.unwrap().forget();
            }
            self.check(token)?;
            self.listings
                .lock()
                .pop_front()
                .unwrap_or_else(|| Ok(Vec::new()))
        }
    }

    #[async_trait]
    impl DirectoryApi for FakeDirectory {
        async fn list_all(&self, token: &str) -> Result<Vec<FileRecord>, DirectoryError> {
            self.calls.lock().push("list_all".to_string());
            self.next_listing(token).await
        }

        async fn search(
            &self,
            token: &str,
            query: &SearchQuery,
        ) -> Result<Vec<FileRecord>, DirectoryError> {
            self.calls.lock().push(format!("search:{query}"));
            self.next_listing(token).await
        }

        async fn download(&self, token: &str, name: &str) -> Result<Bytes, DirectoryError> {
            self.calls.lock().push(format!("download:{name}"));
            self.check(token)?;
            self.downloads
                .lock()
                .pop_front()
                .unwrap_or_else(|| Err(DirectoryError::NotFound("missing".to_string())))
        }

        async fn upload(&self, token: &str, file: UploadBlob) -> Result<(), DirectoryError> {
            self.calls.lock().push(format!("upload:{}", file.file_name));
            self.check(token)?;
            self.uploads.lock().pop_front().unwrap_or(Ok(()))
        }
    }

    #[derive(Default)]
    struct RecordingSaver {
        saved: Mutex<Vec<(String, Vec<u8>)>>,
    }

    impl FileSaver for RecordingSaver {
        fn save(&self, name: &str, bytes: &[u8]) -> Result<PathBuf, AppError> {
            self.saved.lock().push((name.to_string(), bytes.to_vec()));
            Ok(PathBuf::from("/downloads").join(name))
        }
    }

    struct Harness {
        controller: SyncController,
        rx: mpsc::UnboundedReceiver<TaskResult>,
        api: Arc<FakeDirectory>,
        tokens: Arc<MemoryTokenStore>,
        saver: Arc<RecordingSaver>,
    }

    impl Harness {
        fn new(api: FakeDirectory, token: Option<&str>) -> Self {
            let (tx, rx) = mpsc::unbounded_channel();
            let api = Arc::new(api);
            let tokens = Arc::new(match token {
                Some(t) => MemoryTokenStore::with_token(t),
                None => MemoryTokenStore::new(),
            });
            let saver = Arc::new(RecordingSaver::default());
            let controller = SyncController::new(
                api.clone(),
                tokens.clone(),
                saver.clone(),
                tx,
                Duration::from_millis(1000),
            );
            Self {
                controller,
                rx,
                api,
                tokens,
                saver,
            }
        }

        /// Wait for the next task result and feed it to the controller.
        async fn settle(&mut self) -> Navigation {
            let result = self.rx.recv().await.expect("task result");
            self.controller.apply(result)
        }

        fn names(&self) -> Vec<String> {
            self.controller
                .files()
                .records()
                .iter()
                .map(|r| r.name.clone())
                .collect()
        }
    }

    fn record(id: &str, name: &str) -> FileRecord {
        FileRecord::new(id, name, "2024-01-01T00:00:00Z")
    }

    async fn let_tasks_run() {
        for _ in 0..20 {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test]
    async fn mount_lists_all_files() {
        let mut h = Harness::new(
            FakeDirectory::with_listings([Ok(vec![record("1", "a.txt")])]),
            Some("tok"),
        );

        assert_eq!(h.controller.mount(), Navigation::Stay);
        assert!(h.controller.is_loading());
        assert_eq!(h.controller.status(), &SyncStatus::Loading);

        assert_eq!(h.settle().await, Navigation::Stay);
        assert_eq!(h.names(), ["a.txt"]);
        assert_eq!(h.controller.status().message(), "");
        assert!(!h.controller.is_loading());
    }

    #[tokio::test]
    async fn mount_without_token_redirects_and_issues_nothing() {
        let mut h = Harness::new(FakeDirectory::default(), None);

        assert_eq!(h.controller.mount(), Navigation::Entry);
        let_tasks_run().await;

        assert!(h.api.calls().is_empty());
        assert!(!h.controller.is_loading());
        assert!(h.rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn empty_search_replaces_view_with_no_match_message() {
        let mut h = Harness::new(
            FakeDirectory::with_listings([Ok(vec![record("1", "a.txt")]), Ok(vec![])]),
            Some("tok"),
        );
        let _ = h.controller.mount();
        assert_eq!(h.settle().await, Navigation::Stay);

        let _ = h.controller.submit_search("zzz");
        assert_eq!(h.settle().await, Navigation::Stay);

        assert!(h.controller.files().is_empty());
        assert_eq!(
            h.controller.status(),
            &SyncStatus::Info("No files found matching \"zzz\".".to_string())
        );
        assert_eq!(h.api.calls(), ["list_all", "search:zzz"]);
    }

    #[tokio::test]
    async fn blank_search_is_a_refresh() {
        let mut h = Harness::new(FakeDirectory::default(), Some("tok"));

        let _ = h.controller.submit_search("   \t");
        assert_eq!(h.settle().await, Navigation::Stay);
        let _ = h.controller.submit_search("");
        assert_eq!(h.settle().await, Navigation::Stay);

        assert_eq!(h.api.calls(), ["list_all", "list_all"]);
        assert_eq!(h.controller.status(), &SyncStatus::Idle);
    }

    #[tokio::test]
    async fn loading_guard_refuses_overlapping_listings() {
        let gate = Arc::new(Semaphore::new(0));
        let mut h = Harness::new(
            FakeDirectory::with_listings([Ok(vec![record("1", "a.txt")])]).gated(gate.clone()),
            Some("tok"),
        );

        let _ = h.controller.mount();
        let_tasks_run().await;
        assert_eq!(h.controller.refresh(), Navigation::Stay);
        let _ = h.controller.submit_search("a");
        let_tasks_run().await;

        assert_eq!(h.api.calls(), ["list_all"]);
        assert_eq!(h.controller.latest_request(), 1);

        gate.add_permits(1);
        assert_eq!(h.settle().await, Navigation::Stay);
        assert!(!h.controller.is_loading());
        assert_eq!(h.names(), ["a.txt"]);

        // guard lifted: the next trigger goes through
        gate.add_permits(1);
        let _ = h.controller.refresh();
        assert_eq!(h.settle().await, Navigation::Stay);
        assert_eq!(h.api.calls(), ["list_all", "list_all"]);
    }

    #[tokio::test]
    async fn stale_listing_response_is_discarded() {
        let mut h = Harness::new(
            FakeDirectory::with_listings([Ok(vec![record("1", "a.txt")])]),
            Some("tok"),
        );
        let _ = h.controller.mount();
        assert_eq!(h.settle().await, Navigation::Stay);

        let before_status = h.controller.status().clone();
        let nav = h.controller.apply(TaskResult::Listing {
            request_id: h.controller.latest_request() - 1,
            request: ListingRequest::All,
            result: Ok(vec![record("9", "old.txt")]),
        });

        assert_eq!(nav, Navigation::Stay);
        assert_eq!(h.names(), ["a.txt"]);
        assert_eq!(h.controller.status(), &before_status);
    }

    #[tokio::test]
    async fn response_arriving_after_logout_is_dropped() {
        let gate = Arc::new(Semaphore::new(0));
        let mut h = Harness::new(
            FakeDirectory::with_listings([Ok(vec![record("1", "a.txt")])]).gated(gate.clone()),
            Some("tok"),
        );

        let _ = h.controller.mount();
        assert_eq!(h.controller.logout(), Navigation::Entry);
        assert!(!h.controller.is_loading());

        gate.add_permits(1);
        assert_eq!(h.settle().await, Navigation::Stay);

        assert!(h.controller.files().is_empty());
        assert_eq!(h.controller.status(), &SyncStatus::Idle);
        assert_eq!(h.tokens.get(), None);
    }

    #[tokio::test]
    async fn unauthorized_clears_token_keeps_view_and_redirects_once() {
        let mut h = Harness::new(
            FakeDirectory::with_listings([
                Ok(vec![record("1", "a.txt")]),
                Err(DirectoryError::Unauthorized),
            ]),
            Some("tok"),
        );
        let _ = h.controller.mount();
        assert_eq!(h.settle().await, Navigation::Stay);

        let _ = h.controller.refresh();
        let mut redirects = 0;
        if h.settle().await == Navigation::Entry {
            redirects += 1;
        }
        let_tasks_run().await;
        while let Ok(extra) = h.rx.try_recv() {
            if h.controller.apply(extra) == Navigation::Entry {
                redirects += 1;
            }
        }

        assert_eq!(redirects, 1);
        assert_eq!(h.tokens.get(), None);
        assert_eq!(h.names(), ["a.txt"]);
        assert_eq!(h.controller.status(), &SyncStatus::error(MSG_AUTH_FAILED));
        assert!(!h.controller.is_loading());
    }

    #[tokio::test]
    async fn download_rejection_ends_session_with_listing_in_flight() {
        let gate = Arc::new(Semaphore::new(0));
        let api = FakeDirectory::with_listings([Ok(vec![record("1", "a.txt")])])
            .gated(gate.clone())
            .revoking("old");
        let mut h = Harness::new(api, Some("old"));
        let mut redirects = 0;

        let _ = h.controller.mount();
        let _ = h.controller.download("a.txt");
        if h.settle().await == Navigation::Entry {
            redirects += 1;
        }
        assert_eq!(redirects, 1);
        assert_eq!(h.tokens.get(), None);
        assert!(!h.controller.is_loading());

        // signing in again lists straight away
        h.tokens.set("fresh".to_string()).unwrap();
        assert_eq!(h.controller.mount(), Navigation::Stay);
        assert!(h.controller.is_loading());
        let_tasks_run().await;
        assert_eq!(h.api.count_calls("list_all"), 2);

        // the old listing answers 401; only the new one is applied
        gate.add_permits(2);
        for _ in 0..2 {
            if h.settle().await == Navigation::Entry {
                redirects += 1;
            }
        }

        assert_eq!(redirects, 1);
        assert_eq!(h.tokens.get().as_deref(), Some("fresh"));
        assert_eq!(h.names(), ["a.txt"]);
        assert_eq!(h.controller.status(), &SyncStatus::Idle);
        assert!(!h.controller.is_loading());
    }

    #[tokio::test]
    async fn upload_rejection_releases_loading_guard() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.md");
        std::fs::write(&path, "# notes").unwrap();

        let gate = Arc::new(Semaphore::new(0));
        let api = FakeDirectory::default().gated(gate.clone()).revoking("old");
        let mut h = Harness::new(api, Some("old"));

        let _ = h.controller.mount();
        let _ = h.controller.upload(&path);
        assert_eq!(h.settle().await, Navigation::Entry);

        assert!(!h.controller.is_loading());
        assert!(!h.controller.is_uploading());
        assert_eq!(h.controller.status(), &SyncStatus::error(MSG_AUTH_FAILED));

        // the stale listing's 401 does not redirect a second time
        gate.add_permits(1);
        assert_eq!(h.settle().await, Navigation::Stay);
        assert_eq!(h.controller.status(), &SyncStatus::error(MSG_AUTH_FAILED));
    }

    #[tokio::test]
    async fn previous_session_results_never_touch_new_token() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.md");
        std::fs::write(&path, "# notes").unwrap();

        let mut h = Harness::new(FakeDirectory::default().revoking("old"), Some("old"));
        let old_session = h.controller.session();

        let _ = h.controller.upload(&path);
        let _ = h.controller.download("a.txt");
        let _ = h.controller.logout();
        assert_ne!(h.controller.session(), old_session);
        h.tokens.set("fresh".to_string()).unwrap();

        // both answer 401 for the old token
        assert_eq!(h.settle().await, Navigation::Stay);
        assert_eq!(h.settle().await, Navigation::Stay);

        assert_eq!(h.tokens.get().as_deref(), Some("fresh"));
        assert_eq!(h.controller.status(), &SyncStatus::Idle);
        assert!(!h.controller.is_uploading());
        assert!(h.saver.saved.lock().is_empty());
    }

    #[tokio::test]
    async fn failures_keep_previous_view_with_classified_message() {
        let cases = [
            (DirectoryError::ServerFault { status: 503 }, MSG_SERVER_ERROR),
            (
                DirectoryError::NetworkUnreachable("refused".to_string()),
                MSG_NETWORK_ERROR,
            ),
            (DirectoryError::Unknown("teapot".to_string()), MSG_SEARCH_FAILED),
        ];

        for (error, expected) in cases {
            let mut h = Harness::new(
                FakeDirectory::with_listings([Ok(vec![record("1", "a.txt")]), Err(error)]),
                Some("tok"),
            );
            let _ = h.controller.mount();
            assert_eq!(h.settle().await, Navigation::Stay);

            let _ = h.controller.submit_search("x");
            assert_eq!(h.settle().await, Navigation::Stay);

            assert_eq!(h.names(), ["a.txt"]);
            assert_eq!(h.controller.status(), &SyncStatus::error(expected));
            assert!(!h.controller.is_loading());
            assert_eq!(h.tokens.get().as_deref(), Some("tok"));
        }
    }

    #[tokio::test]
    async fn malformed_listing_prompts_retry() {
        let mut h = Harness::new(
            FakeDirectory::with_listings([Err(DirectoryError::Unknown("bad json".to_string()))]),
            Some("tok"),
        );
        let _ = h.controller.refresh();
        assert_eq!(h.settle().await, Navigation::Stay);
        assert_eq!(h.controller.status(), &SyncStatus::error(MSG_LIST_FAILED));
    }

    #[tokio::test(start_paused = true)]
    async fn upload_success_refreshes_after_delay() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.md");
        std::fs::write(&path, "# notes").unwrap();

        let mut h = Harness::new(FakeDirectory::default(), Some("tok"));

        assert_eq!(h.controller.upload(&path), Navigation::Stay);
        assert!(h.controller.is_uploading());
        assert_eq!(h.settle().await, Navigation::Stay);

        assert_eq!(
            h.controller.status(),
            &SyncStatus::success("File \"notes.md\" uploaded successfully!")
        );
        assert!(h.controller.has_pending_refresh());
        assert_eq!(h.api.calls(), ["upload:notes.md"]);

        tokio::time::sleep(Duration::from_millis(999)).await;
        assert!(h.rx.try_recv().is_err());

        tokio::time::sleep(Duration::from_millis(2)).await;
        assert_eq!(h.settle().await, Navigation::Stay); // RefreshDue
        assert!(!h.controller.has_pending_refresh());
        assert!(h.controller.is_loading());

        assert_eq!(h.settle().await, Navigation::Stay); // listing
        assert_eq!(h.api.calls(), ["upload:notes.md", "list_all"]);
    }

    #[tokio::test(start_paused = true)]
    async fn logout_cancels_pending_refresh() {
        let mut h = Harness::new(
            FakeDirectory::with_listings([Ok(vec![record("1", "a.txt")])]),
            Some("tok"),
        );
        let _ = h.controller.mount();
        assert_eq!(h.settle().await, Navigation::Stay);

        h.controller.upload_succeeded("x.bin");
        assert!(h.controller.has_pending_refresh());

        assert_eq!(h.controller.logout(), Navigation::Entry);
        assert!(!h.controller.has_pending_refresh());
        assert!(h.controller.files().is_empty());

        tokio::time::sleep(Duration::from_secs(5)).await;
        assert!(h.rx.try_recv().is_err());
        assert_eq!(h.api.calls(), ["list_all"]);
    }

    #[tokio::test]
    async fn superseded_refresh_is_ignored() {
        let mut h = Harness::new(FakeDirectory::default(), Some("tok"));
        h.controller.upload_succeeded("one");
        h.controller.upload_succeeded("two");

        assert_eq!(
            h.controller.apply(TaskResult::RefreshDue { schedule_id: 1 }),
            Navigation::Stay
        );
        assert!(h.controller.has_pending_refresh());
        assert!(!h.controller.is_loading());
    }

    #[tokio::test]
    async fn upload_requires_a_file_and_a_session() {
        let mut h = Harness::new(FakeDirectory::default(), None);

        assert_eq!(h.controller.upload(Path::new("")), Navigation::Stay);
        assert_eq!(h.controller.status(), &SyncStatus::error(MSG_NO_FILE_SELECTED));

        assert_eq!(h.controller.upload(Path::new("a.txt")), Navigation::Entry);
        assert_eq!(h.controller.status(), &SyncStatus::error(MSG_UPLOAD_NO_SESSION));
        assert!(!h.controller.is_uploading());
    }

    #[tokio::test]
    async fn upload_rejection_reports_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("big.iso");
        std::fs::write(&path, "data").unwrap();

        let api = FakeDirectory::default();
        api.uploads
            .lock()
            .push_back(Err(DirectoryError::Unknown("No file uploaded".to_string())));
        let mut h = Harness::new(api, Some("tok"));

        let _ = h.controller.upload(&path);
        assert_eq!(h.settle().await, Navigation::Stay);

        assert_eq!(
            h.controller.status(),
            &SyncStatus::error("Upload failed: No file uploaded")
        );
        assert!(!h.controller.has_pending_refresh());
    }

    #[tokio::test]
    async fn download_saves_under_original_name() {
        let api = FakeDirectory::default();
        api.downloads.lock().push_back(Ok(Bytes::from_static(b"hi")));
        let mut h = Harness::new(api, Some("tok"));

        let _ = h.controller.download("a.txt");
        assert_eq!(h.controller.status(), &SyncStatus::info("Downloading a.txt..."));
        assert_eq!(h.settle().await, Navigation::Stay);

        assert_eq!(
            h.controller.status(),
            &SyncStatus::success("Downloaded a.txt successfully!")
        );
        assert_eq!(
            *h.saver.saved.lock(),
            [("a.txt".to_string(), b"hi".to_vec())]
        );
    }

    #[tokio::test]
    async fn zero_byte_download_fails_without_saving() {
        let api = FakeDirectory::default();
        api.downloads.lock().push_back(Ok(Bytes::new()));
        api.downloads
            .lock()
            .push_back(Err(DirectoryError::empty_payload()));
        let mut h = Harness::new(api, Some("tok"));

        for _ in 0..2 {
            let _ = h.controller.download("a.txt");
            assert_eq!(h.settle().await, Navigation::Stay);
            assert_eq!(
                h.controller.status(),
                &SyncStatus::error("Download failed: File is empty.")
            );
        }
        assert!(h.saver.saved.lock().is_empty());
    }

    #[tokio::test]
    async fn download_runs_while_listing_is_loading() {
        let gate = Arc::new(Semaphore::new(0));
        let api = FakeDirectory::with_listings([Ok(vec![record("1", "a.txt")])]).gated(gate.clone());
        api.downloads.lock().push_back(Ok(Bytes::from_static(b"x")));
        let mut h = Harness::new(api, Some("tok"));

        let _ = h.controller.mount();
        assert_eq!(h.controller.download("a.txt"), Navigation::Stay);
        assert_eq!(h.settle().await, Navigation::Stay);

        assert!(h.controller.is_loading());
        assert!(h.controller.files().is_empty());
        assert_eq!(h.saver.saved.lock().len(), 1);

        gate.add_permits(1);
        assert_eq!(h.settle().await, Navigation::Stay);
        assert_eq!(h.names(), ["a.txt"]);
    }

    #[tokio::test]
    async fn unauthorized_download_redirects() {
        let api = FakeDirectory::default();
        api.downloads.lock().push_back(Err(DirectoryError::Unauthorized));
        let mut h = Harness::new(api, Some("tok"));

        let _ = h.controller.download("a.txt");
        assert_eq!(h.settle().await, Navigation::Entry);
        assert_eq!(h.tokens.get(), None);
    }

    #[tokio::test]
    async fn download_without_session_asks_to_login() {
        let mut h = Harness::new(FakeDirectory::default(), None);
        assert_eq!(h.controller.download("a.txt"), Navigation::Entry);
        assert_eq!(h.controller.status(), &SyncStatus::error(MSG_DOWNLOAD_NO_SESSION));
        let_tasks_run().await;
        assert!(h.api.calls().is_empty());
    }
}
