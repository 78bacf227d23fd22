//! src/main.rs
//! ============================================================================
//! # File Storage Portal TUI entry point
//!
//! Wires the config, session store, HTTP clients and dispatcher into a single
//! event loop: render if dirty, wait for the next action, dispatch it.

use std::{
    io::{self, Stdout},
    sync::Arc,
};

use anyhow::{Context, Result};
use crossterm::{
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Frame, Terminal, backend::CrosstermBackend as Backend};
use tokio::{
    signal,
    sync::{Notify, mpsc},
};
use tracing::{error, info, warn};
use tracing_appender::non_blocking::WorkerGuard;

use portal_core::{
    Config, Logger,
    controller::{Action, Dispatcher, EventLoop, SyncController, TaskResult},
    fs::DirectorySaver,
    remote::{AuthClient, HttpDirectoryClient},
    session::{FileTokenStore, TokenProvider},
    view::UIRenderer,
};

type AppTerminal = Terminal<Backend<Stdout>>;

#[tokio::main]
async fn main() -> Result<()> {
    setup_panic_handler();

    let app = App::new().await.context("Failed to initialize application")?;
    app.run().await.context("Application runtime error")?;

    info!("Application exited cleanly");
    Ok(())
}

struct App {
    terminal: AppTerminal,
    dispatcher: Dispatcher,
    event_loop: EventLoop,
    renderer: UIRenderer,
    shutdown: Arc<Notify>,
    _log_guard: WorkerGuard,
}

impl App {
    async fn new() -> Result<Self> {
        let (config, config_error) = match Config::load().await {
            Ok(config) => (config, None),
            Err(e) => (Config::default(), Some(e)),
        };

        let log_guard = Logger::init_tracing(&config.logging).context("Failed to initialize logging")?;
        info!("Starting File Storage Portal");
        if let Some(e) = config_error {
            warn!("Failed to load config, using defaults: {e:#}");
        }
        info!(
            base_url = %config.api.base_url,
            downloads = %config.downloads.directory.display(),
            "Configuration ready"
        );

        let http = reqwest::Client::builder()
            .build()
            .context("Failed to build HTTP client")?;
        let directory = Arc::new(HttpDirectoryClient::with_client(
            http.clone(),
            config.api.base_url.clone(),
        ));
        let auth = AuthClient::new(http, config.api.base_url.clone());

        let tokens: Arc<dyn TokenProvider> = Arc::new(FileTokenStore::open(&config.session.token_file));
        let saver = Arc::new(DirectorySaver::new(config.downloads.directory.clone()));

        let (task_tx, task_rx) = mpsc::unbounded_channel::<TaskResult>();

        let sync = SyncController::new(
            directory,
            tokens.clone(),
            saver,
            task_tx.clone(),
            config.sync.post_upload_refresh_delay,
        );
        let mut dispatcher = Dispatcher::new(sync, auth, tokens.clone(), task_tx);

        // resume a persisted session straight into the file list
        if tokens.is_present() {
            info!("Persisted session found");
            dispatcher.enter_files();
        }

        let terminal = setup_terminal().context("Failed to initialize terminal")?;

        Ok(Self {
            terminal,
            dispatcher,
            event_loop: EventLoop::new(task_rx),
            renderer: UIRenderer::new(),
            shutdown: Arc::new(Notify::new()),
            _log_guard: log_guard,
        })
    }

    async fn run(mut self) -> Result<()> {
        self.setup_shutdown_handler();
        info!("Starting main event loop");

        loop {
            self.render()?;

            let action: Action = tokio::select! {
                () = self.shutdown.notified() => {
                    info!("Shutdown signal received");
                    break;
                }
                action = self.event_loop.next_action(self.dispatcher.ui()) => action,
            };

            if !self.dispatcher.handle(action) {
                break;
            }
        }

        info!(
            events = self.event_loop.event_count(),
            actions = self.dispatcher.handled(),
            frames = self.renderer.stats().frames,
            slow_frames = self.renderer.stats().slow,
            "Main event loop ended"
        );
        Ok(())
    }

    fn render(&mut self) -> Result<()> {
        if !self.dispatcher.ui().needs_redraw() {
            return Ok(());
        }

        let Self {
            terminal,
            dispatcher,
            renderer,
            ..
        } = self;
        terminal
            .draw(|frame: &mut Frame<'_>| {
                renderer.render(frame, dispatcher.ui(), dispatcher.sync());
            })
            .context("Failed to draw terminal")?;

        self.dispatcher.ui_mut().clear_redraw();
        Ok(())
    }

    fn setup_shutdown_handler(&self) {
        let shutdown = self.shutdown.clone();

        tokio::spawn(async move {
            match signal::ctrl_c().await {
                Ok(()) => {
                    info!("Received Ctrl+C signal");
                    shutdown.notify_one();
                }
                Err(e) => error!("Failed to listen for Ctrl+C: {}", e),
            }
        });
    }
}

impl Drop for App {
    fn drop(&mut self) {
        if let Err(e) = cleanup_terminal(&mut self.terminal) {
            error!("Failed to cleanup terminal: {}", e);
        }
    }
}

fn setup_terminal() -> Result<AppTerminal> {
    enable_raw_mode().context("Failed to enable raw mode")?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).context("Failed to enter alternate screen")?;

    let terminal = Terminal::new(Backend::new(stdout)).context("Failed to create terminal")?;
    info!("Terminal setup complete");
    Ok(terminal)
}

fn cleanup_terminal(terminal: &mut AppTerminal) -> Result<()> {
    disable_raw_mode().context("Failed to disable raw mode")?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)
        .context("Failed to leave alternate screen")?;
    terminal.show_cursor().context("Failed to show cursor")?;

    info!("Terminal cleanup complete");
    Ok(())
}

/// Restore the terminal before the default hook prints the panic.
fn setup_panic_handler() {
    let original_hook = std::panic::take_hook();

    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stderr(), LeaveAlternateScreen);

        error!("Application panicked: {}", panic_info);
        original_hook(panic_info);
    }));
}
