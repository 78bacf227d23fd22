//! src/view/ui.rs
//! ============================================================================
//! # UIRenderer: draws one frame from the UI state and the sync controller
//!
//! Entry surface: the login form alone. Files surface: file table on top,
//! status line at the bottom, optional overlay in a centered box.

use ratatui::{prelude::*, widgets::Block};
use std::time::{Duration, Instant};
use tracing::{instrument, warn};

use crate::{
    controller::sync_controller::SyncController,
    model::ui_state::{Screen, UIOverlay, UIState},
    view::{
        components::{FileTable, HelpOverlay, InputPromptOverlay, LoginFormView, StatusBar},
        theme,
    },
};

#[derive(Debug, Default)]
pub struct RenderStats {
    pub frames: u64,
    pub slow: u64,
    pub total: Duration,
}

#[derive(Debug, Default)]
pub struct UIRenderer {
    stats: RenderStats,
}

impl UIRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stats(&self) -> &RenderStats {
        &self.stats
    }

    #[instrument(level = "trace", skip_all)]
    pub fn render(&mut self, frame: &mut Frame<'_>, ui: &UIState, sync: &SyncController) {
        let start = Instant::now();
        let screen = frame.area();

        frame.render_widget(Block::default().style(theme::base_style()), screen);

        match ui.screen {
            Screen::Entry => self.draw_entry(frame, ui, sync, screen),
            Screen::Files => self.draw_files(frame, ui, sync, screen),
        }

        let elapsed = start.elapsed();
        self.stats.total += elapsed;
        self.stats.frames += 1;
        if elapsed.as_millis() > 16 {
            self.stats.slow += 1;
            warn!("Slow render: {}ms", elapsed.as_millis());
        }
    }

    fn draw_entry(&self, frame: &mut Frame<'_>, ui: &UIState, sync: &SyncController, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(3), Constraint::Length(1)])
            .split(area);

        LoginFormView::render(frame, &ui.login, chunks[0]);

        // why the session ended, e.g. a rejected token
        if sync.status().is_error() {
            StatusBar::render(frame, sync.status(), chunks[1]);
        }
    }

    fn draw_files(&self, frame: &mut Frame<'_>, ui: &UIState, sync: &SyncController, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(3), Constraint::Length(1)])
            .split(area);

        FileTable::render(frame, sync, ui, chunks[0]);
        StatusBar::render(frame, sync.status(), chunks[1]);

        match ui.overlay {
            UIOverlay::None => {}
            UIOverlay::Help => HelpOverlay::render(frame, centered(area, 60, 13)),
            UIOverlay::SearchPrompt | UIOverlay::UploadPrompt => {
                InputPromptOverlay::render(frame, ui, centered(area, 60, 4));
            }
        }
    }
}

#[allow(clippy::cast_possible_truncation)]
fn centered(area: Rect, percent_x: u16, height: u16) -> Rect {
    let width = ((u32::from(area.width) * u32::from(percent_x) / 100) as u16)
        .max(20)
        .min(area.width);
    let height = height.min(area.height);
    Rect::new(
        area.x + (area.width - width) / 2,
        area.y + (area.height - height) / 2,
        width,
        height,
    )
}
