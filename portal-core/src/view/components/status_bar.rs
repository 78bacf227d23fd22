//! src/view/components/status_bar.rs
//!
//! Single status line: the current [`SyncStatus`] message on the left, key
//! hints on the right.

use ratatui::{
    prelude::*,
    widgets::{Paragraph, Widget},
};

use crate::{model::sync_state::SyncStatus, view::theme};

const HINTS: &str = "r refresh · / search · u upload · d download · L logout · ? help";

pub struct StatusBar;

impl StatusBar {
    pub fn render(frame: &mut Frame<'_>, status: &SyncStatus, area: Rect) {
        let layout = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Fill(1), Constraint::Length(HINTS.chars().count() as u16)])
            .split(area);

        Paragraph::new(format!(" {}", status.message()))
            .style(theme::status_style(status.tone()))
            .alignment(Alignment::Left)
            .render(layout[0], frame.buffer_mut());

        Paragraph::new(HINTS)
            .style(theme::hint_style().bg(theme::BACKGROUND))
            .alignment(Alignment::Right)
            .render(layout[1], frame.buffer_mut());
    }
}
