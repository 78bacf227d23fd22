//! Key reference for the files surface.
use crate::view::theme;
use ratatui::{
    Frame,
    layout::{Alignment, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
};

const BINDINGS: &[(&str, &str)] = &[
    ("↑/k ↓/j", "Move selection"),
    ("g / G", "First / last file"),
    ("Enter / d", "Download selected file"),
    ("r / F5", "Refresh the listing"),
    ("/", "Search by file name"),
    ("u", "Upload a local file"),
    ("L", "Log out"),
    ("?", "Toggle this help"),
    ("q / Ctrl-C", "Quit"),
];

pub struct HelpOverlay;

impl HelpOverlay {
    pub fn render(frame: &mut Frame<'_>, area: Rect) {
        frame.render_widget(Clear, area);

        let lines: Vec<Line> = BINDINGS
            .iter()
            .map(|(keys, what)| {
                Line::from(vec![
                    Span::styled(format!("{keys:>12}  "), theme::key_style()),
                    Span::raw(*what),
                ])
            })
            .collect();

        let help = Paragraph::new(lines).style(theme::base_style()).block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Help ")
                .title_alignment(Alignment::Center)
                .border_style(theme::focused_border_style()),
        );

        frame.render_widget(help, area);
    }
}
