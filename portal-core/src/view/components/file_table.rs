//! src/view/components/file_table.rs
//! ============================================================================
//! # FileTable: the current file view
//!
//! Shows a loading placeholder while a listing is in flight, an empty-state
//! hint when the view has no rows, and otherwise one row per record.

use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Cell, HighlightSpacing, Paragraph, Row, Table, TableState},
};

use crate::{controller::sync_controller::SyncController, model::ui_state::UIState, view::theme};

pub const EMPTY_HINT: &str = "No files found. Upload your first file!";

pub struct FileTable;

impl FileTable {
    pub fn render(frame: &mut Frame<'_>, sync: &SyncController, ui: &UIState, area: Rect) {
        let files = sync.files();
        let count = files.len();
        let title = if ui.search_term.is_empty() {
            " Your Files ".to_string()
        } else {
            format!(" Your Files: \"{}\" ", ui.search_term)
        };

        let block = Block::default()
            .borders(Borders::ALL)
            .title(title)
            .title_style(theme::title_style())
            .title_bottom(Line::from(format!(" {count} files ")).right_aligned())
            .border_style(theme::border_style())
            .style(theme::base_style());

        if sync.is_loading() || files.is_empty() {
            let text = if sync.is_loading() {
                "Loading files..."
            } else {
                EMPTY_HINT
            };
            let placeholder = Paragraph::new(text)
                .style(theme::hint_style())
                .alignment(Alignment::Center)
                .block(block);
            frame.render_widget(placeholder, area);
            return;
        }

        let header = Row::new(vec!["File Name", "Upload Date"])
            .style(theme::header_style())
            .bottom_margin(1);

        let rows: Vec<Row> = files
            .records()
            .iter()
            .map(|record| {
                Row::new(vec![
                    Cell::from(record.name.as_str()),
                    Cell::from(record.display_date()),
                ])
                .style(Style::default().fg(theme::FOREGROUND))
            })
            .collect();

        let widths = [Constraint::Fill(1), Constraint::Length(26)];
        let mut table_state = TableState::default().with_selected(Some(ui.selected));

        let table = Table::new(rows, widths)
            .header(header)
            .block(block)
            .row_highlight_style(theme::highlight_style())
            .highlight_symbol("▶ ")
            .highlight_spacing(HighlightSpacing::Always);

        frame.render_stateful_widget(table, area, &mut table_state);
    }
}
