//! ``src/view/components/input_prompt_overlay.rs``
//! ============================================================================
//! # `InputPromptOverlay`: search query and upload path prompts

use bytesize::ByteSize;
use ratatui::{
    Frame,
    layout::{Alignment, Rect},
    style::Style,
    widgets::{Block, Borders, Clear, Paragraph},
};
use std::path::Path;

use crate::model::ui_state::{UIOverlay, UIState};
use crate::view::theme;

pub struct InputPromptOverlay;

impl InputPromptOverlay {
    #[allow(clippy::cast_possible_truncation)]
    pub fn render(frame: &mut Frame<'_>, ui: &UIState, area: Rect) {
        frame.render_widget(Clear, area);

        let (title, help) = match ui.overlay {
            UIOverlay::UploadPrompt => (
                " Upload File ",
                Self::upload_hint(&ui.input)
                    .unwrap_or_else(|| "Path to a local file • Enter to upload • Esc to cancel".to_string()),
            ),
            _ => (
                " Search Files ",
                "Search by file name • empty lists all • Esc to cancel".to_string(),
            ),
        };

        let input_block = Block::default()
            .borders(Borders::ALL)
            .title(title)
            .title_alignment(Alignment::Center)
            .border_style(theme::focused_border_style())
            .style(Style::default().bg(theme::BACKGROUND));

        let input_area = Rect {
            height: area.height.min(3),
            ..area
        };
        frame.render_widget(
            Paragraph::new(ui.input.as_str())
                .block(input_block)
                .style(Style::default().fg(theme::FOREGROUND)),
            input_area,
        );

        let cursor_x = input_area.x + (ui.input.chars().count() as u16 + 1).min(input_area.width.saturating_sub(2));
        frame.set_cursor_position((cursor_x, input_area.y + 1));

        let help_area = Rect {
            x: area.x,
            y: input_area.y + input_area.height,
            width: area.width,
            height: 1,
        };
        if help_area.bottom() <= area.bottom() {
            frame.render_widget(
                Paragraph::new(help)
                    .style(theme::hint_style())
                    .alignment(Alignment::Center),
                help_area,
            );
        }
    }

    /// Name and size of the file under the typed path, if it exists.
    fn upload_hint(input: &str) -> Option<String> {
        let path = Path::new(input.trim());
        let meta = std::fs::metadata(path).ok().filter(|m| m.is_file())?;
        let name = path.file_name()?.to_string_lossy();
        Some(format!("{name} ({}) • Enter to upload", ByteSize::b(meta.len())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upload_hint_shows_size_of_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.md");
        std::fs::write(&path, vec![0u8; 2048]).unwrap();

        let hint = InputPromptOverlay::upload_hint(path.to_str().unwrap()).unwrap();
        assert!(hint.starts_with("notes.md ("));

        assert!(InputPromptOverlay::upload_hint(dir.path().to_str().unwrap()).is_none());
        assert!(InputPromptOverlay::upload_hint("").is_none());
    }
}
