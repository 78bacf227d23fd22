//! src/view/components/login_form.rs
//! ============================================================================
//! # LoginFormView: the entry surface
//!
//! Email and password fields, the current mode (sign in / sign up) and the
//! last authentication error. The password is masked.

use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};

use crate::{
    model::{
        sync_state::StatusTone,
        ui_state::{AuthMode, LoginField, LoginForm},
    },
    view::theme,
};

pub struct LoginFormView;

impl LoginFormView {
    #[allow(clippy::cast_possible_truncation)]
    pub fn render(frame: &mut Frame<'_>, form: &LoginForm, area: Rect) {
        let panel = centered(area, 50, 14);
        frame.render_widget(Clear, panel);

        let (title, switch_hint) = match form.mode {
            AuthMode::Login => (" File Storage Portal: Sign In ", "F2 create an account"),
            AuthMode::Signup => (" File Storage Portal: Sign Up ", "F2 sign in instead"),
        };

        let outer = Block::default()
            .borders(Borders::ALL)
            .title(title)
            .title_alignment(Alignment::Center)
            .title_style(theme::title_style())
            .border_style(theme::border_style())
            .style(theme::base_style());
        let inner = outer.inner(panel);
        frame.render_widget(outer, panel);

        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Length(3),
                Constraint::Min(2),
                Constraint::Length(1),
            ])
            .split(inner);

        let masked = "•".repeat(form.password.chars().count());
        Self::render_field(frame, "Email", &form.email, form.field == LoginField::Email, rows[0]);
        Self::render_field(frame, "Password", &masked, form.field == LoginField::Password, rows[1]);

        let message = if form.submitting {
            Paragraph::new("Authenticating...").style(theme::status_style(StatusTone::Info))
        } else if let Some(error) = &form.error {
            Paragraph::new(error.as_str()).style(Style::default().fg(theme::RED))
        } else {
            Paragraph::new("")
        };
        frame.render_widget(message.wrap(Wrap { trim: true }), rows[2]);

        frame.render_widget(
            Paragraph::new(format!("Tab switch field · Enter submit · {switch_hint} · Esc quit"))
                .style(theme::hint_style())
                .alignment(Alignment::Center),
            rows[3],
        );

        let (focus_area, focus_len) = match form.field {
            LoginField::Email => (rows[0], form.email.chars().count()),
            LoginField::Password => (rows[1], form.password.chars().count()),
        };
        let max_x = focus_area.width.saturating_sub(2);
        frame.set_cursor_position((
            focus_area.x + (focus_len as u16 + 1).min(max_x),
            focus_area.y + 1,
        ));
    }

    fn render_field(frame: &mut Frame<'_>, label: &str, value: &str, focused: bool, area: Rect) {
        let border = if focused {
            theme::focused_border_style()
        } else {
            theme::border_style()
        };
        let field = Paragraph::new(value).block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!(" {label} "))
                .border_style(border),
        );
        frame.render_widget(field, area);
    }
}

/// Fixed-height panel, horizontally a percentage of the screen.
fn centered(area: Rect, percent_x: u16, height: u16) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Fill(1), Constraint::Length(height), Constraint::Fill(1)])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}
