//! src/view/theme.rs
//! ============================================================================
//! # Catppuccin Mocha Palette
//!
//! Colours from https://github.com/catppuccin/catppuccin plus the styles the
//! portal surfaces share.

use ratatui::style::{Color, Modifier, Style};

use crate::model::sync_state::StatusTone;

pub const BACKGROUND: Color = Color::Rgb(30, 30, 46); // Base
pub const CURRENT_LINE: Color = Color::Rgb(69, 71, 90); // Surface1
pub const FOREGROUND: Color = Color::Rgb(205, 214, 244); // Text
pub const COMMENT: Color = Color::Rgb(127, 132, 156); // Overlay1
pub const CYAN: Color = Color::Rgb(137, 220, 235); // Sky
pub const GREEN: Color = Color::Rgb(166, 227, 161); // Green
pub const PURPLE: Color = Color::Rgb(203, 166, 247); // Mauve
pub const RED: Color = Color::Rgb(243, 139, 168); // Red
pub const YELLOW: Color = Color::Rgb(249, 226, 175); // Yellow

pub fn base_style() -> Style {
    Style::default().bg(BACKGROUND).fg(FOREGROUND)
}

pub fn border_style() -> Style {
    Style::default().fg(COMMENT)
}

pub fn focused_border_style() -> Style {
    Style::default().fg(PURPLE)
}

pub fn title_style() -> Style {
    Style::default().fg(PURPLE).add_modifier(Modifier::BOLD)
}

pub fn header_style() -> Style {
    Style::default().fg(YELLOW).add_modifier(Modifier::BOLD)
}

pub fn highlight_style() -> Style {
    Style::default().bg(CURRENT_LINE).add_modifier(Modifier::BOLD)
}

pub fn hint_style() -> Style {
    Style::default().fg(COMMENT)
}

pub fn key_style() -> Style {
    Style::default().fg(CYAN).add_modifier(Modifier::BOLD)
}

/// Status line colour per tone.
pub fn status_style(tone: StatusTone) -> Style {
    let fg = match tone {
        StatusTone::Neutral => COMMENT,
        StatusTone::Info => CYAN,
        StatusTone::Success => GREEN,
        StatusTone::Error => RED,
    };
    Style::default().bg(BACKGROUND).fg(fg)
}
