//! Color palette and style helpers for the TUI

use ratatui::style::{Color, Modifier, Style};

/// Purple-on-black palette
pub struct Theme;

impl Theme {
    // ═══════════════════════════════════════════════════════════════════════
    // PALETTE
    // ═══════════════════════════════════════════════════════════════════════

    pub const BACKGROUND: Color = Color::Rgb(0x0e, 0x0e, 0x10);
    pub const PRIMARY: Color = Color::Rgb(0x91, 0x46, 0xff);
    pub const SECONDARY: Color = Color::Rgb(0xbf, 0x94, 0xff);
    pub const ACCENT: Color = Color::Rgb(0xff, 0xd3, 0x37);
    pub const TEXT: Color = Color::Rgb(0xef, 0xef, 0xf1);
    pub const DIM: Color = Color::Rgb(0x6b, 0x6b, 0x75);
    pub const LIVE: Color = Color::Rgb(0xeb, 0x04, 0x00);
    pub const ERROR: Color = Color::Rgb(0xff, 0x4f, 0x4d);
    pub const BORDER: Color = Color::Rgb(0x3a, 0x2a, 0x5c);

    // ═══════════════════════════════════════════════════════════════════════
    // STYLE HELPERS
    // ═══════════════════════════════════════════════════════════════════════

    pub fn text() -> Style {
        Style::default().fg(Self::TEXT).bg(Self::BACKGROUND)
    }

    /// Selected row or key
    pub fn selected() -> Style {
        Style::default()
            .fg(Self::BACKGROUND)
            .bg(Self::PRIMARY)
            .add_modifier(Modifier::BOLD)
    }

    pub fn dimmed() -> Style {
        Style::default().fg(Self::DIM)
    }

    pub fn title() -> Style {
        Style::default()
            .fg(Self::PRIMARY)
            .add_modifier(Modifier::BOLD)
    }

    pub fn secondary() -> Style {
        Style::default().fg(Self::SECONDARY)
    }

    /// Favorite star
    pub fn accent() -> Style {
        Style::default()
            .fg(Self::ACCENT)
            .add_modifier(Modifier::BOLD)
    }

    /// Viewer count of a live stream
    pub fn live() -> Style {
        Style::default().fg(Self::LIVE)
    }

    pub fn error() -> Style {
        Style::default()
            .fg(Self::ERROR)
            .add_modifier(Modifier::BOLD)
    }

    pub fn border() -> Style {
        Style::default().fg(Self::BORDER)
    }

    pub fn border_focused() -> Style {
        Style::default().fg(Self::PRIMARY)
    }

    pub fn loading() -> Style {
        Style::default()
            .fg(Self::SECONDARY)
            .add_modifier(Modifier::ITALIC)
    }

    /// Keybinding hint
    pub fn keybind() -> Style {
        Style::default()
            .fg(Self::SECONDARY)
            .add_modifier(Modifier::BOLD)
    }
}
