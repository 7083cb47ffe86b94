//! Neon-on-charcoal palette for the LevCalc TUI.
//!
//! # Color Palette
//! - **Accent**: Electric cyan (focus, selection, titles)
//! - **Warning**: Neon orange (data-quality warnings, synthetic tag)
//! - **Muted**: Steel blue (axes, hints, hidden scenarios)
//! - **Series**: a rotating set of line colors, one per scenario

use ratatui::style::{Color, Modifier, Style};

pub const ACCENT: Color = Color::Rgb(0, 255, 255);
pub const WARNING: Color = Color::Rgb(255, 140, 0);
pub const MUTED: Color = Color::Rgb(100, 149, 237);
pub const TEXT: Color = Color::White;

/// Line colors assigned to scenarios in request order.
pub const SERIES_COLORS: [Color; 8] = [
    Color::Rgb(0, 255, 255),   // cyan
    Color::Rgb(255, 20, 147),  // hot pink
    Color::Rgb(0, 255, 128),   // neon green
    Color::Rgb(255, 140, 0),   // orange
    Color::Rgb(147, 112, 219), // purple
    Color::Rgb(255, 255, 0),   // yellow
    Color::Rgb(100, 149, 237), // steel blue
    Color::Rgb(255, 99, 71),   // tomato
];

#[derive(Debug, Clone, Copy)]
pub struct Theme {
    pub background: Color,
    pub accent: Color,
    pub warning: Color,
    pub muted: Color,
    pub text_primary: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self::parrot_neon()
    }
}

impl Theme {
    pub fn parrot_neon() -> Self {
        Self {
            background: Color::Rgb(18, 18, 20),
            accent: ACCENT,
            warning: WARNING,
            muted: MUTED,
            text_primary: TEXT,
        }
    }

    /// Line color of the scenario at `index`, cycling through the palette.
    pub fn series_color(&self, index: usize) -> Color {
        SERIES_COLORS[index % SERIES_COLORS.len()]
    }
}

pub fn accent() -> Style {
    Style::default().fg(ACCENT)
}

pub fn accent_bold() -> Style {
    accent().add_modifier(Modifier::BOLD)
}

pub fn warning() -> Style {
    Style::default().fg(WARNING)
}

pub fn muted() -> Style {
    Style::default().fg(MUTED)
}

pub fn text() -> Style {
    Style::default().fg(TEXT)
}

pub fn panel_border(active: bool) -> Style {
    if active {
        accent()
    } else {
        muted()
    }
}

pub fn panel_title(active: bool) -> Style {
    if active {
        accent_bold()
    } else {
        muted()
    }
}
