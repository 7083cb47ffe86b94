//! LevCalc TUI: interactive chart of leveraged price scenarios.
//!
//! Layout:
//! - Chart: one line per visible scenario, price against fractional year
//! - Legend: scenario list with visibility toggles
//! - Status bar: key hints and data-quality warnings
//! - Help overlay (`?`)

pub mod app;
pub mod input;
pub mod theme;
pub mod ui;

pub use app::{App, ChartSeries};
pub use input::handle_key;
pub use theme::Theme;
