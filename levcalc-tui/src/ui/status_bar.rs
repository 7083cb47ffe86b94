//! Bottom status bar: key hints, axis mode, data-quality warnings.

use ratatui::layout::Rect;
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use crate::app::App;
use crate::theme;

pub fn render(f: &mut Frame, area: Rect, app: &App) {
    let mut spans: Vec<Span> = Vec::new();

    spans.push(Span::styled(
        " q:Quit j/k:Select Space:Show/Hide l:Log ?:Help",
        theme::muted(),
    ));

    if app.log_scale {
        spans.push(Span::raw(" | "));
        spans.push(Span::styled("LOG", theme::accent_bold()));
    }

    if app.has_synthetic {
        spans.push(Span::raw(" | "));
        spans.push(Span::styled("SYNTHETIC", theme::warning()));
    }

    if let Some(first) = app.warnings.first() {
        spans.push(Span::raw(" | "));
        let more = app.warnings.len() - 1;
        let text = if more > 0 {
            format!("{first} (+{more} more)")
        } else {
            first.clone()
        };
        spans.push(Span::styled(text, theme::warning()));
    }

    f.render_widget(Paragraph::new(Line::from(spans)), area);
}
