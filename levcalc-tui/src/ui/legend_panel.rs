//! Scenario legend: visibility checkbox, label and final price per scenario.

use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;

use crate::app::App;
use crate::theme;

pub fn render(f: &mut Frame, area: Rect, app: &App) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme::panel_border(false))
        .title(" Scenarios ")
        .title_style(theme::panel_title(false));

    let mut lines: Vec<Line> = Vec::with_capacity(app.series.len() * 2);
    for (i, series) in app.series.iter().enumerate() {
        let is_selected = i == app.selected;
        let cursor = if is_selected { "▶ " } else { "  " };
        let check = if series.visible { "[x] " } else { "[ ] " };

        let mut label_style = if series.visible {
            Style::default().fg(app.theme.series_color(i))
        } else {
            theme::muted()
        };
        if is_selected {
            label_style = label_style.add_modifier(Modifier::BOLD);
        }

        lines.push(Line::from(vec![
            Span::styled(cursor, theme::accent()),
            Span::styled(check, theme::text()),
            Span::styled(series.label.as_str(), label_style),
        ]));
        if let Some(last) = series.final_value() {
            lines.push(Line::from(Span::styled(
                format!("      final {last:.2}"),
                theme::muted(),
            )));
        }
    }

    if lines.is_empty() {
        lines.push(Line::from(Span::styled("no scenarios", theme::muted())));
    }

    f.render_widget(Paragraph::new(lines).block(block), area);
}
