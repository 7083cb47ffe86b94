//! Help overlay: keyboard shortcuts.

use ratatui::layout::Rect;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};
use ratatui::Frame;

use crate::theme;

pub fn render(f: &mut Frame, area: Rect) {
    let mut lines: Vec<Line> = Vec::new();

    section(&mut lines, "Keyboard");
    key(&mut lines, "q / Esc", "Quit");
    key(&mut lines, "j / Down", "Select next scenario");
    key(&mut lines, "k / Up", "Select previous scenario");
    key(&mut lines, "Space", "Show / hide selected scenario");
    key(&mut lines, "l", "Toggle logarithmic price axis");
    key(&mut lines, "?", "Close this help");
    lines.push(Line::from(""));

    section(&mut lines, "Chart");
    key(&mut lines, "x axis", "Fractional year of each trading day");
    key(&mut lines, "Legend", "Leverage X, yearly fee %");

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme::accent())
        .title(" Help ")
        .title_style(theme::accent_bold());

    f.render_widget(Clear, area);
    f.render_widget(Paragraph::new(lines).block(block), area);
}

fn section<'a>(lines: &mut Vec<Line<'a>>, title: &str) {
    lines.push(Line::from(Span::styled(title.to_string(), theme::accent_bold())));
}

fn key<'a>(lines: &mut Vec<Line<'a>>, keys: &str, desc: &str) {
    lines.push(Line::from(vec![
        Span::styled(format!("  {:>10}  ", keys), theme::accent()),
        Span::styled(desc.to_string(), theme::muted()),
    ]));
}
