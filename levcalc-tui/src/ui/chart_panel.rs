//! Price chart: one Braille line per visible scenario.

use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::symbols;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Axis, Block, Borders, Chart, Dataset, GraphType, LegendPosition, Paragraph};
use ratatui::Frame;

use crate::app::{App, PlotBounds};
use crate::theme;

pub fn render(f: &mut Frame, area: Rect, app: &App) {
    let title = if app.log_scale {
        " Leveraged Price (log) "
    } else {
        " Leveraged Price "
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme::panel_border(true))
        .title(title)
        .title_style(theme::panel_title(true));

    match app.plot_bounds() {
        Some(bounds) => render_chart(f, area, block, app, bounds),
        None => render_empty(f, area, block),
    }
}

fn render_empty(f: &mut Frame, area: Rect, block: Block) {
    let lines = vec![
        Line::from(""),
        Line::from(Span::styled("No scenario visible.", theme::muted())),
        Line::from(""),
        Line::from(Span::styled(
            "Select a scenario with j / k and press Space to show it.",
            theme::muted(),
        )),
    ];
    f.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_chart(f: &mut Frame, area: Rect, block: Block, app: &App, bounds: PlotBounds) {
    // Datasets borrow their points, so collect them first.
    let plotted: Vec<(usize, &str, Vec<(f64, f64)>)> = app
        .visible_series()
        .map(|(i, s)| (i, s.label.as_str(), app.plot_points(s)))
        .collect();

    let datasets: Vec<Dataset> = plotted
        .iter()
        .map(|(i, label, data)| {
            Dataset::default()
                .name(*label)
                .marker(symbols::Marker::Braille)
                .style(Style::default().fg(app.theme.series_color(*i)))
                .graph_type(GraphType::Line)
                .data(data)
        })
        .collect();

    let [x_min, x_max] = bounds.x;
    let [y_min, y_max] = bounds.y;
    let y_mid = (y_min + y_max) / 2.0;

    let chart = Chart::new(datasets)
        .block(block)
        .legend_position(Some(LegendPosition::TopLeft))
        .x_axis(
            Axis::default()
                .title(Span::styled("Year", theme::muted()))
                .style(theme::muted())
                .bounds([x_min, x_max])
                .labels(vec![
                    Span::styled(format!("{:.0}", x_min.floor()), theme::muted()),
                    Span::styled(format!("{:.0}", x_max.floor()), theme::muted()),
                ]),
        )
        .y_axis(
            Axis::default()
                .title(Span::styled("Price", theme::muted()))
                .style(theme::muted())
                .bounds([y_min, y_max])
                .labels(
                    [y_min, y_mid, y_max]
                        .into_iter()
                        .map(|y| Span::styled(price_label(app.axis_value(y)), theme::muted()))
                        .collect::<Vec<_>>(),
                ),
        );

    f.render_widget(chart, area);
}

fn price_label(value: f64) -> String {
    if value.abs() >= 1000.0 {
        format!("{value:.0}")
    } else {
        format!("{value:.2}")
    }
}
