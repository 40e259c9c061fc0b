use crate::app::App;
use crate::ui::screens::dashboard::render_empty;
use crate::ui::widgets::tables::scroll_offset;
use crate::ui::widgets::theme::{type_color, Palette};
use crate::views::monthly_counts;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::Style;
use ratatui::widgets::{BarChart, Block, Borders, Cell, Row, Table};
use ratatui::Frame;

pub fn render_timeline(app: &App, palette: &Palette, f: &mut Frame<'_>, area: Rect) {
    let models = app.views.models();
    let items = &models.timeline;

    if items.is_empty() {
        render_empty(app, palette, f, area);
        return;
    }

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(9), Constraint::Min(4)])
        .split(area);

    let counts = monthly_counts(items);
    let bars: Vec<(&str, u64)> = counts
        .iter()
        .map(|(month, count)| (month.as_str(), *count))
        .collect();
    let chart = BarChart::default()
        .block(
            Block::default()
                .title(" Incidents per month ")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(palette.border)),
        )
        .data(bars.as_slice())
        .bar_width(7)
        .bar_gap(1)
        .bar_style(Style::default().fg(palette.accent))
        .value_style(palette.selected());
    f.render_widget(chart, chunks[0]);

    let max_visible_rows = chunks[1].height.saturating_sub(3) as usize;
    let offset = scroll_offset(items.len(), max_visible_rows, app.selected_index);
    let rows = items
        .iter()
        .enumerate()
        .skip(offset)
        .take(max_visible_rows)
        .map(|(i, item)| {
            let selected = i == app.selected_index;
            let style = if selected {
                palette.selected()
            } else {
                Style::default().fg(palette.fg)
            };
            let kind_style = if selected {
                style
            } else {
                Style::default().fg(type_color(&item.kind))
            };
            Row::new(vec![
                Cell::from(item.at.format("%Y-%m-%d %H:%M").to_string()),
                Cell::from(item.kind.label().to_string()).style(kind_style),
                Cell::from(item.title.as_str()),
                Cell::from(item.location.as_str()),
            ])
            .style(style)
        });

    let first = items.first().map(|item| item.at.format("%Y-%m-%d").to_string());
    let last = items.last().map(|item| item.at.format("%Y-%m-%d").to_string());
    let span = match (first, last) {
        (Some(first), Some(last)) => format!(" Timeline {first} to {last} "),
        _ => " Timeline ".to_string(),
    };

    let table = Table::new(
        rows,
        [
            Constraint::Length(16),
            Constraint::Length(14),
            Constraint::Min(20),
            Constraint::Length(18),
        ],
    )
    .header(
        Row::new(vec![
            Cell::from("When"),
            Cell::from("Type"),
            Cell::from("Title"),
            Cell::from("Location"),
        ])
        .style(palette.key()),
    )
    .block(
        Block::default()
            .title(span)
            .borders(Borders::ALL)
            .border_style(Style::default().fg(palette.border)),
    );
    f.render_widget(table, chunks[1]);
}
