use crate::app::App;
use crate::ui::screens::dashboard::render_empty;
use crate::ui::widgets::tables::scroll_offset;
use crate::ui::widgets::theme::{type_color, Palette};
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::Style;
use ratatui::symbols;
use ratatui::text::{Line as TextLine, Span};
use ratatui::widgets::canvas::{Canvas, Map, MapResolution, Points};
use ratatui::widgets::{Block, Borders, Cell, Row, Table};
use ratatui::Frame;

pub fn render_map(app: &App, palette: &Palette, f: &mut Frame<'_>, area: Rect) {
    let models = app.views.models();
    let model = &models.map;

    let Some((min_lng, min_lat, max_lng, max_lat)) = model.bounds() else {
        render_empty(app, palette, f, area);
        return;
    };

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(area);

    let skipped_note = if model.skipped > 0 {
        format!(" {} not on map (no coordinates) ", model.skipped)
    } else {
        String::new()
    };

    let canvas = Canvas::default()
        .block(
            Block::default()
                .title(format!(" Map ({} markers) ", model.markers.len()))
                .title_bottom(TextLine::from(skipped_note).right_aligned())
                .borders(Borders::ALL)
                .border_style(Style::default().fg(palette.border)),
        )
        .marker(symbols::Marker::Braille)
        .background_color(palette.bg)
        .x_bounds([min_lng, max_lng])
        .y_bounds([min_lat, max_lat])
        .paint(|ctx| {
            ctx.draw(&Map {
                color: palette.border,
                resolution: MapResolution::High,
            });
            ctx.layer();

            for (i, marker) in model.markers.iter().enumerate() {
                if i == app.selected_index {
                    continue;
                }
                ctx.draw(&Points {
                    coords: &[(marker.position.lng, marker.position.lat)],
                    color: type_color(&marker.kind),
                });
            }

            // selected marker last so it sits on top
            if let Some(marker) = model.markers.get(app.selected_index) {
                let (x, y) = (marker.position.lng, marker.position.lat);
                ctx.draw(&Points {
                    coords: &[(x, y)],
                    color: palette.key,
                });
                ctx.print(
                    x,
                    y,
                    TextLine::from(Span::styled(format!("x {}", marker.title), palette.key())),
                );
            }
        });
    f.render_widget(canvas, columns[0]);

    let max_visible_rows = columns[1].height.saturating_sub(3) as usize;
    let offset = scroll_offset(model.markers.len(), max_visible_rows, app.selected_index);
    let rows = model
        .markers
        .iter()
        .enumerate()
        .skip(offset)
        .take(max_visible_rows)
        .map(|(i, marker)| {
            let style = if i == app.selected_index {
                palette.selected()
            } else {
                Style::default().fg(type_color(&marker.kind))
            };
            Row::new(vec![
                Cell::from(marker.title.as_str()),
                Cell::from(format!(
                    "{:.4}, {:.4}",
                    marker.position.lat, marker.position.lng
                )),
            ])
            .style(style)
        });

    let table = Table::new(rows, [Constraint::Min(16), Constraint::Length(18)])
        .header(Row::new(vec![Cell::from("Incident"), Cell::from("Lat, Lng")]).style(palette.key()))
        .block(
            Block::default()
                .title(" Markers ")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(palette.border)),
        );
    f.render_widget(table, columns[1]);
}
