use crate::app::{App, InputMode};
use crate::ui::screens::{map, timeline};
use crate::ui::widgets::tables::scroll_offset;
use crate::ui::widgets::theme::{type_color, Palette};
use crate::views::{ActiveView, Card};
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line as TextLine, Span, Text};
use ratatui::widgets::{Block, Borders, Cell, Paragraph, Row, Table, Tabs, Wrap};
use ratatui::Frame;

pub fn render_dashboard(app: &App, f: &mut Frame<'_>) {
    let palette = Palette::for_theme(app.theme);
    f.render_widget(Block::default().style(palette.base()), f.area());

    let banner_height = if app.banner.is_some() { 3 } else { 0 };
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),             // title + stats
            Constraint::Length(banner_height), // load failure
            Constraint::Length(3),             // filters
            Constraint::Length(1),             // view tabs
            Constraint::Min(6),                // active view
            Constraint::Length(1),             // status
            Constraint::Length(1),             // shortcuts
        ])
        .split(f.area());

    render_header(app, &palette, f, chunks[0]);
    if let Some(banner) = &app.banner {
        render_banner(banner, &palette, f, chunks[1]);
    }
    render_filter_bar(app, &palette, f, chunks[2]);
    render_tabs(app, &palette, f, chunks[3]);

    match app.store.view() {
        ActiveView::Grid => render_grid(app, &palette, f, chunks[4]),
        ActiveView::Map => map::render_map(app, &palette, f, chunks[4]),
        ActiveView::Timeline => timeline::render_timeline(app, &palette, f, chunks[4]),
    }

    render_status(app, &palette, f, chunks[5]);
    f.render_widget(
        Paragraph::new(shortcuts_line(app, &palette)).alignment(Alignment::Center),
        chunks[6],
    );
}

fn render_header(app: &App, palette: &Palette, f: &mut Frame<'_>, area: Rect) {
    let models = app.views.models();
    let stats = &models.stats;

    let mut spans = vec![
        Span::styled("Crisis Documentation  ", palette.title()),
        Span::styled(
            format!("{} of {} incidents", stats.shown, stats.total),
            Style::default().fg(palette.fg).add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!("  verified {}", stats.verified),
            Style::default().fg(palette.success),
        ),
        Span::styled(
            format!("  deaths {}", stats.deaths),
            Style::default().fg(palette.error),
        ),
        Span::styled(
            format!("  injured {}", stats.injured),
            Style::default().fg(palette.warning),
        ),
    ];
    for (kind, count) in &stats.by_type {
        spans.push(Span::styled(
            format!("  {kind} {count}"),
            Style::default().fg(palette.muted),
        ));
    }

    let loaded = app.loaded_at.map_or_else(String::new, |at| {
        format!(" loaded {} ", at.with_timezone(&chrono::Local).format("%Y-%m-%d %H:%M"))
    });

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(palette.border))
        .title_bottom(TextLine::from(loaded).right_aligned());

    f.render_widget(Paragraph::new(TextLine::from(spans)).block(block), area);
}

fn render_banner(banner: &str, palette: &Palette, f: &mut Frame<'_>, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(palette.error));
    let paragraph = Paragraph::new(Span::styled(
        banner,
        Style::default().fg(palette.error).add_modifier(Modifier::BOLD),
    ))
    .block(block)
    .wrap(Wrap { trim: true });
    f.render_widget(paragraph, area);
}

fn render_filter_bar(app: &App, palette: &Palette, f: &mut Frame<'_>, area: Rect) {
    let filter = app.store.filter();
    let label = Style::default().fg(palette.muted);
    let value = Style::default().fg(palette.fg).add_modifier(Modifier::BOLD);

    let (search_text, search_style) = match app.input_mode {
        InputMode::Search => (format!("{}_", app.input_buffer), palette.key()),
        _ if filter.search_term.is_empty() => ("(none)".to_string(), label),
        _ => (filter.search_term.clone(), value),
    };
    let type_text = if filter.type_filter.is_empty() {
        "All types".to_string()
    } else {
        filter.type_filter.clone()
    };

    let mut spans = vec![
        Span::styled("Search: ", label),
        Span::styled(search_text, search_style),
        Span::styled("   Type: ", label),
        Span::styled(type_text, value),
        Span::styled("   Date: ", label),
        Span::styled(filter.date_window.label(), value),
    ];
    if app.input_mode == InputMode::GotoId {
        spans.push(Span::styled("   Go to id: ", label));
        spans.push(Span::styled(format!("{}_", app.input_buffer), palette.key()));
    }

    let border = if app.input_mode == InputMode::Normal {
        palette.border
    } else {
        palette.key
    };
    let block = Block::default()
        .title(" Filters ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border));

    f.render_widget(Paragraph::new(TextLine::from(spans)).block(block), area);
}

fn render_tabs(app: &App, palette: &Palette, f: &mut Frame<'_>, area: Rect) {
    let titles: Vec<String> = ActiveView::ALL
        .iter()
        .map(|view| format!("{} {}", view.index() + 1, view.label()))
        .collect();
    let tabs = Tabs::new(titles)
        .select(app.store.view().index())
        .style(Style::default().fg(palette.muted))
        .highlight_style(palette.title().add_modifier(Modifier::UNDERLINED));
    f.render_widget(tabs, area);
}

fn render_grid(app: &App, palette: &Palette, f: &mut Frame<'_>, area: Rect) {
    let models = app.views.models();
    let cards = &models.grid;

    if cards.is_empty() {
        render_empty(app, palette, f, area);
        return;
    }

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(65), Constraint::Percentage(35)])
        .split(area);

    let header = Row::new(vec![
        Cell::from("Date"),
        Cell::from("Type"),
        Cell::from("Title"),
        Cell::from("Location"),
        Cell::from("Casualties"),
        Cell::from("Status"),
    ])
    .style(palette.key());

    let max_visible_rows = columns[0].height.saturating_sub(3) as usize;
    let offset = scroll_offset(cards.len(), max_visible_rows, app.selected_index);

    let rows = cards
        .iter()
        .enumerate()
        .skip(offset)
        .take(max_visible_rows)
        .map(|(i, card)| card_row(card, i == app.selected_index, palette));

    let widths = [
        Constraint::Length(16),
        Constraint::Length(14),
        Constraint::Min(20),
        Constraint::Length(16),
        Constraint::Length(18),
        Constraint::Length(9),
    ];

    let table = Table::new(rows, widths)
        .header(header)
        .block(
            Block::default()
                .title(format!(
                    " Incidents ({} of {}) ",
                    (app.selected_index + 1).min(cards.len()),
                    cards.len()
                ))
                .borders(Borders::ALL)
                .border_style(Style::default().fg(palette.border)),
        )
        .column_spacing(1);
    f.render_widget(table, columns[0]);

    if let Some(card) = cards.get(app.selected_index) {
        render_card_preview(app, card, palette, f, columns[1]);
    }
}

fn card_row<'a>(card: &'a Card, selected: bool, palette: &Palette) -> Row<'a> {
    let style = if selected {
        palette.selected()
    } else {
        Style::default().fg(palette.fg)
    };
    let kind_style = if selected {
        style
    } else {
        Style::default().fg(type_color(&card.kind))
    };
    let status_style = if selected {
        style
    } else {
        palette.verification(card.verified)
    };

    Row::new(vec![
        Cell::from(card.date.as_str()),
        Cell::from(Span::styled(card.kind.label().to_string(), kind_style)),
        Cell::from(card.title.as_str()),
        Cell::from(card.location.as_str()),
        Cell::from(card.casualty_summary.as_str()),
        Cell::from(Span::styled(card.verified.label(), status_style)),
    ])
    .style(style)
}

fn render_card_preview(app: &App, card: &Card, palette: &Palette, f: &mut Frame<'_>, area: Rect) {
    let Some(incident) = app.store.incidents().get(card.index) else {
        return;
    };
    let label = Style::default().fg(palette.muted);

    let mut lines = vec![
        TextLine::from(Span::styled(incident.title.clone(), palette.title())),
        TextLine::from(vec![
            Span::styled(
                incident.kind.label().to_string(),
                Style::default().fg(type_color(&incident.kind)),
            ),
            Span::styled(format!("  {}", card.date), label),
        ]),
        TextLine::from(Span::styled(incident.location.name.clone(), label)),
        TextLine::from(""),
        TextLine::from(incident.description.clone()),
        TextLine::from(""),
    ];
    if !card.casualty_summary.is_empty() {
        lines.push(TextLine::from(card.casualty_summary.clone()));
    }
    lines.push(TextLine::from(Span::styled(
        format!(
            "{} evidence items, {} named casualties, {} sources",
            card.evidence_count,
            card.detail_count,
            incident.sources.len()
        ),
        label,
    )));
    if !incident.tags.is_empty() {
        lines.push(TextLine::from(Span::styled(
            format!("#{}", incident.tags.join(" #")),
            Style::default().fg(palette.accent),
        )));
    }

    let block = Block::default()
        .title(" Preview (Enter for details) ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(palette.border));
    f.render_widget(
        Paragraph::new(Text::from(lines))
            .block(block)
            .wrap(Wrap { trim: true }),
        area,
    );
}

pub(super) fn render_empty(app: &App, palette: &Palette, f: &mut Frame<'_>, area: Rect) {
    let message = if app.banner.is_some() {
        "No data loaded."
    } else if app.store.incidents().is_empty() {
        "No incidents documented yet."
    } else {
        "No incidents match the current filters. Press c to clear them."
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(palette.border));
    f.render_widget(
        Paragraph::new(Span::styled(message, Style::default().fg(palette.muted)))
            .block(block)
            .alignment(Alignment::Center),
        area,
    );
}

fn render_status(app: &App, palette: &Palette, f: &mut Frame<'_>, area: Rect) {
    let style = if app.status_message.starts_with("Error") {
        Style::default().fg(palette.error)
    } else {
        Style::default().fg(palette.success)
    };
    f.render_widget(
        Paragraph::new(Span::styled(app.status_message.as_str(), style)),
        area,
    );
}

fn shortcuts_line(app: &App, palette: &Palette) -> TextLine<'static> {
    match app.input_mode {
        InputMode::Search => palette.key_hints(&[("Enter/Esc", "Done"), ("Backspace", "Delete")]),
        InputMode::GotoId => palette.key_hints(&[("Enter", "Open"), ("Esc", "Cancel")]),
        InputMode::Normal => palette.key_hints(&[
            ("/", "Search"),
            ("t", "Type"),
            ("d", "Date"),
            ("c", "Clear"),
            ("1-3", "View"),
            ("Enter", "Details"),
            ("g", "Go to id"),
            ("r", "Reload"),
            ("T", "Theme"),
            ("a", "Admin"),
            ("F1", "Help"),
            ("q", "Quit"),
        ]),
    }
}
