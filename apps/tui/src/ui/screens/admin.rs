use crate::app::{AdminFocus, App};
use crate::ui::widgets::tables::{format_size, scroll_offset};
use crate::ui::widgets::theme::Palette;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line as TextLine, Span, Text};
use ratatui::widgets::{Block, Borders, Cell, Gauge, Paragraph, Row, Table, Wrap};
use ratatui::Frame;
use throbber_widgets_tui::{Throbber, BRAILLE_SIX};

pub fn render_admin(app: &App, f: &mut Frame<'_>) {
    let palette = Palette::for_theme(app.theme);
    f.render_widget(Block::default().style(palette.base()), f.area());

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // title
            Constraint::Length(1), // alert / notice
            Constraint::Min(10),   // panels
            Constraint::Length(1), // shortcuts
        ])
        .split(f.area());

    f.render_widget(
        Paragraph::new(Span::styled(
            format!(
                " Extraction admin  {}",
                app.actions
                    .admin
                    .as_ref()
                    .map(|client| client.base_url().to_string())
                    .unwrap_or_default()
            ),
            palette.title(),
        )),
        rows[0],
    );
    render_messages(app, &palette, f, rows[1]);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(rows[2]);

    let left = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(8), Constraint::Length(7)])
        .split(columns[0]);
    render_url_form(app, &palette, f, left[0]);
    render_status(app, &palette, f, left[1]);

    let right = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage(40),
            Constraint::Length(4),
            Constraint::Min(5),
        ])
        .split(columns[1]);
    render_files(app, &palette, f, right[0]);
    render_statistics(app, &palette, f, right[1]);
    render_preview(app, &palette, f, right[2]);

    f.render_widget(
        Paragraph::new(palette.key_hints(&[
            ("Enter", "Add URL / Preview"),
            ("Del", "Drop last"),
            ("F2", "Validate"),
            ("F3", "Update CSV"),
            ("F4", "Backup"),
            ("F5", "Extract"),
            ("F6", "Refresh"),
            ("d", "Download"),
            ("Tab", "Focus"),
            ("Esc", "Back"),
        ])),
        rows[3],
    );
}

fn render_messages(app: &App, palette: &Palette, f: &mut Frame<'_>, area: Rect) {
    let line = match (&app.admin.alert, &app.admin.notice) {
        (Some(alert), _) => Span::styled(
            format!(" {alert}"),
            Style::default().fg(palette.error).add_modifier(Modifier::BOLD),
        ),
        (None, Some(notice)) => Span::styled(format!(" {notice}"), Style::default().fg(palette.success)),
        (None, None) => Span::raw(""),
    };
    f.render_widget(Paragraph::new(line), area);
}

fn focus_border(app: &App, focus: AdminFocus, palette: &Palette) -> Style {
    if app.admin.focus == focus {
        Style::default().fg(palette.key)
    } else {
        Style::default().fg(palette.border)
    }
}

fn checkbox(checked: bool) -> &'static str {
    if checked {
        "[x]"
    } else {
        "[ ]"
    }
}

fn render_url_form(app: &App, palette: &Palette, f: &mut Frame<'_>, area: Rect) {
    let muted = Style::default().fg(palette.muted);
    let mut lines = vec![
        TextLine::from(vec![
            Span::styled("URL: ", muted),
            Span::styled(format!("{}_", app.admin.url_input), palette.key()),
        ]),
        TextLine::from(""),
    ];

    if app.admin.urls.is_empty() {
        lines.push(TextLine::from(Span::styled("No URLs queued", muted)));
    }
    for (i, url) in app.admin.urls.iter().enumerate() {
        lines.push(TextLine::from(format!("{:>2}. {url}", i + 1)));
    }

    lines.push(TextLine::from(""));
    lines.push(TextLine::from(format!(
        "{} Update main CSV   {} Create backup",
        checkbox(app.admin.update_main_csv),
        checkbox(app.admin.create_backup)
    )));

    if let Some((url, validation)) = &app.admin.validation {
        let verdict = if validation.valid {
            Span::styled("reachable", Style::default().fg(palette.success))
        } else {
            Span::styled("not reachable", Style::default().fg(palette.error))
        };
        let mut details = Vec::new();
        if let Some(code) = validation.status_code {
            details.push(format!("HTTP {code}"));
        }
        if let Some(content_type) = &validation.content_type {
            details.push(content_type.clone());
        }
        if let Some(error) = &validation.error {
            details.push(error.clone());
        }
        lines.push(TextLine::from(vec![
            Span::styled(format!("{url}: "), muted),
            verdict,
            Span::styled(format!("  {}", details.join(", ")), muted),
        ]));
    }

    let block = Block::default()
        .title(format!(" URLs to extract ({}) ", app.pending_urls().len()))
        .borders(Borders::ALL)
        .border_style(focus_border(app, AdminFocus::Urls, palette));
    f.render_widget(
        Paragraph::new(Text::from(lines))
            .block(block)
            .wrap(Wrap { trim: true }),
        area,
    );
}

fn render_status(app: &App, palette: &Palette, f: &mut Frame<'_>, area: Rect) {
    let block = Block::default()
        .title(" Extraction status ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(palette.border));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let Some(status) = &app.admin.status else {
        f.render_widget(
            Paragraph::new(Span::styled(
                "Waiting for status...",
                Style::default().fg(palette.muted),
            )),
            inner,
        );
        return;
    };

    let parts = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Min(1),
        ])
        .split(inner);

    if status.running {
        let throbber = Throbber::default()
            .label(format!(
                "Processing {}/{} URLs",
                status.processed_urls, status.total_urls
            ))
            .style(Style::default().fg(palette.fg))
            .throbber_style(palette.key())
            .throbber_set(BRAILLE_SIX);
        let mut state = app.throbber.clone();
        f.render_stateful_widget(throbber, parts[0], &mut state);
    } else {
        f.render_widget(
            Paragraph::new(Span::styled("Idle", Style::default().fg(palette.muted))),
            parts[0],
        );
    }

    let gauge = Gauge::default()
        .gauge_style(Style::default().fg(palette.accent))
        .percent(u16::from(status.progress.min(100)));
    f.render_widget(gauge, parts[1]);

    let mut lines = vec![TextLine::from(status.message.clone())];
    if let Some(output) = &status.output_file {
        lines.push(TextLine::from(format!("Output: {output}")));
    }
    if let Some(last) = &status.last_extraction {
        lines.push(TextLine::from(Span::styled(
            format!("Last run: {last}"),
            Style::default().fg(palette.muted),
        )));
    }
    f.render_widget(
        Paragraph::new(Text::from(lines)).wrap(Wrap { trim: true }),
        parts[2],
    );
}

fn render_files(app: &App, palette: &Palette, f: &mut Frame<'_>, area: Rect) {
    let files = &app.admin.files;
    let max_visible_rows = area.height.saturating_sub(3) as usize;
    let offset = scroll_offset(files.len(), max_visible_rows, app.admin.selected_file);

    let rows = files
        .iter()
        .enumerate()
        .skip(offset)
        .take(max_visible_rows)
        .map(|(i, file)| {
            let style = if i == app.admin.selected_file && app.admin.focus == AdminFocus::Files {
                palette.selected()
            } else {
                Style::default().fg(palette.fg)
            };
            Row::new(vec![
                Cell::from(file.filename.as_str()),
                Cell::from(file.created.as_str()),
                Cell::from(format_size(file.size)),
            ])
            .style(style)
        });

    let table = Table::new(
        rows,
        [
            Constraint::Min(20),
            Constraint::Length(20),
            Constraint::Length(10),
        ],
    )
    .header(
        Row::new(vec![
            Cell::from("File"),
            Cell::from("Created"),
            Cell::from("Size"),
        ])
        .style(palette.key()),
    )
    .block(
        Block::default()
            .title(format!(" Extracted files ({}) ", files.len()))
            .borders(Borders::ALL)
            .border_style(focus_border(app, AdminFocus::Files, palette)),
    );
    f.render_widget(table, area);
}

fn render_statistics(app: &App, palette: &Palette, f: &mut Frame<'_>, area: Rect) {
    let text = app.admin.statistics.as_ref().map_or_else(
        || "No statistics yet".to_string(),
        |stats| {
            let total_size: u64 = stats.file_sizes.iter().sum();
            format!(
                "{} files, {} incidents, {} recent runs, {} on disk",
                stats.total_files,
                stats.total_incidents,
                stats.recent_extractions,
                format_size(total_size)
            )
        },
    );
    let block = Block::default()
        .title(" Statistics ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(palette.border));
    f.render_widget(
        Paragraph::new(text).block(block).wrap(Wrap { trim: true }),
        area,
    );
}

fn render_preview(app: &App, palette: &Palette, f: &mut Frame<'_>, area: Rect) {
    let Some((filename, preview)) = &app.admin.preview else {
        let block = Block::default()
            .title(" Preview ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(palette.border));
        f.render_widget(
            Paragraph::new(Span::styled(
                "Select a file and press Enter",
                Style::default().fg(palette.muted),
            ))
            .block(block),
            area,
        );
        return;
    };

    // a handful of leading columns keeps the table legible
    let columns: Vec<&String> = preview.columns.iter().take(4).collect();
    let header = Row::new(
        columns
            .iter()
            .map(|column| Cell::from(column.as_str()))
            .collect::<Vec<_>>(),
    )
    .style(palette.key());

    let rows = preview.rows.iter().map(|row| {
        Row::new(
            columns
                .iter()
                .map(|column| {
                    let value = row
                        .get(column.as_str())
                        .and_then(Option::as_deref)
                        .unwrap_or_default();
                    Cell::from(value)
                })
                .collect::<Vec<_>>(),
        )
    });

    let widths = vec![Constraint::Ratio(1, columns.len().max(1) as u32); columns.len()];
    let table = Table::new(rows, widths).header(header).block(
        Block::default()
            .title(format!(
                " {filename} ({} of {} rows) ",
                preview.rows.len(),
                preview.total_rows
            ))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(palette.border)),
    );
    f.render_widget(table, area);
}
