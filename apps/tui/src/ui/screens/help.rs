use crate::app::App;
use crate::cli::CliArgs;
use crate::ui::widgets::popup::{centered_rect, ClearWidget};
use crate::ui::widgets::theme::Palette;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line as TextLine, Span, Text};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use ratatui::Frame;

const DASHBOARD_KEYS: &[(&str, &str)] = &[
    ("F1", "Toggle this help screen"),
    ("/", "Search title, description and location"),
    ("t", "Cycle incident type filter"),
    ("d", "Cycle date window (any, today, week, month, quarter)"),
    ("c", "Clear all filters"),
    ("1 2 3", "Grid, map or timeline view"),
    ("Tab / Left / Right", "Switch view"),
    ("Up / Down / PgUp / PgDn", "Move selection"),
    ("Enter", "Open incident details"),
    ("g", "Open incident by id"),
    ("r", "Reload data"),
    ("T", "Toggle light / dark theme"),
    ("a", "Extraction admin"),
    ("q", "Quit"),
];

const ADMIN_KEYS: &[(&str, &str)] = &[
    ("Tab", "Switch between URL form and files"),
    ("Enter", "Queue URL / preview selected file"),
    ("Del", "Remove last queued URL"),
    ("F2", "Validate URL"),
    ("F3 / F4", "Toggle update-main-CSV / backup"),
    ("F5", "Start extraction"),
    ("F6", "Refresh files and statistics"),
    ("d", "Download selected file"),
    ("Esc", "Back to dashboard"),
];

fn key_line(key: &str, action: &str, palette: &Palette) -> TextLine<'static> {
    TextLine::from(vec![
        Span::styled(format!("  {key}"), palette.key()),
        Span::styled(format!(" - {action}"), Style::default().fg(palette.fg)),
    ])
}

fn heading(text: &str) -> TextLine<'static> {
    TextLine::from(Span::styled(
        text.to_string(),
        Style::default().add_modifier(Modifier::BOLD),
    ))
}

fn build_help_lines(palette: &Palette) -> Vec<TextLine<'static>> {
    let mut lines = vec![
        TextLine::from(Span::styled("Crisis Documentation", palette.title())),
        TextLine::from(""),
        TextLine::from(
            "Browse documented incidents as a grid, a map or a timeline, and drive the extraction service.",
        ),
        TextLine::from(""),
        heading("Keyboard Shortcuts:"),
    ];
    lines.extend(
        DASHBOARD_KEYS
            .iter()
            .map(|(key, action)| key_line(key, action, palette)),
    );

    lines.push(TextLine::from(""));
    lines.push(heading("Extraction admin:"));
    lines.extend(
        ADMIN_KEYS
            .iter()
            .map(|(key, action)| key_line(key, action, palette)),
    );

    lines.push(TextLine::from(""));
    lines.push(heading("Command line:"));
    lines.extend(
        CliArgs::help_text()
            .lines()
            .map(|line| TextLine::from(Span::styled(line.to_string(), Style::default().fg(palette.muted)))),
    );

    lines
}

pub fn render_help_popup(app: &App, f: &mut Frame<'_>) {
    let palette = Palette::for_theme(app.theme);
    let popup_area = centered_rect(80, 80, f.area());
    f.render_widget(ClearWidget, popup_area);

    let help_block = Block::default()
        .title("== Help & Keyboard Shortcuts ==")
        .title_style(palette.key())
        .borders(Borders::ALL)
        .border_style(Style::default().fg(palette.key))
        .style(palette.base());

    f.render_widget(
        Paragraph::new(Text::from(build_help_lines(&palette)))
            .block(help_block)
            .wrap(Wrap { trim: true }),
        popup_area,
    );

    let hint = Paragraph::new(Span::styled(
        "Press F1 or Esc to close",
        Style::default().fg(palette.muted),
    ))
    .alignment(Alignment::Center);

    let hint_area = Rect {
        x: popup_area.x,
        y: popup_area.y + popup_area.height.saturating_sub(2),
        width: popup_area.width,
        height: 1,
    };
    f.render_widget(hint, hint_area);
}
