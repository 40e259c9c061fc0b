use crate::app::App;
use crate::data::find_photo;
use crate::domain::{CasualtyDetail, Incident};
use crate::ui::widgets::popup::{centered_fixed, centered_rect, ClearWidget};
use crate::ui::widgets::theme::{type_color, Palette};
use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line as TextLine, Span, Text};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use ratatui::Frame;

pub fn render_incident_detail(app: &App, f: &mut Frame<'_>) {
    let palette = Palette::for_theme(app.theme);
    let Some(incident) = app.detail_incident() else {
        return;
    };

    let area = centered_rect(85, 85, f.area());
    f.render_widget(ClearWidget, area);

    let block = Block::default()
        .title(format!(" {} ", incident.title))
        .title_style(palette.title())
        .title_bottom(palette.key_hints(&[("Up/Down", "Scroll"), ("Esc", "Close")]).centered())
        .borders(Borders::ALL)
        .border_style(Style::default().fg(palette.accent))
        .style(palette.base());

    let paragraph = Paragraph::new(Text::from(detail_lines(incident, &palette)))
        .block(block)
        .wrap(Wrap { trim: false })
        .scroll((app.detail_scroll, 0));
    f.render_widget(paragraph, area);
}

fn section(title: &str, palette: &Palette) -> TextLine<'static> {
    TextLine::from(Span::styled(
        title.to_string(),
        Style::default()
            .fg(palette.accent)
            .add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
    ))
}

fn field(label: &str, value: String, palette: &Palette) -> TextLine<'static> {
    TextLine::from(vec![
        Span::styled(format!("{label}: "), Style::default().fg(palette.muted)),
        Span::styled(value, Style::default().fg(palette.fg)),
    ])
}

fn detail_lines(incident: &Incident, palette: &Palette) -> Vec<TextLine<'static>> {
    let when = match &incident.time {
        Some(time) => format!("{} {time}", incident.date),
        None => incident.date.clone(),
    };
    let place = match incident.location.coordinates {
        Some(point) => format!(
            "{} ({:.4}, {:.4})",
            incident.location.name, point.lat, point.lng
        ),
        None => incident.location.name.clone(),
    };

    let mut lines = vec![
        TextLine::from(vec![
            Span::styled(
                incident.kind.label().to_string(),
                Style::default()
                    .fg(type_color(&incident.kind))
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw("  "),
            Span::styled(
                incident.verified.label(),
                palette.verification(incident.verified),
            ),
            Span::styled(
                format!("  #{}", incident.id),
                Style::default().fg(palette.muted),
            ),
        ]),
        field("When", when, palette),
        field("Where", place, palette),
        TextLine::from(""),
        TextLine::from(incident.description.clone()),
    ];

    if let Some(casualties) = &incident.casualties {
        lines.push(TextLine::from(""));
        lines.push(section("Casualties", palette));
        let counts = casualties
            .entries()
            .iter()
            .map(|(label, count)| format!("{label}: {count}"))
            .collect::<Vec<_>>()
            .join("   ");
        lines.push(TextLine::from(counts));
    }

    if !incident.details().is_empty() {
        lines.push(TextLine::from(""));
        lines.push(section("Individuals", palette));
        for (index, detail) in incident.details().iter().enumerate() {
            lines.extend(casualty_lines(incident, index, detail, palette));
        }
    }

    if !incident.evidence_items().is_empty() {
        lines.push(TextLine::from(""));
        lines.push(section("Evidence", palette));
        for evidence in incident.evidence_items() {
            let mut spans = vec![
                Span::styled(
                    format!("[{}] ", evidence.kind.as_str()),
                    Style::default().fg(palette.muted),
                ),
                Span::styled(evidence.url.clone(), Style::default().fg(palette.accent)),
            ];
            if !evidence.description.is_empty() {
                spans.push(Span::raw(format!("  {}", evidence.description)));
            }
            lines.push(TextLine::from(spans));
        }
    }

    lines.push(TextLine::from(""));
    lines.push(section("Sources", palette));
    if incident.sources.is_empty() {
        lines.push(TextLine::from(Span::styled(
            "No sources listed",
            Style::default().fg(palette.muted),
        )));
    }
    for source in &incident.sources {
        lines.push(TextLine::from(format!("- {source}")));
    }

    if !incident.tags.is_empty() {
        lines.push(TextLine::from(""));
        lines.push(field("Tags", incident.tags.join(", "), palette));
    }

    lines
}

fn casualty_lines(
    incident: &Incident,
    index: usize,
    detail: &CasualtyDetail,
    palette: &Palette,
) -> Vec<TextLine<'static>> {
    let age = detail
        .age
        .map_or_else(|| "age unknown".to_string(), |age| format!("age {age}"));

    let mut lines = vec![TextLine::from(vec![
        Span::styled(
            detail.display_name(),
            Style::default().fg(palette.fg).add_modifier(Modifier::BOLD),
        ),
        Span::styled(format!("  {age}"), Style::default().fg(palette.muted)),
    ])];

    if let Some(warning) = &detail.ethical_notes.content_warning {
        lines.push(TextLine::from(Span::styled(
            format!("  Content warning: {warning}"),
            Style::default().fg(palette.warning),
        )));
    }

    for (label, value) in [
        ("Date", &detail.date),
        ("Cause", &detail.cause),
        ("Location", &detail.location_details),
        ("Medical facility", &detail.medical_facility),
        ("Condition", &detail.condition),
    ] {
        if !value.is_empty() {
            lines.push(field(&format!("  {label}"), value.clone(), palette));
        }
    }

    let photo = if detail.public_identifiers.published_image {
        find_photo(incident, index).map_or_else(
            || "no matching image".to_string(),
            |evidence| evidence.url.clone(),
        )
    } else {
        "not published".to_string()
    };
    lines.push(field("  Photo", photo, palette));

    if !detail.sources.is_empty() {
        lines.push(field("  Sources", detail.sources.join(", "), palette));
    }
    if let Some(status) = &detail.ethical_notes.privacy_status {
        lines.push(field("  Privacy", status.clone(), palette));
    }
    if let Some(purpose) = &detail.ethical_notes.documentation_purpose {
        lines.push(field("  Purpose", purpose.clone(), palette));
    }
    if !detail.public_identifiers.consent_verified {
        lines.push(TextLine::from(Span::styled(
            "  Consent not verified",
            Style::default().fg(palette.muted),
        )));
    }

    lines
}

pub fn render_not_found(app: &App, f: &mut Frame<'_>) {
    let palette = Palette::for_theme(app.theme);
    let area: Rect = centered_fixed(60, 7, f.area());
    f.render_widget(ClearWidget, area);

    let id = app.not_found_id.as_deref().unwrap_or_default();
    let lines = vec![
        TextLine::from(""),
        TextLine::from(Span::styled(
            format!("Incident \"{id}\" was not found."),
            Style::default().fg(palette.fg).add_modifier(Modifier::BOLD),
        )),
        TextLine::from(""),
        palette.key_hints(&[("r", "Reload data and retry"), ("Esc", "Close")]),
    ];

    let block = Block::default()
        .title(" Not found ")
        .title_style(Style::default().fg(palette.error).add_modifier(Modifier::BOLD))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(palette.error))
        .style(palette.base());

    f.render_widget(
        Paragraph::new(Text::from(lines))
            .block(block)
            .alignment(Alignment::Center),
        area,
    );
}
