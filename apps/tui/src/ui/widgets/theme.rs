use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line as TextLine, Span};

use crate::domain::{IncidentType, Theme, Verification};

/// Colours for one theme.
#[derive(Debug, Clone, Copy)]
pub struct Palette {
    pub fg: Color,
    pub bg: Color,
    pub muted: Color,
    pub accent: Color,
    pub border: Color,
    pub key: Color,
    pub selected_fg: Color,
    pub selected_bg: Color,
    pub success: Color,
    pub warning: Color,
    pub error: Color,
}

impl Palette {
    pub const fn for_theme(theme: Theme) -> Self {
        match theme {
            Theme::Dark => Self {
                fg: Color::White,
                bg: Color::Reset,
                muted: Color::Gray,
                accent: Color::Cyan,
                border: Color::DarkGray,
                key: Color::Yellow,
                selected_fg: Color::White,
                selected_bg: Color::Rgb(0, 0, 238),
                success: Color::Green,
                warning: Color::Yellow,
                error: Color::Red,
            },
            Theme::Light => Self {
                fg: Color::Black,
                bg: Color::Rgb(245, 245, 240),
                muted: Color::DarkGray,
                accent: Color::Blue,
                border: Color::Gray,
                key: Color::Magenta,
                selected_fg: Color::White,
                selected_bg: Color::Rgb(30, 90, 200),
                success: Color::Rgb(0, 120, 0),
                warning: Color::Rgb(160, 100, 0),
                error: Color::Rgb(180, 0, 0),
            },
        }
    }

    pub fn base(&self) -> Style {
        Style::default().fg(self.fg).bg(self.bg)
    }

    pub fn selected(&self) -> Style {
        Style::default()
            .bg(self.selected_bg)
            .fg(self.selected_fg)
            .add_modifier(Modifier::BOLD)
    }

    pub fn title(&self) -> Style {
        Style::default()
            .fg(self.accent)
            .add_modifier(Modifier::BOLD)
    }

    pub fn key(&self) -> Style {
        Style::default().fg(self.key).add_modifier(Modifier::BOLD)
    }

    pub fn verification(&self, verified: Verification) -> Style {
        match verified {
            Verification::Verified => Style::default().fg(self.success),
            Verification::Pending => Style::default().fg(self.warning),
        }
    }

    /// `key: action` pairs in the footer style.
    pub fn key_hints(&self, hints: &[(&'static str, &'static str)]) -> TextLine<'static> {
        let mut spans = Vec::with_capacity(hints.len() * 2);
        for (index, (key, action)) in hints.iter().enumerate() {
            spans.push(Span::styled(*key, self.key()));
            let separator = if index + 1 == hints.len() { "" } else { " | " };
            spans.push(Span::styled(
                format!(": {action}{separator}"),
                Style::default().fg(self.muted),
            ));
        }
        TextLine::from(spans)
    }
}

pub fn type_color(kind: &IncidentType) -> Color {
    match kind {
        IncidentType::Hunger => Color::Rgb(230, 150, 30),
        IncidentType::Water => Color::Rgb(40, 150, 230),
        IncidentType::Aid => Color::Rgb(60, 180, 90),
        IncidentType::Casualties => Color::Rgb(220, 50, 50),
        IncidentType::Infrastructure => Color::Rgb(150, 100, 200),
        IncidentType::Other(_) => Color::Gray,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_hints_alternate_key_and_action_spans() {
        let palette = Palette::for_theme(Theme::Dark);
        let line = palette.key_hints(&[("q", "Quit"), ("F1", "Help")]);

        assert_eq!(line.spans.len(), 4);
        assert_eq!(line.spans[0].content, "q");
        assert_eq!(line.spans[1].content, ": Quit | ");
        assert_eq!(line.spans[3].content, ": Help");
    }

    #[test]
    fn themes_differ() {
        assert_ne!(
            Palette::for_theme(Theme::Dark).fg,
            Palette::for_theme(Theme::Light).fg
        );
    }
}
