use chrono::{Duration, NaiveDateTime};

use crate::domain::Incident;

/// Relative date window applied against a reference "now".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DateWindow {
    #[default]
    Any,
    Today,
    Week,
    Month,
    Quarter,
}

impl DateWindow {
    pub const ALL: [Self; 5] = [Self::Any, Self::Today, Self::Week, Self::Month, Self::Quarter];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Any => "",
            Self::Today => "today",
            Self::Week => "week",
            Self::Month => "month",
            Self::Quarter => "quarter",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "" | "any" | "all" => Some(Self::Any),
            "today" => Some(Self::Today),
            "week" => Some(Self::Week),
            "month" => Some(Self::Month),
            "quarter" => Some(Self::Quarter),
            _ => None,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Any => "Any time",
            Self::Today => "Today",
            Self::Week => "Past week",
            Self::Month => "Past month",
            Self::Quarter => "Past quarter",
        }
    }

    pub const fn lookback_days(self) -> Option<i64> {
        match self {
            Self::Week => Some(7),
            Self::Month => Some(30),
            Self::Quarter => Some(90),
            Self::Any | Self::Today => None,
        }
    }

    #[must_use]
    pub fn next(self) -> Self {
        let index = Self::ALL.iter().position(|w| *w == self).unwrap_or(0);
        Self::ALL[(index + 1) % Self::ALL.len()]
    }

    pub fn matches(self, incident: &Incident, now: NaiveDateTime) -> bool {
        match self {
            Self::Any => true,
            Self::Today => incident
                .parsed_date()
                .is_some_and(|date| date.date() == now.date()),
            Self::Week | Self::Month | Self::Quarter => {
                let days = self.lookback_days().unwrap_or_default();
                let cutoff = now - Duration::days(days);
                incident.parsed_date().is_some_and(|date| date >= cutoff)
            }
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterState {
    pub search_term: String,
    /// Exact incident type; empty means any.
    pub type_filter: String,
    pub date_window: DateWindow,
}

impl FilterState {
    pub fn is_active(&self) -> bool {
        !self.search_term.trim().is_empty()
            || !self.type_filter.is_empty()
            || self.date_window != DateWindow::Any
    }

    pub fn matches(&self, incident: &Incident, now: NaiveDateTime) -> bool {
        self.search_matches(incident)
            && self.type_matches(incident)
            && self.date_window.matches(incident, now)
    }

    fn search_matches(&self, incident: &Incident) -> bool {
        let term = self.search_term.trim().to_lowercase();
        if term.is_empty() {
            return true;
        }

        let contains = |value: &str| value.to_lowercase().contains(&term);

        contains(&incident.title)
            || contains(&incident.description)
            || contains(&incident.location.name)
            || incident
                .details()
                .iter()
                .filter_map(|detail| detail.public_name())
                .any(contains)
    }

    fn type_matches(&self, incident: &Incident) -> bool {
        self.type_filter.is_empty() || incident.kind.as_str() == self.type_filter
    }

    /// Full re-scan of the master set; returns matching indices in source order.
    pub fn apply(&self, incidents: &[Incident], now: NaiveDateTime) -> Vec<usize> {
        incidents
            .iter()
            .enumerate()
            .filter(|(_, incident)| self.matches(incident, now))
            .map(|(index, _)| index)
            .collect()
    }
}
