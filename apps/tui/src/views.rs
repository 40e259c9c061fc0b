//! View models for the three synchronized incident views.
//!
//! Each builder is a pure function of the master set and the filtered indices.

use std::collections::BTreeMap;

use chrono::NaiveDateTime;

use crate::domain::{Coordinates, Incident, IncidentType, Verification};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ActiveView {
    #[default]
    Grid,
    Map,
    Timeline,
}

impl ActiveView {
    pub const ALL: [Self; 3] = [Self::Grid, Self::Map, Self::Timeline];

    pub const fn index(self) -> usize {
        match self {
            Self::Grid => 0,
            Self::Map => 1,
            Self::Timeline => 2,
        }
    }

    pub const fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Self::Grid),
            1 => Some(Self::Map),
            2 => Some(Self::Timeline),
            _ => None,
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "grid" | "cards" => Some(Self::Grid),
            "map" => Some(Self::Map),
            "timeline" => Some(Self::Timeline),
            _ => None,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Grid => "Grid",
            Self::Map => "Map",
            Self::Timeline => "Timeline",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Card {
    pub index: usize,
    pub id: String,
    pub title: String,
    pub kind: IncidentType,
    pub date: String,
    pub location: String,
    pub verified: Verification,
    pub casualty_summary: String,
    pub evidence_count: usize,
    pub detail_count: usize,
}

pub fn grid_cards(incidents: &[Incident], filtered: &[usize]) -> Vec<Card> {
    filtered
        .iter()
        .filter_map(|&index| incidents.get(index).map(|incident| (index, incident)))
        .map(|(index, incident)| Card {
            index,
            id: incident.id.clone(),
            title: incident.title.clone(),
            kind: incident.kind.clone(),
            date: match &incident.time {
                Some(time) => format!("{} {time}", incident.date),
                None => incident.date.clone(),
            },
            location: incident.location.name.clone(),
            verified: incident.verified,
            casualty_summary: casualty_summary(incident),
            evidence_count: incident.evidence_items().len(),
            detail_count: incident.details().len(),
        })
        .collect()
}

fn casualty_summary(incident: &Incident) -> String {
    incident.casualties.as_ref().map_or_else(String::new, |casualties| {
        casualties
            .entries()
            .iter()
            .map(|(label, count)| format!("{label}: {count}"))
            .collect::<Vec<_>>()
            .join("  ")
    })
}

#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    pub index: usize,
    pub title: String,
    pub kind: IncidentType,
    pub position: Coordinates,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MapModel {
    pub markers: Vec<Marker>,
    /// Filtered incidents left off the map for lack of coordinates.
    pub skipped: usize,
}

impl MapModel {
    /// Bounding box `(min_lng, min_lat, max_lng, max_lat)` padded so single points stay visible.
    pub fn bounds(&self) -> Option<(f64, f64, f64, f64)> {
        let first = self.markers.first()?.position;
        let (mut min_lng, mut min_lat, mut max_lng, mut max_lat) =
            (first.lng, first.lat, first.lng, first.lat);
        for marker in &self.markers {
            min_lng = min_lng.min(marker.position.lng);
            max_lng = max_lng.max(marker.position.lng);
            min_lat = min_lat.min(marker.position.lat);
            max_lat = max_lat.max(marker.position.lat);
        }
        let pad_lng = ((max_lng - min_lng) * 0.1).max(0.05);
        let pad_lat = ((max_lat - min_lat) * 0.1).max(0.05);
        Some((
            min_lng - pad_lng,
            min_lat - pad_lat,
            max_lng + pad_lng,
            max_lat + pad_lat,
        ))
    }
}

pub fn map_markers(incidents: &[Incident], filtered: &[usize]) -> MapModel {
    let mut model = MapModel::default();

    for &index in filtered {
        let Some(incident) = incidents.get(index) else {
            continue;
        };
        let Some(position) = incident.location.coordinates else {
            tracing::warn!(id = %incident.id, "incident has no coordinates, not shown on map");
            model.skipped += 1;
            continue;
        };
        model.markers.push(Marker {
            index,
            title: incident.title.clone(),
            kind: incident.kind.clone(),
            position,
        });
    }

    model
}

#[derive(Debug, Clone, PartialEq)]
pub struct TimelineItem {
    pub index: usize,
    pub at: NaiveDateTime,
    pub title: String,
    pub kind: IncidentType,
    pub location: String,
}

/// Dated incidents in ascending date order; ties keep source order.
pub fn timeline_items(incidents: &[Incident], filtered: &[usize]) -> Vec<TimelineItem> {
    let mut items: Vec<TimelineItem> = filtered
        .iter()
        .filter_map(|&index| {
            let incident = incidents.get(index)?;
            let at = incident.parsed_date()?;
            Some(TimelineItem {
                index,
                at,
                title: incident.title.clone(),
                kind: incident.kind.clone(),
                location: incident.location.name.clone(),
            })
        })
        .collect();

    items.sort_by_key(|item| item.at);
    items
}

/// Incident counts per calendar month, for the timeline histogram.
pub fn monthly_counts(items: &[TimelineItem]) -> Vec<(String, u64)> {
    let mut buckets: BTreeMap<String, u64> = BTreeMap::new();
    for item in items {
        *buckets
            .entry(item.at.format("%Y-%m").to_string())
            .or_default() += 1;
    }
    buckets.into_iter().collect()
}

#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
pub struct StatsSummary {
    pub total: usize,
    pub shown: usize,
    pub verified: usize,
    pub deaths: u64,
    pub injured: u64,
    pub by_type: Vec<(String, usize)>,
}

pub fn stats_summary(incidents: &[Incident], filtered: &[usize]) -> StatsSummary {
    let mut summary = StatsSummary {
        total: incidents.len(),
        shown: filtered.len(),
        ..StatsSummary::default()
    };
    let mut by_type: BTreeMap<String, usize> = BTreeMap::new();

    for incident in filtered.iter().filter_map(|&index| incidents.get(index)) {
        if incident.verified == Verification::Verified {
            summary.verified += 1;
        }
        if let Some(casualties) = &incident.casualties {
            summary.deaths += u64::from(casualties.deaths.unwrap_or_default());
            summary.injured += u64::from(casualties.injured.unwrap_or_default());
        }
        *by_type.entry(incident.kind.as_str().to_string()).or_default() += 1;
    }

    summary.by_type = by_type.into_iter().collect();
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{assemble_incidents, RawRow};

    fn incidents() -> Vec<Incident> {
        let rows = vec![
            RawRow::new()
                .with("id", "a")
                .with("title", "Late")
                .with("date", "2024-03-10")
                .with("location_coordinates_lng", "34.4")
                .with("location_coordinates_lat", "31.5")
                .with("casualties_deaths", "2"),
            RawRow::new().with("id", "b").with("title", "Undated"),
            RawRow::new()
                .with("id", "c")
                .with("title", "Early")
                .with("date", "2024-01-02")
                .with("verified", "verified")
                .with("casualties_injured", "4"),
        ];
        assemble_incidents(&rows, &[]).incidents
    }

    #[test]
    fn map_skips_incidents_without_coordinates() {
        let incidents = incidents();
        let model = map_markers(&incidents, &[0, 1, 2]);

        assert_eq!(model.markers.len(), 1);
        assert_eq!(model.markers[0].index, 0);
        assert_eq!(model.skipped, 2);
        assert!(model.bounds().is_some());
    }

    #[test]
    fn timeline_sorts_and_drops_undated() {
        let incidents = incidents();
        let items = timeline_items(&incidents, &[0, 1, 2]);
        let titles: Vec<&str> = items.iter().map(|i| i.title.as_str()).collect();

        assert_eq!(titles, vec!["Early", "Late"]);
        assert_eq!(
            monthly_counts(&items),
            vec![("2024-01".to_string(), 1), ("2024-03".to_string(), 1)]
        );
    }

    #[test]
    fn grid_follows_filtered_order_and_keeps_undated() {
        let incidents = incidents();
        let cards = grid_cards(&incidents, &[2, 1]);

        assert_eq!(cards.len(), 2);
        assert_eq!(cards[0].id, "c");
        assert_eq!(cards[0].casualty_summary, "Injured: 4");
        assert_eq!(cards[1].id, "b");
    }

    #[test]
    fn stats_cover_the_filtered_set_only() {
        let incidents = incidents();
        let stats = stats_summary(&incidents, &[0, 2]);

        assert_eq!(stats.total, 3);
        assert_eq!(stats.shown, 2);
        assert_eq!(stats.verified, 1);
        assert_eq!(stats.deaths, 2);
        assert_eq!(stats.injured, 4);
    }
}
