use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::ser::SerializeSeq;
use serde::{Serialize, Serializer};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IncidentType {
    Hunger,
    Water,
    Aid,
    Casualties,
    Infrastructure,
    Other(String),
}

impl IncidentType {
    pub const KNOWN: [Self; 5] = [
        Self::Hunger,
        Self::Water,
        Self::Aid,
        Self::Casualties,
        Self::Infrastructure,
    ];

    pub fn as_str(&self) -> &str {
        match self {
            Self::Hunger => "hunger",
            Self::Water => "water",
            Self::Aid => "aid",
            Self::Casualties => "casualties",
            Self::Infrastructure => "infrastructure",
            Self::Other(raw) => raw,
        }
    }

    /// Known types match case-insensitively; anything else is kept verbatim.
    pub fn parse(value: &str) -> Self {
        let trimmed = value.trim();
        match trimmed.to_lowercase().as_str() {
            "hunger" => Self::Hunger,
            "water" => Self::Water,
            "aid" => Self::Aid,
            "casualties" => Self::Casualties,
            "infrastructure" => Self::Infrastructure,
            _ => Self::Other(trimmed.to_string()),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Self::Hunger => "Hunger",
            Self::Water => "Water",
            Self::Aid => "Aid",
            Self::Casualties => "Casualties",
            Self::Infrastructure => "Infrastructure",
            Self::Other(raw) if raw.is_empty() => "Other",
            Self::Other(raw) => raw,
        }
    }
}

impl Serialize for IncidentType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Verification {
    Verified,
    #[default]
    Pending,
}

impl Verification {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Verified => "verified",
            Self::Pending => "pending",
        }
    }

    pub fn parse(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "verified" | "true" | "1" | "yes" => Self::Verified,
            _ => Self::Pending,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Verified => "Verified",
            Self::Pending => "Pending",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EvidenceKind {
    Image,
    Video,
    Other(String),
}

impl EvidenceKind {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Image => "image",
            Self::Video => "video",
            Self::Other(raw) => raw,
        }
    }

    pub fn parse(value: &str) -> Self {
        let trimmed = value.trim();
        match trimmed.to_lowercase().as_str() {
            "image" => Self::Image,
            "video" => Self::Video,
            _ => Self::Other(trimmed.to_string()),
        }
    }
}

impl Serialize for EvidenceKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    pub lng: f64,
    pub lat: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Location {
    pub name: String,
    #[serde(serialize_with = "serialize_coordinates")]
    pub coordinates: Option<Coordinates>,
}

// Rendered as `[lng, lat]` or `[]`, never partially.
fn serialize_coordinates<S: Serializer>(
    coordinates: &Option<Coordinates>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match coordinates {
        Some(point) => {
            let mut seq = serializer.serialize_seq(Some(2))?;
            seq.serialize_element(&point.lng)?;
            seq.serialize_element(&point.lat)?;
            seq.end()
        }
        None => serializer.serialize_seq(Some(0))?.end(),
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Casualties {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub affected: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub critical: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deaths: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub injured: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hospitalized: Option<u32>,
}

impl Casualties {
    pub const fn is_empty(&self) -> bool {
        self.affected.is_none()
            && self.critical.is_none()
            && self.deaths.is_none()
            && self.injured.is_none()
            && self.hospitalized.is_none()
    }

    /// Label/count pairs for the fields that were present in the source row.
    pub fn entries(&self) -> Vec<(&'static str, u32)> {
        [
            ("Affected", self.affected),
            ("Critical", self.critical),
            ("Deaths", self.deaths),
            ("Injured", self.injured),
            ("Hospitalized", self.hospitalized),
        ]
        .into_iter()
        .filter_map(|(label, count)| count.map(|count| (label, count)))
        .collect()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicIdentifiers {
    pub published_name: bool,
    pub published_image: bool,
    pub consent_verified: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EthicalNotes {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_warning: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub privacy_status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub documentation_purpose: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CasualtyDetail {
    pub reference_id: String,
    pub name: String,
    /// `None` when the source cell was missing or not a number.
    pub age: Option<u32>,
    pub date: String,
    pub cause: String,
    pub location_details: String,
    pub medical_facility: String,
    pub condition: String,
    pub sources: Vec<String>,
    pub public_identifiers: PublicIdentifiers,
    pub ethical_notes: EthicalNotes,
}

impl CasualtyDetail {
    /// The name as it may be shown or searched; withheld unless published.
    pub fn public_name(&self) -> Option<&str> {
        (self.public_identifiers.published_name && !self.name.is_empty())
            .then_some(self.name.as_str())
    }

    pub fn display_name(&self) -> String {
        self.public_name().map_or_else(
            || {
                if self.reference_id.is_empty() {
                    "Name withheld".to_string()
                } else {
                    format!("Name withheld ({})", self.reference_id)
                }
            },
            str::to_string,
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Evidence {
    #[serde(rename = "type")]
    pub kind: EvidenceKind,
    pub url: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Incident {
    pub id: String,
    pub title: String,
    pub date: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
    pub location: Location,
    #[serde(rename = "type")]
    pub kind: IncidentType,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub casualties: Option<Casualties>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub casualties_details: Option<Vec<CasualtyDetail>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub evidence: Option<Vec<Evidence>>,
    pub sources: Vec<String>,
    pub verified: Verification,
    pub tags: Vec<String>,
}

impl Incident {
    pub fn parsed_date(&self) -> Option<NaiveDateTime> {
        parse_incident_date(&self.date)
    }

    pub fn details(&self) -> &[CasualtyDetail] {
        self.casualties_details.as_deref().unwrap_or_default()
    }

    pub fn evidence_items(&self) -> &[Evidence] {
        self.evidence.as_deref().unwrap_or_default()
    }
}

/// Accepts `YYYY-MM-DD`, `YYYY-MM-DDTHH:MM[:SS]` (space separator too) and RFC 3339.
pub fn parse_incident_date(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    if let Ok(date_time) = DateTime::parse_from_rfc3339(value) {
        return Some(date_time.naive_utc());
    }

    for format in [
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%d %H:%M",
    ] {
        if let Ok(date_time) = NaiveDateTime::parse_from_str(value, format) {
            return Some(date_time);
        }
    }

    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    Light,
    #[default]
    Dark,
}

impl Theme {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "light" => Some(Self::Light),
            "dark" => Some(Self::Dark),
            _ => None,
        }
    }

    pub const fn toggle(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn incident_type_keeps_unknown_values_verbatim() {
        assert_eq!(IncidentType::parse(" Water "), IncidentType::Water);
        assert_eq!(
            IncidentType::parse("Displacement"),
            IncidentType::Other("Displacement".to_string())
        );
        assert_eq!(IncidentType::parse("Displacement").as_str(), "Displacement");
    }

    #[test]
    fn dates_accept_plain_and_timestamped_forms() {
        let plain = parse_incident_date("2024-03-05").map(|d| d.to_string());
        assert_eq!(plain.as_deref(), Some("2024-03-05 00:00:00"));

        let stamped = parse_incident_date("2024-03-05T14:30").map(|d| d.to_string());
        assert_eq!(stamped.as_deref(), Some("2024-03-05 14:30:00"));

        assert!(parse_incident_date("").is_none());
        assert!(parse_incident_date("yesterday").is_none());
    }

    #[test]
    fn withheld_names_are_not_public() {
        let detail = CasualtyDetail {
            reference_id: "C-7".to_string(),
            name: "Amal".to_string(),
            age: Some(9),
            date: String::new(),
            cause: String::new(),
            location_details: String::new(),
            medical_facility: String::new(),
            condition: String::new(),
            sources: Vec::new(),
            public_identifiers: PublicIdentifiers::default(),
            ethical_notes: EthicalNotes::default(),
        };

        assert_eq!(detail.public_name(), None);
        assert_eq!(detail.display_name(), "Name withheld (C-7)");
    }

    #[test]
    fn location_serializes_missing_coordinates_as_empty_array() {
        let location = Location {
            name: "Rafah".to_string(),
            coordinates: None,
        };
        let json = serde_json::to_value(&location).unwrap_or_default();
        assert_eq!(json["coordinates"], serde_json::json!([]));

        let pinned = Location {
            name: "Rafah".to_string(),
            coordinates: Some(Coordinates {
                lng: 34.25,
                lat: 31.28,
            }),
        };
        let json = serde_json::to_value(&pinned).unwrap_or_default();
        assert_eq!(json["coordinates"], serde_json::json!([34.25, 31.28]));
    }

    #[test]
    fn theme_toggles_between_light_and_dark() {
        assert_eq!(Theme::Dark.toggle(), Theme::Light);
        assert_eq!(Theme::parse("LIGHT"), Some(Theme::Light));
        assert_eq!(Theme::parse("sepia"), None);
    }
}
