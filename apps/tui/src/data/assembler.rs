use crate::data::fields::{
    parse_age, parse_boolean_field, parse_coordinate, parse_count, parse_delimited_field,
};
use crate::data::rows::RawRow;
use crate::domain::{
    Casualties, CasualtyDetail, Coordinates, EthicalNotes, Evidence, EvidenceKind, Incident,
    IncidentType, Location, PublicIdentifiers, Verification,
};

const CASUALTY_COLUMNS: [&str; 5] = [
    "casualties_affected",
    "casualties_critical",
    "casualties_deaths",
    "casualties_injured",
    "casualties_hospitalized",
];

/// A per-row anomaly that was absorbed by a default or an omission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowWarning {
    pub table: &'static str,
    /// 1-based data row number within its table.
    pub row: usize,
    pub field: String,
    pub message: String,
}

#[derive(Debug, Default)]
pub struct Assembled {
    pub incidents: Vec<Incident>,
    pub warnings: Vec<RowWarning>,
    pub dropped_without_id: usize,
}

struct WarningSink<'a> {
    table: &'static str,
    row: usize,
    warnings: &'a mut Vec<RowWarning>,
}

impl WarningSink<'_> {
    fn push(&mut self, field: &str, message: String) {
        tracing::warn!(
            table = self.table,
            row = self.row,
            field,
            "{message}"
        );
        self.warnings.push(RowWarning {
            table: self.table,
            row: self.row,
            field: field.to_string(),
            message,
        });
    }
}

/// Joins incident rows with their casualty-detail rows, in source order.
///
/// Rows without an `id` are dropped. Nothing here fails: malformed cells fall
/// back to defaults or omissions and are reported through `warnings`.
pub fn assemble_incidents(incident_rows: &[RawRow], detail_rows: &[RawRow]) -> Assembled {
    let mut assembled = Assembled::default();

    for (index, row) in incident_rows.iter().enumerate() {
        let mut sink = WarningSink {
            table: "incidents",
            row: index + 1,
            warnings: &mut assembled.warnings,
        };

        let Some(id) = row.non_empty("id") else {
            tracing::debug!(row = index + 1, "dropping incident row without id");
            assembled.dropped_without_id += 1;
            continue;
        };

        let casualties_details = build_casualty_details(&id, row, detail_rows, &mut sink);

        assembled.incidents.push(Incident {
            title: row.string("title"),
            date: row.string("date"),
            time: row.non_empty("time"),
            location: Location {
                name: row.string("location_name"),
                coordinates: build_coordinates(row, &mut sink),
            },
            kind: IncidentType::parse(&row.string("type")),
            description: row.string("description"),
            casualties: build_casualties(row, &mut sink),
            casualties_details,
            evidence: build_evidence(row, &mut sink),
            sources: parse_delimited_field(row.get("sources")),
            verified: row
                .non_empty("verified")
                .map_or(Verification::Pending, |value| Verification::parse(&value)),
            tags: parse_delimited_field(row.get("tags")),
            id,
        });
    }

    assembled
}

fn build_coordinates(row: &RawRow, sink: &mut WarningSink<'_>) -> Option<Coordinates> {
    let lng_cell = row.get("location_coordinates_lng");
    let lat_cell = row.get("location_coordinates_lat");
    let lng = parse_coordinate(lng_cell);
    let lat = parse_coordinate(lat_cell);

    match (lng, lat) {
        (Some(lng), Some(lat)) => Some(Coordinates { lng, lat }),
        _ => {
            let supplied = [lng_cell, lat_cell]
                .into_iter()
                .flatten()
                .any(|cell| !cell.is_blank());
            if supplied {
                sink.push(
                    "location_coordinates",
                    format!(
                        "unusable coordinates lng={:?} lat={:?}",
                        row.string("location_coordinates_lng"),
                        row.string("location_coordinates_lat")
                    ),
                );
            }
            None
        }
    }
}

fn build_casualties(row: &RawRow, sink: &mut WarningSink<'_>) -> Option<Casualties> {
    let mut casualties = Casualties::default();

    for column in CASUALTY_COLUMNS {
        let Some(cell) = row.get(column).filter(|cell| !cell.is_blank()) else {
            continue;
        };

        let (count, parsed) = parse_count(cell);
        if !parsed {
            sink.push(column, format!("count {cell:?} is not a number, using 0"));
        }

        let slot = match column {
            "casualties_affected" => &mut casualties.affected,
            "casualties_critical" => &mut casualties.critical,
            "casualties_deaths" => &mut casualties.deaths,
            "casualties_injured" => &mut casualties.injured,
            _ => &mut casualties.hospitalized,
        };
        *slot = Some(count);
    }

    (!casualties.is_empty()).then_some(casualties)
}

fn build_evidence(row: &RawRow, sink: &mut WarningSink<'_>) -> Option<Vec<Evidence>> {
    let types = parse_delimited_field(row.get("evidence_types"));
    let urls = parse_delimited_field(row.get("evidence_urls"));
    let descriptions = parse_delimited_field(row.get("evidence_descriptions"));

    let evidence: Vec<Evidence> = types
        .iter()
        .enumerate()
        .filter_map(|(index, kind)| {
            let url = urls.get(index)?;
            Some(Evidence {
                kind: EvidenceKind::parse(kind),
                url: url.clone(),
                description: descriptions.get(index).cloned().unwrap_or_default(),
            })
        })
        .collect();

    if types.len() > evidence.len() {
        sink.push(
            "evidence_urls",
            format!(
                "{} evidence types but only {} urls, extra types dropped",
                types.len(),
                urls.len()
            ),
        );
    }

    (!evidence.is_empty()).then_some(evidence)
}

fn build_casualty_details(
    incident_id: &str,
    row: &RawRow,
    detail_rows: &[RawRow],
    sink: &mut WarningSink<'_>,
) -> Option<Vec<CasualtyDetail>> {
    let reference_ids = parse_delimited_field(row.get("casualties_details_ids"));

    let details: Vec<CasualtyDetail> = detail_rows
        .iter()
        .filter(|detail| {
            let reference_id = detail.string("reference_id");
            let listed = !reference_id.is_empty() && reference_ids.contains(&reference_id);
            listed || detail.string("incident_id") == incident_id
        })
        .map(build_casualty_detail)
        .collect();

    let missing: Vec<&String> = reference_ids
        .iter()
        .filter(|id| !details.iter().any(|detail| &detail.reference_id == *id))
        .collect();
    if !missing.is_empty() {
        sink.push(
            "casualties_details_ids",
            format!("no casualty detail rows for {missing:?}"),
        );
    }

    (!details.is_empty()).then_some(details)
}

fn build_casualty_detail(row: &RawRow) -> CasualtyDetail {
    CasualtyDetail {
        reference_id: row.string("reference_id"),
        name: row.string("name"),
        age: parse_age(row.get("age")),
        date: row.string("date"),
        cause: row.string("cause"),
        location_details: row.string("location_details"),
        medical_facility: row.string("medical_facility"),
        condition: row.string("condition"),
        sources: parse_delimited_field(row.get("sources")),
        public_identifiers: PublicIdentifiers {
            published_name: parse_boolean_field(row.get("published_name")),
            published_image: parse_boolean_field(row.get("published_image")),
            consent_verified: parse_boolean_field(row.get("consent_verified")),
        },
        ethical_notes: EthicalNotes {
            content_warning: row.non_empty("content_warning"),
            privacy_status: row.non_empty("privacy_status"),
            documentation_purpose: row.non_empty("documentation_purpose"),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn incident(id: &str) -> RawRow {
        RawRow::new()
            .with("id", id)
            .with("title", "Bakery queue shelled")
            .with("date", "2024-02-29")
            .with("type", "hunger")
    }

    #[test]
    fn rows_without_id_are_dropped_in_order() {
        let rows = vec![
            incident("1"),
            RawRow::new().with("title", "orphan"),
            incident("3"),
            incident("  "),
        ];

        let assembled = assemble_incidents(&rows, &[]);
        let ids: Vec<&str> = assembled.incidents.iter().map(|i| i.id.as_str()).collect();

        assert_eq!(ids, vec!["1", "3"]);
        assert_eq!(assembled.dropped_without_id, 2);
        assert_eq!(assembled.incidents.len(), rows.len() - 2);
    }

    #[test]
    fn single_casualty_field_is_kept_alone() {
        let rows = vec![incident("1").with("casualties_deaths", "5")];
        let assembled = assemble_incidents(&rows, &[]);

        let casualties = assembled.incidents[0].casualties.clone();
        assert_eq!(
            casualties,
            Some(Casualties {
                deaths: Some(5),
                ..Casualties::default()
            })
        );
    }

    #[test]
    fn optional_structures_are_absent_not_empty() {
        let assembled = assemble_incidents(&[incident("1")], &[]);
        let record = &assembled.incidents[0];

        assert!(record.casualties.is_none());
        assert!(record.casualties_details.is_none());
        assert!(record.evidence.is_none());
        assert!(record.sources.is_empty());
        assert!(record.tags.is_empty());
        assert_eq!(record.verified, Verification::Pending);
        assert!(record.location.coordinates.is_none());
    }

    #[test]
    fn bad_count_becomes_zero_with_warning() {
        let rows = vec![incident("1").with("casualties_injured", "dozens")];
        let assembled = assemble_incidents(&rows, &[]);

        assert_eq!(
            assembled.incidents[0].casualties.as_ref().and_then(|c| c.injured),
            Some(0)
        );
        assert_eq!(assembled.warnings.len(), 1);
        assert_eq!(assembled.warnings[0].field, "casualties_injured");
    }

    #[test]
    fn evidence_is_zipped_by_position() {
        let rows = vec![incident("1")
            .with("evidence_types", "image|video")
            .with("evidence_urls", "u1")];
        let assembled = assemble_incidents(&rows, &[]);

        let evidence = assembled.incidents[0].evidence.clone().unwrap_or_default();
        assert_eq!(evidence.len(), 1);
        assert_eq!(evidence[0].kind, EvidenceKind::Image);
        assert_eq!(evidence[0].url, "u1");
        assert_eq!(evidence[0].description, "");
    }

    #[test]
    fn coordinates_are_all_or_nothing() {
        let half = incident("1").with("location_coordinates_lng", "34.4");
        let full = incident("2")
            .with("location_coordinates_lng", "34.4")
            .with("location_coordinates_lat", "31.5");
        let assembled = assemble_incidents(&[half, full], &[]);

        assert!(assembled.incidents[0].location.coordinates.is_none());
        assert_eq!(
            assembled.incidents[1].location.coordinates,
            Some(Coordinates {
                lng: 34.4,
                lat: 31.5
            })
        );
    }

    #[test]
    fn details_link_by_reference_list_or_back_reference() {
        let rows = vec![incident("7").with("casualties_details_ids", "C1|C2")];
        let details = vec![
            RawRow::new().with("reference_id", "C1").with("name", "Listed"),
            RawRow::new()
                .with("reference_id", "C9")
                .with("incident_id", "7")
                .with("name", "Back-referenced")
                .with("age", "unknown"),
            RawRow::new()
                .with("reference_id", "C3")
                .with("incident_id", "8")
                .with("name", "Elsewhere"),
        ];

        let assembled = assemble_incidents(&rows, &details);
        let linked = assembled.incidents[0].details();
        let names: Vec<&str> = linked.iter().map(|d| d.name.as_str()).collect();

        assert_eq!(names, vec!["Listed", "Back-referenced"]);
        assert_eq!(linked[1].age, None);
        // C2 is listed on the incident but has no row
        assert!(assembled
            .warnings
            .iter()
            .any(|w| w.field == "casualties_details_ids"));
    }

    #[test]
    fn detail_privacy_flags_and_notes() {
        let rows = vec![incident("1").with("casualties_details_ids", "C1")];
        let details = vec![RawRow::new()
            .with("reference_id", "C1")
            .with("name", "Sami")
            .with("age", "14")
            .with("sources", "a.org, b.org")
            .with("published_name", "yes")
            .with("published_image", "FALSE")
            .with("consent_verified", "1")
            .with("privacy_status", "family-approved")];

        let assembled = assemble_incidents(&rows, &details);
        let detail = &assembled.incidents[0].details()[0];

        assert_eq!(detail.age, Some(14));
        assert_eq!(detail.sources, vec!["a.org", "b.org"]);
        assert!(detail.public_identifiers.published_name);
        assert!(!detail.public_identifiers.published_image);
        assert!(detail.public_identifiers.consent_verified);
        assert_eq!(
            detail.ethical_notes.privacy_status.as_deref(),
            Some("family-approved")
        );
        assert!(detail.ethical_notes.content_warning.is_none());
    }

    #[test]
    fn verified_flag_is_normalized() {
        let rows = vec![
            incident("1").with("verified", "verified"),
            incident("2").with("verified", "unconfirmed"),
        ];
        let assembled = assemble_incidents(&rows, &[]);

        assert_eq!(assembled.incidents[0].verified, Verification::Verified);
        assert_eq!(assembled.incidents[1].verified, Verification::Pending);
    }
}
