use crate::domain::{CasualtyDetail, Evidence, EvidenceKind, Incident};

/// Best-effort lookup of the image depicting a casualty detail.
///
/// Tries description text first, then the file name, then falls back to the
/// image at the same position as the detail. Two details may resolve to the
/// same image.
pub fn find_photo(incident: &Incident, detail_index: usize) -> Option<&Evidence> {
    let detail = incident.details().get(detail_index)?;
    if !detail.public_identifiers.published_image {
        return None;
    }

    let images: Vec<&Evidence> = incident
        .evidence_items()
        .iter()
        .filter(|item| item.kind == EvidenceKind::Image)
        .collect();
    if images.is_empty() {
        return None;
    }

    images
        .iter()
        .find(|image| matches_description(image, detail))
        .or_else(|| images.iter().find(|image| matches_file_name(image, detail)))
        .or_else(|| images.get(detail_index))
        .copied()
}

fn matches_description(image: &Evidence, detail: &CasualtyDetail) -> bool {
    let description = image.description.trim().to_lowercase();
    let name = detail.name.trim().to_lowercase();
    // an empty side would match everything
    if description.is_empty() || name.is_empty() {
        return false;
    }
    description.contains(&name) || name.contains(&description)
}

fn matches_file_name(image: &Evidence, detail: &CasualtyDetail) -> bool {
    let url = image.url.to_lowercase();
    let token = file_name_token(&detail.name);
    let squashed: String = detail
        .name
        .to_lowercase()
        .chars()
        .filter(|c| *c != ' ')
        .collect();

    (!token.is_empty() && url.contains(&token)) || (!squashed.is_empty() && url.contains(&squashed))
}

/// Lower-case, spaces to underscores, anything outside `[a-z0-9_]` removed.
pub fn file_name_token(name: &str) -> String {
    name.trim()
        .to_lowercase()
        .replace(' ', "_")
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '_')
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{EthicalNotes, IncidentType, Location, PublicIdentifiers, Verification};

    fn detail(name: &str, published_image: bool) -> CasualtyDetail {
        CasualtyDetail {
            reference_id: String::new(),
            name: name.to_string(),
            age: None,
            date: String::new(),
            cause: String::new(),
            location_details: String::new(),
            medical_facility: String::new(),
            condition: String::new(),
            sources: Vec::new(),
            public_identifiers: PublicIdentifiers {
                published_name: true,
                published_image,
                consent_verified: true,
            },
            ethical_notes: EthicalNotes::default(),
        }
    }

    fn image(url: &str, description: &str) -> Evidence {
        Evidence {
            kind: EvidenceKind::Image,
            url: url.to_string(),
            description: description.to_string(),
        }
    }

    fn incident(details: Vec<CasualtyDetail>, evidence: Vec<Evidence>) -> Incident {
        Incident {
            id: "1".to_string(),
            title: String::new(),
            date: String::new(),
            time: None,
            location: Location {
                name: String::new(),
                coordinates: None,
            },
            kind: IncidentType::Casualties,
            description: String::new(),
            casualties: None,
            casualties_details: Some(details),
            evidence: Some(evidence),
            sources: Vec::new(),
            verified: Verification::Pending,
            tags: Vec::new(),
        }
    }

    #[test]
    fn description_match_wins() {
        let record = incident(
            vec![detail("Lina Haddad", true)],
            vec![
                image("photos/a.jpg", "Street after the strike"),
                image("photos/b.jpg", "Portrait of Lina Haddad"),
            ],
        );
        assert_eq!(find_photo(&record, 0).map(|e| e.url.as_str()), Some("photos/b.jpg"));
    }

    #[test]
    fn file_name_match_is_used_next() {
        let record = incident(
            vec![detail("Omar Nasser", true)],
            vec![
                image("photos/street.jpg", "Street"),
                image("photos/omar_nasser.jpg", "Portrait"),
            ],
        );
        assert_eq!(
            find_photo(&record, 0).map(|e| e.url.as_str()),
            Some("photos/omar_nasser.jpg")
        );

        let squashed = incident(
            vec![detail("Omar Nasser", true)],
            vec![image("x.jpg", "Street"), image("img/OmarNasser.png", "Portrait")],
        );
        assert_eq!(
            find_photo(&squashed, 0).map(|e| e.url.as_str()),
            Some("img/OmarNasser.png")
        );
    }

    #[test]
    fn positional_fallback_counts_images_only() {
        let mut evidence = vec![image("first.jpg", "One"), image("second.jpg", "Two")];
        evidence.insert(
            1,
            Evidence {
                kind: EvidenceKind::Video,
                url: "clip.mp4".to_string(),
                description: String::new(),
            },
        );
        let record = incident(vec![detail("A", true), detail("B", true)], evidence);

        assert_eq!(find_photo(&record, 1).map(|e| e.url.as_str()), Some("second.jpg"));
    }

    #[test]
    fn unpublished_images_are_never_matched() {
        let record = incident(
            vec![detail("Lina", false)],
            vec![image("lina.jpg", "Lina")],
        );
        assert!(find_photo(&record, 0).is_none());
    }

    #[test]
    fn no_candidate_means_placeholder() {
        let record = incident(
            vec![detail("A", true), detail("B", true)],
            vec![image("only.jpg", "Something")],
        );
        assert!(find_photo(&record, 1).is_none());
    }

    #[test]
    fn file_name_token_strips_punctuation() {
        assert_eq!(file_name_token("Abu Al-Khair"), "abu_alkhair");
    }
}
