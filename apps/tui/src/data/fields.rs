use crate::data::rows::Cell;

/// Splits a delimited cell into trimmed, non-empty pieces.
///
/// `|` wins over `,` when both appear; a value with neither becomes a single
/// element. Non-text and blank cells give an empty list.
pub fn parse_delimited_field(value: Option<&Cell>) -> Vec<String> {
    let Some(text) = value.and_then(Cell::as_text) else {
        return Vec::new();
    };
    split_delimited(text)
}

pub fn split_delimited(text: &str) -> Vec<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Vec::new();
    }

    let delimiter = if trimmed.contains('|') {
        '|'
    } else if trimmed.contains(',') {
        ','
    } else {
        return vec![trimmed.to_string()];
    };

    trimmed
        .split(delimiter)
        .map(str::trim)
        .filter(|piece| !piece.is_empty())
        .map(str::to_string)
        .collect()
}

/// `true` for a boolean `true` or the strings "true", "1", "yes" (any case).
pub fn parse_boolean_field(value: Option<&Cell>) -> bool {
    match value {
        Some(Cell::Bool(flag)) => *flag,
        Some(Cell::Text(text)) => matches!(
            text.trim().to_lowercase().as_str(),
            "true" | "1" | "yes"
        ),
        Some(Cell::Number(_)) | None => false,
    }
}

/// Leading-digit integer parse: "12 people" is 12, "-3" and "n/a" are not numbers.
pub fn parse_integer(value: &Cell) -> Option<u32> {
    match value {
        Cell::Number(number) if number.is_finite() && *number >= 0.0 => {
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            Some(number.trunc().min(f64::from(u32::MAX)) as u32)
        }
        Cell::Number(_) | Cell::Bool(_) => None,
        Cell::Text(text) => {
            let text = text.trim();
            let text = text.strip_prefix('+').unwrap_or(text);
            let digits: String = text.chars().take_while(char::is_ascii_digit).collect();
            if digits.is_empty() {
                return None;
            }
            Some(digits.parse::<u32>().unwrap_or(u32::MAX))
        }
    }
}

/// Casualty counts fall back to 0 when the cell is present but unparseable.
pub fn parse_count(value: &Cell) -> (u32, bool) {
    parse_integer(value).map_or((0, false), |count| (count, true))
}

/// Ages are `None` when missing or unparseable, so 0 always means a real age of 0.
pub fn parse_age(value: Option<&Cell>) -> Option<u32> {
    value
        .filter(|cell| !cell.is_blank())
        .and_then(parse_integer)
}

pub fn parse_coordinate(value: Option<&Cell>) -> Option<f64> {
    match value? {
        Cell::Number(number) if number.is_finite() => Some(*number),
        Cell::Text(text) => text.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
        Cell::Number(_) | Cell::Bool(_) => None,
    }
}
