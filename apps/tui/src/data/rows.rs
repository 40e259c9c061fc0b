use std::collections::HashMap;
use std::fmt;

use csv::ReaderBuilder;

/// A single typed cell from a source table.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Text(String),
    Number(f64),
    Bool(bool),
}

impl Cell {
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    /// Only text cells carry delimited lists or free-form strings.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(value) => Some(value),
            Self::Number(_) | Self::Bool(_) => None,
        }
    }

    pub fn is_blank(&self) -> bool {
        match self {
            Self::Text(value) => value.trim().is_empty(),
            Self::Number(value) => !value.is_finite(),
            Self::Bool(_) => false,
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(value) => write!(f, "{value}"),
            Self::Number(value) if value.fract() == 0.0 && value.is_finite() => {
                write!(f, "{value:.0}")
            }
            Self::Number(value) => write!(f, "{value}"),
            Self::Bool(value) => write!(f, "{value}"),
        }
    }
}

/// One source row keyed by normalized column name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawRow {
    cells: HashMap<String, Cell>,
}

impl RawRow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, column: &str, cell: Cell) {
        self.cells.insert(normalize_column(column), cell);
    }

    #[must_use]
    pub fn with(mut self, column: &str, value: &str) -> Self {
        self.insert(column, Cell::text(value));
        self
    }

    pub fn get(&self, column: &str) -> Option<&Cell> {
        self.cells.get(column)
    }

    /// Trimmed string form of a cell; empty when the column is missing.
    pub fn string(&self, column: &str) -> String {
        self.get(column)
            .map(|cell| cell.to_string().trim().to_string())
            .unwrap_or_default()
    }

    /// Like [`RawRow::string`] but `None` for missing or blank cells.
    pub fn non_empty(&self, column: &str) -> Option<String> {
        let value = self.string(column);
        (!value.is_empty()).then_some(value)
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

/// Column names are trimmed, lower-cased and have spaces replaced by underscores.
pub fn normalize_column(name: &str) -> String {
    name.trim().to_lowercase().replace(' ', "_")
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseWarning {
    /// 1-based data row number (header excluded).
    pub row: usize,
    pub message: String,
}

#[derive(Debug, Default)]
pub struct ParsedTable {
    pub rows: Vec<RawRow>,
    pub warnings: Vec<ParseWarning>,
}

/// Parses CSV text with a header row into normalized rows.
///
/// Records that cannot be decoded are skipped with a warning, rows whose cells
/// are all blank are dropped silently, and short rows simply lack the trailing
/// columns.
pub fn parse_table(text: &str) -> Result<ParsedTable, csv::Error> {
    let mut reader = ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::None)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = reader.headers()?.iter().map(normalize_column).collect();

    let mut table = ParsedTable::default();
    for (index, record) in reader.records().enumerate() {
        let row_number = index + 1;
        let record = match record {
            Ok(record) => record,
            Err(e) => {
                tracing::warn!(row = row_number, error = %e, "skipping malformed CSV record");
                table.warnings.push(ParseWarning {
                    row: row_number,
                    message: e.to_string(),
                });
                continue;
            }
        };

        if record.iter().all(|value| value.trim().is_empty()) {
            continue;
        }

        if record.len() > headers.len() {
            table.warnings.push(ParseWarning {
                row: row_number,
                message: format!(
                    "{} fields for {} columns, extra fields ignored",
                    record.len(),
                    headers.len()
                ),
            });
        }

        let mut row = RawRow::new();
        for (column, value) in headers.iter().zip(record.iter()) {
            if column.is_empty() {
                continue;
            }
            row.cells.insert(column.clone(), Cell::text(value));
        }
        table.rows.push(row);
    }

    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn headers_are_normalized() {
        let table = parse_table(" Location Name ,ID\nGaza City,7\n").unwrap();
        assert_eq!(table.rows.len(), 1);
        assert_eq!(table.rows[0].string("location_name"), "Gaza City");
        assert_eq!(table.rows[0].string("id"), "7");
    }

    #[test]
    fn quoted_fields_keep_embedded_delimiters() {
        let text = "id,sources\n1,\"a.org, b.org\"\n";
        let table = parse_table(text).unwrap();
        assert_eq!(table.rows[0].string("sources"), "a.org, b.org");
    }

    #[test]
    fn blank_lines_and_short_rows_are_tolerated() {
        let text = "id,title,date\n1,First\n,,\n2,Second,2024-01-02\n";
        let table = parse_table(text).unwrap();

        assert_eq!(table.rows.len(), 2);
        assert!(table.rows[0].get("date").is_none());
        assert_eq!(table.rows[1].string("date"), "2024-01-02");
    }

    #[test]
    fn overlong_rows_produce_a_warning() {
        let table = parse_table("id,title\n1,a,b\n").unwrap();
        assert_eq!(table.rows.len(), 1);
        assert_eq!(table.warnings.len(), 1);
        assert_eq!(table.warnings[0].row, 1);
    }

    #[test]
    fn whole_numbers_display_without_fraction() {
        assert_eq!(Cell::Number(5.0).to_string(), "5");
        assert_eq!(Cell::Number(31.5).to_string(), "31.5");
    }
}
