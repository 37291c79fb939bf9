use std::fmt;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Display and export format of an assignment date.
pub const DATE_FORMAT: &str = "%d/%m/%Y";

/// The five attributes every imported row is normalized to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CanonicalField {
    Date,
    Name,
    Role,
    Lead,
    Supervisor,
}

impl CanonicalField {
    /// Declared order; the column mapper binds fields in this order.
    pub const ALL: [CanonicalField; 5] = [
        CanonicalField::Date,
        CanonicalField::Name,
        CanonicalField::Role,
        CanonicalField::Lead,
        CanonicalField::Supervisor,
    ];

    /// Column name used after import and on export. Each one is also an
    /// accepted synonym prefix of its own field.
    pub fn column_name(self) -> &'static str {
        match self {
            CanonicalField::Date => "data",
            CanonicalField::Name => "nome",
            CanonicalField::Role => "funcao",
            CanonicalField::Lead => "encarregado",
            CanonicalField::Supervisor => "supervisor",
        }
    }
}

impl fmt::Display for CanonicalField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.column_name())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RawCell {
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
    DateTime(NaiveDateTime),
}

impl RawCell {
    /// Text form used for names, roles and pass-through columns.
    pub fn as_text(&self) -> String {
        match self {
            RawCell::Empty => String::new(),
            RawCell::Text(value) => value.trim().to_string(),
            RawCell::Number(value) if value.fract() == 0.0 && value.abs() < 1e15 => {
                format!("{}", *value as i64)
            }
            RawCell::Number(value) => value.to_string(),
            RawCell::Bool(value) => value.to_string(),
            RawCell::DateTime(value) => {
                if value.time() == chrono::NaiveTime::MIN {
                    value.date().format(DATE_FORMAT).to_string()
                } else {
                    value.format("%d/%m/%Y %H:%M:%S").to_string()
                }
            }
        }
    }
}

/// A sheet as read from disk: untrusted headers plus rows of cells.
#[derive(Debug, Clone, Default)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<RawCell>>,
    /// Position of each row below the header in the source file (1-based),
    /// counting the blank rows the reader skipped. Rows without an entry
    /// number sequentially.
    pub row_numbers: Vec<usize>,
}

impl RawTable {
    pub fn row_number(&self, row: usize) -> usize {
        self.row_numbers.get(row).copied().unwrap_or(row + 1)
    }

    /// Cell at `column` of `row`; short rows read as empty.
    pub fn cell(&self, row: usize, column: usize) -> &RawCell {
        self.rows
            .get(row)
            .and_then(|cells| cells.get(column))
            .unwrap_or(&RawCell::Empty)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CanonicalRow {
    /// `None` when the source cell was not a recognizable date.
    pub date: Option<NaiveDate>,
    pub name: String,
    pub role: String,
    pub lead: String,
    pub supervisor: String,
    /// Values of the unmapped columns, aligned with `Dataset::extra_headers`.
    pub extras: Vec<String>,
}

impl CanonicalRow {
    pub fn date_label(&self) -> String {
        format_date(self.date)
    }

    pub fn value(&self, field: CanonicalField) -> String {
        match field {
            CanonicalField::Date => self.date_label(),
            CanonicalField::Name => self.name.clone(),
            CanonicalField::Role => self.role.clone(),
            CanonicalField::Lead => self.lead.clone(),
            CanonicalField::Supervisor => self.supervisor.clone(),
        }
    }
}

/// The imported team table held by a loaded session.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    pub extra_headers: Vec<String>,
    pub rows: Vec<CanonicalRow>,
}

impl Dataset {
    pub fn rows_on(&self, date: NaiveDate) -> Vec<CanonicalRow> {
        self.rows
            .iter()
            .filter(|row| row.date == Some(date))
            .cloned()
            .collect()
    }

    /// Header row for export: canonical names first, then pass-through columns.
    pub fn export_headers(&self) -> Vec<String> {
        CanonicalField::ALL
            .iter()
            .map(|field| field.column_name().to_string())
            .chain(self.extra_headers.iter().cloned())
            .collect()
    }
}

pub fn format_date(date: Option<NaiveDate>) -> String {
    date.map(|d| d.format(DATE_FORMAT).to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_row(date: Option<NaiveDate>) -> CanonicalRow {
        CanonicalRow {
            date,
            name: "Ana".to_string(),
            role: "Pedreiro".to_string(),
            lead: "X".to_string(),
            supervisor: "A".to_string(),
            extras: Vec::new(),
        }
    }

    #[test]
    fn canonical_names_follow_declared_order() {
        let names: Vec<&str> = CanonicalField::ALL.iter().map(|f| f.column_name()).collect();
        assert_eq!(names, ["data", "nome", "funcao", "encarregado", "supervisor"]);
    }

    #[test]
    fn missing_date_renders_empty_label() {
        assert_eq!(sample_row(None).date_label(), "");
        let day = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();
        assert_eq!(sample_row(Some(day)).date_label(), "05/03/2024");
    }

    #[test]
    fn rows_on_skips_missing_dates() {
        let day = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();
        let dataset = Dataset {
            extra_headers: Vec::new(),
            rows: vec![sample_row(Some(day)), sample_row(None)],
        };
        assert_eq!(dataset.rows_on(day).len(), 1);
    }

    #[test]
    fn row_numbers_fall_back_to_position() {
        let table = RawTable {
            row_numbers: vec![1, 3],
            ..RawTable::default()
        };
        assert_eq!(table.row_number(1), 3);
        assert_eq!(RawTable::default().row_number(4), 5);
    }

    #[test]
    fn whole_numbers_render_without_fraction() {
        assert_eq!(RawCell::Number(42.0).as_text(), "42");
        assert_eq!(RawCell::Number(1.5).as_text(), "1.5");
        assert_eq!(RawCell::Text("  Bea ".into()).as_text(), "Bea");
    }
}
