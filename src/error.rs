use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::models::CanonicalField;

#[derive(Debug, Error)]
pub enum OrgChartError {
    #[error("spreadsheet is missing columns for: {}", join_fields(.missing))]
    MissingColumns { missing: Vec<CanonicalField> },

    #[error("no records for {date}")]
    EmptySelection { date: String },

    #[error("no spreadsheet has been imported yet")]
    NoDatasetLoaded,

    #[error("'{value}' is not a date in dd/mm/yyyy form")]
    InvalidDate { value: String },

    #[error("unsupported spreadsheet format '{extension}'")]
    UnsupportedFormat { extension: String },

    #[error("failed to read {path}: {message}")]
    Read { path: PathBuf, message: String },

    #[error("failed to export {path}: {message}")]
    Export { path: PathBuf, message: String },

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, OrgChartError>;

/// A date cell that could not be parsed; the row is kept with a missing date.
#[derive(Debug, Clone, PartialEq)]
pub struct UnparsableDate {
    /// 1-based data row number, not counting the header.
    pub row: usize,
    pub value: String,
}

fn join_fields(fields: &[CanonicalField]) -> String {
    fields
        .iter()
        .map(|field| field.column_name())
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_columns_lists_every_field() {
        let err = OrgChartError::MissingColumns {
            missing: vec![CanonicalField::Role, CanonicalField::Supervisor],
        };
        assert_eq!(
            err.to_string(),
            "spreadsheet is missing columns for: funcao, supervisor"
        );
    }
}
