//! Session state between interactions and the two application modes.
//!
//! A session starts `Empty`, becomes `Loaded` on the first successful import
//! and is replaced wholesale by every later one. The import mode is
//! [`import`] (applied through [`Session::load`]); the visualize mode is
//! [`visualize`], which only reads the session.

use chrono::NaiveDate;
use tracing::{info, warn};

use crate::config::Config;
use crate::error::{OrgChartError, Result, UnparsableDate};
use crate::graph::build_dot;
use crate::import::import_table;
use crate::models::{format_date, CanonicalRow, Dataset, RawTable};

#[derive(Debug, Clone, Default, PartialEq)]
pub enum Session {
    #[default]
    Empty,
    Loaded(Dataset),
}

impl Session {
    pub fn dataset(&self) -> Option<&Dataset> {
        match self {
            Session::Empty => None,
            Session::Loaded(dataset) => Some(dataset),
        }
    }

    /// Distinct concrete dates, newest first.
    pub fn available_dates(&self) -> Vec<NaiveDate> {
        let mut dates: Vec<NaiveDate> = self
            .dataset()
            .map(|dataset| dataset.rows.iter().filter_map(|row| row.date).collect())
            .unwrap_or_default();
        dates.sort_unstable_by(|a, b| b.cmp(a));
        dates.dedup();
        dates
    }

    /// Moves to `Loaded` with the table's rows. A failed import leaves the
    /// session as it was.
    pub fn load(&mut self, table: &RawTable, config: &Config) -> Result<ImportSummary> {
        let (next, summary) = import(table, config)?;
        *self = next;
        Ok(summary)
    }
}

#[derive(Debug, Clone)]
pub struct ImportSummary {
    pub rows: usize,
    pub unparsable_dates: Vec<UnparsableDate>,
}

/// A diagram ready for the renderer plus the rows behind it.
#[derive(Debug, Clone)]
pub struct Rendering {
    pub date: NaiveDate,
    pub dot: String,
    pub headers: Vec<String>,
    pub rows: Vec<CanonicalRow>,
}

/// Builds the next session from a table. On `MissingColumns` nothing is
/// admitted and the caller keeps its current session.
pub fn import(table: &RawTable, config: &Config) -> Result<(Session, ImportSummary)> {
    let outcome = import_table(table, &config.synonyms)?;
    let summary = ImportSummary {
        rows: outcome.dataset.rows.len(),
        unparsable_dates: outcome.unparsable_dates,
    };
    Ok((Session::Loaded(outcome.dataset), summary))
}

pub fn visualize(session: &Session, date: NaiveDate, config: &Config) -> Result<Rendering> {
    let dataset = session.dataset().ok_or(OrgChartError::NoDatasetLoaded)?;
    let rows = dataset.rows_on(date);

    if rows.is_empty() {
        let date = format_date(Some(date));
        warn!(date = %date, "no records for selected date");
        return Err(OrgChartError::EmptySelection { date });
    }

    let dot = build_dot(&rows, &config.style);
    info!(date = %format_date(Some(date)), rows = rows.len(), "diagram built");
    Ok(Rendering {
        date,
        dot,
        headers: dataset.export_headers(),
        rows,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RawCell;

    fn day(date: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, date).unwrap()
    }

    fn table(rows: &[[&str; 5]]) -> RawTable {
        RawTable {
            headers: ["Data", "Nome", "Função", "Encarregado", "Supervisor"]
                .map(String::from)
                .to_vec(),
            rows: rows
                .iter()
                .map(|row| row.iter().map(|v| RawCell::Text(v.to_string())).collect())
                .collect(),
            ..RawTable::default()
        }
    }

    fn loaded() -> Session {
        let mut session = Session::Empty;
        let rows = table(&[
            ["05/03/2024", "Ana", "Pedreiro", "X", "A"],
            ["06/03/2024", "Bea", "Servente", "Y", "A"],
            ["05/03/2024", "Caio", "Armador", "Y", "B"],
            ["ontem", "Davi", "Pintor", "Y", "B"],
        ]);
        session.load(&rows, &Config::default()).unwrap();
        session
    }

    #[test]
    fn starts_empty() {
        let session = Session::default();
        assert_eq!(session, Session::Empty);
        assert!(session.available_dates().is_empty());
    }

    #[test]
    fn visualize_before_import_warns() {
        let result = visualize(&Session::Empty, day(5), &Config::default());
        assert!(matches!(result, Err(OrgChartError::NoDatasetLoaded)));
    }

    #[test]
    fn import_loads_and_reports() {
        let mut session = Session::Empty;
        let rows = table(&[["05/03/2024", "Ana", "Pedreiro", "X", "A"], ["?", "Bea", "Servente", "X", "A"]]);

        let summary = session.load(&rows, &Config::default()).unwrap();
        assert_eq!(summary.rows, 2);
        assert_eq!(summary.unparsable_dates.len(), 1);
        assert_eq!(summary.unparsable_dates[0].row, 2);
        assert_eq!(session.dataset().map(|d| d.rows.len()), Some(2));
    }

    #[test]
    fn new_import_replaces_dataset() {
        let mut session = loaded();
        let rows = table(&[["10/03/2024", "Eva", "Eletricista", "Z", "C"]]);
        session.load(&rows, &Config::default()).unwrap();

        assert_eq!(session.available_dates(), vec![day(10)]);
    }

    #[test]
    fn failed_import_keeps_previous_dataset() {
        let mut session = loaded();
        let mut rows = table(&[["10/03/2024", "Eva", "Eletricista", "Z", "C"]]);
        rows.headers[3] = "Turno".to_string();

        let result = session.load(&rows, &Config::default());
        assert!(matches!(result, Err(OrgChartError::MissingColumns { .. })));
        assert_eq!(session, loaded());
    }

    #[test]
    fn dates_are_listed_newest_first_without_missing() {
        assert_eq!(loaded().available_dates(), vec![day(6), day(5)]);
    }

    #[test]
    fn visualize_filters_by_date() {
        let session = loaded();
        let rendering = visualize(&session, day(5), &Config::default()).unwrap();

        assert_eq!(rendering.rows.len(), 2);
        assert_eq!(rendering.dot.matches("subgraph cluster_").count(), 2);
        assert!(!rendering.dot.contains("Davi"));
        assert_eq!(rendering.headers[0], "data");
    }

    #[test]
    fn import_builds_next_session_without_touching_current() {
        let rows = table(&[["10/03/2024", "Eva", "Eletricista", "Z", "C"]]);
        let (next, summary) = import(&rows, &Config::default()).unwrap();

        assert_eq!(summary.rows, 1);
        assert_eq!(next.available_dates(), vec![day(10)]);
    }

    #[test]
    fn empty_selection_is_reported() {
        let result = visualize(&loaded(), day(20), &Config::default());
        match result {
            Err(OrgChartError::EmptySelection { date }) => assert_eq!(date, "20/03/2024"),
            other => panic!("expected EmptySelection, got {other:?}"),
        }
    }
}
