use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use rust_xlsxwriter::{Format, Workbook};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{OrgChartError, Result};
use crate::models::{format_date, CanonicalField, CanonicalRow};

pub const SHEET_NAME: &str = "Equipe";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Xlsx,
    Csv,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Xlsx => "xlsx",
            ExportFormat::Csv => "csv",
        }
    }
}

/// `equipe_05-03-2024.xlsx` for 05/03/2024.
pub fn export_file_name(date: NaiveDate, format: ExportFormat) -> String {
    format!(
        "equipe_{}.{}",
        format_date(Some(date)).replace('/', "-"),
        format.extension()
    )
}

fn table_rows(rows: &[CanonicalRow]) -> impl Iterator<Item = Vec<String>> + '_ {
    rows.iter().map(|row| {
        CanonicalField::ALL
            .iter()
            .map(|field| row.value(*field))
            .chain(row.extras.iter().cloned())
            .collect()
    })
}

/// Writes the header and rows to `<dir>/equipe_<date>.<ext>` and returns the path.
pub fn export_rows(
    dir: &Path,
    date: NaiveDate,
    headers: &[String],
    rows: &[CanonicalRow],
    format: ExportFormat,
) -> Result<PathBuf> {
    let path = dir.join(export_file_name(date, format));
    match format {
        ExportFormat::Xlsx => write_xlsx(&path, headers, rows)?,
        ExportFormat::Csv => write_csv(&path, headers, rows)?,
    }
    info!(path = %path.display(), rows = rows.len(), "exported selection");
    Ok(path)
}

fn write_xlsx(path: &Path, headers: &[String], rows: &[CanonicalRow]) -> Result<()> {
    let export_error = |e: rust_xlsxwriter::XlsxError| OrgChartError::Export {
        path: path.to_path_buf(),
        message: e.to_string(),
    };

    let mut workbook = Workbook::new();
    let header_format = Format::new().set_bold();
    let sheet = workbook.add_worksheet();
    sheet.set_name(SHEET_NAME).map_err(export_error)?;

    for (col, header) in headers.iter().enumerate() {
        sheet
            .write_string_with_format(0, col as u16, header.as_str(), &header_format)
            .map_err(export_error)?;
    }
    for (index, values) in table_rows(rows).enumerate() {
        for (col, value) in values.iter().enumerate() {
            sheet
                .write_string(index as u32 + 1, col as u16, value.as_str())
                .map_err(export_error)?;
        }
    }

    workbook.save(path).map_err(export_error)
}

fn write_csv(path: &Path, headers: &[String], rows: &[CanonicalRow]) -> Result<()> {
    let export_error = |e: csv::Error| OrgChartError::Export {
        path: path.to_path_buf(),
        message: e.to_string(),
    };

    let mut writer = csv::Writer::from_path(path).map_err(export_error)?;
    writer.write_record(headers).map_err(export_error)?;
    for values in table_rows(rows) {
        writer.write_record(&values).map_err(export_error)?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::columns::{map_columns, SynonymTable};
    use crate::import::import_table;
    use crate::ingest::read_table;
    use crate::models::Dataset;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 5).unwrap()
    }

    fn sample_dataset() -> Dataset {
        Dataset {
            extra_headers: vec!["Obra".to_string()],
            rows: vec![
                CanonicalRow {
                    date: Some(day()),
                    name: "Ana".to_string(),
                    role: "Pedreiro".to_string(),
                    lead: "X".to_string(),
                    supervisor: "A".to_string(),
                    extras: vec!["Torre 1".to_string()],
                },
                CanonicalRow {
                    date: Some(day()),
                    name: "Bea".to_string(),
                    role: "Servente".to_string(),
                    lead: "Y".to_string(),
                    supervisor: "A".to_string(),
                    extras: vec!["Torre 2".to_string()],
                },
            ],
        }
    }

    #[test]
    fn file_name_replaces_slashes() {
        assert_eq!(export_file_name(day(), ExportFormat::Xlsx), "equipe_05-03-2024.xlsx");
        assert_eq!(export_file_name(day(), ExportFormat::Csv), "equipe_05-03-2024.csv");
    }

    #[test]
    fn exported_workbook_reimports_with_all_fields() {
        let dir = tempfile::tempdir().unwrap();
        let dataset = sample_dataset();
        let path = export_rows(
            dir.path(),
            day(),
            &dataset.export_headers(),
            &dataset.rows,
            ExportFormat::Xlsx,
        )
        .unwrap();

        let table = read_table(&path).unwrap();
        assert_eq!(table.headers, ["data", "nome", "funcao", "encarregado", "supervisor", "Obra"]);
        assert!(map_columns(&table.headers, &SynonymTable::default())
            .missing()
            .is_empty());

        let outcome = import_table(&table, &SynonymTable::default()).unwrap();
        assert_eq!(outcome.dataset, dataset);
    }

    #[test]
    fn exported_csv_reimports_with_all_fields() {
        let dir = tempfile::tempdir().unwrap();
        let dataset = sample_dataset();
        let path = export_rows(
            dir.path(),
            day(),
            &dataset.export_headers(),
            &dataset.rows,
            ExportFormat::Csv,
        )
        .unwrap();

        let table = read_table(&path).unwrap();
        let outcome = import_table(&table, &SynonymTable::default()).unwrap();
        assert_eq!(outcome.dataset, dataset);
        assert!(outcome.unparsable_dates.is_empty());
    }
}
