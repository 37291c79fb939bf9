use tracing::{info, warn};

use crate::columns::{map_columns, SynonymTable};
use crate::error::{Result, UnparsableDate};
use crate::ingest::parse_date;
use crate::models::{CanonicalField, CanonicalRow, Dataset, RawTable};

#[derive(Debug, Clone)]
pub struct ImportOutcome {
    pub dataset: Dataset,
    pub unparsable_dates: Vec<UnparsableDate>,
}

/// Maps the table's headers, rejects it when a canonical field is missing,
/// and converts every row. Rows whose date cannot be parsed are kept with a
/// missing date and reported.
pub fn import_table(table: &RawTable, synonyms: &SynonymTable) -> Result<ImportOutcome> {
    let mapping = map_columns(&table.headers, synonyms).require_complete()?;
    let extra_columns = mapping.unmapped_columns();
    let column = |field: CanonicalField| mapping.column(field).unwrap_or_default();

    let mut rows = Vec::with_capacity(table.rows.len());
    let mut unparsable_dates = Vec::new();

    for index in 0..table.rows.len() {
        let text = |field: CanonicalField| table.cell(index, column(field)).as_text();
        let date_cell = table.cell(index, column(CanonicalField::Date));
        let date = parse_date(date_cell);

        if date.is_none() {
            let value = date_cell.as_text();
            let row = table.row_number(index);
            warn!(row, value = %value, "unparsable date, row kept without date");
            unparsable_dates.push(UnparsableDate { row, value });
        }

        rows.push(CanonicalRow {
            date,
            name: text(CanonicalField::Name),
            role: text(CanonicalField::Role),
            lead: text(CanonicalField::Lead),
            supervisor: text(CanonicalField::Supervisor),
            extras: extra_columns
                .iter()
                .map(|extra| table.cell(index, *extra).as_text())
                .collect(),
        });
    }

    info!(
        rows = rows.len(),
        without_date = unparsable_dates.len(),
        "spreadsheet imported"
    );

    Ok(ImportOutcome {
        dataset: Dataset {
            extra_headers: extra_columns
                .iter()
                .map(|extra| table.headers[*extra].clone())
                .collect(),
            rows,
        },
        unparsable_dates,
    })
}
