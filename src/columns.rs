//! Column mapping: binds arbitrary spreadsheet headers to canonical fields
//! by accent- and case-insensitive prefix matching.

use std::collections::BTreeMap;

use tracing::debug;

use crate::error::{OrgChartError, Result};
use crate::models::CanonicalField;

/// Lowercases, trims and strips diacritics ("  Função " -> "funcao").
pub fn normalize_header(header: &str) -> String {
    deunicode::deunicode(header).to_lowercase().trim().to_string()
}

/// Accepted normalized header prefixes per canonical field.
#[derive(Debug, Clone, PartialEq)]
pub struct SynonymTable(BTreeMap<CanonicalField, Vec<String>>);

impl Default for SynonymTable {
    fn default() -> Self {
        let mut table = BTreeMap::new();
        table.insert(CanonicalField::Date, vec!["data".to_string()]);
        table.insert(CanonicalField::Name, vec!["nome".to_string()]);
        table.insert(
            CanonicalField::Role,
            vec!["funcao".to_string(), "cargo".to_string()],
        );
        table.insert(
            CanonicalField::Lead,
            vec![
                "encarregado".to_string(),
                "responsavel".to_string(),
                "lider".to_string(),
            ],
        );
        table.insert(
            CanonicalField::Supervisor,
            vec![
                "supervisor".to_string(),
                "gestor".to_string(),
                "coordenador".to_string(),
            ],
        );
        Self(table)
    }
}

impl SynonymTable {
    pub fn prefixes(&self, field: CanonicalField) -> &[String] {
        self.0.get(&field).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Replaces the prefixes of one field. Prefixes are normalized the same
    /// way headers are, and blank ones are dropped.
    pub fn set_prefixes<I, S>(&mut self, field: CanonicalField, prefixes: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let normalized: Vec<String> = prefixes
            .into_iter()
            .map(|prefix| normalize_header(prefix.as_ref()))
            .filter(|prefix| !prefix.is_empty())
            .collect();
        self.0.insert(field, normalized);
    }

    fn matches(&self, field: CanonicalField, normalized_header: &str) -> bool {
        self.prefixes(field)
            .iter()
            .any(|prefix| normalized_header.starts_with(prefix.as_str()))
    }
}

/// Which header (by column index) each canonical field was bound to.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColumnMapping {
    bindings: BTreeMap<CanonicalField, usize>,
    headers: Vec<String>,
}

impl ColumnMapping {
    pub fn column(&self, field: CanonicalField) -> Option<usize> {
        self.bindings.get(&field).copied()
    }

    pub fn header(&self, field: CanonicalField) -> Option<&str> {
        self.column(field)
            .and_then(|index| self.headers.get(index))
            .map(String::as_str)
    }

    pub fn contains(&self, field: CanonicalField) -> bool {
        self.bindings.contains_key(&field)
    }

    /// Fields left unbound, in declared order.
    pub fn missing(&self) -> Vec<CanonicalField> {
        CanonicalField::ALL
            .into_iter()
            .filter(|field| !self.contains(*field))
            .collect()
    }

    /// Column indexes not bound to any canonical field, in sheet order.
    pub fn unmapped_columns(&self) -> Vec<usize> {
        (0..self.headers.len())
            .filter(|index| !self.bindings.values().any(|bound| bound == index))
            .collect()
    }

    pub fn require_complete(self) -> Result<Self> {
        let missing = self.missing();
        if missing.is_empty() {
            Ok(self)
        } else {
            Err(OrgChartError::MissingColumns { missing })
        }
    }
}

/// Binds each canonical field, in declared order, to the first header whose
/// normalized form starts with one of its prefixes. A header already bound to
/// an earlier field is not offered to later ones.
pub fn map_columns<S: AsRef<str>>(headers: &[S], synonyms: &SynonymTable) -> ColumnMapping {
    let normalized: Vec<String> = headers
        .iter()
        .map(|header| normalize_header(header.as_ref()))
        .collect();
    let mut bindings = BTreeMap::new();

    for field in CanonicalField::ALL {
        let found = normalized.iter().enumerate().find(|(index, header)| {
            !bindings.values().any(|bound| bound == index) && synonyms.matches(field, header)
        });
        if let Some((index, _)) = found {
            debug!(field = %field, header = headers[index].as_ref(), "bound column");
            bindings.insert(field, index);
        }
    }

    ColumnMapping {
        bindings,
        headers: headers.iter().map(|h| h.as_ref().to_string()).collect(),
    }
}
