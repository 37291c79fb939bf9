//! Optional JSON configuration: synonym overrides, diagram style and the
//! default export format. Every key may be omitted.

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;
use tracing::debug;

use crate::columns::SynonymTable;
use crate::error::{OrgChartError, Result};
use crate::export::ExportFormat;
use crate::graph::GraphStyle;
use crate::models::CanonicalField;

/// Values Graphviz accepts for `rankdir`.
const RANK_DIRECTIONS: [&str; 4] = ["TB", "LR", "BT", "RL"];

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Config {
    pub synonyms: SynonymTable,
    pub style: GraphStyle,
    pub export_format: ExportFormat,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ConfigFile {
    synonyms: BTreeMap<CanonicalField, Vec<String>>,
    style: GraphStyle,
    export_format: ExportFormat,
}

impl Config {
    /// Built-in defaults when `path` is `None`, otherwise the file merged
    /// over them.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            None => Ok(Self::default()),
            Some(path) => {
                let content = std::fs::read_to_string(path)?;
                let config = Self::from_json(&content)?;
                debug!(path = %path.display(), "loaded configuration");
                Ok(config)
            }
        }
    }

    pub fn from_json(content: &str) -> Result<Self> {
        let file: ConfigFile =
            serde_json::from_str(content).map_err(|e| OrgChartError::Config(e.to_string()))?;

        let mut synonyms = SynonymTable::default();
        for (field, prefixes) in file.synonyms {
            synonyms.set_prefixes(field, prefixes);
            if synonyms.prefixes(field).is_empty() {
                return Err(OrgChartError::Config(format!(
                    "no usable synonyms configured for '{field}'"
                )));
            }
        }

        if !RANK_DIRECTIONS.contains(&file.style.rank_dir.as_str()) {
            return Err(OrgChartError::Config(format!(
                "rank_dir must be one of {}, got '{}'",
                RANK_DIRECTIONS.join(", "),
                file.style.rank_dir
            )));
        }

        Ok(Self {
            synonyms,
            style: file.style,
            export_format: file.export_format,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_keeps_defaults() {
        assert_eq!(Config::from_json("{}").unwrap(), Config::default());
        assert_eq!(Config::load(None).unwrap(), Config::default());
    }

    #[test]
    fn overrides_merge_over_defaults() {
        let config = Config::from_json(
            r##"{
                "synonyms": { "lead": ["Chefe", "Líder"] },
                "style": { "lead_color": "#FFFFFF", "scoped_node_ids": true },
                "export_format": "csv"
            }"##,
        )
        .unwrap();

        assert_eq!(config.synonyms.prefixes(CanonicalField::Lead), ["chefe", "lider"]);
        assert_eq!(config.synonyms.prefixes(CanonicalField::Role), ["funcao", "cargo"]);
        assert_eq!(config.style.lead_color, "#FFFFFF");
        assert_eq!(config.style.person_color, "#A9D0F5");
        assert!(config.style.scoped_node_ids);
        assert_eq!(config.export_format, ExportFormat::Csv);
    }

    #[test]
    fn blank_synonym_list_is_rejected() {
        let result = Config::from_json(r#"{ "synonyms": { "name": ["  "] } }"#);
        assert!(matches!(result, Err(OrgChartError::Config(_))));
    }

    #[test]
    fn unknown_rank_direction_is_rejected() {
        let result = Config::from_json(r#"{ "style": { "rank_dir": "LR; node" } }"#);
        assert!(matches!(result, Err(OrgChartError::Config(message)) if message.contains("rank_dir")));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let result = Config::from_json(r#"{ "colour": "red" }"#);
        assert!(matches!(result, Err(OrgChartError::Config(_))));
    }

    #[test]
    fn load_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("orgchart.json");
        std::fs::write(&path, r#"{ "style": { "rank_dir": "TB" } }"#).unwrap();

        let config = Config::load(Some(path.as_path())).unwrap();
        assert_eq!(config.style.rank_dir, "TB");
    }
}
