//! Graphviz DOT generation for one day's team hierarchy:
//! supervisor clusters, lead boxes, and person boxes labelled with their role.

use std::collections::HashSet;
use std::fmt::Write;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::models::CanonicalRow;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphStyle {
    pub graph_name: String,
    pub rank_dir: String,
    pub font_name: String,
    pub supervisor_color: String,
    pub lead_color: String,
    pub person_color: String,
    /// Key lead and person nodes by their branch (`supervisor/lead/name`)
    /// instead of by the bare name.
    pub scoped_node_ids: bool,
}

impl Default for GraphStyle {
    fn default() -> Self {
        Self {
            graph_name: "Organograma".to_string(),
            rank_dir: "LR".to_string(),
            font_name: "Helvetica".to_string(),
            supervisor_color: "#F5A9A9".to_string(),
            lead_color: "#F3F781".to_string(),
            person_color: "#A9D0F5".to_string(),
            scoped_node_ids: false,
        }
    }
}

impl GraphStyle {
    fn lead_id(&self, supervisor: &str, lead: &str) -> String {
        if self.scoped_node_ids {
            format!("{supervisor}/{lead}")
        } else {
            lead.to_string()
        }
    }

    fn person_id(&self, supervisor: &str, lead: &str, name: &str) -> String {
        if self.scoped_node_ids {
            format!("{supervisor}/{lead}/{name}")
        } else {
            name.to_string()
        }
    }
}

/// Escapes a value for use inside a double-quoted DOT string.
pub fn escape(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Distinct values in order of first appearance.
fn distinct<'a, I>(values: I) -> Vec<&'a str>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut seen = HashSet::new();
    values
        .into_iter()
        .filter(|value| seen.insert(*value))
        .collect()
}

/// Builds the DOT description for rows that all share one date. An empty
/// slice yields only the graph header and footer.
pub fn build_dot(rows: &[CanonicalRow], style: &GraphStyle) -> String {
    let mut output = String::new();

    let _ = writeln!(output, "digraph \"{}\" {{", escape(&style.graph_name));
    let _ = writeln!(output, "  rankdir=\"{}\";", escape(&style.rank_dir));
    let _ = writeln!(output, "  compound=true;");
    let _ = writeln!(
        output,
        "  node [fontname=\"{}\", style=filled];",
        escape(&style.font_name)
    );
    let _ = writeln!(output);

    let supervisors = distinct(rows.iter().map(|row| row.supervisor.as_str()));
    for (index, supervisor) in supervisors.iter().enumerate() {
        let under_supervisor: Vec<&CanonicalRow> = rows
            .iter()
            .filter(|row| row.supervisor == *supervisor)
            .collect();
        let leads = distinct(under_supervisor.iter().map(|row| row.lead.as_str()));
        debug!(cluster = index, supervisor, leads = leads.len(), "writing cluster");

        let sup = escape(supervisor);
        let _ = writeln!(output, "  subgraph cluster_{index} {{");
        let _ = writeln!(output, "    label=\"{sup}\";");
        let _ = writeln!(
            output,
            "    \"{sup}\" [shape=oval, fillcolor=\"{}\"];",
            escape(&style.supervisor_color)
        );

        for lead in leads {
            let lead_id = escape(&style.lead_id(supervisor, lead));
            let lead_label = if style.scoped_node_ids {
                format!(", label=\"{}\"", escape(lead))
            } else {
                String::new()
            };
            let _ = writeln!(
                output,
                "    \"{lead_id}\" [shape=box, fillcolor=\"{}\"{lead_label}];",
                escape(&style.lead_color)
            );
            let _ = writeln!(output, "    \"{sup}\" -> \"{lead_id}\";");

            for row in under_supervisor.iter().filter(|row| row.lead == lead) {
                let person_id = escape(&style.person_id(supervisor, lead, &row.name));
                let _ = writeln!(
                    output,
                    "    \"{person_id}\" [shape=box, fillcolor=\"{}\", label=\"{}\\n{}\"];",
                    escape(&style.person_color),
                    escape(&row.name),
                    escape(&row.role)
                );
                let _ = writeln!(output, "    \"{lead_id}\" -> \"{person_id}\";");
            }
        }

        let _ = writeln!(output, "  }}");
        let _ = writeln!(output);
    }

    let _ = writeln!(output, "}}");
    output
}
