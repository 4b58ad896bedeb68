//! Export encoding: aggregated records keyed by position (`W01`, `R01`, …)
//! with the Chinese field labels the downloaded document uses.

use chrono::NaiveDate;
use serde::Serialize;
use serde::ser::{SerializeMap, Serializer};

use super::{DefinitionRecord, RawRecord, RelationRecord};
use crate::engine::Mode;

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct DefinitionExport {
    #[serde(rename = "术语名称")]
    pub term: String,
    #[serde(rename = "术语定义")]
    pub definition: String,
    #[serde(rename = "文档出处")]
    pub documents: String,
    #[serde(rename = "文档页数")]
    pub page: String,
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct RelationExport {
    #[serde(rename = "术语关联")]
    pub terms: [String; 2],
    #[serde(rename = "关联关系")]
    pub relation: String,
    #[serde(rename = "关联描述")]
    pub sources: Vec<SourceExport>,
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct SourceExport {
    #[serde(rename = "文档出处")]
    pub documents: String,
    #[serde(rename = "文档页数")]
    pub page: String,
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(untagged)]
pub enum ExportEntry {
    Definition(DefinitionExport),
    Relation(RelationExport),
}

/// Ordered `id → entry` mapping. Keys follow aggregation order; a plain JSON
/// object map would re-sort `W100` ahead of `W11`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExportMapping {
    entries: Vec<(String, ExportEntry)>,
}

impl ExportMapping {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[cfg(test)]
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    #[cfg(test)]
    pub fn get(&self, key: &str) -> Option<&ExportEntry> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

impl Serialize for ExportMapping {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, entry) in &self.entries {
            map.serialize_entry(key, entry)?;
        }
        map.end()
    }
}

/// Pages are always written as `第N页`; a missing page is an empty string.
fn page_label(page: Option<u32>) -> String {
    page.map(|p| format!("第{p}页")).unwrap_or_default()
}

fn encode_definition(d: &DefinitionRecord) -> ExportEntry {
    ExportEntry::Definition(DefinitionExport {
        term: d.term.clone().unwrap_or_default(),
        definition: d.definition.clone().unwrap_or_default(),
        documents: d.documents.clone().unwrap_or_default(),
        page: page_label(d.page),
    })
}

fn encode_relation(r: &RelationRecord) -> ExportEntry {
    ExportEntry::Relation(RelationExport {
        terms: [
            r.term1.clone().unwrap_or_default(),
            r.term2.clone().unwrap_or_default(),
        ],
        relation: r.relation.clone().unwrap_or_default(),
        sources: vec![SourceExport {
            documents: r.documents.clone().unwrap_or_default(),
            page: page_label(r.page),
        }],
    })
}

/// Encode every aggregated record, malformed ones included.
pub fn encode_export(records: &[RawRecord]) -> ExportMapping {
    let entries = records
        .iter()
        .enumerate()
        .map(|(i, record)| match record {
            RawRecord::Definition(d) => (format!("W{:02}", i + 1), encode_definition(d)),
            RawRecord::Relation(r) => (format!("R{:02}", i + 1), encode_relation(r)),
        })
        .collect();
    ExportMapping { entries }
}

/// Default download name, e.g. `术语定义_2025-03-01.json`.
pub fn default_file_name(mode: Mode, date: NaiveDate) -> String {
    let label = match mode {
        Mode::Definition => "术语定义",
        Mode::Relation => "术语关系",
    };
    format!("{label}_{}.json", date.format("%Y-%m-%d"))
}
