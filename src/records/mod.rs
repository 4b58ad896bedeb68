//! Records returned by the knowledge base and the shapes derived from them.

pub mod export;
pub mod format;

pub use export::{ExportMapping, encode_export};
pub use format::format_records;

use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::engine::Mode;

/// A term definition as returned by the definition endpoints. Every field may
/// be missing or mistyped on the wire; such fields decode as `None`.
#[derive(Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct DefinitionRecord {
    #[serde(default, deserialize_with = "lenient_text")]
    pub term: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub definition: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub documents: Option<String>,
    #[serde(default, deserialize_with = "lenient_page")]
    pub page: Option<u32>,
}

/// A relation between two terms as returned by the relation endpoints.
#[derive(Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct RelationRecord {
    #[serde(default, deserialize_with = "lenient_text")]
    pub term1: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub term2: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub relation: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub reason: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub documents: Option<String>,
    #[serde(default, deserialize_with = "lenient_page")]
    pub page: Option<u32>,
}

/// Strings pass through and numbers/booleans are stringified. Anything else is
/// treated as missing.
fn lenient_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    })
}

/// Accepts `3`, `3.0` and `"3"`. Other shapes are treated as missing.
fn lenient_page<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u32>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0 && *f >= 0.0).map(|f| f as u64))
            .and_then(|p| u32::try_from(p).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawRecord {
    Definition(DefinitionRecord),
    Relation(RelationRecord),
}

impl RawRecord {
    /// Decode one element of a `result` array for the given mode.
    /// Returns `None` for elements that are not record objects.
    pub fn from_value(mode: Mode, value: Value) -> Option<Self> {
        if !value.is_object() {
            return None;
        }
        match mode {
            Mode::Definition => serde_json::from_value(value).ok().map(RawRecord::Definition),
            Mode::Relation => serde_json::from_value(value).ok().map(RawRecord::Relation),
        }
    }
}

/// Uniform record consumed by the result list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayRecord {
    pub title: String,
    pub description: String,
    pub document: String,
    pub page: u32,
}
