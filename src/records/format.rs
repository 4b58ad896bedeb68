use super::{DefinitionRecord, DisplayRecord, RawRecord, RelationRecord};

/// Map aggregated records to display records.
///
/// Definitions never drop: missing text becomes empty and a missing page
/// becomes 0. Relations drop unless every field is present and non-empty
/// (page non-zero).
pub fn format_records(records: &[RawRecord]) -> Vec<DisplayRecord> {
    records
        .iter()
        .filter_map(|record| match record {
            RawRecord::Definition(d) => Some(format_definition(d)),
            RawRecord::Relation(r) => format_relation(r),
        })
        .collect()
}

fn format_definition(d: &DefinitionRecord) -> DisplayRecord {
    DisplayRecord {
        title: d.term.clone().unwrap_or_default(),
        description: d.definition.clone().unwrap_or_default(),
        document: d.documents.clone().unwrap_or_default(),
        page: d.page.unwrap_or(0),
    }
}

fn format_relation(r: &RelationRecord) -> Option<DisplayRecord> {
    let term1 = present(&r.term1)?;
    let term2 = present(&r.term2)?;
    let relation = present(&r.relation)?;
    let reason = present(&r.reason)?;
    let documents = present(&r.documents)?;
    let page = r.page.filter(|&p| p != 0)?;

    Some(DisplayRecord {
        title: format!("{term1} 与 {term2} 为 {relation}"),
        description: reason.to_string(),
        document: documents.to_string(),
        page,
    })
}

fn present(field: &Option<String>) -> Option<&str> {
    field.as_deref().filter(|s| !s.is_empty())
}
