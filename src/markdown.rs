use crate::engine::{Mode, UnitFailure};
use crate::records::DisplayRecord;

/// Sanitize text for embedding in a Markdown heading.
/// Replaces newlines (which would break heading structure) with spaces.
pub(crate) fn sanitize_heading(s: &str) -> String {
    s.chars()
        .map(|c| if c == '\n' || c == '\r' { ' ' } else { c })
        .collect()
}

/// Render the result list: one section per record, followed by the units
/// that failed (if any).
pub fn render_results(mode: Mode, records: &[DisplayRecord], failures: &[UnitFailure]) -> String {
    let heading = match mode {
        Mode::Definition => "术语定义",
        Mode::Relation => "术语关系",
    };
    let mut output = format!("# {heading}（共 {} 条）\n\n", records.len());

    for record in records {
        output.push_str(&format!("## {}\n\n", sanitize_heading(&record.title)));
        if !record.description.is_empty() {
            output.push_str(&record.description);
            output.push_str("\n\n");
        }
        output.push_str(&format!(
            "来源文档: {} (第 {} 页)\n\n",
            record.document, record.page
        ));
    }

    if !failures.is_empty() {
        output.push_str("---\n\n## 未完成的查询\n\n");
        for failure in failures {
            output.push_str(&format!(
                "- {} ({})\n",
                failure.unit.query(),
                failure.kind.notice(mode).message
            ));
        }
    }

    output
}
