//! Term extraction: turns typed text or an uploaded JSON list into an ordered,
//! validated sequence of terms.

use std::path::Path;

use tracing::{debug, warn};

use crate::engine::{Mode, Strategy};

const MIN_QUERY_CHARS: usize = 2;
const MAX_QUERY_CHARS: usize = 100;
const SEPARATORS: [char; 2] = [',', '，'];

#[derive(Debug, thiserror::Error)]
pub enum InputError {
    #[error("至少需要输入两个字符")]
    TooShort,

    #[error("最多输入100个字符")]
    TooLong,

    #[error("没有有效的术语")]
    EmptyTermSet,

    #[error("JSON文件中没有有效的术语")]
    EmptyTermFile,

    #[error("请输入至少两个有效术语并用逗号分隔")]
    InsufficientTerms,

    #[error("JSON文件中至少需要两个有效术语")]
    InsufficientFileTerms,

    #[error("术语数量必须为偶数才能逐对查询关系 (当前 {0} 个)")]
    OddTermCount(usize),

    #[error("{}", malformed_file_message(.0))]
    MalformedTermFile(Mode),

    #[error("解析文件失败")]
    InvalidFileFormat,

    #[error("请上传JSON格式的文件")]
    NotJsonFile,

    #[error("读取文件失败: {0}")]
    FileRead(#[from] std::io::Error),
}

fn malformed_file_message(mode: &Mode) -> &'static str {
    match mode {
        Mode::Definition => "JSON文件格式不正确，缺少definitions数组或数组格式错误",
        Mode::Relation => "JSON文件格式不正确，缺少术语数组或数组格式错误",
    }
}

/// Raw user submission before normalization.
#[derive(Debug, Clone)]
pub enum TermInput {
    /// Free text typed into the query field.
    Text(String),
    /// Entries read from an uploaded term file.
    List(Vec<String>),
}

impl TermInput {
    pub fn is_file(&self) -> bool {
        matches!(self, TermInput::List(_))
    }
}

/// Ordered, trimmed, non-empty terms. Order follows the input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TermSequence(Vec<String>);

impl TermSequence {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn into_vec(self) -> Vec<String> {
        self.0
    }

    pub fn joined(&self) -> String {
        self.0.join(",")
    }
}

/// Split on ASCII and full-width commas, trim, drop empties.
pub fn split_terms(raw: &str) -> Vec<String> {
    raw.split(SEPARATORS)
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(String::from)
        .collect()
}

fn normalize_list(entries: &[String]) -> Vec<String> {
    entries
        .iter()
        .map(|t| t.trim())
        .filter(|t| !t.is_empty())
        .map(String::from)
        .collect()
}

fn check_query_length(raw: &str) -> Result<(), InputError> {
    let chars = raw.chars().count();
    if chars < MIN_QUERY_CHARS {
        return Err(InputError::TooShort);
    }
    if chars > MAX_QUERY_CHARS {
        return Err(InputError::TooLong);
    }
    Ok(())
}

/// Normalize and validate a submission for the given mode and strategy.
///
/// Text input must be 2–100 characters before splitting. Relation mode needs
/// at least two terms, and an even count when pairs are dispatched one by one.
pub fn extract(input: &TermInput, mode: Mode, strategy: Strategy) -> Result<TermSequence, InputError> {
    let terms = match input {
        TermInput::Text(raw) => {
            check_query_length(raw)?;
            split_terms(raw)
        }
        TermInput::List(entries) => normalize_list(entries),
    };

    match mode {
        Mode::Definition => {
            if terms.is_empty() {
                return Err(if input.is_file() {
                    InputError::EmptyTermFile
                } else {
                    InputError::EmptyTermSet
                });
            }
        }
        Mode::Relation => {
            if terms.len() < 2 {
                return Err(if input.is_file() {
                    InputError::InsufficientFileTerms
                } else {
                    InputError::InsufficientTerms
                });
            }
            if strategy == Strategy::Sequential && terms.len() % 2 != 0 {
                return Err(InputError::OddTermCount(terms.len()));
            }
        }
    }

    debug!(count = terms.len(), ?mode, ?strategy, "terms extracted");
    Ok(TermSequence(terms))
}

/// Parse the text of an uploaded term file: a non-empty JSON array of strings.
pub fn parse_term_file(text: &str, mode: Mode) -> Result<Vec<String>, InputError> {
    let value: serde_json::Value =
        serde_json::from_str(text).map_err(|_| InputError::InvalidFileFormat)?;

    let items = value.as_array().ok_or(InputError::MalformedTermFile(mode))?;
    if items.is_empty() {
        return Err(InputError::MalformedTermFile(mode));
    }

    items
        .iter()
        .map(|item| {
            item.as_str()
                .map(String::from)
                .ok_or(InputError::MalformedTermFile(mode))
        })
        .collect()
}

/// Read and parse a term file from disk.
///
/// Only `.json` files are accepted. Bytes are decoded as UTF-8 with BOM
/// sniffing, matching how browsers read uploaded text files.
pub async fn read_term_file(path: &Path, mode: Mode) -> Result<TermInput, InputError> {
    let is_json = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("json"));
    if !is_json {
        return Err(InputError::NotJsonFile);
    }

    let bytes = tokio::fs::read(path).await?;
    let (text, encoding, had_errors) = encoding_rs::UTF_8.decode(&bytes);
    if had_errors {
        warn!(
            path = %path.display(),
            encoding = encoding.name(),
            "term file has invalid bytes, replaced with U+FFFD"
        );
    }

    let terms = parse_term_file(&text, mode)?;
    debug!(path = %path.display(), entries = terms.len(), "term file loaded");
    Ok(TermInput::List(terms))
}
