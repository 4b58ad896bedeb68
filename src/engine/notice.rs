use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Error,
}

/// A single user-visible message. One is emitted per occurrence; repeats are
/// not collapsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.level {
            NoticeLevel::Success => write!(f, "✓ {}", self.message),
            NoticeLevel::Error => write!(f, "✗ {}", self.message),
        }
    }
}

pub(crate) const AUTH_MESSAGE: &str = "请检查API KEY是否正确";
pub(crate) const SUCCESS_MESSAGE: &str = "查询成功";

pub(crate) fn partial_success_message(found: usize) -> String {
    format!("部分查询成功，共找到 {found} 条结果")
}

pub(crate) fn request_failed_message(status: u16) -> String {
    format!("请求失败，状态码：{status}")
}
