use std::env;

use url::Url;

use crate::engine::AuthPolicy;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

const ENV_BASE_URL: &str = "TERMSCOPE_BASE_URL";
const ENV_API_KEY: &str = "TERMSCOPE_API_KEY";
const ENV_ABORT_ON_AUTH: &str = "TERMSCOPE_ABORT_ON_AUTH";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid base URL '{0}': {1}")]
    InvalidUrl(String, url::ParseError),

    #[error("Unsupported URL scheme '{0}': only http and https are allowed")]
    UnsupportedScheme(String),
}

#[derive(Clone)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub(crate) fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("[REDACTED]")
    }
}

/// Backend location and run policy.
///
/// Environment: `TERMSCOPE_BASE_URL` (default `http://localhost:8000`),
/// `TERMSCOPE_API_KEY` (optional, sent as a bearer token) and
/// `TERMSCOPE_ABORT_ON_AUTH` (`1`/`true` stops a run on the first 401).
#[derive(Debug, Clone)]
pub struct Config {
    pub base_url: Url,
    pub api_key: Option<ApiKey>,
    pub auth_policy: AuthPolicy,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(|name| env::var(name).ok())
    }

    fn from_vars(var: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let non_empty = |name: &str| var(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let base_url = parse_base_url(
            non_empty(ENV_BASE_URL)
                .as_deref()
                .unwrap_or(DEFAULT_BASE_URL),
        )?;
        let api_key = non_empty(ENV_API_KEY).map(ApiKey::new);
        let auth_policy = match non_empty(ENV_ABORT_ON_AUTH).as_deref() {
            Some("1" | "true" | "yes") => AuthPolicy::Abort,
            _ => AuthPolicy::Continue,
        };

        Ok(Self {
            base_url,
            api_key,
            auth_policy,
        })
    }

    pub fn with_base_url(mut self, raw: &str) -> Result<Self, ConfigError> {
        self.base_url = parse_base_url(raw)?;
        Ok(self)
    }
}

fn parse_base_url(raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw).map_err(|e| ConfigError::InvalidUrl(raw.to_string(), e))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(ConfigError::UnsupportedScheme(other.to_string())),
    }
}
