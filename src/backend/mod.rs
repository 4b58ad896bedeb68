pub mod types;

use reqwest::Client;
use tracing::{debug, warn};

use crate::config::{ApiKey, Config};
use crate::engine::{Mode, WorkUnit};
use crate::records::RawRecord;

use types::{BatchQuery, Endpoint, SingleQuery};

/// Failures that end a run outright. Status codes are not errors here; they
/// travel back in [`LookupResponse`] for the engine to classify.
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("网络请求失败: {0}")]
    Network(#[from] reqwest::Error),

    #[error("响应解析失败: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Status plus the records decoded from a 2xx body. Non-2xx responses carry
/// no records.
#[derive(Debug, Clone, PartialEq)]
pub struct LookupResponse {
    pub status: u16,
    pub records: Vec<RawRecord>,
}

/// One call against the knowledge base. Implemented by `KbClient`; the engine
/// tests substitute a scripted backend.
pub trait LookupBackend {
    async fn lookup(&self, mode: Mode, unit: &WorkUnit) -> Result<LookupResponse, BackendError>;
}

impl<B: LookupBackend> LookupBackend for &B {
    async fn lookup(&self, mode: Mode, unit: &WorkUnit) -> Result<LookupResponse, BackendError> {
        (**self).lookup(mode, unit).await
    }
}

#[derive(Clone)]
pub struct KbClient {
    http: Client,
    base_url: String,
    api_key: Option<ApiKey>,
}

impl KbClient {
    pub fn new(http: Client, config: &Config) -> Self {
        if config.api_key.is_some() {
            debug!("API key configured");
        }
        Self {
            http,
            base_url: config.base_url.as_str().trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        }
    }

    #[cfg(test)]
    fn with_base_url(http: Client, base_url: &str) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: None,
        }
    }

    fn request(&self, endpoint: Endpoint) -> reqwest::RequestBuilder {
        let url = format!("{}/{}", self.base_url, endpoint.path());
        let mut req = self
            .http
            .post(&url)
            .header("User-Agent", crate::USER_AGENT);
        if let Some(key) = &self.api_key {
            req = req.bearer_auth(key.as_str());
        }
        req
    }
}

impl LookupBackend for KbClient {
    async fn lookup(&self, mode: Mode, unit: &WorkUnit) -> Result<LookupResponse, BackendError> {
        let endpoint = Endpoint::for_unit(mode, unit);
        let query = unit.query();

        let req = self.request(endpoint);
        let req = if endpoint.is_batch() {
            req.json(&BatchQuery { query: &query })
        } else {
            req.json(&SingleQuery {
                search_type: endpoint.search_type(),
                query: &query,
            })
        };

        let response = req.send().await?;
        let status = response.status().as_u16();
        match status {
            200..=299 => {
                let bytes = response.bytes().await?;
                if bytes.trim_ascii().is_empty() {
                    debug!(endpoint = endpoint.path(), status, "empty success body");
                    return Ok(LookupResponse {
                        status,
                        records: Vec::new(),
                    });
                }
                let body: serde_json::Value = serde_json::from_slice(&bytes)?;
                let records = extract_records(mode, body);
                debug!(endpoint = endpoint.path(), found = records.len(), "lookup complete");
                Ok(LookupResponse { status, records })
            }
            _ => {
                debug!(endpoint = endpoint.path(), status, "lookup returned error status");
                Ok(LookupResponse {
                    status,
                    records: Vec::new(),
                })
            }
        }
    }
}

/// Pull records out of `result`. A missing or non-array `result` yields no
/// records; elements that are not record objects are skipped.
fn extract_records(mode: Mode, body: serde_json::Value) -> Vec<RawRecord> {
    let serde_json::Value::Object(mut map) = body else {
        warn!("response body is not an object, treating as empty");
        return Vec::new();
    };
    let Some(serde_json::Value::Array(items)) = map.remove("result") else {
        return Vec::new();
    };

    let total = items.len();
    let records: Vec<_> = items
        .into_iter()
        .filter_map(|item| RawRecord::from_value(mode, item))
        .collect();
    if records.len() < total {
        warn!(skipped = total - records.len(), "skipped malformed result elements");
    }
    records
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn missing_result_is_empty() {
        assert!(extract_records(Mode::Definition, json!({"status": "ok"})).is_empty());
    }

    #[test]
    fn non_array_result_is_empty() {
        assert!(extract_records(Mode::Definition, json!({"result": "none"})).is_empty());
        assert!(extract_records(Mode::Definition, json!({"result": null})).is_empty());
    }

    #[test]
    fn non_object_elements_are_skipped() {
        let records = extract_records(
            Mode::Definition,
            json!({"result": [1, "x", {"term": "海浪"}, null]}),
        );
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn mistyped_page_keeps_record() {
        let records = extract_records(
            Mode::Definition,
            json!({"result": [{"term": "海浪", "definition": "d", "documents": "doc.pdf", "page": "3"}]}),
        );
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn relation_elements_decode() {
        let records = extract_records(
            Mode::Relation,
            json!({"result": [{"term1": "风暴潮", "term2": "海浪", "page": 3}]}),
        );
        match &records[..] {
            [RawRecord::Relation(r)] => {
                assert_eq!(r.term1.as_deref(), Some("风暴潮"));
                assert_eq!(r.page, Some(3));
            }
            other => panic!("expected one relation, got: {other:?}"),
        }
    }
}

#[cfg(test)]
mod http_tests {
    use super::*;
    use crate::pairing::TermPair;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn single_term_posts_search_type() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/definition"))
            .and(body_json(json!({"search_type": "definition", "query": "海洋灾害"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "result": [{
                    "term": "海洋灾害",
                    "definition": "由海洋自然环境异常引起的灾害",
                    "documents": "术语标准.pdf",
                    "page": 3
                }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = KbClient::with_base_url(Client::new(), &server.uri());
        let response = client
            .lookup(Mode::Definition, &WorkUnit::Term("海洋灾害".into()))
            .await
            .unwrap();

        assert_eq!(response.status, 200);
        assert_eq!(response.records.len(), 1);
    }

    #[tokio::test]
    async fn batch_posts_joined_query() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/relation/batch"))
            .and(body_json(json!({"query": "A,B,C,D"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"result": []})))
            .expect(1)
            .mount(&server)
            .await;

        let client = KbClient::with_base_url(Client::new(), &server.uri());
        let response = client
            .lookup(Mode::Relation, &WorkUnit::Batch("A,B,C,D".into()))
            .await
            .unwrap();
        assert!(response.records.is_empty());
    }

    #[tokio::test]
    async fn pair_posts_to_single_relation_endpoint() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/relation"))
            .and(body_json(json!({"search_type": "relation", "query": "风暴潮,海浪"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"result": []})))
            .expect(1)
            .mount(&server)
            .await;

        let client = KbClient::with_base_url(Client::new(), &server.uri());
        client
            .lookup(Mode::Relation, &WorkUnit::Pair(TermPair::new("风暴潮", "海浪")))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn error_status_is_returned_not_raised() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/definition"))
            .respond_with(ResponseTemplate::new(404).set_body_string("not found"))
            .mount(&server)
            .await;

        let client = KbClient::with_base_url(Client::new(), &server.uri());
        let response = client
            .lookup(Mode::Definition, &WorkUnit::Term("X".into()))
            .await
            .unwrap();
        assert_eq!(response.status, 404);
        assert!(response.records.is_empty());
    }

    #[tokio::test]
    async fn empty_success_body_is_empty_result() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/definition"))
            .respond_with(ResponseTemplate::new(204))
            .mount(&server)
            .await;

        let client = KbClient::with_base_url(Client::new(), &server.uri());
        let response = client
            .lookup(Mode::Definition, &WorkUnit::Term("X".into()))
            .await
            .unwrap();
        assert_eq!(response.status, 204);
        assert!(response.records.is_empty());
    }

    #[tokio::test]
    async fn whitespace_success_body_is_empty_result() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/definition/batch"))
            .respond_with(ResponseTemplate::new(200).set_body_string(" \n"))
            .mount(&server)
            .await;

        let client = KbClient::with_base_url(Client::new(), &server.uri());
        let response = client
            .lookup(Mode::Definition, &WorkUnit::Batch("a,b".into()))
            .await
            .unwrap();
        assert!(response.records.is_empty());
    }

    #[tokio::test]
    async fn invalid_success_body_is_decode_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/definition"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
            .mount(&server)
            .await;

        let client = KbClient::with_base_url(Client::new(), &server.uri());
        let result = client
            .lookup(Mode::Definition, &WorkUnit::Term("X".into()))
            .await;
        assert!(matches!(result, Err(BackendError::Decode(_))));
    }

    #[tokio::test]
    async fn api_key_is_sent_as_bearer() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/definition"))
            .and(header("authorization", "Bearer kb-secret"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"result": []})))
            .expect(1)
            .mount(&server)
            .await;

        let config = Config {
            base_url: server.uri().parse().unwrap(),
            api_key: Some(ApiKey::new("kb-secret")),
            auth_policy: Default::default(),
        };
        let client = KbClient::new(Client::new(), &config);
        client
            .lookup(Mode::Definition, &WorkUnit::Term("海浪".into()))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn unreachable_backend_is_network_error() {
        let client = KbClient::with_base_url(Client::new(), "http://127.0.0.1:1");
        let result = client
            .lookup(Mode::Definition, &WorkUnit::Term("X".into()))
            .await;
        assert!(matches!(result, Err(BackendError::Network(_))));
    }
}
