//! REST API client for a Tenable.sc instance
//!
//! Every call goes to `{uri}/rest/{endpoint}` authenticated with an API key pair. Responses
//! arrive in an envelope:
//!
//! ```text
//! {"type": "regular", "response": {...}, "error_code": 0, "error_msg": "", "warnings": []}
//! ```
//!
//! A non-zero `error_code` is a failure even when the HTTP status is 200. Failures whose
//! message says the object is missing are classified as [`ClientError::NotFound`].

use std::sync::OnceLock;
use std::time::Duration;

use async_trait::async_trait;
use regex::Regex;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, trace, warn};

use crate::client::{flatten_list, ClientError, ScClient};
use crate::types::{CurrentUser, FileUpload};

const API_KEY_HEADER: &str = "x-apikey";

// ── Configuration ────────────────────────────────────────────────────────────

/// Configuration for the REST API client
#[derive(Debug, Clone)]
pub struct RestClientConfig {
    /// Base URI of the instance (e.g., "https://sc.example.com")
    pub uri: String,
    /// API access key
    pub access_key: String,
    /// API secret key
    pub secret_key: String,
    /// HTTP request timeout
    pub request_timeout: Duration,
    /// Accept invalid server certificates
    pub insecure_skip_verify: bool,
}

impl RestClientConfig {
    pub fn new(
        uri: impl Into<String>,
        access_key: impl Into<String>,
        secret_key: impl Into<String>,
    ) -> Self {
        Self {
            uri: uri.into(),
            access_key: access_key.into(),
            secret_key: secret_key.into(),
            request_timeout: Duration::from_secs(60),
            insecure_skip_verify: false,
        }
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn insecure_skip_verify(mut self, skip: bool) -> Self {
        self.insecure_skip_verify = skip;
        self
    }
}

// ── Response envelope ────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(default, rename = "type")]
    response_type: String,
    #[serde(default)]
    response: Value,
    #[serde(default)]
    error_code: i64,
    #[serde(default)]
    error_msg: String,
    #[serde(default)]
    warnings: Vec<Value>,
}

fn not_found_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?i)(not found|does not exist)").expect("static not-found pattern")
    })
}

// ── REST API Client ──────────────────────────────────────────────────────────

/// HTTP implementation of [`ScClient`]
pub struct RestApiClient {
    config: RestClientConfig,
    base: String,
    http: Client,
}

impl RestApiClient {
    /// Create a new REST API client
    pub fn new(config: RestClientConfig) -> Result<Self, ClientError> {
        if config.uri.is_empty() {
            return Err(ClientError::NotConfigured("uri is required".into()));
        }
        if config.access_key.is_empty() || config.secret_key.is_empty() {
            return Err(ClientError::NotConfigured(
                "access_key and secret_key are required".into(),
            ));
        }
        let base = url::Url::parse(&config.uri)
            .map_err(|e| ClientError::NotConfigured(format!("invalid uri {}: {}", config.uri, e)))?;

        let http = Client::builder()
            .timeout(config.request_timeout)
            .user_agent(format!("tenablesc-provider/{}", env!("CARGO_PKG_VERSION")))
            .danger_accept_invalid_certs(config.insecure_skip_verify)
            .build()?;

        Ok(Self {
            base: base.as_str().trim_end_matches('/').to_string(),
            config,
            http,
        })
    }

    /// Full URL for a path under `/rest/`
    fn api_url(&self, path: &str) -> String {
        format!("{}/rest/{}", self.base, path.trim_start_matches('/'))
    }

    fn api_key(&self) -> String {
        format!(
            "accesskey={}; secretkey={};",
            self.config.access_key, self.config.secret_key
        )
    }

    /// Send a request and unwrap the response envelope.
    ///
    /// `endpoint` and `id` only label not-found errors.
    async fn execute(
        &self,
        request: RequestBuilder,
        endpoint: &str,
        id: &str,
    ) -> Result<Value, ClientError> {
        let res = request.header(API_KEY_HEADER, self.api_key()).send().await?;
        let status = res.status();
        let text = res.text().await?;
        trace!(%status, body = %text, "response");

        let not_found = || ClientError::NotFound {
            kind: endpoint.to_string(),
            id: id.to_string(),
        };

        if status == StatusCode::NOT_FOUND {
            return Err(not_found());
        }

        let envelope: Envelope = match serde_json::from_str(&text) {
            Ok(envelope) => envelope,
            Err(_) if !status.is_success() => {
                return Err(ClientError::Api {
                    status: status.as_u16(),
                    code: 0,
                    message: text,
                });
            }
            Err(e) => return Err(ClientError::Json(e)),
        };

        if envelope.error_code != 0 || !status.is_success() {
            if not_found_pattern().is_match(&envelope.error_msg) {
                debug!(endpoint, id, message = %envelope.error_msg, "classified as not found");
                return Err(not_found());
            }
            return Err(ClientError::Api {
                status: status.as_u16(),
                code: envelope.error_code,
                message: envelope.error_msg,
            });
        }

        for warning in &envelope.warnings {
            warn!(endpoint, %warning, "upstream warning");
        }
        debug!(endpoint, id, response_type = %envelope.response_type, "request succeeded");

        Ok(envelope.response)
    }
}

#[async_trait]
impl ScClient for RestApiClient {
    async fn current_user(&self) -> Result<CurrentUser, ClientError> {
        let req = self.http.get(self.api_url("currentUser"));
        let raw = self.execute(req, "currentUser", "").await?;
        Ok(serde_json::from_value(raw)?)
    }

    async fn get_raw(&self, endpoint: &str, id: &str, fields: &[&str]) -> Result<Value, ClientError> {
        let mut req = self.http.get(self.api_url(&format!("{}/{}", endpoint, id)));
        if !fields.is_empty() {
            req = req.query(&[("fields", fields.join(","))]);
        }
        self.execute(req, endpoint, id).await
    }

    async fn list_raw(
        &self,
        endpoint: &str,
        fields: &[&str],
        query: &[(&str, &str)],
    ) -> Result<Vec<Value>, ClientError> {
        let mut req = self.http.get(self.api_url(endpoint));
        if !fields.is_empty() {
            req = req.query(&[("fields", fields.join(","))]);
        }
        if !query.is_empty() {
            req = req.query(query);
        }
        let raw = self.execute(req, endpoint, "").await?;
        flatten_list(raw)
    }

    async fn create_raw(&self, endpoint: &str, body: Value) -> Result<Value, ClientError> {
        let req = self.http.post(self.api_url(endpoint)).json(&body);
        self.execute(req, endpoint, "").await
    }

    async fn update_raw(&self, endpoint: &str, id: &str, body: Value) -> Result<Value, ClientError> {
        let req = self
            .http
            .patch(self.api_url(&format!("{}/{}", endpoint, id)))
            .json(&body);
        self.execute(req, endpoint, id).await
    }

    async fn delete_raw(&self, endpoint: &str, id: &str) -> Result<(), ClientError> {
        let req = self.http.delete(self.api_url(&format!("{}/{}", endpoint, id)));
        self.execute(req, endpoint, id).await.map(|_| ())
    }

    async fn upload_file(&self, name: &str, content: Vec<u8>) -> Result<FileUpload, ClientError> {
        let size = content.len();
        let form = Form::new().part("Filedata", Part::bytes(content).file_name(name.to_string()));
        let req = self.http.post(self.api_url("file/upload")).multipart(form);
        let raw = self.execute(req, "file", name).await?;
        let upload: FileUpload = serde_json::from_value(raw)?;
        debug!(name, size, filename = %upload.filename, "file uploaded");
        Ok(upload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ApiObject, Repository, Role};
    use serde_json::json;
    use std::sync::Arc;
    use wiremock::matchers::{body_partial_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn ok(response: Value) -> ResponseTemplate {
        ResponseTemplate::new(200).set_body_json(json!({
            "type": "regular",
            "response": response,
            "error_code": 0,
            "error_msg": "",
            "warnings": [],
        }))
    }

    fn failed(status: u16, code: i64, msg: &str) -> ResponseTemplate {
        ResponseTemplate::new(status).set_body_json(json!({
            "type": "regular",
            "response": [],
            "error_code": code,
            "error_msg": msg,
            "warnings": [],
        }))
    }

    fn client_for(server: &MockServer) -> Arc<dyn ScClient> {
        let config = RestClientConfig::new(server.uri(), "ak", "sk");
        Arc::new(RestApiClient::new(config).unwrap())
    }

    #[test]
    fn test_requires_keys() {
        let err = RestApiClient::new(RestClientConfig::new("https://sc.local", "", "")).err();
        assert!(matches!(err, Some(ClientError::NotConfigured(_))));
        let err = RestApiClient::new(RestClientConfig::new("not a url", "a", "s")).err();
        assert!(matches!(err, Some(ClientError::NotConfigured(_))));
    }

    #[tokio::test]
    async fn test_current_user_sends_api_key() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/currentUser"))
            .and(header("x-apikey", "accesskey=ak; secretkey=sk;"))
            .respond_with(ok(json!({"id": 1, "username": "admin"})))
            .expect(1)
            .mount(&server)
            .await;

        let user = client_for(&server).current_user().await.unwrap();
        assert_eq!(user.id.as_str(), "1");
        assert_eq!(user.username, "admin");
    }

    #[tokio::test]
    async fn test_get_requests_field_projection() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/repository/5"))
            .and(query_param("fields", Repository::FIELDS.join(",")))
            .respond_with(ok(json!({
                "id": "5",
                "name": "Scanners",
                "trendingDays": "30",
                "trendWithRaw": "true",
                "organizations": [{"id": "2", "groupAssign": "all"}]
            })))
            .mount(&server)
            .await;

        let repo: Repository = client_for(&server).get("5").await.unwrap();
        assert_eq!(repo.base.name, "Scanners");
        assert!(repo.trend_with_raw.as_bool());
        assert_eq!(repo.organizations.unwrap()[0].group_assign, "all");
    }

    #[tokio::test]
    async fn test_not_found_classification() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/role/9"))
            .respond_with(failed(403, 143, "Role #9 not found"))
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .and(path("/rest/role/10"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let err = client.get::<Role>("9").await.unwrap_err();
        assert!(err.is_not_found());
        let err = client.delete::<Role>("10").await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_error_code_with_http_200_is_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/rest/role"))
            .respond_with(failed(200, 5, "Invalid name"))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .create(&Role::default())
            .await
            .unwrap_err();
        match err {
            ClientError::Api { code, message, .. } => {
                assert_eq!(code, 5);
                assert_eq!(message, "Invalid name");
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_update_is_patch_with_partial_body() {
        let server = MockServer::start().await;
        Mock::given(method("PATCH"))
            .and(path("/rest/repository/5"))
            .and(body_partial_json(json!({"id": "5", "organizations": []})))
            .respond_with(ok(json!({"id": "5"})))
            .expect(1)
            .mount(&server)
            .await;

        let repo = Repository {
            base: crate::types::BaseInfo::reference("5"),
            organizations: Some(vec![]),
            ..Default::default()
        };
        client_for(&server).update(&repo).await.unwrap();
    }

    #[tokio::test]
    async fn test_list_flattens_usable_and_manageable() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/asset"))
            .respond_with(ok(json!({
                "usable": [{"id": "1", "name": "web"}],
                "manageable": [{"id": "1", "name": "web"}, {"id": "2", "name": "db"}]
            })))
            .mount(&server)
            .await;

        let assets: Vec<crate::types::Asset> = client_for(&server).list().await.unwrap();
        assert_eq!(assets.len(), 2);
    }

    #[tokio::test]
    async fn test_upload_file() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/rest/file/upload"))
            .respond_with(ok(json!({"filename": "abc123", "originalFilename": "cis.audit"})))
            .mount(&server)
            .await;

        let upload = client_for(&server)
            .upload_file("cis.audit", b"<check_type/>".to_vec())
            .await
            .unwrap();
        assert_eq!(upload.filename, "abc123");
    }

    #[tokio::test]
    async fn test_plugins_by_name_filters_exact() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/plugin"))
            .and(query_param("filterField", "name"))
            .and(query_param("value", "Nessus Scan Information"))
            .respond_with(ok(json!([
                {"id": "19506", "name": "Nessus Scan Information"},
                {"id": "1", "name": "Nessus Scan Information (extended)"}
            ])))
            .mount(&server)
            .await;

        let plugins = client_for(&server)
            .plugins_by_name("Nessus Scan Information")
            .await
            .unwrap();
        assert_eq!(plugins.len(), 1);
        assert_eq!(plugins[0].id.as_str(), "19506");
    }
}
