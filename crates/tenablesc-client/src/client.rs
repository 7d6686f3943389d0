//! Client seam between the provider and the Tenable.sc REST API
//!
//! [`ScClient`] exposes untyped JSON operations keyed by endpoint; the inherent methods on
//! `dyn ScClient` layer typed, per-kind access on top through [`ApiObject`].

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use crate::types::{ApiObject, CurrentUser, FileUpload, Plugin};

// ── Client Errors ────────────────────────────────────────────────────────────

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Upstream rejected the request; `message` is upstream's own text
    #[error("API error ({status}): {message}")]
    Api {
        status: u16,
        code: i64,
        message: String,
    },

    #[error("{kind} {id} not found")]
    NotFound { kind: String, id: String },

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Not configured: {0}")]
    NotConfigured(String),

    #[error("Unexpected response: {0}")]
    UnexpectedResponse(String),
}

impl ClientError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, ClientError::NotFound { .. })
    }
}

impl From<ClientError> for tenablesc_core::Error {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::NotFound { kind, id } => tenablesc_core::Error::NotFound { kind, id },
            ClientError::NotConfigured(msg) => tenablesc_core::Error::Configuration(msg),
            other => tenablesc_core::Error::Upstream(other.to_string()),
        }
    }
}

/// Untyped operations against `/rest/{endpoint}`
#[async_trait]
pub trait ScClient: Send + Sync {
    /// The user that owns the configured keys; used to verify credentials
    async fn current_user(&self) -> Result<CurrentUser, ClientError>;

    async fn get_raw(&self, endpoint: &str, id: &str, fields: &[&str]) -> Result<Value, ClientError>;

    /// All records of a kind; `query` is appended as URL parameters
    async fn list_raw(
        &self,
        endpoint: &str,
        fields: &[&str],
        query: &[(&str, &str)],
    ) -> Result<Vec<Value>, ClientError>;

    async fn create_raw(&self, endpoint: &str, body: Value) -> Result<Value, ClientError>;

    /// Partial update; fields absent from `body` are left untouched upstream
    async fn update_raw(&self, endpoint: &str, id: &str, body: Value) -> Result<Value, ClientError>;

    async fn delete_raw(&self, endpoint: &str, id: &str) -> Result<(), ClientError>;

    /// Upload file content, returning the server-side filename
    async fn upload_file(&self, name: &str, content: Vec<u8>) -> Result<FileUpload, ClientError>;
}

impl<'a> dyn ScClient + 'a {
    pub async fn get<T: ApiObject>(&self, id: &str) -> Result<T, ClientError> {
        let raw = self.get_raw(T::ENDPOINT, id, T::FIELDS).await?;
        decode(raw)
    }

    pub async fn list<T: ApiObject>(&self) -> Result<Vec<T>, ClientError> {
        let raw = self.list_raw(T::ENDPOINT, T::FIELDS, &[]).await?;
        raw.into_iter().map(decode).collect()
    }

    pub async fn create<T: ApiObject>(&self, record: &T) -> Result<T, ClientError> {
        let body = serde_json::to_value(record)?;
        debug!(kind = T::KIND, body = %body, "create request");
        let raw = self.create_raw(T::ENDPOINT, body).await?;
        decode(first_record(raw)?)
    }

    pub async fn update<T: ApiObject>(&self, record: &T) -> Result<T, ClientError> {
        let id = record.id().as_str();
        if id.is_empty() {
            return Err(ClientError::UnexpectedResponse(format!(
                "cannot update {} without an id",
                T::KIND
            )));
        }
        let body = serde_json::to_value(record)?;
        debug!(kind = T::KIND, id, body = %body, "update request");
        let raw = self.update_raw(T::ENDPOINT, id, body).await?;
        decode(first_record(raw)?)
    }

    pub async fn delete<T: ApiObject>(&self, id: &str) -> Result<(), ClientError> {
        self.delete_raw(T::ENDPOINT, id).await
    }

    /// Plugins whose name matches exactly
    pub async fn plugins_by_name(&self, name: &str) -> Result<Vec<Plugin>, ClientError> {
        let query = [("filterField", "name"), ("op", "eq"), ("value", name)];
        let raw = self.list_raw(Plugin::ENDPOINT, Plugin::FIELDS, &query).await?;
        let plugins: Vec<Plugin> = raw.into_iter().map(decode).collect::<Result<_, _>>()?;
        Ok(plugins.into_iter().filter(|p| p.name == name).collect())
    }
}

fn decode<T: ApiObject>(raw: Value) -> Result<T, ClientError> {
    serde_json::from_value(raw).map_err(ClientError::from)
}

/// Some create endpoints answer with a one-element array
fn first_record(raw: Value) -> Result<Value, ClientError> {
    match raw {
        Value::Array(mut items) => {
            if items.is_empty() {
                Err(ClientError::UnexpectedResponse("empty response list".into()))
            } else {
                Ok(items.swap_remove(0))
            }
        }
        other => Ok(other),
    }
}

/// Flatten list responses that split records into `usable` and `manageable` groups
pub(crate) fn flatten_list(raw: Value) -> Result<Vec<Value>, ClientError> {
    match raw {
        Value::Array(items) => Ok(items),
        Value::Object(mut map) if map.contains_key("usable") || map.contains_key("manageable") => {
            let mut seen = std::collections::HashSet::new();
            let mut out = Vec::new();
            for group in ["usable", "manageable"] {
                if let Some(Value::Array(items)) = map.remove(group) {
                    for item in items {
                        let key = item.get("id").map(Value::to_string).unwrap_or_default();
                        if seen.insert(key) {
                            out.push(item);
                        }
                    }
                }
            }
            Ok(out)
        }
        Value::Null => Ok(Vec::new()),
        other => Err(ClientError::UnexpectedResponse(format!(
            "expected a list, got {}",
            other
        ))),
    }
}
