//! In-process stand-in for a Tenable.sc instance
//!
//! Backs the test suites and the CLI's offline mode. Records are stored as JSON per
//! endpoint; updates merge top-level fields the way upstream PATCH does, including the
//! `removePrefs` handling of scan policy preferences.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use serde_json::{Map, Value};
use tracing::debug;

use crate::client::{ClientError, ScClient};
use crate::types::{CurrentUser, FileUpload};

/// Endpoints whose create call answers with a one-element list
const LIST_CREATE_ENDPOINTS: &[&str] = &["acceptRiskRule", "recastRiskRule"];

#[derive(Default)]
struct State {
    next_id: u64,
    records: HashMap<String, BTreeMap<String, Value>>,
    files: HashMap<String, Vec<u8>>,
    calls: Vec<String>,
    fail_next: Option<String>,
}

impl State {
    fn allocate_id(&mut self) -> String {
        self.next_id += 1;
        self.next_id.to_string()
    }

    fn take_failure(&mut self) -> Result<(), ClientError> {
        match self.fail_next.take() {
            Some(message) => Err(ClientError::Api {
                status: 403,
                code: 1,
                message,
            }),
            None => Ok(()),
        }
    }
}

/// [`ScClient`] backed by in-process maps
#[derive(Default)]
pub struct InMemoryClient {
    state: Mutex<State>,
}

impl InMemoryClient {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Insert a record directly, returning its id
    pub fn seed(&self, endpoint: &str, mut record: Value) -> String {
        let mut state = self.lock();
        let id = match record.get("id").map(render_id) {
            Some(id) if !id.is_empty() => id,
            _ => state.allocate_id(),
        };
        if let Value::Object(map) = &mut record {
            map.insert("id".into(), Value::String(id.clone()));
        }
        state
            .records
            .entry(endpoint.to_string())
            .or_default()
            .insert(id.clone(), record);
        id
    }

    /// Stored record, if any
    pub fn record(&self, endpoint: &str, id: &str) -> Option<Value> {
        self.lock()
            .records
            .get(endpoint)
            .and_then(|m| m.get(id))
            .cloned()
    }

    /// Remove a record behind the provider's back
    pub fn remove(&self, endpoint: &str, id: &str) -> Option<Value> {
        self.lock()
            .records
            .get_mut(endpoint)
            .and_then(|m| m.remove(id))
    }

    pub fn count(&self, endpoint: &str) -> usize {
        self.lock().records.get(endpoint).map_or(0, BTreeMap::len)
    }

    /// Content of an uploaded file by server-side name
    pub fn uploaded(&self, filename: &str) -> Option<Vec<u8>> {
        self.lock().files.get(filename).cloned()
    }

    /// Calls made so far, as `METHOD endpoint[/id]`
    pub fn calls(&self) -> Vec<String> {
        self.lock().calls.clone()
    }

    /// Make the next call fail with an upstream error carrying `message`
    pub fn fail_next(&self, message: impl Into<String>) {
        self.lock().fail_next = Some(message.into());
    }
}

fn render_id(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        _ => String::new(),
    }
}

fn not_found(endpoint: &str, id: &str) -> ClientError {
    ClientError::NotFound {
        kind: endpoint.to_string(),
        id: id.to_string(),
    }
}

/// PATCH semantics: top-level fields replace, preferences merge, `removePrefs` deletes
fn merge(stored: &mut Map<String, Value>, patch: Map<String, Value>) {
    let mut remove_prefs = Vec::new();
    for (key, value) in patch {
        match (key.as_str(), value) {
            ("id", _) => {}
            ("removePrefs", Value::Array(keys)) => remove_prefs = keys,
            ("preferences", Value::Object(prefs)) => {
                let target = stored
                    .entry("preferences")
                    .or_insert_with(|| Value::Object(Map::new()));
                match target {
                    Value::Object(existing) => existing.extend(prefs),
                    other => *other = Value::Object(prefs),
                }
            }
            (_, value) => {
                stored.insert(key, value);
            }
        }
    }
    if let Some(Value::Object(prefs)) = stored.get_mut("preferences") {
        for key in remove_prefs.iter().filter_map(Value::as_str) {
            prefs.remove(key);
        }
    }
}

#[async_trait]
impl ScClient for InMemoryClient {
    async fn current_user(&self) -> Result<CurrentUser, ClientError> {
        let mut state = self.lock();
        state.calls.push("GET currentUser".into());
        state.take_failure()?;
        Ok(CurrentUser {
            id: "1".into(),
            username: "offline".into(),
            role: None,
        })
    }

    async fn get_raw(&self, endpoint: &str, id: &str, _fields: &[&str]) -> Result<Value, ClientError> {
        let mut state = self.lock();
        state.calls.push(format!("GET {}/{}", endpoint, id));
        state.take_failure()?;
        state
            .records
            .get(endpoint)
            .and_then(|m| m.get(id))
            .cloned()
            .ok_or_else(|| not_found(endpoint, id))
    }

    async fn list_raw(
        &self,
        endpoint: &str,
        _fields: &[&str],
        query: &[(&str, &str)],
    ) -> Result<Vec<Value>, ClientError> {
        let mut state = self.lock();
        state.calls.push(format!("GET {}", endpoint));
        state.take_failure()?;

        let filter = query
            .iter()
            .find(|(k, _)| *k == "filterField")
            .map(|(_, field)| *field)
            .zip(query.iter().find(|(k, _)| *k == "value").map(|(_, v)| *v));

        let records = state.records.get(endpoint);
        Ok(records
            .into_iter()
            .flat_map(|m| m.values())
            .filter(|record| match filter {
                Some((field, value)) => record.get(field).and_then(Value::as_str) == Some(value),
                None => true,
            })
            .cloned()
            .collect())
    }

    async fn create_raw(&self, endpoint: &str, body: Value) -> Result<Value, ClientError> {
        let mut state = self.lock();
        state.calls.push(format!("POST {}", endpoint));
        state.take_failure()?;

        let Value::Object(mut record) = body else {
            return Err(ClientError::UnexpectedResponse(format!(
                "create body for {} is not an object",
                endpoint
            )));
        };
        let id = state.allocate_id();
        record.insert("id".into(), Value::String(id.clone()));
        record.remove("removePrefs");
        let record = Value::Object(record);
        debug!(endpoint, id = %id, "created");
        state
            .records
            .entry(endpoint.to_string())
            .or_default()
            .insert(id, record.clone());

        if LIST_CREATE_ENDPOINTS.contains(&endpoint) {
            Ok(Value::Array(vec![record]))
        } else {
            Ok(record)
        }
    }

    async fn update_raw(&self, endpoint: &str, id: &str, body: Value) -> Result<Value, ClientError> {
        let mut state = self.lock();
        state.calls.push(format!("PATCH {}/{}", endpoint, id));
        state.take_failure()?;

        let Value::Object(patch) = body else {
            return Err(ClientError::UnexpectedResponse(format!(
                "update body for {} is not an object",
                endpoint
            )));
        };
        let stored = state
            .records
            .get_mut(endpoint)
            .and_then(|m| m.get_mut(id))
            .ok_or_else(|| not_found(endpoint, id))?;
        if let Value::Object(map) = stored {
            merge(map, patch);
        }
        Ok(stored.clone())
    }

    async fn delete_raw(&self, endpoint: &str, id: &str) -> Result<(), ClientError> {
        let mut state = self.lock();
        state.calls.push(format!("DELETE {}/{}", endpoint, id));
        state.take_failure()?;
        state
            .records
            .get_mut(endpoint)
            .and_then(|m| m.remove(id))
            .map(|_| ())
            .ok_or_else(|| not_found(endpoint, id))
    }

    async fn upload_file(&self, name: &str, content: Vec<u8>) -> Result<FileUpload, ClientError> {
        let mut state = self.lock();
        state.calls.push("POST file/upload".into());
        state.take_failure()?;
        let filename = format!("upload-{}-{}", state.allocate_id(), name);
        state.files.insert(filename.clone(), content);
        Ok(FileUpload {
            filename,
            original_filename: name.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{BaseInfo, ScanPolicy};
    use serde_json::json;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_crud_cycle() {
        let client: Arc<dyn ScClient> = Arc::new(InMemoryClient::new());
        let created = client
            .create_raw("zone", json!({"name": "dmz", "ipList": "10.0.0.0/8"}))
            .await
            .unwrap();
        let id = created["id"].as_str().unwrap().to_string();

        let updated = client
            .update_raw("zone", &id, json!({"id": id, "name": "core"}))
            .await
            .unwrap();
        assert_eq!(updated["name"], "core");
        assert_eq!(updated["ipList"], "10.0.0.0/8");

        client.delete_raw("zone", &id).await.unwrap();
        let err = client.get_raw("zone", &id, &[]).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_remove_prefs_on_update() {
        let mem = Arc::new(InMemoryClient::new());
        let id = mem.seed(
            "policy",
            json!({"name": "p", "preferences": {"a": "1", "b": "2"}}),
        );
        let client: Arc<dyn ScClient> = mem.clone();

        let patch = ScanPolicy {
            base: BaseInfo::reference(id.as_str()),
            preferences: serde_json::from_value(json!({"a": "3"})).unwrap(),
            remove_prefs: vec!["b".into()],
            ..Default::default()
        };
        client.update(&patch).await.unwrap();

        let stored = mem.record("policy", &id).unwrap();
        assert_eq!(stored["preferences"], json!({"a": "3"}));
        assert!(stored.get("removePrefs").is_none());
    }

    #[tokio::test]
    async fn test_fail_next_is_one_shot() {
        let mem = InMemoryClient::new();
        mem.fail_next("Unable to retrieve asset");
        let err = mem.list_raw("asset", &[], &[]).await.unwrap_err();
        assert!(err.to_string().contains("Unable to retrieve asset"));
        assert!(mem.list_raw("asset", &[], &[]).await.is_ok());
    }

    #[tokio::test]
    async fn test_list_filter() {
        let mem = InMemoryClient::new();
        mem.seed("plugin", json!({"id": "19506", "name": "Nessus Scan Information"}));
        mem.seed("plugin", json!({"id": "10180", "name": "Ping the remote host"}));
        let hits = mem
            .list_raw("plugin", &[], &[("filterField", "name"), ("op", "eq"), ("value", "Ping the remote host")])
            .await
            .unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(mem.calls(), vec!["GET plugin"]);
    }
}
