//! Scan policy preference maps
//!
//! Upstream preference values are strings or string arrays; configuration values are
//! always strings, with arrays carried as their JSON rendering.

use std::collections::BTreeMap;

use serde_json::{Map, Value};
use tenablesc_core::Result;
use tracing::debug;

/// Upstream preferences to configuration strings
pub fn marshal_preferences(upstream: &Map<String, Value>) -> Result<BTreeMap<String, String>> {
    let mut marshalled = BTreeMap::new();
    for (key, value) in upstream {
        let rendered = match value {
            Value::String(s) => s.clone(),
            other => serde_json::to_string(other)?,
        };
        marshalled.insert(key.clone(), rendered);
    }
    debug!(?marshalled, "marshalled preference map");
    Ok(marshalled)
}

/// Configuration strings to upstream preferences; JSON string arrays are expanded
pub fn unmarshal_preferences(config: &BTreeMap<String, String>) -> Map<String, Value> {
    let unmarshalled: Map<String, Value> = config
        .iter()
        .map(|(key, value)| {
            let parsed = match serde_json::from_str::<Vec<String>>(value) {
                Ok(items) => Value::from(items),
                Err(_) => Value::String(value.clone()),
            };
            (key.clone(), parsed)
        })
        .collect();
    debug!(?unmarshalled, "unmarshalled preference map");
    unmarshalled
}

/// Keys present before and absent now
pub fn removed_keys(old: &BTreeMap<String, String>, new: &BTreeMap<String, String>) -> Vec<String> {
    old.keys().filter(|k| !new.contains_key(*k)).cloned().collect()
}
