//! Per-operation view of one managed entity

use crate::error::{Error, Result};
use crate::value::{AttrMap, AttrValue};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Attribute values for one managed entity during a single operation.
///
/// `values` starts as the planned configuration (create/update) or the prior state (read,
/// delete) and becomes the new state as the operation sets attributes. `prior` is the state
/// recorded before the operation started.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResourceData {
    #[serde(default)]
    id: String,
    #[serde(default)]
    values: AttrMap,
    #[serde(skip)]
    prior: AttrMap,
}

impl ResourceData {
    /// Fresh entity with no prior state
    pub fn new(values: AttrMap) -> Self {
        Self {
            id: String::new(),
            values,
            prior: AttrMap::new(),
        }
    }

    /// Entity known to the state store
    pub fn from_state(id: impl Into<String>, state: AttrMap) -> Self {
        Self {
            id: id.into(),
            prior: state.clone(),
            values: state,
        }
    }

    /// Entity being changed from `prior` to `planned`
    pub fn for_update(id: impl Into<String>, prior: AttrMap, planned: AttrMap) -> Self {
        Self {
            id: id.into(),
            values: planned,
            prior,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn set_id(&mut self, id: impl Into<String>) {
        self.id = id.into();
    }

    /// Forget the tracked identity; the entity is treated as absent
    pub fn clear_id(&mut self) {
        self.id.clear();
    }

    pub fn is_absent(&self) -> bool {
        self.id.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&AttrValue> {
        self.values.get(key)
    }

    /// Value only if it is set to something other than its zero value
    pub fn get_ok(&self, key: &str) -> Option<&AttrValue> {
        self.values.get(key).filter(|v| !v.is_zero())
    }

    /// Prior and current value of an attribute
    pub fn get_change(&self, key: &str) -> (Option<&AttrValue>, Option<&AttrValue>) {
        (self.prior.get(key), self.values.get(key))
    }

    pub fn has_change(&self, key: &str) -> bool {
        let (old, new) = self.get_change(key);
        old.cloned().unwrap_or_default() != new.cloned().unwrap_or_default()
    }

    pub fn get_string(&self, key: &str) -> Result<String> {
        string_of(key, self.values.get(key))
    }

    pub fn get_bool(&self, key: &str) -> Result<bool> {
        bool_of(key, self.values.get(key))
    }

    pub fn get_int(&self, key: &str) -> Result<i64> {
        int_of(key, self.values.get(key))
    }

    pub fn get_string_list(&self, key: &str) -> Result<Vec<String>> {
        string_list_of(key, self.values.get(key))
    }

    pub fn get_int_list(&self, key: &str) -> Result<Vec<i64>> {
        match self.values.get(key) {
            None | Some(AttrValue::Null) => Ok(Vec::new()),
            Some(AttrValue::List(items)) => items
                .iter()
                .map(|item| match item {
                    AttrValue::Int(n) => Ok(*n),
                    AttrValue::String(s) => s
                        .parse::<i64>()
                        .map_err(|_| Error::validation(key, format!("'{}' is not an integer", s))),
                    other => Err(type_mismatch(key, "int", other)),
                })
                .collect(),
            Some(other) => Err(type_mismatch(key, "list", other)),
        }
    }

    pub fn get_string_map(&self, key: &str) -> Result<BTreeMap<String, String>> {
        string_map_of(key, self.values.get(key))
    }

    /// Nested block list, each element an attribute map
    pub fn get_blocks(&self, key: &str) -> Result<Vec<AttrMap>> {
        match self.values.get(key) {
            None | Some(AttrValue::Null) => Ok(Vec::new()),
            Some(AttrValue::List(items)) => items
                .iter()
                .map(|item| match item {
                    AttrValue::Map(m) => Ok(m.clone()),
                    other => Err(type_mismatch(key, "block", other)),
                })
                .collect(),
            Some(other) => Err(type_mismatch(key, "list", other)),
        }
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<AttrValue>) {
        self.values.insert(key.into(), value.into());
    }

    pub fn remove(&mut self, key: &str) {
        self.values.remove(key);
    }

    pub fn values(&self) -> &AttrMap {
        &self.values
    }

    pub fn prior(&self) -> &AttrMap {
        &self.prior
    }

    /// Consume into `(id, state)`
    pub fn into_state(self) -> (String, AttrMap) {
        (self.id, self.values)
    }
}

fn type_mismatch(key: &str, expected: &str, got: &AttrValue) -> Error {
    Error::validation(key, format!("expected {}, got {}", expected, got.type_name()))
}

/// String attribute; missing or null reads as empty
pub fn string_of(key: &str, value: Option<&AttrValue>) -> Result<String> {
    match value {
        None | Some(AttrValue::Null) => Ok(String::new()),
        Some(AttrValue::String(s)) => Ok(s.clone()),
        Some(other) => Err(type_mismatch(key, "string", other)),
    }
}

/// Bool attribute; missing or null reads as false
pub fn bool_of(key: &str, value: Option<&AttrValue>) -> Result<bool> {
    match value {
        None | Some(AttrValue::Null) => Ok(false),
        Some(AttrValue::Bool(b)) => Ok(*b),
        Some(AttrValue::String(s)) => s
            .parse::<bool>()
            .map_err(|_| Error::validation(key, format!("'{}' is not a boolean", s))),
        Some(other) => Err(type_mismatch(key, "bool", other)),
    }
}

/// Int attribute; missing or null reads as zero
pub fn int_of(key: &str, value: Option<&AttrValue>) -> Result<i64> {
    match value {
        None | Some(AttrValue::Null) => Ok(0),
        Some(AttrValue::Int(n)) => Ok(*n),
        Some(AttrValue::String(s)) => s
            .parse::<i64>()
            .map_err(|_| Error::validation(key, format!("'{}' is not an integer", s))),
        Some(other) => Err(type_mismatch(key, "int", other)),
    }
}

pub fn string_list_of(key: &str, value: Option<&AttrValue>) -> Result<Vec<String>> {
    match value {
        None | Some(AttrValue::Null) => Ok(Vec::new()),
        Some(AttrValue::List(items)) => items
            .iter()
            .map(|item| match item {
                AttrValue::String(s) => Ok(s.clone()),
                other => Err(type_mismatch(key, "string", other)),
            })
            .collect(),
        Some(other) => Err(type_mismatch(key, "list", other)),
    }
}

pub fn string_map_of(key: &str, value: Option<&AttrValue>) -> Result<BTreeMap<String, String>> {
    match value {
        None | Some(AttrValue::Null) => Ok(BTreeMap::new()),
        Some(AttrValue::Map(m)) => m
            .iter()
            .map(|(k, v)| match v {
                AttrValue::String(s) => Ok((k.clone(), s.clone())),
                other => Err(type_mismatch(key, "string", other)),
            })
            .collect(),
        Some(other) => Err(type_mismatch(key, "map", other)),
    }
}
