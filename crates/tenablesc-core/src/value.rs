//! Dynamically-typed attribute values at the configuration boundary

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Attribute name to value
pub type AttrMap = BTreeMap<String, AttrValue>;

/// A configuration value as supplied by the configuration engine
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttrValue {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    String(String),
    List(Vec<AttrValue>),
    Map(AttrMap),
}

impl AttrValue {
    /// Name of the variant, for error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            AttrValue::Null => "null",
            AttrValue::Bool(_) => "bool",
            AttrValue::Int(_) => "int",
            AttrValue::String(_) => "string",
            AttrValue::List(_) => "list",
            AttrValue::Map(_) => "map",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, AttrValue::Null)
    }

    /// Whether the value equals its type's zero value
    pub fn is_zero(&self) -> bool {
        match self {
            AttrValue::Null => true,
            AttrValue::Bool(b) => !b,
            AttrValue::Int(n) => *n == 0,
            AttrValue::String(s) => s.is_empty(),
            AttrValue::List(l) => l.is_empty(),
            AttrValue::Map(m) => m.is_empty(),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttrValue::String(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            AttrValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            AttrValue::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[AttrValue]> {
        match self {
            AttrValue::List(l) => Some(l.as_slice()),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&AttrMap> {
        match self {
            AttrValue::Map(m) => Some(m),
            _ => None,
        }
    }

    /// Render a scalar the way the diff engine compares it
    pub fn render(&self) -> String {
        match self {
            AttrValue::Null => String::new(),
            AttrValue::Bool(b) => b.to_string(),
            AttrValue::Int(n) => n.to_string(),
            AttrValue::String(s) => s.clone(),
            other => serde_json::to_string(other).unwrap_or_default(),
        }
    }

    pub fn string_list<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        AttrValue::List(items.into_iter().map(|s| AttrValue::String(s.into())).collect())
    }
}

impl From<&str> for AttrValue {
    fn from(s: &str) -> Self {
        AttrValue::String(s.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(s: String) -> Self {
        AttrValue::String(s)
    }
}

impl From<bool> for AttrValue {
    fn from(b: bool) -> Self {
        AttrValue::Bool(b)
    }
}

impl From<i64> for AttrValue {
    fn from(n: i64) -> Self {
        AttrValue::Int(n)
    }
}

impl From<Vec<String>> for AttrValue {
    fn from(items: Vec<String>) -> Self {
        AttrValue::string_list(items)
    }
}

impl From<BTreeMap<String, String>> for AttrValue {
    fn from(map: BTreeMap<String, String>) -> Self {
        AttrValue::Map(
            map.into_iter()
                .map(|(k, v)| (k, AttrValue::String(v)))
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_untagged_json() {
        let v: AttrValue =
            serde_json::from_str(r#"{"name":"r","trending_days":30,"on":true,"ids":["1","2"],"x":null}"#)
                .unwrap();
        let map = v.as_map().unwrap();
        assert_eq!(map["name"].as_str(), Some("r"));
        assert_eq!(map["trending_days"].as_int(), Some(30));
        assert_eq!(map["on"].as_bool(), Some(true));
        assert_eq!(map["ids"].as_list().unwrap().len(), 2);
        assert!(map["x"].is_null());
    }

    #[test]
    fn test_zero_values() {
        assert!(AttrValue::from("").is_zero());
        assert!(AttrValue::from(false).is_zero());
        assert!(!AttrValue::from(1i64).is_zero());
        assert!(AttrValue::List(vec![]).is_zero());
    }
}
