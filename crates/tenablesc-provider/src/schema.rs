//! Attribute schemas
//!
//! A [`Schema`] declares the attributes of a resource or data source: their types,
//! presence rules, defaults, validators and diff suppressors. It applies defaults,
//! validates configurations and computes per-attribute changes between prior state and
//! a proposed configuration.

use std::collections::BTreeMap;

use serde::Serialize;
use tenablesc_core::{AttrMap, AttrValue, AttributePath, Diagnostic, Diagnostics};

/// Validator run on a configured, well-typed value
pub type ValidateFn = fn(&AttrValue, &AttributePath) -> Diagnostics;

/// `true` when `old` and `new` should be treated as the same value
pub type SuppressFn = fn(&str, &str) -> bool;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AttrType {
    String,
    Bool,
    Int,
    StringList,
    StringSet,
    IntSet,
    StringMap,
    /// Nested blocks, each an attribute map of its own
    Block {
        #[serde(skip_serializing_if = "Option::is_none")]
        max_items: Option<usize>,
        schema: Schema,
    },
}

impl AttrType {
    fn name(&self) -> &'static str {
        match self {
            AttrType::String => "string",
            AttrType::Bool => "bool",
            AttrType::Int => "number",
            AttrType::StringList => "list of string",
            AttrType::StringSet => "set of string",
            AttrType::IntSet => "set of number",
            AttrType::StringMap => "map of string",
            AttrType::Block { .. } => "block list",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Attribute {
    #[serde(rename = "type")]
    pub attr_type: AttrType,
    pub required: bool,
    pub optional: bool,
    pub computed: bool,
    pub force_new: bool,
    pub sensitive: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<AttrValue>,
    pub description: String,
    #[serde(skip)]
    pub validator: Option<ValidateFn>,
    #[serde(skip)]
    pub diff_suppress: Option<SuppressFn>,
}

impl PartialEq for Attribute {
    fn eq(&self, other: &Self) -> bool {
        self.attr_type == other.attr_type
            && self.required == other.required
            && self.optional == other.optional
            && self.computed == other.computed
            && self.force_new == other.force_new
            && self.sensitive == other.sensitive
            && self.default == other.default
            && self.description == other.description
    }
}

impl Attribute {
    /// Optional attribute of the given type
    pub fn new(attr_type: AttrType) -> Self {
        Self {
            attr_type,
            required: false,
            optional: true,
            computed: false,
            force_new: false,
            sensitive: false,
            default: None,
            description: String::new(),
            validator: None,
            diff_suppress: None,
        }
    }

    pub fn string() -> Self {
        Self::new(AttrType::String)
    }

    pub fn bool() -> Self {
        Self::new(AttrType::Bool)
    }

    pub fn int() -> Self {
        Self::new(AttrType::Int)
    }

    pub fn string_list() -> Self {
        Self::new(AttrType::StringList)
    }

    pub fn string_set() -> Self {
        Self::new(AttrType::StringSet)
    }

    pub fn int_set() -> Self {
        Self::new(AttrType::IntSet)
    }

    pub fn string_map() -> Self {
        Self::new(AttrType::StringMap)
    }

    pub fn block(schema: Schema, max_items: Option<usize>) -> Self {
        Self::new(AttrType::Block { max_items, schema })
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self.optional = false;
        self
    }

    /// Set by the provider only
    pub fn computed(mut self) -> Self {
        self.computed = true;
        self.optional = false;
        self
    }

    /// Optional, and kept from state when left out of the configuration
    pub fn optional_computed(mut self) -> Self {
        self.computed = true;
        self.optional = true;
        self
    }

    pub fn force_new(mut self) -> Self {
        self.force_new = true;
        self
    }

    pub fn sensitive(mut self) -> Self {
        self.sensitive = true;
        self
    }

    pub fn default(mut self, value: impl Into<AttrValue>) -> Self {
        self.default = Some(value.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn validate(mut self, validator: ValidateFn) -> Self {
        self.validator = Some(validator);
        self
    }

    pub fn suppress_diff(mut self, suppress: SuppressFn) -> Self {
        self.diff_suppress = Some(suppress);
        self
    }

    fn is_computed_only(&self) -> bool {
        self.computed && !self.optional && !self.required
    }

    fn equivalent(&self, old: &AttrValue, new: &AttrValue) -> bool {
        if old == new || (old.is_zero() && new.is_zero()) {
            return true;
        }
        let scalar = |v: &AttrValue| !matches!(v, AttrValue::List(_) | AttrValue::Map(_));
        match self.diff_suppress {
            Some(suppress) if scalar(old) && scalar(new) => suppress(&old.render(), &new.render()),
            _ => false,
        }
    }
}

// ── Schema ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Schema {
    pub description: String,
    attributes: BTreeMap<String, Attribute>,
}

impl Schema {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            attributes: BTreeMap::new(),
        }
    }

    pub fn attr(mut self, name: impl Into<String>, attribute: Attribute) -> Self {
        self.attributes.insert(name.into(), attribute);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, attribute: Attribute) {
        self.attributes.insert(name.into(), attribute);
    }

    pub fn get(&self, name: &str) -> Option<&Attribute> {
        self.attributes.get(name)
    }

    pub fn attributes(&self) -> impl Iterator<Item = (&str, &Attribute)> {
        self.attributes.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Fill unset attributes that declare a default
    pub fn apply_defaults(&self, values: &mut AttrMap) {
        for (name, attr) in &self.attributes {
            let unset = values.get(name).map_or(true, AttrValue::is_null);
            if unset {
                if let Some(default) = &attr.default {
                    values.insert(name.clone(), default.clone());
                }
            }
            if let (AttrType::Block { schema, .. }, Some(AttrValue::List(blocks))) =
                (&attr.attr_type, values.get_mut(name))
            {
                for block in blocks.iter_mut() {
                    if let AttrValue::Map(inner) = block {
                        schema.apply_defaults(inner);
                    }
                }
            }
        }
    }

    /// Canonical form: sets sorted and deduplicated, nested blocks likewise
    pub fn normalize(&self, values: &mut AttrMap) {
        for (name, attr) in &self.attributes {
            let Some(value) = values.get_mut(name) else {
                continue;
            };
            match (&attr.attr_type, value) {
                (AttrType::StringSet, AttrValue::List(items)) => {
                    items.sort_by_key(AttrValue::render);
                    items.dedup();
                }
                (AttrType::IntSet, AttrValue::List(items)) => {
                    for item in items.iter_mut() {
                        if let Some(n) = item.as_str().and_then(|s| s.trim().parse::<i64>().ok()) {
                            *item = AttrValue::Int(n);
                        }
                    }
                    items.sort_by_key(|v| v.as_int().unwrap_or_default());
                    items.dedup();
                }
                (AttrType::Block { schema, .. }, AttrValue::List(blocks)) => {
                    for block in blocks.iter_mut() {
                        if let AttrValue::Map(inner) = block {
                            schema.normalize(inner);
                        }
                    }
                }
                _ => {}
            }
        }
    }

    /// Check a configuration against the schema
    pub fn validate(&self, config: &AttrMap) -> Diagnostics {
        let mut diags = Diagnostics::new();
        self.validate_at(config, &AttributePath::root(), &mut diags);
        diags
    }

    fn validate_at(&self, config: &AttrMap, base: &AttributePath, diags: &mut Diagnostics) {
        for key in config.keys() {
            if !self.attributes.contains_key(key) {
                diags.push(
                    Diagnostic::error(format!("Unsupported argument \"{}\"", key))
                        .with_detail(format!("An argument named \"{}\" is not expected here.", key))
                        .at(base.with_attribute(key)),
                );
            }
        }

        for (name, attr) in &self.attributes {
            let path = base.with_attribute(name);
            match config.get(name).filter(|v| !v.is_null()) {
                None if attr.required => diags.push(
                    Diagnostic::error(format!("Missing required argument \"{}\"", name))
                        .with_detail(format!(
                            "The argument \"{}\" is required, but no definition was found.",
                            name
                        ))
                        .at(path),
                ),
                None => {}
                Some(_) if attr.is_computed_only() => diags.push(
                    Diagnostic::error(format!("Value for unconfigurable attribute \"{}\"", name))
                        .with_detail(format!("\"{}\" is computed and cannot be set", name))
                        .at(path),
                ),
                Some(value) => {
                    if check_type(&attr.attr_type, value, &path, diags) {
                        if let Some(validator) = attr.validator {
                            diags.extend(validator(value, &path));
                        }
                    }
                }
            }
        }
    }

    /// Changes needed to move `prior` to `config`.
    ///
    /// Both maps are expected to have defaults applied and be normalized. Computed
    /// attributes left out of the configuration keep their prior value, as do attributes
    /// whose difference is suppressed.
    pub fn plan(&self, prior: &AttrMap, config: &AttrMap) -> Plan {
        let mut plan = Plan::default();

        for (name, attr) in &self.attributes {
            let old = prior.get(name).cloned().unwrap_or_default();
            let new = config.get(name).cloned().unwrap_or_default();

            if attr.computed && new.is_null() {
                if !old.is_null() {
                    plan.planned.insert(name.clone(), old);
                }
                continue;
            }

            if attr.equivalent(&old, &new) {
                let kept = if old.is_null() { new } else { old };
                if !kept.is_null() {
                    plan.planned.insert(name.clone(), kept);
                }
                continue;
            }

            if !new.is_null() {
                plan.planned.insert(name.clone(), new.clone());
            }
            plan.changes.push(AttributeChange {
                attribute: name.clone(),
                old,
                new,
                requires_replace: attr.force_new,
            });
        }

        plan
    }
}

/// Returns whether the value has the declared type; pushes a diagnostic otherwise
fn check_type(
    attr_type: &AttrType,
    value: &AttrValue,
    path: &AttributePath,
    diags: &mut Diagnostics,
) -> bool {
    let ok = match (attr_type, value) {
        (AttrType::String, AttrValue::String(_)) => true,
        (AttrType::Bool, AttrValue::Bool(_)) => true,
        (AttrType::Bool, AttrValue::String(s)) => s.parse::<bool>().is_ok(),
        (AttrType::Int, AttrValue::Int(_)) => true,
        (AttrType::Int, AttrValue::String(s)) => s.parse::<i64>().is_ok(),
        (AttrType::StringList | AttrType::StringSet, AttrValue::List(items)) => {
            items.iter().all(|i| matches!(i, AttrValue::String(_)))
        }
        (AttrType::IntSet, AttrValue::List(items)) => items.iter().all(|i| match i {
            AttrValue::Int(_) => true,
            AttrValue::String(s) => s.trim().parse::<i64>().is_ok(),
            _ => false,
        }),
        (AttrType::StringMap, AttrValue::Map(entries)) => {
            entries.values().all(|v| matches!(v, AttrValue::String(_)))
        }
        (AttrType::Block { max_items, schema }, AttrValue::List(blocks)) => {
            if let Some(max) = max_items {
                if blocks.len() > *max {
                    diags.push(
                        Diagnostic::error(format!(
                            "Too many blocks: no more than {} allowed, got {}",
                            max,
                            blocks.len()
                        ))
                        .at(path.clone()),
                    );
                    return false;
                }
            }
            let mut all_maps = true;
            for (i, block) in blocks.iter().enumerate() {
                match block {
                    AttrValue::Map(inner) => schema.validate_at(inner, &path.with_index(i), diags),
                    _ => all_maps = false,
                }
            }
            all_maps
        }
        _ => false,
    };

    if !ok {
        diags.push(
            Diagnostic::error("Incorrect attribute value type")
                .with_detail(format!(
                    "expected {}, got {}",
                    attr_type.name(),
                    value.type_name()
                ))
                .at(path.clone()),
        );
    }
    ok
}

// ── Plans ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AttributeChange {
    pub attribute: String,
    pub old: AttrValue,
    pub new: AttrValue,
    pub requires_replace: bool,
}

/// Planned state plus the attributes that differ from prior state
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Plan {
    pub planned: AttrMap,
    pub changes: Vec<AttributeChange>,
}

impl Plan {
    pub fn has_changes(&self) -> bool {
        !self.changes.is_empty()
    }

    pub fn requires_replace(&self) -> bool {
        self.changes.iter().any(|c| c.requires_replace)
    }

    pub fn change(&self, attribute: &str) -> Option<&AttributeChange> {
        self.changes.iter().find(|c| c.attribute == attribute)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::ip_sets_equivalent;

    fn attrs(pairs: &[(&str, AttrValue)]) -> AttrMap {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    fn rule_schema() -> Schema {
        Schema::new("test")
            .attr("name", Attribute::string().required())
            .attr("port", Attribute::string().default("any"))
            .attr("plugin_id", Attribute::string().required().force_new())
            .attr(
                "host_value",
                Attribute::string().default("").suppress_diff(ip_sets_equivalent),
            )
            .attr("sc_filename", Attribute::string().computed())
            .attr("families", Attribute::string_set())
            .attr(
                "lifetimes",
                Attribute::block(
                    Schema::default()
                        .attr("active_days", Attribute::int())
                        .attr("label", Attribute::string().default("x")),
                    Some(1),
                ),
            )
    }

    #[test]
    fn test_apply_defaults() {
        let schema = rule_schema();
        let mut values = attrs(&[
            ("name", "r".into()),
            ("port", AttrValue::Null),
            (
                "lifetimes",
                AttrValue::List(vec![AttrValue::Map(attrs(&[("active_days", AttrValue::Int(3))]))]),
            ),
        ]);
        schema.apply_defaults(&mut values);
        assert_eq!(values["port"], "any".into());
        assert_eq!(values["host_value"], "".into());
        let block = values["lifetimes"].as_list().unwrap()[0].as_map().unwrap();
        assert_eq!(block["label"], "x".into());
    }

    #[test]
    fn test_validate_required_and_unknown() {
        let diags = rule_schema().validate(&attrs(&[("bogus", "1".into())]));
        let summaries: Vec<_> = diags.iter().map(|d| d.summary.clone()).collect();
        assert!(summaries.iter().any(|s| s.contains("Unsupported argument \"bogus\"")));
        assert!(summaries.iter().any(|s| s.contains("\"name\"")));
        assert!(summaries.iter().any(|s| s.contains("\"plugin_id\"")));
    }

    #[test]
    fn test_validate_types_and_computed() {
        let diags = rule_schema().validate(&attrs(&[
            ("name", AttrValue::Int(1)),
            ("plugin_id", "1".into()),
            ("sc_filename", "x".into()),
        ]));
        assert_eq!(diags.errors().count(), 2);
        let type_error = diags
            .iter()
            .find(|d| d.summary == "Incorrect attribute value type")
            .unwrap();
        assert_eq!(type_error.attribute.as_ref().unwrap().to_string(), "name");
    }

    #[test]
    fn test_validate_block_limits() {
        let block = AttrValue::Map(attrs(&[("active_days", AttrValue::Int(3))]));
        let diags = rule_schema().validate(&attrs(&[
            ("name", "r".into()),
            ("plugin_id", "1".into()),
            ("lifetimes", AttrValue::List(vec![block.clone(), block])),
        ]));
        assert!(diags.has_error());
        assert!(diags.iter().next().unwrap().summary.contains("no more than 1"));
    }

    #[test]
    fn test_nested_errors_carry_index_path() {
        let block = AttrValue::Map(attrs(&[("active_days", "soon".into())]));
        let diags = rule_schema().validate(&attrs(&[
            ("name", "r".into()),
            ("plugin_id", "1".into()),
            ("lifetimes", AttrValue::List(vec![block])),
        ]));
        let path = diags.iter().next().unwrap().attribute.clone().unwrap();
        assert_eq!(path.to_string(), "lifetimes[0].active_days");
    }

    #[test]
    fn test_plan_suppresses_equivalent_ip_sets() {
        let schema = rule_schema();
        let prior = attrs(&[
            ("name", "r".into()),
            ("plugin_id", "1".into()),
            ("host_value", "10.0.0.0/31".into()),
            ("sc_filename", "f.audit".into()),
        ]);
        let config = attrs(&[
            ("name", "r".into()),
            ("plugin_id", "1".into()),
            ("host_value", "10.0.0.1,10.0.0.0".into()),
        ]);
        let plan = schema.plan(&prior, &config);
        assert!(!plan.has_changes());
        assert_eq!(plan.planned["host_value"], "10.0.0.0/31".into());
        assert_eq!(plan.planned["sc_filename"], "f.audit".into());
    }

    #[test]
    fn test_plan_force_new() {
        let schema = rule_schema();
        let prior = attrs(&[("name", "r".into()), ("plugin_id", "1".into())]);
        let config = attrs(&[("name", "r2".into()), ("plugin_id", "2".into())]);
        let plan = schema.plan(&prior, &config);
        assert_eq!(plan.changes.len(), 2);
        assert!(plan.requires_replace());
        assert!(!plan.change("name").unwrap().requires_replace);
    }

    #[test]
    fn test_normalize_sets() {
        let schema = rule_schema();
        let mut values = attrs(&[("families", AttrValue::string_list(["9", "1", "9"]))]);
        schema.normalize(&mut values);
        assert_eq!(values["families"], AttrValue::string_list(["1", "9"]));
    }

    #[test]
    fn test_zero_values_are_equivalent() {
        let schema = rule_schema();
        let prior = attrs(&[("name", "r".into()), ("plugin_id", "1".into()), ("families", AttrValue::List(vec![]))]);
        let config = attrs(&[("name", "r".into()), ("plugin_id", "1".into())]);
        assert!(!schema.plan(&prior, &config).has_changes());
    }
}
