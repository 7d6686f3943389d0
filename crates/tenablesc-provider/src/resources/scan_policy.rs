//! `tenablesc_scan_policy`
//!
//! Preferences are a flat string map in configuration; upstream accepts strings and
//! string arrays. Keys dropped from configuration are sent as `removePrefs` because a
//! PATCH merges preferences rather than replacing them.

use async_trait::async_trait;
use tenablesc_client::{BaseInfo, ScClient, ScanPolicy, ScanPolicyFamily};
use tenablesc_core::data::string_map_of;
use tenablesc_core::{Diagnostics, ResourceData, Result};
use tracing::{debug, trace};

use super::{description_attribute, name_attribute, reference, reference_id};
use crate::descriptions;
use crate::preferences::{marshal_preferences, removed_keys, unmarshal_preferences};
use crate::recovery::recover_not_found;
use crate::resource::Resource;
use crate::schema::{Attribute, Schema};

const TYPE_NAME: &str = "tenablesc_scan_policy";

pub struct ScanPolicyResource {
    schema: Schema,
}

impl ScanPolicyResource {
    pub fn new() -> Self {
        let schema = Schema::new(descriptions::resource_scan_policy())
            .attr("name", name_attribute(descriptions::SCAN_POLICY_NAME))
            .attr(
                "description",
                description_attribute(descriptions::SCAN_POLICY_DESCRIPTION),
            )
            .attr(
                "policy_template_id",
                Attribute::string()
                    .required()
                    .description(descriptions::SCAN_POLICY_TEMPLATE_ID),
            )
            .attr(
                "audit_file_id",
                Attribute::string()
                    .default("")
                    .description(descriptions::AUDIT_FILE_ID),
            )
            .attr(
                "preferences",
                Attribute::string_map().description(descriptions::SCAN_POLICY_PREFERENCES),
            )
            .attr(
                "families",
                Attribute::string_set().description(descriptions::SCAN_POLICY_FAMILIES),
            )
            .attr(
                "tag",
                Attribute::string()
                    .default("")
                    .description(descriptions::SCAN_POLICY_TAG),
            );
        Self { schema }
    }
}

impl Default for ScanPolicyResource {
    fn default() -> Self {
        Self::new()
    }
}

fn build_input(d: &ResourceData) -> Result<ScanPolicy> {
    let (old, new) = d.get_change("preferences");
    let old_preferences = string_map_of("preferences", old)?;
    let new_preferences = string_map_of("preferences", new)?;
    let audit_file_id = d.get_string("audit_file_id")?;

    Ok(ScanPolicy {
        base: BaseInfo::named(d.id(), d.get_string("name")?, d.get_string("description")?),
        tags: d.get_string("tag")?,
        policy_template: reference(&d.get_string("policy_template_id")?),
        preferences: unmarshal_preferences(&new_preferences),
        remove_prefs: removed_keys(&old_preferences, &new_preferences),
        families: d
            .get_string_list("families")?
            .into_iter()
            .map(|id| ScanPolicyFamily {
                id: id.into(),
                ..Default::default()
            })
            .collect(),
        audit_files: reference(&audit_file_id).into_iter().collect(),
    })
}

#[async_trait]
impl Resource for ScanPolicyResource {
    fn type_name(&self) -> &'static str {
        TYPE_NAME
    }

    fn schema(&self) -> &Schema {
        &self.schema
    }

    async fn create(&self, client: &dyn ScClient, d: &mut ResourceData) -> Result<Diagnostics> {
        trace!(resource = TYPE_NAME, "start of create");
        let created = client.create(&build_input(d)?).await?;
        debug!(response = ?created, "created scan policy");
        d.set_id(created.base.id.as_str());
        self.read(client, d).await
    }

    async fn read(&self, client: &dyn ScClient, d: &mut ResourceData) -> Result<Diagnostics> {
        trace!(resource = TYPE_NAME, id = d.id(), "start of read");
        let result = client.get::<ScanPolicy>(d.id()).await;
        let Some(policy) = recover_not_found(d, result)? else {
            return Ok(Diagnostics::new());
        };
        debug!(response = ?policy, "read scan policy");

        let preferences = marshal_preferences(&policy.preferences)?;
        d.set("preferences", preferences);

        let families: Vec<String> = policy
            .families
            .iter()
            .map(|family| family.id.as_str().to_string())
            .collect();
        d.set("families", families);

        let audit_file_id = policy
            .audit_files
            .first()
            .map(|audit_file| audit_file.id.as_str().to_string())
            .unwrap_or_default();
        d.set("audit_file_id", audit_file_id);

        if policy.policy_template.is_some() {
            d.set("policy_template_id", reference_id(&policy.policy_template));
        }
        d.set("tag", policy.tags);
        d.set("name", policy.base.name);
        d.set("description", policy.base.description);
        d.set_id(policy.base.id.as_str());
        Ok(Diagnostics::new())
    }

    async fn update(&self, client: &dyn ScClient, d: &mut ResourceData) -> Result<Diagnostics> {
        trace!(resource = TYPE_NAME, id = d.id(), "start of update");
        let policy = build_input(d)?;
        if !policy.remove_prefs.is_empty() {
            debug!(keys = ?policy.remove_prefs, "removing scan policy preferences");
        }
        let updated = client.update(&policy).await?;
        debug!(response = ?updated, "updated scan policy");
        self.read(client, d).await
    }

    async fn delete(&self, client: &dyn ScClient, d: &mut ResourceData) -> Result<Diagnostics> {
        trace!(resource = TYPE_NAME, id = d.id(), "start of delete");
        let result = client.delete::<ScanPolicy>(d.id()).await;
        recover_not_found(d, result)?;
        Ok(Diagnostics::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::testing::{planned, prepared};
    use serde_json::json;
    use std::collections::BTreeMap;
    use tenablesc_client::InMemoryClient;

    #[tokio::test]
    async fn test_create_sends_typed_preferences() {
        let sc = InMemoryClient::new();
        let resource = ScanPolicyResource::new();
        let mut d = planned(
            &resource,
            json!({
                "name": "baseline",
                "policy_template_id": "1",
                "preferences": {"port_range": "default", "ports": "[\"22\",\"443\"]"},
                "families": ["20", "10"]
            }),
        );
        resource.create(&sc, &mut d).await.unwrap();

        let stored = sc.record("policy", d.id()).unwrap();
        assert_eq!(stored["policyTemplate"]["id"], "1");
        assert_eq!(stored["preferences"]["port_range"], "default");
        assert_eq!(stored["preferences"]["ports"], json!(["22", "443"]));
        assert_eq!(stored["families"], json!([{"id": "10"}, {"id": "20"}]));
        assert!(stored.get("auditFiles").is_none());
        assert!(stored.get("removePrefs").is_none());

        let preferences = d.get_string_map("preferences").unwrap();
        assert_eq!(preferences["ports"], "[\"22\",\"443\"]");
        assert_eq!(d.get_string_list("families").unwrap(), vec!["10", "20"]);
        assert_eq!(d.get_string("audit_file_id").unwrap(), "");
    }

    #[tokio::test]
    async fn test_update_removes_dropped_preferences() {
        let sc = InMemoryClient::new();
        let resource = ScanPolicyResource::new();
        let config = json!({
            "name": "baseline",
            "policy_template_id": "1",
            "preferences": {"a": "1", "b": "2"}
        });
        let mut d = planned(&resource, config);
        resource.create(&sc, &mut d).await.unwrap();
        let (id, prior) = d.into_state();

        let planned_values = prepared(
            &resource,
            json!({"name": "baseline", "policy_template_id": "1", "preferences": {"a": "1"}}),
        );
        let mut d = ResourceData::for_update(id.clone(), prior, planned_values);
        assert_eq!(build_input(&d).unwrap().remove_prefs, vec!["b"]);

        resource.update(&sc, &mut d).await.unwrap();
        let stored = sc.record("policy", &id).unwrap();
        let expected: BTreeMap<String, String> = [("a".to_string(), "1".to_string())].into();
        assert_eq!(d.get_string_map("preferences").unwrap(), expected);
        assert!(stored["preferences"].get("b").is_none());
    }

    #[tokio::test]
    async fn test_audit_file_and_tag_round_trip() {
        let sc = InMemoryClient::new();
        let resource = ScanPolicyResource::new();
        let mut d = planned(
            &resource,
            json!({"name": "p", "policy_template_id": "3", "audit_file_id": "9", "tag": "cis"}),
        );
        resource.create(&sc, &mut d).await.unwrap();

        let stored = sc.record("policy", d.id()).unwrap();
        assert_eq!(stored["auditFiles"], json!([{"id": "9"}]));
        assert_eq!(stored["tags"], "cis");
        assert_eq!(d.get_string("audit_file_id").unwrap(), "9");
        assert_eq!(d.get_string("tag").unwrap(), "cis");
        assert_eq!(d.get_string("policy_template_id").unwrap(), "3");
    }
}
