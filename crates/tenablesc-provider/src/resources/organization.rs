//! `tenablesc_organization`

use async_trait::async_trait;
use tenablesc_client::{BaseInfo, Organization, ScClient};
use tenablesc_core::{Diagnostics, ResourceData, Result};
use tracing::{debug, trace};

use super::{description_attribute, name_attribute, reference_ids, references};
use crate::descriptions;
use crate::recovery::recover_not_found;
use crate::resource::Resource;
use crate::schema::{Attribute, Schema};
use crate::validate::{validate_zone_selection_attr, ZoneSelection};

const TYPE_NAME: &str = "tenablesc_organization";

/// Only scoring system the provider manages
const VULN_SCORING_SYSTEM: &str = "CVSSv3";

pub struct OrganizationResource {
    schema: Schema,
}

impl OrganizationResource {
    pub fn new() -> Self {
        let schema = Schema::new(descriptions::resource_organization())
            .attr("name", name_attribute(descriptions::ORGANIZATION_NAME))
            .attr(
                "description",
                description_attribute(descriptions::ORGANIZATION_DESCRIPTION),
            )
            .attr(
                "zone_selection",
                Attribute::string()
                    .default(ZoneSelection::AutoOnly.as_str())
                    .validate(validate_zone_selection_attr)
                    .description(descriptions::ORGANIZATION_ZONE_SELECTION),
            )
            .attr(
                "scan_zone_ids",
                Attribute::string_set().description(descriptions::ORGANIZATION_SCAN_ZONE_IDS),
            )
            .attr(
                "restricted_ips",
                Attribute::string_set().description(descriptions::ORGANIZATION_RESTRICTED_IPS),
            );
        Self { schema }
    }
}

impl Default for OrganizationResource {
    fn default() -> Self {
        Self::new()
    }
}

/// Typed request body; zone rules are checked before anything is sent.
///
/// Zones and restricted IPs are always sent so that emptying them clears them upstream.
fn build_input(d: &ResourceData) -> Result<Organization> {
    let zone_selection: ZoneSelection = d.get_string("zone_selection")?.parse()?;
    let zone_ids = d.get_string_list("scan_zone_ids")?;
    zone_selection.check_zone_count(zone_ids.len())?;

    Ok(Organization {
        base: BaseInfo::named(d.id(), d.get_string("name")?, d.get_string("description")?),
        zone_selection: zone_selection.to_string(),
        restricted_ips: Some(d.get_string_list("restricted_ips")?.join(",")),
        vuln_scoring_system: VULN_SCORING_SYSTEM.to_string(),
        zones: Some(references(&zone_ids)),
    })
}

fn split_restricted_ips(restricted: &str) -> Vec<String> {
    restricted
        .split(',')
        .map(str::trim)
        .filter(|ip| !ip.is_empty())
        .map(String::from)
        .collect()
}

#[async_trait]
impl Resource for OrganizationResource {
    fn type_name(&self) -> &'static str {
        TYPE_NAME
    }

    fn schema(&self) -> &Schema {
        &self.schema
    }

    async fn create(&self, client: &dyn ScClient, d: &mut ResourceData) -> Result<Diagnostics> {
        trace!(resource = TYPE_NAME, "start of create");
        let organization = build_input(d)?;
        let created = client.create(&organization).await?;
        debug!(response = ?created, "created organization");
        d.set_id(created.base.id.as_str());
        self.read(client, d).await
    }

    async fn read(&self, client: &dyn ScClient, d: &mut ResourceData) -> Result<Diagnostics> {
        trace!(resource = TYPE_NAME, id = d.id(), "start of read");
        let result = client.get::<Organization>(d.id()).await;
        let Some(organization) = recover_not_found(d, result)? else {
            return Ok(Diagnostics::new());
        };
        debug!(response = ?organization, "read organization");

        d.set("name", organization.base.name);
        d.set("description", organization.base.description);
        d.set("zone_selection", organization.zone_selection);
        d.set(
            "restricted_ips",
            split_restricted_ips(organization.restricted_ips.as_deref().unwrap_or_default()),
        );
        d.set(
            "scan_zone_ids",
            reference_ids(organization.zones.as_deref().unwrap_or_default()),
        );
        d.set_id(organization.base.id.as_str());
        Ok(Diagnostics::new())
    }

    async fn update(&self, client: &dyn ScClient, d: &mut ResourceData) -> Result<Diagnostics> {
        trace!(resource = TYPE_NAME, id = d.id(), "start of update");
        let organization = build_input(d)?;
        let updated = client.update(&organization).await?;
        debug!(response = ?updated, "updated organization");
        self.read(client, d).await
    }

    async fn delete(&self, client: &dyn ScClient, d: &mut ResourceData) -> Result<Diagnostics> {
        trace!(resource = TYPE_NAME, id = d.id(), "start of delete");
        let result = client.delete::<Organization>(d.id()).await;
        recover_not_found(d, result)?;
        Ok(Diagnostics::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::Provider;
    use crate::resources::testing::{planned, prepared};
    use serde_json::json;
    use std::sync::Arc;
    use tenablesc_client::InMemoryClient;
    use tenablesc_core::AttrMap;

    #[tokio::test]
    async fn test_create_with_defaults() {
        let sc = InMemoryClient::new();
        let resource = OrganizationResource::new();
        let mut d = planned(
            &resource,
            json!({"name": "Acme", "restricted_ips": ["10.1.0.0/16", "10.0.0.0/16"]}),
        );
        resource.create(&sc, &mut d).await.unwrap();

        let stored = sc.record("organization", d.id()).unwrap();
        assert_eq!(stored["zoneSelection"], "auto_only");
        assert_eq!(stored["vulnScoringSystem"], "CVSSv3");
        assert_eq!(stored["restrictedIPs"], "10.0.0.0/16,10.1.0.0/16");
        assert_eq!(stored["zones"], json!([]));

        assert_eq!(
            d.get_string_list("restricted_ips").unwrap(),
            vec!["10.0.0.0/16", "10.1.0.0/16"]
        );
    }

    #[tokio::test]
    async fn test_selectable_with_zones() {
        let sc = InMemoryClient::new();
        let resource = OrganizationResource::new();
        let mut d = planned(
            &resource,
            json!({"name": "Acme", "zone_selection": "selectable", "scan_zone_ids": ["3", "4"]}),
        );
        resource.create(&sc, &mut d).await.unwrap();

        let stored = sc.record("organization", d.id()).unwrap();
        assert_eq!(stored["zones"], json!([{"id": "3"}, {"id": "4"}]));
        assert_eq!(d.get_string_list("scan_zone_ids").unwrap(), vec!["3", "4"]);
    }

    #[tokio::test]
    async fn test_zone_rules_checked_before_network() {
        let sc = InMemoryClient::new();
        let resource = OrganizationResource::new();

        let mut d = planned(&resource, json!({"name": "Acme", "scan_zone_ids": ["3"]}));
        let err = resource.create(&sc, &mut d).await.unwrap_err();
        assert!(err.to_string().contains("requires zones not be specified"));

        let mut d = planned(&resource, json!({"name": "Acme", "zone_selection": "selectable"}));
        let err = resource.create(&sc, &mut d).await.unwrap_err();
        assert!(err.to_string().contains("requires at least one zone"));

        let mut d = planned(
            &resource,
            json!({"name": "Acme", "zone_selection": "locked", "scan_zone_ids": ["1", "2"]}),
        );
        assert!(resource.create(&sc, &mut d).await.is_err());
        assert!(sc.calls().is_empty());
    }

    #[test]
    fn test_invalid_zone_selection_is_a_validation_error() {
        let resource = OrganizationResource::new();
        let diags = resource
            .schema()
            .validate(&prepared(&resource, json!({"name": "a", "zone_selection": "manual"})));
        assert!(diags.has_error());
        let diag = diags.iter().next().unwrap();
        assert!(diag.summary.contains("manual is not a valid zone selector"));
        assert_eq!(diag.attribute.as_ref().unwrap().to_string(), "zone_selection");
    }

    #[tokio::test]
    async fn test_switch_to_auto_only_clears_zones_and_ips() {
        let sc = Arc::new(InMemoryClient::new());
        let provider = Provider::with_client(sc.clone());
        let attrs = |value| serde_json::from_value::<AttrMap>(value).unwrap();

        let config = attrs(json!({
            "name": "Acme",
            "zone_selection": "selectable",
            "scan_zone_ids": ["3"],
            "restricted_ips": ["10.0.0.1"],
        }));
        let plan = provider.plan_resource(TYPE_NAME, None, &config).unwrap();
        let state = provider.create(TYPE_NAME, plan.planned).await.state.unwrap();

        let config = attrs(json!({"name": "Acme", "zone_selection": "auto_only"}));
        let plan = provider
            .plan_resource(TYPE_NAME, Some(&state), &config)
            .unwrap();
        assert!(plan.change("scan_zone_ids").is_some());
        assert!(!plan.planned.contains_key("scan_zone_ids"));

        let outcome = provider.update(TYPE_NAME, state, plan.planned).await;
        assert!(outcome.diagnostics.is_empty());
        let state = outcome.state.unwrap();

        let stored = sc.record("organization", &state.id).unwrap();
        assert_eq!(stored["zoneSelection"], "auto_only");
        assert_eq!(stored["zones"], json!([]));
        assert_eq!(stored["restrictedIPs"], "");

        let plan = provider
            .plan_resource(TYPE_NAME, Some(&state), &config)
            .unwrap();
        assert!(!plan.has_changes());
    }

    #[test]
    fn test_split_restricted_ips() {
        assert_eq!(
            split_restricted_ips("10.0.0.1, 10.0.0.2,"),
            vec!["10.0.0.1", "10.0.0.2"]
        );
        assert!(split_restricted_ips("").is_empty());
    }
}
