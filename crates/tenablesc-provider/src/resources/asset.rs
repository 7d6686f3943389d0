//! `tenablesc_asset`

use async_trait::async_trait;
use tenablesc_client::{Asset, BaseInfo, ScClient};
use tenablesc_core::{Diagnostics, ResourceData, Result};
use tracing::{debug, trace};

use super::{description_attribute, name_attribute};
use crate::descriptions;
use crate::normalize::case_insensitive_equivalent;
use crate::recovery::recover_not_found;
use crate::resource::Resource;
use crate::schema::{Attribute, Schema};

const TYPE_NAME: &str = "tenablesc_asset";

const DNS_NAME_ASSET: &str = "dnsname";
const STATIC_ASSET: &str = "static";

pub struct AssetResource {
    schema: Schema,
}

impl AssetResource {
    pub fn new() -> Self {
        let schema = Schema::new(descriptions::resource_asset())
            .attr("name", name_attribute(descriptions::ASSET_NAME))
            .attr("description", description_attribute(descriptions::ASSET_DESCRIPTION))
            .attr(
                "type",
                Attribute::string()
                    .required()
                    .force_new()
                    .suppress_diff(case_insensitive_equivalent)
                    .description(descriptions::ASSET_TYPE),
            )
            .attr(
                "values",
                Attribute::string_set().description(descriptions::ASSET_VALUES),
            );
        Self { schema }
    }
}

impl Default for AssetResource {
    fn default() -> Self {
        Self::new()
    }
}

fn build_input(d: &ResourceData) -> Result<Asset> {
    let asset_type = d.get_string("type")?;
    let values = d.get_string_list("values")?;

    let mut asset = Asset {
        base: BaseInfo::named(d.id(), d.get_string("name")?, d.get_string("description")?),
        ..Default::default()
    };
    match asset_type.as_str() {
        DNS_NAME_ASSET => asset.defined_dns_names = values,
        STATIC_ASSET => asset.defined_ips = values,
        _ => {}
    }
    asset.asset_type = asset_type;
    Ok(asset)
}

#[async_trait]
impl Resource for AssetResource {
    fn type_name(&self) -> &'static str {
        TYPE_NAME
    }

    fn schema(&self) -> &Schema {
        &self.schema
    }

    async fn create(&self, client: &dyn ScClient, d: &mut ResourceData) -> Result<Diagnostics> {
        trace!(resource = TYPE_NAME, "start of create");
        let created = client.create(&build_input(d)?).await?;
        debug!(response = ?created, "created asset");
        d.set_id(created.base.id.as_str());
        self.read(client, d).await
    }

    async fn read(&self, client: &dyn ScClient, d: &mut ResourceData) -> Result<Diagnostics> {
        trace!(resource = TYPE_NAME, id = d.id(), "start of read");
        let result = client.get::<Asset>(d.id()).await;
        let Some(asset) = recover_not_found(d, result)? else {
            return Ok(Diagnostics::new());
        };
        debug!(response = ?asset, "read asset");

        d.set("name", asset.base.name);
        d.set("description", asset.base.description);
        match asset.asset_type.as_str() {
            DNS_NAME_ASSET => d.set("values", asset.defined_dns_names),
            STATIC_ASSET => d.set("values", asset.defined_ips),
            _ => {}
        }
        d.set("type", asset.asset_type);
        d.set_id(asset.base.id.as_str());
        Ok(Diagnostics::new())
    }

    async fn update(&self, client: &dyn ScClient, d: &mut ResourceData) -> Result<Diagnostics> {
        trace!(resource = TYPE_NAME, id = d.id(), "start of update");
        let updated = client.update(&build_input(d)?).await?;
        debug!(response = ?updated, "updated asset");
        self.read(client, d).await
    }

    async fn delete(&self, client: &dyn ScClient, d: &mut ResourceData) -> Result<Diagnostics> {
        trace!(resource = TYPE_NAME, id = d.id(), "start of delete");
        let result = client.delete::<Asset>(d.id()).await;
        recover_not_found(d, result)?;
        Ok(Diagnostics::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::testing::planned;
    use serde_json::json;
    use tenablesc_client::InMemoryClient;

    #[tokio::test]
    async fn test_static_asset_uses_defined_ips() {
        let sc = InMemoryClient::new();
        let resource = AssetResource::new();
        let mut d = planned(
            &resource,
            json!({"name": "web", "type": "static", "values": ["10.0.0.2", "10.0.0.1"]}),
        );
        resource.create(&sc, &mut d).await.unwrap();

        let stored = sc.record("asset", d.id()).unwrap();
        assert_eq!(stored["definedIPs"], "10.0.0.1,10.0.0.2");
        assert!(stored.get("definedDNSNames").is_none());
        assert_eq!(stored["description"], "Managed by Terraform");
        assert_eq!(
            d.get_string_list("values").unwrap(),
            vec!["10.0.0.1", "10.0.0.2"]
        );
    }

    #[tokio::test]
    async fn test_dns_asset_uses_defined_names() {
        let sc = InMemoryClient::new();
        let resource = AssetResource::new();
        let mut d = planned(
            &resource,
            json!({"name": "hosts", "type": "dnsname", "values": ["a.example.com"]}),
        );
        resource.create(&sc, &mut d).await.unwrap();

        let stored = sc.record("asset", d.id()).unwrap();
        assert_eq!(stored["definedDNSNames"], "a.example.com");
        assert_eq!(d.get_string("type").unwrap(), "dnsname");
    }

    #[tokio::test]
    async fn test_update_sends_description() {
        let sc = InMemoryClient::new();
        let resource = AssetResource::new();
        let mut d = planned(&resource, json!({"name": "web", "type": "static"}));
        resource.create(&sc, &mut d).await.unwrap();

        d.set("description", "frontends");
        resource.update(&sc, &mut d).await.unwrap();
        assert_eq!(sc.record("asset", d.id()).unwrap()["description"], "frontends");
        assert_eq!(d.get_string("description").unwrap(), "frontends");
    }

    #[test]
    fn test_type_change_forces_replacement() {
        let resource = AssetResource::new();
        let prior = crate::resources::testing::prepared(&resource, json!({"name": "a", "type": "static"}));
        let config = crate::resources::testing::prepared(&resource, json!({"name": "a", "type": "dnsname"}));
        assert!(resource.schema().plan(&prior, &config).requires_replace());

        let config = crate::resources::testing::prepared(&resource, json!({"name": "a", "type": "STATIC"}));
        assert!(!resource.schema().plan(&prior, &config).has_changes());
    }
}
