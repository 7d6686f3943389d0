//! `tenablesc_asset` data source

use async_trait::async_trait;
use tenablesc_client::{Asset, ScClient};
use tenablesc_core::{Diagnostics, ResourceData, Result};
use tracing::{debug, trace};

use super::by_name_schema;
use crate::descriptions;
use crate::resource::DataSource;
use crate::schema::{Attribute, Schema};

const TYPE_NAME: &str = "tenablesc_asset";

pub struct AssetDataSource {
    schema: Schema,
}

impl AssetDataSource {
    pub fn new() -> Self {
        let schema = by_name_schema(descriptions::data_source_asset(), "asset")
            .attr(
                "defined_dns_names",
                Attribute::string_list()
                    .computed()
                    .description(descriptions::ASSET_DEFINED_DNS_NAMES),
            )
            .attr(
                "defined_ips",
                Attribute::string_list()
                    .computed()
                    .description(descriptions::ASSET_DEFINED_IPS),
            );
        Self { schema }
    }
}

impl Default for AssetDataSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DataSource for AssetDataSource {
    fn type_name(&self) -> &'static str {
        TYPE_NAME
    }

    fn schema(&self) -> &Schema {
        &self.schema
    }

    async fn read(&self, client: &dyn ScClient, d: &mut ResourceData) -> Result<Diagnostics> {
        let name = d.get_string("name")?;
        debug!(name = %name, "looking up asset");

        let assets = client.list::<Asset>().await?;
        for asset in assets {
            trace!(asset = ?asset, "comparing asset");
            if asset.base.name == name {
                d.set_id(asset.base.id.as_str());
                d.set("defined_dns_names", asset.defined_dns_names);
                d.set("defined_ips", asset.defined_ips);
                return Ok(Diagnostics::new());
            }
        }

        Ok(Diagnostics::error(format!("No asset with name [{}] found", name)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_sources::testing::configured;
    use serde_json::json;
    use tenablesc_client::InMemoryClient;

    #[tokio::test]
    async fn test_found_by_exact_name() {
        let sc = InMemoryClient::new();
        sc.seed("asset", json!({"name": "web-prod", "type": "static", "definedIPs": "10.0.0.1,10.0.0.2"}));
        let id = sc.seed("asset", json!({"name": "web", "type": "dnsname", "definedDNSNames": "a.example.com"}));

        let source = AssetDataSource::new();
        let mut d = configured(&source, json!({"name": "web"}));
        let diags = source.read(&sc, &mut d).await.unwrap();

        assert!(diags.is_empty());
        assert_eq!(d.id(), id);
        assert_eq!(d.get_string_list("defined_dns_names").unwrap(), vec!["a.example.com"]);
        assert!(d.get_string_list("defined_ips").unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_missing_asset_reports_error() {
        let sc = InMemoryClient::new();
        let source = AssetDataSource::new();
        let mut d = configured(&source, json!({"name": "nope"}));
        let diags = source.read(&sc, &mut d).await.unwrap();

        assert!(diags.has_error());
        assert_eq!(diags.iter().next().unwrap().summary, "No asset with name [nope] found");
        assert!(d.is_absent());
    }
}
