//! `tenablesc_plugin` data source

use async_trait::async_trait;
use tenablesc_client::ScClient;
use tenablesc_core::{Diagnostics, ResourceData, Result};
use tracing::debug;

use super::by_name_schema;
use crate::descriptions;
use crate::resource::DataSource;
use crate::schema::Schema;

const TYPE_NAME: &str = "tenablesc_plugin";

pub struct PluginDataSource {
    schema: Schema,
}

impl PluginDataSource {
    pub fn new() -> Self {
        Self {
            schema: by_name_schema(descriptions::DATA_SOURCE_PLUGIN, "plugin"),
        }
    }
}

impl Default for PluginDataSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DataSource for PluginDataSource {
    fn type_name(&self) -> &'static str {
        TYPE_NAME
    }

    fn schema(&self) -> &Schema {
        &self.schema
    }

    async fn read(&self, client: &dyn ScClient, d: &mut ResourceData) -> Result<Diagnostics> {
        let name = d.get_string("name")?;
        debug!(name = %name, "looking up plugin");

        let plugins = match client.plugins_by_name(&name).await {
            Ok(plugins) => plugins,
            Err(e) => {
                return Ok(Diagnostics::error(format!(
                    "plugin datasource lookup failed: {}",
                    e
                )))
            }
        };

        match plugins.as_slice() {
            [] => Ok(Diagnostics::error(format!(
                "no Plugin found with name: {}",
                name
            ))),
            [plugin] => {
                d.set_id(plugin.id.as_str());
                Ok(Diagnostics::new())
            }
            many => Ok(Diagnostics::error(format!(
                "got ambiguous result, {} plugins for name {}",
                many.len(),
                name
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_sources::testing::configured;
    use serde_json::json;
    use tenablesc_client::InMemoryClient;

    fn summary(diags: &Diagnostics) -> String {
        diags.iter().next().unwrap().summary.clone()
    }

    #[tokio::test]
    async fn test_single_match() {
        let sc = InMemoryClient::new();
        let id = sc.seed("plugin", json!({"name": "SSL Certificate Expiry"}));
        sc.seed("plugin", json!({"name": "SSL Certificate Expiry - Future"}));

        let source = PluginDataSource::new();
        let mut d = configured(&source, json!({"name": "SSL Certificate Expiry"}));
        assert!(source.read(&sc, &mut d).await.unwrap().is_empty());
        assert_eq!(d.id(), id);
    }

    #[tokio::test]
    async fn test_none_and_ambiguous() {
        let sc = InMemoryClient::new();
        sc.seed("plugin", json!({"name": "dup"}));
        sc.seed("plugin", json!({"name": "dup"}));
        let source = PluginDataSource::new();

        let mut d = configured(&source, json!({"name": "missing"}));
        let diags = source.read(&sc, &mut d).await.unwrap();
        assert_eq!(summary(&diags), "no Plugin found with name: missing");

        let mut d = configured(&source, json!({"name": "dup"}));
        let diags = source.read(&sc, &mut d).await.unwrap();
        assert_eq!(summary(&diags), "got ambiguous result, 2 plugins for name dup");
        assert!(d.is_absent());
    }

    #[tokio::test]
    async fn test_lookup_failure_is_wrapped() {
        let sc = InMemoryClient::new();
        sc.fail_next("feed not loaded");
        let source = PluginDataSource::new();
        let mut d = configured(&source, json!({"name": "x"}));
        let diags = source.read(&sc, &mut d).await.unwrap();
        assert!(summary(&diags).starts_with("plugin datasource lookup failed: "));
        assert!(summary(&diags).contains("feed not loaded"));
    }
}
