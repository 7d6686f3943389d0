//! `tenablesc_scan_policy_template` data source

use async_trait::async_trait;
use tenablesc_client::{PolicyTemplate, ScClient};
use tenablesc_core::{Diagnostics, ResourceData, Result};
use tracing::debug;

use super::by_name_schema;
use crate::descriptions;
use crate::resource::DataSource;
use crate::schema::Schema;

const TYPE_NAME: &str = "tenablesc_scan_policy_template";

pub struct ScanPolicyTemplateDataSource {
    schema: Schema,
}

impl ScanPolicyTemplateDataSource {
    pub fn new() -> Self {
        Self {
            schema: by_name_schema(
                descriptions::DATA_SOURCE_SCAN_POLICY_TEMPLATE,
                "scan policy template",
            ),
        }
    }
}

impl Default for ScanPolicyTemplateDataSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DataSource for ScanPolicyTemplateDataSource {
    fn type_name(&self) -> &'static str {
        TYPE_NAME
    }

    fn schema(&self) -> &Schema {
        &self.schema
    }

    async fn read(&self, client: &dyn ScClient, d: &mut ResourceData) -> Result<Diagnostics> {
        let name = d.get_string("name")?;
        debug!(name = %name, "looking up scan policy template");

        let templates = client.list::<PolicyTemplate>().await?;
        match templates.into_iter().find(|t| t.base.name == name) {
            Some(template) => {
                d.set_id(template.base.id.as_str());
                Ok(Diagnostics::new())
            }
            None => Ok(Diagnostics::error(format!(
                "No scan policy template with name [{}] found",
                name
            ))),
        }
    }
}
