//! `tenablesc_credential` data source

use async_trait::async_trait;
use tenablesc_client::{Credential, ScClient};
use tenablesc_core::{Diagnostics, ResourceData, Result};
use tracing::debug;

use super::by_name_schema;
use crate::descriptions;
use crate::resource::DataSource;
use crate::schema::{Attribute, Schema};

const TYPE_NAME: &str = "tenablesc_credential";

pub struct CredentialDataSource {
    schema: Schema,
}

impl CredentialDataSource {
    pub fn new() -> Self {
        let schema = by_name_schema(descriptions::DATA_SOURCE_CREDENTIAL, "credential").attr(
            "type",
            Attribute::string()
                .computed()
                .description(descriptions::CREDENTIAL_TYPE),
        );
        Self { schema }
    }
}

impl Default for CredentialDataSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DataSource for CredentialDataSource {
    fn type_name(&self) -> &'static str {
        TYPE_NAME
    }

    fn schema(&self) -> &Schema {
        &self.schema
    }

    async fn read(&self, client: &dyn ScClient, d: &mut ResourceData) -> Result<Diagnostics> {
        let name = d.get_string("name")?;
        debug!(name = %name, "looking up credential");

        let credentials = client.list::<Credential>().await?;
        match credentials.into_iter().find(|c| c.base.name == name) {
            Some(credential) => {
                d.set_id(credential.base.id.as_str());
                d.set("type", credential.credential_type);
                Ok(Diagnostics::new())
            }
            None => Ok(Diagnostics::error(format!(
                "No credential with name [{}] found",
                name
            ))),
        }
    }
}
