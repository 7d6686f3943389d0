//! `tenablesc_repository` data source

use async_trait::async_trait;
use tenablesc_client::{Repository, ScClient};
use tenablesc_core::{Diagnostics, ResourceData, Result};
use tracing::debug;

use super::by_name_schema;
use crate::descriptions;
use crate::resource::DataSource;
use crate::schema::Schema;

const TYPE_NAME: &str = "tenablesc_repository";

pub struct RepositoryDataSource {
    schema: Schema,
}

impl RepositoryDataSource {
    pub fn new() -> Self {
        Self {
            schema: by_name_schema(descriptions::DATA_SOURCE_REPOSITORY, "repository"),
        }
    }
}

impl Default for RepositoryDataSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DataSource for RepositoryDataSource {
    fn type_name(&self) -> &'static str {
        TYPE_NAME
    }

    fn schema(&self) -> &Schema {
        &self.schema
    }

    async fn read(&self, client: &dyn ScClient, d: &mut ResourceData) -> Result<Diagnostics> {
        let name = d.get_string("name")?;
        debug!(name = %name, "looking up repository");

        let repositories = client.list::<Repository>().await?;
        match repositories.into_iter().find(|r| r.base.name == name) {
            Some(repository) => {
                d.set_id(repository.base.id.as_str());
                Ok(Diagnostics::new())
            }
            None => Ok(Diagnostics::error(format!(
                "No repository found with name like [{}]",
                name
            ))),
        }
    }
}
