//! `tenablesc_repositories` data source

use async_trait::async_trait;
use tenablesc_client::{Repository, ScClient};
use tenablesc_core::{Diagnostics, ResourceData, Result};
use tracing::debug;

use super::{filtered_schema, read_filtered};
use crate::descriptions;
use crate::resource::DataSource;
use crate::schema::Schema;

const TYPE_NAME: &str = "tenablesc_repositories";

pub struct RepositoriesDataSource {
    schema: Schema,
}

impl RepositoriesDataSource {
    pub fn new() -> Self {
        Self {
            schema: filtered_schema(
                descriptions::DATA_SOURCE_REPOSITORIES,
                "repository",
                "repositories",
            ),
        }
    }
}

impl Default for RepositoriesDataSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DataSource for RepositoriesDataSource {
    fn type_name(&self) -> &'static str {
        TYPE_NAME
    }

    fn schema(&self) -> &Schema {
        &self.schema
    }

    async fn read(&self, client: &dyn ScClient, d: &mut ResourceData) -> Result<Diagnostics> {
        debug!("looking up all repositories");
        let repositories = client.list::<Repository>().await?;
        read_filtered(
            d,
            "repositories",
            repositories
                .into_iter()
                .map(|repository| (repository.base.id.into_string(), repository.base.name)),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_sources::testing::configured;
    use serde_json::json;
    use tenablesc_client::InMemoryClient;

    #[tokio::test]
    async fn test_no_match_reports_anchored_filter() {
        let sc = InMemoryClient::new();
        sc.seed("repository", json!({"name": "main"}));

        let source = RepositoriesDataSource::new();
        let mut d = configured(&source, json!({"name_filter": "ma"}));
        let diags = source.read(&sc, &mut d).await.unwrap();

        assert_eq!(
            diags.iter().next().unwrap().summary,
            "no repositories matching filter '^ma$'"
        );
        assert_eq!(d.id(), "repositories:ma");
    }

    #[tokio::test]
    async fn test_default_filter_returns_all() {
        let sc = InMemoryClient::new();
        sc.seed("repository", json!({"name": "main"}));
        sc.seed("repository", json!({"name": "archive"}));

        let source = RepositoriesDataSource::new();
        let mut d = configured(&source, json!({}));
        assert!(source.read(&sc, &mut d).await.unwrap().is_empty());
        assert_eq!(d.get_string_map("repositories").unwrap().len(), 2);
    }
}
