//! `tenablesc_assets` data source

use async_trait::async_trait;
use tenablesc_client::{Asset, ScClient};
use tenablesc_core::{Diagnostics, ResourceData, Result};
use tracing::debug;

use super::{filtered_schema, read_filtered};
use crate::descriptions;
use crate::resource::DataSource;
use crate::schema::Schema;

const TYPE_NAME: &str = "tenablesc_assets";

pub struct AssetsDataSource {
    schema: Schema,
}

impl AssetsDataSource {
    pub fn new() -> Self {
        Self {
            schema: filtered_schema(descriptions::data_source_assets(), "asset", "assets"),
        }
    }
}

impl Default for AssetsDataSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DataSource for AssetsDataSource {
    fn type_name(&self) -> &'static str {
        TYPE_NAME
    }

    fn schema(&self) -> &Schema {
        &self.schema
    }

    async fn read(&self, client: &dyn ScClient, d: &mut ResourceData) -> Result<Diagnostics> {
        debug!("looking up all assets");
        let assets = client.list::<Asset>().await?;
        read_filtered(
            d,
            "assets",
            assets
                .into_iter()
                .map(|asset| (asset.base.id.into_string(), asset.base.name)),
        )
    }
}
