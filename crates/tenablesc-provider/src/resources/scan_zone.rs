//! `tenablesc_scan_zone`

use async_trait::async_trait;
use tenablesc_client::{BaseInfo, ScClient, ScanZone};
use tenablesc_core::{Diagnostics, ResourceData, Result};
use tracing::{debug, trace};

use super::{description_attribute, name_attribute};
use crate::descriptions;
use crate::recovery::recover_not_found;
use crate::resource::Resource;
use crate::schema::{Attribute, Schema};

const TYPE_NAME: &str = "tenablesc_scan_zone";

pub struct ScanZoneResource {
    schema: Schema,
}

impl ScanZoneResource {
    pub fn new() -> Self {
        let schema = Schema::new(descriptions::resource_scan_zone())
            .attr("name", name_attribute(descriptions::SCAN_ZONE_NAME))
            .attr(
                "description",
                description_attribute(descriptions::SCAN_ZONE_DESCRIPTION),
            )
            .attr(
                "zone_cidrs",
                Attribute::string_set()
                    .required()
                    .description(descriptions::SCAN_ZONE_CIDRS),
            );
        Self { schema }
    }
}

impl Default for ScanZoneResource {
    fn default() -> Self {
        Self::new()
    }
}

fn build_input(d: &ResourceData) -> Result<ScanZone> {
    Ok(ScanZone {
        base: BaseInfo::named(d.id(), d.get_string("name")?, d.get_string("description")?),
        ip_list: d.get_string_list("zone_cidrs")?,
    })
}

#[async_trait]
impl Resource for ScanZoneResource {
    fn type_name(&self) -> &'static str {
        TYPE_NAME
    }

    fn schema(&self) -> &Schema {
        &self.schema
    }

    async fn create(&self, client: &dyn ScClient, d: &mut ResourceData) -> Result<Diagnostics> {
        trace!(resource = TYPE_NAME, "start of create");
        let created = client.create(&build_input(d)?).await?;
        debug!(response = ?created, "created scan zone");
        d.set_id(created.base.id.as_str());
        self.read(client, d).await
    }

    async fn read(&self, client: &dyn ScClient, d: &mut ResourceData) -> Result<Diagnostics> {
        trace!(resource = TYPE_NAME, id = d.id(), "start of read");
        let result = client.get::<ScanZone>(d.id()).await;
        let Some(zone) = recover_not_found(d, result)? else {
            return Ok(Diagnostics::new());
        };
        debug!(response = ?zone, "read scan zone");

        d.set("name", zone.base.name);
        d.set("description", zone.base.description);
        d.set("zone_cidrs", zone.ip_list);
        d.set_id(zone.base.id.as_str());
        Ok(Diagnostics::new())
    }

    async fn update(&self, client: &dyn ScClient, d: &mut ResourceData) -> Result<Diagnostics> {
        trace!(resource = TYPE_NAME, id = d.id(), "start of update");
        let updated = client.update(&build_input(d)?).await?;
        debug!(response = ?updated, "updated scan zone");
        self.read(client, d).await
    }

    async fn delete(&self, client: &dyn ScClient, d: &mut ResourceData) -> Result<Diagnostics> {
        trace!(resource = TYPE_NAME, id = d.id(), "start of delete");
        let result = client.delete::<ScanZone>(d.id()).await;
        recover_not_found(d, result)?;
        Ok(Diagnostics::new())
    }
}
