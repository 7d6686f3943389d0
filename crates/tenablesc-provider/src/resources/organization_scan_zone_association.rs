//! `tenablesc_organization_scan_zone_association`
//!
//! Manages the zone list of an existing organization. The association id is the
//! organization id.

use async_trait::async_trait;
use tenablesc_client::{BaseInfo, Organization, ScClient};
use tenablesc_core::{parse_numeric_id, AttrValue, Diagnostics, ResourceData, Result};
use tracing::{debug, trace};

use crate::descriptions;
use crate::recovery::recover_not_found;
use crate::resource::Resource;
use crate::schema::{Attribute, Schema};
use crate::validate::validate_numeric_id_attr;

const TYPE_NAME: &str = "tenablesc_organization_scan_zone_association";

const ORGANIZATION_ID: &str = "organization_id";
const SCAN_ZONE_IDS: &str = "scan_zone_ids";

pub struct OrganizationScanZoneAssociation {
    schema: Schema,
}

impl OrganizationScanZoneAssociation {
    pub fn new() -> Self {
        let schema =
            Schema::new(descriptions::resource_organization_scan_zone_association())
                .attr(
                    ORGANIZATION_ID,
                    Attribute::string()
                        .required()
                        .force_new()
                        .validate(validate_numeric_id_attr)
                        .description(descriptions::ORGANIZATION_ID),
                )
                .attr(
                    SCAN_ZONE_IDS,
                    Attribute::int_set()
                        .required()
                        .description(descriptions::ORGANIZATION_SCAN_ZONE_IDS),
                );
        Self { schema }
    }
}

impl Default for OrganizationScanZoneAssociation {
    fn default() -> Self {
        Self::new()
    }
}

/// Partial organization body carrying only the zone list
fn zones_patch(organization_id: &str, zone_ids: &[i64]) -> Organization {
    Organization {
        base: BaseInfo::reference(organization_id),
        zones: Some(
            zone_ids
                .iter()
                .map(|id| BaseInfo::reference(id.to_string()))
                .collect(),
        ),
        ..Default::default()
    }
}

#[async_trait]
impl Resource for OrganizationScanZoneAssociation {
    fn type_name(&self) -> &'static str {
        TYPE_NAME
    }

    fn schema(&self) -> &Schema {
        &self.schema
    }

    async fn create(&self, client: &dyn ScClient, d: &mut ResourceData) -> Result<Diagnostics> {
        trace!(resource = TYPE_NAME, "start of create");
        let organization_id = d.get_string(ORGANIZATION_ID)?;
        parse_numeric_id(ORGANIZATION_ID, &organization_id)?;
        let patch = zones_patch(&organization_id, &d.get_int_list(SCAN_ZONE_IDS)?);
        let updated = client.update(&patch).await?;
        debug!(response = ?updated, "associated scan zones with organization");
        d.set_id(organization_id);
        self.read(client, d).await
    }

    async fn read(&self, client: &dyn ScClient, d: &mut ResourceData) -> Result<Diagnostics> {
        trace!(resource = TYPE_NAME, id = d.id(), "start of read");
        let result = client.get::<Organization>(d.id()).await;
        let Some(organization) = recover_not_found(d, result)? else {
            return Ok(Diagnostics::new());
        };
        debug!(response = ?organization, "read organization zones");

        let zone_ids = organization
            .zones
            .unwrap_or_default()
            .iter()
            .map(|zone| parse_numeric_id(SCAN_ZONE_IDS, zone.id.as_str()).map(AttrValue::Int))
            .collect::<Result<Vec<_>>>()?;
        d.set(SCAN_ZONE_IDS, AttrValue::List(zone_ids));
        let id = d.id().to_string();
        d.set(ORGANIZATION_ID, id);
        Ok(Diagnostics::new())
    }

    async fn update(&self, client: &dyn ScClient, d: &mut ResourceData) -> Result<Diagnostics> {
        trace!(resource = TYPE_NAME, id = d.id(), "start of update");
        let patch = zones_patch(d.id(), &d.get_int_list(SCAN_ZONE_IDS)?);
        let updated = client.update(&patch).await?;
        debug!(response = ?updated, "updated organization zones");
        self.read(client, d).await
    }

    async fn delete(&self, client: &dyn ScClient, d: &mut ResourceData) -> Result<Diagnostics> {
        trace!(resource = TYPE_NAME, id = d.id(), "start of delete");
        let result = client.update(&zones_patch(d.id(), &[])).await;
        recover_not_found(d, result)?;
        Ok(Diagnostics::new())
    }
}
