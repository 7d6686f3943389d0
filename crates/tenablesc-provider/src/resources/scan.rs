//! `tenablesc_scan`

use async_trait::async_trait;
use tenablesc_client::{BaseInfo, Scan, ScanSchedule, ScClient};
use tenablesc_core::{Diagnostics, FakeBool, ResourceData, Result};
use tracing::{debug, trace};

use super::{description_attribute, name_attribute, reference, reference_id, reference_ids, references};
use crate::descriptions;
use crate::recovery::recover_not_found;
use crate::resource::Resource;
use crate::schema::{Attribute, Schema};

const TYPE_NAME: &str = "tenablesc_scan";

const SCAN_TYPE: &str = "policy";
const SCHEDULE_ICAL: &str = "ical";
const SCHEDULE_TEMPLATE: &str = "template";

pub struct ScanResource {
    schema: Schema,
}

impl ScanResource {
    pub fn new() -> Self {
        let schema = Schema::new(descriptions::resource_scan())
            .attr("name", name_attribute(descriptions::SCAN_NAME))
            .attr("description", description_attribute(descriptions::SCAN_DESCRIPTION))
            .attr(
                "repository_id",
                Attribute::string()
                    .required()
                    .description(descriptions::REPOSITORY_ID),
            )
            .attr(
                "policy_id",
                Attribute::string()
                    .required()
                    .description(descriptions::SCAN_POLICY_ID),
            )
            .attr(
                "scan_virtual_hosts",
                Attribute::bool()
                    .default(false)
                    .description(descriptions::SCAN_VIRTUAL_HOSTS),
            )
            .attr(
                "dhcp_tracking",
                Attribute::bool()
                    .default(true)
                    .description(descriptions::SCAN_DHCP_TRACKING),
            )
            .attr(
                "timeout_action",
                Attribute::string()
                    .default("import")
                    .description(descriptions::SCAN_TIMEOUT_ACTION),
            )
            .attr(
                "max_scan_time",
                Attribute::string()
                    .default("3600")
                    .description(descriptions::SCAN_MAX_TIME),
            )
            .attr(
                "ips_and_names",
                Attribute::string()
                    .default("")
                    .description(descriptions::SCAN_IPS_AND_NAMES),
            )
            .attr(
                "asset_ids",
                Attribute::string_list().description(descriptions::SCAN_ASSET_IDS),
            )
            .attr(
                "credential_ids",
                Attribute::string_list().description(descriptions::SCAN_CREDENTIAL_IDS),
            )
            .attr(
                "schedule_start",
                Attribute::string()
                    .default("")
                    .description(descriptions::SCAN_SCHEDULE_START),
            )
            .attr(
                "schedule_repeat_rule",
                Attribute::string()
                    .default("")
                    .description(descriptions::SCAN_SCHEDULE_REPEAT_RULE),
            );
        Self { schema }
    }
}

impl Default for ScanResource {
    fn default() -> Self {
        Self::new()
    }
}

/// An explicit start makes the scan calendar driven; otherwise it runs on demand
fn build_schedule(start: String, repeat_rule: String) -> ScanSchedule {
    let schedule_type = if start.is_empty() {
        SCHEDULE_TEMPLATE
    } else {
        SCHEDULE_ICAL
    };
    ScanSchedule {
        schedule_type: schedule_type.to_string(),
        start,
        repeat_rule,
    }
}

fn build_input(d: &ResourceData) -> Result<Scan> {
    Ok(Scan {
        base: BaseInfo::named(d.id(), d.get_string("name")?, d.get_string("description")?),
        scan_type: SCAN_TYPE.to_string(),
        policy: reference(&d.get_string("policy_id")?),
        repository: reference(&d.get_string("repository_id")?),
        dhcp_tracking: FakeBool::from(d.get_bool("dhcp_tracking")?),
        scanning_virtual_hosts: FakeBool::from(d.get_bool("scan_virtual_hosts")?),
        timeout_action: d.get_string("timeout_action")?,
        max_scan_time: d.get_string("max_scan_time")?,
        ip_list: d.get_string("ips_and_names")?,
        assets: references(&d.get_string_list("asset_ids")?),
        credentials: references(&d.get_string_list("credential_ids")?),
        schedule: Some(build_schedule(
            d.get_string("schedule_start")?,
            d.get_string("schedule_repeat_rule")?,
        )),
    })
}

#[async_trait]
impl Resource for ScanResource {
    fn type_name(&self) -> &'static str {
        TYPE_NAME
    }

    fn schema(&self) -> &Schema {
        &self.schema
    }

    async fn create(&self, client: &dyn ScClient, d: &mut ResourceData) -> Result<Diagnostics> {
        trace!(resource = TYPE_NAME, "start of create");
        let created = client.create(&build_input(d)?).await?;
        debug!(response = ?created, "created scan");
        d.set_id(created.base.id.as_str());
        self.read(client, d).await
    }

    async fn read(&self, client: &dyn ScClient, d: &mut ResourceData) -> Result<Diagnostics> {
        trace!(resource = TYPE_NAME, id = d.id(), "start of read");
        let result = client.get::<Scan>(d.id()).await;
        let Some(scan) = recover_not_found(d, result)? else {
            return Ok(Diagnostics::new());
        };
        debug!(response = ?scan, "read scan");

        d.set("name", scan.base.name);
        d.set("description", scan.base.description);
        d.set("policy_id", reference_id(&scan.policy));
        d.set("repository_id", reference_id(&scan.repository));
        d.set("dhcp_tracking", scan.dhcp_tracking.as_bool());
        d.set("scan_virtual_hosts", scan.scanning_virtual_hosts.as_bool());
        d.set("timeout_action", scan.timeout_action);
        d.set("max_scan_time", scan.max_scan_time);
        d.set("ips_and_names", scan.ip_list);
        d.set("asset_ids", reference_ids(&scan.assets));
        d.set("credential_ids", reference_ids(&scan.credentials));
        if let Some(schedule) = scan.schedule {
            d.set("schedule_start", schedule.start);
            d.set("schedule_repeat_rule", schedule.repeat_rule);
        }
        d.set_id(scan.base.id.as_str());
        Ok(Diagnostics::new())
    }

    async fn update(&self, client: &dyn ScClient, d: &mut ResourceData) -> Result<Diagnostics> {
        trace!(resource = TYPE_NAME, id = d.id(), "start of update");
        let updated = client.update(&build_input(d)?).await?;
        debug!(response = ?updated, "updated scan");
        self.read(client, d).await
    }

    async fn delete(&self, client: &dyn ScClient, d: &mut ResourceData) -> Result<Diagnostics> {
        trace!(resource = TYPE_NAME, id = d.id(), "start of delete");
        let result = client.delete::<Scan>(d.id()).await;
        recover_not_found(d, result)?;
        Ok(Diagnostics::new())
    }
}
