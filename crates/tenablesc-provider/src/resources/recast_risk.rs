//! `tenablesc_recast_risk`

use async_trait::async_trait;
use tenablesc_client::{RecastRiskRule, ScClient};
use tenablesc_core::{Diagnostics, ResourceData, Result};
use tracing::{debug, trace};

use super::{configured_protocol, reference, reference_id, risk_rule_schema};
use crate::descriptions;
use crate::recovery::recover_not_found;
use crate::resource::Resource;
use crate::schema::{Attribute, Schema};
use crate::validate::protocol_name;

const TYPE_NAME: &str = "tenablesc_recast_risk";

pub struct RecastRisk {
    schema: Schema,
}

impl RecastRisk {
    pub fn new() -> Self {
        let schema = risk_rule_schema(descriptions::resource_recast_risk()).attr(
            "new_severity",
            Attribute::string()
                .default("0")
                .description(descriptions::RECAST_NEW_SEVERITY),
        );
        Self { schema }
    }
}

impl Default for RecastRisk {
    fn default() -> Self {
        Self::new()
    }
}

fn build_input(d: &ResourceData) -> Result<RecastRiskRule> {
    Ok(RecastRiskRule {
        plugin: reference(&d.get_string("plugin_id")?),
        repository: reference(&d.get_string("repository_id")?),
        new_severity: d.get_string("new_severity")?,
        host_type: d.get_string("host_type")?,
        host_value: d.get_string("host_value")?,
        port: d.get_string("port")?,
        protocol: configured_protocol(d)?,
        comments: d.get_string("comments")?,
        ..Default::default()
    })
}

#[async_trait]
impl Resource for RecastRisk {
    fn type_name(&self) -> &'static str {
        TYPE_NAME
    }

    fn schema(&self) -> &Schema {
        &self.schema
    }

    async fn create(&self, client: &dyn ScClient, d: &mut ResourceData) -> Result<Diagnostics> {
        trace!(resource = TYPE_NAME, "start of create");
        let rule = build_input(d)?;
        let created = client.create(&rule).await?;
        debug!(response = ?created, "created recast risk rule");
        d.set_id(created.id.as_str());
        self.read(client, d).await
    }

    async fn read(&self, client: &dyn ScClient, d: &mut ResourceData) -> Result<Diagnostics> {
        trace!(resource = TYPE_NAME, id = d.id(), "start of read");
        let result = client.get::<RecastRiskRule>(d.id()).await;
        let Some(rule) = recover_not_found(d, result)? else {
            return Ok(Diagnostics::new());
        };
        debug!(response = ?rule, "read recast risk rule");

        d.set("plugin_id", reference_id(&rule.plugin));
        d.set("repository_id", reference_id(&rule.repository));
        d.set("new_severity", rule.new_severity);
        d.set("host_type", rule.host_type);
        d.set("host_value", rule.host_value);
        d.set("port", rule.port);
        d.set("protocol", protocol_name(&rule.protocol));
        d.set("comments", rule.comments);
        d.set_id(rule.id.as_str());
        Ok(Diagnostics::new())
    }

    async fn update(&self, client: &dyn ScClient, d: &mut ResourceData) -> Result<Diagnostics> {
        trace!(resource = TYPE_NAME, id = d.id(), "start of update");
        let mut diags = self.delete(client, d).await?;
        diags.extend(self.create(client, d).await?);
        Ok(diags)
    }

    async fn delete(&self, client: &dyn ScClient, d: &mut ResourceData) -> Result<Diagnostics> {
        trace!(resource = TYPE_NAME, id = d.id(), "start of delete");
        let result = client.delete::<RecastRiskRule>(d.id()).await;
        recover_not_found(d, result)?;
        Ok(Diagnostics::new())
    }
}
