//! `tenablesc_role`
//!
//! One boolean attribute per entry of the permission table, named `perm_<name>`.

use async_trait::async_trait;
use tenablesc_client::{BaseInfo, Role, ScClient};
use tenablesc_core::{Diagnostics, ResourceData, Result};
use tracing::{debug, trace};

use super::{description_attribute, name_attribute};
use crate::descriptions;
use crate::permissions::PERMISSIONS;
use crate::recovery::recover_not_found;
use crate::resource::Resource;
use crate::schema::{Attribute, Schema};

const TYPE_NAME: &str = "tenablesc_role";

pub struct RoleResource {
    schema: Schema,
}

impl RoleResource {
    pub fn new() -> Self {
        let mut schema = Schema::new(descriptions::resource_role())
            .attr("name", name_attribute(descriptions::ROLE_NAME))
            .attr("description", description_attribute(descriptions::ROLE_DESCRIPTION));
        for permission in PERMISSIONS {
            schema.insert(
                permission.attribute(),
                Attribute::bool()
                    .default(false)
                    .description(descriptions::role_permission(permission.upstream)),
            );
        }
        Self { schema }
    }
}

impl Default for RoleResource {
    fn default() -> Self {
        Self::new()
    }
}

/// Every permission is sent, so a flag turned off in configuration is revoked upstream
fn build_input(d: &ResourceData) -> Result<Role> {
    let mut role = Role {
        base: BaseInfo::named(d.id(), d.get_string("name")?, d.get_string("description")?),
        ..Default::default()
    };
    for permission in PERMISSIONS {
        permission.set(&mut role, d.get_bool(&permission.attribute())?);
    }
    Ok(role)
}

#[async_trait]
impl Resource for RoleResource {
    fn type_name(&self) -> &'static str {
        TYPE_NAME
    }

    fn schema(&self) -> &Schema {
        &self.schema
    }

    async fn create(&self, client: &dyn ScClient, d: &mut ResourceData) -> Result<Diagnostics> {
        trace!(resource = TYPE_NAME, "start of create");
        let created = client.create(&build_input(d)?).await?;
        debug!(response = ?created, "created role");
        d.set_id(created.base.id.as_str());
        self.read(client, d).await
    }

    async fn read(&self, client: &dyn ScClient, d: &mut ResourceData) -> Result<Diagnostics> {
        trace!(resource = TYPE_NAME, id = d.id(), "start of read");
        let result = client.get::<Role>(d.id()).await;
        let Some(role) = recover_not_found(d, result)? else {
            return Ok(Diagnostics::new());
        };
        debug!(response = ?role, "read role");

        for permission in PERMISSIONS {
            d.set(permission.attribute(), permission.get(&role));
        }
        d.set("name", role.base.name);
        d.set("description", role.base.description);
        d.set_id(role.base.id.as_str());
        Ok(Diagnostics::new())
    }

    async fn update(&self, client: &dyn ScClient, d: &mut ResourceData) -> Result<Diagnostics> {
        trace!(resource = TYPE_NAME, id = d.id(), "start of update");
        let updated = client.update(&build_input(d)?).await?;
        debug!(response = ?updated, "updated role");
        self.read(client, d).await
    }

    async fn delete(&self, client: &dyn ScClient, d: &mut ResourceData) -> Result<Diagnostics> {
        trace!(resource = TYPE_NAME, id = d.id(), "start of delete");
        let result = client.delete::<Role>(d.id()).await;
        recover_not_found(d, result)?;
        Ok(Diagnostics::new())
    }
}
