//! Resource and data source traits

use async_trait::async_trait;
use tenablesc_client::ScClient;
use tenablesc_core::{AttrMap, Diagnostics, ResourceData, Result};

use crate::schema::{Plan, Schema};

/// A managed entity kind with create/read/update/delete handlers.
///
/// Handlers receive the planned values in `d` and leave the resulting state in it. A read
/// that finds the entity gone clears the id instead of failing. Warnings travel back in
/// the returned diagnostics; errors are returned as `Err`.
#[async_trait]
pub trait Resource: Send + Sync {
    /// Type name, e.g. `tenablesc_role`
    fn type_name(&self) -> &'static str;

    fn schema(&self) -> &Schema;

    async fn create(&self, client: &dyn ScClient, d: &mut ResourceData) -> Result<Diagnostics>;

    async fn read(&self, client: &dyn ScClient, d: &mut ResourceData) -> Result<Diagnostics>;

    async fn update(&self, client: &dyn ScClient, d: &mut ResourceData) -> Result<Diagnostics>;

    async fn delete(&self, client: &dyn ScClient, d: &mut ResourceData) -> Result<Diagnostics>;

    /// Checks spanning several attributes
    fn validate(&self, _config: &AttrMap) -> Diagnostics {
        Diagnostics::new()
    }

    /// Adjust a computed plan before it is returned
    fn customize_plan(&self, _prior: &AttrMap, _plan: &mut Plan) -> Result<()> {
        Ok(())
    }
}

/// A read-only lookup
#[async_trait]
pub trait DataSource: Send + Sync {
    fn type_name(&self) -> &'static str;

    fn schema(&self) -> &Schema;

    async fn read(&self, client: &dyn ScClient, d: &mut ResourceData) -> Result<Diagnostics>;
}
