//! `tenablesc_repository_organization_association`
//!
//! Grants organizations access to a repository. The association has no upstream record of
//! its own: it is the `organizations` list of the repository, and its id is the
//! repository id.

use async_trait::async_trait;
use tenablesc_client::{BaseInfo, RepoOrganization, Repository, ScClient};
use tenablesc_core::data::{int_of, string_of};
use tenablesc_core::{
    parse_numeric_id, AttrMap, AttrValue, Diagnostics, ResourceData, Result,
};
use tracing::{debug, trace, warn};

use crate::descriptions;
use crate::recovery::recover_not_found;
use crate::resource::Resource;
use crate::schema::{Attribute, Schema};
use crate::validate::validate_group_assignment_attr;

const TYPE_NAME: &str = "tenablesc_repository_organization_association";

const ORGANIZATION: &str = "organization";
const ORGANIZATION_ID: &str = "organization_id";
const GROUP_ASSIGNMENT: &str = "group_assignment";

pub struct RepositoryOrganizationAssociation {
    schema: Schema,
}

impl RepositoryOrganizationAssociation {
    pub fn new() -> Self {
        let organization = Schema::new(descriptions::ORGANIZATION_ID)
            .attr(
                ORGANIZATION_ID,
                Attribute::int()
                    .required()
                    .description(descriptions::ORGANIZATION_ID),
            )
            .attr(
                GROUP_ASSIGNMENT,
                Attribute::string()
                    .default("")
                    .validate(validate_group_assignment_attr)
                    .description(descriptions::GROUP_ASSIGNMENT),
            );

        let schema = Schema::new(descriptions::resource_repository_organization_association())
            .attr(
                "repository_id",
                Attribute::string()
                    .required()
                    .force_new()
                    .description(descriptions::REPOSITORY_ID),
            )
            .attr(
                ORGANIZATION,
                Attribute::block(organization, None)
                    .required()
                    .description(descriptions::ORGANIZATION_ID),
            );
        Self { schema }
    }
}

impl Default for RepositoryOrganizationAssociation {
    fn default() -> Self {
        Self::new()
    }
}

fn build_organizations(d: &ResourceData) -> Result<Vec<RepoOrganization>> {
    d.get_blocks(ORGANIZATION)?
        .iter()
        .map(|block| {
            Ok(RepoOrganization {
                id: int_of(ORGANIZATION_ID, block.get(ORGANIZATION_ID))?
                    .to_string()
                    .into(),
                group_assign: string_of(GROUP_ASSIGNMENT, block.get(GROUP_ASSIGNMENT))?,
            })
        })
        .collect()
}

/// Partial repository body carrying only the access list
fn access_patch(repository_id: &str, organizations: Vec<RepoOrganization>) -> Repository {
    Repository {
        base: BaseInfo::reference(repository_id),
        organizations: Some(organizations),
        ..Default::default()
    }
}

fn organization_block(organization: &RepoOrganization) -> Result<AttrValue> {
    let mut block = AttrMap::new();
    block.insert(
        ORGANIZATION_ID.into(),
        AttrValue::Int(parse_numeric_id(ORGANIZATION_ID, organization.id.as_str())?),
    );
    block.insert(
        GROUP_ASSIGNMENT.into(),
        organization.group_assign.clone().into(),
    );
    Ok(AttrValue::Map(block))
}

#[async_trait]
impl Resource for RepositoryOrganizationAssociation {
    fn type_name(&self) -> &'static str {
        TYPE_NAME
    }

    fn schema(&self) -> &Schema {
        &self.schema
    }

    async fn create(&self, client: &dyn ScClient, d: &mut ResourceData) -> Result<Diagnostics> {
        trace!(resource = TYPE_NAME, "start of create");
        let repository_id = d.get_string("repository_id")?;
        let patch = access_patch(&repository_id, build_organizations(d)?);
        let updated = client.update(&patch).await?;
        debug!(response = ?updated, "associated organizations with repository");
        d.set_id(repository_id);
        self.read(client, d).await
    }

    async fn read(&self, client: &dyn ScClient, d: &mut ResourceData) -> Result<Diagnostics> {
        trace!(resource = TYPE_NAME, id = d.id(), "start of read");
        let result = client.get::<Repository>(d.id()).await;
        let Some(repository) = recover_not_found(d, result)? else {
            return Ok(Diagnostics::new());
        };
        debug!(response = ?repository, "read repository access");

        let organizations = repository.organizations.unwrap_or_default();
        if organizations.is_empty() {
            warn!(repository = d.id(), "repository has no organizations; association is gone");
            d.clear_id();
            return Ok(Diagnostics::new());
        }

        let blocks = organizations
            .iter()
            .map(organization_block)
            .collect::<Result<Vec<_>>>()?;
        d.set(ORGANIZATION, AttrValue::List(blocks));
        d.set("repository_id", repository.base.id.as_str());
        d.set_id(repository.base.id.as_str());
        Ok(Diagnostics::new())
    }

    async fn update(&self, client: &dyn ScClient, d: &mut ResourceData) -> Result<Diagnostics> {
        trace!(resource = TYPE_NAME, id = d.id(), "start of update");
        let patch = access_patch(d.id(), build_organizations(d)?);
        let updated = client.update(&patch).await?;
        debug!(response = ?updated, "updated repository access");
        self.read(client, d).await
    }

    async fn delete(&self, client: &dyn ScClient, d: &mut ResourceData) -> Result<Diagnostics> {
        trace!(resource = TYPE_NAME, id = d.id(), "start of delete");
        let result = client.update(&access_patch(d.id(), Vec::new())).await;
        recover_not_found(d, result)?;
        Ok(Diagnostics::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::testing::{planned, prepared};
    use serde_json::json;
    use tenablesc_client::InMemoryClient;
    use tenablesc_core::Error;

    fn seeded() -> (InMemoryClient, String) {
        let sc = InMemoryClient::new();
        let id = sc.seed("repository", json!({"name": "main", "ipRange": "10.0.0.0/8"}));
        (sc, id)
    }

    #[tokio::test]
    async fn test_create_patches_repository() {
        let (sc, repository_id) = seeded();
        let resource = RepositoryOrganizationAssociation::new();
        let mut d = planned(
            &resource,
            json!({
                "repository_id": repository_id,
                "organization": [
                    {"organization_id": 2, "group_assignment": "all"},
                    {"organization_id": 5}
                ]
            }),
        );
        resource.create(&sc, &mut d).await.unwrap();

        assert_eq!(d.id(), repository_id);
        let stored = sc.record("repository", &repository_id).unwrap();
        assert_eq!(
            stored["organizations"],
            json!([{"id": "2", "groupAssign": "all"}, {"id": "5", "groupAssign": ""}])
        );
        assert_eq!(stored["name"], "main");

        let blocks = d.get_blocks(ORGANIZATION).unwrap();
        assert_eq!(blocks[0][ORGANIZATION_ID], AttrValue::Int(2));
        assert_eq!(blocks[1][GROUP_ASSIGNMENT], AttrValue::from(""));
    }

    #[tokio::test]
    async fn test_delete_clears_organizations() {
        let (sc, repository_id) = seeded();
        let resource = RepositoryOrganizationAssociation::new();
        let mut d = planned(
            &resource,
            json!({"repository_id": repository_id, "organization": [{"organization_id": 2}]}),
        );
        resource.create(&sc, &mut d).await.unwrap();
        resource.delete(&sc, &mut d).await.unwrap();

        let stored = sc.record("repository", &repository_id).unwrap();
        assert_eq!(stored["organizations"], json!([]));
        assert_eq!(sc.count("repository"), 1);

        resource.read(&sc, &mut d).await.unwrap();
        assert!(d.is_absent());
    }

    #[tokio::test]
    async fn test_non_numeric_upstream_id_fails_read() {
        let sc = InMemoryClient::new();
        let id = sc.seed("repository", json!({"organizations": [{"id": "abc"}]}));
        let mut d = ResourceData::from_state(id, Default::default());
        let err = RepositoryOrganizationAssociation::new()
            .read(&sc, &mut d)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Validation { .. }));
    }

    #[test]
    fn test_group_assignment_validated() {
        let resource = RepositoryOrganizationAssociation::new();
        let config = prepared(
            &resource,
            json!({
                "repository_id": "1",
                "organization": [{"organization_id": 2, "group_assignment": "some"}]
            }),
        );
        let diags = resource.schema().validate(&config);
        assert!(diags.has_error());
        let diag = diags.iter().next().unwrap();
        assert_eq!(
            diag.attribute.as_ref().unwrap().to_string(),
            "organization[0].group_assignment"
        );
    }
}
