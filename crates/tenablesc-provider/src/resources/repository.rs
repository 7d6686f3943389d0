//! `tenablesc_repository`

use async_trait::async_trait;
use tenablesc_client::{BaseInfo, Repository, ScClient};
use tenablesc_core::data::int_of;
use tenablesc_core::{AttrMap, AttrValue, Diagnostics, Error, FakeBool, ResourceData, Result};
use tracing::{debug, trace};

use super::{description_attribute, name_attribute};
use crate::descriptions;
use crate::recovery::recover_not_found;
use crate::resource::Resource;
use crate::schema::{Attribute, Schema};

const TYPE_NAME: &str = "tenablesc_repository";

const DATA_FORMAT: &str = "IPv4";
const REPOSITORY_TYPE: &str = "Local";
const DEFAULT_TRENDING_DAYS: i64 = 30;

const LIFETIMES: &str = "vulnerability_lifetimes";
const ACTIVE_DAYS: &str = "active_days";
const PASSIVE_DAYS: &str = "passive_days";
const COMPLIANCE_DAYS: &str = "compliance_days";
const MITIGATED_DAYS: &str = "mitigated_days";

pub struct RepositoryResource {
    schema: Schema,
}

impl RepositoryResource {
    pub fn new() -> Self {
        let lifetimes = Schema::new(descriptions::VULNERABILITY_LIFETIME)
            .attr(ACTIVE_DAYS, Attribute::int())
            .attr(PASSIVE_DAYS, Attribute::int())
            .attr(COMPLIANCE_DAYS, Attribute::int())
            .attr(MITIGATED_DAYS, Attribute::int());

        let schema = Schema::new(descriptions::resource_repository())
            .attr("name", name_attribute(descriptions::REPOSITORY_NAME))
            .attr(
                "description",
                description_attribute(descriptions::REPOSITORY_DESCRIPTION),
            )
            .attr(
                "ip_range",
                Attribute::string()
                    .required()
                    .description(descriptions::REPOSITORY_IP_RANGE),
            )
            .attr(
                "trending_days",
                Attribute::int()
                    .default(DEFAULT_TRENDING_DAYS)
                    .description(descriptions::TRENDING_DAYS),
            )
            .attr(
                "trend_with_raw",
                Attribute::bool()
                    .default(false)
                    .description(descriptions::TREND_WITH_RAW),
            )
            .attr(
                LIFETIMES,
                Attribute::block(lifetimes, Some(1))
                    .description(descriptions::VULNERABILITY_LIFETIME),
            );
        Self { schema }
    }
}

impl Default for RepositoryResource {
    fn default() -> Self {
        Self::new()
    }
}

/// A lifetime value as sent upstream; empty when the key is absent from the block
fn lifetime_of(block: &AttrMap, key: &str) -> Result<String> {
    match block.get(key) {
        None | Some(AttrValue::Null) => Ok(String::new()),
        value => Ok(int_of(key, value)?.to_string()),
    }
}

fn build_input(d: &ResourceData) -> Result<Repository> {
    let mut repository = Repository {
        base: BaseInfo::named(d.id(), d.get_string("name")?, d.get_string("description")?),
        repo_type: REPOSITORY_TYPE.to_string(),
        data_format: DATA_FORMAT.to_string(),
        ip_range: d.get_string("ip_range")?,
        trending_days: d.get_int("trending_days")?.to_string(),
        trend_with_raw: FakeBool::from(d.get_bool("trend_with_raw")?),
        ..Default::default()
    };

    if let Some(block) = d.get_blocks(LIFETIMES)?.first() {
        repository.active_vulns_lifetime = lifetime_of(block, ACTIVE_DAYS)?;
        repository.passive_vulns_lifetime = lifetime_of(block, PASSIVE_DAYS)?;
        repository.compliance_vulns_lifetime = lifetime_of(block, COMPLIANCE_DAYS)?;
        repository.mitigated_vulns_lifetime = lifetime_of(block, MITIGATED_DAYS)?;
    }
    Ok(repository)
}

fn parse_days(attribute: &str, days: &str) -> Result<Option<i64>> {
    if days.is_empty() {
        return Ok(None);
    }
    days.trim()
        .parse::<i64>()
        .map(Some)
        .map_err(|_| Error::Parse(format!("{} '{}' is not a number of days", attribute, days)))
}

/// The lifetimes block as read back; `None` when upstream reports none of them
fn lifetimes_from(repository: &Repository) -> Result<Option<AttrMap>> {
    let mut block = AttrMap::new();
    for (key, days) in [
        (ACTIVE_DAYS, &repository.active_vulns_lifetime),
        (PASSIVE_DAYS, &repository.passive_vulns_lifetime),
        (COMPLIANCE_DAYS, &repository.compliance_vulns_lifetime),
        (MITIGATED_DAYS, &repository.mitigated_vulns_lifetime),
    ] {
        if let Some(days) = parse_days(key, days)? {
            block.insert(key.to_string(), AttrValue::Int(days));
        }
    }
    Ok((!block.is_empty()).then_some(block))
}

#[async_trait]
impl Resource for RepositoryResource {
    fn type_name(&self) -> &'static str {
        TYPE_NAME
    }

    fn schema(&self) -> &Schema {
        &self.schema
    }

    async fn create(&self, client: &dyn ScClient, d: &mut ResourceData) -> Result<Diagnostics> {
        trace!(resource = TYPE_NAME, "start of create");
        let created = client.create(&build_input(d)?).await?;
        debug!(response = ?created, "created repository");
        d.set_id(created.base.id.as_str());
        self.read(client, d).await
    }

    async fn read(&self, client: &dyn ScClient, d: &mut ResourceData) -> Result<Diagnostics> {
        trace!(resource = TYPE_NAME, id = d.id(), "start of read");
        let result = client.get::<Repository>(d.id()).await;
        let Some(repository) = recover_not_found(d, result)? else {
            return Ok(Diagnostics::new());
        };
        debug!(response = ?repository, "read repository");

        if let Some(days) = parse_days("trending_days", &repository.trending_days)? {
            d.set("trending_days", days);
        }
        if let Some(block) = lifetimes_from(&repository)? {
            d.set(LIFETIMES, AttrValue::List(vec![AttrValue::Map(block)]));
        }
        d.set("trend_with_raw", repository.trend_with_raw.as_bool());
        d.set("ip_range", repository.ip_range);
        d.set("name", repository.base.name);
        d.set("description", repository.base.description);
        d.set_id(repository.base.id.as_str());
        Ok(Diagnostics::new())
    }

    async fn update(&self, client: &dyn ScClient, d: &mut ResourceData) -> Result<Diagnostics> {
        trace!(resource = TYPE_NAME, id = d.id(), "start of update");
        let updated = client.update(&build_input(d)?).await?;
        debug!(response = ?updated, "updated repository");
        self.read(client, d).await
    }

    async fn delete(&self, client: &dyn ScClient, d: &mut ResourceData) -> Result<Diagnostics> {
        trace!(resource = TYPE_NAME, id = d.id(), "start of delete");
        let result = client.delete::<Repository>(d.id()).await;
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

    #[tokio::test]
    async fn test_create_with_defaults() {
        let sc = InMemoryClient::new();
        let resource = RepositoryResource::new();
        let mut d = planned(&resource, json!({"name": "main", "ip_range": "10.0.0.0/8"}));
        resource.create(&sc, &mut d).await.unwrap();

        let stored = sc.record("repository", d.id()).unwrap();
        assert_eq!(stored["type"], "Local");
        assert_eq!(stored["dataFormat"], "IPv4");
        assert_eq!(stored["trendingDays"], "30");
        assert_eq!(stored["trendWithRaw"], "false");
        assert!(stored.get("activeVulnsLifetime").is_none());

        assert_eq!(d.get_int("trending_days").unwrap(), 30);
        assert!(!d.get_bool("trend_with_raw").unwrap());
        assert!(d.get_blocks(LIFETIMES).unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_partial_lifetimes_sent_and_read_back() {
        let sc = InMemoryClient::new();
        let resource = RepositoryResource::new();
        let mut d = planned(
            &resource,
            json!({
                "name": "main",
                "ip_range": "10.0.0.0/8",
                "vulnerability_lifetimes": [{"active_days": 365, "passive_days": 7}]
            }),
        );
        resource.create(&sc, &mut d).await.unwrap();

        let stored = sc.record("repository", d.id()).unwrap();
        assert_eq!(stored["activeVulnsLifetime"], "365");
        assert_eq!(stored["passiveVulnsLifetime"], "7");
        assert!(stored.get("mitigatedVulnsLifetime").is_none());

        let blocks = d.get_blocks(LIFETIMES).unwrap();
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0][ACTIVE_DAYS], AttrValue::Int(365));
        assert_eq!(blocks[0][PASSIVE_DAYS], AttrValue::Int(7));
        assert!(!blocks[0].contains_key(COMPLIANCE_DAYS));
    }

    #[tokio::test]
    async fn test_passive_lifetime_read_from_passive_field() {
        let sc = InMemoryClient::new();
        let id = sc.seed(
            "repository",
            json!({"name": "r", "ipRange": "10.0.0.0/8", "activeVulnsLifetime": 100, "passiveVulnsLifetime": "5"}),
        );
        let mut d = ResourceData::from_state(id, AttrMap::new());
        RepositoryResource::new().read(&sc, &mut d).await.unwrap();

        let blocks = d.get_blocks(LIFETIMES).unwrap();
        assert_eq!(blocks[0][ACTIVE_DAYS], AttrValue::Int(100));
        assert_eq!(blocks[0][PASSIVE_DAYS], AttrValue::Int(5));
    }

    #[tokio::test]
    async fn test_unparseable_lifetime_is_an_error() {
        let sc = InMemoryClient::new();
        let id = sc.seed("repository", json!({"name": "r", "activeVulnsLifetime": "forever"}));
        let mut d = ResourceData::from_state(id, AttrMap::new());
        let err = RepositoryResource::new().read(&sc, &mut d).await.unwrap_err();
        assert!(matches!(err, Error::Parse(_)));
    }

    #[test]
    fn test_more_than_one_lifetime_block_rejected() {
        let resource = RepositoryResource::new();
        let config = prepared(
            &resource,
            json!({
                "name": "main",
                "ip_range": "10.0.0.0/8",
                "vulnerability_lifetimes": [{"active_days": 1}, {"active_days": 2}]
            }),
        );
        assert!(resource.schema().validate(&config).has_error());
    }
}
