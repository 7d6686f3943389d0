//! `tenablesc_accept_risk`

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, Timelike, Utc};
use tenablesc_client::{AcceptRiskRule, ScClient};
use tenablesc_core::{
    AttrValue, AttributePath, Diagnostic, Diagnostics, Error, ResourceData, Result,
};
use tracing::{debug, trace};

use super::{configured_protocol, reference, reference_id, risk_rule_schema};
use crate::descriptions;
use crate::normalize::{parse_rfc3339, timestamps_equivalent};
use crate::recovery::recover_not_found;
use crate::resource::Resource;
use crate::schema::{Attribute, Schema};
use crate::validate::protocol_name;

const TYPE_NAME: &str = "tenablesc_accept_risk";

/// Expiration value meaning the rule never expires
pub const NEVER_EXPIRES: &str = "-1";

/// Expirations are minute-granular; seconds are always rendered as `00`
const EXPIRATION_FORMAT: &str = "%Y-%m-%dT%H:%M:00Z";

pub struct AcceptRisk {
    schema: Schema,
}

impl AcceptRisk {
    pub fn new() -> Self {
        let schema = risk_rule_schema(descriptions::resource_accept_risk()).attr(
            "expiration",
            Attribute::string()
                .default(NEVER_EXPIRES)
                .validate(validate_expiration_attr)
                .suppress_diff(timestamps_equivalent)
                .description(descriptions::ACCEPT_RISK_EXPIRATION),
        );
        Self { schema }
    }
}

impl Default for AcceptRisk {
    fn default() -> Self {
        Self::new()
    }
}

// ── Expiration handling ──────────────────────────────────────────────────────

/// Parse a configured expiration; seconds must be zero
pub fn parse_expiration(value: &str) -> Result<DateTime<FixedOffset>> {
    let parsed = parse_rfc3339(value).ok_or_else(|| {
        Error::validation(
            "expiration",
            format!(
                "cannot parse '{}' as a time of the form YYYY-MM-DDTHH:MM:00Z07:00",
                value
            ),
        )
    })?;
    if parsed.second() != 0 || parsed.nanosecond() != 0 {
        return Err(Error::validation(
            "expiration",
            format!("'{}' must have zero seconds", value),
        ));
    }
    Ok(parsed)
}

/// Upstream `expires` for a configured expiration; empty when the rule never expires
pub fn expiration_to_upstream(value: &str) -> Result<String> {
    if value == NEVER_EXPIRES || value.is_empty() {
        return Ok(String::new());
    }
    Ok(parse_expiration(value)?.timestamp().to_string())
}

/// Configured form of an upstream `expires` value
pub fn expiration_from_upstream(expires: &str) -> Result<String> {
    let expires = expires.trim();
    if expires.is_empty() || expires == NEVER_EXPIRES {
        return Ok(NEVER_EXPIRES.to_string());
    }
    let seconds: i64 = expires
        .parse()
        .map_err(|_| Error::Parse(format!("expiration '{}' is not unix seconds", expires)))?;
    let time = DateTime::<Utc>::from_timestamp(seconds, 0)
        .ok_or_else(|| Error::Parse(format!("expiration {} is out of range", seconds)))?;
    Ok(time.format(EXPIRATION_FORMAT).to_string())
}

fn past_expiration_warning(expiration: &str) -> Diagnostic {
    Diagnostic::warning(format!(
        "Time {} for expiration is in the past; expired rules are deleted automatically by tenable.sc.",
        expiration
    ))
}

fn is_past(expiration: &str) -> bool {
    parse_rfc3339(expiration).is_some_and(|t| t < Utc::now())
}

pub fn validate_expiration_attr(value: &AttrValue, path: &AttributePath) -> Diagnostics {
    let mut diags = Diagnostics::new();
    let Some(expiration) = value.as_str() else {
        return diags;
    };
    if expiration == NEVER_EXPIRES {
        return diags;
    }
    match parse_expiration(expiration) {
        Err(e) => diags.push(Diagnostic::from(e).at(path.clone())),
        Ok(_) if is_past(expiration) => diags.push(past_expiration_warning(expiration).at(path.clone())),
        Ok(_) => {}
    }
    diags
}

// ── Handlers ─────────────────────────────────────────────────────────────────

fn build_input(d: &ResourceData) -> Result<AcceptRiskRule> {
    Ok(AcceptRiskRule {
        plugin: reference(&d.get_string("plugin_id")?),
        repository: reference(&d.get_string("repository_id")?),
        host_type: d.get_string("host_type")?,
        host_value: d.get_string("host_value")?,
        port: d.get_string("port")?,
        protocol: configured_protocol(d)?,
        expires: expiration_to_upstream(&d.get_string("expiration")?)?,
        comments: d.get_string("comments")?,
        ..Default::default()
    })
}

#[async_trait]
impl Resource for AcceptRisk {
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
        debug!(response = ?created, "created accept risk rule");
        d.set_id(created.id.as_str());
        self.read(client, d).await
    }

    async fn read(&self, client: &dyn ScClient, d: &mut ResourceData) -> Result<Diagnostics> {
        trace!(resource = TYPE_NAME, id = d.id(), "start of read");
        let result = client.get::<AcceptRiskRule>(d.id()).await;
        let Some(rule) = recover_not_found(d, result)? else {
            return Ok(Diagnostics::new());
        };
        debug!(response = ?rule, "read accept risk rule");

        d.set("host_type", rule.host_type);
        d.set("host_value", rule.host_value);
        d.set("port", rule.port);
        d.set("protocol", protocol_name(&rule.protocol));
        d.set("comments", rule.comments);
        d.set("repository_id", reference_id(&rule.repository));
        d.set("plugin_id", reference_id(&rule.plugin));
        d.set_id(rule.id.as_str());

        let mut diags = Diagnostics::new();
        let expiration = expiration_from_upstream(&rule.expires)?;
        if expiration != NEVER_EXPIRES && is_past(&expiration) {
            diags.push(past_expiration_warning(&expiration));
        }
        d.set("expiration", expiration);
        Ok(diags)
    }

    /// Upstream rules cannot be modified in place; a failed create leaves the rule absent
    async fn update(&self, client: &dyn ScClient, d: &mut ResourceData) -> Result<Diagnostics> {
        trace!(resource = TYPE_NAME, id = d.id(), "start of update");
        let mut diags = self.delete(client, d).await?;
        diags.extend(self.create(client, d).await?);
        Ok(diags)
    }

    async fn delete(&self, client: &dyn ScClient, d: &mut ResourceData) -> Result<Diagnostics> {
        trace!(resource = TYPE_NAME, id = d.id(), "start of delete");
        let result = client.delete::<AcceptRiskRule>(d.id()).await;
        recover_not_found(d, result)?;
        Ok(Diagnostics::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::testing::planned;
    use serde_json::json;
    use tenablesc_client::InMemoryClient;
    use tenablesc_core::AttrMap;

    fn client() -> InMemoryClient {
        InMemoryClient::new()
    }

    #[test]
    fn test_expiration_to_upstream() {
        assert_eq!(expiration_to_upstream("-1").unwrap(), "");
        assert_eq!(
            expiration_to_upstream("2099-01-01T00:00:00Z").unwrap(),
            "4070908800"
        );
        assert_eq!(
            expiration_to_upstream("2098-12-31T16:00:00-08:00").unwrap(),
            "4070908800"
        );
        assert!(expiration_to_upstream("2099-01-01T00:00:30Z").is_err());
        assert!(expiration_to_upstream("next tuesday").is_err());
    }

    #[test]
    fn test_expiration_from_upstream() {
        assert_eq!(expiration_from_upstream("-1").unwrap(), "-1");
        assert_eq!(expiration_from_upstream("").unwrap(), "-1");
        assert_eq!(
            expiration_from_upstream("4070908800").unwrap(),
            "2099-01-01T00:00:00Z"
        );
        assert!(expiration_from_upstream("soon").is_err());
    }

    #[test]
    fn test_expiration_validator() {
        let path = AttributePath::attribute("expiration");
        assert!(validate_expiration_attr(&"-1".into(), &path).is_empty());
        assert!(validate_expiration_attr(&"2099-01-01T00:00:00Z".into(), &path).is_empty());

        let past = validate_expiration_attr(&"2001-01-01T00:00:00Z".into(), &path);
        assert!(!past.has_error());
        assert_eq!(past.warnings().count(), 1);
        assert!(past
            .iter()
            .next()
            .unwrap()
            .summary
            .contains("expired rules are deleted automatically"));

        assert!(validate_expiration_attr(&"yesterday".into(), &path).has_error());
    }

    #[tokio::test]
    async fn test_create_maps_protocol_and_expiration() {
        let sc = client();
        let resource = AcceptRisk::new();
        let mut d = planned(
            &resource,
            json!({
                "repository_id": "1",
                "plugin_id": "19506",
                "host_type": "ip",
                "host_value": "10.0.0.1,10.0.0.2",
                "protocol": "TCP",
                "expiration": "2099-01-01T00:00:00Z"
            }),
        );

        let diags = resource.create(&sc, &mut d).await.unwrap();
        assert!(diags.is_empty());

        let stored = sc.record("acceptRiskRule", d.id()).unwrap();
        assert_eq!(stored["protocol"], "6");
        assert_eq!(stored["expires"], "4070908800");
        assert_eq!(stored["plugin"]["id"], "19506");
        assert_eq!(stored["comments"], "Managed by Terraform");

        assert_eq!(d.get_string("protocol").unwrap(), "tcp");
        assert_eq!(d.get_string("expiration").unwrap(), "2099-01-01T00:00:00Z");
        assert_eq!(d.get_string("port").unwrap(), "any");
    }

    #[tokio::test]
    async fn test_never_expiring_rule_omits_expires() {
        let sc = client();
        let resource = AcceptRisk::new();
        let mut d = planned(&resource, json!({"repository_id": "1", "plugin_id": "2"}));
        resource.create(&sc, &mut d).await.unwrap();

        let stored = sc.record("acceptRiskRule", d.id()).unwrap();
        assert!(stored.get("expires").is_none());
        assert_eq!(d.get_string("expiration").unwrap(), "-1");
    }

    #[tokio::test]
    async fn test_read_warns_on_past_expiration() {
        let sc = client();
        let id = sc.seed(
            "acceptRiskRule",
            json!({"plugin": {"id": "2"}, "repository": {"id": "1"}, "expires": "978307200", "protocol": "17"}),
        );
        let mut d = ResourceData::from_state(id, AttrMap::new());
        let diags = AcceptRisk::new().read(&sc, &mut d).await.unwrap();

        assert!(!diags.has_error());
        assert_eq!(diags.warnings().count(), 1);
        assert_eq!(d.get_string("expiration").unwrap(), "2001-01-01T00:00:00Z");
        assert_eq!(d.get_string("protocol").unwrap(), "udp");
    }

    #[tokio::test]
    async fn test_read_missing_rule_clears_id() {
        let sc = client();
        let mut d = ResourceData::from_state("404", AttrMap::new());
        let diags = AcceptRisk::new().read(&sc, &mut d).await.unwrap();
        assert!(diags.is_empty());
        assert!(d.is_absent());
    }

    #[tokio::test]
    async fn test_update_replaces_rule() {
        let sc = client();
        let resource = AcceptRisk::new();
        let mut d = planned(&resource, json!({"repository_id": "1", "plugin_id": "2"}));
        resource.create(&sc, &mut d).await.unwrap();
        let first = d.id().to_string();

        d.set("comments", "reviewed");
        resource.update(&sc, &mut d).await.unwrap();

        assert_ne!(d.id(), first);
        assert!(sc.record("acceptRiskRule", &first).is_none());
        assert_eq!(sc.count("acceptRiskRule"), 1);
        assert_eq!(d.get_string("comments").unwrap(), "reviewed");
    }

    #[tokio::test]
    async fn test_invalid_protocol_fails_before_network() {
        let sc = client();
        let resource = AcceptRisk::new();
        let mut d = planned(
            &resource,
            json!({"repository_id": "1", "plugin_id": "2", "protocol": "sctp"}),
        );
        let err = resource.create(&sc, &mut d).await.unwrap_err();
        assert!(err.to_string().contains("failed to get protocol id"));
        assert!(err.to_string().contains("'sctp'"));
        assert!(sc.calls().is_empty());
    }

    #[tokio::test]
    async fn test_upstream_error_text_is_kept() {
        let sc = client();
        sc.fail_next("Plugin ID 2 is invalid");
        let resource = AcceptRisk::new();
        let mut d = planned(&resource, json!({"repository_id": "1", "plugin_id": "2"}));
        let err = resource.create(&sc, &mut d).await.unwrap_err();
        assert!(err.to_string().contains("Plugin ID 2 is invalid"));
        assert!(d.is_absent());
    }
}
