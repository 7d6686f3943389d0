//! Provider facade
//!
//! Holds the configured upstream client and the registries of resource and data source
//! kinds, and exposes the lifecycle entry points the configuration engine calls. Every
//! entry point returns the resulting state together with diagnostics; errors never escape
//! as `Err`.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tenablesc_client::{RestApiClient, RestClientConfig, ScClient};
use tenablesc_common::Config;
use tenablesc_core::data::string_of;
use tenablesc_core::{AttrMap, Diagnostic, Diagnostics, Error, ResourceData, Result};
use tracing::{debug, info, warn};

use crate::data_sources;
use crate::descriptions;
use crate::resource::{DataSource, Resource};
use crate::resources;
use crate::schema::{Attribute, Plan, Schema};

/// Tracked state of one managed entity
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResourceState {
    pub id: String,
    #[serde(default)]
    pub attributes: AttrMap,
}

/// Outcome of a lifecycle call; `state` is `None` when the entity does not exist
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct OperationResult {
    pub state: Option<ResourceState>,
    pub diagnostics: Diagnostics,
}

impl OperationResult {
    fn failed(err: Error) -> Self {
        Self {
            state: None,
            diagnostics: Diagnostics::from_err(err),
        }
    }
}

pub struct Provider {
    client: Option<Arc<dyn ScClient>>,
    schema: Schema,
    resources: HashMap<String, Arc<dyn Resource>>,
    data_sources: HashMap<String, Arc<dyn DataSource>>,
}

impl Provider {
    /// Unconfigured provider with every resource and data source kind registered
    pub fn new() -> Self {
        let mut provider = Self {
            client: None,
            schema: provider_schema(),
            resources: HashMap::new(),
            data_sources: HashMap::new(),
        };
        for resource in resources::all() {
            provider.register_resource(resource);
        }
        for source in data_sources::all() {
            provider.register_data_source(source);
        }
        provider
    }

    /// Provider bound to an already constructed client
    pub fn with_client(client: Arc<dyn ScClient>) -> Self {
        let mut provider = Self::new();
        provider.client = Some(client);
        provider
    }

    pub fn register_resource(&mut self, resource: Arc<dyn Resource>) {
        self.resources
            .insert(resource.type_name().to_string(), resource);
    }

    pub fn register_data_source(&mut self, source: Arc<dyn DataSource>) {
        self.data_sources
            .insert(source.type_name().to_string(), source);
    }

    // ── Schemas ──────────────────────────────────────────────────────────────

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn resource_types(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.resources.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn data_source_types(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.data_sources.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn resource_schema(&self, type_name: &str) -> Result<&Schema> {
        Ok(self.resource(type_name)?.schema())
    }

    pub fn data_source_schema(&self, type_name: &str) -> Result<&Schema> {
        Ok(self.data_source(type_name)?.schema())
    }

    fn resource(&self, type_name: &str) -> Result<&Arc<dyn Resource>> {
        self.resources
            .get(type_name)
            .ok_or_else(|| Error::UnknownResourceType(type_name.to_string()))
    }

    fn data_source(&self, type_name: &str) -> Result<&Arc<dyn DataSource>> {
        self.data_sources
            .get(type_name)
            .ok_or_else(|| Error::UnknownDataSourceType(type_name.to_string()))
    }

    fn client(&self) -> Result<&dyn ScClient> {
        self.client
            .as_deref()
            .ok_or_else(|| Error::Configuration("provider has not been configured".into()))
    }

    fn bind_resource(&self, type_name: &str) -> Result<(&dyn Resource, &dyn ScClient)> {
        Ok((self.resource(type_name)?.as_ref(), self.client()?))
    }

    fn bind_data_source(&self, type_name: &str) -> Result<(&dyn DataSource, &dyn ScClient)> {
        Ok((self.data_source(type_name)?.as_ref(), self.client()?))
    }

    // ── Configuration ────────────────────────────────────────────────────────

    /// Configure from provider attributes, falling back to `TENABLESC_*` variables
    pub async fn configure(&mut self, values: &AttrMap) -> Diagnostics {
        let mut diags = self.schema.validate(values);
        if diags.has_error() {
            return diags;
        }
        let config = match resolve_config(values, |key| std::env::var(key).ok()) {
            Ok(config) => config,
            Err(e) => {
                diags.push(e.into());
                return diags;
            }
        };
        if let Err(e) = self.connect(&config).await {
            diags.push(e.into());
        }
        diags
    }

    /// Build the REST client and verify the credentials with a current-user call
    pub async fn connect(&mut self, config: &Config) -> Result<()> {
        config.validate()?;
        let access_key = config.provider.access_key.clone().unwrap_or_default();
        let secret_key = config.provider.secret_key.clone().unwrap_or_default();
        let client_config =
            RestClientConfig::new(config.provider.uri.as_str(), access_key, secret_key)
                .timeout(Duration::from_secs(config.provider.request_timeout_seconds))
                .insecure_skip_verify(config.provider.insecure_skip_verify);
        let client: Arc<dyn ScClient> = Arc::new(RestApiClient::new(client_config)?);

        let user = client.current_user().await?;
        info!(uri = %config.provider.uri, user = %user.username, "connected to Tenable.sc");
        self.client = Some(client);
        Ok(())
    }

    // ── Resources ────────────────────────────────────────────────────────────

    /// Static checks of a resource configuration; no upstream calls
    pub fn validate_resource(&self, type_name: &str, config: &AttrMap) -> Diagnostics {
        let resource = match self.resource(type_name) {
            Ok(resource) => resource,
            Err(e) => return Diagnostics::from_err(e),
        };
        let mut diags = resource.schema().validate(config);
        diags.extend(resource.validate(config));
        diags
    }

    /// Planned state for `config` against `prior`, or against nothing for a new entity
    pub fn plan_resource(
        &self,
        type_name: &str,
        prior: Option<&ResourceState>,
        config: &AttrMap,
    ) -> Result<Plan> {
        let resource = self.resource(type_name)?;
        let schema = resource.schema();

        let mut config = config.clone();
        schema.apply_defaults(&mut config);
        schema.normalize(&mut config);

        let empty = AttrMap::new();
        let prior = prior.map_or(&empty, |state| &state.attributes);
        let mut plan = schema.plan(prior, &config);
        resource.customize_plan(prior, &mut plan)?;
        debug!(
            resource = type_name,
            changes = plan.changes.len(),
            replace = plan.requires_replace(),
            "planned"
        );
        Ok(plan)
    }

    pub async fn create(&self, type_name: &str, planned: AttrMap) -> OperationResult {
        let (resource, client) = match self.bind_resource(type_name) {
            Ok(pair) => pair,
            Err(e) => return OperationResult::failed(e),
        };
        let mut d = ResourceData::new(planned);
        let result = resource.create(client, &mut d).await;
        finish(resource, d, result)
    }

    pub async fn read(&self, type_name: &str, state: ResourceState) -> OperationResult {
        let (resource, client) = match self.bind_resource(type_name) {
            Ok(pair) => pair,
            Err(e) => return OperationResult::failed(e),
        };
        let mut d = ResourceData::from_state(state.id, state.attributes);
        let result = resource.read(client, &mut d).await;
        finish(resource, d, result)
    }

    /// Apply `planned` to an existing entity; replacement is delete then create
    pub async fn update(
        &self,
        type_name: &str,
        prior: ResourceState,
        planned: AttrMap,
    ) -> OperationResult {
        let (resource, client) = match self.bind_resource(type_name) {
            Ok(pair) => pair,
            Err(e) => return OperationResult::failed(e),
        };

        let plan = resource.schema().plan(&prior.attributes, &planned);
        if plan.requires_replace() {
            let forced: Vec<&str> = plan
                .changes
                .iter()
                .filter(|c| c.requires_replace)
                .map(|c| c.attribute.as_str())
                .collect();
            info!(resource = type_name, id = %prior.id, attributes = ?forced, "replacing");

            let mut old = ResourceData::from_state(prior.id, prior.attributes);
            let mut diags = match resource.delete(client, &mut old).await {
                Ok(diags) => diags,
                Err(e) => return finish(resource, old, Err(e)),
            };
            let mut d = ResourceData::new(planned);
            let result = resource.create(client, &mut d).await;
            let mut outcome = finish(resource, d, result);
            diags.extend(outcome.diagnostics);
            outcome.diagnostics = diags;
            return outcome;
        }

        let mut d = ResourceData::for_update(prior.id, prior.attributes, planned);
        let result = resource.update(client, &mut d).await;
        finish(resource, d, result)
    }

    pub async fn delete(&self, type_name: &str, state: ResourceState) -> OperationResult {
        let (resource, client) = match self.bind_resource(type_name) {
            Ok(pair) => pair,
            Err(e) => return OperationResult::failed(e),
        };
        let mut d = ResourceData::from_state(state.id, state.attributes);
        match resource.delete(client, &mut d).await {
            Ok(diagnostics) => OperationResult {
                state: None,
                diagnostics,
            },
            Err(e) => finish(resource, d, Err(e)),
        }
    }

    /// Adopt an existing upstream entity by id
    pub async fn import(&self, type_name: &str, id: &str) -> OperationResult {
        let mut outcome = self
            .read(
                type_name,
                ResourceState {
                    id: id.to_string(),
                    attributes: AttrMap::new(),
                },
            )
            .await;
        if outcome.state.is_none() && !outcome.diagnostics.has_error() {
            outcome.diagnostics.push(
                Diagnostic::error("Cannot import non-existent remote object").with_detail(
                    format!("No {} with id {} exists upstream.", type_name, id),
                ),
            );
        }
        outcome
    }

    // ── Data sources ─────────────────────────────────────────────────────────

    pub async fn read_data_source(&self, type_name: &str, config: &AttrMap) -> OperationResult {
        let (source, client) = match self.bind_data_source(type_name) {
            Ok(pair) => pair,
            Err(e) => return OperationResult::failed(e),
        };

        let mut diags = source.schema().validate(config);
        if diags.has_error() {
            return OperationResult {
                state: None,
                diagnostics: diags,
            };
        }

        let mut values = config.clone();
        source.schema().apply_defaults(&mut values);
        let mut d = ResourceData::new(values);
        match source.read(client, &mut d).await {
            Ok(read_diags) => diags.extend(read_diags),
            Err(e) => diags.push(e.into()),
        }
        if diags.has_error() {
            warn!(data_source = type_name, "lookup failed");
            return OperationResult {
                state: None,
                diagnostics: diags,
            };
        }

        let (id, mut attributes) = d.into_state();
        source.schema().normalize(&mut attributes);
        OperationResult {
            state: Some(ResourceState { id, attributes }),
            diagnostics: diags,
        }
    }
}

impl Default for Provider {
    fn default() -> Self {
        Self::new()
    }
}

fn provider_schema() -> Schema {
    Schema::new("Tenable.sc provider")
        .attr(
            "uri",
            Attribute::string().description(descriptions::PROVIDER_URI),
        )
        .attr(
            "access_key",
            Attribute::string()
                .sensitive()
                .description(descriptions::PROVIDER_ACCESS_KEY),
        )
        .attr(
            "secret_key",
            Attribute::string()
                .sensitive()
                .description(descriptions::PROVIDER_SECRET_KEY),
        )
}

/// Explicit attributes win over variables from `var`
fn resolve_config(values: &AttrMap, var: impl Fn(&str) -> Option<String>) -> Result<Config> {
    let mut config = Config::builder().build().merge_vars(var);

    let uri = string_of("uri", values.get("uri"))?;
    if !uri.is_empty() {
        config.provider.uri = uri;
    }
    let access_key = string_of("access_key", values.get("access_key"))?;
    if !access_key.is_empty() {
        config.provider.access_key = Some(access_key);
    }
    let secret_key = string_of("secret_key", values.get("secret_key"))?;
    if !secret_key.is_empty() {
        config.provider.secret_key = Some(secret_key);
    }
    Ok(config)
}

/// Turn a handler outcome into state plus diagnostics
fn finish(
    resource: &dyn Resource,
    d: ResourceData,
    result: Result<Diagnostics>,
) -> OperationResult {
    let diagnostics = match result {
        Ok(diags) => diags,
        Err(e) => {
            warn!(resource = resource.type_name(), id = d.id(), error = %e, code = e.code(), "operation failed");
            Diagnostics::from_err(e)
        }
    };
    if d.is_absent() {
        return OperationResult {
            state: None,
            diagnostics,
        };
    }
    let (id, mut attributes) = d.into_state();
    resource.schema().normalize(&mut attributes);
    OperationResult {
        state: Some(ResourceState { id, attributes }),
        diagnostics,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tenablesc_client::InMemoryClient;
    use tenablesc_core::AttrValue;

    fn attrs(value: serde_json::Value) -> AttrMap {
        serde_json::from_value(value).unwrap()
    }

    fn offline() -> (Arc<InMemoryClient>, Provider) {
        let sc = Arc::new(InMemoryClient::new());
        let provider = Provider::with_client(sc.clone());
        (sc, provider)
    }

    fn first_summary(diags: &Diagnostics) -> String {
        diags.iter().next().unwrap().summary.clone()
    }

    #[test]
    fn test_registries() {
        let provider = Provider::new();
        assert_eq!(provider.resource_types().len(), 12);
        assert_eq!(provider.data_source_types().len(), 7);
        assert!(provider.resource_schema("tenablesc_role").is_ok());
        assert!(matches!(
            provider.resource_schema("tenablesc_user"),
            Err(Error::UnknownResourceType(_))
        ));
    }

    #[test]
    fn test_resolve_config_prefers_explicit_values() {
        let env = |key: &str| match key {
            "TENABLESC_URI" => Some("https://env.example.com".to_string()),
            "TENABLESC_ACCESS_KEY" => Some("env-access".to_string()),
            _ => None,
        };
        let config = resolve_config(
            &attrs(json!({"access_key": "explicit", "secret_key": "s"})),
            env,
        )
        .unwrap();
        assert_eq!(config.provider.uri, "https://env.example.com");
        assert_eq!(config.provider.access_key.as_deref(), Some("explicit"));
        assert_eq!(config.provider.secret_key.as_deref(), Some("s"));
    }

    #[tokio::test]
    async fn test_connect_requires_credentials() {
        let mut provider = Provider::new();
        let config = Config::builder().uri("https://sc.example.com").build();
        let err = provider.connect(&config).await.unwrap_err();
        assert!(matches!(err, Error::MissingConfig { .. }));
    }

    #[tokio::test]
    async fn test_unconfigured_provider_reports_diagnostic() {
        let provider = Provider::new();
        let outcome = provider
            .create("tenablesc_scan_zone", attrs(json!({"name": "z"})))
            .await;
        assert!(outcome.state.is_none());
        assert!(first_summary(&outcome.diagnostics).contains("not been configured"));
    }

    #[test]
    fn test_validate_combines_schema_and_resource_checks() {
        let provider = Provider::new();
        let diags = provider.validate_resource("tenablesc_auditfile", &attrs(json!({"name": "a"})));
        assert!(first_summary(&diags).contains("either specify path or content"));

        let diags = provider.validate_resource("tenablesc_asset", &attrs(json!({"name": "a", "colour": "red"})));
        assert_eq!(diags.errors().count(), 2);
    }

    #[tokio::test]
    async fn test_plan_create_and_read_cycle() {
        let (sc, provider) = offline();
        let config = attrs(json!({"name": "dmz", "zone_cidrs": ["10.0.0.0/8"]}));

        let plan = provider.plan_resource("tenablesc_scan_zone", None, &config).unwrap();
        assert_eq!(plan.planned["description"], AttrValue::from("Managed by Terraform"));

        let created = provider.create("tenablesc_scan_zone", plan.planned).await;
        assert!(created.diagnostics.is_empty());
        let state = created.state.unwrap();
        assert_eq!(sc.count("zone"), 1);

        let plan = provider
            .plan_resource("tenablesc_scan_zone", Some(&state), &config)
            .unwrap();
        assert!(!plan.has_changes());

        sc.remove("zone", &state.id);
        let read = provider.read("tenablesc_scan_zone", state).await;
        assert!(read.state.is_none());
        assert!(read.diagnostics.is_empty());
    }

    #[tokio::test]
    async fn test_force_new_change_replaces() {
        let (sc, provider) = offline();
        let config = attrs(json!({"name": "web", "type": "static", "values": ["10.0.0.1"]}));
        let plan = provider.plan_resource("tenablesc_asset", None, &config).unwrap();
        let state = provider.create("tenablesc_asset", plan.planned).await.state.unwrap();

        let config = attrs(json!({"name": "web", "type": "dnsname", "values": ["a.example.com"]}));
        let plan = provider
            .plan_resource("tenablesc_asset", Some(&state), &config)
            .unwrap();
        assert!(plan.requires_replace());

        let old_id = state.id.clone();
        let outcome = provider.update("tenablesc_asset", state, plan.planned).await;
        let new_state = outcome.state.unwrap();
        assert_ne!(new_state.id, old_id);
        assert!(sc.record("asset", &old_id).is_none());
        assert!(sc.calls().contains(&format!("DELETE asset/{}", old_id)));
    }

    #[tokio::test]
    async fn test_in_place_update() {
        let (sc, provider) = offline();
        let config = attrs(json!({"name": "web", "type": "static"}));
        let plan = provider.plan_resource("tenablesc_asset", None, &config).unwrap();
        let state = provider.create("tenablesc_asset", plan.planned).await.state.unwrap();

        let config = attrs(json!({"name": "web", "type": "static", "description": "edge"}));
        let plan = provider
            .plan_resource("tenablesc_asset", Some(&state), &config)
            .unwrap();
        assert!(!plan.requires_replace());
        let id = state.id.clone();
        let outcome = provider.update("tenablesc_asset", state, plan.planned).await;
        assert_eq!(outcome.state.unwrap().id, id);
        assert!(sc.calls().contains(&format!("PATCH asset/{}", id)));
    }

    #[tokio::test]
    async fn test_import_existing_and_missing() {
        let (sc, provider) = offline();
        let id = sc.seed("zone", json!({"name": "dmz", "ipList": "10.0.0.0/8"}));

        let outcome = provider.import("tenablesc_scan_zone", &id).await;
        let state = outcome.state.unwrap();
        assert_eq!(state.attributes["name"], AttrValue::from("dmz"));

        let outcome = provider.import("tenablesc_scan_zone", "999").await;
        assert!(outcome.state.is_none());
        assert_eq!(
            first_summary(&outcome.diagnostics),
            "Cannot import non-existent remote object"
        );
    }

    #[tokio::test]
    async fn test_delete_forgets_state() {
        let (sc, provider) = offline();
        let id = sc.seed("zone", json!({"name": "dmz"}));
        let outcome = provider
            .delete(
                "tenablesc_scan_zone",
                ResourceState {
                    id: id.clone(),
                    attributes: AttrMap::new(),
                },
            )
            .await;
        assert!(outcome.state.is_none());
        assert!(outcome.diagnostics.is_empty());
        assert_eq!(sc.count("zone"), 0);
    }

    #[tokio::test]
    async fn test_upstream_failure_keeps_text() {
        let (sc, provider) = offline();
        sc.fail_next("name already in use");
        let outcome = provider
            .create(
                "tenablesc_scan_zone",
                attrs(json!({"name": "dmz", "zone_cidrs": ["10.0.0.0/8"]})),
            )
            .await;
        assert!(outcome.state.is_none());
        assert!(first_summary(&outcome.diagnostics).contains("name already in use"));
    }

    #[tokio::test]
    async fn test_read_data_source() {
        let (sc, provider) = offline();
        sc.seed("repository", json!({"name": "main"}));

        let outcome = provider
            .read_data_source("tenablesc_repositories", &AttrMap::new())
            .await;
        let state = outcome.state.unwrap();
        assert_eq!(state.id, "repositories:.*");

        let outcome = provider
            .read_data_source("tenablesc_repository", &attrs(json!({"name": "nope"})))
            .await;
        assert!(outcome.state.is_none());
        assert!(outcome.diagnostics.has_error());
    }
}
