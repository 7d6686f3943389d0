//! Upstream record types
//!
//! One record per REST resource kind, serialized with the field names and quirks of the
//! Tenable.sc API. Identifiers are [`ProbablyString`]; string-encoded booleans are
//! [`FakeBool`]. Empty fields are omitted on the wire so the same record serves as a
//! full create body and as a partial PATCH body.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tenablesc_core::{FakeBool, ProbablyString};

/// A record addressable under `/rest/{ENDPOINT}`
pub trait ApiObject: Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Human-readable kind, used in errors and logs
    const KIND: &'static str;
    /// Path segment under `/rest/`
    const ENDPOINT: &'static str;
    /// Field projection requested on reads
    const FIELDS: &'static [&'static str];

    fn id(&self) -> &ProbablyString;
}

/// Fields shared by most upstream records
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaseInfo {
    #[serde(default, skip_serializing_if = "ProbablyString::is_empty")]
    pub id: ProbablyString,
    #[serde(
        default,
        deserialize_with = "wire::lenient_string",
        skip_serializing_if = "String::is_empty"
    )]
    pub name: String,
    #[serde(
        default,
        deserialize_with = "wire::lenient_string",
        skip_serializing_if = "String::is_empty"
    )]
    pub description: String,
}

impl BaseInfo {
    /// Reference to another record by id only
    pub fn reference(id: impl Into<ProbablyString>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }

    pub fn named(id: impl Into<ProbablyString>, name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: description.into(),
        }
    }
}

// ── Roles ────────────────────────────────────────────────────────────────────

/// User role with its permission flags
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Role {
    #[serde(flatten)]
    pub base: BaseInfo,
    #[serde(default, skip_serializing_if = "FakeBool::is_unset")]
    pub perm_manage_groups: FakeBool,
    #[serde(default, skip_serializing_if = "FakeBool::is_unset")]
    pub perm_manage_roles: FakeBool,
    #[serde(default, skip_serializing_if = "FakeBool::is_unset")]
    pub perm_manage_images: FakeBool,
    #[serde(default, skip_serializing_if = "FakeBool::is_unset")]
    pub perm_manage_group_relationships: FakeBool,
    #[serde(default, skip_serializing_if = "FakeBool::is_unset")]
    pub perm_manage_blackout_windows: FakeBool,
    #[serde(default, skip_serializing_if = "FakeBool::is_unset")]
    pub perm_manage_attribute_sets: FakeBool,
    #[serde(default, skip_serializing_if = "FakeBool::is_unset")]
    pub perm_create_tickets: FakeBool,
    #[serde(default, skip_serializing_if = "FakeBool::is_unset")]
    pub perm_create_audit_files: FakeBool,
    #[serde(
        default,
        rename = "permCreateLDAPAssets",
        skip_serializing_if = "FakeBool::is_unset"
    )]
    pub perm_create_ldap_assets: FakeBool,
    #[serde(default, skip_serializing_if = "FakeBool::is_unset")]
    pub perm_create_policies: FakeBool,
    #[serde(default, skip_serializing_if = "FakeBool::is_unset")]
    pub perm_purge_tickets: FakeBool,
    #[serde(default, skip_serializing_if = "FakeBool::is_unset")]
    pub perm_purge_scan_results: FakeBool,
    #[serde(default, skip_serializing_if = "FakeBool::is_unset")]
    pub perm_purge_report_results: FakeBool,
    #[serde(default, skip_serializing_if = "FakeBool::is_unset")]
    pub perm_scan: FakeBool,
    #[serde(default, skip_serializing_if = "FakeBool::is_unset")]
    pub perm_agents_scan: FakeBool,
    #[serde(default, skip_serializing_if = "FakeBool::is_unset")]
    pub perm_share_objects: FakeBool,
    #[serde(default, skip_serializing_if = "FakeBool::is_unset")]
    pub perm_update_feeds: FakeBool,
    #[serde(default, skip_serializing_if = "FakeBool::is_unset")]
    pub perm_upload_nessus_results: FakeBool,
    #[serde(default, skip_serializing_if = "FakeBool::is_unset")]
    pub perm_view_org_logs: FakeBool,
    #[serde(default, skip_serializing_if = "FakeBool::is_unset")]
    pub perm_manage_accept_risk_rules: FakeBool,
    #[serde(default, skip_serializing_if = "FakeBool::is_unset")]
    pub perm_manage_recast_risk_rules: FakeBool,
}

impl ApiObject for Role {
    const KIND: &'static str = "role";
    const ENDPOINT: &'static str = "role";
    const FIELDS: &'static [&'static str] = &[
        "id",
        "name",
        "description",
        "permManageGroups",
        "permManageRoles",
        "permManageImages",
        "permManageGroupRelationships",
        "permManageBlackoutWindows",
        "permManageAttributeSets",
        "permCreateTickets",
        "permCreateAuditFiles",
        "permCreateLDAPAssets",
        "permCreatePolicies",
        "permPurgeTickets",
        "permPurgeScanResults",
        "permPurgeReportResults",
        "permScan",
        "permAgentsScan",
        "permShareObjects",
        "permUpdateFeeds",
        "permUploadNessusResults",
        "permViewOrgLogs",
        "permManageAcceptRiskRules",
        "permManageRecastRiskRules",
    ];

    fn id(&self) -> &ProbablyString {
        &self.base.id
    }
}

// ── Organizations ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Organization {
    #[serde(flatten)]
    pub base: BaseInfo,
    #[serde(
        default,
        deserialize_with = "wire::lenient_string",
        skip_serializing_if = "String::is_empty"
    )]
    pub zone_selection: String,
    /// `None` leaves the list untouched on update; `Some("")` clears it
    #[serde(
        default,
        rename = "restrictedIPs",
        deserialize_with = "wire::lenient_some_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub restricted_ips: Option<String>,
    #[serde(
        default,
        deserialize_with = "wire::lenient_string",
        skip_serializing_if = "String::is_empty"
    )]
    pub vuln_scoring_system: String,
    /// `None` leaves zones untouched on update; `Some(vec![])` clears them
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zones: Option<Vec<BaseInfo>>,
}

impl ApiObject for Organization {
    const KIND: &'static str = "organization";
    const ENDPOINT: &'static str = "organization";
    const FIELDS: &'static [&'static str] = &[
        "id",
        "name",
        "description",
        "zoneSelection",
        "restrictedIPs",
        "vulnScoringSystem",
        "zones",
    ];

    fn id(&self) -> &ProbablyString {
        &self.base.id
    }
}

// ── Repositories ─────────────────────────────────────────────────────────────

/// Organization granted access to a repository
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepoOrganization {
    pub id: ProbablyString,
    #[serde(default, deserialize_with = "wire::lenient_string")]
    pub group_assign: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Repository {
    #[serde(flatten)]
    pub base: BaseInfo,
    #[serde(
        default,
        rename = "type",
        deserialize_with = "wire::lenient_string",
        skip_serializing_if = "String::is_empty"
    )]
    pub repo_type: String,
    #[serde(
        default,
        deserialize_with = "wire::lenient_string",
        skip_serializing_if = "String::is_empty"
    )]
    pub data_format: String,
    #[serde(
        default,
        deserialize_with = "wire::lenient_string",
        skip_serializing_if = "String::is_empty"
    )]
    pub ip_range: String,
    #[serde(
        default,
        deserialize_with = "wire::lenient_string",
        skip_serializing_if = "String::is_empty"
    )]
    pub trending_days: String,
    #[serde(default, skip_serializing_if = "FakeBool::is_unset")]
    pub trend_with_raw: FakeBool,
    #[serde(
        default,
        deserialize_with = "wire::lenient_string",
        skip_serializing_if = "String::is_empty"
    )]
    pub active_vulns_lifetime: String,
    #[serde(
        default,
        deserialize_with = "wire::lenient_string",
        skip_serializing_if = "String::is_empty"
    )]
    pub passive_vulns_lifetime: String,
    #[serde(
        default,
        deserialize_with = "wire::lenient_string",
        skip_serializing_if = "String::is_empty"
    )]
    pub mitigated_vulns_lifetime: String,
    #[serde(
        default,
        deserialize_with = "wire::lenient_string",
        skip_serializing_if = "String::is_empty"
    )]
    pub compliance_vulns_lifetime: String,
    /// `None` leaves access untouched on update; `Some(vec![])` revokes it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organizations: Option<Vec<RepoOrganization>>,
}

impl ApiObject for Repository {
    const KIND: &'static str = "repository";
    const ENDPOINT: &'static str = "repository";
    const FIELDS: &'static [&'static str] = &[
        "id",
        "name",
        "description",
        "type",
        "dataFormat",
        "ipRange",
        "trendingDays",
        "trendWithRaw",
        "activeVulnsLifetime",
        "passiveVulnsLifetime",
        "mitigatedVulnsLifetime",
        "complianceVulnsLifetime",
        "organizations",
    ];

    fn id(&self) -> &ProbablyString {
        &self.base.id
    }
}

// ── Scan policies ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanPolicyFamily {
    pub id: ProbablyString,
    #[serde(
        default,
        deserialize_with = "wire::lenient_string",
        skip_serializing_if = "String::is_empty"
    )]
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanPolicy {
    #[serde(flatten)]
    pub base: BaseInfo,
    #[serde(
        default,
        deserialize_with = "wire::lenient_string",
        skip_serializing_if = "String::is_empty"
    )]
    pub tags: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub policy_template: Option<BaseInfo>,
    /// Values are strings or string arrays
    #[serde(default, deserialize_with = "wire::null_default")]
    pub preferences: Map<String, Value>,
    /// Preference keys to delete upstream; write-only
    #[serde(default, skip_serializing_if = "Vec::is_empty", skip_deserializing)]
    pub remove_prefs: Vec<String>,
    #[serde(
        default,
        deserialize_with = "wire::null_default",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub families: Vec<ScanPolicyFamily>,
    #[serde(
        default,
        deserialize_with = "wire::null_default",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub audit_files: Vec<BaseInfo>,
}

impl ApiObject for ScanPolicy {
    const KIND: &'static str = "scan policy";
    const ENDPOINT: &'static str = "policy";
    const FIELDS: &'static [&'static str] = &[
        "id",
        "name",
        "description",
        "tags",
        "policyTemplate",
        "preferences",
        "families",
        "auditFiles",
    ];

    fn id(&self) -> &ProbablyString {
        &self.base.id
    }
}

// ── Scans ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanSchedule {
    #[serde(rename = "type", default, deserialize_with = "wire::lenient_string")]
    pub schedule_type: String,
    #[serde(default, deserialize_with = "wire::lenient_string")]
    pub start: String,
    #[serde(default, deserialize_with = "wire::lenient_string")]
    pub repeat_rule: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scan {
    #[serde(flatten)]
    pub base: BaseInfo,
    #[serde(
        default,
        rename = "type",
        deserialize_with = "wire::lenient_string",
        skip_serializing_if = "String::is_empty"
    )]
    pub scan_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub policy: Option<BaseInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repository: Option<BaseInfo>,
    #[serde(default, skip_serializing_if = "FakeBool::is_unset")]
    pub dhcp_tracking: FakeBool,
    #[serde(default, skip_serializing_if = "FakeBool::is_unset")]
    pub scanning_virtual_hosts: FakeBool,
    #[serde(
        default,
        deserialize_with = "wire::lenient_string",
        skip_serializing_if = "String::is_empty"
    )]
    pub timeout_action: String,
    #[serde(
        default,
        deserialize_with = "wire::lenient_string",
        skip_serializing_if = "String::is_empty"
    )]
    pub max_scan_time: String,
    #[serde(
        default,
        deserialize_with = "wire::lenient_string",
        skip_serializing_if = "String::is_empty"
    )]
    pub ip_list: String,
    #[serde(
        default,
        deserialize_with = "wire::null_default",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub assets: Vec<BaseInfo>,
    #[serde(
        default,
        deserialize_with = "wire::null_default",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub credentials: Vec<BaseInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schedule: Option<ScanSchedule>,
}

impl ApiObject for Scan {
    const KIND: &'static str = "scan";
    const ENDPOINT: &'static str = "scan";
    const FIELDS: &'static [&'static str] = &[
        "id",
        "name",
        "description",
        "type",
        "policy",
        "repository",
        "dhcpTracking",
        "scanningVirtualHosts",
        "timeoutAction",
        "maxScanTime",
        "ipList",
        "assets",
        "credentials",
        "schedule",
    ];

    fn id(&self) -> &ProbablyString {
        &self.base.id
    }
}

// ── Assets ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Asset {
    #[serde(flatten)]
    pub base: BaseInfo,
    #[serde(
        default,
        rename = "type",
        deserialize_with = "wire::lenient_string",
        skip_serializing_if = "String::is_empty"
    )]
    pub asset_type: String,
    #[serde(
        default,
        rename = "definedDNSNames",
        with = "wire::comma_list",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub defined_dns_names: Vec<String>,
    #[serde(
        default,
        rename = "definedIPs",
        with = "wire::comma_list",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub defined_ips: Vec<String>,
}

impl ApiObject for Asset {
    const KIND: &'static str = "asset";
    const ENDPOINT: &'static str = "asset";
    const FIELDS: &'static [&'static str] =
        &["id", "name", "description", "type", "definedDNSNames", "definedIPs"];

    fn id(&self) -> &ProbablyString {
        &self.base.id
    }
}

// ── Scan zones ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanZone {
    #[serde(flatten)]
    pub base: BaseInfo,
    #[serde(default, with = "wire::comma_list", skip_serializing_if = "Vec::is_empty")]
    pub ip_list: Vec<String>,
}

impl ApiObject for ScanZone {
    const KIND: &'static str = "scan zone";
    const ENDPOINT: &'static str = "zone";
    const FIELDS: &'static [&'static str] = &["id", "name", "description", "ipList"];

    fn id(&self) -> &ProbablyString {
        &self.base.id
    }
}

// ── Audit files ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditFile {
    #[serde(flatten)]
    pub base: BaseInfo,
    #[serde(
        default,
        deserialize_with = "wire::lenient_string",
        skip_serializing_if = "String::is_empty"
    )]
    pub filename: String,
    #[serde(
        default,
        deserialize_with = "wire::lenient_string",
        skip_serializing_if = "String::is_empty"
    )]
    pub original_filename: String,
    #[serde(
        default,
        deserialize_with = "wire::lenient_string",
        skip_serializing_if = "String::is_empty"
    )]
    pub version: String,
}

impl ApiObject for AuditFile {
    const KIND: &'static str = "audit file";
    const ENDPOINT: &'static str = "auditFile";
    const FIELDS: &'static [&'static str] =
        &["id", "name", "description", "filename", "originalFilename", "version"];

    fn id(&self) -> &ProbablyString {
        &self.base.id
    }
}

// ── Risk rules ───────────────────────────────────────────────────────────────

/// Rule accepting the risk of a plugin finding, optionally until an expiry
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AcceptRiskRule {
    #[serde(default, skip_serializing_if = "ProbablyString::is_empty")]
    pub id: ProbablyString,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plugin: Option<BaseInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repository: Option<BaseInfo>,
    #[serde(default, deserialize_with = "wire::lenient_string")]
    pub host_type: String,
    #[serde(default, deserialize_with = "wire::lenient_string")]
    pub host_value: String,
    #[serde(default, deserialize_with = "wire::lenient_string")]
    pub port: String,
    #[serde(default, deserialize_with = "wire::lenient_string")]
    pub protocol: String,
    /// Unix seconds, or `-1` for never
    #[serde(
        default,
        deserialize_with = "wire::lenient_string",
        skip_serializing_if = "String::is_empty"
    )]
    pub expires: String,
    #[serde(default, deserialize_with = "wire::lenient_string")]
    pub comments: String,
}

impl ApiObject for AcceptRiskRule {
    const KIND: &'static str = "accept risk rule";
    const ENDPOINT: &'static str = "acceptRiskRule";
    const FIELDS: &'static [&'static str] = &[
        "id",
        "plugin",
        "repository",
        "hostType",
        "hostValue",
        "port",
        "protocol",
        "expires",
        "comments",
    ];

    fn id(&self) -> &ProbablyString {
        &self.id
    }
}

/// Rule overriding the severity of a plugin finding
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecastRiskRule {
    #[serde(default, skip_serializing_if = "ProbablyString::is_empty")]
    pub id: ProbablyString,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plugin: Option<BaseInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repository: Option<BaseInfo>,
    #[serde(default, deserialize_with = "wire::lenient_string")]
    pub new_severity: String,
    #[serde(default, deserialize_with = "wire::lenient_string")]
    pub host_type: String,
    #[serde(default, deserialize_with = "wire::lenient_string")]
    pub host_value: String,
    #[serde(default, deserialize_with = "wire::lenient_string")]
    pub port: String,
    #[serde(default, deserialize_with = "wire::lenient_string")]
    pub protocol: String,
    #[serde(default, deserialize_with = "wire::lenient_string")]
    pub comments: String,
}

impl ApiObject for RecastRiskRule {
    const KIND: &'static str = "recast risk rule";
    const ENDPOINT: &'static str = "recastRiskRule";
    const FIELDS: &'static [&'static str] = &[
        "id",
        "plugin",
        "repository",
        "newSeverity",
        "hostType",
        "hostValue",
        "port",
        "protocol",
        "comments",
    ];

    fn id(&self) -> &ProbablyString {
        &self.id
    }
}

// ── Lookup-only records ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Plugin {
    pub id: ProbablyString,
    #[serde(default, deserialize_with = "wire::lenient_string")]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub family: Option<BaseInfo>,
}

impl ApiObject for Plugin {
    const KIND: &'static str = "plugin";
    const ENDPOINT: &'static str = "plugin";
    const FIELDS: &'static [&'static str] = &["id", "name", "family"];

    fn id(&self) -> &ProbablyString {
        &self.id
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    #[serde(flatten)]
    pub base: BaseInfo,
    #[serde(
        default,
        rename = "type",
        deserialize_with = "wire::lenient_string",
        skip_serializing_if = "String::is_empty"
    )]
    pub credential_type: String,
}

impl ApiObject for Credential {
    const KIND: &'static str = "credential";
    const ENDPOINT: &'static str = "credential";
    const FIELDS: &'static [&'static str] = &["id", "name", "description", "type"];

    fn id(&self) -> &ProbablyString {
        &self.base.id
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyTemplate {
    #[serde(flatten)]
    pub base: BaseInfo,
}

impl ApiObject for PolicyTemplate {
    const KIND: &'static str = "scan policy template";
    const ENDPOINT: &'static str = "policyTemplate";
    const FIELDS: &'static [&'static str] = &["id", "name", "description"];

    fn id(&self) -> &ProbablyString {
        &self.base.id
    }
}

/// The user owning the API keys
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentUser {
    pub id: ProbablyString,
    #[serde(default, deserialize_with = "wire::lenient_string")]
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<BaseInfo>,
}

/// Result of a file upload
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileUpload {
    /// Server-side name to reference in later requests
    #[serde(default, deserialize_with = "wire::lenient_string")]
    pub filename: String,
    #[serde(default, deserialize_with = "wire::lenient_string")]
    pub original_filename: String,
}

// ── Wire helpers ─────────────────────────────────────────────────────────────

pub(crate) mod wire {
    use serde::{Deserialize, Deserializer, Serializer};
    use serde_json::Value;

    /// Scalar rendered as a string; objects collapse to their `id`; null reads as empty
    pub fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(render(&Value::deserialize(deserializer)?))
    }

    /// As `lenient_string`, for fields that are omitted from partial bodies
    pub fn lenient_some_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        lenient_string(deserializer).map(Some)
    }

    fn render(value: &Value) -> String {
        match value {
            Value::Null => String::new(),
            Value::String(s) => s.clone(),
            Value::Number(n) => n.to_string(),
            Value::Bool(b) => b.to_string(),
            Value::Object(map) => map.get("id").map(render).unwrap_or_default(),
            Value::Array(_) => value.to_string(),
        }
    }

    /// Null reads as the type's default
    pub fn null_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
    where
        D: Deserializer<'de>,
        T: Default + Deserialize<'de>,
    {
        Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
    }

    /// Lists that upstream stores as comma-separated strings
    pub mod comma_list {
        use super::*;

        pub fn serialize<S>(items: &[String], serializer: S) -> Result<S::Ok, S::Error>
        where
            S: Serializer,
        {
            serializer.serialize_str(&items.join(","))
        }

        pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
        where
            D: Deserializer<'de>,
        {
            Ok(match Value::deserialize(deserializer)? {
                Value::Array(items) => items
                    .iter()
                    .map(render)
                    .filter(|s| !s.is_empty())
                    .collect(),
                other => render(&other)
                    .split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(String::from)
                    .collect(),
            })
        }
    }
}
