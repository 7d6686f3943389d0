//! User-facing schema descriptions

pub const DEFAULT_DESCRIPTION_VALUE: &str = "Managed by Terraform";

const ORG_CREDENTIALS_REQUIRED: &str = "\nRequires Organization credentials.";
const ADMIN_CREDENTIALS_REQUIRED: &str = "\nRequires Administrator (org=0) credentials.";

pub fn name_to_find(kind: &str) -> String {
    format!("Name of the {} to find.", kind)
}

pub fn regexp_name_filter(kind: &str) -> String {
    format!(
        "A regexp-based filter to match target {} names. \
         Will be wrapped in ^ and $ before compilation. \
         If not given, will return all elements.",
        kind
    )
}

pub fn map_id_to_name(kind: &str) -> String {
    format!("A map of {} IDs to {} names", kind, kind)
}

fn with_scope(summary: &str, scope: &str) -> String {
    format!("{}{}", summary, scope)
}

// ── Provider ─────────────────────────────────────────────────────────────────

pub const PROVIDER_URI: &str = "URI of the Tenable.sc instance, e.g. https://sc.example.com. \
May also be set with the TENABLESC_URI environment variable.";
pub const PROVIDER_ACCESS_KEY: &str =
    "API access key. May also be set with the TENABLESC_ACCESS_KEY environment variable.";
pub const PROVIDER_SECRET_KEY: &str =
    "API secret key. May also be set with the TENABLESC_SECRET_KEY environment variable.";

// ── Data sources ─────────────────────────────────────────────────────────────

pub fn data_source_asset() -> String {
    with_scope("Look up an asset by name field.", ORG_CREDENTIALS_REQUIRED)
}

pub fn data_source_assets() -> String {
    with_scope(
        "Look up a set of asset IDs based on a regular expression name filter.",
        ORG_CREDENTIALS_REQUIRED,
    )
}

pub const DATA_SOURCE_CREDENTIAL: &str = "Look up a credential object ID by name field.";
pub const DATA_SOURCE_PLUGIN: &str = "Look up a plugin ID based on name.";
pub const DATA_SOURCE_REPOSITORIES: &str =
    "Look up a set of repositories based on a regular expression name filter.";
pub const DATA_SOURCE_REPOSITORY: &str = "Look up a repository ID based on name.";
pub const DATA_SOURCE_SCAN_POLICY_TEMPLATE: &str =
    "Look up a scan policy template ID based on name.";

// ── Resources ────────────────────────────────────────────────────────────────

pub fn resource_accept_risk() -> String {
    with_scope("Create and manage Accept Risk Rules.", ORG_CREDENTIALS_REQUIRED)
}

pub fn resource_asset() -> String {
    with_scope("Create and manage Assets.", ORG_CREDENTIALS_REQUIRED)
}

pub const RESOURCE_AUDIT_FILE: &str = "Create and manage Audit Files.";

pub fn resource_organization() -> String {
    with_scope("Create and manage Organizations.", ADMIN_CREDENTIALS_REQUIRED)
}

pub fn resource_organization_scan_zone_association() -> String {
    with_scope(
        "Manage Scan Zones associated to an Organization.",
        ADMIN_CREDENTIALS_REQUIRED,
    )
}

pub fn resource_recast_risk() -> String {
    with_scope("Create and manage Recast Risk Rules.", ORG_CREDENTIALS_REQUIRED)
}

pub fn resource_repository() -> String {
    with_scope("Create and Manage Repositories.", ADMIN_CREDENTIALS_REQUIRED)
}

pub fn resource_repository_organization_association() -> String {
    with_scope(
        "Manage Organization access to Repositories.",
        ADMIN_CREDENTIALS_REQUIRED,
    )
}

pub fn resource_role() -> String {
    with_scope("Create and Manage User Roles.", ORG_CREDENTIALS_REQUIRED)
}

pub fn resource_scan() -> String {
    with_scope("Create and Manage Scans.", ORG_CREDENTIALS_REQUIRED)
}

pub fn resource_scan_policy() -> String {
    with_scope("Create and Manage Scan Policies.", ORG_CREDENTIALS_REQUIRED)
}

pub fn resource_scan_zone() -> String {
    with_scope("Create and Manage Scan Zones.", ADMIN_CREDENTIALS_REQUIRED)
}

// ── Fields ───────────────────────────────────────────────────────────────────

pub const ASSET_NAME: &str = "Asset name";
pub const ASSET_DESCRIPTION: &str = "Asset description";
pub const AUDIT_FILE_NAME: &str = "Audit file Name as presented in SC";
pub const AUDIT_FILE_DESCRIPTION: &str = "Audit File description";
pub const REPOSITORY_NAME: &str = "Repository name";
pub const REPOSITORY_DESCRIPTION: &str = "Repository description";
pub const ORGANIZATION_NAME: &str = "Organization name";
pub const ORGANIZATION_DESCRIPTION: &str = "Organization description";
pub const ROLE_NAME: &str = "Role name";
pub const ROLE_DESCRIPTION: &str = "Role description";
pub const SCAN_NAME: &str = "Scan name";
pub const SCAN_DESCRIPTION: &str = "Scan description";
pub const SCAN_POLICY_NAME: &str = "Scan Policy name";
pub const SCAN_POLICY_DESCRIPTION: &str = "Scan Policy description";
pub const SCAN_ZONE_NAME: &str = "Scan Zone name";
pub const SCAN_ZONE_DESCRIPTION: &str = "Scan Zone description";

pub const REPOSITORY_ID: &str = "Repository ID";
pub const PLUGIN_ID: &str = "Plugin ID";
pub const ORGANIZATION_ID: &str = "Organization ID";
pub const SCAN_POLICY_ID: &str = "Scan Policy ID";
pub const SCAN_POLICY_TEMPLATE_ID: &str = "Scan Policy Template ID";
pub const AUDIT_FILE_ID: &str = "Audit File ID";
pub const ORGANIZATION_SCAN_ZONE_IDS: &str =
    "Scan Zone IDs to be allowed to be used by organization";

pub const ASSET_DEFINED_IPS: &str = "IP addresses defined in the asset";
pub const ASSET_DEFINED_DNS_NAMES: &str = "DNS Names defined in the asset";
pub const ASSET_TYPE: &str = "Asset type - may be 'dnsname' or 'static'";
pub const ASSET_VALUES: &str =
    "Asset values - must be either DNS names or IPs based on type of asset.";

pub const AUDIT_FILE_PATH: &str = "Path to a local audit file to upload";
pub const AUDIT_FILE_CONTENT: &str = "Audit file content";
pub const AUDIT_FILE_SC_FILENAME: &str = "Filename of audit file as stored in SC";
pub const AUDIT_FILE_SHA256_SUM: &str = "SHA-256 sum of the uploaded audit file content";

pub const CREDENTIAL_TYPE: &str = "Credential type";

pub const RISK_RULE_HOST_TYPE: &str = "Host Type may be 'all', 'ip', or 'asset'";
pub const RISK_RULE_HOST_VALUE: &str = "A list of values depending on the host type.
  * Must be empty for type 'all';
  * For 'ip' must be a list of IP addresses
  * For 'asset' must be a list of asset IDs.";
pub const PORT: &str = "Network port";
pub const PROTOCOL: &str = "Network protocol. Default: 'any'
  * tcp
  * udp
  * icmp
  * unknown
  * any ";
pub const COMMENTS: &str = "Comments";
pub const ACCEPT_RISK_EXPIRATION: &str =
    "Expiration date for accept risk rule in RFC3339 format";

pub const ORGANIZATION_ZONE_SELECTION: &str = "Scan Zone Selection for organization. May be:
 * auto_only
 * locked
 * selectable
 * selectable+auto
 * selectable+auto_restricted ";
pub const ORGANIZATION_RESTRICTED_IPS: &str =
    "If provided, limits IPs allowed in zone to list. May be provided as IPs, CIDRs, or ranges.";

pub const RECAST_NEW_SEVERITY: &str = "Updated severity for ticket in numeric form.
  * 0 - Info
  * 1 - Low
  * 2 - Medium
  * 3 - High
  * 4 - Critical";

pub const REPOSITORY_IP_RANGE: &str =
    "Range of IPs allowed to be stored in the repository - may be CIDR or Range format";
pub const TRENDING_DAYS: &str = "Days to store trend data";
pub const TREND_WITH_RAW: &str = "Store raw data with trends";
pub const VULNERABILITY_LIFETIME: &str =
    "Specify custom storage durations in days for types of vulnerabilities";

pub const GROUP_ASSIGNMENT: &str =
    "Access within organization to grant to repository. Valid values are:
 * all
 * fullAccess
 * partial";

pub const SCAN_POLICY_PREFERENCES: &str = "Key-value map of preferences to set and their values. Refer to documentation and browser developer tools to get preference names";
pub const SCAN_POLICY_FAMILIES: &str = "Plugin Families to include in scan";
pub const SCAN_POLICY_TAG: &str = "Tag for scan policy";

pub const SCAN_ZONE_CIDRS: &str = "CIDR blocks included in scan zone";

pub const SCAN_VIRTUAL_HOSTS: &str = "Scan all virtual hosts found on targets";
pub const SCAN_DHCP_TRACKING: &str = "Track hosts across DHCP address changes";
pub const SCAN_TIMEOUT_ACTION: &str = "Action when the scan reaches its maximum time";
pub const SCAN_MAX_TIME: &str = "Maximum scan duration in seconds";
pub const SCAN_IPS_AND_NAMES: &str = "IPs and DNS names to scan, comma separated";
pub const SCAN_ASSET_IDS: &str = "Asset IDs to scan";
pub const SCAN_CREDENTIAL_IDS: &str = "Credential IDs to scan with";
pub const SCAN_SCHEDULE_START: &str = "Schedule start in iCal form; empty for on-demand";
pub const SCAN_SCHEDULE_REPEAT_RULE: &str = "Schedule repeat rule in iCal RRULE form";

pub fn role_permission(upstream_field: &str) -> String {
    format!("Set permission flag {}", upstream_field)
}
