//! Role permission table
//!
//! Every permission is a string-encoded boolean on [`Role`]. The table maps the external
//! permission name to a getter/setter pair over that field, so only [`FakeBool`] fields
//! can ever be addressed.

use tenablesc_client::Role;
use tenablesc_core::{Error, FakeBool, Result};

/// Prefix of the per-permission attributes on the role resource
pub const PERMISSION_PREFIX: &str = "perm_";

pub struct Permission {
    /// External name, without [`PERMISSION_PREFIX`]
    pub name: &'static str,
    /// Upstream field name
    pub upstream: &'static str,
    get: fn(&Role) -> &FakeBool,
    set: fn(&mut Role, FakeBool),
}

impl Permission {
    pub fn attribute(&self) -> String {
        format!("{}{}", PERMISSION_PREFIX, self.name)
    }

    pub fn get(&self, role: &Role) -> bool {
        (self.get)(role).as_bool()
    }

    pub fn set(&self, role: &mut Role, value: bool) {
        (self.set)(role, FakeBool::from(value));
    }
}

impl std::fmt::Debug for Permission {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Permission")
            .field("name", &self.name)
            .field("upstream", &self.upstream)
            .finish()
    }
}

macro_rules! permission_table {
    ($($name:literal => $upstream:literal, $field:ident;)*) => {
        pub static PERMISSIONS: &[Permission] = &[
            $(Permission {
                name: $name,
                upstream: $upstream,
                get: {
                    fn get(role: &Role) -> &FakeBool {
                        &role.$field
                    }
                    get
                },
                set: {
                    fn set(role: &mut Role, value: FakeBool) {
                        role.$field = value;
                    }
                    set
                },
            },)*
        ];
    };
}

permission_table! {
    "manage_groups" => "permManageGroups", perm_manage_groups;
    "manage_roles" => "permManageRoles", perm_manage_roles;
    "manage_images" => "permManageImages", perm_manage_images;
    "manage_group_relationships" => "permManageGroupRelationships", perm_manage_group_relationships;
    "manage_blackout_windows" => "permManageBlackoutWindows", perm_manage_blackout_windows;
    "manage_attribute_sets" => "permManageAttributeSets", perm_manage_attribute_sets;
    "create_tickets" => "permCreateTickets", perm_create_tickets;
    "create_audit_files" => "permCreateAuditFiles", perm_create_audit_files;
    "create_ldap_assets" => "permCreateLDAPAssets", perm_create_ldap_assets;
    "create_policies" => "permCreatePolicies", perm_create_policies;
    "purge_tickets" => "permPurgeTickets", perm_purge_tickets;
    "purge_scan_results" => "permPurgeScanResults", perm_purge_scan_results;
    "purge_report_results" => "permPurgeReportResults", perm_purge_report_results;
    "scan" => "permScan", perm_scan;
    "agents_scan" => "permAgentsScan", perm_agents_scan;
    "share_objects" => "permShareObjects", perm_share_objects;
    "update_feeds" => "permUpdateFeeds", perm_update_feeds;
    "upload_nessus_results" => "permUploadNessusResults", perm_upload_nessus_results;
    "view_org_logs" => "permViewOrgLogs", perm_view_org_logs;
    "manage_accept_risk_rules" => "permManageAcceptRiskRules", perm_manage_accept_risk_rules;
    "manage_recast_risk_rules" => "permManageRecastRiskRules", perm_manage_recast_risk_rules;
}

pub fn lookup(name: &str) -> Result<&'static Permission> {
    PERMISSIONS
        .iter()
        .find(|p| p.name == name)
        .ok_or_else(|| Error::NoSuchPermission(name.to_string()))
}

pub fn get_permission(role: &Role, name: &str) -> Result<bool> {
    Ok(lookup(name)?.get(role))
}

pub fn set_permission(role: &mut Role, name: &str, value: bool) -> Result<()> {
    lookup(name)?.set(role, value);
    Ok(())
}
