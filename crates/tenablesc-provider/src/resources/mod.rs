//! Managed resource kinds
//!
//! Every resource follows the same shape: build a typed upstream record from the planned
//! values, issue the call, then read the entity back so state reflects what upstream
//! actually stored.

mod accept_risk;
mod asset;
mod audit_file;
mod organization;
mod organization_scan_zone_association;
mod recast_risk;
mod repository;
mod repository_organization_association;
mod role;
mod scan;
mod scan_policy;
mod scan_zone;

pub use accept_risk::AcceptRisk;
pub use asset::AssetResource;
pub use audit_file::AuditFileResource;
pub use organization::OrganizationResource;
pub use organization_scan_zone_association::OrganizationScanZoneAssociation;
pub use recast_risk::RecastRisk;
pub use repository::RepositoryResource;
pub use repository_organization_association::RepositoryOrganizationAssociation;
pub use role::RoleResource;
pub use scan::ScanResource;
pub use scan_policy::ScanPolicyResource;
pub use scan_zone::ScanZoneResource;

use std::sync::Arc;

use tenablesc_client::BaseInfo;
use tenablesc_core::{Error, ResourceData, Result};

use crate::descriptions::{self, DEFAULT_DESCRIPTION_VALUE};
use crate::normalize::{case_insensitive_equivalent, ip_sets_equivalent};
use crate::resource::Resource;
use crate::schema::{Attribute, Schema};
use crate::validate::{protocol_id, validate_protocol_attr};

/// Every resource kind, ready for registration
pub fn all() -> Vec<Arc<dyn Resource>> {
    vec![
        Arc::new(AcceptRisk::new()),
        Arc::new(AssetResource::new()),
        Arc::new(AuditFileResource::new()),
        Arc::new(OrganizationResource::new()),
        Arc::new(OrganizationScanZoneAssociation::new()),
        Arc::new(RecastRisk::new()),
        Arc::new(RepositoryResource::new()),
        Arc::new(RepositoryOrganizationAssociation::new()),
        Arc::new(RoleResource::new()),
        Arc::new(ScanResource::new()),
        Arc::new(ScanPolicyResource::new()),
        Arc::new(ScanZoneResource::new()),
    ]
}

// ── Shared attributes ────────────────────────────────────────────────────────

pub(crate) fn name_attribute(description: &str) -> Attribute {
    Attribute::string().required().description(description)
}

pub(crate) fn description_attribute(description: &str) -> Attribute {
    Attribute::string()
        .default(DEFAULT_DESCRIPTION_VALUE)
        .description(description)
}

/// Attributes common to accept and recast risk rules
pub(crate) fn risk_rule_schema(description: String) -> Schema {
    Schema::new(description)
        .attr(
            "repository_id",
            Attribute::string()
                .required()
                .description(descriptions::REPOSITORY_ID),
        )
        .attr(
            "plugin_id",
            Attribute::string()
                .required()
                .force_new()
                .description(descriptions::PLUGIN_ID),
        )
        .attr(
            "host_type",
            Attribute::string()
                .default("all")
                .description(descriptions::RISK_RULE_HOST_TYPE),
        )
        .attr(
            "host_value",
            Attribute::string()
                .default("")
                .suppress_diff(ip_sets_equivalent)
                .description(descriptions::RISK_RULE_HOST_VALUE),
        )
        .attr(
            "port",
            Attribute::string()
                .default("any")
                .description(descriptions::PORT),
        )
        .attr(
            "protocol",
            Attribute::string()
                .default("any")
                .validate(validate_protocol_attr)
                .suppress_diff(case_insensitive_equivalent)
                .description(descriptions::PROTOCOL),
        )
        .attr(
            "comments",
            Attribute::string()
                .default(DEFAULT_DESCRIPTION_VALUE)
                .description(descriptions::COMMENTS),
        )
}

/// Upstream protocol id for the configured protocol name
pub(crate) fn configured_protocol(d: &ResourceData) -> Result<String> {
    let protocol = d.get_string("protocol")?;
    match protocol_id(&protocol) {
        Ok(id) => Ok(id.to_string()),
        Err(Error::Validation { attribute, message }) => Err(Error::validation(
            attribute,
            format!("failed to get protocol id: {}", message),
        )),
        Err(other) => Err(other),
    }
}

// ── Record references ────────────────────────────────────────────────────────

/// Reference by id; `None` for an empty id
pub(crate) fn reference(id: &str) -> Option<BaseInfo> {
    (!id.is_empty()).then(|| BaseInfo::reference(id))
}

pub(crate) fn reference_id(info: &Option<BaseInfo>) -> String {
    info.as_ref()
        .map(|b| b.id.as_str().to_string())
        .unwrap_or_default()
}

pub(crate) fn references(ids: &[String]) -> Vec<BaseInfo> {
    ids.iter().map(|id| BaseInfo::reference(id.as_str())).collect()
}

pub(crate) fn reference_ids(infos: &[BaseInfo]) -> Vec<String> {
    infos.iter().map(|b| b.id.as_str().to_string()).collect()
}


#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_type_names_are_unique() {
        let resources = all();
        let names: HashSet<_> = resources.iter().map(|r| r.type_name()).collect();
        assert_eq!(names.len(), 12);
        assert!(names.contains("tenablesc_repository_organization_association"));
        assert!(names.iter().all(|n| n.starts_with("tenablesc_")));
    }

    #[test]
    fn test_reference_helpers() {
        assert!(reference("").is_none());
        assert_eq!(reference_id(&reference("7")), "7");
        assert_eq!(reference_id(&None), "");
        let ids = vec!["1".to_string(), "2".to_string()];
        assert_eq!(reference_ids(&references(&ids)), ids);
    }
}
