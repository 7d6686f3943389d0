//! Read-only lookups
//!
//! Single-entity lookups match names exactly and fail when nothing matches. The plural
//! lookups return an id-to-name map filtered by an anchored regular expression.

mod asset;
mod assets;
mod credential;
mod plugin;
mod repositories;
mod repository;
mod scan_policy_template;

pub use asset::AssetDataSource;
pub use assets::AssetsDataSource;
pub use credential::CredentialDataSource;
pub use plugin::PluginDataSource;
pub use repositories::RepositoriesDataSource;
pub use repository::RepositoryDataSource;
pub use scan_policy_template::ScanPolicyTemplateDataSource;

use std::collections::BTreeMap;
use std::sync::Arc;

use regex::Regex;
use tenablesc_core::{Diagnostics, Error, ResourceData, Result};
use tracing::debug;

use crate::descriptions;
use crate::resource::DataSource;
use crate::schema::{Attribute, Schema};

pub(crate) const NAME_FILTER: &str = "name_filter";
const MATCH_ALL: &str = ".*";

/// Every data source kind, ready for registration
pub fn all() -> Vec<Arc<dyn DataSource>> {
    vec![
        Arc::new(AssetDataSource::new()),
        Arc::new(AssetsDataSource::new()),
        Arc::new(CredentialDataSource::new()),
        Arc::new(PluginDataSource::new()),
        Arc::new(RepositoriesDataSource::new()),
        Arc::new(RepositoryDataSource::new()),
        Arc::new(ScanPolicyTemplateDataSource::new()),
    ]
}

/// Schema of an exact-name lookup
pub(crate) fn by_name_schema(description: impl Into<String>, kind: &str) -> Schema {
    Schema::new(description).attr(
        "name",
        Attribute::string()
            .required()
            .description(descriptions::name_to_find(kind)),
    )
}

/// Schema of a regex-filtered lookup exposing `map_attribute`
pub(crate) fn filtered_schema(
    description: impl Into<String>,
    kind: &str,
    map_attribute: &str,
) -> Schema {
    Schema::new(description)
        .attr(
            map_attribute,
            Attribute::string_map()
                .computed()
                .description(descriptions::map_id_to_name(kind)),
        )
        .attr(
            NAME_FILTER,
            Attribute::string()
                .default(MATCH_ALL)
                .description(descriptions::regexp_name_filter(kind)),
        )
}

/// Fill `map_attribute` with the `(id, name)` records whose name matches the filter
pub(crate) fn read_filtered<I>(
    d: &mut ResourceData,
    map_attribute: &str,
    records: I,
) -> Result<Diagnostics>
where
    I: IntoIterator<Item = (String, String)>,
{
    let name_filter = d.get_string(NAME_FILTER)?;
    d.set_id(format!("{}:{}", map_attribute, name_filter));

    if name_filter.is_empty() {
        return Ok(Diagnostics::error(
            "filter is empty string, will return no entries.",
        ));
    }

    let anchored = format!("^{}$", name_filter);
    let name_re =
        Regex::new(&anchored).map_err(|e| Error::validation(NAME_FILTER, e.to_string()))?;

    let matched: BTreeMap<String, String> = records
        .into_iter()
        .filter(|(_, name)| name_re.is_match(name))
        .collect();
    debug!(filter = %anchored, matched = matched.len(), "filtered {}", map_attribute);

    if matched.is_empty() {
        return Ok(Diagnostics::error(format!(
            "no {} matching filter '{}'",
            map_attribute, anchored
        )));
    }

    d.set(map_attribute, matched);
    Ok(Diagnostics::new())
}
