//! Equivalence checks used to suppress spurious diffs
//!
//! Upstream rewrites some values it stores: timestamps come back in the server's local
//! offset, IP lists come back merged and reordered, and some enumerations change case.
//! Each function here answers "do these two renderings mean the same thing". A value that
//! fails to parse is never equivalent to anything.

use chrono::{DateTime, FixedOffset};
use tenablesc_core::IpSet;
use tracing::debug;

pub fn parse_rfc3339(value: &str) -> Option<DateTime<FixedOffset>> {
    DateTime::parse_from_rfc3339(value).ok()
}

/// Same instant, whatever the offsets
pub fn timestamps_equivalent(old: &str, new: &str) -> bool {
    match (parse_rfc3339(old), parse_rfc3339(new)) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}

/// Same canonical address set
pub fn ip_sets_equivalent(old: &str, new: &str) -> bool {
    let old_set = match IpSet::parse_tenable(old) {
        Ok(set) => set,
        Err(e) => {
            debug!(error = %e, "old value is not an ip set");
            return false;
        }
    };
    let new_set = match IpSet::parse_tenable(new) {
        Ok(set) => set,
        Err(e) => {
            debug!(error = %e, "new value is not an ip set");
            return false;
        }
    };

    if old_set == new_set {
        return true;
    }
    debug!(old = %old_set, new = %new_set, "not equivalent ip sets");
    false
}

pub fn case_insensitive_equivalent(old: &str, new: &str) -> bool {
    old.to_lowercase() == new.to_lowercase()
}
