//! Enumerations accepted by the upstream API and their validators
//!
//! Plain functions return `Result` for use while building requests; the `*_attr`
//! variants adapt them to schema validators that report diagnostics at a path.

use std::fmt;
use std::str::FromStr;

use tenablesc_core::{
    parse_numeric_id, AttrValue, AttributePath, Diagnostic, Diagnostics, Error, Result,
};

// ── Protocols ────────────────────────────────────────────────────────────────

/// Protocol name to upstream protocol number
const PROTOCOL_IDS: &[(&str, &str)] = &[
    ("tcp", "6"),
    ("udp", "17"),
    ("icmp", "1"),
    ("unknown", "0"),
    ("any", "any"),
];

/// Upstream id for a protocol name, case-insensitively
pub fn protocol_id(protocol: &str) -> Result<&'static str> {
    let wanted = protocol.to_lowercase();
    PROTOCOL_IDS
        .iter()
        .find(|(name, _)| *name == wanted)
        .map(|(_, id)| *id)
        .ok_or_else(|| Error::validation("protocol", format!("invalid protocol '{}'", protocol)))
}

/// Protocol name for an upstream id; ids without a name are returned unchanged
pub fn protocol_name(id: &str) -> String {
    PROTOCOL_IDS
        .iter()
        .find(|(_, pid)| *pid == id)
        .map(|(name, _)| name.to_string())
        .unwrap_or_else(|| id.to_string())
}

pub fn validate_protocol_attr(value: &AttrValue, path: &AttributePath) -> Diagnostics {
    match value.as_str().map(protocol_id) {
        Some(Ok(_)) | None => Diagnostics::new(),
        Some(Err(e)) => Diagnostics::from(
            Diagnostic::error(format!("failed to get protocol id: {}", message_of(&e))).at(path.clone()),
        ),
    }
}

// ── Zone selection ───────────────────────────────────────────────────────────

/// How an organization's users pick scan zones
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZoneSelection {
    AutoOnly,
    Locked,
    Selectable,
    SelectableAuto,
    SelectableAutoRestricted,
}

impl ZoneSelection {
    pub const ALL: [ZoneSelection; 5] = [
        ZoneSelection::AutoOnly,
        ZoneSelection::Locked,
        ZoneSelection::Selectable,
        ZoneSelection::SelectableAuto,
        ZoneSelection::SelectableAutoRestricted,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ZoneSelection::AutoOnly => "auto_only",
            ZoneSelection::Locked => "locked",
            ZoneSelection::Selectable => "selectable",
            ZoneSelection::SelectableAuto => "selectable+auto",
            ZoneSelection::SelectableAutoRestricted => "selectable+auto_restricted",
        }
    }

    /// Check the number of configured zones against this mode
    pub fn check_zone_count(&self, count: usize) -> Result<()> {
        let message = match self {
            ZoneSelection::AutoOnly if count != 0 => {
                "zone selection 'auto_only' requires zones not be specified".to_string()
            }
            ZoneSelection::Locked if count != 1 => format!(
                "zone selection 'locked' requires a single zone be specified, got {}",
                count
            ),
            ZoneSelection::Selectable | ZoneSelection::SelectableAutoRestricted if count < 1 => {
                format!(
                    "zone selection '{}' requires at least one zone be specified",
                    self.as_str()
                )
            }
            _ => return Ok(()),
        };
        Err(Error::validation("scan_zone_ids", message))
    }
}

impl fmt::Display for ZoneSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ZoneSelection {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|mode| mode.as_str() == s)
            .ok_or_else(|| {
                let valid: Vec<&str> = Self::ALL.iter().map(ZoneSelection::as_str).collect();
                Error::validation(
                    "zone_selection",
                    format!(
                        "{} is not a valid zone selector. Valid selectors are [{}]",
                        s,
                        valid.join(" ")
                    ),
                )
            })
    }
}

pub fn validate_zone_selection_attr(value: &AttrValue, path: &AttributePath) -> Diagnostics {
    match value.as_str().map(str::parse::<ZoneSelection>) {
        Some(Err(e)) => Diagnostics::from(Diagnostic::error(message_of(&e)).at(path.clone())),
        _ => Diagnostics::new(),
    }
}

// ── Group assignment ─────────────────────────────────────────────────────────

pub const GROUP_ASSIGNMENTS: &[&str] = &["", "all", "fullAccess", "partial"];

pub fn validate_group_assignment(value: &str) -> Result<()> {
    if GROUP_ASSIGNMENTS.contains(&value) {
        Ok(())
    } else {
        Err(Error::validation(
            "group_assignment",
            format!("{} is not a valid value for group_assignment", value),
        ))
    }
}

pub fn validate_group_assignment_attr(value: &AttrValue, path: &AttributePath) -> Diagnostics {
    match value.as_str().map(validate_group_assignment) {
        Some(Err(e)) => Diagnostics::from(Diagnostic::error(message_of(&e)).at(path.clone())),
        _ => Diagnostics::new(),
    }
}

// ── Identifiers ──────────────────────────────────────────────────────────────

pub fn validate_numeric_id_attr(value: &AttrValue, path: &AttributePath) -> Diagnostics {
    match value.as_str().map(|s| parse_numeric_id(&path.to_string(), s)) {
        Some(Err(e)) => Diagnostics::from(Diagnostic::error(message_of(&e)).at(path.clone())),
        _ => Diagnostics::new(),
    }
}

/// The bare message of a validation error, without the attribute prefix
fn message_of(err: &Error) -> String {
    match err {
        Error::Validation { message, .. } => message.clone(),
        other => other.to_string(),
    }
}
