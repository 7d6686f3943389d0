//! Not-found recovery
//!
//! An entity that upstream no longer knows is not an error on read or delete: the tracked
//! id is cleared so the next plan recreates it. Anything else propagates unchanged.

use tenablesc_client::ClientError;
use tenablesc_core::{ResourceData, Result};
use tracing::debug;

/// `Ok(None)` when upstream reported the entity missing; the id is cleared
pub fn recover_not_found<T>(
    d: &mut ResourceData,
    result: std::result::Result<T, ClientError>,
) -> Result<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(e) if e.is_not_found() => {
            debug!(id = d.id(), error = %e, "got not found response, assuming entity has been deleted");
            d.clear_id();
            Ok(None)
        }
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tenablesc_core::AttrMap;

    #[test]
    fn test_not_found_clears_id() {
        let mut d = ResourceData::from_state("12", AttrMap::new());
        let result: std::result::Result<(), _> = Err(ClientError::NotFound {
            kind: "role".into(),
            id: "12".into(),
        });
        assert!(recover_not_found(&mut d, result).unwrap().is_none());
        assert!(d.is_absent());
    }

    #[test]
    fn test_other_errors_propagate_verbatim() {
        let mut d = ResourceData::from_state("12", AttrMap::new());
        let result: std::result::Result<(), _> = Err(ClientError::Api {
            status: 403,
            code: 143,
            message: "Insufficient permissions".into(),
        });
        let err = recover_not_found(&mut d, result).unwrap_err();
        assert!(err.to_string().contains("Insufficient permissions"));
        assert_eq!(d.id(), "12");
    }

    #[test]
    fn test_success_keeps_id() {
        let mut d = ResourceData::from_state("12", AttrMap::new());
        assert_eq!(recover_not_found(&mut d, Ok(5)).unwrap(), Some(5));
        assert_eq!(d.id(), "12");
    }
}
