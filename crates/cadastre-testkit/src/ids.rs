//! Deterministic identity fixtures
//!
//! Name-derived UUIDs (v5 over the OID namespace) so test identities are
//! stable across runs and readable in assertion failures.

use cadastre_core::{AccountId, TokenId, UnitId};
use uuid::Uuid;

fn derived(label: &str) -> Uuid {
    Uuid::new_v5(&Uuid::NAMESPACE_OID, label.as_bytes())
}

/// Deterministic account identity for a label.
pub fn account(label: &str) -> AccountId {
    AccountId::from_uuid(derived(&format!("account:{label}")))
}

/// Deterministic validator-unit identity for a label.
pub fn unit(label: &str) -> UnitId {
    UnitId::from_uuid(derived(&format!("unit:{label}")))
}

/// Deterministic token identity for a label.
pub fn token(label: &str) -> TokenId {
    TokenId::from_uuid(derived(&format!("token:{label}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_are_stable_and_distinct() {
        assert_eq!(account("alice"), account("alice"));
        assert_ne!(account("alice"), account("bob"));
        assert_ne!(account("x").uuid(), unit("x").uuid());
    }
}
