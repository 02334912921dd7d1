//! Per-component role tables
//!
//! Authorization is an explicit capability table per identity per
//! component, consulted as a guard clause at the top of every mutating
//! operation. Role enums are defined by each component; this table only
//! stores the grants.

use crate::identifiers::AccountId;
use std::collections::{BTreeSet, HashMap};
use std::hash::Hash;

/// Grant table mapping a component-local role to the identities holding it.
#[derive(Debug, Clone, Default)]
pub struct RoleTable<R> {
    grants: HashMap<R, BTreeSet<AccountId>>,
}

impl<R: Eq + Hash + Copy> RoleTable<R> {
    /// Empty table.
    pub fn new() -> Self {
        Self {
            grants: HashMap::new(),
        }
    }

    /// Grant a role. Returns false if the identity already held it.
    pub fn grant(&mut self, role: R, account: AccountId) -> bool {
        self.grants.entry(role).or_default().insert(account)
    }

    /// Revoke a role. Returns false if the identity did not hold it.
    pub fn revoke(&mut self, role: R, account: AccountId) -> bool {
        self.grants
            .get_mut(&role)
            .is_some_and(|set| set.remove(&account))
    }

    /// Whether the identity holds the role.
    pub fn has(&self, role: R, account: AccountId) -> bool {
        self.grants
            .get(&role)
            .is_some_and(|set| set.contains(&account))
    }

    /// All identities holding the role.
    pub fn holders(&self, role: R) -> impl Iterator<Item = AccountId> + '_ {
        self.grants.get(&role).into_iter().flatten().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    enum Role {
        Admin,
        Minter,
    }

    #[test]
    fn grant_revoke_cycle() {
        let mut table = RoleTable::new();
        let alice = AccountId::new();

        assert!(!table.has(Role::Admin, alice));
        assert!(table.grant(Role::Admin, alice));
        assert!(!table.grant(Role::Admin, alice));
        assert!(table.has(Role::Admin, alice));
        assert!(!table.has(Role::Minter, alice));
        assert!(table.revoke(Role::Admin, alice));
        assert!(!table.revoke(Role::Admin, alice));
        assert!(!table.has(Role::Admin, alice));
    }
}
