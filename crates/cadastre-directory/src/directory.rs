//! Directory state and operations

use crate::error::DirectoryError;
use cadastre_core::{AccountId, AssetType, AssignmentView, DirectoryView, RoleTable, UnitId};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use tracing::{info, warn};

/// Roles on the directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Role {
    Admin,
}

/// One registered validator unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryEntry {
    /// Unit identity.
    pub unit: UnitId,
    /// Human-readable name.
    pub name: String,
    /// Informational description.
    pub description: String,
    /// Beneficiary entitled to the unit's accrued commission.
    pub owner: AccountId,
    /// Asset types the unit accepts.
    pub supported_asset_types: BTreeSet<AssetType>,
    /// Whether the unit may be assigned to new records.
    pub is_active: bool,
}

/// Events emitted for external indexing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DirectoryEvent {
    /// A unit was registered.
    Registered {
        /// Unit identity.
        unit: UnitId,
        /// Commission beneficiary.
        owner: AccountId,
    },
    /// A unit's active flag changed.
    StatusChanged {
        /// Unit identity.
        unit: UnitId,
        /// New active flag.
        active: bool,
    },
    /// A unit's supported asset types changed.
    AssetTypesChanged {
        /// Unit identity.
        unit: UnitId,
    },
    /// A unit was hard-deleted.
    Removed {
        /// Unit identity.
        unit: UnitId,
    },
}

/// The validator directory.
#[derive(Debug)]
pub struct ValidatorDirectory {
    entries: BTreeMap<UnitId, DirectoryEntry>,
    roles: RoleTable<Role>,
    events: Vec<DirectoryEvent>,
}

impl ValidatorDirectory {
    /// Create a directory administered by `admin`.
    pub fn new(admin: AccountId) -> Self {
        let mut roles = RoleTable::new();
        roles.grant(Role::Admin, admin);
        Self {
            entries: BTreeMap::new(),
            roles,
            events: Vec::new(),
        }
    }

    /// Grant the administrator role to another identity.
    pub fn grant_admin(
        &mut self,
        caller: AccountId,
        account: AccountId,
    ) -> Result<(), DirectoryError> {
        self.require_admin(caller)?;
        self.roles.grant(Role::Admin, account);
        Ok(())
    }

    /// Register a unit. Fails if the identity is already registered,
    /// leaving the existing entry untouched.
    pub fn register(
        &mut self,
        caller: AccountId,
        unit: UnitId,
        name: impl Into<String>,
        description: impl Into<String>,
        owner: AccountId,
        supported_asset_types: BTreeSet<AssetType>,
    ) -> Result<(), DirectoryError> {
        self.require_admin(caller)?;
        if owner.is_nil() {
            return Err(DirectoryError::NilOwner);
        }
        if supported_asset_types.is_empty() {
            return Err(DirectoryError::NoAssetTypes);
        }
        if self.entries.contains_key(&unit) {
            warn!(%unit, "duplicate validator registration rejected");
            return Err(DirectoryError::AlreadyRegistered(unit));
        }

        self.entries.insert(
            unit,
            DirectoryEntry {
                unit,
                name: name.into(),
                description: description.into(),
                owner,
                supported_asset_types,
                is_active: true,
            },
        );
        info!(%unit, %owner, "validator registered");
        self.events.push(DirectoryEvent::Registered { unit, owner });
        Ok(())
    }

    /// Activate or deactivate a unit.
    pub fn update_status(
        &mut self,
        caller: AccountId,
        unit: UnitId,
        active: bool,
    ) -> Result<(), DirectoryError> {
        self.require_admin(caller)?;
        let entry = self.entry_mut(unit)?;
        entry.is_active = active;
        info!(%unit, active, "validator status updated");
        self.events.push(DirectoryEvent::StatusChanged { unit, active });
        Ok(())
    }

    /// Replace a unit's supported asset types.
    pub fn update_asset_types(
        &mut self,
        caller: AccountId,
        unit: UnitId,
        supported: BTreeSet<AssetType>,
    ) -> Result<(), DirectoryError> {
        self.require_admin(caller)?;
        if supported.is_empty() {
            return Err(DirectoryError::NoAssetTypes);
        }
        let entry = self.entry_mut(unit)?;
        entry.supported_asset_types = supported;
        self.events.push(DirectoryEvent::AssetTypesChanged { unit });
        Ok(())
    }

    /// Update a unit's display name.
    pub fn update_name(
        &mut self,
        caller: AccountId,
        unit: UnitId,
        name: impl Into<String>,
    ) -> Result<(), DirectoryError> {
        self.require_admin(caller)?;
        self.entry_mut(unit)?.name = name.into();
        Ok(())
    }

    /// Update a unit's description.
    pub fn update_description(
        &mut self,
        caller: AccountId,
        unit: UnitId,
        description: impl Into<String>,
    ) -> Result<(), DirectoryError> {
        self.require_admin(caller)?;
        self.entry_mut(unit)?.description = description.into();
        Ok(())
    }

    /// Hard-delete a unit. Only permitted while no live record is assigned
    /// to it; deactivation is the normal retirement path.
    pub fn remove(
        &mut self,
        caller: AccountId,
        unit: UnitId,
        assignments: &impl AssignmentView,
    ) -> Result<(), DirectoryError> {
        self.require_admin(caller)?;
        if !self.entries.contains_key(&unit) {
            return Err(DirectoryError::NotRegistered(unit));
        }
        let live = assignments.live_assignments(unit);
        if live > 0 {
            return Err(DirectoryError::StillAssigned { unit, live });
        }
        self.entries.remove(&unit);
        info!(%unit, "validator removed");
        self.events.push(DirectoryEvent::Removed { unit });
        Ok(())
    }

    /// Look up an entry.
    pub fn get(&self, unit: UnitId) -> Option<&DirectoryEntry> {
        self.entries.get(&unit)
    }

    /// Units currently active for the asset type.
    pub fn validators_for_asset_type(&self, asset_type: AssetType) -> BTreeSet<UnitId> {
        self.entries
            .values()
            .filter(|e| e.is_active && e.supported_asset_types.contains(&asset_type))
            .map(|e| e.unit)
            .collect()
    }

    /// Drain accumulated events.
    pub fn take_events(&mut self) -> Vec<DirectoryEvent> {
        std::mem::take(&mut self.events)
    }

    fn require_admin(&self, caller: AccountId) -> Result<(), DirectoryError> {
        if !self.roles.has(Role::Admin, caller) {
            return Err(DirectoryError::NotAdmin);
        }
        Ok(())
    }

    fn entry_mut(&mut self, unit: UnitId) -> Result<&mut DirectoryEntry, DirectoryError> {
        self.entries
            .get_mut(&unit)
            .ok_or(DirectoryError::NotRegistered(unit))
    }
}

impl DirectoryView for ValidatorDirectory {
    fn is_registered(&self, unit: UnitId) -> bool {
        self.entries.contains_key(&unit)
    }

    fn is_active(&self, unit: UnitId) -> bool {
        self.entries.get(&unit).is_some_and(|e| e.is_active)
    }

    fn supports(&self, unit: UnitId, asset_type: AssetType) -> bool {
        self.entries
            .get(&unit)
            .is_some_and(|e| e.supported_asset_types.contains(&asset_type))
    }

    fn owner_of(&self, unit: UnitId) -> Option<AccountId> {
        self.entries.get(&unit).map(|e| e.owner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    struct NoAssignments;

    impl AssignmentView for NoAssignments {
        fn live_assignments(&self, _unit: UnitId) -> u64 {
            0
        }
    }

    struct FixedAssignments(u64);

    impl AssignmentView for FixedAssignments {
        fn live_assignments(&self, _unit: UnitId) -> u64 {
            self.0
        }
    }

    fn land_only() -> BTreeSet<AssetType> {
        BTreeSet::from([AssetType::Land])
    }

    #[test]
    fn register_then_duplicate_fails_without_mutation() {
        let admin = AccountId::new();
        let owner = AccountId::new();
        let other_owner = AccountId::new();
        let unit = UnitId::new();
        let mut dir = ValidatorDirectory::new(admin);

        dir.register(admin, unit, "Acme Title", "", owner, land_only())
            .unwrap();
        let err = dir
            .register(admin, unit, "Imposter", "", other_owner, land_only())
            .unwrap_err();
        assert_matches!(err, DirectoryError::AlreadyRegistered(u) if u == unit);

        let entry = dir.get(unit).unwrap();
        assert_eq!(entry.name, "Acme Title");
        assert_eq!(entry.owner, owner);
    }

    #[test]
    fn non_admin_cannot_mutate() {
        let admin = AccountId::new();
        let stranger = AccountId::new();
        let unit = UnitId::new();
        let mut dir = ValidatorDirectory::new(admin);

        let err = dir
            .register(stranger, unit, "n", "", AccountId::new(), land_only())
            .unwrap_err();
        assert_matches!(err, DirectoryError::NotAdmin);
    }

    #[test]
    fn deactivated_unit_is_excluded_from_asset_type_query() {
        let admin = AccountId::new();
        let unit = UnitId::new();
        let mut dir = ValidatorDirectory::new(admin);
        dir.register(admin, unit, "n", "", AccountId::new(), land_only())
            .unwrap();

        assert!(dir
            .validators_for_asset_type(AssetType::Land)
            .contains(&unit));
        assert!(dir.validators_for_asset_type(AssetType::Vehicle).is_empty());

        dir.update_status(admin, unit, false).unwrap();
        assert!(dir.validators_for_asset_type(AssetType::Land).is_empty());
        // Entry survives deactivation for historical attribution.
        assert!(dir.get(unit).is_some());
        assert!(!dir.is_active(unit));
    }

    #[test]
    fn remove_gated_on_live_assignments() {
        let admin = AccountId::new();
        let unit = UnitId::new();
        let mut dir = ValidatorDirectory::new(admin);
        dir.register(admin, unit, "n", "", AccountId::new(), land_only())
            .unwrap();

        let err = dir.remove(admin, unit, &FixedAssignments(3)).unwrap_err();
        assert_matches!(err, DirectoryError::StillAssigned { live: 3, .. });
        assert!(dir.get(unit).is_some());

        dir.remove(admin, unit, &NoAssignments).unwrap();
        assert!(dir.get(unit).is_none());
    }

    #[test]
    fn nil_owner_and_empty_asset_set_rejected() {
        let admin = AccountId::new();
        let mut dir = ValidatorDirectory::new(admin);

        assert_matches!(
            dir.register(admin, UnitId::new(), "n", "", AccountId::nil(), land_only()),
            Err(DirectoryError::NilOwner)
        );
        assert_matches!(
            dir.register(admin, UnitId::new(), "n", "", AccountId::new(), BTreeSet::new()),
            Err(DirectoryError::NoAssetTypes)
        );
    }

    #[test]
    fn events_accumulate_and_drain() {
        let admin = AccountId::new();
        let unit = UnitId::new();
        let mut dir = ValidatorDirectory::new(admin);
        dir.register(admin, unit, "n", "", AccountId::new(), land_only())
            .unwrap();
        dir.update_status(admin, unit, false).unwrap();

        let events = dir.take_events();
        assert_eq!(events.len(), 2);
        assert_matches!(events[1], DirectoryEvent::StatusChanged { active: false, .. });
        assert!(dir.take_events().is_empty());
    }
}
