//! Read-only cross-component views
//!
//! Each component consults its neighbors through one of these narrow
//! traits rather than through a shared mutable reference. The traits are
//! deliberately minimal: a component's invariants must be checkable
//! against these signatures alone.

use crate::asset::AssetType;
use crate::bps::BasisPoints;
use crate::identifiers::{AccountId, UnitId};

/// Directory facts the Asset Registry and Settlement Ledger rely on.
pub trait DirectoryView {
    /// Whether the unit has ever been registered.
    fn is_registered(&self, unit: UnitId) -> bool;

    /// Whether the unit is currently active. Inactive units cannot be
    /// assigned to new records.
    fn is_active(&self, unit: UnitId) -> bool;

    /// Whether the unit supports the asset type.
    fn supports(&self, unit: UnitId, asset_type: AssetType) -> bool;

    /// The beneficiary entitled to the unit's accrued commission.
    fn owner_of(&self, unit: UnitId) -> Option<AccountId>;
}

/// Registry facts the Validator Directory relies on for removal gating.
pub trait AssignmentView {
    /// Number of live records currently assigned to the unit.
    fn live_assignments(&self, unit: UnitId) -> u64;
}

/// Validator-unit criteria facts the Asset Registry relies on at mint.
pub trait ValidationPolicyView {
    /// Whether the unit's criteria for the asset type are satisfied by any
    /// record whatsoever (no required traits, no mandatory agreement or
    /// definition). Unknown units are never vacuously satisfied.
    fn vacuously_satisfied(&self, unit: UnitId, asset_type: AssetType) -> bool;

    /// Whether the given identity holds the unit's validator role.
    fn is_unit_validator(&self, unit: UnitId, account: AccountId) -> bool;
}

/// Validator-unit royalty configuration the Asset Registry quotes from.
pub trait RoyaltyView {
    /// Configured royalty receiver and percentage, if both are set.
    fn royalty_config(&self, unit: UnitId) -> Option<(AccountId, BasisPoints)>;
}

/// Settlement facts used for net-of-commission royalty quotes and
/// withdrawal-time splits.
pub trait CommissionView {
    /// The commission percentage applied to regular flows.
    fn regular_commission_bps(&self) -> BasisPoints;

    /// The protocol fee receiver the commission cut is paid to.
    fn fee_receiver(&self) -> AccountId;
}
