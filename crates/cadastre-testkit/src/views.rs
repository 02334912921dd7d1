//! Static view implementations
//!
//! Fixed-answer implementations of the cross-component view traits, so a
//! component under test does not need its real neighbors.

use cadastre_core::{
    AccountId, AssetType, BasisPoints, CommissionView, RoyaltyView, UnitId, ValidationPolicyView,
};
use std::collections::{BTreeSet, HashMap};

/// Static validation-policy view: explicit validator-role grants and
/// explicit vacuous (unit, asset type) pairs.
#[derive(Debug, Default)]
pub struct StaticPolicy {
    validators: HashMap<UnitId, BTreeSet<AccountId>>,
    vacuous: BTreeSet<(UnitId, AssetType)>,
}

impl StaticPolicy {
    /// Empty policy: nobody validates anything, nothing is vacuous.
    pub fn new() -> Self {
        Self::default()
    }

    /// Grant `account` the validator role on `unit`.
    pub fn with_validator(mut self, unit: UnitId, account: AccountId) -> Self {
        self.validators.entry(unit).or_default().insert(account);
        self
    }

    /// Mark the unit's criteria vacuously satisfied for an asset type.
    pub fn with_vacuous(mut self, unit: UnitId, asset_type: AssetType) -> Self {
        self.vacuous.insert((unit, asset_type));
        self
    }
}

impl ValidationPolicyView for StaticPolicy {
    fn vacuously_satisfied(&self, unit: UnitId, asset_type: AssetType) -> bool {
        self.vacuous.contains(&(unit, asset_type))
    }

    fn is_unit_validator(&self, unit: UnitId, account: AccountId) -> bool {
        self.validators
            .get(&unit)
            .is_some_and(|set| set.contains(&account))
    }
}

/// Static royalty view: per-unit receiver and percentage.
#[derive(Debug, Default)]
pub struct StaticRoyalty {
    configs: HashMap<UnitId, (AccountId, BasisPoints)>,
}

impl StaticRoyalty {
    /// No royalty configuration for any unit.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configure a unit's receiver and percentage.
    pub fn with_config(mut self, unit: UnitId, receiver: AccountId, bps: BasisPoints) -> Self {
        self.configs.insert(unit, (receiver, bps));
        self
    }
}

impl RoyaltyView for StaticRoyalty {
    fn royalty_config(&self, unit: UnitId) -> Option<(AccountId, BasisPoints)> {
        self.configs.get(&unit).copied()
    }
}

/// Static commission view: one percentage, one receiver.
#[derive(Debug)]
pub struct StaticCommission {
    /// Commission percentage applied to regular flows.
    pub bps: BasisPoints,
    /// Protocol fee receiver.
    pub receiver: AccountId,
}

impl CommissionView for StaticCommission {
    fn regular_commission_bps(&self) -> BasisPoints {
        self.bps
    }

    fn fee_receiver(&self) -> AccountId {
        self.receiver
    }
}
