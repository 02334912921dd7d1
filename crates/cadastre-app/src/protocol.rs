//! The wired deployment

use crate::config::ProtocolConfig;
use cadastre_core::{
    AccountId, AssetType, BasisPoints, CollectionId, RecordId, RoyaltyView, TokenBank, TokenId,
    UnitId, ValidationPolicyView,
};
use cadastre_directory::{DirectoryError, ValidatorDirectory};
use cadastre_fractional::{FractionalError, FractionalVault};
use cadastre_registry::{AssetRegistry, MintRequest, RegistryError};
use cadastre_settlement::{SettlementError, SettlementLedger};
use cadastre_validator::{UnitError, UnitRole, ValidatorUnit};
use std::collections::{BTreeSet, HashMap};
use tracing::info;

/// Errors from facade-level flows.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// No validator unit instance for the identity.
    #[error("no validator unit deployed for {0}")]
    UnknownUnit(UnitId),

    /// Directory operation failed.
    #[error(transparent)]
    Directory(#[from] DirectoryError),

    /// Registry operation failed.
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// Validator unit operation failed.
    #[error(transparent)]
    Unit(#[from] UnitError),

    /// Settlement operation failed.
    #[error(transparent)]
    Settlement(#[from] SettlementError),

    /// Fractionalization operation failed.
    #[error(transparent)]
    Fractional(#[from] FractionalError),
}

/// The deployed validator units, addressable by identity.
///
/// Implements the policy and royalty views the registry and settlement
/// consult, by delegating to the unit with the queried identity.
#[derive(Debug, Default)]
pub struct UnitMap {
    units: HashMap<UnitId, ValidatorUnit>,
}

impl UnitMap {
    /// Deploy a unit. Replaces any previous instance with the same id.
    pub fn insert(&mut self, unit: ValidatorUnit) {
        self.units.insert(unit.id(), unit);
    }

    /// Shared access to a unit.
    pub fn get(&self, unit: UnitId) -> Option<&ValidatorUnit> {
        self.units.get(&unit)
    }

    /// Exclusive access to a unit, for configuration.
    pub fn get_mut(&mut self, unit: UnitId) -> Option<&mut ValidatorUnit> {
        self.units.get_mut(&unit)
    }
}

impl ValidationPolicyView for UnitMap {
    fn vacuously_satisfied(&self, unit: UnitId, asset_type: AssetType) -> bool {
        self.units
            .get(&unit)
            .is_some_and(|u| u.vacuously_satisfied(unit, asset_type))
    }

    fn is_unit_validator(&self, unit: UnitId, account: AccountId) -> bool {
        self.units
            .get(&unit)
            .is_some_and(|u| u.is_unit_validator(unit, account))
    }
}

impl RoyaltyView for UnitMap {
    fn royalty_config(&self, unit: UnitId) -> Option<(AccountId, BasisPoints)> {
        self.units.get(&unit).and_then(|u| u.royalty_config(unit))
    }
}

/// One wired deployment of the deed-tokenization core.
#[derive(Debug)]
pub struct Protocol {
    /// Validator directory.
    pub directory: ValidatorDirectory,
    /// Deed ledger.
    pub registry: AssetRegistry,
    /// Deployed validator units.
    pub units: UnitMap,
    /// Fee escrow.
    pub settlement: SettlementLedger,
    /// Fractional ownership vault.
    pub vault: FractionalVault,
}

impl Protocol {
    /// Build a deployment from configuration.
    ///
    /// `escrow` is the settlement ledger's bank identity, `custodian` the
    /// vault's registry identity. The custodian is pre-allow-listed as a
    /// marketplace so fractionalization keeps working once royalty
    /// enforcement is switched on.
    pub fn new(
        config: &ProtocolConfig,
        admin: AccountId,
        escrow: AccountId,
        fee_receiver: AccountId,
        custodian: AccountId,
    ) -> Result<Self, ProtocolError> {
        let directory = ValidatorDirectory::new(admin);
        let mut registry = AssetRegistry::new(admin, config.contract_uri.clone());
        let mut settlement = SettlementLedger::new(admin, escrow, fee_receiver)?;
        let vault = FractionalVault::new(custodian);

        registry.set_settlement(admin, Some(escrow))?;
        registry.set_approved_marketplace(admin, custodian, true)?;
        settlement.set_commission_percentage(
            admin,
            config.commission_regular_bps,
            config.commission_validator_bps,
        )?;
        for token in &config.tokens {
            settlement.whitelist_token(admin, token.id, true)?;
            settlement.set_service_fee(admin, token.id, token.regular_fee, token.validator_fee)?;
        }

        info!(tokens = config.tokens.len(), "protocol deployed");
        Ok(Self {
            directory,
            registry,
            units: UnitMap::default(),
            settlement,
            vault,
        })
    }

    /// Register a validator organization: a directory entry plus a
    /// deployed unit administered by its owner.
    #[allow(clippy::too_many_arguments)]
    pub fn register_validator(
        &mut self,
        caller: AccountId,
        unit: UnitId,
        name: &str,
        description: &str,
        owner: AccountId,
        treasury: AccountId,
        supported: BTreeSet<AssetType>,
    ) -> Result<(), ProtocolError> {
        self.directory
            .register(caller, unit, name, description, owner, supported)?;
        self.units.insert(ValidatorUnit::new(unit, owner, treasury));
        Ok(())
    }

    /// Mint through the settlement ledger, fee-bearing when a token is
    /// supplied.
    pub fn mint_deed(
        &mut self,
        caller: AccountId,
        request: MintRequest,
        token: Option<TokenId>,
        bank: &mut impl TokenBank,
    ) -> Result<RecordId, ProtocolError> {
        Ok(self.settlement.mint_deed(
            caller,
            request,
            token,
            bank,
            &mut self.registry,
            &self.directory,
            &self.units,
        )?)
    }

    /// Evaluate a record against its assigned unit's criteria and write
    /// the verdict.
    pub fn validate_deed(
        &mut self,
        caller: AccountId,
        record: RecordId,
    ) -> Result<bool, ProtocolError> {
        let unit_id = self
            .registry
            .record(record)
            .ok_or(RegistryError::RecordNotFound(record))?
            .validator;
        let unit = self
            .units
            .get(unit_id)
            .ok_or(ProtocolError::UnknownUnit(unit_id))?;
        Ok(unit.validate_deed(caller, record, &mut self.registry)?)
    }

    /// Explicit negative assertion on a record.
    pub fn invalidate_deed(
        &mut self,
        caller: AccountId,
        record: RecordId,
    ) -> Result<(), ProtocolError> {
        let unit_id = self
            .registry
            .record(record)
            .ok_or(RegistryError::RecordNotFound(record))?
            .validator;
        let unit = self
            .units
            .get(unit_id)
            .ok_or(ProtocolError::UnknownUnit(unit_id))?;
        Ok(unit.invalidate_deed(caller, record, &mut self.registry)?)
    }

    /// Surrender a record for shares.
    #[allow(clippy::too_many_arguments)]
    pub fn fractionalize(
        &mut self,
        caller: AccountId,
        record: RecordId,
        total_shares: u128,
        approval_bps: u16,
        name: &str,
        symbol: &str,
        collection_uri: &str,
    ) -> Result<CollectionId, ProtocolError> {
        Ok(self.vault.fractionalize(
            caller,
            record,
            total_shares,
            approval_bps,
            name,
            symbol,
            collection_uri,
            &mut self.registry,
        )?)
    }

    /// Reassemble a fractionalized record once quorum holds.
    pub fn unlock(
        &mut self,
        caller: AccountId,
        collection: CollectionId,
    ) -> Result<(), ProtocolError> {
        Ok(self.vault.unlock(caller, collection, &mut self.registry)?)
    }

    /// Royalty quote for a sale, net of the settlement commission.
    pub fn royalty_info(
        &self,
        record: RecordId,
        sale_price: u128,
    ) -> Result<Option<(AccountId, u128)>, ProtocolError> {
        Ok(self
            .registry
            .royalty_info(record, sale_price, &self.units, Some(&self.settlement))?)
    }

    /// Pay out a unit's royalty balance, with the settlement commission
    /// split applied.
    pub fn withdraw_unit_royalties(
        &mut self,
        caller: AccountId,
        unit: UnitId,
        token: TokenId,
        bank: &mut impl TokenBank,
    ) -> Result<u128, ProtocolError> {
        let entry = self
            .units
            .get_mut(unit)
            .ok_or(ProtocolError::UnknownUnit(unit))?;
        Ok(entry.withdraw_royalties(caller, token, bank, Some(&self.settlement))?)
    }

    /// Convenience: grant a unit role through the facade.
    pub fn grant_unit_role(
        &mut self,
        caller: AccountId,
        unit: UnitId,
        role: UnitRole,
        account: AccountId,
    ) -> Result<(), ProtocolError> {
        let entry = self
            .units
            .get_mut(unit)
            .ok_or(ProtocolError::UnknownUnit(unit))?;
        Ok(entry.grant_role(caller, role, account)?)
    }
}
