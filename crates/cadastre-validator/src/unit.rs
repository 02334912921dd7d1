//! Validator unit state and operations

use crate::criteria::ValidationCriteria;
use crate::error::UnitError;
use cadastre_core::{
    reserved, AccountId, AssetType, BasisPoints, CommissionView, RecordId, RoleTable,
    RoyaltyView, TokenBank, TokenId, TraitKey, UnitId, ValidationPolicyView, MAX_ROYALTY_BPS,
};
use cadastre_registry::AssetRegistry;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use tracing::{debug, info, warn};

/// Roles on one validator unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnitRole {
    /// May administer roles, tokens, and the settlement attachment.
    Admin,
    /// May assert validation verdicts for records assigned to this unit.
    Validator,
    /// May set per-asset-type criteria and the agreement registry.
    CriteriaManager,
    /// May manage the fee schedule and withdraw service fees.
    FeeManager,
}

impl UnitRole {
    fn name(&self) -> &'static str {
        match self {
            UnitRole::Admin => "admin",
            UnitRole::Validator => "validator",
            UnitRole::CriteriaManager => "criteria-manager",
            UnitRole::FeeManager => "fee-manager",
        }
    }
}

/// Events emitted by a validator unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnitEvent {
    /// Funds entered the unit's treasury.
    FundsDeposited {
        /// Token deposited.
        token: TokenId,
        /// Amount deposited.
        amount: u128,
    },
    /// Royalties were paid out to the configured receiver.
    RoyaltiesWithdrawn {
        /// Token withdrawn.
        token: TokenId,
        /// Amount paid to the receiver, net of commission.
        amount: u128,
        /// Commission cut paid to the protocol fee receiver.
        commission: u128,
    },
    /// Service fees were paid out.
    ServiceFeesWithdrawn {
        /// Token withdrawn.
        token: TokenId,
        /// Amount paid out, net of commission.
        amount: u128,
        /// Commission cut paid to the protocol fee receiver.
        commission: u128,
    },
}

/// One validator organization's on-ledger unit.
#[derive(Debug)]
pub struct ValidatorUnit {
    id: UnitId,
    /// Bank identity the unit's held tokens sit under.
    treasury: AccountId,
    roles: RoleTable<UnitRole>,
    criteria: HashMap<AssetType, ValidationCriteria>,
    whitelisted_tokens: BTreeSet<TokenId>,
    service_fees: HashMap<TokenId, u128>,
    royalty_bps: BasisPoints,
    royalty_receiver: Option<AccountId>,
    /// Operating agreement registry: URI to display name.
    agreements: HashMap<String, String>,
    royalty_balances: HashMap<TokenId, u128>,
    service_fee_balances: HashMap<TokenId, u128>,
    events: Vec<UnitEvent>,
}

impl ValidatorUnit {
    /// Create a unit administered by `admin`, holding funds under
    /// `treasury`.
    pub fn new(id: UnitId, admin: AccountId, treasury: AccountId) -> Self {
        let mut roles = RoleTable::new();
        roles.grant(UnitRole::Admin, admin);
        Self {
            id,
            treasury,
            roles,
            criteria: HashMap::new(),
            whitelisted_tokens: BTreeSet::new(),
            service_fees: HashMap::new(),
            royalty_bps: BasisPoints::ZERO,
            royalty_receiver: None,
            agreements: HashMap::new(),
            royalty_balances: HashMap::new(),
            service_fee_balances: HashMap::new(),
            events: Vec::new(),
        }
    }

    /// This unit's identity.
    pub fn id(&self) -> UnitId {
        self.id
    }

    /// The bank identity the unit's funds sit under.
    pub fn treasury(&self) -> AccountId {
        self.treasury
    }

    /// Grant a unit role.
    pub fn grant_role(
        &mut self,
        caller: AccountId,
        role: UnitRole,
        account: AccountId,
    ) -> Result<(), UnitError> {
        self.require(UnitRole::Admin, caller)?;
        self.roles.grant(role, account);
        Ok(())
    }

    /// Revoke a unit role.
    pub fn revoke_role(
        &mut self,
        caller: AccountId,
        role: UnitRole,
        account: AccountId,
    ) -> Result<(), UnitError> {
        self.require(UnitRole::Admin, caller)?;
        self.roles.revoke(role, account);
        Ok(())
    }

    // ---- Criteria ----

    /// Set the acceptance criteria for an asset type.
    pub fn set_criteria(
        &mut self,
        caller: AccountId,
        asset_type: AssetType,
        criteria: ValidationCriteria,
    ) -> Result<(), UnitError> {
        self.require(UnitRole::CriteriaManager, caller)?;
        debug!(unit = %self.id, %asset_type, "criteria updated");
        self.criteria.insert(asset_type, criteria);
        Ok(())
    }

    /// Drop the criteria for an asset type, making it unsupported.
    pub fn clear_criteria(
        &mut self,
        caller: AccountId,
        asset_type: AssetType,
    ) -> Result<(), UnitError> {
        self.require(UnitRole::CriteriaManager, caller)?;
        self.criteria.remove(&asset_type);
        Ok(())
    }

    /// The criteria for an asset type, if the unit supports it.
    pub fn criteria(&self, asset_type: AssetType) -> Option<&ValidationCriteria> {
        self.criteria.get(&asset_type)
    }

    /// Whether the unit currently accepts the asset type.
    pub fn supports(&self, asset_type: AssetType) -> bool {
        self.criteria.contains_key(&asset_type)
    }

    // ---- Fee schedule ----

    /// Add a payment token to the whitelist. Duplicates are rejected.
    pub fn add_whitelisted_token(
        &mut self,
        caller: AccountId,
        token: TokenId,
    ) -> Result<(), UnitError> {
        self.require(UnitRole::FeeManager, caller)?;
        if !self.whitelisted_tokens.insert(token) {
            return Err(UnitError::TokenAlreadyWhitelisted(token));
        }
        Ok(())
    }

    /// Remove a payment token from the whitelist. Its fee entry goes too.
    pub fn remove_whitelisted_token(
        &mut self,
        caller: AccountId,
        token: TokenId,
    ) -> Result<(), UnitError> {
        self.require(UnitRole::FeeManager, caller)?;
        if !self.whitelisted_tokens.remove(&token) {
            return Err(UnitError::TokenNotWhitelisted(token));
        }
        self.service_fees.remove(&token);
        Ok(())
    }

    /// Set the service fee for a whitelisted token.
    pub fn set_service_fee(
        &mut self,
        caller: AccountId,
        token: TokenId,
        amount: u128,
    ) -> Result<(), UnitError> {
        self.require(UnitRole::FeeManager, caller)?;
        if !self.whitelisted_tokens.contains(&token) {
            return Err(UnitError::TokenNotWhitelisted(token));
        }
        self.service_fees.insert(token, amount);
        Ok(())
    }

    /// The service fee for a token, if configured.
    pub fn service_fee(&self, token: TokenId) -> Option<u128> {
        self.service_fees.get(&token).copied()
    }

    // ---- Royalty configuration ----

    /// Set the royalty percentage. Hard-capped to bound extractable value.
    pub fn set_royalty_fee_percentage(
        &mut self,
        caller: AccountId,
        bps: u16,
    ) -> Result<(), UnitError> {
        self.require(UnitRole::Admin, caller)?;
        if bps > MAX_ROYALTY_BPS {
            return Err(UnitError::RoyaltyAboveCap {
                got: bps,
                cap: MAX_ROYALTY_BPS,
            });
        }
        // Bounded by the cap, so the constructor cannot fail here.
        self.royalty_bps = BasisPoints::new(bps).map_err(|_| UnitError::RoyaltyAboveCap {
            got: bps,
            cap: MAX_ROYALTY_BPS,
        })?;
        Ok(())
    }

    /// Set the royalty receiver. The nil identity is rejected.
    pub fn set_royalty_receiver(
        &mut self,
        caller: AccountId,
        receiver: AccountId,
    ) -> Result<(), UnitError> {
        self.require(UnitRole::Admin, caller)?;
        if receiver.is_nil() {
            return Err(UnitError::NilRoyaltyReceiver);
        }
        self.royalty_receiver = Some(receiver);
        Ok(())
    }

    /// The configured royalty percentage.
    pub fn royalty_fee_percentage(&self) -> BasisPoints {
        self.royalty_bps
    }

    /// The configured royalty receiver.
    pub fn royalty_receiver(&self) -> Option<AccountId> {
        self.royalty_receiver
    }

    // ---- Operating agreements ----

    /// Register an operating agreement under a URI. Duplicates are
    /// rejected; use [`set_operating_agreement_name`] to rename.
    ///
    /// [`set_operating_agreement_name`]: ValidatorUnit::set_operating_agreement_name
    pub fn register_operating_agreement(
        &mut self,
        caller: AccountId,
        uri: impl Into<String>,
        name: impl Into<String>,
    ) -> Result<(), UnitError> {
        self.require(UnitRole::CriteriaManager, caller)?;
        let uri = uri.into();
        if self.agreements.contains_key(&uri) {
            return Err(UnitError::AgreementAlreadyRegistered(uri));
        }
        self.agreements.insert(uri, name.into());
        Ok(())
    }

    /// Rename an already-registered operating agreement.
    pub fn set_operating_agreement_name(
        &mut self,
        caller: AccountId,
        uri: &str,
        name: impl Into<String>,
    ) -> Result<(), UnitError> {
        self.require(UnitRole::CriteriaManager, caller)?;
        match self.agreements.get_mut(uri) {
            Some(entry) => {
                *entry = name.into();
                Ok(())
            }
            None => Err(UnitError::AgreementNotRegistered(uri.to_string())),
        }
    }

    /// Remove an operating agreement's name registration.
    pub fn remove_operating_agreement_name(
        &mut self,
        caller: AccountId,
        uri: &str,
    ) -> Result<(), UnitError> {
        self.require(UnitRole::CriteriaManager, caller)?;
        if self.agreements.remove(uri).is_none() {
            return Err(UnitError::AgreementNotRegistered(uri.to_string()));
        }
        Ok(())
    }

    /// Whether a name is registered for the agreement URI.
    pub fn validate_operating_agreement(&self, uri: &str) -> bool {
        self.agreements.contains_key(uri)
    }

    /// The registered name for an agreement URI.
    pub fn operating_agreement_name(&self, uri: &str) -> Option<&str> {
        self.agreements.get(uri).map(String::as_str)
    }

    // ---- Validation ----

    /// Evaluate a record against this unit's criteria and write the
    /// verdict through the registry. Returns the verdict.
    ///
    /// The verdict is false when the asset type is unsupported, a
    /// required trait is missing or empty, the operating agreement does
    /// not resolve while required, or the definition is empty while
    /// required. A single read-then-write pass; no partial success.
    pub fn validate_deed(
        &self,
        caller: AccountId,
        record: RecordId,
        registry: &mut AssetRegistry,
    ) -> Result<bool, UnitError> {
        self.require(UnitRole::Validator, caller)?;
        let verdict = self.evaluate(record, registry)?;
        registry.assert_validation(caller, record, verdict, self)?;
        info!(unit = %self.id, %record, verdict, "deed validated");
        Ok(verdict)
    }

    /// Explicit negative assertion, for deliberate revocation independent
    /// of the criteria evaluation.
    pub fn invalidate_deed(
        &self,
        caller: AccountId,
        record: RecordId,
        registry: &mut AssetRegistry,
    ) -> Result<(), UnitError> {
        self.require(UnitRole::Validator, caller)?;
        registry.assert_validation(caller, record, false, self)?;
        info!(unit = %self.id, %record, "deed invalidated");
        Ok(())
    }

    fn evaluate(&self, record: RecordId, registry: &AssetRegistry) -> Result<bool, UnitError> {
        let entry = registry
            .record(record)
            .ok_or(cadastre_registry::RegistryError::RecordNotFound(record))?;

        let Some(criteria) = self.criteria.get(&entry.asset_type) else {
            warn!(unit = %self.id, %record, asset_type = %entry.asset_type,
                  "unsupported asset type");
            return Ok(false);
        };

        for name in &criteria.required_traits {
            let present = entry
                .trait_value(TraitKey::named(name))
                .is_some_and(|v| !v.is_empty());
            if !present {
                debug!(unit = %self.id, %record, trait_name = %name, "required trait missing");
                return Ok(false);
            }
        }

        if criteria.require_operating_agreement {
            let resolves = entry
                .trait_value(*reserved::OPERATING_AGREEMENT)
                .and_then(|v| v.as_utf8())
                .is_some_and(|uri| self.validate_operating_agreement(uri));
            if !resolves {
                return Ok(false);
            }
        }

        if criteria.require_definition {
            let non_empty = entry
                .trait_value(*reserved::DEFINITION)
                .is_some_and(|v| !v.is_empty());
            if !non_empty {
                return Ok(false);
            }
        }

        Ok(true)
    }

    // ---- Funds ----

    /// Move tokens from `payer` into the treasury and record them as
    /// royalty balance.
    pub fn deposit_royalty(
        &mut self,
        payer: AccountId,
        token: TokenId,
        amount: u128,
        bank: &mut impl TokenBank,
    ) -> Result<(), UnitError> {
        if !self.whitelisted_tokens.contains(&token) {
            return Err(UnitError::TokenNotWhitelisted(token));
        }
        bank.transfer(token, payer, self.treasury, amount)?;
        *self.royalty_balances.entry(token).or_insert(0) += amount;
        self.events.push(UnitEvent::FundsDeposited { token, amount });
        Ok(())
    }

    /// Move tokens from `payer` into the treasury and record them as
    /// service-fee balance.
    pub fn deposit_service_fee(
        &mut self,
        payer: AccountId,
        token: TokenId,
        amount: u128,
        bank: &mut impl TokenBank,
    ) -> Result<(), UnitError> {
        if !self.whitelisted_tokens.contains(&token) {
            return Err(UnitError::TokenNotWhitelisted(token));
        }
        bank.transfer(token, payer, self.treasury, amount)?;
        *self.service_fee_balances.entry(token).or_insert(0) += amount;
        self.events.push(UnitEvent::FundsDeposited { token, amount });
        Ok(())
    }

    /// Tracked royalty balance for a token.
    pub fn royalty_balance(&self, token: TokenId) -> u128 {
        self.royalty_balances.get(&token).copied().unwrap_or(0)
    }

    /// Tracked service-fee balance for a token.
    pub fn service_fee_balance(&self, token: TokenId) -> u128 {
        self.service_fee_balances.get(&token).copied().unwrap_or(0)
    }

    /// Pay out the full royalty balance of `token` to the configured
    /// receiver, splitting the commission cut to the protocol fee
    /// receiver when a settlement ledger is attached. Reverts on a zero
    /// balance.
    pub fn withdraw_royalties(
        &mut self,
        caller: AccountId,
        token: TokenId,
        bank: &mut impl TokenBank,
        commission: Option<&impl CommissionView>,
    ) -> Result<u128, UnitError> {
        if self.royalty_receiver != Some(caller) {
            return Err(UnitError::NotRoyaltyReceiver);
        }
        let balance = self.royalty_balance(token);
        if balance == 0 {
            return Err(UnitError::NothingToWithdraw(token));
        }

        let (net, cut) = self.split_commission(balance, commission);
        bank.transfer(token, self.treasury, caller, net)?;
        if cut > 0 {
            // Unwrap-free: cut > 0 implies a commission view was supplied.
            if let Some(view) = commission {
                bank.transfer(token, self.treasury, view.fee_receiver(), cut)?;
            }
        }
        self.royalty_balances.insert(token, 0);
        info!(unit = %self.id, %token, net, cut, "royalties withdrawn");
        self.events.push(UnitEvent::RoyaltiesWithdrawn {
            token,
            amount: net,
            commission: cut,
        });
        Ok(net)
    }

    /// Pay out the full service-fee balance of `token`. Restricted to the
    /// fee-manager role; same commission split and zero-balance revert as
    /// royalty withdrawal.
    pub fn withdraw_service_fees(
        &mut self,
        caller: AccountId,
        token: TokenId,
        bank: &mut impl TokenBank,
        commission: Option<&impl CommissionView>,
    ) -> Result<u128, UnitError> {
        self.require(UnitRole::FeeManager, caller)?;
        let balance = self.service_fee_balance(token);
        if balance == 0 {
            return Err(UnitError::NothingToWithdraw(token));
        }

        let (net, cut) = self.split_commission(balance, commission);
        bank.transfer(token, self.treasury, caller, net)?;
        if cut > 0 {
            if let Some(view) = commission {
                bank.transfer(token, self.treasury, view.fee_receiver(), cut)?;
            }
        }
        self.service_fee_balances.insert(token, 0);
        info!(unit = %self.id, %token, net, cut, "service fees withdrawn");
        self.events.push(UnitEvent::ServiceFeesWithdrawn {
            token,
            amount: net,
            commission: cut,
        });
        Ok(net)
    }

    /// Drain accumulated events.
    pub fn take_events(&mut self) -> Vec<UnitEvent> {
        std::mem::take(&mut self.events)
    }

    fn split_commission(
        &self,
        balance: u128,
        commission: Option<&impl CommissionView>,
    ) -> (u128, u128) {
        match commission {
            Some(view) => {
                let cut = view.regular_commission_bps().apply(balance);
                (balance - cut, cut)
            }
            None => (balance, 0),
        }
    }

    fn require(&self, role: UnitRole, caller: AccountId) -> Result<(), UnitError> {
        if !self.roles.has(role, caller) {
            return Err(UnitError::MissingRole(role.name()));
        }
        Ok(())
    }
}

impl ValidationPolicyView for ValidatorUnit {
    fn vacuously_satisfied(&self, unit: UnitId, asset_type: AssetType) -> bool {
        unit == self.id
            && self
                .criteria
                .get(&asset_type)
                .is_some_and(ValidationCriteria::is_vacuous)
    }

    fn is_unit_validator(&self, unit: UnitId, account: AccountId) -> bool {
        unit == self.id && self.roles.has(UnitRole::Validator, account)
    }
}

impl RoyaltyView for ValidatorUnit {
    fn royalty_config(&self, unit: UnitId) -> Option<(AccountId, BasisPoints)> {
        if unit != self.id {
            return None;
        }
        self.royalty_receiver.map(|r| (r, self.royalty_bps))
    }
}
