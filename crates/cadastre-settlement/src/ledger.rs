//! Settlement ledger state and operations

use crate::error::SettlementError;
use cadastre_core::{
    AccountId, BasisPoints, CommissionView, DirectoryView, RecordId, RoleTable, TokenBank,
    TokenId, ValidationPolicyView,
};
use cadastre_registry::{AssetRegistry, MintRequest};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use tracing::{info, warn};

/// Roles on the settlement ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Role {
    Admin,
}

/// Mint fee amounts for one token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeSchedule {
    /// Fee for a regular mint.
    pub regular: u128,
    /// Fee for a validator-originated mint.
    pub validator_originated: u128,
}

/// Commission percentages applied when splitting collected fees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommissionSchedule {
    /// Percentage for regular mints.
    pub regular: BasisPoints,
    /// Percentage for validator-originated mints.
    pub validator_originated: BasisPoints,
}

impl Default for CommissionSchedule {
    /// The canonical split: 500 bps regular, 300 bps validator-originated.
    fn default() -> Self {
        Self {
            regular: BasisPoints::from_const(500),
            validator_originated: BasisPoints::from_const(300),
        }
    }
}

/// Events emitted by the settlement ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SettlementEvent {
    /// A mint fee entered escrow and was split.
    FeeCollected {
        /// Payment token.
        token: TokenId,
        /// Fee payer.
        payer: AccountId,
        /// Total fee collected.
        fee: u128,
        /// Commission credited to the validator's owner.
        commission: u128,
        /// Beneficiary of the commission.
        validator_owner: AccountId,
    },
    /// The protocol's service-fee pool was paid out.
    ServiceFeesWithdrawn {
        /// Payment token.
        token: TokenId,
        /// Amount paid to the fee receiver.
        amount: u128,
    },
    /// A validator owner's commission balance was paid out.
    CommissionWithdrawn {
        /// Beneficiary.
        account: AccountId,
        /// Payment token.
        token: TokenId,
        /// Amount paid.
        amount: u128,
    },
    /// A token's whitelist entry changed.
    TokenWhitelisted {
        /// Token.
        token: TokenId,
        /// New state.
        allowed: bool,
    },
    /// A token's fee schedule changed.
    FeeScheduleUpdated {
        /// Token.
        token: TokenId,
    },
}

/// The fee escrow and commission ledger.
#[derive(Debug)]
pub struct SettlementLedger {
    /// Bank identity escrowed funds sit under; also the identity the
    /// ledger presents to the registry when forwarding mints.
    escrow: AccountId,
    fee_receiver: AccountId,
    roles: RoleTable<Role>,
    whitelist: BTreeSet<TokenId>,
    fees: HashMap<TokenId, FeeSchedule>,
    commission: CommissionSchedule,
    service_fees: HashMap<TokenId, u128>,
    commissions: HashMap<(AccountId, TokenId), u128>,
    events: Vec<SettlementEvent>,
}

impl SettlementLedger {
    /// Create a ledger administered by `admin`, escrowing under `escrow`,
    /// paying protocol fees to `fee_receiver`, with the canonical
    /// commission split.
    pub fn new(
        admin: AccountId,
        escrow: AccountId,
        fee_receiver: AccountId,
    ) -> Result<Self, SettlementError> {
        if fee_receiver.is_nil() {
            return Err(SettlementError::NilFeeReceiver);
        }
        let mut roles = RoleTable::new();
        roles.grant(Role::Admin, admin);
        Ok(Self {
            escrow,
            fee_receiver,
            roles,
            whitelist: BTreeSet::new(),
            fees: HashMap::new(),
            commission: CommissionSchedule::default(),
            service_fees: HashMap::new(),
            commissions: HashMap::new(),
            events: Vec::new(),
        })
    }

    /// The ledger's escrow identity. Attach this to the registry so the
    /// ledger may forward mints.
    pub fn escrow(&self) -> AccountId {
        self.escrow
    }

    // ---- Configuration ----

    /// Allow or disallow a payment token. Duplicate application is
    /// rejected rather than silently absorbed.
    pub fn whitelist_token(
        &mut self,
        caller: AccountId,
        token: TokenId,
        allowed: bool,
    ) -> Result<(), SettlementError> {
        self.require_admin(caller)?;
        let changed = if allowed {
            self.whitelist.insert(token)
        } else {
            self.whitelist.remove(&token)
        };
        if !changed {
            return Err(SettlementError::TokenWhitelistUnchanged { token, allowed });
        }
        if !allowed {
            self.fees.remove(&token);
        }
        self.events
            .push(SettlementEvent::TokenWhitelisted { token, allowed });
        Ok(())
    }

    /// Whether a token is whitelisted.
    pub fn is_token_whitelisted(&self, token: TokenId) -> bool {
        self.whitelist.contains(&token)
    }

    /// Set the fee amounts for a whitelisted token.
    pub fn set_service_fee(
        &mut self,
        caller: AccountId,
        token: TokenId,
        regular: u128,
        validator_originated: u128,
    ) -> Result<(), SettlementError> {
        self.require_admin(caller)?;
        if !self.whitelist.contains(&token) {
            return Err(SettlementError::TokenNotWhitelisted(token));
        }
        self.fees.insert(
            token,
            FeeSchedule {
                regular,
                validator_originated,
            },
        );
        self.events.push(SettlementEvent::FeeScheduleUpdated { token });
        Ok(())
    }

    /// The fee charged for a mint with this token.
    pub fn fee_for(&self, token: TokenId, validator_originated: bool) -> Option<u128> {
        self.fees.get(&token).map(|schedule| {
            if validator_originated {
                schedule.validator_originated
            } else {
                schedule.regular
            }
        })
    }

    /// Set the commission split percentages.
    pub fn set_commission_percentage(
        &mut self,
        caller: AccountId,
        regular_bps: u16,
        validator_bps: u16,
    ) -> Result<(), SettlementError> {
        self.require_admin(caller)?;
        self.commission = CommissionSchedule {
            regular: BasisPoints::new(regular_bps)?,
            validator_originated: BasisPoints::new(validator_bps)?,
        };
        Ok(())
    }

    /// The current commission split.
    pub fn commission_percentage(&self) -> CommissionSchedule {
        self.commission
    }

    /// Replace the protocol fee receiver. The nil identity is rejected.
    pub fn set_fee_receiver(
        &mut self,
        caller: AccountId,
        receiver: AccountId,
    ) -> Result<(), SettlementError> {
        self.require_admin(caller)?;
        if receiver.is_nil() {
            return Err(SettlementError::NilFeeReceiver);
        }
        self.fee_receiver = receiver;
        Ok(())
    }

    // ---- Minting ----

    /// Collect the mint fee and forward the mint to the registry.
    ///
    /// With no payment token the request is forwarded as-is under the
    /// caller's own authority. With a token, the fee is pulled from the
    /// minter into escrow first; if the forwarded mint then fails, the
    /// pull is refunded before the error surfaces, so a failed call
    /// leaves every balance as it was.
    #[allow(clippy::too_many_arguments)]
    pub fn mint_deed(
        &mut self,
        caller: AccountId,
        request: MintRequest,
        token: Option<TokenId>,
        bank: &mut impl TokenBank,
        registry: &mut AssetRegistry,
        directory: &impl DirectoryView,
        policy: &impl ValidationPolicyView,
    ) -> Result<RecordId, SettlementError> {
        let Some(token) = token else {
            return Ok(registry.mint(caller, request, directory, policy)?);
        };

        if !self.whitelist.contains(&token) {
            return Err(SettlementError::TokenNotWhitelisted(token));
        }
        let unit = request
            .validator
            .or(registry.default_validator())
            .ok_or(SettlementError::Registry(
                cadastre_registry::RegistryError::NoValidator,
            ))?;
        let validator_owner = directory
            .owner_of(unit)
            .ok_or(SettlementError::UnknownValidatorOwner(unit))?;

        let validator_originated = policy.is_unit_validator(unit, request.minter);
        let fee = self
            .fee_for(token, validator_originated)
            .ok_or(SettlementError::NoFeeConfigured(token))?;
        let payer = request.minter;

        if fee > 0 {
            bank.transfer_from(token, self.escrow, payer, self.escrow, fee)?;
        }

        let minted = registry.mint(self.escrow, request, directory, policy);
        let record = match minted {
            Ok(record) => record,
            Err(err) => {
                if fee > 0 {
                    // Refund the pull so the failed call is a full rollback.
                    bank.transfer(token, self.escrow, payer, fee)?;
                }
                warn!(%payer, %err, "mint failed after fee pull, refunded");
                return Err(err.into());
            }
        };

        let bps = if validator_originated {
            self.commission.validator_originated
        } else {
            self.commission.regular
        };
        let commission = bps.apply(fee);
        // The remainder, dust included, goes to the service-fee pool.
        *self.service_fees.entry(token).or_insert(0) += fee - commission;
        *self
            .commissions
            .entry((validator_owner, token))
            .or_insert(0) += commission;

        info!(%record, %token, fee, commission, %validator_owner, "fee collected");
        self.events.push(SettlementEvent::FeeCollected {
            token,
            payer,
            fee,
            commission,
            validator_owner,
        });
        Ok(record)
    }

    // ---- Withdrawals ----

    /// Pay the full service-fee pool for `token` to the fee receiver,
    /// zeroing it. Administrator-only; reverts on a zero balance.
    pub fn withdraw_service_fees(
        &mut self,
        caller: AccountId,
        token: TokenId,
        bank: &mut impl TokenBank,
    ) -> Result<u128, SettlementError> {
        self.require_admin(caller)?;
        let amount = self.service_fee_balance(token);
        if amount == 0 {
            return Err(SettlementError::NothingToWithdraw(token));
        }
        bank.transfer(token, self.escrow, self.fee_receiver, amount)?;
        self.service_fees.insert(token, 0);
        info!(%token, amount, receiver = %self.fee_receiver, "service fees withdrawn");
        self.events
            .push(SettlementEvent::ServiceFeesWithdrawn { token, amount });
        Ok(amount)
    }

    /// Pay the caller's full commission balance for `token`, zeroing it.
    /// Reverts on a zero balance.
    pub fn withdraw_commission(
        &mut self,
        caller: AccountId,
        token: TokenId,
        bank: &mut impl TokenBank,
    ) -> Result<u128, SettlementError> {
        let amount = self.commission_balance(caller, token);
        if amount == 0 {
            return Err(SettlementError::NothingToWithdraw(token));
        }
        bank.transfer(token, self.escrow, caller, amount)?;
        self.commissions.insert((caller, token), 0);
        info!(%token, amount, beneficiary = %caller, "commission withdrawn");
        self.events.push(SettlementEvent::CommissionWithdrawn {
            account: caller,
            token,
            amount,
        });
        Ok(amount)
    }

    // ---- Reads ----

    /// The protocol's withdrawable service-fee pool for a token.
    pub fn service_fee_balance(&self, token: TokenId) -> u128 {
        self.service_fees.get(&token).copied().unwrap_or(0)
    }

    /// A beneficiary's withdrawable commission balance for a token.
    pub fn commission_balance(&self, account: AccountId, token: TokenId) -> u128 {
        self.commissions
            .get(&(account, token))
            .copied()
            .unwrap_or(0)
    }

    /// Sum of all tracked balances for a token. Never exceeds the escrow
    /// account's bank balance.
    pub fn tracked_total(&self, token: TokenId) -> u128 {
        let commissions: u128 = self
            .commissions
            .iter()
            .filter(|((_, t), _)| *t == token)
            .map(|(_, amount)| amount)
            .sum();
        self.service_fee_balance(token) + commissions
    }

    /// Drain accumulated events.
    pub fn take_events(&mut self) -> Vec<SettlementEvent> {
        std::mem::take(&mut self.events)
    }

    fn require_admin(&self, caller: AccountId) -> Result<(), SettlementError> {
        if !self.roles.has(Role::Admin, caller) {
            return Err(SettlementError::NotAdmin);
        }
        Ok(())
    }
}

impl CommissionView for SettlementLedger {
    fn regular_commission_bps(&self) -> BasisPoints {
        self.commission.regular
    }

    fn fee_receiver(&self) -> AccountId {
        self.fee_receiver
    }
}
