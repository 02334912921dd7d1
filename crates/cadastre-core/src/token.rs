//! Token-bank seam
//!
//! Payment tokens are external fungible ledgers. The protocol only needs
//! four capabilities from them: balance reads, allowance grants, direct
//! transfers, and allowance-backed pulls. Hosts adapt their real ledger
//! behind [`TokenBank`]; tests use the in-memory bank from the testkit.

use crate::error::ErrorClass;
use crate::identifiers::{AccountId, TokenId};

/// Errors surfaced by a token ledger. All are Funds-class.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    /// Holder balance is below the requested amount.
    #[error("insufficient balance of {token} for {account}: have {available}, need {required}")]
    InsufficientBalance {
        /// Token being moved.
        token: TokenId,
        /// Account being debited.
        account: AccountId,
        /// Balance actually held.
        available: u128,
        /// Amount requested.
        required: u128,
    },

    /// Spender allowance is below the requested amount.
    #[error("insufficient allowance of {token} from {owner} to {spender}: have {available}, need {required}")]
    InsufficientAllowance {
        /// Token being pulled.
        token: TokenId,
        /// Account granting the allowance.
        owner: AccountId,
        /// Account pulling the funds.
        spender: AccountId,
        /// Allowance actually granted.
        available: u128,
        /// Amount requested.
        required: u128,
    },
}

impl TokenError {
    /// Taxonomy class for this error.
    pub fn class(&self) -> ErrorClass {
        ErrorClass::Funds
    }
}

/// Narrow interface to an external fungible-token ledger.
pub trait TokenBank {
    /// Current balance of `account` in `token`.
    fn balance_of(&self, token: TokenId, account: AccountId) -> u128;

    /// Remaining allowance granted by `owner` to `spender`.
    fn allowance(&self, token: TokenId, owner: AccountId, spender: AccountId) -> u128;

    /// Grant `spender` an allowance over `owner`'s balance. Overwrites any
    /// previous grant.
    fn approve(&mut self, token: TokenId, owner: AccountId, spender: AccountId, amount: u128);

    /// Move funds from `from` to `to` on the authority of `from` itself.
    fn transfer(
        &mut self,
        token: TokenId,
        from: AccountId,
        to: AccountId,
        amount: u128,
    ) -> Result<(), TokenError>;

    /// Pull funds from `from` to `to` on the authority of an allowance
    /// granted to `spender`. Decrements the allowance by the amount moved.
    fn transfer_from(
        &mut self,
        token: TokenId,
        spender: AccountId,
        from: AccountId,
        to: AccountId,
        amount: u128,
    ) -> Result<(), TokenError>;
}
