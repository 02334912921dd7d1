//! Settlement error types

use cadastre_core::{ErrorClass, InvalidBasisPoints, TokenError, TokenId, UnitId};
use cadastre_registry::RegistryError;

/// Errors from Settlement Ledger operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SettlementError {
    /// Caller does not hold the ledger administrator role.
    #[error("caller is not a settlement administrator")]
    NotAdmin,

    /// Token is not whitelisted for fee payment.
    #[error("token not whitelisted: {0}")]
    TokenNotWhitelisted(TokenId),

    /// Duplicate application of a whitelist update.
    #[error("token whitelist for {token} is already {allowed}")]
    TokenWhitelistUnchanged {
        /// Token whose whitelist entry was redundantly re-applied.
        token: TokenId,
        /// The state that was re-applied.
        allowed: bool,
    },

    /// No fee configured for the token.
    #[error("no service fee configured for token {0}")]
    NoFeeConfigured(TokenId),

    /// The directory has no owner mapping for the validator.
    #[error("no registered owner for validator {0}")]
    UnknownValidatorOwner(UnitId),

    /// Withdrawal of a zero balance. Explicit failure, not a no-op.
    #[error("nothing to withdraw for token {0}")]
    NothingToWithdraw(TokenId),

    /// Fee receiver must be a real identity.
    #[error("fee receiver must not be the nil identity")]
    NilFeeReceiver,

    /// Commission percentage out of range.
    #[error(transparent)]
    InvalidCommission(#[from] InvalidBasisPoints),

    /// The registry rejected the forwarded mint.
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// The token ledger rejected a movement.
    #[error(transparent)]
    Token(#[from] TokenError),
}

impl SettlementError {
    /// Taxonomy class for this error.
    pub fn class(&self) -> ErrorClass {
        match self {
            SettlementError::NotAdmin => ErrorClass::Authorization,
            SettlementError::TokenNotWhitelisted(_)
            | SettlementError::TokenWhitelistUnchanged { .. }
            | SettlementError::NoFeeConfigured(_)
            | SettlementError::UnknownValidatorOwner(_)
            | SettlementError::NothingToWithdraw(_) => ErrorClass::State,
            SettlementError::NilFeeReceiver | SettlementError::InvalidCommission(_) => {
                ErrorClass::Input
            }
            SettlementError::Registry(err) => err.class(),
            SettlementError::Token(err) => err.class(),
        }
    }
}
