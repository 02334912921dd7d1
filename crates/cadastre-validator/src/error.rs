//! Validator unit error types

use cadastre_core::{ErrorClass, TokenError, TokenId};
use cadastre_registry::RegistryError;

/// Errors from Validator Unit operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UnitError {
    /// Caller does not hold the required unit role.
    #[error("caller does not hold the {0} role on this unit")]
    MissingRole(&'static str),

    /// Caller is not the configured royalty receiver.
    #[error("caller is not the royalty receiver")]
    NotRoyaltyReceiver,

    /// Token is not on the unit's whitelist.
    #[error("token not whitelisted: {0}")]
    TokenNotWhitelisted(TokenId),

    /// Token is already on the unit's whitelist.
    #[error("token already whitelisted: {0}")]
    TokenAlreadyWhitelisted(TokenId),

    /// Royalty percentage above the hard cap.
    #[error("royalty percentage {got}bps exceeds the {cap}bps cap")]
    RoyaltyAboveCap {
        /// Requested percentage.
        got: u16,
        /// Hard cap.
        cap: u16,
    },

    /// Royalty receiver must be a real identity.
    #[error("royalty receiver must not be the nil identity")]
    NilRoyaltyReceiver,

    /// An operating agreement is already registered for the URI.
    #[error("operating agreement already registered: {0}")]
    AgreementAlreadyRegistered(String),

    /// No operating agreement registered for the URI.
    #[error("no operating agreement registered: {0}")]
    AgreementNotRegistered(String),

    /// Withdrawal of a zero balance. Explicit failure, not a no-op.
    #[error("nothing to withdraw for token {0}")]
    NothingToWithdraw(TokenId),

    /// The underlying registry rejected the validation write.
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// The token ledger rejected a payout.
    #[error(transparent)]
    Token(#[from] TokenError),
}

impl UnitError {
    /// Taxonomy class for this error.
    pub fn class(&self) -> ErrorClass {
        match self {
            UnitError::MissingRole(_) | UnitError::NotRoyaltyReceiver => {
                ErrorClass::Authorization
            }
            UnitError::TokenNotWhitelisted(_)
            | UnitError::TokenAlreadyWhitelisted(_)
            | UnitError::AgreementAlreadyRegistered(_)
            | UnitError::AgreementNotRegistered(_)
            | UnitError::NothingToWithdraw(_) => ErrorClass::State,
            UnitError::RoyaltyAboveCap { .. } | UnitError::NilRoyaltyReceiver => ErrorClass::Input,
            UnitError::Registry(err) => err.class(),
            UnitError::Token(err) => err.class(),
        }
    }
}
