//! Fractionalization error types

use cadastre_core::{CollectionId, ErrorClass, InvalidBasisPoints, RecordId};
use cadastre_registry::RegistryError;

/// Errors from Fractional Ownership Unit operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FractionalError {
    /// No such collection.
    #[error("collection not found: {0}")]
    CollectionNotFound(CollectionId),

    /// The collection has already been unlocked and retired.
    #[error("collection retired: {0}")]
    CollectionRetired(CollectionId),

    /// A live collection already exists for the record.
    #[error("record already fractionalized: {0}")]
    AlreadyFractionalized(RecordId),

    /// Caller does not own the record being fractionalized.
    #[error("caller does not own record {0}")]
    NotRecordOwner(RecordId),

    /// Share count must be positive.
    #[error("total shares must be positive")]
    ZeroShares,

    /// Share count too large for exact quorum arithmetic.
    #[error("total shares must not exceed {0}")]
    TooManyShares(u128),

    /// Share movement larger than the sender's balance.
    #[error("insufficient shares: have {have}, need {need}")]
    InsufficientShares {
        /// Sender's balance.
        have: u128,
        /// Amount requested.
        need: u128,
    },

    /// Caller holds no shares in the collection.
    #[error("caller holds no shares in collection {0}")]
    NotHolder(CollectionId),

    /// Unlock attempted below quorum.
    #[error("quorum not met: {approving} of {total} shares approving, {required_bps}bps required")]
    QuorumNotMet {
        /// Shares held by approving holders.
        approving: u128,
        /// Total shares outstanding.
        total: u128,
        /// Required threshold.
        required_bps: u16,
    },

    /// Quorum threshold above 100%.
    #[error(transparent)]
    InvalidThreshold(#[from] InvalidBasisPoints),

    /// The registry rejected a custody movement.
    #[error(transparent)]
    Registry(#[from] RegistryError),
}

impl FractionalError {
    /// Taxonomy class for this error.
    pub fn class(&self) -> ErrorClass {
        match self {
            FractionalError::NotRecordOwner(_) | FractionalError::NotHolder(_) => {
                ErrorClass::Authorization
            }
            FractionalError::CollectionNotFound(_)
            | FractionalError::CollectionRetired(_)
            | FractionalError::AlreadyFractionalized(_)
            | FractionalError::QuorumNotMet { .. } => ErrorClass::State,
            FractionalError::ZeroShares
            | FractionalError::TooManyShares(_)
            | FractionalError::InvalidThreshold(_) => ErrorClass::Input,
            FractionalError::InsufficientShares { .. } => ErrorClass::Funds,
            FractionalError::Registry(err) => err.class(),
        }
    }
}
