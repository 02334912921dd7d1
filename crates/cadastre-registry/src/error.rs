//! Registry error types

use cadastre_core::{AccountId, AssetType, ErrorClass, RecordId, UnitId};

/// Errors from Asset Registry operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    /// Caller does not hold the registry administrator role.
    #[error("caller is not a registry administrator")]
    NotAdmin,

    /// Caller may not mint: neither a minter-role holder nor the attached
    /// settlement ledger.
    #[error("caller {0} is not authorized to mint")]
    NotMinter(AccountId),

    /// Registry is paused; minting and transfers are blocked.
    #[error("registry is paused")]
    Paused,

    /// No such record.
    #[error("record not found: {0}")]
    RecordNotFound(RecordId),

    /// Caller is neither the record owner nor the assigned validator.
    #[error("caller {caller} may not modify record {record}")]
    NotOwnerOrValidator {
        /// Denied caller.
        caller: AccountId,
        /// Target record.
        record: RecordId,
    },

    /// Caller may not move the record.
    #[error("caller {caller} may not transfer record {record}")]
    TransferNotAuthorized {
        /// Denied caller.
        caller: AccountId,
        /// Target record.
        record: RecordId,
    },

    /// `from` does not currently own the record.
    #[error("record {record} is not owned by {from}")]
    WrongOwner {
        /// Claimed owner.
        from: AccountId,
        /// Target record.
        record: RecordId,
    },

    /// Transfers and approvals to the nil identity are rejected.
    #[error("recipient must not be the nil identity")]
    NilRecipient,

    /// No validator supplied and no default validator designated.
    #[error("no validator supplied and no default validator configured")]
    NoValidator,

    /// Validator is not registered in the directory.
    #[error("validator not registered: {0}")]
    ValidatorNotRegistered(UnitId),

    /// Validator is registered but inactive.
    #[error("validator not active: {0}")]
    ValidatorNotActive(UnitId),

    /// Validator does not support the record's asset type.
    #[error("validator {unit} does not support asset type {asset_type}")]
    UnsupportedAssetType {
        /// Assigned unit.
        unit: UnitId,
        /// Offending asset type.
        asset_type: AssetType,
    },

    /// Validation assertion from an identity that is not the assigned
    /// unit's validator.
    #[error("caller {caller} is not the assigned validator for record {record}")]
    NotAssignedValidator {
        /// Denied caller.
        caller: AccountId,
        /// Target record.
        record: RecordId,
    },

    /// Operating agreement must be non-empty.
    #[error("operating agreement must not be empty")]
    EmptyOperatingAgreement,

    /// Royalty enforcement is on and the grantee is not an approved
    /// marketplace.
    #[error("marketplace not approved: {0}")]
    MarketplaceNotApproved(AccountId),

    /// Duplicate application of a marketplace allow-list update.
    #[error("marketplace allowance for {account} is already {allowed}")]
    MarketplaceAlreadySet {
        /// Marketplace identity.
        account: AccountId,
        /// The allowance state that was redundantly re-applied.
        allowed: bool,
    },

    /// Removal of a trait the record does not carry.
    #[error("record {record} has no trait named {name:?}")]
    TraitNotFound {
        /// Target record.
        record: RecordId,
        /// Requested trait name.
        name: String,
    },
}

impl RegistryError {
    /// Taxonomy class for this error.
    pub fn class(&self) -> ErrorClass {
        match self {
            RegistryError::NotAdmin
            | RegistryError::NotMinter(_)
            | RegistryError::NotOwnerOrValidator { .. }
            | RegistryError::TransferNotAuthorized { .. }
            | RegistryError::NotAssignedValidator { .. } => ErrorClass::Authorization,
            RegistryError::Paused
            | RegistryError::RecordNotFound(_)
            | RegistryError::WrongOwner { .. }
            | RegistryError::NoValidator
            | RegistryError::ValidatorNotRegistered(_)
            | RegistryError::ValidatorNotActive(_)
            | RegistryError::UnsupportedAssetType { .. }
            | RegistryError::MarketplaceNotApproved(_)
            | RegistryError::MarketplaceAlreadySet { .. }
            | RegistryError::TraitNotFound { .. } => ErrorClass::State,
            RegistryError::NilRecipient | RegistryError::EmptyOperatingAgreement => {
                ErrorClass::Input
            }
        }
    }
}
