//! Directory error types

use cadastre_core::{ErrorClass, UnitId};

/// Errors from Validator Directory operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DirectoryError {
    /// Caller does not hold the directory administrator role.
    #[error("caller is not a directory administrator")]
    NotAdmin,

    /// The unit identity is already registered.
    #[error("validator already registered: {0}")]
    AlreadyRegistered(UnitId),

    /// The unit identity is not registered.
    #[error("validator not registered: {0}")]
    NotRegistered(UnitId),

    /// The unit is still assigned to live records and cannot be removed.
    #[error("validator {unit} still assigned to {live} live record(s)")]
    StillAssigned {
        /// Unit that was to be removed.
        unit: UnitId,
        /// Number of live assignments blocking removal.
        live: u64,
    },

    /// The owner identity is nil.
    #[error("validator owner must not be the nil identity")]
    NilOwner,

    /// The supported asset-type set is empty.
    #[error("validator must support at least one asset type")]
    NoAssetTypes,
}

impl DirectoryError {
    /// Taxonomy class for this error.
    pub fn class(&self) -> ErrorClass {
        match self {
            DirectoryError::NotAdmin => ErrorClass::Authorization,
            DirectoryError::AlreadyRegistered(_)
            | DirectoryError::NotRegistered(_)
            | DirectoryError::StillAssigned { .. } => ErrorClass::State,
            DirectoryError::NilOwner | DirectoryError::NoAssetTypes => ErrorClass::Input,
        }
    }
}
