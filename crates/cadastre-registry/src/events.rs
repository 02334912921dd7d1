//! Registry events for external indexing

use cadastre_core::{AccountId, AssetType, RecordId, UnitId};
use serde::{Deserialize, Serialize};

/// Events emitted by the Asset Registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RegistryEvent {
    /// A record was created.
    Minted {
        /// New record.
        record: RecordId,
        /// Asset type fixed at creation.
        asset_type: AssetType,
        /// Originating minter identity.
        minter: AccountId,
        /// Assigned validator unit.
        validator: UnitId,
        /// Caller-supplied correlation salt.
        salt: u64,
    },

    /// A record was destroyed and its traits purged.
    Burned {
        /// Destroyed record.
        record: RecordId,
        /// Owner at the time of the burn.
        owner: AccountId,
    },

    /// The validation flag changed.
    ValidationChanged {
        /// Target record.
        record: RecordId,
        /// New flag value.
        valid: bool,
        /// Identity that performed the assertion or the edit that cleared
        /// the flag.
        asserter: AccountId,
    },

    /// Possession moved.
    Transferred {
        /// Target record.
        record: RecordId,
        /// Previous owner.
        from: AccountId,
        /// New owner.
        to: AccountId,
    },

    /// The contract-level descriptive URI changed.
    ContractUriUpdated,

    /// The default validator designation changed.
    DefaultValidatorUpdated {
        /// New default, if any.
        validator: Option<UnitId>,
    },

    /// A marketplace identity was allowed or disallowed.
    MarketplaceAllowed {
        /// Marketplace identity.
        account: AccountId,
        /// Whether it is now allowed.
        allowed: bool,
    },

    /// Royalty enforcement was toggled.
    RoyaltyEnforcementChanged {
        /// Whether enforcement is now on.
        enabled: bool,
    },
}
