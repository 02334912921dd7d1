//! Identifier types used across the Cadastre workspace
//!
//! Uuid-backed newtypes for the externally assigned identities (accounts,
//! validator units, payment tokens, companion registries) and `u64`
//! newtypes for the internally issued, monotonically increasing record and
//! collection numbers. Issued numbers are never reused, even after a
//! record is burned or a collection retired.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

macro_rules! uuid_id {
    ($(#[$doc:meta])* $name:ident, $prefix:literal) => {
        $(#[$doc])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
        )]
        pub struct $name(pub Uuid);

        impl $name {
            /// Create a new random identifier.
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Create from an existing UUID.
            pub fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// The nil identity. Rejected wherever a real beneficiary is required.
            pub fn nil() -> Self {
                Self(Uuid::nil())
            }

            /// Whether this is the nil identity.
            pub fn is_nil(&self) -> bool {
                self.0.is_nil()
            }

            /// Get the inner UUID.
            pub fn uuid(&self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($prefix, "-{}"), self.0)
            }
        }

        impl From<Uuid> for $name {
            fn from(uuid: Uuid) -> Self {
                Self(uuid)
            }
        }

        impl From<$name> for Uuid {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

uuid_id!(
    /// Identity of a caller or beneficiary (owner, operator, receiver).
    AccountId,
    "acct"
);

uuid_id!(
    /// Identity of one Validator Unit instance.
    UnitId,
    "unit"
);

uuid_id!(
    /// Identity of a payment token ledger accepted for fees.
    TokenId,
    "token"
);

uuid_id!(
    /// Identity of a companion registry recognized for cross-registry
    /// validator assignment.
    RegistryId,
    "registry"
);

macro_rules! counter_id {
    ($(#[$doc:meta])* $name:ident, $prefix:literal) => {
        $(#[$doc])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
        )]
        pub struct $name(pub u64);

        impl $name {
            /// Create from a raw counter value.
            pub fn from_raw(raw: u64) -> Self {
                Self(raw)
            }

            /// The raw counter value.
            pub fn raw(&self) -> u64 {
                self.0
            }

            /// The identifier following this one.
            pub fn next(&self) -> Self {
                Self(self.0 + 1)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($prefix, "-{}"), self.0)
            }
        }

        impl From<u64> for $name {
            fn from(raw: u64) -> Self {
                Self(raw)
            }
        }
    };
}

counter_id!(
    /// Identity of one deed record. Assigned by the Asset Registry from a
    /// monotonic counter.
    RecordId,
    "record"
);

counter_id!(
    /// Identity of one fraction collection. Assigned by the Fractional
    /// Ownership Unit from a monotonic counter.
    CollectionId,
    "collection"
);
