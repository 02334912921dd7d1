//! Core primitives shared across the Cadastre components
//!
//! This crate carries the vocabulary the rest of the workspace is written
//! in: identifier newtypes, the closed asset-type enumeration, the dynamic
//! trait-storage primitives, basis-point arithmetic, per-component role
//! tables, the token-bank seam to external fungible ledgers, and the
//! narrow read-only view traits each component exposes to its neighbors.
//!
//! Nothing in here holds component state. Each component crate owns its
//! own ledger and consults the others exclusively through the traits in
//! [`views`], so its invariants can be checked without reading any other
//! component's implementation.

pub mod asset;
pub mod bps;
pub mod error;
pub mod identifiers;
pub mod roles;
pub mod token;
pub mod traits;
pub mod views;

pub use asset::AssetType;
pub use bps::{BasisPoints, InvalidBasisPoints, BPS_DENOMINATOR, MAX_ROYALTY_BPS};
pub use error::ErrorClass;
pub use identifiers::{AccountId, CollectionId, RecordId, RegistryId, TokenId, UnitId};
pub use roles::RoleTable;
pub use token::{TokenBank, TokenError};
pub use traits::{reserved, TraitKey, TraitKind, TraitValue};
pub use views::{
    AssignmentView, CommissionView, DirectoryView, RoyaltyView, ValidationPolicyView,
};
