//! Asset Registry
//!
//! The canonical deed ledger. Owns the set of deed records, their dynamic
//! trait storage, the validation flag and its state machine, ownership and
//! approvals, and the marketplace allow-list that makes royalty payment
//! unavoidable when enforcement is on.
//!
//! The registry trusts its collaborators only through narrow views: the
//! Validator Directory answers "is this unit active and does it support
//! this asset type", the validator units answer "does this identity hold
//! the unit's validator role" and "are the unit's criteria vacuously
//! satisfied". Every mutating operation validates fully before writing,
//! so a failed call leaves the ledger untouched.
//!
//! Validation state machine: `Unvalidated → Validated` only via an
//! assertion from the record's assigned validator unit; `Validated →
//! Unvalidated` via an explicit negative assertion or via any metadata
//! write performed by someone other than that unit. No other transitions
//! exist.

mod error;
mod events;
mod record;
mod registry;
mod renderer;

pub use error::RegistryError;
pub use events::RegistryEvent;
pub use record::{DeedRecord, MintRequest};
pub use registry::{AssetRegistry, RegistryRole};
pub use renderer::{RecordRenderer, RenderError};
