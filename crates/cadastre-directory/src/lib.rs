//! Validator Directory
//!
//! The registry of known validator units: who operates each unit, which
//! asset types it accepts, and whether it may be assigned to new records.
//! The directory holds no funds and performs no validation itself; it is
//! the source of truth the Asset Registry and Settlement Ledger consult
//! through [`DirectoryView`].
//!
//! Entries are created once (duplicate registration is rejected outright)
//! and normally live forever: deactivation preserves attribution for
//! records minted while the unit was active. Hard deletion exists for the
//! administrator but is gated on the unit never being assigned to a live
//! record.

mod directory;
mod error;

pub use directory::{DirectoryEntry, DirectoryEvent, ValidatorDirectory};
pub use error::DirectoryError;
