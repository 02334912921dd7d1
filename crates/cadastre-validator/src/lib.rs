//! Validator Unit
//!
//! One instance per validator organization. Holds that organization's
//! per-asset-type acceptance criteria, its fee schedule per accepted
//! payment token, its royalty configuration, and its operating-agreement
//! registry. `validate_deed` is the unit's core operation: a pure
//! read-then-write evaluation of a record's stored traits against the
//! criteria for its asset type, written back through the Asset Registry's
//! validation path.
//!
//! The unit also tracks token balances it has accrued (royalties and
//! service fees) and pays them out pull-style, splitting a commission cut
//! to the protocol fee receiver when a settlement ledger is attached.

mod criteria;
mod error;
mod unit;

pub use criteria::ValidationCriteria;
pub use error::UnitError;
pub use unit::{UnitEvent, UnitRole, ValidatorUnit};
