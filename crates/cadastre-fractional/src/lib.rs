//! Fractional Ownership Unit
//!
//! Converts one deed record into a fixed number of divisible shares,
//! tracks per-holder balances and unlock votes, and reassembles the
//! record to sole ownership once holders controlling the quorum fraction
//! of shares have approved.
//!
//! Votes are not a property of shares: transferring shares never carries
//! a vote with them. Quorum is evaluated fresh over the current holder
//! balances each time, so a seller's standing vote is weighted by what
//! they still hold and a buyer starts unapproved.

mod error;
mod vault;

pub use error::FractionalError;
pub use vault::{FractionCollection, FractionalEvent, FractionalVault};
