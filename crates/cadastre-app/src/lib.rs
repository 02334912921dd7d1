//! Protocol facade
//!
//! Wires one Validator Directory, one Asset Registry, the validator-unit
//! map, one Settlement Ledger, and one Fractional Ownership Unit into a
//! single deployment object, so hosts and integration tests drive the
//! end-to-end flows without hand-wiring the cross-component views.

mod config;
mod protocol;

pub use config::{ConfigError, ProtocolConfig, TokenFeeConfig};
pub use protocol::{Protocol, ProtocolError, UnitMap};
