//! Settlement Ledger
//!
//! The central escrow. Collects mint-time fees in whitelisted payment
//! tokens, splits each fee between the protocol's service-fee pool and
//! the minting validator's commission balance, and pays both out
//! pull-style, each withdrawal draining its balance to exactly zero.
//!
//! Arithmetic is integer-only: `commission = floor(fee × bps / 10_000)`,
//! and the truncation remainder accrues to the service-fee pool, so the
//! two credits always sum exactly to the collected fee. The ledger's
//! bookkeeping invariant is that, per token, the tracked balances never
//! exceed what the escrow account actually holds in the bank.

mod error;
mod ledger;

pub use error::SettlementError;
pub use ledger::{CommissionSchedule, FeeSchedule, SettlementEvent, SettlementLedger};
