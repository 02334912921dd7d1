//! Error taxonomy shared by the component error enums
//!
//! Every component error maps to one of four classes. The class is what
//! external callers dispatch on; the enum variant carries the detail.

use serde::{Deserialize, Serialize};

/// Coarse classification of a failed operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorClass {
    /// Caller lacks the required role or ownership.
    Authorization,
    /// Operation is invalid for the current record/collection state.
    State,
    /// Malformed input.
    Input,
    /// Insufficient escrowed or approved balance for a pull payment.
    Funds,
}
