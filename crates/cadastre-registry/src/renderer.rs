//! Pluggable metadata rendering

use crate::record::DeedRecord;
use std::fmt;

/// Error from a rendering delegate. The registry treats any renderer
/// failure as "fall back to the standard URI scheme".
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("render failed: {0}")]
pub struct RenderError(pub String);

/// Delegate that turns a record into a display URI.
pub trait RecordRenderer: fmt::Debug {
    /// Produce the display URI for a record.
    fn record_uri(&self, record: &DeedRecord) -> Result<String, RenderError>;
}
