//! Test fixtures for the Cadastre workspace
//!
//! Deterministic identities, an in-memory token bank implementing the
//! [`TokenBank`] seam, and static implementations of the cross-component
//! views so each component can be exercised in isolation.

pub mod bank;
pub mod ids;
pub mod views;

pub use bank::MemoryBank;
pub use views::{StaticCommission, StaticPolicy, StaticRoyalty};

use once_cell::sync::OnceCell;

static TRACING: OnceCell<()> = OnceCell::new();

/// Install a test tracing subscriber once per process. Safe to call from
/// every test.
pub fn init_tracing() {
    TRACING.get_or_init(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
            )
            .with_test_writer()
            .try_init();
    });
}
