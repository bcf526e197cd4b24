//! Process-wide logging setup.
//!
//! Command traffic is the main signal here: every inbound SMS command is
//! logged at the engine boundary with its kind, actor, and outcome. This
//! crate only wires the subscriber; emission lives with the engine.

pub mod tracing;

/// Initialize logging for the process.
///
/// Safe to call multiple times; subsequent calls are no-ops.
pub fn init() {
    tracing::init();
}
