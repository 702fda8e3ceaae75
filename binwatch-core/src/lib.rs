//! Core types and the polling synchronizer for the binwatch container monitor.

/// Derivation of fill tiers and schedule recommendations from a snapshot.
pub mod classify;
/// Wall-clock abstraction.
pub mod clock;
/// Snapshot, status, and raw document models.
pub mod model;
/// Traits describing the remote store.
pub mod ports;
/// Synchronizer owning the snapshot and the poll timer.
pub mod sync;

pub use classify::*;
pub use clock::*;
pub use model::*;
pub use ports::*;
pub use sync::*;
