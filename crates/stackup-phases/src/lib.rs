//! Phase registry and skip resolution
//!
//! The registry is an explicit, versioned list: order is a reviewed
//! decision, never the result of a directory listing. A phase at
//! position `n` may assume every phase before it succeeded or was
//! deliberately skipped.

pub mod registry;
pub mod skip;
mod standard;

pub use registry::{PhaseDescriptor, PhaseRegistry, PhaseSpec};
pub use skip::SkipSet;
pub use stackup_utils::error::RegistryError;
