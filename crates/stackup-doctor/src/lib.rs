//! Failure diagnostics for stackup
//!
//! When a phase exits non-zero the CLI captures a fixed battery of
//! read-only inspections of the half-provisioned machine: cluster nodes,
//! certificate machinery, GPU and VPN state. Every inspection is
//! best-effort; one that cannot run degrades to a placeholder and the
//! rest of the battery still runs.

pub mod battery;
pub mod collector;
pub mod inspection;

pub use battery::standard_battery;
pub use collector::{DEFAULT_INSPECTION_TIMEOUT, DiagnosticSnapshot, DiagnosticsCollector};
pub use inspection::{Inspection, InspectionOutcome, InspectionResult, InspectionSource};
