//! What the operator sees after a successful run
//!
//! - `address`: the machine's externally reachable IPv4 address, from an
//!   ordered fallback chain that never fails
//! - `features`: best-effort probes for optional platform components
//! - `report`: service URLs, credentials and next steps

pub mod address;
pub mod features;
pub mod report;

pub use address::{
    AddressDetector, AddressError, AddressSource, DetectedAddress, HttpEchoSource,
    LocalInterfaceSource,
};
pub use features::{FeatureProbe, Features};
pub use report::SummaryReport;
