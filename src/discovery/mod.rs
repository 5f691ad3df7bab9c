mod coordinator;
mod family;
mod generation;
mod passive;

pub use coordinator::DiscoveryCoordinator;
pub use family::{FamilyKey, FamilyScan, ScanSettings, Update};
pub use generation::{is_stale, GenerationTracker};
pub use passive::PassiveGate;
