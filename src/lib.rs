//! Coordination core for UDMI device discovery and site validation.
//!
//! Tracks per-family discovery scans through their generation-scoped
//! lifecycle, prunes discovery result trees to a requested depth, and rolls
//! validation results up into device and site scores.

pub mod constants;
pub mod coordinator;
pub mod discovery;
pub mod enumeration;
pub mod error;
pub mod helpers;
pub mod interfaces;
pub mod schema;
pub mod validation;

pub use coordinator::Coordinator;
pub use error::{CoordError, Result};
