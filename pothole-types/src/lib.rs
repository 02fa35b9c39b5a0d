//! # pothole-types
//!
//! Core types for pothole impact telemetry. This crate defines the typed
//! event model and the derived dashboard snapshot that the pipeline publishes
//! and every view consumes.
//!
//! ## Design Goals
//!
//! - **One model for every view**: the map, charts, live log and KPI cards all
//!   read from the same [`Snapshot`]
//! - **Optional serialization**: enable the `serde` feature to export snapshots
//! - **Versioned schema**: snapshots include version info for forward compatibility
//!
//! ## Features
//!
//! - `serde`: JSON/etc. serialization via serde
//!
//! ## Example
//!
//! ```rust
//! use pothole_types::Severity;
//!
//! assert_eq!(Severity::classify(4.0), Severity::Severe);
//! assert_eq!(Severity::classify(3.5), Severity::High);
//! assert_eq!(Severity::classify(2.8), Severity::Medium);
//! ```
//!
//! ## Schema Version
//!
//! The current schema version is **1**. The version is included in exported
//! snapshots to allow consumers to handle format evolution gracefully.

mod event;
mod snapshot;
mod version;

pub use event::*;
pub use snapshot::*;
pub use version::*;

/// Current schema version.
///
/// Increment this when making breaking changes to the snapshot format.
pub const SCHEMA_VERSION: u32 = 1;
