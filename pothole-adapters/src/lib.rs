//! # pothole-adapters
//!
//! Feed clients for pulling raw pothole impact records from telemetry channels.
//!
//! Every client implements [`FeedSource`]: one call, one outbound read, the
//! upstream records returned in upstream order with no transformation. Retry
//! and scheduling policy belong to the caller.
//!
//! ## Supported Feeds
//!
//! - **ThingSpeak** (`thingspeak` feature, on by default) - reads the most
//!   recent entries of a channel via the channel feeds HTTP API
//!
//! ## Quick Start (ThingSpeak)
//!
//! ```rust,no_run
//! use pothole_adapters::{thingspeak::ThingSpeakClient, FeedSource};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = ThingSpeakClient::builder("3153910")
//!         .read_key(std::env::var("POTHOLE_READ_KEY")?)
//!         .results(500)
//!         .build()?;
//!
//!     let records = client.fetch().await?;
//!     println!("Fetched {} records", records.len());
//!     Ok(())
//! }
//! ```

use std::fmt::Debug;

use async_trait::async_trait;

pub mod error;
mod record;

#[cfg(feature = "thingspeak")]
pub mod thingspeak;

pub use error::FetchError;
pub use record::{ChannelInfo, FeedEnvelope, FieldValue, RawRecord};

/// A telemetry feed that can be read on demand.
///
/// Implementations perform exactly one outbound read per call and never
/// retry internally.
#[async_trait]
pub trait FeedSource: Send + Sync + Debug {
    /// Read the most recent records.
    async fn fetch(&self) -> Result<Vec<RawRecord>, FetchError>;

    /// Returns a human-readable description of the feed.
    ///
    /// Used for display in the status bar and in logs. Must not contain
    /// credentials.
    fn description(&self) -> &str;
}
