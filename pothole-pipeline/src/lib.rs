//! # pothole-pipeline
//!
//! Turns a pothole impact feed into dashboard snapshots.
//!
//! A [`Scheduler`] polls a [`FeedSource`](pothole_adapters::FeedSource) on a
//! fixed interval. Each successful cycle runs the raw records through
//! [`normalize()`] and [`aggregate()`] and publishes one immutable
//! [`Snapshot`](pothole_types::Snapshot) over a `tokio::sync::watch` channel.
//! A failed cycle is logged and leaves the previous snapshot in place.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pothole_adapters::thingspeak::ThingSpeakClient;
//! use pothole_pipeline::Scheduler;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let feed = ThingSpeakClient::builder("3153910").build()?;
//!     let scheduler = Scheduler::builder(feed).build();
//!     let mut snapshots = scheduler.subscribe();
//!
//!     scheduler.start();
//!     while snapshots.changed().await.is_ok() {
//!         let snapshot = snapshots.borrow_and_update().clone();
//!         println!(
//!             "{} events, {} in the last 24h, avg {:.2} G",
//!             snapshot.kpis.total, snapshot.kpis.last_24h, snapshot.kpis.avg_magnitude
//!         );
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Pieces
//!
//! - [`normalize()`]: validation and newest-first ordering, pure
//! - [`aggregate()`]: KPIs, severity buckets and the daily timeline, pure
//! - [`Scheduler`]: timer, overlap protection and publication

mod aggregate;
mod clock;
mod normalize;
mod scheduler;

pub use aggregate::{
    aggregate, build_snapshot, kpis, recent_window, severity_buckets, timeline, Aggregates,
};
pub use clock::{Clock, FixedClock, SystemClock};
pub use normalize::{normalize, parse_timestamp, validate, Rejection};
pub use scheduler::{
    collect, CycleOutcome, Scheduler, SchedulerBuilder, SchedulerState, DEFAULT_INTERVAL,
};
