// Library crate: public API items may not be used by the binary
#![allow(unused)]

//! # pothole-tui
//!
//! A terminal dashboard for pothole impact telemetry.
//!
//! The dashboard polls a ThingSpeak channel through a
//! [`pothole_pipeline::Scheduler`] and renders each published snapshot
//! as KPI cards, a map of impact positions, severity and timeline charts,
//! and a full event log.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                         Application                          │
//! │  ┌──────────┐    ┌───────────┐    ┌─────────┐    ┌─────────┐ │
//! │  │ settings │───▶│ scheduler │───▶│   app   │───▶│   ui    │ │
//! │  │ (config) │    │ (polling) │    │ (state) │    │(ratatui)│ │
//! │  └──────────┘    └─────┬─────┘    └─────────┘    └─────────┘ │
//! │                        │                                     │
//! │                        ▼                                     │
//! │                 ThingSpeakClient                             │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! - **[`settings`]**: layered configuration (defaults, TOML file, environment, CLI)
//! - **[`app`]**: application state, view navigation and user interaction logic
//! - **[`ui`]**: terminal rendering of the dashboard, map, charts and logs views
//! - **[`events`]**: keyboard and mouse input handling
//! - **[`export`]**: writing a snapshot to JSON
//!
//! ## Usage
//!
//! ```bash
//! # Interactive dashboard for the default channel
//! pothole-watch
//!
//! # Poll a private channel every 30 seconds
//! POTHOLE__FEED__READ_KEY=... pothole-watch --channel 123456 --interval 30s
//!
//! # One fetch, written to a file
//! pothole-watch --export snapshot.json
//! ```

pub mod app;
pub mod duration;
pub mod events;
pub mod export;
pub mod settings;
pub mod ui;

// Re-export main types for convenience
pub use app::{App, View};
pub use settings::{Overrides, Settings};
pub use ui::Theme;
