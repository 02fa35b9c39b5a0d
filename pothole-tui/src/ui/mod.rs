//! Terminal rendering with ratatui.

pub mod charts;
pub mod common;
pub mod dashboard;
pub mod detail;
pub mod logs;
pub mod map;
pub mod theme;

pub use theme::Theme;
