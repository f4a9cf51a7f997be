//! # Configuration
//!
//! UI tuning knobs shared by the web client and native tooling.

pub mod ui;

pub use ui::{ConfigError, UiConfig};
