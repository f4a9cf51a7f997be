#![cfg_attr(not(test), forbid(unsafe_code))]
#![allow(clippy::multiple_crate_versions)]

//! Framework-independent building blocks for the Chatdeck web client.
//!
//! The crate holds everything that does not need a DOM: the [`async_call`]
//! wrapper that tracks loading and error state around caller-supplied
//! operations, the sidebar and composer models, and UI configuration.

pub mod async_call;
pub mod config;
pub mod models;
