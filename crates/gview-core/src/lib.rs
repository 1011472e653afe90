//! gview-core: configuration, logging, and shared error types for the gview
//! message browser.
//!
//! Nothing in here knows about terminals or messages; the engine crate and the
//! `gview` binary build on top of it.

pub mod config;
pub mod error;
pub mod logging;
