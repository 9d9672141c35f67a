//! # Domain Models
//!
//! Pure types shared by every crate: configuration, well-known names and the feature
//! slice registry. Only `serde` is allowed here; no I/O, networking or heavy logic.

pub mod config;
pub mod constants;
pub mod registry;
