//! # Network Module
//!
//! Live state broadcast for remote viewers.

pub mod broadcast;

pub use broadcast::*;
