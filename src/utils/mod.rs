//! # Utilities Module
//!
//! Connectivity analysis over cell sets and small numeric helpers shared by
//! the generators.

pub mod connectivity;
pub mod math;

pub use connectivity::*;
pub use math::*;

use crate::game::Cell;
use std::collections::BTreeSet;

/// Ordered set of cells.
///
/// Ordered rather than hashed so that every iteration feeding a random draw
/// happens in the same order on every run.
pub type CellSet = BTreeSet<Cell>;
