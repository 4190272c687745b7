//! # SAR Mission
//!
//! A grid-based search-and-rescue game: the player crosses a procedurally walled
//! map, picks up victims of different priority and delivers them to rescue
//! points before the clock runs out.
//!
//! ## Architecture Overview
//!
//! - **Game**: cell model, carry stack, snapshots and the session state machine
//! - **Generation**: wall layout, victim placement and rescue point selection
//! - **Utils**: connectivity analysis (BFS distances, connected components)
//! - **Assistant**: situation summaries and the pluggable advisory assistant
//! - **Net**: snapshot fan-out to remote viewers over TCP
//! - **Rendering / Input / Scenes**: the macroquad front end
//!
//! Level generation is deterministic for a given seed and parameter set, and
//! never fails: constraints that cannot be met are relaxed instead.

pub mod assistant;
pub mod config;
pub mod game;
pub mod generation;
pub mod input;
pub mod net;
pub mod rendering;
pub mod scenes;
pub mod utils;

pub use assistant::{Advisor, ChatTranscript, DisabledAdvisor, HeuristicAdvisor};
pub use config::{Difficulty, DifficultyProfile, GameConfig};
pub use game::{
    CarryStack, Cell, CompletionRule, Direction, GameSession, Grid, HudText, PriorityClass,
    RenderFeed, SessionState, Snapshot, SnapshotKind, TickObserver, ViewMode,
};
pub use generation::{
    Generator, Level, LevelGenerator, LevelParams, PlacementParams, VictimQuotas, WallGenerator,
    WallLayout, WallParams,
};
pub use input::{InputEvent, InputHandler};
pub use net::{BroadcastHandle, BroadcastObserver};
pub use rendering::{Camera, MacroquadDisplay};
pub use utils::{bfs_distances, connected_components, CellSet, DistanceMap};

/// Core error type for the SAR mission crate.
///
/// Generation and per-frame session updates never fail; these variants cover
/// the collaborator and I/O surfaces around them.
#[derive(thiserror::Error, Debug)]
pub enum SarError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// Session or front end is in an unexpected state
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Configuration could not be used at all
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The advisory assistant failed to answer
    #[error("Advisor error: {0}")]
    Advisor(String),

    /// The snapshot broadcast could not be started or used
    #[error("Broadcast error: {0}")]
    Broadcast(String),
}

/// Result type used throughout the crate.
pub type SarResult<T> = Result<T, SarError>;

/// Version information for the game.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
