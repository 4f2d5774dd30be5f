//! Session simulation module
//!
//! All gameplay logic lives here. This module must stay deterministic:
//! - Host-supplied clock only (milliseconds)
//! - Seeded RNG only
//! - Timers fire in (due time, creation order)
//! - No platform dependencies beyond the `Surface` trait

pub mod boost;
pub mod engine;
pub mod entity;
pub mod scoring;
pub mod spawner;
pub mod state;
pub mod timer;

pub use boost::{BoostKind, BoostOutcome, BoostSystem};
pub use engine::{FrameOutcome, GameEngine, PointerInput, SessionCallbacks};
pub use entity::Entity;
pub use scoring::{Collection, ScoringEngine, Tally, TallyEntry};
pub use spawner::{EntitySpawner, variant_weight};
pub use state::{GameSession, Lifecycle, RngState, SessionStats};
pub use timer::{Fired, Scheduler, TimerId, TimerKind};
