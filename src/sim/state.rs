//! Session state
//!
//! Everything the event sources (frame, spawn, countdown, boost expiry)
//! mutate lives in one [`GameSession`]. Each handler finishes its mutation
//! before the next event is dispatched.

use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::entity::Entity;
use super::scoring::Tally;

/// Session lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Lifecycle {
    /// Created, waiting for `start_game`
    #[default]
    Idle,
    /// Timers armed, frames advancing
    Running,
    /// Terminal
    Over,
}

/// Counters for the session report
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionStats {
    pub spawned: u32,
    pub collected: u32,
    /// Fell past the bottom without being collected
    pub missed: u32,
    /// Ticks skipped because the pool could not spawn
    pub skipped_spawns: u32,
}

/// RNG state wrapper for serialization
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RngState {
    pub seed: u64,
}

impl RngState {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    pub fn to_rng(&self) -> Pcg32 {
        Pcg32::seed_from_u64(self.seed)
    }
}

/// Mutable state of one play-through
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameSession {
    /// Active collectibles in spawn order (newest last)
    pub active: Vec<Entity>,
    /// Sum of all awarded points
    pub score: f64,
    /// Countdown (seconds)
    pub time_remaining: i32,
    pub tally: Tally,
    /// Global multiplier (DoublePoints)
    pub score_multiplier: f64,
    pub lifecycle: Lifecycle,
    /// Host timestamp of `start_game` (ms)
    pub started_at_ms: Option<u64>,
    pub stats: SessionStats,
    next_id: u32,
}

impl GameSession {
    pub fn new(duration_secs: u32) -> Self {
        Self {
            active: Vec::new(),
            score: 0.0,
            time_remaining: duration_secs.min(i32::MAX as u32) as i32,
            tally: Tally::default(),
            score_multiplier: 1.0,
            lifecycle: Lifecycle::Idle,
            started_at_ms: None,
            stats: SessionStats::default(),
            next_id: 1,
        }
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    #[inline]
    pub fn is_running(&self) -> bool {
        self.lifecycle == Lifecycle::Running
    }

    /// Newest active entity containing the point
    pub fn topmost_at(&self, point: glam::Vec2) -> Option<usize> {
        self.active.iter().rposition(|e| e.contains_point(point))
    }
}
