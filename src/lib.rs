//! Mineral Rush - A falling-mineral collection arcade game
//!
//! Core modules:
//! - `sim`: Session simulation (entities, spawning, scoring, boosts, timers)
//! - `renderer`: Drawing surface abstraction
//! - `level`: Level configuration and collectible normalization
//! - `settings`: Engine tuning loaded from JSON
//! - `assets`: Visual preload tracking
//! - `inventory`: Player boost stock and cooldowns
//! - `report`: End-of-session hand-off

pub mod assets;
pub mod error;
pub mod inventory;
pub mod level;
pub mod renderer;
pub mod report;
pub mod settings;
pub mod sim;

pub use error::{EngineError, EngineResult};
pub use level::{CollectibleTemplate, LevelCatalog, LevelConfig};
pub use settings::Settings;

/// Game configuration constants
pub mod consts {
    /// Default spawn interval when no level is supplied (ms)
    pub const DEFAULT_SPAWN_INTERVAL_MS: u64 = 500;
    /// Default session length (seconds)
    pub const DEFAULT_DURATION_SECS: u32 = 30;
    /// Default fall speed bounds (pixels/s at reference height)
    pub const DEFAULT_MIN_SPEED: f32 = 100.0;
    pub const DEFAULT_MAX_SPEED: f32 = 300.0;

    /// Field height the speed bounds are tuned for
    pub const REFERENCE_HEIGHT: f32 = 800.0;
    /// Collectible bounding box edge (pixels)
    pub const ENTITY_SIZE: f32 = 50.0;

    /// Countdown tick period (ms)
    pub const COUNTDOWN_PERIOD_MS: u64 = 1000;
    /// SpeedUp window (ms)
    pub const SPEED_UP_WINDOW_MS: u64 = 5000;
    /// DoublePoints window (ms)
    pub const DOUBLE_POINTS_WINDOW_MS: u64 = 3000;
    /// Score multiplier while DoublePoints is active
    pub const DOUBLE_POINTS_MULTIPLIER: f64 = 2.0;

    /// Per-boost cooldown enforced by the inventory (ms)
    pub const BOOST_COOLDOWN_MS: u64 = 5000;

    /// Weight formula coefficients
    pub const BASE_WEIGHT: f64 = 1.0;
    pub const PAYOUT_WEIGHT: f64 = 0.5;
    pub const LEVEL_WEIGHT: f64 = 0.1;

    /// Multiplier bonus per level id
    pub const LEVEL_BONUS: f64 = 0.1;
    /// Multiplier bonus per collected sibling
    pub const COMBO_BONUS: f64 = 0.1;

    /// Speed ramp applied over a session
    pub const MIN_SPEED_RAMP: f32 = 0.5;
    pub const MAX_SPEED_RAMP: f32 = 0.3;
}

/// Level multiplier applied to every collection (`1 + 0.1 * id`)
#[inline]
pub fn level_multiplier(level_id: u32) -> f64 {
    1.0 + level_id as f64 * consts::LEVEL_BONUS
}

/// Session progress in [0, 1] from the remaining countdown
#[inline]
pub fn progress_factor(time_remaining: i32, duration_secs: u32) -> f32 {
    if duration_secs == 0 {
        return 0.0;
    }
    (1.0 - time_remaining as f32 / duration_secs as f32).clamp(0.0, 1.0)
}
