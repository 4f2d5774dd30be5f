//! Engine tuning
//!
//! Loaded from a JSON file next to the host, falling back to defaults.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::{EngineError, EngineResult};

/// Engine settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// RNG seed (same seed, same inputs => same session)
    pub seed: u64,

    // === Field ===
    /// Field height the level speeds are tuned for
    pub reference_height: f32,
    /// Collectible bounding box edge
    pub entity_size: f32,

    // === Timers ===
    pub countdown_period_ms: u64,
    pub speed_up_window_ms: u64,
    pub double_points_window_ms: u64,
    pub double_points_multiplier: f64,

    // === Inventory ===
    /// Cooldown between two uses of the same boost
    pub boost_cooldown_ms: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            seed: 0x5eed,

            reference_height: REFERENCE_HEIGHT,
            entity_size: ENTITY_SIZE,

            countdown_period_ms: COUNTDOWN_PERIOD_MS,
            speed_up_window_ms: SPEED_UP_WINDOW_MS,
            double_points_window_ms: DOUBLE_POINTS_WINDOW_MS,
            double_points_multiplier: DOUBLE_POINTS_MULTIPLIER,

            boost_cooldown_ms: BOOST_COOLDOWN_MS,
        }
    }
}

impl Settings {
    /// Settings with a specific seed
    pub fn with_seed(seed: u64) -> Self {
        Self {
            seed,
            ..Self::default()
        }
    }

    /// Parse and validate settings from JSON
    pub fn from_json(json: &str) -> EngineResult<Self> {
        let settings: Settings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from a file
    pub fn load(path: impl AsRef<Path>) -> EngineResult<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Load settings from a file, or defaults if missing/invalid
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match Self::load(path) {
            Ok(settings) => {
                log::info!("Loaded settings from {}", path.display());
                settings
            }
            Err(e) => {
                log::info!("Using default settings ({})", e);
                Self::default()
            }
        }
    }

    /// Reject values the engine cannot run with
    pub fn validate(&self) -> EngineResult<()> {
        if !(self.reference_height.is_finite() && self.reference_height > 0.0) {
            return Err(EngineError::InvalidSettings(format!(
                "reference_height must be positive, got {}",
                self.reference_height
            )));
        }
        if !(self.entity_size.is_finite() && self.entity_size > 0.0) {
            return Err(EngineError::InvalidSettings(format!(
                "entity_size must be positive, got {}",
                self.entity_size
            )));
        }
        if self.countdown_period_ms == 0 {
            return Err(EngineError::InvalidSettings(
                "countdown_period_ms must be non-zero".into(),
            ));
        }
        if !(self.double_points_multiplier.is_finite() && self.double_points_multiplier >= 1.0) {
            return Err(EngineError::InvalidSettings(format!(
                "double_points_multiplier must be >= 1, got {}",
                self.double_points_multiplier
            )));
        }
        Ok(())
    }

    /// Fall speed scale for the given field height
    pub fn height_scale(&self, field_height: f32) -> f32 {
        field_height / self.reference_height
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_keeps_defaults() {
        let settings = Settings::from_json(r#"{ "seed": 7, "entity_size": 64.0 }"#).unwrap();
        assert_eq!(settings.seed, 7);
        assert_eq!(settings.entity_size, 64.0);
        assert_eq!(settings.speed_up_window_ms, SPEED_UP_WINDOW_MS);
    }

    #[test]
    fn test_rejects_zero_reference_height() {
        let err = Settings::from_json(r#"{ "reference_height": 0.0 }"#).unwrap_err();
        assert!(matches!(err, EngineError::InvalidSettings(_)));
    }

    #[test]
    fn test_missing_file_falls_back() {
        let settings = Settings::load_or_default("/nonexistent/mineral-rush.json");
        assert_eq!(settings.reference_height, REFERENCE_HEIGHT);
    }

    #[test]
    fn test_height_scale() {
        let settings = Settings::default();
        assert!((settings.height_scale(REFERENCE_HEIGHT * 2.0) - 2.0).abs() < 1e-6);
    }
}
