//! Rarity-weighted collectible spawning
//!
//! Each variant gets weight `1 + 0.5 * payout + 0.1 * level_id`, so richer
//! minerals and later levels lean toward rare picks. Selection is plain
//! cumulative-distribution sampling over the normalized weights.

use glam::Vec2;
use rand::Rng;

use super::entity::Entity;
use crate::consts::*;
use crate::level::{CollectibleTemplate, LevelConfig};
use crate::progress_factor;

/// Picks and places new collectibles for one level
#[derive(Debug, Clone)]
pub struct EntitySpawner {
    pool: Vec<CollectibleTemplate>,
    /// Normalized weights (sum to 1); empty when nothing can spawn
    probabilities: Vec<f64>,
    min_speed: f32,
    max_speed: f32,
    duration_secs: u32,
    entity_size: f32,
}

/// Unnormalized selection weight of a variant
#[inline]
pub fn variant_weight(payout: f64, level_id: u32) -> f64 {
    BASE_WEIGHT + PAYOUT_WEIGHT * payout + LEVEL_WEIGHT * level_id as f64
}

impl EntitySpawner {
    pub fn new(level: &LevelConfig, entity_size: f32) -> Self {
        let weights: Vec<f64> = level
            .pool
            .iter()
            .map(|m| variant_weight(m.payout, level.id))
            .collect();
        let total: f64 = weights.iter().sum();

        let probabilities = if total.is_finite() && total > 0.0 {
            weights.iter().map(|w| w / total).collect()
        } else {
            Vec::new()
        };

        Self {
            pool: level.pool.clone(),
            probabilities,
            min_speed: level.min_speed,
            max_speed: level.max_speed,
            duration_secs: level.duration_secs,
            entity_size,
        }
    }

    pub fn pool(&self) -> &[CollectibleTemplate] {
        &self.pool
    }

    /// Normalized weight per pool entry
    pub fn probabilities(&self) -> &[f64] {
        &self.probabilities
    }

    /// Index of the first variant whose cumulative weight reaches `draw`
    ///
    /// If rounding leaves the final cumulative weight below `draw`, the last
    /// variant is picked.
    pub fn pick_index(&self, draw: f64) -> Option<usize> {
        if self.probabilities.is_empty() {
            return None;
        }
        let mut cumulative = 0.0;
        for (i, p) in self.probabilities.iter().enumerate() {
            cumulative += p;
            if draw <= cumulative {
                return Some(i);
            }
        }
        // Rounding left the last cumulative value just under the draw
        Some(self.probabilities.len() - 1)
    }

    /// Draw a variant; None if the pool cannot spawn
    pub fn select<R: Rng>(&self, rng: &mut R) -> Option<&CollectibleTemplate> {
        let draw: f64 = rng.random();
        self.pick_index(draw).map(|i| &self.pool[i])
    }

    /// Speed bounds ramped by session progress and scaled to the field
    pub fn speed_bounds(&self, time_remaining: i32, height_scale: f32) -> (f32, f32) {
        let progress = progress_factor(time_remaining, self.duration_secs);
        let min = self.min_speed * (1.0 + progress * MIN_SPEED_RAMP);
        let max = self.max_speed * (1.0 + progress * MAX_SPEED_RAMP);
        let (min, max) = if max < min { (max, min) } else { (min, max) };
        (min * height_scale, max * height_scale)
    }

    /// Create the next entity just above the field
    pub fn spawn<R: Rng>(
        &self,
        rng: &mut R,
        id: u32,
        field: Vec2,
        time_remaining: i32,
        height_scale: f32,
    ) -> Option<Entity> {
        let template = self.select(rng)?;

        let span_x = (field.x - self.entity_size).max(0.0);
        let x = rng.random::<f32>() * span_x;

        let (min, max) = self.speed_bounds(time_remaining, height_scale);
        let speed = min + rng.random::<f32>() * (max - min);

        Some(Entity::new(
            id,
            template,
            Vec2::new(x, -self.entity_size),
            speed,
            self.entity_size,
        ))
    }
}
