//! Falling collectible entity

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::level::{CollectibleTemplate, sanitize_payout};

/// A falling collectible
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entity {
    pub id: u32,
    /// Variant visual (tally key)
    pub visual_id: String,
    /// Top-left corner in field coordinates
    pub pos: Vec2,
    /// Downward speed (pixels/s)
    pub velocity: f32,
    /// Bounding box edge
    pub size: f32,
    /// Base point value
    pub payout: f64,
    /// Set once, in the step the entity is collected
    pub collected: bool,
}

impl Entity {
    pub fn new(id: u32, template: &CollectibleTemplate, pos: Vec2, velocity: f32, size: f32) -> Self {
        Self {
            id,
            visual_id: template.visual_id.clone(),
            pos,
            velocity: velocity.max(0.0),
            size,
            payout: sanitize_payout(template.payout),
            collected: false,
        }
    }

    /// Fall by velocity * dt
    #[inline]
    pub fn update(&mut self, dt: f32) {
        self.pos.y += self.velocity * dt;
    }

    /// Check if a field-space point is inside the bounding box
    pub fn contains_point(&self, point: Vec2) -> bool {
        point.x >= self.pos.x
            && point.x <= self.pos.x + self.size
            && point.y >= self.pos.y
            && point.y <= self.pos.y + self.size
    }

    /// Past the bottom of the field
    #[inline]
    pub fn is_off_screen(&self, field_height: f32) -> bool {
        self.pos.y > field_height
    }

    /// Flag as collected; returns false if it already was
    pub fn collect(&mut self) -> bool {
        !std::mem::replace(&mut self.collected, true)
    }
}
