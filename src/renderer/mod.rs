//! Drawing surface abstraction
//!
//! The engine only needs a clearable 2D surface with device pixel
//! dimensions. Hosts implement [`Surface`] over their graphics API;
//! [`CommandList`] records draws for batching or inspection.

use glam::Vec2;

/// One collectible draw
#[derive(Debug, Clone, PartialEq)]
pub struct DrawEntity {
    pub visual_id: String,
    /// Top-left corner in field coordinates
    pub pos: Vec2,
    pub size: f32,
    /// False when the visual failed to preload (host draws a placeholder)
    pub resolved: bool,
}

/// A clearable 2D surface
pub trait Surface {
    /// Surface size in device pixels
    fn size(&self) -> Vec2;
    fn clear(&mut self);
    fn draw_entity(&mut self, entity: &DrawEntity);
}

/// Recorded surface command
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Clear,
    Entity(DrawEntity),
}

/// Surface that records commands instead of drawing
#[derive(Debug, Clone)]
pub struct CommandList {
    size: Vec2,
    pub commands: Vec<DrawCommand>,
}

impl CommandList {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            size: Vec2::new(width, height),
            commands: Vec::new(),
        }
    }

    /// Entities drawn since the last clear
    pub fn frame(&self) -> &[DrawCommand] {
        let start = self
            .commands
            .iter()
            .rposition(|c| *c == DrawCommand::Clear)
            .map(|i| i + 1)
            .unwrap_or(0);
        &self.commands[start..]
    }

    /// Resize (e.g. viewport change)
    pub fn resize(&mut self, width: f32, height: f32) {
        self.size = Vec2::new(width, height);
    }
}

impl Surface for CommandList {
    fn size(&self) -> Vec2 {
        self.size
    }

    fn clear(&mut self) {
        // Only the latest frame is kept
        self.commands.clear();
        self.commands.push(DrawCommand::Clear);
    }

    fn draw_entity(&mut self, entity: &DrawEntity) {
        self.commands.push(DrawCommand::Entity(entity.clone()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_returns_draws_after_clear() {
        let mut list = CommandList::new(100.0, 100.0);
        let draw = DrawEntity {
            visual_id: "/m/H.png".into(),
            pos: Vec2::new(1.0, 2.0),
            size: 50.0,
            resolved: true,
        };
        list.draw_entity(&draw);
        list.clear();
        list.draw_entity(&draw);
        assert_eq!(list.frame().len(), 1);
        assert_eq!(list.commands.len(), 2);
    }
}
