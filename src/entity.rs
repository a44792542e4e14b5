use cgmath::*;

use crate::sprite::{
    rendering::{DrawList, Layer},
    Sprite,
};

/// A game character: a sprite plus the per-frame behavior that drives it.
pub trait Entity {
    fn sprite(&self) -> &Sprite;

    fn sprite_mut(&mut self) -> &mut Sprite;

    /// Advances the sprite's animation. Runs after physics integration and before collisions.
    fn animate(&mut self, dt: f32) {
        self.sprite_mut().animations.update(dt);
    }

    /// Update internal state of entity. Runs after collisions and input have been handled, so
    /// `touching` reflects this frame's contacts.
    fn update(&mut self, _dt: f32) {}

    /// An entity should return true here so long as it needs to be updated and drawn.
    fn is_alive(&self) -> bool {
        self.sprite().alive
    }

    /// The current position of the entity's anchor point
    #[cfg(test)]
    fn position(&self) -> Point2<f32> {
        self.sprite().position
    }

    #[cfg(test)]
    fn bounds(&self) -> crate::geom::Bounds {
        self.sprite().bounds()
    }

    fn draw(&self, draw_list: &mut DrawList) {
        draw_list.sprite(Layer::World, self.sprite(), vec2(0.0, 0.0));
    }
}

/// Plays `name` unless it's already the current animation.
pub fn play_animation(sprite: &mut Sprite, name: &str) {
    if sprite.animations.name() != Some(name) {
        if let Err(e) = sprite.animations.play(name) {
            log::error!("{} sprite: {:#}", sprite.key, e);
        }
    }
}
