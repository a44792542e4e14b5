use anyhow::Result;
use cgmath::*;

use crate::{
    constants::hero::{BOUNCE_SPEED, JUMP_SPEED, SPEED},
    entity::{self, Entity},
    sprite::{animation::Animation, Sprite},
};

// --------------------------------------------------------------------------------------------------------------------

const ANIMATION_FPS: f32 = 5.0;

pub mod animations {
    pub const STOP: &str = "stop";
    pub const RUN: &str = "run";
    pub const JUMP: &str = "jump";
    pub const FALL: &str = "fall";
}

// --------------------------------------------------------------------------------------------------------------------

/// The player character.
#[derive(Debug, Clone)]
pub struct Hero {
    sprite: Sprite,
}

impl Hero {
    /// Creates the hero centered on (x, y).
    pub fn new(x: f32, y: f32) -> Result<Self> {
        let mut sprite = Sprite::new("hero", x, y)?.with_anchor(0.5, 0.5);
        sprite.enable_body().collide_world_bounds = true;

        sprite
            .animations
            .add(animations::STOP, Animation::new(&[0, 1, 2, 3, 4, 5], ANIMATION_FPS, true));
        sprite
            .animations
            .add(animations::RUN, Animation::new(&[6, 7], ANIMATION_FPS, true));
        sprite.animations.add(animations::JUMP, Animation::still(0));
        sprite.animations.add(animations::FALL, Animation::still(0));

        Ok(Self { sprite })
    }

    pub fn velocity(&self) -> Vector2<f32> {
        self.sprite
            .body()
            .map_or(vec2(0.0, 0.0), |body| body.velocity)
    }

    pub fn is_on_ground(&self) -> bool {
        self.sprite.body().map_or(false, |body| body.touching.down)
    }

    /// True while moving downward, which is when contact with an enemy stomps it.
    pub fn is_falling(&self) -> bool {
        self.velocity().y > 0.0
    }

    /// Runs left (-1), right (+1) or stops (0). The sprite faces the direction of travel.
    pub fn move_dir(&mut self, direction: f32) {
        let vx = direction * SPEED;
        if let Some(body) = self.sprite.body_mut() {
            body.velocity.x = vx;
        }

        if vx < 0.0 {
            self.sprite.scale.x = -1.0;
        } else if vx > 0.0 {
            self.sprite.scale.x = 1.0;
        }
    }

    /// Jumps if standing on something. Returns true if the jump happened.
    pub fn jump(&mut self) -> bool {
        let can_jump = self.is_on_ground();
        if can_jump {
            if let Some(body) = self.sprite.body_mut() {
                body.velocity.y = -JUMP_SPEED;
            }
        }
        can_jump
    }

    /// The small hop after stomping an enemy.
    pub fn bounce(&mut self) {
        if let Some(body) = self.sprite.body_mut() {
            body.velocity.y = -BOUNCE_SPEED;
        }
    }

    pub fn animation_name(&self) -> &'static str {
        let velocity = self.velocity();
        if velocity.y < 0.0 {
            animations::JUMP
        } else if !self.is_on_ground() {
            animations::FALL
        } else if velocity.x != 0.0 {
            animations::RUN
        } else {
            animations::STOP
        }
    }
}

impl Entity for Hero {
    fn sprite(&self) -> &Sprite {
        &self.sprite
    }

    fn sprite_mut(&mut self) -> &mut Sprite {
        &mut self.sprite
    }

    fn update(&mut self, _dt: f32) {
        let name = self.animation_name();
        entity::play_animation(&mut self.sprite, name);
    }
}
