use anyhow::Result;

use crate::{
    constants::spider::SPEED,
    entity::{self, Entity},
    sprite::{animation::Animation, Sprite},
};

const ANIMATION_FPS: f32 = 8.0;

pub mod animations {
    pub const CRAWL: &str = "crawl";
    pub const DIE: &str = "die";
}

// --------------------------------------------------------------------------------------------------------------------

/// An enemy which crawls back and forth, turning around at walls and platform edges.
#[derive(Debug, Clone)]
pub struct Spider {
    sprite: Sprite,
    dying: bool,
}

impl Spider {
    /// Creates a spider centered on (x, y), crawling right.
    pub fn new(x: f32, y: f32) -> Result<Self> {
        let mut sprite = Sprite::new("spider", x, y)?.with_anchor(0.5, 0.5);

        sprite
            .animations
            .add(animations::CRAWL, Animation::new(&[6, 7], ANIMATION_FPS, true));
        sprite.animations.add(
            animations::DIE,
            Animation::new(&[0, 1, 2, 3, 4, 5], ANIMATION_FPS, false),
        );
        sprite.animations.play(animations::CRAWL)?;

        let body = sprite.enable_body();
        body.collide_world_bounds = true;
        body.velocity.x = SPEED;

        Ok(Self {
            sprite,
            dying: false,
        })
    }

    /// Stops colliding and plays the death animation; the spider is killed when it finishes.
    pub fn die(&mut self) {
        self.dying = true;
        if let Some(body) = self.sprite.body_mut() {
            body.enable = false;
        }
        entity::play_animation(&mut self.sprite, animations::DIE);
    }

    #[cfg(test)]
    pub fn is_dying(&self) -> bool {
        self.dying
    }
}

impl Entity for Spider {
    fn sprite(&self) -> &Sprite {
        &self.sprite
    }

    fn sprite_mut(&mut self) -> &mut Sprite {
        &mut self.sprite
    }

    fn animate(&mut self, dt: f32) {
        self.sprite.animations.update(dt);
        if self.dying && self.sprite.alive && self.sprite.animations.is_finished() {
            self.sprite.kill();
        }
    }

    fn update(&mut self, _dt: f32) {
        if let Some(body) = self.sprite.body_mut() {
            if body.touching.right || body.blocked.right {
                body.velocity.x = -SPEED;
            } else if body.touching.left || body.blocked.left {
                body.velocity.x = SPEED;
            }
        }
    }
}

#[cfg(test)]
mod spider_tests {
    use super::*;

    #[test]
    fn starts_crawling_right() {
        let spider = Spider::new(50.0, 50.0).unwrap();
        assert_eq!(spider.sprite().body().unwrap().velocity.x, 100.0);
        assert_eq!(spider.sprite().animations.name(), Some(animations::CRAWL));
        assert_eq!(spider.sprite().current_frame(), 6);
    }

    #[test]
    fn turns_around_at_walls() {
        let mut spider = Spider::new(50.0, 50.0).unwrap();
        spider.sprite_mut().body_mut().unwrap().touching.right = true;
        spider.update(0.0);
        assert_eq!(spider.sprite().body().unwrap().velocity.x, -100.0);

        let body = spider.sprite_mut().body_mut().unwrap();
        body.touching.right = false;
        body.blocked.left = true;
        spider.update(0.0);
        assert_eq!(spider.sprite().body().unwrap().velocity.x, 100.0);
    }

    #[test]
    fn keeps_direction_without_contact() {
        let mut spider = Spider::new(50.0, 50.0).unwrap();
        spider.sprite_mut().body_mut().unwrap().velocity.x = -100.0;
        spider.update(0.0);
        assert_eq!(spider.sprite().body().unwrap().velocity.x, -100.0);
    }

    #[test]
    fn dies_after_death_animation() {
        let mut spider = Spider::new(50.0, 50.0).unwrap();
        spider.die();
        assert!(spider.is_dying());
        assert!(!spider.sprite().body().unwrap().enable);
        assert_eq!(spider.sprite().animations.name(), Some(animations::DIE));
        assert!(spider.is_alive());

        // six frames at 8 fps
        for _ in 0..5 {
            spider.animate(0.125);
        }
        assert!(spider.is_alive());
        spider.animate(0.125);
        assert!(!spider.is_alive());
        assert!(!spider.sprite().visible);
    }
}
