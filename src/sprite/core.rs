use anyhow::{Context, Result};
use cgmath::*;

use crate::{assets, geom::Bounds};

use super::{animation::Animator, collision::Body};

/// A renderable game object drawn from an image or spritesheet in the asset manifest.
///
/// `position` is the location of the sprite's anchor point; an anchor of (0,0) places the
/// top-left corner at `position`, (0.5,0.5) centers the sprite on it.
#[derive(Clone, Debug)]
pub struct Sprite {
    pub key: String,
    pub position: Point2<f32>,
    pub anchor: Vector2<f32>,
    pub size: Vector2<f32>,
    pub scale: Vector2<f32>,
    pub frame: u32,
    pub alpha: f32,
    pub alive: bool,
    pub visible: bool,
    pub body: Option<Body>,
    pub animations: Animator,
}

impl Sprite {
    /// Creates a sprite for the image `key`, sized to one frame of that image.
    pub fn new(key: &str, x: f32, y: f32) -> Result<Self> {
        let asset = assets::image(key).with_context(|| format!("Unknown image key \"{}\"", key))?;
        Ok(Self {
            key: key.to_string(),
            position: point2(x, y),
            anchor: vec2(0.0, 0.0),
            size: asset.frame_extent(),
            scale: vec2(1.0, 1.0),
            frame: 0,
            alpha: 1.0,
            alive: true,
            visible: true,
            body: None,
            animations: Animator::default(),
        })
    }

    pub fn with_anchor(mut self, x: f32, y: f32) -> Self {
        self.set_anchor(x, y);
        self
    }

    /// Changes the anchor, leaving `position` where it is.
    pub fn set_anchor(&mut self, x: f32, y: f32) {
        self.anchor = vec2(x, y);
        self.sync_body();
    }

    pub fn width(&self) -> f32 {
        self.size.x
    }

    pub fn height(&self) -> f32 {
        self.size.y
    }

    pub fn top_left(&self) -> Point2<f32> {
        self.position - vec2(self.anchor.x * self.size.x, self.anchor.y * self.size.y)
    }

    pub fn bounds(&self) -> Bounds {
        Bounds::new(self.top_left(), self.size)
    }

    /// Attaches a physics body covering the sprite's frame.
    pub fn enable_body(&mut self) -> &mut Body {
        let body = Body::new(self.top_left(), self.size);
        self.body.insert(body)
    }

    pub fn body(&self) -> Option<&Body> {
        self.body.as_ref()
    }

    pub fn body_mut(&mut self) -> Option<&mut Body> {
        self.body.as_mut()
    }

    /// Moves the sprite to follow its body after physics has run.
    pub fn sync_from_body(&mut self) {
        if let Some(body) = &self.body {
            self.position =
                body.position + vec2(self.anchor.x * self.size.x, self.anchor.y * self.size.y);
        }
    }

    /// Moves the body to follow the sprite after the sprite was positioned directly.
    pub fn sync_body(&mut self) {
        let top_left = self.top_left();
        if let Some(body) = &mut self.body {
            body.position = top_left;
        }
    }

    /// Removes the sprite from play: no longer drawn, updated or collided.
    pub fn kill(&mut self) {
        self.alive = false;
        self.visible = false;
        if let Some(body) = &mut self.body {
            body.enable = false;
        }
    }

    /// The frame to draw: the current animation's frame if one is playing, else `frame`.
    pub fn current_frame(&self) -> u32 {
        self.animations.frame().unwrap_or(self.frame)
    }
}

#[cfg(test)]
mod sprite_tests {
    use super::*;

    #[test]
    fn unknown_key_is_an_error() {
        assert!(Sprite::new("unicorn", 0.0, 0.0).is_err());
    }

    #[test]
    fn anchor_offsets_bounds() {
        let s = Sprite::new("hero", 100.0, 100.0).unwrap().with_anchor(0.5, 0.5);
        assert_eq!(s.size, vec2(30.0, 54.0));
        assert_eq!(s.top_left(), point2(85.0, 73.0));

        let door = Sprite::new("door", 100.0, 200.0).unwrap().with_anchor(0.5, 1.0);
        assert_eq!(door.bounds(), Bounds::from_xywh(72.0, 148.0, 56.0, 52.0));
    }

    #[test]
    fn body_round_trips_through_anchor() {
        let mut s = Sprite::new("hero", 100.0, 100.0).unwrap().with_anchor(0.5, 0.5);
        s.enable_body();
        assert_eq!(s.body().unwrap().position, point2(85.0, 73.0));

        s.body_mut().unwrap().position = point2(15.0, 23.0);
        s.sync_from_body();
        assert_eq!(s.position, point2(30.0, 50.0));

        s.position.y -= 3.0;
        s.sync_body();
        assert_eq!(s.body().unwrap().position, point2(15.0, 20.0));
    }

    #[test]
    fn kill_hides_and_disables() {
        let mut s = Sprite::new("coin", 0.0, 0.0).unwrap();
        s.enable_body();
        s.kill();
        assert!(!s.alive);
        assert!(!s.visible);
        assert!(!s.body().unwrap().enable);
    }
}
