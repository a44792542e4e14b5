use std::collections::HashMap;

use anyhow::{anyhow, Result};

/// Frame rate used when an animation doesn't specify one.
pub const DEFAULT_FPS: f32 = 60.0;

/// A named sequence of spritesheet frames.
#[derive(Clone, Debug, PartialEq)]
pub struct Animation {
    pub frames: Vec<u32>,
    pub fps: f32,
    pub looping: bool,
}

impl Animation {
    pub fn new(frames: &[u32], fps: f32, looping: bool) -> Self {
        Self {
            frames: frames.to_vec(),
            fps,
            looping,
        }
    }

    /// A single held frame at the default frame rate.
    pub fn still(frame: u32) -> Self {
        Self::new(&[frame], DEFAULT_FPS, false)
    }

    pub fn frame_duration(&self) -> f32 {
        1.0 / self.fps
    }
}

// ---------------------------------------------------------------------------------------------------------------------

/// Plays one of a set of named animations, advancing frames over time.
#[derive(Clone, Debug, Default)]
pub struct Animator {
    animations: HashMap<String, Animation>,
    current: Option<String>,
    frame_index: usize,
    elapsed: f32,
    finished: bool,
}

impl Animator {
    pub fn add(&mut self, name: &str, animation: Animation) {
        self.animations.insert(name.to_string(), animation);
    }

    /// Starts the named animation from its first frame.
    pub fn play(&mut self, name: &str) -> Result<()> {
        if !self.animations.contains_key(name) {
            return Err(anyhow!("No animation named \"{}\"", name));
        }
        self.current = Some(name.to_string());
        self.frame_index = 0;
        self.elapsed = 0.0;
        self.finished = false;
        Ok(())
    }

    /// Name of the current animation, if one has been played.
    pub fn name(&self) -> Option<&str> {
        self.current.as_deref()
    }

    fn current_animation(&self) -> Option<&Animation> {
        self.current.as_ref().and_then(|n| self.animations.get(n))
    }

    /// The spritesheet frame to display, if an animation is playing.
    pub fn frame(&self) -> Option<u32> {
        self.current_animation()
            .and_then(|a| a.frames.get(self.frame_index).copied())
    }

    /// True once a non-looping animation has displayed its final frame for a full frame duration.
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn update(&mut self, dt: f32) {
        if self.finished {
            return;
        }
        let (frame_duration, frame_count, looping) = match self.current_animation() {
            Some(a) if !a.frames.is_empty() => (a.frame_duration(), a.frames.len(), a.looping),
            _ => return,
        };

        self.elapsed += dt;
        while self.elapsed >= frame_duration {
            self.elapsed -= frame_duration;
            if self.frame_index + 1 < frame_count {
                self.frame_index += 1;
            } else if looping {
                self.frame_index = 0;
            } else {
                self.finished = true;
                break;
            }
        }
    }
}
