use std::f32::consts::PI;

use crate::geom::{clamp, lerp};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Easing {
    #[default]
    Linear,
    QuadInOut,
    SineInOut,
}

impl Easing {
    /// Maps normalized time in [0,1] to normalized progress in [0,1].
    pub fn apply(self, t: f32) -> f32 {
        let t = clamp(t, 0.0, 1.0);
        match self {
            Easing::Linear => t,
            Easing::QuadInOut => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(2) / 2.0
                }
            }
            Easing::SineInOut => 0.5 * (1.0 - (PI * t).cos()),
        }
    }
}

// ---------------------------------------------------------------------------------------------------------------------

/// Interpolates a single value from `from` to `to` over `duration` seconds. A yoyo tween returns
/// to `from` over a second `duration`; a looping tween repeats its cycle forever.
#[derive(Clone, Debug)]
pub struct Tween {
    from: f32,
    to: f32,
    duration: f32,
    easing: Easing,
    yoyo: bool,
    looping: bool,
    elapsed: f32,
}

impl Tween {
    pub fn new(from: f32, to: f32, duration: f32, easing: Easing) -> Self {
        Self {
            from,
            to,
            duration: duration.max(f32::EPSILON),
            easing,
            yoyo: false,
            looping: false,
            elapsed: 0.0,
        }
    }

    pub fn yoyo(mut self, yoyo: bool) -> Self {
        self.yoyo = yoyo;
        self
    }

    pub fn looping(mut self, looping: bool) -> Self {
        self.looping = looping;
        self
    }

    fn cycle_duration(&self) -> f32 {
        if self.yoyo {
            self.duration * 2.0
        } else {
            self.duration
        }
    }

    pub fn is_finished(&self) -> bool {
        !self.looping && self.elapsed >= self.cycle_duration()
    }

    /// Advances the tween and returns the new value.
    pub fn update(&mut self, dt: f32) -> f32 {
        self.elapsed += dt;
        if self.looping {
            self.elapsed %= self.cycle_duration();
        } else {
            self.elapsed = self.elapsed.min(self.cycle_duration());
        }
        self.value()
    }

    pub fn value(&self) -> f32 {
        let t = if self.yoyo && self.elapsed > self.duration {
            (self.cycle_duration() - self.elapsed) / self.duration
        } else {
            self.elapsed / self.duration
        };
        lerp(self.easing.apply(t), self.from, self.to)
    }
}

#[cfg(test)]
mod tween_tests {
    use super::*;

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-4
    }

    #[test]
    fn easing_endpoints() {
        for e in [Easing::Linear, Easing::QuadInOut, Easing::SineInOut] {
            assert!(approx(e.apply(0.0), 0.0));
            assert!(approx(e.apply(0.5), 0.5));
            assert!(approx(e.apply(1.0), 1.0));
        }
    }

    #[test]
    fn one_shot_tween_finishes_at_target() {
        let mut t = Tween::new(0.0, 10.0, 1.0, Easing::Linear);
        assert!(approx(t.update(0.25), 2.5));
        assert!(approx(t.update(2.0), 10.0));
        assert!(t.is_finished());
    }

    #[test]
    fn yoyo_loop_bobs_between_endpoints() {
        let mut t = Tween::new(97.0, 103.0, 0.8, Easing::SineInOut)
            .yoyo(true)
            .looping(true);
        assert!(approx(t.value(), 97.0));
        assert!(approx(t.update(0.8), 103.0));
        assert!(approx(t.update(0.4), 100.0));
        assert!(approx(t.update(0.4), 97.0));
        t.update(0.4);
        assert!(approx(t.value(), 100.0));
        assert!(!t.is_finished());
    }
}
