use cgmath::*;

pub fn lerp(t: f32, a: f32, b: f32) -> f32 {
    a + t * (b - a)
}

pub fn clamp(v: f32, min: f32, max: f32) -> f32 {
    if v < min {
        min
    } else if v > max {
        max
    } else {
        v
    }
}

// ---------------------------------------------------------------------------------------------------------------------

/// Axis aligned rectangle in world pixels. The world's y axis grows downward, so `top()` is the
/// smaller y value and `bottom()` the larger.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds {
    pub origin: Point2<f32>,
    pub extent: Vector2<f32>,
}

impl Default for Bounds {
    fn default() -> Self {
        Self {
            origin: point2(0.0, 0.0),
            extent: vec2(0.0, 0.0),
        }
    }
}

impl Bounds {
    pub fn new(origin: Point2<f32>, extent: Vector2<f32>) -> Self {
        Self { origin, extent }
    }

    pub fn from_xywh(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self::new(point2(x, y), vec2(width, height))
    }

    pub fn left(&self) -> f32 {
        self.origin.x
    }
    pub fn right(&self) -> f32 {
        self.origin.x + self.extent.x
    }
    pub fn top(&self) -> f32 {
        self.origin.y
    }
    pub fn bottom(&self) -> f32 {
        self.origin.y + self.extent.y
    }
    pub fn width(&self) -> f32 {
        self.extent.x
    }
    pub fn height(&self) -> f32 {
        self.extent.y
    }

    pub fn center(&self) -> Point2<f32> {
        self.origin + self.extent * 0.5
    }

    pub fn inset(&self, by: Vector2<f32>) -> Bounds {
        Bounds::new(self.origin + by * 0.5, self.extent - by)
    }

    /// True if the two rectangles share interior area. Rectangles which merely touch along an
    /// edge do not intersect.
    pub fn intersects(&self, other: &Bounds) -> bool {
        self.left() < other.right()
            && self.right() > other.left()
            && self.top() < other.bottom()
            && self.bottom() > other.top()
    }

    pub fn contains(&self, point: Point2<f32>) -> bool {
        point.x >= self.left()
            && point.x < self.right()
            && point.y >= self.top()
            && point.y < self.bottom()
    }

    /// Penetration depth along each axis, or None if the rectangles don't intersect.
    pub fn overlap(&self, other: &Bounds) -> Option<Vector2<f32>> {
        if !self.intersects(other) {
            return None;
        }
        let x = self.right().min(other.right()) - self.left().max(other.left());
        let y = self.bottom().min(other.bottom()) - self.top().max(other.top());
        Some(vec2(x, y))
    }
}

#[cfg(test)]
mod bounds_tests {
    use super::*;

    #[test]
    fn edges_follow_y_down_convention() {
        let b = Bounds::from_xywh(10.0, 20.0, 30.0, 40.0);
        assert_eq!(b.left(), 10.0);
        assert_eq!(b.right(), 40.0);
        assert_eq!(b.top(), 20.0);
        assert_eq!(b.bottom(), 60.0);
        assert_eq!(b.center(), point2(25.0, 40.0));
    }

    #[test]
    fn touching_edges_do_not_intersect() {
        let a = Bounds::from_xywh(0.0, 0.0, 10.0, 10.0);
        let b = Bounds::from_xywh(10.0, 0.0, 10.0, 10.0);
        let c = Bounds::from_xywh(0.0, 10.0, 10.0, 10.0);
        assert!(!a.intersects(&b));
        assert!(!a.intersects(&c));
        assert!(a.overlap(&b).is_none());
    }

    #[test]
    fn overlap_reports_penetration_per_axis() {
        let a = Bounds::from_xywh(0.0, 0.0, 10.0, 10.0);
        let b = Bounds::from_xywh(8.0, 5.0, 10.0, 10.0);
        assert_eq!(a.overlap(&b), Some(vec2(2.0, 5.0)));
        assert_eq!(b.overlap(&a), Some(vec2(2.0, 5.0)));
    }

    #[test]
    fn contains_is_half_open() {
        let b = Bounds::from_xywh(0.0, 0.0, 10.0, 10.0);
        assert!(b.contains(point2(0.0, 0.0)));
        assert!(b.contains(point2(9.9, 9.9)));
        assert!(!b.contains(point2(10.0, 5.0)));
    }

    #[test]
    fn lerp_and_clamp() {
        assert_eq!(lerp(0.5, 2.0, 4.0), 3.0);
        assert_eq!(clamp(5.0, 0.0, 1.0), 1.0);
        assert_eq!(clamp(-5.0, 0.0, 1.0), 0.0);
    }
}
