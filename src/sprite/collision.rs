use cgmath::*;

use crate::geom::Bounds;

// ---------------------------------------------------------------------------------------------------------------------

/// Per-face contact flags for a Body.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Faces {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
}

// ---------------------------------------------------------------------------------------------------------------------

/// The physical extent of the simulation. Bodies with `collide_world_bounds` are kept inside `bounds`.
#[derive(Clone, Copy, Debug)]
pub struct World {
    pub bounds: Bounds,
    pub gravity: Vector2<f32>,
}

impl World {
    pub fn new(bounds: Bounds, gravity: Vector2<f32>) -> Self {
        Self { bounds, gravity }
    }
}

// ---------------------------------------------------------------------------------------------------------------------

/// An axis aligned arcade physics body. `position` is the top-left corner in world pixels.
#[derive(Clone, Copy, Debug)]
pub struct Body {
    pub position: Point2<f32>,
    pub prev_position: Point2<f32>,
    pub size: Vector2<f32>,
    pub velocity: Vector2<f32>,
    pub allow_gravity: bool,
    pub immovable: bool,
    pub collide_world_bounds: bool,
    pub enable: bool,

    /// Faces in contact with another body, as of the last collision pass.
    pub touching: Faces,

    /// Faces pressed against the world bounds, as of the last integration step.
    pub blocked: Faces,
}

impl Body {
    pub fn new(position: Point2<f32>, size: Vector2<f32>) -> Self {
        Self {
            position,
            prev_position: position,
            size,
            velocity: vec2(0.0, 0.0),
            allow_gravity: true,
            immovable: false,
            collide_world_bounds: false,
            enable: true,
            touching: Faces::default(),
            blocked: Faces::default(),
        }
    }

    pub fn bounds(&self) -> Bounds {
        Bounds::new(self.position, self.size)
    }

    fn prev_bounds(&self) -> Bounds {
        Bounds::new(self.prev_position, self.size)
    }

    /// Integrates gravity & velocity for one step, resetting contact flags first.
    pub fn pre_update(&mut self, dt: f32, world: &World) {
        if !self.enable {
            return;
        }

        self.touching = Faces::default();
        self.blocked = Faces::default();
        self.prev_position = self.position;

        if self.allow_gravity && !self.immovable {
            self.velocity += world.gravity * dt;
        }
        self.position += self.velocity * dt;

        if self.collide_world_bounds {
            self.clamp_to(&world.bounds);
        }
    }

    fn clamp_to(&mut self, bounds: &Bounds) {
        if self.position.x < bounds.left() {
            self.position.x = bounds.left();
            self.velocity.x = 0.0;
            self.blocked.left = true;
        } else if self.position.x + self.size.x > bounds.right() {
            self.position.x = bounds.right() - self.size.x;
            self.velocity.x = 0.0;
            self.blocked.right = true;
        }

        if self.position.y < bounds.top() {
            self.position.y = bounds.top();
            self.velocity.y = 0.0;
            self.blocked.up = true;
        } else if self.position.y + self.size.y > bounds.bottom() {
            self.position.y = bounds.bottom() - self.size.y;
            self.velocity.y = 0.0;
            self.blocked.down = true;
        }
    }
}

// ---------------------------------------------------------------------------------------------------------------------

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Axis {
    X,
    Y,
}

/// Tests two bodies for intersection without separating them.
pub fn overlap(a: &Body, b: &Body) -> bool {
    a.enable && b.enable && a.bounds().intersects(&b.bounds())
}

/// Separates two intersecting bodies, updating their positions, velocities and `touching` flags.
/// Returns true if a separation took place.
pub fn collide(a: &mut Body, b: &mut Body) -> bool {
    if !a.enable || !b.enable || (a.immovable && b.immovable) {
        return false;
    }

    let penetration = match a.bounds().overlap(&b.bounds()) {
        Some(p) => p,
        None => return false,
    };

    match separation_axis(a, b, penetration) {
        Axis::Y => separate_y(a, b, penetration.y),
        Axis::X => separate_x(a, b, penetration.x),
    }
    true
}

/// Picks the axis along which the bodies came into contact, judging by where they were before
/// the last integration step. Falls back to the axis of least penetration when the bodies were
/// already intersecting.
fn separation_axis(a: &Body, b: &Body, penetration: Vector2<f32>) -> Axis {
    let (pa, pb) = (a.prev_bounds(), b.prev_bounds());
    let was_apart_vertically = pa.bottom() <= pb.top() || pa.top() >= pb.bottom();
    let was_apart_horizontally = pa.right() <= pb.left() || pa.left() >= pb.right();

    if was_apart_vertically && !was_apart_horizontally {
        Axis::Y
    } else if was_apart_horizontally && !was_apart_vertically {
        Axis::X
    } else if penetration.x < penetration.y {
        Axis::X
    } else {
        Axis::Y
    }
}

/// Splits a correction between two bodies; an immovable body takes none of it.
fn shares(a: &Body, b: &Body) -> (f32, f32) {
    if b.immovable {
        (1.0, 0.0)
    } else if a.immovable {
        (0.0, 1.0)
    } else {
        (0.5, 0.5)
    }
}

fn separate_y(a: &mut Body, b: &mut Body, depth: f32) {
    let (share_a, share_b) = shares(a, b);
    let a_above = a.bounds().center().y < b.bounds().center().y
        || a.prev_bounds().bottom() <= b.prev_bounds().top();

    let sign = if a_above { -1.0 } else { 1.0 };
    a.position.y += sign * depth * share_a;
    b.position.y -= sign * depth * share_b;

    if a_above {
        a.touching.down = true;
        b.touching.up = true;
    } else {
        a.touching.up = true;
        b.touching.down = true;
    }

    exchange_velocity(&mut a.velocity.y, &mut b.velocity.y, a.immovable, b.immovable);
}

fn separate_x(a: &mut Body, b: &mut Body, depth: f32) {
    let (share_a, share_b) = shares(a, b);
    let a_left = a.bounds().center().x < b.bounds().center().x
        || a.prev_bounds().right() <= b.prev_bounds().left();

    let sign = if a_left { -1.0 } else { 1.0 };
    a.position.x += sign * depth * share_a;
    b.position.x -= sign * depth * share_b;

    if a_left {
        a.touching.right = true;
        b.touching.left = true;
    } else {
        a.touching.left = true;
        b.touching.right = true;
    }

    exchange_velocity(&mut a.velocity.x, &mut b.velocity.x, a.immovable, b.immovable);
}

fn exchange_velocity(va: &mut f32, vb: &mut f32, a_immovable: bool, b_immovable: bool) {
    if b_immovable {
        *va = *vb;
    } else if a_immovable {
        *vb = *va;
    } else {
        let average = (*va + *vb) * 0.5;
        *va = average;
        *vb = average;
    }
}

// ---------------------------------------------------------------------------------------------------------------------
