// Units are seconds & pixels-per-second unless otherwise specified. The world uses screen
// conventions: origin at top-left, +y pointing down.

pub const WINDOW_TITLE: &str = "Hero Platformer";
pub const WORLD_WIDTH: f32 = 960.0;
pub const WORLD_HEIGHT: f32 = 600.0;

pub const LEVEL_COUNT: u32 = 4;
pub const GRAVITY: f32 = 1200.0;

/// Largest timestep fed to the simulation, prevents tunneling after a stall.
pub const MAX_FRAME_DT_MILLIS: u64 = 32;

pub mod hero {
    pub const SPEED: f32 = 800.0;
    pub const JUMP_SPEED: f32 = 600.0;
    pub const BOUNCE_SPEED: f32 = 200.0;
}

pub mod spider {
    pub const SPEED: f32 = 100.0;
}

pub mod key {
    pub const BOB_LIFT: f32 = 3.0;
    pub const BOB_DISTANCE: f32 = 6.0;
    pub const BOB_DURATION: f32 = 0.8;
}

pub mod hud {
    pub const POSITION: (f32, f32) = (10.0, 10.0);
    pub const KEY_ICON_Y: f32 = 19.0;
    pub const ICON_SPACING: f32 = 7.0;
    pub const NUMBERS_FONT: &str = "font:numbers";
    pub const NUMBERS_CHARSET: &str = "0123456789X ";
    pub const NUMBERS_CELL: (f32, f32) = (20.0, 26.0);
}

pub mod scoreboard {
    /// Row 0 of the scoreboard is rewritten with this prefix and the coin count on every pickup.
    pub const COIN_ROW_PREFIX: &str = " VORTEX 50000000 - ";
}
