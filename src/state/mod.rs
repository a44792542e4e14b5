pub mod app_state;
pub mod events;
pub mod gpu_state;
pub mod hud;
pub mod play_state;
pub mod scoreboard;
