pub mod animation;
pub mod collision;
pub mod core;
pub mod rendering;

// re-export core::* (e.g., Sprite) to sprite::*
pub use self::core::*;
