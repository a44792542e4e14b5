pub mod hero;
pub mod spider;

pub use hero::Hero;
pub use spider::Spider;
