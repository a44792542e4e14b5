use crate::audio::Sfx;

/// An Event payload for Message
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// Sent by PlayState to request a sound effect.
    PlaySound(Sfx),

    /// Sent by PlayState when the hero picks up a coin, bearing the running total for the level.
    CoinCollected { total: u32 },

    /// Sent by PlayState when the hero picks up the key.
    KeyCollected,

    /// Sent by PlayState when the hero stomps a spider.
    SpiderStomped,

    /// Sent by PlayState to request the level be rebuilt from scratch. Sent with the current level
    /// when the hero dies, and with the next level when the hero passes through the door.
    RestartLevel { level: u32 },
}
