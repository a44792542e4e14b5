use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::Deserialize;

use crate::{assets, constants::LEVEL_COUNT};

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PlatformData {
    /// Image key of the platform, e.g. "grass:4x1"
    pub image: String,
    pub x: f32,
    pub y: f32,
}

/// A level file. Platforms are positioned by their top-left corner; characters, coins and the key
/// by their center; the door by its bottom-center.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LevelData {
    pub platforms: Vec<PlatformData>,
    pub hero: Position,
    #[serde(default)]
    pub spiders: Vec<Position>,
    #[serde(default)]
    pub coins: Vec<Position>,
    pub door: Position,
    pub key: Position,
}

impl LevelData {
    pub fn from_json(json: &str) -> Result<Self> {
        let level: LevelData = serde_json::from_str(json).context("Unable to parse level json")?;
        level.validate()?;
        Ok(level)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Unable to read level file {}", path.display()))?;
        Self::from_json(&json).with_context(|| format!("Invalid level file {}", path.display()))
    }

    /// Every platform must name an image in the asset manifest.
    pub fn validate(&self) -> Result<()> {
        for (i, platform) in self.platforms.iter().enumerate() {
            if assets::image(&platform.image).is_none() {
                bail!("Platform {} uses unknown image \"{}\"", i, platform.image);
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------------------------------------------------

pub fn level_file_name(index: u32) -> String {
    format!("level{:02}.json", index)
}

/// All levels, loaded up front.
#[derive(Debug, Clone)]
pub struct LevelCache {
    levels: Vec<LevelData>,
}

impl LevelCache {
    pub fn load<P: AsRef<Path>>(data_dir: P) -> Result<Self> {
        let data_dir = data_dir.as_ref();
        let levels = (0..LEVEL_COUNT)
            .map(|i| LevelData::load(data_dir.join(level_file_name(i))))
            .collect::<Result<Vec<_>>>()?;
        log::info!("Loaded {} levels from {}", levels.len(), data_dir.display());
        Ok(Self { levels })
    }

    #[cfg(test)]
    pub fn from_levels(levels: Vec<LevelData>) -> Result<Self> {
        if levels.is_empty() {
            bail!("A level cache needs at least one level");
        }
        Ok(Self { levels })
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.levels.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    /// Level numbers wrap, so the level after the last is the first.
    pub fn get(&self, index: u32) -> &LevelData {
        &self.levels[index as usize % self.levels.len()]
    }
}

#[cfg(test)]
mod level_tests {
    use super::*;

    const SMALL_LEVEL: &str = r#"{
        "platforms": [
            {"image": "ground", "x": 0, "y": 546},
            {"image": "grass:4x1", "x": 420, "y": 420}
        ],
        "decoration": [{"frame": 1, "x": 10, "y": 10}],
        "hero": {"x": 21, "y": 525},
        "spiders": [{"x": 500, "y": 380}],
        "coins": [{"x": 441, "y": 399}, {"x": 483, "y": 399}],
        "door": {"x": 169, "y": 546},
        "key": {"x": 750, "y": 172}
    }"#;

    #[test]
    fn parses_level_and_ignores_unknown_fields() {
        let level = LevelData::from_json(SMALL_LEVEL).unwrap();
        assert_eq!(level.platforms.len(), 2);
        assert_eq!(level.platforms[1].image, "grass:4x1");
        assert_eq!(level.hero, Position { x: 21.0, y: 525.0 });
        assert_eq!(level.spiders.len(), 1);
        assert_eq!(level.coins.len(), 2);
        assert_eq!(level.door.y, 546.0);
    }

    #[test]
    fn rejects_unknown_platform_image() {
        let json = SMALL_LEVEL.replace("grass:4x1", "lava:4x1");
        let err = LevelData::from_json(&json).unwrap_err();
        assert!(format!("{:#}", err).contains("lava:4x1"));
    }

    #[test]
    fn rejects_missing_hero() {
        let json = r#"{"platforms": [], "door": {"x": 0, "y": 0}, "key": {"x": 0, "y": 0}}"#;
        assert!(LevelData::from_json(json).is_err());
    }

    #[test]
    fn level_file_names_are_zero_padded() {
        assert_eq!(level_file_name(0), "level00.json");
        assert_eq!(level_file_name(3), "level03.json");
    }

    #[test]
    fn cache_wraps_level_index() {
        let a = LevelData::from_json(SMALL_LEVEL).unwrap();
        let mut b = a.clone();
        b.hero.x = 100.0;
        let cache = LevelCache::from_levels(vec![a, b]).unwrap();
        assert_eq!(cache.get(1).hero.x, 100.0);
        assert_eq!(cache.get(2).hero.x, 21.0);
        assert!(LevelCache::from_levels(vec![]).is_err());
    }

    #[test]
    fn shipped_levels_load() {
        let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("data");
        let cache = LevelCache::load(dir).unwrap();
        assert_eq!(cache.len(), LEVEL_COUNT as usize);
    }
}
