use cgmath::*;
use image::{Rgba, RgbaImage};

use crate::{constants::hud, font};

/// Describes an image or spritesheet the game references by key. Spritesheets are horizontal
/// strips of `frame_count` frames, each `frame_size` pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ImageAsset {
    pub key: &'static str,
    pub path: &'static str,
    pub frame_size: (u32, u32),
    pub frame_count: u32,
    /// Base color of the generated stand-in used when the image file is unavailable.
    pub placeholder: [u8; 4],
}

impl ImageAsset {
    const fn image(key: &'static str, path: &'static str, size: (u32, u32), color: [u8; 4]) -> Self {
        Self {
            key,
            path,
            frame_size: size,
            frame_count: 1,
            placeholder: color,
        }
    }

    const fn sheet(
        key: &'static str,
        path: &'static str,
        frame_size: (u32, u32),
        frame_count: u32,
        color: [u8; 4],
    ) -> Self {
        Self {
            key,
            path,
            frame_size,
            frame_count,
            placeholder: color,
        }
    }

    pub fn frame_extent(&self) -> Vector2<f32> {
        vec2(self.frame_size.0 as f32, self.frame_size.1 as f32)
    }

    pub fn sheet_size(&self) -> (u32, u32) {
        (self.frame_size.0 * self.frame_count, self.frame_size.1)
    }
}

const GRASS: [u8; 4] = [96, 168, 64, 255];
const GRASS_2: [u8; 4] = [72, 140, 120, 255];

pub const IMAGES: &[ImageAsset] = &[
    ImageAsset::image("background", "images/background.png", (960, 600), [92, 148, 252, 255]),
    ImageAsset::image("ground", "images/ground.png", (960, 42), [120, 84, 48, 255]),
    ImageAsset::image("ground2", "images/ground2.png", (960, 42), [104, 76, 60, 255]),
    ImageAsset::image("grass:8x1", "images/grass_8x1.png", (336, 42), GRASS),
    ImageAsset::image("grass:6x1", "images/grass_6x1.png", (252, 42), GRASS),
    ImageAsset::image("grass:4x1", "images/grass_4x1.png", (168, 42), GRASS),
    ImageAsset::image("grass:2x1", "images/grass_2x1.png", (84, 42), GRASS),
    ImageAsset::image("grass:1x1", "images/grass_1x1.png", (42, 42), GRASS),
    ImageAsset::image("grass2:8x1", "images/grass2_8x1.png", (336, 42), GRASS_2),
    ImageAsset::image("grass2:6x1", "images/grass2_6x1.png", (252, 42), GRASS_2),
    ImageAsset::image("grass2:4x1", "images/grass2_4x1.png", (168, 42), GRASS_2),
    ImageAsset::image("grass2:1x4", "images/grass2_1x4.png", (42, 168), GRASS_2),
    ImageAsset::image("grass2:2x1", "images/grass2_2x1.png", (84, 42), GRASS_2),
    ImageAsset::image("grass2:1x1", "images/grass2_1x1.png", (42, 42), GRASS_2),
    ImageAsset::image("invisible-wall", "images/invisible_wall.png", (42, 42), [255, 0, 255, 96]),
    ImageAsset::image("icon:coin", "images/coin_icon.png", (22, 22), [252, 200, 40, 255]),
    ImageAsset::sheet("font:numbers", "images/numbers.png", (20, 26), 12, [255, 255, 255, 255]),
    ImageAsset::sheet("coin", "images/coin_animated.png", (32, 25), 10, [252, 200, 40, 255]),
    ImageAsset::sheet("spider", "images/spider.png", (30, 54), 8, [156, 40, 40, 255]),
    ImageAsset::sheet("hero", "images/hero.png", (30, 54), 8, [40, 96, 200, 255]),
    ImageAsset::sheet("door", "images/door.png", (56, 52), 2, [140, 90, 40, 255]),
    ImageAsset::sheet("icon:key", "images/key_icon.png", (30, 34), 2, [232, 200, 64, 255]),
    ImageAsset::sheet("key", "images/key.png", (30, 34), 1, [232, 200, 64, 255]),
];

pub fn image(key: &str) -> Option<&'static ImageAsset> {
    IMAGES.iter().find(|i| i.key == key)
}

/// Builds a stand-in spritesheet for an image whose file could not be loaded. Each frame is
/// filled with the asset's placeholder color, outlined, and marked with a band whose position
/// varies per frame so animation remains visible.
///
/// The HUD numbers font is instead rendered from the built-in glyphs so counters stay legible.
pub fn placeholder_sheet(asset: &ImageAsset) -> RgbaImage {
    if asset.key == hud::NUMBERS_FONT {
        return font::render_charset_sheet(hud::NUMBERS_CHARSET, asset.frame_size);
    }

    let (fw, fh) = asset.frame_size;
    let (w, h) = asset.sheet_size();
    let [r, g, b, a] = asset.placeholder;
    let fill = Rgba([r, g, b, a]);
    let outline = Rgba([r / 2, g / 2, b / 2, a]);
    let band = Rgba([
        r.saturating_add(60),
        g.saturating_add(60),
        b.saturating_add(60),
        a,
    ]);

    RgbaImage::from_fn(w.max(1), h.max(1), |x, y| {
        let frame = x / fw.max(1);
        let fx = x % fw.max(1);
        if fx == 0 || y == 0 || fx + 1 == fw || y + 1 == fh {
            outline
        } else {
            let band_y = (frame * fh / asset.frame_count.max(1)) % fh.max(1);
            if y / 3 == band_y / 3 {
                band
            } else {
                fill
            }
        }
    })
}

#[cfg(test)]
mod asset_tests {
    use super::*;

    #[test]
    fn keys_are_unique() {
        for (i, a) in IMAGES.iter().enumerate() {
            assert!(
                IMAGES[i + 1..].iter().all(|b| b.key != a.key),
                "duplicate key {}",
                a.key
            );
        }
    }

    #[test]
    fn lookup_by_key() {
        let hero = image("hero").unwrap();
        assert_eq!(hero.frame_size, (30, 54));
        assert_eq!(hero.frame_count, 8);
        assert!(image("dragon").is_none());
    }

    #[test]
    fn placeholder_matches_sheet_dimensions() {
        let coin = image("coin").unwrap();
        let sheet = placeholder_sheet(coin);
        assert_eq!(sheet.dimensions(), (320, 25));
        let [r, g, b, _] = coin.placeholder;
        assert_eq!(sheet.get_pixel(0, 0), &Rgba([r / 2, g / 2, b / 2, 255]));
    }

    #[test]
    fn numbers_font_placeholder_has_one_frame_per_char() {
        let numbers = image(hud::NUMBERS_FONT).unwrap();
        assert_eq!(numbers.frame_count as usize, hud::NUMBERS_CHARSET.len());
        assert_eq!(placeholder_sheet(numbers).dimensions(), numbers.sheet_size());
    }
}
