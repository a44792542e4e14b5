use anyhow::Result;
use cgmath::*;

use crate::{
    constants::hud::{
        ICON_SPACING, KEY_ICON_Y, NUMBERS_CELL, NUMBERS_CHARSET, NUMBERS_FONT, POSITION,
    },
    font::RetroFont,
    sprite::{
        rendering::{DrawList, Layer, WHITE},
        Sprite,
    },
};

/// The heads-up display: key icon, coin icon and coin counter, fixed to the camera.
/// Child positions are relative to the HUD's `position`.
#[derive(Debug, Clone)]
pub struct Hud {
    pub position: Point2<f32>,
    key_icon: Sprite,
    coin_icon: Sprite,
    coin_font: RetroFont,
    coin_score_position: Point2<f32>,
}

impl Hud {
    pub fn new() -> Result<Self> {
        let coin_font = RetroFont::new(NUMBERS_FONT, NUMBERS_CELL, NUMBERS_CHARSET);
        let key_icon = Sprite::new("icon:key", 0.0, KEY_ICON_Y)?.with_anchor(0.0, 0.5);
        let coin_icon = Sprite::new("icon:coin", key_icon.width() + ICON_SPACING, 0.0)?;
        let coin_score_position = point2(
            coin_icon.position.x + coin_icon.width(),
            coin_icon.height() / 2.0,
        );

        let mut hud = Self {
            position: point2(POSITION.0, POSITION.1),
            key_icon,
            coin_icon,
            coin_font,
            coin_score_position,
        };
        hud.update(0, false);
        Ok(hud)
    }

    pub fn update(&mut self, coins: u32, has_key: bool) {
        self.coin_font.set_text(&format!("x{}", coins));
        self.key_icon.frame = if has_key { 1 } else { 0 };
    }

    #[cfg(test)]
    pub fn coin_text(&self) -> &str {
        self.coin_font.text()
    }

    #[cfg(test)]
    pub fn key_frame(&self) -> u32 {
        self.key_icon.frame
    }

    #[cfg(test)]
    pub fn key_icon(&self) -> &Sprite {
        &self.key_icon
    }

    #[cfg(test)]
    pub fn coin_icon(&self) -> &Sprite {
        &self.coin_icon
    }

    /// Top-left of the coin counter in HUD coordinates; the counter is anchored at its left-middle.
    pub fn coin_score_origin(&self) -> Point2<f32> {
        self.coin_score_position - vec2(0.0, self.coin_font.height() * 0.5)
    }

    pub fn draw(&self, draw_list: &mut DrawList) {
        let offset = self.position.to_vec();
        draw_list.sprite(Layer::Overlay, &self.coin_icon, offset);
        draw_list.retro_text(
            Layer::Overlay,
            &self.coin_font,
            self.coin_score_origin() + offset,
            WHITE,
        );
        draw_list.sprite(Layer::Overlay, &self.key_icon, offset);
    }
}

#[cfg(test)]
mod hud_tests {
    use super::*;
    use crate::{geom::Bounds, sprite::rendering::TextureKey};

    #[test]
    fn layout() {
        let hud = Hud::new().unwrap();
        assert_eq!(hud.position, point2(10.0, 10.0));
        // key icon is 30x34, anchored left-middle at y = 19
        assert_eq!(hud.key_icon().top_left(), point2(0.0, 2.0));
        assert_eq!(hud.coin_icon().position, point2(37.0, 0.0));
        assert_eq!(hud.coin_score_origin(), point2(59.0, -2.0));
    }

    #[test]
    fn update_sets_counter_and_key_frame() {
        let mut hud = Hud::new().unwrap();
        assert_eq!(hud.coin_text(), "X0");
        assert_eq!(hud.key_frame(), 0);

        hud.update(12, true);
        assert_eq!(hud.coin_text(), "X12");
        assert_eq!(hud.key_frame(), 1);
    }

    #[test]
    fn draws_on_overlay_offset_by_position() {
        let mut hud = Hud::new().unwrap();
        hud.update(3, false);
        let mut list = DrawList::default();
        hud.draw(&mut list);

        assert!(list.layer(Layer::World).is_empty());
        let quads = list.layer(Layer::Overlay);
        // coin icon, two counter glyphs, key icon
        assert_eq!(quads.len(), 4);
        assert_eq!(quads[0].dest, Bounds::from_xywh(47.0, 10.0, 22.0, 22.0));
        assert_eq!(quads[1].texture, TextureKey::Image("font:numbers".to_string()));
        assert_eq!(quads[1].dest.origin, point2(69.0, 8.0));
        assert_eq!(quads[3].dest.origin, point2(10.0, 12.0));
    }
}
