use cgmath::*;
use image::{Rgba, RgbaImage};

use crate::geom::Bounds;

/// Glyphs are 3 pixels wide and 5 tall, stored as one row per byte (bit 2 is the leftmost pixel).
pub const GLYPH_WIDTH: u32 = 3;
pub const GLYPH_HEIGHT: u32 = 5;

/// Atlas cells pad each glyph by one pixel to keep sampling from bleeding into neighbors.
const CELL_WIDTH: u32 = GLYPH_WIDTH + 1;
const CELL_HEIGHT: u32 = GLYPH_HEIGHT + 1;

#[rustfmt::skip]
const GLYPHS: &[(char, [u8; 5])] = &[
    (' ', [0b000, 0b000, 0b000, 0b000, 0b000]),
    ('0', [0b111, 0b101, 0b101, 0b101, 0b111]),
    ('1', [0b010, 0b110, 0b010, 0b010, 0b111]),
    ('2', [0b111, 0b001, 0b111, 0b100, 0b111]),
    ('3', [0b111, 0b001, 0b111, 0b001, 0b111]),
    ('4', [0b101, 0b101, 0b111, 0b001, 0b001]),
    ('5', [0b111, 0b100, 0b111, 0b001, 0b111]),
    ('6', [0b111, 0b100, 0b111, 0b101, 0b111]),
    ('7', [0b111, 0b001, 0b001, 0b001, 0b001]),
    ('8', [0b111, 0b101, 0b111, 0b101, 0b111]),
    ('9', [0b111, 0b101, 0b111, 0b001, 0b111]),
    ('A', [0b010, 0b101, 0b111, 0b101, 0b101]),
    ('B', [0b110, 0b101, 0b110, 0b101, 0b110]),
    ('C', [0b011, 0b100, 0b100, 0b100, 0b011]),
    ('D', [0b110, 0b101, 0b101, 0b101, 0b110]),
    ('E', [0b111, 0b100, 0b110, 0b100, 0b111]),
    ('F', [0b111, 0b100, 0b110, 0b100, 0b100]),
    ('G', [0b011, 0b100, 0b101, 0b101, 0b011]),
    ('H', [0b101, 0b101, 0b111, 0b101, 0b101]),
    ('I', [0b111, 0b010, 0b010, 0b010, 0b111]),
    ('J', [0b001, 0b001, 0b001, 0b101, 0b010]),
    ('K', [0b101, 0b101, 0b110, 0b101, 0b101]),
    ('L', [0b100, 0b100, 0b100, 0b100, 0b111]),
    ('M', [0b101, 0b111, 0b111, 0b101, 0b101]),
    ('N', [0b110, 0b101, 0b101, 0b101, 0b101]),
    ('O', [0b010, 0b101, 0b101, 0b101, 0b010]),
    ('P', [0b110, 0b101, 0b110, 0b100, 0b100]),
    ('Q', [0b010, 0b101, 0b101, 0b110, 0b011]),
    ('R', [0b110, 0b101, 0b110, 0b101, 0b101]),
    ('S', [0b011, 0b100, 0b010, 0b001, 0b110]),
    ('T', [0b111, 0b010, 0b010, 0b010, 0b010]),
    ('U', [0b101, 0b101, 0b101, 0b101, 0b111]),
    ('V', [0b101, 0b101, 0b101, 0b101, 0b010]),
    ('W', [0b101, 0b101, 0b111, 0b111, 0b101]),
    ('X', [0b101, 0b101, 0b010, 0b101, 0b101]),
    ('Y', [0b101, 0b101, 0b010, 0b010, 0b010]),
    ('Z', [0b111, 0b001, 0b010, 0b100, 0b111]),
    ('-', [0b000, 0b000, 0b111, 0b000, 0b000]),
    ('.', [0b000, 0b000, 0b000, 0b000, 0b010]),
    (':', [0b000, 0b010, 0b000, 0b010, 0b000]),
    ('!', [0b010, 0b010, 0b010, 0b000, 0b010]),
    ('?', [0b111, 0b001, 0b010, 0b000, 0b010]),
    ('/', [0b001, 0b001, 0b010, 0b100, 0b100]),
];

fn glyph_index(c: char) -> Option<usize> {
    let c = c.to_ascii_uppercase();
    GLYPHS.iter().position(|(g, _)| *g == c)
}

/// Rasterizes the glyph table into a single-row atlas. Lit pixels are opaque white so text can
/// be tinted by vertex color.
pub fn build_atlas() -> RgbaImage {
    let width = GLYPHS.len() as u32 * CELL_WIDTH;
    let mut atlas = RgbaImage::from_pixel(width, CELL_HEIGHT, Rgba([255, 255, 255, 0]));
    for (i, (_, rows)) in GLYPHS.iter().enumerate() {
        let x0 = i as u32 * CELL_WIDTH;
        for (y, row) in rows.iter().enumerate() {
            for x in 0..GLYPH_WIDTH {
                if row & (1 << (GLYPH_WIDTH - 1 - x)) != 0 {
                    atlas.put_pixel(x0 + x, y as u32, Rgba([255, 255, 255, 255]));
                }
            }
        }
    }
    atlas
}

/// Texture coordinates of a glyph within the atlas, or None for characters without a glyph.
pub fn glyph_uv(c: char) -> Option<Bounds> {
    let index = glyph_index(c)?;
    let atlas_width = (GLYPHS.len() as u32 * CELL_WIDTH) as f32;
    let u = (index as u32 * CELL_WIDTH) as f32 / atlas_width;
    Some(Bounds::new(
        point2(u, 0.0),
        vec2(
            GLYPH_WIDTH as f32 / atlas_width,
            GLYPH_HEIGHT as f32 / CELL_HEIGHT as f32,
        ),
    ))
}

/// Horizontal distance between successive glyphs for text `size` pixels tall.
pub fn advance(size: f32) -> f32 {
    size * CELL_WIDTH as f32 / GLYPH_HEIGHT as f32
}

pub fn glyph_width(size: f32) -> f32 {
    size * GLYPH_WIDTH as f32 / GLYPH_HEIGHT as f32
}

pub fn text_width(text: &str, size: f32) -> f32 {
    let n = text.chars().count();
    if n == 0 {
        0.0
    } else {
        advance(size) * (n - 1) as f32 + glyph_width(size)
    }
}

// ---------------------------------------------------------------------------------------------------------------------

/// Renders `charset` into a spritesheet of `cell`-sized frames, one glyph per frame in charset
/// order, scaled up by the largest whole factor that fits. This is the layout a RetroFont expects.
pub fn render_charset_sheet(charset: &str, cell: (u32, u32)) -> RgbaImage {
    let (cw, ch) = (cell.0.max(1), cell.1.max(1));
    let count = charset.chars().count().max(1) as u32;
    let scale = (cw / GLYPH_WIDTH).min(ch / GLYPH_HEIGHT).max(1);
    let (gw, gh) = (GLYPH_WIDTH * scale, GLYPH_HEIGHT * scale);
    let (ox, oy) = (cw.saturating_sub(gw) / 2, ch.saturating_sub(gh) / 2);

    let mut sheet = RgbaImage::from_pixel(cw * count, ch, Rgba([255, 255, 255, 0]));
    for (i, c) in charset.chars().enumerate() {
        let rows = match glyph_index(c) {
            Some(index) => GLYPHS[index].1,
            None => continue,
        };
        for y in 0..gh.min(ch) {
            for x in 0..gw.min(cw) {
                let (gx, gy) = (x / scale, y / scale);
                if rows[gy as usize] & (1 << (GLYPH_WIDTH - 1 - gx)) != 0 {
                    sheet.put_pixel(i as u32 * cw + ox + x, oy + y, Rgba([255, 255, 255, 255]));
                }
            }
        }
    }
    sheet
}

// ---------------------------------------------------------------------------------------------------------------------

/// A fixed-cell font drawn from a spritesheet image (`key`) whose frames hold the characters of
/// `charset` in order, as used by the HUD counters. Text is upper-cased and characters outside
/// the set are dropped.
#[derive(Clone, Debug)]
pub struct RetroFont {
    pub key: String,
    pub cell: Vector2<f32>,
    pub charset: String,
    text: String,
}

impl RetroFont {
    pub fn new(key: &str, cell: (f32, f32), charset: &str) -> Self {
        Self {
            key: key.to_string(),
            cell: vec2(cell.0, cell.1),
            charset: charset.to_string(),
            text: String::new(),
        }
    }

    /// The spritesheet frame holding `c`.
    pub fn frame_for(&self, c: char) -> Option<u32> {
        self.charset.chars().position(|x| x == c).map(|i| i as u32)
    }

    pub fn set_text(&mut self, text: &str) {
        self.text = text
            .chars()
            .map(|c| c.to_ascii_uppercase())
            .filter(|c| self.charset.contains(*c))
            .collect();
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn width(&self) -> f32 {
        self.cell.x * self.text.chars().count() as f32
    }

    pub fn height(&self) -> f32 {
        self.cell.y
    }
}
