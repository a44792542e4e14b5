use cgmath::*;

use crate::{
    font,
    geom::Bounds,
    sprite::rendering::{color, DrawList, Layer},
};

/// Outline width of each box; box text is this much shorter than the box.
const BORDER_WIDTH: f32 = 2.0;
const LABEL_SIZE: f32 = 30.0;
const LABEL_STROKE: f32 = 4.0;
const HOVER_ALPHA: f32 = 0.7;

#[derive(Debug, Clone, PartialEq)]
pub struct ScoreBoardConfig {
    /// Corner radius of each box
    pub radius: f32,
    pub x: f32,
    pub y: f32,
    /// Offset between successive rows
    pub margin: Vector2<f32>,
    pub width: f32,
    pub height: f32,
    pub border_color: u32,
    pub rect_color: u32,
    pub scale: f32,
    /// Heading drawn above the rows; None for no heading.
    pub label: Option<String>,
    pub fixed_to_camera: bool,
}

impl Default for ScoreBoardConfig {
    fn default() -> Self {
        Self {
            radius: 10.0,
            x: 30.0,
            y: 20.0,
            margin: vec2(0.0, 22.0),
            width: 210.0,
            height: 16.0,
            border_color: 0x000000,
            rect_color: 0x1E90FF,
            scale: 1.0,
            label: Some("Scoreboard".to_string()),
            fixed_to_camera: true,
        }
    }
}

// ---------------------------------------------------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
struct Label {
    text: String,
    /// Top-center of the text
    position: Point2<f32>,
}

impl Label {
    fn height() -> f32 {
        LABEL_SIZE + LABEL_STROKE
    }
}

#[derive(Debug, Clone, PartialEq)]
struct ScoreBox {
    bounds: Bounds,
    text: String,
    fill_alpha: f32,
}

// ---------------------------------------------------------------------------------------------------------------------

/// A vertical list of rounded, labeled boxes, one per row of text, under an optional heading.
/// Rows stack downward from (`x`, `y`) by `margin`. Positions are local to the board; the board
/// as a whole is moved by `set_position` and scaled by `scale`.
#[derive(Debug, Clone)]
pub struct ScoreBoard {
    conf: ScoreBoardConfig,
    offset: Vector2<f32>,
    label: Option<Label>,
    boxes: Vec<ScoreBox>,
    position: Point2<f32>,
    fixed_to_camera: bool,
    visible: bool,
    destroyed: bool,
}

impl Default for ScoreBoard {
    fn default() -> Self {
        Self::new(ScoreBoardConfig::default())
    }
}

impl ScoreBoard {
    /// Creates a hidden board.
    pub fn new(conf: ScoreBoardConfig) -> Self {
        let mut board = Self {
            fixed_to_camera: conf.fixed_to_camera,
            conf,
            offset: vec2(0.0, 0.0),
            label: None,
            boxes: Vec::new(),
            position: point2(0.0, 0.0),
            visible: false,
            destroyed: false,
        };

        if let Some(text) = board.conf.label.clone() {
            board.draw_label(text);
        }
        board.hide();
        board
    }

    fn draw_label(&mut self, text: String) {
        let position = point2(
            self.conf.x + self.offset.x + self.conf.width / 2.0,
            self.conf.y + self.offset.y,
        );
        self.label = Some(Label { text, position });
        self.offset.y += Label::height() / 2.0;
        self.add_offset();
    }

    fn add_offset(&mut self) {
        self.offset += self.conf.margin;
    }

    fn remove_offset(&mut self) {
        self.offset -= self.conf.margin;
    }

    fn draw_box(&mut self, text: &str) {
        let bounds = Bounds::from_xywh(
            self.conf.x + self.offset.x,
            self.conf.y + self.offset.y,
            self.conf.width,
            self.conf.height,
        );
        self.boxes.push(ScoreBox {
            bounds,
            text: text.to_string(),
            fill_alpha: 1.0,
        });
        self.add_offset();
    }

    /// Appends a box per row and shows the board.
    pub fn draw<S: AsRef<str>>(&mut self, rows: &[S]) {
        if self.destroyed {
            log::warn!("ScoreBoard::draw called on a destroyed board");
            return;
        }
        for row in rows {
            self.draw_box(row.as_ref());
        }
        self.show();
    }

    /// Makes the board show exactly `rows`, reusing existing boxes, appending missing ones and
    /// destroying surplus ones. An empty list leaves the board untouched.
    pub fn redraw<S: AsRef<str>>(&mut self, rows: &[S]) {
        if rows.is_empty() || self.destroyed {
            return;
        }
        self.show();

        for (b, row) in self.boxes.iter_mut().zip(rows) {
            b.text = row.as_ref().to_string();
        }

        let existing = self.boxes.len();
        if existing < rows.len() {
            self.draw(&rows[existing..]);
        } else {
            self.boxes.truncate(rows.len());
            for _ in rows.len()..existing {
                self.remove_offset();
            }
        }
    }

    /// Destroys every box and hides the board. The label stays.
    pub fn clear(&mut self) {
        while self.boxes.pop().is_some() {
            self.remove_offset();
        }
        self.hide();
    }

    #[allow(dead_code)]
    pub fn set_position(&mut self, x: f32, y: f32) {
        self.position = point2(x, y);
    }

    #[allow(dead_code)]
    pub fn set_fixed_to_camera(&mut self, fixed_to_camera: bool) {
        self.fixed_to_camera = fixed_to_camera;
    }

    pub fn show(&mut self) {
        self.visible = true;
    }

    pub fn hide(&mut self) {
        self.visible = false;
    }

    /// Removes the board and everything on it. A destroyed board ignores further draws.
    #[allow(dead_code)]
    pub fn destroy(&mut self) {
        self.boxes.clear();
        self.label = None;
        self.visible = false;
        self.destroyed = true;
    }

    #[cfg(test)]
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    #[cfg(test)]
    pub fn is_fixed_to_camera(&self) -> bool {
        self.fixed_to_camera
    }

    #[cfg(test)]
    pub fn rows(&self) -> Vec<&str> {
        self.boxes.iter().map(|b| b.text.as_str()).collect()
    }

    #[cfg(test)]
    pub fn offset(&self) -> Vector2<f32> {
        self.offset
    }

    /// Maps board-local coordinates to world coordinates.
    fn to_world(&self, local: Bounds) -> Bounds {
        let s = self.conf.scale;
        Bounds::new(self.position + local.origin.to_vec() * s, local.extent * s)
    }

    /// World-space bounds of each box.
    pub fn box_bounds(&self) -> Vec<Bounds> {
        self.boxes.iter().map(|b| self.to_world(b.bounds)).collect()
    }

    /// Fill alpha of each box; hovered boxes are translucent.
    #[cfg(test)]
    pub fn box_alphas(&self) -> Vec<f32> {
        self.boxes.iter().map(|b| b.fill_alpha).collect()
    }

    /// Updates hover state from the pointer position in world coordinates, or None when the
    /// pointer has left the window.
    pub fn pointer_moved(&mut self, pointer: Option<Point2<f32>>) {
        let hit_areas = self.box_bounds();
        let active = self.visible;
        for (b, bounds) in self.boxes.iter_mut().zip(hit_areas) {
            let over = active && pointer.map_or(false, |p| bounds.contains(p));
            b.fill_alpha = if over { HOVER_ALPHA } else { 1.0 };
        }
    }

    pub fn draw_into(&self, draw_list: &mut DrawList) {
        if !self.visible {
            return;
        }
        let layer = if self.fixed_to_camera {
            Layer::Overlay
        } else {
            Layer::World
        };
        let s = self.conf.scale;

        if let Some(label) = &self.label {
            let size = LABEL_SIZE * s;
            let top_center = self.to_world(Bounds::new(label.position, vec2(0.0, 0.0))).origin;
            let origin = top_center - vec2(font::text_width(&label.text, size) / 2.0, 0.0);
            draw_list.stroked_text(
                layer,
                &label.text,
                origin,
                size,
                color(0xFFFFFF, 1.0),
                color(0x000000, 1.0),
                LABEL_STROKE * s,
            );
        }

        for b in &self.boxes {
            let bounds = self.to_world(b.bounds);
            draw_list.rounded_box(
                layer,
                bounds,
                self.conf.radius * s,
                color(self.conf.rect_color, b.fill_alpha),
                BORDER_WIDTH * s,
                color(self.conf.border_color, 1.0),
            );

            let size = (self.conf.height - BORDER_WIDTH) * s;
            let origin = point2(
                bounds.center().x - font::text_width(&b.text, size) / 2.0,
                bounds.top(),
            );
            draw_list.text(layer, &b.text, origin, size, color(0x000000, 1.0));
        }
    }
}

#[cfg(test)]
mod scoreboard_tests {
    use super::*;
    use crate::sprite::rendering::TextureKey;

    // label is 34px tall: half of it plus the 22px margin
    const FIRST_ROW_OFFSET: f32 = 17.0 + 22.0;

    #[test]
    fn starts_hidden_with_label_offset() {
        let board = ScoreBoard::default();
        assert!(!board.is_visible());
        assert!(board.is_fixed_to_camera());
        assert_eq!(board.offset(), vec2(0.0, FIRST_ROW_OFFSET));
        assert!(board.rows().is_empty());
    }

    #[test]
    fn no_label_no_offset() {
        let board = ScoreBoard::new(ScoreBoardConfig {
            label: None,
            ..Default::default()
        });
        assert_eq!(board.offset(), vec2(0.0, 0.0));
    }

    #[test]
    fn draw_appends_rows_and_shows() {
        let mut board = ScoreBoard::default();
        board.draw(&["one", "two"]);
        assert!(board.is_visible());
        assert_eq!(board.rows(), vec!["one", "two"]);

        let bounds = board.box_bounds();
        assert_eq!(bounds[0], Bounds::from_xywh(30.0, 20.0 + FIRST_ROW_OFFSET, 210.0, 16.0));
        assert_eq!(bounds[1].top(), bounds[0].top() + 22.0);
        assert_eq!(board.offset().y, FIRST_ROW_OFFSET + 44.0);
    }

    #[test]
    fn redraw_ignores_empty_rows() {
        let mut board = ScoreBoard::default();
        board.redraw::<&str>(&[]);
        assert!(!board.is_visible());
    }

    #[test]
    fn redraw_grows_updates_and_shrinks() {
        let mut board = ScoreBoard::default();
        board.redraw(&["a"]);
        assert!(board.is_visible());
        assert_eq!(board.rows(), vec!["a"]);

        board.redraw(&["b", "c", "d"]);
        assert_eq!(board.rows(), vec!["b", "c", "d"]);
        assert_eq!(board.offset().y, FIRST_ROW_OFFSET + 66.0);

        board.redraw(&["e", "f", "g"]);
        assert_eq!(board.rows(), vec!["e", "f", "g"]);

        board.redraw(&["h"]);
        assert_eq!(board.rows(), vec!["h"]);
        assert_eq!(board.offset().y, FIRST_ROW_OFFSET + 22.0);

        // a row appended after shrinking lands right below the survivor
        board.redraw(&["h", "i"]);
        let bounds = board.box_bounds();
        assert_eq!(bounds[1].top(), bounds[0].top() + 22.0);
    }

    #[test]
    fn clear_rewinds_and_hides() {
        let mut board = ScoreBoard::default();
        board.draw(&["a", "b"]);
        board.clear();
        assert!(!board.is_visible());
        assert!(board.rows().is_empty());
        assert_eq!(board.offset().y, FIRST_ROW_OFFSET);
    }

    #[test]
    fn hover_dims_box_under_pointer() {
        let mut board = ScoreBoard::default();
        board.draw(&["a", "b"]);
        let second = board.box_bounds()[1];

        board.pointer_moved(Some(second.center()));
        assert_eq!(board.box_alphas(), vec![1.0, 0.7]);

        board.pointer_moved(Some(point2(0.0, 0.0)));
        assert_eq!(board.box_alphas(), vec![1.0, 1.0]);

        board.pointer_moved(Some(second.center()));
        board.pointer_moved(None);
        assert_eq!(board.box_alphas(), vec![1.0, 1.0]);
    }

    #[test]
    fn position_and_scale_move_boxes() {
        let mut board = ScoreBoard::new(ScoreBoardConfig {
            scale: 2.0,
            label: None,
            ..Default::default()
        });
        board.set_position(100.0, 50.0);
        board.draw(&["a"]);
        assert_eq!(board.box_bounds()[0], Bounds::from_xywh(160.0, 90.0, 420.0, 32.0));
    }

    #[test]
    fn destroy_removes_everything() {
        let mut board = ScoreBoard::default();
        board.draw(&["a"]);
        board.destroy();
        assert!(board.destroyed);
        board.draw(&["b"]);
        assert!(!board.is_visible());
        let mut list = DrawList::default();
        board.draw_into(&mut list);
        assert!(list.is_empty());
    }

    #[test]
    fn draws_only_when_visible_on_chosen_layer() {
        let mut board = ScoreBoard::default();
        let mut list = DrawList::default();
        board.draw_into(&mut list);
        assert!(list.is_empty());

        board.draw(&["1"]);
        board.draw_into(&mut list);
        assert!(!list.layer(Layer::Overlay).is_empty());
        assert!(list.layer(Layer::World).is_empty());

        list.clear();
        board.set_fixed_to_camera(false);
        board.draw_into(&mut list);
        assert!(list.layer(Layer::Overlay).is_empty());
        assert!(!list.layer(Layer::World).is_empty());
    }

    #[test]
    fn box_text_is_black() {
        let mut board = ScoreBoard::new(ScoreBoardConfig {
            label: None,
            ..Default::default()
        });
        board.draw(&["7"]);
        let mut list = DrawList::default();
        board.draw_into(&mut list);

        let glyphs: Vec<_> = list
            .layer(Layer::Overlay)
            .iter()
            .filter(|q| q.texture == TextureKey::Font)
            .collect();
        assert_eq!(glyphs.len(), 1);
        assert_eq!(glyphs[0].color, color(0x000000, 1.0));
    }
}
