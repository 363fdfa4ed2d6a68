//! Text shape.

use super::Geometry;
use kurbo::{Affine, BezPath, Point, Rect, Shape as KurboShape};
use serde::{Deserialize, Serialize};

/// A text object. Bounds are estimated from a fixed advance ratio; the
/// preview rasterizer measures real glyphs when it lays the text out.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Text {
    /// Top-left corner of the text box.
    pub position: Point,
    pub content: String,
    /// Font size in canvas units.
    pub font_size: f64,
    #[serde(default)]
    pub rotation: f64,
}

/// Approximate glyph advance as a fraction of the font size.
const ADVANCE_RATIO: f64 = 0.6;
/// Line height as a fraction of the font size.
const LINE_RATIO: f64 = 1.2;

impl Text {
    pub fn new(position: Point, content: impl Into<String>) -> Self {
        Self {
            position,
            content: content.into(),
            font_size: 24.0,
            rotation: 0.0,
        }
    }

    pub fn with_size(mut self, font_size: f64) -> Self {
        self.font_size = font_size;
        self
    }
}

impl Geometry for Text {
    fn bounds(&self) -> Rect {
        let longest_line = self
            .content
            .lines()
            .map(|l| l.chars().count())
            .max()
            .unwrap_or(0);
        let line_count = self.content.lines().count().max(1);
        Rect::new(
            self.position.x,
            self.position.y,
            self.position.x + longest_line as f64 * self.font_size * ADVANCE_RATIO,
            self.position.y + line_count as f64 * self.font_size * LINE_RATIO,
        )
    }

    fn to_path(&self) -> BezPath {
        self.bounds().to_path(0.1)
    }

    fn transform(&mut self, affine: Affine) {
        self.position = affine * self.position;
        self.font_size *= affine.as_coeffs()[3].abs();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounds_grow_with_content() {
        let short = Text::new(Point::ZERO, "hi");
        let long = Text::new(Point::ZERO, "hello there");
        assert!(long.bounds().width() > short.bounds().width());
    }

    #[test]
    fn multiline_bounds() {
        let text = Text::new(Point::ZERO, "one\ntwo\nthree");
        let single = Text::new(Point::ZERO, "three");
        assert!(text.bounds().height() > single.bounds().height() * 2.0);
    }
}
