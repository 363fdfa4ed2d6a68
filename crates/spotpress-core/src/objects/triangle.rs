//! Triangle shape (isosceles, apex up).

use super::Geometry;
use kurbo::{Affine, BezPath, Point, Rect};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Triangle {
    /// Top-left corner of the bounding box.
    pub position: Point,
    pub width: f64,
    pub height: f64,
    #[serde(default)]
    pub rotation: f64,
}

impl Triangle {
    pub fn new(position: Point, width: f64, height: f64) -> Self {
        Self {
            position,
            width,
            height,
            rotation: 0.0,
        }
    }
}

impl Geometry for Triangle {
    fn bounds(&self) -> Rect {
        Rect::new(
            self.position.x,
            self.position.y,
            self.position.x + self.width,
            self.position.y + self.height,
        )
    }

    fn to_path(&self) -> BezPath {
        let mut path = BezPath::new();
        path.move_to(Point::new(self.position.x + self.width / 2.0, self.position.y));
        path.line_to(Point::new(self.position.x + self.width, self.position.y + self.height));
        path.line_to(Point::new(self.position.x, self.position.y + self.height));
        path.close_path();
        path
    }

    fn transform(&mut self, affine: Affine) {
        self.position = affine * self.position;
        let coeffs = affine.as_coeffs();
        self.width *= coeffs[0].abs();
        self.height *= coeffs[3].abs();
    }
}
