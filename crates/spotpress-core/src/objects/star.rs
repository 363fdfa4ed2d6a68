//! Star shape.

use super::Geometry;
use kurbo::{Affine, BezPath, Point, Rect};
use serde::{Deserialize, Serialize};

/// A star polygon with alternating outer and inner vertices.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Star {
    pub center: Point,
    pub outer_radius: f64,
    pub inner_radius: f64,
    /// Number of points (spikes), 5 for the classic star.
    pub points: u32,
    #[serde(default)]
    pub rotation: f64,
}

impl Star {
    pub fn new(center: Point, outer_radius: f64) -> Self {
        Self {
            center,
            outer_radius,
            inner_radius: outer_radius * 0.5,
            points: 5,
            rotation: 0.0,
        }
    }

    /// Vertices alternating outer/inner, starting at the top spike.
    fn vertices(&self) -> Vec<Point> {
        let n = self.points.max(3) as usize;
        let mut vertices = Vec::with_capacity(n * 2);
        for i in 0..n * 2 {
            let radius = if i % 2 == 0 {
                self.outer_radius
            } else {
                self.inner_radius
            };
            let angle = std::f64::consts::PI * (i as f64) / (n as f64)
                - std::f64::consts::FRAC_PI_2
                + self.rotation;
            vertices.push(Point::new(
                self.center.x + radius * angle.cos(),
                self.center.y + radius * angle.sin(),
            ));
        }
        vertices
    }
}

impl Geometry for Star {
    fn bounds(&self) -> Rect {
        let vertices = self.vertices();
        let mut bounds = Rect::from_points(vertices[0], vertices[1]);
        for v in &vertices[2..] {
            bounds = bounds.union_pt(*v);
        }
        bounds
    }

    fn to_path(&self) -> BezPath {
        let vertices = self.vertices();
        let mut path = BezPath::new();
        path.move_to(vertices[0]);
        for v in &vertices[1..] {
            path.line_to(*v);
        }
        path.close_path();
        path
    }

    fn transform(&mut self, affine: Affine) {
        self.center = affine * self.center;
        let scale = affine.as_coeffs()[0].abs();
        self.outer_radius *= scale;
        self.inner_radius *= scale;
    }
}
