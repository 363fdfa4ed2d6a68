//! Polyline / freehand path shape.

use super::Geometry;
use kurbo::{Affine, BezPath, Point, Rect};
use serde::{Deserialize, Serialize};

/// A polyline path, optionally closed. Freehand strokes captured from
/// pointer input set `freehand`; imported vector outlines leave it unset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathShape {
    pub points: Vec<Point>,
    #[serde(default)]
    pub closed: bool,
    #[serde(default)]
    pub freehand: bool,
}

impl PathShape {
    pub fn from_points(points: Vec<Point>) -> Self {
        Self {
            points,
            closed: false,
            freehand: false,
        }
    }

    pub fn freehand(points: Vec<Point>) -> Self {
        Self {
            points,
            closed: false,
            freehand: true,
        }
    }

    pub fn closed(mut self) -> Self {
        self.closed = true;
        self
    }
}

impl Geometry for PathShape {
    fn bounds(&self) -> Rect {
        match self.points.as_slice() {
            [] => Rect::ZERO,
            [only] => Rect::from_points(*only, *only),
            [first, rest @ ..] => {
                let mut bounds = Rect::from_points(*first, *first);
                for p in rest {
                    bounds = bounds.union_pt(*p);
                }
                bounds
            }
        }
    }

    fn to_path(&self) -> BezPath {
        let mut path = BezPath::new();
        if let Some((first, rest)) = self.points.split_first() {
            path.move_to(*first);
            for p in rest {
                path.line_to(*p);
            }
            if self.closed {
                path.close_path();
            }
        }
        path
    }

    fn transform(&mut self, affine: Affine) {
        for p in &mut self.points {
            *p = affine * *p;
        }
    }
}
