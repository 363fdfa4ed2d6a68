//! Canvas object definitions for the design editor.

mod circle;
mod image;
mod line;
mod path;
mod rect;
mod star;
mod text;
mod triangle;

pub use circle::Circle;
pub use image::{EmbeddedImage, RasterFormat};
pub use line::Line;
pub use path::PathShape;
pub use rect::Rectangle;
pub use star::Star;
pub use text::Text;
pub use triangle::Triangle;

use kurbo::{Affine, BezPath, Point, Rect};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Channel floor above which a colour counts as "near white" (paper).
pub const NEAR_WHITE_FLOOR: u8 = 240;

/// Serializable colour representation (RGBA8).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 255)
    }

    pub fn black() -> Self {
        Self::opaque(0, 0, 0)
    }

    pub fn white() -> Self {
        Self::opaque(255, 255, 255)
    }

    pub fn transparent() -> Self {
        Self::new(0, 0, 0, 0)
    }

    /// Lowercase `#rrggbb` form (alpha is not part of a print colour).
    pub fn hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// Parse `#rgb`, `#rrggbb` or `#rrggbbaa`.
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.strip_prefix('#')?.trim();
        match hex.len() {
            3 => {
                let r = u8::from_str_radix(&hex[0..1], 16).ok()? * 17;
                let g = u8::from_str_radix(&hex[1..2], 16).ok()? * 17;
                let b = u8::from_str_radix(&hex[2..3], 16).ok()? * 17;
                Some(Self::opaque(r, g, b))
            }
            6 => {
                let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
                let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
                let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
                Some(Self::opaque(r, g, b))
            }
            8 => {
                let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
                let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
                let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
                let a = u8::from_str_radix(&hex[6..8], 16).ok()?;
                Some(Self::new(r, g, b, a))
            }
            _ => None,
        }
    }

    /// Paper-coloured pixels are not counted as spot colours.
    pub fn is_near_white(&self) -> bool {
        self.r >= NEAR_WHITE_FLOOR && self.g >= NEAR_WHITE_FLOOR && self.b >= NEAR_WHITE_FLOOR
    }
}

/// A colour stop along a gradient axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GradientStop {
    /// Position along the axis in `0.0..=1.0`.
    pub offset: f64,
    pub color: Rgba,
}

/// Fill of a shape. Gradients and patterns are representable so the
/// validation engine can detect and reject them; only solid fills are
/// print-eligible.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Fill {
    None,
    Solid(Rgba),
    LinearGradient {
        start: Point,
        end: Point,
        stops: Vec<GradientStop>,
    },
    Pattern {
        /// Tile image payload, base64-encoded.
        image_base64: String,
    },
}

impl Fill {
    /// Gradient and pattern fills cannot be separated into plates.
    pub fn is_gradient_like(&self) -> bool {
        matches!(self, Fill::LinearGradient { .. } | Fill::Pattern { .. })
    }

    pub fn solid(&self) -> Option<Rgba> {
        match self {
            Fill::Solid(c) => Some(*c),
            _ => None,
        }
    }
}

impl Default for Fill {
    fn default() -> Self {
        Fill::Solid(Rgba::black())
    }
}

/// Style properties shared by every object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectStyle {
    pub fill: Fill,
    /// Stroke colour (None = no stroke).
    pub stroke: Option<Rgba>,
    pub stroke_width: f64,
    #[serde(default = "default_opacity")]
    pub opacity: f64,
}

fn default_opacity() -> f64 {
    1.0
}

impl Default for ObjectStyle {
    fn default() -> Self {
        Self {
            fill: Fill::default(),
            stroke: None,
            stroke_width: 0.0,
            opacity: 1.0,
        }
    }
}

impl ObjectStyle {
    pub fn solid(color: Rgba) -> Self {
        Self {
            fill: Fill::Solid(color),
            ..Self::default()
        }
    }

    pub fn stroked(color: Rgba, width: f64) -> Self {
        Self {
            fill: Fill::None,
            stroke: Some(color),
            stroke_width: width,
            opacity: 1.0,
        }
    }
}

/// Role of an object on the canvas. Background objects (product mockups)
/// always render behind user content; the document re-establishes that
/// ordering after every mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObjectRole {
    Background,
    UserContent,
}

/// Unique identifier for canvas objects.
pub type ObjectId = Uuid;

/// Common trait for shape geometry.
pub trait Geometry {
    /// Bounding box in canvas coordinates.
    fn bounds(&self) -> Rect;

    /// Path representation for rasterization and export.
    fn to_path(&self) -> BezPath;

    /// Apply a translation/scale transform.
    fn transform(&mut self, affine: Affine);
}

/// Tagged union of all shape kinds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ShapeKind {
    Text(Text),
    Rect(Rectangle),
    Circle(Circle),
    Triangle(Triangle),
    Line(Line),
    Star(Star),
    Path(PathShape),
    Image(EmbeddedImage),
}

impl ShapeKind {
    pub fn bounds(&self) -> Rect {
        match self {
            ShapeKind::Text(s) => s.bounds(),
            ShapeKind::Rect(s) => s.bounds(),
            ShapeKind::Circle(s) => s.bounds(),
            ShapeKind::Triangle(s) => s.bounds(),
            ShapeKind::Line(s) => s.bounds(),
            ShapeKind::Star(s) => s.bounds(),
            ShapeKind::Path(s) => s.bounds(),
            ShapeKind::Image(s) => s.bounds(),
        }
    }

    pub fn to_path(&self) -> BezPath {
        match self {
            ShapeKind::Text(s) => s.to_path(),
            ShapeKind::Rect(s) => s.to_path(),
            ShapeKind::Circle(s) => s.to_path(),
            ShapeKind::Triangle(s) => s.to_path(),
            ShapeKind::Line(s) => s.to_path(),
            ShapeKind::Star(s) => s.to_path(),
            ShapeKind::Path(s) => s.to_path(),
            ShapeKind::Image(s) => s.to_path(),
        }
    }

    pub fn transform(&mut self, affine: Affine) {
        match self {
            ShapeKind::Text(s) => s.transform(affine),
            ShapeKind::Rect(s) => s.transform(affine),
            ShapeKind::Circle(s) => s.transform(affine),
            ShapeKind::Triangle(s) => s.transform(affine),
            ShapeKind::Line(s) => s.transform(affine),
            ShapeKind::Star(s) => s.transform(affine),
            ShapeKind::Path(s) => s.transform(affine),
            ShapeKind::Image(s) => s.transform(affine),
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            ShapeKind::Text(_) => "text",
            ShapeKind::Rect(_) => "rect",
            ShapeKind::Circle(_) => "circle",
            ShapeKind::Triangle(_) => "triangle",
            ShapeKind::Line(_) => "line",
            ShapeKind::Star(_) => "star",
            ShapeKind::Path(_) => "path",
            ShapeKind::Image(_) => "image",
        }
    }

    /// Rotation in radians (0 for kinds that do not rotate).
    pub fn rotation(&self) -> f64 {
        match self {
            ShapeKind::Text(s) => s.rotation,
            ShapeKind::Rect(s) => s.rotation,
            ShapeKind::Triangle(s) => s.rotation,
            ShapeKind::Star(s) => s.rotation,
            ShapeKind::Image(s) => s.rotation,
            _ => 0.0,
        }
    }

    pub fn set_rotation(&mut self, radians: f64) {
        match self {
            ShapeKind::Text(s) => s.rotation = radians,
            ShapeKind::Rect(s) => s.rotation = radians,
            ShapeKind::Triangle(s) => s.rotation = radians,
            ShapeKind::Star(s) => s.rotation = radians,
            ShapeKind::Image(s) => s.rotation = radians,
            _ => {}
        }
    }

    pub fn is_image(&self) -> bool {
        matches!(self, ShapeKind::Image(_))
    }

    pub fn as_image(&self) -> Option<&EmbeddedImage> {
        match self {
            ShapeKind::Image(img) => Some(img),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&Text> {
        match self {
            ShapeKind::Text(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_text_mut(&mut self) -> Option<&mut Text> {
        match self {
            ShapeKind::Text(t) => Some(t),
            _ => None,
        }
    }

    /// True for freehand-drawn paths (a complexity signal).
    pub fn is_freehand(&self) -> bool {
        matches!(self, ShapeKind::Path(p) if p.freehand)
    }
}

/// A drawable object on the canvas: shape geometry plus role, visibility,
/// lock state and style.
///
/// The role is set by the construction API and cannot be reassigned:
/// [`CanvasObject::user`] produces selectable user content,
/// [`CanvasObject::mockup`] produces the locked product backdrop.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CanvasObject {
    pub(crate) id: ObjectId,
    role: ObjectRole,
    pub visible: bool,
    pub locked: bool,
    pub style: ObjectStyle,
    pub shape: ShapeKind,
}

impl CanvasObject {
    /// Create a user-content object with default style.
    pub fn user(shape: ShapeKind) -> Self {
        Self::user_with_style(shape, ObjectStyle::default())
    }

    /// Create a user-content object with an explicit style.
    pub fn user_with_style(shape: ShapeKind, style: ObjectStyle) -> Self {
        Self {
            id: Uuid::new_v4(),
            role: ObjectRole::UserContent,
            visible: true,
            locked: false,
            style,
            shape,
        }
    }

    /// Create a background mockup object. Mockups are locked and take no
    /// part in validation or hashing of the printable design.
    pub fn mockup(image: EmbeddedImage) -> Self {
        Self {
            id: Uuid::new_v4(),
            role: ObjectRole::Background,
            visible: true,
            locked: true,
            style: ObjectStyle {
                fill: Fill::None,
                stroke: None,
                stroke_width: 0.0,
                opacity: 1.0,
            },
            shape: ShapeKind::Image(image),
        }
    }

    pub fn id(&self) -> ObjectId {
        self.id
    }

    pub fn role(&self) -> ObjectRole {
        self.role
    }

    pub fn is_background(&self) -> bool {
        self.role == ObjectRole::Background
    }

    pub fn is_user_content(&self) -> bool {
        self.role == ObjectRole::UserContent
    }

    pub fn bounds(&self) -> Rect {
        self.shape.bounds()
    }

    /// Assign a fresh ID. Used when duplicating so copies stay distinct.
    pub(crate) fn regenerate_id(&mut self) {
        self.id = Uuid::new_v4();
    }
}

/// Distance from a point to a line segment (a→b).
pub fn point_to_segment_dist(point: Point, a: Point, b: Point) -> f64 {
    let seg = kurbo::Vec2::new(b.x - a.x, b.y - a.y);
    let pv = kurbo::Vec2::new(point.x - a.x, point.y - a.y);
    let len_sq = seg.hypot2();
    if len_sq < f64::EPSILON {
        return pv.hypot();
    }
    let t = (pv.dot(seg) / len_sq).clamp(0.0, 1.0);
    let proj = Point::new(a.x + t * seg.x, a.y + t * seg.y);
    ((point.x - proj.x).powi(2) + (point.y - proj.y).powi(2)).sqrt()
}

/// Minimum distance from a point to a polyline.
pub fn point_to_polyline_dist(point: Point, points: &[Point]) -> f64 {
    points
        .windows(2)
        .map(|w| point_to_segment_dist(point, w[0], w[1]))
        .fold(f64::INFINITY, f64::min)
}
