//! Z-order paint loop over a design document.

use crate::text::{GLYPH_HEIGHT, GLYPH_WIDTH, glyph_bitmap};
use image::{Rgba as Pixel, RgbaImage};
use kurbo::{Affine, BezPath, PathEl, Point, Shape as KurboShape};
use spotpress_core::objects::point_to_polyline_dist;
use spotpress_core::{CanvasObject, DesignDocument, EmbeddedImage, Fill, GradientStop, Rgba, ShapeKind, Text};

/// Default longest edge of a preview, in pixels.
pub const PREVIEW_MAX_DIM: u32 = 512;

/// Flattening tolerance for stroke polylines.
const FLATTEN_TOLERANCE: f64 = 0.25;

/// Render the document to an RGBA buffer whose longest edge is
/// `max_dim` pixels. Invisible objects are skipped; everything else is
/// painted back to front.
pub fn render_preview(document: &DesignDocument, max_dim: u32) -> RgbaImage {
    let canvas = document.canvas_size;
    let longest = canvas.width.max(canvas.height).max(1.0);
    let scale = max_dim.max(1) as f64 / longest;
    let width = ((canvas.width * scale).round() as u32).max(1);
    let height = ((canvas.height * scale).round() as u32).max(1);

    let bg = document.background;
    let mut img = RgbaImage::from_pixel(width, height, Pixel([bg.r, bg.g, bg.b, 255]));

    for object in document.objects_ordered().filter(|o| o.visible) {
        paint_object(&mut img, object, scale);
    }
    img
}

fn paint_object(img: &mut RgbaImage, object: &CanvasObject, scale: f64) {
    match &object.shape {
        ShapeKind::Image(embedded) => paint_image(img, embedded, object.style.opacity, scale),
        ShapeKind::Text(text) => paint_text(img, text, object, scale),
        _ => paint_vector(img, object, scale),
    }
}

fn paint_vector(img: &mut RgbaImage, object: &CanvasObject, scale: f64) {
    let rotation = object.shape.rotation();
    let mut transform = Affine::scale(scale);
    if rotation != 0.0 {
        transform *= Affine::rotate_about(rotation, object.shape.bounds().center());
    }
    let path = transform * object.shape.to_path();
    let opacity = object.style.opacity;

    match &object.style.fill {
        Fill::None => {}
        Fill::Solid(color) => {
            let color = *color;
            fill_path(img, &path, opacity, |_| color);
        }
        Fill::LinearGradient { start, end, stops } => {
            let (start, end) = (*start, *end);
            let stops = stops.clone();
            fill_path(img, &path, opacity, |pixel_point| {
                gradient_color(&stops, gradient_offset(pixel_point, start, end, scale))
            });
        }
        Fill::Pattern { .. } => {
            // Patterns never reach print; the preview shows a flat mid grey.
            fill_path(img, &path, opacity, |_| Rgba::opaque(128, 128, 128));
        }
    }

    if let Some(stroke) = object.style.stroke {
        if object.style.stroke_width > 0.0 {
            stroke_path(img, &path, stroke, object.style.stroke_width * scale, opacity);
        }
    }
}

fn fill_path(img: &mut RgbaImage, path: &BezPath, opacity: f64, color_at: impl Fn(Point) -> Rgba) {
    let bbox = path.bounding_box();
    let x0 = bbox.x0.floor().max(0.0) as u32;
    let y0 = bbox.y0.floor().max(0.0) as u32;
    let x1 = (bbox.x1.ceil() as i64).clamp(0, img.width() as i64) as u32;
    let y1 = (bbox.y1.ceil() as i64).clamp(0, img.height() as i64) as u32;

    for y in y0..y1 {
        for x in x0..x1 {
            let point = Point::new(x as f64 + 0.5, y as f64 + 0.5);
            if path.winding(point) != 0 {
                blend(img, x, y, color_at(point), opacity);
            }
        }
    }
}

fn stroke_path(img: &mut RgbaImage, path: &BezPath, color: Rgba, width: f64, opacity: f64) {
    let polylines = flatten_polylines(path);
    if polylines.is_empty() {
        return;
    }
    let radius = (width / 2.0).max(0.5);
    let bbox = path.bounding_box().inflate(radius, radius);
    let x0 = bbox.x0.floor().max(0.0) as u32;
    let y0 = bbox.y0.floor().max(0.0) as u32;
    let x1 = (bbox.x1.ceil() as i64).clamp(0, img.width() as i64) as u32;
    let y1 = (bbox.y1.ceil() as i64).clamp(0, img.height() as i64) as u32;

    for y in y0..y1 {
        for x in x0..x1 {
            let point = Point::new(x as f64 + 0.5, y as f64 + 0.5);
            let distance = polylines
                .iter()
                .map(|line| point_to_polyline_dist(point, line))
                .fold(f64::INFINITY, f64::min);
            if distance <= radius {
                blend(img, x, y, color, opacity);
            }
        }
    }
}

/// Flatten a path into polylines (one per subpath).
fn flatten_polylines(path: &BezPath) -> Vec<Vec<Point>> {
    let mut polylines: Vec<Vec<Point>> = Vec::new();
    let mut current: Vec<Point> = Vec::new();
    let mut subpath_start = Point::ZERO;
    kurbo::flatten(path, FLATTEN_TOLERANCE, |el| match el {
        PathEl::MoveTo(p) => {
            if current.len() > 1 {
                polylines.push(std::mem::take(&mut current));
            } else {
                current.clear();
            }
            current.push(p);
            subpath_start = p;
        }
        PathEl::LineTo(p) => current.push(p),
        PathEl::ClosePath => current.push(subpath_start),
        _ => {}
    });
    if current.len() > 1 {
        polylines.push(current);
    }
    polylines
}

fn paint_image(img: &mut RgbaImage, embedded: &EmbeddedImage, opacity: f64, scale: f64) {
    let Some(data) = embedded.data() else {
        log::warn!("embedded image payload is not valid base64; skipping");
        return;
    };
    let source = match image::load_from_memory(&data) {
        Ok(decoded) => decoded.to_rgba8(),
        Err(err) => {
            log::warn!("embedded image failed to decode; skipping: {err}");
            return;
        }
    };
    if source.width() == 0 || source.height() == 0 {
        return;
    }

    // Rotation is not applied to image blits in the preview.
    let dest = embedded.as_rect();
    let dest_x0 = dest.x0 * scale;
    let dest_y0 = dest.y0 * scale;
    let dest_w = dest.width() * scale;
    let dest_h = dest.height() * scale;
    if dest_w <= 0.0 || dest_h <= 0.0 {
        return;
    }
    let x0 = dest_x0.floor().max(0.0) as u32;
    let y0 = dest_y0.floor().max(0.0) as u32;
    let x1 = ((dest.x1 * scale).ceil() as i64).clamp(0, img.width() as i64) as u32;
    let y1 = ((dest.y1 * scale).ceil() as i64).clamp(0, img.height() as i64) as u32;

    for y in y0..y1 {
        for x in x0..x1 {
            // Sample in destination-rect space so clipping at the canvas
            // edge does not shift the source region.
            let u = ((x as f64 + 0.5) - dest_x0) / dest_w;
            let v = ((y as f64 + 0.5) - dest_y0) / dest_h;
            if !(0.0..1.0).contains(&u) || !(0.0..1.0).contains(&v) {
                continue;
            }
            let sx = ((u * source.width() as f64) as u32).min(source.width() - 1);
            let sy = ((v * source.height() as f64) as u32).min(source.height() - 1);
            let pixel = source.get_pixel(sx, sy);
            let color = Rgba::new(pixel[0], pixel[1], pixel[2], pixel[3]);
            blend(img, x, y, color, opacity);
        }
    }
}

fn paint_text(img: &mut RgbaImage, text: &Text, object: &CanvasObject, scale: f64) {
    let color = object
        .style
        .fill
        .solid()
        .or(object.style.stroke)
        .unwrap_or(Rgba::black());
    let cell_h = ((text.font_size * scale).round() as usize).max(1);
    let cell_w = (cell_h * GLYPH_WIDTH / GLYPH_HEIGHT).max(1);
    let line_stride = cell_h + cell_h / 5;

    let origin_x = (text.position.x * scale).round() as i64;
    let origin_y = (text.position.y * scale).round() as i64;

    for (line_index, line) in text.content.lines().enumerate() {
        let top = origin_y + (line_index * line_stride) as i64;
        for (char_index, ch) in line.chars().enumerate() {
            let left = origin_x + (char_index * cell_w) as i64;
            let bitmap = glyph_bitmap(ch, cell_w, cell_h);
            for gy in 0..cell_h {
                for gx in 0..cell_w {
                    if bitmap[gy * cell_w + gx] != 0 {
                        let px = left + gx as i64;
                        let py = top + gy as i64;
                        if px >= 0 && py >= 0 && (px as u32) < img.width() && (py as u32) < img.height() {
                            blend(img, px as u32, py as u32, color, object.style.opacity);
                        }
                    }
                }
            }
        }
    }
}

/// Position of a pixel along the gradient axis, in `0.0..=1.0`.
fn gradient_offset(pixel_point: Point, start: Point, end: Point, scale: f64) -> f64 {
    let canvas_point = Point::new(pixel_point.x / scale, pixel_point.y / scale);
    let axis = kurbo::Vec2::new(end.x - start.x, end.y - start.y);
    let len_sq = axis.hypot2();
    if len_sq < f64::EPSILON {
        return 0.0;
    }
    let along = kurbo::Vec2::new(canvas_point.x - start.x, canvas_point.y - start.y);
    (along.dot(axis) / len_sq).clamp(0.0, 1.0)
}

fn gradient_color(stops: &[GradientStop], offset: f64) -> Rgba {
    let Some(first) = stops.first() else {
        return Rgba::black();
    };
    let Some(last) = stops.last() else {
        return Rgba::black();
    };
    if offset <= first.offset {
        return first.color;
    }
    if offset >= last.offset {
        return last.color;
    }
    for pair in stops.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        if offset >= a.offset && offset <= b.offset {
            let span = (b.offset - a.offset).max(f64::EPSILON);
            let t = (offset - a.offset) / span;
            return lerp(a.color, b.color, t);
        }
    }
    last.color
}

fn lerp(a: Rgba, b: Rgba, t: f64) -> Rgba {
    let mix = |x: u8, y: u8| (x as f64 + (y as f64 - x as f64) * t).round() as u8;
    Rgba::new(mix(a.r, b.r), mix(a.g, b.g), mix(a.b, b.b), mix(a.a, b.a))
}

fn blend(img: &mut RgbaImage, x: u32, y: u32, color: Rgba, opacity: f64) {
    if x >= img.width() || y >= img.height() {
        return;
    }
    let alpha = (color.a as f64 / 255.0 * opacity).clamp(0.0, 1.0);
    if alpha <= 0.0 {
        return;
    }
    let dst = img.get_pixel_mut(x, y);
    let mix = |src: u8, dst: u8| (src as f64 * alpha + dst as f64 * (1.0 - alpha)).round() as u8;
    dst[0] = mix(color.r, dst[0]);
    dst[1] = mix(color.g, dst[1]);
    dst[2] = mix(color.b, dst[2]);
    dst[3] = (alpha * 255.0 + dst[3] as f64 * (1.0 - alpha)).round() as u8;
}
