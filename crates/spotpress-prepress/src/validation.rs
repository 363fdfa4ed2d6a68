//! Print-compliance validation: the authoritative checkout gate.
//!
//! Re-derived fresh on every call; the outcome is never cached across
//! canvas edits. Rejection is expected control flow, not an error.

use serde::{Deserialize, Serialize};
use spotpress_color::analysis::SPOT_COLOR_LIMIT;
use spotpress_color::{ColorAnalysis, analyze_image};
use spotpress_core::{DesignDocument, Fill, Rgba};
use std::collections::BTreeSet;

/// Maximum distinct printable colours in a valid design.
pub const MAX_DESIGN_COLORS: usize = 2;

/// Fill/stroke alpha below which a colour is treated as transparent.
const MIN_COUNTED_ALPHA: u8 = 16;

/// Outcome of one validation pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationOutcome {
    pub is_valid: bool,
    /// Human-readable reason, shown to the customer as-is.
    pub message: String,
    /// Distinct printable colours found.
    pub color_count: usize,
}

impl ValidationOutcome {
    fn rejected(message: impl Into<String>, color_count: usize) -> Self {
        Self {
            is_valid: false,
            message: message.into(),
            color_count,
        }
    }
}

/// Decide whether the design is eligible for spot-colour printing.
///
/// Considers visible user content only; the mockup backdrop is never
/// part of the printed design. Decision order, first match wins:
/// empty canvas, complex embedded image, gradient fill, no printable
/// colour, too many colours.
pub fn validate_design_colors(document: &DesignDocument) -> ValidationOutcome {
    let user_objects: Vec<_> = document.user_objects().filter(|o| o.visible).collect();
    if user_objects.is_empty() {
        return ValidationOutcome::rejected(
            "Add design elements first, then validate your design.",
            0,
        );
    }

    let mut colors: BTreeSet<String> = BTreeSet::new();
    let mut has_gradients = false;
    let mut has_complex_images = false;

    for object in &user_objects {
        if let Some(embedded) = object.shape.as_image() {
            let analysis = match embedded.data() {
                Some(bytes) => analyze_image(&bytes),
                None => ColorAnalysis::neutral(),
            };
            if analysis.color_count > SPOT_COLOR_LIMIT {
                has_complex_images = true;
            } else {
                colors.extend(analysis.dominant_colors.iter().cloned());
            }
            continue;
        }

        match &object.style.fill {
            Fill::Solid(color) => insert_counted(&mut colors, *color),
            Fill::LinearGradient { .. } | Fill::Pattern { .. } => has_gradients = true,
            Fill::None => {}
        }
        if let Some(stroke) = object.style.stroke {
            if object.style.stroke_width > 0.0 {
                insert_counted(&mut colors, stroke);
            }
        }
    }

    if has_complex_images {
        return ValidationOutcome::rejected(
            "Complex images are not allowed: an uploaded image has more than 2 dominant colors. Simplify it first.",
            colors.len(),
        );
    }
    if has_gradients {
        return ValidationOutcome::rejected(
            "Gradients are not allowed for spot-color printing. Use solid colors only.",
            colors.len(),
        );
    }
    if colors.is_empty() {
        return ValidationOutcome::rejected("Add at least one colored element.", 0);
    }
    if colors.len() > MAX_DESIGN_COLORS {
        return ValidationOutcome::rejected(
            format!(
                "Too many colors ({}); a maximum of {MAX_DESIGN_COLORS} is allowed for spot-color printing.",
                colors.len()
            ),
            colors.len(),
        );
    }

    ValidationOutcome {
        is_valid: true,
        message: format!(
            "Design uses {} color{} and is ready for spot-color printing.",
            colors.len(),
            if colors.len() == 1 { "" } else { "s" }
        ),
        color_count: colors.len(),
    }
}

/// White and transparent are the paper, not printable colours.
fn insert_counted(colors: &mut BTreeSet<String>, color: Rgba) {
    if color.a >= MIN_COUNTED_ALPHA && !color.is_near_white() {
        colors.insert(color.hex());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::{Point, Size};
    use spotpress_core::{
        CanvasObject, EmbeddedImage, GradientStop, ObjectStyle, RasterFormat, Rectangle,
        ShapeKind,
    };

    fn document() -> DesignDocument {
        DesignDocument::new("test", Size::new(400.0, 400.0))
    }

    fn filled_rect(color: Rgba) -> CanvasObject {
        CanvasObject::user_with_style(
            ShapeKind::Rect(Rectangle::new(Point::ZERO, 50.0, 50.0)),
            ObjectStyle::solid(color),
        )
    }

    fn png_with_colors(colors: &[[u8; 3]]) -> Vec<u8> {
        // One 2-pixel-wide column per colour, tall enough that every
        // colour clears the dominance threshold.
        let width = (colors.len() * 2) as u32;
        let mut img = image::RgbaImage::new(width, 10);
        for (x, _, pixel) in img.enumerate_pixels_mut() {
            let c = colors[(x / 2) as usize];
            *pixel = image::Rgba([c[0], c[1], c[2], 255]);
        }
        let mut png = Vec::new();
        img.write_to(&mut std::io::Cursor::new(&mut png), image::ImageFormat::Png)
            .unwrap();
        png
    }

    fn embedded(colors: &[[u8; 3]]) -> CanvasObject {
        let png = png_with_colors(colors);
        CanvasObject::user(ShapeKind::Image(EmbeddedImage::new(
            Point::ZERO,
            &png,
            (colors.len() * 2) as u32,
            10,
            RasterFormat::Png,
        )))
    }

    #[test]
    fn empty_canvas_is_rejected() {
        let outcome = validate_design_colors(&document());
        assert!(!outcome.is_valid);
        assert_eq!(outcome.color_count, 0);
        assert!(outcome.message.to_lowercase().contains("add design elements first"));
    }

    #[test]
    fn single_red_rectangle_is_valid() {
        let mut doc = document();
        doc.add(filled_rect(Rgba::opaque(255, 0, 0)));

        let outcome = validate_design_colors(&doc);
        assert!(outcome.is_valid);
        assert_eq!(outcome.color_count, 1);
    }

    #[test]
    fn red_and_blue_is_valid() {
        let mut doc = document();
        doc.add(filled_rect(Rgba::opaque(255, 0, 0)));
        doc.add(filled_rect(Rgba::opaque(0, 0, 255)));

        let outcome = validate_design_colors(&doc);
        assert!(outcome.is_valid);
        assert_eq!(outcome.color_count, 2);
    }

    #[test]
    fn three_colours_are_too_many() {
        let mut doc = document();
        doc.add(filled_rect(Rgba::opaque(255, 0, 0)));
        doc.add(filled_rect(Rgba::opaque(0, 0, 255)));
        doc.add(filled_rect(Rgba::opaque(0, 255, 0)));

        let outcome = validate_design_colors(&doc);
        assert!(!outcome.is_valid);
        assert_eq!(outcome.color_count, 3);
        assert!(outcome.message.to_lowercase().contains("too many colors"));
        assert!(outcome.message.contains('3'));
    }

    #[test]
    fn gradient_fill_is_rejected() {
        let mut doc = document();
        doc.add(CanvasObject::user_with_style(
            ShapeKind::Rect(Rectangle::new(Point::ZERO, 50.0, 50.0)),
            ObjectStyle {
                fill: Fill::LinearGradient {
                    start: Point::ZERO,
                    end: Point::new(50.0, 0.0),
                    stops: vec![
                        GradientStop { offset: 0.0, color: Rgba::black() },
                        GradientStop { offset: 1.0, color: Rgba::opaque(255, 0, 0) },
                    ],
                },
                ..ObjectStyle::default()
            },
        ));

        let outcome = validate_design_colors(&doc);
        assert!(!outcome.is_valid);
        assert!(outcome.message.to_lowercase().contains("gradients"));
    }

    #[test]
    fn complex_image_is_rejected() {
        let mut doc = document();
        doc.add(embedded(&[
            [255, 0, 0],
            [0, 255, 0],
            [0, 0, 255],
            [255, 255, 0],
            [255, 0, 255],
        ]));

        let outcome = validate_design_colors(&doc);
        assert!(!outcome.is_valid);
        assert!(outcome.message.to_lowercase().contains("complex images"));
    }

    #[test]
    fn simple_image_colours_merge_into_the_set() {
        let mut doc = document();
        doc.add(embedded(&[[255, 0, 0]]));
        doc.add(filled_rect(Rgba::opaque(0, 0, 255)));

        let outcome = validate_design_colors(&doc);
        assert!(outcome.is_valid);
        assert_eq!(outcome.color_count, 2);
    }

    #[test]
    fn image_colour_matching_shape_colour_is_one_colour() {
        let mut doc = document();
        doc.add(embedded(&[[255, 0, 0]]));
        doc.add(filled_rect(Rgba::opaque(255, 0, 0)));

        let outcome = validate_design_colors(&doc);
        assert!(outcome.is_valid);
        assert_eq!(outcome.color_count, 1);
    }

    #[test]
    fn white_shapes_do_not_count() {
        let mut doc = document();
        doc.add(filled_rect(Rgba::white()));

        let outcome = validate_design_colors(&doc);
        assert!(!outcome.is_valid);
        assert_eq!(outcome.color_count, 0);
        assert!(outcome.message.to_lowercase().contains("colored element"));
    }

    #[test]
    fn hidden_objects_are_ignored() {
        let mut doc = document();
        let id = doc.add(filled_rect(Rgba::opaque(0, 255, 0)));
        doc.get_mut(id).unwrap().visible = false;
        doc.add(filled_rect(Rgba::opaque(255, 0, 0)));
        doc.add(filled_rect(Rgba::opaque(0, 0, 255)));

        let outcome = validate_design_colors(&doc);
        assert!(outcome.is_valid);
        assert_eq!(outcome.color_count, 2);
    }

    #[test]
    fn mockup_is_excluded() {
        let mut doc = document();
        let png = png_with_colors(&[[255, 0, 0], [0, 255, 0], [0, 0, 255]]);
        doc.set_mockup(EmbeddedImage::new(Point::ZERO, &png, 6, 10, RasterFormat::Png));
        doc.add(filled_rect(Rgba::opaque(255, 0, 0)));

        let outcome = validate_design_colors(&doc);
        assert!(outcome.is_valid);
        assert_eq!(outcome.color_count, 1);
    }

    #[test]
    fn stroke_colours_count() {
        let mut doc = document();
        doc.add(CanvasObject::user_with_style(
            ShapeKind::Rect(Rectangle::new(Point::ZERO, 50.0, 50.0)),
            ObjectStyle {
                fill: Fill::Solid(Rgba::opaque(255, 0, 0)),
                stroke: Some(Rgba::opaque(0, 0, 255)),
                stroke_width: 2.0,
                opacity: 1.0,
            },
        ));
        doc.add(filled_rect(Rgba::opaque(0, 255, 0)));

        let outcome = validate_design_colors(&doc);
        assert!(!outcome.is_valid);
        assert_eq!(outcome.color_count, 3);
    }
}
