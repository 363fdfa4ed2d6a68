//! Content-derived design identity.
//!
//! The hash keys the "has this exact design been printed before" lookup,
//! so it must be stable across sessions: object IDs, lock flags and
//! hidden objects are volatile and excluded; what remains is the
//! printable content (visible user objects in z-order plus canvas
//! settings) written in a canonical sorted-key form.

use crate::document::DesignDocument;
use crate::error::CoreError;
use serde_json::Value;
use sha2::{Digest, Sha256};

/// SHA-256 hex digest of the document's printable content.
pub fn design_hash(document: &DesignDocument) -> Result<String, CoreError> {
    let mut objects = Vec::new();
    for object in document.user_objects().filter(|o| o.visible) {
        let mut value = serde_json::to_value(object)?;
        if let Some(map) = value.as_object_mut() {
            map.remove("id");
            map.remove("visible");
            map.remove("locked");
        }
        objects.push(value);
    }
    let value = serde_json::json!({
        "canvas": {
            "width": document.canvas_size.width,
            "height": document.canvas_size.height,
            "background": document.background.hex(),
        },
        "objects": objects,
    });

    let mut canonical = String::new();
    write_canonical(&value, &mut canonical);

    let mut hasher = Sha256::new();
    hasher.update(canonical.as_bytes());
    Ok(hasher.finalize().iter().map(|b| format!("{b:02x}")).collect())
}

/// Write a JSON value with object keys in sorted order. Leaf values use
/// serde_json's own formatting, which is deterministic for identical
/// bit patterns.
fn write_canonical(value: &Value, out: &mut String) {
    match value {
        Value::Object(map) => {
            out.push('{');
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            for (i, key) in keys.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                out.push_str(&Value::String((*key).clone()).to_string());
                out.push(':');
                write_canonical(&map[key.as_str()], out);
            }
            out.push('}');
        }
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_canonical(item, out);
            }
            out.push(']');
        }
        leaf => out.push_str(&leaf.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::objects::{
        CanvasObject, EmbeddedImage, Fill, ObjectStyle, RasterFormat, Rectangle, Rgba, ShapeKind,
        Text,
    };
    use kurbo::{Point, Size};

    fn doc_with_red_rect() -> DesignDocument {
        let mut doc = DesignDocument::new("design", Size::new(400.0, 400.0));
        doc.add(CanvasObject::user_with_style(
            ShapeKind::Rect(Rectangle::new(Point::new(10.0, 10.0), 50.0, 50.0)),
            ObjectStyle::solid(Rgba::opaque(255, 0, 0)),
        ));
        doc
    }

    #[test]
    fn identical_content_yields_identical_hash() {
        // Two documents built independently share no IDs, only content.
        let a = design_hash(&doc_with_red_rect()).unwrap();
        let b = design_hash(&doc_with_red_rect()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn colour_change_changes_hash() {
        let red = doc_with_red_rect();
        let mut blue = doc_with_red_rect();
        let id = blue.z_order()[0];
        blue.get_mut(id).unwrap().style.fill = Fill::Solid(Rgba::opaque(0, 0, 255));

        assert_ne!(design_hash(&red).unwrap(), design_hash(&blue).unwrap());
    }

    #[test]
    fn geometry_change_changes_hash() {
        let base = doc_with_red_rect();
        let mut moved = doc_with_red_rect();
        let id = moved.z_order()[0];
        if let ShapeKind::Rect(rect) = &mut moved.get_mut(id).unwrap().shape {
            rect.position = Point::new(11.0, 10.0);
        }

        assert_ne!(design_hash(&base).unwrap(), design_hash(&moved).unwrap());
    }

    #[test]
    fn text_change_changes_hash() {
        let mut a = DesignDocument::new("design", Size::new(400.0, 400.0));
        a.add(CanvasObject::user(ShapeKind::Text(Text::new(Point::ZERO, "spot"))));
        let mut b = DesignDocument::new("design", Size::new(400.0, 400.0));
        b.add(CanvasObject::user(ShapeKind::Text(Text::new(Point::ZERO, "press"))));

        assert_ne!(design_hash(&a).unwrap(), design_hash(&b).unwrap());
    }

    #[test]
    fn mockup_does_not_affect_hash() {
        let plain = doc_with_red_rect();
        let mut with_mockup = doc_with_red_rect();
        with_mockup.set_mockup(EmbeddedImage::new(
            Point::ZERO,
            &[0u8; 8],
            4,
            4,
            RasterFormat::Png,
        ));

        assert_eq!(design_hash(&plain).unwrap(), design_hash(&with_mockup).unwrap());

        // Toggling mockup visibility is just as irrelevant.
        with_mockup.set_background_visible(false);
        assert_eq!(design_hash(&plain).unwrap(), design_hash(&with_mockup).unwrap());
    }

    #[test]
    fn hidden_objects_are_excluded() {
        let visible_only = doc_with_red_rect();
        let mut with_hidden = doc_with_red_rect();
        let extra = with_hidden.add(CanvasObject::user(ShapeKind::Rect(Rectangle::new(
            Point::new(200.0, 200.0),
            10.0,
            10.0,
        ))));
        with_hidden.get_mut(extra).unwrap().visible = false;

        assert_eq!(
            design_hash(&visible_only).unwrap(),
            design_hash(&with_hidden).unwrap()
        );
    }

    #[test]
    fn hash_survives_serialization_round_trip() {
        let doc = doc_with_red_rect();
        let restored = DesignDocument::from_json(&doc.to_json().unwrap()).unwrap();
        assert_eq!(design_hash(&doc).unwrap(), design_hash(&restored).unwrap());
    }
}
