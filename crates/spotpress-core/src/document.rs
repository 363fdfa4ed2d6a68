//! Design document: objects, z-order and the layer-role invariant.

use crate::objects::{CanvasObject, EmbeddedImage, ObjectId, ObjectRole, Rgba};
use kurbo::{Affine, Size, Vec2};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// Offset applied to duplicated objects so the copy is visible.
const DUPLICATE_OFFSET: f64 = 16.0;

/// A design document containing all canvas objects.
///
/// Object storage is private: every mutation path re-establishes the
/// layer invariant (all `Background` objects below all `UserContent`
/// objects, relative order preserved within each band).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DesignDocument {
    /// Unique document identifier.
    pub id: String,
    /// Document name.
    pub name: String,
    /// Canvas dimensions in canvas units.
    pub canvas_size: Size,
    /// Canvas background colour (the paper).
    pub background: Rgba,
    /// All objects, keyed by ID.
    objects: HashMap<ObjectId, CanvasObject>,
    /// Z-order of objects (back to front).
    z_order: Vec<ObjectId>,
}

impl DesignDocument {
    pub fn new(name: impl Into<String>, canvas_size: Size) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            canvas_size,
            background: Rgba::white(),
            objects: HashMap::new(),
            z_order: Vec::new(),
        }
    }

    /// Add an object at the top of its role band. Returns its ID.
    pub fn add(&mut self, object: CanvasObject) -> ObjectId {
        let id = object.id();
        let index = match object.role() {
            ObjectRole::Background => self.background_count(),
            ObjectRole::UserContent => self.z_order.len(),
        };
        self.z_order.insert(index, id);
        self.objects.insert(id, object);
        id
    }

    /// Install a product mockup as the backdrop. Any previous background
    /// objects are removed first; only one mockup is active at a time.
    pub fn set_mockup(&mut self, image: EmbeddedImage) -> ObjectId {
        let stale: Vec<ObjectId> = self
            .z_order
            .iter()
            .filter(|id| self.objects.get(id).is_some_and(|o| o.is_background()))
            .copied()
            .collect();
        if !stale.is_empty() {
            log::debug!("replacing {} stale background object(s)", stale.len());
        }
        for id in stale {
            self.remove(id);
        }
        let mockup = CanvasObject::mockup(image);
        let id = mockup.id();
        self.z_order.insert(0, id);
        self.objects.insert(id, mockup);
        id
    }

    pub fn remove(&mut self, id: ObjectId) -> Option<CanvasObject> {
        self.z_order.retain(|&other| other != id);
        self.objects.remove(&id)
    }

    /// Duplicate a user-content object, placing the copy directly above
    /// the original. Locked and background objects are not duplicated.
    pub fn duplicate(&mut self, id: ObjectId) -> Option<ObjectId> {
        let source = self.objects.get(&id)?;
        if source.locked || source.is_background() {
            return None;
        }
        let mut copy = source.clone();
        copy.regenerate_id();
        copy.shape
            .transform(Affine::translate(Vec2::new(DUPLICATE_OFFSET, DUPLICATE_OFFSET)));
        let copy_id = copy.id();
        let position = self.z_order.iter().position(|&other| other == id)?;
        self.z_order.insert(position + 1, copy_id);
        self.objects.insert(copy_id, copy);
        Some(copy_id)
    }

    pub fn get(&self, id: ObjectId) -> Option<&CanvasObject> {
        self.objects.get(&id)
    }

    pub fn get_mut(&mut self, id: ObjectId) -> Option<&mut CanvasObject> {
        self.objects.get_mut(&id)
    }

    pub fn contains(&self, id: ObjectId) -> bool {
        self.objects.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Objects in z-order (back to front).
    pub fn objects_ordered(&self) -> impl Iterator<Item = &CanvasObject> {
        self.z_order.iter().filter_map(|id| self.objects.get(id))
    }

    /// User-content objects in z-order.
    pub fn user_objects(&self) -> impl Iterator<Item = &CanvasObject> {
        self.objects_ordered().filter(|o| o.is_user_content())
    }

    /// Background objects in z-order.
    pub fn background_objects(&self) -> impl Iterator<Item = &CanvasObject> {
        self.objects_ordered().filter(|o| o.is_background())
    }

    /// Z-order positions as IDs (back to front).
    pub fn z_order(&self) -> &[ObjectId] {
        &self.z_order
    }

    fn background_count(&self) -> usize {
        self.z_order
            .iter()
            .filter(|id| self.objects.get(id).is_some_and(|o| o.is_background()))
            .count()
    }

    /// Re-establish the layer invariant: every background index precedes
    /// every user-content index, relative order preserved within each
    /// band. Idempotent. Dangling IDs are dropped.
    pub fn enforce_layer_order(&mut self) {
        let mut backgrounds = Vec::new();
        let mut user_content = Vec::new();
        for &id in &self.z_order {
            match self.objects.get(&id) {
                Some(o) if o.is_background() => backgrounds.push(id),
                Some(_) => user_content.push(id),
                None => {}
            }
        }
        backgrounds.extend(user_content);
        self.z_order = backgrounds;
    }

    /// Index range `[start, end)` of the band the object belongs to.
    fn band_range(&self, id: ObjectId) -> Option<(usize, usize)> {
        let role = self.objects.get(&id)?.role();
        let boundary = self.background_count();
        match role {
            ObjectRole::Background => Some((0, boundary)),
            ObjectRole::UserContent => Some((boundary, self.z_order.len())),
        }
    }

    /// Move one step toward the front, never leaving the role band.
    /// Returns false when already at the top of the band.
    pub fn bring_forward(&mut self, id: ObjectId) -> bool {
        let Some((_, end)) = self.band_range(id) else {
            return false;
        };
        if let Some(position) = self.z_order.iter().position(|&other| other == id) {
            if position + 1 < end {
                self.z_order.swap(position, position + 1);
                return true;
            }
        }
        false
    }

    /// Move one step toward the back, never leaving the role band.
    pub fn send_backward(&mut self, id: ObjectId) -> bool {
        let Some((start, _)) = self.band_range(id) else {
            return false;
        };
        if let Some(position) = self.z_order.iter().position(|&other| other == id) {
            if position > start {
                self.z_order.swap(position, position - 1);
                return true;
            }
        }
        false
    }

    /// Move to the top of the object's role band.
    pub fn bring_to_front(&mut self, id: ObjectId) -> bool {
        let Some((_, end)) = self.band_range(id) else {
            return false;
        };
        let Some(position) = self.z_order.iter().position(|&other| other == id) else {
            return false;
        };
        self.z_order.remove(position);
        self.z_order.insert(end - 1, id);
        true
    }

    /// Move to the bottom of the object's role band.
    pub fn send_to_back(&mut self, id: ObjectId) -> bool {
        let Some((start, _)) = self.band_range(id) else {
            return false;
        };
        let Some(position) = self.z_order.iter().position(|&other| other == id) else {
            return false;
        };
        self.z_order.remove(position);
        self.z_order.insert(start, id);
        true
    }

    /// Flip the visible flag on every background object. Ordering is
    /// untouched.
    pub fn set_background_visible(&mut self, visible: bool) {
        for object in self.objects.values_mut() {
            if object.is_background() {
                object.visible = visible;
            }
        }
    }

    /// Remove all user content, keeping the mockup.
    pub fn clear_user_content(&mut self) {
        let doomed: Vec<ObjectId> = self
            .z_order
            .iter()
            .filter(|id| self.objects.get(id).is_some_and(|o| o.is_user_content()))
            .copied()
            .collect();
        for id in doomed {
            self.remove(id);
        }
    }

    /// Remove everything, mockup included.
    pub fn clear(&mut self) {
        self.objects.clear();
        self.z_order.clear();
    }

    /// Serialize the document to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserialize a document from JSON. The layer invariant is
    /// re-established on load.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let mut document: Self = serde_json::from_str(json)?;
        document.enforce_layer_order();
        Ok(document)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::objects::{RasterFormat, Rectangle, ShapeKind};
    use kurbo::Point;

    fn rect_object() -> CanvasObject {
        CanvasObject::user(ShapeKind::Rect(Rectangle::new(Point::ZERO, 100.0, 100.0)))
    }

    fn mockup_image() -> EmbeddedImage {
        EmbeddedImage::new(Point::ZERO, &[0u8; 8], 4, 4, RasterFormat::Png)
    }

    fn assert_invariant(doc: &DesignDocument) {
        let roles: Vec<bool> = doc.objects_ordered().map(|o| o.is_background()).collect();
        let first_user = roles.iter().position(|&bg| !bg).unwrap_or(roles.len());
        assert!(
            roles[first_user..].iter().all(|&bg| !bg),
            "background object above user content: {roles:?}"
        );
    }

    #[test]
    fn add_places_objects_in_role_bands() {
        let mut doc = DesignDocument::new("test", Size::new(400.0, 400.0));
        let user = doc.add(rect_object());
        let mockup = doc.set_mockup(mockup_image());

        // Mockup added later still sits below the earlier user object.
        assert_eq!(doc.z_order(), &[mockup, user]);
        assert_invariant(&doc);
    }

    #[test]
    fn single_mockup_rule() {
        let mut doc = DesignDocument::new("test", Size::new(400.0, 400.0));
        let first = doc.set_mockup(mockup_image());
        let second = doc.set_mockup(mockup_image());

        assert!(!doc.contains(first));
        assert!(doc.contains(second));
        assert_eq!(doc.background_objects().count(), 1);
    }

    #[test]
    fn enforce_layer_order_is_idempotent() {
        let mut doc = DesignDocument::new("test", Size::new(400.0, 400.0));
        doc.set_mockup(mockup_image());
        doc.add(rect_object());
        doc.add(rect_object());

        doc.enforce_layer_order();
        let once = doc.z_order().to_vec();
        doc.enforce_layer_order();
        assert_eq!(doc.z_order(), once.as_slice());
        assert_invariant(&doc);
    }

    #[test]
    fn reorder_stays_within_band() {
        let mut doc = DesignDocument::new("test", Size::new(400.0, 400.0));
        let mockup = doc.set_mockup(mockup_image());
        let a = doc.add(rect_object());
        let b = doc.add(rect_object());

        // b is on top; sending it backward swaps with a but never crosses
        // below the mockup.
        assert!(doc.send_backward(b));
        assert_eq!(doc.z_order(), &[mockup, b, a]);
        assert!(!doc.send_backward(b));
        assert_eq!(doc.z_order(), &[mockup, b, a]);

        assert!(doc.bring_to_front(b));
        assert_eq!(doc.z_order(), &[mockup, a, b]);
        assert!(doc.send_to_back(b));
        assert_eq!(doc.z_order(), &[mockup, b, a]);
        assert_invariant(&doc);
    }

    #[test]
    fn mockup_reorder_is_a_no_op() {
        let mut doc = DesignDocument::new("test", Size::new(400.0, 400.0));
        let mockup = doc.set_mockup(mockup_image());
        doc.add(rect_object());

        assert!(!doc.bring_forward(mockup));
        assert!(!doc.send_backward(mockup));
        assert_invariant(&doc);
    }

    #[test]
    fn duplicate_lands_above_source() {
        let mut doc = DesignDocument::new("test", Size::new(400.0, 400.0));
        let a = doc.add(rect_object());
        let b = doc.add(rect_object());

        let copy = doc.duplicate(a).unwrap();
        assert_eq!(doc.z_order(), &[a, copy, b]);

        let source_bounds = doc.get(a).unwrap().bounds();
        let copy_bounds = doc.get(copy).unwrap().bounds();
        assert!((copy_bounds.x0 - source_bounds.x0 - DUPLICATE_OFFSET).abs() < 1e-9);
    }

    #[test]
    fn duplicate_rejects_mockup() {
        let mut doc = DesignDocument::new("test", Size::new(400.0, 400.0));
        let mockup = doc.set_mockup(mockup_image());
        assert!(doc.duplicate(mockup).is_none());
    }

    #[test]
    fn background_visibility_toggle_keeps_order() {
        let mut doc = DesignDocument::new("test", Size::new(400.0, 400.0));
        let mockup = doc.set_mockup(mockup_image());
        let user = doc.add(rect_object());

        doc.set_background_visible(false);
        assert!(!doc.get(mockup).unwrap().visible);
        assert!(doc.get(user).unwrap().visible);
        assert_eq!(doc.z_order(), &[mockup, user]);
    }

    #[test]
    fn clear_user_content_keeps_mockup() {
        let mut doc = DesignDocument::new("test", Size::new(400.0, 400.0));
        let mockup = doc.set_mockup(mockup_image());
        doc.add(rect_object());
        doc.add(rect_object());

        doc.clear_user_content();
        assert_eq!(doc.len(), 1);
        assert!(doc.contains(mockup));
    }

    #[test]
    fn json_round_trip_preserves_structure() {
        let mut doc = DesignDocument::new("round-trip", Size::new(400.0, 400.0));
        doc.set_mockup(mockup_image());
        doc.add(rect_object());

        let json = doc.to_json().unwrap();
        let restored = DesignDocument::from_json(&json).unwrap();

        assert_eq!(restored.id, doc.id);
        assert_eq!(restored.len(), doc.len());
        assert_eq!(restored.z_order(), doc.z_order());

        // Re-serializing yields structurally equivalent data.
        let restored_json = restored.to_json().unwrap();
        let a: serde_json::Value = serde_json::from_str(&json).unwrap();
        let b: serde_json::Value = serde_json::from_str(&restored_json).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn random_operation_sequences_hold_invariant() {
        let mut doc = DesignDocument::new("fuzz", Size::new(400.0, 400.0));
        let mut ids = Vec::new();
        for step in 0..40usize {
            match step % 5 {
                0 => ids.push(doc.add(rect_object())),
                1 => {
                    doc.set_mockup(mockup_image());
                }
                2 => {
                    if let Some(&id) = ids.get(step % ids.len().max(1)) {
                        doc.bring_forward(id);
                    }
                }
                3 => {
                    if let Some(&id) = ids.get(step % ids.len().max(1)) {
                        doc.send_to_back(id);
                    }
                }
                _ => {
                    if let Some(&id) = ids.first() {
                        doc.duplicate(id);
                    }
                }
            }
            assert_invariant(&doc);
        }
    }
}
