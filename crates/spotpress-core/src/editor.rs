//! Editor session: the single mutation entry point.
//!
//! Every change to the document goes through [`Editor::apply`], which
//! runs the mutation, re-establishes the layer invariant, prunes stale
//! selection and records exactly one history checkpoint. Rapid
//! successive applies inside the coalescing window collapse into a
//! single checkpoint, so dragging an object does not flood the history.

use crate::document::DesignDocument;
use crate::error::CoreError;
use crate::history::HistoryStack;
use crate::objects::{CanvasObject, EmbeddedImage, Fill, ObjectId, Rgba};
use kurbo::{Affine, Vec2};
use std::time::{Duration, Instant};

/// Window inside which successive mutations coalesce into one
/// history entry.
pub const DEFAULT_COALESCE_WINDOW: Duration = Duration::from_millis(300);

/// A mutation request against the document.
#[derive(Debug, Clone)]
pub enum EditorCommand {
    /// Add a user-content object.
    Add(CanvasObject),
    /// Install a product mockup as the locked backdrop.
    SetMockup(EmbeddedImage),
    Remove(ObjectId),
    Duplicate(ObjectId),
    SetFill { id: ObjectId, fill: Fill },
    SetStroke { id: ObjectId, stroke: Option<Rgba>, width: f64 },
    SetOpacity { id: ObjectId, opacity: f64 },
    SetText { id: ObjectId, content: String },
    Translate { id: ObjectId, dx: f64, dy: f64 },
    /// Scale about the object's bounds origin.
    Scale { id: ObjectId, sx: f64, sy: f64 },
    SetRotation { id: ObjectId, radians: f64 },
    BringForward(ObjectId),
    SendBackward(ObjectId),
    BringToFront(ObjectId),
    SendToBack(ObjectId),
    SetVisible { id: ObjectId, visible: bool },
    SetBackgroundVisible(bool),
    ClearUserContent,
    Clear,
    SetCanvasBackground(Rgba),
}

/// An in-memory editing session over one document.
#[derive(Debug)]
pub struct Editor {
    document: DesignDocument,
    history: HistoryStack,
    selection: Vec<ObjectId>,
    coalesce_window: Duration,
    last_checkpoint: Option<Instant>,
}

impl Editor {
    /// Open a session on a document. The initial state becomes the
    /// baseline history entry, so undo always has a floor to land on.
    pub fn new(mut document: DesignDocument) -> Result<Self, CoreError> {
        document.enforce_layer_order();
        let mut history = HistoryStack::new();
        history.push(document.to_json()?);
        Ok(Self {
            document,
            history,
            selection: Vec::new(),
            coalesce_window: DEFAULT_COALESCE_WINDOW,
            last_checkpoint: None,
        })
    }

    /// Override the coalescing window (zero disables coalescing).
    pub fn with_coalesce_window(mut self, window: Duration) -> Self {
        self.coalesce_window = window;
        self
    }

    pub fn document(&self) -> &DesignDocument {
        &self.document
    }

    pub fn history(&self) -> &HistoryStack {
        &self.history
    }

    pub fn selection(&self) -> &[ObjectId] {
        &self.selection
    }

    /// Select an object. Locked and background objects are not
    /// selectable; returns false for those.
    pub fn select(&mut self, id: ObjectId) -> bool {
        match self.document.get(id) {
            Some(object) if !object.locked && object.is_user_content() => {
                self.selection.clear();
                self.selection.push(id);
                true
            }
            _ => false,
        }
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    /// Apply a command: mutate, enforce the layer invariant, prune
    /// selection, checkpoint once.
    pub fn apply(&mut self, command: EditorCommand) -> Result<(), CoreError> {
        self.execute(command)?;
        self.document.enforce_layer_order();
        let document = &self.document;
        self.selection.retain(|&id| document.contains(id));
        self.checkpoint()
    }

    fn execute(&mut self, command: EditorCommand) -> Result<(), CoreError> {
        match command {
            EditorCommand::Add(object) => {
                self.document.add(object);
            }
            EditorCommand::SetMockup(image) => {
                self.document.set_mockup(image);
            }
            EditorCommand::Remove(id) => {
                self.editable(id)?;
                self.document.remove(id);
            }
            EditorCommand::Duplicate(id) => {
                if self.document.duplicate(id).is_none() {
                    return Err(match self.document.get(id) {
                        Some(_) => CoreError::ObjectLocked(id),
                        None => CoreError::UnknownObject(id),
                    });
                }
            }
            EditorCommand::SetFill { id, fill } => {
                self.editable(id)?.style.fill = fill;
            }
            EditorCommand::SetStroke { id, stroke, width } => {
                let object = self.editable(id)?;
                object.style.stroke = stroke;
                object.style.stroke_width = width;
            }
            EditorCommand::SetOpacity { id, opacity } => {
                self.editable(id)?.style.opacity = opacity.clamp(0.0, 1.0);
            }
            EditorCommand::SetText { id, content } => {
                let object = self.editable(id)?;
                match object.shape.as_text_mut() {
                    Some(text) => text.content = content,
                    None => return Err(CoreError::WrongKind { id, expected: "text" }),
                }
            }
            EditorCommand::Translate { id, dx, dy } => {
                self.editable(id)?
                    .shape
                    .transform(Affine::translate(Vec2::new(dx, dy)));
            }
            EditorCommand::Scale { id, sx, sy } => {
                let object = self.editable(id)?;
                let origin = object.shape.bounds().origin();
                let affine = Affine::translate(origin.to_vec2())
                    * Affine::scale_non_uniform(sx, sy)
                    * Affine::translate(-origin.to_vec2());
                object.shape.transform(affine);
            }
            EditorCommand::SetRotation { id, radians } => {
                self.editable(id)?.shape.set_rotation(radians);
            }
            EditorCommand::BringForward(id) => {
                self.known(id)?;
                self.document.bring_forward(id);
            }
            EditorCommand::SendBackward(id) => {
                self.known(id)?;
                self.document.send_backward(id);
            }
            EditorCommand::BringToFront(id) => {
                self.known(id)?;
                self.document.bring_to_front(id);
            }
            EditorCommand::SendToBack(id) => {
                self.known(id)?;
                self.document.send_to_back(id);
            }
            EditorCommand::SetVisible { id, visible } => {
                match self.document.get_mut(id) {
                    Some(object) => object.visible = visible,
                    None => return Err(CoreError::UnknownObject(id)),
                }
            }
            EditorCommand::SetBackgroundVisible(visible) => {
                self.document.set_background_visible(visible);
            }
            EditorCommand::ClearUserContent => {
                self.document.clear_user_content();
            }
            EditorCommand::Clear => {
                self.document.clear();
            }
            EditorCommand::SetCanvasBackground(color) => {
                self.document.background = color;
            }
        }
        Ok(())
    }

    fn known(&self, id: ObjectId) -> Result<(), CoreError> {
        if self.document.contains(id) {
            Ok(())
        } else {
            Err(CoreError::UnknownObject(id))
        }
    }

    /// Mutable access for content edits; locked objects are rejected.
    fn editable(&mut self, id: ObjectId) -> Result<&mut CanvasObject, CoreError> {
        match self.document.get_mut(id) {
            Some(object) if object.locked => Err(CoreError::ObjectLocked(id)),
            Some(object) => Ok(object),
            None => Err(CoreError::UnknownObject(id)),
        }
    }

    fn checkpoint(&mut self) -> Result<(), CoreError> {
        let state = self.document.to_json()?;
        let coalesce = self
            .last_checkpoint
            .is_some_and(|at| at.elapsed() < self.coalesce_window);
        if coalesce && !self.history.can_redo() {
            self.history.replace_current(state);
        } else {
            self.history.push(state);
        }
        self.last_checkpoint = Some(Instant::now());
        Ok(())
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Step back one checkpoint. Returns false when at the baseline.
    pub fn undo(&mut self) -> Result<bool, CoreError> {
        let Some(state) = self.history.undo().map(str::to_owned) else {
            return Ok(false);
        };
        self.restore(&state)?;
        Ok(true)
    }

    /// Step forward one checkpoint. Returns false when at the head.
    pub fn redo(&mut self) -> Result<bool, CoreError> {
        let Some(state) = self.history.redo().map(str::to_owned) else {
            return Ok(false);
        };
        self.restore(&state)?;
        Ok(true)
    }

    fn restore(&mut self, state: &str) -> Result<(), CoreError> {
        self.document = DesignDocument::from_json(state)?;
        let document = &self.document;
        self.selection.retain(|&id| document.contains(id));
        // A fresh mutation after undo/redo must start a new entry.
        self.last_checkpoint = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::objects::{RasterFormat, Rectangle, ShapeKind};
    use kurbo::{Point, Size};

    fn editor() -> Editor {
        let document = DesignDocument::new("test", Size::new(400.0, 400.0));
        Editor::new(document)
            .unwrap()
            .with_coalesce_window(Duration::ZERO)
    }

    fn rect_object() -> CanvasObject {
        CanvasObject::user(ShapeKind::Rect(Rectangle::new(Point::ZERO, 100.0, 100.0)))
    }

    fn mockup_image() -> EmbeddedImage {
        EmbeddedImage::new(Point::ZERO, &[0u8; 8], 4, 4, RasterFormat::Png)
    }

    #[test]
    fn apply_checkpoints_once() {
        let mut editor = editor();
        assert_eq!(editor.history().len(), 1);
        editor.apply(EditorCommand::Add(rect_object())).unwrap();
        assert_eq!(editor.history().len(), 2);
    }

    #[test]
    fn burst_coalesces_into_one_entry() {
        let document = DesignDocument::new("test", Size::new(400.0, 400.0));
        let mut editor = Editor::new(document)
            .unwrap()
            .with_coalesce_window(Duration::from_secs(60));

        let object = rect_object();
        let id = object.id();
        editor.apply(EditorCommand::Add(object)).unwrap();
        for _ in 0..10 {
            editor
                .apply(EditorCommand::Translate { id, dx: 1.0, dy: 0.0 })
                .unwrap();
        }
        // Baseline + one coalesced entry for the whole burst.
        assert_eq!(editor.history().len(), 2);

        // Undo lands on the empty baseline, not a mid-drag state.
        assert!(editor.undo().unwrap());
        assert!(editor.document().is_empty());
    }

    #[test]
    fn undo_redo_round_trip() {
        let mut editor = editor();
        let object = rect_object();
        let id = object.id();
        editor.apply(EditorCommand::Add(object)).unwrap();
        editor
            .apply(EditorCommand::SetFill { id, fill: Fill::Solid(Rgba::opaque(255, 0, 0)) })
            .unwrap();

        assert!(editor.undo().unwrap());
        let fill = editor.document().get(id).unwrap().style.fill.clone();
        assert_eq!(fill, Fill::Solid(Rgba::black()));

        assert!(editor.redo().unwrap());
        let fill = editor.document().get(id).unwrap().style.fill.clone();
        assert_eq!(fill, Fill::Solid(Rgba::opaque(255, 0, 0)));
    }

    #[test]
    fn undo_restores_layer_invariant() {
        let mut editor = editor();
        editor.apply(EditorCommand::Add(rect_object())).unwrap();
        editor.apply(EditorCommand::SetMockup(mockup_image())).unwrap();

        assert!(editor.undo().unwrap());
        assert!(editor.redo().unwrap());

        let roles: Vec<bool> = editor
            .document()
            .objects_ordered()
            .map(|o| o.is_background())
            .collect();
        assert_eq!(roles, vec![true, false]);
    }

    #[test]
    fn mockup_rejects_content_edits() {
        let mut editor = editor();
        editor.apply(EditorCommand::SetMockup(mockup_image())).unwrap();
        let mockup_id = editor.document().z_order()[0];

        let result = editor.apply(EditorCommand::SetFill {
            id: mockup_id,
            fill: Fill::Solid(Rgba::black()),
        });
        assert!(matches!(result, Err(CoreError::ObjectLocked(_))));

        let result = editor.apply(EditorCommand::Remove(mockup_id));
        assert!(matches!(result, Err(CoreError::ObjectLocked(_))));
    }

    #[test]
    fn set_text_on_non_text_is_rejected() {
        let mut editor = editor();
        let object = rect_object();
        let id = object.id();
        editor.apply(EditorCommand::Add(object)).unwrap();

        let result = editor.apply(EditorCommand::SetText { id, content: "hi".into() });
        assert!(matches!(result, Err(CoreError::WrongKind { .. })));
    }

    #[test]
    fn selection_pruned_after_remove() {
        let mut editor = editor();
        let object = rect_object();
        let id = object.id();
        editor.apply(EditorCommand::Add(object)).unwrap();

        assert!(editor.select(id));
        editor.apply(EditorCommand::Remove(id)).unwrap();
        assert!(editor.selection().is_empty());
    }

    #[test]
    fn mockup_is_not_selectable() {
        let mut editor = editor();
        editor.apply(EditorCommand::SetMockup(mockup_image())).unwrap();
        let mockup_id = editor.document().z_order()[0];
        assert!(!editor.select(mockup_id));
    }

    #[test]
    fn unknown_object_reports_error() {
        let mut editor = editor();
        let ghost = uuid::Uuid::new_v4();
        let result = editor.apply(EditorCommand::Translate { id: ghost, dx: 1.0, dy: 1.0 });
        assert!(matches!(result, Err(CoreError::UnknownObject(_))));
    }
}
