//! spotpress Core Library
//!
//! Platform-agnostic design document model for the spotpress print
//! studio: canvas objects with layer roles, bounded undo history, the
//! editor mutation entry point and content-derived design identity.

pub mod document;
pub mod editor;
pub mod error;
pub mod hash;
pub mod history;
pub mod objects;

pub use document::DesignDocument;
pub use editor::{DEFAULT_COALESCE_WINDOW, Editor, EditorCommand};
pub use error::CoreError;
pub use hash::design_hash;
pub use history::{HistoryEntry, HistoryStack, MAX_HISTORY};
pub use objects::{
    CanvasObject, Circle, EmbeddedImage, Fill, GradientStop, Line, ObjectId, ObjectRole,
    ObjectStyle, PathShape, RasterFormat, Rectangle, Rgba, ShapeKind, Star, Text, Triangle,
};
