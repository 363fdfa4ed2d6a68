//! Error types for the prepress crate.

use thiserror::Error;

/// Faults in the checkout pipeline. Validation rejection is not here;
/// it is an expected outcome, carried as a value.
#[derive(Debug, Error)]
pub enum PrepressError {
    #[error(transparent)]
    Core(#[from] spotpress_core::CoreError),

    #[error(transparent)]
    Render(#[from] spotpress_render::RenderError),
}
