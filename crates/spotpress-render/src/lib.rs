//! spotpress Render Library
//!
//! Software rasterizer for design previews: documents are painted in
//! z-order onto an RGBA buffer and exported as PNG bytes or a
//! `data:` URI for cart line items. No GPU and no font assets: text is
//! drawn from embedded PSF2 bitmap fonts.

pub mod export;
pub mod renderer;
mod text;

pub use export::{RenderError, encode_png, to_data_uri};
pub use renderer::{PREVIEW_MAX_DIM, render_preview};
