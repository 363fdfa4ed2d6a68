//! spotpress Colour Library
//!
//! Pixel-level colour analysis for spot-colour (flexographic) printing:
//! dominant-colour extraction over a sampled grid, and posterization of
//! uploaded artwork down to a printable palette.

pub mod analysis;
pub mod error;
pub mod simplify;

pub use analysis::{ColorAnalysis, analyze_image, analyze_rgba};
pub use error::ColorError;
pub use simplify::{SimplifiedImage, simplify_image};
