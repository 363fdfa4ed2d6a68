//! Error types for raster processing.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ColorError {
    #[error("image decode error: {0}")]
    Decode(#[from] image::ImageError),

    #[error("image encode error: {0}")]
    Encode(String),
}
