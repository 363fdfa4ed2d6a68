//! PNG and data-URI export of rendered previews.

use base64::{Engine, engine::general_purpose::STANDARD};
use image::RgbaImage;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("PNG encode error: {0}")]
    Encode(String),
}

/// Encode a rendered buffer as PNG bytes.
pub fn encode_png(img: &RgbaImage) -> Result<Vec<u8>, RenderError> {
    let mut png = Vec::new();
    img.write_to(&mut std::io::Cursor::new(&mut png), image::ImageFormat::Png)
        .map_err(|err| RenderError::Encode(err.to_string()))?;
    Ok(png)
}

/// Encode a rendered buffer as a `data:image/png;base64,...` URI, the
/// form the cart line item carries.
pub fn to_data_uri(img: &RgbaImage) -> Result<String, RenderError> {
    let png = encode_png(img)?;
    Ok(format!("data:image/png;base64,{}", STANDARD.encode(png)))
}
