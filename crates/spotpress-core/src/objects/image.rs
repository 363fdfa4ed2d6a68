//! Embedded raster image shape.

use super::Geometry;
use kurbo::{Affine, BezPath, Point, Rect, Shape as KurboShape};
use serde::{Deserialize, Serialize};

/// Encodings accepted for embedded image payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RasterFormat {
    Png,
    Jpeg,
    WebP,
}

impl RasterFormat {
    pub fn mime_type(&self) -> &'static str {
        match self {
            RasterFormat::Png => "image/png",
            RasterFormat::Jpeg => "image/jpeg",
            RasterFormat::WebP => "image/webp",
        }
    }

    /// Detect format from magic bytes.
    pub fn from_magic_bytes(data: &[u8]) -> Option<Self> {
        if data.starts_with(&[0x89, 0x50, 0x4E, 0x47]) {
            return Some(RasterFormat::Png);
        }
        if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
            return Some(RasterFormat::Jpeg);
        }
        if data.len() >= 12 && &data[0..4] == b"RIFF" && &data[8..12] == b"WEBP" {
            return Some(RasterFormat::WebP);
        }
        None
    }
}

/// A raster image placed on the canvas. The payload is stored
/// base64-encoded so documents serialize to plain JSON.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddedImage {
    /// Top-left corner position.
    pub position: Point,
    /// Display width in canvas units.
    pub width: f64,
    /// Display height in canvas units.
    pub height: f64,
    /// Source image width in pixels.
    pub source_width: u32,
    /// Source image height in pixels.
    pub source_height: u32,
    pub format: RasterFormat,
    pub data_base64: String,
    #[serde(default)]
    pub rotation: f64,
}

impl EmbeddedImage {
    pub fn new(
        position: Point,
        data: &[u8],
        source_width: u32,
        source_height: u32,
        format: RasterFormat,
    ) -> Self {
        use base64::{Engine, engine::general_purpose::STANDARD};

        Self {
            position,
            width: source_width as f64,
            height: source_height as f64,
            source_width,
            source_height,
            format,
            data_base64: STANDARD.encode(data),
            rotation: 0.0,
        }
    }

    pub fn with_size(mut self, width: f64, height: f64) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Scale to fit inside a box, preserving aspect ratio.
    pub fn fit_within(mut self, max_width: f64, max_height: f64) -> Self {
        let aspect = self.source_width as f64 / self.source_height as f64;
        if aspect > max_width / max_height {
            self.width = max_width;
            self.height = max_width / aspect;
        } else {
            self.height = max_height;
            self.width = max_height * aspect;
        }
        self
    }

    /// Decode the base64 payload back into raw bytes.
    pub fn data(&self) -> Option<Vec<u8>> {
        use base64::{Engine, engine::general_purpose::STANDARD};
        STANDARD.decode(&self.data_base64).ok()
    }

    pub fn as_rect(&self) -> Rect {
        Rect::new(
            self.position.x,
            self.position.y,
            self.position.x + self.width,
            self.position.y + self.height,
        )
    }
}

impl Geometry for EmbeddedImage {
    fn bounds(&self) -> Rect {
        self.as_rect()
    }

    fn to_path(&self) -> BezPath {
        self.as_rect().to_path(0.1)
    }

    fn transform(&mut self, affine: Affine) {
        self.position = affine * self.position;
        let coeffs = affine.as_coeffs();
        self.width *= coeffs[0].abs();
        self.height *= coeffs[3].abs();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn magic_byte_sniffing() {
        assert_eq!(
            RasterFormat::from_magic_bytes(&[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A]),
            Some(RasterFormat::Png)
        );
        assert_eq!(
            RasterFormat::from_magic_bytes(&[0xFF, 0xD8, 0xFF, 0xE0]),
            Some(RasterFormat::Jpeg)
        );
        assert_eq!(RasterFormat::from_magic_bytes(b"RIFF0000WEBP"), Some(RasterFormat::WebP));
        assert_eq!(RasterFormat::from_magic_bytes(b"GIF89a"), None);
    }

    #[test]
    fn fit_within_preserves_aspect() {
        let data = vec![0u8; 10];
        let img = EmbeddedImage::new(Point::ZERO, &data, 1000, 500, RasterFormat::Png);
        let fitted = img.fit_within(400.0, 400.0);
        assert!((fitted.width - 400.0).abs() < 0.01);
        assert!((fitted.height - 200.0).abs() < 0.01);
    }

    #[test]
    fn payload_round_trip() {
        let data = vec![1u8, 2, 3, 4];
        let img = EmbeddedImage::new(Point::ZERO, &data, 2, 2, RasterFormat::Png);
        assert_eq!(img.data(), Some(data));
    }
}
