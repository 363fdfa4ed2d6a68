//! Posterization of artwork down to a printable spot-colour palette.

use crate::analysis::{MIN_SAMPLE_ALPHA, hex, is_near_white};
use crate::error::ColorError;
use image::{Rgba, RgbaImage};
use std::collections::HashMap;

/// A quantized image ready for re-insertion into the canvas.
#[derive(Debug, Clone)]
pub struct SimplifiedImage {
    /// PNG-encoded output.
    pub png: Vec<u8>,
    /// Retained palette as `#rrggbb`, by frequency.
    pub palette: Vec<String>,
    pub width: u32,
    pub height: u32,
}

/// Quantize an encoded image to its `target_colors` most dominant
/// printable colours. Near-white pixels stay white (the paper),
/// transparency is preserved, every other pixel snaps to the nearest
/// retained colour. Degenerate inputs still produce a best-effort
/// result; only decode/encode failures are errors.
pub fn simplify_image(data: &[u8], target_colors: usize) -> Result<SimplifiedImage, ColorError> {
    let img = image::load_from_memory(data)?.to_rgba8();
    simplify_rgba(&img, target_colors)
}

/// Quantize a decoded pixel buffer. See [`simplify_image`].
pub fn simplify_rgba(img: &RgbaImage, target_colors: usize) -> Result<SimplifiedImage, ColorError> {
    let (width, height) = img.dimensions();

    // Full-resolution histogram: the remap pass touches every pixel
    // anyway, so there is no reason to subsample here.
    let mut histogram: HashMap<[u8; 3], usize> = HashMap::new();
    for pixel in img.pixels() {
        if pixel[3] >= MIN_SAMPLE_ALPHA {
            *histogram.entry([pixel[0], pixel[1], pixel[2]]).or_default() += 1;
        }
    }
    let mut buckets: Vec<([u8; 3], usize)> = histogram.into_iter().collect();
    buckets.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

    let palette: Vec<[u8; 3]> = buckets
        .iter()
        .map(|(rgb, _)| *rgb)
        .filter(|rgb| !is_near_white(*rgb))
        .take(target_colors)
        .collect();
    if palette.is_empty() {
        log::debug!("no printable colours found; output reduces to paper and transparency");
    }

    let mut out = RgbaImage::new(width, height);
    for (x, y, pixel) in img.enumerate_pixels() {
        let rgb = [pixel[0], pixel[1], pixel[2]];
        let quantized = if pixel[3] < MIN_SAMPLE_ALPHA {
            Rgba([0, 0, 0, 0])
        } else if is_near_white(rgb) {
            Rgba([255, 255, 255, pixel[3]])
        } else if let Some(best) = nearest(&palette, rgb) {
            Rgba([best[0], best[1], best[2], pixel[3]])
        } else {
            Rgba([255, 255, 255, pixel[3]])
        };
        out.put_pixel(x, y, quantized);
    }

    let mut png = Vec::new();
    out.write_to(&mut std::io::Cursor::new(&mut png), image::ImageFormat::Png)
        .map_err(|err| ColorError::Encode(err.to_string()))?;

    Ok(SimplifiedImage {
        png,
        palette: palette.iter().map(|rgb| hex(*rgb)).collect(),
        width,
        height,
    })
}

fn nearest(palette: &[[u8; 3]], rgb: [u8; 3]) -> Option<[u8; 3]> {
    palette.iter().copied().min_by_key(|candidate| distance_sq(*candidate, rgb))
}

fn distance_sq(a: [u8; 3], b: [u8; 3]) -> u32 {
    let dr = a[0] as i32 - b[0] as i32;
    let dg = a[1] as i32 - b[1] as i32;
    let db = a[2] as i32 - b[2] as i32;
    (dr * dr + dg * dg + db * db) as u32
}
