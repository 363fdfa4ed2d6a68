//! Bitmap-font text rasterization.
//!
//! Glyphs come from the embedded Spleen PSF2 fonts and are scaled
//! nearest-neighbour to the requested size, so previews need no font
//! files on disk.

use spleen_font::{FONT_12X24, PSF2Font};

/// Native glyph cell of the embedded font.
pub const GLYPH_WIDTH: usize = 12;
pub const GLYPH_HEIGHT: usize = 24;

/// Rasterize one character into a `width × height` coverage bitmap
/// (0 = empty, 1 = inked). Unknown characters come back as an outline
/// box so missing glyphs stay visible in the preview.
pub fn glyph_bitmap(ch: char, width: usize, height: usize) -> Vec<u8> {
    let mut bitmap = vec![0u8; width * height];
    if width == 0 || height == 0 {
        return bitmap;
    }

    let mut source = vec![0u8; GLYPH_WIDTH * GLYPH_HEIGHT];
    let mut found = false;
    if let Ok(mut font) = PSF2Font::new(FONT_12X24) {
        let utf8 = ch.to_string();
        if let Some(glyph) = font.glyph_for_utf8(utf8.as_bytes()) {
            for (y, row) in glyph.enumerate() {
                for (x, on) in row.enumerate() {
                    if y < GLYPH_HEIGHT && x < GLYPH_WIDTH {
                        source[y * GLYPH_WIDTH + x] = on as u8;
                    }
                }
            }
            found = true;
        }
    }
    if !found {
        draw_box(&mut source, GLYPH_WIDTH, GLYPH_HEIGHT);
    }

    scale_bitmap(&source, GLYPH_WIDTH, GLYPH_HEIGHT, &mut bitmap, width, height);
    bitmap
}

/// Nearest-neighbour bitmap scale.
fn scale_bitmap(src: &[u8], src_w: usize, src_h: usize, dst: &mut [u8], dst_w: usize, dst_h: usize) {
    for dy in 0..dst_h {
        for dx in 0..dst_w {
            let sx = dx * src_w / dst_w;
            let sy = dy * src_h / dst_h;
            dst[dy * dst_w + dx] = src[sy * src_w + sx];
        }
    }
}

fn draw_box(bitmap: &mut [u8], width: usize, height: usize) {
    for x in 0..width {
        bitmap[x] = 1;
        bitmap[(height - 1) * width + x] = 1;
    }
    for y in 0..height {
        bitmap[y * width] = 1;
        bitmap[y * width + width - 1] = 1;
    }
}
