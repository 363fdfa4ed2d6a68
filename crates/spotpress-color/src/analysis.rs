//! Dominant-colour extraction over a sampled pixel grid.

use image::RgbaImage;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Sampling grid is capped at this many columns/rows.
pub const MAX_SAMPLE_GRID: u32 = 100;
/// Pixels below this alpha are treated as transparent and ignored.
pub const MIN_SAMPLE_ALPHA: u8 = 16;
/// Share of sampled pixels a bucket needs to count as dominant.
pub const DOMINANCE_THRESHOLD: f64 = 0.05;
/// Dominant list is capped at this many buckets.
pub const MAX_DOMINANT_COLORS: usize = 10;
/// A spot-colour image carries at most this many printable colours.
pub const SPOT_COLOR_LIMIT: usize = 2;
/// Channel floor above which a colour counts as paper white.
pub const NEAR_WHITE_FLOOR: u8 = 240;

/// Result of analysing one raster image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColorAnalysis {
    /// Dominant printable colours as `#rrggbb`, ordered by pixel
    /// frequency. Near-white buckets are excluded (paper is implicit).
    pub dominant_colors: Vec<String>,
    /// Whether the image qualifies for spot-colour printing.
    pub is_spot_color: bool,
    /// Number of dominant printable colours.
    pub color_count: usize,
}

impl ColorAnalysis {
    /// The "nothing usable" result: callers treat it as
    /// "needs simplification".
    pub fn neutral() -> Self {
        Self {
            dominant_colors: Vec::new(),
            is_spot_color: false,
            color_count: 0,
        }
    }
}

/// Analyse an encoded image (PNG/JPEG/WebP). Decode failures yield the
/// neutral result rather than an error.
pub fn analyze_image(data: &[u8]) -> ColorAnalysis {
    match image::load_from_memory(data) {
        Ok(decoded) => analyze_rgba(&decoded.to_rgba8()),
        Err(err) => {
            log::debug!("image failed to decode, reporting neutral analysis: {err}");
            ColorAnalysis::neutral()
        }
    }
}

/// Analyse a decoded pixel buffer.
pub fn analyze_rgba(img: &RgbaImage) -> ColorAnalysis {
    let (width, height) = img.dimensions();
    if width == 0 || height == 0 {
        return ColorAnalysis::neutral();
    }

    let step_x = (width / MAX_SAMPLE_GRID).max(1);
    let step_y = (height / MAX_SAMPLE_GRID).max(1);

    let mut histogram: HashMap<[u8; 3], usize> = HashMap::new();
    let mut sampled = 0usize;
    let mut y = 0;
    while y < height {
        let mut x = 0;
        while x < width {
            let pixel = img.get_pixel(x, y);
            if pixel[3] >= MIN_SAMPLE_ALPHA {
                sampled += 1;
                *histogram.entry([pixel[0], pixel[1], pixel[2]]).or_default() += 1;
            }
            x += step_x;
        }
        y += step_y;
    }
    if sampled == 0 {
        return ColorAnalysis::neutral();
    }

    let mut buckets: Vec<([u8; 3], usize)> = histogram.into_iter().collect();
    // Frequency order, hex as tiebreak so results are deterministic.
    buckets.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

    let dominant_colors: Vec<String> = buckets
        .iter()
        .filter(|(_, count)| *count as f64 / sampled as f64 > DOMINANCE_THRESHOLD)
        .take(MAX_DOMINANT_COLORS)
        .filter(|(rgb, _)| !is_near_white(*rgb))
        .map(|(rgb, _)| hex(*rgb))
        .collect();

    let color_count = dominant_colors.len();
    ColorAnalysis {
        dominant_colors,
        is_spot_color: (1..=SPOT_COLOR_LIMIT).contains(&color_count),
        color_count,
    }
}

pub(crate) fn is_near_white(rgb: [u8; 3]) -> bool {
    rgb.iter().all(|&channel| channel >= NEAR_WHITE_FLOOR)
}

pub(crate) fn hex(rgb: [u8; 3]) -> String {
    format!("#{:02x}{:02x}{:02x}", rgb[0], rgb[1], rgb[2])
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn solid(width: u32, height: u32, rgba: [u8; 4]) -> RgbaImage {
        RgbaImage::from_pixel(width, height, Rgba(rgba))
    }

    #[test]
    fn black_square_on_white_is_spot_colour() {
        // 8x8 white canvas with a 2x2 black square: black holds 6.25%
        // of the pixels, white is excluded as paper.
        let mut img = solid(8, 8, [255, 255, 255, 255]);
        for y in 3..5 {
            for x in 3..5 {
                img.put_pixel(x, y, Rgba([0, 0, 0, 255]));
            }
        }

        let analysis = analyze_rgba(&img);
        assert_eq!(analysis.dominant_colors, vec!["#000000".to_string()]);
        assert_eq!(analysis.color_count, 1);
        assert!(analysis.is_spot_color);
    }

    #[test]
    fn two_colour_artwork_is_spot_colour() {
        let mut img = solid(10, 10, [255, 0, 0, 255]);
        for y in 0..10 {
            for x in 5..10 {
                img.put_pixel(x, y, Rgba([0, 0, 255, 255]));
            }
        }

        let analysis = analyze_rgba(&img);
        assert_eq!(analysis.color_count, 2);
        assert!(analysis.is_spot_color);
    }

    #[test]
    fn dominant_colours_are_frequency_ordered() {
        let mut img = solid(10, 10, [255, 0, 0, 255]);
        for y in 0..10 {
            for x in 6..10 {
                img.put_pixel(x, y, Rgba([0, 0, 255, 255]));
            }
        }

        let analysis = analyze_rgba(&img);
        assert_eq!(
            analysis.dominant_colors,
            vec!["#ff0000".to_string(), "#0000ff".to_string()]
        );
    }

    #[test]
    fn three_colours_exceed_the_spot_limit() {
        let mut img = solid(9, 9, [255, 0, 0, 255]);
        for y in 0..9 {
            for x in 3..6 {
                img.put_pixel(x, y, Rgba([0, 255, 0, 255]));
            }
            for x in 6..9 {
                img.put_pixel(x, y, Rgba([0, 0, 255, 255]));
            }
        }

        let analysis = analyze_rgba(&img);
        assert_eq!(analysis.color_count, 3);
        assert!(!analysis.is_spot_color);
    }

    #[test]
    fn gradients_produce_no_dominant_colours() {
        // A smooth ramp spreads pixels over many tiny buckets; none
        // reaches the dominance threshold.
        let mut img = RgbaImage::new(100, 1);
        for x in 0..100 {
            img.put_pixel(x, 0, Rgba([(x * 2) as u8, 0, 0, 255]));
        }

        let analysis = analyze_rgba(&img);
        assert_eq!(analysis.color_count, 0);
        assert!(!analysis.is_spot_color);
    }

    #[test]
    fn transparent_pixels_are_ignored() {
        let img = solid(10, 10, [255, 0, 0, 0]);
        assert_eq!(analyze_rgba(&img), ColorAnalysis::neutral());
    }

    #[test]
    fn undecodable_bytes_report_neutral() {
        assert_eq!(analyze_image(b"not an image"), ColorAnalysis::neutral());
    }

    #[test]
    fn analysis_serializes_for_the_ui() {
        let analysis = ColorAnalysis {
            dominant_colors: vec!["#ff0000".to_string()],
            is_spot_color: true,
            color_count: 1,
        };
        let json = serde_json::to_string(&analysis).unwrap();
        let restored: ColorAnalysis = serde_json::from_str(&json).unwrap();
        assert_eq!(analysis, restored);
    }

    #[test]
    fn encoded_png_round_trip() {
        let img = solid(10, 10, [0, 0, 255, 255]);
        let mut png = Vec::new();
        img.write_to(&mut std::io::Cursor::new(&mut png), image::ImageFormat::Png)
            .unwrap();

        let analysis = analyze_image(&png);
        assert_eq!(analysis.dominant_colors, vec!["#0000ff".to_string()]);
        assert!(analysis.is_spot_color);
    }
}
