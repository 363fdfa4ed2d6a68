//! Advisory complexity classification.
//!
//! Live UI feedback and default fee estimates only. Checkout
//! eligibility is decided by [`crate::validation::validate_design_colors`];
//! the two classifiers use different criteria and are kept separate.

use crate::fees::{FeeLine, complexity_surcharge, vectorization_fee};
use serde::{Deserialize, Serialize};
use spotpress_core::{DesignDocument, Fill, ShapeKind};
use std::collections::BTreeSet;

/// Object count above which the design looks busy.
pub const COMPLEX_OBJECT_COUNT: usize = 5;
/// Loose colour count above which the design looks busy.
pub const COMPLEX_COLOR_COUNT: usize = 3;
/// Text object count above which the design looks busy.
pub const COMPLEX_TEXT_COUNT: usize = 2;
/// Number of signals that tip the classification to complex.
pub const COMPLEX_SIGNAL_THRESHOLD: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComplexityClass {
    Simple,
    Complex,
}

/// Advisory report for the editor sidebar.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComplexityReport {
    pub complexity: ComplexityClass,
    /// Loose colour count (white included; this is not the gate's count).
    pub color_count: usize,
    /// Default fee estimate shown before formal validation.
    pub estimated_fees: Vec<FeeLine>,
}

/// Score the design against seven busy-ness signals.
pub fn analyze_design_complexity(document: &DesignDocument) -> ComplexityReport {
    let mut colors: BTreeSet<String> = BTreeSet::new();
    let mut object_count = 0usize;
    let mut text_count = 0usize;
    let mut has_images = false;
    let mut has_paths = false;
    let mut has_gradients = false;
    let mut has_freehand = false;

    for object in document.user_objects() {
        object_count += 1;
        match &object.shape {
            ShapeKind::Text(_) => text_count += 1,
            ShapeKind::Image(_) => has_images = true,
            ShapeKind::Path(path) => {
                has_paths = true;
                if path.freehand {
                    has_freehand = true;
                }
            }
            _ => {}
        }
        match &object.style.fill {
            Fill::Solid(color) => {
                colors.insert(color.hex());
            }
            Fill::LinearGradient { .. } | Fill::Pattern { .. } => has_gradients = true,
            Fill::None => {}
        }
        if let Some(stroke) = object.style.stroke {
            if object.style.stroke_width > 0.0 {
                colors.insert(stroke.hex());
            }
        }
    }

    let signals = [
        object_count > COMPLEX_OBJECT_COUNT,
        colors.len() > COMPLEX_COLOR_COUNT,
        has_images,
        has_paths,
        has_gradients,
        has_freehand,
        text_count > COMPLEX_TEXT_COUNT,
    ];
    let score = signals.iter().filter(|&&signal| signal).count();
    let complexity = if score >= COMPLEX_SIGNAL_THRESHOLD {
        ComplexityClass::Complex
    } else {
        ComplexityClass::Simple
    };

    let mut estimated_fees = vec![vectorization_fee(colors.len().clamp(1, 2))];
    if complexity == ComplexityClass::Complex {
        estimated_fees.push(complexity_surcharge());
    }

    ComplexityReport {
        complexity,
        color_count: colors.len(),
        estimated_fees,
    }
}
