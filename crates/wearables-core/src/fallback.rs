//! Degraded-mode face-shape heuristic.
//!
//! Runs when the landmark model is unavailable. The result is a function of
//! the image's aspect ratio only; measurements and landmarks are synthesized
//! from fixed fractions of the image dimensions.

use crate::analyzer::{AnalysisError, Classifier};
use crate::raster::Raster;
use crate::types::{
    AlternativeShape, ClassificationResult, FaceShape, LandmarkPoint, Measurements, Strategy,
};

const WIDE_RATIO: f32 = 1.05;
const NARROW_RATIO: f32 = 0.95;

const WIDE_CONFIDENCE: f32 = 60.0;
const BALANCED_CONFIDENCE: f32 = 65.0;
const NARROW_CONFIDENCE: f32 = 55.0;

const GRID_COLUMNS: usize = 9;
const GRID_ROWS: usize = 8;
/// Grid band as fractions of each dimension.
const GRID_LO: f32 = 0.1;
const GRID_HI: f32 = 0.9;

const SQUARE_BASE: f32 = 80.0;
const SQUARE_RANGE: (f32, f32) = (30.0, 50.0);
const HEART_BASE: f32 = 75.0;
const HEART_RANGE: (f32, f32) = (25.0, 45.0);

/// Aspect-ratio classifier used when the primary strategy cannot run.
#[derive(Debug, Default, Clone, Copy)]
pub struct FallbackClassifier;

impl Classifier for FallbackClassifier {
    fn strategy(&self) -> Strategy {
        Strategy::Fallback
    }

    fn classify(&self, raster: &Raster) -> Result<ClassificationResult, AnalysisError> {
        let surface = raster.surface()?;
        let (w, h) = (surface.width() as f32, surface.height() as f32);
        let ratio = surface.aspect_ratio();

        let (shape, confidence) = shape_for_ratio(ratio);

        tracing::debug!(
            width = surface.width(),
            height = surface.height(),
            ratio,
            luma = surface.avg_luma(),
            shape = %shape,
            confidence,
            "fallback classification"
        );

        Ok(ClassificationResult {
            shape,
            confidence,
            measurements: synthetic_measurements(w, h),
            landmarks: landmark_grid(w, h),
            alternative_shapes: alternatives(shape, confidence),
            strategy: Strategy::Fallback,
        })
    }
}

/// Map an aspect ratio (width / height) to a shape and confidence.
///
/// Lower bounds are exclusive: exactly 1.05 is still `Oval`/65 and exactly
/// 0.95 is `Oval`/55.
pub fn shape_for_ratio(ratio: f32) -> (FaceShape, f32) {
    if ratio > WIDE_RATIO {
        (FaceShape::Round, WIDE_CONFIDENCE)
    } else if ratio > NARROW_RATIO {
        (FaceShape::Oval, BALANCED_CONFIDENCE)
    } else {
        (FaceShape::Oval, NARROW_CONFIDENCE)
    }
}

fn synthetic_measurements(w: f32, h: f32) -> Measurements {
    Measurements {
        face_width: 0.8 * w,
        face_height: 0.9 * h,
        forehead_width: 0.75 * w,
        cheekbone_width: 0.8 * w,
        jaw_width: 0.72 * w,
        chin_width: 0.45 * w,
        length_to_width_ratio: 1.3,
        jaw_to_face_width_ratio: 0.9,
        forehead_to_jaw_ratio: 1.04,
        cheekbone_to_jaw_ratio: 1.11,
        jaw_angularity: 75.0,
    }
}

/// 8 rows of 9 points spanning the central 80% of the image, row-major.
fn landmark_grid(w: f32, h: f32) -> Vec<LandmarkPoint> {
    let (x_lo, x_hi) = (GRID_LO * w, GRID_HI * w);
    let (y_lo, y_hi) = (GRID_LO * h, GRID_HI * h);
    let x_step = (x_hi - x_lo) / (GRID_COLUMNS - 1) as f32;
    let y_step = (y_hi - y_lo) / (GRID_ROWS - 1) as f32;

    let mut points = Vec::with_capacity(GRID_ROWS * GRID_COLUMNS);
    for row in 0..GRID_ROWS {
        // Clamp so accumulated rounding never leaves the band.
        let y = (y_lo + row as f32 * y_step).clamp(y_lo, y_hi);
        for col in 0..GRID_COLUMNS {
            let x = (x_lo + col as f32 * x_step).clamp(x_lo, x_hi);
            points.push(LandmarkPoint::new(x, y));
        }
    }
    points
}

fn alternatives(shape: FaceShape, confidence: f32) -> Vec<AlternativeShape> {
    vec![
        AlternativeShape { shape, score: confidence },
        AlternativeShape {
            shape: FaceShape::Square,
            score: (SQUARE_BASE - confidence).clamp(SQUARE_RANGE.0, SQUARE_RANGE.1),
        },
        AlternativeShape {
            shape: FaceShape::Heart,
            score: (HEART_BASE - confidence).clamp(HEART_RANGE.0, HEART_RANGE.1),
        },
    ]
}
