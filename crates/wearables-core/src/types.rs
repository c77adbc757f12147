use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Editorial face-shape category used to pick eyewear.
///
/// Declaration order is significant: the hash classifier indexes into
/// [`FaceShape::ALL`] by checksum modulo 7.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FaceShape {
    Oval,
    Round,
    Square,
    Heart,
    Diamond,
    Rectangle,
    Triangle,
}

impl FaceShape {
    pub const ALL: [FaceShape; 7] = [
        FaceShape::Oval,
        FaceShape::Round,
        FaceShape::Square,
        FaceShape::Heart,
        FaceShape::Diamond,
        FaceShape::Rectangle,
        FaceShape::Triangle,
    ];

    /// Position of this shape in [`FaceShape::ALL`].
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn as_str(self) -> &'static str {
        match self {
            FaceShape::Oval => "oval",
            FaceShape::Round => "round",
            FaceShape::Square => "square",
            FaceShape::Heart => "heart",
            FaceShape::Diamond => "diamond",
            FaceShape::Rectangle => "rectangle",
            FaceShape::Triangle => "triangle",
        }
    }
}

impl fmt::Display for FaceShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown face shape: {0}")]
pub struct ParseFaceShapeError(pub String);

impl FromStr for FaceShape {
    type Err = ParseFaceShapeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        FaceShape::ALL
            .into_iter()
            .find(|shape| shape.as_str() == lower)
            .ok_or_else(|| ParseFaceShapeError(s.to_string()))
    }
}

/// Which classifier produced a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    /// Landmark-based analysis backed by an external model.
    Primary,
    /// Deterministic aspect-ratio heuristic.
    Fallback,
}

/// A point in image pixel space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LandmarkPoint {
    pub x: f32,
    pub y: f32,
}

impl LandmarkPoint {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Named facial metrics. Lengths are in pixels, ratios are dimensionless.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Measurements {
    pub face_width: f32,
    pub face_height: f32,
    pub forehead_width: f32,
    pub cheekbone_width: f32,
    pub jaw_width: f32,
    pub chin_width: f32,
    pub length_to_width_ratio: f32,
    pub jaw_to_face_width_ratio: f32,
    pub forehead_to_jaw_ratio: f32,
    pub cheekbone_to_jaw_ratio: f32,
    pub jaw_angularity: f32,
}

impl Measurements {
    /// Iterate over `(metric name, value)` pairs using the serialized names.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, f32)> {
        [
            ("faceWidth", self.face_width),
            ("faceHeight", self.face_height),
            ("foreheadWidth", self.forehead_width),
            ("cheekboneWidth", self.cheekbone_width),
            ("jawWidth", self.jaw_width),
            ("chinWidth", self.chin_width),
            ("lengthToWidthRatio", self.length_to_width_ratio),
            ("jawToFaceWidthRatio", self.jaw_to_face_width_ratio),
            ("foreheadToJawRatio", self.forehead_to_jaw_ratio),
            ("cheekboneToJawRatio", self.cheekbone_to_jaw_ratio),
            ("jawAngularity", self.jaw_angularity),
        ]
        .into_iter()
    }
}

/// A runner-up shape and its score in [0, 100].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AlternativeShape {
    pub shape: FaceShape,
    pub score: f32,
}

/// Output of a single classification call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassificationResult {
    pub shape: FaceShape,
    /// Confidence in [0, 100].
    pub confidence: f32,
    pub measurements: Measurements,
    pub landmarks: Vec<LandmarkPoint>,
    /// Ordered best-first; the first entry is always `shape` itself.
    pub alternative_shapes: Vec<AlternativeShape>,
    pub strategy: Strategy,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shape_order_matches_index() {
        for (i, shape) in FaceShape::ALL.iter().enumerate() {
            assert_eq!(shape.index(), i);
        }
        assert_eq!(FaceShape::ALL[0], FaceShape::Oval);
        assert_eq!(FaceShape::ALL[6], FaceShape::Triangle);
    }

    #[test]
    fn test_shape_parse_case_insensitive() {
        assert_eq!("Heart".parse::<FaceShape>(), Ok(FaceShape::Heart));
        assert_eq!(" rectangle ".parse::<FaceShape>(), Ok(FaceShape::Rectangle));
        assert!("hexagon".parse::<FaceShape>().is_err());
    }

    #[test]
    fn test_shape_serializes_lowercase() {
        let json = serde_json::to_string(&FaceShape::Diamond).unwrap();
        assert_eq!(json, "\"diamond\"");
    }

    #[test]
    fn test_measurements_serialize_as_named_mapping() {
        let m = Measurements {
            face_width: 80.0,
            face_height: 90.0,
            forehead_width: 75.0,
            cheekbone_width: 80.0,
            jaw_width: 72.0,
            chin_width: 45.0,
            length_to_width_ratio: 1.3,
            jaw_to_face_width_ratio: 0.9,
            forehead_to_jaw_ratio: 1.04,
            cheekbone_to_jaw_ratio: 1.11,
            jaw_angularity: 75.0,
        };
        let value = serde_json::to_value(&m).unwrap();
        let obj = value.as_object().unwrap();
        assert_eq!(obj.len(), m.iter().count());
        for (name, _) in m.iter() {
            assert!(obj.contains_key(name), "missing {name}");
        }
    }
}
