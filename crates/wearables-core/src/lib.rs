//! wearables-core: Face-shape classification and frame recommendations.
//!
//! A capability gate routes each image to either an injected landmark-based
//! classifier or a deterministic aspect-ratio fallback; a checksum classifier
//! and a static recommendation catalog complete the core.

pub mod analyzer;
pub mod capability;
pub mod fallback;
pub mod hash;
pub mod raster;
pub mod recommend;
pub mod types;

pub use analyzer::{AnalysisError, Analyzer, Classifier};
pub use capability::{
    BrowserName, CapabilityError, CapabilityGate, CapabilityProfile, CapabilitySnapshot,
    GateDecision, Incompatibility,
};
pub use fallback::FallbackClassifier;
pub use hash::{hash_classify, hash_classify_bytes};
pub use raster::Raster;
pub use recommend::{Catalog, CatalogError, Recommendation};
pub use types::{
    AlternativeShape, ClassificationResult, FaceShape, LandmarkPoint, Measurements, Strategy,
};
