//! Strategy dispatch: gate the host, then run the chosen classifier.

use crate::capability::{CapabilityError, CapabilityGate, CapabilitySnapshot, GateDecision};
use crate::fallback::FallbackClassifier;
use crate::raster::Raster;
use crate::types::{ClassificationResult, Strategy};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("unable to analyze image: drawing surface unavailable (buffer is {actual} bytes, expected {expected})")]
    Render { expected: usize, actual: usize },
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("image decode failed: {0}")]
    Decode(String),
    #[error(transparent)]
    Capability(#[from] CapabilityError),
}

/// A face-shape classification strategy.
pub trait Classifier: Send + Sync {
    /// The strategy this classifier implements. Only `Strategy::Primary`
    /// classifiers can be installed with [`Analyzer::with_primary`].
    fn strategy(&self) -> Strategy;
    fn classify(&self, raster: &Raster) -> Result<ClassificationResult, AnalysisError>;
}

/// Routes each image to the primary or fallback classifier.
pub struct Analyzer {
    gate: CapabilityGate,
    primary: Option<Box<dyn Classifier>>,
    fallback: FallbackClassifier,
}

impl Default for Analyzer {
    fn default() -> Self {
        Self::new(CapabilityGate::default())
    }
}

impl Analyzer {
    /// An analyzer with no primary classifier installed.
    pub fn new(gate: CapabilityGate) -> Self {
        Self {
            gate,
            primary: None,
            fallback: FallbackClassifier,
        }
    }

    /// Install the landmark-based classifier used on capable hosts.
    ///
    /// A classifier that does not report `Strategy::Primary` is refused and
    /// the analyzer keeps using the fallback heuristic.
    pub fn with_primary(mut self, primary: Box<dyn Classifier>) -> Self {
        match primary.strategy() {
            Strategy::Primary => self.primary = Some(primary),
            Strategy::Fallback => {
                tracing::warn!("refusing to install a fallback classifier as primary");
            }
        }
        self
    }

    pub fn has_primary(&self) -> bool {
        self.primary.is_some()
    }

    /// Run the capability gate only.
    pub fn decide(&self, snapshot: &CapabilitySnapshot) -> Result<GateDecision, AnalysisError> {
        Ok(self.gate.evaluate(snapshot)?)
    }

    /// Gate the host and classify `raster` with the selected strategy.
    ///
    /// Single attempt: errors are returned as-is for the caller to surface.
    pub fn analyze(
        &self,
        raster: &Raster,
        snapshot: &CapabilitySnapshot,
    ) -> Result<ClassificationResult, AnalysisError> {
        let decision = self.decide(snapshot)?;
        self.classifier_for(decision.strategy).classify(raster)
    }

    fn classifier_for(&self, strategy: Strategy) -> &dyn Classifier {
        match (strategy, &self.primary) {
            (Strategy::Primary, Some(primary)) => primary.as_ref(),
            (Strategy::Primary, None) => {
                tracing::warn!("primary classifier not installed; using fallback heuristic");
                &self.fallback
            }
            (Strategy::Fallback, _) => &self.fallback,
        }
    }
}
