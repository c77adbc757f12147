//! Frame recommendation catalog.
//!
//! Maps every [`FaceShape`] to editorial frame, colour and avoid lists. The
//! built-in catalog is embedded at compile time from
//! `contrib/recommendations.toml`; a replacement table may be loaded at
//! runtime but must cover every shape.

use crate::types::FaceShape;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::OnceLock;
use thiserror::Error;

const BUILTIN_CATALOG: &str = include_str!("../../../contrib/recommendations.toml");

static BUILTIN: OnceLock<Result<Catalog, CatalogError>> = OnceLock::new();

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CatalogError {
    #[error("bad catalog TOML: {0}")]
    Parse(String),
    #[error("catalog entry for unknown face shape: {0}")]
    UnknownShape(String),
    #[error("catalog has no entry for face shape: {0}")]
    MissingEntry(FaceShape),
    #[error("catalog has more than one entry for face shape: {0}")]
    DuplicateEntry(FaceShape),
    #[error("catalog entry for {0} lists no frames")]
    EmptyFrames(FaceShape),
}

/// Display content for one face shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub description: String,
    /// Frame styles, best first.
    pub frames: Vec<String>,
    #[serde(default)]
    pub colors: BTreeSet<String>,
    /// Styles to avoid, most important first.
    #[serde(default)]
    pub avoid: Vec<String>,
}

/// A validated shape → recommendation table.
#[derive(Debug, Clone)]
pub struct Catalog {
    /// Indexed by [`FaceShape::index`].
    entries: Vec<Recommendation>,
}

impl Catalog {
    /// The compiled-in catalog, parsed once.
    pub fn builtin() -> Result<&'static Catalog, CatalogError> {
        BUILTIN
            .get_or_init(|| Catalog::from_toml(BUILTIN_CATALOG))
            .as_ref()
            .map_err(Clone::clone)
    }

    /// Parse and validate a catalog table.
    pub fn from_toml(src: &str) -> Result<Self, CatalogError> {
        let raw: BTreeMap<String, Recommendation> =
            toml::from_str(src).map_err(|e| CatalogError::Parse(e.to_string()))?;

        let mut slots: Vec<Option<Recommendation>> = vec![None; FaceShape::ALL.len()];
        for (key, rec) in raw {
            let shape: FaceShape = key
                .parse()
                .map_err(|_| CatalogError::UnknownShape(key.clone()))?;
            if rec.frames.is_empty() {
                return Err(CatalogError::EmptyFrames(shape));
            }
            let slot = &mut slots[shape.index()];
            if slot.is_some() {
                return Err(CatalogError::DuplicateEntry(shape));
            }
            *slot = Some(rec);
        }

        let entries = FaceShape::ALL
            .iter()
            .zip(slots)
            .map(|(&shape, slot)| slot.ok_or(CatalogError::MissingEntry(shape)))
            .collect::<Result<Vec<_>, _>>()?;

        tracing::debug!(entries = entries.len(), "loaded recommendation catalog");
        Ok(Self { entries })
    }

    pub fn get(&self, shape: FaceShape) -> &Recommendation {
        &self.entries[shape.index()]
    }

    pub fn iter(&self) -> impl Iterator<Item = (FaceShape, &Recommendation)> {
        FaceShape::ALL.into_iter().zip(self.entries.iter())
    }
}
