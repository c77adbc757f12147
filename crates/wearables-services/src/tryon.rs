//! Virtual try-on image placeholders.
//!
//! Rendering is not implemented; each (image, frame style) pair maps to a
//! stable placeholder URL. Results are memoised in a [`BoundedCache`].

use crate::cache::{BoundedCache, CacheStats};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use wearables_core::Recommendation;

const PLACEHOLDER_PATH: &str = "/placeholder.svg";
const PLACEHOLDER_SIZE: u32 = 400;
/// Hex characters of the digest carried in the URL as a seed.
const SEED_LEN: usize = 12;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedImage {
    /// SHA-256 of the source image key and frame style, hex-encoded.
    pub key: String,
    pub style: String,
    pub url: String,
    pub created_at: DateTime<Utc>,
}

pub struct TryOnGenerator {
    cache: BoundedCache<String, GeneratedImage>,
}

impl TryOnGenerator {
    pub fn new(cache_capacity: usize) -> Self {
        Self {
            cache: BoundedCache::new(cache_capacity),
        }
    }

    /// Placeholder try-on image for `style` applied to the image identified by `image_key`.
    pub fn generate(&mut self, image_key: &str, style: &str) -> GeneratedImage {
        let key = cache_key(image_key, style);
        self.cache.get_or_insert_with(key.clone(), || {
            tracing::debug!(style, key = %&key[..SEED_LEN], "generating try-on placeholder");
            GeneratedImage {
                url: placeholder_url(style, &key),
                style: style.to_string(),
                key: key.clone(),
                created_at: Utc::now(),
            }
        })
    }

    /// One image per recommended frame style, in recommendation order.
    pub fn for_recommendation(
        &mut self,
        image_key: &str,
        recommendation: &Recommendation,
    ) -> Vec<GeneratedImage> {
        recommendation
            .frames
            .iter()
            .map(|style| self.generate(image_key, style))
            .collect()
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }
}

fn cache_key(image_key: &str, style: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(image_key.as_bytes());
    hasher.update([0u8]);
    hasher.update(style.as_bytes());
    hex::encode(hasher.finalize())
}

fn placeholder_url(style: &str, key: &str) -> String {
    format!(
        "{PLACEHOLDER_PATH}?height={PLACEHOLDER_SIZE}&width={PLACEHOLDER_SIZE}&query={}+glasses+try-on&seed={}",
        encode_query(style),
        &key[..SEED_LEN]
    )
}

/// Minimal form encoding: spaces become `+`, other non-alphanumerics are percent-encoded.
fn encode_query(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for byte in s.bytes() {
        match byte {
            b' ' => out.push('+'),
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' => out.push(byte as char),
            _ => {
                out.push('%');
                out.push_str(&hex::encode_upper([byte]));
            }
        }
    }
    out
}
