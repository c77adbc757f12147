use std::path::PathBuf;
use std::time::Duration;

use wearables_core::{CapabilityGate, CapabilitySnapshot, Catalog};

/// A current desktop Chrome, used when no user agent is supplied.
const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// CLI configuration, loaded from environment variables.
pub struct Config {
    /// User agent reported to the capability gate.
    pub user_agent: String,
    /// Whether the host can create a WebGL context.
    pub webgl_available: bool,
    /// Device memory estimate in GB; unset means unknown.
    pub device_memory_gb: Option<f32>,
    /// Minimum device memory for the primary strategy.
    pub min_device_memory_gb: f32,
    /// Seconds to wait for an analysis before discarding it.
    pub analysis_timeout_secs: u64,
    /// Capacity of the try-on image cache.
    pub tryon_cache_capacity: usize,
    /// Optional replacement for the built-in recommendation catalog.
    pub catalog_path: Option<PathBuf>,
}

impl Config {
    /// Load configuration from `WEARABLES_*` environment variables with defaults.
    pub fn from_env() -> Self {
        let gate = CapabilityGate::default();
        Self {
            user_agent: std::env::var("WEARABLES_USER_AGENT")
                .unwrap_or_else(|_| DEFAULT_USER_AGENT.to_string()),
            webgl_available: std::env::var("WEARABLES_WEBGL")
                .map(|v| v != "0")
                .unwrap_or(true),
            device_memory_gb: std::env::var("WEARABLES_DEVICE_MEMORY_GB")
                .ok()
                .and_then(|v| v.parse().ok()),
            min_device_memory_gb: env_f32("WEARABLES_MIN_DEVICE_MEMORY_GB", gate.min_device_memory_gb),
            analysis_timeout_secs: env_u64("WEARABLES_ANALYSIS_TIMEOUT_SECS", 10),
            tryon_cache_capacity: env_usize("WEARABLES_TRYON_CACHE_CAPACITY", 64),
            catalog_path: std::env::var("WEARABLES_CATALOG").map(PathBuf::from).ok(),
        }
    }

    pub fn analysis_timeout(&self) -> Duration {
        Duration::from_secs(self.analysis_timeout_secs)
    }

    pub fn gate(&self) -> CapabilityGate {
        CapabilityGate {
            min_device_memory_gb: self.min_device_memory_gb,
            ..CapabilityGate::default()
        }
    }

    /// Snapshot from configuration, with per-invocation overrides applied.
    pub fn snapshot(
        &self,
        user_agent: Option<String>,
        device_memory_gb: Option<f32>,
        no_webgl: bool,
    ) -> CapabilitySnapshot {
        CapabilitySnapshot {
            user_agent: user_agent.unwrap_or_else(|| self.user_agent.clone()),
            webgl_available: self.webgl_available && !no_webgl,
            device_memory_gb: device_memory_gb.or(self.device_memory_gb),
        }
    }

    /// The configured catalog, or the built-in one.
    pub fn catalog(&self) -> anyhow::Result<Catalog> {
        match &self.catalog_path {
            Some(path) => {
                let src = std::fs::read_to_string(path)?;
                let catalog = Catalog::from_toml(&src)?;
                tracing::info!(path = %path.display(), "loaded custom recommendation catalog");
                Ok(catalog)
            }
            None => Ok(Catalog::builtin()?.clone()),
        }
    }
}

fn env_f32(key: &str, default: f32) -> f32 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn env_u64(key: &str, default: u64) -> u64 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn env_usize(key: &str, default: usize) -> usize {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
