//! wearables-services: Host-side services around the classification core.
//!
//! Mock account sessions behind a storage port, plus placeholder try-on
//! images memoised in a bounded LRU cache.

pub mod cache;
pub mod session;
pub mod tryon;

pub use cache::{BoundedCache, CacheStats};
pub use session::{AuthError, AuthService, MemoryStore, Session, SessionStore, User};
pub use tryon::{GeneratedImage, TryOnGenerator};
