//! # Cache Module
//!
//! In-memory snapshot of the entries a backend already knows about.
//!
//! Each backend (movies, shows) owns one [`MediaCache`]. The scheduler
//! reloads it from the backend on a fixed interval; lookups read it to tell
//! new search results apart from ones already in the library.
//!
//! ## Generations
//!
//! The cache never mutates a published map in place. A reload builds a new
//! [`CacheGeneration`] from the fetched list and publishes it by swapping a
//! single `Arc`, so a reader holds either the entire old generation or the
//! entire new one:
//!
//! - **Reads** (`lookup`, `contains`, `snapshot`) clone the `Arc` under a
//!   short read lock and never wait on a network fetch
//! - **Reloads** are serialized per cache; a failed fetch leaves the current
//!   generation untouched
//! - **`add`** overlays one entry with copy-on-write, so snapshots already
//!   handed out stay unchanged
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! # use std::sync::Arc;
//! # async fn example(radarr: Arc<RadarrClient>) -> anyhow::Result<()> {
//! let cache = MediaCache::new(radarr);
//! cache.reload().await?;
//!
//! if cache.contains(245891) {
//!     println!("John Wick ya está en la biblioteca");
//! }
//! # Ok(())
//! # }
//! ```

pub mod generation;
pub mod media_cache;

pub use generation::CacheGeneration;
pub use media_cache::MediaCache;
