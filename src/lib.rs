//! Offline app-shell cache and fetch interception engine for the IIDX
//! song-master viewer.
//!
//! The engine mirrors the behavior of the app's service worker: it caches
//! the app shell for offline use, bypasses the cache for externally
//! versioned song-master data files, and rewrites response headers so the
//! page can run cross-origin isolated.
//!
//! ## Architecture
//!
//! ```text
//! ServiceWorker (dispatcher)
//!     ├── ShellPaths        scope-derived app shell paths
//!     ├── CacheStore        versioned cache generations (memory / sqlite)
//!     ├── Fetcher           network seam (reqwest-backed)
//!     ├── ClientRegistry    open page clients
//!     └── ControlMessage    version query / forced activation
//! ```
//!
//! Requests flow through [`worker::ServiceWorker::handle_fetch`]: non-GET
//! requests pass through untouched, bypass-class URLs are always fetched
//! fresh, navigations fall back to the cached entry document when offline,
//! and everything else is served cache-first with a best-effort
//! write-through.

pub mod bypass;
pub mod cache;
pub mod clients;
pub mod config;
pub mod headers;
pub mod lifecycle;
pub mod message;
pub mod net;
pub mod scope;
pub mod worker;

pub use config::{WorkerConfig, CACHE_NAME, SW_VERSION};
pub use worker::ServiceWorker;
