//! Versioned cache generations and their storage backends.
//!
//! A generation is a named container of request-key → response entries.
//! Exactly one generation is current after activation; all others are
//! deleted. Backends only guarantee atomicity of individual operations.

mod memory;
mod sqlite;
mod store;

pub use memory::MemoryStore;
pub use sqlite::{GenerationStats, SqliteStore};
pub use store::CacheStore;
