//! Embedding cache storage

pub mod cache;
pub mod index;
pub mod record;

pub use cache::{EmbeddingCache, Resolved};
pub use index::{find_orphaned, scan, scan_partial};
pub use record::{load, save, CacheRecord};
