//! Key-value persistence adapters for Bazaar.
//!
//! Cart state is never read from ambient globals. Whoever owns a cart is
//! handed a [`Cache`] over some [`KvStore`] and reads and writes whole
//! snapshots through it.
//!
//! # Example
//!
//! ```rust
//! use bazaar_cache::{cache_key, Cache, MemoryStore};
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Serialize, Deserialize, PartialEq, Debug)]
//! struct Snapshot {
//!     items: Vec<String>,
//! }
//!
//! let cache = Cache::new(MemoryStore::new());
//! let key = cache_key!("cart", "sess_abc");
//!
//! cache.set(&key, &Snapshot { items: vec!["tea".into()] }).unwrap();
//! let loaded: Option<Snapshot> = cache.get(&key).unwrap();
//! assert_eq!(loaded.unwrap().items, vec!["tea".to_string()]);
//!
//! cache.delete(&key).unwrap();
//! ```

mod error;
mod kv;
mod session;

pub use error::CacheError;
pub use kv::{Cache, FileStore, KvStore, MemoryStore};
pub use session::SessionId;

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::{Cache, CacheError, FileStore, KvStore, MemoryStore, SessionId};
}
