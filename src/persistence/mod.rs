//! Key-value persistence
//!
//! Settings and highscores are stored as JSON blobs under fixed keys:
//! - `MemoryStore` for native builds and tests
//! - `LocalStorage` (wasm32) backed by `window.localStorage`
//!
//! Reads degrade to defaults on any failure; writes are best-effort.

pub mod store;

#[cfg(target_arch = "wasm32")]
pub use store::LocalStorage;
pub use store::{KeyValueStore, MemoryStore, StorageError};
