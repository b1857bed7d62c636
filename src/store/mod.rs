//! Persisted session storage
//!
//! - Key-value store trait and implementations
//! - Typed wallet-account record on top of a store

mod file_system;
mod memory;
mod session;

pub use file_system::FileStore;
pub use memory::MemoryStore;
pub use session::{LoadError, PersistedSession, WALLET_ACCOUNT_KEY};

use crate::error::StorageError;

/// Synchronous local key-value storage
///
/// The browser-local equivalent: values are strings, nothing is shared across
/// devices, and the contents may be cleared outside this crate at any time.
pub trait SessionStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Remove a key. Removing a missing key succeeds.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}
