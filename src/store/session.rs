use std::sync::Arc;

use thiserror::Error;

use super::SessionStore;
use crate::account::WalletAccount;
use crate::error::StorageError;

/// Storage key holding the last connected account
pub const WALLET_ACCOUNT_KEY: &str = "walletAccount";

/// Why a persisted account could not be loaded
#[derive(Error, Debug)]
pub enum LoadError {
    /// The store itself failed; the record may still be intact
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// The stored value is not a valid account record
    #[error("Corrupt session record: {0}")]
    Corrupt(serde_json::Error),
}

/// The wallet-account record kept under [`WALLET_ACCOUNT_KEY`]
#[derive(Clone)]
pub struct PersistedSession {
    store: Arc<dyn SessionStore>,
}

impl PersistedSession {
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        Self { store }
    }

    /// Read and deserialize the stored account, if any
    pub fn load(&self) -> Result<Option<WalletAccount>, LoadError> {
        let Some(raw) = self.store.get(WALLET_ACCOUNT_KEY)? else {
            return Ok(None);
        };
        let account = serde_json::from_str(&raw).map_err(LoadError::Corrupt)?;
        Ok(Some(account))
    }

    /// Serialize the account as compact JSON and store it
    pub fn save(&self, account: &WalletAccount) -> Result<(), StorageError> {
        let json = serde_json::to_string(account)?;
        self.store.set(WALLET_ACCOUNT_KEY, &json)
    }

    pub fn clear(&self) -> Result<(), StorageError> {
        self.store.remove(WALLET_ACCOUNT_KEY)
    }
}
