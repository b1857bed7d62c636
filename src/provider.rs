//! Provider scope for the session manager
//!
//! Consumers get the session through a [`WalletScope`]. The scope is empty
//! until a [`WalletProvider`] is mounted into it, and asking an empty scope
//! for the wallet is a programming error that fails immediately.

use std::sync::{Arc, RwLock};

use crate::adapter::WalletAdapter;
use crate::config::SessionConfig;
use crate::error::SessionError;
use crate::manager::SessionManager;
use crate::store::SessionStore;

/// Builds and initializes a session manager for a wallet adapter and store
pub struct WalletProvider {
    manager: SessionManager,
}

impl WalletProvider {
    /// Construct the manager and run its initialization routine
    pub async fn mount(
        adapter: Arc<dyn WalletAdapter>,
        store: Arc<dyn SessionStore>,
        config: &SessionConfig,
    ) -> Self {
        let manager = SessionManager::new(adapter, store, config);
        manager.initialize().await;
        Self { manager }
    }

    pub fn manager(&self) -> &SessionManager {
        &self.manager
    }

    pub fn into_manager(self) -> SessionManager {
        self.manager
    }
}

/// Slot holding the mounted session, empty until a provider is installed
#[derive(Default)]
pub struct WalletScope {
    slot: RwLock<Option<SessionManager>>,
}

impl WalletScope {
    pub const fn new() -> Self {
        Self {
            slot: RwLock::new(None),
        }
    }

    /// Install a provider, returning the previously mounted manager if any
    pub fn provide(&self, provider: WalletProvider) -> Option<SessionManager> {
        let mut slot = match self.slot.write() {
            Ok(slot) => slot,
            Err(poisoned) => poisoned.into_inner(),
        };
        let previous = slot.replace(provider.into_manager());
        if let Some(previous) = &previous {
            previous.shutdown();
        }
        previous
    }

    /// Remove and shut down the mounted manager
    pub fn unmount(&self) -> Option<SessionManager> {
        let mut slot = match self.slot.write() {
            Ok(slot) => slot,
            Err(poisoned) => poisoned.into_inner(),
        };
        let manager = slot.take();
        if let Some(manager) = &manager {
            manager.shutdown();
        }
        manager
    }

    pub fn is_mounted(&self) -> bool {
        self.slot
            .read()
            .map(|slot| slot.is_some())
            .unwrap_or(false)
    }

    /// Get the mounted session
    ///
    /// # Panics
    ///
    /// Panics when no provider is mounted.
    pub fn use_wallet(&self) -> SessionManager {
        match self.try_use_wallet() {
            Ok(manager) => manager,
            Err(e) => panic!("{}", e),
        }
    }

    pub fn try_use_wallet(&self) -> Result<SessionManager, SessionError> {
        let slot = self.slot.read().map_err(|_| SessionError::OutsideProvider)?;
        slot.clone().ok_or(SessionError::OutsideProvider)
    }
}
