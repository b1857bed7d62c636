//! Wallet Session Manager - Orchestration Layer
//!
//! Owns the connection state, drives the wallet adapter, and keeps the
//! persisted account record in step with the state.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, Weak};

use tokio::sync::watch;

use crate::account::WalletAccount;
use crate::adapter::{HandlerId, WalletAdapter};
use crate::config::SessionConfig;
use crate::error::SessionError;
use crate::state::{reduce, WalletAction, WalletState};
use crate::store::{LoadError, PersistedSession, SessionStore};

/// Failure message when the wallet authorizes no accounts
pub const NO_ACCOUNTS_MESSAGE: &str = "No accounts found";

/// Failure message for any adapter error during connect
pub const CONNECT_FAILED_MESSAGE: &str = "Failed to connect wallet";

/// Result of a [`SessionManager::connect_wallet`] call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectOutcome {
    Connected(WalletAccount),
    /// The attempt failed; the message is also in the state's `error`
    Failed(String),
    /// Another connect was pending; nothing was done
    AlreadyConnecting,
}

/// Handle to a wallet session
///
/// Cheap to clone; all clones share one session. The adapter's disconnect
/// handler is deregistered on [`SessionManager::shutdown`] or when the last
/// handle is dropped.
#[derive(Clone)]
pub struct SessionManager {
    inner: Arc<Inner>,
}

struct Inner {
    adapter: Arc<dyn WalletAdapter>,
    session: PersistedSession,
    state_tx: watch::Sender<WalletState>,
    serialize_connects: bool,
    initialized: AtomicBool,
    connecting: AtomicBool,
    /// Registration of this session's disconnect handler, if active
    handler_id: Mutex<Option<HandlerId>>,
}

/// Marks a connect attempt in flight; released on drop so a cancelled
/// attempt does not block later ones
struct ConnectGuard<'a> {
    flag: Option<&'a AtomicBool>,
}

impl Drop for ConnectGuard<'_> {
    fn drop(&mut self) {
        if let Some(flag) = self.flag {
            flag.store(false, Ordering::Release);
        }
    }
}

impl SessionManager {
    // ============================================================================
    // Constructor
    // ============================================================================

    pub fn new(
        adapter: Arc<dyn WalletAdapter>,
        store: Arc<dyn SessionStore>,
        config: &SessionConfig,
    ) -> Self {
        let (state_tx, _) = watch::channel(WalletState::default());
        Self {
            inner: Arc::new(Inner {
                adapter,
                session: PersistedSession::new(store),
                state_tx,
                serialize_connects: config.serialize_connects,
                initialized: AtomicBool::new(false),
                connecting: AtomicBool::new(false),
                handler_id: Mutex::new(None),
            }),
        }
    }

    // ============================================================================
    // State access
    // ============================================================================

    /// Current state snapshot
    pub fn state(&self) -> WalletState {
        self.inner.state_tx.borrow().clone()
    }

    /// Receiver notified after every transition
    pub fn subscribe(&self) -> watch::Receiver<WalletState> {
        self.inner.state_tx.subscribe()
    }

    pub fn is_initialized(&self) -> bool {
        self.inner.initialized.load(Ordering::SeqCst)
    }

    // ============================================================================
    // Lifecycle
    // ============================================================================

    /// Restore the session: stored account first, then the wallet's own session
    ///
    /// Runs once; later calls log and return. Never fails: a corrupt record is
    /// discarded and a reconnect error leaves the restored state in place.
    pub async fn initialize(&self) {
        if self.inner.initialized.swap(true, Ordering::SeqCst) {
            log::warn!("Session manager already initialized, skipping");
            return;
        }

        self.hydrate_from_storage();
        self.register_disconnect_handler();
        self.reconnect().await;
    }

    /// Stop listening for wallet disconnect events
    pub fn shutdown(&self) {
        self.inner.deregister_disconnect_handler();
    }

    fn hydrate_from_storage(&self) {
        match self.inner.session.load() {
            Ok(Some(account)) => {
                log::debug!("Restored wallet account {} from storage", account.address());
                self.inner.dispatch(WalletAction::ConnectSuccess(account));
            }
            Ok(None) => {}
            Err(LoadError::Corrupt(e)) => {
                log::warn!("Discarding corrupt session record: {}", e);
                if let Err(e) = self.inner.session.clear() {
                    log::error!("Failed to remove corrupt session record: {}", e);
                }
            }
            Err(LoadError::Storage(e)) => {
                log::error!("Failed to read session record: {}", e);
            }
        }
    }

    fn register_disconnect_handler(&self) {
        // Weak so the adapter does not keep the session alive
        let inner: Weak<Inner> = Arc::downgrade(&self.inner);
        let id = self.inner.adapter.on_disconnect(Arc::new(move || {
            if let Some(inner) = inner.upgrade() {
                inner.handle_remote_disconnect();
            }
        }));
        if let Ok(mut handler_id) = self.inner.handler_id.lock() {
            *handler_id = Some(id);
        }
    }

    async fn reconnect(&self) {
        let accounts = match self.inner.adapter.reconnect_session().await {
            Ok(accounts) => accounts,
            Err(e) => {
                log::error!("Reconnect error: {}", e);
                return;
            }
        };

        let Some(address) = accounts.first() else {
            log::debug!("No prior wallet session to reconnect");
            return;
        };

        match WalletAccount::from_address(address.as_str()) {
            Ok(account) => {
                log::info!("Reconnected wallet session for {}", account.address());
                self.inner
                    .dispatch(WalletAction::ConnectSuccess(account.clone()));
                self.inner.persist(&account);
            }
            Err(e) => log::warn!("Ignoring reconnected account: {}", e),
        }
    }

    // ============================================================================
    // Actions
    // ============================================================================

    /// Ask the wallet for a connection
    ///
    /// Failures land in the state's `error` field and in the returned outcome;
    /// nothing is propagated as an error.
    pub async fn connect_wallet(&self) -> ConnectOutcome {
        let Some(_guard) = self.begin_connect() else {
            log::warn!("Connect requested while another connect is pending");
            return ConnectOutcome::AlreadyConnecting;
        };

        self.inner.dispatch(WalletAction::ConnectRequest);

        let account = match self.inner.adapter.connect().await {
            Ok(accounts) => match accounts.first() {
                Some(address) => WalletAccount::from_address(address.as_str()),
                None => return self.fail(NO_ACCOUNTS_MESSAGE),
            },
            Err(e) => {
                log::error!("Connection error: {}", e);
                return self.fail(CONNECT_FAILED_MESSAGE);
            }
        };

        match account {
            Ok(account) => {
                log::info!("Connected wallet account {}", account.address());
                self.inner
                    .dispatch(WalletAction::ConnectSuccess(account.clone()));
                self.inner.persist(&account);
                ConnectOutcome::Connected(account)
            }
            Err(e) => {
                log::error!("Connection error: {}", e);
                self.fail(CONNECT_FAILED_MESSAGE)
            }
        }
    }

    /// Tear down the session
    ///
    /// State is reset and the stored record removed whatever the adapter
    /// reports; the returned error is informational and may be ignored.
    pub fn disconnect_wallet(&self) -> Result<(), SessionError> {
        let adapter_result = self.inner.adapter.disconnect();
        if let Err(e) = &adapter_result {
            log::warn!("Wallet disconnect reported an error: {}", e);
        }

        let storage_result = self.inner.session.clear();
        if let Err(e) = &storage_result {
            log::error!("Failed to remove session record: {}", e);
        }

        self.inner.dispatch(WalletAction::Disconnect);

        adapter_result?;
        storage_result?;
        Ok(())
    }

    fn begin_connect(&self) -> Option<ConnectGuard<'_>> {
        if !self.inner.serialize_connects {
            return Some(ConnectGuard { flag: None });
        }
        self.inner
            .connecting
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| ConnectGuard {
                flag: Some(&self.inner.connecting),
            })
    }

    fn fail(&self, message: &str) -> ConnectOutcome {
        self.inner
            .dispatch(WalletAction::ConnectFailure(message.to_string()));
        ConnectOutcome::Failed(message.to_string())
    }
}

impl Inner {
    fn dispatch(&self, action: WalletAction) {
        self.state_tx.send_modify(|state| {
            let next = reduce(state, action);
            *state = next;
        });
    }

    fn persist(&self, account: &WalletAccount) {
        if let Err(e) = self.session.save(account) {
            log::error!("Failed to persist wallet account: {}", e);
        }
    }

    fn handle_remote_disconnect(&self) {
        log::info!("Wallet ended the session");
        self.dispatch(WalletAction::Disconnect);
        if let Err(e) = self.session.clear() {
            log::error!("Failed to remove session record: {}", e);
        }
    }

    fn deregister_disconnect_handler(&self) {
        let id = match self.handler_id.lock() {
            Ok(mut handler_id) => handler_id.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        };
        if let Some(id) = id {
            self.adapter.off_disconnect(id);
            log::debug!("Wallet disconnect handler {:?} deregistered", id);
        }
    }
}

impl Drop for Inner {
    fn drop(&mut self) {
        self.deregister_disconnect_handler();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::MockWallet;
    use crate::error::AdapterError;
    use crate::store::{MemoryStore, WALLET_ACCOUNT_KEY};

    fn manager_with(wallet: Arc<MockWallet>, store: Arc<MemoryStore>) -> SessionManager {
        SessionManager::new(wallet, store, &SessionConfig::default())
    }

    #[tokio::test]
    async fn test_connect_success_persists() {
        let wallet = Arc::new(MockWallet::with_accounts(["ABCD...WXYZ", "SECOND"]));
        let store = Arc::new(MemoryStore::new());
        let manager = manager_with(wallet, store.clone());

        let outcome = manager.connect_wallet().await;
        let state = manager.state();

        assert!(matches!(outcome, ConnectOutcome::Connected(_)));
        assert!(state.is_connected());
        assert_eq!(state.address(), Some("ABCD...WXYZ"));
        assert!(store.get(WALLET_ACCOUNT_KEY).unwrap().is_some());
    }

    #[tokio::test]
    async fn test_connect_rejected() {
        let wallet = Arc::new(MockWallet::new());
        wallet.push_connect(Err(AdapterError::rejected("user closed modal")));
        let store = Arc::new(MemoryStore::new());
        let manager = manager_with(wallet, store.clone());

        let outcome = manager.connect_wallet().await;

        assert_eq!(
            outcome,
            ConnectOutcome::Failed(CONNECT_FAILED_MESSAGE.to_string())
        );
        assert_eq!(manager.state().error(), Some(CONNECT_FAILED_MESSAGE));
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_connect_empty_address_is_failure() {
        let wallet = Arc::new(MockWallet::with_accounts([""]));
        let manager = manager_with(wallet, Arc::new(MemoryStore::new()));

        let outcome = manager.connect_wallet().await;
        assert_eq!(
            outcome,
            ConnectOutcome::Failed(CONNECT_FAILED_MESSAGE.to_string())
        );
        assert!(manager.state().is_consistent());
    }

    #[tokio::test]
    async fn test_guard_released_after_connect() {
        let wallet = Arc::new(MockWallet::with_accounts(["ADDRESS1"]));
        let manager = manager_with(wallet.clone(), Arc::new(MemoryStore::new()));

        manager.connect_wallet().await;
        manager.connect_wallet().await;
        assert_eq!(wallet.connect_calls(), 2);
    }

    #[tokio::test]
    async fn test_subscriber_sees_transition() {
        let wallet = Arc::new(MockWallet::with_accounts(["ADDRESS1"]));
        let manager = manager_with(wallet, Arc::new(MemoryStore::new()));
        let mut rx = manager.subscribe();

        manager.connect_wallet().await;

        assert!(rx.has_changed().unwrap());
        assert!(rx.borrow_and_update().is_connected());
    }

    #[tokio::test]
    async fn test_initialize_runs_once() {
        let wallet = Arc::new(MockWallet::new());
        let manager = manager_with(wallet.clone(), Arc::new(MemoryStore::new()));

        manager.initialize().await;
        assert!(manager.is_initialized());
        manager.shutdown();

        manager.initialize().await;
        assert!(!wallet.has_disconnect_handler());
    }

    #[tokio::test]
    async fn test_drop_deregisters_handler() {
        let wallet = Arc::new(MockWallet::new());
        let manager = manager_with(wallet.clone(), Arc::new(MemoryStore::new()));
        manager.initialize().await;
        assert!(wallet.has_disconnect_handler());

        drop(manager);
        assert!(!wallet.has_disconnect_handler());
    }

    #[tokio::test]
    async fn test_stale_shutdown_keeps_newer_handler() {
        let wallet = Arc::new(MockWallet::with_accounts(["SHARED01"]));
        let old = manager_with(wallet.clone(), Arc::new(MemoryStore::new()));
        let current = manager_with(wallet.clone(), Arc::new(MemoryStore::new()));
        old.initialize().await;
        current.initialize().await;

        old.shutdown();
        current.connect_wallet().await;

        assert!(wallet.emit_disconnect());
        assert!(!current.state().is_connected());
    }
}
