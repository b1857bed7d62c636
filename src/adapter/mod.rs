//! Wallet SDK adapter
//!
//! The boundary to the third-party wallet-connect client. The session manager
//! only talks to a wallet through this trait, and receives it as an explicit
//! constructor argument.

pub mod mock;

pub use mock::MockWallet;

use async_trait::async_trait;
use std::sync::Arc;

use crate::error::AdapterError;

/// Callback fired when the wallet ends the session on its own
pub type DisconnectHandler = Arc<dyn Fn() + Send + Sync>;

/// Identifies one registration of a disconnect handler
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HandlerId(pub u64);

#[async_trait]
pub trait WalletAdapter: Send + Sync {
    /// Ask the user to connect; resolves with the authorized account addresses
    async fn connect(&self) -> Result<Vec<String>, AdapterError>;

    /// Restore a previously authorized session without user interaction
    ///
    /// Resolves with an empty list when there is no prior session.
    async fn reconnect_session(&self) -> Result<Vec<String>, AdapterError>;

    /// Best-effort session teardown
    fn disconnect(&self) -> Result<(), AdapterError>;

    /// Register the handler for unsolicited disconnects, replacing any previous one
    fn on_disconnect(&self, handler: DisconnectHandler) -> HandlerId;

    /// Remove the handler registered under `id`; a stale id leaves the
    /// current handler in place
    fn off_disconnect(&self, id: HandlerId);
}
