//! Wallet connection state and its reducer

use serde::Serialize;

use crate::account::WalletAccount;

/// Snapshot of the wallet connection
///
/// Only [`reduce`] produces new states, so every value observed by a consumer
/// satisfies the connection invariants (see [`WalletState::is_consistent`]).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletState {
    is_connected: bool,
    account: Option<WalletAccount>,
    is_connecting: bool,
    error: Option<String>,
}

/// The four transitions of the session state machine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WalletAction {
    ConnectRequest,
    ConnectSuccess(WalletAccount),
    ConnectFailure(String),
    Disconnect,
}

impl WalletState {
    pub fn is_connected(&self) -> bool {
        self.is_connected
    }

    pub fn account(&self) -> Option<&WalletAccount> {
        self.account.as_ref()
    }

    pub fn is_connecting(&self) -> bool {
        self.is_connecting
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Address of the connected account, if any
    pub fn address(&self) -> Option<&str> {
        self.account.as_ref().map(WalletAccount::address)
    }

    /// Check the connection invariants
    ///
    /// - connected implies an account and no error
    /// - connecting implies not connected
    /// - an error implies not connected and no account
    pub fn is_consistent(&self) -> bool {
        let connected_ok = !self.is_connected || (self.account.is_some() && self.error.is_none());
        let connecting_ok = !self.is_connecting || !self.is_connected;
        let error_ok = self.error.is_none() || (!self.is_connected && self.account.is_none());
        connected_ok && connecting_ok && error_ok
    }
}

/// Apply an action to a state
///
/// Total over every (state, action) pair. A connect request keeps the last
/// account but drops the connected flag while the attempt is pending.
pub fn reduce(state: &WalletState, action: WalletAction) -> WalletState {
    let next = match action {
        WalletAction::ConnectRequest => WalletState {
            is_connected: false,
            account: state.account.clone(),
            is_connecting: true,
            error: None,
        },
        WalletAction::ConnectSuccess(account) => WalletState {
            is_connected: true,
            account: Some(account),
            is_connecting: false,
            error: None,
        },
        WalletAction::ConnectFailure(message) => WalletState {
            is_connected: false,
            account: None,
            is_connecting: false,
            error: Some(message),
        },
        WalletAction::Disconnect => WalletState::default(),
    };
    debug_assert!(next.is_consistent());
    next
}
