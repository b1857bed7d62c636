//! Scripted in-memory wallet
//!
//! Plays back queued connect responses and lets callers emit disconnect
//! events, standing in for a real wallet app during development and tests.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use super::{DisconnectHandler, HandlerId, WalletAdapter};
use crate::error::AdapterError;

type Response = Result<Vec<String>, AdapterError>;

struct ScriptedResponse {
    delay: Option<Duration>,
    response: Response,
}

pub struct MockWallet {
    connect_queue: Mutex<VecDeque<ScriptedResponse>>,
    /// Returned when the connect queue is empty
    default_accounts: Mutex<Vec<String>>,
    reconnect: Mutex<Response>,
    handler: Mutex<Option<(HandlerId, DisconnectHandler)>>,
    next_handler_id: AtomicU64,
    connect_calls: AtomicUsize,
    disconnect_calls: AtomicUsize,
    fail_disconnect: AtomicBool,
}

impl MockWallet {
    /// A wallet with no accounts and no prior session
    pub fn new() -> Self {
        Self {
            connect_queue: Mutex::new(VecDeque::new()),
            default_accounts: Mutex::new(Vec::new()),
            reconnect: Mutex::new(Ok(Vec::new())),
            handler: Mutex::new(None),
            next_handler_id: AtomicU64::new(1),
            connect_calls: AtomicUsize::new(0),
            disconnect_calls: AtomicUsize::new(0),
            fail_disconnect: AtomicBool::new(false),
        }
    }

    /// A wallet that authorizes the given accounts on every connect
    pub fn with_accounts<I, S>(accounts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let wallet = Self::new();
        if let Ok(mut default_accounts) = wallet.default_accounts.lock() {
            *default_accounts = accounts.into_iter().map(Into::into).collect();
        }
        wallet
    }

    /// Queue the result of the next connect call
    pub fn push_connect(&self, response: Response) {
        self.push_connect_delayed(None, response);
    }

    /// Queue the result of the next connect call, resolved after an optional delay
    pub fn push_connect_delayed(&self, delay: Option<Duration>, response: Response) {
        if let Ok(mut queue) = self.connect_queue.lock() {
            queue.push_back(ScriptedResponse { delay, response });
        }
    }

    /// Set what `reconnect_session` resolves with
    pub fn set_reconnect(&self, response: Response) {
        if let Ok(mut reconnect) = self.reconnect.lock() {
            *reconnect = response;
        }
    }

    /// Make `disconnect` report a failure
    pub fn set_fail_disconnect(&self, fail: bool) {
        self.fail_disconnect.store(fail, Ordering::SeqCst);
    }

    /// Simulate the user ending the session from their wallet app
    ///
    /// Returns whether a handler was registered to receive it.
    pub fn emit_disconnect(&self) -> bool {
        // Clone out so the handler runs without holding the lock
        let handler = self
            .handler
            .lock()
            .ok()
            .and_then(|h| h.as_ref().map(|(_, handler)| handler.clone()));
        match handler {
            Some(handler) => {
                handler();
                true
            }
            None => false,
        }
    }

    pub fn has_disconnect_handler(&self) -> bool {
        self.handler.lock().map(|h| h.is_some()).unwrap_or(false)
    }

    pub fn connect_calls(&self) -> usize {
        self.connect_calls.load(Ordering::SeqCst)
    }

    pub fn disconnect_calls(&self) -> usize {
        self.disconnect_calls.load(Ordering::SeqCst)
    }
}

impl Default for MockWallet {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl WalletAdapter for MockWallet {
    async fn connect(&self) -> Result<Vec<String>, AdapterError> {
        self.connect_calls.fetch_add(1, Ordering::SeqCst);

        let scripted = self
            .connect_queue
            .lock()
            .map_err(|_| AdapterError::transport("mock wallet lock poisoned"))?
            .pop_front();

        match scripted {
            Some(ScriptedResponse { delay, response }) => {
                if let Some(delay) = delay {
                    tokio::time::sleep(delay).await;
                }
                response
            }
            None => {
                let accounts = self
                    .default_accounts
                    .lock()
                    .map_err(|_| AdapterError::transport("mock wallet lock poisoned"))?;
                Ok(accounts.clone())
            }
        }
    }

    async fn reconnect_session(&self) -> Result<Vec<String>, AdapterError> {
        let response = self
            .reconnect
            .lock()
            .map_err(|_| AdapterError::transport("mock wallet lock poisoned"))?
            .clone();
        response
    }

    fn disconnect(&self) -> Result<(), AdapterError> {
        self.disconnect_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_disconnect.load(Ordering::SeqCst) {
            return Err(AdapterError::transport("bridge unreachable"));
        }
        Ok(())
    }

    fn on_disconnect(&self, handler: DisconnectHandler) -> HandlerId {
        let id = HandlerId(self.next_handler_id.fetch_add(1, Ordering::SeqCst));
        if let Ok(mut slot) = self.handler.lock() {
            *slot = Some((id, handler));
        }
        id
    }

    fn off_disconnect(&self, id: HandlerId) {
        if let Ok(mut slot) = self.handler.lock() {
            if slot.as_ref().is_some_and(|(current, _)| *current == id) {
                *slot = None;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_connect_plays_queue_then_default() {
        let wallet = MockWallet::with_accounts(["DEFAULT1"]);
        wallet.push_connect(Err(AdapterError::rejected("user closed modal")));

        assert!(matches!(
            wallet.connect().await,
            Err(AdapterError::Rejected(_))
        ));
        assert_eq!(wallet.connect().await.unwrap(), vec!["DEFAULT1".to_string()]);
        assert_eq!(wallet.connect_calls(), 2);
    }

    #[tokio::test]
    async fn test_reconnect_defaults_to_empty() {
        let wallet = MockWallet::new();
        assert!(wallet.reconnect_session().await.unwrap().is_empty());
    }

    #[test]
    fn test_emit_disconnect_reaches_handler() {
        let wallet = MockWallet::new();
        assert!(!wallet.emit_disconnect());

        let fired = Arc::new(AtomicUsize::new(0));
        let counter = fired.clone();
        let id = wallet.on_disconnect(Arc::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        }));
        assert!(wallet.emit_disconnect());
        assert_eq!(fired.load(Ordering::SeqCst), 1);

        wallet.off_disconnect(id);
        assert!(!wallet.has_disconnect_handler());
        assert!(!wallet.emit_disconnect());
    }

    #[test]
    fn test_stale_id_keeps_current_handler() {
        let wallet = MockWallet::new();
        let first = wallet.on_disconnect(Arc::new(|| {}));
        let second = wallet.on_disconnect(Arc::new(|| {}));
        assert_ne!(first, second);

        wallet.off_disconnect(first);
        assert!(wallet.has_disconnect_handler());

        wallet.off_disconnect(second);
        assert!(!wallet.has_disconnect_handler());
    }

    #[test]
    fn test_disconnect_failure() {
        let wallet = MockWallet::new();
        wallet.set_fail_disconnect(true);
        assert!(wallet.disconnect().is_err());
        assert_eq!(wallet.disconnect_calls(), 1);
    }
}
