//! Common test utilities for session integration tests
//!
//! - Logger setup
//! - A session wired to a scripted wallet and an in-memory store
#![allow(dead_code)]

use std::sync::Arc;

use bounty_session::{
    MemoryStore, MockWallet, SessionConfig, SessionManager, SessionStore, WALLET_ACCOUNT_KEY,
};

pub fn init_logger() {
    env_logger::builder()
        .filter_level(log::LevelFilter::Debug)
        .is_test(true)
        .try_init()
        .ok();
}

/// Session under test with handles to its collaborators
pub struct TestSession {
    pub wallet: Arc<MockWallet>,
    pub store: Arc<MemoryStore>,
    pub manager: SessionManager,
}

impl TestSession {
    pub fn new() -> Self {
        Self::with_parts(MockWallet::new(), MemoryStore::new(), SessionConfig::default())
    }

    pub fn with_wallet(wallet: MockWallet) -> Self {
        Self::with_parts(wallet, MemoryStore::new(), SessionConfig::default())
    }

    pub fn with_parts(wallet: MockWallet, store: MemoryStore, config: SessionConfig) -> Self {
        init_logger();
        let wallet = Arc::new(wallet);
        let store = Arc::new(store);
        let manager = SessionManager::new(wallet.clone(), store.clone(), &config);
        Self {
            wallet,
            store,
            manager,
        }
    }

    /// Raw persisted record, if any
    pub fn stored_record(&self) -> Option<String> {
        self.store
            .get(WALLET_ACCOUNT_KEY)
            .expect("memory store read")
    }
}

/// Config with connect serialization switched off and no submission delay
pub fn racing_config() -> SessionConfig {
    SessionConfig {
        serialize_connects: false,
        submission_delay: std::time::Duration::ZERO,
        ..Default::default()
    }
}
