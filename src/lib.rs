//! Bounty Session: wallet sessions for the task bounty marketplace
//!
//! This crate tracks the wallet connection a user makes through a
//! wallet-connect SDK, caches the connected account in local storage, and
//! exposes the session to task views that authorize work submissions.
//!
//! # Architecture
//!
//! - **Session Manager**: owns the connection state and drives the adapter
//! - **Wallet Adapter**: trait over the external wallet-connect client
//! - **Session Store**: local key-value storage for the last connected account
//! - **Provider Scope**: fail-fast access to the mounted session
//! - **Submission**: task board and the claimant checks for submitting work
//!
//! # Example
//!
//! ```ignore
//! use bounty_session::{MemoryStore, MockWallet, SessionConfig, WalletProvider, WalletScope};
//!
//! let scope = WalletScope::new();
//! let provider = WalletProvider::mount(
//!     Arc::new(MockWallet::with_accounts(["7ZUECA7HFLZT...HAIOF6Q"])),
//!     Arc::new(MemoryStore::new()),
//!     &SessionConfig::from_env(),
//! ).await;
//! scope.provide(provider);
//!
//! let wallet = scope.use_wallet();
//! wallet.connect_wallet().await;
//! assert!(wallet.state().is_connected());
//! ```

// Public modules
pub mod account;
pub mod adapter;
pub mod config;
pub mod error;
pub mod manager;
pub mod provider;
pub mod state;
pub mod store;
pub mod submission;

// Re-exports for convenience
pub use account::{display_name, WalletAccount};
pub use adapter::{DisconnectHandler, HandlerId, MockWallet, WalletAdapter};
pub use config::SessionConfig;
pub use error::{AdapterError, SessionError, StorageError, SubmissionError};
pub use manager::{ConnectOutcome, SessionManager, CONNECT_FAILED_MESSAGE, NO_ACCOUNTS_MESSAGE};
pub use provider::{WalletProvider, WalletScope};
pub use state::{reduce, WalletAction, WalletState};
pub use store::{
    FileStore, LoadError, MemoryStore, PersistedSession, SessionStore, WALLET_ACCOUNT_KEY,
};
pub use submission::{
    authorize_submission, days_left, validate_submission_link, Reward, SubmissionForm,
    SubmissionReceipt, SubmissionService, Task, TaskBoard, TaskStatus,
};

// Common result type
pub type Result<T> = std::result::Result<T, SessionError>;
