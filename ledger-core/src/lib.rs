//! Account Ledger Core
//!
//! Single-process account ledger: balances plus an append-only transaction
//! log per account, mirrored to one JSON file on every mutation.
//!
//! # Architecture
//!
//! - **Entities**: [`Account`] owns its ordered [`types::Transaction`] log
//! - **Storage**: one `RwLock`-guarded map, whole-file rewrite per save
//! - **Service**: deposit, withdraw, transfer, balance, statement
//! - **Ledger**: the calls a front end makes (create, select, list)
//!
//! # Invariants
//!
//! - Balance never goes negative after a completed operation
//! - Transaction logs are append-only, oldest first
//! - Money is exact decimal, never binary floating point
//! - A transfer reaches the file as one write covering both accounts

#![forbid(unsafe_code)]
#![warn(
    missing_docs,
    rust_2018_idioms,
    missing_debug_implementations,
    clippy::all
)]

pub mod config;
pub mod error;
pub mod ledger;
pub mod metrics;
pub mod service;
pub mod storage;
pub mod types;

// Re-exports
pub use config::{Config, StatementConfig};
pub use error::{Error, Result};
pub use ledger::{AccountSummary, Ledger};
pub use service::AccountService;
pub use storage::Storage;
pub use types::{Account, AccountId, Transaction, TransactionId, TransactionKind};
