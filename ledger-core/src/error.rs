//! Error types for the ledger

use crate::types::AccountId;
use rust_decimal::Decimal;
use thiserror::Error;

/// Result type for ledger operations
pub type Result<T> = std::result::Result<T, Error>;

/// Ledger errors
#[derive(Error, Debug)]
pub enum Error {
    /// Amount is zero or negative
    #[error("Invalid amount: {0} (must be positive)")]
    InvalidAmount(Decimal),

    /// Withdrawal or transfer exceeds the available balance
    #[error("Insufficient funds: requested {requested}, available {available}")]
    InsufficientFunds {
        /// Amount the caller asked for
        requested: Decimal,
        /// Balance at the time of the request
        available: Decimal,
    },

    /// Transfer target is the source account
    #[error("Cannot transfer to the same account: {0}")]
    SameAccountTransfer(AccountId),

    /// Owner name is empty or blank
    #[error("Invalid owner: name must not be empty")]
    InvalidOwner,

    /// Credit would push the balance past the largest representable amount
    #[error("Balance overflow on account {account_id}: {balance} + {amount}")]
    BalanceOverflow {
        /// Account that would overflow
        account_id: AccountId,
        /// Balance before the credit
        balance: Decimal,
        /// Amount being credited
        amount: Decimal,
    },

    /// Account lookup miss
    #[error("Account not found: {0}")]
    AccountNotFound(String),

    /// Serialization or file I/O failure
    #[error("Persistence error: {0}")]
    Persistence(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// True when the failure happened after in-memory state was already
    /// mutated, so the caller must treat the outcome as indeterminate.
    pub fn is_persistence(&self) -> bool {
        matches!(self, Error::Persistence(_))
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Persistence(format!("I/O failure: {}", err))
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Persistence(format!("serialization failure: {}", err))
    }
}
