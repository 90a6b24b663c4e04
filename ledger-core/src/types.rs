//! Core types for the ledger
//!
//! All types are designed for:
//! - Exact arithmetic (Decimal for money, never binary floats)
//! - Stable JSON serialization for the backing file
//! - Process-unique identifiers (UUIDv7, not raw wall-clock nanos)

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::error::{Error, Result};

/// Account identifier
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(String);

impl AccountId {
    /// Wrap an existing identifier (e.g. one typed by a user)
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate a fresh, process-unique account ID
    pub fn generate() -> Self {
        Self(format!("ACC-{}", Uuid::now_v7()))
    }

    /// Get as string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Transaction identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransactionId(String);

impl TransactionId {
    /// Generate a fresh, process-unique transaction ID
    pub fn generate() -> Self {
        Self(format!("TX-{}", Uuid::now_v7()))
    }

    /// Get as string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Kind of balance-affecting event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionKind {
    /// Money added to the account
    Deposit,
    /// Money taken out of the account
    Withdraw,
    /// One leg of a two-account transfer
    Transfer,
}

impl TransactionKind {
    /// Code used in statements and in the backing file
    pub fn code(&self) -> &'static str {
        match self {
            TransactionKind::Deposit => "DEPOSIT",
            TransactionKind::Withdraw => "WITHDRAW",
            TransactionKind::Transfer => "TRANSFER",
        }
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Immutable record of one balance-affecting event
///
/// Field aliases accept files written by the earlier, unversioned format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    /// Unique transaction ID
    #[serde(alias = "ID")]
    pub id: TransactionId,

    /// Deposit, withdraw or transfer
    #[serde(alias = "Type")]
    pub kind: TransactionKind,

    /// Always positive
    #[serde(alias = "Amount")]
    pub amount: Decimal,

    /// Time of append
    #[serde(alias = "Timestamp")]
    pub timestamp: DateTime<Utc>,

    /// Human-readable label
    #[serde(alias = "Description")]
    pub description: String,

    /// Counterparty, set only on the outbound (debit) transfer leg
    #[serde(
        alias = "TargetAccountID",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    pub target_account_id: Option<AccountId>,
}

/// Named balance holder with an append-only transaction log
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    #[serde(alias = "ID")]
    id: AccountId,

    #[serde(alias = "Owner")]
    owner: String,

    #[serde(alias = "Balance")]
    balance: Decimal,

    #[serde(alias = "Transactions", default, deserialize_with = "null_as_empty")]
    transactions: Vec<Transaction>,

    #[serde(alias = "CreatedAt")]
    created_at: DateTime<Utc>,
}

impl Account {
    /// Open a new account with zero balance and an empty log
    pub fn new(owner: &str) -> Result<Self> {
        let owner = owner.trim();
        if owner.is_empty() {
            return Err(Error::InvalidOwner);
        }

        Ok(Self {
            id: AccountId::generate(),
            owner: owner.to_string(),
            balance: Decimal::ZERO,
            transactions: Vec::new(),
            created_at: Utc::now(),
        })
    }

    /// Account ID
    pub fn id(&self) -> &AccountId {
        &self.id
    }

    /// Owner display name
    pub fn owner(&self) -> &str {
        &self.owner
    }

    /// Current balance
    pub fn balance(&self) -> Decimal {
        self.balance
    }

    /// Transaction log, oldest first
    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    /// Creation timestamp
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Append a transaction stamped with a fresh ID and the current time.
    ///
    /// Amount and kind are validated by the caller.
    pub fn append(
        &mut self,
        kind: TransactionKind,
        amount: Decimal,
        description: impl Into<String>,
        target_account_id: Option<AccountId>,
    ) {
        self.transactions.push(Transaction {
            id: TransactionId::generate(),
            kind,
            amount,
            timestamp: Utc::now(),
            description: description.into(),
            target_account_id,
        });
    }

    /// Balance after crediting `amount`, or `BalanceOverflow` if it does
    /// not fit in a Decimal. Does not mutate.
    pub fn balance_after_credit(&self, amount: Decimal) -> Result<Decimal> {
        self.balance
            .checked_add(amount)
            .ok_or_else(|| Error::BalanceOverflow {
                account_id: self.id.clone(),
                balance: self.balance,
                amount,
            })
    }

    /// Leaves the balance untouched on overflow
    pub(crate) fn credit(&mut self, amount: Decimal) -> Result<()> {
        self.balance = self.balance_after_credit(amount)?;
        Ok(())
    }

    /// Caller guarantees `0 < amount <= balance`, so this cannot overflow
    pub(crate) fn debit(&mut self, amount: Decimal) {
        self.balance -= amount;
    }
}

fn empty_string_as_none<'de, D>(deserializer: D) -> std::result::Result<Option<AccountId>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.filter(|s| !s.is_empty()).map(AccountId::new))
}

fn null_as_empty<'de, D>(deserializer: D) -> std::result::Result<Vec<Transaction>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<Vec<Transaction>> = Option::deserialize(deserializer)?;
    Ok(raw.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_new_account() {
        let account = Account::new("Alice").unwrap();
        assert_eq!(account.owner(), "Alice");
        assert_eq!(account.balance(), Decimal::ZERO);
        assert!(account.transactions().is_empty());
        assert!(account.id().as_str().starts_with("ACC-"));
    }

    #[test]
    fn test_new_account_rejects_blank_owner() {
        assert!(matches!(Account::new(""), Err(Error::InvalidOwner)));
        assert!(matches!(Account::new("   \t"), Err(Error::InvalidOwner)));
    }

    #[test]
    fn test_owner_is_trimmed() {
        let account = Account::new("  Bob ").unwrap();
        assert_eq!(account.owner(), "Bob");
    }

    #[test]
    fn test_ids_unique_under_rapid_generation() {
        let ids: HashSet<_> = (0..10_000).map(|_| TransactionId::generate()).collect();
        assert_eq!(ids.len(), 10_000);

        let accounts: HashSet<_> = (0..1_000)
            .map(|_| Account::new("Carol").unwrap().id().clone())
            .collect();
        assert_eq!(accounts.len(), 1_000);
    }

    #[test]
    fn test_append_preserves_order() {
        let mut account = Account::new("Alice").unwrap();
        account.append(TransactionKind::Deposit, Decimal::new(100, 0), "first", None);
        account.append(TransactionKind::Withdraw, Decimal::new(30, 0), "second", None);

        let log = account.transactions();
        assert_eq!(log.len(), 2);
        assert_eq!(log[0].description, "first");
        assert_eq!(log[1].kind, TransactionKind::Withdraw);
        assert!(log[0].timestamp <= log[1].timestamp);
        assert_ne!(log[0].id, log[1].id);
    }

    #[test]
    fn test_credit_overflow_leaves_balance() {
        let mut account = Account::new("Alice").unwrap();
        account.credit(Decimal::MAX).unwrap();

        let err = account.credit(Decimal::ONE).unwrap_err();
        assert!(matches!(err, Error::BalanceOverflow { amount, .. } if amount == Decimal::ONE));
        assert_eq!(account.balance(), Decimal::MAX);
    }

    #[test]
    fn test_kind_serialization() {
        let json = serde_json::to_string(&TransactionKind::Withdraw).unwrap();
        assert_eq!(json, "\"WITHDRAW\"");
        assert_eq!(TransactionKind::Transfer.to_string(), "TRANSFER");
    }

    #[test]
    fn test_legacy_transaction_fields() {
        let json = r#"{
            "ID": "TX1700000000000000000",
            "Type": "DEPOSIT",
            "Amount": 100.5,
            "Timestamp": "2024-03-01T10:15:30.123456789+03:00",
            "Description": "top-up",
            "TargetAccountID": ""
        }"#;

        let tx: Transaction = serde_json::from_str(json).unwrap();
        assert_eq!(tx.kind, TransactionKind::Deposit);
        assert_eq!(tx.amount, Decimal::new(1005, 1));
        assert_eq!(tx.target_account_id, None);
        assert_eq!(tx.timestamp.to_rfc3339(), "2024-03-01T07:15:30.123456789+00:00");
    }
}
