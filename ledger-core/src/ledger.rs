//! Front-end facing ledger API
//!
//! This module ties together configuration, storage and the account service
//! into the calls a front end makes: create, select and list accounts, then
//! drive one account through an [`AccountService`].
//!
//! # Example
//!
//! ```no_run
//! use account_ledger::{Config, Ledger};
//! use rust_decimal::Decimal;
//!
//! fn main() -> account_ledger::Result<()> {
//!     let ledger = Ledger::open(Config::default())?;
//!
//!     let alice = ledger.create_account("Alice")?;
//!     let mut service = ledger.service_for(alice);
//!     service.deposit(Decimal::new(100, 0))?;
//!
//!     println!("{}", service.statement());
//!     Ok(())
//! }
//! ```

use crate::{
    service::AccountService,
    types::{Account, AccountId},
    Config, Result, Storage,
};
use rust_decimal::Decimal;
use std::sync::Arc;

/// Row of the account listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountSummary {
    /// Account ID
    pub id: AccountId,
    /// Owner display name
    pub owner: String,
    /// Current balance
    pub balance: Decimal,
}

/// Main ledger interface
#[derive(Debug)]
pub struct Ledger {
    storage: Arc<Storage>,
    config: Config,
}

impl Ledger {
    /// Open the ledger described by `config`.
    ///
    /// A persistence error here means the backing file exists but cannot be
    /// read; front ends treat it as a fatal startup failure.
    pub fn open(config: Config) -> Result<Self> {
        config.validate()?;
        let storage = Arc::new(Storage::from_config(&config)?);
        Ok(Self { storage, config })
    }

    /// Open without creating the data directory.
    ///
    /// For read-only callers: a missing file or directory gives an empty
    /// ledger and nothing is written until the first save.
    pub fn open_existing(config: Config) -> Result<Self> {
        config.validate()?;
        let storage = Arc::new(Storage::open(&config.data_file)?);
        Ok(Self { storage, config })
    }

    /// Create and persist a new account
    pub fn create_account(&self, owner: &str) -> Result<Account> {
        let account = Account::new(owner)?;
        self.storage.save(&account)?;

        tracing::info!(account_id = %account.id(), owner = account.owner(), "Account created");
        Ok(account)
    }

    /// Snapshot of an existing account
    pub fn load_account(&self, account_id: &AccountId) -> Result<Account> {
        self.storage.load(account_id)
    }

    /// Every account, sorted by owner then ID
    pub fn list_accounts(&self) -> Vec<AccountSummary> {
        let mut rows: Vec<AccountSummary> = self
            .storage
            .list_all()
            .into_iter()
            .map(|account| AccountSummary {
                id: account.id().clone(),
                owner: account.owner().to_string(),
                balance: account.balance(),
            })
            .collect();

        rows.sort_by(|a, b| a.owner.cmp(&b.owner).then_with(|| a.id.cmp(&b.id)));
        rows
    }

    /// Bind an account service to `account`
    pub fn service_for(&self, account: Account) -> AccountService {
        AccountService::with_validated_statement(
            account,
            Arc::clone(&self.storage),
            self.config.statement.clone(),
        )
    }

    /// Shared storage handle
    pub fn storage(&self) -> &Arc<Storage> {
        &self.storage
    }

    /// Active configuration
    pub fn config(&self) -> &Config {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{types::TransactionKind, Error};

    fn create_test_ledger() -> (Ledger, tempfile::TempDir) {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.data_file = temp_dir.path().join("accounts.json");

        (Ledger::open(config).unwrap(), temp_dir)
    }

    #[test]
    fn test_create_account_is_persisted() {
        let (ledger, _temp) = create_test_ledger();
        let account = ledger.create_account("Alice").unwrap();

        assert_eq!(account.balance(), Decimal::ZERO);
        assert_eq!(ledger.load_account(account.id()).unwrap(), account);

        let reopened = Ledger::open(ledger.config().clone()).unwrap();
        assert_eq!(reopened.load_account(account.id()).unwrap(), account);
    }

    #[test]
    fn test_open_rejects_bad_date_format() {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.data_file = temp_dir.path().join("accounts.json");
        config.statement.date_format = "%Q".to_string();

        assert!(matches!(Ledger::open(config), Err(Error::Config(_))));
    }

    #[test]
    fn test_open_existing_creates_nothing() {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.data_file = temp_dir.path().join("data/accounts.json");

        let ledger = Ledger::open_existing(config).unwrap();
        assert!(ledger.list_accounts().is_empty());
        assert!(!temp_dir.path().join("data").exists());
    }

    #[test]
    fn test_create_account_empty_owner() {
        let (ledger, _temp) = create_test_ledger();
        assert!(matches!(ledger.create_account(""), Err(Error::InvalidOwner)));
        assert!(ledger.list_accounts().is_empty());
    }

    #[test]
    fn test_load_unknown_account() {
        let (ledger, _temp) = create_test_ledger();
        let err = ledger.load_account(&AccountId::new("unknown-id")).unwrap_err();
        assert!(matches!(err, Error::AccountNotFound(_)));
    }

    #[test]
    fn test_list_accounts_sorted() {
        let (ledger, _temp) = create_test_ledger();
        let carol = ledger.create_account("Carol").unwrap();
        let alice = ledger.create_account("Alice").unwrap();

        let mut service = ledger.service_for(alice.clone());
        service.deposit(Decimal::new(15, 0)).unwrap();

        let rows = ledger.list_accounts();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].id, *alice.id());
        assert_eq!(rows[0].balance, Decimal::new(15, 0));
        assert_eq!(rows[1].id, *carol.id());
        assert_eq!(rows[1].owner, "Carol");
    }

    #[test]
    fn test_alice_and_bob_scenario() {
        let (ledger, _temp) = create_test_ledger();

        let alice = ledger.create_account("Alice").unwrap();
        assert_eq!(alice.balance(), Decimal::ZERO);

        let mut alice = ledger.service_for(alice);
        alice.deposit(Decimal::new(100, 0)).unwrap();
        assert_eq!(alice.balance(), Decimal::new(100, 0));
        assert_eq!(alice.account().transactions().len(), 1);
        assert_eq!(alice.account().transactions()[0].kind, TransactionKind::Deposit);

        let bob = ledger.create_account("Bob").unwrap();
        assert_eq!(bob.balance(), Decimal::ZERO);

        let mut bob = ledger.load_account(bob.id()).unwrap();
        alice.transfer(&mut bob, Decimal::new(40, 0)).unwrap();
        assert_eq!(alice.balance(), Decimal::new(60, 0));
        assert_eq!(bob.balance(), Decimal::new(40, 0));

        let out = alice.account().transactions().last().unwrap();
        assert_eq!(out.kind, TransactionKind::Transfer);
        assert_eq!(out.target_account_id.as_ref(), Some(bob.id()));
        let inbound = bob.transactions().last().unwrap();
        assert_eq!(inbound.kind, TransactionKind::Transfer);
        assert_eq!(inbound.target_account_id, None);

        let err = alice.withdraw(Decimal::new(1000, 0)).unwrap_err();
        assert!(matches!(err, Error::InsufficientFunds { .. }));
        assert_eq!(alice.balance(), Decimal::new(60, 0));

        let stored_alice = ledger.load_account(alice.account().id()).unwrap();
        let stored_bob = ledger.load_account(bob.id()).unwrap();
        assert_eq!(stored_alice.balance(), Decimal::new(60, 0));
        assert_eq!(stored_bob.balance(), Decimal::new(40, 0));
    }
}
