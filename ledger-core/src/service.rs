//! Account operations
//!
//! [`AccountService`] is bound to one working copy of an account and the
//! shared [`Storage`]. Every accepted mutation is saved before it is
//! reported as successful.
//!
//! # Failure model
//!
//! Validation happens before any state change. A persistence failure is
//! reported after the in-memory change has been applied and is not rolled
//! back; callers seeing [`Error::Persistence`] must treat the outcome as
//! applied in memory but not necessarily on disk.

use crate::{
    config::StatementConfig,
    types::{Account, TransactionKind},
    Error, Result, Storage,
};
use rust_decimal::Decimal;
use std::fmt::Write;
use std::sync::Arc;

/// Business operations on one account
#[derive(Debug)]
pub struct AccountService {
    account: Account,
    storage: Arc<Storage>,
    statement: StatementConfig,
}

impl AccountService {
    /// Bind to `account` and `storage`
    pub fn new(account: Account, storage: Arc<Storage>) -> Self {
        Self {
            account,
            storage,
            statement: StatementConfig::default(),
        }
    }

    /// Override statement rendering. Rejects an invalid date format.
    pub fn with_statement_config(mut self, statement: StatementConfig) -> Result<Self> {
        statement.validate()?;
        self.statement = statement;
        Ok(self)
    }

    /// Bind with a statement config the caller has already validated
    pub(crate) fn with_validated_statement(
        account: Account,
        storage: Arc<Storage>,
        statement: StatementConfig,
    ) -> Self {
        Self {
            account,
            storage,
            statement,
        }
    }

    /// The bound account
    pub fn account(&self) -> &Account {
        &self.account
    }

    /// Release the bound account
    pub fn into_account(self) -> Account {
        self.account
    }

    /// Add `amount` to the balance
    pub fn deposit(&mut self, amount: Decimal) -> Result<()> {
        self.check_positive(amount)?;
        self.check_credit(&self.account, amount)?;

        self.account.credit(amount)?;
        self.account.append(
            TransactionKind::Deposit,
            amount,
            format!("Deposit of {:.2}", amount),
            None,
        );

        tracing::debug!(account_id = %self.account.id(), amount = %amount, "Deposit applied");
        self.storage.metrics().deposits_total.inc();

        self.storage.save(&self.account)
    }

    /// Take `amount` out of the balance
    pub fn withdraw(&mut self, amount: Decimal) -> Result<()> {
        self.check_positive(amount)?;
        self.check_funds(amount)?;

        self.account.debit(amount);
        self.account.append(
            TransactionKind::Withdraw,
            amount,
            format!("Withdrawal of {:.2}", amount),
            None,
        );

        tracing::debug!(account_id = %self.account.id(), amount = %amount, "Withdrawal applied");
        self.storage.metrics().withdrawals_total.inc();

        self.storage.save(&self.account)
    }

    /// Move `amount` from the bound account to `target`.
    ///
    /// Both legs are written to the file in one rewrite, so the durable copy
    /// never shows one side of the transfer without the other. Only the
    /// outbound leg records the counterparty ID.
    pub fn transfer(&mut self, target: &mut Account, amount: Decimal) -> Result<()> {
        self.check_positive(amount)?;
        self.check_funds(amount)?;
        if target.id() == self.account.id() {
            return Err(self.reject(Error::SameAccountTransfer(target.id().clone())));
        }
        self.check_credit(target, amount)?;

        self.account.debit(amount);
        self.account.append(
            TransactionKind::Transfer,
            amount,
            format!("Transfer to account {}", target.id()),
            Some(target.id().clone()),
        );

        target.credit(amount)?;
        target.append(
            TransactionKind::Transfer,
            amount,
            format!("Transfer from account {}", self.account.id()),
            None,
        );

        tracing::debug!(
            from = %self.account.id(),
            to = %target.id(),
            amount = %amount,
            "Transfer applied"
        );
        self.storage.metrics().transfers_total.inc();

        self.storage.save_all(&[&self.account, &*target])
    }

    /// Current in-memory balance
    pub fn balance(&self) -> Decimal {
        self.account.balance()
    }

    /// Render the account header and its full transaction log
    pub fn statement(&self) -> String {
        let format = self.statement.date_format.as_str();
        let mut out = String::new();

        // date_format is validated whenever it is set, so these writes cannot fail
        let _ = writeln!(out, "Statement for account {}", self.account.id());
        let _ = writeln!(out, "Owner: {}", self.account.owner());
        let _ = writeln!(out, "Opened: {}", self.account.created_at().format(format));
        let _ = writeln!(out, "Current balance: {:.2}", self.account.balance());
        let _ = writeln!(out);
        let _ = writeln!(out, "Transaction history:");
        let _ = writeln!(out, "{}", "-".repeat(self.statement.ruler_width));

        for tx in self.account.transactions() {
            let _ = writeln!(
                out,
                "{} | {} | Amount: {:.2} | {}",
                tx.timestamp.format(format),
                tx.kind,
                tx.amount,
                tx.description
            );
        }

        if self.account.transactions().is_empty() {
            let _ = writeln!(out, "No transactions");
        }

        out
    }

    fn check_positive(&self, amount: Decimal) -> Result<()> {
        if amount <= Decimal::ZERO {
            return Err(self.reject(Error::InvalidAmount(amount)));
        }
        Ok(())
    }

    fn check_funds(&self, amount: Decimal) -> Result<()> {
        if amount > self.account.balance() {
            return Err(self.reject(Error::InsufficientFunds {
                requested: amount,
                available: self.account.balance(),
            }));
        }
        Ok(())
    }

    fn check_credit(&self, account: &Account, amount: Decimal) -> Result<()> {
        account
            .balance_after_credit(amount)
            .map(|_| ())
            .map_err(|e| self.reject(e))
    }

    fn reject(&self, err: Error) -> Error {
        tracing::warn!(account_id = %self.account.id(), error = %err, "Operation rejected");
        self.storage.metrics().record_rejected();
        err
    }
}
