//! Metrics collection for observability
//!
//! Each store owns its own Prometheus registry, so several stores (and
//! tests) can live in one process without name clashes.
//!
//! # Metrics
//!
//! - `ledger_deposits_total` - Accepted deposits
//! - `ledger_withdrawals_total` - Accepted withdrawals
//! - `ledger_transfers_total` - Accepted transfers
//! - `ledger_rejected_total` - Operations rejected by a business rule
//! - `ledger_saves_total` - Successful file rewrites
//! - `ledger_save_failures_total` - Failed file rewrites
//! - `ledger_save_duration_seconds` - Histogram of file rewrite latencies
//! - `ledger_accounts` - Accounts held by the store

use prometheus::{Histogram, HistogramOpts, IntCounter, IntGauge, Registry};
use std::sync::Arc;

/// Metrics collector
#[derive(Clone)]
pub struct Metrics {
    /// Accepted deposits
    pub deposits_total: IntCounter,

    /// Accepted withdrawals
    pub withdrawals_total: IntCounter,

    /// Accepted transfers
    pub transfers_total: IntCounter,

    /// Rejected operations
    pub rejected_total: IntCounter,

    /// Successful saves
    pub saves_total: IntCounter,

    /// Failed saves
    pub save_failures_total: IntCounter,

    /// Save duration histogram
    pub save_duration: Histogram,

    /// Number of stored accounts
    pub accounts: IntGauge,

    /// Prometheus registry
    pub registry: Arc<Registry>,
}

impl std::fmt::Debug for Metrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Metrics")
            .field("saves_total", &self.saves_total.get())
            .field("save_failures_total", &self.save_failures_total.get())
            .field("rejected_total", &self.rejected_total.get())
            .finish_non_exhaustive()
    }
}

impl Metrics {
    /// Create new metrics collector
    pub fn new() -> prometheus::Result<Self> {
        let registry = Arc::new(Registry::new());

        let deposits_total = IntCounter::new("ledger_deposits_total", "Accepted deposits")?;
        registry.register(Box::new(deposits_total.clone()))?;

        let withdrawals_total =
            IntCounter::new("ledger_withdrawals_total", "Accepted withdrawals")?;
        registry.register(Box::new(withdrawals_total.clone()))?;

        let transfers_total = IntCounter::new("ledger_transfers_total", "Accepted transfers")?;
        registry.register(Box::new(transfers_total.clone()))?;

        let rejected_total = IntCounter::new(
            "ledger_rejected_total",
            "Operations rejected by a business rule",
        )?;
        registry.register(Box::new(rejected_total.clone()))?;

        let saves_total = IntCounter::new("ledger_saves_total", "Successful file rewrites")?;
        registry.register(Box::new(saves_total.clone()))?;

        let save_failures_total =
            IntCounter::new("ledger_save_failures_total", "Failed file rewrites")?;
        registry.register(Box::new(save_failures_total.clone()))?;

        let save_duration = Histogram::with_opts(
            HistogramOpts::new(
                "ledger_save_duration_seconds",
                "Histogram of file rewrite latencies",
            )
            .buckets(vec![0.0005, 0.001, 0.005, 0.010, 0.025, 0.050, 0.100, 0.250, 1.0]),
        )?;
        registry.register(Box::new(save_duration.clone()))?;

        let accounts = IntGauge::new("ledger_accounts", "Accounts held by the store")?;
        registry.register(Box::new(accounts.clone()))?;

        Ok(Self {
            deposits_total,
            withdrawals_total,
            transfers_total,
            rejected_total,
            saves_total,
            save_failures_total,
            save_duration,
            accounts,
            registry,
        })
    }

    /// Record a successful save
    pub fn record_save(&self, duration_seconds: f64, account_count: usize) {
        self.saves_total.inc();
        self.save_duration.observe(duration_seconds);
        self.accounts.set(account_count as i64);
    }

    /// Record a failed save
    pub fn record_save_failure(&self) {
        self.save_failures_total.inc();
    }

    /// Record an operation rejected by validation
    pub fn record_rejected(&self) {
        self.rejected_total.inc();
    }

    /// Get metrics registry
    pub fn registry(&self) -> &Registry {
        &self.registry
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_creation() {
        let metrics = Metrics::new().unwrap();
        assert_eq!(metrics.deposits_total.get(), 0);
        assert_eq!(metrics.saves_total.get(), 0);
    }

    #[test]
    fn test_independent_registries() {
        let a = Metrics::new().unwrap();
        let b = Metrics::new().unwrap();
        a.record_rejected();
        assert_eq!(a.rejected_total.get(), 1);
        assert_eq!(b.rejected_total.get(), 0);
    }

    #[test]
    fn test_record_save() {
        let metrics = Metrics::new().unwrap();
        metrics.record_save(0.002, 3);
        metrics.record_save_failure();
        assert_eq!(metrics.saves_total.get(), 1);
        assert_eq!(metrics.save_failures_total.get(), 1);
        assert_eq!(metrics.accounts.get(), 3);
        assert_eq!(metrics.save_duration.get_sample_count(), 1);
        assert_eq!(metrics.registry().gather().len(), 8);
    }
}
