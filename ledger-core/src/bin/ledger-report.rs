//! Prints every account held in the configured ledger file

use account_ledger::{Config, Ledger};
use anyhow::Context;

fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = match std::env::args().nth(1) {
        Some(path) => Config::from_file(&path).with_context(|| format!("loading {}", path))?,
        None => Config::from_env()?,
    };

    tracing::info!(
        service = %config.service_name,
        version = %config.service_version,
        data_file = %config.data_file.display(),
        "Opening ledger"
    );

    // Listing must not create the data directory as a side effect
    let ledger = Ledger::open_existing(config).context("ledger file could not be opened")?;
    let accounts = ledger.list_accounts();

    if accounts.is_empty() {
        println!("No accounts");
        return Ok(());
    }

    for account in &accounts {
        println!(
            "ID: {} | Owner: {} | Balance: {:.2}",
            account.id, account.owner, account.balance
        );
    }

    tracing::info!(accounts = accounts.len(), "Report complete");
    Ok(())
}
