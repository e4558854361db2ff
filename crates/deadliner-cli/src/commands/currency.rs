//! Currency ledger commands for CLI.

use clap::Subcommand;
use deadliner_core::{CurrencyEngine, LedgerDb};

#[derive(Subcommand)]
pub enum CurrencyAction {
    /// Current balance
    Balance,
    /// Recent transactions, newest first
    History {
        /// Number of transactions to show
        #[arg(long, default_value = "20")]
        limit: usize,
    },
}

pub fn run(action: CurrencyAction) -> Result<(), Box<dyn std::error::Error>> {
    let engine = CurrencyEngine::new(LedgerDb::open()?);

    match action {
        CurrencyAction::Balance => {
            println!("{:.1}", engine.balance()?);
        }
        CurrencyAction::History { limit } => {
            let transactions = engine.ledger().recent_transactions(limit)?;
            println!("{}", serde_json::to_string_pretty(&transactions)?);
        }
    }
    Ok(())
}
