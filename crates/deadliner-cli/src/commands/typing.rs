//! Typing-speed commands for CLI.

use clap::Subcommand;
use deadliner_core::{CurrencyEngine, LedgerDb};

#[derive(Subcommand)]
pub enum TypingAction {
    /// Submit a typing result in words per minute
    Submit {
        /// Words per minute, 1-200
        wpm: u32,
    },
    /// Best recorded speed
    Best,
    /// Full score history
    History,
}

pub fn run(action: TypingAction) -> Result<(), Box<dyn std::error::Error>> {
    let mut engine = CurrencyEngine::new(LedgerDb::open()?);

    match action {
        TypingAction::Submit { wpm } => {
            if engine.check_typing_record(wpm)? {
                println!("New personal best: {wpm} WPM! +$2 bonus earned!");
            } else {
                let best = engine.ledger().max_wpm()?.unwrap_or(0);
                println!("Recorded {wpm} WPM. Personal best remains {best} WPM.");
            }
        }
        TypingAction::Best => match engine.ledger().max_wpm()? {
            Some(best) => println!("{best} WPM"),
            None => println!("No scores recorded yet"),
        },
        TypingAction::History => {
            let scores = engine.ledger().typing_scores()?;
            println!("{}", serde_json::to_string_pretty(&scores)?);
        }
    }
    Ok(())
}
