use clap::{Parser, Subcommand};

mod commands;
mod notify;

#[derive(Parser)]
#[command(name = "deadliner-cli", version, about = "Deadliner CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Task management
    Task {
        #[command(subcommand)]
        action: commands::task::TaskAction,
    },
    /// Currency balance and history
    Currency {
        #[command(subcommand)]
        action: commands::currency::CurrencyAction,
    },
    /// Typing-speed submissions
    Typing {
        #[command(subcommand)]
        action: commands::typing::TypingAction,
    },
    /// Today's task counts and balance
    Summary,
    /// Run the deadline monitor loop
    Watch {
        /// Seconds between ticks (overrides config)
        #[arg(long)]
        interval: Option<u64>,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Task { action } => commands::task::run(action),
        Commands::Currency { action } => commands::currency::run(action),
        Commands::Typing { action } => commands::typing::run(action),
        Commands::Summary => commands::summary::run(),
        Commands::Watch { interval } => commands::watch::run(interval),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
