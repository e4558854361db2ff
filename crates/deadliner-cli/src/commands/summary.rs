//! Daily summary command for CLI.

use deadliner_core::DeadlineScheduler;

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let scheduler = DeadlineScheduler::open()?;
    let summary = scheduler.daily_summary()?;
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}
