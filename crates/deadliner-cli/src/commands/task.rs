//! Task management commands for CLI.

use clap::Subcommand;
use deadliner_core::scheduler::parse_deadline;
use deadliner_core::DeadlineScheduler;

#[derive(Subcommand)]
pub enum TaskAction {
    /// Create a task; an earlier deadline is derived and enforced
    Add {
        /// Task name
        name: String,
        /// Deadline, RFC 3339 or "YYYY-MM-DD HH:MM" (local time)
        deadline: String,
    },
    /// List today's tasks, earliest enforced deadline first
    List,
    /// Mark a task completed
    Complete {
        /// Task ID
        id: i64,
    },
}

pub fn run(action: TaskAction) -> Result<(), Box<dyn std::error::Error>> {
    let mut scheduler = DeadlineScheduler::open()?;

    match action {
        TaskAction::Add { name, deadline } => {
            let deadline = parse_deadline(&deadline)?;
            let id = scheduler.add_task(&name, deadline)?;
            println!("Task created: {id}");
            if let Some(task) = scheduler.task_store().get(id)? {
                println!("{}", serde_json::to_string_pretty(&task)?);
            }
        }
        TaskAction::List => {
            let tasks = scheduler.today_tasks()?;
            println!("{}", serde_json::to_string_pretty(&tasks)?);
        }
        TaskAction::Complete { id } => {
            scheduler.complete_task(id)?;
            println!("Task {id} completed");
        }
    }
    Ok(())
}
