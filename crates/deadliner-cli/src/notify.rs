//! Console notifications for scheduler events.
//!
//! The watch loop subscribes these renderers on the event bus; they are
//! the display layer and hold no logic.

use deadliner_core::{Event, EventBus, EventKind};

/// Register a console renderer for every sink event kind.
pub fn subscribe(bus: &mut EventBus) {
    for kind in [
        EventKind::DeadlineApproaching,
        EventKind::DeadlineMissed,
        EventKind::TaskCompleted,
        EventKind::TypingRecord,
    ] {
        bus.subscribe(kind, render);
    }
}

fn render(event: &Event) {
    match event {
        Event::DeadlineApproaching {
            task_id,
            message,
            at,
        } => {
            println!("[{}] task {task_id}: {message}", at.format("%H:%M:%S"));
        }
        Event::DeadlineMissed {
            task_id,
            message,
            at,
        } => {
            println!(
                "[{}] task {task_id}: {message} -$5 penalty applied.",
                at.format("%H:%M:%S")
            );
        }
        Event::TaskCompleted { task_name, at, .. } => {
            println!(
                "[{}] '{task_name}' completed successfully! +$1 earned!",
                at.format("%H:%M:%S")
            );
        }
        Event::TypingRecord { wpm, at } => {
            println!(
                "[{}] New personal best: {wpm} WPM! +$2 bonus earned!",
                at.format("%H:%M:%S")
            );
        }
    }
}
