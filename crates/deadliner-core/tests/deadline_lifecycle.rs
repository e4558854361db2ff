//! Integration tests for the full task lifecycle across process restarts.
//!
//! These drive the scheduler against an on-disk database the way the CLI
//! does: one process creates tasks, a later one rebuilds its timers from
//! what was persisted.

use chrono::{Duration, Utc};
use deadliner_core::{
    CurrencyEngine, DeadlineScheduler, Event, EventKind, LedgerDb, TaskDb, TaskStatus,
};
use std::path::Path;
use std::sync::{Arc, Mutex};

fn open_scheduler(path: &Path) -> DeadlineScheduler {
    DeadlineScheduler::new(
        TaskDb::open_at(path).unwrap(),
        CurrencyEngine::new(LedgerDb::open_at(path).unwrap()),
    )
}

#[test]
fn task_added_then_fetched_appears_exactly_once() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("deadliner.db");

    let mut scheduler = open_scheduler(&db_path);
    let deadline = Utc::now() + Duration::hours(3);
    let id = scheduler.add_task("ship the draft", deadline).unwrap();

    // Reopen as a fresh process would.
    drop(scheduler);
    let scheduler = open_scheduler(&db_path);

    let tasks = scheduler.today_tasks().unwrap();
    let matching: Vec<_> = tasks.iter().filter(|t| t.id == id).collect();
    assert_eq!(matching.len(), 1);
    let task = matching[0];
    assert_eq!(task.name, "ship the draft");
    assert_eq!(task.user_deadline, deadline);
    assert!(task.artificial_deadline <= task.user_deadline);
    assert_eq!(task.status, TaskStatus::Pending);
}

#[test]
fn restart_rearms_pending_tasks_from_storage() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("deadliner.db");

    let scheduler = open_scheduler(&db_path);
    let now = Utc::now();
    let id = scheduler
        .task_store()
        .add("big report", now + Duration::hours(12), now + Duration::hours(9))
        .unwrap();
    drop(scheduler);

    // Timer handles are process-local, so the new process starts bare and
    // must rebuild them from the stored artificial deadline.
    let mut scheduler = open_scheduler(&db_path);
    assert!(!scheduler.is_armed(id));
    scheduler.setup_deadline_monitoring().unwrap();
    assert!(scheduler.is_armed(id));
}

#[test]
fn restart_after_elapsed_deadline_misses_immediately() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("deadliner.db");

    let scheduler = open_scheduler(&db_path);
    let now = Utc::now();
    let id = scheduler
        .task_store()
        .add("overdue", now - Duration::minutes(30), now - Duration::hours(2))
        .unwrap();
    drop(scheduler);

    let mut scheduler = open_scheduler(&db_path);
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    scheduler
        .bus_mut()
        .subscribe(EventKind::DeadlineMissed, move |event| {
            sink.lock().unwrap().push(event.clone());
        });

    scheduler.setup_deadline_monitoring().unwrap();

    let task = scheduler.task_store().get(id).unwrap().unwrap();
    assert_eq!(task.status, TaskStatus::Missed);
    assert!(task.completed_at.is_none());
    assert_eq!(scheduler.balance().unwrap(), 45.0);
    assert_eq!(seen.lock().unwrap().len(), 1);

    // Still missed, still -5, if monitoring is set up a second time.
    scheduler.setup_deadline_monitoring().unwrap();
    assert_eq!(scheduler.balance().unwrap(), 45.0);
    assert!(matches!(
        scheduler.complete_task(id),
        Err(deadliner_core::CoreError::State(_))
    ));
}

#[test]
fn completion_survives_restart_and_stays_rewarded_once() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("deadliner.db");

    let mut scheduler = open_scheduler(&db_path);
    let id = scheduler
        .add_task("send invoice", Utc::now() + Duration::hours(2))
        .unwrap();
    scheduler.complete_task(id).unwrap();
    drop(scheduler);

    let mut scheduler = open_scheduler(&db_path);
    scheduler.setup_deadline_monitoring().unwrap();
    assert!(!scheduler.is_armed(id));
    assert_eq!(scheduler.balance().unwrap(), 51.0);

    // Ticking far past the stored deadline must not turn it into a miss.
    scheduler.tick_at(Utc::now() + Duration::days(2)).unwrap();
    let task = scheduler.task_store().get(id).unwrap().unwrap();
    assert_eq!(task.status, TaskStatus::Completed);
    assert_eq!(scheduler.balance().unwrap(), 51.0);
}

#[test]
fn miss_event_carries_task_id_and_message() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("deadliner.db");

    let mut scheduler = open_scheduler(&db_path);
    let now = Utc::now();
    let artificial = now + Duration::minutes(10);
    let id = scheduler
        .task_store()
        .add("short fuse", now + Duration::minutes(20), artificial)
        .unwrap();
    scheduler.rearm_at(now).unwrap();

    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    scheduler
        .bus_mut()
        .subscribe(EventKind::DeadlineMissed, move |event| {
            sink.lock().unwrap().push(event.clone());
        });

    scheduler.tick_at(artificial + Duration::seconds(1)).unwrap();

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    match &seen[0] {
        Event::DeadlineMissed {
            task_id, message, ..
        } => {
            assert_eq!(*task_id, id);
            assert_eq!(message, "Task deadline missed!");
        }
        other => panic!("expected DeadlineMissed, got {other:?}"),
    }
}
