//! Deadline derivation and timer scheduling.
//!
//! The scheduler derives an artificial deadline earlier than the user's
//! stated one, arms per-task warning and miss timers, and drives status
//! transitions through the task store and the currency engine.
//!
//! Armed timers are plain wall-clock data -- no internal threads. The
//! caller invokes [`DeadlineScheduler::tick`] periodically; every due
//! callback runs to completion before the next one starts, and completing
//! a task cancels its timers by removing them before any firing can
//! observe them. Timer handles are process-local: on restart,
//! [`DeadlineScheduler::setup_deadline_monitoring`] rebuilds them from the
//! persisted deadlines.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Local, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::currency::CurrencyEngine;
use crate::error::{Result, StateError, ValidationError};
use crate::events::{Event, EventBus};
use crate::storage::TaskDb;
use crate::task::{Task, TaskStatus};

/// Minutes before the artificial deadline at which the warning fires.
pub const WARNING_LEAD_MINUTES: i64 = 30;

/// Local hour of the morning cutoff that can pull a deadline earlier.
pub const MORNING_CUTOFF_HOUR: u32 = 11;

/// Debited when the miss timer fires. Intentionally steeper than
/// [`crate::currency::DEADLINE_MISS_PENALTY`]; the miss path posts it to
/// the ledger directly instead of going through the engine.
const MISSED_DEADLINE_PENALTY: f64 = 5.0;

/// Pending wall-clock callbacks for one armed task.
struct ArmedTimer {
    /// Cleared once the warning has fired (or if it was already past at
    /// arm time).
    warning_at: Option<DateTime<Utc>>,
    miss_at: DateTime<Utc>,
}

/// Counts for today's tasks plus the current balance.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct DailySummary {
    pub completed: usize,
    pub missed: usize,
    pub pending: usize,
    pub balance: f64,
}

/// Derive the enforced deadline from the user's stated one.
///
/// The candidate sits at 75% of the remaining interval; a morning cutoff
/// strictly between `now` and the candidate replaces it. Pure in its
/// inputs -- a `user_deadline` at or before `now` yields a degenerate
/// result, which [`DeadlineScheduler::add_task`] rejects up front.
pub fn derive_artificial_deadline(
    now: DateTime<Utc>,
    morning_cutoff: Option<DateTime<Utc>>,
    user_deadline: DateTime<Utc>,
) -> DateTime<Utc> {
    let remaining = user_deadline - now;
    let candidate = now + Duration::milliseconds(remaining.num_milliseconds() * 3 / 4);
    match morning_cutoff {
        Some(cutoff) if cutoff < candidate && cutoff > now => cutoff,
        _ => candidate,
    }
}

/// 11:00 local time today, as a UTC instant. `None` in the rare case the
/// local timezone skips that wall-clock time.
fn morning_cutoff_today() -> Option<DateTime<Utc>> {
    let eleven = Local::now()
        .date_naive()
        .and_hms_opt(MORNING_CUTOFF_HOUR, 0, 0)?;
    eleven
        .and_local_timezone(Local)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Parse a deadline from a front end. Accepts RFC 3339 or a handful of
/// naive `YYYY-MM-DD HH:MM[:SS]` forms interpreted as local time.
pub fn parse_deadline(input: &str) -> Result<DateTime<Utc>, ValidationError> {
    let input = input.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Ok(dt.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(input, fmt) {
            if let Some(local) = naive.and_local_timezone(Local).earliest() {
                return Ok(local.with_timezone(&Utc));
            }
        }
    }
    Err(ValidationError::DeadlineNotParseable {
        input: input.to_string(),
    })
}

/// Drives task lifecycles against the stores and emits sink events.
///
/// This is the command surface front ends talk to.
pub struct DeadlineScheduler {
    tasks: TaskDb,
    currency: CurrencyEngine,
    bus: EventBus,
    timers: HashMap<i64, ArmedTimer>,
}

impl DeadlineScheduler {
    pub fn new(tasks: TaskDb, currency: CurrencyEngine) -> Self {
        Self {
            tasks,
            currency,
            bus: EventBus::new(),
            timers: HashMap::new(),
        }
    }

    /// Open the scheduler against the default database.
    ///
    /// # Errors
    /// Returns an error if a store cannot be opened or migrated.
    pub fn open() -> Result<Self> {
        use crate::storage::LedgerDb;
        let tasks = TaskDb::open()?;
        let currency = CurrencyEngine::new(LedgerDb::open()?);
        Ok(Self::new(tasks, currency))
    }

    /// Event registry front ends subscribe on.
    pub fn bus_mut(&mut self) -> &mut EventBus {
        &mut self.bus
    }

    /// Access the underlying task store.
    pub fn task_store(&self) -> &TaskDb {
        &self.tasks
    }

    /// Access the currency engine.
    pub fn currency(&self) -> &CurrencyEngine {
        &self.currency
    }

    /// The enforced deadline that [`Self::add_task`] would assign right now.
    pub fn calculate_artificial_deadline(&self, user_deadline: DateTime<Utc>) -> DateTime<Utc> {
        derive_artificial_deadline(Utc::now(), morning_cutoff_today(), user_deadline)
    }

    /// Create a task, derive its artificial deadline, and arm its timers.
    ///
    /// # Errors
    /// Rejects empty names and deadlines not in the future before writing
    /// anything.
    pub fn add_task(&mut self, name: &str, user_deadline: DateTime<Utc>) -> Result<i64> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ValidationError::EmptyTaskName.into());
        }
        let now = Utc::now();
        if user_deadline <= now {
            return Err(ValidationError::DeadlineInPast {
                deadline: user_deadline,
            }
            .into());
        }

        let artificial = derive_artificial_deadline(now, morning_cutoff_today(), user_deadline);
        let task_id = self.tasks.add(name, user_deadline, artificial)?;
        self.arm(task_id, artificial, now);
        tracing::info!(task_id, %artificial, "task added");
        Ok(task_id)
    }

    /// Complete a pending task: stamp `completed_at`, credit the reward
    /// once, cancel both timers, and emit `TaskCompleted`.
    ///
    /// # Errors
    /// `StateError` if the task does not exist or is already terminal; the
    /// reward is never applied twice.
    pub fn complete_task(&mut self, task_id: i64) -> Result<()> {
        let task = self
            .tasks
            .get(task_id)?
            .ok_or(StateError::TaskNotFound { task_id })?;
        if task.status.is_terminal() {
            return Err(StateError::AlreadyTerminal {
                task_id,
                status: task.status,
            }
            .into());
        }

        let now = Utc::now();
        self.tasks
            .update_status(task_id, TaskStatus::Completed, Some(now))?;
        self.currency.reward_task_completion(task_id)?;
        self.timers.remove(&task_id);
        self.bus.emit(&Event::TaskCompleted {
            task_id,
            task_name: task.name,
            at: now,
        });
        Ok(())
    }

    /// Today's tasks, ordered by artificial deadline ascending.
    pub fn today_tasks(&self) -> Result<Vec<Task>> {
        Ok(self.tasks.tasks_for_today()?)
    }

    /// Current balance.
    pub fn balance(&self) -> Result<f64> {
        self.currency.balance()
    }

    /// Record a typing submission; emits `TypingRecord` when it beats all
    /// prior scores.
    pub fn submit_typing_speed(&mut self, wpm: u32) -> Result<bool> {
        let is_record = self.currency.check_typing_record(wpm)?;
        if is_record {
            self.bus.emit(&Event::TypingRecord {
                wpm,
                at: Utc::now(),
            });
        }
        Ok(is_record)
    }

    /// Status counts for today plus the balance.
    pub fn daily_summary(&self) -> Result<DailySummary> {
        let mut summary = DailySummary::default();
        for task in self.tasks.tasks_for_today()? {
            match task.status {
                TaskStatus::Completed => summary.completed += 1,
                TaskStatus::Missed => summary.missed += 1,
                TaskStatus::Pending => summary.pending += 1,
            }
        }
        summary.balance = self.currency.balance()?;
        Ok(summary)
    }

    /// Rebuild timers from storage for today's pending tasks.
    ///
    /// Call once at startup. Tasks whose artificial deadline already passed
    /// take the miss transition immediately instead of being armed with a
    /// negative delay.
    pub fn setup_deadline_monitoring(&mut self) -> Result<()> {
        self.rearm_at(Utc::now())
    }

    /// [`Self::setup_deadline_monitoring`] against an explicit clock.
    pub fn rearm_at(&mut self, now: DateTime<Utc>) -> Result<()> {
        self.timers.clear();
        for task in self.tasks.tasks_for_today()? {
            if task.status != TaskStatus::Pending {
                continue;
            }
            if task.artificial_deadline <= now {
                self.fire_miss(task.id, now)?;
            } else {
                self.arm(task.id, task.artificial_deadline, now);
            }
        }
        Ok(())
    }

    /// Process every due timer. Call periodically.
    pub fn tick(&mut self) -> Result<()> {
        self.tick_at(Utc::now())
    }

    /// [`Self::tick`] against an explicit clock.
    pub fn tick_at(&mut self, now: DateTime<Utc>) -> Result<()> {
        // Warnings first so a task whose warning and miss are both due in
        // the same tick still emits them in order.
        let mut due_warnings: Vec<(DateTime<Utc>, i64)> = self
            .timers
            .iter()
            .filter_map(|(id, timer)| {
                timer
                    .warning_at
                    .filter(|at| *at <= now)
                    .map(|at| (at, *id))
            })
            .collect();
        due_warnings.sort();
        for (_, task_id) in due_warnings {
            self.fire_warning(task_id, now)?;
        }

        let mut due_misses: Vec<(DateTime<Utc>, i64)> = self
            .timers
            .iter()
            .filter(|(_, timer)| timer.miss_at <= now)
            .map(|(id, timer)| (timer.miss_at, *id))
            .collect();
        due_misses.sort();
        for (_, task_id) in due_misses {
            self.fire_miss(task_id, now)?;
        }
        Ok(())
    }

    /// Whether a task currently has scheduled callbacks.
    pub fn is_armed(&self, task_id: i64) -> bool {
        self.timers.contains_key(&task_id)
    }

    /// The earliest instant at which a timer becomes due, for callers
    /// sizing their tick interval.
    pub fn next_due(&self) -> Option<DateTime<Utc>> {
        self.timers
            .values()
            .flat_map(|timer| timer.warning_at.into_iter().chain([timer.miss_at]))
            .min()
    }

    fn arm(&mut self, task_id: i64, artificial_deadline: DateTime<Utc>, now: DateTime<Utc>) {
        if artificial_deadline <= now {
            return;
        }
        let warning_at = artificial_deadline - Duration::minutes(WARNING_LEAD_MINUTES);
        self.timers.insert(
            task_id,
            ArmedTimer {
                warning_at: (warning_at > now).then_some(warning_at),
                miss_at: artificial_deadline,
            },
        );
    }

    fn fire_warning(&mut self, task_id: i64, now: DateTime<Utc>) -> Result<()> {
        if let Some(timer) = self.timers.get_mut(&task_id) {
            timer.warning_at = None;
        }
        // Re-check state: the schedule's intent may no longer be valid.
        match self.tasks.get(task_id)? {
            Some(task) if task.status == TaskStatus::Pending => {
                self.bus.emit(&Event::DeadlineApproaching {
                    task_id,
                    message: "Task deadline approaching!".to_string(),
                    at: now,
                });
            }
            Some(_) => {}
            None => {
                tracing::warn!(task_id, "warning timer fired for unknown task");
                self.timers.remove(&task_id);
            }
        }
        Ok(())
    }

    fn fire_miss(&mut self, task_id: i64, now: DateTime<Utc>) -> Result<()> {
        self.timers.remove(&task_id);
        let Some(task) = self.tasks.get(task_id)? else {
            tracing::warn!(task_id, "miss timer fired for unknown task");
            return Ok(());
        };
        // A task completed between scheduling and firing must not be missed.
        if task.status != TaskStatus::Pending {
            return Ok(());
        }

        self.tasks.update_status(task_id, TaskStatus::Missed, None)?;
        self.currency.ledger().append_transaction(
            -MISSED_DEADLINE_PENALTY,
            &format!("Missed deadline for task {task_id}"),
        )?;
        self.bus.emit(&Event::DeadlineMissed {
            task_id,
            message: "Task deadline missed!".to_string(),
            at: now,
        });
        Ok(())
    }
}
