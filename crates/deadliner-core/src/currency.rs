//! Virtual-currency engine.
//!
//! Computes the balance from the append-only ledger and applies the
//! fixed-size reward and penalty rules tied to task and typing outcomes.

use chrono::Utc;

use crate::error::{Result, ValidationError};
use crate::storage::LedgerDb;

/// Balance assumed before the first transaction.
pub const STARTING_BALANCE: f64 = 50.0;
/// Credited when a task is completed in time.
pub const TASK_COMPLETION_REWARD: f64 = 1.0;
/// Debited by [`CurrencyEngine::penalize_missed_deadline`]. The scheduler's
/// own miss path posts a steeper penalty directly to the ledger.
pub const DEADLINE_MISS_PENALTY: f64 = 3.0;
/// Credited when a typing submission beats every prior score.
pub const TYPING_RECORD_BONUS: f64 = 2.0;

/// Accepted typing-speed range, inclusive.
pub const TYPING_WPM_MIN: u32 = 1;
pub const TYPING_WPM_MAX: u32 = 200;

/// Applies currency rules against the ledger store.
pub struct CurrencyEngine {
    ledger: LedgerDb,
}

impl CurrencyEngine {
    pub fn new(ledger: LedgerDb) -> Self {
        Self { ledger }
    }

    /// Access the underlying ledger store.
    pub fn ledger(&self) -> &LedgerDb {
        &self.ledger
    }

    /// Current balance: the starting balance plus the sum of all deltas.
    /// No side effects.
    pub fn balance(&self) -> Result<f64> {
        let sum = self.ledger.sum_transactions()?.unwrap_or(0.0);
        Ok(STARTING_BALANCE + sum)
    }

    /// Credit the completion reward for a task.
    pub fn reward_task_completion(&self, task_id: i64) -> Result<()> {
        self.ledger.append_transaction(
            TASK_COMPLETION_REWARD,
            &format!("Task {task_id} completed on time"),
        )?;
        Ok(())
    }

    /// Debit the engine's miss penalty for a task.
    pub fn penalize_missed_deadline(&self, task_id: i64) -> Result<()> {
        self.ledger.append_transaction(
            -DEADLINE_MISS_PENALTY,
            &format!("Missed deadline for task {task_id}"),
        )?;
        Ok(())
    }

    /// Record a typing submission, detecting whether it is a new record.
    ///
    /// The read of the current maximum and the dependent inserts run as one
    /// transaction, so two submissions can never both claim a record
    /// against the same stale maximum.
    ///
    /// # Errors
    /// Rejects speeds outside [`TYPING_WPM_MIN`]..=[`TYPING_WPM_MAX`]
    /// before writing anything.
    pub fn check_typing_record(&mut self, new_wpm: u32) -> Result<bool> {
        if !(TYPING_WPM_MIN..=TYPING_WPM_MAX).contains(&new_wpm) {
            return Err(ValidationError::TypingSpeedOutOfRange {
                wpm: new_wpm,
                min: TYPING_WPM_MIN,
                max: TYPING_WPM_MAX,
            }
            .into());
        }

        let today = Utc::now().date_naive();
        let is_record = self.ledger.exclusive(|ledger| {
            let best = ledger.max_wpm()?.unwrap_or(0);
            if new_wpm > best {
                ledger.append_typing_score(new_wpm, today, true)?;
                ledger.append_transaction(
                    TYPING_RECORD_BONUS,
                    &format!("New typing record: {new_wpm} WPM"),
                )?;
                Ok(true)
            } else {
                ledger.append_typing_score(new_wpm, today, false)?;
                Ok(false)
            }
        })?;
        Ok(is_record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CoreError;

    fn engine() -> CurrencyEngine {
        CurrencyEngine::new(LedgerDb::open_memory().unwrap())
    }

    #[test]
    fn empty_ledger_balance_is_starting_balance() {
        assert_eq!(engine().balance().unwrap(), 50.0);
    }

    #[test]
    fn completion_reward_moves_balance_to_51() {
        let engine = engine();
        engine.reward_task_completion(7).unwrap();
        assert_eq!(engine.balance().unwrap(), 51.0);

        let recent = engine.ledger().recent_transactions(1).unwrap();
        assert_eq!(recent[0].reason, "Task 7 completed on time");
    }

    #[test]
    fn engine_penalty_is_three() {
        let engine = engine();
        engine.penalize_missed_deadline(7).unwrap();
        assert_eq!(engine.balance().unwrap(), 47.0);
    }

    #[test]
    fn typing_record_sequence() {
        let mut engine = engine();

        // First score is always a record and earns the bonus.
        assert!(engine.check_typing_record(60).unwrap());
        assert_eq!(engine.balance().unwrap(), 52.0);

        // Slower attempt: recorded, no record, no bonus.
        assert!(!engine.check_typing_record(55).unwrap());
        assert_eq!(engine.balance().unwrap(), 52.0);

        // Beating the maximum again earns another bonus.
        assert!(engine.check_typing_record(61).unwrap());
        assert_eq!(engine.balance().unwrap(), 54.0);

        let scores = engine.ledger().typing_scores().unwrap();
        assert_eq!(
            scores.iter().map(|s| s.is_record).collect::<Vec<_>>(),
            vec![true, false, true]
        );
    }

    #[test]
    fn equal_speed_is_not_a_record() {
        let mut engine = engine();
        assert!(engine.check_typing_record(60).unwrap());
        assert!(!engine.check_typing_record(60).unwrap());
    }

    #[test]
    fn out_of_range_speed_is_rejected_without_writes() {
        let mut engine = engine();
        for wpm in [0, 201] {
            let err = engine.check_typing_record(wpm).unwrap_err();
            assert!(matches!(err, CoreError::Validation(_)));
        }
        assert!(engine.ledger().typing_scores().unwrap().is_empty());
        assert_eq!(engine.balance().unwrap(), 50.0);
    }
}
