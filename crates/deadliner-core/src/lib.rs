//! # Deadliner Core Library
//!
//! This library provides the core business logic for Deadliner, a personal
//! anti-procrastination tracker. All operations are available through the
//! standalone CLI binary; any richer front end is a thin layer over the
//! same core library.
//!
//! ## Architecture
//!
//! - **Deadline Scheduler**: derives an artificial deadline earlier than
//!   the user's stated one and arms per-task warning/miss timers. Timers
//!   are wall-clock data with a caller-driven `tick()` -- no internal
//!   threads.
//! - **Currency Engine**: recomputes the balance from an append-only
//!   transaction ledger and applies fixed-size rewards and penalties.
//! - **Storage**: SQLite-based task and ledger stores plus TOML-based
//!   configuration.
//! - **Events**: every state change is pushed to subscribers through a
//!   synchronous observer registry; nothing polls.
//!
//! ## Key Components
//!
//! - [`DeadlineScheduler`]: command surface and timer state machine
//! - [`CurrencyEngine`]: balance and reward/penalty rules
//! - [`TaskDb`] / [`LedgerDb`]: persistence
//! - [`EventBus`]: subscription registry for sink events

pub mod currency;
pub mod error;
pub mod events;
pub mod scheduler;
pub mod storage;
pub mod task;

pub use currency::CurrencyEngine;
pub use error::{ConfigError, CoreError, DatabaseError, Result, StateError, ValidationError};
pub use events::{Event, EventBus, EventKind};
pub use scheduler::{DailySummary, DeadlineScheduler};
pub use storage::{Config, LedgerDb, TaskDb};
pub use task::{Task, TaskStatus};
