//! Core error types for deadliner-core.
//!
//! This module defines the error hierarchy using thiserror. Every mutation
//! entry point validates its input and the current task state before
//! touching storage; on failure nothing is written.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::task::TaskStatus;

/// Core error type for deadliner-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Database-related errors
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    /// Input validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Task lifecycle errors
    #[error("State error: {0}")]
    State(#[from] StateError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Database-specific errors.
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// Failed to open database connection
    #[error("Failed to open database at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Query execution failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Migration failed
    #[error("Database migration failed: {0}")]
    MigrationFailed(String),

    /// Database is locked
    #[error("Database is locked")]
    Locked,
}

/// Validation errors. Rejected before any state mutation.
#[derive(Error, Debug)]
pub enum ValidationError {
    /// Task name is empty or whitespace
    #[error("Task name must not be empty")]
    EmptyTaskName,

    /// Deadline string could not be parsed
    #[error("Deadline '{input}' is not a recognized timestamp")]
    DeadlineNotParseable { input: String },

    /// Deadline lies in the past
    #[error("Deadline {deadline} is already in the past")]
    DeadlineInPast { deadline: DateTime<Utc> },

    /// Typing speed outside the accepted range
    #[error("Typing speed {wpm} WPM is outside the accepted range {min}..={max}")]
    TypingSpeedOutOfRange { wpm: u32, min: u32, max: u32 },
}

/// Task lifecycle errors. Rejected without mutation or currency effect.
#[derive(Error, Debug)]
pub enum StateError {
    /// No task with this id exists
    #[error("Task {task_id} not found")]
    TaskNotFound { task_id: i64 },

    /// The task already reached a terminal status
    #[error("Task {task_id} is already {status}")]
    AlreadyTerminal { task_id: i64, status: TaskStatus },
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Failed to parse configuration
    #[error("Failed to parse configuration: {0}")]
    ParseFailed(String),
}

// Helper implementations for converting from other error types

impl From<rusqlite::Error> for DatabaseError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(err, _msg) => {
                if err.code == rusqlite::ErrorCode::DatabaseLocked {
                    DatabaseError::Locked
                } else {
                    DatabaseError::QueryFailed(err.to_string())
                }
            }
            _ => DatabaseError::QueryFailed(err.to_string()),
        }
    }
}

impl From<rusqlite::Error> for CoreError {
    fn from(err: rusqlite::Error) -> Self {
        CoreError::Database(err.into())
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
