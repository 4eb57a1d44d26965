// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

/**
 * Bountyy Oy - Scorer Error Types
 * Production-ready error handling with thiserror
 *
 * @copyright 2026 Bountyy Oy
 * @license Proprietary - Enterprise Edition
 */

use std::time::Duration;
use thiserror::Error;

/// Main scorer error type with comprehensive error variants
#[derive(Error, Debug)]
pub enum ScorerError {
    /// Database-related errors
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    /// A persistence operation exhausted its retry budget
    #[error("Persistence operation '{operation}' failed after {retries} retries: {source}")]
    Persistence {
        operation: String,
        retries: u32,
        #[source]
        source: Box<ScorerError>,
    },

    /// A collaborator (history store, benchmark store) was unavailable
    #[error("Collaborator '{name}' unavailable: {reason}")]
    CollaboratorUnavailable {
        name: String,
        reason: String,
    },

    /// Programmer errors: missing required parameters, never retried
    #[error("Validation error: {0}")]
    Validation(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Timeout errors
    #[error("Operation timed out after {duration:?}")]
    Timeout {
        duration: Duration,
    },

    /// General errors
    #[error("Scorer error: {0}")]
    General(String),
}

/// Database-specific errors with transient/permanent classification
#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("Database connection failed: {reason}")]
    ConnectionFailed {
        reason: String,
    },

    #[error("Connection pool exhausted: {available}/{max} connections available")]
    PoolExhausted {
        available: usize,
        max: usize,
    },

    #[error("Query timeout after {timeout:?}")]
    QueryTimeout {
        timeout: Duration,
    },

    #[error("Constraint violation: {constraint}")]
    ConstraintViolation {
        constraint: String,
    },

    #[error("Database error: {0}")]
    Other(String),
}

impl DatabaseError {
    /// Check if database error is retryable
    pub fn is_retryable(&self) -> bool {
        match self {
            DatabaseError::ConnectionFailed { .. } => true,
            DatabaseError::PoolExhausted { .. } => true,
            DatabaseError::QueryTimeout { .. } => true,
            DatabaseError::ConstraintViolation { .. } => false,
            DatabaseError::Other(_) => true,
        }
    }
}

impl ScorerError {
    /// Check if error is retryable
    pub fn is_retryable(&self) -> bool {
        match self {
            ScorerError::Database(e) => e.is_retryable(),
            ScorerError::CollaboratorUnavailable { .. } => true,
            ScorerError::Timeout { .. } => true,
            // Already annotated with exhausted retries, never retried again
            ScorerError::Persistence { .. } => false,
            ScorerError::Validation(_) => false,
            ScorerError::Configuration(_) => false,
            ScorerError::General(_) => false,
        }
    }
}

/// Convert tokio-postgres errors to our error types
impl From<tokio_postgres::Error> for ScorerError {
    fn from(err: tokio_postgres::Error) -> Self {
        ScorerError::Database(DatabaseError::Other(err.to_string()))
    }
}

/// Convert deadpool errors to our error types
impl From<deadpool_postgres::PoolError> for ScorerError {
    fn from(err: deadpool_postgres::PoolError) -> Self {
        ScorerError::Database(DatabaseError::ConnectionFailed {
            reason: err.to_string(),
        })
    }
}

/// Result type for scorer operations
pub type ScorerResult<T> = Result<T, ScorerError>;
