// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

/**
 * Bountyy Oy - MFA Risk Scoring Library
 * Exposes scoring, trend, benchmark and persistence modules
 *
 * @copyright 2026 Bountyy Oy
 * @license Proprietary
 */

pub mod aggregate;
pub mod benchmark;
pub mod components;
pub mod config;
pub mod explanation;
pub mod normalizer;
pub mod orchestrator;
pub mod trend;
pub mod types;

// Persistence layer
pub mod persistence;

// Production error handling and resilience modules
pub mod errors;
pub mod retry;

pub use errors::{ScorerError, ScorerResult};
pub use orchestrator::{PublisherContext, ScoreOptions, ScoringEngine};
pub use types::{AggregationMethod, ComprehensiveScoreResult, RiskLevel};
