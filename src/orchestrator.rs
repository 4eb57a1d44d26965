// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

/**
 * Bountyy Oy - Scoring Orchestrator
 * Composition root: normalization, component calculators, aggregation,
 * trend analysis, benchmark comparison and explanation for one audit
 *
 * @copyright 2026 Bountyy Oy
 * @license Proprietary - Enterprise Edition
 */

use crate::benchmark::{compare_to_benchmark, neutral_comparison};
use crate::components::calculate_all;
use crate::config::WeightsHandle;
use crate::errors::{ScorerError, ScorerResult};
use crate::explanation::generate_explanation;
use crate::normalizer::{normalize, AuditRecord};
use crate::trend::analyze_trend;
use crate::types::{
    AggregationMethod, BenchmarkComparison, BenchmarkStats, ComprehensiveScoreResult,
    FeatureVector, HistoricalScorePoint, RiskLevel,
};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Read access to a publisher's append-only score history
#[async_trait]
pub trait HistoryStore: Send + Sync {
    /// Ordered score history for one publisher, oldest first (may be empty)
    async fn fetch_score_history(
        &self,
        publisher_id: &str,
    ) -> ScorerResult<Vec<HistoricalScorePoint>>;
}

/// Read/write access to peer benchmark statistics, keyed by
/// (publisher group, metric type)
#[async_trait]
pub trait BenchmarkStore: Send + Sync {
    async fn fetch_benchmark(
        &self,
        group: &str,
        metric_type: &str,
    ) -> ScorerResult<Option<BenchmarkStats>>;

    async fn save_benchmark(
        &self,
        group: &str,
        metric_type: &str,
        stats: &BenchmarkStats,
    ) -> ScorerResult<()>;
}

/// Metric types compared against the peer group on every scoring run
pub const BENCHMARK_METRICS: [&str; 4] = ["ad_density", "ctr", "ecpm", "fill_rate"];

/// Identifies the publisher being scored and its optional peer group
#[derive(Debug, Clone)]
pub struct PublisherContext {
    pub publisher_id: String,
    pub benchmark_group: Option<String>,
}

/// Per-run options. The aggregation method is selectable so both
/// probabilistic models stay interchangeable.
#[derive(Debug, Clone)]
pub struct ScoreOptions {
    pub method: AggregationMethod,
}

impl Default for ScoreOptions {
    fn default() -> Self {
        Self {
            method: AggregationMethod::Logistic,
        }
    }
}

/// Scoring engine: owns the weight handle and the collaborator seams.
///
/// The computation between collaborator calls is pure and synchronous;
/// separate audits may be scored concurrently because each run works on
/// its own feature vector and a private weight snapshot.
pub struct ScoringEngine {
    weights: WeightsHandle,
    history: Arc<dyn HistoryStore>,
    benchmarks: Arc<dyn BenchmarkStore>,
}

impl ScoringEngine {
    pub fn new(
        weights: WeightsHandle,
        history: Arc<dyn HistoryStore>,
        benchmarks: Arc<dyn BenchmarkStore>,
    ) -> Self {
        Self {
            weights,
            history,
            benchmarks,
        }
    }

    pub fn weights(&self) -> &WeightsHandle {
        &self.weights
    }

    /// Score one audit comprehensively.
    ///
    /// Collaborator failures (history or benchmark lookups) degrade to
    /// neutral defaults with a warning; a missing publisher id fails fast.
    pub async fn calculate_comprehensive_score(
        &self,
        audit: &AuditRecord,
        publisher: &PublisherContext,
        options: &ScoreOptions,
    ) -> ScorerResult<ComprehensiveScoreResult> {
        if publisher.publisher_id.trim().is_empty() {
            return Err(ScorerError::Validation(
                "publisher_id is required for comprehensive scoring".to_string(),
            ));
        }

        // One weight snapshot for the whole run; hot swaps apply to
        // subsequent runs only
        let weights = self.weights.snapshot();

        let features = normalize(audit);
        let audit_id = audit
            .audit_id
            .clone()
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

        let components = calculate_all(&features, &weights);
        let aggregated = options.method.aggregate(components, &weights);

        let history = match self.history.fetch_score_history(&publisher.publisher_id).await {
            Ok(history) => history,
            Err(err) => {
                warn!(
                    publisher_id = %publisher.publisher_id,
                    error = %err,
                    "History lookup failed, trend analysis degrades to empty history"
                );
                Vec::new()
            }
        };

        let trend = analyze_trend(
            aggregated.overall_risk_score,
            &history,
            &weights.trend_analysis,
            Utc::now(),
        );

        let benchmarks = self.compare_benchmarks(&features, publisher).await;

        let explanation = generate_explanation(&aggregated, features.observed_at);

        let result = ComprehensiveScoreResult {
            publisher_id: publisher.publisher_id.clone(),
            audit_id,
            benchmark_group: publisher.benchmark_group.clone(),
            risk_score: aggregated.overall_risk_score,
            mfa_probability: aggregated.mfa_probability,
            weighted_score: aggregated.weighted_score,
            risk_level: RiskLevel::from_score(aggregated.overall_risk_score),
            methodology: aggregated.methodology,
            components: aggregated.components,
            trend,
            benchmarks,
            explanation,
            scored_at: Utc::now(),
        };

        info!(
            publisher_id = %result.publisher_id,
            audit_id = %result.audit_id,
            risk_score = result.risk_score,
            mfa_probability = result.mfa_probability,
            risk_level = result.risk_level.as_str(),
            methodology = result.methodology.as_str(),
            "Comprehensive score calculated"
        );

        Ok(result)
    }

    /// Compare the audit's raw metrics against the publisher group's
    /// benchmarks. Missing group, missing stats and lookup errors all
    /// yield neutral comparisons (cold start / degraded collaborator).
    async fn compare_benchmarks(
        &self,
        features: &FeatureVector,
        publisher: &PublisherContext,
    ) -> BTreeMap<String, BenchmarkComparison> {
        let mut comparisons = BTreeMap::new();

        let group = match &publisher.benchmark_group {
            Some(group) if !group.is_empty() => group,
            _ => {
                debug!(
                    publisher_id = %publisher.publisher_id,
                    "No benchmark group configured, skipping peer comparison"
                );
                return comparisons;
            }
        };

        for metric in BENCHMARK_METRICS {
            let value = match metric {
                "ad_density" => features.ad_density,
                "ctr" => features.gam_ctr,
                "ecpm" => features.gam_ecpm,
                "fill_rate" => features.gam_fill_rate,
                _ => unreachable!(),
            };

            let comparison = match self.benchmarks.fetch_benchmark(group, metric).await {
                Ok(Some(stats)) => compare_to_benchmark(value, &stats),
                Ok(None) => neutral_comparison(value),
                Err(err) => {
                    warn!(
                        group = %group,
                        metric = metric,
                        error = %err,
                        "Benchmark lookup failed, using neutral comparison"
                    );
                    neutral_comparison(value)
                }
            };
            comparisons.insert(metric.to_string(), comparison);
        }

        comparisons
    }
}
