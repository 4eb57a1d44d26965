// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

/**
 * Bountyy Oy - Integration Tests
 * End-to-end tests for the comprehensive scoring workflow: JSON audit
 * ingestion, aggregation, trend analysis, benchmarks and weight hot swaps
 *
 * @copyright 2026 Bountyy Oy
 * @license Proprietary
 */

use async_trait::async_trait;
use chrono::{Duration, Utc};
use parking_lot::Mutex;
use seula_scorer::benchmark::calculate_median_percentiles;
use seula_scorer::config::{ScoringWeights, WeightsHandle};
use seula_scorer::normalizer::AuditRecord;
use seula_scorer::orchestrator::{BenchmarkStore, HistoryStore};
use seula_scorer::persistence::compute_delta;
use seula_scorer::types::{
    BenchmarkStats, DeltaDirection, HistoricalScorePoint, PercentileBucket, TrendDirection,
};
use seula_scorer::{
    PublisherContext, RiskLevel, ScoreOptions, ScorerResult, ScoringEngine,
};
use std::collections::HashMap;
use std::sync::Arc;

struct InMemoryHistory {
    points: Vec<HistoricalScorePoint>,
}

#[async_trait]
impl HistoryStore for InMemoryHistory {
    async fn fetch_score_history(
        &self,
        _publisher_id: &str,
    ) -> ScorerResult<Vec<HistoricalScorePoint>> {
        Ok(self.points.clone())
    }
}

#[derive(Default)]
struct InMemoryBenchmarks {
    stats: Mutex<HashMap<(String, String), BenchmarkStats>>,
}

#[async_trait]
impl BenchmarkStore for InMemoryBenchmarks {
    async fn fetch_benchmark(
        &self,
        group: &str,
        metric_type: &str,
    ) -> ScorerResult<Option<BenchmarkStats>> {
        Ok(self
            .stats
            .lock()
            .get(&(group.to_string(), metric_type.to_string()))
            .cloned())
    }

    async fn save_benchmark(
        &self,
        group: &str,
        metric_type: &str,
        stats: &BenchmarkStats,
    ) -> ScorerResult<()> {
        self.stats
            .lock()
            .insert((group.to_string(), metric_type.to_string()), stats.clone());
        Ok(())
    }
}

fn engine_with(
    points: Vec<HistoricalScorePoint>,
    benchmarks: InMemoryBenchmarks,
) -> ScoringEngine {
    ScoringEngine::new(
        WeightsHandle::default(),
        Arc::new(InMemoryHistory { points }),
        Arc::new(benchmarks),
    )
}

fn risky_audit() -> AuditRecord {
    serde_json::from_str(
        r#"{
            "auditId": "audit-risky-1",
            "adAnalysis": {
                "adDensity": 0.9,
                "autoRefreshRate": 1.0,
                "viewportOcclusion": 0.0
            },
            "technicalCheck": {
                "sslValid": false,
                "domainAgeMonths": 2.0
            }
        }"#,
    )
    .expect("risky audit JSON should deserialize")
}

fn clean_audit() -> AuditRecord {
    serde_json::from_str(
        r#"{
            "auditId": "audit-clean-1",
            "contentAnalysis": {
                "entropyScore": 1.0,
                "aiLikelihood": 0.0,
                "clickbaitScore": 0.0,
                "readabilityScore": 1.0,
                "freshnessScore": 1.0,
                "similarityScore": 0.0
            },
            "adAnalysis": {
                "adDensity": 0.05,
                "autoRefreshRate": 0.0,
                "viewportOcclusion": 0.0,
                "suspiciousInteractionRatio": 0.0,
                "scrollJacking": false,
                "layoutAdRatio": 0.0,
                "aboveFoldAdRatio": 0.0,
                "crossPageSimilarity": 0.0
            },
            "technicalCheck": {
                "performanceScore": 1.0,
                "sslValid": true,
                "brokenLinkRatio": 0.0,
                "domainAgeMonths": 48.0,
                "whoisPrivacy": false,
                "adsTxtValid": true
            },
            "policyCheck": {
                "violationCount": 0,
                "criticalViolationCount": 0
            }
        }"#,
    )
    .expect("clean audit JSON should deserialize")
}

fn history_days_ago(scores: &[f64]) -> Vec<HistoricalScorePoint> {
    let now = Utc::now();
    scores
        .iter()
        .enumerate()
        .map(|(i, &score)| HistoricalScorePoint {
            score,
            timestamp: Some(now - Duration::days((scores.len() - i) as i64)),
        })
        .collect()
}

#[tokio::test]
async fn test_json_audit_end_to_end_scoring() {
    let history = history_days_ago(&[0.2, 0.3, 0.4, 0.5]);
    let engine = engine_with(history, InMemoryBenchmarks::default());
    let publisher = PublisherContext {
        publisher_id: "pub-integration".to_string(),
        benchmark_group: None,
    };

    let result = engine
        .calculate_comprehensive_score(&risky_audit(), &publisher, &ScoreOptions::default())
        .await
        .unwrap();

    assert_eq!(result.audit_id, "audit-risky-1");
    assert!(result.components.behavioral.score > 0.5);
    assert!(result.components.technical.score > 0.5);
    assert!(matches!(
        result.risk_level,
        RiskLevel::High | RiskLevel::Critical
    ));
    assert_eq!(
        result.risk_score,
        result.mfa_probability.max(result.weighted_score)
    );

    // Climbing history plus a high current score reads as increasing
    assert_eq!(result.trend.trend.direction, TrendDirection::Increasing);
    assert_eq!(result.trend.recency_weight, 1.0);

    // Recommendations address the failing technical signals
    let recs = result.explanation.recommendations.join("\n");
    assert!(recs.contains("SSL"));
    assert!(recs.to_lowercase().contains("domain"));

    // No benchmark group configured, so no comparisons
    assert!(result.benchmarks.is_empty());
}

#[tokio::test]
async fn test_clean_audit_scores_minimal() {
    let engine = engine_with(vec![], InMemoryBenchmarks::default());
    let publisher = PublisherContext {
        publisher_id: "pub-clean".to_string(),
        benchmark_group: None,
    };

    let result = engine
        .calculate_comprehensive_score(&clean_audit(), &publisher, &ScoreOptions::default())
        .await
        .unwrap();

    assert!(result.risk_score < 0.1);
    assert_eq!(result.risk_level, RiskLevel::Minimal);
    assert_eq!(
        result.trend.trend.direction,
        TrendDirection::InsufficientData
    );
    assert!(!result.trend.anomaly.is_anomaly);
}

#[tokio::test]
async fn test_weight_hot_swap_applies_to_next_run() {
    let engine = engine_with(vec![], InMemoryBenchmarks::default());
    let publisher = PublisherContext {
        publisher_id: "pub-swap".to_string(),
        benchmark_group: None,
    };

    let before = engine
        .calculate_comprehensive_score(&risky_audit(), &publisher, &ScoreOptions::default())
        .await
        .unwrap();

    // Zero out the SSL and domain-age weights for subsequent runs
    let tuned =
        ScoringWeights::from_json(r#"{"technical": {"ssl": 0.0, "domain_age": 0.0}}"#).unwrap();
    engine.weights().replace(tuned).unwrap();

    let after = engine
        .calculate_comprehensive_score(&risky_audit(), &publisher, &ScoreOptions::default())
        .await
        .unwrap();

    assert!(after.components.technical.score < before.components.technical.score);
    assert!(after.mfa_probability < before.mfa_probability);
}

#[tokio::test]
async fn test_benchmark_outlier_flagging() {
    let benchmarks = InMemoryBenchmarks::default();
    benchmarks
        .save_benchmark(
            "lifestyle",
            "ad_density",
            &calculate_median_percentiles(&[0.10, 0.12, 0.14, 0.16]),
        )
        .await
        .unwrap();

    let engine = engine_with(vec![], benchmarks);
    let publisher = PublisherContext {
        publisher_id: "pub-bench".to_string(),
        benchmark_group: Some("lifestyle".to_string()),
    };

    let result = engine
        .calculate_comprehensive_score(&risky_audit(), &publisher, &ScoreOptions::default())
        .await
        .unwrap();

    let ad_density = &result.benchmarks["ad_density"];
    assert_eq!(ad_density.percentile, PercentileBucket::Above75th);
    assert!(ad_density.is_outlier);
    assert!(ad_density.deviation > 0.0);
    assert_eq!(ad_density.benchmark.sample_count, 4);
    assert!((ad_density.benchmark.median - 0.13).abs() < 1e-9);

    // Metrics without seeded stats compare neutrally
    let ctr = &result.benchmarks["ctr"];
    assert_eq!(ctr.percentile, PercentileBucket::Median);
    assert!(!ctr.is_outlier);
}

#[tokio::test]
async fn test_score_delta_between_consecutive_runs() {
    let engine = engine_with(vec![], InMemoryBenchmarks::default());
    let publisher = PublisherContext {
        publisher_id: "pub-delta".to_string(),
        benchmark_group: None,
    };
    let options = ScoreOptions::default();

    let first = engine
        .calculate_comprehensive_score(&clean_audit(), &publisher, &options)
        .await
        .unwrap();
    let second = engine
        .calculate_comprehensive_score(&risky_audit(), &publisher, &options)
        .await
        .unwrap();

    let delta = compute_delta(second.risk_score, first.risk_score, 1.0);
    assert_eq!(delta.delta_direction, DeltaDirection::Increasing);
    assert!(delta.delta_value > 0.0);
    assert!(delta.velocity > 0.0);
}
