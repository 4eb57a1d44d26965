// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

/**
 * Bountyy Oy - Scoring Engine Data Model
 * Feature vectors, component risks, aggregated scores, trend and
 * benchmark results, versioned history records
 *
 * @copyright 2026 Bountyy Oy
 * @license Proprietary
 */

use crate::errors::ScorerError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Canonical flat feature vector for one audit snapshot.
///
/// Every numeric field is normalized to [0,1] before use unless noted;
/// missing input data defaults to 0/false, never propagating nulls into
/// arithmetic. Risk-direction convention: higher value means higher risk
/// (readability, freshness and performance are inverted by the normalizer).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FeatureVector {
    // Behavioral signals
    pub ad_density: f64,
    pub auto_refresh_rate: f64,
    pub viewport_occlusion: f64,
    pub suspicious_interaction_ratio: f64,
    pub scroll_jacking: bool,

    // Content signals
    pub low_entropy: f64,
    pub ai_likelihood: f64,
    pub clickbait_score: f64,
    pub poor_readability: f64,
    pub staleness: f64,
    pub duplicate_similarity: f64,

    // Technical signals
    pub performance_risk: f64,
    pub ssl_valid: bool,
    pub broken_link_ratio: f64,
    /// Raw months since domain registration (not normalized)
    pub domain_age_months: f64,
    pub whois_privacy: bool,
    pub missing_ads_txt: bool,

    // Layout signals
    pub layout_ad_ratio: f64,
    pub above_fold_ad_ratio: f64,
    pub cross_page_similarity: f64,

    // GAM correlation signals
    pub ctr_deviation: f64,
    pub ecpm_deviation: f64,
    pub fill_rate_deviation: f64,
    /// Raw spike ratio vs baseline impressions (1.0 = no spike)
    pub impression_spike_ratio: f64,

    // Policy signals (raw counts)
    pub policy_violation_count: u32,
    pub critical_violation_count: u32,

    // Raw ad-serving metrics, kept for benchmark comparison
    pub gam_ctr: f64,
    pub gam_ecpm: f64,
    pub gam_fill_rate: f64,

    /// Audit observation time, when the crawler supplied one
    pub observed_at: Option<DateTime<Utc>>,
}

/// The six risk dimensions the engine scores
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComponentKind {
    Behavioral,
    Content,
    Technical,
    Layout,
    GamCorrelation,
    Policy,
}

impl ComponentKind {
    /// All components in canonical order (matches the logistic coefficient vector)
    pub const ALL: [ComponentKind; 6] = [
        ComponentKind::Behavioral,
        ComponentKind::Content,
        ComponentKind::Technical,
        ComponentKind::Layout,
        ComponentKind::GamCorrelation,
        ComponentKind::Policy,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ComponentKind::Behavioral => "behavioral",
            ComponentKind::Content => "content",
            ComponentKind::Technical => "technical",
            ComponentKind::Layout => "layout",
            ComponentKind::GamCorrelation => "gam_correlation",
            ComponentKind::Policy => "policy",
        }
    }
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One weighted sub-signal inside a component breakdown
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignalContribution {
    /// Clamped signal value in [0,1] (booleans coerced to 0/1)
    pub value: f64,
    /// Configured weight applied to the value
    pub weight: f64,
    /// True when the underlying signal is a boolean flag
    #[serde(default)]
    pub flag: bool,
}

/// Risk score for one component with its per-signal breakdown.
/// Created fresh each scoring run; immutable afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentRisk {
    /// Component score in [0,1]
    pub score: f64,
    /// Sub-signal name -> contribution
    pub breakdown: BTreeMap<String, SignalContribution>,
}

/// All six component risks for one audit
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentBreakdown {
    pub behavioral: ComponentRisk,
    pub content: ComponentRisk,
    pub technical: ComponentRisk,
    pub layout: ComponentRisk,
    pub gam_correlation: ComponentRisk,
    pub policy: ComponentRisk,
}

impl ComponentBreakdown {
    pub fn get(&self, kind: ComponentKind) -> &ComponentRisk {
        match kind {
            ComponentKind::Behavioral => &self.behavioral,
            ComponentKind::Content => &self.content,
            ComponentKind::Technical => &self.technical,
            ComponentKind::Layout => &self.layout,
            ComponentKind::GamCorrelation => &self.gam_correlation,
            ComponentKind::Policy => &self.policy,
        }
    }

    /// Iterate components in canonical order
    pub fn iter(&self) -> impl Iterator<Item = (ComponentKind, &ComponentRisk)> {
        ComponentKind::ALL.iter().map(move |kind| (*kind, self.get(*kind)))
    }

    /// Component scores as a fixed-order array (logistic model input)
    pub fn scores(&self) -> [f64; 6] {
        [
            self.behavioral.score,
            self.content.score,
            self.technical.score,
            self.layout.score,
            self.gam_correlation.score,
            self.policy.score,
        ]
    }
}

/// Probability aggregation strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AggregationMethod {
    Bayesian,
    Logistic,
}

impl AggregationMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            AggregationMethod::Bayesian => "Bayesian",
            AggregationMethod::Logistic => "Logistic Regression",
        }
    }
}

impl fmt::Display for AggregationMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Aggregated risk for one audit
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AggregatedRisk {
    /// Calibrated MFA probability from the selected aggregator, in [0,1]
    pub mfa_probability: f64,
    /// Component-weight mean of raw component scores
    pub weighted_score: f64,
    /// max(mfa_probability, weighted_score)
    pub overall_risk_score: f64,
    pub methodology: AggregationMethod,
    pub components: ComponentBreakdown,
}

/// Shared score-to-level thresholds
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskLevel {
    Minimal,
    Low,
    Medium,
    High,
    Critical,
}

impl RiskLevel {
    /// Map a [0,1] score onto the shared thresholds:
    /// >=0.8 CRITICAL, >=0.6 HIGH, >=0.4 MEDIUM, >=0.2 LOW, else MINIMAL
    pub fn from_score(score: f64) -> Self {
        if score >= 0.8 {
            RiskLevel::Critical
        } else if score >= 0.6 {
            RiskLevel::High
        } else if score >= 0.4 {
            RiskLevel::Medium
        } else if score >= 0.2 {
            RiskLevel::Low
        } else {
            RiskLevel::Minimal
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Minimal => "MINIMAL",
            RiskLevel::Low => "LOW",
            RiskLevel::Medium => "MEDIUM",
            RiskLevel::High => "HIGH",
            RiskLevel::Critical => "CRITICAL",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One point of a publisher's append-only score history (newest last)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoricalScorePoint {
    pub score: f64,
    pub timestamp: Option<DateTime<Utc>>,
}

/// Descriptive statistics over history plus the current score
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScoreStatistics {
    pub mean: f64,
    pub median: f64,
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
    pub count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendDirection {
    Increasing,
    Decreasing,
    Stable,
    InsufficientData,
}

impl TrendDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            TrendDirection::Increasing => "increasing",
            TrendDirection::Decreasing => "decreasing",
            TrendDirection::Stable => "stable",
            TrendDirection::InsufficientData => "insufficient_data",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrendSummary {
    pub direction: TrendDirection,
    pub magnitude: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VelocityDirection {
    Accelerating,
    Decelerating,
}

impl VelocityDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            VelocityDirection::Accelerating => "accelerating",
            VelocityDirection::Decelerating => "decelerating",
        }
    }
}

/// Score change per day since the last historical observation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Velocity {
    /// min(|raw velocity|, 1)
    pub value: f64,
    pub direction: VelocityDirection,
    pub time_window_days: f64,
}

/// Deviation of the current score from the historical mean
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Deviation {
    /// current - historical mean
    pub value: f64,
    /// z-score against history only (0 when history std-dev is 0)
    pub zscore: f64,
    /// Percentage change vs the historical mean (0 when mean is 0)
    pub percentage_change: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnomalyAssessment {
    pub is_anomaly: bool,
    /// Additive trigger score capped at 1
    pub score: f64,
    pub reasons: Vec<String>,
}

/// Full trend & anomaly analysis for one scoring run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrendResult {
    pub statistics: ScoreStatistics,
    pub trend: TrendSummary,
    pub velocity: Velocity,
    pub deviation: Deviation,
    pub anomaly: AnomalyAssessment,
    /// Discount factor for stale history (1.0 = fresh)
    pub recency_weight: f64,
    /// Weighted composite of velocity/deviation/anomaly/staleness, capped at 1
    pub trend_score: f64,
}

/// Peer percentile statistics for one metric type within a publisher group
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BenchmarkStats {
    pub median: f64,
    pub percentile_25: f64,
    pub percentile_75: f64,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub std_dev: f64,
    pub sample_count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PercentileBucket {
    Below25th,
    Median,
    Above75th,
}

impl PercentileBucket {
    pub fn as_str(&self) -> &'static str {
        match self {
            PercentileBucket::Below25th => "below_25th",
            PercentileBucket::Median => "median",
            PercentileBucket::Above75th => "above_75th",
        }
    }
}

/// Comparison of one current metric against its peer benchmark
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchmarkComparison {
    /// value - benchmark median
    pub deviation: f64,
    /// Deviation relative to the median, in percent (0 when median is 0)
    pub percentage_deviation: f64,
    pub percentile: PercentileBucket,
    /// 1.5x IQR fence beyond the 25th/75th percentile
    pub is_outlier: bool,
    /// The raw current value that was compared
    pub current_value: f64,
    /// Snapshot of the stats the comparison was made against, so stored
    /// rows stay interpretable after the benchmark is recomputed
    pub benchmark: BenchmarkStats,
}

/// Severity tag for explanation factors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FactorSeverity {
    Critical,
    High,
    Medium,
    Low,
}

impl FactorSeverity {
    pub fn as_str(&self) -> &'static str {
        match self {
            FactorSeverity::Critical => "critical",
            FactorSeverity::High => "high",
            FactorSeverity::Medium => "medium",
            FactorSeverity::Low => "low",
        }
    }
}

/// A single sub-signal that contributed to the risk assessment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContributingFactor {
    pub signal: String,
    pub component: ComponentKind,
    pub value: f64,
    pub severity: FactorSeverity,
}

/// Per-component detail inside an explanation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentDetail {
    pub level: RiskLevel,
    pub score: f64,
    pub description: String,
    pub breakdown: BTreeMap<String, SignalContribution>,
}

/// Human-readable justification for an aggregated risk score
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Explanation {
    pub summary: String,
    pub details: BTreeMap<String, ComponentDetail>,
    /// At most 5 entries; ordering carries no meaning
    pub primary_reasons: Vec<String>,
    pub contributing_factors: Vec<ContributingFactor>,
    pub recommendations: Vec<String>,
    pub risk_level: RiskLevel,
    pub mfa_level: RiskLevel,
    pub confidence_score: f64,
    pub timestamp: Option<DateTime<Utc>>,
}

/// One immutable versioned score record; version numbers are strictly
/// increasing per publisher (assigned as max-existing + 1)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VersionedScoreRecord {
    pub publisher_id: String,
    pub audit_id: String,
    pub version_number: i64,
    pub risk_score: f64,
    pub mfa_probability: f64,
    pub risk_level: RiskLevel,
    pub recorded_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeltaDirection {
    Increasing,
    Decreasing,
    Stable,
}

impl DeltaDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeltaDirection::Increasing => "increasing",
            DeltaDirection::Decreasing => "decreasing",
            DeltaDirection::Stable => "stable",
        }
    }
}

/// Score movement between the two most recent versioned records
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreDelta {
    pub current_score: f64,
    pub previous_score: f64,
    pub delta_value: f64,
    /// Relative change vs the previous score, in percent (0 when previous is 0)
    pub delta_percentage: f64,
    pub delta_direction: DeltaDirection,
    /// Delta per day over the observation window
    pub velocity: f64,
}

/// Final assembled result for one comprehensive scoring run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComprehensiveScoreResult {
    pub publisher_id: String,
    pub audit_id: String,
    pub benchmark_group: Option<String>,
    /// max(mfa_probability, weighted_score)
    pub risk_score: f64,
    pub mfa_probability: f64,
    pub weighted_score: f64,
    pub risk_level: RiskLevel,
    pub methodology: AggregationMethod,
    pub components: ComponentBreakdown,
    pub trend: TrendResult,
    /// Metric type -> comparison against the publisher group's benchmark
    pub benchmarks: BTreeMap<String, BenchmarkComparison>,
    pub explanation: Explanation,
    pub scored_at: DateTime<Utc>,
}

/// Outcome of one step of the best-effort persistence sequence
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersistenceStep {
    pub operation: String,
    pub succeeded: bool,
    pub attempts: u32,
    pub error: Option<String>,
}

/// Per-step success/failure map for `save_comprehensive_score`.
/// Partial failure leaves earlier writes in place (best-effort, no rollback).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PersistenceReport {
    pub steps: Vec<PersistenceStep>,
}

impl PersistenceReport {
    pub fn record_success(&mut self, operation: &str, attempts: u32) {
        self.steps.push(PersistenceStep {
            operation: operation.to_string(),
            succeeded: true,
            attempts,
            error: None,
        });
    }

    pub fn record_failure(&mut self, operation: &str, attempts: u32, error: &ScorerError) {
        self.steps.push(PersistenceStep {
            operation: operation.to_string(),
            succeeded: false,
            attempts,
            error: Some(error.to_string()),
        });
    }

    pub fn all_succeeded(&self) -> bool {
        self.steps.iter().all(|s| s.succeeded)
    }

    pub fn failed_operations(&self) -> Vec<&str> {
        self.steps
            .iter()
            .filter(|s| !s.succeeded)
            .map(|s| s.operation.as_str())
            .collect()
    }
}
