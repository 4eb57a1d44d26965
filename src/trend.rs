// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

/**
 * Bountyy Oy - Trend & Anomaly Analyzer
 * Statistics, trend direction, score velocity, z-score deviation and
 * additive anomaly detection over a publisher's score history
 *
 * @copyright 2026 Bountyy Oy
 * @license Proprietary
 */

use crate::config::TrendAnalysisWeights;
use crate::types::{
    AnomalyAssessment, Deviation, HistoricalScorePoint, ScoreStatistics, TrendDirection,
    TrendResult, TrendSummary, Velocity, VelocityDirection,
};
use chrono::{DateTime, Utc};
use tracing::debug;

/// Minimum history length before anomaly detection activates
const MIN_ANOMALY_HISTORY: usize = 3;

/// Trend direction threshold: average movement beyond +/-0.1 counts
const TREND_THRESHOLD: f64 = 0.1;

/// Anomaly trigger weights (additive, capped at 1)
const EXTREME_ZSCORE_WEIGHT: f64 = 0.4;
const HIGH_ZSCORE_WEIGHT: f64 = 0.2;
const JUMP_WEIGHT: f64 = 0.3;
const NEW_MAX_WEIGHT: f64 = 0.15;
const SPIKE_WEIGHT: f64 = 0.15;
const ANOMALY_THRESHOLD: f64 = 0.5;

/// z-score magnitude at which the trend-score deviation term saturates
const ZSCORE_SATURATION: f64 = 3.0;

/// Population statistics over a score series
pub fn score_statistics(scores: &[f64]) -> ScoreStatistics {
    if scores.is_empty() {
        return ScoreStatistics::default();
    }

    let count = scores.len();
    let mean = scores.iter().sum::<f64>() / count as f64;
    let variance = scores.iter().map(|s| (s - mean).powi(2)).sum::<f64>() / count as f64;

    let mut sorted = scores.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let median = if count % 2 == 0 {
        (sorted[count / 2 - 1] + sorted[count / 2]) / 2.0
    } else {
        sorted[count / 2]
    };

    ScoreStatistics {
        mean,
        median,
        std_dev: variance.sqrt(),
        min: sorted[0],
        max: sorted[count - 1],
        count,
    }
}

/// Classify trend direction over a score series (oldest first).
///
/// Looks at a recent window of at most 5 points and compares the average
/// of its earliest min(3, n) points against the average of its latest
/// min(3, n) points. Fewer than 2 points yields `insufficient_data`.
pub fn detect_trend(scores: &[f64]) -> TrendSummary {
    if scores.len() < 2 {
        return TrendSummary {
            direction: TrendDirection::InsufficientData,
            magnitude: 0.0,
        };
    }

    let window_len = scores.len().min(5);
    let window = &scores[scores.len() - window_len..];
    let edge = window.len().min(3);

    let early_avg = window[..edge].iter().sum::<f64>() / edge as f64;
    let late_avg = window[window.len() - edge..].iter().sum::<f64>() / edge as f64;
    let delta = late_avg - early_avg;

    let direction = if delta > TREND_THRESHOLD {
        TrendDirection::Increasing
    } else if delta < -TREND_THRESHOLD {
        TrendDirection::Decreasing
    } else {
        TrendDirection::Stable
    };

    TrendSummary {
        direction,
        magnitude: delta.abs(),
    }
}

/// Score change per day since the last historical observation.
/// Without a timestamp the window defaults to one day.
fn score_velocity(
    current: f64,
    history: &[HistoricalScorePoint],
    now: DateTime<Utc>,
) -> Velocity {
    let last = match history.last() {
        Some(point) => point,
        None => {
            return Velocity {
                value: 0.0,
                direction: VelocityDirection::Accelerating,
                time_window_days: 1.0,
            }
        }
    };

    let window_days = last
        .timestamp
        .map(|ts| ((now - ts).num_days().max(0) as f64).max(1.0))
        .unwrap_or(1.0);

    let raw = (current - last.score) / window_days;

    Velocity {
        value: raw.abs().min(1.0),
        direction: if raw >= 0.0 {
            VelocityDirection::Accelerating
        } else {
            VelocityDirection::Decelerating
        },
        time_window_days: window_days,
    }
}

/// Deviation of the current score from the historical mean. The z-score
/// uses history only; a flat history (std-dev 0) reports z = 0 and leaves
/// the divergence to the anomaly triggers.
fn score_deviation(current: f64, history_scores: &[f64]) -> Deviation {
    if history_scores.is_empty() {
        return Deviation::default();
    }

    let stats = score_statistics(history_scores);
    let value = current - stats.mean;
    let zscore = if stats.std_dev > 0.0 {
        value / stats.std_dev
    } else {
        0.0
    };
    let percentage_change = if stats.mean.abs() > f64::EPSILON {
        value / stats.mean * 100.0
    } else {
        0.0
    };

    Deviation {
        value,
        zscore,
        percentage_change,
    }
}

/// Additive anomaly scoring over four independent triggers.
/// Requires at least 3 history points; below that, never anomalous.
pub fn detect_anomaly(current: f64, history_scores: &[f64]) -> AnomalyAssessment {
    if history_scores.len() < MIN_ANOMALY_HISTORY {
        return AnomalyAssessment::default();
    }

    let mut score = 0.0;
    let mut reasons = Vec::new();

    let stats = score_statistics(history_scores);
    let divergent_flat_history =
        stats.std_dev <= 0.0 && (current - stats.mean).abs() > f64::EPSILON;
    let zscore = if stats.std_dev > 0.0 {
        (current - stats.mean) / stats.std_dev
    } else {
        0.0
    };

    if zscore.abs() > 2.5 || divergent_flat_history {
        score += EXTREME_ZSCORE_WEIGHT;
        reasons.push(format!(
            "score deviates extremely from historical mean (z={:.2})",
            zscore
        ));
    } else if zscore.abs() > 2.0 {
        score += HIGH_ZSCORE_WEIGHT;
        reasons.push(format!(
            "score deviates strongly from historical mean (z={:.2})",
            zscore
        ));
    }

    // Largest jump between consecutive historical observations
    let max_historical_jump = history_scores
        .windows(2)
        .map(|w| (w[1] - w[0]).abs())
        .fold(0.0, f64::max);
    let current_jump = (current - history_scores[history_scores.len() - 1]).abs();
    if current_jump > 2.0 * max_historical_jump && current_jump > 0.0 {
        score += JUMP_WEIGHT;
        reasons.push(format!(
            "jump of {:.3} exceeds twice the largest historical jump ({:.3})",
            current_jump, max_historical_jump
        ));
    }

    if current > stats.max {
        score += NEW_MAX_WEIGHT;
        reasons.push(format!(
            "new all-time maximum ({:.3} > {:.3})",
            current, stats.max
        ));
    }

    if current > 0.0 && history_scores.iter().all(|&s| s < current / 2.0) {
        score += SPIKE_WEIGHT;
        reasons.push("sudden spike: every historical score is below half the current".to_string());
    }

    let score = score.min(1.0);
    AnomalyAssessment {
        is_anomaly: score > ANOMALY_THRESHOLD,
        score,
        reasons,
    }
}

/// Discount factor for stale history: full weight within a week, stepping
/// down to 0.25 beyond 90 days. Untimestamped or empty history is treated
/// as fresh (there is nothing to discount).
pub fn recency_weight(history: &[HistoricalScorePoint], now: DateTime<Utc>) -> f64 {
    let last_ts = match history.last().and_then(|p| p.timestamp) {
        Some(ts) => ts,
        None => return 1.0,
    };

    let age_days = (now - last_ts).num_days().max(0);
    if age_days <= 7 {
        1.0
    } else if age_days <= 14 {
        0.9
    } else if age_days <= 30 {
        0.75
    } else if age_days <= 90 {
        0.5
    } else {
        0.25
    }
}

/// Full trend & anomaly analysis for one scoring run.
///
/// History is the publisher's append-only score series, oldest first,
/// read-only to this analyzer; it may be empty.
pub fn analyze_trend(
    current: f64,
    history: &[HistoricalScorePoint],
    weights: &TrendAnalysisWeights,
    now: DateTime<Utc>,
) -> TrendResult {
    let history_scores: Vec<f64> = history.iter().map(|p| p.score).collect();

    let mut all_scores = history_scores.clone();
    all_scores.push(current);

    let statistics = score_statistics(&all_scores);
    // Direction needs at least two historical points; one history point
    // plus the current score is not a trend yet
    let trend = if history.len() < 2 {
        TrendSummary {
            direction: TrendDirection::InsufficientData,
            magnitude: 0.0,
        }
    } else {
        detect_trend(&all_scores)
    };
    let velocity = score_velocity(current, history, now);
    let deviation = score_deviation(current, &history_scores);
    let anomaly = detect_anomaly(current, &history_scores);
    let recency = recency_weight(history, now);

    let deviation_term = (deviation.zscore.abs() / ZSCORE_SATURATION).min(1.0);
    let trend_score = (weights.velocity_weight * velocity.value
        + weights.deviation_weight * deviation_term
        + weights.anomaly_weight * anomaly.score
        + weights.recency_weight * (1.0 - recency))
        .min(1.0);

    debug!(
        direction = trend.direction.as_str(),
        magnitude = trend.magnitude,
        anomaly_score = anomaly.score,
        trend_score = trend_score,
        history_points = history.len(),
        "Trend analysis complete"
    );

    TrendResult {
        statistics,
        trend,
        velocity,
        deviation,
        anomaly,
        recency_weight: recency,
        trend_score,
    }
}
