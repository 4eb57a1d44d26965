// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

/**
 * Bountyy Oy - Peer Benchmark Comparator
 * Percentile statistics over peer-group metric samples and 1.5x IQR
 * outlier comparison of a publisher's current metrics
 *
 * @copyright 2026 Bountyy Oy
 * @license Proprietary
 */

use crate::types::{BenchmarkComparison, BenchmarkStats, PercentileBucket};
use std::collections::BTreeMap;
use tracing::debug;

/// IQR multiplier for the outlier fence
const OUTLIER_FENCE: f64 = 1.5;

/// Index-based percentile: ceil(n * q) - 1, clamped to the valid range
fn percentile_index(n: usize, q: f64) -> usize {
    let idx = (n as f64 * q).ceil() as usize;
    idx.saturating_sub(1).min(n - 1)
}

/// Percentile statistics over one metric's peer samples.
/// An empty sample set yields all-zero stats with `sample_count = 0`.
pub fn calculate_median_percentiles(samples: &[f64]) -> BenchmarkStats {
    if samples.is_empty() {
        return BenchmarkStats::default();
    }

    let mut sorted = samples.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let n = sorted.len();

    let median = if n % 2 == 0 {
        (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
    } else {
        sorted[n / 2]
    };

    let mean = sorted.iter().sum::<f64>() / n as f64;
    let variance = sorted.iter().map(|s| (s - mean).powi(2)).sum::<f64>() / n as f64;

    BenchmarkStats {
        median,
        percentile_25: sorted[percentile_index(n, 0.25)],
        percentile_75: sorted[percentile_index(n, 0.75)],
        min: sorted[0],
        max: sorted[n - 1],
        mean,
        std_dev: variance.sqrt(),
        sample_count: n,
    }
}

/// Recompute benchmark stats for every metric in a peer-group sample set
pub fn calculate_benchmarks(
    group: &str,
    samples_by_metric: &BTreeMap<String, Vec<f64>>,
) -> BTreeMap<String, BenchmarkStats> {
    let stats: BTreeMap<String, BenchmarkStats> = samples_by_metric
        .iter()
        .map(|(metric, samples)| (metric.clone(), calculate_median_percentiles(samples)))
        .collect();

    debug!(
        group = group,
        metrics = stats.len(),
        "Recomputed peer benchmarks"
    );
    stats
}

/// Neutral comparison for the cold-start case (no benchmark exists yet)
pub fn neutral_comparison(value: f64) -> BenchmarkComparison {
    BenchmarkComparison {
        deviation: 0.0,
        percentage_deviation: 0.0,
        percentile: PercentileBucket::Median,
        is_outlier: false,
        current_value: value,
        benchmark: BenchmarkStats::default(),
    }
}

/// Compare a current metric value against its peer benchmark.
///
/// Deviation is measured from the median; the percentile bucket places
/// the value against the 25th/75th percentiles; the outlier flag uses the
/// 1.5x IQR rule. Stats with no samples yield the neutral result.
pub fn compare_to_benchmark(value: f64, stats: &BenchmarkStats) -> BenchmarkComparison {
    if stats.sample_count == 0 {
        return neutral_comparison(value);
    }

    let deviation = value - stats.median;
    let percentage_deviation = if stats.median.abs() > f64::EPSILON {
        deviation / stats.median * 100.0
    } else {
        0.0
    };

    let percentile = if value < stats.percentile_25 {
        PercentileBucket::Below25th
    } else if value > stats.percentile_75 {
        PercentileBucket::Above75th
    } else {
        PercentileBucket::Median
    };

    let iqr = stats.percentile_75 - stats.percentile_25;
    let is_outlier = value < stats.percentile_25 - OUTLIER_FENCE * iqr
        || value > stats.percentile_75 + OUTLIER_FENCE * iqr;

    BenchmarkComparison {
        deviation,
        percentage_deviation,
        percentile,
        is_outlier,
        current_value: value,
        benchmark: stats.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_samples_yield_zero_stats() {
        let stats = calculate_median_percentiles(&[]);
        assert_eq!(stats.sample_count, 0);
        assert_eq!(stats.median, 0.0);
        assert_eq!(stats.percentile_25, 0.0);
        assert_eq!(stats.percentile_75, 0.0);
        assert_eq!(stats.mean, 0.0);
        assert_eq!(stats.std_dev, 0.0);
    }

    #[test]
    fn test_four_sample_fixture() {
        // Index-based percentiles: ceil(4*0.25)-1 = 0, ceil(4*0.75)-1 = 2
        let stats = calculate_median_percentiles(&[1.0, 2.0, 3.0, 4.0]);
        assert_eq!(stats.median, 2.5);
        assert_eq!(stats.percentile_25, 1.0);
        assert_eq!(stats.percentile_75, 3.0);
        assert_eq!(stats.mean, 2.5);
        assert_eq!(stats.min, 1.0);
        assert_eq!(stats.max, 4.0);
        assert_eq!(stats.sample_count, 4);
    }

    #[test]
    fn test_single_sample() {
        let stats = calculate_median_percentiles(&[0.42]);
        assert_eq!(stats.median, 0.42);
        assert_eq!(stats.percentile_25, 0.42);
        assert_eq!(stats.percentile_75, 0.42);
        assert_eq!(stats.std_dev, 0.0);
        assert_eq!(stats.sample_count, 1);
    }

    #[test]
    fn test_compare_at_median_is_neutral() {
        let stats = calculate_median_percentiles(&[1.0, 2.0, 3.0, 4.0]);
        let cmp = compare_to_benchmark(2.5, &stats);
        assert_eq!(cmp.deviation, 0.0);
        assert_eq!(cmp.percentage_deviation, 0.0);
        assert_eq!(cmp.percentile, PercentileBucket::Median);
        assert!(!cmp.is_outlier);
    }

    #[test]
    fn test_compare_buckets_and_outliers() {
        let stats = calculate_median_percentiles(&[1.0, 2.0, 3.0, 4.0]);

        let low = compare_to_benchmark(0.5, &stats);
        assert_eq!(low.percentile, PercentileBucket::Below25th);
        assert!(!low.is_outlier);

        let high = compare_to_benchmark(3.5, &stats);
        assert_eq!(high.percentile, PercentileBucket::Above75th);
        assert!((high.deviation - 1.0).abs() < 1e-9);
        assert!((high.percentage_deviation - 40.0).abs() < 1e-9);
        assert!(!high.is_outlier);

        // IQR = 2.0, upper fence = 3.0 + 3.0 = 6.0
        let extreme = compare_to_benchmark(6.5, &stats);
        assert!(extreme.is_outlier);
        let extreme_low = compare_to_benchmark(-2.5, &stats);
        assert!(extreme_low.is_outlier);
    }

    #[test]
    fn test_zero_median_avoids_division() {
        let stats = calculate_median_percentiles(&[-1.0, 0.0, 0.0, 1.0]);
        let cmp = compare_to_benchmark(0.8, &stats);
        assert_eq!(cmp.percentage_deviation, 0.0);
        assert!((cmp.deviation - 0.8).abs() < 1e-9);
    }

    #[test]
    fn test_cold_start_neutral_result() {
        let cmp = compare_to_benchmark(0.7, &BenchmarkStats::default());
        assert_eq!(cmp.deviation, 0.0);
        assert_eq!(cmp.percentile, PercentileBucket::Median);
        assert!(!cmp.is_outlier);
        assert_eq!(cmp.current_value, 0.7);
        assert_eq!(cmp.benchmark.sample_count, 0);
    }

    #[test]
    fn test_comparison_snapshots_the_stats_it_used() {
        let stats = calculate_median_percentiles(&[1.0, 2.0, 3.0, 4.0]);
        let cmp = compare_to_benchmark(3.5, &stats);
        // The snapshot stays with the comparison even after the live
        // benchmark is recomputed
        assert_eq!(cmp.benchmark.median, 2.5);
        assert_eq!(cmp.benchmark.percentile_25, 1.0);
        assert_eq!(cmp.benchmark.percentile_75, 3.0);
        assert_eq!(cmp.benchmark.sample_count, 4);
    }

    #[test]
    fn test_calculate_benchmarks_per_metric() {
        let mut samples = BTreeMap::new();
        samples.insert("ad_density".to_string(), vec![0.2, 0.4, 0.6]);
        samples.insert("ctr".to_string(), vec![]);

        let stats = calculate_benchmarks("news_publishers", &samples);
        assert_eq!(stats["ad_density"].median, 0.4);
        assert_eq!(stats["ctr"].sample_count, 0);
    }
}
