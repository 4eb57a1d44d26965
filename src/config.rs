// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

/**
 * Bountyy Oy - Scoring Weight Configuration
 * Hot-swappable, versioned weight document for the risk calculators,
 * Bayesian priors, aggregation weights and trend analysis weights
 *
 * @copyright 2026 Bountyy Oy
 * @license Proprietary
 */

use crate::errors::{ScorerError, ScorerResult};
use crate::types::ComponentKind;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;
use validator::Validate;

/// Per-signal weights for the behavioral risk calculator
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct BehavioralWeights {
    #[validate(range(min = 0.0, max = 1.0))]
    pub ad_density: f64,
    #[validate(range(min = 0.0, max = 1.0))]
    pub auto_refresh: f64,
    #[validate(range(min = 0.0, max = 1.0))]
    pub viewport_occlusion: f64,
    #[validate(range(min = 0.0, max = 1.0))]
    pub suspicious_interactions: f64,
    #[validate(range(min = 0.0, max = 1.0))]
    pub scroll_jacking: f64,
}

impl Default for BehavioralWeights {
    fn default() -> Self {
        Self {
            ad_density: 0.3,
            auto_refresh: 0.25,
            viewport_occlusion: 0.2,
            suspicious_interactions: 0.15,
            scroll_jacking: 0.1,
        }
    }
}

/// Per-signal weights for the content risk calculator
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct ContentWeights {
    #[validate(range(min = 0.0, max = 1.0))]
    pub low_entropy: f64,
    #[validate(range(min = 0.0, max = 1.0))]
    pub ai_likelihood: f64,
    #[validate(range(min = 0.0, max = 1.0))]
    pub clickbait: f64,
    #[validate(range(min = 0.0, max = 1.0))]
    pub poor_readability: f64,
    #[validate(range(min = 0.0, max = 1.0))]
    pub staleness: f64,
    #[validate(range(min = 0.0, max = 1.0))]
    pub duplicate_similarity: f64,
}

impl Default for ContentWeights {
    fn default() -> Self {
        Self {
            low_entropy: 0.2,
            ai_likelihood: 0.2,
            clickbait: 0.2,
            poor_readability: 0.15,
            staleness: 0.1,
            duplicate_similarity: 0.15,
        }
    }
}

/// Per-signal weights for the technical risk calculator
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct TechnicalWeights {
    #[validate(range(min = 0.0, max = 1.0))]
    pub performance: f64,
    #[validate(range(min = 0.0, max = 1.0))]
    pub ssl: f64,
    #[validate(range(min = 0.0, max = 1.0))]
    pub broken_links: f64,
    #[validate(range(min = 0.0, max = 1.0))]
    pub domain_age: f64,
    #[validate(range(min = 0.0, max = 1.0))]
    pub whois_privacy: f64,
    #[validate(range(min = 0.0, max = 1.0))]
    pub ads_txt: f64,
}

impl Default for TechnicalWeights {
    fn default() -> Self {
        Self {
            performance: 0.15,
            ssl: 0.35,
            broken_links: 0.1,
            domain_age: 0.3,
            whois_privacy: 0.05,
            ads_txt: 0.05,
        }
    }
}

/// Per-signal weights for the layout risk calculator
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct LayoutWeights {
    #[validate(range(min = 0.0, max = 1.0))]
    pub ad_ratio: f64,
    #[validate(range(min = 0.0, max = 1.0))]
    pub above_fold: f64,
    #[validate(range(min = 0.0, max = 1.0))]
    pub cross_page_similarity: f64,
}

impl Default for LayoutWeights {
    fn default() -> Self {
        Self {
            ad_ratio: 0.4,
            above_fold: 0.35,
            cross_page_similarity: 0.25,
        }
    }
}

/// Per-signal weights for the GAM correlation risk calculator
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct GamCorrelationWeights {
    #[validate(range(min = 0.0, max = 1.0))]
    pub ctr_deviation: f64,
    #[validate(range(min = 0.0, max = 1.0))]
    pub ecpm_deviation: f64,
    #[validate(range(min = 0.0, max = 1.0))]
    pub fill_rate_deviation: f64,
    #[validate(range(min = 0.0, max = 1.0))]
    pub impression_spike: f64,
}

impl Default for GamCorrelationWeights {
    fn default() -> Self {
        Self {
            ctr_deviation: 0.3,
            ecpm_deviation: 0.25,
            fill_rate_deviation: 0.2,
            impression_spike: 0.25,
        }
    }
}

/// Per-signal weights for the policy risk calculator
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct PolicyWeights {
    #[validate(range(min = 0.0, max = 1.0))]
    pub violations: f64,
    #[validate(range(min = 0.0, max = 1.0))]
    pub critical_violations: f64,
}

impl Default for PolicyWeights {
    fn default() -> Self {
        Self {
            violations: 0.6,
            critical_violations: 0.4,
        }
    }
}

/// Priors for the Bayesian aggregator. Components without an explicit
/// prior fall back to the baseline MFA rate.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct BayesianPriors {
    #[validate(range(min = 0.0, max = 1.0))]
    pub baseline_rate: f64,
    pub behavioral_prior: Option<f64>,
    pub content_prior: Option<f64>,
    pub technical_prior: Option<f64>,
    pub layout_prior: Option<f64>,
    pub gam_correlation_prior: Option<f64>,
    pub policy_prior: Option<f64>,
}

impl Default for BayesianPriors {
    fn default() -> Self {
        Self {
            baseline_rate: 0.15,
            behavioral_prior: None,
            content_prior: None,
            technical_prior: None,
            layout_prior: None,
            gam_correlation_prior: None,
            policy_prior: None,
        }
    }
}

impl BayesianPriors {
    pub fn prior_for(&self, kind: ComponentKind) -> f64 {
        let configured = match kind {
            ComponentKind::Behavioral => self.behavioral_prior,
            ComponentKind::Content => self.content_prior,
            ComponentKind::Technical => self.technical_prior,
            ComponentKind::Layout => self.layout_prior,
            ComponentKind::GamCorrelation => self.gam_correlation_prior,
            ComponentKind::Policy => self.policy_prior,
        };
        configured.unwrap_or(self.baseline_rate)
    }
}

/// Per-component weights used by the aggregators (default 0.2 each)
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct ComponentWeights {
    #[validate(range(min = 0.0, max = 1.0))]
    pub behavioral: f64,
    #[validate(range(min = 0.0, max = 1.0))]
    pub content: f64,
    #[validate(range(min = 0.0, max = 1.0))]
    pub technical: f64,
    #[validate(range(min = 0.0, max = 1.0))]
    pub layout: f64,
    #[validate(range(min = 0.0, max = 1.0))]
    pub gam_correlation: f64,
    #[validate(range(min = 0.0, max = 1.0))]
    pub policy: f64,
}

impl Default for ComponentWeights {
    fn default() -> Self {
        Self {
            behavioral: 0.2,
            content: 0.2,
            technical: 0.2,
            layout: 0.2,
            gam_correlation: 0.2,
            policy: 0.2,
        }
    }
}

impl ComponentWeights {
    pub fn weight_for(&self, kind: ComponentKind) -> f64 {
        match kind {
            ComponentKind::Behavioral => self.behavioral,
            ComponentKind::Content => self.content,
            ComponentKind::Technical => self.technical,
            ComponentKind::Layout => self.layout,
            ComponentKind::GamCorrelation => self.gam_correlation,
            ComponentKind::Policy => self.policy,
        }
    }

    pub fn total(&self) -> f64 {
        ComponentKind::ALL.iter().map(|k| self.weight_for(*k)).sum()
    }
}

/// Weights for the trend-score composite
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct TrendAnalysisWeights {
    #[validate(range(min = 0.0, max = 1.0))]
    pub velocity_weight: f64,
    #[validate(range(min = 0.0, max = 1.0))]
    pub deviation_weight: f64,
    #[validate(range(min = 0.0, max = 1.0))]
    pub anomaly_weight: f64,
    #[validate(range(min = 0.0, max = 1.0))]
    pub recency_weight: f64,
}

impl Default for TrendAnalysisWeights {
    fn default() -> Self {
        Self {
            velocity_weight: 0.30,
            deviation_weight: 0.25,
            anomaly_weight: 0.25,
            recency_weight: 0.20,
        }
    }
}

/// Complete weight configuration document.
///
/// Process-wide and hot-swappable: replacing it affects subsequent scoring
/// runs only; in-flight computations finish against the snapshot they took
/// at entry.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct ScoringWeights {
    #[validate(nested)]
    pub behavioral: BehavioralWeights,
    #[validate(nested)]
    pub content: ContentWeights,
    #[validate(nested)]
    pub technical: TechnicalWeights,
    #[validate(nested)]
    pub layout: LayoutWeights,
    #[validate(nested)]
    pub gam_correlation: GamCorrelationWeights,
    #[validate(nested)]
    pub policy: PolicyWeights,
    #[validate(nested)]
    pub bayesian_priors: BayesianPriors,
    #[validate(nested)]
    pub component_weights: ComponentWeights,
    #[validate(nested)]
    pub trend_analysis: TrendAnalysisWeights,
}

impl ScoringWeights {
    /// Parse and validate a weight document from JSON
    pub fn from_json(raw: &str) -> ScorerResult<Self> {
        let weights: ScoringWeights = serde_json::from_str(raw)
            .map_err(|e| ScorerError::Configuration(format!("invalid weight document: {}", e)))?;
        weights
            .validate()
            .map_err(|e| ScorerError::Configuration(format!("weight out of range: {}", e)))?;
        Ok(weights)
    }
}

/// Shared handle to the live weight configuration.
///
/// Readers take a cheap `Arc` snapshot; `replace` swaps the document for
/// future runs without touching snapshots already handed out.
#[derive(Clone)]
pub struct WeightsHandle {
    inner: Arc<RwLock<Arc<ScoringWeights>>>,
}

impl Default for WeightsHandle {
    fn default() -> Self {
        Self::new(ScoringWeights::default())
    }
}

impl WeightsHandle {
    pub fn new(weights: ScoringWeights) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Arc::new(weights))),
        }
    }

    /// Snapshot the current configuration for one scoring run
    pub fn snapshot(&self) -> Arc<ScoringWeights> {
        Arc::clone(&self.inner.read())
    }

    /// Hot-swap the configuration; validates before publishing
    pub fn replace(&self, weights: ScoringWeights) -> ScorerResult<()> {
        weights
            .validate()
            .map_err(|e| ScorerError::Configuration(format!("weight out of range: {}", e)))?;
        *self.inner.write() = Arc::new(weights);
        info!("Scoring weight configuration replaced");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_sections_sum_to_one() {
        let w = ScoringWeights::default();
        let behavioral = w.behavioral.ad_density
            + w.behavioral.auto_refresh
            + w.behavioral.viewport_occlusion
            + w.behavioral.suspicious_interactions
            + w.behavioral.scroll_jacking;
        assert!((behavioral - 1.0).abs() < 1e-9);

        let technical = w.technical.performance
            + w.technical.ssl
            + w.technical.broken_links
            + w.technical.domain_age
            + w.technical.whois_privacy
            + w.technical.ads_txt;
        assert!((technical - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_prior_falls_back_to_baseline() {
        let priors = BayesianPriors {
            technical_prior: Some(0.4),
            ..Default::default()
        };
        assert_eq!(priors.prior_for(ComponentKind::Technical), 0.4);
        assert_eq!(priors.prior_for(ComponentKind::Behavioral), 0.15);
    }

    #[test]
    fn test_partial_document_uses_defaults() {
        let weights = ScoringWeights::from_json(r#"{"behavioral": {"ad_density": 0.5}}"#).unwrap();
        assert_eq!(weights.behavioral.ad_density, 0.5);
        // Unspecified fields fall back to documented defaults
        assert_eq!(weights.behavioral.auto_refresh, 0.25);
        assert_eq!(weights.bayesian_priors.baseline_rate, 0.15);
    }

    #[test]
    fn test_out_of_range_weight_rejected() {
        let result = ScoringWeights::from_json(r#"{"behavioral": {"ad_density": 4.0}}"#);
        assert!(matches!(result, Err(ScorerError::Configuration(_))));
    }

    #[test]
    fn test_hot_swap_does_not_affect_existing_snapshot() {
        let handle = WeightsHandle::default();
        let before = handle.snapshot();

        let mut updated = ScoringWeights::default();
        updated.behavioral.ad_density = 0.9;
        handle.replace(updated).unwrap();

        // The old snapshot is unchanged; new snapshots see the swap
        assert_eq!(before.behavioral.ad_density, 0.3);
        assert_eq!(handle.snapshot().behavioral.ad_density, 0.9);
    }

    #[test]
    fn test_replace_rejects_invalid_document() {
        let handle = WeightsHandle::default();
        let mut bad = ScoringWeights::default();
        bad.component_weights.policy = -1.0;
        assert!(handle.replace(bad).is_err());
        assert_eq!(handle.snapshot().component_weights.policy, 0.2);
    }
}
