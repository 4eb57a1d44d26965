// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

/**
 * Bountyy Oy - Component Risk Calculators
 * Six pure weighted-sum calculators over the canonical feature vector:
 * behavioral, content, technical, layout, GAM correlation, policy
 *
 * @copyright 2026 Bountyy Oy
 * @license Proprietary
 */

use crate::config::ScoringWeights;
use crate::normalizer::clamp01;
use crate::types::{ComponentBreakdown, ComponentRisk, FeatureVector, SignalContribution};
use std::collections::BTreeMap;

/// Violation count that saturates the policy-violations signal
const VIOLATION_SATURATION: f64 = 5.0;

/// Critical-violation count that saturates the critical-violations signal
const CRITICAL_VIOLATION_SATURATION: f64 = 2.0;

/// Spike ratio that saturates the impression-spike signal (3x baseline)
const SPIKE_SATURATION: f64 = 3.0;

/// Accumulates clamped, weighted sub-signals into a component score
struct RiskAccumulator {
    sum: f64,
    breakdown: BTreeMap<String, SignalContribution>,
}

impl RiskAccumulator {
    fn new() -> Self {
        Self {
            sum: 0.0,
            breakdown: BTreeMap::new(),
        }
    }

    fn signal(&mut self, name: &str, value: f64, weight: f64) -> &mut Self {
        let value = clamp01(value);
        self.sum += value * weight;
        self.breakdown.insert(
            name.to_string(),
            SignalContribution {
                value,
                weight,
                flag: false,
            },
        );
        self
    }

    fn flag(&mut self, name: &str, raised: bool, weight: f64) -> &mut Self {
        let value = if raised { 1.0 } else { 0.0 };
        self.sum += value * weight;
        self.breakdown.insert(
            name.to_string(),
            SignalContribution {
                value,
                weight,
                flag: true,
            },
        );
        self
    }

    fn finish(self) -> ComponentRisk {
        ComponentRisk {
            score: self.sum.min(1.0),
            breakdown: self.breakdown,
        }
    }
}

/// Behavioral risk: aggressive ad behavior observed during the crawl
pub fn behavioral_risk(features: &FeatureVector, weights: &ScoringWeights) -> ComponentRisk {
    let w = &weights.behavioral;
    let mut acc = RiskAccumulator::new();
    acc.signal("ad_density", features.ad_density, w.ad_density)
        .signal("auto_refresh", features.auto_refresh_rate, w.auto_refresh)
        .signal(
            "viewport_occlusion",
            features.viewport_occlusion,
            w.viewport_occlusion,
        )
        .signal(
            "suspicious_interactions",
            features.suspicious_interaction_ratio,
            w.suspicious_interactions,
        )
        .flag("scroll_jacking", features.scroll_jacking, w.scroll_jacking);
    acc.finish()
}

/// Content risk: thin, templated, or machine-generated content
pub fn content_risk(features: &FeatureVector, weights: &ScoringWeights) -> ComponentRisk {
    let w = &weights.content;
    let mut acc = RiskAccumulator::new();
    acc.signal("low_entropy", features.low_entropy, w.low_entropy)
        .signal("ai_likelihood", features.ai_likelihood, w.ai_likelihood)
        .signal("clickbait", features.clickbait_score, w.clickbait)
        .signal(
            "poor_readability",
            features.poor_readability,
            w.poor_readability,
        )
        .signal("staleness", features.staleness, w.staleness)
        .signal(
            "duplicate_similarity",
            features.duplicate_similarity,
            w.duplicate_similarity,
        );
    acc.finish()
}

/// Monotonically decreasing step function of months since registration.
/// Freshly registered domains are the strongest MFA signal in this group.
pub fn domain_age_risk(months: f64) -> f64 {
    if months >= 36.0 {
        0.0
    } else if months >= 24.0 {
        0.25
    } else if months >= 12.0 {
        0.5
    } else if months >= 6.0 {
        0.75
    } else {
        1.0
    }
}

/// Technical risk: SSL, domain intelligence, site health
pub fn technical_risk(features: &FeatureVector, weights: &ScoringWeights) -> ComponentRisk {
    let w = &weights.technical;
    let mut acc = RiskAccumulator::new();
    acc.signal("performance", features.performance_risk, w.performance)
        .flag("ssl_invalid", !features.ssl_valid, w.ssl)
        .signal("broken_links", features.broken_link_ratio, w.broken_links)
        .signal(
            "domain_age",
            domain_age_risk(features.domain_age_months),
            w.domain_age,
        )
        .flag("whois_privacy", features.whois_privacy, w.whois_privacy)
        .flag("missing_ads_txt", features.missing_ads_txt, w.ads_txt);
    acc.finish()
}

/// Layout risk: page real estate devoted to ads and template sameness
pub fn layout_risk(features: &FeatureVector, weights: &ScoringWeights) -> ComponentRisk {
    let w = &weights.layout;
    let mut acc = RiskAccumulator::new();
    acc.signal("ad_ratio", features.layout_ad_ratio, w.ad_ratio)
        .signal("above_fold", features.above_fold_ad_ratio, w.above_fold)
        .signal(
            "cross_page_similarity",
            features.cross_page_similarity,
            w.cross_page_similarity,
        );
    acc.finish()
}

/// GAM correlation risk: ad-serving metrics deviating from the
/// publisher's own baseline
pub fn gam_correlation_risk(features: &FeatureVector, weights: &ScoringWeights) -> ComponentRisk {
    let w = &weights.gam_correlation;
    // A spike ratio of 1.0 is baseline; 3x saturates the signal
    let spike = clamp01((features.impression_spike_ratio - 1.0) / (SPIKE_SATURATION - 1.0));
    let mut acc = RiskAccumulator::new();
    acc.signal("ctr_deviation", features.ctr_deviation, w.ctr_deviation)
        .signal("ecpm_deviation", features.ecpm_deviation, w.ecpm_deviation)
        .signal(
            "fill_rate_deviation",
            features.fill_rate_deviation,
            w.fill_rate_deviation,
        )
        .signal("impression_spike", spike, w.impression_spike);
    acc.finish()
}

/// Policy risk: explicit ad-policy violations found by the policy checker
pub fn policy_risk(features: &FeatureVector, weights: &ScoringWeights) -> ComponentRisk {
    let w = &weights.policy;
    let violations = clamp01(features.policy_violation_count as f64 / VIOLATION_SATURATION);
    let critical = clamp01(
        features.critical_violation_count as f64 / CRITICAL_VIOLATION_SATURATION,
    );
    let mut acc = RiskAccumulator::new();
    acc.signal("violations", violations, w.violations)
        .signal("critical_violations", critical, w.critical_violations);
    acc.finish()
}

/// Run all six calculators. Pure: no I/O, no shared state beyond the
/// weight snapshot passed in.
pub fn calculate_all(features: &FeatureVector, weights: &ScoringWeights) -> ComponentBreakdown {
    ComponentBreakdown {
        behavioral: behavioral_risk(features, weights),
        content: content_risk(features, weights),
        technical: technical_risk(features, weights),
        layout: layout_risk(features, weights),
        gam_correlation: gam_correlation_risk(features, weights),
        policy: policy_risk(features, weights),
    }
}
