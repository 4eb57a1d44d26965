// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

/**
 * Bountyy Oy - Audit Feature Normalizer
 * Flattens the crawler's nested audit record into the canonical
 * FeatureVector with clamped values and zero/false defaults
 *
 * @copyright 2026 Bountyy Oy
 * @license Proprietary
 */

use crate::types::FeatureVector;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Nested audit record as produced by the crawler and analyzers.
/// Every section and field is optional; the normalizer supplies defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AuditRecord {
    pub audit_id: Option<String>,
    pub observed_at: Option<DateTime<Utc>>,
    pub content_analysis: Option<ContentAnalysis>,
    pub ad_analysis: Option<AdAnalysis>,
    pub technical_check: Option<TechnicalCheck>,
    pub policy_check: Option<PolicyCheck>,
    pub gam_metrics: Option<GamMetrics>,
    pub gam_comparison: Option<GamComparison>,
    pub gam_spike_analysis: Option<GamSpikeAnalysis>,
}

/// Content/SEO analyzer output. Quality scores are value-direction
/// (1.0 = good); the normalizer inverts them into risk signals.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ContentAnalysis {
    pub entropy_score: Option<f64>,
    pub ai_likelihood: Option<f64>,
    pub clickbait_score: Option<f64>,
    pub readability_score: Option<f64>,
    pub freshness_score: Option<f64>,
    pub similarity_score: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AdAnalysis {
    pub ad_density: Option<f64>,
    pub auto_refresh_rate: Option<f64>,
    pub viewport_occlusion: Option<f64>,
    pub suspicious_interaction_ratio: Option<f64>,
    pub scroll_jacking: Option<bool>,
    pub layout_ad_ratio: Option<f64>,
    pub above_fold_ad_ratio: Option<f64>,
    pub cross_page_similarity: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TechnicalCheck {
    pub performance_score: Option<f64>,
    pub ssl_valid: Option<bool>,
    pub broken_link_ratio: Option<f64>,
    pub domain_age_months: Option<f64>,
    pub whois_privacy: Option<bool>,
    pub ads_txt_valid: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PolicyCheck {
    pub violation_count: Option<u32>,
    pub critical_violation_count: Option<u32>,
}

/// Raw ad-serving metrics from GAM, kept for benchmark comparison
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GamMetrics {
    pub ctr: Option<f64>,
    pub ecpm: Option<f64>,
    pub fill_rate: Option<f64>,
}

/// Deviations of the publisher's ad-serving metrics from its own baseline
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GamComparison {
    pub ctr_deviation: Option<f64>,
    pub ecpm_deviation: Option<f64>,
    pub fill_rate_deviation: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GamSpikeAnalysis {
    /// Ratio of current impressions vs the rolling baseline (1.0 = flat)
    pub impression_spike_ratio: Option<f64>,
}

/// Clamp a value into [0,1]
pub fn clamp01(value: f64) -> f64 {
    if value.is_nan() {
        return 0.0;
    }
    value.clamp(0.0, 1.0)
}

fn risk(value: Option<f64>) -> f64 {
    clamp01(value.unwrap_or(0.0))
}

/// Invert a quality score (1.0 = good) into a risk signal. Absent quality
/// data yields zero risk, not maximum risk.
fn inverted_risk(value: Option<f64>) -> f64 {
    match value {
        Some(v) => clamp01(1.0 - clamp01(v)),
        None => 0.0,
    }
}

fn non_negative(value: Option<f64>) -> f64 {
    let v = value.unwrap_or(0.0);
    if v.is_nan() || v < 0.0 {
        0.0
    } else {
        v
    }
}

/// Flatten a nested audit record into the canonical feature vector.
///
/// Missing sections and fields default to 0/false. Never fails: malformed
/// numerics (NaN, negatives where a ratio is expected) are treated as absent.
pub fn normalize(audit: &AuditRecord) -> FeatureVector {
    let content = audit.content_analysis.clone().unwrap_or_default();
    let ads = audit.ad_analysis.clone().unwrap_or_default();
    let technical = audit.technical_check.clone().unwrap_or_default();
    let policy = audit.policy_check.clone().unwrap_or_default();
    let gam = audit.gam_metrics.clone().unwrap_or_default();
    let gam_cmp = audit.gam_comparison.clone().unwrap_or_default();
    let gam_spike = audit.gam_spike_analysis.clone().unwrap_or_default();

    FeatureVector {
        ad_density: risk(ads.ad_density),
        auto_refresh_rate: risk(ads.auto_refresh_rate),
        viewport_occlusion: risk(ads.viewport_occlusion),
        suspicious_interaction_ratio: risk(ads.suspicious_interaction_ratio),
        scroll_jacking: ads.scroll_jacking.unwrap_or(false),

        low_entropy: inverted_risk(content.entropy_score),
        ai_likelihood: risk(content.ai_likelihood),
        clickbait_score: risk(content.clickbait_score),
        poor_readability: inverted_risk(content.readability_score),
        staleness: inverted_risk(content.freshness_score),
        duplicate_similarity: risk(content.similarity_score),

        performance_risk: inverted_risk(technical.performance_score),
        // Boolean checks default to false when absent, per the flat-vector
        // contract: an unverified SSL or ads.txt check counts as failed
        ssl_valid: technical.ssl_valid.unwrap_or(false),
        broken_link_ratio: risk(technical.broken_link_ratio),
        domain_age_months: non_negative(technical.domain_age_months),
        whois_privacy: technical.whois_privacy.unwrap_or(false),
        missing_ads_txt: !technical.ads_txt_valid.unwrap_or(false),

        layout_ad_ratio: risk(ads.layout_ad_ratio),
        above_fold_ad_ratio: risk(ads.above_fold_ad_ratio),
        cross_page_similarity: risk(ads.cross_page_similarity),

        ctr_deviation: risk(gam_cmp.ctr_deviation),
        ecpm_deviation: risk(gam_cmp.ecpm_deviation),
        fill_rate_deviation: risk(gam_cmp.fill_rate_deviation),
        impression_spike_ratio: non_negative(gam_spike.impression_spike_ratio),

        policy_violation_count: policy.violation_count.unwrap_or(0),
        critical_violation_count: policy.critical_violation_count.unwrap_or(0),

        gam_ctr: non_negative(gam.ctr),
        gam_ecpm: non_negative(gam.ecpm),
        gam_fill_rate: non_negative(gam.fill_rate),

        observed_at: audit.observed_at,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_record_defaults_to_zero_and_false() {
        let features = normalize(&AuditRecord::default());
        assert_eq!(features.ad_density, 0.0);
        assert_eq!(features.low_entropy, 0.0);
        assert_eq!(features.domain_age_months, 0.0);
        assert_eq!(features.policy_violation_count, 0);
        assert!(!features.scroll_jacking);
        assert!(!features.ssl_valid);
        assert!(features.missing_ads_txt);
        assert!(features.observed_at.is_none());
    }

    #[test]
    fn test_values_clamped_to_unit_interval() {
        let audit = AuditRecord {
            ad_analysis: Some(AdAnalysis {
                ad_density: Some(3.7),
                viewport_occlusion: Some(-0.4),
                ..Default::default()
            }),
            content_analysis: Some(ContentAnalysis {
                ai_likelihood: Some(f64::NAN),
                ..Default::default()
            }),
            ..Default::default()
        };
        let features = normalize(&audit);
        assert_eq!(features.ad_density, 1.0);
        assert_eq!(features.viewport_occlusion, 0.0);
        assert_eq!(features.ai_likelihood, 0.0);
    }

    #[test]
    fn test_quality_scores_inverted_into_risk() {
        let audit = AuditRecord {
            content_analysis: Some(ContentAnalysis {
                readability_score: Some(0.9),
                freshness_score: Some(0.2),
                entropy_score: Some(0.3),
                ..Default::default()
            }),
            technical_check: Some(TechnicalCheck {
                performance_score: Some(0.75),
                ..Default::default()
            }),
            ..Default::default()
        };
        let features = normalize(&audit);
        assert!((features.poor_readability - 0.1).abs() < 1e-9);
        assert!((features.staleness - 0.8).abs() < 1e-9);
        assert!((features.low_entropy - 0.7).abs() < 1e-9);
        assert!((features.performance_risk - 0.25).abs() < 1e-9);
    }

    #[test]
    fn test_camel_case_json_round_trip() {
        let raw = r#"{
            "auditId": "audit-77",
            "adAnalysis": {"adDensity": 0.6, "scrollJacking": true},
            "technicalCheck": {"sslValid": false, "domainAgeMonths": 4, "adsTxtValid": false},
            "policyCheck": {"violationCount": 2},
            "gamSpikeAnalysis": {"impressionSpikeRatio": 2.5}
        }"#;
        let audit: AuditRecord = serde_json::from_str(raw).unwrap();
        let features = normalize(&audit);
        assert_eq!(features.ad_density, 0.6);
        assert!(features.scroll_jacking);
        assert!(!features.ssl_valid);
        assert!(features.missing_ads_txt);
        assert_eq!(features.domain_age_months, 4.0);
        assert_eq!(features.policy_violation_count, 2);
        assert_eq!(features.impression_spike_ratio, 2.5);
    }
}
