// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

/**
 * Bountyy Oy - Risk Explanation Generator
 * Turns an aggregated risk and its component breakdown into a
 * human-readable justification with recommendations
 *
 * @copyright 2026 Bountyy Oy
 * @license Proprietary
 */

use crate::types::{
    AggregatedRisk, ComponentDetail, ComponentKind, ComponentRisk, ContributingFactor,
    Explanation, FactorSeverity, RiskLevel,
};
use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use std::collections::BTreeMap;

/// Primary-reason component threshold per overall risk level
fn primary_reason_threshold(level: RiskLevel) -> f64 {
    match level {
        RiskLevel::Critical => 0.7,
        RiskLevel::High => 0.5,
        RiskLevel::Medium => 0.3,
        RiskLevel::Low | RiskLevel::Minimal => 0.1,
    }
}

/// At most this many primary reasons are reported
const MAX_PRIMARY_REASONS: usize = 5;

/// Component score above which component-specific recommendations apply
const COMPONENT_RECOMMENDATION_THRESHOLD: f64 = 0.6;

/// Severity derived from a raw signal or component score
fn severity_for(value: f64) -> FactorSeverity {
    if value > 0.7 {
        FactorSeverity::Critical
    } else if value > 0.5 {
        FactorSeverity::High
    } else if value > 0.3 {
        FactorSeverity::Medium
    } else {
        FactorSeverity::Low
    }
}

/// Boolean signals carry only a high/low severity
fn flag_severity(raised: bool) -> FactorSeverity {
    if raised {
        FactorSeverity::High
    } else {
        FactorSeverity::Low
    }
}

static BASE_RECOMMENDATIONS: Lazy<BTreeMap<RiskLevel, Vec<&'static str>>> = Lazy::new(|| {
    BTreeMap::from([
        (
            RiskLevel::Critical,
            vec![
                "Suspend monetization review approval until the flagged issues are remediated",
                "Conduct a full manual audit of ad placements and content sourcing",
            ],
        ),
        (
            RiskLevel::High,
            vec![
                "Schedule a manual review of the publisher within the current cycle",
                "Re-crawl after remediation to confirm risk reduction",
            ],
        ),
        (
            RiskLevel::Medium,
            vec![
                "Monitor the publisher on the next scheduled audit",
                "Request clarification on flagged signals from the publisher",
            ],
        ),
        (
            RiskLevel::Low,
            vec!["No immediate action required; keep the publisher on the standard audit cadence"],
        ),
        (
            RiskLevel::Minimal,
            vec!["No action required"],
        ),
    ])
});

fn component_description(kind: ComponentKind, level: RiskLevel) -> String {
    let dimension = match kind {
        ComponentKind::Behavioral => "ad behavior observed during the crawl",
        ComponentKind::Content => "content quality and originality",
        ComponentKind::Technical => "technical site health and domain intelligence",
        ComponentKind::Layout => "page layout and ad real estate",
        ComponentKind::GamCorrelation => "ad-serving metric correlation",
        ComponentKind::Policy => "explicit ad-policy compliance",
    };
    format!("{} risk in {}", level, dimension)
}

/// Recommendations specific to one elevated component. Technical
/// recommendations inspect the breakdown so that SSL and domain-age
/// findings surface as concrete actions.
fn component_recommendations(kind: ComponentKind, component: &ComponentRisk) -> Vec<String> {
    let mut recs = Vec::new();
    let signal_value = |name: &str| component.breakdown.get(name).map(|s| s.value).unwrap_or(0.0);

    match kind {
        ComponentKind::Behavioral => {
            recs.push("Reduce ad density and disable aggressive auto-refresh".to_string());
            if signal_value("scroll_jacking") > 0.0 {
                recs.push("Remove scroll-jacking scripts from all pages".to_string());
            }
        }
        ComponentKind::Content => {
            recs.push(
                "Replace templated or machine-generated articles with original content".to_string(),
            );
        }
        ComponentKind::Technical => {
            if signal_value("ssl_invalid") > 0.0 {
                recs.push("Install and maintain a valid SSL certificate".to_string());
            }
            if signal_value("domain_age") > 0.5 {
                recs.push(
                    "Domain is newly registered; establish a verifiable domain history before \
                     scaling monetization"
                        .to_string(),
                );
            }
            if signal_value("missing_ads_txt") > 0.0 {
                recs.push("Publish a valid ads.txt file listing authorized sellers".to_string());
            }
            if signal_value("broken_links") > 0.3 || signal_value("performance") > 0.5 {
                recs.push("Fix broken links and improve page performance".to_string());
            }
        }
        ComponentKind::Layout => {
            recs.push("Rebalance the layout so content outweighs ad slots above the fold".to_string());
        }
        ComponentKind::GamCorrelation => {
            recs.push(
                "Investigate ad-serving metric deviations against the publisher's baseline"
                    .to_string(),
            );
        }
        ComponentKind::Policy => {
            recs.push("Resolve all outstanding ad-policy violations".to_string());
        }
    }
    recs
}

/// Generate the full explanation for an aggregated risk.
///
/// Never fails for data-shape reasons: missing breakdowns simply produce
/// fewer factors and recommendations.
pub fn generate_explanation(
    aggregated: &AggregatedRisk,
    timestamp: Option<DateTime<Utc>>,
) -> Explanation {
    let risk_level = RiskLevel::from_score(aggregated.overall_risk_score);
    let mfa_level = RiskLevel::from_score(aggregated.mfa_probability);
    let threshold = primary_reason_threshold(risk_level);

    // Components above the level threshold, strongest first, capped at 5.
    // Ordering is presentational only.
    let mut elevated: Vec<(ComponentKind, f64)> = aggregated
        .components
        .iter()
        .filter(|(_, c)| c.score > threshold)
        .map(|(kind, c)| (kind, c.score))
        .collect();
    elevated.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

    let primary_reasons: Vec<String> = elevated
        .iter()
        .take(MAX_PRIMARY_REASONS)
        .map(|(kind, score)| {
            format!(
                "{} {} (score: {:.0}%)",
                severity_for(*score).as_str(),
                kind,
                score * 100.0
            )
        })
        .collect();

    // Individual sub-signals worth surfacing: elevated values, raised
    // flags, or heavily weighted signals
    let mut contributing_factors = Vec::new();
    for (kind, component) in aggregated.components.iter() {
        for (name, signal) in &component.breakdown {
            let notable = signal.value > 0.5 || (signal.flag && signal.value > 0.0) || signal.weight > 0.1;
            if !notable {
                continue;
            }
            let severity = if signal.flag {
                flag_severity(signal.value > 0.0)
            } else {
                severity_for(signal.value)
            };
            contributing_factors.push(ContributingFactor {
                signal: name.clone(),
                component: kind,
                value: signal.value,
                severity,
            });
        }
    }

    let mut recommendations: Vec<String> = BASE_RECOMMENDATIONS
        .get(&risk_level)
        .map(|recs| recs.iter().map(|r| r.to_string()).collect())
        .unwrap_or_default();
    for (kind, component) in aggregated.components.iter() {
        if component.score > COMPONENT_RECOMMENDATION_THRESHOLD {
            recommendations.extend(component_recommendations(kind, component));
        }
    }

    let details: BTreeMap<String, ComponentDetail> = aggregated
        .components
        .iter()
        .map(|(kind, component)| {
            let level = RiskLevel::from_score(component.score);
            (
                kind.as_str().to_string(),
                ComponentDetail {
                    level,
                    score: component.score,
                    description: component_description(kind, level),
                    breakdown: component.breakdown.clone(),
                },
            )
        })
        .collect();

    // Confidence heuristic: agreement between the two scores, breadth of
    // reporting components, and a present observation time all add trust
    let reporting_components = aggregated
        .components
        .iter()
        .filter(|(_, c)| c.score > 0.0)
        .count();
    let mut confidence: f64 = 0.5;
    if (aggregated.mfa_probability - aggregated.weighted_score).abs() < 0.2 {
        confidence += 0.3;
    }
    if reporting_components > 3 {
        confidence += 0.2;
    }
    if timestamp.is_some() {
        confidence += 0.05;
    }
    let confidence_score = confidence.min(1.0);

    let summary = format!(
        "Overall {} risk ({:.0}%) via {}; {} of 6 components elevated",
        risk_level,
        aggregated.overall_risk_score * 100.0,
        aggregated.methodology,
        elevated.len()
    );

    Explanation {
        summary,
        details,
        primary_reasons,
        contributing_factors,
        recommendations,
        risk_level,
        mfa_level,
        confidence_score,
        timestamp,
    }
}
