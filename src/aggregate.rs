// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

/**
 * Bountyy Oy - Probability Aggregators
 * Interchangeable Bayesian and logistic-regression combiners that turn
 * the six component risks into one calibrated MFA probability
 *
 * @copyright 2026 Bountyy Oy
 * @license Proprietary
 */

use crate::config::ScoringWeights;
use crate::types::{AggregatedRisk, AggregationMethod, ComponentBreakdown};
use tracing::debug;

/// Logistic model coefficients, one per component in canonical order
/// (behavioral, content, technical, layout, gam_correlation, policy).
/// Fitted offline against labeled MFA audits; all positive, so the model
/// is monotone non-decreasing in every component score.
const LOGISTIC_COEFFICIENTS: [f64; 6] = [3.5, 2.5, 3.0, 2.0, 2.5, 2.5];
const LOGISTIC_INTERCEPT: f64 = -3.0;

fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

/// Bayesian posterior update: treat the component score as a likelihood
/// and combine with the configured prior. A degenerate denominator
/// (likelihood and prior at opposite extremes) falls back to the prior.
fn posterior(likelihood: f64, prior: f64) -> f64 {
    let numerator = likelihood * prior;
    let denominator = numerator + (1.0 - likelihood) * (1.0 - prior);
    if denominator.abs() < f64::EPSILON {
        prior
    } else {
        numerator / denominator
    }
}

/// Weighted mean of per-component posteriors. All-zero weights collapse
/// to the baseline prior: with no evidence weighting there is no update.
fn bayesian_probability(components: &ComponentBreakdown, weights: &ScoringWeights) -> f64 {
    let priors = &weights.bayesian_priors;
    let component_weights = &weights.component_weights;

    let total_weight = component_weights.total();
    if total_weight <= 0.0 {
        return priors.baseline_rate;
    }

    let mut weighted_sum = 0.0;
    for (kind, component) in components.iter() {
        let prior = priors.prior_for(kind);
        let post = posterior(component.score, prior);
        weighted_sum += post * component_weights.weight_for(kind);
    }

    (weighted_sum / total_weight).clamp(0.0, 1.0)
}

/// Fixed-coefficient logistic regression over the six component scores
fn logistic_probability(components: &ComponentBreakdown) -> f64 {
    let scores = components.scores();
    let z = LOGISTIC_INTERCEPT
        + scores
            .iter()
            .zip(LOGISTIC_COEFFICIENTS.iter())
            .map(|(score, coef)| score * coef)
            .sum::<f64>();
    sigmoid(z).clamp(0.0, 1.0)
}

/// Component-weight mean of the raw component scores
fn weighted_score(components: &ComponentBreakdown, weights: &ScoringWeights) -> f64 {
    let component_weights = &weights.component_weights;
    let total = component_weights.total();
    if total <= 0.0 {
        return 0.0;
    }
    let sum: f64 = components
        .iter()
        .map(|(kind, c)| c.score * component_weights.weight_for(kind))
        .sum();
    (sum / total).clamp(0.0, 1.0)
}

impl AggregationMethod {
    /// Combine the six component risks into an aggregated risk.
    ///
    /// Both strategies honor the same contract, so callers can switch
    /// methods per scoring run. `overall_risk_score` is always
    /// max(mfa_probability, weighted_score).
    pub fn aggregate(
        &self,
        components: ComponentBreakdown,
        weights: &ScoringWeights,
    ) -> AggregatedRisk {
        let mfa_probability = match self {
            AggregationMethod::Bayesian => bayesian_probability(&components, weights),
            AggregationMethod::Logistic => logistic_probability(&components),
        };
        let weighted = weighted_score(&components, weights);

        debug!(
            methodology = self.as_str(),
            mfa_probability = mfa_probability,
            weighted_score = weighted,
            "Aggregated component risks"
        );

        AggregatedRisk {
            mfa_probability,
            weighted_score: weighted,
            overall_risk_score: mfa_probability.max(weighted),
            methodology: *self,
            components,
        }
    }
}
