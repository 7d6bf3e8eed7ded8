//! Risk scoring for extracted obligations
//!
//! score = type weight × 50 × risk-level weight + deadline urgency,
//! truncated toward zero and clamped to 0..=100.

use crate::models::{ComplianceStatus, Obligation, ObligationType, RiskCategory, RiskLevel};
use tracing::debug;

/// Multipliers and urgency points used by [`RiskScorer`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoringWeights {
    pub financial_covenant: f64,
    pub reporting: f64,
    pub notification: f64,
    pub unknown_type: f64,

    pub high_level: f64,
    pub medium_level: f64,
    pub low_level: f64,
    pub unknown_level: f64,

    pub missed_points: f64,
    pub due_soon_points: f64,
    pub compliant_points: f64,
    pub unknown_status_points: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            financial_covenant: 1.0,
            reporting: 0.6,
            notification: 0.4,
            unknown_type: 0.5,

            high_level: 1.5,
            medium_level: 1.0,
            low_level: 0.5,
            unknown_level: 1.0,

            missed_points: 30.0,
            due_soon_points: 15.0,
            compliant_points: 0.0,
            unknown_status_points: 5.0,
        }
    }
}

const BASE_POINTS: f64 = 50.0;
const LOW_CEILING: u8 = 30;
const MEDIUM_CEILING: u8 = 70;

/// Applies a set of [`ScoringWeights`]; stateless otherwise
#[derive(Debug, Clone, Copy, Default)]
pub struct RiskScorer {
    weights: ScoringWeights,
}

impl RiskScorer {
    pub fn new(weights: ScoringWeights) -> Self {
        Self { weights }
    }

    pub fn score(&self, obligation: &Obligation) -> u8 {
        let mut score = self.type_weight(&obligation.obligation_type) * BASE_POINTS;
        score *= self.level_weight(&obligation.risk_level);
        score += self.deadline_risk(&obligation.compliance_status);

        score.trunc().clamp(0.0, 100.0) as u8
    }

    fn type_weight(&self, kind: &ObligationType) -> f64 {
        match kind {
            ObligationType::FinancialCovenant => self.weights.financial_covenant,
            ObligationType::Reporting => self.weights.reporting,
            ObligationType::Notification => self.weights.notification,
            ObligationType::Unknown(_) => self.weights.unknown_type,
        }
    }

    fn level_weight(&self, level: &RiskLevel) -> f64 {
        match level {
            RiskLevel::High => self.weights.high_level,
            RiskLevel::Medium => self.weights.medium_level,
            RiskLevel::Low => self.weights.low_level,
            RiskLevel::Unknown(_) => self.weights.unknown_level,
        }
    }

    pub fn deadline_risk(&self, status: &ComplianceStatus) -> f64 {
        match status {
            ComplianceStatus::Missed => self.weights.missed_points,
            ComplianceStatus::DueSoon => self.weights.due_soon_points,
            ComplianceStatus::Compliant => self.weights.compliant_points,
            ComplianceStatus::Unknown(_) => self.weights.unknown_status_points,
        }
    }

    /// Annotate every obligation in place, order untouched
    pub fn update(&self, obligations: &mut [Obligation]) {
        for obligation in obligations.iter_mut() {
            obligation.risk_score = self.score(obligation);
            obligation.risk_category = categorize_risk_level(obligation.risk_score);

            debug!(
                id = obligation.id,
                risk_score = obligation.risk_score,
                risk_category = %obligation.risk_category,
                "Scored obligation"
            );
        }
    }

    /// Obligations whose freshly computed category is High.
    ///
    /// Ignores any stored `risk_score`; callers that change an obligation
    /// after scoring get the new answer here but a stale stored field.
    pub fn high_risk(&self, obligations: &[Obligation]) -> Vec<Obligation> {
        obligations
            .iter()
            .filter(|o| categorize_risk_level(self.score(o)) == RiskCategory::High)
            .cloned()
            .collect()
    }
}

/// Score with the default weights
pub fn calculate_risk_score(obligation: &Obligation) -> u8 {
    RiskScorer::default().score(obligation)
}

/// Urgency points for a compliance status under the default weights
pub fn calculate_deadline_risk(status: &ComplianceStatus) -> u8 {
    RiskScorer::default().deadline_risk(status) as u8
}

/// `< 30` Low, `< 70` Medium, otherwise High
pub fn categorize_risk_level(score: u8) -> RiskCategory {
    if score < LOW_CEILING {
        RiskCategory::Low
    } else if score < MEDIUM_CEILING {
        RiskCategory::Medium
    } else {
        RiskCategory::High
    }
}

/// Set `risk_score` and `risk_category` on every obligation
pub fn update_obligation_risks(mut obligations: Vec<Obligation>) -> Vec<Obligation> {
    RiskScorer::default().update(&mut obligations);
    obligations
}

pub fn get_high_risk_obligations(obligations: &[Obligation]) -> Vec<Obligation> {
    RiskScorer::default().high_risk(obligations)
}

/// Obligations currently marked due soon.
///
/// `days_ahead` is accepted for interface compatibility but does not narrow
/// the result; the filter is the compliance status alone.
pub fn get_upcoming_deadlines(obligations: &[Obligation], days_ahead: i64) -> Vec<Obligation> {
    debug!(days_ahead, "Collecting upcoming deadlines");

    obligations
        .iter()
        .filter(|o| o.compliance_status == ComplianceStatus::DueSoon)
        .cloned()
        .collect()
}
