//! Tracker pipeline
//!
//! TEXT → EXTRACT → SCORE → REFRESH STATUS → SUMMARIZE
//!
//! Scoring happens before the status refresh, so a stored `risk_score`
//! reflects the status at extraction time. The high-risk view recomputes
//! and therefore sees the refreshed status.

use crate::config::TrackerConfig;
use crate::deadline::{compliance_status, today};
use crate::extractor::ObligationExtractor;
use crate::models::{
    ComplianceStatus, ComplianceSummary, ExtractionReport, Obligation, RiskCategory,
    RiskDistribution,
};
use crate::patterns::PatternTable;
use crate::scoring::{get_upcoming_deadlines, RiskScorer};
use crate::snapshot::save_snapshot;
use crate::Result;
use chrono::NaiveDate;
use std::path::Path;
use tracing::{info, info_span};
use uuid::Uuid;

/// Runs the whole extraction and scoring pass over a document
#[derive(Debug, Clone)]
pub struct ObligationTracker {
    extractor: ObligationExtractor,
    scorer: RiskScorer,
    config: TrackerConfig,
}

impl ObligationTracker {
    pub fn new(config: TrackerConfig) -> Result<Self> {
        let extractor = ObligationExtractor::with_patterns(PatternTable::standard()?, &config)?;
        Ok(Self::with_components(extractor, RiskScorer::default(), config))
    }

    pub fn with_components(
        extractor: ObligationExtractor,
        scorer: RiskScorer,
        config: TrackerConfig,
    ) -> Self {
        Self {
            extractor,
            scorer,
            config,
        }
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    pub fn extractor(&self) -> &ObligationExtractor {
        &self.extractor
    }

    pub fn run(&self, text: &str) -> ExtractionReport {
        self.run_on(text, today())
    }

    pub fn run_on(&self, text: &str, today: NaiveDate) -> ExtractionReport {
        let run_id = Uuid::new_v4();
        let span = info_span!("extraction_run", run_id = %run_id);
        let _guard = span.enter();

        let mut obligations = self.extractor.extract_obligations_on(text, today);
        self.scorer.update(&mut obligations);
        self.refresh_compliance(&mut obligations, today);

        let summary = self.summarize(&obligations);
        let high_risk = self.scorer.high_risk(&obligations);
        let upcoming = get_upcoming_deadlines(&obligations, self.config.upcoming_days);

        info!(
            total = summary.total,
            due_soon = summary.due_soon,
            missed = summary.missed,
            high_risk = summary.high_risk,
            "Extraction run completed"
        );

        ExtractionReport {
            run_id,
            generated_on: today,
            obligations,
            summary,
            high_risk,
            upcoming,
        }
    }

    /// Recompute status for every obligation against `today`.
    ///
    /// Empty, event-driven and end-of-period deadlines always come back
    /// compliant, whatever status they carried before.
    pub fn refresh_compliance(&self, obligations: &mut [Obligation], today: NaiveDate) {
        for obligation in obligations.iter_mut() {
            obligation.compliance_status =
                compliance_status(&obligation.next_deadline, today, self.config.due_soon_days);
        }
    }

    /// Refresh status first, then score: for obligations handed in by a caller
    pub fn rescore(&self, mut obligations: Vec<Obligation>, today: NaiveDate) -> Vec<Obligation> {
        self.refresh_compliance(&mut obligations, today);
        self.scorer.update(&mut obligations);
        obligations
    }

    /// Write `obligations` to the configured snapshot path and return it
    pub fn save_snapshot(&self, obligations: &[Obligation]) -> Result<&Path> {
        let path = self.config.snapshot_path.as_path();
        save_snapshot(path, obligations)?;
        Ok(path)
    }

    pub fn summarize(&self, obligations: &[Obligation]) -> ComplianceSummary {
        let count_status = |status: ComplianceStatus| {
            obligations
                .iter()
                .filter(|o| o.compliance_status == status)
                .count()
        };
        let count_category = |category: RiskCategory| {
            obligations
                .iter()
                .filter(|o| o.risk_category == category)
                .count()
        };

        ComplianceSummary {
            total: obligations.len(),
            compliant: count_status(ComplianceStatus::Compliant),
            due_soon: count_status(ComplianceStatus::DueSoon),
            missed: count_status(ComplianceStatus::Missed),
            high_risk: self.scorer.high_risk(obligations).len(),
            risk_distribution: RiskDistribution {
                high: count_category(RiskCategory::High),
                medium: count_category(RiskCategory::Medium),
                low: count_category(RiskCategory::Low),
            },
        }
    }
}
