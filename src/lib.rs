//! Loan Obligation Tracker
//!
//! Rule-based extraction of borrower obligations from loan agreements:
//! - Splits agreement text into candidate sentences
//! - Classifies covenants, reporting duties and notification duties
//! - Infers frequency, deadline rule and next due date
//! - Scores risk and tracks compliance against today's date
//!
//! PIPELINE:
//! TEXT → SPLIT → CLASSIFY → DEADLINE → DEDUPLICATE → SCORE → REFRESH STATUS

pub mod api;
pub mod config;
pub mod deadline;
pub mod error;
pub mod extractor;
pub mod models;
pub mod patterns;
pub mod reader;
pub mod scoring;
pub mod snapshot;
pub mod tracker;

pub use error::{Result, TrackerError};

// Re-export common types
pub use models::*;
pub use deadline::{get_compliance_status, parse_deadline, DeadlineInfo, DeadlineParser};
pub use extractor::{extract_obligations_from_text, ObligationExtractor};
pub use scoring::{
    calculate_risk_score, categorize_risk_level, get_high_risk_obligations,
    get_upcoming_deadlines, update_obligation_risks, RiskScorer,
};
pub use tracker::ObligationTracker;
