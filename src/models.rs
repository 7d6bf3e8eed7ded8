//! Core data models for the obligation tracker

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use uuid::Uuid;

/// Party every extracted obligation is assigned to
pub const RESPONSIBLE_PARTY: &str = "Borrower";

/// Calendar format used for computed deadlines
pub const DATE_FORMAT: &str = "%Y-%m-%d";

//
// ================= Enums =================
//

/// Obligation category.
///
/// Serialized as its display string. Anything we do not recognise is kept
/// verbatim in [`ObligationType::Unknown`] so a snapshot survives a reload.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ObligationType {
    FinancialCovenant,
    Reporting,
    Notification,
    Unknown(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Frequency {
    Monthly,
    Quarterly,
    Annual,
    EventBased,
    Unknown(String),
}

/// Keyword-derived risk assigned at extraction time
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RiskLevel {
    High,
    Medium,
    Low,
    Unknown(String),
}

/// Score-derived banding assigned by the risk scorer
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
pub enum RiskCategory {
    High,
    Medium,
    #[default]
    Low,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ComplianceStatus {
    Compliant,
    DueSoon,
    Missed,
    Unknown(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Period {
    Month,
    Quarter,
    Year,
}

impl From<String> for ObligationType {
    fn from(value: String) -> Self {
        match value.as_str() {
            "Financial Covenant" => ObligationType::FinancialCovenant,
            "Reporting" => ObligationType::Reporting,
            "Notification" => ObligationType::Notification,
            _ => ObligationType::Unknown(value),
        }
    }
}

impl From<ObligationType> for String {
    fn from(value: ObligationType) -> Self {
        value.to_string()
    }
}

impl From<String> for Frequency {
    fn from(value: String) -> Self {
        match value.as_str() {
            "Monthly" => Frequency::Monthly,
            "Quarterly" => Frequency::Quarterly,
            "Annual" => Frequency::Annual,
            "Event-based" => Frequency::EventBased,
            _ => Frequency::Unknown(value),
        }
    }
}

impl From<Frequency> for String {
    fn from(value: Frequency) -> Self {
        value.to_string()
    }
}

impl From<String> for RiskLevel {
    fn from(value: String) -> Self {
        match value.as_str() {
            "High" => RiskLevel::High,
            "Medium" => RiskLevel::Medium,
            "Low" => RiskLevel::Low,
            _ => RiskLevel::Unknown(value),
        }
    }
}

impl From<RiskLevel> for String {
    fn from(value: RiskLevel) -> Self {
        value.to_string()
    }
}

impl From<String> for ComplianceStatus {
    fn from(value: String) -> Self {
        match value.as_str() {
            "Compliant" => ComplianceStatus::Compliant,
            "Due Soon" => ComplianceStatus::DueSoon,
            "Missed" => ComplianceStatus::Missed,
            _ => ComplianceStatus::Unknown(value),
        }
    }
}

impl From<ComplianceStatus> for String {
    fn from(value: ComplianceStatus) -> Self {
        value.to_string()
    }
}

//
// ================= Next Deadline =================
//

/// When an obligation next falls due.
///
/// Serialized as a plain string: an ISO date, one of the sentinels
/// `"Upon Event"`, `"End of Month"`, `"End of Quarter"`, `"End of Year"`,
/// or the empty string. Strings that are none of these (hand-edited
/// snapshots, mostly) are carried through untouched as [`NextDeadline::Unparsed`].
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum NextDeadline {
    #[default]
    None,
    Date(NaiveDate),
    UponEvent,
    EndOfPeriod(Period),
    Unparsed(String),
}

impl NextDeadline {
    pub fn is_none(&self) -> bool {
        matches!(self, NextDeadline::None)
    }
}

impl From<String> for NextDeadline {
    fn from(value: String) -> Self {
        NextDeadline::from(value.as_str())
    }
}

impl From<&str> for NextDeadline {
    fn from(value: &str) -> Self {
        match value.trim() {
            "" => NextDeadline::None,
            "Upon Event" => NextDeadline::UponEvent,
            "End of Month" => NextDeadline::EndOfPeriod(Period::Month),
            "End of Quarter" => NextDeadline::EndOfPeriod(Period::Quarter),
            "End of Year" => NextDeadline::EndOfPeriod(Period::Year),
            other => match NaiveDate::parse_from_str(other, DATE_FORMAT) {
                Ok(date) => NextDeadline::Date(date),
                Err(_) => NextDeadline::Unparsed(other.to_string()),
            },
        }
    }
}

impl From<NextDeadline> for String {
    fn from(value: NextDeadline) -> Self {
        value.to_string()
    }
}

//
// ================= Obligation =================
//

/// A single borrower duty extracted from one qualifying sentence
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Obligation {
    /// Content-addressed display key; collisions are tolerated
    pub id: u32,
    #[serde(rename = "type")]
    pub obligation_type: ObligationType,
    pub description: String,
    pub frequency: Frequency,
    #[serde(default)]
    pub deadline_rule: String,
    #[serde(default = "default_responsible_party")]
    pub responsible_party: String,
    pub risk_level: RiskLevel,
    pub compliance_status: ComplianceStatus,
    #[serde(default)]
    pub next_deadline: NextDeadline,
    #[serde(default, deserialize_with = "clamped_score")]
    pub risk_score: u8,
    #[serde(default)]
    pub risk_category: RiskCategory,
}

fn default_responsible_party() -> String {
    RESPONSIBLE_PARTY.to_string()
}

/// Accept any JSON number and pull it into 0..=100
fn clamped_score<'de, D>(deserializer: D) -> std::result::Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = f64::deserialize(deserializer)?;
    Ok(raw.trunc().clamp(0.0, 100.0) as u8)
}

//
// ================= Reporting =================
//

/// Per-category counts of scored obligations
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct RiskDistribution {
    pub high: usize,
    pub medium: usize,
    pub low: usize,
}

/// Dashboard metrics for one extraction run
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ComplianceSummary {
    pub total: usize,
    pub compliant: usize,
    pub due_soon: usize,
    pub missed: usize,
    pub high_risk: usize,
    pub risk_distribution: RiskDistribution,
}

/// Everything a caller needs to render one run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionReport {
    pub run_id: Uuid,
    pub generated_on: NaiveDate,
    pub obligations: Vec<Obligation>,
    pub summary: ComplianceSummary,
    pub high_risk: Vec<Obligation>,
    pub upcoming: Vec<Obligation>,
}

//
// ================= Display =================
//

impl fmt::Display for ObligationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ObligationType::FinancialCovenant => "Financial Covenant",
            ObligationType::Reporting => "Reporting",
            ObligationType::Notification => "Notification",
            ObligationType::Unknown(raw) => raw.as_str(),
        };
        write!(f, "{}", s)
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Frequency::Monthly => "Monthly",
            Frequency::Quarterly => "Quarterly",
            Frequency::Annual => "Annual",
            Frequency::EventBased => "Event-based",
            Frequency::Unknown(raw) => raw.as_str(),
        };
        write!(f, "{}", s)
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RiskLevel::High => "High",
            RiskLevel::Medium => "Medium",
            RiskLevel::Low => "Low",
            RiskLevel::Unknown(raw) => raw.as_str(),
        };
        write!(f, "{}", s)
    }
}

impl fmt::Display for RiskCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RiskCategory::High => "High",
            RiskCategory::Medium => "Medium",
            RiskCategory::Low => "Low",
        };
        write!(f, "{}", s)
    }
}

impl fmt::Display for ComplianceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ComplianceStatus::Compliant => "Compliant",
            ComplianceStatus::DueSoon => "Due Soon",
            ComplianceStatus::Missed => "Missed",
            ComplianceStatus::Unknown(raw) => raw.as_str(),
        };
        write!(f, "{}", s)
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Period::Month => "Month",
            Period::Quarter => "Quarter",
            Period::Year => "Year",
        };
        write!(f, "{}", s)
    }
}

impl fmt::Display for NextDeadline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NextDeadline::None => Ok(()),
            NextDeadline::Date(date) => write!(f, "{}", date.format(DATE_FORMAT)),
            NextDeadline::UponEvent => write!(f, "Upon Event"),
            NextDeadline::EndOfPeriod(period) => write!(f, "End of {}", period),
            NextDeadline::Unparsed(raw) => write!(f, "{}", raw),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_next_deadline_strings() {
        let date = NaiveDate::from_ymd_opt(2026, 3, 31).unwrap();

        assert_eq!(NextDeadline::from("2026-03-31"), NextDeadline::Date(date));
        assert_eq!(NextDeadline::from("Upon Event"), NextDeadline::UponEvent);
        assert_eq!(
            NextDeadline::from("End of Quarter"),
            NextDeadline::EndOfPeriod(Period::Quarter)
        );
        assert_eq!(NextDeadline::from(""), NextDeadline::None);
        assert_eq!(
            NextDeadline::from("sometime in March"),
            NextDeadline::Unparsed("sometime in March".to_string())
        );

        assert_eq!(NextDeadline::Date(date).to_string(), "2026-03-31");
        assert_eq!(NextDeadline::EndOfPeriod(Period::Year).to_string(), "End of Year");
        assert_eq!(NextDeadline::None.to_string(), "");
    }

    #[test]
    fn test_obligation_serializes_with_display_strings() {
        let obligation = Obligation {
            id: 42,
            obligation_type: ObligationType::FinancialCovenant,
            description: "The Borrower shall maintain a leverage ratio below 3.0".to_string(),
            frequency: Frequency::EventBased,
            deadline_rule: String::new(),
            responsible_party: RESPONSIBLE_PARTY.to_string(),
            risk_level: RiskLevel::Low,
            compliance_status: ComplianceStatus::DueSoon,
            next_deadline: NextDeadline::UponEvent,
            risk_score: 40,
            risk_category: RiskCategory::Medium,
        };

        let value = serde_json::to_value(&obligation).unwrap();
        assert_eq!(value["type"], "Financial Covenant");
        assert_eq!(value["frequency"], "Event-based");
        assert_eq!(value["compliance_status"], "Due Soon");
        assert_eq!(value["next_deadline"], "Upon Event");
        assert_eq!(value["risk_category"], "Medium");
    }

    #[test]
    fn test_unknown_strings_deserialize_to_fallbacks() {
        let raw = serde_json::json!({
            "id": 7,
            "type": "Insurance",
            "description": "Borrower shall keep the premises insured at all times",
            "frequency": "Weekly",
            "risk_level": "Severe",
            "compliance_status": "Pending",
            "next_deadline": "next spring"
        });

        let obligation: Obligation = serde_json::from_value(raw).unwrap();
        assert_eq!(
            obligation.obligation_type,
            ObligationType::Unknown("Insurance".to_string())
        );
        assert_eq!(obligation.frequency, Frequency::Unknown("Weekly".to_string()));
        assert_eq!(obligation.risk_level, RiskLevel::Unknown("Severe".to_string()));
        assert_eq!(
            obligation.compliance_status,
            ComplianceStatus::Unknown("Pending".to_string())
        );
        assert_eq!(obligation.responsible_party, "Borrower");
        assert_eq!(obligation.risk_score, 0);
        assert_eq!(obligation.risk_category, RiskCategory::Low);
        assert_eq!(
            obligation.next_deadline,
            NextDeadline::Unparsed("next spring".to_string())
        );
    }

    #[test]
    fn test_unknown_strings_written_back_verbatim() {
        let raw = serde_json::json!({
            "id": 7,
            "type": "Insurance",
            "description": "Borrower shall keep the premises insured at all times",
            "frequency": "Weekly",
            "risk_level": "Severe",
            "compliance_status": "Pending"
        });

        let obligation: Obligation = serde_json::from_value(raw).unwrap();
        let value = serde_json::to_value(&obligation).unwrap();

        assert_eq!(value["type"], "Insurance");
        assert_eq!(value["frequency"], "Weekly");
        assert_eq!(value["risk_level"], "Severe");
        assert_eq!(value["compliance_status"], "Pending");
    }

    #[test]
    fn test_risk_score_clamped_on_read() {
        let with_score = |score: serde_json::Value| {
            serde_json::json!({
                "id": 1,
                "type": "Reporting",
                "description": "Deliver quarterly reports to the Lender",
                "frequency": "Quarterly",
                "risk_level": "Low",
                "compliance_status": "Compliant",
                "risk_score": score
            })
        };

        let read = |score| serde_json::from_value::<Obligation>(with_score(score)).unwrap();

        assert_eq!(read(serde_json::json!(450)).risk_score, 100);
        assert_eq!(read(serde_json::json!(-12)).risk_score, 0);
        assert_eq!(read(serde_json::json!(42.9)).risk_score, 42);
        assert_eq!(read(serde_json::json!(65)).risk_score, 65);
    }
}
