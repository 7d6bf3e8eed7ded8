//! Pattern table for obligation classification
//!
//! Every rule is a `{category, priority, pattern}` row. Rows are compiled
//! once when the table is built and resolved by ordered first match, so the
//! classification order lives in data rather than in branching code.

use crate::models::{Frequency, ObligationType, RiskLevel};
use crate::Result;
use regex::{Regex, RegexBuilder};

/// Obligation-type rows. Lower priority wins.
const TYPE_PATTERNS: &[(ObligationType, u8, &str)] = &[
    (
        ObligationType::FinancialCovenant,
        0,
        r"(?:maintain|require|covenant|agreement).*?(?:debt service coverage|interest coverage|leverage ratio|current ratio|quick ratio|working capital|debt to equity|total debt)",
    ),
    (
        ObligationType::FinancialCovenant,
        0,
        r"(?:financial covenant|financial ratio|ratio covenant)",
    ),
    (
        ObligationType::FinancialCovenant,
        0,
        r"(?:minimum|maximum).*?(?:balance sheet|equity|assets|liabilities|revenue|net worth|cash flow)",
    ),
    (
        ObligationType::Reporting,
        1,
        r"(?:provide|submit|deliver|furnish|send).*?(?:report|statement|financial|quarterly|monthly|annual|yearly|audit)",
    ),
    (
        ObligationType::Reporting,
        1,
        r"(?:monthly|quarterly|annual).*?(?:report|statement|financial)",
    ),
    (
        ObligationType::Reporting,
        1,
        r"(?:financial statements?|income statement|balance sheet|cash flow statement|tax returns?)",
    ),
    (
        ObligationType::Notification,
        2,
        r"(?:notify|inform|advise|tell|report).*?(?:change|event|default|breach|material|condition)",
    ),
    (
        ObligationType::Notification,
        2,
        r"(?:promptly notify|immediately inform|without delay).*?(?:lender|agent|bank)",
    ),
    (
        ObligationType::Notification,
        2,
        r"(?:notice of|notification of|inform of).*?(?:default|event|change|condition)",
    ),
];

const FREQUENCY_PATTERNS: &[(Frequency, u8, &str)] = &[
    (Frequency::Monthly, 0, r"\bmonth\b"),
    (Frequency::Monthly, 0, r"\bmonthly\b"),
    (Frequency::Monthly, 0, r"eom\b"),
    (Frequency::Monthly, 0, r"end of month"),
    (Frequency::Quarterly, 1, r"\bquarter\b"),
    (Frequency::Quarterly, 1, r"\bquarterly\b"),
    (Frequency::Quarterly, 1, r"q\d"),
    (Frequency::Quarterly, 1, r"end of quarter"),
    (Frequency::Annual, 2, r"\byear\b"),
    (Frequency::Annual, 2, r"\bannual\b"),
    (Frequency::Annual, 2, r"\byearly\b"),
    (Frequency::Annual, 2, r"end of year"),
    (Frequency::EventBased, 3, r"upon"),
    (Frequency::EventBased, 3, r"when"),
    (Frequency::EventBased, 3, r"if"),
    (Frequency::EventBased, 3, r"as soon as"),
    (Frequency::EventBased, 3, r"within.*?(?:days|hours|weeks)"),
];

const HIGH_RISK_KEYWORDS: &[&str] = &[
    "default",
    "acceleration",
    "foreclosure",
    "penalty",
    "interest rate increase",
    "event of default",
    "material adverse",
    "cross-default",
    "cross-acceleration",
    "forfeit",
    "terminate",
];

const MEDIUM_RISK_KEYWORDS: &[&str] = &[
    "fee",
    "charge",
    "cost",
    "expense",
    "compliance",
    "remedy",
    "cure period",
    "waiver",
    "consent",
];

/// A compiled obligation-type row
#[derive(Debug, Clone)]
pub struct TypeRule {
    pub kind: ObligationType,
    pub priority: u8,
    pattern: Regex,
}

/// A compiled frequency row
#[derive(Debug, Clone)]
pub struct FrequencyRule {
    pub frequency: Frequency,
    pub priority: u8,
    pattern: Regex,
}

/// Immutable, compiled classification rules.
///
/// Built once and shared; holds no interior mutability, so one table can
/// serve any number of concurrent extractions.
#[derive(Debug, Clone)]
pub struct PatternTable {
    type_rules: Vec<TypeRule>,
    frequency_rules: Vec<FrequencyRule>,
    high_risk: Vec<Regex>,
    medium_risk: Vec<Regex>,
}

impl PatternTable {
    /// The loan-agreement rule set
    pub fn standard() -> Result<Self> {
        Self::builder().with_standard_rules().build()
    }

    pub fn builder() -> PatternTableBuilder {
        PatternTableBuilder::default()
    }

    /// First obligation type whose rows match, in priority order
    pub fn classify(&self, sentence: &str) -> Option<ObligationType> {
        self.type_rules
            .iter()
            .find(|rule| rule.pattern.is_match(sentence))
            .map(|rule| rule.kind.clone())
    }

    /// First frequency group that matches; event-based when none do
    pub fn frequency(&self, sentence: &str) -> Frequency {
        self.frequency_rules
            .iter()
            .find(|rule| rule.pattern.is_match(sentence))
            .map(|rule| rule.frequency.clone())
            .unwrap_or(Frequency::EventBased)
    }

    /// Keyword-derived risk: any high keyword beats any medium keyword
    pub fn risk_level(&self, sentence: &str) -> RiskLevel {
        let high = count_matches(&self.high_risk, sentence);
        let medium = count_matches(&self.medium_risk, sentence);

        if high > 0 {
            RiskLevel::High
        } else if medium > 0 {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        }
    }

    pub fn type_rules(&self) -> &[TypeRule] {
        &self.type_rules
    }

    pub fn rule_count(&self) -> usize {
        self.type_rules.len()
            + self.frequency_rules.len()
            + self.high_risk.len()
            + self.medium_risk.len()
    }
}

fn count_matches(patterns: &[Regex], sentence: &str) -> usize {
    patterns.iter().filter(|re| re.is_match(sentence)).count()
}

/// Collects rows as source strings; nothing is compiled until [`build`].
///
/// [`build`]: PatternTableBuilder::build
#[derive(Debug, Default, Clone)]
pub struct PatternTableBuilder {
    type_rows: Vec<(ObligationType, u8, String)>,
    frequency_rows: Vec<(Frequency, u8, String)>,
    high_risk: Vec<String>,
    medium_risk: Vec<String>,
}

impl PatternTableBuilder {
    pub fn with_standard_rules(mut self) -> Self {
        for (kind, priority, pattern) in TYPE_PATTERNS {
            self = self.type_rule(kind.clone(), *priority, pattern);
        }
        for (frequency, priority, pattern) in FREQUENCY_PATTERNS {
            self = self.frequency_rule(frequency.clone(), *priority, pattern);
        }
        for keyword in HIGH_RISK_KEYWORDS {
            self = self.high_risk_keyword(keyword);
        }
        for keyword in MEDIUM_RISK_KEYWORDS {
            self = self.medium_risk_keyword(keyword);
        }
        self
    }

    pub fn type_rule(mut self, kind: ObligationType, priority: u8, pattern: &str) -> Self {
        self.type_rows.push((kind, priority, pattern.to_string()));
        self
    }

    pub fn frequency_rule(mut self, frequency: Frequency, priority: u8, pattern: &str) -> Self {
        self.frequency_rows
            .push((frequency, priority, pattern.to_string()));
        self
    }

    pub fn high_risk_keyword(mut self, pattern: &str) -> Self {
        self.high_risk.push(pattern.to_string());
        self
    }

    pub fn medium_risk_keyword(mut self, pattern: &str) -> Self {
        self.medium_risk.push(pattern.to_string());
        self
    }

    /// Compile every row case-insensitively and order by priority.
    ///
    /// The sort is stable: rows sharing a priority keep insertion order.
    pub fn build(self) -> Result<PatternTable> {
        let mut type_rules = self
            .type_rows
            .into_iter()
            .map(|(kind, priority, pattern)| {
                Ok(TypeRule {
                    kind,
                    priority,
                    pattern: compile(&pattern)?,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        type_rules.sort_by_key(|rule| rule.priority);

        let mut frequency_rules = self
            .frequency_rows
            .into_iter()
            .map(|(frequency, priority, pattern)| {
                Ok(FrequencyRule {
                    frequency,
                    priority,
                    pattern: compile(&pattern)?,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        frequency_rules.sort_by_key(|rule| rule.priority);

        let high_risk = self
            .high_risk
            .iter()
            .map(|p| compile(p))
            .collect::<Result<Vec<_>>>()?;
        let medium_risk = self
            .medium_risk
            .iter()
            .map(|p| compile(p))
            .collect::<Result<Vec<_>>>()?;

        Ok(PatternTable {
            type_rules,
            frequency_rules,
            high_risk,
            medium_risk,
        })
    }
}

pub(crate) fn compile(pattern: &str) -> Result<Regex> {
    Ok(RegexBuilder::new(pattern).case_insensitive(true).build()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TrackerError;

    fn table() -> PatternTable {
        PatternTable::standard().expect("standard patterns compile")
    }

    #[test]
    fn test_covenant_wins_over_reporting() {
        // Matches both the covenant and the balance sheet reporting rows
        let sentence =
            "The Borrower shall maintain a minimum net worth as shown on its balance sheet";
        assert_eq!(
            table().classify(sentence),
            Some(ObligationType::FinancialCovenant)
        );
    }

    #[test]
    fn test_reporting_wins_over_notification() {
        let sentence = "The Borrower shall deliver a report to the Lender describing any change";
        assert_eq!(table().classify(sentence), Some(ObligationType::Reporting));
    }

    #[test]
    fn test_notification_and_no_match() {
        let table = table();
        assert_eq!(
            table.classify("The Borrower shall give notice of any litigation event"),
            Some(ObligationType::Notification)
        );
        assert_eq!(
            table.classify("This Agreement is governed by the laws of New York"),
            None
        );
    }

    #[test]
    fn test_frequency_groups_in_order() {
        let table = table();
        assert_eq!(
            table.frequency("Statements are due each month and each quarter"),
            Frequency::Monthly
        );
        assert_eq!(
            table.frequency("Certificates are due every quarter of the year"),
            Frequency::Quarterly
        );
        assert_eq!(table.frequency("An annual audit is required"), Frequency::Annual);
        assert_eq!(
            table.frequency("Deliver the notice upon request"),
            Frequency::EventBased
        );
        assert_eq!(table.frequency("Maintain the ratio"), Frequency::EventBased);
    }

    #[test]
    fn test_risk_keywords() {
        let table = table();
        assert_eq!(
            table.risk_level("Failure constitutes an Event of Default and a fee applies"),
            RiskLevel::High
        );
        assert_eq!(
            table.risk_level("Any waiver requires the written approval of the Lender"),
            RiskLevel::Medium
        );
        assert_eq!(
            table.risk_level("The Borrower shall maintain its books"),
            RiskLevel::Low
        );
    }

    #[test]
    fn test_custom_rows_sorted_by_priority() {
        let table = PatternTable::builder()
            .type_rule(ObligationType::Notification, 5, r"insurance")
            .type_rule(ObligationType::FinancialCovenant, 1, r"insurance premium")
            .build()
            .unwrap();

        assert_eq!(table.type_rules()[0].kind, ObligationType::FinancialCovenant);
        assert_eq!(
            table.classify("Pay the insurance premium"),
            Some(ObligationType::FinancialCovenant)
        );
        assert_eq!(
            table.classify("Keep insurance in force"),
            Some(ObligationType::Notification)
        );
    }

    #[test]
    fn test_invalid_pattern_is_reported() {
        let result = PatternTable::builder()
            .high_risk_keyword("(unclosed")
            .build();
        assert!(matches!(result, Err(TrackerError::InvalidPattern(_))));
    }
}
