//! Deadline parsing and compliance status
//!
//! Pulls a timing rule out of a sentence and estimates when it next falls
//! due. Pattern families are applied in a fixed order and later families
//! may overwrite what earlier ones found:
//!
//! 1. `within N units after REFERENCE`
//! 2. `N units before REFERENCE`
//! 3. bare frequency words (never replaces a rule already found)
//! 4. immediacy words, which always win
//! 5. end-of-period phrases, which win over everything except 4
//!
//! Dates are approximate on purpose: a month is 30 days and a year 365.

use crate::models::{ComplianceStatus, NextDeadline, Period};
use crate::patterns::compile;
use crate::Result;
use chrono::{Datelike, Days, Local, Months, NaiveDate};
use regex::Regex;
use serde::Serialize;
use tracing::{debug, warn};

/// Days before a deadline at which an obligation counts as due soon
pub const DUE_SOON_DAYS: i64 = 7;

const AFTER_PATTERN: &str = r"(?:within|after|by|no later than)\s+(\d+)\s+(days?|months?|weeks?|years?)\s+(?:after|of|following)\s+(.*)";
const BEFORE_PATTERN: &str = r"(\d+)\s+(days?|months?|weeks?|years?)\s+(?:before|prior to)\s+(.*)";
const FREQUENCY_PATTERN: &str = r"(?:semi-annually|bi-annually|monthly|quarterly|annually|yearly)";
const IMMEDIATE_PATTERN: &str = r"(?:promptly|immediately|as soon as possible|without delay)";
const PERIOD_END_PATTERN: &str = r"(?:by\s+)?end of\s+(month|quarter|year|fiscal year|calendar year)";

const FALLBACK_PATTERNS: &[&str] = &[
    r"(?:semi-annually|bi-annually|monthly|quarterly|annually|yearly|event-based)",
    r"within\s+\d+\s+days?",
    r"by\s+\w+\s+\d{1,2}(?:st|nd|rd|th)?,\s*\d{4}",
];

const MONTH_END_PATTERN: &str = r"end of (?:each |the |every )?(?:calendar )?month|month[- ]end";
const QUARTER_END_PATTERN: &str =
    r"end of (?:each |the |every )?(?:fiscal |calendar )?quarter|quarter[- ]end";
const YEAR_END_PATTERN: &str = r"end of (?:each |the |every )?(?:fiscal |calendar )?year|year[- ]end";

/// Rule text used when an immediacy word is present
pub const IMMEDIATE_RULE: &str = "immediate upon occurrence";

/// Timing information found in one sentence
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DeadlineInfo {
    pub rule: String,
    pub calculated_date: NextDeadline,
    /// Bare frequency word, if the sentence carried one
    pub frequency: String,
    pub description: String,
}

/// Today's date on the local wall clock
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Compiled deadline patterns. Cheap to share, immutable after construction.
#[derive(Debug, Clone)]
pub struct DeadlineParser {
    after: Regex,
    before: Regex,
    frequency: Regex,
    immediate: Regex,
    period_end: Regex,
    fallbacks: Vec<Regex>,
    anchors: PeriodAnchors,
}

#[derive(Debug, Clone)]
struct PeriodAnchors {
    month: Regex,
    quarter: Regex,
    year: Regex,
}

impl DeadlineParser {
    pub fn new() -> Result<Self> {
        Ok(Self {
            after: compile(AFTER_PATTERN)?,
            before: compile(BEFORE_PATTERN)?,
            frequency: compile(FREQUENCY_PATTERN)?,
            immediate: compile(IMMEDIATE_PATTERN)?,
            period_end: compile(PERIOD_END_PATTERN)?,
            fallbacks: FALLBACK_PATTERNS
                .iter()
                .map(|p| compile(p))
                .collect::<Result<Vec<_>>>()?,
            anchors: PeriodAnchors {
                month: compile(MONTH_END_PATTERN)?,
                quarter: compile(QUARTER_END_PATTERN)?,
                year: compile(YEAR_END_PATTERN)?,
            },
        })
    }

    /// Parse against today's date
    pub fn parse(&self, sentence: &str) -> DeadlineInfo {
        self.parse_on(sentence, today())
    }

    /// Parse with computed dates anchored on `today`
    pub fn parse_on(&self, sentence: &str, today: NaiveDate) -> DeadlineInfo {
        let mut info = DeadlineInfo::default();

        // Both numeric families run; "before" overwrites "after" when both hit.
        if let Some(caps) = self.after.captures(sentence) {
            let (qty, unit, reference) = (&caps[1], &caps[2], caps[3].trim());
            info.rule = format!("within {} {} after {}", qty, unit, reference);
            info.calculated_date = self.dated(qty, unit, reference, today);
        }

        if let Some(caps) = self.before.captures(sentence) {
            let (qty, unit, reference) = (&caps[1], &caps[2], caps[3].trim());
            info.rule = format!("{} {} before {}", qty, unit, reference);
            info.calculated_date = self.dated(qty, unit, reference, today);
        }

        if let Some(found) = self.frequency.find(sentence) {
            info.frequency = found.as_str().to_string();
            if info.rule.is_empty() {
                info.rule = found.as_str().to_string();
            }
        }

        let immediate = self.immediate.is_match(sentence);
        if immediate {
            info.rule = IMMEDIATE_RULE.to_string();
            info.calculated_date = NextDeadline::UponEvent;
        }

        if !immediate {
            if let Some(caps) = self.period_end.captures(sentence) {
                let period = caps[1].to_lowercase();
                info.rule = format!("by end of {}", period);
                info.calculated_date = NextDeadline::EndOfPeriod(period_of(&period));
            }
        }

        if info.rule.is_empty() {
            if let Some(found) = self.fallbacks.iter().find_map(|re| re.find(sentence)) {
                info.rule = found.as_str().to_string();
            }
        }

        if info.description.is_empty() && !info.rule.is_empty() {
            info.description = info.rule.clone();
        }

        debug!(
            rule = %info.rule,
            next_deadline = %info.calculated_date,
            "Parsed deadline"
        );

        info
    }

    fn dated(&self, qty: &str, unit: &str, reference: &str, today: NaiveDate) -> NextDeadline {
        match self.expected_date(qty, unit, reference, today) {
            Some(date) => NextDeadline::Date(date),
            None => {
                warn!(quantity = qty, unit = unit, "Could not compute deadline date");
                NextDeadline::None
            }
        }
    }

    /// Estimate a due date `qty` units after `reference`.
    ///
    /// The anchor is `today`, or the last day of the current month, quarter
    /// or year when the reference names one of those period ends. Returns
    /// `None` when the quantity is not an integer or the date overflows.
    pub fn expected_date(
        &self,
        quantity: &str,
        unit: &str,
        reference: &str,
        today: NaiveDate,
    ) -> Option<NaiveDate> {
        let qty: u64 = quantity.trim().parse().ok()?;
        let unit = unit.to_lowercase();

        let days = if unit.contains("day") {
            qty
        } else if unit.contains("week") {
            qty.checked_mul(7)?
        } else if unit.contains("month") {
            qty.checked_mul(30)?
        } else if unit.contains("year") {
            qty.checked_mul(365)?
        } else {
            qty
        };

        let anchor = if self.anchors.month.is_match(reference) {
            end_of_month(today.year(), today.month())?
        } else if self.anchors.quarter.is_match(reference) {
            end_of_quarter(today)?
        } else if self.anchors.year.is_match(reference) {
            NaiveDate::from_ymd_opt(today.year(), 12, 31)?
        } else {
            today
        };

        anchor.checked_add_days(Days::new(days))
    }
}

fn period_of(period: &str) -> Period {
    if period.contains("month") {
        Period::Month
    } else if period.contains("quarter") {
        Period::Quarter
    } else {
        Period::Year
    }
}

fn end_of_month(year: i32, month: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, 1)?
        .checked_add_months(Months::new(1))?
        .pred_opt()
}

/// Quarters are the 3-month blocks ending in March, June, September, December
fn end_of_quarter(today: NaiveDate) -> Option<NaiveDate> {
    let quarter_end_month = ((today.month() - 1) / 3 + 1) * 3;
    end_of_month(today.year(), quarter_end_month)
}

/// One-off parse with a freshly compiled parser, anchored on today
pub fn parse_deadline(sentence: &str) -> Result<DeadlineInfo> {
    Ok(DeadlineParser::new()?.parse(sentence))
}

/// One-off date estimate, anchored on today
pub fn calculate_expected_date(
    quantity: &str,
    unit: &str,
    reference: &str,
) -> Result<Option<NaiveDate>> {
    Ok(DeadlineParser::new()?.expected_date(quantity, unit, reference, today()))
}

//
// ================= Compliance Status =================
//

/// Status of a deadline relative to `today`.
///
/// Open-ended deadlines are always compliant. So is anything that is not a
/// real date: a malformed deadline must never fail the run.
pub fn compliance_status(
    deadline: &NextDeadline,
    today: NaiveDate,
    due_soon_days: i64,
) -> ComplianceStatus {
    let date = match deadline {
        NextDeadline::Date(date) => *date,
        NextDeadline::Unparsed(raw) => {
            warn!(deadline = %raw, "Unparseable deadline treated as compliant");
            return ComplianceStatus::Compliant;
        }
        _ => return ComplianceStatus::Compliant,
    };

    let remaining = date.signed_duration_since(today).num_days();

    if remaining < 0 {
        ComplianceStatus::Missed
    } else if remaining <= due_soon_days {
        ComplianceStatus::DueSoon
    } else {
        ComplianceStatus::Compliant
    }
}

/// String-level entry point used by callers holding raw snapshot values
pub fn get_compliance_status(deadline: &str, today: NaiveDate) -> ComplianceStatus {
    compliance_status(&NextDeadline::from(deadline), today, DUE_SOON_DAYS)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parser() -> DeadlineParser {
        DeadlineParser::new().expect("deadline patterns compile")
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn anchor() -> NaiveDate {
        date(2026, 2, 10)
    }

    #[test]
    fn test_within_days_after_month_end() {
        let info = parser().parse_on(
            "Monthly financial statements shall be provided within 30 days after the end of each month",
            anchor(),
        );

        assert!(info.rule.starts_with("within 30 days after"));
        assert_eq!(info.rule, "within 30 days after the end of each month");
        // February 28 + 30 days
        assert_eq!(info.calculated_date, NextDeadline::Date(date(2026, 3, 30)));
        assert_eq!(info.frequency, "Monthly");
        assert_eq!(info.description, info.rule);
    }

    #[test]
    fn test_quarter_and_year_end_anchors() {
        let parser = parser();

        let quarterly = parser.parse_on(
            "Quarterly compliance certificates shall be submitted within 45 days of quarter end",
            anchor(),
        );
        assert_eq!(quarterly.calculated_date, NextDeadline::Date(date(2026, 5, 15)));

        let annual = parser.parse_on(
            "Annual audited financial statements shall be delivered within 90 days after the fiscal year end",
            anchor(),
        );
        assert_eq!(annual.calculated_date, NextDeadline::Date(date(2027, 3, 31)));
    }

    #[test]
    fn test_promptly_overrides_numeric_rule() {
        let info = parser().parse_on(
            "The Borrower shall promptly, and in any event within 5 days after the occurrence thereof, notify the Lender",
            anchor(),
        );

        assert_eq!(info.rule, IMMEDIATE_RULE);
        assert_eq!(info.calculated_date, NextDeadline::UponEvent);
    }

    #[test]
    fn test_material_adverse_change_is_upon_event() {
        let info = parser().parse_on(
            "The Borrower shall notify the Lender promptly of any material adverse change",
            anchor(),
        );

        assert_eq!(info.rule, "immediate upon occurrence");
        assert_eq!(info.calculated_date, NextDeadline::UponEvent);
    }

    #[test]
    fn test_end_of_period_overrides_numeric_but_not_immediacy() {
        let parser = parser();

        let budget = parser.parse_on(
            "The annual budget shall be delivered within 10 days after approval and by end of fiscal year",
            anchor(),
        );
        assert_eq!(budget.rule, "by end of fiscal year");
        assert_eq!(budget.calculated_date, NextDeadline::EndOfPeriod(Period::Year));

        let urgent = parser.parse_on(
            "Notify the Lender immediately and in any case before the end of quarter",
            anchor(),
        );
        assert_eq!(urgent.calculated_date, NextDeadline::UponEvent);
    }

    #[test]
    fn test_before_overwrites_after() {
        let info = parser().parse_on(
            "Notice shall be given no later than 3 days after signing and 15 days prior to any asset sale",
            anchor(),
        );

        assert_eq!(info.rule, "15 days before any asset sale");
        assert_eq!(info.calculated_date, NextDeadline::Date(date(2026, 2, 25)));
    }

    #[test]
    fn test_bare_frequency_sets_rule_without_date() {
        let info = parser().parse_on(
            "The Borrower shall furnish compliance certificates quarterly",
            anchor(),
        );

        assert_eq!(info.rule, "quarterly");
        assert_eq!(info.frequency, "quarterly");
        assert!(info.calculated_date.is_none());
    }

    #[test]
    fn test_fallback_rules() {
        let parser = parser();

        assert_eq!(
            parser.parse_on("Reports follow an event-based schedule", anchor()).rule,
            "event-based"
        );
        assert_eq!(
            parser.parse_on("The Borrower shall cure the breach within 5 days", anchor()).rule,
            "within 5 days"
        );
        let dated = parser.parse_on("The first payment is due by March 15, 2027", anchor());
        assert_eq!(dated.rule, "by March 15, 2027");
        assert!(dated.calculated_date.is_none());

        let nothing = parser.parse_on("The Borrower shall maintain insurance", anchor());
        assert!(nothing.rule.is_empty());
        assert!(nothing.description.is_empty());
    }

    #[test]
    fn test_expected_date_units() {
        let parser = parser();
        let today = anchor();

        assert_eq!(parser.expected_date("2", "weeks", "signing", today), Some(date(2026, 2, 24)));
        assert_eq!(parser.expected_date("3", "months", "closing", today), Some(date(2026, 5, 11)));
        assert_eq!(parser.expected_date("1", "year", "closing", today), Some(date(2027, 2, 10)));
        assert_eq!(parser.expected_date("10", "days", "month-end", today), Some(date(2026, 3, 10)));
    }

    #[test]
    fn test_expected_date_failures() {
        let parser = parser();
        assert_eq!(parser.expected_date("thirty", "days", "closing", anchor()), None);
        assert_eq!(
            parser.expected_date("99999999999999999999999", "days", "closing", anchor()),
            None
        );
        assert_eq!(
            parser.expected_date("18446744073709551615", "years", "closing", anchor()),
            None
        );
    }

    #[test]
    fn test_compliance_status_bands() {
        let today = anchor();

        assert_eq!(get_compliance_status("2026-02-09", today), ComplianceStatus::Missed);
        assert_eq!(get_compliance_status("2026-02-10", today), ComplianceStatus::DueSoon);
        assert_eq!(get_compliance_status("2026-02-17", today), ComplianceStatus::DueSoon);
        assert_eq!(get_compliance_status("2026-02-18", today), ComplianceStatus::Compliant);
    }

    #[test]
    fn test_compliance_status_defaults_to_compliant() {
        let today = anchor();

        assert_eq!(get_compliance_status("", today), ComplianceStatus::Compliant);
        assert_eq!(get_compliance_status("Upon Event", today), ComplianceStatus::Compliant);
        assert_eq!(get_compliance_status("End of Month", today), ComplianceStatus::Compliant);
        assert_eq!(get_compliance_status("2026-13-45", today), ComplianceStatus::Compliant);
        assert_eq!(get_compliance_status("soon", today), ComplianceStatus::Compliant);
    }

    #[test]
    fn test_end_of_quarter_blocks() {
        assert_eq!(end_of_quarter(date(2026, 1, 1)), Some(date(2026, 3, 31)));
        assert_eq!(end_of_quarter(date(2026, 6, 30)), Some(date(2026, 6, 30)));
        assert_eq!(end_of_quarter(date(2026, 8, 15)), Some(date(2026, 9, 30)));
        assert_eq!(end_of_quarter(date(2026, 12, 1)), Some(date(2026, 12, 31)));
        assert_eq!(end_of_month(2024, 2), Some(date(2024, 2, 29)));
    }
}
