//! Obligation extraction
//!
//! Splits agreement text into sentences, keeps the ones that read like a
//! borrower duty and turns each into an [`Obligation`]. Classification is
//! keyword and regex driven; there is no language model anywhere here.

use crate::config::{TrackerConfig, MIN_SENTENCE_CHARS};
use crate::deadline::{today, DeadlineParser};
use crate::models::{ComplianceStatus, Obligation, RiskCategory, RESPONSIBLE_PARTY};
use crate::patterns::PatternTable;
use crate::Result;
use chrono::NaiveDate;
use regex::Regex;
use sha2::{Digest, Sha256};
use std::collections::HashSet;
use tracing::{debug, info};

/// Sentence boundaries: terminal punctuation, `; `, or line breaks
const SENTENCE_BREAK: &str = r"[.!?]+|;\s+|\n+";

const ID_MODULUS: u64 = 1_000_000;

/// Rule-based obligation extractor.
///
/// Owns its compiled patterns; build one and reuse it across documents.
#[derive(Debug, Clone)]
pub struct ObligationExtractor {
    patterns: PatternTable,
    deadlines: DeadlineParser,
    sentence_break: Regex,
    non_word: Regex,
    min_sentence_chars: usize,
}

impl ObligationExtractor {
    /// Standard loan-agreement rules with default settings
    pub fn new() -> Result<Self> {
        Self::with_patterns(PatternTable::standard()?, &TrackerConfig::default())
    }

    pub fn with_patterns(patterns: PatternTable, config: &TrackerConfig) -> Result<Self> {
        Ok(Self {
            patterns,
            deadlines: DeadlineParser::new()?,
            sentence_break: Regex::new(SENTENCE_BREAK)?,
            non_word: Regex::new(r"\W+")?,
            min_sentence_chars: config.min_sentence_chars,
        })
    }

    pub fn patterns(&self) -> &PatternTable {
        &self.patterns
    }

    /// Extract with deadlines anchored on today
    pub fn extract_obligations(&self, text: &str) -> Vec<Obligation> {
        self.extract_obligations_on(text, today())
    }

    /// Extract with deadlines anchored on `today`
    pub fn extract_obligations_on(&self, text: &str, today: NaiveDate) -> Vec<Obligation> {
        let sentences = self.split_into_sentences(text);

        let obligations: Vec<Obligation> = sentences
            .iter()
            .filter_map(|sentence| self.extract_single_obligation(sentence, today))
            .collect();

        let extracted = obligations.len();
        let obligations = self.deduplicate(obligations);

        info!(
            sentences = sentences.len(),
            extracted = extracted,
            unique = obligations.len(),
            "Obligation extraction completed"
        );

        obligations
    }

    /// Heuristic splitter; drops trimmed fragments that are too short
    pub fn split_into_sentences<'a>(&self, text: &'a str) -> Vec<&'a str> {
        self.sentence_break
            .split(text)
            .map(str::trim)
            .filter(|s| s.chars().count() > self.min_sentence_chars)
            .collect()
    }

    /// Classify one sentence; `None` when it matches no obligation rule
    pub fn extract_single_obligation(
        &self,
        sentence: &str,
        today: NaiveDate,
    ) -> Option<Obligation> {
        let sentence = sentence.trim();
        let obligation_type = self.patterns.classify(sentence)?;

        let frequency = self.patterns.frequency(sentence);
        let risk_level = self.patterns.risk_level(sentence);
        let deadline = self.deadlines.parse_on(sentence, today);

        debug!(
            obligation_type = %obligation_type,
            frequency = %frequency,
            risk_level = %risk_level,
            "Classified sentence"
        );

        Some(Obligation {
            id: obligation_id(sentence),
            obligation_type,
            description: sentence.to_string(),
            frequency,
            deadline_rule: deadline.rule,
            responsible_party: RESPONSIBLE_PARTY.to_string(),
            risk_level,
            compliance_status: ComplianceStatus::Compliant,
            next_deadline: deadline.calculated_date,
            risk_score: 0,
            risk_category: RiskCategory::Low,
        })
    }

    /// Keep the first obligation per normalized description, order preserved
    pub fn deduplicate(&self, obligations: Vec<Obligation>) -> Vec<Obligation> {
        let mut seen = HashSet::with_capacity(obligations.len());

        obligations
            .into_iter()
            .filter(|obligation| seen.insert(self.normalize(&obligation.description)))
            .collect()
    }

    /// Lower-cased description with every non-word character removed
    pub fn normalize(&self, description: &str) -> String {
        self.non_word
            .replace_all(&description.to_lowercase(), "")
            .into_owned()
    }
}

/// Content-addressed display id in `[0, 1_000_000)`.
///
/// Identical sentences always get the same id; distinct sentences may
/// collide, so never use it as a lookup key.
pub fn obligation_id(sentence: &str) -> u32 {
    let digest = Sha256::digest(sentence.trim().as_bytes());
    let mut prefix = [0u8; 8];
    prefix.copy_from_slice(&digest[..8]);
    (u64::from_be_bytes(prefix) % ID_MODULUS) as u32
}

/// One-off extraction with the standard rules
pub fn extract_obligations_from_text(text: &str) -> Result<Vec<Obligation>> {
    Ok(ObligationExtractor::new()?.extract_obligations(text))
}
