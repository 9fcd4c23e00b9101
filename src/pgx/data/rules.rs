//! Risk rule table keyed by gene, drug and phenotype.

use std::path::Path;

use rustc_hash::FxHashMap;

use crate::{
    common::Gene,
    pgx::ds::{Phenotype, RiskLabel, Severity},
};

/// The embedded default table.
const EMBEDDED: &str = include_str!("tables/risk_rules.tsv");

/// One row of the risk rule table.
#[derive(Debug, Clone, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct RiskRule {
    /// Gene symbol.
    pub gene: Gene,
    /// Drug code, e.g., `CODEINE`.
    pub drug: String,
    /// Phenotype.
    pub phenotype: Phenotype,
    /// Resulting risk label.
    pub risk_label: RiskLabel,
    /// Resulting severity.
    pub severity: Severity,
    /// Confidence in `[0, 1]`.
    pub confidence: f64,
}

/// Composite lookup key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RuleKey {
    /// Gene symbol.
    pub gene: Gene,
    /// Drug code.
    pub drug: String,
    /// Phenotype.
    pub phenotype: Phenotype,
}

/// Risk label, severity and confidence of a rule.
#[derive(Debug, Clone, Copy, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct RiskOutcome {
    /// Risk label.
    pub risk_label: RiskLabel,
    /// Severity.
    pub severity: Severity,
    /// Confidence in `[0, 1]`.
    pub confidence: f64,
}

impl RiskOutcome {
    /// Outcome for combinations without a rule.
    pub const NOT_FOUND: RiskOutcome = RiskOutcome {
        risk_label: RiskLabel::Unknown,
        severity: Severity::Moderate,
        confidence: 0.5,
    };
}

/// Facade struct for risk rule lookups.
#[derive(Debug, Clone, Default)]
pub struct Data {
    /// Rules by composite key.
    rules: FxHashMap<RuleKey, RiskOutcome>,
}

impl Data {
    /// Load from `path`, or from the embedded table if `None`.
    ///
    /// # Errors
    ///
    /// If anything goes wrong, it returns a generic `anyhow::Error`.
    pub fn load(path: Option<&Path>) -> Result<Self, anyhow::Error> {
        Self::new(super::load_tsv(path, EMBEDDED)?)
    }

    /// Create a new `Data` object.
    ///
    /// # Errors
    ///
    /// Fails on duplicate keys or confidences outside `[0, 1]`.
    pub fn new(rows: Vec<RiskRule>) -> Result<Self, anyhow::Error> {
        let mut rules = FxHashMap::default();
        for row in rows {
            if !(0.0..=1.0).contains(&row.confidence) {
                anyhow::bail!("confidence out of range for {:?}", &row);
            }
            let key = RuleKey {
                gene: row.gene,
                drug: row.drug.trim().to_string(),
                phenotype: row.phenotype,
            };
            let outcome = RiskOutcome {
                risk_label: row.risk_label,
                severity: row.severity,
                confidence: row.confidence,
            };
            if rules.insert(key.clone(), outcome).is_some() {
                anyhow::bail!("duplicate risk rule for {:?}", &key);
            }
        }

        Ok(Self { rules })
    }

    /// Number of rules.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Whether there are no rules.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Rule for the given combination, if any.
    pub fn get(&self, gene: Gene, drug: &str, phenotype: Phenotype) -> Option<RiskOutcome> {
        self.rules
            .get(&RuleKey {
                gene,
                drug: drug.to_string(),
                phenotype,
            })
            .copied()
    }
}
