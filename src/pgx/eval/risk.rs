//! Risk resolution from the rule table and override rules.

use crate::{
    common::Gene,
    pgx::{
        data::rules::RiskOutcome,
        ds::{Phenotype, RiskLabel, Severity},
    },
};

use super::result::RiskAssessment;

/// rsids that force a toxic warfarin result.
pub const WARFARIN_HIGH_RISK_RSIDS: &[&str] = &[
    "rs1057910",
    "rs28371686",
    "rs9332131",
    "rs9332239",
    "rs9923231",
];

/// Override rules applied after the table lookup.
///
/// The conditions are mutually exclusive; at most one rule matches.  The
/// confidence of the table result is kept.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    serde::Deserialize,
    serde::Serialize,
    strum::Display,
    strum::EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum OverrideRule {
    /// Warfarin with a CYP2C9 poor metabolizer.
    WarfarinCyp2c9PoorMetabolizer,
    /// Warfarin with a high-risk rsid, unless the rule above matched.
    WarfarinHighRiskVariant,
    /// A safe warfarin result despite variants in the primary gene becomes a
    /// dose adjustment.  Variants whose rsid was not reported still count.
    ///
    /// This is a precautionary policy for a narrow therapeutic index drug,
    /// not a CPIC recommendation.
    WarfarinSafeWithVariants,
    /// Fluorouracil with a DPYD poor metabolizer.
    FluorouracilDpydPoorMetabolizer,
}

/// Input of the override rules.
struct RuleInput<'a> {
    gene: Gene,
    drug: &'a str,
    phenotype: Phenotype,
    rsids: &'a [String],
    variant_count: usize,
    base: RiskOutcome,
}

impl RuleInput<'_> {
    fn has_high_risk_rsid(&self) -> bool {
        self.rsids
            .iter()
            .any(|rsid| WARFARIN_HIGH_RISK_RSIDS.contains(&rsid.as_str()))
    }
}

impl OverrideRule {
    /// Rules in evaluation order.
    const ORDER: [OverrideRule; 4] = [
        OverrideRule::WarfarinCyp2c9PoorMetabolizer,
        OverrideRule::WarfarinHighRiskVariant,
        OverrideRule::WarfarinSafeWithVariants,
        OverrideRule::FluorouracilDpydPoorMetabolizer,
    ];

    fn matches(self, input: &RuleInput) -> bool {
        let warfarin_pm = input.drug == "WARFARIN"
            && input.gene == Gene::Cyp2c9
            && input.phenotype == Phenotype::Pm;
        match self {
            OverrideRule::WarfarinCyp2c9PoorMetabolizer => warfarin_pm,
            OverrideRule::WarfarinHighRiskVariant => {
                input.drug == "WARFARIN" && !warfarin_pm && input.has_high_risk_rsid()
            }
            OverrideRule::WarfarinSafeWithVariants => {
                input.drug == "WARFARIN"
                    && !warfarin_pm
                    && !input.has_high_risk_rsid()
                    && input.base.risk_label == RiskLabel::Safe
                    && input.variant_count > 0
            }
            OverrideRule::FluorouracilDpydPoorMetabolizer => {
                input.drug == "FLUOROURACIL"
                    && input.gene == Gene::Dpyd
                    && input.phenotype == Phenotype::PoorMetabolizer
            }
        }
    }

    fn outcome(self) -> (RiskLabel, Severity) {
        match self {
            OverrideRule::WarfarinCyp2c9PoorMetabolizer
            | OverrideRule::WarfarinHighRiskVariant
            | OverrideRule::FluorouracilDpydPoorMetabolizer => {
                (RiskLabel::Toxic, Severity::Critical)
            }
            OverrideRule::WarfarinSafeWithVariants => (RiskLabel::AdjustDosage, Severity::High),
        }
    }
}

/// Resolves the risk of a gene/drug/phenotype combination.
pub struct Evaluator<'a> {
    /// The parent evaluator.
    parent: &'a super::Evaluator,
}

impl<'a> Evaluator<'a> {
    /// Create a new `Evaluator`.
    pub fn with_parent(parent: &'a super::Evaluator) -> Self {
        Self { parent }
    }

    /// Resolve the risk assessment.
    ///
    /// # Arguments
    ///
    /// * `gene` - The primary gene.
    /// * `drug` - Drug code.
    /// * `phenotype` - Inferred phenotype.
    /// * `rsids` - Reported rsids of the allele call.
    /// * `variant_count` - Number of records of `gene`.
    pub fn evaluate(
        &self,
        gene: Gene,
        drug: &str,
        phenotype: Phenotype,
        rsids: &[String],
        variant_count: usize,
    ) -> RiskAssessment {
        let base = self
            .parent
            .data()
            .rules
            .get(gene, drug, phenotype)
            .unwrap_or(RiskOutcome::NOT_FOUND);
        let input = RuleInput {
            gene,
            drug,
            phenotype,
            rsids,
            variant_count,
            base,
        };
        let applied_rule = OverrideRule::ORDER
            .into_iter()
            .find(|rule| rule.matches(&input));
        let (risk_label, severity) = match applied_rule {
            Some(rule) => {
                tracing::debug!("applying override rule {}", rule);
                rule.outcome()
            }
            None => (base.risk_label, base.severity),
        };

        RiskAssessment {
            gene,
            drug: drug.to_string(),
            phenotype,
            risk_label,
            severity,
            severity_score: severity.score(),
            confidence: base.confidence,
            detected_variants_count: variant_count,
            applied_rule,
        }
    }
}
