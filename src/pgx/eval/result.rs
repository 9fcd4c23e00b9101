//! Evaluation results.

use crate::{
    common::Gene,
    pgx::ds::{Phenotype, PhenotypeCall, RiskLabel, Severity},
};

use super::risk::OverrideRule;

/// Star allele call for the primary gene.
#[derive(Debug, Clone, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
pub struct AlleleCall {
    /// The primary gene.
    pub gene: Gene,
    /// Called star allele.
    pub star_allele: String,
    /// Diplotype as `allele/allele`.
    pub diplotype: String,
    /// Supporting rsids, de-duplicated in file order and consistent with
    /// `star_allele`.
    pub rsids: Vec<String>,
    /// Number of records of the primary gene, including those whose rsid was
    /// not reported.
    pub variant_count: usize,
}

/// Risk of one gene/drug/phenotype combination.
#[derive(Debug, Clone, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct RiskAssessment {
    /// The primary gene.
    pub gene: Gene,
    /// Drug code.
    pub drug: String,
    /// Phenotype used for the lookup.
    pub phenotype: Phenotype,
    /// Risk label.
    pub risk_label: RiskLabel,
    /// Severity.
    pub severity: Severity,
    /// Ordinal score of `severity`.
    pub severity_score: u8,
    /// Confidence in `[0, 1]`.
    pub confidence: f64,
    /// Number of records of the primary gene.
    pub detected_variants_count: usize,
    /// Override rule that changed the table result, if any.
    pub applied_rule: Option<OverrideRule>,
}

/// Action and detail text for the prescriber.
#[derive(Debug, Clone, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
pub struct ClinicalRecommendation {
    /// Short action, e.g., "Adjust Dose".
    pub action: String,
    /// Detailed recommendation.
    pub detail: String,
}

/// Result for a drug with variants in at least one relevant gene.
#[derive(Debug, Clone, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct Finding {
    /// Star allele call.
    pub allele_call: AlleleCall,
    /// Phenotype with its inference confidence.
    pub phenotype: PhenotypeCall,
    /// Risk assessment.
    pub risk: RiskAssessment,
    /// Clinical recommendation.
    pub recommendation: ClinicalRecommendation,
}

/// Result for a drug without variants in any relevant gene.
#[derive(Debug, Clone, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct NoTargetVariants {
    /// Drug code.
    pub drug: String,
    /// Clinical recommendation.
    pub recommendation: ClinicalRecommendation,
}

impl NoTargetVariants {
    /// Placeholder shown instead of a primary gene.
    pub const PRIMARY_GENE: &'static str = "No Target Genes";
    /// Assumed reference diplotype.
    pub const DIPLOTYPE: &'static str = "*1/*1";
    /// Confidence of the default assessment.
    pub const CONFIDENCE: f64 = 0.6;

    /// Risk label of the default assessment.
    pub fn risk_label(&self) -> RiskLabel {
        RiskLabel::Safe
    }

    /// Severity of the default assessment.
    pub fn severity(&self) -> Severity {
        Severity::None
    }

    /// Phenotype of the default assessment.
    pub fn phenotype(&self) -> Phenotype {
        Phenotype::Unknown
    }
}

/// Outcome of evaluating one drug.
#[derive(Debug, Clone, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Evaluation {
    /// Variants found in a relevant gene.
    Finding(Finding),
    /// No variant in any relevant gene.
    NoTargetVariants(NoTargetVariants),
}

impl Evaluation {
    /// Drug code of the evaluation.
    pub fn drug(&self) -> &str {
        match self {
            Evaluation::Finding(finding) => &finding.risk.drug,
            Evaluation::NoTargetVariants(result) => &result.drug,
        }
    }

    /// Risk label of the evaluation.
    pub fn risk_label(&self) -> RiskLabel {
        match self {
            Evaluation::Finding(finding) => finding.risk.risk_label,
            Evaluation::NoTargetVariants(result) => result.risk_label(),
        }
    }

    /// Severity of the evaluation.
    pub fn severity(&self) -> Severity {
        match self {
            Evaluation::Finding(finding) => finding.risk.severity,
            Evaluation::NoTargetVariants(result) => result.severity(),
        }
    }

    /// Clinical recommendation of the evaluation.
    pub fn recommendation(&self) -> &ClinicalRecommendation {
        match self {
            Evaluation::Finding(finding) => &finding.recommendation,
            Evaluation::NoTargetVariants(result) => &result.recommendation,
        }
    }
}
