//! Per-drug analysis report.

use chrono::{DateTime, Utc};

use crate::{common::Gene, vcf::ds::ParsedVcf};

use super::{
    ds::{Phenotype, RiskLabel, Severity},
    eval::result::{ClinicalRecommendation, Evaluation, NoTargetVariants},
    explain::Narrative,
};

/// Risk part of the report.
#[derive(Debug, Clone, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct RiskSummary {
    /// Risk label.
    pub risk_label: RiskLabel,
    /// Confidence in `[0, 1]`.
    pub confidence_score: f64,
    /// Severity.
    pub severity: Severity,
    /// Ordinal score of `severity`.
    pub severity_score: u8,
    /// Number of records of the primary gene.
    pub detected_variants_count: usize,
}

/// A reported variant.
#[derive(Debug, Clone, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
pub struct DetectedVariant {
    /// The rsid.
    pub rsid: String,
}

/// Genotype part of the report.
#[derive(Debug, Clone, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct PharmacogenomicProfile {
    /// Primary gene symbol, or a placeholder without target variants.
    pub primary_gene: String,
    /// Diplotype as `allele/allele`.
    pub diplotype: String,
    /// Phenotype.
    pub phenotype: Phenotype,
    /// Confidence of the phenotype inference.
    pub phenotype_confidence: f64,
    /// Reported variants.
    pub detected_variants: Vec<DetectedVariant>,
}

/// Parsing statistics.
#[derive(Debug, Clone, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
pub struct QualityMetrics {
    /// Whether the VCF was parsed.
    pub vcf_parsing_success: bool,
    /// Number of retained pharmacogene records.
    pub parsed_variants: usize,
    /// Pharmacogenes with records, in order of first appearance.
    pub genes_found: Vec<Gene>,
}

/// Report of one drug.
#[derive(Debug, Clone, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct Report {
    /// Identifier shared by all reports of one invocation.
    pub patient_id: String,
    /// Drug code.
    pub drug: String,
    /// Creation time.
    pub timestamp: DateTime<Utc>,
    /// Risk assessment.
    pub risk_assessment: RiskSummary,
    /// Genotype and phenotype.
    pub pharmacogenomic_profile: PharmacogenomicProfile,
    /// Clinical recommendation.
    pub clinical_recommendation: ClinicalRecommendation,
    /// Clinician and patient text.
    pub explanation: Narrative,
    /// Parsing statistics.
    pub quality_metrics: QualityMetrics,
}

impl Report {
    /// Assemble the report of one evaluation.
    pub fn new(
        patient_id: &str,
        evaluation: &Evaluation,
        explanation: Narrative,
        parsed: &ParsedVcf,
        timestamp: DateTime<Utc>,
    ) -> Self {
        let (risk_assessment, pharmacogenomic_profile) = match evaluation {
            Evaluation::Finding(finding) => (
                RiskSummary {
                    risk_label: finding.risk.risk_label,
                    confidence_score: finding.risk.confidence,
                    severity: finding.risk.severity,
                    severity_score: finding.risk.severity_score,
                    detected_variants_count: finding.risk.detected_variants_count,
                },
                PharmacogenomicProfile {
                    primary_gene: finding.allele_call.gene.to_string(),
                    diplotype: finding.allele_call.diplotype.clone(),
                    phenotype: finding.phenotype.phenotype,
                    phenotype_confidence: finding.phenotype.confidence,
                    detected_variants: finding
                        .allele_call
                        .rsids
                        .iter()
                        .map(|rsid| DetectedVariant { rsid: rsid.clone() })
                        .collect(),
                },
            ),
            Evaluation::NoTargetVariants(result) => (
                RiskSummary {
                    risk_label: result.risk_label(),
                    confidence_score: NoTargetVariants::CONFIDENCE,
                    severity: result.severity(),
                    severity_score: result.severity().score(),
                    detected_variants_count: 0,
                },
                PharmacogenomicProfile {
                    primary_gene: NoTargetVariants::PRIMARY_GENE.to_string(),
                    diplotype: NoTargetVariants::DIPLOTYPE.to_string(),
                    phenotype: result.phenotype(),
                    phenotype_confidence: NoTargetVariants::CONFIDENCE,
                    detected_variants: Vec::new(),
                },
            ),
        };

        Self {
            patient_id: patient_id.to_string(),
            drug: evaluation.drug().to_string(),
            timestamp,
            risk_assessment,
            pharmacogenomic_profile,
            clinical_recommendation: evaluation.recommendation().clone(),
            explanation,
            quality_metrics: QualityMetrics {
                vcf_parsing_success: true,
                parsed_variants: parsed.records.len(),
                genes_found: parsed.genes.clone(),
            },
        }
    }
}

#[cfg(test)]
mod test {
    use chrono::TimeZone as _;

    use crate::pgx::{eval::recommendation, explain::fallback};

    use super::*;

    #[test]
    fn no_target_variants_report() -> Result<(), anyhow::Error> {
        let evaluation = Evaluation::NoTargetVariants(NoTargetVariants {
            drug: "WARFARIN".to_string(),
            recommendation: recommendation::no_target_variants("WARFARIN"),
        });
        let timestamp = Utc
            .with_ymd_and_hms(2024, 2, 19, 12, 0, 0)
            .single()
            .expect("valid timestamp");

        let report = Report::new(
            "PAT-0123456789AB",
            &evaluation,
            fallback::no_target_variants("WARFARIN"),
            &ParsedVcf::default(),
            timestamp,
        );

        assert_eq!(report.pharmacogenomic_profile.primary_gene, "No Target Genes");
        assert_eq!(report.pharmacogenomic_profile.diplotype, "*1/*1");
        assert!(report.pharmacogenomic_profile.detected_variants.is_empty());
        assert_eq!(report.risk_assessment.risk_label, RiskLabel::Safe);
        assert_eq!(report.risk_assessment.severity, Severity::None);
        assert_eq!(report.risk_assessment.severity_score, 0);
        assert_eq!(report.risk_assessment.confidence_score, 0.6);
        assert_eq!(report.risk_assessment.detected_variants_count, 0);

        let json = serde_json::to_value(&report)?;
        assert_eq!(json["timestamp"], "2024-02-19T12:00:00Z");
        assert_eq!(json["risk_assessment"]["severity"], "none");
        assert_eq!(json["pharmacogenomic_profile"]["phenotype"], "Unknown");

        Ok(())
    }
}
