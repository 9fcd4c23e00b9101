//! Clinical recommendation texts.

use crate::{
    common::Gene,
    pgx::ds::{Phenotype, RiskLabel},
};

use super::result::ClinicalRecommendation;

/// Detail texts for specific gene/drug/phenotype combinations.
const SPECIFIC_DETAILS: &[(Gene, &str, Phenotype, &str)] = &[
    (
        Gene::Cyp2c9,
        "WARFARIN",
        Phenotype::Pm,
        "Substantially reduce dose (80-90%) and use genotype-guided dosing with close INR \
         monitoring",
    ),
    (
        Gene::Cyp2c19,
        "CLOPIDOGREL",
        Phenotype::Pm,
        "Avoid clopidogrel and use an alternative P2Y12 inhibitor (prasugrel or ticagrelor) \
         unless contraindicated",
    ),
    (
        Gene::Slco1b1,
        "SIMVASTATIN",
        Phenotype::LowFunction,
        "Avoid simvastatin or limit to a maximum of 20 mg/day; consider alternative statins \
         such as pravastatin or rosuvastatin with close monitoring for myopathy",
    ),
];

/// Short action for a risk label.
pub fn action(risk_label: RiskLabel) -> &'static str {
    match risk_label {
        RiskLabel::Safe => "Standard Dosing",
        RiskLabel::AdjustDosage => "Adjust Dose",
        RiskLabel::Toxic => "Avoid or Use Alternative",
        RiskLabel::Ineffective => "Consider Alternative Medication",
        RiskLabel::Unknown => "Insufficient Data",
    }
}

/// Recommendation for a resolved risk.
pub fn recommend(
    gene: Gene,
    drug: &str,
    phenotype: Phenotype,
    risk_label: RiskLabel,
) -> ClinicalRecommendation {
    let specific = SPECIFIC_DETAILS
        .iter()
        .find(|(g, d, p, _)| *g == gene && *d == drug && *p == phenotype)
        .map(|(_, _, _, detail)| detail.to_string());
    let detail = specific.unwrap_or_else(|| match risk_label {
        RiskLabel::Safe => format!(
            "Patient can take standard dosage of {drug}. No pharmacogenomic adjustment needed."
        ),
        RiskLabel::AdjustDosage => format!(
            "Recommend dose adjustment for {drug} based on {phenotype} phenotype. Consult \
             clinical guidelines."
        ),
        RiskLabel::Toxic => format!(
            "High risk of toxicity with {drug}. Consider alternative therapy or significantly \
             reduce dose."
        ),
        RiskLabel::Ineffective => format!(
            "Patient may have reduced response to {drug}. Consider alternative medication."
        ),
        RiskLabel::Unknown => format!(
            "Insufficient pharmacogenomic data for {drug}. Baseline dosing recommended with \
             monitoring."
        ),
    });

    ClinicalRecommendation {
        action: action(risk_label).to_string(),
        detail,
    }
}

/// Recommendation when no relevant gene carries variants.
pub fn no_target_variants(drug: &str) -> ClinicalRecommendation {
    ClinicalRecommendation {
        action: action(RiskLabel::Safe).to_string(),
        detail: format!(
            "No significant pharmacogenomic variants detected for {drug}. Standard drug dosing \
             recommended."
        ),
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn specific_detail_wins() {
        let res = recommend(
            Gene::Cyp2c9,
            "WARFARIN",
            Phenotype::Pm,
            RiskLabel::Toxic,
        );

        assert_eq!(res.action, "Avoid or Use Alternative");
        assert!(res.detail.starts_with("Substantially reduce dose"));
    }

    #[rstest::rstest]
    #[case(RiskLabel::Safe, "Standard Dosing")]
    #[case(RiskLabel::AdjustDosage, "Adjust Dose")]
    #[case(RiskLabel::Toxic, "Avoid or Use Alternative")]
    #[case(RiskLabel::Ineffective, "Consider Alternative Medication")]
    #[case(RiskLabel::Unknown, "Insufficient Data")]
    fn template_names_drug(#[case] risk_label: RiskLabel, #[case] expected: &str) {
        let res = recommend(Gene::Tpmt, "AZATHIOPRINE", Phenotype::Im, risk_label);

        assert_eq!(res.action, expected);
        assert!(res.detail.contains("AZATHIOPRINE"), "{}", &res.detail);
    }

    #[test]
    fn adjust_dosage_detail() {
        let res = recommend(
            Gene::Slco1b1,
            "SIMVASTATIN",
            Phenotype::DecreasedFunction,
            RiskLabel::AdjustDosage,
        );

        insta::assert_snapshot!(
            res.detail,
            @"Recommend dose adjustment for SIMVASTATIN based on Decreased function phenotype. Consult clinical guidelines."
        );
    }

    #[test]
    fn no_target() {
        let res = no_target_variants("WARFARIN");

        assert_eq!(res.action, "Standard Dosing");
        assert!(res.detail.contains("WARFARIN"));
    }
}
