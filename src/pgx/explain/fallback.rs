//! Deterministic explanation texts.

use itertools::Itertools as _;

use crate::{common::Gene, pgx::ds::Phenotype};

use super::{ExplanationPayload, Narrative};

/// Fallback explanation of a finding.
///
/// A fixed set of gene/drug/phenotype combinations has specific texts; all
/// others use a template that names gene, drug and risk label verbatim.
pub fn explain(payload: &ExplanationPayload) -> Narrative {
    specific(payload).unwrap_or_else(|| generic(payload))
}

/// Explanation when no relevant gene carries variants.
pub fn no_target_variants(drug: &str) -> Narrative {
    Narrative {
        clinical_text: format!(
            "Patient VCF does not contain variants in genes related to {drug} metabolism. \
             Pharmacogenomic profile is typical and standard dosing protocols are appropriate. \
             Regular clinical monitoring is recommended as with all medications."
        ),
        patient_text: format!(
            "Your genetic test shows you process {drug} like most people. Your doctor can \
             prescribe the standard dose."
        ),
    }
}

fn variants(payload: &ExplanationPayload) -> String {
    if payload.rsids.is_empty() {
        "none reported".to_string()
    } else {
        payload.rsids.iter().join(", ")
    }
}

fn specific(payload: &ExplanationPayload) -> Option<Narrative> {
    let ExplanationPayload {
        gene,
        drug,
        diplotype,
        ..
    } = payload;
    let variants = variants(payload);

    let (clinical_text, patient_text) = match (*gene, drug.as_str(), payload.phenotype) {
        (Gene::Cyp2d6, "CODEINE", Phenotype::Pm) => (
            format!(
                "Patient carries the {diplotype} genotype resulting in a poor metabolizer (PM) \
                 phenotype for {gene}. CYP2D6 O-demethylates codeine to morphine and PM \
                 individuals have absent or severely reduced enzyme activity. Detected \
                 variants {variants} are loss-of-function alleles. CPIC recommends avoiding \
                 codeine due to reduced efficacy; consider opioids metabolized by other \
                 pathways."
            ),
            format!(
                "Your body has difficulty converting {drug} into its active form, so the \
                 medicine may not work as intended. Your doctor will likely suggest a \
                 different pain reliever that your body can process."
            ),
        ),
        (Gene::Cyp2c19, "CLOPIDOGREL", Phenotype::Pm) => (
            format!(
                "{gene} poor metabolizer phenotype (from the {diplotype} genotype) impairs \
                 activation of the prodrug clopidogrel. Variants {variants} reduce enzyme \
                 function. PM status is associated with reduced platelet inhibition and a \
                 higher risk of stent thrombosis. Use an alternative P2Y12 inhibitor such as \
                 prasugrel or ticagrelor."
            ),
            format!(
                "Your genes make it harder for your body to activate {drug}. Other medicines \
                 work just as well and do not need this step, and your doctor will switch you \
                 to one of those."
            ),
        ),
        (Gene::Cyp2c9, "WARFARIN", Phenotype::Im) => (
            format!(
                "Intermediate metabolizer phenotype for {gene} (from {diplotype}) predicts \
                 higher warfarin exposure and increased bleeding risk. Variants {variants} \
                 reduce CYP2C9 activity. Reduce the initial dose, monitor INR weekly during \
                 the first weeks and consider a pharmacogenetic dosing algorithm."
            ),
            format!(
                "Your body clears {drug} more slowly than average, so the medicine can build \
                 up. Your doctor will start you on a lower dose and check your blood more \
                 often."
            ),
        ),
        (Gene::Tpmt, "AZATHIOPRINE", Phenotype::Pm) => (
            format!(
                "TPMT poor metabolizer genotype ({diplotype}) with variants {variants} confers \
                 severe thiopurine methyltransferase deficiency. CPIC recommends avoiding \
                 azathioprine because thioguanine nucleotides accumulate and cause \
                 life-threatening myelosuppression. Use an alternative immunosuppressant."
            ),
            format!(
                "Your body cannot safely break down {drug}. The medicine could build up and \
                 harm your bone marrow, so do not take it. Your doctor will prescribe a \
                 different medicine."
            ),
        ),
        (Gene::Dpyd, "FLUOROURACIL", Phenotype::PoorMetabolizer) => (
            format!(
                "DPYD deficiency from the {diplotype} genotype (variants: {variants}) \
                 profoundly impairs dihydropyrimidine dehydrogenase. Fluoropyrimidine \
                 chemotherapy is contraindicated because of the risk of severe, \
                 life-threatening toxicity. An alternative regimen is required."
            ),
            format!(
                "{drug} is not safe for you. Your body cannot break this cancer medicine down \
                 and it would cause severe side effects. Please discuss alternatives with \
                 your oncology team."
            ),
        ),
        _ => return None,
    };

    Some(Narrative {
        clinical_text,
        patient_text,
    })
}

fn generic(payload: &ExplanationPayload) -> Narrative {
    let ExplanationPayload {
        gene,
        drug,
        phenotype,
        risk_label,
        diplotype,
        ..
    } = payload;
    let variants = variants(payload);

    Narrative {
        clinical_text: format!(
            "Patient pharmacogenomic profile: {phenotype} phenotype for {gene} ({diplotype}). \
             Detected variants: {variants}. This phenotype affects {drug} metabolism. Risk \
             assessment: {risk_label}. Consult CPIC guidelines and a clinical pharmacist for \
             dosing and monitoring."
        ),
        patient_text: format!(
            "Your {gene} test shows your body processes {drug} differently ({phenotype}). \
             Result: {risk_label}. Talk to your doctor about what this means for your \
             treatment."
        ),
    }
}

#[cfg(test)]
mod test {
    use strum::IntoEnumIterator as _;

    use crate::pgx::ds::RiskLabel;

    use super::*;

    fn payload(gene: Gene, drug: &str, phenotype: Phenotype) -> ExplanationPayload {
        ExplanationPayload {
            gene,
            drug: drug.to_string(),
            phenotype,
            risk_label: RiskLabel::Toxic,
            diplotype: "*2/*2".to_string(),
            rsids: vec!["rs1799853".to_string()],
            current_dose: None,
        }
    }

    #[rstest::rstest]
    #[case(Gene::Cyp2d6, "CODEINE", Phenotype::Pm)]
    #[case(Gene::Cyp2c19, "CLOPIDOGREL", Phenotype::Pm)]
    #[case(Gene::Cyp2c9, "WARFARIN", Phenotype::Im)]
    #[case(Gene::Tpmt, "AZATHIOPRINE", Phenotype::Pm)]
    #[case(Gene::Dpyd, "FLUOROURACIL", Phenotype::PoorMetabolizer)]
    fn specific_texts(#[case] gene: Gene, #[case] drug: &str, #[case] phenotype: Phenotype) {
        let payload = payload(gene, drug, phenotype);

        let res = explain(&payload);

        assert_ne!(res, generic(&payload));
        assert!(res.clinical_text.contains("*2/*2"), "{}", &res.clinical_text);
        assert!(res.clinical_text.contains("rs1799853"), "{}", &res.clinical_text);
        assert!(!res.patient_text.is_empty());
    }

    /// The generic template names gene, drug and risk label verbatim.
    #[test]
    fn generic_template_tokens() {
        for gene in Gene::iter() {
            for phenotype in Phenotype::iter() {
                for risk_label in RiskLabel::iter() {
                    let payload = ExplanationPayload {
                        risk_label,
                        ..payload(gene, "Tramadol", phenotype)
                    };

                    let res = explain(&payload);

                    for text in [&res.clinical_text, &res.patient_text] {
                        assert!(text.contains(&gene.to_string()), "{}", text);
                        assert!(text.contains("Tramadol"), "{}", text);
                        assert!(text.contains(&risk_label.to_string()), "{}", text);
                    }
                }
            }
        }
    }

    #[test]
    fn generic_snapshot() {
        let payload = ExplanationPayload {
            risk_label: RiskLabel::AdjustDosage,
            ..payload(Gene::Cyp2c9, "PHENYTOIN", Phenotype::Im)
        };

        let res = explain(&payload);

        insta::assert_snapshot!(
            res.patient_text,
            @"Your CYP2C9 test shows your body processes PHENYTOIN differently (IM). Result: Adjust Dosage. Talk to your doctor about what this means for your treatment."
        );
    }

    #[test]
    fn no_target_names_drug() {
        let res = no_target_variants("SIMVASTATIN");

        assert!(res.clinical_text.contains("SIMVASTATIN"));
        assert!(res.patient_text.contains("SIMVASTATIN"));
    }
}
