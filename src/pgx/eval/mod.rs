//! Genotype to risk evaluation.
//!
//! The evaluation runs strictly forward: allele call, phenotype, risk and
//! finally the clinical recommendation.  Each step is implemented by a small
//! evaluator borrowing the loaded reference tables from the parent
//! [`Evaluator`].

pub mod allele;
pub mod phenotype;
pub mod recommendation;
pub mod result;
pub mod risk;

use crate::vcf::ds::VariantRecord;

use super::data::{drugs::Drug, Data, Paths};

use self::result::{Evaluation, Finding, NoTargetVariants};

/// Evaluator for pharmacogenomic risk.
#[derive(Debug, Clone)]
pub struct Evaluator {
    /// The reference tables.
    data: Data,
}

impl Evaluator {
    /// Construct from already loaded tables.
    pub fn new(data: Data) -> Self {
        Self { data }
    }

    /// Construct from the given paths, embedded tables where unset.
    ///
    /// # Errors
    ///
    /// If anything goes wrong, it returns a generic `anyhow::Error`.
    pub fn load(paths: &Paths) -> Result<Self, anyhow::Error> {
        let data =
            Data::load(paths).map_err(|e| anyhow::anyhow!("failed to load tables: {}", e))?;

        Ok(Self::new(data))
    }

    /// Return the reference tables.
    pub fn data(&self) -> &Data {
        &self.data
    }

    /// Evaluate the records of one VCF for one drug.
    ///
    /// # Arguments
    ///
    /// * `records` - Parsed records of the allow-listed genes.
    /// * `drug` - The drug to evaluate.
    ///
    /// # Returns
    ///
    /// A finding for the primary gene, or the no-target result if no record
    /// belongs to a gene relevant for `drug`.
    pub fn evaluate(&self, records: &[VariantRecord], drug: &Drug) -> Evaluation {
        let Some(allele_call) = allele::Evaluator::with_parent(self).evaluate(records, drug) else {
            tracing::debug!("no target variants for {}", drug.code());
            return Evaluation::NoTargetVariants(NoTargetVariants {
                drug: drug.code().to_string(),
                recommendation: recommendation::no_target_variants(drug.code()),
            });
        };
        tracing::debug!("allele call = {:?}", &allele_call);

        let phenotype = phenotype::Evaluator::with_parent(self)
            .evaluate(allele_call.gene, &allele_call.diplotype);
        tracing::debug!("phenotype = {:?}", &phenotype);

        let risk = risk::Evaluator::with_parent(self).evaluate(
            allele_call.gene,
            drug.code(),
            phenotype.phenotype,
            &allele_call.rsids,
            allele_call.variant_count,
        );
        tracing::debug!("risk = {:?}", &risk);

        let recommendation =
            recommendation::recommend(risk.gene, &risk.drug, risk.phenotype, risk.risk_label);

        Evaluation::Finding(Finding {
            allele_call,
            phenotype,
            risk,
            recommendation,
        })
    }
}
