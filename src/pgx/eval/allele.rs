//! Star allele calling for the primary gene of a drug.

use itertools::Itertools as _;

use crate::{common::Gene, pgx::data::drugs::Drug, vcf::ds::VariantRecord};

use super::result::AlleleCall;

/// Star allele assumed when neither annotation nor inference yields one.
pub const REFERENCE_ALLELE: &str = "*1";

/// Selects the primary gene of a drug and calls its star allele.
///
/// The diplotype is always homozygous: a single detected allele is never
/// turned into a heterozygous call.
pub struct Evaluator<'a> {
    /// The parent evaluator.
    parent: &'a super::Evaluator,
}

impl<'a> Evaluator<'a> {
    /// Create a new `Evaluator`.
    pub fn with_parent(parent: &'a super::Evaluator) -> Self {
        Self { parent }
    }

    /// Call the star allele of the primary gene for `drug`.
    ///
    /// # Arguments
    ///
    /// * `records` - Parsed records in file order.
    /// * `drug` - The drug to evaluate.
    ///
    /// # Returns
    ///
    /// The allele call, or `None` if no record belongs to a gene relevant for
    /// `drug`.
    pub fn evaluate(&self, records: &[VariantRecord], drug: &Drug) -> Option<AlleleCall> {
        let relevant = records
            .iter()
            .filter(|record| drug.genes().contains(&record.gene))
            .collect::<Vec<_>>();
        let gene = primary_gene(&relevant, drug.gene_priority())?;
        let gene_records = relevant
            .into_iter()
            .filter(|record| record.gene == gene)
            .collect::<Vec<_>>();
        let variant_count = gene_records.len();

        let alleles = &self.parent.data().alleles;
        let calling_records = if gene == Gene::Cyp2c9 {
            gene_records
                .into_iter()
                .filter(|record| {
                    record
                        .rsid
                        .as_deref()
                        .is_some_and(|rsid| alleles.is_defining(gene, rsid))
                })
                .collect::<Vec<_>>()
        } else {
            gene_records
        };
        tracing::trace!(
            "{} of {} {} records used for calling",
            calling_records.len(),
            variant_count,
            gene
        );

        let star_allele = self.star_allele(gene, &calling_records);
        let rsids = calling_records
            .iter()
            .filter_map(|record| record.rsid.as_deref())
            .unique()
            .filter(|rsid| {
                let consistent = alleles.is_consistent(gene, &star_allele, rsid);
                if !consistent {
                    tracing::debug!("dropping {} inconsistent with {} {}", rsid, gene, star_allele);
                }
                consistent
            })
            .map(str::to_string)
            .collect::<Vec<_>>();

        Some(AlleleCall {
            gene,
            diplotype: format!("{star_allele}/{star_allele}"),
            star_allele,
            rsids,
            variant_count,
        })
    }

    /// First explicit `STAR` annotation, else the allele inferred from the
    /// first rsid with an inference entry, else the reference allele.
    fn star_allele(&self, gene: Gene, records: &[&VariantRecord]) -> String {
        let explicit = records
            .iter()
            .filter_map(|record| record.star.as_deref())
            .map(str::trim)
            .find(|star| !star.is_empty());
        if let Some(star) = explicit {
            return star.to_string();
        }

        records
            .iter()
            .filter_map(|record| record.rsid.as_deref())
            .find_map(|rsid| self.parent.data().alleles.infer_star_allele(gene, rsid))
            .unwrap_or(REFERENCE_ALLELE)
            .to_string()
    }
}

/// Pick the gene of `records` ranked first in `priority`.
///
/// Genes missing from `priority` rank after the listed ones; ties keep the
/// order of first appearance.
fn primary_gene(records: &[&VariantRecord], priority: &[Gene]) -> Option<Gene> {
    records
        .iter()
        .map(|record| record.gene)
        .unique()
        .min_by_key(|gene| {
            priority
                .iter()
                .position(|listed| listed == gene)
                .unwrap_or(priority.len())
        })
}
