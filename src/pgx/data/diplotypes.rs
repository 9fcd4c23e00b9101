//! Diplotype to phenotype tables.
//!
//! Rows with an empty `gene` column form the generic pair table.  Rows with a
//! gene only add pairs the generic table does not list, and form the whole
//! table of SLCO1B1.

use std::path::Path;

use rustc_hash::FxHashMap;

use crate::{
    common::Gene,
    pgx::ds::{Phenotype, PhenotypeCall},
};

/// The embedded default table.
const EMBEDDED: &str = include_str!("tables/diplotype_phenotypes.tsv");

/// One row of the diplotype table.
#[derive(Debug, Clone, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct DiplotypePhenotype {
    /// Gene symbol; `None` for the generic table.
    pub gene: Option<Gene>,
    /// Diplotype as `allele/allele`.
    pub diplotype: String,
    /// Phenotype of the diplotype.
    pub phenotype: Phenotype,
    /// Confidence in `[0, 1]`.
    pub confidence: f64,
}

/// Split `allele/allele` at the first `/` into two trimmed, non-empty alleles.
pub fn split_diplotype(diplotype: &str) -> Option<(&str, &str)> {
    let (left, right) = diplotype.split_once('/')?;
    let (left, right) = (left.trim(), right.trim());
    if left.is_empty() || right.is_empty() {
        None
    } else {
        Some((left, right))
    }
}

/// Normalize an allele pair into lexicographic order, joined by `/`.
pub fn normalize_pair(left: &str, right: &str) -> String {
    if left <= right {
        format!("{left}/{right}")
    } else {
        format!("{right}/{left}")
    }
}

/// Facade struct for diplotype lookups.
#[derive(Debug, Clone, Default)]
pub struct Data {
    /// Gene-specific tables keyed by normalized diplotype.
    by_gene: FxHashMap<Gene, FxHashMap<String, PhenotypeCall>>,
    /// Generic table keyed by normalized diplotype.
    generic: FxHashMap<String, PhenotypeCall>,
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

    /// Create a new `Data` object, normalizing all diplotype keys.
    ///
    /// # Errors
    ///
    /// Fails on malformed diplotypes, confidences outside `[0, 1]`, or two
    /// rows for the same normalized diplotype.
    pub fn new(rows: Vec<DiplotypePhenotype>) -> Result<Self, anyhow::Error> {
        let mut result = Self::default();
        for row in rows {
            let (left, right) = split_diplotype(&row.diplotype)
                .ok_or_else(|| anyhow::anyhow!("malformed diplotype: {:?}", &row.diplotype))?;
            if !(0.0..=1.0).contains(&row.confidence) {
                anyhow::bail!("confidence out of range for {:?}", &row);
            }
            let key = normalize_pair(left, right);
            let table = match row.gene {
                Some(gene) => result.by_gene.entry(gene).or_default(),
                None => &mut result.generic,
            };
            let call = PhenotypeCall::new(row.phenotype, row.confidence);
            if table.insert(key.clone(), call).is_some() {
                anyhow::bail!("duplicate diplotype {} for {:?}", key, row.gene);
            }
        }

        Ok(result)
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.generic.len() + self.by_gene.values().map(FxHashMap::len).sum::<usize>()
    }

    /// Whether there are no rows.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Look up a normalized diplotype in the table of `gene` only.
    pub fn by_gene(&self, gene: Gene, normalized: &str) -> Option<PhenotypeCall> {
        self.by_gene
            .get(&gene)
            .and_then(|table| table.get(normalized))
            .copied()
    }

    /// Look up a normalized diplotype in the generic table.
    pub fn generic(&self, normalized: &str) -> Option<PhenotypeCall> {
        self.generic.get(normalized).copied()
    }
}
