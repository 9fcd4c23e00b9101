//! Star allele definitions by rsid.
//!
//! Each row states that `rsid` is consistent with `star_allele` of `gene`.
//! Rows with `infers` set are used to infer the star allele from a detected
//! rsid when the VCF carries no explicit annotation.

use std::path::Path;

use rustc_hash::{FxHashMap, FxHashSet};

use crate::common::Gene;

/// The embedded default table.
const EMBEDDED: &str = include_str!("tables/allele_definitions.tsv");

/// One row of the allele definition table.
#[derive(Debug, Clone, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
pub struct AlleleDefinition {
    /// Gene symbol.
    pub gene: Gene,
    /// Star allele, e.g., `*4`.
    pub star_allele: String,
    /// rsid consistent with the star allele.
    pub rsid: String,
    /// Whether detecting `rsid` implies `star_allele`.
    pub infers: bool,
}

/// Facade struct for star allele/rsid lookups.
#[derive(Debug, Clone, Default)]
pub struct Data {
    /// The allele definitions.
    definitions: Vec<AlleleDefinition>,
    /// Allowed rsids by gene and star allele.
    allowed: FxHashMap<Gene, FxHashMap<String, FxHashSet<String>>>,
    /// Star allele inferred from rsid, by gene.
    inference: FxHashMap<Gene, FxHashMap<String, String>>,
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
    /// Fails if one rsid infers two different star alleles of the same gene.
    pub fn new(definitions: Vec<AlleleDefinition>) -> Result<Self, anyhow::Error> {
        let mut allowed: FxHashMap<Gene, FxHashMap<String, FxHashSet<String>>> =
            FxHashMap::default();
        let mut inference: FxHashMap<Gene, FxHashMap<String, String>> = FxHashMap::default();
        for def in &definitions {
            allowed
                .entry(def.gene)
                .or_default()
                .entry(def.star_allele.clone())
                .or_default()
                .insert(def.rsid.clone());
            if def.infers {
                let by_rsid = inference.entry(def.gene).or_default();
                if let Some(previous) = by_rsid.insert(def.rsid.clone(), def.star_allele.clone()) {
                    if previous != def.star_allele {
                        anyhow::bail!(
                            "{} {} infers both {} and {}",
                            def.gene,
                            def.rsid,
                            previous,
                            def.star_allele
                        );
                    }
                }
            }
        }

        Ok(Self {
            definitions,
            allowed,
            inference,
        })
    }

    /// Number of definitions.
    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    /// Whether there are no definitions.
    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// Star allele implied by detecting `rsid` in `gene`, if any.
    pub fn infer_star_allele(&self, gene: Gene, rsid: &str) -> Option<&str> {
        self.inference
            .get(&gene)
            .and_then(|by_rsid| by_rsid.get(rsid))
            .map(String::as_str)
    }

    /// Whether `rsid` is consistent with `star_allele` of `gene`.
    ///
    /// Star alleles without any definition (e.g., the reference `*1`) admit
    /// no rsid.
    pub fn is_consistent(&self, gene: Gene, star_allele: &str, rsid: &str) -> bool {
        self.allowed
            .get(&gene)
            .and_then(|by_star| by_star.get(star_allele))
            .map(|rsids| rsids.contains(rsid))
            .unwrap_or(false)
    }

    /// Whether `rsid` defines any star allele of `gene`.
    pub fn is_defining(&self, gene: Gene, rsid: &str) -> bool {
        self.allowed
            .get(&gene)
            .map(|by_star| by_star.values().any(|rsids| rsids.contains(rsid)))
            .unwrap_or(false)
    }
}
