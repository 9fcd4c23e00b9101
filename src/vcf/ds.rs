//! Shared data structures for `vcf`.

use std::collections::BTreeMap;

use crate::common::Gene;

/// Value of one INFO entry.
#[derive(Debug, Clone, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
#[serde(untagged)]
pub enum InfoValue {
    /// Bare flag without `=`.
    Flag(bool),
    /// `KEY=VALUE` entry.
    Value(String),
}

impl InfoValue {
    /// Return the string value, `None` for flags.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            InfoValue::Flag(_) => None,
            InfoValue::Value(value) => Some(value.as_str()),
        }
    }
}

/// One VCF data line of an allow-listed pharmacogene.
#[derive(Debug, Clone, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct VariantRecord {
    /// Chromosome name.
    pub chrom: String,
    /// 1-based position.
    pub pos: u64,
    /// Value of the ID column, `None` for `.`.
    pub id: Option<String>,
    /// Reference allele.
    pub reference: String,
    /// Alternate allele(s).
    pub alternative: String,
    /// Variant quality, `None` for `.` or unparseable values.
    pub qual: Option<f64>,
    /// Filter status.
    pub filter: String,
    /// Gene symbol from the `GENE` INFO key.
    pub gene: Gene,
    /// rsid from the `RS` INFO key, or the ID column when it is an rsid.
    pub rsid: Option<String>,
    /// Star allele annotation from the `STAR` INFO key.
    pub star: Option<String>,
    /// All INFO entries.
    pub info: BTreeMap<String, InfoValue>,
}

/// Result of parsing VCF text.
#[derive(Debug, Clone, Default, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct ParsedVcf {
    /// Value of the `##fileformat` declaration, e.g., `VCFv4.2`.
    pub fileformat: String,
    /// Retained records in file order.
    pub records: Vec<VariantRecord>,
    /// Distinct genes in order of first appearance.
    pub genes: Vec<Gene>,
}
