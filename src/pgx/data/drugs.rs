//! Supported drug catalog and drug selection.

use clap::Parser;
use itertools::Itertools as _;

use crate::common::{Gene, TARGET_GENES};

/// Catalog entry of a supported drug.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct DrugInfo {
    /// Drug code, e.g., `WARFARIN`.
    pub code: &'static str,
    /// Display name.
    pub name: &'static str,
    /// Therapeutic category.
    pub category: &'static str,
    /// Pharmacogenes relevant for the drug.
    pub genes: &'static [Gene],
    /// Preferred order when more than one relevant gene carries variants.
    #[serde(skip)]
    pub gene_priority: &'static [Gene],
    /// Short description.
    pub description: &'static str,
}

/// The supported drugs.
pub const CATALOG: &[DrugInfo] = &[
    DrugInfo {
        code: "CODEINE",
        name: "Codeine",
        category: "Analgesic (Opioid)",
        genes: &[Gene::Cyp2d6],
        gene_priority: &[],
        description: "Opioid pain reliever",
    },
    DrugInfo {
        code: "WARFARIN",
        name: "Warfarin",
        category: "Anticoagulant",
        genes: &[Gene::Cyp2c19, Gene::Cyp2c9],
        gene_priority: &[Gene::Cyp2c9, Gene::Vkorc1, Gene::Cyp2c19],
        description: "Blood thinner for stroke/clot prevention",
    },
    DrugInfo {
        code: "CLOPIDOGREL",
        name: "Clopidogrel (Plavix)",
        category: "Antiplatelet",
        genes: &[Gene::Cyp2c19],
        gene_priority: &[],
        description: "Antiplatelet agent for cardiovascular events",
    },
    DrugInfo {
        code: "SIMVASTATIN",
        name: "Simvastatin",
        category: "Statin (Lipid-Lowering)",
        genes: &[Gene::Slco1b1],
        gene_priority: &[],
        description: "Cholesterol management",
    },
    DrugInfo {
        code: "AZATHIOPRINE",
        name: "Azathioprine",
        category: "Immunosuppressant",
        genes: &[Gene::Tpmt],
        gene_priority: &[],
        description: "Immune system suppressor for autoimmune conditions",
    },
    DrugInfo {
        code: "FLUOROURACIL",
        name: "Fluorouracil (5-FU)",
        category: "Chemotherapy",
        genes: &[Gene::Dpyd],
        gene_priority: &[],
        description: "Anticancer agent",
    },
    DrugInfo {
        code: "METOPROLOL",
        name: "Metoprolol",
        category: "Beta-Blocker",
        genes: &[Gene::Cyp2d6],
        gene_priority: &[],
        description: "Blood pressure & heart rate control",
    },
    DrugInfo {
        code: "ATENOLOL",
        name: "Atenolol",
        category: "Beta-Blocker",
        genes: &[Gene::Cyp2d6],
        gene_priority: &[],
        description: "Hypertension and angina management",
    },
    DrugInfo {
        code: "SERTRALINE",
        name: "Sertraline (Zoloft)",
        category: "SSRI (Antidepressant)",
        genes: &[Gene::Cyp2d6, Gene::Cyp2c19],
        gene_priority: &[Gene::Cyp2c19, Gene::Cyp2d6],
        description: "Depression and anxiety treatment",
    },
    DrugInfo {
        code: "ESCITALOPRAM",
        name: "Escitalopram (Lexapro)",
        category: "SSRI (Antidepressant)",
        genes: &[Gene::Cyp2c19],
        gene_priority: &[],
        description: "Depression and anxiety management",
    },
    DrugInfo {
        code: "TOPIRAMATE",
        name: "Topiramate (Topamax)",
        category: "Anticonvulsant",
        genes: &[Gene::Cyp2d6],
        gene_priority: &[],
        description: "Seizure control and migraine prevention",
    },
    DrugInfo {
        code: "PHENYTOIN",
        name: "Phenytoin (Dilantin)",
        category: "Anticonvulsant",
        genes: &[Gene::Cyp2c19, Gene::Cyp2c9],
        gene_priority: &[Gene::Cyp2c9, Gene::Cyp2c19],
        description: "Seizure prevention",
    },
];

/// Errors on drug selection.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The drug name is empty or contains unsupported characters.
    #[error("invalid drug selection: {0:?}")]
    InvalidDrug(String),
}

/// A selected drug.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Drug {
    /// Drug from the catalog.
    Catalog(&'static DrugInfo),
    /// Free-text drug, normalized to title case.
    Custom(String),
}

impl Drug {
    /// Drug code used for rule lookups and reports.
    pub fn code(&self) -> &str {
        match self {
            Drug::Catalog(info) => info.code,
            Drug::Custom(name) => name,
        }
    }

    /// Relevant genes; custom drugs use the full pharmacogene set.
    pub fn genes(&self) -> &'static [Gene] {
        match self {
            Drug::Catalog(info) => info.genes,
            Drug::Custom(_) => &TARGET_GENES,
        }
    }

    /// Gene priority order, empty if first-seen order applies.
    pub fn gene_priority(&self) -> &'static [Gene] {
        match self {
            Drug::Catalog(info) => info.gene_priority,
            Drug::Custom(_) => &[],
        }
    }

    /// Parse one drug selection.
    ///
    /// Catalog codes match case-insensitively; other names consisting of
    /// letters, digits, spaces, `-` and `/` become custom drugs.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidDrug` for empty names or other characters.
    pub fn parse(value: &str) -> Result<Self, Error> {
        let value = value.trim();
        if value.is_empty() {
            return Err(Error::InvalidDrug(value.to_string()));
        }
        if let Some(info) = CATALOG
            .iter()
            .find(|info| info.code.eq_ignore_ascii_case(value))
        {
            return Ok(Drug::Catalog(info));
        }
        let valid = value
            .chars()
            .all(|c| c.is_alphanumeric() || c == ' ' || c == '-' || c == '/');
        if valid {
            Ok(Drug::Custom(title_case(value)))
        } else {
            Err(Error::InvalidDrug(value.to_string()))
        }
    }

    /// Parse a comma-separated selection, dropping duplicates in order.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidDrug` for the first invalid entry.
    pub fn parse_list(value: &str) -> Result<Vec<Self>, Error> {
        let drugs = value
            .split(',')
            .map(Drug::parse)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(drugs
            .into_iter()
            .unique_by(|drug| drug.code().to_string())
            .collect())
    }
}

/// Title-case every whitespace-separated word, collapsing inner whitespace.
fn title_case(value: &str) -> String {
    value
        .split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first
                    .to_uppercase()
                    .chain(chars.flat_map(char::to_lowercase))
                    .collect::<String>(),
                None => String::new(),
            }
        })
        .join(" ")
}

/// Command line arguments for `drugs` command.
#[derive(Parser, Debug)]
#[command(about = "List the supported drugs", long_about = None)]
pub struct Args {}

/// Catalog listing as printed by the `drugs` command.
#[derive(Debug, serde::Serialize)]
struct Listing {
    /// All drugs.
    drugs: &'static [DrugInfo],
    /// Number of drugs.
    count: usize,
    /// Distinct categories in catalog order.
    categories: Vec<&'static str>,
}

/// Main entry point for the `drugs` command.
///
/// # Errors
///
/// If anything goes wrong, it returns a generic `anyhow::Error`.
pub fn run(common_args: &crate::common::Args, args: &Args) -> Result<(), anyhow::Error> {
    tracing::info!("  running command `drugs`");
    tracing::info!("  common_args = {:?}", &common_args);
    tracing::info!("  args = {:?}", &args);

    let listing = Listing {
        drugs: CATALOG,
        count: CATALOG.len(),
        categories: CATALOG.iter().map(|info| info.category).unique().collect(),
    };
    println!("{}", serde_json::to_string_pretty(&listing)?);

    Ok(())
}
