//! Commonly used code.

use clap::Parser;
use clap_verbosity_flag::{InfoLevel, Verbosity};

/// Commonly used command line arguments.
#[derive(Parser, Debug)]
pub struct Args {
    /// Verbosity of the program
    #[clap(flatten)]
    pub verbose: Verbosity<InfoLevel>,
}

/// Pharmacogenes known to the rule tables.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    serde::Deserialize,
    serde::Serialize,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
)]
pub enum Gene {
    /// Cytochrome P450 2D6.
    #[serde(rename = "CYP2D6")]
    #[strum(serialize = "CYP2D6")]
    Cyp2d6,
    /// Cytochrome P450 2C19.
    #[serde(rename = "CYP2C19")]
    #[strum(serialize = "CYP2C19")]
    Cyp2c19,
    /// Cytochrome P450 2C9.
    #[serde(rename = "CYP2C9")]
    #[strum(serialize = "CYP2C9")]
    Cyp2c9,
    /// Solute carrier organic anion transporter 1B1.
    #[serde(rename = "SLCO1B1")]
    #[strum(serialize = "SLCO1B1")]
    Slco1b1,
    /// Thiopurine S-methyltransferase.
    #[serde(rename = "TPMT")]
    #[strum(serialize = "TPMT")]
    Tpmt,
    /// Dihydropyrimidine dehydrogenase.
    #[serde(rename = "DPYD")]
    #[strum(serialize = "DPYD")]
    Dpyd,
    /// Vitamin K epoxide reductase complex subunit 1.
    ///
    /// Only used for ranking in the warfarin gene priority; VKORC1 records
    /// are not retained by the VCF parser.
    #[serde(rename = "VKORC1")]
    #[strum(serialize = "VKORC1")]
    Vkorc1,
}

/// The pharmacogene allow-list; VCF records of any other gene are dropped.
pub const TARGET_GENES: [Gene; 6] = [
    Gene::Cyp2d6,
    Gene::Cyp2c19,
    Gene::Cyp2c9,
    Gene::Slco1b1,
    Gene::Tpmt,
    Gene::Dpyd,
];

impl Gene {
    /// Return whether the gene is on the pharmacogene allow-list.
    pub fn is_target(self) -> bool {
        TARGET_GENES.contains(&self)
    }

    /// Parse an allow-listed gene symbol, `None` for anything else.
    pub fn target_from_symbol(symbol: &str) -> Option<Gene> {
        symbol
            .trim()
            .parse::<Gene>()
            .ok()
            .filter(|gene| gene.is_target())
    }
}

/// Generate a fresh patient identifier of the form `PAT-XXXXXXXXXXXX`.
///
/// The identifier is drawn from a random 48 bit token and carries no
/// collision-avoidance guarantee beyond that.
pub fn new_patient_id() -> String {
    let token: u64 = rand::random::<u64>() & 0xFFFF_FFFF_FFFF;
    format!("PAT-{token:012X}")
}
