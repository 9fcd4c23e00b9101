//! Shared data structures for `pgx`.

/// Function/metabolizer phenotype.
///
/// Generic metabolizer genes use the abbreviated states, SLCO1B1 uses the
/// transporter function states and DPYD the spelled-out metabolizer states.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    serde::Deserialize,
    serde::Serialize,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
)]
pub enum Phenotype {
    /// Poor metabolizer.
    #[serde(rename = "PM")]
    #[strum(serialize = "PM")]
    Pm,
    /// Intermediate metabolizer.
    #[serde(rename = "IM")]
    #[strum(serialize = "IM")]
    Im,
    /// Normal metabolizer.
    #[serde(rename = "NM")]
    #[strum(serialize = "NM")]
    Nm,
    /// Rapid metabolizer.
    #[serde(rename = "RM")]
    #[strum(serialize = "RM")]
    Rm,
    /// Ultra-rapid metabolizer.
    #[serde(rename = "URM")]
    #[strum(serialize = "URM")]
    Urm,
    /// DPYD poor metabolizer.
    #[serde(rename = "Poor Metabolizer")]
    #[strum(serialize = "Poor Metabolizer")]
    PoorMetabolizer,
    /// DPYD intermediate metabolizer.
    #[serde(rename = "Intermediate Metabolizer")]
    #[strum(serialize = "Intermediate Metabolizer")]
    IntermediateMetabolizer,
    /// DPYD normal metabolizer.
    #[serde(rename = "Normal Metabolizer")]
    #[strum(serialize = "Normal Metabolizer")]
    NormalMetabolizer,
    /// SLCO1B1 normal function.
    #[serde(rename = "Normal function")]
    #[strum(serialize = "Normal function")]
    NormalFunction,
    /// SLCO1B1 decreased function.
    #[serde(rename = "Decreased function")]
    #[strum(serialize = "Decreased function")]
    DecreasedFunction,
    /// SLCO1B1 low function.
    #[serde(rename = "Low function")]
    #[strum(serialize = "Low function")]
    LowFunction,
    /// Could not be determined.
    #[serde(rename = "Unknown")]
    #[strum(serialize = "Unknown")]
    Unknown,
}

/// Risk category of a gene/drug/phenotype combination.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    serde::Deserialize,
    serde::Serialize,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
)]
pub enum RiskLabel {
    /// Standard use.
    #[serde(rename = "Safe")]
    #[strum(serialize = "Safe")]
    Safe,
    /// Dose adjustment needed.
    #[serde(rename = "Adjust Dosage")]
    #[strum(serialize = "Adjust Dosage")]
    AdjustDosage,
    /// Risk of toxicity.
    #[serde(rename = "Toxic")]
    #[strum(serialize = "Toxic")]
    Toxic,
    /// Reduced or absent efficacy.
    #[serde(rename = "Ineffective")]
    #[strum(serialize = "Ineffective")]
    Ineffective,
    /// Insufficient data.
    #[serde(rename = "Unknown")]
    #[strum(serialize = "Unknown")]
    Unknown,
}

/// Severity of a risk; ordered from `None` to `Critical`.
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
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Severity {
    /// No clinical concern.
    None = 0,
    /// Low.
    Low = 1,
    /// Moderate.
    Moderate = 2,
    /// High.
    High = 3,
    /// Critical.
    Critical = 4,
}

impl Severity {
    /// Ordinal score from 0 (`none`) to 4 (`critical`).
    pub fn score(self) -> u8 {
        self as u8
    }
}

/// Phenotype with the confidence of its inference.
#[derive(Debug, Clone, Copy, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct PhenotypeCall {
    /// Inferred phenotype.
    pub phenotype: Phenotype,
    /// Confidence in `[0, 1]`.
    pub confidence: f64,
}

impl PhenotypeCall {
    /// Construct a new call.
    pub const fn new(phenotype: Phenotype, confidence: f64) -> Self {
        Self {
            phenotype,
            confidence,
        }
    }

    /// `Unknown` call for a diplotype no model could resolve.
    pub const fn unresolved() -> Self {
        Self::new(Phenotype::Unknown, 0.5)
    }

    /// `Unknown` call for missing or malformed diplotype input.
    pub const fn missing_input() -> Self {
        Self::new(Phenotype::Unknown, 0.3)
    }
}

#[cfg(test)]
mod test {
    use strum::IntoEnumIterator as _;

    use super::*;

    #[test]
    fn severity_scores_are_ordinal() {
        let scores = Severity::iter().map(Severity::score).collect::<Vec<_>>();
        assert_eq!(scores, vec![0, 1, 2, 3, 4]);
        assert!(Severity::Critical > Severity::High);
    }

    #[test]
    fn labels_roundtrip_through_strings() -> Result<(), anyhow::Error> {
        for phenotype in Phenotype::iter() {
            assert_eq!(phenotype.to_string().parse::<Phenotype>()?, phenotype);
        }
        assert_eq!("Adjust Dosage".parse::<RiskLabel>()?, RiskLabel::AdjustDosage);
        assert_eq!(Severity::Critical.to_string(), "critical");
        assert_eq!(
            serde_json::to_string(&Phenotype::LowFunction)?,
            "\"Low function\""
        );

        Ok(())
    }
}
