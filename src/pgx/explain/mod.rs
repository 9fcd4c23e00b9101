//! Clinician and patient explanations of a finding.
//!
//! Narrative text comes from an external [`NarrativeGenerator`] when one is
//! configured.  Any generator failure falls back to deterministic texts.

pub mod command;
pub mod fallback;

use crate::{
    common::Gene,
    pgx::ds::{Phenotype, RiskLabel},
};

use super::eval::result::Finding;

/// Input of the narrative generator.
#[derive(Debug, Clone, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct ExplanationPayload {
    /// The primary gene.
    pub gene: Gene,
    /// Drug code.
    pub drug: String,
    /// Phenotype.
    pub phenotype: Phenotype,
    /// Risk label.
    pub risk_label: RiskLabel,
    /// Diplotype as `allele/allele`.
    pub diplotype: String,
    /// Reported rsids.
    pub rsids: Vec<String>,
    /// Current dose, if given.
    pub current_dose: Option<String>,
}

impl ExplanationPayload {
    /// Build the payload of a finding.
    pub fn new(finding: &Finding, current_dose: Option<&str>) -> Self {
        Self {
            gene: finding.allele_call.gene,
            drug: finding.risk.drug.clone(),
            phenotype: finding.risk.phenotype,
            risk_label: finding.risk.risk_label,
            diplotype: finding.allele_call.diplotype.clone(),
            rsids: finding.allele_call.rsids.clone(),
            current_dose: current_dose.map(str::to_string),
        }
    }

    /// Star allele cited in the explanation, the first allele of the diplotype.
    pub fn cited_star_allele(&self) -> &str {
        self.diplotype
            .split('/')
            .next()
            .map(str::trim)
            .unwrap_or_default()
    }

    /// rsid cited in the explanation, the first reported one.
    pub fn cited_rsid(&self) -> Option<&str> {
        self.rsids.first().map(String::as_str)
    }
}

/// Clinician and patient text.
#[derive(Debug, Clone, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
pub struct Narrative {
    /// Text for the clinician.
    pub clinical_text: String,
    /// Text for the patient.
    pub patient_text: String,
}

/// Errors of a narrative generator.
///
/// These never reach the caller of [`Adapter::explain`].
#[derive(thiserror::Error, Debug)]
pub enum GeneratorError {
    /// The generator is not usable, e.g., misconfigured.
    #[error("narrative generator unavailable: {0}")]
    Unavailable(String),
    /// The generator process could not be started.
    #[error("could not start narrative generator: {0}")]
    Spawn(#[source] std::io::Error),
    /// Communication with the generator failed.
    #[error("I/O error with narrative generator: {0}")]
    Io(#[from] std::io::Error),
    /// The generator did not finish in time.
    #[error("narrative generator timed out after {0:?}")]
    Timeout(std::time::Duration),
    /// The generator exited unsuccessfully.
    #[error("narrative generator failed with {0}")]
    Failed(std::process::ExitStatus),
    /// The generator response is not valid JSON of the expected shape.
    #[error("invalid narrative generator response: {0}")]
    Json(#[from] serde_json::Error),
    /// The generator returned an empty text.
    #[error("narrative generator returned empty text")]
    EmptyText,
}

/// An external producer of narrative text.
pub trait NarrativeGenerator {
    /// Generate the clinician and patient text for `payload`.
    ///
    /// # Errors
    ///
    /// Any `GeneratorError`; the caller falls back to deterministic text.
    fn generate(&self, payload: &ExplanationPayload) -> Result<Narrative, GeneratorError>;
}

/// Produces explanations, delegating to a generator if one is configured.
#[derive(Default)]
pub struct Adapter {
    /// The generator, `None` to always use the fallback texts.
    generator: Option<Box<dyn NarrativeGenerator + Send + Sync>>,
}

impl std::fmt::Debug for Adapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Adapter")
            .field("generator", &self.generator.is_some())
            .finish()
    }
}

impl Adapter {
    /// Create an adapter delegating to `generator`.
    pub fn with_generator(generator: Box<dyn NarrativeGenerator + Send + Sync>) -> Self {
        Self {
            generator: Some(generator),
        }
    }

    /// Create an adapter that always uses the fallback texts.
    pub fn without_generator() -> Self {
        Self::default()
    }

    /// Explain the finding described by `payload`.
    ///
    /// Both returned texts are non-empty.  Generator output additionally
    /// cites the star allele and rsid of the call verbatim.  The generator
    /// is tried at most once.
    pub fn explain(&self, payload: &ExplanationPayload) -> Narrative {
        let Some(generator) = &self.generator else {
            tracing::debug!("no narrative generator configured, using fallback text");
            return fallback::explain(payload);
        };

        match generator.generate(payload).and_then(non_empty) {
            Ok(narrative) => Narrative {
                clinical_text: cite(
                    &narrative.clinical_text,
                    payload.cited_star_allele(),
                    payload.cited_rsid(),
                ),
                patient_text: narrative.patient_text,
            },
            Err(e) => {
                tracing::warn!("{}, using fallback text", e);
                fallback::explain(payload)
            }
        }
    }
}

/// Reject narratives with an empty text.
fn non_empty(narrative: Narrative) -> Result<Narrative, GeneratorError> {
    if narrative.clinical_text.trim().is_empty() || narrative.patient_text.trim().is_empty() {
        Err(GeneratorError::EmptyText)
    } else {
        Ok(narrative)
    }
}

/// Whether `text` names `token` as a whole word.
///
/// An alphanumeric edge of `token` must not continue into an alphanumeric
/// character or `_`, so `*4` is not found in `*41` and `rs123` is not found
/// in `rs1234`.
fn mentions(text: &str, token: &str) -> bool {
    let continues = |c: Option<char>| c.is_some_and(|c| c.is_alphanumeric() || c == '_');
    let check_before = token.starts_with(char::is_alphanumeric);
    let check_after = token.ends_with(char::is_alphanumeric);

    !token.is_empty()
        && text.match_indices(token).any(|(start, _)| {
            let before = text[..start].chars().next_back();
            let after = text[start + token.len()..].chars().next();
            !(check_before && continues(before)) && !(check_after && continues(after))
        })
}

/// Append a citation of `star_allele` and `rsid` unless `text` names both.
pub fn cite(text: &str, star_allele: &str, rsid: Option<&str>) -> String {
    let cited =
        mentions(text, star_allele) && rsid.map_or(true, |rsid| mentions(text, rsid));
    if cited {
        return text.to_string();
    }

    let text = text.trim_end();
    match rsid {
        Some(rsid) => format!("{text} Cited genotype evidence: {star_allele} ({rsid})."),
        None => format!("{text} Cited genotype evidence: {star_allele}."),
    }
}

#[cfg(test)]
mod test {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    /// Generator returning a fixed result and counting calls.
    struct MockGenerator {
        result: fn() -> Result<Narrative, GeneratorError>,
        calls: AtomicUsize,
    }

    impl NarrativeGenerator for &'static MockGenerator {
        fn generate(&self, _payload: &ExplanationPayload) -> Result<Narrative, GeneratorError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            (self.result)()
        }
    }

    fn leak(result: fn() -> Result<Narrative, GeneratorError>) -> &'static MockGenerator {
        Box::leak(Box::new(MockGenerator {
            result,
            calls: AtomicUsize::new(0),
        }))
    }

    fn payload() -> ExplanationPayload {
        ExplanationPayload {
            gene: Gene::Cyp2d6,
            drug: "CODEINE".to_string(),
            phenotype: Phenotype::Pm,
            risk_label: RiskLabel::Ineffective,
            diplotype: "*4/*4".to_string(),
            rsids: vec!["rs3892097".to_string(), "rs1065852".to_string()],
            current_dose: None,
        }
    }

    #[rstest::rstest]
    #[case("Carries *4 with rs3892097.", Some("rs3892097"), "Carries *4 with rs3892097.")]
    #[case(
        "Poor metabolizer.",
        Some("rs3892097"),
        "Poor metabolizer. Cited genotype evidence: *4 (rs3892097)."
    )]
    #[case(
        "Carries *4. ",
        Some("rs3892097"),
        "Carries *4. Cited genotype evidence: *4 (rs3892097)."
    )]
    #[case("Carries *4.", None, "Carries *4.")]
    #[case("Poor metabolizer.", None, "Poor metabolizer. Cited genotype evidence: *4.")]
    #[case("CYP2D6*4 (rs3892097) detected.", Some("rs3892097"), "CYP2D6*4 (rs3892097) detected.")]
    #[case(
        "Carries *41 allele (rs3892097).",
        Some("rs3892097"),
        "Carries *41 allele (rs3892097). Cited genotype evidence: *4 (rs3892097)."
    )]
    #[case(
        "Carries *4 with rs38920971.",
        Some("rs3892097"),
        "Carries *4 with rs38920971. Cited genotype evidence: *4 (rs3892097)."
    )]
    fn cite_appends_missing_evidence(
        #[case] text: &str,
        #[case] rsid: Option<&str>,
        #[case] expected: &str,
    ) {
        assert_eq!(cite(text, "*4", rsid), expected);
    }

    #[rstest::rstest]
    #[case("Carries *10.", "*1", false)]
    #[case("Carries *17/*17.", "*1", false)]
    #[case("Carries *1x2.", "*1", false)]
    #[case("Carries *1_dup.", "*1", false)]
    #[case("Carries *2A.", "*2", false)]
    #[case("Carries *1 and *10.", "*1", true)]
    #[case("Diplotype *1/*1.", "*1", true)]
    #[case("Carries *2A.", "*2A", true)]
    #[case("", "*1", false)]
    fn star_allele_must_match_whole(
        #[case] text: &str,
        #[case] star_allele: &str,
        #[case] expected: bool,
    ) {
        assert_eq!(mentions(text, star_allele), expected);
    }

    #[test]
    fn generator_output_is_cited() {
        let generator = leak(|| {
            Ok(Narrative {
                clinical_text: "Reduced conversion to morphine.".to_string(),
                patient_text: "Ask your doctor about other pain relievers.".to_string(),
            })
        });
        let adapter = Adapter::with_generator(Box::new(generator));

        let res = adapter.explain(&payload());

        insta::assert_snapshot!(
            res.clinical_text,
            @"Reduced conversion to morphine. Cited genotype evidence: *4 (rs3892097)."
        );
        assert_eq!(res.patient_text, "Ask your doctor about other pain relievers.");
        assert_eq!(generator.calls.load(Ordering::SeqCst), 1);
    }

    #[rstest::rstest]
    #[case::timeout(|| Err(GeneratorError::Timeout(std::time::Duration::from_secs(30))))]
    #[case::unavailable(|| Err(GeneratorError::Unavailable("no program".to_string())))]
    #[case::empty(|| Ok(Narrative {
        clinical_text: "  ".to_string(),
        patient_text: "text".to_string(),
    }))]
    fn generator_failure_falls_back(#[case] result: fn() -> Result<Narrative, GeneratorError>) {
        let generator = leak(result);
        let adapter = Adapter::with_generator(Box::new(generator));

        let res = adapter.explain(&payload());

        assert_eq!(res, fallback::explain(&payload()));
        assert_eq!(generator.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn without_generator_uses_fallback() {
        let res = Adapter::without_generator().explain(&payload());

        assert_eq!(res, fallback::explain(&payload()));
        assert!(!res.clinical_text.is_empty());
        assert!(!res.patient_text.is_empty());
    }

    #[test]
    fn cited_star_allele_and_rsid() {
        let mut payload = payload();
        assert_eq!(payload.cited_star_allele(), "*4");
        assert_eq!(payload.cited_rsid(), Some("rs3892097"));

        payload.rsids.clear();
        assert_eq!(payload.cited_rsid(), None);
    }
}
