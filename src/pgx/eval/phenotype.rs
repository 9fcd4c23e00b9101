//! Phenotype inference from a diplotype.
//!
//! CYP2C9 uses an activity score, DPYD a function score, SLCO1B1 its
//! function table.  All other genes use the generic pair table; their
//! gene-specific rows only cover pairs the generic table lacks.

use crate::{
    common::Gene,
    pgx::{
        data::diplotypes::{normalize_pair, split_diplotype},
        ds::{Phenotype, PhenotypeCall},
    },
};

/// CYP2C9 allele activity in half units, i.e., `*1` has activity 1.0.
const CYP2C9_ACTIVITY: &[(&str, u8)] = &[
    ("*1", 2),
    ("*2", 1),
    ("*3", 0),
    ("*5", 0),
    ("*6", 0),
    ("*8", 1),
    ("*11", 1),
    ("*12", 0),
];

/// DPYD alleles with decreased function.
const DPYD_DECREASED_FUNCTION: &[&str] = &["HapB3"];

/// DPYD alleles without function.
const DPYD_NO_FUNCTION: &[&str] = &["*2A", "*13", "D949V"];

/// Infers phenotypes with the gene-specific model.
pub struct Evaluator<'a> {
    /// The parent evaluator.
    parent: &'a super::Evaluator,
}

impl<'a> Evaluator<'a> {
    /// Create a new `Evaluator`.
    pub fn with_parent(parent: &'a super::Evaluator) -> Self {
        Self { parent }
    }

    /// Infer the phenotype of `gene` from `diplotype`.
    ///
    /// Never fails; unresolvable input yields an `Unknown` call with
    /// confidence 0.5, or 0.3 if `diplotype` is not a `/`-separated pair.
    pub fn evaluate(&self, gene: Gene, diplotype: &str) -> PhenotypeCall {
        let Some((left, right)) = split_diplotype(diplotype) else {
            tracing::debug!("malformed diplotype {:?} for {}", diplotype, gene);
            return PhenotypeCall::missing_input();
        };

        match gene {
            Gene::Cyp2c9 => cyp2c9_activity_score(left, right),
            Gene::Dpyd => dpyd_function_score(left, right),
            Gene::Slco1b1 => self
                .parent
                .data()
                .diplotypes
                .by_gene(gene, &normalize_pair(left, right))
                .unwrap_or_else(PhenotypeCall::unresolved),
            _ => {
                let key = normalize_pair(left, right);
                let diplotypes = &self.parent.data().diplotypes;
                diplotypes
                    .generic(&key)
                    .or_else(|| diplotypes.by_gene(gene, &key))
                    .unwrap_or_else(PhenotypeCall::unresolved)
            }
        }
    }
}

/// Activity score model of CYP2C9.
fn cyp2c9_activity_score(left: &str, right: &str) -> PhenotypeCall {
    let activity = |allele: &str| {
        CYP2C9_ACTIVITY
            .iter()
            .find(|(name, _)| *name == allele)
            .map(|(_, activity)| *activity)
    };
    let (Some(left), Some(right)) = (activity(left), activity(right)) else {
        return PhenotypeCall::unresolved();
    };

    match left + right {
        0 => PhenotypeCall::new(Phenotype::Pm, 0.97),
        1 | 2 => PhenotypeCall::new(Phenotype::Im, 0.93),
        _ => PhenotypeCall::new(Phenotype::Nm, 0.95),
    }
}

/// Function score model of DPYD.
fn dpyd_function_score(left: &str, right: &str) -> PhenotypeCall {
    let points = |allele: &str| {
        if allele == "*1" {
            Some(2)
        } else if DPYD_DECREASED_FUNCTION.contains(&allele) {
            Some(1)
        } else if DPYD_NO_FUNCTION.contains(&allele) {
            Some(0)
        } else {
            None
        }
    };
    let (Some(left), Some(right)) = (points(left), points(right)) else {
        return PhenotypeCall::unresolved();
    };

    match left + right {
        4 => PhenotypeCall::new(Phenotype::NormalMetabolizer, 0.97),
        0 => PhenotypeCall::new(Phenotype::PoorMetabolizer, 0.99),
        _ => PhenotypeCall::new(Phenotype::IntermediateMetabolizer, 0.94),
    }
}

#[cfg(test)]
mod test {
    use crate::{
        common::Gene,
        pgx::{
            ds::{Phenotype, PhenotypeCall},
            eval::{test::global_evaluator, Evaluator as ParentEvaluator},
        },
    };

    use super::Evaluator;

    #[rstest::rstest]
    #[case("*3/*3", Phenotype::Pm, 0.97)]
    #[case("*1/*2", Phenotype::Nm, 0.95)]
    #[case("*1/*1", Phenotype::Nm, 0.95)]
    #[case("*1/*3", Phenotype::Im, 0.93)]
    #[case("*2/*2", Phenotype::Im, 0.93)]
    #[case("*2/*3", Phenotype::Im, 0.93)]
    #[case("*5/*12", Phenotype::Pm, 0.97)]
    #[case("*1/*99", Phenotype::Unknown, 0.5)]
    fn cyp2c9(
        global_evaluator: ParentEvaluator,
        #[case] diplotype: &str,
        #[case] phenotype: Phenotype,
        #[case] confidence: f64,
    ) {
        let res = Evaluator::with_parent(&global_evaluator).evaluate(Gene::Cyp2c9, diplotype);

        assert_eq!(res, PhenotypeCall::new(phenotype, confidence));
    }

    #[rstest::rstest]
    #[case("*1/*1", Phenotype::NormalMetabolizer, 0.97)]
    #[case("*1/HapB3", Phenotype::IntermediateMetabolizer, 0.94)]
    #[case("*1/*2A", Phenotype::IntermediateMetabolizer, 0.94)]
    #[case("HapB3/*13", Phenotype::IntermediateMetabolizer, 0.94)]
    #[case("*2A/*2A", Phenotype::PoorMetabolizer, 0.99)]
    #[case("*13/D949V", Phenotype::PoorMetabolizer, 0.99)]
    #[case("*1/*9B", Phenotype::Unknown, 0.5)]
    fn dpyd(
        global_evaluator: ParentEvaluator,
        #[case] diplotype: &str,
        #[case] phenotype: Phenotype,
        #[case] confidence: f64,
    ) {
        let res = Evaluator::with_parent(&global_evaluator).evaluate(Gene::Dpyd, diplotype);

        assert_eq!(res, PhenotypeCall::new(phenotype, confidence));
    }

    #[rstest::rstest]
    #[case("*5/*5", Phenotype::LowFunction, 0.97)]
    #[case("*15/*5", Phenotype::LowFunction, 0.94)]
    #[case("*5/*1", Phenotype::DecreasedFunction, 0.95)]
    #[case("*1/*1", Phenotype::NormalFunction, 0.96)]
    #[case("*1/*17", Phenotype::Unknown, 0.5)]
    // no fallback to the generic table
    #[case("*1/*2", Phenotype::Unknown, 0.5)]
    fn slco1b1(
        global_evaluator: ParentEvaluator,
        #[case] diplotype: &str,
        #[case] phenotype: Phenotype,
        #[case] confidence: f64,
    ) {
        let res = Evaluator::with_parent(&global_evaluator).evaluate(Gene::Slco1b1, diplotype);

        assert_eq!(res, PhenotypeCall::new(phenotype, confidence));
    }

    #[rstest::rstest]
    #[case(Gene::Cyp2d6, "*4/*4", Phenotype::Pm, 0.90)]
    #[case(Gene::Cyp2d6, "*2/*2", Phenotype::Pm, 0.95)]
    #[case(Gene::Cyp2d6, "*2/*1", Phenotype::Im, 0.92)]
    #[case(Gene::Cyp2c19, "*3/*2", Phenotype::Pm, 0.88)]
    #[case(Gene::Cyp2c19, "*3/*3", Phenotype::Pm, 0.88)]
    #[case(Gene::Tpmt, "*1/*1", Phenotype::Nm, 0.98)]
    #[case(Gene::Tpmt, "*3C/*3A", Phenotype::Pm, 0.96)]
    #[case(Gene::Cyp2c19, "*41/*41", Phenotype::Im, 0.90)]
    // gene-specific additions
    #[case(Gene::Cyp2d6, "*1x2/*1", Phenotype::Urm, 0.85)]
    #[case(Gene::Cyp2d6, "*10/*1", Phenotype::Im, 0.88)]
    #[case(Gene::Cyp2c19, "*17/*1", Phenotype::Rm, 0.90)]
    #[case(Gene::Cyp2c19, "*2/*17", Phenotype::Im, 0.85)]
    #[case(Gene::Tpmt, "*4/*1", Phenotype::Im, 0.90)]
    // additions of one gene do not leak into another
    #[case(Gene::Cyp2d6, "*17/*17", Phenotype::Unknown, 0.5)]
    #[case(Gene::Cyp2d6, "*9/*9", Phenotype::Unknown, 0.5)]
    fn table_lookup(
        global_evaluator: ParentEvaluator,
        #[case] gene: Gene,
        #[case] diplotype: &str,
        #[case] phenotype: Phenotype,
        #[case] confidence: f64,
    ) {
        let res = Evaluator::with_parent(&global_evaluator).evaluate(gene, diplotype);

        assert_eq!(res, PhenotypeCall::new(phenotype, confidence));
    }

    #[rstest::rstest]
    #[case(Gene::Cyp2d6, "")]
    #[case(Gene::Cyp2d6, "*4")]
    #[case(Gene::Cyp2c9, "*3")]
    #[case(Gene::Dpyd, "*2A/")]
    #[case(Gene::Slco1b1, "/*5")]
    fn malformed_input(global_evaluator: ParentEvaluator, #[case] gene: Gene, #[case] diplotype: &str) {
        let res = Evaluator::with_parent(&global_evaluator).evaluate(gene, diplotype);

        assert_eq!(res, PhenotypeCall::missing_input());
    }
}
