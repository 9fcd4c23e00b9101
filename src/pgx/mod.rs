//! Pharmacogenomic risk evaluation and the `analyze` command.

pub mod data;
pub mod ds;
pub mod eval;
pub mod explain;
pub mod report;

use std::{path::PathBuf, time::Duration};

use clap::Parser;

use crate::{
    common::new_patient_id,
    vcf::{self, ds::ParsedVcf, input::InputLimits},
};

use self::{
    data::{drugs::Drug, Paths},
    eval::{result::Evaluation, Evaluator},
    explain::{command::CommandGenerator, fallback, Adapter, ExplanationPayload},
    report::Report,
};

pub use self::data::drugs::Error;

/// Source of the narrative text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum GeneratorKind {
    /// Always use the built-in texts.
    #[default]
    None,
    /// Run an external program.
    Command,
}

/// Command line arguments for `analyze` command.
#[derive(Parser, Debug)]
#[command(about = "Assess drug risks from pharmacogene variants", long_about = None)]
pub struct Args {
    /// Path to the VCF file to analyze.
    #[clap(long)]
    pub path_vcf: PathBuf,
    /// Comma-separated drugs, catalog codes or custom names.
    #[clap(long)]
    pub drugs: String,
    /// Current dose, passed on to the narrative generator.
    #[clap(long)]
    pub current_dose: Option<String>,

    /// Replacement tables.
    #[clap(flatten)]
    pub paths: Paths,

    /// Source of the narrative text.
    #[clap(long, value_enum, default_value_t = GeneratorKind::None)]
    pub generator: GeneratorKind,
    /// Program to run with `--generator command`.
    #[clap(long)]
    pub generator_program: Option<String>,
    /// Argument to the generator program, may be repeated.
    #[clap(long = "generator-arg", allow_hyphen_values = true)]
    pub generator_args: Vec<String>,
    /// Timeout of the generator program in seconds.
    #[clap(long, default_value_t = 30)]
    pub generator_timeout: u64,
}

/// Runtime configuration of the analysis.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Config {
    /// Source of the narrative text.
    pub generator: GeneratorKind,
    /// Program for `GeneratorKind::Command`.
    pub generator_program: Option<String>,
    /// Arguments to the generator program.
    pub generator_args: Vec<String>,
    /// Timeout of the generator program.
    pub timeout: Duration,
    /// Current dose, if given.
    pub current_dose: Option<String>,
}

impl Config {
    /// Build the configuration from command line arguments.
    pub fn from_args(args: &Args) -> Self {
        Self {
            generator: args.generator,
            generator_program: args.generator_program.clone(),
            generator_args: args.generator_args.clone(),
            timeout: Duration::from_secs(args.generator_timeout),
            current_dose: args.current_dose.clone(),
        }
    }

    /// Build the explanation adapter.
    ///
    /// A command generator without program is logged and replaced by the
    /// built-in texts.
    pub fn adapter(&self) -> Adapter {
        match (self.generator, self.generator_program.as_deref()) {
            (GeneratorKind::None, _) => Adapter::without_generator(),
            (GeneratorKind::Command, Some(program)) => Adapter::with_generator(Box::new(
                CommandGenerator::new(program, &self.generator_args, self.timeout),
            )),
            (GeneratorKind::Command, None) => {
                tracing::warn!("no --generator-program given, using built-in texts");
                Adapter::without_generator()
            }
        }
    }
}

/// Analyze one drug and assemble its report.
///
/// # Arguments
///
/// * `evaluator` - Evaluator with the loaded tables.
/// * `adapter` - Explanation adapter.
/// * `parsed` - The parsed VCF.
/// * `drug` - The drug to analyze.
/// * `patient_id` - Identifier of the invocation.
/// * `current_dose` - Current dose, if given.
pub fn analyze(
    evaluator: &Evaluator,
    adapter: &Adapter,
    parsed: &ParsedVcf,
    drug: &Drug,
    patient_id: &str,
    current_dose: Option<&str>,
) -> Report {
    tracing::info!("- assessing {}", drug.code());
    let evaluation = evaluator.evaluate(&parsed.records, drug);
    let explanation = match &evaluation {
        Evaluation::Finding(finding) => {
            adapter.explain(&ExplanationPayload::new(finding, current_dose))
        }
        Evaluation::NoTargetVariants(result) => fallback::no_target_variants(&result.drug),
    };

    Report::new(
        patient_id,
        &evaluation,
        explanation,
        parsed,
        chrono::Utc::now(),
    )
}

/// Main entry point for the `analyze` command.
///
/// # Arguments
///
/// * `common_args` - Commonly used command line arguments.
/// * `args` - Command line arguments specific to `analyze` command.
///
/// # Errors
///
/// If anything goes wrong, it returns a generic `anyhow::Error`.
pub fn run(common_args: &crate::common::Args, args: &Args) -> Result<(), anyhow::Error> {
    tracing::info!("  running command `analyze`");
    tracing::info!("  common_args = {:?}", &common_args);
    tracing::info!("  args = {:?}", &args);

    let drugs = Drug::parse_list(&args.drugs)?;
    let text = InputLimits::default()
        .read(&args.path_vcf)
        .map_err(|e| anyhow::anyhow!("rejected {}: {}", args.path_vcf.display(), e))?;
    let parsed = vcf::io::parse(&text)?;
    tracing::info!(
        "parsed {} pharmacogene records of genes {:?}",
        parsed.records.len(),
        &parsed.genes
    );

    let config = Config::from_args(args);
    let evaluator = Evaluator::load(&args.paths)
        .map_err(|e| anyhow::anyhow!("failed to create evaluator: {}", e))?;
    let adapter = config.adapter();
    let patient_id = new_patient_id();

    for drug in &drugs {
        let report = analyze(
            &evaluator,
            &adapter,
            &parsed,
            drug,
            &patient_id,
            config.current_dose.as_deref(),
        );
        println!("{}", serde_json::to_string(&report)?);
    }

    Ok(())
}
