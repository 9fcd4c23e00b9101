//! VCF input handling and the `validate` command.

pub mod ds;
pub mod input;
pub mod io;

use std::path::PathBuf;

use clap::Parser;

use self::input::{file_name, size_mb, InputLimits};

pub use self::io::Error;

/// Command line arguments for `validate` command.
#[derive(Parser, Debug)]
#[command(about = "Validate the structure of a VCF file", long_about = None)]
pub struct Args {
    /// Path to the VCF file to validate.
    #[clap(long)]
    pub path_vcf: PathBuf,
}

/// Outcome of validating one VCF file.
#[derive(Debug, Clone, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct ValidationReport {
    /// Whether the file passed all checks.
    pub valid: bool,
    /// Human-readable message.
    pub message: String,
    /// Machine-readable error code, if any.
    pub error_code: Option<String>,
    /// File size in MB.
    pub size_mb: f64,
    /// File name.
    pub file_name: String,
    /// Number of non-empty, non-comment lines.
    pub variant_count: usize,
}

impl ValidationReport {
    fn rejected(file_name: String, size_mb: f64, code: &str, message: String) -> Self {
        Self {
            valid: false,
            message,
            error_code: Some(code.to_string()),
            size_mb,
            file_name,
            variant_count: 0,
        }
    }
}

/// Validate file name, size, encoding and structure of a VCF file.
///
/// # Errors
///
/// Only fails if the file cannot be read at all.
pub fn validate_file(
    path: &std::path::Path,
    limits: &InputLimits,
) -> Result<ValidationReport, anyhow::Error> {
    let name = file_name(path);
    if let Err(e) = limits.check_file_name(&name) {
        return Ok(ValidationReport::rejected(name, 0.0, e.code(), e.to_string()));
    }

    let content = std::fs::read(path)
        .map_err(|e| anyhow::anyhow!("problem reading {}: {}", path.display(), e))?;
    let size = size_mb(content.len());
    let text = match limits.decode(content) {
        Ok(text) => text,
        Err(e) => return Ok(ValidationReport::rejected(name, size, e.code(), e.to_string())),
    };

    let variant_count = text
        .lines()
        .filter(|line| !line.trim().is_empty() && !line.starts_with('#'))
        .count();
    let report = match io::validate_structure(&text) {
        Ok(()) => ValidationReport {
            valid: true,
            message: "valid VCF structure".to_string(),
            error_code: None,
            size_mb: size,
            file_name: name,
            variant_count,
        },
        Err(e) => ValidationReport {
            variant_count,
            ..ValidationReport::rejected(name, size, "INVALID_VCF_STRUCTURE", e.to_string())
        },
    };

    Ok(report)
}

/// Main entry point for the `validate` command.
///
/// # Arguments
///
/// * `common_args` - Commonly used command line arguments.
/// * `args` - Command line arguments specific to `validate` command.
///
/// # Errors
///
/// If anything goes wrong, it returns a generic `anyhow::Error`.
pub fn run(common_args: &crate::common::Args, args: &Args) -> Result<(), anyhow::Error> {
    tracing::info!("  running command `validate`");
    tracing::info!("  common_args = {:?}", &common_args);
    tracing::info!("  args = {:?}", &args);

    let report = validate_file(&args.path_vcf, &InputLimits::default())?;
    if !report.valid {
        tracing::warn!("{} is not valid: {}", &report.file_name, &report.message);
    }
    println!("{}", serde_json::to_string(&report)?);

    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn validate_fixture() -> Result<(), anyhow::Error> {
        let report = validate_file(
            std::path::Path::new("tests/data/cyp2d6_pm.vcf"),
            &InputLimits::default(),
        )?;

        assert!(report.valid, "{:?}", &report);
        assert_eq!(report.error_code, None);
        assert_eq!(report.variant_count, 2);

        Ok(())
    }

    #[rstest::rstest]
    #[case("x.txt", "##fileformat=VCFv4.2\n#CHROM\n", "INVALID_EXTENSION")]
    #[case("x.vcf", "", "EMPTY_FILE")]
    #[case("x.vcf", "#CHROM\tPOS\tID\tREF\tALT\tQUAL\tFILTER\tINFO\n", "INVALID_VCF_STRUCTURE")]
    fn validate_rejections(
        #[case] name: &str,
        #[case] content: &str,
        #[case] code: &str,
    ) -> Result<(), anyhow::Error> {
        let tmp = tempfile::tempdir()?;
        let path = tmp.path().join(name);
        std::fs::write(&path, content)?;

        let report = validate_file(&path, &InputLimits::default())?;

        assert!(!report.valid);
        assert_eq!(report.error_code.as_deref(), Some(code));

        Ok(())
    }

    #[test]
    fn run_smoke() -> Result<(), anyhow::Error> {
        let common = crate::common::Args {
            verbose: clap_verbosity_flag::Verbosity::new(1, 0),
        };
        let args = Args {
            path_vcf: "tests/data/cyp2d6_pm.vcf".into(),
        };

        run(&common, &args)
    }
}
