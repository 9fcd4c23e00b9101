//! Parsing of VCF text restricted to the pharmacogene allow-list.

use std::collections::BTreeMap;

use itertools::Itertools as _;

use crate::common::Gene;

use super::ds::{InfoValue, ParsedVcf, VariantRecord};

/// Number of mandatory columns of a VCF data line.
const MIN_FIELDS: usize = 8;

/// Errors raised on structurally invalid VCF text.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The input lacks the file format declaration or the header line.
    #[error("malformed VCF input: {reason}")]
    Malformed {
        /// Human-readable reason.
        reason: String,
    },
}

impl Error {
    fn malformed(reason: &str) -> Self {
        Error::Malformed {
            reason: reason.to_string(),
        }
    }
}

/// Check the `##fileformat=VCF` declaration and the `#CHROM` header line.
///
/// The declaration must appear among the meta lines before the header.
///
/// # Errors
///
/// Returns `Error::Malformed` when the input is empty or either line is missing.
pub fn validate_structure(text: &str) -> Result<(), Error> {
    if text.trim().is_empty() {
        return Err(Error::malformed("empty input"));
    }

    let mut seen_fileformat = false;
    for line in text.lines() {
        let line = line.trim_end_matches('\r');
        if line.starts_with("##fileformat=VCF") {
            seen_fileformat = true;
        } else if line.starts_with("#CHROM") {
            return if seen_fileformat {
                Ok(())
            } else {
                Err(Error::malformed("missing ##fileformat=VCF declaration"))
            };
        }
    }

    if seen_fileformat {
        Err(Error::malformed("missing #CHROM header line"))
    } else {
        Err(Error::malformed(
            "missing ##fileformat=VCF declaration and #CHROM header line",
        ))
    }
}

/// Parse VCF text into the records of allow-listed pharmacogenes.
///
/// Data lines with fewer than eight columns, an unparseable position, or a
/// `GENE` outside the allow-list are skipped.
///
/// # Errors
///
/// Returns `Error::Malformed` if the structural check fails.
pub fn parse(text: &str) -> Result<ParsedVcf, Error> {
    validate_structure(text)?;

    let mut fileformat = String::new();
    let mut records = Vec::new();
    let mut in_body = false;
    for (lineno, line) in text.lines().enumerate() {
        let line = line.trim_end_matches('\r');
        if !in_body {
            if let Some(value) = line.strip_prefix("##fileformat=") {
                fileformat = value.to_string();
            } else if line.starts_with("#CHROM") {
                in_body = true;
            }
            continue;
        }
        if line.trim().is_empty() || line.starts_with('#') {
            continue;
        }
        match parse_data_line(line) {
            Some(record) => {
                tracing::trace!("line {}: retained {:?}", lineno + 1, &record);
                records.push(record);
            }
            None => tracing::trace!("line {}: skipped", lineno + 1),
        }
    }

    let genes = records.iter().map(|record| record.gene).unique().collect();
    tracing::debug!("parsed {} pharmacogene records", records.len());

    Ok(ParsedVcf {
        fileformat,
        records,
        genes,
    })
}

/// Parse one data line, `None` if it is to be skipped.
fn parse_data_line(line: &str) -> Option<VariantRecord> {
    let fields = line.split('\t').collect::<Vec<_>>();
    if fields.len() < MIN_FIELDS {
        return None;
    }

    let info = parse_info(fields[7]);
    let gene = Gene::target_from_symbol(info.get("GENE")?.as_str()?)?;
    let pos = fields[1].trim().parse::<u64>().ok()?;
    let id = non_missing(fields[2]);
    let rsid = info
        .get("RS")
        .and_then(InfoValue::as_str)
        .and_then(non_missing);
    let star = info
        .get("STAR")
        .and_then(InfoValue::as_str)
        .and_then(non_missing);

    Some(VariantRecord {
        chrom: fields[0].to_string(),
        pos,
        id,
        reference: fields[3].to_string(),
        alternative: fields[4].to_string(),
        qual: fields[5].trim().parse::<f64>().ok(),
        filter: fields[6].to_string(),
        gene,
        rsid,
        star,
        info,
    })
}

/// Parse the INFO column into `KEY=VALUE` entries and bare flags.
pub fn parse_info(info: &str) -> BTreeMap<String, InfoValue> {
    let info = info.trim();
    if info.is_empty() || info == "." {
        return BTreeMap::new();
    }

    info.split(';')
        .filter(|item| !item.is_empty())
        .map(|item| match item.split_once('=') {
            Some((key, value)) => (key.to_string(), InfoValue::Value(value.to_string())),
            None => (item.to_string(), InfoValue::Flag(true)),
        })
        .collect()
}

/// Trimmed value, `None` when empty or `.`.
fn non_missing(value: &str) -> Option<String> {
    let value = value.trim();
    if value.is_empty() || value == "." {
        None
    } else {
        Some(value.to_string())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    const HEADER: &str = "##fileformat=VCFv4.2\n##fileDate=20240219\n\
        #CHROM\tPOS\tID\tREF\tALT\tQUAL\tFILTER\tINFO\n";

    #[test]
    fn parse_single_cyp2d6() -> Result<(), anyhow::Error> {
        let text = format!(
            "{HEADER}chr22\t42127941\trs1065852\tG\tA\t60\tPASS\tGENE=CYP2D6;STAR=*4;RS=rs1065852"
        );

        let parsed = parse(&text)?;

        assert_eq!(parsed.fileformat, "VCFv4.2");
        assert_eq!(parsed.records.len(), 1);
        assert_eq!(parsed.genes, vec![Gene::Cyp2d6]);
        let record = &parsed.records[0];
        assert_eq!(record.chrom, "chr22");
        assert_eq!(record.pos, 42127941);
        assert_eq!(record.qual, Some(60.0));
        assert_eq!(record.rsid.as_deref(), Some("rs1065852"));
        assert_eq!(record.star.as_deref(), Some("*4"));

        Ok(())
    }

    #[test]
    fn parse_multiple_genes_first_seen_order() -> Result<(), anyhow::Error> {
        let text = format!(
            "{HEADER}\
            chr10\t96541616\trs4244285\tG\tA\t60\tPASS\tGENE=CYP2C19;STAR=*2;RS=rs4244285\n\
            chr22\t42127941\trs1065852\tG\tA\t60\tPASS\tGENE=CYP2D6;STAR=*4;RS=rs1065852\n\
            chr10\t96521657\trs12248560\tC\tT\t60\tPASS\tGENE=CYP2C19;STAR=*17\n"
        );

        let parsed = parse(&text)?;

        assert_eq!(parsed.records.len(), 3);
        assert_eq!(parsed.genes, vec![Gene::Cyp2c19, Gene::Cyp2d6]);
        // only INFO/RS carries the rsid, the ID column does not
        assert_eq!(parsed.records[2].id.as_deref(), Some("rs12248560"));
        assert_eq!(parsed.records[2].rsid, None);

        Ok(())
    }

    #[test]
    fn non_target_genes_are_dropped() -> Result<(), anyhow::Error> {
        let text = format!(
            "{HEADER}\
            chr1\t100\trs123\tG\tA\t60\tPASS\tGENE=UNKNOWN;STAR=*1;RS=rs123\n\
            chr16\t31096368\trs9923231\tC\tT\t60\tPASS\tGENE=VKORC1;RS=rs9923231\n\
            chr1\t200\t.\tG\tA\t60\tPASS\tDP=10\n\
            chr22\t42127941\trs1065852\tG\tA\t60\tPASS\tGENE=CYP2D6;STAR=*4;RS=rs1065852\n"
        );

        let parsed = parse(&text)?;

        assert_eq!(parsed.records.len(), 1);
        assert!(parsed.records.iter().all(|r| r.gene.is_target()));

        Ok(())
    }

    #[test]
    fn reparsing_filtered_output_is_idempotent() -> Result<(), anyhow::Error> {
        let kept = "chr22\t42127941\trs1065852\tG\tA\t60\tPASS\tGENE=CYP2D6;STAR=*4;RS=rs1065852\n\
            chr1\t97450058\trs3918290\tC\tT\t50\tPASS\tGENE=DPYD;STAR=*2A;RS=rs3918290\n";
        let dropped = "chr1\t100\trs123\tG\tA\t60\tPASS\tGENE=BRCA1;RS=rs123\n";
        let full = parse(&format!("{HEADER}{dropped}{kept}"))?;
        let filtered = parse(&format!("{HEADER}{kept}"))?;

        assert_eq!(full, filtered);

        Ok(())
    }

    #[test]
    fn short_lines_are_skipped() -> Result<(), anyhow::Error> {
        let text = format!(
            "{HEADER}chr22\t42127941\trs1065852\tG\tA\n\
            chr22\tnot-a-number\trs1065852\tG\tA\t60\tPASS\tGENE=CYP2D6\n\
            chr22\t42127941\trs1065852\tG\tA\t60\tPASS\tGENE=CYP2D6;STAR=*4\n"
        );

        let parsed = parse(&text)?;

        assert_eq!(parsed.records.len(), 1);

        Ok(())
    }

    #[rstest::rstest]
    #[case("")]
    #[case("chr22\t42127941\trs1065852\tG\tA\t60\tPASS\tGENE=CYP2D6")]
    #[case("##fileformat=VCFv4.2\nchr22\t1\t.\tG\tA\t60\tPASS\tGENE=CYP2D6")]
    #[case("#CHROM\tPOS\tID\tREF\tALT\tQUAL\tFILTER\tINFO\n")]
    #[case("##source=test\n#CHROM\tPOS\tID\tREF\tALT\tQUAL\tFILTER\tINFO\n")]
    fn malformed_input(#[case] text: &str) {
        assert!(matches!(parse(text), Err(Error::Malformed { .. })));
    }

    #[test]
    fn missing_header_reason() {
        let err = parse("##fileformat=VCFv4.2\n").unwrap_err();
        assert_eq!(
            err.to_string(),
            "malformed VCF input: missing #CHROM header line"
        );
    }

    #[test]
    fn info_flags_and_values() {
        let info = parse_info("GENE=TPMT;DB;AF=0.5;EQ=a=b");

        assert_eq!(info.get("GENE"), Some(&InfoValue::Value("TPMT".into())));
        assert_eq!(info.get("DB"), Some(&InfoValue::Flag(true)));
        assert_eq!(info.get("EQ"), Some(&InfoValue::Value("a=b".into())));
        assert!(parse_info(".").is_empty());
    }
}
