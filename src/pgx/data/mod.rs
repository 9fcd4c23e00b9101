//! Static reference tables: drug catalog, allele definitions, diplotype
//! phenotypes and risk rules.
//!
//! The tables are embedded TSV files that can be replaced by files on disk.
//! They are loaded once and are read-only afterwards.

pub mod alleles;
pub mod diplotypes;
pub mod drugs;
pub mod rules;

use std::{
    io::{BufReader, Read},
    path::{Path, PathBuf},
};

/// Optional paths to replacement TSV tables.
#[derive(clap::Args, Debug, Clone, Default, PartialEq, Eq)]
pub struct Paths {
    /// Path to a risk rule TSV file replacing the built-in table.
    #[clap(long)]
    pub path_risk_rules: Option<PathBuf>,
    /// Path to a diplotype phenotype TSV file replacing the built-in table.
    #[clap(long)]
    pub path_diplotype_phenotypes: Option<PathBuf>,
    /// Path to an allele definition TSV file replacing the built-in table.
    #[clap(long)]
    pub path_allele_definitions: Option<PathBuf>,
}

/// Deserialize all records of a tab-separated file with header.
///
/// # Errors
///
/// If anything goes wrong, it returns a generic `anyhow::Error`.
pub fn read_tsv<T, R>(reader: R) -> Result<Vec<T>, anyhow::Error>
where
    T: serde::de::DeserializeOwned,
    R: Read,
{
    let mut csv_reader = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(true)
        .flexible(false)
        .from_reader(reader);
    let mut result = Vec::new();
    for record in csv_reader.deserialize() {
        let record = record.map_err(|e| anyhow::anyhow!("problem parsing record: {}", e))?;
        result.push(record);
    }

    Ok(result)
}

/// Load records from `path`, or from the embedded table if `path` is `None`.
///
/// # Errors
///
/// If anything goes wrong, it returns a generic `anyhow::Error`.
pub fn load_tsv<T>(path: Option<&Path>, embedded: &str) -> Result<Vec<T>, anyhow::Error>
where
    T: serde::de::DeserializeOwned,
{
    match path {
        Some(path) => {
            tracing::debug!("loading table from {}", path.display());
            let reader = std::fs::File::open(path)
                .map_err(|e| anyhow::anyhow!("problem opening file: {}", e))
                .map(BufReader::new)?;
            read_tsv(reader)
        }
        None => read_tsv(embedded.as_bytes()),
    }
}

/// All reference tables.
#[derive(Debug, Clone)]
pub struct Data {
    /// Star allele definitions.
    pub alleles: alleles::Data,
    /// Diplotype to phenotype tables.
    pub diplotypes: diplotypes::Data,
    /// Risk rules.
    pub rules: rules::Data,
}

impl Data {
    /// Load all tables, using embedded defaults where `paths` has no override.
    ///
    /// # Errors
    ///
    /// If anything goes wrong, it returns a generic `anyhow::Error`.
    pub fn load(paths: &Paths) -> Result<Self, anyhow::Error> {
        let alleles = alleles::Data::load(paths.path_allele_definitions.as_deref())
            .map_err(|e| anyhow::anyhow!("failed to load allele definitions: {}", e))?;
        let diplotypes = diplotypes::Data::load(paths.path_diplotype_phenotypes.as_deref())
            .map_err(|e| anyhow::anyhow!("failed to load diplotype phenotypes: {}", e))?;
        let rules = rules::Data::load(paths.path_risk_rules.as_deref())
            .map_err(|e| anyhow::anyhow!("failed to load risk rules: {}", e))?;
        tracing::debug!(
            "loaded {} allele definitions, {} diplotypes, {} risk rules",
            alleles.len(),
            diplotypes.len(),
            rules.len()
        );

        Ok(Self {
            alleles,
            diplotypes,
            rules,
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[derive(Debug, PartialEq, serde::Deserialize)]
    struct Row {
        name: String,
        value: Option<u32>,
    }

    #[test]
    fn read_tsv_rows() -> Result<(), anyhow::Error> {
        let rows: Vec<Row> = read_tsv("name\tvalue\na\t1\nb\t\n".as_bytes())?;

        assert_eq!(
            rows,
            vec![
                Row {
                    name: "a".into(),
                    value: Some(1)
                },
                Row {
                    name: "b".into(),
                    value: None
                },
            ]
        );

        Ok(())
    }

    #[test]
    fn read_tsv_rejects_ragged_rows() {
        assert!(read_tsv::<Row, _>("name\tvalue\na\n".as_bytes()).is_err());
    }

    #[test]
    fn load_embedded_defaults() -> Result<(), anyhow::Error> {
        let data = Data::load(&Paths::default())?;

        assert!(!data.alleles.is_empty());
        assert!(!data.diplotypes.is_empty());
        assert!(!data.rules.is_empty());

        Ok(())
    }
}
