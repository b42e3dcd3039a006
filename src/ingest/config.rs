//! Ingestion configuration.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

/// Settings for one bulk-ingestion run.
#[derive(Debug, Clone, Deserialize)]
pub struct IngestConfig {
    /// Remote gzip archive with the places dump.
    pub places_url: String,

    /// Remote gzip archive with the alternate-names dump.
    pub alternate_names_url: String,

    /// Where downloaded archives are cached between runs.
    #[serde(default = "default_cache_dir")]
    pub cache_dir: PathBuf,

    /// Where archives are decompressed to.
    #[serde(default = "default_work_dir")]
    pub work_dir: PathBuf,

    /// Rows applied to the store per batch.
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// A progress line is logged every this many rows.
    #[serde(default = "default_log_every")]
    pub log_every: u64,

    /// Alternate-name language allow-list. Empty, or containing the
    /// wildcard "all", accepts every language.
    #[serde(default)]
    pub languages: Vec<String>,
}

fn default_cache_dir() -> PathBuf {
    PathBuf::from("data/cache")
}

fn default_work_dir() -> PathBuf {
    PathBuf::from("data/work")
}

fn default_batch_size() -> usize {
    100
}

fn default_log_every() -> u64 {
    50_000
}

impl IngestConfig {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path)
            .with_context(|| format!("failed to read config file {}", path.as_ref().display()))?;
        let config: IngestConfig =
            toml::from_str(&content).context("failed to parse config file")?;
        Ok(config)
    }
}
