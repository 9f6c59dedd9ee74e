use crate::error::{CliError, Result};
use mcconf::engine::config::{AlignmentFailurePolicy, SimilarityMetric};
use serde::Deserialize;
use std::path::Path;
use std::str::FromStr;
use tracing::debug;

#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum FileMetric {
    AlignmentRmsd,
    InternalDistance,
}

impl From<FileMetric> for SimilarityMetric {
    fn from(m: FileMetric) -> Self {
        match m {
            FileMetric::AlignmentRmsd => SimilarityMetric::AlignmentRmsd,
            FileMetric::InternalDistance => SimilarityMetric::InternalDistance,
        }
    }
}

impl FromStr for FileMetric {
    type Err = CliError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "alignment-rmsd" => Ok(Self::AlignmentRmsd),
            "internal-distance" => Ok(Self::InternalDistance),
            other => Err(CliError::Config(format!(
                "Unknown metric '{}'. Expected 'alignment-rmsd' or 'internal-distance'.",
                other
            ))),
        }
    }
}

#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum FileFailurePolicy {
    Abort,
    Sentinel,
}

impl From<FileFailurePolicy> for AlignmentFailurePolicy {
    fn from(p: FileFailurePolicy) -> Self {
        match p {
            FileFailurePolicy::Abort => AlignmentFailurePolicy::Abort,
            FileFailurePolicy::Sentinel => AlignmentFailurePolicy::Sentinel,
        }
    }
}

impl FromStr for FileFailurePolicy {
    type Err = CliError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "abort" => Ok(Self::Abort),
            "sentinel" => Ok(Self::Sentinel),
            other => Err(CliError::Config(format!(
                "Unknown alignment failure policy '{}'. Expected 'abort' or 'sentinel'.",
                other
            ))),
        }
    }
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct FileSelectionConfig {
    pub metric: Option<FileMetric>,
    pub max_mappings: Option<usize>,
    pub on_alignment_failure: Option<FileFailurePolicy>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct FileGroupingConfig {
    pub property: Option<String>,
    pub max_sample_size: Option<usize>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct FileConfig {
    pub selection: Option<FileSelectionConfig>,
    pub grouping: Option<FileGroupingConfig>,
}

impl FileConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading configuration from file: {:?}", path);
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content).map_err(|e| CliError::FileParsing {
            path: path.to_path_buf(),
            source: e.into(),
        })
    }

    pub fn from_toml(content: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(content)
    }
}
