use thiserror::Error;

use super::config::ConfigError;
use super::matrix::MatrixError;
use super::similarity::ScoringError;
use crate::core::models::group::GroupingError;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("Failed to group conformers: {0}")]
    Grouping(#[from] GroupingError),

    #[error("Scoring conformers {label_a} and {label_b} failed: {source}")]
    Scoring {
        label_a: usize,
        label_b: usize,
        #[source]
        source: ScoringError,
    },

    #[error("Distance matrix operation failed: {0}")]
    Matrix(#[from] MatrixError),

    #[error("In group '{group}': {source}")]
    Group {
        group: String,
        #[source]
        source: Box<EngineError>,
    },

    #[error("Internal consistency violation: {0}")]
    Invariant(String),

    #[error("Selection was cancelled")]
    Cancelled,
}

impl EngineError {
    /// Attaches the name of the isomer group being processed.
    pub fn in_group(self, group: &str) -> Self {
        match self {
            Self::Cancelled | Self::Group { .. } => self,
            other => Self::Group {
                group: group.to_string(),
                source: Box::new(other),
            },
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}
