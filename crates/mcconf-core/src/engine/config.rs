use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum ConfigError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),
    #[error("Invalid value for parameter '{parameter}': {reason}")]
    InvalidValue {
        parameter: &'static str,
        reason: String,
    },
}

/// Which deviation measure becomes the pair score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SimilarityMetric {
    /// RMSD after optimal rigid-body superposition.
    #[default]
    AlignmentRmsd,
    /// RMS deviation of all intramolecular atom-atom distances.
    InternalDistance,
}

/// What to do when the rotation solve of one mapping fails numerically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AlignmentFailurePolicy {
    /// Stop the whole run with an error.
    #[default]
    Abort,
    /// Log a warning and give the pair the sentinel score.
    Sentinel,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScoringConfig {
    pub metric: SimilarityMetric,
    /// Upper bound on the atom mappings enumerated per pair; `None` is unbounded.
    pub max_mappings: Option<usize>,
    pub on_alignment_failure: AlignmentFailurePolicy,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GroupingConfig {
    /// The SD data item whose value names the isomer group.
    pub property: String,
    pub max_sample_size: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SelectionConfig {
    pub scoring: ScoringConfig,
    pub grouping: GroupingConfig,
}

#[derive(Default)]
pub struct SelectionConfigBuilder {
    metric: Option<SimilarityMetric>,
    max_mappings: Option<usize>,
    on_alignment_failure: Option<AlignmentFailurePolicy>,
    group_property: Option<String>,
    max_sample_size: Option<usize>,
}

impl SelectionConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn metric(mut self, metric: SimilarityMetric) -> Self {
        self.metric = Some(metric);
        self
    }
    pub fn max_mappings(mut self, limit: Option<usize>) -> Self {
        self.max_mappings = limit;
        self
    }
    pub fn on_alignment_failure(mut self, policy: AlignmentFailurePolicy) -> Self {
        self.on_alignment_failure = Some(policy);
        self
    }
    pub fn group_property(mut self, property: impl Into<String>) -> Self {
        self.group_property = Some(property.into());
        self
    }
    pub fn max_sample_size(mut self, size: usize) -> Self {
        self.max_sample_size = Some(size);
        self
    }

    pub fn build(self) -> Result<SelectionConfig, ConfigError> {
        if self.max_mappings == Some(0) {
            return Err(ConfigError::InvalidValue {
                parameter: "max_mappings",
                reason: "must be at least 1".to_string(),
            });
        }
        let scoring = ScoringConfig {
            metric: self
                .metric
                .ok_or(ConfigError::MissingParameter("metric"))?,
            max_mappings: self.max_mappings,
            on_alignment_failure: self
                .on_alignment_failure
                .ok_or(ConfigError::MissingParameter("on_alignment_failure"))?,
        };

        let property = self
            .group_property
            .ok_or(ConfigError::MissingParameter("group_property"))?;
        if property.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                parameter: "group_property",
                reason: "must not be empty".to_string(),
            });
        }
        let max_sample_size = self
            .max_sample_size
            .ok_or(ConfigError::MissingParameter("max_sample_size"))?;
        if max_sample_size == 0 {
            return Err(ConfigError::InvalidValue {
                parameter: "max_sample_size",
                reason: "must be at least 1".to_string(),
            });
        }

        Ok(SelectionConfig {
            scoring,
            grouping: GroupingConfig {
                property,
                max_sample_size,
            },
        })
    }
}
