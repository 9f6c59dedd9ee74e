use mcconf::engine::config::{AlignmentFailurePolicy, SimilarityMetric};

pub struct DefaultsConfig {
    pub group_property: String,
    pub max_sample_size: usize,
    pub metric: SimilarityMetric,
    pub max_mappings: Option<usize>,
    pub on_alignment_failure: AlignmentFailurePolicy,
    pub output_suffix: &'static str,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            group_property: "ISOMER".to_string(),
            max_sample_size: 50,
            metric: SimilarityMetric::AlignmentRmsd,
            max_mappings: None,
            on_alignment_failure: AlignmentFailurePolicy::Abort,
            output_suffix: "_mostCommon.sdf",
        }
    }
}
