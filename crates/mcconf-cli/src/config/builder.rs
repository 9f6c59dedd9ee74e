use super::defaults::DefaultsConfig;
use super::file::{FileConfig, FileFailurePolicy, FileMetric};
use super::models::AppConfig;
use crate::cli::SelectArgs;
use crate::error::{CliError, Result};
use crate::utils::parser;
use mcconf::engine::config::{AlignmentFailurePolicy, SelectionConfigBuilder, SimilarityMetric};
use std::path::{Path, PathBuf};

/// Layers built-in defaults, the config file, `-S` overrides and CLI flags,
/// in increasing precedence.
pub fn build_config(args: &SelectArgs) -> Result<AppConfig> {
    let defaults = DefaultsConfig::default();

    let file_config = if let Some(config_path) = &args.config {
        FileConfig::from_file(config_path)?
    } else {
        FileConfig::default()
    };

    let mut file_config = apply_set_values(file_config, &args.set_values)?;

    let selection_file = file_config.selection.take().unwrap_or_default();
    let grouping_file = file_config.grouping.take().unwrap_or_default();

    let metric = match args.internal_distances {
        Some(true) => SimilarityMetric::InternalDistance,
        Some(false) => SimilarityMetric::AlignmentRmsd,
        None => selection_file
            .metric
            .map(SimilarityMetric::from)
            .unwrap_or(defaults.metric),
    };
    let max_mappings = args
        .max_mappings
        .or(selection_file.max_mappings)
        .or(defaults.max_mappings);
    let on_alignment_failure = args
        .on_alignment_failure
        .map(AlignmentFailurePolicy::from)
        .or(selection_file
            .on_alignment_failure
            .map(AlignmentFailurePolicy::from))
        .unwrap_or(defaults.on_alignment_failure);
    let group_property = args
        .group_property
        .clone()
        .or(grouping_file.property)
        .unwrap_or(defaults.group_property);
    let max_sample_size = args
        .max_sample_size
        .or(grouping_file.max_sample_size)
        .unwrap_or(defaults.max_sample_size);

    let core_config = SelectionConfigBuilder::new()
        .metric(metric)
        .max_mappings(max_mappings)
        .on_alignment_failure(on_alignment_failure)
        .group_property(group_property)
        .max_sample_size(max_sample_size)
        .build()
        .map_err(|e| CliError::Config(e.to_string()))?;

    let output_path = match &args.output {
        Some(path) => path.clone(),
        None => default_output_path(&args.input, defaults.output_suffix)?,
    };

    Ok(AppConfig {
        input_path: args.input.clone(),
        output_path,
        matrix_out: args.matrix_out.clone(),
        core_config,
    })
}

/// `<dir>/<stem><suffix>`, next to the input file.
fn default_output_path(input: &Path, suffix: &str) -> Result<PathBuf> {
    let stem = input.file_stem().ok_or_else(|| {
        CliError::Argument(format!(
            "Cannot derive an output name from input path '{}'",
            input.display()
        ))
    })?;
    let mut name = stem.to_os_string();
    name.push(suffix);
    Ok(input.with_file_name(name))
}

fn apply_set_values(mut config: FileConfig, set_values: &[String]) -> Result<FileConfig> {
    for kv_pair in set_values {
        let (key, value_str) =
            parser::parse_assignment(kv_pair).map_err(|e| CliError::Config(e.to_string()))?;

        match key {
            "selection.metric" => {
                config
                    .selection
                    .get_or_insert_with(Default::default)
                    .metric = Some(value_str.parse::<FileMetric>()?);
            }
            "selection.max-mappings" => {
                config
                    .selection
                    .get_or_insert_with(Default::default)
                    .max_mappings = Some(parse_integer(key, value_str)?);
            }
            "selection.on-alignment-failure" => {
                config
                    .selection
                    .get_or_insert_with(Default::default)
                    .on_alignment_failure = Some(value_str.parse::<FileFailurePolicy>()?);
            }
            "grouping.property" => {
                config
                    .grouping
                    .get_or_insert_with(Default::default)
                    .property = Some(value_str.to_string());
            }
            "grouping.max-sample-size" => {
                config
                    .grouping
                    .get_or_insert_with(Default::default)
                    .max_sample_size = Some(parse_integer(key, value_str)?);
            }
            _ => {
                return Err(CliError::Config(format!(
                    "Unsupported configuration key for --set: '{}'",
                    key
                )));
            }
        }
    }
    Ok(config)
}

fn parse_integer(key: &str, value: &str) -> Result<usize> {
    value.parse().map_err(|_| {
        CliError::Config(format!("Invalid integer value for {}: {}", key, value))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::FailurePolicyArg;
    use std::fs;
    use tempfile::tempdir;

    fn base_select_args() -> SelectArgs {
        SelectArgs {
            input: PathBuf::from("runs/ensemble.sdf"),
            output: None,
            config: None,
            matrix_out: None,
            group_property: None,
            max_sample_size: None,
            internal_distances: None,
            max_mappings: None,
            on_alignment_failure: None,
            set_values: vec![],
        }
    }

    #[test]
    fn defaults_apply_without_file_or_flags() {
        let app = build_config(&base_select_args()).expect("build ok");
        let cfg = app.core_config;

        assert_eq!(cfg.grouping.property, "ISOMER");
        assert_eq!(cfg.grouping.max_sample_size, 50);
        assert_eq!(cfg.scoring.metric, SimilarityMetric::AlignmentRmsd);
        assert_eq!(cfg.scoring.max_mappings, None);
        assert_eq!(
            cfg.scoring.on_alignment_failure,
            AlignmentFailurePolicy::Abort
        );
        assert_eq!(
            app.output_path,
            PathBuf::from("runs/ensemble_mostCommon.sdf")
        );
        assert!(app.matrix_out.is_none());
    }

    #[test]
    fn file_values_override_defaults() {
        let dir = tempdir().unwrap();
        let cfg_path = dir.path().join("mcconf.toml");
        fs::write(
            &cfg_path,
            r#"
            [selection]
            metric = "internal-distance"
            max-mappings = 4
            on-alignment-failure = "sentinel"

            [grouping]
            property = "FORMULA"
            max-sample-size = 10
            "#,
        )
        .unwrap();

        let mut args = base_select_args();
        args.config = Some(cfg_path);
        let cfg = build_config(&args).expect("build ok").core_config;

        assert_eq!(cfg.scoring.metric, SimilarityMetric::InternalDistance);
        assert_eq!(cfg.scoring.max_mappings, Some(4));
        assert_eq!(
            cfg.scoring.on_alignment_failure,
            AlignmentFailurePolicy::Sentinel
        );
        assert_eq!(cfg.grouping.property, "FORMULA");
        assert_eq!(cfg.grouping.max_sample_size, 10);
    }

    #[test]
    fn cli_flags_override_file_and_set_values() {
        let dir = tempdir().unwrap();
        let cfg_path = dir.path().join("mcconf.toml");
        fs::write(
            &cfg_path,
            "[selection]\nmetric = \"internal-distance\"\n[grouping]\nmax-sample-size = 10\n",
        )
        .unwrap();

        let mut args = base_select_args();
        args.config = Some(cfg_path);
        args.set_values = vec!["grouping.max-sample-size=15".to_string()];
        args.internal_distances = Some(false);
        args.max_sample_size = Some(30);
        args.on_alignment_failure = Some(FailurePolicyArg::Sentinel);
        args.output = Some(PathBuf::from("best.sdf"));

        let app = build_config(&args).expect("build ok");
        assert_eq!(app.core_config.scoring.metric, SimilarityMetric::AlignmentRmsd);
        assert_eq!(app.core_config.grouping.max_sample_size, 30);
        assert_eq!(
            app.core_config.scoring.on_alignment_failure,
            AlignmentFailurePolicy::Sentinel
        );
        assert_eq!(app.output_path, PathBuf::from("best.sdf"));
    }

    #[test]
    fn set_values_override_file_values() {
        let mut args = base_select_args();
        args.set_values = vec![
            "selection.metric=internal-distance".to_string(),
            "selection.max-mappings=2".to_string(),
            "selection.on-alignment-failure=sentinel".to_string(),
            "grouping.property=SMILES".to_string(),
            "grouping.max-sample-size=5".to_string(),
        ];

        let cfg = build_config(&args).expect("build ok").core_config;
        assert_eq!(cfg.scoring.metric, SimilarityMetric::InternalDistance);
        assert_eq!(cfg.scoring.max_mappings, Some(2));
        assert_eq!(
            cfg.scoring.on_alignment_failure,
            AlignmentFailurePolicy::Sentinel
        );
        assert_eq!(cfg.grouping.property, "SMILES");
        assert_eq!(cfg.grouping.max_sample_size, 5);
    }

    #[test]
    fn unsupported_or_malformed_set_values_are_config_errors() {
        for bad in [
            "grouping.colour=red",
            "grouping.max-sample-size=many",
            "selection.metric=tanimoto",
            "selection.metric",
        ] {
            let mut args = base_select_args();
            args.set_values = vec![bad.to_string()];
            assert!(
                matches!(build_config(&args), Err(CliError::Config(_))),
                "{bad}"
            );
        }
    }

    #[test]
    fn invalid_core_values_are_config_errors() {
        let mut args = base_select_args();
        args.max_sample_size = Some(0);
        assert!(matches!(build_config(&args), Err(CliError::Config(_))));

        let mut args = base_select_args();
        args.max_mappings = Some(0);
        assert!(matches!(build_config(&args), Err(CliError::Config(_))));

        let mut args = base_select_args();
        args.group_property = Some("  ".to_string());
        assert!(matches!(build_config(&args), Err(CliError::Config(_))));
    }

    #[test]
    fn default_output_sits_next_to_the_input() {
        assert_eq!(
            default_output_path(Path::new("/data/set.v2.sdf"), "_mostCommon.sdf").unwrap(),
            PathBuf::from("/data/set.v2_mostCommon.sdf")
        );
        assert!(default_output_path(Path::new("/"), "_mostCommon.sdf").is_err());
    }
}
