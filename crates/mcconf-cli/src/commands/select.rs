use crate::cli::SelectArgs;
use crate::config::{self, AppConfig};
use crate::error::{CliError, Result};
use crate::utils::progress::CliProgressHandler;
use mcconf::{
    core::io::{sdf::SdfFile, traits::MolecularFile},
    core::models::molecule::MolecularGraph,
    engine::{cancel::CancellationToken, progress::ProgressReporter, similarity::SENTINEL_SCORE},
    workflows::select::{self, Representative, SelectionSummary},
};
use std::fs::File;
use std::io::{BufWriter, Write};
use tracing::info;

const MATRIX_HEADER: [&str; 4] = ["group", "label_i", "label_j", "score"];

pub async fn run(args: SelectArgs, cancel: CancellationToken) -> Result<()> {
    let app = config::build_config(&args)?;

    info!("Loading conformers from {:?}", &app.input_path);
    let molecules =
        SdfFile::read_from_path(&app.input_path).map_err(|source| CliError::Sdf {
            path: app.input_path.clone(),
            source,
        })?;
    info!("Read {} conformer record(s).", molecules.len());

    let progress_handler = CliProgressHandler::new();
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());

    println!(
        "Selecting representatives by '{}' from {} record(s)...",
        app.core_config.grouping.property,
        molecules.len()
    );

    let summary = tokio::task::block_in_place(|| {
        select_and_write(molecules, &app, &reporter, &cancel, &progress_handler)
    })?;

    println!(
        "✓ {} representative(s) from {} conformer(s) written to: {}",
        summary.groups,
        summary.conformers,
        app.output_path.display()
    );
    if summary.discarded > 0 {
        println!(
            "  {} record(s) beyond the maximum sample size were not considered.",
            summary.discarded
        );
    }
    if let Some(path) = &app.matrix_out {
        println!("  Pair scores written to: {}", path.display());
    }

    Ok(())
}

/// Runs the workflow, appending each representative to the output as soon as
/// its group is done so an interrupted run leaves a valid file.
fn select_and_write(
    molecules: Vec<MolecularGraph>,
    app: &AppConfig,
    reporter: &ProgressReporter,
    cancel: &CancellationToken,
    progress: &CliProgressHandler,
) -> Result<SelectionSummary> {
    let mut output = BufWriter::new(File::create(&app.output_path)?);
    let mut matrix_writer = match &app.matrix_out {
        Some(path) => {
            let mut writer = csv::Writer::from_path(path)?;
            writer.write_record(MATRIX_HEADER)?;
            Some(writer)
        }
        None => None,
    };

    select::run(
        molecules,
        &app.core_config,
        reporter,
        cancel,
        |representative: Representative| -> Result<()> {
            SdfFile::write_record(&representative.molecule, &mut output).map_err(|source| {
                CliError::Sdf {
                    path: app.output_path.clone(),
                    source,
                }
            })?;
            output.flush()?;

            if let Some(writer) = matrix_writer.as_mut() {
                write_scores(writer, &representative)?;
                writer.flush()?;
            }

            progress.println(group_summary_line(&representative));
            Ok(())
        },
    )
}

fn write_scores<W: Write>(writer: &mut csv::Writer<W>, rep: &Representative) -> Result<()> {
    let labels = rep.scores.labels();
    for (i, &label_i) in labels.iter().enumerate() {
        for (j, &label_j) in labels.iter().enumerate().skip(i + 1) {
            let Some(score) = rep.scores.get(i, j) else {
                continue;
            };
            writer.write_record([
                rep.group.clone(),
                label_i.to_string(),
                label_j.to_string(),
                format_score(score),
            ])?;
        }
    }
    Ok(())
}

fn format_score(score: f64) -> String {
    if score >= SENTINEL_SCORE {
        "inf".to_string()
    } else {
        format!("{:.6}", score)
    }
}

fn group_summary_line(rep: &Representative) -> String {
    format!(
        "✓ {}: conformer {} ('{}') of {}",
        rep.group,
        rep.label,
        rep.molecule.title(),
        rep.sample_size
    )
}
