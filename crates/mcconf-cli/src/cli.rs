use crate::utils::parser;
use clap::{Args, Parser, Subcommand, ValueEnum};
use mcconf::engine::config::AlignmentFailurePolicy;
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    author = "Tony Kan, Ted Yu, William A. Goddard III, Victor Wai Tak Kam",
    version,
    about = "MCCONF CLI - Selects the most representative conformer of every isomer in a conformer ensemble.",
    help_template = HELP_TEMPLATE,
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output except for errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Set the number of threads for parallel pair scoring.
    /// Defaults to the number of available logical cores.
    #[arg(short = 'j', long, global = true, value_name = "NUM")]
    pub threads: Option<usize>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Pick one representative conformer per isomer group of an SD file.
    Select(SelectArgs),
}

/// Arguments for the `select` subcommand.
#[derive(Args, Debug)]
pub struct SelectArgs {
    // --- Core Arguments ---
    /// Path to the input SD file holding the conformer ensemble.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub input: PathBuf,

    /// Path for the output SD file.
    /// Defaults to `<input stem>_mostCommon.sdf` next to the input.
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Path to a configuration file in TOML format.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Write every group's pair scores to a CSV file.
    #[arg(long, value_name = "PATH")]
    pub matrix_out: Option<PathBuf>,

    // --- Grouping Overrides ---
    /// Data item that names the isomer group of each record.
    #[arg(short = 'p', long, value_name = "KEY")]
    pub group_property: Option<String>,

    /// Maximum number of conformers kept per isomer group.
    #[arg(short = 'n', long, value_name = "INT")]
    pub max_sample_size: Option<usize>,

    // --- Scoring Overrides ---
    /// Score pairs by the deviation of intramolecular distances instead of
    /// RMSD after superposition (true/false, yes/no, on/off, 1/0).
    #[arg(long, value_name = "BOOL", value_parser = parser::parse_bool)]
    pub internal_distances: Option<bool>,

    /// Stop enumerating atom mappings of a pair after this many.
    #[arg(long, value_name = "INT")]
    pub max_mappings: Option<usize>,

    /// What to do when superposing a pair fails numerically.
    #[arg(long, value_enum, value_name = "POLICY")]
    pub on_alignment_failure: Option<FailurePolicyArg>,

    /// Set a specific configuration value, overriding the config file.
    /// Can be used multiple times. Example: -S grouping.max-sample-size=20
    #[arg(short = 'S', long = "set", value_name = "KEY=VALUE", num_args(0..))]
    pub set_values: Vec<String>,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailurePolicyArg {
    /// Stop the run with an error.
    Abort,
    /// Give the pair the sentinel score and continue.
    Sentinel,
}

impl From<FailurePolicyArg> for AlignmentFailurePolicy {
    fn from(arg: FailurePolicyArg) -> Self {
        match arg {
            FailurePolicyArg::Abort => AlignmentFailurePolicy::Abort,
            FailurePolicyArg::Sentinel => AlignmentFailurePolicy::Sentinel,
        }
    }
}
