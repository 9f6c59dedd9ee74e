use mcconf::core::io::sdf::SdfError;
use mcconf::engine::error::EngineError;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, CliError>;

/// Exit status used when the run is interrupted.
pub const CANCELLED_EXIT_CODE: i32 = 130;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    McconfCore(#[from] EngineError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to parse file '{path}': {source}", path = path.display())]
    FileParsing {
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },

    #[error("SD file error in '{path}': {source}", path = path.display())]
    Sdf {
        path: PathBuf,
        #[source]
        source: SdfError,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Invalid argument: {0}")]
    Argument(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl CliError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::McconfCore(e) if e.is_cancelled())
    }

    pub fn exit_code(&self) -> i32 {
        if self.is_cancelled() {
            CANCELLED_EXIT_CODE
        } else {
            1
        }
    }
}
