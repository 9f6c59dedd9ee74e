use mcconf::engine::config::SelectionConfig;
use std::path::PathBuf;

pub struct AppConfig {
    pub input_path: PathBuf,
    pub output_path: PathBuf,
    pub matrix_out: Option<PathBuf>,
    pub core_config: SelectionConfig,
}
