//! Run configuration: built-in defaults, an optional TOML file, `-S` overrides
//! and command-line flags, merged into a core [`SelectionConfig`].
//!
//! [`SelectionConfig`]: mcconf::engine::config::SelectionConfig

mod builder;
mod defaults;
mod file;
mod models;

pub use builder::build_config;
pub use models::AppConfig;
