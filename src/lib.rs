// livegrab library - public API

// Re-export error types
pub mod error;
pub use error::{LivegrabError, Result};

// Module declarations
pub mod commands;
pub mod core;

// Re-export commonly used types
pub use crate::core::config::Settings;

// Initialize logging; RUST_LOG overrides the Info default
pub fn init_logging() {
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();
}
