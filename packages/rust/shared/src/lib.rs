//! Shared types, error model, and configuration for mdhtml.
//!
//! This crate is the foundation depended on by all other mdhtml crates.
//! It provides:
//! - [`MdHtmlError`] — the unified error type
//! - Domain types ([`ConversionJob`])
//! - Configuration ([`AppConfig`], [`RenderConfig`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, DefaultsConfig, RenderConfig, config_dir, config_file_path, init_config,
    load_config, load_config_from, validate_render_config,
};
pub use error::{MdHtmlError, Result};
pub use types::ConversionJob;
