//! Application configuration for mdhtml.
//!
//! User config lives at `~/.mdhtml/mdhtml.toml`.
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{MdHtmlError, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "mdhtml.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".mdhtml";

// ---------------------------------------------------------------------------
// Config structs (matching mdhtml.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Batch defaults.
    #[serde(default)]
    pub defaults: DefaultsConfig,

    /// Rendering options handed to the rule pipeline.
    #[serde(default)]
    pub render: RenderConfig,
}

/// `[defaults]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultsConfig {
    /// Output directory used when converting a whole directory.
    #[serde(default = "default_output_dir")]
    pub output_dir: String,

    /// File extensions (without the dot) treated as Markdown.
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            extensions: default_extensions(),
        }
    }
}

fn default_output_dir() -> String {
    "output".into()
}
fn default_extensions() -> Vec<String> {
    vec!["md".into(), "markdown".into(), "mdown".into()]
}

/// `[render]` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderConfig {
    /// Randomly numeric-encode characters of autolinked email addresses.
    #[serde(default = "default_true")]
    pub obfuscate_emails: bool,

    /// Probability that an ordinary email character gets numerically encoded.
    #[serde(default = "default_email_encode_ratio")]
    pub email_encode_ratio: f64,

    /// Fixed RNG seed for reproducible obfuscation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email_seed: Option<u64>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            obfuscate_emails: true,
            email_encode_ratio: default_email_encode_ratio(),
            email_seed: None,
        }
    }
}

fn default_true() -> bool {
    true
}
fn default_email_encode_ratio() -> f64 {
    0.8
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.mdhtml/`).
pub fn config_dir() -> Result<PathBuf> {
    let home =
        dirs::home_dir().ok_or_else(|| MdHtmlError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.mdhtml/mdhtml.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| MdHtmlError::io(path, e))?;

    let config: AppConfig = toml::from_str(&content).map_err(|e| {
        MdHtmlError::config(format!("failed to parse {}: {e}", path.display()))
    })?;

    validate_render_config(&config.render)?;
    Ok(config)
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| MdHtmlError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| MdHtmlError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| MdHtmlError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

/// Check that render options are within range.
pub fn validate_render_config(render: &RenderConfig) -> Result<()> {
    let ratio = render.email_encode_ratio;
    if !(0.0..=1.0).contains(&ratio) {
        return Err(MdHtmlError::validation(format!(
            "email_encode_ratio {ratio} is outside 0.0..=1.0"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_serializes() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize default config");
        assert!(toml_str.contains("output_dir"));
        assert!(toml_str.contains("email_encode_ratio"));
        assert!(!toml_str.contains("email_seed"));
    }

    #[test]
    fn config_roundtrip() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize");
        let parsed: AppConfig = toml::from_str(&toml_str).expect("deserialize");
        assert_eq!(parsed.defaults.output_dir, "output");
        assert_eq!(parsed.defaults.extensions, vec!["md", "markdown", "mdown"]);
        assert_eq!(parsed.render, RenderConfig::default());
    }

    #[test]
    fn partial_config_fills_defaults() {
        let toml_str = r#"
[render]
email_seed = 7
"#;
        let config: AppConfig = toml::from_str(toml_str).expect("parse");
        assert_eq!(config.render.email_seed, Some(7));
        assert!(config.render.obfuscate_emails);
        assert_eq!(config.defaults.output_dir, "output");
    }

    #[test]
    fn load_config_from_file() {
        let dir = std::env::temp_dir().join(format!("mdhtml-config-{}", std::process::id()));
        std::fs::create_dir_all(&dir).expect("create temp dir");
        let path = dir.join("mdhtml.toml");
        std::fs::write(&path, "[defaults]\noutput_dir = \"site\"\n").expect("write config");

        let config = load_config_from(&path).expect("load");
        assert_eq!(config.defaults.output_dir, "site");

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn ratio_validation() {
        let mut render = RenderConfig::default();
        assert!(validate_render_config(&render).is_ok());

        render.email_encode_ratio = 1.5;
        let result = validate_render_config(&render);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("outside"));
    }
}
