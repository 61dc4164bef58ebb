//! `prism.toml` loading
//!
//! Lookup order: the `--config` path, `./prism.toml`, then
//! `{config_dir}/prism/prism.toml`. Without any file the defaults apply.
//!
//! ```toml
//! [layout]
//! instance_attributes = ["pos", "color"]
//!
//! [parser]
//! max_depth = 128
//! ```

use anyhow::{Context, Result};
use prism_script::ParserConfig;
use prism_shader::LayoutConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const FILE_NAME: &str = "prism.toml";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub layout: LayoutConfig,
    pub parser: ParserConfig,
}

impl Settings {
    pub fn parse(text: &str) -> Result<Self> {
        toml::from_str(text).context("Invalid prism.toml")
    }

    /// Add instance attributes given on the command line
    pub fn extend_instance_attributes(&mut self, names: &[String]) {
        for name in names {
            if !self.layout.is_instance(name) {
                self.layout.instance_attributes.push(name.clone());
            }
        }
    }
}

/// Per-user config file location
fn user_settings_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("prism").join(FILE_NAME))
}

/// Load settings; an explicit path must exist, the fallbacks are optional
pub fn load_settings(explicit: Option<&Path>) -> Result<Settings> {
    if let Some(path) = explicit {
        return read_settings(path);
    }

    let local = Path::new(FILE_NAME);
    if local.exists() {
        return read_settings(local);
    }

    match user_settings_path() {
        Some(path) if path.exists() => read_settings(&path),
        _ => Ok(Settings::default()),
    }
}

fn read_settings(path: &Path) -> Result<Settings> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    let settings =
        Settings::parse(&text).with_context(|| format!("In config {}", path.display()))?;
    tracing::debug!(path = %path.display(), "loaded settings");
    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_file() {
        let settings = Settings::parse(
            r#"
            [layout]
            instance_attributes = ["pos"]

            [parser]
            max_depth = 64
            "#,
        )
        .unwrap();
        assert!(settings.layout.is_instance("pos"));
        assert_eq!(settings.parser.max_depth, 64);
    }

    #[test]
    fn test_missing_tables_use_defaults() {
        let settings = Settings::parse("").unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.parser, ParserConfig::default());

        let settings = Settings::parse("[parser]\nmax_depth = 8\n").unwrap();
        assert!(settings.layout.instance_attributes.is_empty());
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(Settings::parse("[parser]\nmax_depth = \"deep\"\n").is_err());
    }

    #[test]
    fn test_extend_skips_duplicates() {
        let mut settings = Settings::default();
        settings.extend_instance_attributes(&["pos".into(), "pos".into(), "scale".into()]);
        assert_eq!(settings.layout.instance_attributes, vec!["pos", "scale"]);
    }

    #[test]
    fn test_explicit_path_must_exist() {
        let err = load_settings(Some(Path::new("/nonexistent/prism.toml"))).unwrap_err();
        assert!(err.to_string().contains("Failed to read config"));
    }
}
