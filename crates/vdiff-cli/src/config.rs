//! Parser settings from a TOML file and command-line flags

use serde::Deserialize;
use std::path::Path;
use vdiff_core::ParseOptions;

/// Contents of a `--config` file
///
/// ```toml
/// [parse]
/// collapse_multiple_code_lines = true
/// ignore_empty_lines = false
/// ```
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    pub parse: ParseOptions,
}

impl CliConfig {
    pub fn load(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| format!("cannot read config {}: {}", path.display(), e))?;
        let config = toml::from_str(&text)
            .map_err(|e| format!("invalid config {}: {}", path.display(), e))?;
        Ok(config)
    }
}

/// Settings of the config file with the given flags switched on
pub fn resolve_parse_options(
    config: Option<&Path>,
    collapse: bool,
    ignore_empty: bool,
) -> Result<ParseOptions, Box<dyn std::error::Error>> {
    let base = match config {
        Some(path) => CliConfig::load(path)?.parse,
        None => ParseOptions::default(),
    };
    Ok(ParseOptions {
        collapse_multiple_code_lines: base.collapse_multiple_code_lines || collapse,
        ignore_empty_lines: base.ignore_empty_lines || ignore_empty,
    })
}
