pub mod check;
pub mod construct;
pub mod parse;
pub mod project;
pub mod refine;
pub mod transform;
pub mod unparse;

use clap::Args;
use std::path::{Path, PathBuf};
use vdiff_core::{DiffSource, ParseOptions, VariationDiff, VariationDiffParser};

use crate::config::resolve_parse_options;

/// Parser and output flags shared by every subcommand
#[derive(Debug, Args)]
pub struct CommonArgs {
    /// TOML file with a [parse] table
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Collapse consecutive code lines of one diff type into one node
    #[arg(long)]
    pub collapse: bool,

    /// Drop empty and whitespace-only lines
    #[arg(long)]
    pub ignore_empty: bool,

    /// Output file (defaults to stdout)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

impl CommonArgs {
    pub fn parse_options(&self) -> Result<ParseOptions, Box<dyn std::error::Error>> {
        resolve_parse_options(self.config.as_deref(), self.collapse, self.ignore_empty)
    }

    pub fn write(&self, text: &str) -> Result<(), Box<dyn std::error::Error>> {
        if let Some(path) = &self.output {
            std::fs::write(path, text)
                .map_err(|e| format!("cannot write {}: {}", path.display(), e))?;
        } else {
            print!("{}", text);
        }
        Ok(())
    }
}

pub fn read_file(path: &Path) -> Result<String, Box<dyn std::error::Error>> {
    tracing::debug!(path = %path.display(), "reading input");
    let text = std::fs::read_to_string(path)
        .map_err(|e| format!("cannot read {}: {}", path.display(), e))?;
    Ok(text)
}

pub fn source_of(path: &Path) -> DiffSource {
    DiffSource::Text {
        name: path.display().to_string(),
    }
}

/// Read a diff file, drop its unified headers and parse it
pub fn load_diff(path: &Path, common: &CommonArgs) -> Result<VariationDiff, Box<dyn std::error::Error>> {
    let text = vdiff_core::parse::strip_unified_headers(&read_file(path)?);
    let diff = VariationDiffParser::new(common.parse_options()?).parse_diff(&text, source_of(path))?;
    Ok(diff)
}
