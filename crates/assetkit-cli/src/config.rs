use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use assetkit_hierarchy::{BuildOptions, ExportOptions};

/// Settings read from the optional `--config` file.
///
/// Command-line flags override these.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    pub build: BuildOptions,
    pub export: ExportOptions,
    /// Skip the confirmation prompt for destructive dependency edits.
    pub assume_yes: bool,
}

impl CliConfig {
    pub fn from_toml(text: &str) -> anyhow::Result<Self> {
        toml::from_str(text).context("invalid config")
    }

    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        Self::from_toml(&text)
    }

    /// Load `path` if given, defaults otherwise.
    pub fn resolve(path: Option<&Path>) -> anyhow::Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }
}
