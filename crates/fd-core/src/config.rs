use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

const DEFAULT_CONFIG_PATHS: &[&str] = &["fwdelta.yaml", "/etc/fwdelta/config.yaml"];

/// Diff algorithm used by the differ
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiffAlgorithm {
    #[default]
    Myers,
    Patience,
    Lcs,
}

/// Tunables for one comparison run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Strip comments, fix `--X` typos and collapse whitespace before diffing
    pub normalize: bool,
    /// Sort normalized rules so listing order does not show up as change
    pub sort_rules: bool,
    /// Unchanged lines kept around each hunk
    pub context_lines: usize,
    pub algorithm: DiffAlgorithm,
    pub visualization: bool,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            normalize: true,
            sort_rules: true,
            context_lines: 3,
            algorithm: DiffAlgorithm::Myers,
            visualization: true,
        }
    }
}

impl AnalysisConfig {
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {}", path.display()))?;
        Self::from_yaml(&content)
            .with_context(|| format!("Failed to parse config YAML in {}", path.display()))
    }

    /// Load an explicit config file, or the first default location that exists
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }

        for candidate in DEFAULT_CONFIG_PATHS.iter().map(PathBuf::from) {
            if !candidate.is_file() {
                continue;
            }

            match Self::from_file(&candidate) {
                Ok(config) => {
                    debug!(path = %candidate.display(), "loaded analysis config");
                    return Ok(config);
                }
                Err(e) => {
                    warn!("Ignoring config {}: {:#}", candidate.display(), e);
                }
            }
        }

        Ok(Self::default())
    }
}
