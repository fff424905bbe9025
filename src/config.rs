//
//  config.rs
//  Butterfly
//
//  Created by hak (tharun)
//

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use tracing::warn;

use crate::error::{ButterflyError, Result};
use crate::graph::{ExclusionFilter, LayoutOptions};
use crate::language::{all_language_ids, SupportedLanguage};

/// Top-level Butterfly configuration (`butterfly.toml`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ButterflyConfig {
    #[serde(default)]
    pub graph: GraphConfig,
    #[serde(default)]
    pub display: DisplayConfig,
    #[serde(default)]
    pub project: ProjectConfig,
}

/// Expansion limits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphConfig {
    /// Depth of the caller wing.
    #[serde(default = "default_levels")]
    pub caller_levels: usize,
    /// Depth of the callee wing.
    #[serde(default = "default_levels")]
    pub callee_levels: usize,
    /// Bucket cap applied at layout time. Must be at least 1.
    #[serde(default = "default_max_nodes_per_level")]
    pub max_nodes_per_level: usize,
    /// Extra exclusion regexes, on top of the built-in ones.
    #[serde(default)]
    pub exclude: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DisplayConfig {
    #[serde(default)]
    pub theme: Theme,
}

/// Project-level settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectConfig {
    /// Languages Butterfly will analyze.
    #[serde(default = "all_language_ids")]
    pub languages: Vec<String>,
}

/// Colour scheme handed to the renderer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Default,
    Dark,
    Light,
}

impl Theme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Default => "default",
            Theme::Dark => "dark",
            Theme::Light => "light",
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Theme {
    type Err = ButterflyError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "default" => Ok(Theme::Default),
            "dark" => Ok(Theme::Dark),
            "light" => Ok(Theme::Light),
            other => Err(ButterflyError::InvalidConfig(format!(
                "unknown theme '{}' (expected default, dark or light)",
                other
            ))),
        }
    }
}

fn default_levels() -> usize {
    2
}

fn default_max_nodes_per_level() -> usize {
    10
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            caller_levels: default_levels(),
            callee_levels: default_levels(),
            max_nodes_per_level: default_max_nodes_per_level(),
            exclude: Vec::new(),
        }
    }
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            languages: all_language_ids(),
        }
    }
}

impl ButterflyConfig {
    /// Load config from a TOML file, falling back to defaults.
    pub fn load(path: &Path) -> Self {
        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "config not readable, using defaults");
                return Self::default();
            }
        };
        match Self::from_toml_str(&contents) {
            Ok(config) => config,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "invalid config, using defaults");
                Self::default()
            }
        }
    }

    /// Parse and validate a TOML document.
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: Self = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.graph.max_nodes_per_level == 0 {
            return Err(ButterflyError::InvalidConfig(
                "graph.max_nodes_per_level must be at least 1".to_string(),
            ));
        }
        if let Some(unknown) = self
            .project
            .languages
            .iter()
            .find(|id| SupportedLanguage::from_id(id).is_none())
        {
            return Err(ButterflyError::InvalidConfig(format!(
                "unknown language '{}' in project.languages",
                unknown
            )));
        }
        self.exclusion_filter()?;
        Ok(())
    }

    /// Limits threaded into one expansion and its layout.
    pub fn layout_options(&self) -> LayoutOptions {
        LayoutOptions {
            caller_levels: self.graph.caller_levels,
            callee_levels: self.graph.callee_levels,
            max_nodes_per_level: self.graph.max_nodes_per_level,
        }
    }

    /// Built-in exclusions plus `graph.exclude`.
    pub fn exclusion_filter(&self) -> Result<ExclusionFilter> {
        ExclusionFilter::with_patterns(&self.graph.exclude)
    }
}
