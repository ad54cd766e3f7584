//! zkviz configuration loading from `.zkvizrc.toml`.
//!
//! The file is optional. Every setting can also be given on the command line,
//! and command-line flags win.
//!
//! # Example Configuration
//!
//! ```toml
//! [discovery]
//! notes_dir = "notes"
//! patterns = ["*.md", "*.txt"]
//!
//! [filter]
//! only_listed = true
//! include_self_references = false
//!
//! [graphviz]
//! engine = "neato"
//! style = "plaintext"
//! format = "svg"
//!
//! [plot]
//! layout_threshold = 500
//! seed = 42
//!
//! [output]
//! renderer = "graphviz"
//! name = "my-network"
//! view = false
//! format = "json"
//! compact = true
//! color = false
//! ```

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;
use zk_core::{GraphvizEngine, NodeStyle, OutputFormat as DiagramFormat, RendererKind};

/// Name of the config file looked up in the working directory.
pub const CONFIG_FILE: &str = ".zkvizrc.toml";

/// Root configuration structure loaded from `.zkvizrc.toml`.
#[derive(Debug, Deserialize, Default)]
pub struct ZkvizConfig {
    #[serde(default)]
    pub discovery: DiscoveryConfig,

    #[serde(default)]
    pub filter: FilterConfig,

    #[serde(default)]
    pub graphviz: GraphvizConfig,

    #[serde(default)]
    pub plot: PlotConfig,

    #[serde(default)]
    pub output: OutputSettings,
}

/// Where to look for zettels.
#[derive(Debug, Deserialize, Default)]
pub struct DiscoveryConfig {
    /// Directory searched when no explicit paths are given.
    #[serde(default)]
    pub notes_dir: Option<String>,

    /// Glob patterns relative to the notes directory.
    ///
    /// Default: `["*.md"]`
    #[serde(default)]
    pub patterns: Vec<String>,
}

/// Which nodes and edges are drawn.
#[derive(Debug, Deserialize, Default)]
pub struct FilterConfig {
    /// Only draw links whose target is one of the found zettels.
    #[serde(default)]
    pub only_listed: Option<bool>,

    /// Draw a zettel's links to itself. Default: `true`
    #[serde(default)]
    pub include_self_references: Option<bool>,
}

/// Static diagram settings, used with `--use-graphviz`.
#[derive(Debug, Deserialize, Default)]
pub struct GraphvizConfig {
    #[serde(default)]
    pub engine: Option<GraphvizEngine>,

    #[serde(default)]
    pub style: Option<NodeStyle>,

    #[serde(default)]
    pub format: Option<DiagramFormat>,
}

/// Interactive plot settings.
#[derive(Debug, Deserialize, Default)]
pub struct PlotConfig {
    /// Node count from which the random layout replaces Kamada-Kawai.
    #[serde(default)]
    pub layout_threshold: Option<usize>,

    /// Seed for the random layout.
    #[serde(default)]
    pub seed: Option<u64>,
}

/// Output file and summary preferences.
#[derive(Debug, Deserialize, Default)]
pub struct OutputSettings {
    /// `graphviz` (alias `static`) or `plotly` (aliases `plot`, `interactive`).
    #[serde(default)]
    pub renderer: Option<RendererKind>,

    /// Output file name without extension.
    #[serde(default)]
    pub name: Option<String>,

    /// Open the rendered file when done.
    #[serde(default)]
    pub view: Option<bool>,

    /// Summary format: `table` or `json`.
    #[serde(default)]
    pub format: Option<String>,

    /// Print the JSON summary on a single line.
    #[serde(default)]
    pub compact: Option<bool>,

    /// Force colored output on or off.
    #[serde(default)]
    pub color: Option<bool>,
}

impl ZkvizConfig {
    /// Load `.zkvizrc.toml` from `root`, falling back to defaults.
    ///
    /// A missing file is not an error. Read and parse errors are logged as
    /// warnings and the defaults are used.
    pub fn load(root: &Path) -> Self {
        let config_path = root.join(CONFIG_FILE);
        if !config_path.exists() {
            return Self::default();
        }
        match std::fs::read_to_string(&config_path) {
            Ok(content) => Self::parse_or_default(&content, &config_path),
            Err(e) => {
                tracing::warn!("Failed to read {}: {}", config_path.display(), e);
                Self::default()
            }
        }
    }

    /// Load an explicitly named config file.
    ///
    /// The file must exist and be readable; parse errors still fall back to
    /// defaults with a warning.
    pub fn load_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Ok(Self::parse_or_default(&content, path))
    }

    fn parse_or_default(content: &str, path: &Path) -> Self {
        match toml::from_str(content) {
            Ok(config) => {
                tracing::debug!("Loaded config from {}", path.display());
                config
            }
            Err(e) => {
                tracing::warn!("Failed to parse {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Get the configured discovery patterns (empty means the default).
    pub fn patterns(&self) -> &[String] {
        &self.discovery.patterns
    }

    /// Get the default summary format, if configured.
    pub fn default_format(&self) -> Option<&str> {
        self.output.format.as_deref()
    }

    /// Returns the configured value, or `None` to use auto-detection.
    pub fn use_color(&self) -> Option<bool> {
        self.output.color
    }
}
