//! Renderer capability.
//!
//! A renderer receives `add_node` / `add_edge` calls from the builder and then
//! draws the result once with `render`. Two variants exist:
//!
//! - [`DotRenderer`]: static diagram laid out by an external Graphviz engine
//! - [`PlotRenderer`]: self-contained interactive HTML plot
//!
//! The variant is picked at startup from a [`RendererConfig`].

use crate::error::Result;
use crate::layout::LAYOUT_THRESHOLD;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::process::Command;
use std::str::FromStr;

pub mod graphviz;
pub mod plot;

pub use self::graphviz::{DotRenderer, GraphvizEngine, NodeStyle, OutputFormat};
pub use self::plot::{Figure, PlotRenderer};

/// Receiver of the builder's node and edge calls.
pub trait GraphSink {
    /// Add or retitle a node. Re-adding an id never creates a second node.
    fn add_node(&mut self, id: &str, title: &str);

    /// Add an edge between two ids. Adding the same edge twice is a no-op.
    fn add_edge(&mut self, source: &str, target: &str);
}

/// A graph sink that can draw itself to disk.
pub trait Renderer: GraphSink {
    /// Render to a file derived from `output` and return its path. Opens the
    /// result in the default viewer when `view` is set.
    fn render(&mut self, output: &str, view: bool) -> Result<PathBuf>;

    /// Number of distinct nodes received so far.
    fn node_count(&self) -> usize;

    /// Number of distinct edges received so far.
    fn edge_count(&self) -> usize;
}

/// Which renderer variant to use.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RendererKind {
    /// Static diagram through Graphviz
    #[serde(alias = "static")]
    Graphviz,
    /// Interactive HTML plot (default)
    #[default]
    #[serde(alias = "plot", alias = "interactive")]
    Plotly,
}

impl FromStr for RendererKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "graphviz" | "static" => Ok(Self::Graphviz),
            "plotly" | "plot" | "interactive" => Ok(Self::Plotly),
            _ => Err(format!("Unknown renderer: '{}'", s)),
        }
    }
}

/// Settings for both renderer variants; each reads the fields it needs.
#[derive(Debug, Clone)]
pub struct RendererConfig {
    pub kind: RendererKind,
    /// Graph name: a comment in the DOT source, the heading of the plot.
    pub name: String,
    pub engine: GraphvizEngine,
    pub node_style: NodeStyle,
    pub format: OutputFormat,
    /// Node count from which the plot switches to the random layout.
    pub layout_threshold: usize,
    /// Seed for the random layout.
    pub seed: Option<u64>,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            kind: RendererKind::default(),
            name: "Zettelkasten".to_string(),
            engine: GraphvizEngine::default(),
            node_style: NodeStyle::default(),
            format: OutputFormat::default(),
            layout_threshold: LAYOUT_THRESHOLD,
            seed: None,
        }
    }
}

/// Build the renderer selected by `config`.
pub fn create_renderer(config: &RendererConfig) -> Box<dyn Renderer> {
    match config.kind {
        RendererKind::Graphviz => Box::new(
            DotRenderer::new(&config.name)
                .with_engine(config.engine)
                .with_node_style(config.node_style)
                .with_format(config.format),
        ),
        RendererKind::Plotly => Box::new(
            PlotRenderer::new()
                .with_title(config.name.as_str())
                .with_layout_threshold(config.layout_threshold)
                .with_seed(config.seed),
        ),
    }
}

/// Open `path` with the platform's default application.
///
/// Failure to launch a viewer is logged, not returned: the file is already on
/// disk at this point.
pub fn open_in_viewer(path: &Path) {
    let mut cmd = if cfg!(target_os = "macos") {
        let mut c = Command::new("open");
        c.arg(path);
        c
    } else if cfg!(target_os = "windows") {
        let mut c = Command::new("cmd");
        c.args(["/C", "start", ""]).arg(path);
        c
    } else {
        let mut c = Command::new("xdg-open");
        c.arg(path);
        c
    };

    match cmd.spawn() {
        Ok(_) => tracing::debug!("Opened {} in viewer", path.display()),
        Err(e) => tracing::warn!("Could not open {}: {}", path.display(), e),
    }
}
