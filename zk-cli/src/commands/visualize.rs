//! Visualize command - render the zettel network.
//!
//! Finds the zettels (or takes them from the command line), builds the link
//! graph into the selected renderer and prints a short summary.

use anyhow::{Context, Result};
use colored::Colorize;
use serde::Serialize;
use std::path::PathBuf;

use crate::output::{Output, OutputConfig, TableDisplay};
use zk_core::{create_renderer, list_zettels, visualize, FilterPolicy, RendererConfig, RendererKind};

/// Fully resolved settings for one run.
#[derive(Debug, Clone)]
pub struct VisualizeOptions {
    pub notes_dir: PathBuf,
    /// Explicit zettel files; discovery is skipped when non-empty.
    pub paths: Vec<PathBuf>,
    /// `|`-separated glob patterns.
    pub pattern: String,
    pub output: String,
    pub view: bool,
    pub policy: FilterPolicy,
    pub renderer: RendererConfig,
}

/// Result of a visualization run
#[derive(Debug, Serialize)]
pub struct VisualizeResult {
    pub renderer: RendererKind,
    pub zettel_count: usize,
    pub node_count: usize,
    pub edge_count: usize,
    pub output_path: String,
}

impl TableDisplay for VisualizeResult {
    fn to_table(&self) -> String {
        format!(
            "{} Rendered {} zettels ({} nodes, {} edges) to {}",
            "SUCCESS:".green().bold(),
            self.zettel_count,
            self.node_count,
            self.edge_count,
            self.output_path.cyan()
        )
    }
}

/// Run the visualize command
pub fn run(options: &VisualizeOptions, output: OutputConfig) -> Result<()> {
    let paths = if options.paths.is_empty() {
        list_zettels(&options.notes_dir, &options.pattern).with_context(|| {
            format!("Failed to list zettels in {}", options.notes_dir.display())
        })?
    } else {
        options.paths.clone()
    };
    tracing::debug!("{} candidate file(s)", paths.len());

    let mut renderer = create_renderer(&options.renderer);
    let summary = visualize(
        &paths,
        &options.policy,
        renderer.as_mut(),
        &options.output,
        options.view,
    )?;

    let result = VisualizeResult {
        renderer: options.renderer.kind,
        zettel_count: summary.zettel_count,
        node_count: summary.node_count,
        edge_count: summary.edge_count,
        output_path: summary.output_path.display().to_string(),
    };

    Output::new(result, output).render()
}
