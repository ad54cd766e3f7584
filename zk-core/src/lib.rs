//! zk-core - Link-graph assembly for a Zettelkasten.
//!
//! Turns a folder of notes named `"<id> <title>.md"` into a graph where every
//! `[[id]]` citation is an edge, and draws that graph with one of two renderers.
//!
//! # Features
//!
//! - **Discovery**: glob patterns joined with `|`, sorted and deduplicated
//! - **Parsing**: id and title from the filename, citations from the body
//! - **Filtering**: drop self-references or links to notes outside the set
//! - **Rendering**: Graphviz diagrams or a self-contained interactive HTML plot
//!
//! # Usage
//!
//! ```no_run
//! use zk_core::{list_zettels, visualize, FilterPolicy, PlotRenderer};
//!
//! let paths = list_zettels(std::path::Path::new("notes"), "*.md")?;
//! let mut renderer = PlotRenderer::new();
//! let summary = visualize(&paths, &FilterPolicy::default(), &mut renderer, "zettel-network", false)?;
//! println!("{} nodes written to {}", summary.node_count, summary.output_path.display());
//! # Ok::<(), zk_core::ZkError>(())
//! ```

pub mod builder;
pub mod error;
pub mod graph;
pub mod layout;
pub mod parser;
pub mod render;
pub mod scanner;
pub mod types;
pub mod wrap;

use std::path::Path;

pub use builder::build_graph;
pub use error::{Result, ZkError};
pub use graph::ZettelGraph;
pub use parser::{parse_zettel, parse_zettels};
pub use render::{
    create_renderer, DotRenderer, GraphSink, GraphvizEngine, NodeStyle, OutputFormat,
    PlotRenderer, Renderer, RendererConfig, RendererKind,
};
pub use scanner::{join_patterns, list_zettels, DEFAULT_PATTERN};
pub use types::{FilterPolicy, RenderSummary, ZettelRecord};

/// Parse `paths`, build the graph into `renderer` and render it to `output`.
///
/// Fails with [`ZkError::NoZettelsFound`] before the renderer is touched when
/// none of the paths is a zettel.
pub fn visualize<P: AsRef<Path>>(
    paths: &[P],
    policy: &FilterPolicy,
    renderer: &mut dyn Renderer,
    output: &str,
    view: bool,
) -> Result<RenderSummary> {
    let records = parse_zettels(paths)?;
    if records.is_empty() {
        return Err(ZkError::NoZettelsFound);
    }
    tracing::info!("Parsed {} zettel(s) from {} file(s)", records.len(), paths.len());

    build_graph(&records, &mut *renderer, policy);
    let output_path = renderer.render(output, view)?;

    Ok(RenderSummary {
        zettel_count: records.len(),
        node_count: renderer.node_count(),
        edge_count: renderer.edge_count(),
        output_path,
    })
}

/// Get the library version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
