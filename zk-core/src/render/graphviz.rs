//! Static diagram renderer backed by Graphviz.
//!
//! Builds DOT source in memory and hands it to one of the Graphviz layout
//! executables (`sfdp` by default). Layout and drawing happen entirely in the
//! external engine.

use super::{open_in_viewer, GraphSink, Renderer};
use crate::error::{Result, ZkError};
use crate::wrap::{wrap_lines, TITLE_WIDTH};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::ffi::OsString;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::str::FromStr;

/// DOT escape for a line break inside a label.
const DOT_LINE_BREAK: &str = "\\n";

/// Graphviz layout engine (each one is a separate executable).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GraphvizEngine {
    Circo,
    Dot,
    Fdp,
    Neato,
    Osage,
    Patchwork,
    #[default]
    Sfdp,
    Twopi,
}

impl GraphvizEngine {
    pub const ALL: [GraphvizEngine; 8] = [
        Self::Circo,
        Self::Dot,
        Self::Fdp,
        Self::Neato,
        Self::Osage,
        Self::Patchwork,
        Self::Sfdp,
        Self::Twopi,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Circo => "circo",
            Self::Dot => "dot",
            Self::Fdp => "fdp",
            Self::Neato => "neato",
            Self::Osage => "osage",
            Self::Patchwork => "patchwork",
            Self::Sfdp => "sfdp",
            Self::Twopi => "twopi",
        }
    }
}

impl FromStr for GraphvizEngine {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|e| e.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("Unknown Graphviz layout engine: '{}'", s))
    }
}

impl fmt::Display for GraphvizEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a zettel is drawn.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeStyle {
    /// Id stacked above the wrapped title in a box
    #[default]
    Record,
    /// Wrapped "id title" text without a border
    Plaintext,
}

impl NodeStyle {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Record => "record",
            Self::Plaintext => "plaintext",
        }
    }
}

impl FromStr for NodeStyle {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "record" => Ok(Self::Record),
            "plaintext" => Ok(Self::Plaintext),
            _ => Err(format!("Unknown node style: '{}'", s)),
        }
    }
}

/// File type produced by the layout engine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Pdf,
    Png,
    Svg,
}

impl OutputFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Png => "png",
            Self::Svg => "svg",
        }
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim_start_matches('.').to_lowercase().as_str() {
            "pdf" => Ok(Self::Pdf),
            "png" => Ok(Self::Png),
            "svg" => Ok(Self::Svg),
            _ => Err(format!("Unsupported Graphviz output format: '{}'", s)),
        }
    }
}

/// Escape text for a double-quoted DOT string.
fn escape_dot(text: &str) -> String {
    text.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Escape text for a record label, where braces, bars and angle brackets
/// delimit fields.
fn escape_record(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in escape_dot(text).chars() {
        if matches!(c, '{' | '}' | '|' | '<' | '>') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Wrap `text` and join the escaped lines with the DOT line break.
fn wrap_label(text: &str, escape: fn(&str) -> String) -> String {
    wrap_lines(text, TITLE_WIDTH)
        .iter()
        .map(|line| escape(line))
        .collect::<Vec<_>>()
        .join(DOT_LINE_BREAK)
}

/// Node label for `style`, already escaped for a quoted DOT string.
pub fn node_label(id: &str, title: &str, style: NodeStyle) -> String {
    match style {
        NodeStyle::Plaintext => wrap_label(&format!("{} {}", id, title), escape_dot),
        NodeStyle::Record => {
            // Braces stack the fields vertically
            format!(
                "{{{}|{}}}",
                escape_record(id),
                wrap_label(title, escape_record)
            )
        }
    }
}

/// Graphviz-backed static diagram.
pub struct DotRenderer {
    name: String,
    engine: GraphvizEngine,
    node_style: NodeStyle,
    format: OutputFormat,
    /// Every id seen, in first-seen order; `None` title means edge-only.
    nodes: Vec<(String, Option<String>)>,
    node_map: HashMap<String, usize>,
    edges: Vec<(String, String)>,
    edge_set: HashSet<(String, String)>,
    /// PATH override for locating the engine executable.
    search_path: Option<OsString>,
}

impl DotRenderer {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            engine: GraphvizEngine::default(),
            node_style: NodeStyle::default(),
            format: OutputFormat::default(),
            nodes: Vec::new(),
            node_map: HashMap::new(),
            edges: Vec::new(),
            edge_set: HashSet::new(),
            search_path: None,
        }
    }

    /// Builder: set the layout engine
    pub fn with_engine(mut self, engine: GraphvizEngine) -> Self {
        self.engine = engine;
        self
    }

    /// Builder: set the node style
    pub fn with_node_style(mut self, style: NodeStyle) -> Self {
        self.node_style = style;
        self
    }

    /// Builder: set the output file type
    pub fn with_format(mut self, format: OutputFormat) -> Self {
        self.format = format;
        self
    }

    /// Builder: look for the engine in `paths` instead of `$PATH`
    pub fn with_search_path(mut self, paths: impl Into<OsString>) -> Self {
        self.search_path = Some(paths.into());
        self
    }

    fn touch_node(&mut self, id: &str) -> usize {
        if let Some(&idx) = self.node_map.get(id) {
            return idx;
        }
        self.nodes.push((id.to_string(), None));
        self.node_map.insert(id.to_string(), self.nodes.len() - 1);
        self.nodes.len() - 1
    }

    /// The DOT source for everything added so far.
    pub fn source(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!("// {}\n", self.name));
        out.push_str("digraph {\n");

        for (id, title) in &self.nodes {
            // Edge-only ids are left for the engine to create.
            let Some(title) = title else { continue };
            out.push_str(&format!(
                "\t\"{}\" [label=\"{}\" shape={}]\n",
                escape_dot(id),
                node_label(id, title, self.node_style),
                self.node_style.as_str()
            ));
        }

        for (source, target) in &self.edges {
            out.push_str(&format!(
                "\t\"{}\" -> \"{}\"\n",
                escape_dot(source),
                escape_dot(target)
            ));
        }

        out.push_str("}\n");
        out
    }

    /// Locate the engine executable.
    fn find_engine(&self) -> Result<PathBuf> {
        let engine = self.engine.as_str();
        let found = match &self.search_path {
            Some(paths) => {
                let cwd = std::env::current_dir()?;
                which::which_in(engine, Some(paths), cwd)
            }
            None => which::which(engine),
        };
        found.map_err(|_| ZkError::MissingRenderEngine {
            engine: engine.to_string(),
        })
    }

    fn source_path(output: &str) -> PathBuf {
        if output.ends_with(".gv") {
            PathBuf::from(output)
        } else {
            PathBuf::from(format!("{}.gv", output))
        }
    }
}

impl GraphSink for DotRenderer {
    fn add_node(&mut self, id: &str, title: &str) {
        let idx = self.touch_node(id);
        self.nodes[idx].1 = Some(title.to_string());
    }

    fn add_edge(&mut self, source: &str, target: &str) {
        self.touch_node(source);
        self.touch_node(target);
        let key = (source.to_string(), target.to_string());
        if self.edge_set.insert(key.clone()) {
            self.edges.push(key);
        }
    }
}

impl Renderer for DotRenderer {
    /// Writes `<output>.gv` and renders it to `<output>.gv.<format>`.
    fn render(&mut self, output: &str, view: bool) -> Result<PathBuf> {
        let engine_path = self.find_engine()?;

        let source_path = Self::source_path(output);
        fs::write(&source_path, self.source())?;

        let mut rendered = source_path.clone().into_os_string();
        rendered.push(".");
        rendered.push(self.format.as_str());
        let rendered = PathBuf::from(rendered);

        tracing::info!(
            "Rendering {} with {} to {}",
            source_path.display(),
            self.engine,
            rendered.display()
        );

        let result = Command::new(&engine_path)
            .arg(format!("-T{}", self.format.as_str()))
            .arg("-o")
            .arg(&rendered)
            .arg(&source_path)
            .output()
            .map_err(|e| ZkError::RenderFailed {
                engine: self.engine.to_string(),
                message: e.to_string(),
            })?;

        if !result.status.success() {
            let stderr = String::from_utf8_lossy(&result.stderr).trim().to_string();
            return Err(ZkError::RenderFailed {
                engine: self.engine.to_string(),
                message: if stderr.is_empty() {
                    result.status.to_string()
                } else {
                    stderr
                },
            });
        }

        if view {
            open_in_viewer(Path::new(&rendered));
        }
        Ok(rendered)
    }

    fn node_count(&self) -> usize {
        self.nodes.len()
    }

    fn edge_count(&self) -> usize {
        self.edges.len()
    }
}
