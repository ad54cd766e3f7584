//! Data models shared by the parser, the builder and the renderers.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A note parsed from a file named `"<id> <title>.<ext>"`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZettelRecord {
    /// Digits from the start of the filename.
    pub id: String,
    /// Filename remainder after the separator, extension stripped.
    pub title: String,
    /// Ids cited as `[[id]]` in the body, in order of appearance, duplicates kept.
    pub links: Vec<String>,
}

impl ZettelRecord {
    pub fn new(id: impl Into<String>, title: impl Into<String>, links: Vec<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            links,
        }
    }
}

/// Which nodes and edges make it into the graph.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterPolicy {
    /// Keep edges from a zettel to itself.
    pub include_self_references: bool,
    /// Only draw edges whose target is one of the parsed zettels.
    pub only_listed: bool,
}

impl Default for FilterPolicy {
    fn default() -> Self {
        Self {
            include_self_references: true,
            only_listed: false,
        }
    }
}

impl FilterPolicy {
    pub fn new(include_self_references: bool, only_listed: bool) -> Self {
        Self {
            include_self_references,
            only_listed,
        }
    }
}

/// Outcome of a visualization run.
#[derive(Clone, Debug, Serialize)]
pub struct RenderSummary {
    pub zettel_count: usize,
    pub node_count: usize,
    pub edge_count: usize,
    pub output_path: PathBuf,
}
