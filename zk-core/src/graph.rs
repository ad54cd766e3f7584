//! In-memory link graph powered by petgraph.
//!
//! Nodes are zettel ids carrying a title; edges are citations. The graph is
//! undirected for identity purposes (a citation `1 -> 2` and `2 -> 1` are the
//! same edge) but remembers the direction of the first citation so renderers
//! can still draw an arrow.
//!
//! # Architecture
//!
//! ```text
//! ZettelRecord[] -> build_graph -> ZettelGraph -> layout / centrality -> PlotRenderer
//! ```

use crate::render::GraphSink;
use petgraph::graph::{NodeIndex, UnGraph};
use std::collections::{HashMap, HashSet};

/// Node payload.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ZettelNode {
    pub id: String,
    /// Empty for ids that were only ever linked to.
    pub title: String,
}

/// Edge payload: the direction the citation was first seen in.
#[derive(Clone, Debug, PartialEq, Eq)]
struct Citation {
    source: NodeIndex,
    target: NodeIndex,
}

/// Undirected graph of zettels keyed by id.
#[derive(Clone, Debug, Default)]
pub struct ZettelGraph {
    graph: UnGraph<ZettelNode, Citation>,
    node_map: HashMap<String, NodeIndex>,
}

impl ZettelGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index of `id`, creating an untitled node if needed.
    fn ensure_node(&mut self, id: &str) -> NodeIndex {
        if let Some(&idx) = self.node_map.get(id) {
            return idx;
        }
        let idx = self.graph.add_node(ZettelNode {
            id: id.to_string(),
            title: String::new(),
        });
        self.node_map.insert(id.to_string(), idx);
        idx
    }

    /// Get the number of nodes in the graph.
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Get the number of edges in the graph.
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Check if a node exists in the graph.
    pub fn has_node(&self, id: &str) -> bool {
        self.node_map.contains_key(id)
    }

    /// Check if `a` and `b` are linked, in either direction.
    pub fn has_edge(&self, a: &str, b: &str) -> bool {
        match (self.node_map.get(a), self.node_map.get(b)) {
            (Some(&a), Some(&b)) => self.graph.find_edge(a, b).is_some(),
            _ => false,
        }
    }

    /// Title of `id`, empty for link-only nodes.
    pub fn title(&self, id: &str) -> Option<&str> {
        self.node_map
            .get(id)
            .map(|&idx| self.graph[idx].title.as_str())
    }

    /// Node ids in insertion order.
    pub fn node_ids(&self) -> Vec<&str> {
        self.graph
            .node_indices()
            .map(|idx| self.graph[idx].id.as_str())
            .collect()
    }

    /// Nodes in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = &ZettelNode> {
        self.graph.node_weights()
    }

    /// Edges as `(source, target)` in insertion order, oriented as first cited.
    pub fn edges(&self) -> Vec<(&str, &str)> {
        self.graph
            .edge_weights()
            .map(|c| {
                (
                    self.graph[c.source].id.as_str(),
                    self.graph[c.target].id.as_str(),
                )
            })
            .collect()
    }

    /// Edges as `(source, target)` node positions, matching [`Self::node_ids`] order.
    pub fn edge_positions(&self) -> Vec<(usize, usize)> {
        self.graph
            .edge_weights()
            .map(|c| (c.source.index(), c.target.index()))
            .collect()
    }

    /// Distinct neighbours of `id`, excluding itself.
    pub fn neighbors(&self, id: &str) -> Vec<&str> {
        let Some(&start) = self.node_map.get(id) else {
            return vec![];
        };
        let mut seen = HashSet::new();
        self.graph
            .neighbors(start)
            .filter(|&n| n != start && seen.insert(n))
            .map(|n| self.graph[n].id.as_str())
            .collect()
    }

    /// Adjacency lists by node position, self-loops dropped.
    pub fn adjacency(&self) -> Vec<Vec<usize>> {
        self.graph
            .node_indices()
            .map(|idx| {
                let mut out: Vec<usize> = self
                    .graph
                    .neighbors(idx)
                    .filter(|&n| n != idx)
                    .map(|n| n.index())
                    .collect();
                out.sort_unstable();
                out.dedup();
                out
            })
            .collect()
    }

    /// Degree centrality per node, in [`Self::node_ids`] order.
    ///
    /// Number of distinct other nodes a node touches divided by `n - 1`. A
    /// graph with a single node gives it 1.0.
    pub fn degree_centrality(&self) -> Vec<f64> {
        let n = self.node_count();
        if n == 1 {
            return vec![1.0];
        }
        let scale = 1.0 / (n.saturating_sub(1)) as f64;
        self.adjacency()
            .iter()
            .map(|neighbors| neighbors.len() as f64 * scale)
            .collect()
    }
}

impl GraphSink for ZettelGraph {
    fn add_node(&mut self, id: &str, title: &str) {
        let idx = self.ensure_node(id);
        self.graph[idx].title = title.to_string();
    }

    fn add_edge(&mut self, source: &str, target: &str) {
        let s = self.ensure_node(source);
        let t = self.ensure_node(target);
        if self.graph.find_edge(s, t).is_none() {
            self.graph.add_edge(s, t, Citation { source: s, target: t });
        }
    }
}
