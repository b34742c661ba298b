//! Undirected book graph backed by petgraph.

use petgraph::stable_graph::{NodeIndex, StableUnGraph};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use shelfnet_core::{Error, Result};

/// An admitted connection between two books.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphEdge {
    pub source: String,
    pub target: String,
    /// Genres that justified the edge, in admission order. Empty for
    /// overlap-threshold edges.
    pub genres: Vec<String>,
    /// Genre overlap of the two books, in [0, 1].
    pub weight: f64,
}

/// Simple undirected graph of books: no self-loops, at most one edge per pair.
///
/// Only the builder in this crate mutates it; callers get a finished,
/// read-only graph.
#[derive(Debug, Clone, Default)]
pub struct BookGraph {
    graph: StableUnGraph<String, GraphEdge>,
    node_index: HashMap<String, NodeIndex>,
}

impl BookGraph {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Add a node for `title`; adding an existing title is a no-op.
    pub(crate) fn add_node(&mut self, title: &str) -> NodeIndex {
        if let Some(&ix) = self.node_index.get(title) {
            return ix;
        }
        let ix = self.graph.add_node(title.to_string());
        self.node_index.insert(title.to_string(), ix);
        ix
    }

    /// Insert an edge between two existing nodes.
    ///
    /// Returns `false` for a self-pair or when the pair is already connected;
    /// in the latter case any new genres are appended to the existing label.
    pub(crate) fn add_edge(&mut self, edge: GraphEdge) -> Result<bool> {
        if edge.source == edge.target {
            return Ok(false);
        }
        let a = self.index_of(&edge.source)?;
        let b = self.index_of(&edge.target)?;

        if let Some(existing) = self.graph.find_edge(a, b) {
            if let Some(label) = self.graph.edge_weight_mut(existing) {
                for genre in edge.genres {
                    if !label.genres.contains(&genre) {
                        label.genres.push(genre);
                    }
                }
            }
            return Ok(false);
        }

        self.graph.add_edge(a, b, edge);
        Ok(true)
    }

    /// Drop every node without edges. Returns how many were removed.
    pub(crate) fn remove_isolated(&mut self) -> usize {
        let isolated: Vec<NodeIndex> = self
            .graph
            .node_indices()
            .filter(|&ix| self.graph.neighbors(ix).next().is_none())
            .collect();

        for &ix in &isolated {
            if let Some(title) = self.graph.remove_node(ix) {
                self.node_index.remove(&title);
            }
        }
        isolated.len()
    }

    fn index_of(&self, title: &str) -> Result<NodeIndex> {
        self.node_index
            .get(title)
            .copied()
            .ok_or_else(|| Error::NotFound(format!("node '{}'", title)))
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    pub fn contains_node(&self, title: &str) -> bool {
        self.node_index.contains_key(title)
    }

    pub fn contains_edge(&self, a: &str, b: &str) -> bool {
        self.edge(a, b).is_some()
    }

    /// Label of the edge between `a` and `b`, in either direction.
    pub fn edge(&self, a: &str, b: &str) -> Option<&GraphEdge> {
        let a = *self.node_index.get(a)?;
        let b = *self.node_index.get(b)?;
        self.graph
            .find_edge(a, b)
            .and_then(|e| self.graph.edge_weight(e))
    }

    /// Number of edges touching `title`, or `None` if it is not a node.
    pub fn degree(&self, title: &str) -> Option<usize> {
        let ix = *self.node_index.get(title)?;
        Some(self.graph.neighbors(ix).count())
    }

    pub fn neighbors<'a>(&'a self, title: &str) -> Vec<&'a str> {
        match self.node_index.get(title) {
            Some(&ix) => self
                .graph
                .neighbors(ix)
                .filter_map(|n| self.graph.node_weight(n))
                .map(String::as_str)
                .collect(),
            None => Vec::new(),
        }
    }

    /// Titles in insertion (catalog) order.
    pub fn nodes(&self) -> impl Iterator<Item = &str> + '_ {
        self.graph
            .node_indices()
            .filter_map(|ix| self.graph.node_weight(ix))
            .map(String::as_str)
    }

    /// Edges in insertion (admission) order.
    pub fn edges(&self) -> impl Iterator<Item = &GraphEdge> + '_ {
        self.graph
            .edge_indices()
            .filter_map(|e| self.graph.edge_weight(e))
    }

    pub fn stats(&self) -> GraphStats {
        GraphStats {
            node_count: self.graph.node_count(),
            edge_count: self.graph.edge_count(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphStats {
    pub node_count: usize,
    pub edge_count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn edge(a: &str, b: &str, genres: &[&str]) -> GraphEdge {
        GraphEdge {
            source: a.into(),
            target: b.into(),
            genres: genres.iter().map(|g| g.to_string()).collect(),
            weight: 1.0,
        }
    }

    fn triangle_with_loner() -> BookGraph {
        let mut graph = BookGraph::new();
        for title in ["A", "B", "C", "D"] {
            graph.add_node(title);
        }
        graph.add_edge(edge("A", "B", &["x"])).unwrap();
        graph.add_edge(edge("B", "C", &["y"])).unwrap();
        graph.add_edge(edge("C", "A", &["z"])).unwrap();
        graph
    }

    #[test]
    fn test_add_node_idempotent() {
        let mut graph = BookGraph::new();
        let first = graph.add_node("A");
        let second = graph.add_node("A");
        assert_eq!(first, second);
        assert_eq!(graph.node_count(), 1);
    }

    #[test]
    fn test_duplicate_edge_merges_genres() {
        let mut graph = triangle_with_loner();
        assert!(!graph.add_edge(edge("B", "A", &["x", "w"])).unwrap());
        assert_eq!(graph.edge_count(), 3);
        assert_eq!(graph.edge("A", "B").unwrap().genres, ["x", "w"]);
    }

    #[test]
    fn test_self_pair_ignored() {
        let mut graph = triangle_with_loner();
        assert!(!graph.add_edge(edge("A", "A", &["x"])).unwrap());
        assert_eq!(graph.degree("A"), Some(2));
    }

    #[test]
    fn test_edge_to_unknown_node() {
        let mut graph = triangle_with_loner();
        assert!(matches!(
            graph.add_edge(edge("A", "Z", &["x"])),
            Err(Error::NotFound(_))
        ));
    }

    #[test]
    fn test_remove_isolated() {
        let mut graph = triangle_with_loner();
        assert_eq!(graph.remove_isolated(), 1);
        assert_eq!(
            graph.stats(),
            GraphStats {
                node_count: 3,
                edge_count: 3
            }
        );
        assert!(!graph.contains_node("D"));
        assert_eq!(graph.nodes().collect::<Vec<_>>(), ["A", "B", "C"]);
        assert!(graph.contains_edge("A", "C"));
        assert_eq!(graph.degree("D"), None);
    }

    #[test]
    fn test_neighbors() {
        let graph = triangle_with_loner();
        let mut neighbors = graph.neighbors("A");
        neighbors.sort_unstable();
        assert_eq!(neighbors, ["B", "C"]);
        assert!(graph.neighbors("D").is_empty());
    }
}
