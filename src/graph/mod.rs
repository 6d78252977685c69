//! Element Dependency Graph
//!
//! Purpose-built adjacency list keyed by element id. Built wholesale from the
//! registries on every invocation; nothing is kept between calls.
//!
//! This module is shared between:
//! - DependencyTracker (dependents, cycles)
//! - ProjectionEngine (rule-driven traversal)

pub mod projection;
pub mod references;
pub mod relationships;
pub mod tracker;

pub use projection::{ProjectionEngine, ProjectionRule};
pub use references::{ReferenceRegistry, ReferenceStats};
pub use relationships::{RelationshipRegistry, RelationshipStats, RelationshipType};
pub use tracker::DependencyTracker;

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Edge record: reference type or relationship predicate, plus description
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphEdge {
    pub source: String,
    pub target: String,
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Directed graph over element ids
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    /// Node ids in insertion order
    nodes: Vec<String>,

    /// Index: id -> position in `nodes`
    node_indices: HashMap<String, usize>,

    /// All edges in insertion order
    edges: Vec<GraphEdge>,

    /// Index: source id -> edge positions
    outgoing: HashMap<String, Vec<usize>>,

    /// Index: target id -> edge positions
    incoming: HashMap<String, Vec<usize>>,
}

impl DependencyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node; no-op if present
    pub fn add_node(&mut self, id: &str) {
        if !self.node_indices.contains_key(id) {
            self.node_indices.insert(id.to_string(), self.nodes.len());
            self.nodes.push(id.to_string());
        }
    }

    /// Add an edge, creating both endpoints if needed
    pub fn add_edge(&mut self, edge: GraphEdge) {
        self.add_node(&edge.source);
        self.add_node(&edge.target);

        let position = self.edges.len();
        self.outgoing.entry(edge.source.clone()).or_default().push(position);
        self.incoming.entry(edge.target.clone()).or_default().push(position);
        self.edges.push(edge);
    }

    pub fn contains(&self, id: &str) -> bool {
        self.node_indices.contains_key(id)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Node ids in insertion order
    pub fn nodes(&self) -> &[String] {
        &self.nodes
    }

    pub fn edges(&self) -> &[GraphEdge] {
        &self.edges
    }

    /// Outgoing edges of `id`
    pub fn edges_from(&self, id: &str) -> Vec<&GraphEdge> {
        self.outgoing
            .get(id)
            .map(|positions| positions.iter().map(|&p| &self.edges[p]).collect())
            .unwrap_or_default()
    }

    /// Incoming edges of `id`
    pub fn edges_to(&self, id: &str) -> Vec<&GraphEdge> {
        self.incoming
            .get(id)
            .map(|positions| positions.iter().map(|&p| &self.edges[p]).collect())
            .unwrap_or_default()
    }

    /// Distinct direct successors (what `id` depends on)
    pub fn successors(&self, id: &str) -> Vec<&str> {
        let mut out: Vec<&str> = Vec::new();
        for edge in self.edges_from(id) {
            if !out.contains(&edge.target.as_str()) {
                out.push(&edge.target);
            }
        }
        out
    }

    /// Distinct direct predecessors (what depends on `id`)
    pub fn predecessors(&self, id: &str) -> Vec<&str> {
        let mut out: Vec<&str> = Vec::new();
        for edge in self.edges_to(id) {
            if !out.contains(&edge.source.as_str()) {
                out.push(&edge.source);
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn edge(source: &str, target: &str) -> GraphEdge {
        GraphEdge {
            source: source.to_string(),
            target: target.to_string(),
            kind: "uses".to_string(),
            description: None,
        }
    }

    #[test]
    fn test_adjacency() {
        let mut graph = DependencyGraph::new();
        graph.add_edge(edge("a", "b"));
        graph.add_edge(edge("a", "b"));
        graph.add_edge(edge("c", "b"));

        assert_eq!(graph.node_count(), 3);
        assert_eq!(graph.edge_count(), 3);
        assert_eq!(graph.nodes(), &["a", "b", "c"]);
        assert_eq!(graph.successors("a"), vec!["b"]);
        assert_eq!(graph.predecessors("b"), vec!["a", "c"]);
        assert_eq!(graph.edges_to("b").len(), 3);
        assert!(graph.edges_from("missing").is_empty());
    }
}
