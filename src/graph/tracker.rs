//! Dependency Tracker
//!
//! Graph algorithms over the element graph: transitive closures in both
//! directions, impact grouping by layer, and cycle detection.

use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};
use tracing::debug;

use crate::layer::Layer;
use crate::model::Model;

use super::{DependencyGraph, ReferenceRegistry, RelationshipRegistry};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Color {
    White,
    Gray,
    Black,
}

#[derive(Debug, Clone, Default)]
pub struct DependencyTracker {
    graph: DependencyGraph,
}

impl DependencyTracker {
    pub fn new(graph: DependencyGraph) -> Self {
        Self { graph }
    }

    /// Tracker over every reference and relationship in the model
    pub fn from_model(model: &Model) -> Self {
        let mut graph = ReferenceRegistry::from_model(model).dependency_graph();
        for edge in RelationshipRegistry::from_model(model).dependency_graph().edges() {
            graph.add_edge(edge.clone());
        }
        debug!(
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            "Built dependency graph"
        );
        Self { graph }
    }

    pub fn graph(&self) -> &DependencyGraph {
        &self.graph
    }

    pub fn direct_dependents(&self, id: &str) -> Vec<String> {
        self.graph.predecessors(id).into_iter().map(String::from).collect()
    }

    pub fn direct_dependencies(&self, id: &str) -> Vec<String> {
        self.graph.successors(id).into_iter().map(String::from).collect()
    }

    /// Everything depending on `id`, directly or not, in breadth-first order.
    /// `id` itself is never included.
    pub fn transitive_dependents(&self, id: &str) -> Vec<String> {
        self.closure(id, |node| self.graph.predecessors(node))
    }

    /// Everything `id` depends on, directly or not, in breadth-first order
    pub fn transitive_dependencies(&self, id: &str) -> Vec<String> {
        self.closure(id, |node| self.graph.successors(node))
    }

    fn closure<'a, F>(&'a self, start: &'a str, next: F) -> Vec<String>
    where
        F: Fn(&str) -> Vec<&'a str>,
    {
        let mut visited: HashSet<&str> = HashSet::from([start]);
        let mut queue: VecDeque<&str> = VecDeque::from([start]);
        let mut out = Vec::new();

        while let Some(node) = queue.pop_front() {
            for neighbour in next(node) {
                if visited.insert(neighbour) {
                    out.push(neighbour.to_string());
                    queue.push_back(neighbour);
                }
            }
        }

        out
    }

    /// Transitive dependents of `id` grouped by their layer.
    ///
    /// Ids without a recognisable layer prefix are left out.
    pub fn impact_analysis(&self, id: &str) -> BTreeMap<Layer, Vec<String>> {
        let mut impact: BTreeMap<Layer, Vec<String>> = BTreeMap::new();
        for dependent in self.transitive_dependents(id) {
            match Layer::from_element_id(&dependent) {
                Some(layer) => impact.entry(layer).or_default().push(dependent),
                None => debug!("No layer for dependent '{}'", dependent),
            }
        }
        impact
    }

    /// Every distinct cycle, each as the ordered list of ids along it.
    ///
    /// A cycle is reported once, rotated so that its smallest id comes first.
    /// A self-loop is a cycle of length one.
    pub fn detect_cycles(&self) -> Vec<Vec<String>> {
        let mut colors: HashMap<&str, Color> = self
            .graph
            .nodes()
            .iter()
            .map(|n| (n.as_str(), Color::White))
            .collect();
        let mut seen: HashSet<Vec<String>> = HashSet::new();
        let mut cycles = Vec::new();

        for root in self.graph.nodes() {
            if colors.get(root.as_str()) != Some(&Color::White) {
                continue;
            }

            // Explicit DFS stack of (node, successors, next successor index);
            // `path` mirrors the gray nodes on it.
            let mut stack: Vec<(&str, Vec<&str>, usize)> = Vec::new();
            let mut path: Vec<&str> = Vec::new();

            colors.insert(root.as_str(), Color::Gray);
            path.push(root.as_str());
            stack.push((root.as_str(), self.graph.successors(root), 0));

            while let Some((node, successors, index)) = stack.last_mut() {
                let Some(&next) = successors.get(*index) else {
                    colors.insert(*node, Color::Black);
                    path.pop();
                    stack.pop();
                    continue;
                };
                *index += 1;

                match colors.get(next).copied().unwrap_or(Color::White) {
                    Color::White => {
                        colors.insert(next, Color::Gray);
                        path.push(next);
                        stack.push((next, self.graph.successors(next), 0));
                    }
                    Color::Gray => {
                        if let Some(start) = path.iter().position(|&n| n == next) {
                            let cycle = canonical_rotation(&path[start..]);
                            if seen.insert(cycle.clone()) {
                                cycles.push(cycle);
                            }
                        }
                    }
                    Color::Black => {}
                }
            }
        }

        cycles
    }
}

fn canonical_rotation(cycle: &[&str]) -> Vec<String> {
    let pivot = cycle
        .iter()
        .enumerate()
        .min_by_key(|(_, id)| **id)
        .map(|(i, _)| i)
        .unwrap_or(0);
    cycle[pivot..]
        .iter()
        .chain(cycle[..pivot].iter())
        .map(|s| s.to_string())
        .collect()
}
