//! Reference Registry
//!
//! Indexes references by source, target and type. Rebuilt from the current
//! model state on each use.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap, HashSet};

use crate::model::{Element, Model, Reference};

use super::{DependencyGraph, GraphEdge};

/// Summary counts of a [`ReferenceRegistry`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReferenceStats {
    pub total_references: usize,
    pub unique_sources: usize,
    pub unique_targets: usize,
    /// Distinct reference types, sorted
    pub reference_types: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ReferenceRegistry {
    references: Vec<Reference>,

    /// Index: source id -> positions
    by_source: HashMap<String, Vec<usize>>,

    /// Index: target id -> positions
    by_target: HashMap<String, Vec<usize>>,

    /// Index: reference type -> positions
    by_type: HashMap<String, Vec<usize>>,
}

impl ReferenceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding every reference in the model
    pub fn from_model(model: &Model) -> Self {
        let mut registry = Self::new();
        for (_, element) in model.elements() {
            registry.register_element(element);
        }
        registry
    }

    pub fn add(&mut self, reference: Reference) {
        let position = self.references.len();
        self.by_source.entry(reference.source.clone()).or_default().push(position);
        self.by_target.entry(reference.target.clone()).or_default().push(position);
        self.by_type
            .entry(reference.reference_type.clone())
            .or_default()
            .push(position);
        self.references.push(reference);
    }

    /// Add all of an element's own references
    pub fn register_element(&mut self, element: &Element) {
        for reference in &element.references {
            self.add(reference.clone());
        }
    }

    fn collect(&self, positions: Option<&Vec<usize>>) -> Vec<&Reference> {
        positions
            .map(|ps| ps.iter().map(|&p| &self.references[p]).collect())
            .unwrap_or_default()
    }

    pub fn references_from(&self, source: &str) -> Vec<&Reference> {
        self.collect(self.by_source.get(source))
    }

    pub fn references_to(&self, target: &str) -> Vec<&Reference> {
        self.collect(self.by_target.get(target))
    }

    pub fn references_by_type(&self, reference_type: &str) -> Vec<&Reference> {
        self.collect(self.by_type.get(reference_type))
    }

    pub fn has_reference(&self, source: &str, target: &str) -> bool {
        self.references_from(source).iter().any(|r| r.target == target)
    }

    pub fn all_references(&self) -> &[Reference] {
        &self.references
    }

    pub fn clear(&mut self) {
        self.references.clear();
        self.by_source.clear();
        self.by_target.clear();
        self.by_type.clear();
    }

    pub fn stats(&self) -> ReferenceStats {
        let reference_types: BTreeSet<&String> = self.by_type.keys().collect();
        ReferenceStats {
            total_references: self.references.len(),
            unique_sources: self.by_source.len(),
            unique_targets: self.by_target.len(),
            reference_types: reference_types.into_iter().cloned().collect(),
        }
    }

    /// References whose target is not in `valid_ids`
    pub fn find_broken_references(&self, valid_ids: &HashSet<&str>) -> Vec<&Reference> {
        self.references
            .iter()
            .filter(|r| !valid_ids.contains(r.target.as_str()))
            .collect()
    }

    /// One node per id seen as source or target, one edge per reference
    pub fn dependency_graph(&self) -> DependencyGraph {
        let mut graph = DependencyGraph::new();
        for reference in &self.references {
            graph.add_edge(GraphEdge {
                source: reference.source.clone(),
                target: reference.target.clone(),
                kind: reference.reference_type.clone(),
                description: reference.description.clone(),
            });
        }
        graph
    }
}
