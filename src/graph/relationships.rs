//! Relationship Registry
//!
//! Same indexing discipline as the reference registry, for predicate-typed
//! relationships, plus a catalogue of registered relationship types.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use tracing::debug;

use crate::error::Result;
use crate::layer::Layer;
use crate::model::{Element, Model, Relationship};
use crate::resources::{RelationshipCatalog, SchemaSource};

use super::{DependencyGraph, GraphEdge};

/// A relationship type definition from the catalogue
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationshipType {
    pub id: String,
    pub predicate: String,
    #[serde(
        rename = "inversePredicate",
        alias = "inverse_predicate",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub inverse_predicate: Option<String>,
    pub category: String,
    /// `None` means the type applies to every layer
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub applicable_layers: Option<Vec<Layer>>,
}

impl RelationshipType {
    pub fn new(id: impl Into<String>, predicate: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            predicate: predicate.into(),
            inverse_predicate: None,
            category: category.into(),
            applicable_layers: None,
        }
    }

    pub fn with_inverse(mut self, inverse: impl Into<String>) -> Self {
        self.inverse_predicate = Some(inverse.into());
        self
    }

    pub fn with_layers(mut self, layers: Vec<Layer>) -> Self {
        self.applicable_layers = Some(layers);
        self
    }

    pub fn applies_to(&self, layer: Layer) -> bool {
        match &self.applicable_layers {
            Some(layers) => layers.contains(&layer),
            None => true,
        }
    }
}

/// Summary counts of a [`RelationshipRegistry`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelationshipStats {
    pub total_relationships: usize,
    pub unique_sources: usize,
    pub unique_targets: usize,
    /// Distinct predicates in use, sorted
    pub predicates: Vec<String>,
    pub registered_types: usize,
}

#[derive(Debug, Clone, Default)]
pub struct RelationshipRegistry {
    relationships: Vec<Relationship>,

    /// Index: source id -> positions
    by_source: HashMap<String, Vec<usize>>,

    /// Index: target id -> positions
    by_target: HashMap<String, Vec<usize>>,

    /// Index: layer of the source id -> positions
    by_layer: HashMap<Layer, Vec<usize>>,

    /// Index: predicate -> positions
    by_predicate: HashMap<String, Vec<usize>>,

    /// Registered types in registration order
    types: Vec<RelationshipType>,

    /// Index: type id -> position in `types`
    type_by_id: HashMap<String, usize>,

    /// Index: predicate -> position in `types`
    type_by_predicate: HashMap<String, usize>,
}

impl RelationshipRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding every relationship in the model
    pub fn from_model(model: &Model) -> Self {
        let mut registry = Self::new();
        for (_, element) in model.elements() {
            registry.register_element(element);
        }
        registry
    }

    pub fn add(&mut self, relationship: Relationship) {
        let position = self.relationships.len();
        self.by_source.entry(relationship.source.clone()).or_default().push(position);
        self.by_target.entry(relationship.target.clone()).or_default().push(position);
        self.by_predicate
            .entry(relationship.predicate.clone())
            .or_default()
            .push(position);
        if let Some(layer) = Layer::from_element_id(&relationship.source) {
            self.by_layer.entry(layer).or_default().push(position);
        }
        self.relationships.push(relationship);
    }

    /// Add all of an element's own relationships
    pub fn register_element(&mut self, element: &Element) {
        for relationship in &element.relationships {
            self.add(relationship.clone());
        }
    }

    fn collect(&self, positions: Option<&Vec<usize>>) -> Vec<&Relationship> {
        positions
            .map(|ps| ps.iter().map(|&p| &self.relationships[p]).collect())
            .unwrap_or_default()
    }

    pub fn relationships_from(&self, source: &str) -> Vec<&Relationship> {
        self.collect(self.by_source.get(source))
    }

    pub fn relationships_to(&self, target: &str) -> Vec<&Relationship> {
        self.collect(self.by_target.get(target))
    }

    /// Relationships whose source lives in `layer`
    pub fn relationships_by_layer(&self, layer: Layer) -> Vec<&Relationship> {
        self.collect(self.by_layer.get(&layer))
    }

    pub fn relationships_by_predicate(&self, predicate: &str) -> Vec<&Relationship> {
        self.collect(self.by_predicate.get(predicate))
    }

    pub fn has_relationship(&self, source: &str, target: &str, predicate: Option<&str>) -> bool {
        self.relationships_from(source)
            .iter()
            .any(|r| r.target == target && predicate.map_or(true, |p| r.predicate == p))
    }

    pub fn all_relationships(&self) -> &[Relationship] {
        &self.relationships
    }

    /// Drop all relationships. Registered types are kept.
    pub fn clear(&mut self) {
        self.relationships.clear();
        self.by_source.clear();
        self.by_target.clear();
        self.by_layer.clear();
        self.by_predicate.clear();
    }

    pub fn stats(&self) -> RelationshipStats {
        let predicates: BTreeSet<&String> = self.by_predicate.keys().collect();
        RelationshipStats {
            total_relationships: self.relationships.len(),
            unique_sources: self.by_source.len(),
            unique_targets: self.by_target.len(),
            predicates: predicates.into_iter().cloned().collect(),
            registered_types: self.types.len(),
        }
    }

    // ========== Type Catalogue ==========

    /// Register a type. A later registration with the same id replaces it.
    pub fn register_type(&mut self, def: RelationshipType) {
        if let Some(&position) = self.type_by_id.get(&def.id) {
            let previous = std::mem::replace(&mut self.types[position], def.clone());
            if self.type_by_predicate.get(&previous.predicate) == Some(&position) {
                // Fall back to the latest other type still carrying the predicate
                let other = self.types.iter().rposition(|t| t.predicate == previous.predicate);
                match other {
                    Some(other) => self.type_by_predicate.insert(previous.predicate, other),
                    None => self.type_by_predicate.remove(&previous.predicate),
                };
            }
            self.type_by_predicate.insert(def.predicate, position);
            return;
        }

        let position = self.types.len();
        self.type_by_id.insert(def.id.clone(), position);
        self.type_by_predicate.insert(def.predicate.clone(), position);
        self.types.push(def);
    }

    /// Register every type of the source's catalogue.
    ///
    /// Returns the number of types registered; a source without a catalogue
    /// registers none.
    pub fn load_catalog(&mut self, source: &dyn SchemaSource) -> Result<usize> {
        let Some(catalog) = RelationshipCatalog::load(source)? else {
            debug!("No relationship catalogue in {}", source.describe());
            return Ok(0);
        };

        let count = catalog.relationship_types.len();
        for def in catalog.relationship_types {
            self.register_type(def);
        }
        Ok(count)
    }

    pub fn get_type(&self, id: &str) -> Option<&RelationshipType> {
        self.type_by_id.get(id).map(|&p| &self.types[p])
    }

    pub fn get_type_by_predicate(&self, predicate: &str) -> Option<&RelationshipType> {
        self.type_by_predicate.get(predicate).map(|&p| &self.types[p])
    }

    pub fn types(&self) -> &[RelationshipType] {
        &self.types
    }

    pub fn is_valid_predicate(&self, predicate: &str) -> bool {
        self.type_by_predicate.contains_key(predicate)
    }

    pub fn inverse_predicate(&self, predicate: &str) -> Option<&str> {
        self.get_type_by_predicate(predicate)
            .and_then(|t| t.inverse_predicate.as_deref())
    }

    /// Predicates usable in `layer`, in registration order
    pub fn valid_predicates_for_layer(&self, layer: Layer) -> Vec<&str> {
        distinct_predicates(self.types.iter().filter(|t| t.applies_to(layer)))
    }

    /// Predicates usable by an element, matched on its id's layer prefix.
    ///
    /// An id with no recognisable layer only gets the unrestricted types.
    pub fn valid_predicates_for_element(&self, element_id: &str) -> Vec<&str> {
        match Layer::from_element_id(element_id) {
            Some(layer) => self.valid_predicates_for_layer(layer),
            None => distinct_predicates(self.types.iter().filter(|t| t.applicable_layers.is_none())),
        }
    }

    /// One edge per relationship, labelled with its predicate
    pub fn dependency_graph(&self) -> DependencyGraph {
        let mut graph = DependencyGraph::new();
        for relationship in &self.relationships {
            graph.add_edge(GraphEdge {
                source: relationship.source.clone(),
                target: relationship.target.clone(),
                kind: relationship.predicate.clone(),
                description: None,
            });
        }
        graph
    }
}

/// Predicates of `types` in order, first occurrence only
fn distinct_predicates<'a>(types: impl Iterator<Item = &'a RelationshipType>) -> Vec<&'a str> {
    let mut out: Vec<&str> = Vec::new();
    for def in types {
        if !out.contains(&def.predicate.as_str()) {
            out.push(&def.predicate);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::InMemorySchemas;
    use serde_json::json;

    #[test]
    fn test_predicate_requires_registration() {
        let mut registry = RelationshipRegistry::new();
        registry.add(Relationship::new("application-component-a", "application-component-b", "depends-on"));
        assert!(!registry.is_valid_predicate("depends-on"));

        registry.register_type(RelationshipType::new("depends-on", "depends-on", "dependency"));
        assert!(registry.is_valid_predicate("depends-on"));
        assert_eq!(registry.get_type("depends-on").unwrap().category, "dependency");
    }

    #[test]
    fn test_indexes() {
        let mut registry = RelationshipRegistry::new();
        registry.add(Relationship::new("application-component-a", "application-component-b", "depends-on"));
        registry.add(Relationship::new("application-component-a", "data-model-entity-c", "accesses"));
        registry.add(Relationship::new("business-service-d", "application-component-a", "serves"));

        assert_eq!(registry.relationships_from("application-component-a").len(), 2);
        assert_eq!(registry.relationships_to("application-component-a").len(), 1);
        assert_eq!(registry.relationships_by_layer(Layer::Application).len(), 2);
        assert_eq!(registry.relationships_by_layer(Layer::Business).len(), 1);
        assert_eq!(registry.relationships_by_predicate("serves").len(), 1);
        assert!(registry.has_relationship("application-component-a", "data-model-entity-c", None));
        assert!(registry.has_relationship("application-component-a", "data-model-entity-c", Some("accesses")));
        assert!(!registry.has_relationship("application-component-a", "data-model-entity-c", Some("serves")));

        let stats = registry.stats();
        assert_eq!(stats.total_relationships, 3);
        assert_eq!(stats.unique_sources, 2);
        assert_eq!(stats.predicates, vec!["accesses", "depends-on", "serves"]);

        registry.clear();
        assert!(registry.all_relationships().is_empty());
        assert!(registry.relationships_by_layer(Layer::Application).is_empty());
    }

    #[test]
    fn test_valid_predicates_for_layer() {
        let mut registry = RelationshipRegistry::new();
        registry.register_type(RelationshipType::new("depends-on", "depends-on", "dependency"));
        registry.register_type(
            RelationshipType::new("serves", "serves", "service")
                .with_inverse("served-by")
                .with_layers(vec![Layer::Business]),
        );

        assert_eq!(registry.valid_predicates_for_layer(Layer::Business), vec!["depends-on", "serves"]);
        assert_eq!(registry.valid_predicates_for_layer(Layer::Api), vec!["depends-on"]);
        assert_eq!(
            registry.valid_predicates_for_element("business-service-orders"),
            vec!["depends-on", "serves"]
        );
        assert_eq!(registry.valid_predicates_for_element("businessx-service-y"), vec!["depends-on"]);
        assert_eq!(registry.inverse_predicate("serves"), Some("served-by"));
    }

    #[test]
    fn test_reregister_replaces() {
        let mut registry = RelationshipRegistry::new();
        registry.register_type(RelationshipType::new("uses", "uses", "dependency"));
        registry.register_type(RelationshipType::new("uses", "consumes", "dependency"));
        assert!(!registry.is_valid_predicate("uses"));
        assert!(registry.is_valid_predicate("consumes"));
        assert_eq!(registry.types().len(), 1);
    }

    #[test]
    fn test_reregister_keeps_shared_predicate() {
        let mut registry = RelationshipRegistry::new();
        registry.register_type(RelationshipType::new("a", "uses", "dependency"));
        registry.register_type(RelationshipType::new("b", "uses", "dependency"));
        registry.register_type(RelationshipType::new("a", "consumes", "dependency"));

        assert!(registry.is_valid_predicate("uses"));
        assert_eq!(registry.get_type_by_predicate("uses").unwrap().id, "b");
        assert_eq!(registry.get_type_by_predicate("consumes").unwrap().id, "a");

        registry.register_type(RelationshipType::new("b", "calls", "dependency"));
        assert!(!registry.is_valid_predicate("uses"));
    }

    #[test]
    fn test_shared_predicate_listed_once() {
        let mut registry = RelationshipRegistry::new();
        registry.register_type(RelationshipType::new("uses", "uses", "dependency"));
        registry.register_type(RelationshipType::new("uses-internal", "uses", "dependency"));
        registry.register_type(
            RelationshipType::new("serves", "serves", "service").with_layers(vec![Layer::Business]),
        );

        assert_eq!(registry.valid_predicates_for_layer(Layer::Business), vec!["uses", "serves"]);
        assert_eq!(registry.valid_predicates_for_element("nolayer-x-y"), vec!["uses"]);
    }

    #[test]
    fn test_load_catalog() {
        let source = InMemorySchemas::new().with_catalog(
            json!({
                "relationshipTypes": [
                    { "id": "realizes", "predicate": "realizes", "inversePredicate": "realized-by",
                      "category": "realization", "applicable_layers": ["application", "data-model"] }
                ]
            })
            .to_string(),
        );

        let mut registry = RelationshipRegistry::new();
        assert_eq!(registry.load_catalog(&source).unwrap(), 1);
        assert_eq!(registry.valid_predicates_for_layer(Layer::DataModel), vec!["realizes"]);
        assert_eq!(registry.inverse_predicate("realizes"), Some("realized-by"));

        let mut empty = RelationshipRegistry::new();
        assert_eq!(empty.load_catalog(&InMemorySchemas::new()).unwrap(), 0);
        assert!(RelationshipRegistry::new()
            .load_catalog(&InMemorySchemas::new().with_catalog("nope"))
            .is_err());
    }
}
