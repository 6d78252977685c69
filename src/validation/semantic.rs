//! Whole-model invariants: id uniqueness and the relationship predicate catalogue

use fuzzy_matcher::skim::SkimMatcherV2;
use fuzzy_matcher::FuzzyMatcher;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, OnceLock};
use tracing::{debug, warn};

use crate::layer::Layer;
use crate::model::Model;
use crate::resources::{EmbeddedSchemas, RelationshipCatalog, SchemaSource};

use super::result::{IssueKind, ValidationIssue, ValidationResult};

/// Valid predicates per layer
pub type PredicateCatalog = BTreeMap<Layer, Vec<String>>;

pub struct SemanticValidator {
    source: Arc<dyn SchemaSource>,
    catalog: OnceLock<Option<PredicateCatalog>>,
}

impl Default for SemanticValidator {
    fn default() -> Self {
        Self::new(Arc::new(EmbeddedSchemas))
    }
}

impl SemanticValidator {
    pub fn new(source: Arc<dyn SchemaSource>) -> Self {
        Self {
            source,
            catalog: OnceLock::new(),
        }
    }

    /// Predicate catalogue, loaded on first use. `None` when unavailable.
    pub fn catalog(&self) -> Option<&PredicateCatalog> {
        self.catalog
            .get_or_init(|| match RelationshipCatalog::load(self.source.as_ref()) {
                Ok(Some(catalog)) => Some(catalog.predicates_by_layer()),
                Ok(None) => {
                    debug!("No relationship catalogue in {}", self.source.describe());
                    None
                }
                Err(e) => {
                    warn!("Ignoring relationship catalogue: {}", e);
                    None
                }
            })
            .as_ref()
    }

    pub fn validate(&self, model: &Model) -> ValidationResult {
        let mut result = self.validate_unique_ids(model);
        result.extend(self.validate_relationship_predicates(model));
        result
    }

    /// Ids must be unique across the whole model, not just within a layer
    pub fn validate_unique_ids(&self, model: &Model) -> ValidationResult {
        let mut result = ValidationResult::new();
        let mut seen: HashMap<&str, Layer> = HashMap::new();

        for (layer, element) in model.elements() {
            match seen.get(element.id.as_str()) {
                Some(first_layer) => {
                    result.add(
                        ValidationIssue::new(
                            IssueKind::DuplicateId,
                            layer,
                            format!(
                                "duplicate id '{}': already exists in layer {}",
                                element.id, first_layer
                            ),
                        )
                        .for_element(&element.id)
                        .at("id")
                        .fix("give each element a unique id across all layers"),
                    );
                }
                None => {
                    seen.insert(&element.id, layer);
                }
            }
        }

        result
    }

    /// Unknown predicates are warnings; a missing catalogue skips the check
    pub fn validate_relationship_predicates(&self, model: &Model) -> ValidationResult {
        let mut result = ValidationResult::new();

        let Some(catalog) = self.catalog() else {
            return result;
        };

        let matcher = SkimMatcherV2::default();

        for (layer, element) in model.elements() {
            let Some(valid) = catalog.get(&layer).filter(|v| !v.is_empty()) else {
                continue;
            };

            for (index, relationship) in element.relationships.iter().enumerate() {
                if valid.iter().any(|p| p == &relationship.predicate) {
                    continue;
                }

                let mut fix = format!("use one of: {}", valid.join(", "));
                if let Some(closest) = closest_predicate(&matcher, valid, &relationship.predicate) {
                    fix = format!("did you mean '{}'? {}", closest, fix);
                }

                result.add(
                    ValidationIssue::new(
                        IssueKind::UnknownPredicate,
                        layer,
                        format!(
                            "unknown relationship predicate '{}' for layer {}; valid predicates: {}",
                            relationship.predicate,
                            layer,
                            valid.join(", ")
                        ),
                    )
                    .for_element(&element.id)
                    .at(format!("relationships[{}]", index))
                    .fix(fix),
                );
            }
        }

        result
    }
}

fn closest_predicate<'a>(matcher: &SkimMatcherV2, valid: &'a [String], unknown: &str) -> Option<&'a str> {
    valid
        .iter()
        .filter_map(|p| matcher.fuzzy_match(p, unknown).map(|score| (score, p)))
        .max_by_key(|(score, _)| *score)
        .map(|(_, p)| p.as_str())
}
