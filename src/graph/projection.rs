//! Projection Engine
//!
//! Rule-driven traversal over element references. A hop from one element to a
//! referenced element is taken only if some rule permits the pair of layers
//! (and the reference type, when the rule names a predicate). Hops without a
//! matching rule are pruned, never reported.
//!
//! Every query keeps its own visited set, so cyclic references terminate even
//! when the rules permit hops in both directions.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap, HashSet, VecDeque};
use tracing::trace;

use crate::layer::Layer;
use crate::model::{Element, Model, Reference};

/// Permission for one traversal hop
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectionRule {
    pub source_layer: Layer,
    pub target_layer: Layer,
    /// Restrict the hop to references of this type
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub predicate: Option<String>,
}

impl ProjectionRule {
    pub fn new(source_layer: Layer, target_layer: Layer) -> Self {
        Self {
            source_layer,
            target_layer,
            predicate: None,
        }
    }

    pub fn with_predicate(mut self, predicate: impl Into<String>) -> Self {
        self.predicate = Some(predicate.into());
        self
    }

    fn permits(&self, from: Layer, to: Layer, reference_type: &str) -> bool {
        self.source_layer == from
            && self.target_layer == to
            && self.predicate.as_deref().map_or(true, |p| p == reference_type)
    }
}

#[derive(Debug, Clone, Default)]
pub struct ProjectionEngine {
    rules: Vec<ProjectionRule>,
}

impl ProjectionEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Engine where every layer may hop to itself and to every lower layer
    pub fn with_default_rules() -> Self {
        let mut engine = Self::new();
        for source in Layer::ALL {
            for target in Layer::ALL.into_iter().filter(|t| t.ordinal() >= source.ordinal()) {
                engine.add_rule(ProjectionRule::new(source, target));
            }
        }
        engine
    }

    pub fn add_rule(&mut self, rule: ProjectionRule) {
        self.rules.push(rule);
    }

    /// Remove every rule for this pair of layers, whatever its predicate
    pub fn remove_rule(&mut self, source_layer: Layer, target_layer: Layer) {
        self.rules
            .retain(|r| !(r.source_layer == source_layer && r.target_layer == target_layer));
    }

    /// Copy of the rule table, in insertion order
    pub fn rules(&self) -> Vec<ProjectionRule> {
        self.rules.clone()
    }

    pub fn clear_rules(&mut self) {
        self.rules.clear();
    }

    fn permits(&self, from: &str, reference: &Reference) -> bool {
        let (Some(from), Some(to)) = (
            Layer::from_element_id(from),
            Layer::from_element_id(&reference.target),
        ) else {
            return false;
        };
        self.rules
            .iter()
            .any(|r| r.permits(from, to, &reference.reference_type))
    }

    /// Elements of `target_layer` reachable from `element_id`
    pub fn project<'m>(&self, model: &'m Model, element_id: &str, target_layer: Layer) -> Vec<&'m Element> {
        let index = index_elements(model);
        self.walk_forward(&index, element_id, None)
            .into_iter()
            .filter(|e| target_layer.matches_element_id(&e.id))
            .collect()
    }

    /// Ids reachable from `element_id` within `max_depth` hops (unbounded if
    /// `None`). The start id is excluded.
    pub fn reachable(&self, model: &Model, element_id: &str, max_depth: Option<usize>) -> BTreeSet<String> {
        let index = index_elements(model);
        self.walk_forward(&index, element_id, max_depth)
            .into_iter()
            .map(|e| e.id.clone())
            .collect()
    }

    /// Elements of `source_layer` whose permitted chain reaches `element_id`
    pub fn project_reverse<'m>(
        &self,
        model: &'m Model,
        element_id: &str,
        source_layer: Layer,
    ) -> Vec<&'m Element> {
        let mut incoming: HashMap<&str, Vec<&'m Element>> = HashMap::new();
        for (_, element) in model.elements() {
            for reference in &element.references {
                if self.permits(&element.id, reference) {
                    incoming.entry(reference.target.as_str()).or_default().push(element);
                }
            }
        }

        let mut visited: HashSet<&str> = HashSet::from([element_id]);
        let mut queue: VecDeque<&str> = VecDeque::from([element_id]);
        let mut found = Vec::new();

        while let Some(current) = queue.pop_front() {
            for &source in incoming.get(current).into_iter().flatten() {
                if visited.insert(source.id.as_str()) {
                    if source_layer.matches_element_id(&source.id) {
                        found.push(source);
                    }
                    queue.push_back(source.id.as_str());
                }
            }
        }

        found
    }

    /// Breadth-first walk over permitted hops. Returns existing elements in
    /// visiting order, excluding the start.
    fn walk_forward<'m>(
        &self,
        index: &HashMap<&str, &'m Element>,
        start: &str,
        max_depth: Option<usize>,
    ) -> Vec<&'m Element> {
        let mut visited: HashSet<String> = HashSet::from([start.to_string()]);
        let mut queue: VecDeque<(&str, usize)> = VecDeque::new();
        let mut found = Vec::new();

        let Some(&origin) = index.get(start) else {
            trace!("Projection start '{}' not in model", start);
            return found;
        };
        queue.push_back((origin.id.as_str(), 0));

        while let Some((current, depth)) = queue.pop_front() {
            if max_depth.is_some_and(|max| depth >= max) {
                continue;
            }
            let Some(&element) = index.get(current) else {
                continue;
            };

            for reference in &element.references {
                if !self.permits(&element.id, reference) {
                    trace!("Pruned hop {} -> {}", element.id, reference.target);
                    continue;
                }
                let Some(&target) = index.get(reference.target.as_str()) else {
                    continue;
                };
                if visited.insert(target.id.clone()) {
                    found.push(target);
                    queue.push_back((target.id.as_str(), depth + 1));
                }
            }
        }

        found
    }
}

fn index_elements(model: &Model) -> HashMap<&str, &Element> {
    let mut index = HashMap::new();
    for (_, element) in model.elements() {
        index.entry(element.id.as_str()).or_insert(element);
    }
    index
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(elements: Vec<&Element>) -> Vec<&str> {
        elements.into_iter().map(|e| e.id.as_str()).collect()
    }

    fn cyclic_model() -> Model {
        Model::new()
            .with_element(
                Layer::Motivation,
                Element::new("motivation-goal-growth", "goal", "Growth")
                    .with_reference("business-service-sales", "realized-by"),
            )
            .with_element(
                Layer::Business,
                Element::new("business-service-sales", "service", "Sales")
                    .with_reference("motivation-goal-growth", "supports")
                    .with_reference("application-component-crm", "realized-by"),
            )
            .with_element(
                Layer::Application,
                Element::new("application-component-crm", "component", "CRM"),
            )
    }

    #[test]
    fn test_rule_table() {
        let mut engine = ProjectionEngine::new();
        engine.add_rule(ProjectionRule::new(Layer::Motivation, Layer::Business));
        engine.add_rule(ProjectionRule::new(Layer::Motivation, Layer::Business).with_predicate("realized-by"));
        engine.add_rule(ProjectionRule::new(Layer::Business, Layer::Application));

        let mut copy = engine.rules();
        copy.clear();
        assert_eq!(engine.rules().len(), 3);

        engine.remove_rule(Layer::Motivation, Layer::Business);
        assert_eq!(engine.rules(), vec![ProjectionRule::new(Layer::Business, Layer::Application)]);

        engine.clear_rules();
        assert!(engine.rules().is_empty());
    }

    #[test]
    fn test_cyclic_rules_terminate() {
        let mut engine = ProjectionEngine::new();
        engine.add_rule(ProjectionRule::new(Layer::Motivation, Layer::Business));
        engine.add_rule(ProjectionRule::new(Layer::Business, Layer::Motivation));

        let model = cyclic_model();
        let reached = engine.reachable(&model, "motivation-goal-growth", None);
        assert_eq!(reached.into_iter().collect::<Vec<_>>(), vec!["business-service-sales"]);

        let projected = engine.project(&model, "business-service-sales", Layer::Motivation);
        assert_eq!(ids(projected), vec!["motivation-goal-growth"]);
    }

    #[test]
    fn test_unmatched_hops_pruned() {
        let mut engine = ProjectionEngine::new();
        engine.add_rule(ProjectionRule::new(Layer::Motivation, Layer::Business));

        let model = cyclic_model();
        assert!(engine.project(&model, "motivation-goal-growth", Layer::Application).is_empty());

        engine.add_rule(ProjectionRule::new(Layer::Business, Layer::Application));
        let projected = engine.project(&model, "motivation-goal-growth", Layer::Application);
        assert_eq!(ids(projected), vec!["application-component-crm"]);
    }

    #[test]
    fn test_max_depth() {
        let engine = ProjectionEngine::with_default_rules();
        let model = cyclic_model();

        let direct = engine.reachable(&model, "motivation-goal-growth", Some(1));
        assert_eq!(direct.into_iter().collect::<Vec<_>>(), vec!["business-service-sales"]);

        let all = engine.reachable(&model, "motivation-goal-growth", None);
        assert_eq!(all.len(), 2);
        assert!(!all.contains("motivation-goal-growth"));

        assert!(engine.reachable(&model, "motivation-goal-growth", Some(0)).is_empty());
    }

    #[test]
    fn test_predicate_rule() {
        let mut engine = ProjectionEngine::new();
        engine.add_rule(ProjectionRule::new(Layer::Motivation, Layer::Business).with_predicate("influences"));
        let model = cyclic_model();
        assert!(engine.reachable(&model, "motivation-goal-growth", None).is_empty());

        engine.add_rule(ProjectionRule::new(Layer::Motivation, Layer::Business).with_predicate("realized-by"));
        assert_eq!(engine.reachable(&model, "motivation-goal-growth", None).len(), 1);
    }

    #[test]
    fn test_full_segment_layer_match() {
        let mut engine = ProjectionEngine::new();
        engine.add_rule(ProjectionRule::new(Layer::Api, Layer::Application));

        let model = Model::new()
            .with_element(
                Layer::Api,
                Element::new("api-endpoint-list", "endpoint", "List")
                    .with_reference("application-component-store", "served-by")
                    .with_reference("applicationx-component-fake", "served-by"),
            )
            .with_element(
                Layer::Application,
                Element::new("application-component-store", "component", "Store"),
            )
            .with_element(
                Layer::Application,
                Element::new("applicationx-component-fake", "component", "Fake"),
            );

        let projected = engine.project(&model, "api-endpoint-list", Layer::Application);
        assert_eq!(ids(projected), vec!["application-component-store"]);
    }

    #[test]
    fn test_project_reverse() {
        let engine = ProjectionEngine::with_default_rules();
        let model = cyclic_model();

        let sources = engine.project_reverse(&model, "application-component-crm", Layer::Motivation);
        assert_eq!(ids(sources), vec!["motivation-goal-growth"]);

        assert!(engine
            .project_reverse(&model, "motivation-goal-growth", Layer::Business)
            .is_empty());
    }

    #[test]
    fn test_unknown_start() {
        let engine = ProjectionEngine::with_default_rules();
        assert!(engine.reachable(&cyclic_model(), "motivation-goal-missing", None).is_empty());
    }
}
