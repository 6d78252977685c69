//! Cross-layer reference existence and direction checks

use std::collections::HashSet;

use crate::layer::Layer;
use crate::model::{Model, Reference};

use super::result::{IssueKind, ValidationIssue, ValidationResult};

/// Checks that every reference resolves and points downwards.
///
/// Checks use the reference's own `source` field, not the id of the element
/// that carries it.
#[derive(Debug, Default)]
pub struct ReferenceValidator;

impl ReferenceValidator {
    pub fn new() -> Self {
        Self
    }

    pub fn validate(&self, model: &Model) -> ValidationResult {
        let mut result = ValidationResult::new();
        let ids = model.element_ids();

        for (layer, element) in model.elements() {
            for (index, reference) in element.references.iter().enumerate() {
                let location = format!("references[{}]", index);

                if let Some(issue) = check_target(layer, reference, &ids) {
                    result.add(issue.for_element(&element.id).at(&location));
                }
                if let Some(issue) = check_direction(layer, reference) {
                    result.add(issue.for_element(&element.id).at(&location));
                }
            }
        }

        result
    }
}

fn check_target(layer: Layer, reference: &Reference, ids: &HashSet<&str>) -> Option<ValidationIssue> {
    if ids.contains(reference.target.as_str()) {
        return None;
    }

    Some(
        ValidationIssue::new(
            IssueKind::BrokenReference,
            layer,
            format!(
                "broken reference: '{}' references missing element '{}'",
                reference.source, reference.target
            ),
        )
        .fix(format!(
            "remove reference or create element '{}'",
            reference.target
        )),
    )
}

/// Ids whose layer cannot be resolved are left to the naming checks.
fn check_direction(layer: Layer, reference: &Reference) -> Option<ValidationIssue> {
    let source_layer = Layer::from_element_id(&reference.source)?;
    let target_layer = Layer::from_element_id(&reference.target)?;

    if source_layer.ordinal() <= target_layer.ordinal() {
        return None;
    }

    Some(
        ValidationIssue::new(
            IssueKind::DirectionViolation,
            layer,
            format!(
                "invalid reference direction: '{}' in layer {} ({}) cannot reference '{}' in higher layer {} ({})",
                reference.source,
                source_layer,
                source_layer.ordinal(),
                reference.target,
                target_layer,
                target_layer.ordinal()
            ),
        )
        .fix("references must go from higher layers to lower layers"),
    )
}
