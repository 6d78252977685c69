//! Element id naming convention: `{layer}-{type}-{kebab-name}`

use regex::Regex;

use crate::layer::Layer;
use crate::model::Element;

use super::result::{IssueKind, ValidationIssue, ValidationResult};

/// Type and name portion: lowercase alphanumeric segments joined by single hyphens
const NAME_PATTERN: &str = r"^[a-z0-9]+(-[a-z0-9]+)*$";

/// The distinct ways an id can break the convention
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NamingDefect {
    TooFewParts,
    PrefixMismatch { found: String },
    MissingType,
    InvalidFormat,
}

pub struct NamingValidator {
    name_pattern: Regex,
}

impl Default for NamingValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl NamingValidator {
    pub fn new() -> Self {
        Self {
            name_pattern: Regex::new(NAME_PATTERN).unwrap(),
        }
    }

    /// First defect of `id` for an element in `layer`, if any
    pub fn check_id(&self, layer: Layer, id: &str) -> Option<NamingDefect> {
        let parts: Vec<&str> = id.split('-').collect();
        if parts.len() < 3 {
            return Some(NamingDefect::TooFewParts);
        }

        let prefix_len = layer.segment_count();
        let found = parts[..prefix_len].join("-");
        if found != layer.id() {
            return Some(NamingDefect::PrefixMismatch { found });
        }

        let rest = &parts[prefix_len..];
        if rest.len() < 2 {
            return Some(NamingDefect::TooFewParts);
        }
        if rest.iter().any(|segment| segment.is_empty()) {
            return Some(NamingDefect::MissingType);
        }
        if !self.name_pattern.is_match(&rest.join("-")) {
            return Some(NamingDefect::InvalidFormat);
        }

        None
    }

    pub fn validate_layer(&self, layer: Layer, elements: &[Element]) -> ValidationResult {
        let mut result = ValidationResult::new();

        for element in elements {
            if let Some(defect) = self.check_id(layer, &element.id) {
                result.add(naming_issue(layer, element, &defect));
            }
        }

        result
    }
}

fn naming_issue(layer: Layer, element: &Element, defect: &NamingDefect) -> ValidationIssue {
    let id = &element.id;
    let (message, fix) = match defect {
        NamingDefect::TooFewParts => (
            format!(
                "invalid element id '{}': too few parts, expected {}-{{type}}-{{name}}",
                id, layer
            ),
            format!(
                "use the format '{}-{{type}}-{{kebab-name}}', e.g. '{}-{}-{}'",
                layer,
                layer,
                kebab(&element.element_type).unwrap_or_else(|| "element".to_string()),
                kebab(&element.name).unwrap_or_else(|| "name".to_string()),
            ),
        ),
        NamingDefect::PrefixMismatch { found } => (
            format!(
                "invalid element id '{}': layer prefix does not match, found '{}' but element is in layer '{}'",
                id, found, layer
            ),
            format!("rename the element so its id starts with '{}-'", layer),
        ),
        NamingDefect::MissingType => (
            format!("invalid element id '{}': missing type component", id),
            format!(
                "insert the element type after the layer prefix, e.g. '{}-{}-...'",
                layer,
                kebab(&element.element_type).unwrap_or_else(|| "type".to_string())
            ),
        ),
        NamingDefect::InvalidFormat => {
            let rest = id
                .strip_prefix(layer.id())
                .map(|r| r.trim_start_matches('-'))
                .unwrap_or(id);
            let fix = match kebab(rest) {
                Some(suggested) => format!("rename to '{}-{}'", layer, suggested),
                None => "use only lowercase letters, digits and single hyphens".to_string(),
            };
            (
                format!(
                    "invalid element id '{}': invalid format, type and name must be lowercase alphanumeric words separated by single hyphens",
                    id
                ),
                fix,
            )
        }
    };

    ValidationIssue::new(IssueKind::NamingViolation, layer, message)
        .for_element(id)
        .at("id")
        .fix(fix)
}

/// Kebab-case form of arbitrary text, `None` if nothing usable remains
fn kebab(text: &str) -> Option<String> {
    let mut out = String::with_capacity(text.len());
    let mut prev_lower = false;
    for c in text.chars() {
        if c.is_ascii_alphanumeric() {
            if c.is_ascii_uppercase() && prev_lower {
                out.push('-');
            }
            prev_lower = c.is_ascii_lowercase() || c.is_ascii_digit();
            out.push(c.to_ascii_lowercase());
        } else {
            if !out.is_empty() && !out.ends_with('-') {
                out.push('-');
            }
            prev_lower = false;
        }
    }
    let trimmed = out.trim_matches('-').to_string();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed)
    }
}
