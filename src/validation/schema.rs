//! Schema validation of elements against per-layer, per-type JSON Schemas
//!
//! Each layer document is compiled at most once per [`SchemaValidator`]
//! instance. The cache entry for a layer is created under a short lock and
//! compilation runs inside the entry's `OnceLock`, so concurrent first use of
//! the same layer waits on one in-flight compilation instead of repeating it.

use jsonschema::error::ValidationErrorKind;
use jsonschema::{Draft, JSONSchema, ValidationError};
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, OnceLock};
use tracing::{debug, warn};

use crate::checksum::Checksum;
use crate::layer::Layer;
use crate::model::Element;
use crate::resources::{EmbeddedSchemas, SchemaSource};

use super::result::{IssueKind, ValidationIssue, ValidationResult};

/// Layer schema document as stored in a [`SchemaSource`]
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LayerSchemaDocument {
    #[serde(default)]
    element_types: BTreeMap<String, serde_json::Value>,
}

/// Compiled validators of one layer, keyed by element type
pub struct CompiledLayer {
    checksum: Checksum,
    validators: HashMap<String, JSONSchema>,
}

impl CompiledLayer {
    pub fn checksum(&self) -> &Checksum {
        &self.checksum
    }

    pub fn element_types(&self) -> Vec<&str> {
        let mut types: Vec<&str> = self.validators.keys().map(|s| s.as_str()).collect();
        types.sort();
        types
    }
}

type CacheEntry = Arc<OnceLock<Option<Arc<CompiledLayer>>>>;

/// Validates elements against the compiled schema for their layer and type
pub struct SchemaValidator {
    source: Arc<dyn SchemaSource>,
    cache: Mutex<HashMap<Layer, CacheEntry>>,
    compilations: AtomicUsize,
}

impl Default for SchemaValidator {
    fn default() -> Self {
        Self::new(Arc::new(EmbeddedSchemas))
    }
}

impl SchemaValidator {
    pub fn new(source: Arc<dyn SchemaSource>) -> Self {
        Self {
            source,
            cache: Mutex::new(HashMap::new()),
            compilations: AtomicUsize::new(0),
        }
    }

    /// Number of layer documents compiled by this instance so far
    pub fn compilation_count(&self) -> usize {
        self.compilations.load(Ordering::SeqCst)
    }

    /// Fingerprint of the compiled document of a layer, if it has one
    pub fn schema_checksum(&self, layer: Layer) -> Option<Checksum> {
        self.compiled(layer).map(|c| c.checksum.clone())
    }

    /// Compiled validators for a layer, compiling on first use.
    ///
    /// `None` when the layer has no usable schema document.
    pub fn compiled(&self, layer: Layer) -> Option<Arc<CompiledLayer>> {
        let entry = {
            let mut cache = match self.cache.lock() {
                Ok(guard) => guard,
                Err(poisoned) => poisoned.into_inner(),
            };
            cache.entry(layer).or_default().clone()
        };

        entry.get_or_init(|| self.compile(layer)).clone()
    }

    fn compile(&self, layer: Layer) -> Option<Arc<CompiledLayer>> {
        self.compilations.fetch_add(1, Ordering::SeqCst);

        let Some(content) = self.source.layer_schema(layer) else {
            warn!("No schema for layer {} in {}", layer, self.source.describe());
            return None;
        };

        let raw: serde_json::Value = match serde_json::from_str(&content) {
            Ok(v) => v,
            Err(e) => {
                warn!("Unparseable schema for layer {} in {}: {}", layer, self.source.describe(), e);
                return None;
            }
        };

        let document: LayerSchemaDocument = match serde_json::from_value(raw.clone()) {
            Ok(d) => d,
            Err(e) => {
                warn!("Malformed schema document for layer {}: {}", layer, e);
                return None;
            }
        };

        let mut validators = HashMap::with_capacity(document.element_types.len());
        for (element_type, schema) in &document.element_types {
            match JSONSchema::options().with_draft(Draft::Draft7).compile(schema) {
                Ok(compiled) => {
                    validators.insert(element_type.clone(), compiled);
                }
                Err(e) => {
                    warn!("Skipping schema {}/{}: {}", layer, element_type, e);
                }
            }
        }

        let checksum = Checksum::from_json(&raw);
        debug!(
            "Compiled {} element type(s) for layer {} ({})",
            validators.len(),
            layer,
            checksum
        );

        Some(Arc::new(CompiledLayer { checksum, validators }))
    }

    /// Validate every element of a layer against its type schema.
    ///
    /// Elements whose type has no schema, and layers without a schema
    /// document, produce no issues.
    pub fn validate_layer(&self, layer: Layer, elements: &[Element]) -> ValidationResult {
        let mut result = ValidationResult::new();

        let Some(compiled) = self.compiled(layer) else {
            return result;
        };

        for element in elements {
            let Some(validator) = compiled.validators.get(&element.element_type) else {
                continue;
            };

            let instance = element.to_schema_instance();
            if let Err(errors) = validator.validate(&instance) {
                for error in errors {
                    result.add(violation_issue(layer, element, &error));
                }
            };
        }

        result
    }
}

/// Name of the JSON Schema keyword that failed
fn keyword_of(error: &ValidationError<'_>) -> String {
    let keyword = match &error.kind {
        ValidationErrorKind::Required { .. } => "required",
        ValidationErrorKind::Type { .. } => "type",
        ValidationErrorKind::Enum { .. } => "enum",
        ValidationErrorKind::Pattern { .. } => "pattern",
        ValidationErrorKind::MinLength { .. } => "minLength",
        ValidationErrorKind::MaxLength { .. } => "maxLength",
        ValidationErrorKind::Minimum { .. } => "minimum",
        ValidationErrorKind::Maximum { .. } => "maximum",
        ValidationErrorKind::AdditionalProperties { .. } => "additionalProperties",
        _ => {
            let schema_path = error.schema_path.to_string();
            return schema_path
                .rsplit('/')
                .next()
                .filter(|s| !s.is_empty())
                .unwrap_or("schema")
                .to_string();
        }
    };
    keyword.to_string()
}

/// JSON pointer to the offending value inside the element
fn location_of(error: &ValidationError<'_>) -> String {
    let base = error.instance_path.to_string();
    let child = match &error.kind {
        ValidationErrorKind::Required { property } => property.as_str().map(str::to_string),
        ValidationErrorKind::AdditionalProperties { unexpected } => unexpected.first().cloned(),
        _ => None,
    };

    match child {
        Some(name) => format!("{}/{}", base, name),
        None if base.is_empty() => "/".to_string(),
        None => base,
    }
}

fn fix_suggestion(keyword: &str, location: &str) -> String {
    match keyword {
        "required" => format!("add the required attribute '{}'", location.trim_start_matches('/')),
        "type" => format!("change the value at '{}' to the type declared in the schema", location),
        "enum" => format!("use one of the allowed values for '{}'", location),
        "pattern" => format!("make the value at '{}' match the schema pattern", location),
        "minLength" => format!("lengthen the value at '{}'", location),
        "maxLength" => format!("shorten the value at '{}'", location),
        "minimum" => format!("increase the value at '{}' to at least the schema minimum", location),
        "maximum" => format!("decrease the value at '{}' to at most the schema maximum", location),
        "additionalProperties" => format!("remove the undeclared attribute '{}'", location),
        other => format!("adjust the value at '{}' to satisfy the '{}' constraint", location, other),
    }
}

fn violation_issue(layer: Layer, element: &Element, error: &ValidationError<'_>) -> ValidationIssue {
    let keyword = keyword_of(error);
    let location = location_of(error);
    let suggestion = fix_suggestion(&keyword, &location);

    ValidationIssue::new(
        IssueKind::StructuralViolation,
        layer,
        format!("schema violation ({}): {}", keyword, error),
    )
    .for_element(&element.id)
    .at(location)
    .fix(suggestion)
}
