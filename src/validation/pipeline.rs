//! Four-stage validation pipeline
//!
//! Stages always run in order Schema → Naming → Reference → Semantic. No stage
//! is skipped because an earlier one found errors, so a single call returns the
//! complete issue set.

use std::sync::Arc;
use tracing::{debug, info, info_span};

use crate::model::Model;
use crate::resources::{EmbeddedSchemas, SchemaSource};

use super::naming::NamingValidator;
use super::reference::ReferenceValidator;
use super::result::ValidationResult;
use super::schema::SchemaValidator;
use super::semantic::SemanticValidator;

pub struct ValidationPipeline {
    schema: SchemaValidator,
    naming: NamingValidator,
    reference: ReferenceValidator,
    semantic: SemanticValidator,
}

impl Default for ValidationPipeline {
    fn default() -> Self {
        Self::new(Arc::new(EmbeddedSchemas))
    }
}

impl ValidationPipeline {
    /// Pipeline reading layer schemas and the predicate catalogue from `source`
    pub fn new(source: Arc<dyn SchemaSource>) -> Self {
        Self {
            schema: SchemaValidator::new(Arc::clone(&source)),
            naming: NamingValidator::new(),
            reference: ReferenceValidator::new(),
            semantic: SemanticValidator::new(source),
        }
    }

    pub fn schema_validator(&self) -> &SchemaValidator {
        &self.schema
    }

    pub fn validate_model(&self, model: &Model) -> ValidationResult {
        let _span = info_span!("validate_model", elements = model.element_count()).entered();
        let mut result = ValidationResult::new();

        for (layer, data) in model.all_layers() {
            let stage = self.schema.validate_layer(layer, data.list_elements());
            debug!("Schema/{}: {} error(s)", layer, stage.error_count());
            result.merge(stage, &format!("[Schema/{}]", layer));
        }

        for (layer, data) in model.all_layers() {
            let stage = self.naming.validate_layer(layer, data.list_elements());
            debug!("Naming/{}: {} error(s)", layer, stage.error_count());
            result.merge(stage, &format!("[Naming/{}]", layer));
        }

        let stage = self.reference.validate(model);
        debug!("References: {} error(s)", stage.error_count());
        result.merge(stage, "[References]");

        let stage = self.semantic.validate(model);
        debug!(
            "Semantic: {} error(s), {} warning(s)",
            stage.error_count(),
            stage.warning_count()
        );
        result.merge(stage, "[Semantic]");

        info!(
            valid = result.is_valid(),
            errors = result.error_count(),
            warnings = result.warning_count(),
            "Model validation finished"
        );

        result
    }
}
