//! Model validation
//!
//! Four validators, each reporting defects as [`ValidationIssue`]s rather than
//! errors, orchestrated by [`ValidationPipeline`]:
//!
//! 1. **Schema**: element shape against per-layer JSON Schemas
//! 2. **Naming**: `{layer}-{type}-{kebab-name}` id format
//! 3. **Reference**: reference targets exist and point downwards
//! 4. **Semantic**: global id uniqueness, relationship predicate catalogue

pub mod naming;
pub mod pipeline;
pub mod reference;
pub mod result;
pub mod schema;
pub mod semantic;

pub use naming::{NamingDefect, NamingValidator};
pub use pipeline::ValidationPipeline;
pub use reference::ReferenceValidator;
pub use result::{IssueKind, Severity, ValidationIssue, ValidationReport, ValidationResult};
pub use schema::{CompiledLayer, SchemaValidator};
pub use semantic::{PredicateCatalog, SemanticValidator};
