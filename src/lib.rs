//! Architecture Model Validation
//!
//! Validation and cross-layer graph analysis for a federated architecture
//! model: typed elements spread across 12 ordered layers, linked by
//! references and predicate-typed relationships.
//!
//! ## Features
//!
//! - **Layered Validation**: schema, naming, reference and semantic checks in
//!   one pass, collected into a single [`ValidationResult`]
//! - **Bundled Schemas**: per-layer JSON Schemas and the relationship catalogue
//!   are embedded, with a directory override
//! - **Dependency Tracking**: transitive dependents, impact by layer, cycles
//! - **Projection**: rule-driven traversal between layers
//!
//! ## Architecture
//!
//! ```text
//! Model ──► ValidationPipeline ──► ValidationResult
//!  │          ├─ SchemaValidator      (per layer)
//!  │          ├─ NamingValidator      (per layer)
//!  │          ├─ ReferenceValidator
//!  │          └─ SemanticValidator
//!  │
//!  └──► ReferenceRegistry ─┐
//!       RelationshipRegistry ─┴─► DependencyGraph ──► DependencyTracker
//!                                                 └─► ProjectionEngine
//! ```

pub mod checksum;
pub mod config;
pub mod error;
pub mod graph;
pub mod layer;
pub mod model;
pub mod resources;
pub mod validation;

pub use checksum::Checksum;
pub use config::ArchModelConfig;
pub use error::{ModelError, Result};
pub use graph::{
    DependencyGraph, DependencyTracker, GraphEdge, ProjectionEngine, ProjectionRule, ReferenceRegistry,
    RelationshipRegistry, RelationshipType,
};
pub use layer::Layer;
pub use model::{Element, LayerData, Model, PropertyValue, Reference, Relationship};
pub use resources::{DirectorySchemas, EmbeddedSchemas, InMemorySchemas, SchemaSource};
pub use validation::{
    IssueKind, Severity, ValidationIssue, ValidationPipeline, ValidationReport, ValidationResult,
};
