//! End-to-end validation against the bundled schemas and catalogue

use std::sync::Arc;

use archmodel::validation::{IssueKind, Severity, ValidationPipeline};
use archmodel::{DirectorySchemas, Element, InMemorySchemas, Layer, Model};
use serde_json::json;

fn valid_model() -> Model {
    Model::new()
        .with_element(
            Layer::Motivation,
            Element::new("motivation-goal-self-service", "goal", "Self service")
                .with_property("priority", "high")
                .with_reference("business-service-accounts", "realized-by"),
        )
        .with_element(
            Layer::Business,
            Element::new("business-service-accounts", "service", "Accounts")
                .with_reference("application-component-user-api", "realized-by"),
        )
        .with_element(
            Layer::Application,
            Element::new("application-component-user-api", "component", "User API")
                .with_property("componentType", "backend")
                .with_reference("api-endpoint-create-user", "exposes")
                .with_relationship("business-service-accounts", "realizes"),
        )
        .with_element(
            Layer::Api,
            Element::new("api-endpoint-create-user", "endpoint", "Create user")
                .with_property("method", "POST")
                .with_property("path", "/users"),
        )
}

#[test]
fn test_valid_model_passes() {
    let pipeline = ValidationPipeline::default();
    let result = pipeline.validate_model(&valid_model());

    assert!(result.is_valid(), "{}", result.summary());
    assert_eq!(result.warning_count(), 0);
}

#[test]
fn test_missing_required_attribute() {
    let model = Model::new().with_element(
        Layer::Api,
        Element::new("api-endpoint-create-user", "endpoint", "Create user").with_property("path", "/users"),
    );

    let result = ValidationPipeline::default().validate_model(&model);

    assert_eq!(result.error_count(), 1);
    let issue = &result.errors()[0];
    assert_eq!(issue.kind, IssueKind::StructuralViolation);
    assert_eq!(issue.layer, Layer::Api);
    assert_eq!(issue.element_id.as_deref(), Some("api-endpoint-create-user"));
    assert_eq!(issue.location, "/method");
    assert!(issue.message.starts_with("[Schema/api]: "));
    assert!(issue.message.contains("required"));
    assert!(!issue.fix_suggestion.is_empty());
}

#[test]
fn test_every_stage_runs() {
    let model = Model::new()
        .with_element(
            Layer::Api,
            Element::new("api-endpoint-broken", "endpoint", "Broken")
                .with_property("method", "FETCH")
                .with_property("path", "/broken"),
        )
        .with_element(
            Layer::Business,
            Element::new("business-Service_Orders", "process", "Orders")
                .with_reference("business-process-missing", "uses"),
        )
        .with_element(
            Layer::Application,
            Element::new("api-endpoint-broken", "component", "Duplicate"),
        );

    let result = ValidationPipeline::default().validate_model(&model);
    let messages: Vec<&str> = result.errors().iter().map(|i| i.message.as_str()).collect();

    assert!(messages.iter().any(|m| m.starts_with("[Schema/api]: ")));
    assert!(messages.iter().any(|m| m.starts_with("[Naming/business]: ")));
    assert!(messages.iter().any(|m| m.starts_with("[Naming/application]: ")));
    assert!(messages.iter().any(|m| m.starts_with("[References]: ")));
    assert!(messages.iter().any(|m| m.starts_with("[Semantic]: ")));

    let first_naming = messages.iter().position(|m| m.starts_with("[Naming/")).unwrap();
    let last_schema = messages.iter().rposition(|m| m.starts_with("[Schema/")).unwrap();
    let references = messages.iter().position(|m| m.starts_with("[References]")).unwrap();
    let semantic = messages.iter().position(|m| m.starts_with("[Semantic]")).unwrap();
    assert!(last_schema < first_naming);
    assert!(first_naming < references);
    assert!(references < semantic);
}

#[test]
fn test_broken_and_upward_references() {
    let model = Model::new()
        .with_element(
            Layer::Business,
            Element::new("business-service-accounts", "service", "Accounts"),
        )
        .with_element(
            Layer::Application,
            Element::new("application-component-user-api", "component", "User API")
                .with_reference("business-service-accounts", "serves")
                .with_reference("data-model-entity-user", "stores"),
        );

    let result = ValidationPipeline::default().validate_model(&model);
    let kinds: Vec<IssueKind> = result.errors().iter().map(|i| i.kind).collect();

    assert!(kinds.contains(&IssueKind::BrokenReference));
    assert!(kinds.contains(&IssueKind::DirectionViolation));

    let broken = result
        .errors()
        .iter()
        .find(|i| i.kind == IssueKind::BrokenReference)
        .unwrap();
    assert!(broken.message.contains("data-model-entity-user"));
    assert_eq!(broken.location, "references[1]");

    let upward = result
        .errors()
        .iter()
        .find(|i| i.kind == IssueKind::DirectionViolation)
        .unwrap();
    assert!(upward.message.contains("application (4)"));
    assert!(upward.message.contains("business (2)"));
}

#[test]
fn test_duplicate_id_across_layers() {
    let model = Model::new()
        .with_element(
            Layer::Business,
            Element::new("business-service-accounts", "service", "Accounts"),
        )
        .with_element(
            Layer::Application,
            Element::new("business-service-accounts", "component", "Accounts again"),
        );

    let result = ValidationPipeline::default().validate_model(&model);
    let duplicates: Vec<_> = result
        .errors()
        .iter()
        .filter(|i| i.kind == IssueKind::DuplicateId)
        .collect();

    assert_eq!(duplicates.len(), 1);
    assert_eq!(duplicates[0].layer, Layer::Application);
    assert!(duplicates[0].message.contains("already exists in layer business"));
}

#[test]
fn test_unknown_predicate_is_only_a_warning() {
    let model = valid_model().with_element(
        Layer::Application,
        Element::new("application-component-audit", "component", "Audit")
            .with_relationship("application-component-user-api", "depend-on"),
    );

    let result = ValidationPipeline::default().validate_model(&model);

    assert!(result.is_valid(), "{}", result.summary());
    assert_eq!(result.warning_count(), 1);
    let warning = &result.warnings()[0];
    assert_eq!(warning.severity, Severity::Warning);
    assert_eq!(warning.kind, IssueKind::UnknownPredicate);
    assert!(warning.message.starts_with("[Semantic]: "));
    assert!(warning.message.contains("depends-on"));
}

#[test]
fn test_serialized_result_shape() {
    let model = Model::new().with_element(
        Layer::Api,
        Element::new("api-endpoint-create-user", "endpoint", "Create user").with_property("path", "/users"),
    );

    let result = ValidationPipeline::default().validate_model(&model);
    let value = serde_json::to_value(&result).unwrap();

    assert_eq!(value["valid"], json!(false));
    assert_eq!(value["errorCount"], json!(1));
    assert_eq!(value["warningCount"], json!(0));
    assert_eq!(value["warnings"], json!([]));

    let issue = &value["errors"][0];
    assert_eq!(issue["layer"], json!("api"));
    assert_eq!(issue["elementId"], json!("api-endpoint-create-user"));
    assert_eq!(issue["severity"], json!("error"));
    assert_eq!(issue["location"], json!("/method"));
    assert!(issue["fixSuggestion"].is_string());
}

#[test]
fn test_model_from_json() {
    let snapshot = json!({
        "layers": {
            "api": {
                "elements": [
                    { "id": "api-endpoint-list-users", "type": "endpoint", "name": "List users",
                      "properties": { "method": "GET", "path": "/users" } }
                ]
            }
        }
    });

    let model = Model::from_json_str(&snapshot.to_string()).unwrap();
    let result = ValidationPipeline::default().validate_model(&model);
    assert!(result.is_valid(), "{}", result.summary());
}

#[test]
fn test_missing_resources_degrade() {
    let pipeline = ValidationPipeline::new(Arc::new(InMemorySchemas::new()));
    let model = Model::new().with_element(
        Layer::Api,
        Element::new("api-endpoint-create-user", "endpoint", "Create user")
            .with_relationship("api-endpoint-other", "whatever"),
    );

    let result = pipeline.validate_model(&model);
    assert!(result.is_valid(), "{}", result.summary());
    assert_eq!(result.warning_count(), 0);
}

#[test]
fn test_directory_schema_source() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("04-application.schema.json"),
        json!({
            "layer": "application",
            "elementTypes": {
                "component": {
                    "type": "object",
                    "required": ["id", "type", "name", "owner"]
                }
            }
        })
        .to_string(),
    )
    .unwrap();

    let source = DirectorySchemas::open(dir.path());
    let pipeline = ValidationPipeline::new(Arc::new(source));
    let model = Model::new().with_element(
        Layer::Application,
        Element::new("application-component-billing", "component", "Billing"),
    );

    let result = pipeline.validate_model(&model);
    assert_eq!(result.error_count(), 1);
    assert_eq!(result.errors()[0].location, "/owner");

    pipeline.validate_model(&model);
    assert_eq!(pipeline.schema_validator().compilation_count(), 1);
}
