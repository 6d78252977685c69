//! Model snapshot types
//!
//! The model is owned and edited by collaborators outside this crate. The
//! validators and graph builders only read it.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

use crate::error::Result;
use crate::layer::Layer;

/// Open property bag value.
///
/// A closed recursive variant so arbitrary user properties survive without an
/// unconstrained dynamic type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    Null,
    Bool(bool),
    Number(serde_json::Number),
    String(String),
    List(Vec<PropertyValue>),
    Map(BTreeMap<String, PropertyValue>),
}

impl PropertyValue {
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            PropertyValue::Null => serde_json::Value::Null,
            PropertyValue::Bool(b) => serde_json::Value::Bool(*b),
            PropertyValue::Number(n) => serde_json::Value::Number(n.clone()),
            PropertyValue::String(s) => serde_json::Value::String(s.clone()),
            PropertyValue::List(items) => {
                serde_json::Value::Array(items.iter().map(PropertyValue::to_json).collect())
            }
            PropertyValue::Map(map) => serde_json::Value::Object(
                map.iter().map(|(k, v)| (k.clone(), v.to_json())).collect(),
            ),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            PropertyValue::String(s) => Some(s),
            _ => None,
        }
    }
}

impl From<&str> for PropertyValue {
    fn from(s: &str) -> Self {
        PropertyValue::String(s.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(s: String) -> Self {
        PropertyValue::String(s)
    }
}

impl From<bool> for PropertyValue {
    fn from(b: bool) -> Self {
        PropertyValue::Bool(b)
    }
}

impl From<i64> for PropertyValue {
    fn from(n: i64) -> Self {
        PropertyValue::Number(n.into())
    }
}

/// Property map keyed by property name
pub type Properties = BTreeMap<String, PropertyValue>;

/// Directed traceability edge between two elements
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Reference {
    pub source: String,
    pub target: String,
    #[serde(rename = "type")]
    pub reference_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Reference {
    pub fn new(
        source: impl Into<String>,
        target: impl Into<String>,
        reference_type: impl Into<String>,
    ) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            reference_type: reference_type.into(),
            description: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Directed, predicate-typed edge between two elements
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Relationship {
    pub source: String,
    pub target: String,
    pub predicate: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<Properties>,
}

impl Relationship {
    pub fn new(
        source: impl Into<String>,
        target: impl Into<String>,
        predicate: impl Into<String>,
    ) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            predicate: predicate.into(),
            properties: None,
        }
    }
}

/// A uniquely identified, typed node in the architecture model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    pub id: String,
    #[serde(rename = "type")]
    pub element_type: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: Properties,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub references: Vec<Reference>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub relationships: Vec<Relationship>,
}

impl Element {
    pub fn new(
        id: impl Into<String>,
        element_type: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            element_type: element_type.into(),
            name: name.into(),
            description: None,
            properties: Properties::new(),
            references: Vec::new(),
            relationships: Vec::new(),
        }
    }

    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<PropertyValue>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    /// Add a reference from this element to `target`
    pub fn with_reference(mut self, target: impl Into<String>, reference_type: impl Into<String>) -> Self {
        let reference = Reference::new(self.id.clone(), target, reference_type);
        self.references.push(reference);
        self
    }

    /// Add a relationship from this element to `target`
    pub fn with_relationship(mut self, target: impl Into<String>, predicate: impl Into<String>) -> Self {
        let relationship = Relationship::new(self.id.clone(), target, predicate);
        self.relationships.push(relationship);
        self
    }

    /// Shape checked against the layer schema: properties flattened at top
    /// level, overlaid by the core fields.
    pub fn to_schema_instance(&self) -> serde_json::Value {
        let mut obj = serde_json::Map::new();
        for (key, value) in &self.properties {
            obj.insert(key.clone(), value.to_json());
        }
        obj.insert("id".to_string(), serde_json::Value::String(self.id.clone()));
        obj.insert("type".to_string(), serde_json::Value::String(self.element_type.clone()));
        obj.insert("name".to_string(), serde_json::Value::String(self.name.clone()));
        if let Some(description) = &self.description {
            obj.insert("description".to_string(), serde_json::Value::String(description.clone()));
        }
        serde_json::Value::Object(obj)
    }
}

/// Elements of a single layer, in insertion order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LayerData {
    #[serde(default)]
    pub elements: Vec<Element>,
}

impl LayerData {
    pub fn list_elements(&self) -> &[Element] {
        &self.elements
    }
}

/// In-memory snapshot of a whole architecture model
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Model {
    #[serde(default)]
    pub layers: BTreeMap<Layer, LayerData>,
}

impl Model {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a model snapshot handed over as JSON
    pub fn from_json_str(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    /// Append an element to a layer, creating the layer if needed
    pub fn add_element(&mut self, layer: Layer, element: Element) {
        self.layers.entry(layer).or_default().elements.push(element);
    }

    /// Builder form of [`Model::add_element`]
    pub fn with_element(mut self, layer: Layer, element: Element) -> Self {
        self.add_element(layer, element);
        self
    }

    /// All present layers in ordinal order
    pub fn all_layers(&self) -> impl Iterator<Item = (Layer, &LayerData)> {
        self.layers.iter().map(|(layer, data)| (*layer, data))
    }

    pub fn layer(&self, layer: Layer) -> Option<&LayerData> {
        self.layers.get(&layer)
    }

    /// Every element, layer order first, then insertion order
    pub fn elements(&self) -> impl Iterator<Item = (Layer, &Element)> {
        self.layers
            .iter()
            .flat_map(|(layer, data)| data.elements.iter().map(move |e| (*layer, e)))
    }

    /// First element with the given id
    pub fn element(&self, id: &str) -> Option<&Element> {
        self.elements().map(|(_, e)| e).find(|e| e.id == id)
    }

    pub fn element_ids(&self) -> HashSet<&str> {
        self.elements().map(|(_, e)| e.id.as_str()).collect()
    }

    pub fn element_count(&self) -> usize {
        self.layers.values().map(|d| d.elements.len()).sum()
    }
}
