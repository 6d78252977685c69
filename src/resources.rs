//! Layer-keyed schema resources
//!
//! Per-layer JSON Schema documents and the relationship predicate catalogue
//! are read from a [`SchemaSource`]. A missing or unreadable resource is not an
//! error: callers treat it as "nothing to check".
//!
//! ## Layout
//!
//! ```text
//! schemas/
//! ├── motivation.schema.json      (or 01-motivation.schema.json)
//! ├── api.schema.json
//! ├── ...
//! └── relationship-catalog.json
//! ```

use include_dir::{include_dir, Dir};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::error::{ModelError, Result};
use crate::graph::RelationshipType;
use crate::layer::Layer;

/// Schemas compiled into the binary
static BUNDLED_SCHEMAS: Dir<'_> = include_dir!("$CARGO_MANIFEST_DIR/schemas");

/// Default file name of the relationship catalogue
pub const CATALOG_FILE: &str = "relationship-catalog.json";

const SCHEMA_SUFFIX: &str = ".schema.json";

/// Where layer schemas and the predicate catalogue come from
pub trait SchemaSource: Send + Sync {
    /// Raw schema document for a layer, `None` if absent
    fn layer_schema(&self, layer: Layer) -> Option<String>;

    /// Raw relationship catalogue, `None` if absent
    fn relationship_catalog(&self) -> Option<String>;

    /// Human-readable origin, used in log messages
    fn describe(&self) -> String;

    /// Layers that have a schema document
    fn available_layers(&self) -> Vec<Layer> {
        Layer::ALL
            .iter()
            .copied()
            .filter(|l| self.layer_schema(*l).is_some())
            .collect()
    }
}

/// Schemas bundled at compile time via `include_dir!`
#[derive(Debug, Clone, Copy, Default)]
pub struct EmbeddedSchemas;

impl EmbeddedSchemas {
    fn read(name: &str) -> Option<String> {
        BUNDLED_SCHEMAS
            .get_file(name)
            .and_then(|f| f.contents_utf8())
            .map(str::to_string)
    }
}

impl SchemaSource for EmbeddedSchemas {
    fn layer_schema(&self, layer: Layer) -> Option<String> {
        Self::read(&format!("{}{}", layer.id(), SCHEMA_SUFFIX))
            .or_else(|| Self::read(&format!("{}{}", layer.dir_name(), SCHEMA_SUFFIX)))
    }

    fn relationship_catalog(&self) -> Option<String> {
        Self::read(CATALOG_FILE)
    }

    fn describe(&self) -> String {
        "bundled schemas".to_string()
    }
}

/// Schemas read from a directory on disk
#[derive(Debug, Clone)]
pub struct DirectorySchemas {
    root: PathBuf,
    catalog_file: String,
    layer_files: HashMap<Layer, PathBuf>,
}

impl DirectorySchemas {
    /// Index `*.schema.json` files directly under `root`.
    ///
    /// File stems are parsed as layers (`api`, `06-api`); files that name no
    /// layer are ignored. A missing directory yields an empty source.
    pub fn open(root: impl AsRef<Path>) -> Self {
        let root = root.as_ref().to_path_buf();
        let mut layer_files = HashMap::new();

        for entry in WalkDir::new(&root)
            .max_depth(1)
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            let Some(stem) = file_name.strip_suffix(SCHEMA_SUFFIX) else {
                continue;
            };
            match Layer::parse(stem) {
                Ok(layer) => {
                    layer_files.insert(layer, path.to_path_buf());
                }
                Err(_) => debug!("Ignoring schema file with no layer: {}", path.display()),
            }
        }

        Self {
            root,
            catalog_file: CATALOG_FILE.to_string(),
            layer_files,
        }
    }

    /// Use a different file name for the relationship catalogue
    pub fn with_catalog_file(mut self, name: impl Into<String>) -> Self {
        self.catalog_file = name.into();
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn read(path: &Path) -> Option<String> {
        match fs::read_to_string(path) {
            Ok(content) => Some(content),
            Err(e) if e.kind() == ErrorKind::NotFound => None,
            Err(e) => {
                warn!("Failed to read {}: {}", path.display(), e);
                None
            }
        }
    }
}

impl SchemaSource for DirectorySchemas {
    fn layer_schema(&self, layer: Layer) -> Option<String> {
        self.layer_files.get(&layer).and_then(|p| Self::read(p))
    }

    fn relationship_catalog(&self) -> Option<String> {
        Self::read(&self.root.join(&self.catalog_file))
    }

    fn describe(&self) -> String {
        format!("schema directory {}", self.root.display())
    }
}

/// Schemas held in memory, for injection and tests
#[derive(Debug, Clone, Default)]
pub struct InMemorySchemas {
    layers: HashMap<Layer, String>,
    catalog: Option<String>,
}

impl InMemorySchemas {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_layer(mut self, layer: Layer, document: impl Into<String>) -> Self {
        self.layers.insert(layer, document.into());
        self
    }

    pub fn with_catalog(mut self, document: impl Into<String>) -> Self {
        self.catalog = Some(document.into());
        self
    }
}

impl SchemaSource for InMemorySchemas {
    fn layer_schema(&self, layer: Layer) -> Option<String> {
        self.layers.get(&layer).cloned()
    }

    fn relationship_catalog(&self) -> Option<String> {
        self.catalog.clone()
    }

    fn describe(&self) -> String {
        format!("in-memory schemas ({} layers)", self.layers.len())
    }
}

/// Catalogue of relationship types
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelationshipCatalog {
    #[serde(default)]
    pub relationship_types: Vec<RelationshipType>,
}

impl RelationshipCatalog {
    pub fn parse(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    /// Load the catalogue of a source.
    ///
    /// `Ok(None)` when the source has no catalogue; `Err` when it exists but
    /// does not parse.
    pub fn load(source: &dyn SchemaSource) -> Result<Option<Self>> {
        match source.relationship_catalog() {
            Some(content) => Self::parse(&content).map(Some).map_err(|e| {
                ModelError::Resource(format!(
                    "relationship catalogue in {}: {}",
                    source.describe(),
                    e
                ))
            }),
            None => Ok(None),
        }
    }

    /// Valid predicates per layer. Types without `applicable_layers` apply to
    /// every layer.
    pub fn predicates_by_layer(&self) -> BTreeMap<Layer, Vec<String>> {
        let mut map: BTreeMap<Layer, Vec<String>> = BTreeMap::new();
        for def in &self.relationship_types {
            let layers: Vec<Layer> = match &def.applicable_layers {
                Some(layers) => layers.clone(),
                None => Layer::ALL.to_vec(),
            };
            for layer in layers {
                let predicates = map.entry(layer).or_default();
                if !predicates.contains(&def.predicate) {
                    predicates.push(def.predicate.clone());
                }
            }
        }
        map
    }
}
