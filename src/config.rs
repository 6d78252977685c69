//! Configuration for model validation
//!
//! Supports loading configuration from:
//! - Default values
//! - Config file (archmodel.toml)
//! - Environment variables (ARCHMODEL__*)
//!
//! ## Example config file (archmodel.toml):
//! ```toml
//! [schemas]
//! dir = "./model/schemas"
//! catalog = "relationship-catalog.json"
//!
//! [validation]
//! fail_on_warnings = false
//!
//! [projection]
//! default_rules = true
//! ```

use config_crate::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

use crate::error::Result;
use crate::resources::{DirectorySchemas, EmbeddedSchemas, SchemaSource, CATALOG_FILE};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ArchModelConfig {
    #[serde(default)]
    pub schemas: SchemasConfig,

    #[serde(default)]
    pub validation: ValidationConfig,

    #[serde(default)]
    pub projection: ProjectionConfig,
}

/// Where layer schemas and the relationship catalogue come from
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemasConfig {
    /// Directory overriding the bundled schemas
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dir: Option<PathBuf>,

    /// Catalogue file name inside `dir`
    #[serde(default = "default_catalog")]
    pub catalog: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ValidationConfig {
    /// Treat warnings as a failed run
    #[serde(default)]
    pub fail_on_warnings: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectionConfig {
    /// Start from the top-down rule table
    #[serde(default = "default_true")]
    pub default_rules: bool,
}

fn default_catalog() -> String {
    CATALOG_FILE.to_string()
}

fn default_true() -> bool {
    true
}

impl Default for SchemasConfig {
    fn default() -> Self {
        Self {
            dir: None,
            catalog: default_catalog(),
        }
    }
}

impl Default for ProjectionConfig {
    fn default() -> Self {
        Self {
            default_rules: default_true(),
        }
    }
}

impl ArchModelConfig {
    /// Load configuration from default locations
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration, adding an explicit (required) file
    pub fn load_from(config_path: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder();

        for location in ["archmodel.toml", ".archmodel.toml", "config/archmodel.toml"] {
            builder = builder.add_source(File::with_name(location).required(false));
        }

        if let Some(dirs) = directories::ProjectDirs::from("dev", "archmodel", "archmodel") {
            let xdg_config = dirs.config_dir().join("archmodel.toml");
            if xdg_config.exists() {
                debug!("Using config {}", xdg_config.display());
                builder = builder.add_source(File::from(xdg_config).required(false));
            }
        }

        if let Some(path) = config_path {
            builder = builder.add_source(File::from(path.to_path_buf()).required(true));
        }

        builder = builder.add_source(
            Environment::with_prefix("ARCHMODEL")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        Ok(builder.build()?.try_deserialize()?)
    }

    /// Save configuration to a file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Schema source selected by `[schemas]`: the directory if set,
    /// otherwise the bundled schemas.
    pub fn schema_source(&self) -> Arc<dyn SchemaSource> {
        match &self.schemas.dir {
            Some(dir) => Arc::new(DirectorySchemas::open(dir).with_catalog_file(self.schemas.catalog.clone())),
            None => Arc::new(EmbeddedSchemas),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layer::Layer;

    #[test]
    fn test_default_config() {
        let config = ArchModelConfig::default();
        assert!(config.schemas.dir.is_none());
        assert_eq!(config.schemas.catalog, "relationship-catalog.json");
        assert!(!config.validation.fail_on_warnings);
        assert!(config.projection.default_rules);
    }

    #[test]
    fn test_serialize_config() {
        let config = ArchModelConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("[schemas]"));
        assert!(toml_str.contains("[validation]"));
        assert!(toml_str.contains("[projection]"));
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.toml");

        let mut config = ArchModelConfig::default();
        config.validation.fail_on_warnings = true;
        config.schemas.dir = Some(dir.path().to_path_buf());
        config.save(&path).unwrap();

        let loaded = ArchModelConfig::load_from(Some(path.as_path())).unwrap();
        assert!(loaded.validation.fail_on_warnings);
        assert_eq!(loaded.schemas.dir.as_deref(), Some(dir.path()));
        assert!(loaded.projection.default_rules);
    }

    #[test]
    fn test_missing_explicit_file_errors() {
        let dir = tempfile::tempdir().unwrap();
        assert!(ArchModelConfig::load_from(Some(dir.path().join("absent.toml").as_path())).is_err());
    }

    #[test]
    fn test_schema_source_selection() {
        let config = ArchModelConfig::default();
        assert!(config.schema_source().layer_schema(Layer::Api).is_some());

        let dir = tempfile::tempdir().unwrap();
        let mut config = ArchModelConfig::default();
        config.schemas.dir = Some(dir.path().to_path_buf());
        let source = config.schema_source();
        assert!(source.layer_schema(Layer::Api).is_none());
        assert!(source.relationship_catalog().is_none());
    }
}
