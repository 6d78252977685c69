//! The twelve ordered architecture layers
//!
//! Layers are parsed once at the system boundary. Everything past that point
//! carries a [`Layer`] value and never re-parses prefixes.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{ModelError, Result};

/// One of the 12 fixed architecture concerns, ordered from motivation (1)
/// down to testing (12).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Layer {
    Motivation,
    Business,
    Security,
    Application,
    Technology,
    Api,
    DataModel,
    Datastore,
    Ux,
    Navigation,
    Apm,
    Testing,
}

impl Layer {
    /// All layers in ordinal order
    pub const ALL: [Layer; 12] = [
        Layer::Motivation,
        Layer::Business,
        Layer::Security,
        Layer::Application,
        Layer::Technology,
        Layer::Api,
        Layer::DataModel,
        Layer::Datastore,
        Layer::Ux,
        Layer::Navigation,
        Layer::Apm,
        Layer::Testing,
    ];

    /// Canonical identifier, also the first segment(s) of every element id
    pub fn id(&self) -> &'static str {
        match self {
            Layer::Motivation => "motivation",
            Layer::Business => "business",
            Layer::Security => "security",
            Layer::Application => "application",
            Layer::Technology => "technology",
            Layer::Api => "api",
            Layer::DataModel => "data-model",
            Layer::Datastore => "datastore",
            Layer::Ux => "ux",
            Layer::Navigation => "navigation",
            Layer::Apm => "apm",
            Layer::Testing => "testing",
        }
    }

    /// 1-based position; lower ordinals are "higher" conceptual layers
    pub fn ordinal(&self) -> u8 {
        match self {
            Layer::Motivation => 1,
            Layer::Business => 2,
            Layer::Security => 3,
            Layer::Application => 4,
            Layer::Technology => 5,
            Layer::Api => 6,
            Layer::DataModel => 7,
            Layer::Datastore => 8,
            Layer::Ux => 9,
            Layer::Navigation => 10,
            Layer::Apm => 11,
            Layer::Testing => 12,
        }
    }

    /// Numbered directory form, e.g. `06-api`
    pub fn dir_name(&self) -> String {
        format!("{:02}-{}", self.ordinal(), self.id())
    }

    /// Number of hyphen-separated segments in the canonical id
    pub fn segment_count(&self) -> usize {
        self.id().split('-').count()
    }

    pub fn from_ordinal(ordinal: u8) -> Option<Layer> {
        Self::ALL.iter().copied().find(|l| l.ordinal() == ordinal)
    }

    /// Parse a layer name at the boundary.
    ///
    /// Accepts the canonical id (`api`), the numbered form (`06-api`) and a bare
    /// ordinal (`06` or `6`), case-insensitively.
    pub fn parse(input: &str) -> Result<Layer> {
        let normalized = input.trim().to_lowercase();

        if let Some(layer) = Self::ALL.iter().find(|l| l.id() == normalized) {
            return Ok(*layer);
        }

        if let Ok(n) = normalized.parse::<u8>() {
            return Self::from_ordinal(n).ok_or_else(|| ModelError::UnknownLayer(input.to_string()));
        }

        if let Some((num, rest)) = normalized.split_once('-') {
            if let Ok(n) = num.parse::<u8>() {
                if let Some(layer) = Self::from_ordinal(n) {
                    if layer.id() == rest {
                        return Ok(layer);
                    }
                }
            }
        }

        Err(ModelError::UnknownLayer(input.to_string()))
    }

    /// Resolve the layer an element id belongs to.
    ///
    /// Matches by full segment: the canonical id must be followed by `-` or the
    /// end of the string. The longest matching id wins.
    pub fn from_element_id(element_id: &str) -> Option<Layer> {
        Self::ALL
            .iter()
            .copied()
            .filter(|l| l.matches_element_id(element_id))
            .max_by_key(|l| l.id().len())
    }

    /// True if `element_id` lives in this layer (full-segment prefix match)
    pub fn matches_element_id(&self, element_id: &str) -> bool {
        match element_id.strip_prefix(self.id()) {
            Some(rest) => rest.is_empty() || rest.starts_with('-'),
            None => false,
        }
    }
}

impl fmt::Display for Layer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id())
    }
}

impl FromStr for Layer {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self> {
        Layer::parse(s)
    }
}
