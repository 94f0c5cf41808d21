use std::path::Path;

use pod_path::NameRules;
use serde::{Deserialize, Serialize};

use crate::error::{ProtocolError, ProtocolResult};

/// Configuration for a [`Pod`](crate::Pod).
///
/// Every field has a default, so a TOML file only needs the keys it wants
/// to change:
///
/// ```toml
/// base_url = "https://alice.pod.example/"
/// reject_non_empty_delete = true
///
/// [name_rules]
/// max_length = 128
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PodConfig {
    /// Root namespace; every resource identifier starts with it.
    pub base_url: String,
    /// Content type stored for objects written without one.
    pub default_object_type: String,
    /// Content type stored for containers written without one.
    pub default_container_type: String,
    /// When `true`, deleting a container that still has children is
    /// answered with `409` instead of removing the row.
    pub reject_non_empty_delete: bool,
    /// Rules applied to every decoded path segment.
    pub name_rules: NameRules,
}

impl Default for PodConfig {
    fn default() -> Self {
        Self {
            base_url: "https://pod.example/".into(),
            default_object_type: "text/plain".into(),
            default_container_type: "text/turtle".into(),
            reject_non_empty_delete: false,
            name_rules: NameRules::default(),
        }
    }
}

impl PodConfig {
    /// Default configuration rooted at `base_url`.
    pub fn with_base(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    pub fn from_toml_str(text: &str) -> ProtocolResult<Self> {
        toml::from_str(text).map_err(|e| ProtocolError::Config(e.to_string()))
    }

    pub fn load(path: &Path) -> ProtocolResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }
}
