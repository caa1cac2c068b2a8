//! Plugin descriptor served at `/plugin.json`.
//!
//! The descriptor tells the host platform who the plugin is and which
//! facades, filters and controls it provides. It is built once at startup
//! and never mutated; fields the runtime does not model are kept in
//! `extra` maps so the document is served back exactly as it was given.

use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::CoreResult;

/// A capability the plugin exposes to the host (e.g. `message`, `modal`, `badge`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Facade {
    /// Facade identifier.
    pub id: String,
    /// Content types the facade handles.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub types: Option<Vec<String>>,
    /// Event types the facade subscribes to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub events: Option<Vec<String>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Facade {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            types: None,
            events: None,
            extra: Map::new(),
        }
    }

    pub fn with_types(mut self, types: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.types = Some(types.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_events(mut self, events: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.events = Some(events.into_iter().map(Into::into).collect());
        self
    }
}

/// A filter the host applies before forwarding events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Filter {
    pub id: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A UI control contributed by the plugin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Control {
    pub id: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Static plugin manifest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Descriptor {
    plugin_id: String,
    #[serde(default)]
    facades: Vec<Facade>,
    #[serde(default)]
    filters: Vec<Filter>,
    #[serde(default)]
    controls: Vec<Control>,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

impl Descriptor {
    /// Creates a descriptor with no facades, filters or controls.
    pub fn new(plugin_id: impl Into<String>) -> Self {
        Self {
            plugin_id: plugin_id.into(),
            facades: Vec::new(),
            filters: Vec::new(),
            controls: Vec::new(),
            extra: Map::new(),
        }
    }

    pub fn with_facade(mut self, facade: Facade) -> Self {
        self.facades.push(facade);
        self
    }

    pub fn with_filter(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn with_control(mut self, control: Control) -> Self {
        self.controls.push(control);
        self
    }

    /// Parses a descriptor from a JSON document.
    pub fn from_json(json: &str) -> CoreResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reads a descriptor from a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> CoreResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let descriptor = Self::from_json(&content)?;
        tracing::debug!(
            path = %path.display(),
            plugin_id = %descriptor.plugin_id,
            "Loaded plugin descriptor"
        );
        Ok(descriptor)
    }

    /// Encodes the descriptor once for serving.
    pub fn to_json_bytes(&self) -> CoreResult<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }

    pub fn plugin_id(&self) -> &str {
        &self.plugin_id
    }

    pub fn facades(&self) -> &[Facade] {
        &self.facades
    }

    pub fn filters(&self) -> &[Filter] {
        &self.filters
    }

    pub fn controls(&self) -> &[Control] {
        &self.controls
    }
}
