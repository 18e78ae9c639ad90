//! Graph vertices.

use serde::Serialize;

use crate::entity::{Entity, EntityKind};
use crate::error::GraphError;
use crate::properties::{Properties, IDENT_KEY};

/// A labeled vertex with an open property map.
///
/// `id` is populated only from decoded store rows; callers never set it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Vertex {
    id: Option<i64>,
    label: String,
    properties: Properties,
}

impl Vertex {
    /// Construct a vertex. Fails when the label is blank or the `ident`
    /// property is missing.
    pub fn new(label: impl Into<String>, properties: Properties) -> Result<Self, GraphError> {
        let label = label.into();
        if label.trim().is_empty() {
            return Err(GraphError::EmptyLabel {
                kind: EntityKind::Vertex,
            });
        }
        if properties.ident().is_none() {
            return Err(GraphError::MissingRequiredProperty {
                kind: EntityKind::Vertex,
                label,
                key: IDENT_KEY,
            });
        }
        Ok(Self {
            id: None,
            label,
            properties,
        })
    }

    /// Attach the store-assigned id, used when materializing fetched rows.
    pub fn with_id(mut self, id: Option<i64>) -> Self {
        self.id = id;
        self
    }

    pub fn id(&self) -> Option<i64> {
        self.id
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn properties(&self) -> &Properties {
        &self.properties
    }

    pub fn ident(&self) -> &str {
        self.properties.ident().unwrap_or_default()
    }

    pub(crate) fn set_label(&mut self, label: &str) {
        self.label = label.to_string();
    }

    pub(crate) fn properties_mut(&mut self) -> &mut Properties {
        &mut self.properties
    }
}

impl Entity for Vertex {
    fn id(&self) -> Option<i64> {
        self.id
    }

    fn label(&self) -> &str {
        &self.label
    }

    fn properties(&self) -> &Properties {
        &self.properties
    }
}
