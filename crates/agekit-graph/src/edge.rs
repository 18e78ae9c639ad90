//! Graph edges.

use serde::Serialize;

use crate::entity::{Entity, EntityKind};
use crate::error::GraphError;
use crate::properties::{Properties, END_IDENT_KEY, IDENT_KEY, START_IDENT_KEY};

/// A directed, labeled edge with an open property map.
///
/// Endpoints are referenced by vertex ident (`start_ident`/`end_ident`
/// properties). The numeric `id`/`start_id`/`end_id` are store artifacts
/// populated from decoded rows only. Endpoint idents are validated against
/// the owning graph's vertices at persistence time, not here — graphs may be
/// built incrementally with forward references.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Edge {
    id: Option<i64>,
    start_id: Option<i64>,
    end_id: Option<i64>,
    label: String,
    properties: Properties,
}

impl Edge {
    /// Construct an edge. Fails when the label is blank or any of the
    /// `ident`, `start_ident`, `end_ident` properties are missing.
    pub fn new(label: impl Into<String>, properties: Properties) -> Result<Self, GraphError> {
        let label = label.into();
        if label.trim().is_empty() {
            return Err(GraphError::EmptyLabel {
                kind: EntityKind::Edge,
            });
        }
        for (present, key) in [
            (properties.ident().is_some(), IDENT_KEY),
            (properties.start_ident().is_some(), START_IDENT_KEY),
            (properties.end_ident().is_some(), END_IDENT_KEY),
        ] {
            if !present {
                return Err(GraphError::MissingRequiredProperty {
                    kind: EntityKind::Edge,
                    label,
                    key,
                });
            }
        }
        Ok(Self {
            id: None,
            start_id: None,
            end_id: None,
            label,
            properties,
        })
    }

    /// Attach store-assigned ids, used when materializing fetched rows.
    pub fn with_ids(
        mut self,
        id: Option<i64>,
        start_id: Option<i64>,
        end_id: Option<i64>,
    ) -> Self {
        self.id = id;
        self.start_id = start_id;
        self.end_id = end_id;
        self
    }

    pub fn id(&self) -> Option<i64> {
        self.id
    }

    pub fn start_id(&self) -> Option<i64> {
        self.start_id
    }

    pub fn end_id(&self) -> Option<i64> {
        self.end_id
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

    pub fn start_ident(&self) -> &str {
        self.properties.start_ident().unwrap_or_default()
    }

    pub fn end_ident(&self) -> &str {
        self.properties.end_ident().unwrap_or_default()
    }

    pub(crate) fn set_label(&mut self, label: &str) {
        self.label = label.to_string();
    }

    pub(crate) fn properties_mut(&mut self) -> &mut Properties {
        &mut self.properties
    }
}

impl Entity for Edge {
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

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn edge_props() -> Properties {
        Properties::from_value(json!({
            "ident": "k1",
            "start_ident": "a",
            "end_ident": "b",
        }))
        .unwrap()
    }

    #[test]
    fn test_new_requires_all_identity_keys() {
        let mut props = edge_props();
        props.remove(END_IDENT_KEY);
        let err = Edge::new("KNOWS", props).unwrap_err();
        assert!(matches!(
            err,
            GraphError::MissingRequiredProperty {
                key: END_IDENT_KEY,
                ..
            }
        ));
    }

    #[test]
    fn test_endpoint_accessors() {
        let edge = Edge::new("KNOWS", edge_props()).unwrap();
        assert_eq!(edge.ident(), "k1");
        assert_eq!(edge.start_ident(), "a");
        assert_eq!(edge.end_ident(), "b");
        assert!(edge.id().is_none());
    }
}
