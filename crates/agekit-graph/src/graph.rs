//! The graph aggregate: a named pair of vertex and edge collections.
//!
//! A `Graph` exclusively owns its entities. Mutation goes through graph
//! methods only; callers hold borrowed views, never copies. Entities whose
//! properties omit an `ident` get one from the identifier generator, checked
//! for uniqueness against the target collection.

use agekit_core::ident::{DEFAULT_DELIMITER, DEFAULT_WORD_COUNT};
use agekit_core::IdentGenerator;

use crate::collection::{EdgeCollection, VertexCollection};
use crate::edge::Edge;
use crate::entity::EntityKind;
use crate::error::GraphError;
use crate::properties::Properties;
use crate::vertex::Vertex;

/// An in-memory labeled-property graph snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct Graph {
    name: String,
    vertices: VertexCollection,
    edges: EdgeCollection,
}

impl Graph {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            vertices: VertexCollection::new(),
            edges: EdgeCollection::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn vertices(&self) -> &VertexCollection {
        &self.vertices
    }

    pub fn edges(&self) -> &EdgeCollection {
        &self.edges
    }

    pub fn vertex(&self, ident: &str) -> Option<&Vertex> {
        self.vertices.by_ident(ident)
    }

    pub fn edge(&self, ident: &str) -> Option<&Edge> {
        self.edges.by_ident(ident)
    }

    pub(crate) fn vertices_mut(&mut self) -> &mut VertexCollection {
        &mut self.vertices
    }

    pub(crate) fn edges_mut(&mut self) -> &mut EdgeCollection {
        &mut self.edges
    }

    // ── Additions ────────────────────────────────────────────────

    /// Append a new vertex. A missing `ident` property is generated;
    /// a supplied one must be unused within the vertex collection.
    pub fn add_vertex(
        &mut self,
        label: &str,
        mut properties: Properties,
    ) -> Result<&Vertex, GraphError> {
        match properties.ident().map(str::to_string) {
            Some(ident) if self.vertices.contains_ident(&ident) => {
                return Err(GraphError::DuplicateIdent {
                    kind: EntityKind::Vertex,
                    ident,
                });
            }
            Some(_) => {}
            None => {
                let ident = self.next_ident(EntityKind::Vertex)?;
                properties.set_ident(ident);
            }
        }
        let vertex = Vertex::new(label, properties)?;
        Ok(self.vertices.push(vertex))
    }

    /// Append a new edge between two vertex idents. Endpoints may be forward
    /// references; they are validated at persistence time.
    pub fn add_edge(
        &mut self,
        label: &str,
        start_ident: &str,
        end_ident: &str,
        mut properties: Properties,
    ) -> Result<&Edge, GraphError> {
        properties.set_start_ident(start_ident);
        properties.set_end_ident(end_ident);
        match properties.ident().map(str::to_string) {
            Some(ident) if self.edges.contains_ident(&ident) => {
                return Err(GraphError::DuplicateIdent {
                    kind: EntityKind::Edge,
                    ident,
                });
            }
            Some(_) => {}
            None => {
                let ident = self.next_ident(EntityKind::Edge)?;
                properties.set_ident(ident);
            }
        }
        let edge = Edge::new(label, properties)?;
        Ok(self.edges.push(edge))
    }

    /// Insert an already-constructed vertex (e.g. one materialized from a
    /// store row, carrying its numeric id).
    pub fn insert_vertex(&mut self, vertex: Vertex) -> Result<&Vertex, GraphError> {
        if self.vertices.contains_ident(vertex.ident()) {
            return Err(GraphError::DuplicateIdent {
                kind: EntityKind::Vertex,
                ident: vertex.ident().to_string(),
            });
        }
        Ok(self.vertices.push(vertex))
    }

    /// Insert an already-constructed edge.
    pub fn insert_edge(&mut self, edge: Edge) -> Result<&Edge, GraphError> {
        if self.edges.contains_ident(edge.ident()) {
            return Err(GraphError::DuplicateIdent {
                kind: EntityKind::Edge,
                ident: edge.ident().to_string(),
            });
        }
        Ok(self.edges.push(edge))
    }

    // ── Upserts ──────────────────────────────────────────────────

    /// Non-destructive merge by ident: named keys overwrite, unnamed keys
    /// survive, the label is updated. Creates the vertex when unseen.
    pub fn upsert_vertex(
        &mut self,
        label: &str,
        ident: &str,
        properties: Properties,
    ) -> Result<&Vertex, GraphError> {
        if label.trim().is_empty() {
            return Err(GraphError::EmptyLabel {
                kind: EntityKind::Vertex,
            });
        }
        match self.vertices.position_by_ident(ident) {
            Some(position) => {
                if let Some(vertex) = self.vertices.get_mut(position) {
                    vertex.set_label(label);
                    vertex.properties_mut().merge(&properties);
                    // The lookup key wins over anything in the payload.
                    vertex.properties_mut().set_ident(ident);
                }
                Ok(&self.vertices[position])
            }
            None => {
                let mut properties = properties;
                properties.set_ident(ident);
                self.add_vertex(label, properties)
            }
        }
    }

    /// Non-destructive merge for edges. Matches by ident when given,
    /// falling back to (start_ident, end_ident, label); creates when unseen.
    pub fn upsert_edge(
        &mut self,
        label: &str,
        start_ident: &str,
        end_ident: &str,
        ident: Option<&str>,
        properties: Properties,
    ) -> Result<&Edge, GraphError> {
        if label.trim().is_empty() {
            return Err(GraphError::EmptyLabel {
                kind: EntityKind::Edge,
            });
        }
        let position = ident
            .and_then(|i| self.edges.position_by_ident(i))
            .or_else(|| {
                self.edges.iter().position(|e| {
                    e.start_ident() == start_ident
                        && e.end_ident() == end_ident
                        && e.label() == label
                })
            });

        match position {
            Some(position) => {
                let existing_ident = self.edges[position].ident().to_string();
                if let Some(edge) = self.edges.get_mut(position) {
                    edge.set_label(label);
                    edge.properties_mut().merge(&properties);
                    edge.properties_mut().set_ident(existing_ident);
                    edge.properties_mut().set_start_ident(start_ident);
                    edge.properties_mut().set_end_ident(end_ident);
                }
                Ok(&self.edges[position])
            }
            None => {
                let mut properties = properties;
                if let Some(ident) = ident {
                    properties.set_ident(ident);
                }
                self.add_edge(label, start_ident, end_ident, properties)
            }
        }
    }

    // ── Removals ─────────────────────────────────────────────────

    /// Remove a vertex by ident. Returns whether anything was removed.
    pub fn remove_vertex(&mut self, ident: &str) -> bool {
        self.vertices.remove_by_ident(ident).is_some()
    }

    /// Remove an edge by ident. Returns whether anything was removed.
    pub fn remove_edge(&mut self, ident: &str) -> bool {
        self.edges.remove_by_ident(ident).is_some()
    }

    // ── Validation ───────────────────────────────────────────────

    /// Check every edge endpoint against this graph's vertices, treating
    /// idents accepted by `also_known` (e.g. already-persisted vertices) as
    /// resolvable too. Called at persistence time.
    pub fn validate_edge_endpoints<F>(&self, also_known: F) -> Result<(), GraphError>
    where
        F: Fn(&str) -> bool,
    {
        for edge in self.edges.iter() {
            for endpoint in [edge.start_ident(), edge.end_ident()] {
                if !self.vertices.contains_ident(endpoint) && !also_known(endpoint) {
                    return Err(GraphError::UnknownEndpoint {
                        edge: edge.ident().to_string(),
                        endpoint: endpoint.to_string(),
                    });
                }
            }
        }
        Ok(())
    }

    fn next_ident(&self, kind: EntityKind) -> Result<String, GraphError> {
        let generator = IdentGenerator::new();
        let ident = match kind {
            EntityKind::Vertex => generator.generate(DEFAULT_WORD_COUNT, DEFAULT_DELIMITER, |c| {
                self.vertices.contains_ident(c)
            })?,
            EntityKind::Edge => generator.generate(DEFAULT_WORD_COUNT, DEFAULT_DELIMITER, |c| {
                self.edges.contains_ident(c)
            })?,
        };
        Ok(ident)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn props(value: serde_json::Value) -> Properties {
        Properties::from_value(value).unwrap_or_default()
    }

    #[test]
    fn test_add_vertex_generates_missing_ident() {
        let mut graph = Graph::new("g");
        let ident = {
            let vertex = graph
                .add_vertex("Person", props(json!({"name": "Alice"})))
                .unwrap();
            assert!(!vertex.ident().is_empty());
            vertex.ident().to_string()
        };
        assert!(graph.vertex(&ident).is_some());
    }

    #[test]
    fn test_add_vertex_rejects_duplicate_ident() {
        let mut graph = Graph::new("g");
        graph.add_vertex("Person", props(json!({"ident": "a"}))).unwrap();
        let err = graph
            .add_vertex("Person", props(json!({"ident": "a"})))
            .unwrap_err();
        assert!(matches!(err, GraphError::DuplicateIdent { .. }));
    }

    #[test]
    fn test_add_edge_allows_forward_references() {
        let mut graph = Graph::new("g");
        // No vertices yet: endpoint validation happens at persistence time.
        let edge = graph
            .add_edge("KNOWS", "a", "b", Properties::new())
            .unwrap();
        assert_eq!(edge.start_ident(), "a");
        assert_eq!(edge.end_ident(), "b");

        assert!(graph.validate_edge_endpoints(|_| false).is_err());
        graph.add_vertex("Person", props(json!({"ident": "a"}))).unwrap();
        graph.add_vertex("Person", props(json!({"ident": "b"}))).unwrap();
        assert!(graph.validate_edge_endpoints(|_| false).is_ok());
    }

    #[test]
    fn test_upsert_vertex_merges_instead_of_replacing() {
        let mut graph = Graph::new("g");
        graph
            .add_vertex("Person", props(json!({"ident": "a", "name": "Alice"})))
            .unwrap();

        let merged = graph
            .upsert_vertex("Person", "a", props(json!({"age": 31})))
            .unwrap();

        assert_eq!(merged.properties().get("name"), Some(&json!("Alice")));
        assert_eq!(merged.properties().get("age"), Some(&json!(31)));
        assert_eq!(graph.vertices().len(), 1);
    }

    #[test]
    fn test_upsert_edge_matches_by_endpoints_and_label() {
        let mut graph = Graph::new("g");
        graph
            .add_edge("KNOWS", "a", "b", props(json!({"ident": "k1", "since": 2019})))
            .unwrap();

        // No ident given: found via (start, end, label); ident preserved.
        let merged = graph
            .upsert_edge("KNOWS", "a", "b", None, props(json!({"weight": 2})))
            .unwrap();
        assert_eq!(merged.ident(), "k1");
        assert_eq!(merged.properties().get("since"), Some(&json!(2019)));
        assert_eq!(merged.properties().get("weight"), Some(&json!(2)));
        assert_eq!(graph.edges().len(), 1);
    }

    #[test]
    fn test_remove_is_noop_when_absent() {
        let mut graph = Graph::new("g");
        assert!(!graph.remove_vertex("missing"));
        graph.add_vertex("Person", props(json!({"ident": "a"}))).unwrap();
        assert!(graph.remove_vertex("a"));
        assert!(graph.vertices().is_empty());
    }
}
