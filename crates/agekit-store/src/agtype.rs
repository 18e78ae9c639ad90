//! Codec for AGE's tagged textual graph values.
//!
//! AGE returns graph values as JSON payloads tagged with a trailing type
//! annotation:
//!
//! ```text
//! {"id": 844424930131969, "label": "Person", "properties": {...}}::vertex
//! {"id": ..., "label": "KNOWS", "start_id": ..., "end_id": ..., "properties": {...}}::edge
//! [{...}::vertex, {...}::edge, {...}::vertex]::path
//! ```
//!
//! `decode(encode(x))` is semantically idempotent: equal id, label, and
//! property set, with JSON key order insignificant.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use agekit_graph::{Edge, Graph, Properties, Vertex};

use crate::error::{Result, StoreError};

/// The wire shape shared by vertex and edge values. `start_id`/`end_id`
/// are present on edges only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgtypeRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub label: String,
    #[serde(default)]
    pub properties: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_id: Option<i64>,
}

impl AgtypeRecord {
    pub fn is_edge(&self) -> bool {
        self.start_id.is_some() && self.end_id.is_some()
    }

    pub fn from_vertex(vertex: &Vertex) -> Self {
        Self {
            id: vertex.id(),
            label: vertex.label().to_string(),
            properties: vertex.properties().as_map().clone(),
            start_id: None,
            end_id: None,
        }
    }

    pub fn from_edge(edge: &Edge) -> Self {
        Self {
            id: edge.id(),
            label: edge.label().to_string(),
            properties: edge.properties().as_map().clone(),
            start_id: edge.start_id(),
            end_id: edge.end_id(),
        }
    }

    /// Materialize as a typed vertex.
    pub fn into_vertex(self) -> Result<Vertex> {
        let context = self.render();
        Vertex::new(self.label, Properties::from(self.properties))
            .map(|v| v.with_id(self.id))
            .map_err(|e| malformed(e.to_string(), &context))
    }

    /// Materialize as a typed edge.
    pub fn into_edge(self) -> Result<Edge> {
        let context = self.render();
        Edge::new(self.label, Properties::from(self.properties))
            .map(|e| e.with_ids(self.id, self.start_id, self.end_id))
            .map_err(|e| malformed(e.to_string(), &context))
    }

    fn render(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}

/// A decoded agtype value.
#[derive(Debug, Clone, PartialEq)]
pub enum AgValue {
    Vertex(AgtypeRecord),
    Edge(AgtypeRecord),
    /// An alternating vertex/edge sequence, in traversal order.
    Path(Vec<AgValue>),
    /// Untagged agtype output (numbers, strings, maps) from pass-through
    /// Cypher, returned verbatim.
    Scalar(Value),
}

fn malformed(reason: impl Into<String>, record: &str) -> StoreError {
    StoreError::MalformedRecord {
        reason: reason.into(),
        record: record.to_string(),
    }
}

/// Decode one agtype text value.
///
/// Fails with `MalformedRecord` when the payload of a tagged value is not a
/// JSON object, when required identity keys are missing after parsing, or
/// when the tag is unknown.
pub fn decode(text: &str) -> Result<AgValue> {
    let trimmed = text.trim();

    if let Some(payload) = trimmed.strip_suffix("::vertex") {
        let record = parse_record(payload, trimmed)?;
        require_identity_keys(&record, false, trimmed)?;
        return Ok(AgValue::Vertex(record));
    }
    if let Some(payload) = trimmed.strip_suffix("::edge") {
        let record = parse_record(payload, trimmed)?;
        require_identity_keys(&record, true, trimmed)?;
        return Ok(AgValue::Edge(record));
    }
    if let Some(payload) = trimmed.strip_suffix("::path") {
        // Inner elements carry their own annotations; strip them and let
        // the presence of start_id/end_id classify each record.
        let stripped = payload.replace("::vertex", "").replace("::edge", "");
        let records: Vec<AgtypeRecord> = serde_json::from_str(&stripped)
            .map_err(|e| malformed(format!("path payload is not a record array: {e}"), trimmed))?;
        let mut elements = Vec::with_capacity(records.len());
        for record in records {
            let is_edge = record.is_edge();
            require_identity_keys(&record, is_edge, trimmed)?;
            elements.push(if is_edge {
                AgValue::Edge(record)
            } else {
                AgValue::Vertex(record)
            });
        }
        return Ok(AgValue::Path(elements));
    }
    if let Some(payload) = trimmed.strip_suffix("::numeric") {
        let value = serde_json::from_str(payload)
            .map_err(|e| malformed(format!("invalid numeric payload: {e}"), trimmed))?;
        return Ok(AgValue::Scalar(value));
    }

    // Any other trailing ::tag is unknown.
    if let Some(position) = trimmed.rfind("::") {
        let tag = &trimmed[position + 2..];
        if !tag.is_empty() && tag.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(malformed(format!("unknown agtype tag {tag:?}"), trimmed));
        }
    }

    // Untagged scalar: plain JSON, or the raw text when not even that.
    Ok(match serde_json::from_str(trimmed) {
        Ok(value) => AgValue::Scalar(value),
        Err(_) => AgValue::Scalar(Value::String(trimmed.to_string())),
    })
}

/// Encode back to the tagged textual form. The id is omitted when absent.
pub fn encode(value: &AgValue) -> String {
    match value {
        AgValue::Vertex(record) => format!("{}::vertex", record.render()),
        AgValue::Edge(record) => format!("{}::edge", record.render()),
        AgValue::Path(elements) => {
            let inner: Vec<String> = elements.iter().map(encode).collect();
            format!("[{}]::path", inner.join(", "))
        }
        AgValue::Scalar(scalar) => scalar.to_string(),
    }
}

fn parse_record(payload: &str, context: &str) -> Result<AgtypeRecord> {
    serde_json::from_str(payload)
        .map_err(|e| malformed(format!("payload is not a graph record object: {e}"), context))
}

fn require_identity_keys(record: &AgtypeRecord, is_edge: bool, context: &str) -> Result<()> {
    let mut required = vec![agekit_graph::IDENT_KEY];
    if is_edge {
        required.push(agekit_graph::START_IDENT_KEY);
        required.push(agekit_graph::END_IDENT_KEY);
    }
    for key in required {
        let present = record
            .properties
            .get(key)
            .and_then(Value::as_str)
            .is_some_and(|s| !s.trim().is_empty());
        if !present {
            return Err(malformed(format!("missing identity key {key:?}"), context));
        }
    }
    Ok(())
}

/// Build a fresh graph snapshot from decoded fetch results. Vertices are
/// inserted before edges regardless of row order; path values contribute
/// their elements; scalars are ignored.
pub fn graph_from_values(name: &str, values: Vec<AgValue>) -> Result<Graph> {
    let mut vertices = Vec::new();
    let mut edges = Vec::new();
    collect_records(values, &mut vertices, &mut edges);

    let mut graph = Graph::new(name);
    for record in vertices {
        graph.insert_vertex(record.into_vertex()?)?;
    }
    for record in edges {
        graph.insert_edge(record.into_edge()?)?;
    }
    Ok(graph)
}

fn collect_records(
    values: Vec<AgValue>,
    vertices: &mut Vec<AgtypeRecord>,
    edges: &mut Vec<AgtypeRecord>,
) {
    for value in values {
        match value {
            AgValue::Vertex(record) => vertices.push(record),
            AgValue::Edge(record) => edges.push(record),
            AgValue::Path(elements) => collect_records(elements, vertices, edges),
            AgValue::Scalar(_) => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    const VERTEX_TEXT: &str = r#"{"id": 844424930131969, "label": "Person", "properties": {"ident": "a", "name": "Alice"}}::vertex"#;
    const EDGE_TEXT: &str = r#"{"id": 1125899906842625, "label": "KNOWS", "end_id": 844424930131970, "start_id": 844424930131969, "properties": {"ident": "ab", "start_ident": "a", "end_ident": "b"}}::edge"#;

    #[test]
    fn test_decode_vertex() {
        let value = decode(VERTEX_TEXT).unwrap();
        match value {
            AgValue::Vertex(record) => {
                assert_eq!(record.id, Some(844424930131969));
                assert_eq!(record.label, "Person");
                assert_eq!(record.properties.get("name"), Some(&json!("Alice")));
                assert!(!record.is_edge());
            }
            other => panic!("expected vertex, got {other:?}"),
        }
    }

    #[test]
    fn test_decode_edge() {
        let value = decode(EDGE_TEXT).unwrap();
        match value {
            AgValue::Edge(record) => {
                assert_eq!(record.start_id, Some(844424930131969));
                assert_eq!(record.end_id, Some(844424930131970));
                assert_eq!(record.properties.get("start_ident"), Some(&json!("a")));
            }
            other => panic!("expected edge, got {other:?}"),
        }
    }

    #[test]
    fn test_decode_path_preserves_order() {
        let vertex_b = r#"{"id": 844424930131970, "label": "Person", "properties": {"ident": "b"}}::vertex"#;
        let path = format!("[{VERTEX_TEXT}, {EDGE_TEXT}, {vertex_b}]::path");

        let value = decode(&path).unwrap();
        match value {
            AgValue::Path(elements) => {
                assert_eq!(elements.len(), 3);
                assert!(matches!(elements[0], AgValue::Vertex(_)));
                assert!(matches!(elements[1], AgValue::Edge(_)));
                assert!(matches!(elements[2], AgValue::Vertex(_)));
            }
            other => panic!("expected path, got {other:?}"),
        }
    }

    #[test]
    fn test_decode_rejects_non_object_properties() {
        let bad = r#"{"id": 1, "label": "Person", "properties": [1, 2]}::vertex"#;
        assert!(matches!(
            decode(bad),
            Err(StoreError::MalformedRecord { .. })
        ));
    }

    #[test]
    fn test_decode_rejects_missing_identity_keys() {
        let no_ident = r#"{"id": 1, "label": "Person", "properties": {"name": "Alice"}}::vertex"#;
        let err = decode(no_ident).unwrap_err();
        match err {
            StoreError::MalformedRecord { reason, record } => {
                assert!(reason.contains("ident"));
                assert!(record.contains("Alice"));
            }
            other => panic!("expected MalformedRecord, got {other:?}"),
        }

        let no_endpoints =
            r#"{"id": 1, "label": "KNOWS", "start_id": 2, "end_id": 3, "properties": {"ident": "ab"}}::edge"#;
        assert!(decode(no_endpoints).is_err());
    }

    #[test]
    fn test_decode_rejects_unknown_tag() {
        assert!(decode(r#"{"label": "x", "properties": {}}::widget"#).is_err());
    }

    #[test]
    fn test_decode_scalars() {
        assert_eq!(decode("42").unwrap(), AgValue::Scalar(json!(42)));
        assert_eq!(decode("3.25::numeric").unwrap(), AgValue::Scalar(json!(3.25)));
        assert_eq!(decode(r#""hello""#).unwrap(), AgValue::Scalar(json!("hello")));
    }

    #[test]
    fn test_decode_encode_roundtrip() {
        for text in [VERTEX_TEXT, EDGE_TEXT] {
            let decoded = decode(text).unwrap();
            let redecoded = decode(&encode(&decoded)).unwrap();
            assert_eq!(decoded, redecoded);
        }
    }

    #[test]
    fn test_encode_omits_absent_id() {
        let record = AgtypeRecord {
            id: None,
            label: "Person".to_string(),
            properties: json!({"ident": "a"}).as_object().cloned().unwrap_or_default(),
            start_id: None,
            end_id: None,
        };
        let encoded = encode(&AgValue::Vertex(record));
        assert!(!encoded.contains("\"id\""));
        assert!(encoded.ends_with("::vertex"));
    }

    #[test]
    fn test_typed_roundtrip_through_records() {
        let mut graph = Graph::new("g");
        graph
            .add_vertex(
                "Person",
                Properties::from_value(json!({"ident": "a", "age": 30})).unwrap(),
            )
            .unwrap();
        let vertex = graph.vertex("a").unwrap();

        let record = AgtypeRecord::from_vertex(vertex);
        let rebuilt = record.into_vertex().unwrap();
        assert_eq!(rebuilt.ident(), "a");
        assert_eq!(rebuilt.label(), "Person");
        assert_eq!(rebuilt.properties(), vertex.properties());
    }

    #[test]
    fn test_graph_from_values_inserts_vertices_before_edges() {
        // Edge row arrives first; materialization still succeeds.
        let values = vec![
            decode(EDGE_TEXT).unwrap(),
            decode(VERTEX_TEXT).unwrap(),
            decode(r#"{"id": 844424930131970, "label": "Person", "properties": {"ident": "b"}}::vertex"#)
                .unwrap(),
        ];
        let graph = graph_from_values("g", values).unwrap();
        assert_eq!(graph.vertices().len(), 2);
        assert_eq!(graph.edges().len(), 1);
        assert_eq!(graph.edge("ab").unwrap().id(), Some(1125899906842625));
    }
}
