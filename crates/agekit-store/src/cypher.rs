//! Rendering mutations as AGE Cypher statements.
//!
//! AGE's `cypher()` function takes the query as a dollar-quoted literal, so
//! values are rendered inline as Cypher literals with explicit escaping
//! rather than bound as parameters. Property updates match on `ident` alone
//! (no label) so an entity whose label drifted from the persisted one is
//! still updated.

use serde_json::Value;

use agekit_graph::{EntityKind, Mutation, Properties};

/// Wrap one Cypher statement in the AGE SQL shell, casting the agtype
/// column to text so rows come back as plain strings.
pub fn wrap(graph_name: &str, statement: &str) -> String {
    format!(
        "SELECT v::text AS v FROM cypher({}, $$ {} $$) AS (v agtype);",
        sql_string_literal(graph_name),
        statement
    )
}

/// A single-quoted SQL string literal.
pub fn sql_string_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

/// A single-quoted Cypher string literal. Backslash first, then quotes.
pub(crate) fn quote_string(value: &str) -> String {
    let escaped = value
        .replace('\\', "\\\\")
        .replace('\'', "\\'")
        .replace('"', "\\\"");
    format!("'{escaped}'")
}

fn value_literal(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => quote_string(s),
        Value::Array(items) => {
            let inner: Vec<String> = items.iter().map(value_literal).collect();
            format!("[{}]", inner.join(", "))
        }
        Value::Object(map) => {
            let inner: Vec<String> = map
                .iter()
                .map(|(k, v)| format!("{k}: {}", value_literal(v)))
                .collect();
            format!("{{{}}}", inner.join(", "))
        }
    }
}

/// A `{key: value, ...}` map literal.
fn properties_literal(properties: &Properties) -> String {
    let inner: Vec<String> = properties
        .iter()
        .map(|(k, v)| format!("{k}: {}", value_literal(v)))
        .collect();
    format!("{{{}}}", inner.join(", "))
}

/// A `alias.key = value, ...` assignment list. Edge property propagation
/// needs the assignment form rather than a map literal.
fn set_assignments(alias: &str, set: &Properties) -> String {
    set.iter()
        .map(|(k, v)| format!("{alias}.{k} = {}", value_literal(v)))
        .collect::<Vec<_>>()
        .join(", ")
}

fn remove_list(alias: &str, unset: &[String]) -> String {
    unset
        .iter()
        .map(|k| format!("{alias}.{k}"))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Render the Cypher statements that effectuate one mutation.
pub fn statements(mutation: &Mutation) -> Vec<String> {
    match mutation {
        Mutation::AddVertex {
            label, properties, ..
        } => {
            vec![format!(
                "CREATE (n:{label} {})",
                properties_literal(properties)
            )]
        }
        Mutation::AddEdge {
            label,
            start_ident,
            end_ident,
            start_label,
            end_label,
            properties,
            ..
        } => {
            let start = endpoint_pattern("a", start_label.as_deref(), start_ident);
            let end = endpoint_pattern("b", end_label.as_deref(), end_ident);
            vec![format!(
                "MATCH {start} MATCH {end} MERGE (a)-[e:{label} {}]->(b)",
                properties_literal(properties)
            )]
        }
        Mutation::RemoveVertex { ident, label, .. } => {
            vec![format!(
                "MATCH (n:{label} {{ident: {}}}) DETACH DELETE n",
                quote_string(ident)
            )]
        }
        Mutation::RemoveEdge {
            ident,
            label,
            start_ident,
            end_ident,
            ..
        } => {
            vec![format!(
                "MATCH ()-[e:{label} {{ident: {}, start_ident: {}, end_ident: {}}}]->() DELETE e",
                quote_string(ident),
                quote_string(start_ident),
                quote_string(end_ident)
            )]
        }
        Mutation::UpdateProperties {
            kind,
            ident,
            set,
            unset,
            ..
        } => {
            let (matcher, alias) = match kind {
                EntityKind::Vertex => (format!("(n {{ident: {}}})", quote_string(ident)), "n"),
                EntityKind::Edge => (
                    format!("()-[e {{ident: {}}}]->()", quote_string(ident)),
                    "e",
                ),
            };
            let mut statement = format!("MATCH {matcher}");
            if !set.is_empty() {
                statement.push_str(&format!(" SET {}", set_assignments(alias, set)));
            }
            if !unset.is_empty() {
                statement.push_str(&format!(" REMOVE {}", remove_list(alias, unset)));
            }
            vec![statement]
        }
    }
}

fn endpoint_pattern(alias: &str, label: Option<&str>, ident: &str) -> String {
    match label {
        Some(label) => format!("({alias}:{label} {{ident: {}}})", quote_string(ident)),
        None => format!("({alias} {{ident: {}}})", quote_string(ident)),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use agekit_graph::Graph;

    use super::*;

    fn props(value: serde_json::Value) -> Properties {
        Properties::from_value(value).unwrap_or_default()
    }

    #[test]
    fn test_wrap_quotes_graph_name() {
        let sql = wrap("my_graph", "MATCH (n) RETURN n");
        assert_eq!(
            sql,
            "SELECT v::text AS v FROM cypher('my_graph', $$ MATCH (n) RETURN n $$) AS (v agtype);"
        );
        assert!(wrap("it's", "RETURN 1").contains("'it''s'"));
    }

    #[test]
    fn test_add_vertex_statement() {
        let mutation = Mutation::AddVertex {
            ident: "a".to_string(),
            label: "Person".to_string(),
            properties: props(json!({"ident": "a", "name": "O'Brien", "age": 42})),
            id: None,
        };
        let rendered = statements(&mutation);
        assert_eq!(rendered.len(), 1);
        assert_eq!(
            rendered[0],
            "CREATE (n:Person {age: 42, ident: 'a', name: 'O\\'Brien'})"
        );
    }

    #[test]
    fn test_add_edge_statement_uses_endpoint_labels() {
        let mutation = Mutation::AddEdge {
            ident: "ab".to_string(),
            label: "KNOWS".to_string(),
            start_ident: "a".to_string(),
            end_ident: "b".to_string(),
            start_label: Some("Person".to_string()),
            end_label: None,
            properties: props(json!({"ident": "ab", "start_ident": "a", "end_ident": "b"})),
            id: None,
        };
        let rendered = statements(&mutation);
        assert!(rendered[0].starts_with("MATCH (a:Person {ident: 'a'}) MATCH (b {ident: 'b'})"));
        assert!(rendered[0].contains("MERGE (a)-[e:KNOWS {"));
    }

    #[test]
    fn test_update_properties_sets_and_removes() {
        let mutation = Mutation::UpdateProperties {
            kind: EntityKind::Vertex,
            ident: "a".to_string(),
            label: "Person".to_string(),
            set: props(json!({"age": 31})),
            unset: vec!["city".to_string()],
        };
        assert_eq!(
            statements(&mutation),
            vec!["MATCH (n {ident: 'a'}) SET n.age = 31 REMOVE n.city".to_string()]
        );
    }

    #[test]
    fn test_remove_statements() {
        let vertex = Mutation::RemoveVertex {
            ident: "b".to_string(),
            label: "Person".to_string(),
            id: None,
        };
        assert_eq!(
            statements(&vertex),
            vec!["MATCH (n:Person {ident: 'b'}) DETACH DELETE n".to_string()]
        );

        let edge = Mutation::RemoveEdge {
            ident: "ab".to_string(),
            label: "KNOWS".to_string(),
            start_ident: "a".to_string(),
            end_ident: "b".to_string(),
            id: None,
        };
        assert_eq!(
            statements(&edge),
            vec![
                "MATCH ()-[e:KNOWS {ident: 'ab', start_ident: 'a', end_ident: 'b'}]->() DELETE e"
                    .to_string()
            ]
        );
    }

    #[test]
    fn test_nested_value_literals() {
        let mutation = Mutation::AddVertex {
            ident: "a".to_string(),
            label: "Doc".to_string(),
            properties: props(json!({
                "ident": "a",
                "tags": ["x", "y"],
                "meta": {"depth": 2, "draft": false},
                "note": null,
            })),
            id: None,
        };
        let rendered = &statements(&mutation)[0];
        assert!(rendered.contains("tags: ['x', 'y']"));
        assert!(rendered.contains("meta: {depth: 2, draft: false}"));
        assert!(rendered.contains("note: null"));
    }

    #[test]
    fn test_full_patch_renders_in_order() {
        let mut source = Graph::new("g");
        source
            .add_vertex("Person", props(json!({"ident": "a"})))
            .unwrap();
        source
            .add_vertex("Person", props(json!({"ident": "b"})))
            .unwrap();
        source
            .add_edge("KNOWS", "a", "b", props(json!({"ident": "ab"})))
            .unwrap();

        let mut target = source.clone();
        target.remove_edge("ab");
        target.remove_vertex("b");

        let patch = agekit_graph::Patch::between(&source, &target);
        let rendered: Vec<String> = patch.mutations().iter().flat_map(statements).collect();
        assert_eq!(rendered.len(), 2);
        assert!(rendered[0].contains("DELETE e"));
        assert!(rendered[1].contains("DETACH DELETE n"));
    }
}
