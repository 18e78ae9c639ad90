//! Diff and patch: the minimal mutation set between two graph snapshots.
//!
//! Entities are matched by ident, never by store id. Labels are identity,
//! not data: two entities sharing an ident but not a label still diff on
//! properties alone.
//!
//! Mutations are emitted in the order they must run:
//! 1. Edge removals (an edge referencing a vertex goes before that vertex)
//! 2. Vertex removals
//! 3. Vertex additions (edges added later may reference them)
//! 4. Vertex property updates
//! 5. Edge additions
//! 6. Edge property updates

use serde::Serialize;

use crate::edge::Edge;
use crate::entity::EntityKind;
use crate::error::GraphError;
use crate::graph::Graph;
use crate::mutation::Mutation;
use crate::properties::Properties;
use crate::vertex::Vertex;

/// An ordered sequence of mutations transforming one snapshot into another.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Patch {
    mutations: Vec<Mutation>,
}

impl Patch {
    /// Compute the patch turning `source` into `target`.
    pub fn between(source: &Graph, target: &Graph) -> Self {
        let mut mutations = Vec::new();

        // 1. Edge removals: in source, not in target.
        for edge in source.edges().iter() {
            if target.edge(edge.ident()).is_none() {
                mutations.push(Mutation::RemoveEdge {
                    ident: edge.ident().to_string(),
                    label: edge.label().to_string(),
                    start_ident: edge.start_ident().to_string(),
                    end_ident: edge.end_ident().to_string(),
                    id: edge.id(),
                });
            }
        }

        // 2. Vertex removals.
        for vertex in source.vertices().iter() {
            if target.vertex(vertex.ident()).is_none() {
                mutations.push(Mutation::RemoveVertex {
                    ident: vertex.ident().to_string(),
                    label: vertex.label().to_string(),
                    id: vertex.id(),
                });
            }
        }

        // 3. Vertex additions: in target, not in source.
        for vertex in target.vertices().iter() {
            if source.vertex(vertex.ident()).is_none() {
                mutations.push(Mutation::AddVertex {
                    ident: vertex.ident().to_string(),
                    label: vertex.label().to_string(),
                    properties: vertex.properties().clone(),
                    id: vertex.id(),
                });
            }
        }

        // 4. Vertex updates: in both, properties differ.
        for vertex in target.vertices().iter() {
            if let Some(existing) = source.vertex(vertex.ident()) {
                let (set, unset) = property_delta(existing.properties(), vertex.properties());
                if !set.is_empty() || !unset.is_empty() {
                    mutations.push(Mutation::UpdateProperties {
                        kind: EntityKind::Vertex,
                        ident: vertex.ident().to_string(),
                        label: vertex.label().to_string(),
                        set,
                        unset,
                    });
                }
            }
        }

        // 5. Edge additions, endpoint labels resolved from the target.
        for edge in target.edges().iter() {
            if source.edge(edge.ident()).is_none() {
                mutations.push(Mutation::AddEdge {
                    ident: edge.ident().to_string(),
                    label: edge.label().to_string(),
                    start_ident: edge.start_ident().to_string(),
                    end_ident: edge.end_ident().to_string(),
                    start_label: target
                        .vertex(edge.start_ident())
                        .map(|v| v.label().to_string()),
                    end_label: target
                        .vertex(edge.end_ident())
                        .map(|v| v.label().to_string()),
                    properties: edge.properties().clone(),
                    id: edge.id(),
                });
            }
        }

        // 6. Edge updates.
        for edge in target.edges().iter() {
            if let Some(existing) = source.edge(edge.ident()) {
                let (set, unset) = property_delta(existing.properties(), edge.properties());
                if !set.is_empty() || !unset.is_empty() {
                    mutations.push(Mutation::UpdateProperties {
                        kind: EntityKind::Edge,
                        ident: edge.ident().to_string(),
                        label: edge.label().to_string(),
                        set,
                        unset,
                    });
                }
            }
        }

        tracing::debug!(
            source = source.name(),
            target = target.name(),
            mutations = mutations.len(),
            "computed graph patch"
        );
        Self { mutations }
    }

    pub fn mutations(&self) -> &[Mutation] {
        &self.mutations
    }

    pub fn len(&self) -> usize {
        self.mutations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mutations.is_empty()
    }

    /// Apply every mutation to `graph`, in order, idempotently: a mutation
    /// whose effect is already present is a no-op, so re-applying a patch to
    /// its own output changes nothing.
    pub fn apply(&self, graph: &mut Graph) -> Result<(), GraphError> {
        for mutation in &self.mutations {
            match mutation {
                Mutation::AddVertex {
                    ident,
                    label,
                    properties,
                    ..
                } => {
                    match graph.vertex(ident) {
                        Some(v) if v.label() == label && v.properties() == properties => {}
                        Some(_) => {
                            if let Some(position) = graph.vertices().position_by_ident(ident) {
                                if let Some(v) = graph.vertices_mut().get_mut(position) {
                                    v.set_label(label);
                                    *v.properties_mut() = properties.clone();
                                }
                            }
                        }
                        None => {
                            graph.insert_vertex(Vertex::new(label.clone(), properties.clone())?)?;
                        }
                    }
                }
                Mutation::AddEdge {
                    ident,
                    label,
                    properties,
                    ..
                } => {
                    match graph.edge(ident) {
                        Some(e) if e.label() == label && e.properties() == properties => {}
                        Some(_) => {
                            if let Some(position) = graph.edges().position_by_ident(ident) {
                                if let Some(e) = graph.edges_mut().get_mut(position) {
                                    e.set_label(label);
                                    *e.properties_mut() = properties.clone();
                                }
                            }
                        }
                        None => {
                            graph.insert_edge(Edge::new(label.clone(), properties.clone())?)?;
                        }
                    }
                }
                Mutation::RemoveVertex { ident, .. } => {
                    graph.remove_vertex(ident);
                }
                Mutation::RemoveEdge { ident, .. } => {
                    graph.remove_edge(ident);
                }
                Mutation::UpdateProperties {
                    kind,
                    ident,
                    set,
                    unset,
                    ..
                } => match kind {
                    EntityKind::Vertex => {
                        if let Some(position) = graph.vertices().position_by_ident(ident) {
                            if let Some(v) = graph.vertices_mut().get_mut(position) {
                                apply_delta(v.properties_mut(), set, unset);
                            }
                        }
                    }
                    EntityKind::Edge => {
                        if let Some(position) = graph.edges().position_by_ident(ident) {
                            if let Some(e) = graph.edges_mut().get_mut(position) {
                                apply_delta(e.properties_mut(), set, unset);
                            }
                        }
                    }
                },
            }
        }
        Ok(())
    }
}

/// Key-level diff of two property maps: keys to (over)write and keys to
/// delete. Keys equal in both maps appear in neither.
fn property_delta(from: &Properties, to: &Properties) -> (Properties, Vec<String>) {
    let mut set = Properties::new();
    for (key, value) in to.iter() {
        if from.get(key) != Some(value) {
            set.insert(key.clone(), value.clone());
        }
    }
    let unset: Vec<String> = from
        .keys()
        .filter(|key| !to.contains_key(key))
        .cloned()
        .collect();
    (set, unset)
}

fn apply_delta(properties: &mut Properties, set: &Properties, unset: &[String]) {
    for (key, value) in set.iter() {
        properties.insert(key.clone(), value.clone());
    }
    for key in unset {
        properties.remove(key);
    }
}
