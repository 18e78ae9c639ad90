//! Atomic graph mutations.
//!
//! A `Mutation` is one step of a `Patch` (see `patch.rs`). Property updates
//! carry only the changed and removed keys, never a full replacement, so a
//! patch touches the minimum surface when persisted.

use serde::Serialize;

use crate::entity::EntityKind;
use crate::properties::Properties;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Mutation {
    AddVertex {
        ident: String,
        label: String,
        properties: Properties,
        id: Option<i64>,
    },
    AddEdge {
        ident: String,
        label: String,
        start_ident: String,
        end_ident: String,
        /// Labels of the endpoint vertices, when the target graph knows
        /// them. Persistence uses these to narrow the endpoint match.
        start_label: Option<String>,
        end_label: Option<String>,
        properties: Properties,
        id: Option<i64>,
    },
    RemoveVertex {
        ident: String,
        label: String,
        id: Option<i64>,
    },
    RemoveEdge {
        ident: String,
        label: String,
        start_ident: String,
        end_ident: String,
        id: Option<i64>,
    },
    UpdateProperties {
        kind: EntityKind,
        ident: String,
        label: String,
        /// Keys to write with their new values.
        set: Properties,
        /// Keys to delete.
        unset: Vec<String>,
    },
}

impl Mutation {
    pub fn kind(&self) -> EntityKind {
        match self {
            Mutation::AddVertex { .. } | Mutation::RemoveVertex { .. } => EntityKind::Vertex,
            Mutation::AddEdge { .. } | Mutation::RemoveEdge { .. } => EntityKind::Edge,
            Mutation::UpdateProperties { kind, .. } => *kind,
        }
    }

    pub fn ident(&self) -> &str {
        match self {
            Mutation::AddVertex { ident, .. }
            | Mutation::AddEdge { ident, .. }
            | Mutation::RemoveVertex { ident, .. }
            | Mutation::RemoveEdge { ident, .. }
            | Mutation::UpdateProperties { ident, .. } => ident,
        }
    }
}
