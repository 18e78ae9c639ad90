//! Shared capability of vertices and edges.

use std::fmt;

use serde::Serialize;

use crate::properties::Properties;

/// Which half of the graph an entity or mutation targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Vertex,
    Edge,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityKind::Vertex => write!(f, "vertex"),
            EntityKind::Edge => write!(f, "edge"),
        }
    }
}

/// Common surface of `Vertex` and `Edge`.
///
/// `id` is the store-assigned numeric id, absent until the entity has been
/// persisted. `ident` is the human-legible business key, derived from the
/// property map at read time.
pub trait Entity {
    fn id(&self) -> Option<i64>;
    fn label(&self) -> &str;
    fn properties(&self) -> &Properties;

    /// The business key. Present by construction; an empty string is only
    /// possible if the key was stripped out from under the entity.
    fn ident(&self) -> &str {
        self.properties().ident().unwrap_or_default()
    }
}
