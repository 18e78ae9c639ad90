//! agekit-graph: typed labeled-property graph model.
//!
//! The in-memory half of the agekit toolkit:
//! - `Graph`, `Vertex`, `Edge` with open property maps and derived idents
//! - Ordered collections with a chainable, LRU-cached query builder
//! - A diff/patch engine computing minimal mutation sets between snapshots
//!
//! Persistence lives in `agekit-store`; this crate never talks to a database.

pub mod collection;
pub mod edge;
pub mod entity;
pub mod error;
pub mod graph;
pub mod mutation;
pub mod patch;
pub mod properties;
pub mod query;
pub mod vertex;

pub use collection::{Collection, EdgeCollection, VertexCollection};
pub use edge::Edge;
pub use entity::{Entity, EntityKind};
pub use error::GraphError;
pub use graph::Graph;
pub use mutation::Mutation;
pub use patch::Patch;
pub use properties::{Properties, END_IDENT_KEY, IDENT_KEY, START_IDENT_KEY};
pub use query::Query;
pub use vertex::Vertex;
