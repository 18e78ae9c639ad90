//! agekit-store: the Apache AGE boundary.
//!
//! This crate is the single mutation point for the persisted graph. All
//! reads and writes flow through `AgeRepository` so that snapshot
//! semantics, per-graph serialization, and transactional patching hold
//! everywhere. The wire side is the agtype codec: AGE's tagged textual
//! graph values decoded into typed entities and back.

pub mod agtype;
pub mod cypher;
pub mod error;
pub mod repository;

pub use agtype::{AgValue, AgtypeRecord};
pub use error::{Result, StoreError};
pub use repository::AgeRepository;
