//! Error types for the agekit-graph crate.

use thiserror::Error;

use crate::entity::EntityKind;

#[derive(Error, Debug)]
pub enum GraphError {
    #[error("{kind} with label {label:?} is missing required property {key:?}")]
    MissingRequiredProperty {
        kind: EntityKind,
        label: String,
        key: &'static str,
    },

    #[error("{kind} label must be a non-empty string")]
    EmptyLabel { kind: EntityKind },

    #[error("duplicate {kind} ident {ident:?}")]
    DuplicateIdent { kind: EntityKind, ident: String },

    #[error("edge {edge:?} references unknown vertex {endpoint:?}")]
    UnknownEndpoint { edge: String, endpoint: String },

    #[error(transparent)]
    Ident(#[from] agekit_core::CoreError),
}
