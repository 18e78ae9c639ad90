//! agekit-core: shared foundation for the agekit graph toolkit.
//!
//! This crate provides the pieces every other agekit component leans on:
//! - Human-legible identifier generation for graph entities
//! - Connection-string (DSN) and query-string codecs
//! - Store configuration loading
//! - Common error types

pub mod config;
pub mod dsn;
pub mod error;
pub mod ident;
pub mod query_string;

pub use config::StoreConfig;
pub use dsn::DataSourceName;
pub use error::CoreError;
pub use ident::IdentGenerator;
