//! # Contracts
//!
//! Frozen interface contracts shared by every measurement crate.
//! Business crates depend only on this crate, reverse dependencies are prohibited.
//!
//! ## Table Model
//! - A [`Schema`] is built first; plugins and correctors add their fields and cache [`Key`]s
//! - [`SourceCatalog::new`] then takes ownership of the schema, freezing it
//! - Records are mutated in place through cached keys, never by name

mod blueprint;
mod bounded_field;
mod catalog;
mod document;
mod error;
mod plugin;
mod record;
mod schema;

pub use blueprint::*;
pub use bounded_field::*;
pub use catalog::SourceCatalog;
pub use document::*;
pub use error::*;
pub use plugin::*;
pub use record::{Point2D, SourceRecord};
pub use schema::{AliasMap, FieldDef, FieldKind, FieldType, Key, Schema};
