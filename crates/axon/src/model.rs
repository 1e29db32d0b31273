//! The element type model.
//!
//! - [`kind`]: discriminants and type tags
//! - [`schema`]: per-layer attribute tables and option sets
//! - [`element`] and [`relationship`]: the node and edge types
//! - [`record`] and [`migrate`]: persistence and legacy upgrades
//! - [`catalog`]: tag to constructor mapping

pub mod catalog;
pub mod element;
pub mod kind;
pub mod migrate;
pub mod record;
pub mod relationship;
pub mod schema;

pub use element::{AttributeData, Detail, Element, ReferenceData};
pub use kind::{AttributeKind, ElementKind, LayerKind, MemberKind, RelationshipKind, SectionKind};
pub use record::{Document, Persist, Record, RecordError};
pub use relationship::{Endpoint, Relationship};
pub use schema::{AttributeDef, AttributeSlot, LayerSchema, ValueKind, schema};
