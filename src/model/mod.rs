//! # Metamodel
//!
//! DTOs of the derived object model: entities, their typed properties and
//! containment relations, and the runtime values read from mapped elements.
//!
//! Design rule: NO tree types, NO locking here.
//! This module is pure data: no I/O, no state.

pub mod entity;
pub mod property;
pub mod relation;
pub mod feature;
pub mod value;

pub use entity::{Entity, EntityId};
pub use property::{
    Property, Datatype, Multiplicity, positional_properties, is_positional,
    START_LINE, END_LINE, START_COLUMN, END_COLUMN,
};
pub use relation::{Relation, RelationKind};
pub use feature::{Feature, FeatureKey, ValueReference};
pub use value::{Value, TokenValue};
