//! Property: a typed scalar facet of an entity.

use std::fmt;
use serde::{Deserialize, Serialize};

use crate::grammar::Arity;

pub const START_LINE: &str = "startLine";
pub const END_LINE: &str = "endLine";
pub const START_COLUMN: &str = "startColumn";
pub const END_COLUMN: &str = "endColumn";

/// Scalar type of a property value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Datatype {
    String,
    Integer,
    Boolean,
}

/// How many values a feature holds on one element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Multiplicity {
    One,
    Many,
}

impl Multiplicity {
    pub fn is_single(self) -> bool {
        matches!(self, Multiplicity::One)
    }
}

impl From<Arity> for Multiplicity {
    fn from(arity: Arity) -> Self {
        match arity {
            Arity::Single => Multiplicity::One,
            Arity::Multi => Multiplicity::Many,
        }
    }
}

/// A property. Compared structurally by name, datatype and multiplicity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Property {
    pub name: String,
    pub datatype: Datatype,
    pub multiplicity: Multiplicity,
}

impl Property {
    pub fn new(name: impl Into<String>, datatype: Datatype, multiplicity: Multiplicity) -> Self {
        Self { name: name.into(), datatype, multiplicity }
    }

    pub fn string(name: impl Into<String>, multiplicity: Multiplicity) -> Self {
        Self::new(name, Datatype::String, multiplicity)
    }

    pub fn is_single(&self) -> bool {
        self.multiplicity.is_single()
    }
}

/// The four source-position properties, in the order they are added.
pub fn positional_properties() -> [Property; 4] {
    [START_LINE, END_LINE, START_COLUMN, END_COLUMN]
        .map(|name| Property::new(name, Datatype::Integer, Multiplicity::One))
}

pub fn is_positional(name: &str) -> bool {
    matches!(name, START_LINE | END_LINE | START_COLUMN | END_COLUMN)
}

// ============================================================================
// Display
// ============================================================================

impl fmt::Display for Datatype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Datatype::String => write!(f, "STRING"),
            Datatype::Integer => write!(f, "INTEGER"),
            Datatype::Boolean => write!(f, "BOOLEAN"),
        }
    }
}

impl fmt::Display for Multiplicity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Multiplicity::One => write!(f, "ONE"),
            Multiplicity::Many => write!(f, "MANY"),
        }
    }
}
