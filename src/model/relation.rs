//! Relation (typed child link) in the metamodel.

use serde::{Deserialize, Serialize};
use super::{EntityId, Multiplicity};

/// Relation semantics. The mapper only ever emits `Containment`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RelationKind {
    Containment,
    Reference,
}

/// A relation owned by its `source` entity and pointing at `target`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Relation {
    pub name: String,
    pub kind: RelationKind,
    pub multiplicity: Multiplicity,
    pub source: EntityId,
    pub target: EntityId,
}

impl Relation {
    pub fn containment(
        name: impl Into<String>,
        multiplicity: Multiplicity,
        source: EntityId,
        target: EntityId,
    ) -> Self {
        Self {
            name: name.into(),
            kind: RelationKind::Containment,
            multiplicity,
            source,
            target,
        }
    }

    pub fn is_single(&self) -> bool {
        self.multiplicity.is_single()
    }
}
