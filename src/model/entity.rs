//! Entity in the derived metamodel.

use serde::{Deserialize, Serialize};
use super::{Feature, Property, Relation};
use crate::{Error, Result};

/// Opaque entity identifier, issued by a registry and stable for its lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityId(pub u32);

impl EntityId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An entity: the metamodel counterpart of one grammar rule kind.
///
/// Property and relation names are unique within one entity. Both lists keep
/// insertion order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub id: EntityId,
    pub name: String,
    /// Grammar kind this entity was derived from.
    pub kind: String,
    pub parent: Option<EntityId>,
    /// Set once another entity names this one as its parent.
    pub is_abstract: bool,
    properties: Vec<Property>,
    relations: Vec<Relation>,
}

impl Entity {
    pub fn new(id: EntityId, name: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            kind: kind.into(),
            parent: None,
            is_abstract: false,
            properties: Vec::new(),
            relations: Vec::new(),
        }
    }

    pub fn with_parent(mut self, parent: EntityId) -> Self {
        self.parent = Some(parent);
        self
    }

    pub fn properties(&self) -> &[Property] {
        &self.properties
    }

    pub fn relations(&self) -> &[Relation] {
        &self.relations
    }

    pub fn property(&self, name: &str) -> Option<&Property> {
        self.properties.iter().find(|p| p.name == name)
    }

    pub fn relation(&self, name: &str) -> Option<&Relation> {
        self.relations.iter().find(|r| r.name == name)
    }

    /// All named facets: relations first, then properties.
    pub fn features(&self) -> impl Iterator<Item = Feature> + '_ {
        self.relations.iter().cloned().map(Feature::Relation)
            .chain(self.properties.iter().cloned().map(Feature::Property))
    }

    /// Whether a property or a relation already carries `name`.
    pub fn has_feature(&self, name: &str) -> bool {
        self.property(name).is_some() || self.relation(name).is_some()
    }

    /// Add a property. A name already used by a property or a relation is
    /// rejected.
    pub fn add_property(&mut self, property: Property) -> Result<()> {
        self.check_unique(&property.name)?;
        self.properties.push(property);
        Ok(())
    }

    /// Add a relation. A name already used by a property or a relation is
    /// rejected.
    pub fn add_relation(&mut self, relation: Relation) -> Result<()> {
        self.check_unique(&relation.name)?;
        self.relations.push(relation);
        Ok(())
    }

    fn check_unique(&self, name: &str) -> Result<()> {
        if self.has_feature(name) {
            return Err(Error::Configuration(format!(
                "Duplicate feature name '{}' for entity {}",
                name, self.name
            )));
        }
        Ok(())
    }
}
