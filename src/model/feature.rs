//! Features (the named facets of an entity) and references to their values.

use serde::{Deserialize, Serialize};
use super::{Property, Relation};

/// Either kind of named facet, used when iterating all facets of an entity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Feature {
    Property(Property),
    Relation(Relation),
}

impl Feature {
    pub fn name(&self) -> &str {
        match self {
            Feature::Property(p) => &p.name,
            Feature::Relation(r) => &r.name,
        }
    }

    pub fn is_property(&self) -> bool {
        matches!(self, Feature::Property(_))
    }

    pub fn is_relation(&self) -> bool {
        matches!(self, Feature::Relation(_))
    }

    pub fn as_property(&self) -> Option<&Property> {
        match self {
            Feature::Property(p) => Some(p),
            Feature::Relation(_) => None,
        }
    }

    pub fn as_relation(&self) -> Option<&Relation> {
        match self {
            Feature::Relation(r) => Some(r),
            Feature::Property(_) => None,
        }
    }
}

/// Anything that names a feature: a plain string or the feature itself.
pub trait FeatureKey {
    fn feature_name(&self) -> &str;
}

impl FeatureKey for str {
    fn feature_name(&self) -> &str { self }
}

impl FeatureKey for String {
    fn feature_name(&self) -> &str { self }
}

impl FeatureKey for Property {
    fn feature_name(&self) -> &str { &self.name }
}

impl FeatureKey for Relation {
    fn feature_name(&self) -> &str { &self.name }
}

impl FeatureKey for Feature {
    fn feature_name(&self) -> &str { self.name() }
}

/// One occurrence of a (possibly repeated) feature on one element.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ValueReference {
    pub feature: Feature,
    pub index: usize,
}

impl ValueReference {
    pub fn new(feature: Feature, index: usize) -> Self {
        Self { feature, index }
    }

    pub fn name(&self) -> &str {
        self.feature.name()
    }
}
