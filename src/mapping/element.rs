//! Element: a read-only view of one concrete node typed by its entity.

use std::fmt;

use super::order::order_by_span;
use super::position::position;
use super::resolve::{resolve_slot, RawSlot};
use super::Mapper;
use crate::model::{
    is_positional, Entity, EntityId, Feature, FeatureKey, Property, Relation, TokenValue, Value,
    ValueReference,
};
use crate::tree::{Child, NodeId, ParseTree, Span};
use crate::{Error, Result};

/// One concrete node, its entity and the element it was reached from.
///
/// Elements are built on demand and never cached: two calls returning the
/// same node yield equal, distinct elements. The parent link borrows the
/// element that produced this one, so children never outlive their parent.
#[derive(Clone, Copy)]
pub struct Element<'a> {
    mapper: &'a Mapper,
    tree: &'a ParseTree,
    node: NodeId,
    entity: EntityId,
    parent: Option<&'a Element<'a>>,
}

impl<'a> Element<'a> {
    pub(super) fn new(
        mapper: &'a Mapper,
        tree: &'a ParseTree,
        node: NodeId,
        entity: EntityId,
        parent: Option<&'a Element<'a>>,
    ) -> Self {
        Self { mapper, tree, node, entity, parent }
    }

    pub fn mapper(&self) -> &'a Mapper {
        self.mapper
    }

    pub fn node_id(&self) -> NodeId {
        self.node
    }

    pub fn entity_id(&self) -> EntityId {
        self.entity
    }

    /// Snapshot of this element's entity.
    pub fn entity(&self) -> Entity {
        self.mapper.registry().entity(self.entity)
    }

    /// Grammar kind of the wrapped node.
    pub fn kind(&self) -> &'a str {
        self.tree.kind(self.node)
    }

    pub fn tree(&self) -> &'a ParseTree {
        self.tree
    }

    pub fn text(&self) -> String {
        self.tree.text(self.node)
    }

    pub fn span(&self) -> Option<Span> {
        self.tree.node_span(self.node)
    }

    pub fn get_parent(&self) -> Option<&'a Element<'a>> {
        self.parent
    }

    // ========================================================================
    // Properties
    // ========================================================================

    /// Value of a single-valued property; `None` when the slot is absent on
    /// this node.
    pub fn get_single_property<K: FeatureKey + ?Sized>(&self, key: &K) -> Result<Option<Value>> {
        let property = self.property(key.feature_name())?;
        if !property.is_single() {
            return Err(Error::Configuration(format!(
                "Property '{}' of {} is multi-valued",
                property.name,
                self.kind()
            )));
        }
        if is_positional(&property.name) {
            if let Some(value) = position(self.tree, self.node, &property.name)? {
                return Ok(Some(Value::Int(value)));
            }
        }
        match self.resolve(&property.name)? {
            RawSlot::One(child) => Ok(child.map(|c| self.token_value(c))),
            RawSlot::Many(_) => Err(self.shape_mismatch(&property.name, "single", "a list")),
        }
    }

    pub fn get_multiple_property<K: FeatureKey + ?Sized>(&self, key: &K) -> Result<Vec<Value>> {
        let property = self.property(key.feature_name())?;
        if property.is_single() {
            return Err(Error::Configuration(format!(
                "Property '{}' of {} is single-valued",
                property.name,
                self.kind()
            )));
        }
        match self.resolve(&property.name)? {
            RawSlot::Many(children) => Ok(children.iter().map(|c| self.token_value(*c)).collect()),
            RawSlot::One(_) => Err(self.shape_mismatch(&property.name, "multi", "a single value")),
        }
    }

    // ========================================================================
    // Relations
    // ========================================================================

    /// Child element of a single-valued relation; `None` when the slot is
    /// absent or its node is of a dropped kind.
    pub fn get_single_relation<K: FeatureKey + ?Sized>(&self, key: &K) -> Result<Option<Element<'_>>> {
        let relation = self.relation(key.feature_name())?;
        if !relation.is_single() {
            return Err(Error::Configuration(format!(
                "Relation '{}' of {} is multi-valued",
                relation.name,
                self.kind()
            )));
        }
        match self.resolve(&relation.name)? {
            RawSlot::One(None) => Ok(None),
            RawSlot::One(Some(child)) => self.child_element(&relation.name, child),
            RawSlot::Many(_) => Err(self.shape_mismatch(&relation.name, "single", "a list")),
        }
    }

    /// Child elements of a multi-valued relation, dropped kinds filtered out.
    pub fn get_multiple_relation<K: FeatureKey + ?Sized>(&self, key: &K) -> Result<Vec<Element<'_>>> {
        let relation = self.relation(key.feature_name())?;
        if relation.is_single() {
            return Err(Error::Configuration(format!(
                "Relation '{}' of {} is single-valued",
                relation.name,
                self.kind()
            )));
        }
        match self.resolve(&relation.name)? {
            RawSlot::Many(children) => {
                let mut elements = Vec::with_capacity(children.len());
                for child in children {
                    if let Some(element) = self.child_element(&relation.name, child)? {
                        elements.push(element);
                    }
                }
                Ok(elements)
            }
            RawSlot::One(_) => Err(self.shape_mismatch(&relation.name, "multi", "a single value")),
        }
    }

    /// Every child element, relation by relation in entity order.
    pub fn get_all_children(&self) -> Result<Vec<Element<'_>>> {
        let mut children = Vec::new();
        for feature in self.features() {
            let Feature::Relation(relation) = feature else { continue };
            if relation.is_single() {
                children.extend(self.get_single_relation(&relation)?);
            } else {
                children.extend(self.get_multiple_relation(&relation)?);
            }
        }
        Ok(children)
    }

    pub fn first_child(&self) -> Result<Option<Element<'_>>> {
        Ok(self.get_all_children()?.into_iter().next())
    }

    // ========================================================================
    // Source order
    // ========================================================================

    /// One reference per present value of every relation, then every
    /// property, sorted by source position. Values without a position
    /// (computed ones) come first, in feature order.
    pub fn get_values_order(&self) -> Result<Vec<ValueReference>> {
        let features = self.features();
        let mut entries: Vec<(ValueReference, Option<Span>)> = Vec::new();

        for relation in features.iter().filter_map(Feature::as_relation) {
            let children = match self.resolve(&relation.name)? {
                RawSlot::One(child) => child.into_iter().collect(),
                RawSlot::Many(children) => children,
            };
            let mut index = 0;
            for child in children {
                let node = self.relation_node(&relation.name, child)?;
                if self.mapper.kept_node(self.tree, node)?.is_none() {
                    continue;
                }
                let reference = ValueReference::new(Feature::Relation(relation.clone()), index);
                entries.push((reference, self.tree.node_span(node)));
                index += 1;
            }
        }

        for property in features.iter().filter_map(Feature::as_property) {
            let reference = |index| ValueReference::new(Feature::Property(property.clone()), index);
            if is_positional(&property.name) {
                entries.push((reference(0), None));
                continue;
            }
            match self.resolve(&property.name)? {
                RawSlot::One(None) => {}
                RawSlot::One(Some(child)) => entries.push((reference(0), self.tree.child_span(child))),
                RawSlot::Many(children) => {
                    for (index, child) in children.into_iter().enumerate() {
                        entries.push((reference(index), self.tree.child_span(child)));
                    }
                }
            }
        }

        Ok(order_by_span(entries))
    }

    // ========================================================================
    // Mutation (unsupported: the view is read-only)
    // ========================================================================

    pub fn set_single_property<K: FeatureKey + ?Sized>(&self, key: &K, _value: Value) -> Result<()> {
        Err(self.read_only("set property", key.feature_name()))
    }

    pub fn set_single_relation<K: FeatureKey + ?Sized>(&self, key: &K, _value: &Element<'_>) -> Result<()> {
        Err(self.read_only("set relation", key.feature_name()))
    }

    pub fn add_multiple_relation<K: FeatureKey + ?Sized>(&self, key: &K, _value: &Element<'_>) -> Result<()> {
        Err(self.read_only("add to relation", key.feature_name()))
    }

    pub fn remove_multiple_relation_at<K: FeatureKey + ?Sized>(&self, key: &K, _index: usize) -> Result<()> {
        Err(self.read_only("remove from relation", key.feature_name()))
    }

    // ========================================================================
    // Internals
    // ========================================================================

    fn features(&self) -> Vec<Feature> {
        self.mapper.registry().features_of(self.entity)
    }

    fn feature(&self, name: &str) -> Result<Feature> {
        self.mapper.registry().feature_of(self.entity, name).ok_or_else(|| {
            Error::Configuration(format!("Entity for '{}' has no feature '{name}'", self.kind()))
        })
    }

    fn property(&self, name: &str) -> Result<Property> {
        match self.feature(name)? {
            Feature::Property(p) => Ok(p),
            Feature::Relation(_) => Err(Error::Configuration(format!(
                "Feature '{name}' of '{}' is a relation, not a property",
                self.kind()
            ))),
        }
    }

    fn relation(&self, name: &str) -> Result<Relation> {
        match self.feature(name)? {
            Feature::Relation(r) => Ok(r),
            Feature::Property(_) => Err(Error::Configuration(format!(
                "Feature '{name}' of '{}' is a property, not a relation",
                self.kind()
            ))),
        }
    }

    fn resolve(&self, feature: &str) -> Result<RawSlot> {
        resolve_slot(self.mapper.registry(), self.tree, self.node, feature)
    }

    fn token_value(&self, child: Child) -> Value {
        match child {
            Child::Token(t) => Value::Token(TokenValue::from_token(self.tree.token(t))),
            Child::Node(n) => Value::Token(TokenValue::from_node(self.tree, n)),
        }
    }

    fn relation_node(&self, relation: &str, child: Child) -> Result<NodeId> {
        match child {
            Child::Node(node) => Ok(node),
            Child::Token(_) => Err(Error::StructuralMismatch(format!(
                "relation '{relation}' of '{}' resolved to a token, expected a node",
                self.kind()
            ))),
        }
    }

    fn child_element(&self, relation: &str, child: Child) -> Result<Option<Element<'_>>> {
        let node = self.relation_node(relation, child)?;
        if self.mapper.kept_node(self.tree, node)?.is_none() {
            return Ok(None);
        }
        self.mapper.to_element(self.tree, node, Some(self)).map(Some)
    }

    fn shape_mismatch(&self, feature: &str, declared: &str, found: &str) -> Error {
        Error::StructuralMismatch(format!(
            "feature '{feature}' of '{}' is declared {declared}-valued but the node holds {found}",
            self.kind()
        ))
    }

    fn read_only(&self, action: &str, feature: &str) -> Error {
        Error::UnsupportedOperation(format!(
            "cannot {action} '{feature}' on '{}': mapped elements are read-only",
            self.kind()
        ))
    }
}

impl fmt::Debug for Element<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Element")
            .field("kind", &self.kind())
            .field("node", &self.node)
            .field("entity", &self.entity)
            .field("parent", &self.parent.map(|p| p.node))
            .finish()
    }
}

/// Same node of the same tree, typed by the same entity.
impl PartialEq for Element<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.tree, other.tree) && self.node == other.node && self.entity == other.entity
    }
}

impl Eq for Element<'_> {}
