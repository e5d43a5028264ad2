//! Entity construction: turns one node type descriptor into an entity.
//!
//! Runs entirely under the registry's write lock, on `&mut RegistryState`.

use smallvec::SmallVec;

use super::{check_mappable, RegistryState};
use crate::config::MappingConfig;
use crate::grammar::{Accessor, Grammar, NodeTypeDescriptor, SlotDescriptor, SlotItem};
use crate::model::{positional_properties, Entity, EntityId, Multiplicity, Property, Relation};
use crate::{Error, Result};

pub(super) struct EntityBuilder<'r> {
    grammar: &'r Grammar,
    config: &'r MappingConfig,
    state: &'r mut RegistryState,
    /// Entities this build turned abstract, for rollback.
    pub(super) marked_abstract: SmallVec<[EntityId; 4]>,
}

impl<'r> EntityBuilder<'r> {
    pub(super) fn new(
        grammar: &'r Grammar,
        config: &'r MappingConfig,
        state: &'r mut RegistryState,
    ) -> Self {
        Self { grammar, config, state, marked_abstract: SmallVec::new() }
    }

    pub(super) fn get_or_register(&mut self, kind: &str, depth: usize) -> Result<EntityId> {
        check_mappable(self.config, kind)?;
        match self.state.by_kind.get(kind) {
            Some(&id) => Ok(id),
            None => self.register(kind, depth),
        }
    }

    fn register(&mut self, kind: &str, depth: usize) -> Result<EntityId> {
        if depth > self.config.max_depth {
            return Err(Error::DepthLimitExceeded { limit: self.config.max_depth });
        }
        let (grammar, config) = (self.grammar, self.config);
        let descriptor = grammar
            .descriptor(kind)
            .ok_or_else(|| Error::Configuration(format!("No descriptor for kind '{kind}'")))?;
        tracing::debug!("Start registering kind '{}'", kind);

        let parent = match grammar.parent_of(kind) {
            Some(parent_kind) => {
                let parent = self.get_or_register(parent_kind, depth + 1)?;
                let entity = &mut self.state.entities[parent.index()];
                if !entity.is_abstract {
                    entity.is_abstract = true;
                    self.marked_abstract.push(parent);
                }
                Some(parent)
            }
            None => None,
        };
        // The parent's own slots may already have reached this kind.
        if let Some(&id) = self.state.by_kind.get(kind) {
            return Ok(id);
        }

        let id = EntityId(self.state.entities.len() as u32);
        let mut entity = Entity::new(id, config.entity_name(kind), kind);
        entity.parent = parent;
        if config.positions {
            for property in positional_properties() {
                entity.add_property(property)?;
            }
        }
        // Stored before the slots are walked so self references terminate.
        self.state.entities.push(entity);
        self.state.by_kind.insert(kind.to_owned(), id);

        let shadowed = shadowed_slots(descriptor);
        for (i, slot) in descriptor.slots.iter().enumerate() {
            if shadowed.contains(&i) {
                tracing::trace!("Slot '{}' of '{}' is shadowed", slot.name, kind);
                continue;
            }
            if slot.accessor == Accessor::Label && slot.is_terminal() {
                // Token labels are opt-in through force_include_slot.
                continue;
            }
            self.map_slot(id, kind, slot, depth)?;
        }

        if let Some(rule) = config.rule(kind) {
            for name in &rule.forced_slots {
                let slot = descriptor.slot(name).ok_or_else(|| {
                    Error::Configuration(format!("Kind '{kind}' has no slot '{name}' to include"))
                })?;
                self.map_slot(id, kind, slot, depth)?;
            }
        }

        tracing::debug!("End registering kind '{}' as entity {}", kind, id);
        Ok(id)
    }

    fn map_slot(
        &mut self,
        id: EntityId,
        kind: &str,
        slot: &'r SlotDescriptor,
        depth: usize,
    ) -> Result<()> {
        let config = self.config;
        let name = config.feature_name(kind, &slot.name);
        let multiplicity = Multiplicity::from(slot.arity);
        match &slot.item {
            SlotItem::Terminal(_) => {
                if config.is_ignored_token(&slot.name) {
                    tracing::trace!("Token slot '{}' of '{}' is ignored", slot.name, kind);
                    return Ok(());
                }
                self.add_property(id, kind, Property::string(name, multiplicity))
            }
            SlotItem::Node(child) => {
                let effective = self.skip_transparent(child)?;
                if config.is_treat_as_token(effective) {
                    self.add_property(id, kind, Property::string(name, multiplicity))
                } else if config.is_dropped(effective) {
                    tracing::trace!("Slot '{}' of '{}' targets dropped '{}'", slot.name, kind, effective);
                    Ok(())
                } else {
                    let target = self.get_or_register(effective, depth + 1)?;
                    let relation = Relation::containment(name, multiplicity, id, target);
                    tracing::debug!("Adding relation '{}' {} -> {}", relation.name, kind, effective);
                    self.state.entities[id.index()].add_relation(relation)
                }
            }
        }
    }

    fn add_property(&mut self, id: EntityId, kind: &str, property: Property) -> Result<()> {
        if !self.config.can_add(kind, &property) {
            tracing::trace!("Property '{}' of '{}' is ignored", property.name, kind);
            return Ok(());
        }
        tracing::debug!("Adding property '{}' to '{}'", property.name, kind);
        self.state.entities[id.index()].add_property(property)
    }

    /// Follow transparent kinds down to the first kind that is not.
    fn skip_transparent(&self, kind: &'r str) -> Result<&'r str> {
        let grammar = self.grammar;
        let mut current = kind;
        let mut seen: SmallVec<[&str; 4]> = SmallVec::new();
        while self.config.is_transparent(current) {
            if seen.contains(&current) {
                return Err(Error::Configuration(format!(
                    "Transparent kinds form a cycle through '{current}'"
                )));
            }
            seen.push(current);
            let descriptor = grammar.descriptor(current).ok_or_else(|| {
                Error::Configuration(format!("No descriptor for kind '{current}'"))
            })?;
            current = self.only_child_kind(descriptor)?;
        }
        Ok(current)
    }

    /// The single eligible slot of a transparent kind, which must be a
    /// single-valued node slot.
    fn only_child_kind(&self, descriptor: &'r NodeTypeDescriptor) -> Result<&'r str> {
        let mut eligible = descriptor
            .slots
            .iter()
            .filter(|s| !(s.is_terminal() && self.config.is_ignored_token(&s.name)));
        match (eligible.next(), eligible.next()) {
            (Some(slot), None) if slot.is_single() => slot.target_kind().ok_or_else(|| {
                Error::Configuration(format!(
                    "Transparent kind '{}' has a terminal as its only slot",
                    descriptor.name
                ))
            }),
            _ => Err(Error::Configuration(format!(
                "Transparent kind '{}' must have exactly one single-valued, non-terminal slot",
                descriptor.name
            ))),
        }
    }
}

/// Indices of slots hidden by same-typed siblings: when two or more node
/// slots target one kind, the default-accessor slot among them is dropped.
fn shadowed_slots(descriptor: &NodeTypeDescriptor) -> SmallVec<[usize; 4]> {
    let mut shadowed = SmallVec::new();
    for (i, slot) in descriptor.slots.iter().enumerate() {
        let Some(target) = slot.target_kind() else { continue };
        if !slot.is_default_accessor() {
            continue;
        }
        let siblings = descriptor
            .slots
            .iter()
            .filter(|s| s.target_kind() == Some(target))
            .count();
        if siblings >= 2 {
            shadowed.push(i);
        }
    }
    shadowed
}
