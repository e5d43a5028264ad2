//! # Metamodel Registry
//!
//! The derived schema: one `Entity` per mappable grammar kind, built the
//! first time the kind is requested and memoized forever after.
//!
//! ## Concurrency
//!
//! State sits behind a `parking_lot::RwLock`. Lookups of already-built kinds
//! take the read lock; a first-time build takes the write lock once and runs
//! the whole recursive registration under it, so racing warm-ups serialize
//! instead of observing half-built placeholders. No lock is held once a
//! public method returns.

mod builder;

use std::sync::Arc;

use hashbrown::{HashMap, HashSet};
use parking_lot::RwLock;

use crate::config::MappingConfig;
use crate::grammar::Grammar;
use crate::model::{Entity, EntityId, Feature};
use crate::{Error, Result};
use builder::EntityBuilder;

#[derive(Debug, Default)]
struct RegistryState {
    by_kind: HashMap<String, EntityId>,
    entities: Vec<Entity>,
}

/// Lazily built, memoized metamodel for one grammar + configuration pair.
#[derive(Debug)]
pub struct Registry {
    grammar: Arc<Grammar>,
    config: Arc<MappingConfig>,
    ignored_token_types: HashSet<i32>,
    state: RwLock<RegistryState>,
}

impl Registry {
    /// Create an empty registry. Fails if the configuration names a token
    /// the grammar's vocabulary does not know.
    pub fn new(grammar: Grammar, config: MappingConfig) -> Result<Self> {
        let ignored_token_types = config.ignored_token_types(grammar.vocabulary())?;
        Ok(Self {
            grammar: Arc::new(grammar),
            config: Arc::new(config),
            ignored_token_types,
            state: RwLock::new(RegistryState::default()),
        })
    }

    pub fn grammar(&self) -> &Grammar {
        &self.grammar
    }

    pub fn config(&self) -> &MappingConfig {
        &self.config
    }

    pub fn is_transparent(&self, kind: &str) -> bool {
        self.config.is_transparent(kind)
    }

    pub fn is_treat_as_token(&self, kind: &str) -> bool {
        self.config.is_treat_as_token(kind)
    }

    pub fn is_dropped(&self, kind: &str) -> bool {
        self.config.is_dropped(kind)
    }

    /// Whether a token type is on the configured ignore list.
    pub fn is_ignored_token_type(&self, token_type: i32) -> bool {
        self.ignored_token_types.contains(&token_type)
    }

    /// The entity for `kind`, building it (and everything it reaches) first
    /// if needed. Transparent, treat-as-token and dropped kinds have no
    /// entity.
    pub fn get_entity(&self, kind: &str) -> Result<EntityId> {
        check_mappable(&self.config, kind)?;
        if let Some(&id) = self.state.read().by_kind.get(kind) {
            return Ok(id);
        }
        let mut state = self.state.write();
        let built = state.entities.len();
        let mut builder = EntityBuilder::new(&self.grammar, &self.config, &mut state);
        let result = builder.get_or_register(kind, 0);
        let marked_abstract = builder.marked_abstract;
        if result.is_err() {
            // Forget every entity of the failed build so no half-built
            // placeholder stays cached, and unmark parents it had flagged.
            state.entities.truncate(built);
            state.by_kind.retain(|_, id| id.index() < built);
            for id in marked_abstract {
                if let Some(entity) = state.entities.get_mut(id.index()) {
                    entity.is_abstract = false;
                }
            }
        }
        result
    }

    /// Snapshot of an entity. Panics if `id` was not issued by this registry.
    pub fn entity(&self, id: EntityId) -> Entity {
        self.state.read().entities[id.index()].clone()
    }

    pub fn get(&self, id: EntityId) -> Option<Entity> {
        self.state.read().entities.get(id.index()).cloned()
    }

    /// Build (if needed) and snapshot the entity for `kind`.
    pub fn entity_for(&self, kind: &str) -> Result<Entity> {
        let id = self.get_entity(kind)?;
        Ok(self.entity(id))
    }

    /// Cached entity id for `kind`, without building anything.
    pub fn entity_id_for(&self, kind: &str) -> Option<EntityId> {
        self.state.read().by_kind.get(kind).copied()
    }

    /// Every entity built so far, in creation order.
    pub fn entities(&self) -> Vec<Entity> {
        self.state.read().entities.clone()
    }

    pub fn len(&self) -> usize {
        self.state.read().entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Build an entity for every mappable kind of the grammar. Returns the
    /// number of entities known afterwards.
    pub fn register_all(&self) -> Result<usize> {
        for descriptor in self.grammar.descriptors() {
            let kind = descriptor.name.as_str();
            if self.grammar.is_base_kind(kind)
                || self.is_transparent(kind)
                || self.is_treat_as_token(kind)
                || self.is_dropped(kind)
            {
                continue;
            }
            self.get_entity(kind)?;
        }
        Ok(self.len())
    }

    /// Features of `id` followed by those inherited from its ancestors, in
    /// entity order (relations then properties) at each level. A name
    /// redeclared by a descendant hides the inherited feature.
    pub fn features_of(&self, id: EntityId) -> Vec<Feature> {
        let chain = self.ancestry(id);
        let state = self.state.read();
        let mut seen = HashSet::new();
        chain
            .iter()
            .filter_map(|e| state.entities.get(e.index()))
            .flat_map(Entity::features)
            .filter(|feature| seen.insert(feature.name().to_owned()))
            .collect()
    }

    /// Feature `name` of `id` or of the nearest ancestor declaring it.
    pub fn feature_of(&self, id: EntityId, name: &str) -> Option<Feature> {
        let chain = self.ancestry(id);
        let state = self.state.read();
        chain.iter().filter_map(|e| state.entities.get(e.index())).find_map(|entity| {
            entity
                .relation(name)
                .cloned()
                .map(Feature::Relation)
                .or_else(|| entity.property(name).cloned().map(Feature::Property))
        })
    }

    /// `id` followed by its ancestors, nearest first.
    pub fn ancestry(&self, id: EntityId) -> Vec<EntityId> {
        let state = self.state.read();
        let mut chain = vec![id];
        let mut current = state.entities.get(id.index()).and_then(|e| e.parent);
        while let Some(parent) = current {
            if chain.contains(&parent) {
                break;
            }
            chain.push(parent);
            current = state.entities.get(parent.index()).and_then(|e| e.parent);
        }
        chain
    }
}

fn check_mappable(config: &MappingConfig, kind: &str) -> Result<()> {
    let reason = if config.is_transparent(kind) {
        "transparent"
    } else if config.is_treat_as_token(kind) {
        "treated as a token"
    } else if config.is_dropped(kind) {
        "dropped"
    } else {
        return Ok(());
    };
    Err(Error::Configuration(format!(
        "Kind '{kind}' is {reason}, no entity can be generated for it"
    )))
}
