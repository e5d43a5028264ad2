//! Mapping configuration.
//!
//! Per-kind and per-slot overrides applied while deriving the metamodel and
//! while mapping trees. Set once, before the first mapping call: the
//! registry takes ownership of the configuration when it is created.
//!
//! ```text
//! MappingConfig::default()
//!     .mark_transparent("Test")          // elided, replaced by its only child
//!     .mark_treat_as_token("Dotted_name") // flattened to a STRING property
//!     .mark_drop("Comment")              // gone from metamodel and values
//!     .ignore_token_kind("NEWLINE")
//!     .enable_positions(true)
//! ```

use hashbrown::{HashMap, HashSet};
use serde::{Deserialize, Serialize};

use crate::grammar::Vocabulary;
use crate::model::Property;
use crate::{Error, Result};

/// Recursion bound used when none is configured.
pub const DEFAULT_MAX_DEPTH: usize = 512;

/// Overrides for one rule kind.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleConfig {
    pub ignored_properties: HashSet<String>,
    /// Extra slots (by raw name) the automatic walk does not pick up.
    pub forced_slots: Vec<String>,
    /// Raw slot name → feature name.
    pub slot_renames: HashMap<String, String>,
}

impl RuleConfig {
    /// Per-kind property filter, applied last when a property is emitted.
    pub fn can_add(&self, property: &Property) -> bool {
        !self.ignored_properties.contains(&property.name)
    }

    /// Raw slot name behind a feature name.
    pub fn raw_name<'a>(&'a self, feature: &'a str) -> &'a str {
        self.slot_renames
            .iter()
            .find(|(_, renamed)| renamed.as_str() == feature)
            .map(|(raw, _)| raw.as_str())
            .unwrap_or(feature)
    }

    /// Feature name for a raw slot name.
    pub fn feature_name<'a>(&'a self, raw: &'a str) -> &'a str {
        self.slot_renames.get(raw).map(String::as_str).unwrap_or(raw)
    }
}

/// Mapping configuration for one grammar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MappingConfig {
    pub transparent: HashSet<String>,
    pub treat_as_token: HashSet<String>,
    pub dropped: HashSet<String>,
    /// Kind → entity name.
    pub entity_names: HashMap<String, String>,
    /// Symbolic token names excluded from the metamodel and from the
    /// children of transparent nodes.
    pub ignored_tokens: HashSet<String>,
    pub rules: HashMap<String, RuleConfig>,
    /// Add `startLine`/`endLine`/`startColumn`/`endColumn` to every entity.
    pub positions: bool,
    /// Bound on registration and navigation recursion.
    pub max_depth: usize,
}

impl Default for MappingConfig {
    fn default() -> Self {
        Self {
            transparent: HashSet::new(),
            treat_as_token: HashSet::new(),
            dropped: HashSet::new(),
            entity_names: HashMap::new(),
            ignored_tokens: HashSet::new(),
            rules: HashMap::new(),
            positions: false,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

// ============================================================================
// Builder surface
// ============================================================================

impl MappingConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn mark_transparent(mut self, kind: impl Into<String>) -> Self {
        self.transparent.insert(kind.into());
        self
    }

    pub fn mark_treat_as_token(mut self, kind: impl Into<String>) -> Self {
        self.treat_as_token.insert(kind.into());
        self
    }

    pub fn mark_drop(mut self, kind: impl Into<String>) -> Self {
        self.dropped.insert(kind.into());
        self
    }

    pub fn rename_entity(mut self, kind: impl Into<String>, name: impl Into<String>) -> Self {
        self.entity_names.insert(kind.into(), name.into());
        self
    }

    /// Expose raw slot `old` of `kind` as feature `new`. Lookups by `new`
    /// resolve back to `old` on concrete nodes.
    pub fn rename_slot(
        mut self,
        kind: impl Into<String>,
        old: impl Into<String>,
        new: impl Into<String>,
    ) -> Self {
        self.rule_mut(kind).slot_renames.insert(old.into(), new.into());
        self
    }

    pub fn ignore_property(mut self, kind: impl Into<String>, name: impl Into<String>) -> Self {
        self.rule_mut(kind).ignored_properties.insert(name.into());
        self
    }

    pub fn ignore_token_kind(mut self, symbolic_name: impl Into<String>) -> Self {
        self.ignored_tokens.insert(symbolic_name.into());
        self
    }

    pub fn force_include_slot(mut self, kind: impl Into<String>, name: impl Into<String>) -> Self {
        let name = name.into();
        let rule = self.rule_mut(kind);
        if !rule.forced_slots.contains(&name) {
            rule.forced_slots.push(name);
        }
        self
    }

    pub fn enable_positions(mut self, enabled: bool) -> Self {
        self.positions = enabled;
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    fn rule_mut(&mut self, kind: impl Into<String>) -> &mut RuleConfig {
        self.rules.entry(kind.into()).or_default()
    }
}

// ============================================================================
// Queries
// ============================================================================

impl MappingConfig {
    pub fn is_transparent(&self, kind: &str) -> bool {
        self.transparent.contains(kind)
    }

    pub fn is_treat_as_token(&self, kind: &str) -> bool {
        self.treat_as_token.contains(kind)
    }

    pub fn is_dropped(&self, kind: &str) -> bool {
        self.dropped.contains(kind)
    }

    pub fn is_ignored_token(&self, symbolic_name: &str) -> bool {
        self.ignored_tokens.contains(symbolic_name)
    }

    pub fn rule(&self, kind: &str) -> Option<&RuleConfig> {
        self.rules.get(kind)
    }

    pub fn entity_name<'a>(&'a self, kind: &'a str) -> &'a str {
        self.entity_names.get(kind).map(String::as_str).unwrap_or(kind)
    }

    pub fn raw_slot_name<'a>(&'a self, kind: &str, feature: &'a str) -> &'a str {
        match self.rules.get(kind) {
            Some(rule) => rule.raw_name(feature),
            None => feature,
        }
    }

    pub fn feature_name<'a>(&'a self, kind: &str, raw: &'a str) -> &'a str {
        match self.rules.get(kind) {
            Some(rule) => rule.feature_name(raw),
            None => raw,
        }
    }

    pub fn can_add(&self, kind: &str, property: &Property) -> bool {
        self.rules.get(kind).is_none_or(|rule| rule.can_add(property))
    }

    /// Resolve the ignored token names against a vocabulary.
    pub fn ignored_token_types(&self, vocabulary: &Vocabulary) -> Result<HashSet<i32>> {
        self.ignored_tokens
            .iter()
            .map(|name| {
                vocabulary.token_type(name).ok_or_else(|| {
                    Error::Configuration(format!("Unknown token name '{name}'"))
                })
            })
            .collect()
    }
}
