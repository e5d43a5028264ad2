//! # Grammar Descriptors
//!
//! The static schema supplied by the parsing front-end: one
//! `NodeTypeDescriptor` per rule kind plus the token `Vocabulary`.
//! Pure data: the mapper never produces descriptors, it only reads them.

pub mod descriptor;

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

pub use descriptor::{
    Accessor, Arity, NodeTypeDescriptor, SlotDescriptor, SlotItem, default_accessor_name,
};

use crate::tree::Token;
use crate::Result;

// ============================================================================
// Vocabulary
// ============================================================================

/// Symbolic token names and their numeric token types.
///
/// `EOF` is always known and maps to [`Token::EOF`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "HashMap<String, i32>", into = "HashMap<String, i32>")]
pub struct Vocabulary {
    by_name: HashMap<String, i32>,
    by_type: HashMap<i32, String>,
}

impl Default for Vocabulary {
    fn default() -> Self {
        let mut vocabulary = Self { by_name: HashMap::new(), by_type: HashMap::new() };
        vocabulary.define("EOF", Token::EOF);
        vocabulary
    }
}

impl Vocabulary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn define(&mut self, name: impl Into<String>, token_type: i32) {
        let name = name.into();
        self.by_type.insert(token_type, name.clone());
        self.by_name.insert(name, token_type);
    }

    pub fn token_type(&self, name: &str) -> Option<i32> {
        self.by_name.get(name).copied()
    }

    pub fn symbolic_name(&self, token_type: i32) -> Option<&str> {
        self.by_type.get(&token_type).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}

impl From<HashMap<String, i32>> for Vocabulary {
    fn from(symbols: HashMap<String, i32>) -> Self {
        let mut vocabulary = Self::default();
        for (name, token_type) in symbols {
            vocabulary.define(name, token_type);
        }
        vocabulary
    }
}

impl From<Vocabulary> for HashMap<String, i32> {
    fn from(vocabulary: Vocabulary) -> Self {
        vocabulary.by_name
    }
}

// ============================================================================
// Grammar
// ============================================================================

/// Serialized form of a [`Grammar`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct GrammarDef {
    name: String,
    #[serde(default)]
    base_kind: Option<String>,
    #[serde(default)]
    kinds: Vec<NodeTypeDescriptor>,
    #[serde(default)]
    tokens: Vocabulary,
}

/// Descriptor table for one grammar.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "GrammarDef", into = "GrammarDef")]
pub struct Grammar {
    name: String,
    /// Generic base kind every rule kind implicitly extends; naming it as a
    /// parent does not create an entity.
    base_kind: Option<String>,
    kinds: Vec<NodeTypeDescriptor>,
    index: HashMap<String, usize>,
    vocabulary: Vocabulary,
}

impl From<GrammarDef> for Grammar {
    fn from(def: GrammarDef) -> Self {
        let mut grammar = Grammar::new(def.name);
        grammar.base_kind = def.base_kind;
        grammar.vocabulary = def.tokens;
        for kind in def.kinds {
            grammar.define(kind);
        }
        grammar
    }
}

impl From<Grammar> for GrammarDef {
    fn from(grammar: Grammar) -> Self {
        GrammarDef {
            name: grammar.name,
            base_kind: grammar.base_kind,
            kinds: grammar.kinds,
            tokens: grammar.vocabulary,
        }
    }
}

impl Grammar {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            base_kind: None,
            kinds: Vec::new(),
            index: HashMap::new(),
            vocabulary: Vocabulary::new(),
        }
    }

    /// Load a descriptor table shipped as JSON by a front-end.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn with_base_kind(mut self, kind: impl Into<String>) -> Self {
        self.base_kind = Some(kind.into());
        self
    }

    pub fn with_kind(mut self, descriptor: NodeTypeDescriptor) -> Self {
        self.define(descriptor);
        self
    }

    pub fn with_token(mut self, name: impl Into<String>, token_type: i32) -> Self {
        self.vocabulary.define(name, token_type);
        self
    }

    /// Add a descriptor, replacing any previous one of the same kind.
    pub fn define(&mut self, descriptor: NodeTypeDescriptor) {
        match self.index.get(&descriptor.name) {
            Some(&i) => self.kinds[i] = descriptor,
            None => {
                self.index.insert(descriptor.name.clone(), self.kinds.len());
                self.kinds.push(descriptor);
            }
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    pub fn descriptor(&self, kind: &str) -> Option<&NodeTypeDescriptor> {
        self.index.get(kind).map(|&i| &self.kinds[i])
    }

    /// Descriptors in definition order.
    pub fn descriptors(&self) -> impl Iterator<Item = &NodeTypeDescriptor> {
        self.kinds.iter()
    }

    pub fn is_base_kind(&self, kind: &str) -> bool {
        self.base_kind.as_deref() == Some(kind)
    }

    /// Declared parent, ignoring the generic base kind.
    pub fn parent_of(&self, kind: &str) -> Option<&str> {
        self.descriptor(kind)
            .and_then(|d| d.parent.as_deref())
            .filter(|p| !self.is_base_kind(p))
    }

    /// Whether `kind` is `target` or inherits from it.
    pub fn conforms_to(&self, kind: &str, target: &str) -> bool {
        let mut current = Some(kind);
        // Bounded walk: a malformed table with a parent cycle must not hang.
        for _ in 0..=self.kinds.len() {
            match current {
                Some(k) if k == target => return true,
                Some(k) => current = self.parent_of(k),
                None => return false,
            }
        }
        false
    }

    /// Find a slot on `kind` or, failing that, on its ancestors.
    pub fn find_slot(&self, kind: &str, name: &str) -> Option<&SlotDescriptor> {
        let mut current = Some(kind);
        for _ in 0..=self.kinds.len() {
            let k = current?;
            if let Some(slot) = self.descriptor(k).and_then(|d| d.slot(name)) {
                return Some(slot);
            }
            current = self.parent_of(k);
        }
        None
    }
}
