//! Node type descriptors: the static schema of one grammar rule kind.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Whether a slot holds one value or a list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Arity {
    Single,
    Multi,
}

/// What a slot holds.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "name")]
pub enum SlotItem {
    /// A terminal, named by its symbolic token name (e.g. `NEWLINE`).
    Terminal(String),
    /// A child rule node of the given kind (or a kind inheriting from it).
    Node(String),
}

/// How the front-end exposes a slot on a concrete node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Accessor {
    /// Generated accessor named after the item (`test()`, `NEWLINE()`),
    /// answered by scanning the node's raw children.
    Default,
    /// Labeled binding (`cond=test`, `elifs+=elif_clause`), answered by the
    /// node's label bindings.
    Label,
}

/// One named child position on a node kind.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SlotDescriptor {
    pub name: String,
    pub arity: Arity,
    pub item: SlotItem,
    pub accessor: Accessor,
}

/// Name of the generated accessor for a child kind: the kind with its first
/// letter lowercased (`Simple_stmt` → `simple_stmt`).
pub fn default_accessor_name(kind: &str) -> String {
    let mut chars = kind.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

impl SlotDescriptor {
    /// Build a slot, deriving the accessor from the name: a slot named like
    /// its item's default accessor is a default accessor, anything else is a
    /// label.
    pub fn new(name: impl Into<String>, arity: Arity, item: SlotItem) -> Self {
        let name = name.into();
        let is_default = match &item {
            SlotItem::Node(kind) => name == default_accessor_name(kind),
            SlotItem::Terminal(symbol) => name == *symbol,
        };
        let accessor = if is_default { Accessor::Default } else { Accessor::Label };
        Self { name, arity, item, accessor }
    }

    /// Default accessor for a child rule kind.
    pub fn child(kind: impl Into<String>, arity: Arity) -> Self {
        let kind = kind.into();
        Self {
            name: default_accessor_name(&kind),
            arity,
            item: SlotItem::Node(kind),
            accessor: Accessor::Default,
        }
    }

    /// Default accessor for a terminal, named after its symbolic token name.
    pub fn token(symbol: impl Into<String>, arity: Arity) -> Self {
        let symbol = symbol.into();
        Self {
            name: symbol.clone(),
            arity,
            item: SlotItem::Terminal(symbol),
            accessor: Accessor::Default,
        }
    }

    /// Labeled binding.
    pub fn label(name: impl Into<String>, arity: Arity, item: SlotItem) -> Self {
        Self { name: name.into(), arity, item, accessor: Accessor::Label }
    }

    pub fn is_default_accessor(&self) -> bool {
        self.accessor == Accessor::Default
    }

    pub fn is_single(&self) -> bool {
        self.arity == Arity::Single
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self.item, SlotItem::Terminal(_))
    }

    /// Child kind for node slots.
    pub fn target_kind(&self) -> Option<&str> {
        match &self.item {
            SlotItem::Node(kind) => Some(kind),
            SlotItem::Terminal(_) => None,
        }
    }
}

/// Static description of one grammar rule kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeTypeDescriptor {
    pub name: String,
    #[serde(default)]
    pub parent: Option<String>,
    #[serde(default)]
    pub slots: SmallVec<[SlotDescriptor; 4]>,
}

impl NodeTypeDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), parent: None, slots: SmallVec::new() }
    }

    pub fn with_parent(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    pub fn with_slot(mut self, slot: SlotDescriptor) -> Self {
        self.slots.push(slot);
        self
    }

    pub fn slot(&self, name: &str) -> Option<&SlotDescriptor> {
        self.slots.iter().find(|s| s.name == name)
    }
}
