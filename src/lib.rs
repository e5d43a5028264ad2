//! # grammar-metamodel: Typed Metamodels for Parse Trees
//!
//! Derives a normalized object model (entities, typed properties, containment
//! relations, single inheritance) from the node-type descriptors of a grammar,
//! and maps concrete parse trees onto it as a read-only, navigable view that
//! also remembers the source order of every value.
//!
//! ## Design Principles
//!
//! 1. **Descriptors in, metamodel out**: the registry is a pure function of a
//!    `Grammar` descriptor table plus a `MappingConfig`
//! 2. **Lazy and memoized**: an entity is built the first time its kind is
//!    requested, and never rebuilt
//! 3. **Arena trees**: concrete nodes and tokens are addressed by id, elements
//!    are cheap borrowed wrappers
//! 4. **Read-only view**: mutation through an `Element` is reported, never
//!    performed
//!
//! ## Quick Start
//!
//! ```rust
//! use grammar_metamodel::{
//!     Arity, Grammar, MappingConfig, Mapper, NodeTypeDescriptor, SlotDescriptor, TreeBuilder,
//! };
//!
//! # fn example() -> grammar_metamodel::Result<()> {
//! let grammar = Grammar::new("calc")
//!     .with_token("NUMBER", 1)
//!     .with_token("PLUS", 2)
//!     .with_kind(
//!         NodeTypeDescriptor::new("Sum")
//!             .with_slot(SlotDescriptor::child("Operand", Arity::Multi))
//!             .with_slot(SlotDescriptor::token("PLUS", Arity::Multi)),
//!     )
//!     .with_kind(
//!         NodeTypeDescriptor::new("Operand")
//!             .with_slot(SlotDescriptor::token("NUMBER", Arity::Single)),
//!     );
//!
//! let mapper = Mapper::new(grammar, MappingConfig::default())?;
//!
//! let mut builder = TreeBuilder::new();
//! builder.start_node("Sum");
//! builder.start_node("Operand");
//! builder.token(1, "1");
//! builder.finish_node()?;
//! builder.token(2, "+");
//! builder.start_node("Operand");
//! builder.token(1, "2");
//! builder.finish_node()?;
//! builder.finish_node()?;
//! let tree = builder.finish()?;
//!
//! let sum = mapper.to_root_element(&tree)?;
//! assert_eq!(sum.get_multiple_relation("operand")?.len(), 2);
//! assert_eq!(sum.get_values_order()?.len(), 3);
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```

// ============================================================================
// Modules
// ============================================================================

pub mod model;
pub mod grammar;
pub mod tree;
pub mod config;
pub mod registry;
pub mod mapping;
pub mod printer;

// ============================================================================
// Re-exports: Model (the metamodel DTOs)
// ============================================================================

pub use model::{
    Entity, EntityId, Property, Relation, RelationKind, Feature, FeatureKey,
    Datatype, Multiplicity, Value, TokenValue, ValueReference,
};

// ============================================================================
// Re-exports: Grammar descriptors and concrete trees
// ============================================================================

pub use grammar::{
    Grammar, NodeTypeDescriptor, SlotDescriptor, SlotItem, Arity, Accessor, Vocabulary,
};
pub use tree::{ParseTree, NodeId, TokenId, Token, Child, Binding, Span, TreeBuilder};

// ============================================================================
// Re-exports: Configuration, registry, mapping
// ============================================================================

pub use config::{MappingConfig, RuleConfig};
pub use registry::Registry;
pub use mapping::{Mapper, Element, visit_descendants, find_ancestor};
pub use printer::{render_metamodel, write_metamodel};

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The descriptor table and mapping configuration cannot describe the
    /// requested kind or slot.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A concrete tree does not have the shape the metamodel declares.
    #[error("Structural mismatch: {0}")]
    StructuralMismatch(String),

    /// Mutation attempted through the read-only element view.
    #[error("Unsupported operation: {0}")]
    UnsupportedOperation(String),

    #[error("Nesting depth limit of {limit} exceeded")]
    DepthLimitExceeded { limit: usize },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
