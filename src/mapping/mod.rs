//! # Element Mapping
//!
//! Wraps concrete parse-tree nodes in `Element`s: generic, read-only views
//! typed by registry entities.
//!
//! ```text
//! ParseTree node ──to_element──► transparent? ──yes──► its only child (same parent)
//!                                     │no
//!                                     ▼
//!                      Element { node, entity, parent }
//! ```

pub mod element;
pub mod navigator;
pub mod order;
mod position;
mod resolve;

pub use element::Element;
pub use navigator::{find_ancestor, visit_descendants};

use crate::config::MappingConfig;
use crate::grammar::Grammar;
use crate::registry::Registry;
use crate::tree::{Child, NodeId, ParseTree};
use crate::{Error, Result};

/// Entry point: a registry plus the tree-wrapping logic.
#[derive(Debug)]
pub struct Mapper {
    registry: Registry,
}

impl Mapper {
    pub fn new(grammar: Grammar, config: MappingConfig) -> Result<Self> {
        Ok(Self::with_registry(Registry::new(grammar, config)?))
    }

    pub fn with_registry(registry: Registry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Wrap the root of `tree`.
    pub fn to_root_element<'a>(&'a self, tree: &'a ParseTree) -> Result<Element<'a>> {
        let root = tree
            .root()
            .ok_or_else(|| Error::StructuralMismatch("parse tree has no root node".into()))?;
        self.to_element(tree, root, None)
    }

    /// Wrap `node`. A transparent node is never wrapped itself: its only
    /// relevant child is wrapped instead, under the same parent.
    pub fn to_element<'a>(
        &'a self,
        tree: &'a ParseTree,
        node: NodeId,
        parent: Option<&'a Element<'a>>,
    ) -> Result<Element<'a>> {
        let node = self.skip_transparent_nodes(tree, node)?;
        let entity = self.registry.get_entity(tree.kind(node))?;
        Ok(Element::new(self, tree, node, entity, parent))
    }

    /// The node `node` elides to, or `None` when that node's kind is dropped.
    pub(crate) fn kept_node(&self, tree: &ParseTree, node: NodeId) -> Result<Option<NodeId>> {
        let node = self.skip_transparent_nodes(tree, node)?;
        Ok((!self.registry.is_dropped(tree.kind(node))).then_some(node))
    }

    fn skip_transparent_nodes(&self, tree: &ParseTree, mut node: NodeId) -> Result<NodeId> {
        while self.registry.is_transparent(tree.kind(node)) {
            tracing::trace!("Eliding transparent node {} ('{}')", node, tree.kind(node));
            let mut relevant = tree.children(node).iter().filter(|child| match child {
                Child::Token(t) => !self.registry.is_ignored_token_type(tree.token(*t).token_type),
                Child::Node(_) => true,
            });
            node = match (relevant.next(), relevant.next()) {
                (Some(Child::Node(only)), None) => *only,
                (Some(Child::Token(_)), None) => {
                    return Err(Error::StructuralMismatch(format!(
                        "transparent node '{}' has a terminal as its only child",
                        tree.kind(node)
                    )));
                }
                _ => {
                    let count = tree.children(node).len();
                    return Err(Error::StructuralMismatch(format!(
                        "transparent node '{}' must have exactly one child, found {} raw children",
                        tree.kind(node),
                        count
                    )));
                }
            };
        }
        Ok(node)
    }
}
