//! Slot resolution on concrete nodes.
//!
//! A feature name is first mapped back to its raw slot name. A label
//! binding recorded on the node wins; a declared label slot with no binding
//! is empty; a default-accessor slot is derived from the raw children.

use smallvec::SmallVec;

use crate::grammar::{Accessor, Arity, SlotDescriptor, SlotItem};
use crate::registry::Registry;
use crate::tree::{Binding, Child, NodeId, ParseTree};
use crate::{Error, Result};

/// Raw children behind one slot of one node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) enum RawSlot {
    One(Option<Child>),
    Many(SmallVec<[Child; 4]>),
}

impl RawSlot {
    fn empty(arity: Arity) -> Self {
        match arity {
            Arity::Single => RawSlot::One(None),
            Arity::Multi => RawSlot::Many(SmallVec::new()),
        }
    }
}

pub(super) fn resolve_slot(
    registry: &Registry,
    tree: &ParseTree,
    node: NodeId,
    feature: &str,
) -> Result<RawSlot> {
    let kind = tree.kind(node);
    let (raw, slot) = declared_slot(registry, kind, feature).ok_or_else(|| {
        Error::Configuration(format!("No accessor '{feature}' on node kind '{kind}'"))
    })?;

    if let Some(binding) = tree.node(node).bindings.get(raw) {
        return Ok(match binding {
            Binding::One(child) => RawSlot::One(Some(*child)),
            Binding::Many(children) => RawSlot::Many(children.iter().copied().collect()),
        });
    }
    if slot.accessor == Accessor::Label {
        return Ok(RawSlot::empty(slot.arity));
    }

    let grammar = registry.grammar();
    let children = tree.children(node).iter().copied();
    let mut matches: SmallVec<[Child; 4]> = match &slot.item {
        SlotItem::Node(target) => children
            .filter(|child| matches!(child, Child::Node(n) if grammar.conforms_to(tree.kind(*n), target)))
            .collect(),
        SlotItem::Terminal(symbol) => {
            let token_type = grammar.vocabulary().token_type(symbol).ok_or_else(|| {
                Error::Configuration(format!("Unknown token name '{symbol}' in slot '{raw}'"))
            })?;
            children
                .filter(|child| matches!(child, Child::Token(t) if tree.token(*t).token_type == token_type))
                .collect()
        }
    };
    Ok(match slot.arity {
        Arity::Single => RawSlot::One(if matches.is_empty() { None } else { Some(matches.remove(0)) }),
        Arity::Multi => RawSlot::Many(matches),
    })
}

/// Raw name and descriptor of the slot behind `feature`: the nearest kind,
/// from `kind` up through its ancestors, declaring a slot under the raw name
/// its own rule maps `feature` to.
fn declared_slot<'g>(
    registry: &'g Registry,
    kind: &str,
    feature: &'g str,
) -> Option<(&'g str, &'g SlotDescriptor)> {
    let grammar = registry.grammar();
    let mut current = Some(kind);
    // Bounded like the grammar's own ancestor walks.
    for _ in 0..=grammar.descriptors().count() {
        let k = current?;
        let raw = registry.config().raw_slot_name(k, feature);
        if let Some(slot) = grammar.descriptor(k).and_then(|d| d.slot(raw)) {
            return Some((raw, slot));
        }
        current = grammar.parent_of(k);
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MappingConfig;
    use crate::grammar::{Grammar, NodeTypeDescriptor, SlotDescriptor};
    use crate::tree::TreeBuilder;

    const NAME: i32 = 1;
    const COMMA: i32 = 2;

    fn registry(config: MappingConfig) -> Registry {
        let grammar = Grammar::new("args")
            .with_token("NAME", NAME)
            .with_token("COMMA", COMMA)
            .with_kind(
                NodeTypeDescriptor::new("Arglist")
                    .with_slot(SlotDescriptor::child("Argument", Arity::Multi))
                    .with_slot(SlotDescriptor::token("COMMA", Arity::Multi))
                    .with_slot(SlotDescriptor::label("first", Arity::Single, SlotItem::Node("Argument".into()))),
            )
            .with_kind(NodeTypeDescriptor::new("Argument").with_slot(SlotDescriptor::token("NAME", Arity::Single)));
        Registry::new(grammar, config).unwrap()
    }

    fn tree(label_first: bool) -> ParseTree {
        let mut b = TreeBuilder::new();
        b.start_node("Arglist");
        if label_first {
            b.label("first");
        }
        b.start_node("Argument");
        b.token(NAME, "a");
        b.finish_node().unwrap();
        b.token(COMMA, ",");
        b.start_node("Argument");
        b.token(NAME, "b");
        b.finish_node().unwrap();
        b.finish_node().unwrap();
        b.finish().unwrap()
    }

    #[test]
    fn test_default_accessor_collects_children_by_kind() {
        let registry = registry(MappingConfig::default());
        let t = tree(false);
        let root = t.root().unwrap();
        let RawSlot::Many(args) = resolve_slot(&registry, &t, root, "argument").unwrap() else {
            panic!("expected a list");
        };
        assert_eq!(args.len(), 2);
        let RawSlot::Many(commas) = resolve_slot(&registry, &t, root, "COMMA").unwrap() else {
            panic!("expected a list");
        };
        assert_eq!(commas.len(), 1);
    }

    #[test]
    fn test_label_binding_wins_and_unbound_label_is_empty() {
        let registry = registry(MappingConfig::default());
        let bound = tree(true);
        let root = bound.root().unwrap();
        assert_eq!(
            resolve_slot(&registry, &bound, root, "first").unwrap(),
            RawSlot::One(Some(bound.children(root)[0]))
        );

        let unbound = tree(false);
        assert_eq!(
            resolve_slot(&registry, &unbound, unbound.root().unwrap(), "first").unwrap(),
            RawSlot::One(None)
        );
    }

    #[test]
    fn test_renamed_feature_resolves_raw_slot() {
        let registry = registry(MappingConfig::default().rename_slot("Arglist", "argument", "args"));
        let t = tree(false);
        let resolved = resolve_slot(&registry, &t, t.root().unwrap(), "args").unwrap();
        assert!(matches!(resolved, RawSlot::Many(ref args) if args.len() == 2));
    }

    #[test]
    fn test_unknown_accessor_is_a_configuration_error() {
        let registry = registry(MappingConfig::default());
        let t = tree(false);
        let err = resolve_slot(&registry, &t, t.root().unwrap(), "nope").unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
    }
}
