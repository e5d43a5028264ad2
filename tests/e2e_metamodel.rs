//! End-to-end tests for metamodel derivation.
//!
//! Each test builds a small descriptor table, derives entities through the
//! `Registry`, and checks the resulting schema.

use grammar_metamodel::{
    render_metamodel, Arity, Error, Grammar, MappingConfig, Mapper, Multiplicity,
    NodeTypeDescriptor, Property, Registry, RelationKind, SlotDescriptor, SlotItem,
};
use pretty_assertions::assert_eq;

const NEWLINE: i32 = 1;
const NAME: i32 = 2;
const PLUS: i32 = 3;

fn single_input_grammar() -> Grammar {
    // single_input: simple_stmt | compound_stmt NEWLINE
    Grammar::new("python")
        .with_base_kind("ParserRuleContext")
        .with_token("NEWLINE", NEWLINE)
        .with_token("NAME", NAME)
        .with_kind(
            NodeTypeDescriptor::new("Single_input")
                .with_parent("ParserRuleContext")
                .with_slot(SlotDescriptor::child("Simple_stmt", Arity::Single))
                .with_slot(SlotDescriptor::child("Compound_stmt", Arity::Single))
                .with_slot(SlotDescriptor::token("NEWLINE", Arity::Single)),
        )
        .with_kind(
            NodeTypeDescriptor::new("Simple_stmt")
                .with_parent("ParserRuleContext")
                .with_slot(SlotDescriptor::token("NAME", Arity::Single))
                .with_slot(SlotDescriptor::token("NEWLINE", Arity::Single)),
        )
        .with_kind(
            NodeTypeDescriptor::new("Compound_stmt")
                .with_parent("ParserRuleContext")
                .with_slot(SlotDescriptor::child("Single_input", Arity::Multi)),
        )
}

fn names<T>(items: &[T], name: impl Fn(&T) -> &str) -> Vec<String> {
    items.iter().map(|i| name(i).to_owned()).collect()
}

// ============================================================================
// 1. Inheritance and identity
// ============================================================================

#[test]
fn test_parent_is_linked_and_marked_abstract() {
    let grammar = Grammar::new("expr")
        .with_token("NAME", NAME)
        .with_kind(NodeTypeDescriptor::new("Expr"))
        .with_kind(
            NodeTypeDescriptor::new("Atom")
                .with_parent("Expr")
                .with_slot(SlotDescriptor::token("NAME", Arity::Single)),
        );
    let registry = Registry::new(grammar, MappingConfig::default()).unwrap();

    let atom = registry.entity_for("Atom").unwrap();
    let expr = registry.get_entity("Expr").unwrap();
    assert_eq!(atom.parent, Some(expr));
    assert!(registry.entity(expr).is_abstract);
    assert!(!atom.is_abstract);
    assert_eq!(registry.ancestry(atom.id), vec![atom.id, expr]);
}

#[test]
fn test_base_kind_creates_no_entity() {
    let registry = Registry::new(single_input_grammar(), MappingConfig::default()).unwrap();
    let entity = registry.entity_for("Simple_stmt").unwrap();
    assert_eq!(entity.parent, None);
    assert!(registry.entity_id_for("ParserRuleContext").is_none());
}

#[test]
fn test_repeated_and_recursive_lookups_are_identical() {
    let registry = Registry::new(single_input_grammar(), MappingConfig::default()).unwrap();

    // Single_input -> Compound_stmt -> Single_input
    let first = registry.get_entity("Single_input").unwrap();
    let again = registry.get_entity("Single_input").unwrap();
    assert_eq!(first, again);

    let compound = registry.entity_for("Compound_stmt").unwrap();
    assert_eq!(compound.relation("single_input").unwrap().target, first);
    assert_eq!(registry.len(), 3);
}

#[test]
fn test_parent_reaching_its_subtype_is_not_built_twice() {
    // Expr holds a list of Exprs; Call extends Expr.
    let grammar = Grammar::new("calls")
        .with_kind(NodeTypeDescriptor::new("Expr").with_slot(SlotDescriptor::child("Call", Arity::Multi)))
        .with_kind(NodeTypeDescriptor::new("Call").with_parent("Expr"));
    let registry = Registry::new(grammar, MappingConfig::default()).unwrap();

    let call = registry.get_entity("Call").unwrap();
    let expr = registry.entity_for("Expr").unwrap();
    assert_eq!(expr.relation("call").unwrap().target, call);
    assert_eq!(registry.len(), 2);
}

#[test]
fn test_concurrent_warm_up_agrees() {
    let registry = Registry::new(single_input_grammar(), MappingConfig::default()).unwrap();
    let ids: Vec<_> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..4)
            .map(|_| scope.spawn(|| registry.get_entity("Compound_stmt").unwrap()))
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });
    assert!(ids.windows(2).all(|w| w[0] == w[1]));
    assert_eq!(registry.len(), 3);
}

// ============================================================================
// 2. Slots to features
// ============================================================================

#[test]
fn test_single_input_metamodel() {
    let registry = Registry::new(single_input_grammar(), MappingConfig::default()).unwrap();
    let entity = registry.entity_for("Single_input").unwrap();

    assert_eq!(
        names(entity.relations(), |r| &r.name),
        vec!["simple_stmt", "compound_stmt"]
    );
    for relation in entity.relations() {
        assert_eq!(relation.kind, RelationKind::Containment);
        assert_eq!(relation.multiplicity, Multiplicity::One);
        assert_eq!(relation.source, entity.id);
    }
    assert_eq!(entity.properties(), &[Property::string("NEWLINE", Multiplicity::One)]);
}

#[test]
fn test_default_slot_is_shadowed_by_labeled_sibling() {
    let grammar = Grammar::new("lists")
        .with_kind(NodeTypeDescriptor::new("X"))
        .with_kind(
            NodeTypeDescriptor::new("Pair")
                .with_slot(SlotDescriptor::child("X", Arity::Multi))
                .with_slot(SlotDescriptor::label("items", Arity::Multi, SlotItem::Node("X".into()))),
        )
        .with_kind(NodeTypeDescriptor::new("Wrapper").with_slot(SlotDescriptor::child("X", Arity::Single)));
    let registry = Registry::new(grammar, MappingConfig::default()).unwrap();

    let pair = registry.entity_for("Pair").unwrap();
    assert_eq!(names(pair.relations(), |r| &r.name), vec!["items"]);

    let wrapper = registry.entity_for("Wrapper").unwrap();
    assert_eq!(names(wrapper.relations(), |r| &r.name), vec!["x"]);
}

#[test]
fn test_dropped_kind_removes_relation() {
    let config = MappingConfig::default().mark_drop("Compound_stmt");
    let registry = Registry::new(single_input_grammar(), config).unwrap();
    let entity = registry.entity_for("Single_input").unwrap();

    assert!(entity.relation("compound_stmt").is_none());
    assert_eq!(names(entity.relations(), |r| &r.name), vec!["simple_stmt"]);
    assert!(matches!(registry.get_entity("Compound_stmt"), Err(Error::Configuration(_))));
}

#[test]
fn test_treat_as_token_becomes_string_property() {
    let config = MappingConfig::default().mark_treat_as_token("Simple_stmt");
    let registry = Registry::new(single_input_grammar(), config).unwrap();
    let entity = registry.entity_for("Single_input").unwrap();

    assert!(entity.relation("simple_stmt").is_none());
    assert_eq!(
        entity.property("simple_stmt"),
        Some(&Property::string("simple_stmt", Multiplicity::One))
    );
    assert!(registry.entity_id_for("Simple_stmt").is_none());
}

#[test]
fn test_transparent_chain_is_skipped_in_relations() {
    // Stmt -> Test (transparent) -> Or_test (transparent) -> Comparison
    let grammar = Grammar::new("tests")
        .with_token("NAME", NAME)
        .with_kind(NodeTypeDescriptor::new("Stmt").with_slot(SlotDescriptor::child("Test", Arity::Single)))
        .with_kind(NodeTypeDescriptor::new("Test").with_slot(SlotDescriptor::child("Or_test", Arity::Single)))
        .with_kind(
            NodeTypeDescriptor::new("Or_test").with_slot(SlotDescriptor::child("Comparison", Arity::Single)),
        )
        .with_kind(NodeTypeDescriptor::new("Comparison").with_slot(SlotDescriptor::token("NAME", Arity::Multi)));
    let config = MappingConfig::default().mark_transparent("Test").mark_transparent("Or_test");
    let registry = Registry::new(grammar, config).unwrap();

    let stmt = registry.entity_for("Stmt").unwrap();
    let comparison = registry.get_entity("Comparison").unwrap();
    let relation = stmt.relation("test").unwrap();
    assert_eq!(relation.target, comparison);
    assert!(registry.entity_id_for("Test").is_none());
    assert!(matches!(registry.get_entity("Test"), Err(Error::Configuration(_))));
}

#[test]
fn test_ignored_tokens_and_properties() {
    let config = MappingConfig::default()
        .ignore_token_kind("NEWLINE")
        .ignore_property("Simple_stmt", "NAME");
    let registry = Registry::new(single_input_grammar(), config).unwrap();

    assert!(registry.entity_for("Single_input").unwrap().properties().is_empty());
    assert!(registry.entity_for("Simple_stmt").unwrap().properties().is_empty());
}

#[test]
fn test_positions_come_first() {
    let config = MappingConfig::default().enable_positions(true);
    let registry = Registry::new(single_input_grammar(), config).unwrap();
    let entity = registry.entity_for("Simple_stmt").unwrap();
    assert_eq!(
        names(entity.properties(), |p| &p.name),
        vec!["startLine", "endLine", "startColumn", "endColumn", "NAME", "NEWLINE"]
    );
}

#[test]
fn test_alternatives_only_rule_is_abstract_and_empty() {
    // stmt: if_stmt #IfAlt | while_stmt #WhileAlt
    let grammar = Grammar::new("alts")
        .with_kind(NodeTypeDescriptor::new("Stmt"))
        .with_kind(
            NodeTypeDescriptor::new("IfAlt")
                .with_parent("Stmt")
                .with_slot(SlotDescriptor::child("If_stmt", Arity::Single)),
        )
        .with_kind(
            NodeTypeDescriptor::new("WhileAlt")
                .with_parent("Stmt")
                .with_slot(SlotDescriptor::child("While_stmt", Arity::Single)),
        )
        .with_kind(NodeTypeDescriptor::new("If_stmt"))
        .with_kind(NodeTypeDescriptor::new("While_stmt"));
    let registry = Registry::new(grammar, MappingConfig::default()).unwrap();
    assert_eq!(registry.register_all().unwrap(), 5);

    let stmt = registry.entity_for("Stmt").unwrap();
    assert!(stmt.is_abstract);
    assert!(stmt.properties().is_empty());
    assert!(stmt.relations().is_empty());
}

// ============================================================================
// 3. Configuration surface
// ============================================================================

#[test]
fn test_rename_entity_and_slot() {
    let config = MappingConfig::default()
        .rename_entity("Single_input", "SingleInput")
        .rename_slot("Single_input", "simple_stmt", "statement");
    let registry = Registry::new(single_input_grammar(), config).unwrap();
    let entity = registry.entity_for("Single_input").unwrap();

    assert_eq!(entity.name, "SingleInput");
    assert_eq!(entity.kind, "Single_input");
    assert!(entity.relation("statement").is_some());
    assert!(entity.relation("simple_stmt").is_none());
}

#[test]
fn test_duplicate_feature_name_fails_fast() {
    let config = MappingConfig::default().rename_slot("Simple_stmt", "NAME", "NEWLINE");
    let registry = Registry::new(single_input_grammar(), config).unwrap();
    let err = registry.get_entity("Simple_stmt").unwrap_err();
    assert!(matches!(err, Error::Configuration(ref msg) if msg.contains("NEWLINE")));
    // The failed build leaves nothing behind.
    assert!(registry.entity_id_for("Simple_stmt").is_none());
    assert!(registry.get_entity("Simple_stmt").is_err());
}

#[test]
fn test_relation_and_property_cannot_share_a_name() {
    let config = MappingConfig::default().rename_slot("Single_input", "NEWLINE", "simple_stmt");
    let registry = Registry::new(single_input_grammar(), config).unwrap();
    let err = registry.get_entity("Single_input").unwrap_err();
    assert!(matches!(err, Error::Configuration(ref msg) if msg.contains("simple_stmt")));
    // Every entity reached by the failed build is rolled back.
    assert!(registry.is_empty());
}

#[test]
fn test_force_include_token_label() {
    // sum: lhs=NAME op='+' rhs=NAME
    let grammar = Grammar::new("sum")
        .with_token("NAME", NAME)
        .with_token("PLUS", PLUS)
        .with_kind(
            NodeTypeDescriptor::new("Sum")
                .with_slot(SlotDescriptor::token("NAME", Arity::Multi))
                .with_slot(SlotDescriptor::label("op", Arity::Single, SlotItem::Terminal("PLUS".into()))),
        );

    let plain = Registry::new(grammar.clone(), MappingConfig::default()).unwrap();
    assert!(plain.entity_for("Sum").unwrap().property("op").is_none());

    let forced = Registry::new(grammar, MappingConfig::default().force_include_slot("Sum", "op")).unwrap();
    let sum = forced.entity_for("Sum").unwrap();
    assert_eq!(names(sum.properties(), |p| &p.name), vec!["NAME", "op"]);

    let unknown = Registry::new(
        single_input_grammar(),
        MappingConfig::default().force_include_slot("Simple_stmt", "nope"),
    )
    .unwrap();
    assert!(matches!(unknown.get_entity("Simple_stmt"), Err(Error::Configuration(_))));
}

#[test]
fn test_transparent_cycle_is_rejected() {
    let grammar = Grammar::new("loop")
        .with_kind(NodeTypeDescriptor::new("Holder").with_slot(SlotDescriptor::child("A", Arity::Single)))
        .with_kind(NodeTypeDescriptor::new("A").with_slot(SlotDescriptor::child("B", Arity::Single)))
        .with_kind(NodeTypeDescriptor::new("B").with_slot(SlotDescriptor::child("A", Arity::Single)));
    let config = MappingConfig::default().mark_transparent("A").mark_transparent("B");
    let registry = Registry::new(grammar, config).unwrap();
    assert!(matches!(registry.get_entity("Holder"), Err(Error::Configuration(_))));
}

#[test]
fn test_transparent_kind_needs_one_single_node_slot() {
    let config = MappingConfig::default().mark_transparent("Simple_stmt");
    let registry = Registry::new(single_input_grammar(), config).unwrap();
    assert!(matches!(registry.get_entity("Single_input"), Err(Error::Configuration(_))));
}

#[test]
fn test_depth_guard() {
    let grammar = Grammar::new("deep")
        .with_kind(NodeTypeDescriptor::new("A").with_slot(SlotDescriptor::child("B", Arity::Single)))
        .with_kind(NodeTypeDescriptor::new("B").with_slot(SlotDescriptor::child("C", Arity::Single)))
        .with_kind(NodeTypeDescriptor::new("C").with_slot(SlotDescriptor::child("D", Arity::Single)))
        .with_kind(NodeTypeDescriptor::new("D"));

    let shallow = Registry::new(grammar.clone(), MappingConfig::default().with_max_depth(2)).unwrap();
    assert!(matches!(shallow.get_entity("A"), Err(Error::DepthLimitExceeded { limit: 2 })));

    let deep_enough = Registry::new(grammar, MappingConfig::default().with_max_depth(3)).unwrap();
    assert!(deep_enough.get_entity("A").is_ok());
}

#[test]
fn test_unknown_ignored_token_fails_construction() {
    let config = MappingConfig::default().ignore_token_kind("INDENT");
    let err = Mapper::new(single_input_grammar(), config).unwrap_err();
    assert!(matches!(err, Error::Configuration(_)));
}

#[test]
fn test_grammar_and_config_from_json() {
    let grammar = Grammar::from_json(
        r#"{
            "name": "json",
            "tokens": { "NAME": 2 },
            "kinds": [
                { "name": "Call", "slots": [
                    { "name": "NAME", "arity": "Single",
                      "item": { "type": "Terminal", "name": "NAME" }, "accessor": "Default" },
                    { "name": "args", "arity": "Multi",
                      "item": { "type": "Node", "name": "Arg" }, "accessor": "Label" }
                ] },
                { "name": "Arg" }
            ]
        }"#,
    )
    .unwrap();
    let config = MappingConfig::from_json(r#"{ "entity_names": { "Call": "Invocation" } }"#).unwrap();
    let registry = Registry::new(grammar, config).unwrap();

    let call = registry.entity_for("Call").unwrap();
    assert_eq!(call.name, "Invocation");
    assert_eq!(names(call.relations(), |r| &r.name), vec!["args"]);
    assert_eq!(call.relation("args").unwrap().multiplicity, Multiplicity::Many);
}

// ============================================================================
// 4. Printer
// ============================================================================

#[test]
fn test_render_registered_metamodel() {
    let config = MappingConfig::default().ignore_token_kind("NEWLINE");
    let registry = Registry::new(single_input_grammar(), config).unwrap();
    registry.register_all().unwrap();

    let expected = "\
ENTITY Compound_stmt
    relation single_input -> Single_input*

ENTITY Simple_stmt
    property NAME -> STRING

ENTITY Single_input
    relation simple_stmt -> Simple_stmt
    relation compound_stmt -> Compound_stmt
";
    assert_eq!(render_metamodel(&registry, false), expected);
}
