//! Integration tests for the node contract.
//!
//! Covers:
//! - defaults of the bare interface
//! - direct evaluation of the reference variants against a scope tree
//! - forward references between scopes
//! - structural search with `find` and `matches`
//! - rendering

use mexpr_node::{
    AssignmentNode, BlockEntry, BlockNode, ConstantNode, Environment, Filter, FunctionNode, Node,
    NodeKind, OperatorNode, SymbolNode,
};
use mexpr_scope::{ScopeId, ScopeTree};
use mexpr_types::{ExprError, Value};
use pretty_assertions::assert_eq;

// ══════════════════════════════════════════════════════════════════════════════
// Helpers
// ══════════════════════════════════════════════════════════════════════════════

#[derive(Debug)]
struct Bare;

impl Node for Bare {}

fn num(n: f64) -> Value {
    Value::Number(n)
}

fn constant(n: f64) -> Box<dyn Node> {
    Box::new(ConstantNode::new(n))
}

fn symbol(t: &mut ScopeTree, scope: ScopeId, name: &str) -> Box<dyn Node> {
    Box::new(SymbolNode::new(t, scope, name))
}

fn add(lhs: Box<dyn Node>, rhs: Box<dyn Node>) -> Box<dyn Node> {
    Box::new(OperatorNode::binary("+", "add", lhs, rhs))
}

fn mul(lhs: Box<dyn Node>, rhs: Box<dyn Node>) -> Box<dyn Node> {
    Box::new(OperatorNode::binary("*", "multiply", lhs, rhs))
}

/// `total = sin(x) + pi`
fn sample(t: &mut ScopeTree) -> Box<dyn Node> {
    let root = t.root();
    let x = symbol(t, root, "x");
    let sin: Box<dyn Node> = Box::new(FunctionNode::new(t, root, "sin", vec![x]));
    let pi = symbol(t, root, "pi");
    let expr = add(sin, pi);
    Box::new(AssignmentNode::new(t, root, "total", expr))
}

// ══════════════════════════════════════════════════════════════════════════════
// Bare interface
// ══════════════════════════════════════════════════════════════════════════════

#[test]
fn bare_node_cannot_be_evaluated() {
    let mut t = ScopeTree::default();
    assert_eq!(
        Bare.eval(&mut t),
        Err(ExprError::UnsupportedOperation("Node".into()))
    );
}

#[test]
fn bare_node_cannot_be_compiled() {
    let err = Bare.compile(&Environment::default()).unwrap_err();
    assert_eq!(err, ExprError::CannotCompile("Node".into()));
}

#[test]
fn bare_node_renders_empty() {
    assert_eq!(Bare.render(), "");
    let node: &dyn Node = &Bare;
    assert_eq!(format!("{node}"), "");
}

#[test]
fn bare_node_is_only_a_node() {
    assert_eq!(Bare.kind(), NodeKind::Node);
    assert!(Bare.is_a(NodeKind::Node));
    assert!(!Bare.is_a(NodeKind::Constant));
    assert!(Bare.children().is_empty());
    assert!(Bare.matches(&Filter::new()));
    assert!(!Bare.matches(&Filter::of(NodeKind::Symbol)));
}

// ══════════════════════════════════════════════════════════════════════════════
// Direct evaluation
// ══════════════════════════════════════════════════════════════════════════════

#[test]
fn constant_evaluates_to_itself() {
    let mut t = ScopeTree::default();
    assert_eq!(ConstantNode::new(2.5).eval(&mut t), Ok(num(2.5)));
    assert_eq!(ConstantNode::new(true).eval(&mut t), Ok(Value::Bool(true)));
}

#[test]
fn operator_delegates_to_its_builtin() {
    let mut t = ScopeTree::default();
    let expr = mul(add(constant(1.0), constant(2.0)), constant(4.0));
    assert_eq!(expr.eval(&mut t), Ok(num(12.0)));

    let neg = OperatorNode::unary("-", "unaryMinus", constant(4.0));
    assert_eq!(neg.eval(&mut t), Ok(num(-4.0)));
}

#[test]
fn operator_with_unknown_builtin_is_unresolved() {
    let mut t = ScopeTree::default();
    let expr = OperatorNode::binary("?", "nope", constant(1.0), constant(2.0));
    assert_eq!(
        expr.eval(&mut t),
        Err(ExprError::UnresolvedSymbol("nope".into()))
    );
}

#[test]
fn builtin_function_call_at_the_root() {
    let mut t = ScopeTree::default();
    let root = t.root();
    let call = FunctionNode::new(&mut t, root, "sin", vec![constant(0.0)]);
    assert_eq!(call.eval(&mut t), Ok(num(0.0)));
    assert!(t.has_def(root, "sin"));
}

#[test]
fn calling_a_constant_is_a_type_mismatch() {
    let mut t = ScopeTree::default();
    let root = t.root();
    let call = FunctionNode::new(&mut t, root, "pi", vec![constant(1.0)]);
    assert!(matches!(call.eval(&mut t), Err(ExprError::TypeMismatch(_))));
}

#[test]
fn unknown_symbol_fails_at_evaluation_not_construction() {
    let mut t = ScopeTree::default();
    let root = t.root();
    let node = SymbolNode::new(&mut t, root, "foo");
    assert_eq!(
        node.eval(&mut t),
        Err(ExprError::UnresolvedSymbol("foo".into()))
    );
}

#[test]
fn assignment_binds_its_value() {
    let mut t = ScopeTree::default();
    let root = t.root();
    let assign = AssignmentNode::new(&mut t, root, "width", constant(3.0));
    let read = SymbolNode::new(&mut t, root, "width");
    assert_eq!(read.symbol(), assign.symbol());

    assert_eq!(read.eval(&mut t), Err(ExprError::UnresolvedSymbol("width".into())));
    assert_eq!(assign.eval(&mut t), Ok(num(3.0)));
    assert_eq!(read.eval(&mut t), Ok(num(3.0)));
}

#[test]
fn child_scope_sees_definition_made_after_it() {
    let mut t = ScopeTree::default();
    let root = t.root();
    let child = t.create_nested_scope(root);

    // the read is registered before anything defines `width`
    let read = SymbolNode::new(&mut t, child, "width");
    let assign = AssignmentNode::new(&mut t, root, "width", constant(3.0));

    assign.eval(&mut t).unwrap();
    assert_eq!(read.eval(&mut t), Ok(num(3.0)));
}

#[test]
fn child_scope_sees_definition_after_init() {
    let mut t = ScopeTree::default();
    let root = t.root();
    let assign = AssignmentNode::new(&mut t, root, "width", constant(3.0));
    let child = t.create_nested_scope(root);
    let read = SymbolNode::new(&mut t, child, "width");

    t.init(root);
    assign.eval(&mut t).unwrap();
    assert_eq!(read.eval(&mut t), Ok(num(3.0)));
}

#[test]
fn block_returns_visible_results() {
    let mut t = ScopeTree::default();
    let root = t.root();
    let assign: Box<dyn Node> = Box::new(AssignmentNode::new(&mut t, root, "width", constant(3.0)));
    let read = symbol(&mut t, root, "width");
    let doubled = mul(symbol(&mut t, root, "width"), constant(2.0));
    let block = BlockNode::new(vec![
        BlockEntry::hidden(assign),
        BlockEntry::visible(read),
        BlockEntry::visible(doubled),
    ]);
    assert_eq!(
        block.eval(&mut t),
        Ok(Value::List(vec![num(3.0), num(6.0)]))
    );
}

#[test]
fn error_in_block_stops_evaluation() {
    let mut t = ScopeTree::default();
    let root = t.root();
    let missing = symbol(&mut t, root, "foo");
    let assign: Box<dyn Node> = Box::new(AssignmentNode::new(&mut t, root, "width", constant(1.0)));
    let block = BlockNode::new(vec![BlockEntry::visible(missing), BlockEntry::hidden(assign)]);
    assert!(block.eval(&mut t).is_err());
    assert_eq!(t.lookup(root, "width"), Err(ExprError::UnresolvedSymbol("width".into())));
}

// ══════════════════════════════════════════════════════════════════════════════
// find / matches
// ══════════════════════════════════════════════════════════════════════════════

#[test]
fn find_by_kind_in_pre_order() {
    let mut t = ScopeTree::default();
    let tree = sample(&mut t);
    let found: Vec<String> = tree
        .find(&Filter::of(NodeKind::Symbol))
        .iter()
        .map(|n| n.render())
        .collect();
    assert_eq!(found, vec!["x", "pi"]);
}

#[test]
fn find_includes_the_root_itself() {
    let mut t = ScopeTree::default();
    let tree = sample(&mut t);
    let kinds: Vec<NodeKind> = tree.find(&Filter::new()).iter().map(|n| n.kind()).collect();
    assert_eq!(
        kinds,
        vec![
            NodeKind::Assignment,
            NodeKind::Operator,
            NodeKind::Function,
            NodeKind::Symbol,
            NodeKind::Symbol,
        ]
    );
    assert_eq!(tree.find(&Filter::of(NodeKind::Node)).len(), 5);
}

#[test]
fn find_by_property() {
    let mut t = ScopeTree::default();
    let tree = sample(&mut t);
    let found = tree.find(&Filter::of(NodeKind::Symbol).prop("name", "x"));
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].render(), "x");

    assert_eq!(tree.find(&Filter::new().prop("name", "total")).len(), 1);
    assert_eq!(tree.find(&Filter::new().prop("fn", "add")).len(), 1);
    assert!(tree.find(&Filter::new().prop("name", "y")).is_empty());
}

#[test]
fn find_on_a_concrete_node() {
    let mut t = ScopeTree::default();
    let root = t.root();
    let read = symbol(&mut t, root, "width");
    let block = BlockNode::new(vec![
        BlockEntry::visible(read),
        BlockEntry::visible(add(constant(1.0), constant(2.0))),
    ]);
    assert_eq!(block.find(&Filter::of(NodeKind::Constant)).len(), 2);
    assert_eq!(block.find(&Filter::of(NodeKind::Block)).len(), 1);

    let leaf = ConstantNode::new(4.0);
    let found = leaf.find(&Filter::new());
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].render(), "4");
}

#[test]
fn property_match_is_loose() {
    let node = ConstantNode::new(2.0);
    assert!(node.matches(&Filter::of(NodeKind::Constant).prop("value", "2")));
    assert!(node.matches(&Filter::new().prop("value", 2)));
    assert!(!node.matches(&Filter::new().prop("value", 3)));
    assert!(!node.matches(&Filter::new().prop("missing", 2)));
}

// ══════════════════════════════════════════════════════════════════════════════
// Rendering
// ══════════════════════════════════════════════════════════════════════════════

#[test]
fn render_reference_variants() {
    let mut t = ScopeTree::default();
    assert_eq!(sample(&mut t).render(), "total = sin(x) + pi");

    let nested = mul(add(constant(1.0), constant(2.0)), constant(3.0));
    assert_eq!(nested.render(), "(1 + 2) * 3");
    assert_eq!(format!("{nested}"), "(1 + 2) * 3");

    let neg = OperatorNode::unary("-", "unaryMinus", constant(4.0));
    assert_eq!(neg.render(), "-4");
}

#[test]
fn render_block_marks_hidden_entries() {
    let mut t = ScopeTree::default();
    let root = t.root();
    let assign: Box<dyn Node> = Box::new(AssignmentNode::new(&mut t, root, "width", constant(3.0)));
    let read = symbol(&mut t, root, "width");
    let block = BlockNode::new(vec![BlockEntry::hidden(assign), BlockEntry::visible(read)]);
    assert_eq!(block.render(), "width = 3;\nwidth");
}
