use super::*;
use crate::{AstBuilder, BinaryOp, NodeKind};
use pretty_assertions::assert_eq;

fn kinds(ast: &Ast, start: NodeId) -> Vec<NodeKind> {
    ast.pre_order(start).map(|(_, node)| node.kind()).collect()
}

#[test]
fn test_pre_order_document_order() {
    // x = 1 + 2
    let mut b = AstBuilder::new();
    let one = b.int(1);
    let two = b.int(2);
    let sum = b.binary(BinaryOp::Add, one, two);
    let assign = b.assign("x", sum);
    let ast = b.program(&[assign]);

    assert_eq!(
        kinds(&ast, ast.root()),
        vec![
            NodeKind::Program,
            NodeKind::Block,
            NodeKind::Assignment,
            NodeKind::Name,
            NodeKind::BinaryExpression,
            NodeKind::NumberLiteral,
            NodeKind::NumberLiteral,
        ]
    );

    let ids: Vec<NodeId> = ast.pre_order(sum).map(|(id, _)| id).collect();
    assert_eq!(ids, vec![sum, one, two]);
}

#[test]
fn test_walk_visits_every_node_once() {
    let mut b = AstBuilder::new();
    let x = b.name("x");
    let ret = b.ret(Some(x));
    let def = b.function("id", &["x"], &[ret]);
    let arg = b.int(3);
    let call = b.call("id", &[arg]);
    let ast = b.program(&[def, call]);

    let mut seen = Vec::new();
    ast.walk(|id, _| seen.push(id));
    let mut unique = seen.clone();
    unique.sort_by_key(|id| id.index());
    unique.dedup();
    assert_eq!(seen.len(), unique.len());
    assert_eq!(seen.len(), ast.node_count());
}

#[test]
fn test_walk_finds_nested_definitions() {
    let mut b = AstBuilder::new();
    let inner = b.function("inner", &[], &[]);
    let outer = b.function("outer", &[], &[inner]);
    let ast = b.program(&[outer]);

    let mut names = Vec::new();
    ast.walk(|_, node| {
        if let Node::FunctionDefinition { name, .. } = node {
            if let Some(name) = ast.name_of(*name) {
                names.push(name.as_str().to_owned());
            }
        }
    });
    assert_eq!(names, vec!["outer".to_owned(), "inner".to_owned()]);
}

#[test]
fn test_invalid_start_is_empty() {
    let ast = AstBuilder::new().program(&[]);
    assert_eq!(ast.pre_order(NodeId::INVALID).count(), 0);
    assert_eq!(ast.pre_order(NodeId::new(99)).count(), 0);
}

#[test]
fn test_deep_nesting_does_not_recurse() {
    let mut b = AstBuilder::new();
    let mut expr = b.int(0);
    for _ in 0..50_000 {
        expr = b.expr(expr);
    }
    let ast = b.finish(expr);
    assert_eq!(ast.pre_order(ast.root()).count(), 50_001);
}
