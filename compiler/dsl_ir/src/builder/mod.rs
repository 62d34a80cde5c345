//! Programmatic tree construction.
//!
//! `AstBuilder` is what a parser drives to produce an `Ast`, and what hosts
//! and tests use to build trees without source text. Helpers allocate the
//! grammar's wrapper nodes (argument lists, parameter lists, blocks) so call
//! sites only describe the interesting parts.

use crate::{AssignScope, Ast, AstArena, BinaryOp, Name, Node, NodeId, Number, UnaryOp};

/// Incremental builder for one `Ast`.
#[derive(Debug, Default)]
pub struct AstBuilder {
    arena: AstArena,
}

impl AstBuilder {
    /// Create a builder with an empty arena.
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate an arbitrary node.
    pub fn alloc(&mut self, node: Node) -> NodeId {
        self.arena.alloc(node)
    }

    // Leaves

    pub fn name(&mut self, name: &str) -> NodeId {
        self.alloc(Node::Name(Name::new(name)))
    }

    pub fn int(&mut self, value: i64) -> NodeId {
        self.alloc(Node::Number(Number::Int(value)))
    }

    pub fn float(&mut self, value: f64) -> NodeId {
        self.alloc(Node::Number(Number::Float(value)))
    }

    pub fn bool(&mut self, value: bool) -> NodeId {
        self.alloc(Node::Bool(value))
    }

    pub fn string(&mut self, value: &str) -> NodeId {
        self.alloc(Node::Str(value.into()))
    }

    /// `Name` nodes wrapped in a `NameList`.
    pub fn name_list(&mut self, names: &[&str]) -> NodeId {
        let ids: Vec<NodeId> = names.iter().map(|name| self.name(name)).collect();
        let range = self.arena.alloc_list(ids);
        self.alloc(Node::NameList(range))
    }

    // Expressions

    /// `Expression` wrapper node.
    pub fn expr(&mut self, inner: NodeId) -> NodeId {
        self.alloc(Node::Expression(inner))
    }

    /// `PrimaryExpression` wrapper node.
    pub fn primary(&mut self, inner: NodeId) -> NodeId {
        self.alloc(Node::PrimaryExpression(inner))
    }

    pub fn expr_list(&mut self, exprs: &[NodeId]) -> NodeId {
        let range = self.arena.alloc_list(exprs.iter().copied());
        self.alloc(Node::ExpressionList(range))
    }

    pub fn binary(&mut self, op: BinaryOp, left: NodeId, right: NodeId) -> NodeId {
        self.alloc(Node::BinaryExpression { op, left, right })
    }

    pub fn unary(&mut self, op: UnaryOp, operand: NodeId) -> NodeId {
        self.alloc(Node::UnaryExpression { op, operand })
    }

    /// Fold a flat operator chain `first op1 x1 op2 x2 ...` into a tree by
    /// operator precedence. Equal precedence associates to the left.
    pub fn infix(&mut self, first: NodeId, rest: &[(BinaryOp, NodeId)]) -> NodeId {
        let mut operands = vec![first];
        let mut ops: Vec<BinaryOp> = Vec::with_capacity(rest.len());
        for &(op, rhs) in rest {
            while ops
                .last()
                .is_some_and(|top| top.precedence() <= op.precedence())
            {
                self.reduce(&mut operands, &mut ops);
            }
            ops.push(op);
            operands.push(rhs);
        }
        while !ops.is_empty() {
            self.reduce(&mut operands, &mut ops);
        }
        operands.pop().unwrap_or(first)
    }

    fn reduce(&mut self, operands: &mut Vec<NodeId>, ops: &mut Vec<BinaryOp>) {
        let (Some(op), Some(right), Some(left)) = (ops.pop(), operands.pop(), operands.pop())
        else {
            return;
        };
        let node = self.binary(op, left, right);
        operands.push(node);
    }

    /// `name = value` in the local scope.
    pub fn assign(&mut self, name: &str, value: NodeId) -> NodeId {
        let target = self.name(name);
        self.alloc(Node::Assignment {
            target,
            value,
            scope: AssignScope::Local,
        })
    }

    /// `global name = value`.
    pub fn assign_global(&mut self, name: &str, value: NodeId) -> NodeId {
        let target = self.name(name);
        self.alloc(Node::Assignment {
            target,
            value,
            scope: AssignScope::Global,
        })
    }

    /// `name(args...)`.
    pub fn call(&mut self, name: &str, args: &[NodeId]) -> NodeId {
        let callee = self.name(name);
        let exprs = if args.is_empty() {
            NodeId::INVALID
        } else {
            self.expr_list(args)
        };
        let args = self.alloc(Node::FunctionArgumentList { exprs });
        self.alloc(Node::FunctionCall { callee, args })
    }

    // Statements

    /// `Statement` wrapper node.
    pub fn statement(&mut self, inner: NodeId) -> NodeId {
        self.alloc(Node::Statement(inner))
    }

    pub fn block(&mut self, statements: &[NodeId]) -> NodeId {
        let range = self.arena.alloc_list(statements.iter().copied());
        self.alloc(Node::Block(range))
    }

    pub fn ret(&mut self, value: Option<NodeId>) -> NodeId {
        self.alloc(Node::Return {
            value: value.unwrap_or(NodeId::INVALID),
        })
    }

    pub fn brk(&mut self) -> NodeId {
        self.alloc(Node::Break)
    }

    pub fn while_loop(&mut self, cond: NodeId, body: &[NodeId]) -> NodeId {
        let body = self.block(body);
        self.alloc(Node::While { cond, body })
    }

    /// `if cond then ... [else ...] end`; `else_branch` is a block or another
    /// `if` node.
    pub fn if_then(
        &mut self,
        cond: NodeId,
        then_branch: &[NodeId],
        else_branch: Option<NodeId>,
    ) -> NodeId {
        let then_branch = self.block(then_branch);
        self.alloc(Node::If {
            cond,
            then_branch,
            else_branch: else_branch.unwrap_or(NodeId::INVALID),
        })
    }

    /// Numeric `for var = start, limit[, step] do ... end`.
    pub fn for_loop(
        &mut self,
        var: &str,
        start: NodeId,
        limit: NodeId,
        step: Option<NodeId>,
        body: &[NodeId],
    ) -> NodeId {
        let var = self.name(var);
        let body = self.block(body);
        self.alloc(Node::For {
            var,
            start,
            limit,
            step: step.unwrap_or(NodeId::INVALID),
            body,
        })
    }

    /// `function name(params...) body end`.
    pub fn function(&mut self, name: &str, params: &[&str], body: &[NodeId]) -> NodeId {
        let name = self.name(name);
        let names = if params.is_empty() {
            NodeId::INVALID
        } else {
            self.name_list(params)
        };
        let params = self.alloc(Node::FunctionParameterList { names });
        let body = self.block(body);
        self.alloc(Node::FunctionDefinition { name, params, body })
    }

    // Finishing

    /// Wrap top-level statements in `Program { Block }` and finish the tree.
    pub fn program(mut self, statements: &[NodeId]) -> Ast {
        let body = self.block(statements);
        let root = self.alloc(Node::Program { body });
        Ast::new(self.arena, root)
    }

    /// Finish the tree with an explicit root.
    pub fn finish(self, root: NodeId) -> Ast {
        Ast::new(self.arena, root)
    }
}
