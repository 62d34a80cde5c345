//! Flat AST node types.
//!
//! - No `Box<Node>`, children are `NodeId(u32)` indices into `AstArena`
//! - Ordered child lists are `NodeRange`s into the arena's list storage
//! - Optional children use `NodeId::INVALID`
//!
//! The node set mirrors the script grammar one-to-one: wrapper nodes such as
//! `Expression`, `PrimaryExpression` and `Statement` are kept rather than
//! collapsed, so a parser can emit exactly what it matched.

mod operators;

use std::fmt;

use crate::{Name, NodeId, NodeRange};

pub use operators::{BinaryOp, UnaryOp};

/// Numeric literal payload.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Number {
    Int(i64),
    Float(f64),
}

/// Where an assignment writes its binding.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
pub enum AssignScope {
    /// Update an existing local binding, or create one in the current
    /// activation.
    #[default]
    Local,
    /// Write the evaluator's global map (`global x = ...`).
    Global,
}

/// A syntax tree node.
///
/// A node's variant never changes after construction; an `Ast` has no
/// mutation API.
#[derive(Clone, Debug, PartialEq)]
pub enum Node {
    // Leaves
    /// Identifier reference.
    Name(Name),
    /// Comma-separated `Name` nodes (function parameters).
    NameList(NodeRange),
    /// Integer or float literal.
    Number(Number),
    /// `true` / `false`.
    Bool(bool),
    /// String literal.
    Str(Box<str>),

    // Structure
    /// Root of a script; `body` is a `Block`.
    Program { body: NodeId },
    /// Statements in document order.
    Block(NodeRange),

    // Expressions
    /// `target = value`; `target` is a `Name` node.
    Assignment {
        target: NodeId,
        value: NodeId,
        scope: AssignScope,
    },
    /// Expression wrapper.
    Expression(NodeId),
    /// Comma-separated expressions (call arguments).
    ExpressionList(NodeRange),
    /// Primary expression wrapper (name, literal, parenthesized expression).
    PrimaryExpression(NodeId),
    BinaryExpression {
        op: BinaryOp,
        left: NodeId,
        right: NodeId,
    },
    UnaryExpression {
        op: UnaryOp,
        operand: NodeId,
    },

    // Functions
    /// `function name(params) body end`.
    FunctionDefinition {
        name: NodeId,
        params: NodeId,
        body: NodeId,
    },
    /// Parameter list; `names` is a `NameList` or `INVALID` for `()`.
    FunctionParameterList { names: NodeId },
    /// `callee(args)`; `callee` is a `Name` node, `args` a
    /// `FunctionArgumentList`.
    FunctionCall { callee: NodeId, args: NodeId },
    /// Argument list; `exprs` is an `ExpressionList` or `INVALID` for `()`.
    FunctionArgumentList { exprs: NodeId },

    // Statements
    /// Statement wrapper.
    Statement(NodeId),
    /// `return [value]`.
    Return { value: NodeId },
    Break,
    /// `while cond do body end`.
    While { cond: NodeId, body: NodeId },
    /// `if cond then body [else ...] end`; `else_branch` is a `Block`, a
    /// nested `If` (else-if), or `INVALID`.
    If {
        cond: NodeId,
        then_branch: NodeId,
        else_branch: NodeId,
    },
    /// `for var = start, limit[, step] do body end`; `step` may be `INVALID`
    /// (defaults to 1).
    For {
        var: NodeId,
        start: NodeId,
        limit: NodeId,
        step: NodeId,
        body: NodeId,
    },
}

impl Node {
    /// The fieldless kind tag of this node.
    pub const fn kind(&self) -> NodeKind {
        match self {
            Node::Name(_) => NodeKind::Name,
            Node::NameList(_) => NodeKind::NameList,
            Node::Number(_) => NodeKind::NumberLiteral,
            Node::Bool(_) => NodeKind::BoolLiteral,
            Node::Str(_) => NodeKind::StringLiteral,
            Node::Program { .. } => NodeKind::Program,
            Node::Block(_) => NodeKind::Block,
            Node::Assignment { .. } => NodeKind::Assignment,
            Node::Expression(_) => NodeKind::Expression,
            Node::ExpressionList(_) => NodeKind::ExpressionList,
            Node::PrimaryExpression(_) => NodeKind::PrimaryExpression,
            Node::BinaryExpression { .. } => NodeKind::BinaryExpression,
            Node::UnaryExpression { .. } => NodeKind::UnaryExpression,
            Node::FunctionDefinition { .. } => NodeKind::FunctionDefinition,
            Node::FunctionParameterList { .. } => NodeKind::FunctionParameterList,
            Node::FunctionCall { .. } => NodeKind::FunctionCall,
            Node::FunctionArgumentList { .. } => NodeKind::FunctionArgumentList,
            Node::Statement(_) => NodeKind::Statement,
            Node::Return { .. } => NodeKind::Return,
            Node::Break => NodeKind::Break,
            Node::While { .. } => NodeKind::While,
            Node::If { .. } => NodeKind::If,
            Node::For { .. } => NodeKind::For,
        }
    }

    /// The identifier of a `Name` node.
    pub fn as_name(&self) -> Option<&Name> {
        match self {
            Node::Name(name) => Some(name),
            _ => None,
        }
    }
}

/// Node kind tag.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum NodeKind {
    Name,
    NameList,
    NumberLiteral,
    BoolLiteral,
    StringLiteral,
    Program,
    Block,
    Assignment,
    Expression,
    ExpressionList,
    PrimaryExpression,
    BinaryExpression,
    UnaryExpression,
    FunctionDefinition,
    FunctionParameterList,
    FunctionCall,
    FunctionArgumentList,
    Statement,
    Return,
    Break,
    While,
    If,
    For,
}

impl NodeKind {
    /// Human-readable name, used in diagnostics.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::NameList => "name list",
            Self::NumberLiteral => "number literal",
            Self::BoolLiteral => "bool literal",
            Self::StringLiteral => "string literal",
            Self::Program => "program",
            Self::Block => "block",
            Self::Assignment => "assignment",
            Self::Expression => "expression",
            Self::ExpressionList => "expression list",
            Self::PrimaryExpression => "primary expression",
            Self::BinaryExpression => "binary expression",
            Self::UnaryExpression => "unary expression",
            Self::FunctionDefinition => "function definition",
            Self::FunctionParameterList => "parameter list",
            Self::FunctionCall => "function call",
            Self::FunctionArgumentList => "argument list",
            Self::Statement => "statement",
            Self::Return => "return",
            Self::Break => "break",
            Self::While => "while",
            Self::If => "if",
            Self::For => "for",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
