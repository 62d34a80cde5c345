//! DSL IR - Syntax tree model for the script runtime
//!
//! This crate contains the immutable data structures produced by a parser and
//! consumed by the evaluator and the function registry:
//! - Names for identifiers
//! - `NodeId` / `NodeRange` indices into a flat arena
//! - AST nodes (`Node`, `NodeKind`, operators)
//! - Pre-order traversal
//! - `AstBuilder` for constructing trees programmatically
//! - The `Parse` trait marking the boundary to an external parser
//!
//! # Design Philosophy
//!
//! - **Flatten Everything**: No `Box<Node>`, children are `NodeId(u32)` indices
//! - **Closed Node Set**: `Node` is a plain enum, so every consumer matches
//!   exhaustively over node kinds
//! - **Immutable After Build**: an `Ast` has no mutation API; share it with
//!   `SharedAst`

/// Compile-time assertion that a type has a specific size.
///
/// Used to prevent accidental size regressions in frequently-allocated types.
#[macro_export]
macro_rules! static_assert_size {
    ($ty:ty, $size:expr) => {
        const _: [(); $size] = [(); ::std::mem::size_of::<$ty>()];
    };
}

mod arena;
pub mod ast;
mod builder;
mod name;
mod node_id;
mod parse;
pub mod visitor;

pub use arena::{Ast, AstArena, SharedAst};
pub use ast::{AssignScope, BinaryOp, Node, NodeKind, Number, UnaryOp};
pub use builder::AstBuilder;
pub use name::Name;
pub use node_id::{NodeId, NodeRange};
pub use parse::{Parse, ParseFailure};
pub use visitor::PreOrder;
