//! Node arena and the immutable `Ast` handle.
//!
//! All nodes of one script live in a single `AstArena`; children are
//! `NodeId` indices and ordered child lists are `NodeRange`s into a flat
//! `Vec<NodeId>`. Once an `Ast` is built it is shared read-only between the
//! registry and any number of evaluators via `SharedAst`.

use std::sync::Arc;

use smallvec::SmallVec;

use crate::{Name, Node, NodeId, NodeRange};

/// Append-only storage for nodes and child lists.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AstArena {
    nodes: Vec<Node>,
    lists: Vec<NodeId>,
    /// Set once an allocation no longer fits a `u32` index.
    capacity_exceeded: bool,
}

impl AstArena {
    /// Create an empty arena.
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a node and return its ID.
    ///
    /// Past `u32::MAX - 1` nodes the node is dropped, `INVALID` is returned
    /// and the arena reports [`capacity_exceeded`](Self::capacity_exceeded).
    pub fn alloc(&mut self, node: Node) -> NodeId {
        match u32::try_from(self.nodes.len()) {
            Ok(index) if index != u32::MAX => {
                self.nodes.push(node);
                NodeId::new(index)
            }
            _ => {
                self.capacity_exceeded = true;
                NodeId::INVALID
            }
        }
    }

    /// Store an ordered child list and return its range.
    ///
    /// A list that would end past `u32::MAX` entries is discarded and marks
    /// the arena as over capacity.
    pub fn alloc_list(&mut self, ids: impl IntoIterator<Item = NodeId>) -> NodeRange {
        let start = self.lists.len();
        self.lists.extend(ids);
        let Ok(end) = u32::try_from(self.lists.len()) else {
            self.lists.truncate(start);
            self.capacity_exceeded = true;
            return NodeRange::EMPTY;
        };
        // `start <= end`, so both fit.
        let start = u32::try_from(start).unwrap_or(end);
        NodeRange::new(start, end - start)
    }

    /// Whether an allocation was dropped for lack of index space. A tree
    /// built from such an arena is incomplete.
    pub fn capacity_exceeded(&self) -> bool {
        self.capacity_exceeded
    }

    /// Get a node by ID.
    #[inline]
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    /// Get the IDs stored in a range. Out-of-bounds ranges yield an empty
    /// slice.
    #[inline]
    pub fn list(&self, range: NodeRange) -> &[NodeId] {
        let start = range.start as usize;
        self.lists.get(start..start + range.len()).unwrap_or(&[])
    }

    /// Number of allocated nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if no nodes were allocated.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// A complete, immutable syntax tree.
#[derive(Clone, Debug, PartialEq)]
pub struct Ast {
    arena: AstArena,
    root: NodeId,
}

/// Thread-safe shared handle to an immutable `Ast`.
pub type SharedAst = Arc<Ast>;

impl Ast {
    /// Wrap a populated arena with its root node.
    pub fn new(arena: AstArena, root: NodeId) -> Self {
        Ast { arena, root }
    }

    /// Move this tree into a shared handle.
    pub fn into_shared(self) -> SharedAst {
        Arc::new(self)
    }

    /// The root node ID (a `Program` when produced by a parser).
    #[inline]
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Get a node by ID.
    #[inline]
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.arena.get(id)
    }

    /// Get the IDs stored in a range.
    #[inline]
    pub fn list(&self, range: NodeRange) -> &[NodeId] {
        self.arena.list(range)
    }

    /// The identifier of a `Name` node.
    pub fn name_of(&self, id: NodeId) -> Option<&Name> {
        self.get(id).and_then(Node::as_name)
    }

    /// Number of nodes in the tree's arena.
    pub fn node_count(&self) -> usize {
        self.arena.len()
    }

    /// Whether building this tree ran out of arena index space.
    pub fn capacity_exceeded(&self) -> bool {
        self.arena.capacity_exceeded()
    }

    /// Ordered children of a node, in document order.
    ///
    /// Absent optional children (`NodeId::INVALID`) are skipped. An unknown
    /// ID has no children.
    pub fn children(&self, id: NodeId) -> SmallVec<[NodeId; 4]> {
        let mut out = SmallVec::new();
        let Some(node) = self.get(id) else {
            return out;
        };
        let mut push = |child: NodeId| {
            if child.is_present() {
                out.push(child);
            }
        };
        match node {
            Node::Name(_) | Node::Number(_) | Node::Bool(_) | Node::Str(_) | Node::Break => {}
            Node::NameList(range) | Node::Block(range) | Node::ExpressionList(range) => {
                for &child in self.list(*range) {
                    push(child);
                }
            }
            Node::Program { body } => push(*body),
            Node::Assignment { target, value, .. } => {
                push(*target);
                push(*value);
            }
            Node::Expression(inner) | Node::PrimaryExpression(inner) | Node::Statement(inner) => {
                push(*inner);
            }
            Node::BinaryExpression { left, right, .. } => {
                push(*left);
                push(*right);
            }
            Node::UnaryExpression { operand, .. } => push(*operand),
            Node::FunctionDefinition { name, params, body } => {
                push(*name);
                push(*params);
                push(*body);
            }
            Node::FunctionParameterList { names } => push(*names),
            Node::FunctionCall { callee, args } => {
                push(*callee);
                push(*args);
            }
            Node::FunctionArgumentList { exprs } => push(*exprs),
            Node::Return { value } => push(*value),
            Node::While { cond, body } => {
                push(*cond);
                push(*body);
            }
            Node::If {
                cond,
                then_branch,
                else_branch,
            } => {
                push(*cond);
                push(*then_branch);
                push(*else_branch);
            }
            Node::For {
                var,
                start,
                limit,
                step,
                body,
            } => {
                push(*var);
                push(*start);
                push(*limit);
                push(*step);
                push(*body);
            }
        }
        out
    }
}
