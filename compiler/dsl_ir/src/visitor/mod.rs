//! Pre-order traversal over an `Ast`.
//!
//! Traversal uses an explicit work stack rather than recursion, so deeply
//! nested trees cannot overflow the native stack. Children are visited in
//! document order: the node itself first, then each child subtree left to
//! right.
//!
//! # Example
//!
//! ```text
//! let defs = ast
//!     .pre_order(ast.root())
//!     .filter(|(_, node)| node.kind() == NodeKind::FunctionDefinition)
//!     .count();
//! ```

use smallvec::SmallVec;

use crate::{Ast, Node, NodeId};

/// Iterator yielding `(id, node)` pairs in pre-order.
pub struct PreOrder<'ast> {
    ast: &'ast Ast,
    stack: SmallVec<[NodeId; 16]>,
}

impl<'ast> PreOrder<'ast> {
    /// Start a traversal at `start`. An absent or unknown start yields
    /// nothing.
    pub fn new(ast: &'ast Ast, start: NodeId) -> Self {
        let mut stack = SmallVec::new();
        if start.is_present() {
            stack.push(start);
        }
        PreOrder { ast, stack }
    }
}

impl<'ast> Iterator for PreOrder<'ast> {
    type Item = (NodeId, &'ast Node);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let id = self.stack.pop()?;
            let Some(node) = self.ast.get(id) else {
                continue;
            };
            // Reverse so the leftmost child is popped first.
            self.stack.extend(self.ast.children(id).into_iter().rev());
            return Some((id, node));
        }
    }
}

/// Invoke `f` on `start` and every descendant, in pre-order.
pub fn walk<'ast, F>(ast: &'ast Ast, start: NodeId, mut f: F)
where
    F: FnMut(NodeId, &'ast Node),
{
    for (id, node) in PreOrder::new(ast, start) {
        f(id, node);
    }
}

impl Ast {
    /// Pre-order iterator rooted at `start`.
    pub fn pre_order(&self, start: NodeId) -> PreOrder<'_> {
        PreOrder::new(self, start)
    }

    /// Visit every node of the tree, starting at the root, in pre-order.
    pub fn walk<'ast, F>(&'ast self, f: F)
    where
        F: FnMut(NodeId, &'ast Node),
    {
        walk(self, self.root(), f);
    }
}

#[cfg(test)]
mod tests;
