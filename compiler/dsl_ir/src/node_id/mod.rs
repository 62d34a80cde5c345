//! Arena handles.
//!
//! Nodes refer to each other by `NodeId`, and ordered child lists (block
//! statements, argument and name lists) are `NodeRange`s into the arena's
//! shared list storage.

use std::fmt;

/// Index of a node in its tree's arena.
///
/// Optional children (no arguments, no `else`, bare `return`) hold
/// [`NodeId::INVALID`]; `Node` stays free of `Option` wrappers.
#[derive(Copy, Clone, Eq, PartialEq, Hash)]
#[repr(transparent)]
pub struct NodeId(u32);

crate::static_assert_size!(NodeId, 4);

impl NodeId {
    /// Marks an absent child. Never handed out by the arena.
    pub const INVALID: NodeId = NodeId(u32::MAX);

    #[inline]
    pub const fn new(index: u32) -> Self {
        NodeId(index)
    }

    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// Whether this refers to an actual child rather than `INVALID`.
    #[inline]
    pub const fn is_present(self) -> bool {
        self.0 != u32::MAX
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_present() {
            write!(f, "NodeId({})", self.0)
        } else {
            f.write_str("NodeId::INVALID")
        }
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_present() {
            write!(f, "#{}", self.0)
        } else {
            f.write_str("#invalid")
        }
    }
}

impl Default for NodeId {
    fn default() -> Self {
        Self::INVALID
    }
}

/// `len` consecutive entries of the arena's list storage, from `start`.
#[derive(Copy, Clone, Eq, PartialEq, Hash)]
pub struct NodeRange {
    pub start: u32,
    pub len: u32,
}

crate::static_assert_size!(NodeRange, 8);

impl NodeRange {
    pub const EMPTY: NodeRange = NodeRange { start: 0, len: 0 };

    #[inline]
    pub const fn new(start: u32, len: u32) -> Self {
        NodeRange { start, len }
    }

    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub const fn len(&self) -> usize {
        self.len as usize
    }
}

impl fmt::Debug for NodeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeRange({}+{})", self.start, self.len)
    }
}

impl Default for NodeRange {
    fn default() -> Self {
        Self::EMPTY
    }
}
