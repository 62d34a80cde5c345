//! Frames of the explicit evaluation stack.

use smallvec::SmallVec;

use dsl_ir::{NodeId, NodeKind};
use dsl_value::Value;

/// Lifecycle of a frame.
///
/// `Init -> Running -> {Waiting <-> Running} -> {Success | Error}`
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum FrameState {
    /// Pushed, not yet started.
    Init,
    /// Waiting on a child frame, or about to schedule the next one.
    Running,
    /// Suspended at a yielding host call; the host resumes it with `run`.
    Waiting,
    Success,
    Error,
}

/// Control-flow outcome a finished frame hands to its parent.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
pub enum Signal {
    #[default]
    Normal,
    /// `break`; consumed by the innermost loop.
    Break,
    /// `return`; consumed by the enclosing function activation.
    Return,
}

/// One in-progress evaluation of one node.
#[derive(Clone, Debug)]
pub struct Frame {
    pub(super) node: NodeId,
    pub(super) kind: NodeKind,
    /// Index into the evaluator's activation stack; selects the tree the
    /// node belongs to.
    pub(super) activation: u32,
    pub(super) state: FrameState,
    /// Which child is pending, per node kind.
    pub(super) progress: u32,
    pub(super) result: Option<Value>,
    /// Already-evaluated child values (operands, list elements, loop
    /// bounds).
    pub(super) operands: SmallVec<[Value; 4]>,
    pub(super) signal: Signal,
    /// Outcome of the child that just finished.
    pub(super) inbox: Option<Delivery>,
}

impl Frame {
    pub(super) fn new(node: NodeId, kind: NodeKind, activation: u32) -> Self {
        Frame {
            node,
            kind,
            activation,
            state: FrameState::Init,
            progress: 0,
            result: None,
            operands: SmallVec::new(),
            signal: Signal::Normal,
            inbox: None,
        }
    }

    pub fn node(&self) -> NodeId {
        self.node
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    pub fn state(&self) -> FrameState {
        self.state
    }

    pub fn progress(&self) -> u32 {
        self.progress
    }

    /// The value computed so far (the final value once `Success`).
    pub fn result(&self) -> Option<&Value> {
        self.result.as_ref()
    }

    pub fn signal(&self) -> Signal {
        self.signal
    }

    pub(super) fn finish(&mut self, result: Option<Value>) {
        self.result = result;
        self.state = FrameState::Success;
    }

    pub(super) fn finish_with(&mut self, signal: Signal, result: Option<Value>) {
        self.signal = signal;
        self.finish(result);
    }

    /// Package this finished frame's outcome for its parent.
    pub(super) fn into_delivery(self) -> Delivery {
        let payload = if collects_values(self.kind) {
            Payload::Values(self.operands)
        } else {
            match self.result {
                Some(value) => Payload::Value(value),
                None => Payload::Nothing,
            }
        };
        Delivery {
            payload,
            signal: self.signal,
        }
    }
}

/// List nodes deliver every element instead of a single value.
fn collects_values(kind: NodeKind) -> bool {
    matches!(
        kind,
        NodeKind::ExpressionList | NodeKind::NameList | NodeKind::FunctionArgumentList
    )
}

#[derive(Clone, Debug)]
pub(super) enum Payload {
    Nothing,
    Value(Value),
    Values(SmallVec<[Value; 4]>),
}

/// A finished child's outcome, waiting in its parent's inbox.
#[derive(Clone, Debug)]
pub(super) struct Delivery {
    pub(super) payload: Payload,
    pub(super) signal: Signal,
}

impl Delivery {
    pub(super) fn into_value(self) -> Option<Value> {
        match self.payload {
            Payload::Value(value) => Some(value),
            Payload::Nothing | Payload::Values(_) => None,
        }
    }

    pub(super) fn into_values(self) -> SmallVec<[Value; 4]> {
        match self.payload {
            Payload::Values(values) => values,
            Payload::Value(value) => SmallVec::from_elem(value, 1),
            Payload::Nothing => SmallVec::new(),
        }
    }
}
