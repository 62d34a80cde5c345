//! Resumable, non-recursive evaluator.
//!
//! Evaluation state lives entirely in an explicit stack of [`Frame`]s, never
//! on the native call stack. `step()` performs exactly one transition of the
//! top frame:
//!
//! - `Init`: a leaf computes its value and succeeds; any other node
//!   schedules its first child and becomes `Running`.
//! - `Running`: consume the outcome of the child that just finished,
//!   advance `progress`, then schedule the next child or succeed.
//! - `Waiting`: resume after a suspension point and succeed.
//! - `Success`: pop, and hand the outcome to the parent (or complete).
//!
//! An error marks the top frame `Error` and ends the run. Frames are left in
//! place for inspection and every later `step`/`run` reports the same error.
//!
//! # Activations
//!
//! Each script function call pushes an activation (the callee's tree and
//! script id) and a local scope. Frames record which activation they belong
//! to, so a call frame keeps reading its caller's tree while the callee's
//! body runs on top of it.

mod advance;
mod builder;
mod frame;

use std::sync::Arc;

use tracing::{debug, trace};

use dsl_ir::{Name, NodeId, SharedAst};
use dsl_value::{IntoValue, Value};

use crate::registry::{Registry, ScriptId};
use crate::{break_outside_loop, malformed_tree, Environment, EvalError, EvalResult};

pub use builder::{EvalConfig, EvaluatorBuilder};
pub use frame::{Frame, FrameState, Signal};

use frame::Delivery;

/// Outcome of `step`, `run` or `run_for`.
#[derive(Clone, Debug, PartialEq)]
pub enum RunStatus {
    /// More steps remain.
    Pending,
    /// Stopped at a yielding host call; `run` again to resume.
    Suspended(Suspension),
    /// Finished. A program yields the value of a top-level `return`, if any;
    /// a function call always yields a value.
    Completed(Option<Value>),
}

/// The yielding host call an evaluator is suspended at.
#[derive(Clone, Debug, PartialEq)]
pub struct Suspension {
    pub function: Name,
    /// The value the host function returned (e.g. the delay `wait` was
    /// asked for). Becomes the call's result unless replaced with
    /// `resume_with`.
    pub value: Value,
}

/// What the evaluator was built to run.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Entry {
    Program,
    Function,
}

/// Tree and script a group of frames evaluates in.
#[derive(Clone, Debug)]
struct Activation {
    script: ScriptId,
    ast: SharedAst,
    function: Option<Name>,
}

/// What a handler wants done after advancing a frame.
enum Step {
    /// Evaluate a child in the frame's own activation.
    Push(NodeId),
    /// Evaluate a function body in a freshly entered activation.
    Enter(NodeId),
    /// The frame finished (its state is already `Success`).
    Finish,
    Suspend(Suspension),
}

/// Explicit-stack evaluator for one script program or function call.
pub struct Evaluator {
    registry: Registry,
    config: EvalConfig,
    env: Environment,
    frames: Vec<Frame>,
    activations: Vec<Activation>,
    entry: Entry,
    call_depth: usize,
    result: Option<Value>,
    completed: bool,
    error: Option<EvalError>,
    resume: Option<Value>,
    steps: u64,
}

impl Evaluator {
    fn new(
        registry: Registry,
        config: EvalConfig,
        env: Environment,
        entry: Entry,
        root: Activation,
    ) -> Self {
        Evaluator {
            registry,
            config,
            env,
            frames: Vec::new(),
            activations: vec![root],
            entry,
            call_depth: 0,
            result: None,
            completed: false,
            error: None,
            resume: None,
            steps: 0,
        }
    }

    /// Run until completion, suspension or error.
    pub fn run(&mut self) -> EvalResult<RunStatus> {
        loop {
            match self.step()? {
                RunStatus::Pending => {}
                status => return Ok(status),
            }
        }
    }

    /// Run at most `budget` steps. Returns `Pending` when the budget runs
    /// out first.
    pub fn run_for(&mut self, budget: usize) -> EvalResult<RunStatus> {
        for _ in 0..budget {
            match self.step()? {
                RunStatus::Pending => {}
                status => return Ok(status),
            }
        }
        Ok(RunStatus::Pending)
    }

    /// Perform one frame transition.
    pub fn step(&mut self) -> EvalResult<RunStatus> {
        if let Some(error) = &self.error {
            return Err(error.clone());
        }
        if self.completed {
            return Ok(RunStatus::Completed(self.result.clone()));
        }
        self.steps += 1;
        match self.transition() {
            Ok(status) => Ok(status),
            Err(error) => {
                let function = self.current_function().and_then(|(_, function)| function);
                debug!(
                    %error,
                    depth = self.frames.len(),
                    function = ?function,
                    "evaluation failed"
                );
                self.error = Some(error.clone());
                Err(error)
            }
        }
    }

    fn transition(&mut self) -> EvalResult<RunStatus> {
        let Some(mut frame) = self.frames.pop() else {
            return self.complete(None);
        };
        trace!(node = %frame.node, kind = %frame.kind, state = ?frame.state, progress = frame.progress, "step");

        let step = match frame.state {
            FrameState::Init | FrameState::Running => self.advance(&mut frame),
            FrameState::Waiting => {
                if let Some(value) = self.resume.take() {
                    frame.result = Some(value);
                }
                frame.state = FrameState::Success;
                debug!(node = %frame.node, "resumed");
                Ok(Step::Finish)
            }
            FrameState::Success => {
                let delivery = frame.into_delivery();
                return match self.frames.last_mut() {
                    Some(parent) => {
                        parent.inbox = Some(delivery);
                        Ok(RunStatus::Pending)
                    }
                    None => self.complete(Some(delivery)),
                };
            }
            FrameState::Error => Err(malformed_tree(frame.node, "a runnable frame")),
        };

        let node = frame.node;
        let activation = frame.activation;
        match step {
            Ok(step) => {
                self.frames.push(frame);
                self.apply(step, activation)
            }
            Err(error) => {
                frame.state = FrameState::Error;
                self.frames.push(frame);
                Err(error.at(node))
            }
        }
    }

    fn apply(&mut self, step: Step, activation: u32) -> EvalResult<RunStatus> {
        match step {
            Step::Push(child) => self.push_frame(child, activation)?,
            Step::Enter(body) => {
                let callee = u32::try_from(self.activations.len() - 1).unwrap_or(u32::MAX);
                self.push_frame(body, callee)?;
            }
            Step::Finish => {}
            Step::Suspend(suspension) => {
                self.resume = None;
                debug!(function = %suspension.function, "suspended");
                return Ok(RunStatus::Suspended(suspension));
            }
        }
        Ok(RunStatus::Pending)
    }

    /// Push a new frame for `node`, evaluated in `activation`.
    fn push_frame(&mut self, node: NodeId, activation: u32) -> EvalResult<()> {
        let ast = self.ast(activation)?;
        let Some(kind) = ast.get(node).map(dsl_ir::Node::kind) else {
            return Err(malformed_tree(node, "a node"));
        };
        self.frames.push(Frame::new(node, kind, activation));
        Ok(())
    }

    fn ast(&self, activation: u32) -> EvalResult<SharedAst> {
        self.activations
            .get(activation as usize)
            .map(|activation| Arc::clone(&activation.ast))
            .ok_or_else(|| malformed_tree(NodeId::INVALID, "an activation"))
    }

    fn complete(&mut self, delivery: Option<Delivery>) -> EvalResult<RunStatus> {
        let result = match (self.entry, delivery) {
            (Entry::Program, delivery) => delivery.and_then(Delivery::into_value),
            (Entry::Function, Some(delivery)) => match delivery.signal {
                Signal::Return => Some(delivery.into_value().unwrap_or_else(Value::void)),
                Signal::Normal => Some(Value::void()),
                Signal::Break => return Err(break_outside_loop()),
            },
            (Entry::Function, None) => Some(Value::void()),
        };
        self.completed = true;
        self.result.clone_from(&result);
        debug!(steps = self.steps, "evaluation completed");
        Ok(RunStatus::Completed(result))
    }

    /// Enter a script function activation.
    fn enter(&mut self, script: ScriptId, ast: SharedAst, function: Name) {
        self.activations.push(Activation {
            script,
            ast,
            function: Some(function),
        });
        self.env.push_scope();
        self.call_depth += 1;
    }

    /// Leave the innermost script function activation.
    fn leave(&mut self) {
        if self.activations.len() > 1 {
            self.activations.pop();
            self.env.pop_scope();
            self.call_depth = self.call_depth.saturating_sub(1);
        }
    }

    // Host access

    /// Replace the value the suspended call returns.
    ///
    /// Only accepted while suspended; returns `false` and drops the value
    /// otherwise. The override applies to the current suspension alone.
    pub fn resume_with(&mut self, value: impl IntoValue) -> bool {
        if !self.is_suspended() {
            return false;
        }
        self.resume = Some(value.into_value());
        true
    }

    /// The frame stack, bottom first.
    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    /// Number of frames on the stack.
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// Number of nested script function activations.
    pub fn call_depth(&self) -> usize {
        self.call_depth
    }

    /// The error that stopped evaluation, if any.
    pub fn last_error(&self) -> Option<&EvalError> {
        self.error.as_ref()
    }

    pub fn is_completed(&self) -> bool {
        self.completed
    }

    /// Whether the top frame is suspended at a yielding call.
    pub fn is_suspended(&self) -> bool {
        self.frames
            .last()
            .is_some_and(|frame| frame.state == FrameState::Waiting)
    }

    /// The completed result, if finished.
    pub fn result(&self) -> Option<&Value> {
        self.result.as_ref()
    }

    /// Number of steps performed so far.
    pub fn steps(&self) -> u64 {
        self.steps
    }

    /// Read a variable as a script in the current activation would.
    pub fn lookup(&self, name: &str) -> Option<Value> {
        self.env.lookup(name)
    }

    pub fn global(&self, name: &str) -> Option<Value> {
        self.env.global(name)
    }

    pub fn set_global(&mut self, name: impl AsRef<str>, value: impl IntoValue) {
        self.env.assign_global(Name::new(name), value.into_value());
    }

    pub fn environment(&self) -> &Environment {
        &self.env
    }

    pub fn config(&self) -> &EvalConfig {
        &self.config
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Script id and function name of the innermost activation.
    pub fn current_function(&self) -> Option<(&ScriptId, Option<&Name>)> {
        self.activations
            .last()
            .map(|activation| (&activation.script, activation.function.as_ref()))
    }
}
