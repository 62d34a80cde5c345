//! Per-node-kind frame transitions.
//!
//! `advance` runs once per `Init`/`Running` visit of a frame. `progress`
//! records which child the frame is waiting on; the finished child's outcome
//! arrives in the frame's inbox.

use dsl_ir::{AssignScope, Ast, BinaryOp, Name, Node, NodeId, NodeKind, NodeRange, Number};
use dsl_value::{evaluate_binary, evaluate_unary, OpError, Value};

use super::frame::Delivery;
use super::{Evaluator, Frame, FrameState, Signal, Step, Suspension};
use crate::registry::Callable;
use crate::{
    break_outside_loop, call_depth_exceeded, invalid_for_step, malformed_tree, not_boolean,
    type_mismatch, unknown_variable, unresolved_function, DispatchError, EvalResult,
};

// `For` progress: bounds are collected first, then the body repeats.
const FOR_START: u32 = 1;
const FOR_LIMIT: u32 = 2;
const FOR_STEP: u32 = 3;
const FOR_BODY: u32 = 4;

// `FunctionCall` progress.
const CALL_ARGS: u32 = 1;
const CALL_BODY: u32 = 2;

impl Evaluator {
    pub(super) fn advance(&mut self, frame: &mut Frame) -> EvalResult<Step> {
        let ast = self.ast(frame.activation)?;
        let Some(node) = ast.get(frame.node) else {
            return Err(malformed_tree(frame.node, "a node"));
        };
        let inbox = frame.inbox.take();
        frame.state = FrameState::Running;

        if let Some(delivery) = &inbox {
            if delivery.signal != Signal::Normal && !consumes(frame.kind, delivery.signal) {
                let signal = delivery.signal;
                frame.finish_with(signal, inbox.and_then(Delivery::into_value));
                return Ok(Step::Finish);
            }
        }

        match node {
            // Leaves
            Node::Name(name) => {
                let value = self
                    .env
                    .lookup(name.as_str())
                    .ok_or_else(|| unknown_variable(name))?;
                finish(frame, Some(value))
            }
            Node::Number(Number::Int(n)) => finish(frame, Some(Value::Int(*n))),
            Node::Number(Number::Float(x)) => finish(frame, Some(Value::Float(*x))),
            Node::Bool(b) => finish(frame, Some(Value::Bool(*b))),
            Node::Str(s) => finish(frame, Some(Value::string(s))),
            Node::Break => {
                frame.finish_with(Signal::Break, None);
                Ok(Step::Finish)
            }
            // Definitions are collected at load time and do nothing when reached.
            Node::FunctionDefinition { .. } | Node::FunctionParameterList { .. } => {
                finish(frame, None)
            }

            Node::Program { body } => match frame.progress {
                0 => push(frame, *body),
                _ => {
                    let delivery = inbox.ok_or_else(|| malformed_tree(*body, "a block"))?;
                    match delivery.signal {
                        Signal::Break => Err(break_outside_loop()),
                        Signal::Return => finish(frame, delivery.into_value()),
                        Signal::Normal => finish(frame, None),
                    }
                }
            },
            Node::Block(range) => {
                if let Some(delivery) = inbox {
                    frame.result = delivery.into_value();
                }
                next_in_range(&ast, *range, frame).map_or_else(
                    || {
                        let result = frame.result.take();
                        finish(frame, result)
                    },
                    Ok,
                )
            }
            Node::ExpressionList(range) | Node::NameList(range) => {
                if let Some(delivery) = inbox {
                    let value = expect_value(Some(delivery), frame.node)?;
                    frame.operands.push(value);
                }
                next_in_range(&ast, *range, frame).map_or_else(|| finish(frame, None), Ok)
            }
            Node::FunctionArgumentList { exprs } => match frame.progress {
                0 if !exprs.is_present() => finish(frame, None),
                0 => push(frame, *exprs),
                _ => {
                    frame.operands = inbox.map(Delivery::into_values).unwrap_or_default();
                    finish(frame, None)
                }
            },
            Node::Expression(inner) | Node::PrimaryExpression(inner) | Node::Statement(inner) => {
                match frame.progress {
                    0 => push(frame, *inner),
                    _ => finish(frame, inbox.and_then(Delivery::into_value)),
                }
            }

            Node::Assignment {
                target,
                value,
                scope,
            } => match frame.progress {
                0 => push(frame, *value),
                _ => {
                    let value = expect_value(inbox, *value)?;
                    let name = ast
                        .name_of(*target)
                        .cloned()
                        .ok_or_else(|| malformed_tree(*target, "an assignment target name"))?;
                    self.assign(name, value.clone(), *scope);
                    finish(frame, Some(value))
                }
            },
            Node::BinaryExpression { op, left, right } => match frame.progress {
                0 => push(frame, *left),
                1 => {
                    let lhs = expect_value(inbox, *left)?;
                    // Short-circuit on the left operand alone.
                    let decided = matches!(
                        (op, &lhs),
                        (BinaryOp::And, Value::Bool(false)) | (BinaryOp::Or, Value::Bool(true))
                    );
                    if decided {
                        finish(frame, Some(lhs))
                    } else {
                        frame.operands.push(lhs);
                        push(frame, *right)
                    }
                }
                _ => {
                    let rhs = expect_value(inbox, *right)?;
                    let lhs = frame
                        .operands
                        .pop()
                        .ok_or_else(|| malformed_tree(*left, "a left operand"))?;
                    let result = evaluate_binary(*op, &lhs, &rhs)?;
                    finish(frame, Some(result))
                }
            },
            Node::UnaryExpression { op, operand } => match frame.progress {
                0 => push(frame, *operand),
                _ => {
                    let value = expect_value(inbox, *operand)?;
                    finish(frame, Some(evaluate_unary(*op, &value)?))
                }
            },

            Node::Return { value } => match frame.progress {
                0 if !value.is_present() => {
                    frame.finish_with(Signal::Return, None);
                    Ok(Step::Finish)
                }
                0 => push(frame, *value),
                _ => {
                    frame.finish_with(Signal::Return, inbox.and_then(Delivery::into_value));
                    Ok(Step::Finish)
                }
            },
            Node::While { cond, body } => match frame.progress {
                0 => push(frame, *cond),
                1 => {
                    if condition(inbox, *cond, "while")? {
                        push(frame, *body)
                    } else {
                        finish(frame, None)
                    }
                }
                _ => {
                    if inbox.is_some_and(|delivery| delivery.signal == Signal::Break) {
                        return finish(frame, None);
                    }
                    frame.progress = 0;
                    push(frame, *cond)
                }
            },
            Node::If {
                cond,
                then_branch,
                else_branch,
            } => match frame.progress {
                0 => push(frame, *cond),
                1 => {
                    if condition(inbox, *cond, "if")? {
                        push(frame, *then_branch)
                    } else if else_branch.is_present() {
                        push(frame, *else_branch)
                    } else {
                        finish(frame, None)
                    }
                }
                _ => finish(frame, inbox.and_then(Delivery::into_value)),
            },
            Node::For {
                var,
                start,
                limit,
                step,
                body,
            } => self.advance_for(frame, &ast, inbox, [*var, *start, *limit, *step, *body]),
            Node::FunctionCall { callee, args } => {
                self.advance_call(frame, &ast, inbox, *callee, *args)
            }
        }
    }

    fn assign(&mut self, name: Name, value: Value, scope: AssignScope) {
        match scope {
            AssignScope::Local => self.env.assign(name, value),
            AssignScope::Global => self.env.assign_global(name, value),
        }
    }

    /// `for var = start, limit[, step] do body end`.
    ///
    /// Bounds are evaluated once, in order. The loop runs while the counter
    /// is `<= limit` for a positive step and `>= limit` for a negative one,
    /// and ends when the next counter value would overflow.
    fn advance_for(
        &mut self,
        frame: &mut Frame,
        ast: &Ast,
        inbox: Option<Delivery>,
        [var, start, limit, step, body]: [NodeId; 5],
    ) -> EvalResult<Step> {
        match frame.progress {
            0 => return push(frame, start),
            FOR_START => {
                frame.operands.push(expect_value(inbox, start)?);
                return push(frame, limit);
            }
            FOR_LIMIT => {
                frame.operands.push(expect_value(inbox, limit)?);
                if step.is_present() {
                    return push(frame, step);
                }
                frame.operands.push(Value::Int(1));
                validate_for_bounds(&frame.operands)?;
            }
            FOR_STEP => {
                frame.operands.push(expect_value(inbox, step)?);
                validate_for_bounds(&frame.operands)?;
            }
            _ => {
                if inbox.is_some_and(|delivery| delivery.signal == Signal::Break) {
                    return finish(frame, None);
                }
                let [counter, _, step_by] = bounds(frame)?;
                // Overflow puts the counter past every representable limit.
                let next = match evaluate_binary(BinaryOp::Add, counter, step_by) {
                    Err(OpError::Overflow(_)) => return finish(frame, None),
                    next => next?,
                };
                frame.operands[0] = next;
            }
        }

        let [counter, limit_value, step_by] = bounds(frame)?;
        let test = if step_by.as_float() > 0.0 {
            BinaryOp::LtEq
        } else {
            BinaryOp::GtEq
        };
        if evaluate_binary(test, counter, limit_value)? != Value::Bool(true) {
            return finish(frame, None);
        }
        let name = ast
            .name_of(var)
            .cloned()
            .ok_or_else(|| malformed_tree(var, "a loop variable name"))?;
        self.env.assign(name, counter.clone());
        frame.progress = FOR_BODY;
        Ok(Step::Push(body))
    }

    /// `callee(args)`: evaluate the arguments, then dispatch.
    ///
    /// Host functions run in place. A script function enters a new
    /// activation whose body frame is pushed above this one; its outcome
    /// returns here at `CALL_BODY`.
    fn advance_call(
        &mut self,
        frame: &mut Frame,
        ast: &Ast,
        inbox: Option<Delivery>,
        callee: NodeId,
        args: NodeId,
    ) -> EvalResult<Step> {
        let name = ast
            .name_of(callee)
            .ok_or_else(|| malformed_tree(callee, "a function name"))?;

        match frame.progress {
            0 if args.is_present() => return push(frame, args),
            0 => {}
            CALL_ARGS => frame.operands = inbox.map(Delivery::into_values).unwrap_or_default(),
            _ => {
                self.leave();
                let delivery = inbox.ok_or_else(|| malformed_tree(frame.node, "a body"))?;
                return match delivery.signal {
                    Signal::Break => Err(break_outside_loop()),
                    Signal::Return => {
                        let value = delivery.into_value().unwrap_or_else(Value::void);
                        finish(frame, Some(value))
                    }
                    Signal::Normal => finish(frame, Some(Value::void())),
                };
            }
        }

        let script = self
            .activations
            .get(frame.activation as usize)
            .map(|activation| activation.script.clone())
            .ok_or_else(|| malformed_tree(frame.node, "an activation"))?;
        let callable = self
            .registry
            .resolve(Some(&script), name)
            .ok_or_else(|| unresolved_function(name))?;
        let args = std::mem::take(&mut frame.operands);

        match callable {
            Callable::Native(function) => {
                let value = function.call(&args)?;
                if function.is_yielding() {
                    frame.result = Some(value.clone());
                    frame.state = FrameState::Waiting;
                    return Ok(Step::Suspend(Suspension {
                        function: name.clone(),
                        value,
                    }));
                }
                finish(frame, Some(value))
            }
            Callable::Script(function) => {
                let params = function.parameters()?;
                if params.len() != args.len() {
                    return Err(DispatchError::ArityMismatch {
                        function: name.clone(),
                        expected: params.len(),
                        found: args.len(),
                    }
                    .into());
                }
                if self.call_depth >= self.config.max_call_depth {
                    return Err(call_depth_exceeded(self.config.max_call_depth));
                }
                let body = function.body()?;
                self.enter(function.script, function.ast, function.name);
                for (param, arg) in params.into_iter().zip(args) {
                    self.env.assign(param, arg);
                }
                frame.progress = CALL_BODY;
                Ok(Step::Enter(body))
            }
        }
    }
}

/// Whether a node kind stops a control-flow signal instead of passing it on.
fn consumes(kind: NodeKind, signal: Signal) -> bool {
    match kind {
        NodeKind::While | NodeKind::For => signal == Signal::Break,
        NodeKind::FunctionCall | NodeKind::Program => true,
        _ => false,
    }
}

#[expect(
    clippy::unnecessary_wraps,
    reason = "returned directly from fallible transitions"
)]
fn finish(frame: &mut Frame, result: Option<Value>) -> EvalResult<Step> {
    frame.finish(result);
    Ok(Step::Finish)
}

#[expect(
    clippy::unnecessary_wraps,
    reason = "returned directly from fallible transitions"
)]
fn push(frame: &mut Frame, child: NodeId) -> EvalResult<Step> {
    frame.progress += 1;
    Ok(Step::Push(child))
}

/// Schedule the next element of a list node, if any remain.
fn next_in_range(ast: &Ast, range: NodeRange, frame: &mut Frame) -> Option<Step> {
    let child = *ast.list(range).get(frame.progress as usize)?;
    frame.progress += 1;
    Some(Step::Push(child))
}

fn expect_value(delivery: Option<Delivery>, node: NodeId) -> EvalResult<Value> {
    delivery
        .and_then(Delivery::into_value)
        .ok_or_else(|| malformed_tree(node, "a value"))
}

/// Conditions must be `Bool`; there is no truthiness.
fn condition(delivery: Option<Delivery>, node: NodeId, context: &'static str) -> EvalResult<bool> {
    match expect_value(delivery, node)? {
        Value::Bool(b) => Ok(b),
        other => Err(not_boolean(context, other.kind()).at(node)),
    }
}

fn bounds(frame: &Frame) -> EvalResult<[&Value; 3]> {
    match frame.operands.as_slice() {
        [counter, limit, step] => Ok([counter, limit, step]),
        _ => Err(malformed_tree(frame.node, "`for` bounds")),
    }
}

fn validate_for_bounds(operands: &[Value]) -> EvalResult<()> {
    for (value, what) in operands.iter().zip(["start", "limit", "step"]) {
        if !value.is_numeric() {
            return Err(type_mismatch(format_args!(
                "`for` {what} must be numeric, found {}",
                value.kind()
            )));
        }
    }
    let zero = match operands.get(2) {
        Some(Value::Int(n)) => *n == 0,
        Some(Value::Float(x)) => *x == 0.0,
        _ => false,
    };
    if zero {
        return Err(invalid_for_step());
    }
    Ok(())
}
