//! Control flow: `if`, `while`, `for`, `downfor`, `loop`, `forever`,
//! `switch`, and `break`.
//!
//! `break` names a label rather than a loop: it sets the pending break
//! target and evaluation unwinds, skipping forms, until the label
//! statement that matches clears it. Loops poll the target between
//! iterations so they stop unwinding promptly.

use crate::ast::{text_of, Elem, Node, TRUE};
use crate::commands::CommandRegistry;
use crate::diagnostics::{ErrorContext, SprigError};
use crate::runtime::Interpreter;

pub fn register(registry: &mut CommandRegistry) {
    registry.register("if", cmd_if);
    registry.register("while", cmd_while);
    registry.register("for", cmd_for);
    registry.register("downfor", cmd_downfor);
    registry.register("loop", cmd_loop);
    registry.register("forever", cmd_forever);
    registry.register("switch", cmd_switch);
    registry.register("break", cmd_break);
}

/// `(if cond then else?)`. The condition is resolved and its text
/// compared against `#true` exactly; with no else branch a false
/// condition yields `#false`.
fn cmd_if(interp: &mut Interpreter, args: Option<&Node>) -> Result<Option<Node>, SprigError> {
    if args.is_none() {
        return Err(SprigError::command("expected a condition"));
    }
    let condition = interp.resolve(args)?;
    let then_branch = args.and_then(|node| node.next.as_deref());
    if text_of(condition.as_ref()) == TRUE {
        return interp.resolve(then_branch);
    }
    let else_branch = then_branch.and_then(|node| node.next.as_deref());
    match else_branch {
        Some(node) if node.elem.is_some() => interp.resolve(Some(node)),
        _ => Ok(Some(Node::truth(false))),
    }
}

/// `(while cond body)`. Yields the last body result, `#null` when the
/// body never ran.
fn cmd_while(interp: &mut Interpreter, args: Option<&Node>) -> Result<Option<Node>, SprigError> {
    let body = args.and_then(|node| node.next.as_deref());
    let mut ret = Some(Node::null());
    loop {
        let condition = interp.resolve(args)?;
        if interp.env.break_target.is_some() || text_of(condition.as_ref()) != TRUE {
            return Ok(ret);
        }
        ret = interp.resolve(body)?;
    }
}

/// `(for name start end body)`. Counts inclusively; the end bound is
/// re-resolved before every iteration. The counter variable is
/// deleted when the loop finishes.
fn cmd_for(interp: &mut Interpreter, args: Option<&Node>) -> Result<Option<Node>, SprigError> {
    counted_loop(interp, args, false)
}

/// `(downfor name start end body)`: `for` counting downward.
fn cmd_downfor(interp: &mut Interpreter, args: Option<&Node>) -> Result<Option<Node>, SprigError> {
    counted_loop(interp, args, true)
}

fn counted_loop(
    interp: &mut Interpreter,
    args: Option<&Node>,
    downward: bool,
) -> Result<Option<Node>, SprigError> {
    let name = interp.variable_name_arg(args)?;
    let start_node = args.and_then(|node| node.next.as_deref());
    let bound_node = start_node.and_then(|node| node.next.as_deref());
    let body = bound_node.and_then(|node| node.next.as_deref());

    let mut counter = interp.int_arg(start_node)?;
    let mut ret = None;
    loop {
        let bound = interp.int_arg(bound_node)?;
        let in_range = if downward { counter >= bound } else { counter <= bound };
        if !in_range || interp.env.break_target.is_some() {
            break;
        }
        interp.env.set(&name, Node::atom(counter.to_string()))?;
        ret = interp.resolve(body)?;
        if downward {
            counter -= 1;
        } else {
            counter += 1;
        }
    }
    interp.env.delete(&name)?;
    Ok(ret)
}

/// `(loop n body…)` evaluates the whole rest of the chain `n` times.
fn cmd_loop(interp: &mut Interpreter, args: Option<&Node>) -> Result<Option<Node>, SprigError> {
    let count = interp.int_arg(args)?;
    let body = args.and_then(|node| node.next.as_deref());
    let mut ret = None;
    for _ in 0..count.max(0) {
        ret = interp.eval(body)?;
        if interp.env.break_target.is_some() {
            break;
        }
    }
    Ok(ret)
}

/// `(forever body)` loops until a break unwinds through it.
fn cmd_forever(interp: &mut Interpreter, args: Option<&Node>) -> Result<Option<Node>, SprigError> {
    let mut ret = Some(Node::null());
    while interp.env.break_target.is_none() {
        ret = interp.resolve(args)?;
    }
    Ok(ret)
}

/// `(switch val (case body) … (default body)?)`. Case labels are
/// resolved before comparison, so a case can be a variable or a
/// computation. A matched case with no body is fatal.
fn cmd_switch(interp: &mut Interpreter, args: Option<&Node>) -> Result<Option<Node>, SprigError> {
    let value = interp.text_arg(args)?;
    let mut param = args.and_then(|node| node.next.as_deref());
    while let Some(node) = param {
        if node.elem.is_none() || interp.env.break_target.is_some() {
            break;
        }
        let case = match &node.elem {
            Some(Elem::Seq(case)) => case.as_ref(),
            _ => return Err(SprigError::command("case clause must be a group")),
        };
        let is_default = matches!(&case.elem, Some(Elem::Var(name)) if name == "default");
        if is_default || interp.text_arg(Some(case))? == value {
            let body = case.next.as_deref();
            if body.map_or(true, |node| node.elem.is_none()) {
                return Err(SprigError::MalformedSwitch {
                    ctx: ErrorContext::at_form(interp.current.0, interp.current.1),
                });
            }
            return interp.resolve(body);
        }
        param = node.next.as_deref();
    }
    Ok(Some(Node::null()))
}

/// `(break label)` starts unwinding toward the named label.
fn cmd_break(interp: &mut Interpreter, args: Option<&Node>) -> Result<Option<Node>, SprigError> {
    let label = interp.variable_name_arg(args)?;
    interp.env.break_target = Some(label);
    Ok(None)
}
