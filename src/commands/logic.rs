//! Comparisons and boolean connectives. Equality compares flattened
//! text; ordering compares numerically. `and` and `or` resolve both
//! operands before combining, so side effects in the second operand
//! always happen.

use crate::ast::{text_of, Node, TRUE};
use crate::commands::CommandRegistry;
use crate::diagnostics::SprigError;
use crate::runtime::Interpreter;

pub fn register(registry: &mut CommandRegistry) {
    registry.register("eq", cmd_eq);
    registry.register("neq", cmd_neq);
    registry.register("lt", cmd_lt);
    registry.register("le", cmd_le);
    registry.register("gt", cmd_gt);
    registry.register("ge", cmd_ge);
    registry.register("and", cmd_and);
    registry.register("or", cmd_or);
}

fn text_pair(
    interp: &mut Interpreter,
    args: Option<&Node>,
) -> Result<(String, String), SprigError> {
    let left = interp.text_arg(args)?;
    let right = interp.text_arg(args.and_then(|node| node.next.as_deref()))?;
    Ok((left, right))
}

fn number_pair(interp: &mut Interpreter, args: Option<&Node>) -> Result<(f64, f64), SprigError> {
    let left = interp.float_arg(args)?;
    let right = interp.float_arg(args.and_then(|node| node.next.as_deref()))?;
    Ok((left, right))
}

fn truth_pair(interp: &mut Interpreter, args: Option<&Node>) -> Result<(bool, bool), SprigError> {
    let left = interp.resolve(args)?;
    let right = interp.resolve(args.and_then(|node| node.next.as_deref()))?;
    Ok((
        text_of(left.as_ref()) == TRUE,
        text_of(right.as_ref()) == TRUE,
    ))
}

fn cmd_eq(interp: &mut Interpreter, args: Option<&Node>) -> Result<Option<Node>, SprigError> {
    let (left, right) = text_pair(interp, args)?;
    Ok(Some(Node::truth(left == right)))
}

fn cmd_neq(interp: &mut Interpreter, args: Option<&Node>) -> Result<Option<Node>, SprigError> {
    let (left, right) = text_pair(interp, args)?;
    Ok(Some(Node::truth(left != right)))
}

fn cmd_lt(interp: &mut Interpreter, args: Option<&Node>) -> Result<Option<Node>, SprigError> {
    let (left, right) = number_pair(interp, args)?;
    Ok(Some(Node::truth(left < right)))
}

fn cmd_le(interp: &mut Interpreter, args: Option<&Node>) -> Result<Option<Node>, SprigError> {
    let (left, right) = number_pair(interp, args)?;
    Ok(Some(Node::truth(left <= right)))
}

fn cmd_gt(interp: &mut Interpreter, args: Option<&Node>) -> Result<Option<Node>, SprigError> {
    let (left, right) = number_pair(interp, args)?;
    Ok(Some(Node::truth(left > right)))
}

fn cmd_ge(interp: &mut Interpreter, args: Option<&Node>) -> Result<Option<Node>, SprigError> {
    let (left, right) = number_pair(interp, args)?;
    Ok(Some(Node::truth(left >= right)))
}

fn cmd_and(interp: &mut Interpreter, args: Option<&Node>) -> Result<Option<Node>, SprigError> {
    let (left, right) = truth_pair(interp, args)?;
    Ok(Some(Node::truth(left && right)))
}

fn cmd_or(interp: &mut Interpreter, args: Option<&Node>) -> Result<Option<Node>, SprigError> {
    let (left, right) = truth_pair(interp, args)?;
    Ok(Some(Node::truth(left || right)))
}
