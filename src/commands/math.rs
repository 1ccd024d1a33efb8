//! Arithmetic commands. Operands are resolved left to right and
//! coerced to numbers; text that does not parse counts as zero.
//! Results print in canonical form, so `(add 1 2)` yields `3`, not
//! `3.0`.

use crate::ast::{format_number, Node};
use crate::commands::CommandRegistry;
use crate::diagnostics::SprigError;
use crate::runtime::Interpreter;

pub fn register(registry: &mut CommandRegistry) {
    registry.register("add", cmd_add);
    registry.register("sub", cmd_sub);
    registry.register("mul", cmd_mul);
    registry.register("div", cmd_div);
}

fn cmd_add(interp: &mut Interpreter, args: Option<&Node>) -> Result<Option<Node>, SprigError> {
    let mut sum = 0.0;
    interp.for_each_number(args, |_, n| {
        sum += n;
        Ok(())
    })?;
    Ok(Some(Node::atom(format_number(sum))))
}

/// The first operand seeds the accumulator, so `(sub 5)` is `5`.
fn cmd_sub(interp: &mut Interpreter, args: Option<&Node>) -> Result<Option<Node>, SprigError> {
    let mut acc = 0.0;
    let mut first = true;
    interp.for_each_number(args, |_, n| {
        if first {
            first = false;
            acc = n;
        } else {
            acc -= n;
        }
        Ok(())
    })?;
    Ok(Some(Node::atom(format_number(acc))))
}

fn cmd_mul(interp: &mut Interpreter, args: Option<&Node>) -> Result<Option<Node>, SprigError> {
    let mut acc = 1.0;
    interp.for_each_number(args, |_, n| {
        acc *= n;
        Ok(())
    })?;
    Ok(Some(Node::atom(format_number(acc))))
}

fn cmd_div(interp: &mut Interpreter, args: Option<&Node>) -> Result<Option<Node>, SprigError> {
    let mut acc = 1.0;
    let mut first = true;
    interp.for_each_number(args, |_, n| {
        if first {
            first = false;
            acc = n;
        } else {
            acc /= n;
        }
        Ok(())
    })?;
    Ok(Some(Node::atom(format_number(acc))))
}
