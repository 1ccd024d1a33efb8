//! Binding and rendering commands: `let`, `set`, `addto`, `get`,
//! `print`, and `func`.
//!
//! The split that matters here: `let` stores its argument chain as
//! written, while `set` resolves each element (substituting variable
//! values) before storing. `get` flattens with no separators; `print`
//! renders without evaluating, space-separated and re-quoted, so its
//! output reads back as a program.

use crate::ast::{concat, Node};
use crate::commands::CommandRegistry;
use crate::diagnostics::SprigError;
use crate::runtime::Interpreter;

pub fn register(registry: &mut CommandRegistry) {
    registry.register("let", cmd_let);
    registry.register("set", cmd_set);
    registry.register("addto", cmd_addto);
    registry.register("get", cmd_get);
    registry.register("print", cmd_print);
    registry.register("func", cmd_func);
}

/// `(let name …)` stores the rest of the chain unevaluated.
fn cmd_let(interp: &mut Interpreter, args: Option<&Node>) -> Result<Option<Node>, SprigError> {
    let name = interp.variable_name_arg(args)?;
    let value = args
        .and_then(|node| node.next.as_deref())
        .cloned()
        .unwrap_or_else(Node::empty);
    interp.env.set(&name, value.clone())?;
    Ok(Some(value))
}

/// `(set name …)` resolves each element and stores the spliced result.
fn cmd_set(interp: &mut Interpreter, args: Option<&Node>) -> Result<Option<Node>, SprigError> {
    let name = interp.variable_name_arg(args)?;
    let rest = args.and_then(|node| node.next.as_deref());
    let value = resolve_and_splice(interp, rest, None)?;
    interp.env.set(&name, value.clone().unwrap_or_else(Node::empty))?;
    Ok(value)
}

/// `(addto name …)` is `set` seeded with the variable's current value.
fn cmd_addto(interp: &mut Interpreter, args: Option<&Node>) -> Result<Option<Node>, SprigError> {
    let name = interp.variable_name_arg(args)?;
    let seed = interp.env.get(&name)?.cloned();
    let rest = args.and_then(|node| node.next.as_deref());
    let value = resolve_and_splice(interp, rest, seed)?;
    interp.env.set(&name, value.clone().unwrap_or_else(Node::empty))?;
    Ok(value)
}

fn resolve_and_splice(
    interp: &mut Interpreter,
    chain: Option<&Node>,
    seed: Option<Node>,
) -> Result<Option<Node>, SprigError> {
    let mut acc = seed;
    interp.for_each_element(chain, |me, value| {
        if let Some(value) = value {
            let cloned = me.clone_resolved(&value)?;
            acc = concat(acc.take(), cloned);
        }
        Ok(())
    })?;
    Ok(acc)
}

/// `(get …)` resolves its arguments and flattens them to one atom with
/// no separators.
///
/// ```text
/// (set x 'ABC' 'DEF') (get x 'と' x)  =>  ABCDEFとABCDEF
/// ```
fn cmd_get(interp: &mut Interpreter, args: Option<&Node>) -> Result<Option<Node>, SprigError> {
    let text = interp.get_concat(args)?;
    Ok(Some(Node::atom(text)))
}

/// `(print …)` renders each resolved argument without evaluating it,
/// separated by single spaces.
fn cmd_print(interp: &mut Interpreter, args: Option<&Node>) -> Result<Option<Node>, SprigError> {
    interp.bump_helper_depth()?;
    let mut out = String::new();
    let mut first = true;
    interp.for_each_element(args, |me, value| {
        if first {
            first = false;
        } else {
            out.push(' ');
        }
        out.push_str(&me.print_inner(value.as_ref())?);
        Ok(())
    })?;
    Ok(Some(Node::atom(out)))
}

/// `(func name body…)` stores the body unevaluated. Calls bind their
/// resolved arguments as `@0`, `@1`, … in a fresh local frame.
fn cmd_func(interp: &mut Interpreter, args: Option<&Node>) -> Result<Option<Node>, SprigError> {
    let name = interp.variable_name_arg(args)?;
    let body = args
        .and_then(|node| node.next.as_deref())
        .cloned()
        .unwrap_or_else(Node::empty);
    interp.env.define_function(&name, body.clone());
    Ok(Some(body))
}
