//! Chain-as-array commands: `array`, `setarray`, `length`, `car`,
//! `cdr`, and `foreach`.
//!
//! An "array" is nothing more than a stored chain read by position.
//! Reads detach the slot from its successors; out-of-range reads
//! yield `#null`. `setarray` grows the stored chain on demand,
//! padding with `#null` cells.

use crate::ast::{text_of, Elem, Node};
use crate::commands::CommandRegistry;
use crate::diagnostics::SprigError;
use crate::runtime::eval::element_view;
use crate::runtime::Interpreter;

pub fn register(registry: &mut CommandRegistry) {
    registry.register("array", cmd_array);
    registry.register("setarray", cmd_setarray);
    registry.register("length", cmd_length);
    registry.register("car", cmd_car);
    registry.register("cdr", cmd_cdr);
    registry.register("foreach", cmd_foreach);
}

/// Walks `index` links into a chain and detaches that slot.
fn slot_at(chain: Option<&Node>, index: i64) -> Option<Node> {
    let mut cur = match chain {
        Some(node) => node,
        None => return Some(Node::null()),
    };
    for _ in 0..index.max(0) {
        match cur.next.as_deref() {
            Some(next) => cur = next,
            None => return Some(Node::null()),
        }
    }
    element_view(cur)
}

/// `(array coll i)` reads slot `i` of the resolved collection.
fn cmd_array(interp: &mut Interpreter, args: Option<&Node>) -> Result<Option<Node>, SprigError> {
    let chain = interp.resolve(args)?;
    let index = interp.int_arg(args.and_then(|node| node.next.as_deref()))?;
    Ok(slot_at(chain.as_ref(), index))
}

/// `(setarray name i value)` writes slot `i` in place, creating the
/// variable and padding missing slots with `#null` cells.
fn cmd_setarray(interp: &mut Interpreter, args: Option<&Node>) -> Result<Option<Node>, SprigError> {
    let name = interp.variable_name_arg(args)?;
    let index_node = args.and_then(|node| node.next.as_deref());
    let index = interp.int_arg(index_node)?;
    let value_node = index_node.and_then(|node| node.next.as_deref());
    let value = interp
        .resolve(value_node)?
        .ok_or_else(|| SprigError::command("expected a value to store"))?;
    interp.set_array_slot(&name, index, &value)?;
    Ok(Some(value))
}

/// `(length coll)` counts populated slots, trailing empty node
/// excluded.
fn cmd_length(interp: &mut Interpreter, args: Option<&Node>) -> Result<Option<Node>, SprigError> {
    let chain = interp.resolve(args)?;
    let mut count: i64 = 0;
    let mut cur = chain.as_ref();
    while let Some(node) = cur {
        if node.elem.is_none() {
            break;
        }
        count += 1;
        cur = node.next.as_deref();
    }
    Ok(Some(Node::atom(count.to_string())))
}

/// `(car coll)` is `(array coll 0)`.
fn cmd_car(interp: &mut Interpreter, args: Option<&Node>) -> Result<Option<Node>, SprigError> {
    let chain = interp.resolve(args)?;
    Ok(slot_at(chain.as_ref(), 0))
}

/// `(cdr coll)` yields everything after the first slot, or `#null`
/// when nothing follows.
fn cmd_cdr(interp: &mut Interpreter, args: Option<&Node>) -> Result<Option<Node>, SprigError> {
    let chain = interp.resolve(args)?;
    match chain {
        Some(mut node) if !node.is_end() => Ok(node.next.take().map(|next| *next)),
        _ => Ok(Some(Node::null())),
    }
}

/// `(foreach name coll body)` binds each element of the stored
/// collection in turn and evaluates the body, concatenating the
/// flattened results into one atom. An unbound collection iterates
/// zero times.
fn cmd_foreach(interp: &mut Interpreter, args: Option<&Node>) -> Result<Option<Node>, SprigError> {
    let name = interp.variable_name_arg(args)?;
    let coll_node = args.and_then(|node| node.next.as_deref());
    let coll_name = interp.variable_name_arg(coll_node)?;
    let body = coll_node
        .and_then(|node| node.next.as_deref())
        .and_then(|node| match &node.elem {
            Some(Elem::Seq(inner)) => Some((**inner).clone()),
            _ => None,
        });

    // Snapshot: rebinding the collection inside the body does not
    // change the iteration sequence.
    let chain = interp.env.collection(&coll_name)?;

    let mut out = String::new();
    let mut cur = chain.as_ref();
    while let Some(node) = cur {
        if node.elem.is_none() || interp.env.break_target.is_some() {
            break;
        }
        let item = element_view(node).unwrap_or_else(Node::empty);
        interp.env.set(&name, item)?;
        let result = interp.eval(body.as_ref())?;
        out.push_str(&text_of(result.as_ref()));
        cur = node.next.as_deref();
    }
    Ok(Some(Node::atom(out)))
}
