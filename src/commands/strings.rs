//! Text commands: `tolower`, `toupper`, `replace`, and `regex`.

use regex::Regex;

use crate::ast::{Elem, Node};
use crate::commands::CommandRegistry;
use crate::diagnostics::SprigError;
use crate::runtime::Interpreter;

pub fn register(registry: &mut CommandRegistry) {
    registry.register("tolower", cmd_tolower);
    registry.register("toupper", cmd_toupper);
    registry.register("replace", cmd_replace);
    registry.register("regex", cmd_regex);
}

/// `(tolower name …)` and `(toupper name …)` flatten the rest of the
/// arguments like `get`, fold the case, and assign the result to the
/// named variable. Anything but a bare name in the first slot is a
/// no-op.
fn case_fold(
    interp: &mut Interpreter,
    args: Option<&Node>,
    fold: impl Fn(&str) -> String,
) -> Result<Option<Node>, SprigError> {
    let first = match args {
        Some(first) => first,
        None => return Ok(None),
    };
    let name = match &first.elem {
        Some(Elem::Var(name)) => name.clone(),
        _ => return Ok(None),
    };
    let text = interp.get_concat(first.next.as_deref())?;
    let value = Node::atom(fold(&text));
    interp.env.set(&name, value.clone())?;
    Ok(Some(value))
}

fn cmd_tolower(interp: &mut Interpreter, args: Option<&Node>) -> Result<Option<Node>, SprigError> {
    case_fold(interp, args, |s| s.to_lowercase())
}

fn cmd_toupper(interp: &mut Interpreter, args: Option<&Node>) -> Result<Option<Node>, SprigError> {
    case_fold(interp, args, |s| s.to_uppercase())
}

/// `(replace subject from to from to …)` applies literal replacement
/// pairs left to right.
fn cmd_replace(interp: &mut Interpreter, args: Option<&Node>) -> Result<Option<Node>, SprigError> {
    let mut subject = interp.text_arg(args)?;
    let mut cur = args.and_then(|node| node.next.as_deref());
    while let Some(node) = cur {
        if node.elem.is_none() {
            break;
        }
        let find = interp.text_arg(Some(node))?;
        let next = node.next.as_deref();
        let replacement = interp.text_arg(next)?;
        subject = subject.replace(&find, &replacement);
        cur = next.and_then(|node| node.next.as_deref());
    }
    Ok(Some(Node::atom(subject)))
}

/// `(regex subject pattern to pattern to …)` applies regular
/// expression replacement pairs left to right. A pattern that does
/// not compile is a recoverable error.
fn cmd_regex(interp: &mut Interpreter, args: Option<&Node>) -> Result<Option<Node>, SprigError> {
    let mut subject = interp.text_arg(args)?;
    let mut cur = args.and_then(|node| node.next.as_deref());
    while let Some(node) = cur {
        if node.elem.is_none() {
            break;
        }
        let pattern = interp.text_arg(Some(node))?;
        let next = node.next.as_deref();
        let replacement = interp.text_arg(next)?;
        let re = Regex::new(&pattern)
            .map_err(|e| SprigError::command(format!("bad pattern `{pattern}`: {e}")))?;
        subject = re.replace_all(&subject, replacement.as_str()).into_owned();
        cur = next.and_then(|node| node.next.as_deref());
    }
    Ok(Some(Node::atom(subject)))
}
