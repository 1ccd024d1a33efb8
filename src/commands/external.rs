//! Commands with effects outside the interpreter: `out`, `write`,
//! `del`, and `rand`.

use std::fs::OpenOptions;
use std::io::Write as _;

use crate::ast::{Node, UNDEF};
use crate::commands::CommandRegistry;
use crate::diagnostics::SprigError;
use crate::runtime::Interpreter;

/// Global naming the file `write` appends to.
pub const OUTFILE_VAR: &str = "outfile";

pub fn register(registry: &mut CommandRegistry) {
    registry.register("out", cmd_out);
    registry.register("write", cmd_write);
    registry.register("del", cmd_del);
    registry.register("rand", cmd_rand);
}

fn flatten_args(interp: &mut Interpreter, args: Option<&Node>) -> Result<String, SprigError> {
    let mut out = String::new();
    interp.for_each_element(args, |me, value| {
        out.push_str(&me.out_text(value.as_ref())?);
        Ok(())
    })?;
    Ok(out)
}

/// `(out …)` flattens atom text (dropping variable-reference noise)
/// and emits it, newline-terminated, to the interpreter's output
/// sink.
fn cmd_out(interp: &mut Interpreter, args: Option<&Node>) -> Result<Option<Node>, SprigError> {
    let text = flatten_args(interp, args)?;
    interp.output.emit(&text);
    interp.output.emit("\n");
    Ok(Some(Node::atom(text)))
}

/// `(write …)` appends the same flattened text, newline-terminated,
/// to the file named by the `outfile` global. With `outfile` unbound
/// or `#undef` the text is dropped.
fn cmd_write(interp: &mut Interpreter, args: Option<&Node>) -> Result<Option<Node>, SprigError> {
    let text = flatten_args(interp, args)?;
    let path = interp
        .env
        .get(OUTFILE_VAR)?
        .map(Node::flat_text)
        .unwrap_or_default();
    if !path.is_empty() && path != UNDEF {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| SprigError::command(format!("cannot open `{path}`: {e}")))?;
        writeln!(file, "{text}")
            .map_err(|e| SprigError::command(format!("cannot write `{path}`: {e}")))?;
    }
    Ok(Some(Node::atom(text)))
}

/// `(del path)` removes a file, ignoring failures, and yields the
/// path.
fn cmd_del(interp: &mut Interpreter, args: Option<&Node>) -> Result<Option<Node>, SprigError> {
    let path = interp.text_arg(args)?;
    let _ = std::fs::remove_file(&path);
    Ok(Some(Node::atom(path)))
}

/// `(rand n)` draws from the interpreter's entropy source: an integer
/// in `0..n`.
fn cmd_rand(interp: &mut Interpreter, args: Option<&Node>) -> Result<Option<Node>, SprigError> {
    let bound = interp.int_arg(args)?;
    let value = interp.entropy.next_bounded(bound);
    Ok(Some(Node::atom(value.to_string())))
}
