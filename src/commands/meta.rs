//! Reflective commands: `eval`, `evalstr`, the loaders, and
//! `unroller`.
//!
//! `include` and `import` go through the interpreter's
//! [`crate::loader::SourceLoader`] and yield the loaded program as an
//! unevaluated chain; the `eval*` variants evaluate it immediately.
//! `unroller` hands text to the installed preprocessor and returns
//! the expansion as an atom.

use crate::ast::{Elem, Node};
use crate::commands::CommandRegistry;
use crate::diagnostics::SprigError;
use crate::runtime::Interpreter;
use crate::syntax;

pub fn register(registry: &mut CommandRegistry) {
    registry.register("eval", cmd_eval);
    registry.register("evalstr", cmd_evalstr);
    registry.register("include", cmd_include);
    registry.register("import", cmd_import);
    registry.register("evalinclude", cmd_evalinclude);
    registry.register("evalimport", cmd_evalimport);
    registry.register("unroller", cmd_unroller);
}

/// `(eval …)` resolves each argument and evaluates the result once
/// more, yielding the last result.
fn cmd_eval(interp: &mut Interpreter, args: Option<&Node>) -> Result<Option<Node>, SprigError> {
    let mut ret = Some(Node::null());
    interp.for_each_element(args, |me, value| {
        ret = me.eval(value.as_ref())?;
        Ok(())
    })?;
    Ok(ret)
}

/// `(evalstr …)` reads each resolved atom as program text and
/// evaluates it. Read errors inside the text are fatal, exactly as at
/// top level.
fn cmd_evalstr(interp: &mut Interpreter, args: Option<&Node>) -> Result<Option<Node>, SprigError> {
    let mut ret = Some(Node::null());
    interp.for_each_element(args, |me, value| {
        let text = match value.and_then(|mut node| node.elem.take()) {
            Some(Elem::Atom(text)) => text,
            _ => return Err(SprigError::command("expected program text")),
        };
        ret = me.eval_source(&text)?;
        Ok(())
    })?;
    Ok(ret)
}

fn load_tree(
    interp: &mut Interpreter,
    args: Option<&Node>,
    import: bool,
) -> Result<Node, SprigError> {
    let path = interp.text_arg(args)?;
    let loaded = if import {
        interp.loader.import(&path)?
    } else {
        interp.loader.include(&path)?
    };
    syntax::read_tagged(&loaded.text, &loaded.line_starts, &loaded.name)
}

/// `(include path)` loads a program without evaluating it.
fn cmd_include(interp: &mut Interpreter, args: Option<&Node>) -> Result<Option<Node>, SprigError> {
    load_tree(interp, args, false).map(Some)
}

/// `(import path)` loads a foreign file through marker extraction
/// without evaluating it.
fn cmd_import(interp: &mut Interpreter, args: Option<&Node>) -> Result<Option<Node>, SprigError> {
    load_tree(interp, args, true).map(Some)
}

/// `(evalinclude path)` loads and evaluates in one step.
fn cmd_evalinclude(
    interp: &mut Interpreter,
    args: Option<&Node>,
) -> Result<Option<Node>, SprigError> {
    let tree = load_tree(interp, args, false)?;
    interp.eval(Some(&tree))
}

/// `(evalimport path)` is `import` followed by evaluation.
fn cmd_evalimport(
    interp: &mut Interpreter,
    args: Option<&Node>,
) -> Result<Option<Node>, SprigError> {
    let tree = load_tree(interp, args, true)?;
    interp.eval(Some(&tree))
}

/// `(unroller text)` expands macro text through the installed
/// preprocessor.
fn cmd_unroller(interp: &mut Interpreter, args: Option<&Node>) -> Result<Option<Node>, SprigError> {
    let source = interp.text_arg(args)?;
    match interp.preprocessor.expand(&source) {
        Ok(expanded) => Ok(Some(Node::atom(expanded))),
        Err(message) => Err(SprigError::command(message)),
    }
}
