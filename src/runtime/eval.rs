//! The evaluation core: the dispatch loop, the label/break protocol,
//! the user-function calling convention, and the shared helpers the
//! builtin commands are written against.

use im::HashMap;

use crate::ast::{concat, is_variable_token, text_of, Elem, Node, NULL};
use crate::commands;
use crate::diagnostics::{ErrorContext, SprigError};
use crate::runtime::env::Env;
use crate::runtime::Interpreter;

/// A view of one chain element, detached from its successors the way
/// `array` and `foreach` hand elements out. Atoms copy, groups expose
/// their inner chain, and variable references are wrapped as a group
/// around the referencing node.
pub(crate) fn element_view(node: &Node) -> Option<Node> {
    match &node.elem {
        None => None,
        Some(Elem::Atom(text)) => Some(Node::atom(text.clone())),
        Some(Elem::Seq(inner)) => Some((**inner).clone()),
        Some(Elem::Var(_)) => Some(Node::seq(node.clone())),
    }
}

fn is_next_null(node: Option<&Node>) -> bool {
    match node {
        None => true,
        Some(node) => node.is_end(),
    }
}

impl Interpreter {
    // ========================================================================
    // DISPATCH LOOP
    // ========================================================================

    /// Evaluates a chain. The walk follows three rules: a node with no
    /// payload yields nothing, a pending break skips everything until
    /// its label clears it, and a chain of forms yields the last
    /// non-empty result. When the outermost call returns with a break
    /// still pending, the label never existed and the error is fatal.
    pub fn eval(&mut self, node: Option<&Node>) -> Result<Option<Node>, SprigError> {
        self.eval_depth += 1;
        let result = self.eval_inner(node);
        self.eval_depth -= 1;
        if self.eval_depth == 0 && result.is_ok() {
            if let Some(label) = self.env.break_target.take() {
                return Err(SprigError::BreakNotFound {
                    label,
                    ctx: ErrorContext::at_form(self.current.0, self.current.1),
                });
            }
        }
        result
    }

    fn eval_inner(&mut self, node: Option<&Node>) -> Result<Option<Node>, SprigError> {
        let node = match node {
            Some(node) => node,
            None => return Ok(None),
        };
        let elem = match &node.elem {
            Some(elem) => elem,
            None => return Ok(None),
        };
        if self.env.break_target.is_some() {
            return Ok(None);
        }
        self.current = (node.pos, node.line);

        match elem {
            Elem::Seq(inner) => {
                if node.next.is_some() {
                    let first = self.eval(Some(inner))?;
                    let rest = self.eval(node.next.as_deref())?;
                    Ok(rest.or(first))
                } else {
                    self.eval(Some(inner))
                }
            }
            Elem::Var(name) => {
                self.helper_depth = 0;
                if let Some(label) = name.strip_suffix(':') {
                    self.env.labels.push(label.to_string());
                    let ret = self.eval(node.next.as_deref());
                    self.env.labels.pop();
                    let ret = ret?;
                    if self.env.break_target.as_deref() == Some(label) {
                        self.env.break_target = None;
                    }
                    Ok(ret)
                } else {
                    self.dispatch(name, node)
                }
            }
            Elem::Atom(_) => {
                if !node.is_end() {
                    self.eval(node.next.as_deref())
                } else {
                    Ok(None)
                }
            }
        }
    }

    /// Runs a command or user function by name. Fatal errors
    /// propagate; anything recoverable becomes an inline error atom so
    /// evaluation continues.
    fn dispatch(&mut self, command: &str, node: &Node) -> Result<Option<Node>, SprigError> {
        let args = node.next.as_deref();
        let outcome = if let Some(run) = commands::lookup(command) {
            run(self, args)
        } else if self.env.function(command).is_some() {
            self.call_function(command, args)
        } else {
            return Ok(Some(Node::atom(format!(
                "{command} is not evaluable at line {} ({})",
                node.line, node.pos
            ))));
        };
        match outcome {
            Ok(value) => Ok(value),
            Err(e) if e.is_fatal() => Err(e),
            Err(e) => Ok(Some(Node::atom(format!(
                "{command}: error ({e}) at line {} ({})",
                node.line, node.pos
            )))),
        }
    }

    /// Calls a user function: arguments are resolved in the caller's
    /// scope, bound as `@0`, `@1`, … in a fresh frame, and the stored
    /// body is evaluated inside it.
    fn call_function(&mut self, name: &str, args: Option<&Node>) -> Result<Option<Node>, SprigError> {
        let body = match self.env.function(name) {
            Some(body) => body.clone(),
            None => return Ok(None),
        };
        let mut frame = HashMap::new();
        let mut index = 0usize;
        let mut cur = args;
        while let Some(node) = cur {
            if node.elem.is_none() {
                break;
            }
            let value = self.resolve(Some(node))?;
            frame.insert(format!("@{index}"), value.unwrap_or_else(Node::null));
            index += 1;
            cur = node.next.as_deref();
        }
        self.env.push_frame(frame);
        let ret = self.eval(Some(&body));
        self.env.pop_frame();
        ret
    }

    // ========================================================================
    // RECURSION GUARD
    // ========================================================================

    /// Bumps the helper-recursion counter. It resets at every command
    /// dispatch, so a single runaway resolution (such as two variables
    /// referencing each other) trips the limit instead of overflowing
    /// the stack.
    pub(crate) fn bump_helper_depth(&mut self) -> Result<(), SprigError> {
        self.helper_depth += 1;
        if self.helper_depth >= self.max_depth {
            return Err(SprigError::DepthExceeded {
                limit: self.max_depth,
                ctx: ErrorContext::at_form(self.current.0, self.current.1),
            });
        }
        Ok(())
    }

    // ========================================================================
    // ARGUMENT RESOLUTION
    // ========================================================================

    /// Resolves one chain element to a value: atoms copy, variable
    /// references look up, groups evaluate. An absent element resolves
    /// to `#null`.
    pub(crate) fn resolve(&mut self, node: Option<&Node>) -> Result<Option<Node>, SprigError> {
        let node = match node {
            Some(node) => node,
            None => return Ok(Some(Node::null())),
        };
        match &node.elem {
            Some(Elem::Var(name)) => self.lookup_variable(name),
            Some(Elem::Atom(text)) => Ok(Some(Node::atom(text.clone()))),
            Some(Elem::Seq(inner)) => self.eval(Some(inner)),
            None => Ok(Some(Node::null())),
        }
    }

    /// Looks up a variable, yielding `#undef` when unbound. Tokens
    /// that cannot name a variable yield nothing.
    pub(crate) fn lookup_variable(&self, name: &str) -> Result<Option<Node>, SprigError> {
        if !is_variable_token(name) {
            return Ok(None);
        }
        match self.env.get(name)? {
            Some(node) => Ok(Some(node.clone())),
            None => Ok(Some(Node::undef())),
        }
    }

    /// Resolves an element and flattens it to text.
    pub(crate) fn text_arg(&mut self, node: Option<&Node>) -> Result<String, SprigError> {
        let value = self.resolve(node)?;
        Ok(text_of(value.as_ref()))
    }

    /// Resolves an element as an integer; anything unparsable counts
    /// as zero.
    pub(crate) fn int_arg(&mut self, node: Option<&Node>) -> Result<i64, SprigError> {
        match node {
            Some(n) if n.elem.is_some() => {
                Ok(self.text_arg(node)?.parse::<i64>().unwrap_or(0))
            }
            _ => Ok(0),
        }
    }

    /// Resolves an element as a number; anything unparsable counts as
    /// zero.
    pub(crate) fn float_arg(&mut self, node: Option<&Node>) -> Result<f64, SprigError> {
        match node {
            Some(n) if n.elem.is_some() => {
                Ok(self.text_arg(node)?.parse::<f64>().unwrap_or(0.0))
            }
            _ => Ok(0.0),
        }
    }

    /// Reads a variable-name argument: a bare name is taken as is, a
    /// group is evaluated and its text used as the name.
    pub(crate) fn variable_name_arg(&mut self, node: Option<&Node>) -> Result<String, SprigError> {
        let node = match node {
            Some(node) => node,
            None => return Err(SprigError::command("expected a variable name")),
        };
        match &node.elem {
            Some(Elem::Seq(inner)) => {
                let value = self.eval(Some(inner))?;
                Ok(text_of(value.as_ref()))
            }
            Some(Elem::Var(name)) if is_variable_token(name) => Ok(name.clone()),
            _ => Err(SprigError::command("expected a variable name")),
        }
    }

    // ========================================================================
    // CHAIN ITERATION
    // ========================================================================

    /// Resolves and visits each element of an argument chain, stopping
    /// at the end of the chain or on a pending break.
    pub(crate) fn for_each_element<F>(
        &mut self,
        mut chain: Option<&Node>,
        mut visit: F,
    ) -> Result<(), SprigError>
    where
        F: FnMut(&mut Self, Option<Node>) -> Result<(), SprigError>,
    {
        while let Some(node) = chain {
            if node.elem.is_none() || self.env.break_target.is_some() {
                break;
            }
            let value = self.resolve(Some(node))?;
            visit(self, value)?;
            chain = node.next.as_deref();
        }
        Ok(())
    }

    /// Numeric variant of [`Interpreter::for_each_element`].
    pub(crate) fn for_each_number<F>(
        &mut self,
        mut chain: Option<&Node>,
        mut visit: F,
    ) -> Result<(), SprigError>
    where
        F: FnMut(&mut Self, f64) -> Result<(), SprigError>,
    {
        while let Some(node) = chain {
            if node.elem.is_none() || self.env.break_target.is_some() {
                break;
            }
            let value = self.float_arg(Some(node))?;
            visit(self, value)?;
            chain = node.next.as_deref();
        }
        Ok(())
    }

    // ========================================================================
    // VALUE CLONING
    // ========================================================================

    /// Deep-clones a resolved value, substituting variable references
    /// with their current values. `set` and `addto` build stored
    /// chains through this, so stored values never alias live ones.
    pub(crate) fn clone_resolved(&mut self, node: &Node) -> Result<Option<Node>, SprigError> {
        self.bump_helper_depth()?;
        match &node.elem {
            None => Ok(None),
            Some(Elem::Seq(inner)) => {
                let inner = self.clone_resolved(inner)?;
                let mut out = Node {
                    elem: inner.map(|n| Elem::Seq(Box::new(n))),
                    next: None,
                    pos: 0,
                    line: 0,
                };
                if !is_next_null(node.next.as_deref()) {
                    if let Some(next) = node.next.as_deref() {
                        out.next = self.clone_resolved(next)?.map(Box::new);
                    }
                }
                Ok(Some(out))
            }
            Some(Elem::Var(name)) => {
                let target = self.lookup_variable(name)?;
                let inner = match target {
                    Some(target) => self.clone_resolved(&target)?,
                    None => None,
                };
                let head = Node {
                    elem: inner.map(|n| Elem::Seq(Box::new(n))),
                    next: None,
                    pos: 0,
                    line: 0,
                };
                let rest = match node.next.as_deref() {
                    Some(next) => self.clone_resolved(next)?,
                    None => None,
                };
                Ok(concat(Some(head), rest))
            }
            Some(Elem::Atom(text)) => {
                let mut out = Node::atom(text.clone());
                if !node.is_end() {
                    if let Some(next) = node.next.as_deref() {
                        out.next = self.clone_resolved(next)?.map(Box::new);
                    }
                }
                Ok(Some(out))
            }
        }
    }

    // ========================================================================
    // RENDERING
    // ========================================================================

    /// Flattens a resolved value for `get`: atoms contribute their
    /// text with no separators, nested variable references resolve
    /// recursively, and groups evaluate.
    pub(crate) fn get_inner(&mut self, value: Option<&Node>) -> Result<String, SprigError> {
        self.bump_helper_depth()?;
        let node = match value {
            Some(node) => node,
            None => return Ok(NULL.to_string()),
        };
        let mut out = match &node.elem {
            None => return Ok(String::new()),
            Some(Elem::Atom(text)) => text.clone(),
            Some(Elem::Var(name)) => {
                let target = self.lookup_variable(name)?;
                self.get_concat(target.as_ref())?
            }
            Some(Elem::Seq(inner)) => {
                let value = self.eval(Some(inner))?;
                text_of(value.as_ref())
            }
        };
        if !node.is_end() {
            if let Some(next) = node.next.as_deref() {
                out.push_str(&self.get_inner(Some(next))?);
            }
        }
        Ok(out)
    }

    /// Resolves and flattens a whole argument chain for `get`.
    pub(crate) fn get_concat(&mut self, chain: Option<&Node>) -> Result<String, SprigError> {
        let mut out = String::new();
        self.for_each_element(chain, |me, value| {
            let piece = me.get_inner(value.as_ref())?;
            out.push_str(&piece);
            Ok(())
        })?;
        Ok(out)
    }

    /// Renders a value for `print` without evaluating it: atoms are
    /// re-quoted, variable references print bare, and groups print
    /// parenthesized. The output reads back as a program.
    pub(crate) fn print_inner(&mut self, value: Option<&Node>) -> Result<String, SprigError> {
        self.bump_helper_depth()?;
        let mut out = String::new();
        let mut cur = match value {
            Some(node) => node,
            None => return Ok(out),
        };
        loop {
            let elem = match &cur.elem {
                Some(elem) => elem,
                None => break,
            };
            match elem {
                Elem::Atom(text) => {
                    out.push('\'');
                    out.push_str(text);
                    out.push('\'');
                }
                Elem::Var(name) => out.push_str(name),
                Elem::Seq(inner) => {
                    out.push('(');
                    out.push_str(&self.print_inner(Some(inner))?);
                    out.push(')');
                }
            }
            if cur.is_end() {
                break;
            }
            out.push(' ');
            match cur.next.as_deref() {
                Some(next) => cur = next,
                None => break,
            }
        }
        Ok(out)
    }

    /// Flattens a value for `out` and `write`: only atom text
    /// survives, variable references are dropped.
    pub(crate) fn out_text(&mut self, value: Option<&Node>) -> Result<String, SprigError> {
        self.bump_helper_depth()?;
        let mut out = String::new();
        let mut cur = match value {
            Some(node) => node,
            None => return Ok(out),
        };
        loop {
            match &cur.elem {
                Some(Elem::Atom(text)) => out.push_str(text),
                Some(Elem::Seq(inner)) => out.push_str(&self.out_text(Some(inner))?),
                _ => {}
            }
            if cur.is_end() {
                break;
            }
            match cur.next.as_deref() {
                Some(next) => cur = next,
                None => break,
            }
        }
        Ok(out)
    }

    // ========================================================================
    // ARRAY STORAGE
    // ========================================================================

    /// Writes `value`'s payload into slot `index` of the named
    /// variable, creating the variable and padding missing slots with
    /// `#null` cells. This is the one operation that edits a stored
    /// chain in place.
    pub(crate) fn set_array_slot(
        &mut self,
        name: &str,
        index: i64,
        value: &Node,
    ) -> Result<(), SprigError> {
        if self.env.get(name)?.is_none() {
            self.env.set(name, Node::null_cell())?;
        }
        if let Some(root) = self.env.get_mut(name)? {
            write_slot(root, index.max(0), &value.elem);
        }
        Ok(())
    }
}

/// Walks to slot `index`, growing the chain with `#null` cells where
/// needed, and replaces the slot's payload in place. Iterative: the
/// index can be as large as the host's memory allows.
fn write_slot(node: &mut Node, index: i64, payload: &Option<Elem>) {
    let mut cur = node;
    for _ in 0..index.max(0) {
        let needs_cell = match cur.next.as_deref() {
            None => true,
            Some(next) => next.elem.is_none(),
        };
        if needs_cell {
            cur.next = Some(Box::new(Node::null_cell()));
        }
        let step = cur;
        cur = match step.next.as_deref_mut() {
            Some(next) => next,
            None => return,
        };
    }
    cur.elem = payload.clone();
}

// `Env` helpers the commands share with the evaluator.
impl Env {
    /// The collection chain `foreach` iterates: a snapshot of the
    /// variable's current value, or nothing when unbound.
    pub(crate) fn collection(&self, name: &str) -> Result<Option<Node>, SprigError> {
        Ok(self.get(name)?.cloned())
    }
}
