//! The builtin command set.
//!
//! Commands are plain function pointers keyed by name in a registry
//! built once on first use. Each family lives in its own module and
//! contributes its commands through a `register` function.
//!
//! Every command receives the interpreter and its raw argument chain
//! and decides per argument whether to resolve it, evaluate it, or
//! keep it as written. That is how `let` stores unevaluated chains
//! while `set` stores resolved ones.

pub mod bindings;
pub mod collections;
pub mod control;
pub mod external;
pub mod logic;
pub mod math;
pub mod meta;
pub mod strings;

use im::HashMap;
use once_cell::sync::Lazy;

use crate::ast::Node;
use crate::diagnostics::SprigError;
use crate::runtime::Interpreter;

/// The shape every builtin command implements.
pub type CommandFn = fn(&mut Interpreter, Option<&Node>) -> Result<Option<Node>, SprigError>;

/// Name-to-command table.
#[derive(Clone, Default)]
pub struct CommandRegistry {
    table: HashMap<String, CommandFn>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        CommandRegistry::default()
    }

    pub fn register(&mut self, name: &str, command: CommandFn) {
        self.table.insert(name.to_string(), command);
    }

    pub fn get(&self, name: &str) -> Option<CommandFn> {
        self.table.get(name).copied()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.table.keys().map(String::as_str)
    }
}

static REGISTRY: Lazy<CommandRegistry> = Lazy::new(|| {
    let mut registry = CommandRegistry::new();
    math::register(&mut registry);
    bindings::register(&mut registry);
    collections::register(&mut registry);
    control::register(&mut registry);
    logic::register(&mut registry);
    strings::register(&mut registry);
    meta::register(&mut registry);
    external::register(&mut registry);
    registry
});

/// Looks a builtin up by name.
pub fn lookup(name: &str) -> Option<CommandFn> {
    REGISTRY.get(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_covers_the_command_set() {
        for name in [
            "add", "sub", "mul", "div", "let", "set", "addto", "get", "print", "func", "array",
            "setarray", "length", "car", "cdr", "foreach", "if", "while", "for", "downfor",
            "loop", "forever", "switch", "break", "eq", "neq", "lt", "le", "gt", "ge", "and",
            "or", "tolower", "toupper", "replace", "regex", "eval", "evalstr", "include",
            "import", "evalinclude", "evalimport", "unroller", "out", "write", "del", "rand",
        ] {
            assert!(lookup(name).is_some(), "missing command `{name}`");
        }
        assert!(lookup("nosuch").is_none());
    }
}
