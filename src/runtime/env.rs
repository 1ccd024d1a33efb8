//! Variable, function, and control-flow stores.

use im::HashMap;

use crate::ast::Node;
use crate::diagnostics::{ErrorContext, SprigError};

/// Names starting with this character route to the innermost local
/// frame.
pub const LOCAL_PREFIX: char = '@';

/// The mutable state an [`crate::runtime::Interpreter`] evaluates
/// against.
#[derive(Debug, Clone, Default)]
pub struct Env {
    globals: HashMap<String, Node>,
    locals: Vec<HashMap<String, Node>>,
    functions: HashMap<String, Node>,
    /// Labels currently in scope, innermost last. Maintained for
    /// hosts that inspect state mid-evaluation; `break` matching goes
    /// through `break_target` instead.
    pub labels: Vec<String>,
    /// Pending non-local exit. While set, evaluation unwinds without
    /// visiting further forms until the matching label clears it.
    pub break_target: Option<String>,
}

impl Env {
    pub fn new() -> Self {
        Env::default()
    }

    pub fn is_local(name: &str) -> bool {
        name.starts_with(LOCAL_PREFIX)
    }

    fn no_frame(name: &str) -> SprigError {
        SprigError::NoLocalFrame {
            name: name.to_string(),
            ctx: ErrorContext::none(),
        }
    }

    /// Looks a name up in its store. Unbound names are `Ok(None)`;
    /// a local name with no active frame is fatal.
    pub fn get(&self, name: &str) -> Result<Option<&Node>, SprigError> {
        if Env::is_local(name) {
            match self.locals.last() {
                Some(frame) => Ok(frame.get(name)),
                None => Err(Env::no_frame(name)),
            }
        } else {
            Ok(self.globals.get(name))
        }
    }

    pub fn get_mut(&mut self, name: &str) -> Result<Option<&mut Node>, SprigError> {
        if Env::is_local(name) {
            match self.locals.last_mut() {
                Some(frame) => Ok(frame.get_mut(name)),
                None => Err(Env::no_frame(name)),
            }
        } else {
            Ok(self.globals.get_mut(name))
        }
    }

    pub fn set(&mut self, name: &str, value: Node) -> Result<(), SprigError> {
        if Env::is_local(name) {
            match self.locals.last_mut() {
                Some(frame) => {
                    frame.insert(name.to_string(), value);
                    Ok(())
                }
                None => Err(Env::no_frame(name)),
            }
        } else {
            self.globals.insert(name.to_string(), value);
            Ok(())
        }
    }

    pub fn delete(&mut self, name: &str) -> Result<(), SprigError> {
        if Env::is_local(name) {
            match self.locals.last_mut() {
                Some(frame) => {
                    frame.remove(name);
                    Ok(())
                }
                None => Err(Env::no_frame(name)),
            }
        } else {
            self.globals.remove(name);
            Ok(())
        }
    }

    pub fn push_frame(&mut self, frame: HashMap<String, Node>) {
        self.locals.push(frame);
    }

    pub fn pop_frame(&mut self) {
        self.locals.pop();
    }

    pub fn define_function(&mut self, name: &str, body: Node) {
        self.functions.insert(name.to_string(), body);
    }

    pub fn function(&self, name: &str) -> Option<&Node> {
        self.functions.get(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::ErrorKind;

    #[test]
    fn globals_and_locals_are_separate_stores() {
        let mut env = Env::new();
        env.set("x", Node::atom("global")).unwrap();
        env.push_frame(im::HashMap::new());
        env.set("@0", Node::atom("local")).unwrap();
        assert_eq!(env.get("x").unwrap().unwrap().flat_text(), "global");
        assert_eq!(env.get("@0").unwrap().unwrap().flat_text(), "local");
        env.pop_frame();
        assert_eq!(env.get("x").unwrap().unwrap().flat_text(), "global");
    }

    #[test]
    fn local_access_without_a_frame_is_fatal() {
        let mut env = Env::new();
        assert_eq!(env.get("@0").unwrap_err().kind(), ErrorKind::LocalScope);
        assert_eq!(
            env.set("@0", Node::null()).unwrap_err().kind(),
            ErrorKind::LocalScope
        );
        assert_eq!(env.delete("@0").unwrap_err().kind(), ErrorKind::LocalScope);
    }

    #[test]
    fn inner_frames_shadow_without_leaking() {
        let mut env = Env::new();
        env.push_frame(im::HashMap::new());
        env.set("@0", Node::atom("outer")).unwrap();
        env.push_frame(im::HashMap::new());
        assert!(env.get("@0").unwrap().is_none());
        env.pop_frame();
        assert_eq!(env.get("@0").unwrap().unwrap().flat_text(), "outer");
    }
}
