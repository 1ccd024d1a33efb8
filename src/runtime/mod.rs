//! The interpreter and its host-facing seams.
//!
//! An [`Interpreter`] owns the stores plus four replaceable seams:
//! where emitted text goes ([`OutputSink`]), where randomness comes
//! from ([`EntropySource`]), how sources load
//! ([`crate::loader::SourceLoader`]), and how macro text expands
//! ([`crate::loader::Preprocessor`]). Hosts swap any of them with the
//! `with_*` builders; the defaults write to stdout, draw from a
//! Xoshiro generator seeded from OS entropy, and load from the
//! filesystem.

pub mod env;
pub mod eval;

use std::cell::RefCell;
use std::rc::Rc;

use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256StarStar;

use crate::ast::text_of;
use crate::diagnostics::SprigError;
use crate::loader::{FsLoader, NoPreprocessor, Preprocessor, SourceLoader};
use crate::syntax;

pub use env::Env;

/// Stack limit for both evaluation nesting and the per-dispatch helper
/// counter.
pub const DEFAULT_MAX_DEPTH: usize = 1024;

// ============================================================================
// OUTPUT
// ============================================================================

/// Receives text emitted by `out` and kin.
pub trait OutputSink {
    fn emit(&mut self, text: &str);
}

/// Discards all output.
pub struct NullSink;

impl OutputSink for NullSink {
    fn emit(&mut self, _text: &str) {}
}

/// Writes output to stdout.
pub struct StdoutSink;

impl OutputSink for StdoutSink {
    fn emit(&mut self, text: &str) {
        print!("{text}");
    }
}

/// A clonable buffer sink: hand one clone to the interpreter and keep
/// the other to read what was emitted.
#[derive(Clone, Default)]
pub struct SharedOutput {
    buffer: Rc<RefCell<String>>,
}

impl SharedOutput {
    pub fn new() -> Self {
        SharedOutput::default()
    }

    pub fn contents(&self) -> String {
        self.buffer.borrow().clone()
    }

    pub fn take(&self) -> String {
        std::mem::take(&mut self.buffer.borrow_mut())
    }
}

impl OutputSink for SharedOutput {
    fn emit(&mut self, text: &str) {
        self.buffer.borrow_mut().push_str(text);
    }
}

// ============================================================================
// ENTROPY
// ============================================================================

/// Supplies the `rand` command. Injectable so hosts can replay runs.
pub trait EntropySource {
    /// A value in `0..bound`; non-positive bounds yield zero.
    fn next_bounded(&mut self, bound: i64) -> i64;
}

/// The default entropy source, backed by a seedable Xoshiro generator.
pub struct XoshiroEntropy {
    rng: Xoshiro256StarStar,
}

impl XoshiroEntropy {
    pub fn new() -> Self {
        XoshiroEntropy {
            rng: Xoshiro256StarStar::from_entropy(),
        }
    }

    pub fn seeded(seed: u64) -> Self {
        XoshiroEntropy {
            rng: Xoshiro256StarStar::seed_from_u64(seed),
        }
    }
}

impl Default for XoshiroEntropy {
    fn default() -> Self {
        XoshiroEntropy::new()
    }
}

impl EntropySource for XoshiroEntropy {
    fn next_bounded(&mut self, bound: i64) -> i64 {
        if bound <= 0 {
            return 0;
        }
        self.rng.gen_range(0..bound)
    }
}

// ============================================================================
// INTERPRETER
// ============================================================================

/// The Sprig interpreter.
///
/// ```no_run
/// use sprig::Interpreter;
///
/// let mut interp = Interpreter::new();
/// let out = interp.eval_text("(add 1 2 3)").unwrap();
/// assert_eq!(out, "6");
/// ```
pub struct Interpreter {
    pub env: Env,
    pub(crate) output: Box<dyn OutputSink>,
    pub(crate) entropy: Box<dyn EntropySource>,
    pub(crate) loader: Box<dyn SourceLoader>,
    pub(crate) preprocessor: Box<dyn Preprocessor>,
    pub(crate) max_depth: usize,
    /// Nesting depth of `eval` calls; zero means top level.
    pub(crate) eval_depth: usize,
    /// Helper-recursion counter, reset at each command dispatch.
    pub(crate) helper_depth: usize,
    /// Offset and line of the form under evaluation.
    pub(crate) current: (usize, usize),
}

impl Interpreter {
    pub fn new() -> Self {
        Interpreter {
            env: Env::new(),
            output: Box::new(StdoutSink),
            entropy: Box::new(XoshiroEntropy::new()),
            loader: Box::new(FsLoader),
            preprocessor: Box::new(NoPreprocessor),
            max_depth: DEFAULT_MAX_DEPTH,
            eval_depth: 0,
            helper_depth: 0,
            current: (0, 0),
        }
    }

    pub fn with_output(mut self, output: impl OutputSink + 'static) -> Self {
        self.output = Box::new(output);
        self
    }

    pub fn with_entropy(mut self, entropy: impl EntropySource + 'static) -> Self {
        self.entropy = Box::new(entropy);
        self
    }

    pub fn with_loader(mut self, loader: impl SourceLoader + 'static) -> Self {
        self.loader = Box::new(loader);
        self
    }

    pub fn with_preprocessor(mut self, preprocessor: impl Preprocessor + 'static) -> Self {
        self.preprocessor = Box::new(preprocessor);
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Reads and evaluates a program, flattening the result to text.
    pub fn eval_text(&mut self, text: &str) -> Result<String, SprigError> {
        let result = self.eval_source(text)?;
        Ok(text_of(result.as_ref()))
    }

    /// Reads and evaluates a program, returning the result chain.
    pub fn eval_source(
        &mut self,
        text: &str,
    ) -> Result<Option<crate::ast::Node>, SprigError> {
        let tree = syntax::read(text)?;
        self.eval(Some(&tree))
    }
}

impl Default for Interpreter {
    fn default() -> Self {
        Interpreter::new()
    }
}
