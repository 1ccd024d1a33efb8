//! Sprig is an embeddable interpreter for a small, dynamically typed
//! S-expression scripting language in which everything, programs and
//! values alike, is text arranged into linked chains.
//!
//! The crate splits into five layers:
//!
//! - [`ast`]: the chain-of-nodes value model and its sentinels.
//! - [`syntax`]: the reader, with its interchangeable bracket and
//!   quote glyph families.
//! - [`runtime`]: the [`Interpreter`], its stores, the dispatch loop,
//!   and the label/break unwinding protocol.
//! - [`commands`]: the builtin command families.
//! - [`loader`]: the seams for source loading and macro preprocessing.
//!
//! # Quick start
//!
//! ```no_run
//! use sprig::Interpreter;
//!
//! let mut interp = Interpreter::new();
//! assert_eq!(interp.eval_text("(add 1 2 3)").unwrap(), "6");
//! assert_eq!(
//!     interp.eval_text("(set x 'ABC')(get x 'と' x)").unwrap(),
//!     "ABCとABC",
//! );
//! ```
//!
//! Commands that fail recoverably leave an inline error atom in the
//! result and evaluation continues; structural failures (mismatched
//! brackets, runaway recursion, a `break` whose label does not exist)
//! surface as [`SprigError`].

pub mod ast;
pub mod commands;
pub mod diagnostics;
pub mod loader;
pub mod runtime;
pub mod syntax;

pub use ast::{concat, text_of, Elem, Node, FALSE, NULL, TRUE, UNDEF};
pub use diagnostics::{ErrorContext, ErrorKind, Span, SprigError};
pub use loader::{FsLoader, LoadedSource, NoPreprocessor, Preprocessor, SourceLoader};
pub use runtime::{
    Env, EntropySource, Interpreter, NullSink, OutputSink, SharedOutput, StdoutSink,
    XoshiroEntropy, DEFAULT_MAX_DEPTH,
};
pub use syntax::{read, read_tagged};
