//! Error reporting for the interpreter.
//!
//! Errors come in two tiers. Fatal errors abort evaluation and surface
//! to the host as `Err`: mismatched brackets, unterminated strings, a
//! blown recursion limit, a break whose label never resolves, local
//! access with no active frame, and a matched switch case with no
//! body. Everything else a command can get wrong is recoverable: the
//! evaluator converts it into an inline error atom and keeps going.
//!
//! Each error carries an [`ErrorContext`] with optional source
//! attachment, span, and help text; [`miette::Diagnostic`] is
//! implemented by hand so the optional fields stay optional.

use std::fmt;
use std::sync::Arc;

use miette::{Diagnostic, LabeledSpan, NamedSource, SourceCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Shared handle to a named source text for diagnostics rendering.
pub type SourceArc = Arc<NamedSource<String>>;

/// A byte range into a source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Span { start, end }
    }

    pub fn to_source_span(self) -> miette::SourceSpan {
        (self.start, self.end.saturating_sub(self.start)).into()
    }
}

/// Optional context attached to every error variant.
#[derive(Debug, Default)]
pub struct ErrorContext {
    pub source: Option<SourceArc>,
    pub span: Option<Span>,
    pub help: Option<String>,
}

impl ErrorContext {
    pub fn none() -> Self {
        ErrorContext::default()
    }

    pub fn with_source(source: SourceArc, span: Span) -> Self {
        ErrorContext {
            source: Some(source),
            span: Some(span),
            help: None,
        }
    }

    /// Context for a runtime failure, pointing at the form under
    /// evaluation by offset and line.
    pub fn at_form(pos: usize, line: usize) -> Self {
        ErrorContext {
            source: None,
            span: None,
            help: Some(format!(
                "while evaluating the form at line {line} (offset {pos})"
            )),
        }
    }
}

/// Broad classification of an error, independent of its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Bracket,
    UnterminatedString,
    Depth,
    BreakTarget,
    LocalScope,
    Switch,
    Command,
    Load,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Bracket => "bracket",
            ErrorKind::UnterminatedString => "unterminated string",
            ErrorKind::Depth => "depth",
            ErrorKind::BreakTarget => "break target",
            ErrorKind::LocalScope => "local scope",
            ErrorKind::Switch => "switch",
            ErrorKind::Command => "command",
            ErrorKind::Load => "load",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The interpreter error type.
#[derive(Debug, Error)]
pub enum SprigError {
    #[error("mismatched brackets: {message}")]
    UnbalancedBracket { message: String, ctx: ErrorContext },

    #[error("unterminated string starting at offset {offset}")]
    UnterminatedString { offset: usize, ctx: ErrorContext },

    #[error("evaluation is too deeply nested (limit {limit})")]
    DepthExceeded { limit: usize, ctx: ErrorContext },

    #[error("break label `{label}` was never found")]
    BreakNotFound { label: String, ctx: ErrorContext },

    #[error("local name `{name}` used outside any function call")]
    NoLocalFrame { name: String, ctx: ErrorContext },

    #[error("switch case has no command attached")]
    MalformedSwitch { ctx: ErrorContext },

    #[error("{message}")]
    Command { message: String, ctx: ErrorContext },

    #[error("cannot load `{path}`: {message}")]
    Load {
        path: String,
        message: String,
        ctx: ErrorContext,
    },
}

impl SprigError {
    /// A recoverable command failure; the evaluator renders these as
    /// inline error atoms.
    pub fn command(message: impl Into<String>) -> Self {
        SprigError::Command {
            message: message.into(),
            ctx: ErrorContext::none(),
        }
    }

    pub fn load(path: impl Into<String>, message: impl Into<String>) -> Self {
        SprigError::Load {
            path: path.into(),
            message: message.into(),
            ctx: ErrorContext::none(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            SprigError::UnbalancedBracket { .. } => ErrorKind::Bracket,
            SprigError::UnterminatedString { .. } => ErrorKind::UnterminatedString,
            SprigError::DepthExceeded { .. } => ErrorKind::Depth,
            SprigError::BreakNotFound { .. } => ErrorKind::BreakTarget,
            SprigError::NoLocalFrame { .. } => ErrorKind::LocalScope,
            SprigError::MalformedSwitch { .. } => ErrorKind::Switch,
            SprigError::Command { .. } => ErrorKind::Command,
            SprigError::Load { .. } => ErrorKind::Load,
        }
    }

    /// Whether this error aborts evaluation outright.
    pub fn is_fatal(&self) -> bool {
        !matches!(
            self,
            SprigError::Command { .. } | SprigError::Load { .. }
        )
    }

    pub fn context(&self) -> &ErrorContext {
        match self {
            SprigError::UnbalancedBracket { ctx, .. }
            | SprigError::UnterminatedString { ctx, .. }
            | SprigError::DepthExceeded { ctx, .. }
            | SprigError::BreakNotFound { ctx, .. }
            | SprigError::NoLocalFrame { ctx, .. }
            | SprigError::MalformedSwitch { ctx }
            | SprigError::Command { ctx, .. }
            | SprigError::Load { ctx, .. } => ctx,
        }
    }
}

impl Diagnostic for SprigError {
    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        self.context()
            .help
            .as_ref()
            .map(|h| Box::new(h.clone()) as Box<dyn fmt::Display + 'a>)
    }

    fn source_code(&self) -> Option<&dyn SourceCode> {
        self.context()
            .source
            .as_ref()
            .map(|s| s.as_ref() as &dyn SourceCode)
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        let span = self.context().span?;
        let label = LabeledSpan::new_with_span(
            Some(self.kind().as_str().to_string()),
            span.to_source_span(),
        );
        Some(Box::new(std::iter::once(label)))
    }
}
