//! The Sprig value model.
//!
//! A program and every value it produces share one representation: a
//! singly linked chain of [`Node`]s. Each node carries an optional
//! payload ([`Elem`]) and the source position it was read from. Chains
//! produced by the reader end in one trailing node whose payload is
//! absent; programs can observe that shape (through `length`, `cdr`,
//! and friends), so it is part of the model, not a parser artifact.

use serde::{Deserialize, Serialize};

// ============================================================================
// SENTINEL ATOMS
// ============================================================================

/// Result of reading an unbound variable.
pub const UNDEF: &str = "#undef";
/// The empty value.
pub const NULL: &str = "#null";
/// The true value; conditions compare against this exact text.
pub const TRUE: &str = "#true";
/// The false value.
pub const FALSE: &str = "#false";

// ============================================================================
// CORE TYPES
// ============================================================================

/// Payload of a single chain node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Elem {
    /// Literal text: quoted strings, numbers, and sign-prefixed tokens.
    Atom(String),
    /// A parenthesized group, held as the head of a nested chain.
    Seq(Box<Node>),
    /// A name to be resolved against the stores at evaluation time.
    Var(String),
}

/// One link in a value chain.
///
/// `pos` and `line` locate the token this node was read from; both are
/// zero for nodes the evaluator synthesizes.
///
/// `Clone` and `Drop` are written by hand as loops over the `next`
/// links: chains can be as long as a stored array, so the derived
/// node-per-stack-frame versions would overflow on large values.
#[derive(Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct Node {
    pub elem: Option<Elem>,
    pub next: Option<Box<Node>>,
    pub pos: usize,
    pub line: usize,
}

impl Clone for Node {
    fn clone(&self) -> Self {
        let mut head = Node {
            elem: self.elem.clone(),
            next: None,
            pos: self.pos,
            line: self.line,
        };
        let mut cursor = &mut head.next;
        let mut src = self.next.as_deref();
        while let Some(node) = src {
            let link = Box::new(Node {
                elem: node.elem.clone(),
                next: None,
                pos: node.pos,
                line: node.line,
            });
            let slot = cursor;
            cursor = &mut slot.insert(link).next;
            src = node.next.as_deref();
        }
        head
    }
}

impl Drop for Node {
    fn drop(&mut self) {
        let mut rest = self.next.take();
        while let Some(mut node) = rest {
            rest = node.next.take();
        }
    }
}

impl Node {
    /// A node with no payload, as the reader leaves at the end of each
    /// group.
    pub fn empty() -> Self {
        Node::default()
    }

    pub fn atom(text: impl Into<String>) -> Self {
        Node {
            elem: Some(Elem::Atom(text.into())),
            next: None,
            pos: 0,
            line: 0,
        }
    }

    pub fn var(name: impl Into<String>) -> Self {
        Node {
            elem: Some(Elem::Var(name.into())),
            next: None,
            pos: 0,
            line: 0,
        }
    }

    pub fn seq(inner: Node) -> Self {
        Node {
            elem: Some(Elem::Seq(Box::new(inner))),
            next: None,
            pos: 0,
            line: 0,
        }
    }

    pub fn undef() -> Self {
        Node::atom(UNDEF)
    }

    pub fn null() -> Self {
        Node::atom(NULL)
    }

    pub fn truth(value: bool) -> Self {
        Node::atom(if value { TRUE } else { FALSE })
    }

    /// An auto-grown array slot: a group wrapping the `#null` atom.
    /// Reading the slot with `array` yields `#null`, while flattening
    /// the whole chain renders it as empty text.
    pub fn null_cell() -> Self {
        Node::seq(Node::null())
    }

    /// True when this node is the last populated one in its chain,
    /// either because nothing follows or because only the trailing
    /// empty node does.
    pub fn is_end(&self) -> bool {
        match self.next.as_deref() {
            None => true,
            Some(next) => next.elem.is_none(),
        }
    }

    /// Flattens the chain to text without evaluating anything. Atom
    /// payloads contribute their text, nested chains flatten
    /// recursively, and variable references render as
    /// `#VarName:<name>`.
    pub fn flat_text(&self) -> String {
        let mut out = String::new();
        let mut cur = self;
        loop {
            let elem = match &cur.elem {
                Some(elem) => elem,
                None => break,
            };
            match elem {
                Elem::Atom(s) => out.push_str(s),
                Elem::Var(name) => {
                    out.push_str("#VarName:");
                    out.push_str(name);
                }
                Elem::Seq(inner) => out.push_str(&inner.flat_text()),
            }
            if cur.is_end() {
                break;
            }
            match cur.next.as_deref() {
                Some(next) => cur = next,
                None => break,
            }
        }
        out
    }
}

/// Flattens an optional chain; absent chains render as empty text.
pub fn text_of(node: Option<&Node>) -> String {
    node.map(Node::flat_text).unwrap_or_default()
}

// ============================================================================
// CHAIN SURGERY
// ============================================================================

/// Splices `tail` onto `head` at the first end-of-chain node, trimming
/// the trailing empty node `head` may carry. Either side may be absent.
pub fn concat(head: Option<Node>, tail: Option<Node>) -> Option<Node> {
    let mut head = match head {
        Some(head) => head,
        None => return tail,
    };
    let tail = match tail {
        Some(tail) => tail,
        None => return Some(head),
    };
    splice(&mut head, tail);
    Some(head)
}

fn splice(node: &mut Node, tail: Node) {
    let mut tail = Some(Box::new(tail));
    let mut cur = node;
    loop {
        if cur.is_end() {
            cur.next = tail.take();
            return;
        }
        let step = cur;
        cur = match step.next.as_deref_mut() {
            Some(next) => next,
            None => return,
        };
    }
}

// ============================================================================
// TOKEN CLASSIFICATION
// ============================================================================

/// Quote glyphs that open a string token.
pub const QUOTE_OPENERS: [char; 4] = ['\'', '"', '「', '『'];

/// Whether a bare token names a variable. Tokens starting with a
/// digit, an arithmetic sign, or a quote glyph are atoms; everything
/// else is a variable reference.
pub fn is_variable_token(token: &str) -> bool {
    match token.chars().next() {
        None => true,
        Some(c) => {
            !(QUOTE_OPENERS.contains(&c)
                || matches!(c, '+' | '-' | '*' | '/')
                || c.is_ascii_digit())
        }
    }
}

/// Strips one leading quote glyph and one trailing glyph from a quoted
/// token. Unquoted tokens pass through unchanged.
pub fn strip_quotes(token: &str) -> &str {
    let mut chars = token.chars();
    match chars.next() {
        Some(c) if QUOTE_OPENERS.contains(&c) => {
            let rest = chars.as_str();
            match rest.char_indices().next_back() {
                Some((idx, _)) => &rest[..idx],
                None => rest,
            }
        }
        _ => token,
    }
}

/// Canonical text for a computed number: integral values print without
/// a fractional part.
pub fn format_number(value: f64) -> String {
    format!("{value}")
}

// ============================================================================
// TESTS
// ============================================================================
