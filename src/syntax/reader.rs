//! Reads program text into node chains.
//!
//! The reader is a hand-rolled scanner over a char vector. Eight
//! bracket families open and close groups interchangeably, as long as
//! each group closes with the family it opened with. Four quote
//! families delimit string atoms. A bare token starting with a digit,
//! an arithmetic sign, or a quote glyph is an atom; anything else is a
//! variable reference. Every group gains one trailing empty node,
//! which downstream code relies on.
//!
//! End of input closes all open groups; the only syntax errors are a
//! close glyph from the wrong family, a surplus close glyph, and an
//! unterminated string.

use std::sync::Arc;

use miette::NamedSource;

use crate::ast::{is_variable_token, strip_quotes, Elem, Node, QUOTE_OPENERS};
use crate::diagnostics::{ErrorContext, Span, SprigError};

/// Open glyphs, by family index.
const OPEN: [char; 8] = ['(', '[', '{', '《', '【', '〔', '〈', '［'];
/// Close glyphs, by the same family index.
const CLOSE: [char; 8] = [')', ']', '}', '》', '】', '〕', '〉', '］'];

fn quote_closer(open: char) -> char {
    match open {
        '「' => '」',
        '『' => '』',
        c => c,
    }
}

fn is_whitespace(c: char) -> bool {
    matches!(c, ' ' | '\n' | '\r' | '\t')
}

/// Characters that end a bare token.
fn is_separator(c: char) -> bool {
    is_whitespace(c)
        || QUOTE_OPENERS.contains(&c)
        || c == '」'
        || c == '』'
        || OPEN.contains(&c)
        || CLOSE.contains(&c)
}

/// Reads a whole program. Nodes carry offsets but no line numbers.
pub fn read(text: &str) -> Result<Node, SprigError> {
    Reader::new(text, None, "<eval>").parse()
}

/// Reads a program whose text came from a [`crate::loader::SourceLoader`],
/// binding each node to a line via the table of line-start offsets.
pub fn read_tagged(text: &str, line_starts: &[usize], name: &str) -> Result<Node, SprigError> {
    Reader::new(text, Some(line_starts), name).parse()
}

enum Token {
    Open,
    Close,
    Word(String),
}

struct Reader<'a> {
    text: &'a str,
    name: &'a str,
    chars: Vec<char>,
    /// Byte offset of each char, plus the total length, for spans.
    byte_offsets: Vec<usize>,
    pos: usize,
    brackets: Vec<usize>,
    line_starts: Option<&'a [usize]>,
}

impl<'a> Reader<'a> {
    fn new(text: &'a str, line_starts: Option<&'a [usize]>, name: &'a str) -> Self {
        let mut chars = Vec::new();
        let mut byte_offsets = Vec::new();
        for (offset, c) in text.char_indices() {
            byte_offsets.push(offset);
            chars.push(c);
        }
        byte_offsets.push(text.len());
        Reader {
            text,
            name,
            chars,
            byte_offsets,
            pos: 0,
            brackets: Vec::new(),
            line_starts,
        }
    }

    fn parse(&mut self) -> Result<Node, SprigError> {
        self.parse_chain()
    }

    fn parse_chain(&mut self) -> Result<Node, SprigError> {
        let mut items = Vec::new();
        loop {
            // Positions name the token's first glyph, so diagnostics
            // point at the form rather than past it.
            let (token, start) = match self.next_token()? {
                None => return Ok(link(items)),
                Some(pair) => pair,
            };
            let node = match token {
                Token::Close => return Ok(link(items)),
                Token::Open => {
                    let inner = self.parse_chain()?;
                    let mut node = Node::seq(inner);
                    node.pos = start;
                    node.line = self.line_at(start);
                    node
                }
                Token::Word(word) => {
                    let elem = if is_variable_token(&word) {
                        Elem::Var(word)
                    } else {
                        Elem::Atom(strip_quotes(&word).to_string())
                    };
                    Node {
                        elem: Some(elem),
                        next: None,
                        pos: start,
                        line: self.line_at(start),
                    }
                }
            };
            items.push(node);
        }
    }

    fn next_token(&mut self) -> Result<Option<(Token, usize)>, SprigError> {
        while self.pos < self.chars.len() && is_whitespace(self.chars[self.pos]) {
            self.pos += 1;
        }
        if self.pos >= self.chars.len() {
            return Ok(None);
        }
        let start = self.pos;
        let c = self.chars[start];

        if let Some(family) = OPEN.iter().position(|&o| o == c) {
            self.brackets.push(family);
            self.pos += 1;
            return Ok(Some((Token::Open, start)));
        }
        if let Some(family) = CLOSE.iter().position(|&o| o == c) {
            let opened = match self.brackets.pop() {
                Some(opened) => opened,
                None => {
                    return Err(self.bracket_error(format!(
                        "`{c}` closes a group that was never opened"
                    )));
                }
            };
            if opened != family {
                return Err(self.bracket_error(format!(
                    "group opened with `{}` but closed with `{c}`",
                    OPEN[opened]
                )));
            }
            self.pos += 1;
            return Ok(Some((Token::Close, start)));
        }
        if QUOTE_OPENERS.contains(&c) {
            return self.string_token(c).map(|token| Some((token, start)));
        }
        self.word_token().map(|token| Some((token, start)))
    }

    fn string_token(&mut self, open: char) -> Result<Token, SprigError> {
        let start = self.pos;
        let closer = quote_closer(open);
        self.pos += 1;
        loop {
            if self.pos >= self.chars.len() {
                // Rewind so the reported offset points at the opening
                // glyph, not the end of input.
                self.pos = start;
                return Err(self.string_error(start));
            }
            let c = self.chars[self.pos];
            self.pos += 1;
            if c == closer {
                break;
            }
        }
        Ok(Token::Word(self.chars[start..self.pos].iter().collect()))
    }

    fn word_token(&mut self) -> Result<Token, SprigError> {
        let start = self.pos;
        while self.pos < self.chars.len() && !is_separator(self.chars[self.pos]) {
            self.pos += 1;
        }
        Ok(Token::Word(self.chars[start..self.pos].iter().collect()))
    }

    fn line_at(&self, pos: usize) -> usize {
        match self.line_starts {
            Some(starts) => starts.partition_point(|&s| s <= pos).saturating_sub(1),
            None => 0,
        }
    }

    fn span_at(&self, pos: usize) -> Span {
        let start = self.byte_offsets[pos.min(self.byte_offsets.len() - 1)];
        let end = self.byte_offsets[(pos + 1).min(self.byte_offsets.len() - 1)];
        Span::new(start, end)
    }

    fn source(&self) -> crate::diagnostics::SourceArc {
        Arc::new(NamedSource::new(self.name, self.text.to_string()))
    }

    fn bracket_error(&self, message: String) -> SprigError {
        SprigError::UnbalancedBracket {
            message,
            ctx: ErrorContext::with_source(self.source(), self.span_at(self.pos)),
        }
    }

    fn string_error(&self, start: usize) -> SprigError {
        SprigError::UnterminatedString {
            offset: start,
            ctx: ErrorContext::with_source(self.source(), self.span_at(start)),
        }
    }
}

/// Chains the parsed items, appending the trailing empty node every
/// group carries.
fn link(items: Vec<Node>) -> Node {
    let mut head = Node::empty();
    for mut item in items.into_iter().rev() {
        item.next = Some(Box::new(head));
        head = item;
    }
    head
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::ErrorKind;

    fn first_group(program: &str) -> Node {
        let mut top = read(program).unwrap();
        match top.elem.take() {
            Some(Elem::Seq(inner)) => *inner,
            other => panic!("expected a group at top level, got {other:?}"),
        }
    }

    #[test]
    fn classifies_tokens_inside_a_group() {
        let group = first_group("(add x 1 -5 'lit')");
        let mut elems = Vec::new();
        let mut cur = Some(&group);
        while let Some(node) = cur {
            if let Some(elem) = &node.elem {
                elems.push(elem.clone());
            }
            cur = node.next.as_deref();
        }
        assert_eq!(
            elems,
            vec![
                Elem::Var("add".into()),
                Elem::Var("x".into()),
                Elem::Atom("1".into()),
                Elem::Atom("-5".into()),
                Elem::Atom("lit".into()),
            ]
        );
    }

    #[test]
    fn every_group_ends_with_an_empty_node() {
        let group = first_group("(a)");
        assert!(group.is_end());
        let tail = group.next.as_deref().unwrap();
        assert!(tail.elem.is_none());
        assert!(tail.next.is_none());
    }

    #[test]
    fn bracket_families_are_interchangeable_when_matched() {
        for program in ["(a b)", "[a b]", "{a b}", "《a b》", "【a b】", "〔a b〕"] {
            let group = first_group(program);
            assert_eq!(group.elem, Some(Elem::Var("a".into())), "{program}");
        }
    }

    #[test]
    fn mixed_families_nest_freely() {
        let top = read("(set y {add 1 2})").unwrap();
        assert!(matches!(top.elem, Some(Elem::Seq(_))));
    }

    #[test]
    fn family_mismatch_is_an_error() {
        let err = read("(a b]").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Bracket);
        assert!(err.is_fatal());
    }

    #[test]
    fn surplus_closer_is_an_error() {
        let err = read("a)").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Bracket);
    }

    #[test]
    fn unclosed_groups_are_tolerated() {
        let top = read("(loop 3 (get 'ABC')").unwrap();
        assert!(matches!(top.elem, Some(Elem::Seq(_))));
    }

    #[test]
    fn unterminated_string_is_an_error() {
        let err = read("(get 'abc)").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnterminatedString);
        match err {
            SprigError::UnterminatedString { offset, .. } => assert_eq!(offset, 5),
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn quote_families_delimit_atoms() {
        let group = first_group("(get 「日本語」 'も' 『使えるよ』 \"ne\")");
        let texts: Vec<String> = {
            let mut out = Vec::new();
            let mut cur = group.next.as_deref();
            while let Some(node) = cur {
                if let Some(Elem::Atom(s)) = &node.elem {
                    out.push(s.clone());
                }
                cur = node.next.as_deref();
            }
            out
        };
        assert_eq!(texts, vec!["日本語", "も", "使えるよ", "ne"]);
    }

    #[test]
    fn nodes_carry_their_token_start_offsets() {
        let top = read("(get x)").unwrap();
        assert_eq!(top.pos, 0);
        let group = first_group("(get x)");
        assert_eq!(group.pos, 1);
        assert_eq!(group.next.as_deref().unwrap().pos, 5);
    }

    #[test]
    fn tagged_reads_bind_line_numbers() {
        let text = "(set x 1)\n(set y 2)\n";
        let line_starts = vec![0, 10];
        let top = read_tagged(text, &line_starts, "prog.lsp").unwrap();
        assert_eq!(top.line, 0);
        let second = top.next.as_deref().unwrap();
        assert_eq!(second.line, 1);
    }

    #[test]
    fn trees_serialize_for_host_inspection() {
        let top = read("(a 1)").unwrap();
        let json = serde_json::to_value(&top).unwrap();
        assert!(json.get("elem").is_some());
    }
}
