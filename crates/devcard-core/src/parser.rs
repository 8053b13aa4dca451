//! Indentation-driven recursive descent parser for profile documents.
//!
//! The parser is lenient: it never fails. Lines it cannot use are skipped
//! and reported as [`ParseWarning`]s next to the document, so a partially
//! broken card still yields every entry that could be read.
//!
//! Each block parser receives the base indentation of its block and the
//! shared [`Lexer`] cursor. Nested calls stop on the first line that does not
//! belong to them and leave it unconsumed, so the caller resumes exactly
//! there.

use std::borrow::Cow;

use tracing::{debug, trace};

use crate::ast::{Document, Map, Node};
use crate::error::{ParseWarning, ParseWarningKind, ParseWarnings};
use crate::lexer::{Lexer, Line};
use crate::scalar::{is_inline_list, parse_inline_list, plain, split_item_pair, split_key_value};
use crate::span::Span;

/// Keys that are never stored in any map.
pub const DANGEROUS_KEYS: [&str; 3] = ["__proto__", "constructor", "prototype"];

/// Maximum depth of nested maps and lists.
pub const MAX_NESTING: usize = 64;

/// A parsed document plus the lines that were skipped.
#[derive(Debug)]
pub struct ParseResult<'a> {
    pub document: Document<'a>,
    pub warnings: ParseWarnings,
}

impl<'a> ParseResult<'a> {
    /// Whether every line was understood.
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }
}

/// Profile document parser.
///
/// ```rust
/// use devcard_core::Parser;
///
/// let mut parser = Parser::new();
/// let result = parser.parse_with_warnings("name: Ada\nbio: >\n  Writes\n  compilers\n");
/// assert_eq!(result.document.get_str("bio"), Some("Writes compilers"));
/// assert!(result.is_clean());
/// ```
#[derive(Debug, Clone)]
pub struct Parser {
    blocked_keys: Vec<String>,
    max_nesting: usize,
    warnings: ParseWarnings,
    depth: usize,
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}

impl Parser {
    pub fn new() -> Self {
        Self {
            blocked_keys: DANGEROUS_KEYS.iter().map(|k| k.to_string()).collect(),
            max_nesting: MAX_NESTING,
            warnings: ParseWarnings::new(),
            depth: 0,
        }
    }

    /// Block an additional key. The built-in [`DANGEROUS_KEYS`] always stay
    /// blocked.
    pub fn with_blocked_key(mut self, key: impl Into<String>) -> Self {
        self.blocked_keys.push(key.into());
        self
    }

    /// Limit how deep maps and lists may nest.
    pub fn with_max_nesting(mut self, depth: usize) -> Self {
        self.max_nesting = depth;
        self
    }

    pub fn is_blocked(&self, key: &str) -> bool {
        self.blocked_keys.iter().any(|k| k == key)
    }

    /// Parse, returning the document and the warnings for skipped lines.
    pub fn parse_with_warnings<'a>(&mut self, input: &'a str) -> ParseResult<'a> {
        self.warnings = ParseWarnings::new();
        self.depth = 0;
        let document = self.parse_internal(input);
        ParseResult {
            document,
            warnings: std::mem::take(&mut self.warnings),
        }
    }

    /// Parse, discarding warnings.
    pub fn parse<'a>(&mut self, input: &'a str) -> Document<'a> {
        self.parse_with_warnings(input).document
    }

    fn parse_internal<'a>(&mut self, input: &'a str) -> Document<'a> {
        let mut lexer = Lexer::new(input);
        let mut root = Map::new();

        loop {
            self.parse_map(&mut lexer, 0, &mut root);
            // The root block only stops early on a list item.
            match lexer.next_line() {
                Some(line) => self.record(ParseWarning::stray_list_item(line.span)),
                None => break,
            }
        }

        debug!(
            entries = root.len(),
            warnings = self.warnings.len(),
            "parsed profile document"
        );

        Document {
            root,
            span: Span::new(0, input.len() as u32, 1),
        }
    }

    fn record(&mut self, warning: ParseWarning) {
        debug!(
            line = warning.line(),
            kind = warning.kind.as_str(),
            "{}",
            warning.message
        );
        self.warnings.push(warning);
    }

    fn insert_entry<'a>(&mut self, map: &mut Map<'a>, key: &'a str, value: Node<'a>, span: Span) {
        if self.is_blocked(key) {
            self.record(ParseWarning::dangerous_key(key, span));
            return;
        }
        if map.insert(key, value).is_some() {
            self.record(ParseWarning::duplicate_key(key, span));
        }
    }

    /// Parse `key: value` lines at exactly `base` indentation into `map`.
    ///
    /// Stops before the first line indented less than `base`, before a list
    /// item at `base`, or at end of input. Deeper lines that no entry claims
    /// are skipped.
    fn parse_map<'a>(&mut self, lexer: &mut Lexer<'a>, base: usize, map: &mut Map<'a>) {
        while let Some(&line) = lexer.peek_content() {
            if line.indent < base {
                break;
            }
            if line.indent > base {
                lexer.next_line();
                self.record(ParseWarning::unexpected_indent(line.span));
                continue;
            }
            if line.is_list_marker() {
                break;
            }

            lexer.next_line();
            let Some((key, raw)) = split_key_value(line.content()) else {
                self.record(ParseWarning::unrecognized_line(line.span));
                continue;
            };

            let value = self.parse_value(lexer, line.indent, raw);
            self.insert_entry(map, key, value, line.span);
        }
    }

    /// Classify the text after `key:`. `key_indent` is the indentation of the
    /// key line; anything nested below it must be indented further.
    fn parse_value<'a>(
        &mut self,
        lexer: &mut Lexer<'a>,
        key_indent: usize,
        raw: &'a str,
    ) -> Node<'a> {
        match raw {
            "|" => Node::Scalar(Cow::Owned(self.parse_block_scalar(lexer, key_indent, false))),
            ">" => Node::Scalar(Cow::Owned(self.parse_block_scalar(lexer, key_indent, true))),
            "" => self.parse_nested(lexer, key_indent),
            _ if is_inline_list(raw) => Node::List(parse_inline_list(raw)),
            _ => Node::Scalar(plain(raw)),
        }
    }

    /// Value of a key with nothing after the colon: a nested map, a list, or
    /// an empty scalar.
    fn parse_nested<'a>(&mut self, lexer: &mut Lexer<'a>, key_indent: usize) -> Node<'a> {
        let (indent, is_list, span) = match lexer.peek_content() {
            Some(line) if line.indent > key_indent => {
                (line.indent, line.is_list_marker(), line.span)
            }
            _ => return Node::Scalar(Cow::Borrowed("")),
        };

        if self.depth >= self.max_nesting {
            self.skip_deeper_than(lexer, key_indent);
            self.record(ParseWarning::new(
                ParseWarningKind::UnexpectedIndent,
                format!("nesting deeper than {} levels, block skipped", self.max_nesting),
                span,
            ));
            return Node::Scalar(Cow::Borrowed(""));
        }

        self.depth += 1;
        let node = if is_list {
            Node::List(self.parse_list(lexer, indent))
        } else {
            let mut map = Map::new();
            self.parse_map(lexer, indent, &mut map);
            Node::Map(map)
        };
        self.depth -= 1;
        node
    }

    fn skip_deeper_than(&mut self, lexer: &mut Lexer<'_>, indent: usize) {
        while let Some(line) = lexer.peek_content() {
            if line.indent <= indent {
                break;
            }
            lexer.next_line();
        }
    }

    /// Body of a `|` or `>` block scalar.
    ///
    /// The first non-blank line fixes the block indentation and must be
    /// indented past the key. The block ends before the first non-blank line
    /// indented less than that.
    fn parse_block_scalar(
        &mut self,
        lexer: &mut Lexer<'_>,
        key_indent: usize,
        folded: bool,
    ) -> String {
        lexer.skip_blank_lines();
        let block_indent = match lexer.peek_line() {
            Some(line) if line.indent > key_indent => line.indent,
            _ => return String::new(),
        };

        let mut out = String::new();
        while let Some(&line) = lexer.peek_line() {
            if line.is_blank() {
                lexer.next_line();
                out.push('\n');
                continue;
            }
            if line.indent < block_indent {
                break;
            }
            lexer.next_line();

            let text = &line.text[block_indent..];
            if folded {
                if !out.is_empty() && !out.ends_with('\n') {
                    out.push(' ');
                }
                out.push_str(text);
            } else {
                out.push_str(text);
                out.push('\n');
            }
        }

        out.truncate(out.trim_end().len());
        trace!(folded, len = out.len(), "block scalar");
        out
    }

    /// Items of a list whose markers sit at `indent`.
    fn parse_list<'a>(&mut self, lexer: &mut Lexer<'a>, indent: usize) -> Vec<Node<'a>> {
        let mut items = Vec::with_capacity(4);

        while let Some(&line) = lexer.peek_content() {
            if line.indent < indent {
                break;
            }
            if !line.is_list_marker() {
                if line.indent == indent {
                    break;
                }
                lexer.next_line();
                self.record(ParseWarning::unexpected_indent(line.span));
                continue;
            }
            lexer.next_line();
            if line.indent > indent {
                self.record(ParseWarning::nested_list(line.span));
                continue;
            }

            let item = self.parse_list_item(lexer, &line);
            items.push(item);
        }

        items
    }

    /// One `- ...` item. A `key: value` remainder starts a map whose further
    /// fields align with the text after the dash.
    fn parse_list_item<'a>(&mut self, lexer: &mut Lexer<'a>, line: &Line<'a>) -> Node<'a> {
        let marker = line.content();
        let content = marker[1..].trim_start();

        let Some((key, raw)) = split_item_pair(content) else {
            return Node::Scalar(plain(content));
        };

        let field_indent = line.indent + (marker.len() - content.len());
        let mut map = Map::new();
        let value = self.parse_value(lexer, field_indent, raw);
        self.insert_entry(&mut map, key, value, line.span);
        self.parse_map(lexer, field_indent, &mut map);
        Node::Map(map)
    }
}

/// Parse with a default [`Parser`], discarding warnings.
pub fn parse(input: &str) -> Document<'_> {
    Parser::new().parse(input)
}

/// Parse with a default [`Parser`], keeping warnings.
pub fn parse_with_warnings(input: &str) -> ParseResult<'_> {
    Parser::new().parse_with_warnings(input)
}
