//! Line lexer for profile documents.
//!
//! Splits input into logical lines for the indentation-driven parser. Each
//! line knows its indentation width and has trailing whitespace removed, so
//! the parser never has to re-scan for either.
//!
//! - Zero-copy: lines borrow directly from the input
//! - `memchr` newline scanning
//! - Peek/consume API for one-line lookahead

use crate::span::Span;
use memchr::memchr;

/// A single line of input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Line<'a> {
    /// Line text without the newline and without trailing whitespace.
    pub text: &'a str,
    /// Byte span of `text` in the original input.
    pub span: Span,
    /// Number of leading space/tab bytes.
    pub indent: usize,
}

impl<'a> Line<'a> {
    /// 1-based line number.
    #[inline(always)]
    pub fn number(&self) -> u32 {
        self.span.line
    }

    #[inline(always)]
    pub fn is_blank(&self) -> bool {
        self.text.is_empty()
    }

    /// Full-line comment: `#` after only whitespace.
    #[inline(always)]
    pub fn is_comment(&self) -> bool {
        self.content().starts_with('#')
    }

    /// Blank or comment, the lines every block parser skips.
    #[inline(always)]
    pub fn is_trivia(&self) -> bool {
        self.is_blank() || self.is_comment()
    }

    /// The text after the indentation.
    #[inline(always)]
    pub fn content(&self) -> &'a str {
        &self.text[self.indent..]
    }

    /// Whether the content is a list item marker (`-` alone or `- ...`).
    #[inline(always)]
    pub fn is_list_marker(&self) -> bool {
        let content = self.content();
        content == "-" || content.starts_with("- ")
    }
}

/// Line-based lexer with one line of lookahead.
pub struct Lexer<'a> {
    input: &'a str,
    bytes: &'a [u8],
    /// Current byte offset.
    offset: usize,
    /// Number of the next line to be read.
    line: u32,
    peeked: Option<Line<'a>>,
}

impl<'a> Lexer<'a> {
    /// A leading byte order mark is skipped; spans still index `input`.
    #[inline]
    pub fn new(input: &'a str) -> Self {
        let offset = if input.starts_with('\u{feff}') {
            '\u{feff}'.len_utf8()
        } else {
            0
        };
        Self {
            input,
            bytes: input.as_bytes(),
            offset,
            line: 1,
            peeked: None,
        }
    }

    #[inline(always)]
    pub fn is_eof(&self) -> bool {
        self.peeked.is_none() && self.offset >= self.bytes.len()
    }

    /// Peek at the next line without consuming it.
    #[inline]
    pub fn peek_line(&mut self) -> Option<&Line<'a>> {
        if self.peeked.is_none() {
            self.peeked = self.read_line();
        }
        self.peeked.as_ref()
    }

    /// Consume and return the next line.
    #[inline]
    pub fn next_line(&mut self) -> Option<Line<'a>> {
        if let Some(line) = self.peeked.take() {
            return Some(line);
        }
        self.read_line()
    }

    /// Skip whitespace-only lines, returning how many were skipped.
    #[inline]
    pub fn skip_blank_lines(&mut self) -> usize {
        let mut count = 0;
        while let Some(line) = self.peek_line() {
            if !line.is_blank() {
                break;
            }
            self.next_line();
            count += 1;
        }
        count
    }

    /// Skip blank and comment lines.
    #[inline]
    pub fn skip_trivia(&mut self) {
        while let Some(line) = self.peek_line() {
            if !line.is_trivia() {
                break;
            }
            self.next_line();
        }
    }

    /// Peek at the next line that is neither blank nor a comment.
    #[inline]
    pub fn peek_content(&mut self) -> Option<&Line<'a>> {
        self.skip_trivia();
        self.peek_line()
    }

    #[inline(always)]
    fn read_line(&mut self) -> Option<Line<'a>> {
        if self.offset >= self.bytes.len() {
            return None;
        }

        let start = self.offset;
        let end = match memchr(b'\n', &self.bytes[start..]) {
            Some(pos) => start + pos,
            None => self.bytes.len(),
        };
        self.offset = if end < self.bytes.len() { end + 1 } else { end };

        // `\n` is ASCII, so both ends are char boundaries. Trimming drops any
        // `\r` from CRLF input along with the other trailing whitespace.
        let text = self.input[start..end].trim_end();
        let indent = text
            .bytes()
            .take_while(|&b| b == b' ' || b == b'\t')
            .count();

        let number = self.line;
        self.line += 1;

        Some(Line {
            text,
            span: Span::new(start as u32, (start + text.len()) as u32, number),
            indent,
        })
    }

    /// The unconsumed input, including any peeked line.
    #[inline]
    pub fn remaining(&self) -> &'a str {
        match &self.peeked {
            Some(line) => &self.input[line.span.start as usize..],
            None => &self.input[self.offset..],
        }
    }
}
