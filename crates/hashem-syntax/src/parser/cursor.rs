//! Token cursor for the parser.
//!
//! Wraps the lexed token stream, skips trivia and provides lookahead and
//! consumption operations.

use text_size::{TextRange, TextSize};

use crate::lexer::{Token, TokenKind};

pub(crate) struct Cursor<'src> {
    tokens: Vec<Token>,
    text: &'src str,
    pos: usize,
    last_end: TextSize,
}

impl<'src> Cursor<'src> {
    pub(crate) fn new(tokens: &[Token], text: &'src str) -> Self {
        Self {
            tokens: tokens
                .iter()
                .copied()
                .filter(|token| !token.kind.is_trivia())
                .collect(),
            text,
            pos: 0,
            last_end: TextSize::from(0),
        }
    }

    /// Returns the current token kind, or `Eof` if at end.
    pub(crate) fn current(&self) -> TokenKind {
        self.peek_kind_n(0)
    }

    /// Peeks at the nth token ahead (0 = current).
    pub(crate) fn peek_kind_n(&self, n: usize) -> TokenKind {
        self.tokens
            .get(self.pos + n)
            .map_or(TokenKind::Eof, |token| token.kind)
    }

    /// Range of the current token; an empty range at the end of input.
    pub(crate) fn current_range(&self) -> TextRange {
        self.tokens.get(self.pos).map_or_else(
            || TextRange::empty(TextSize::of(self.text)),
            |token| token.range,
        )
    }

    /// Text of the current token.
    pub(crate) fn current_text(&self) -> &'src str {
        self.tokens
            .get(self.pos)
            .map_or("", |token| &self.text[token.range])
    }

    /// End offset of the most recently consumed token.
    pub(crate) fn last_end(&self) -> TextSize {
        self.last_end
    }

    pub(crate) fn at(&self, kind: TokenKind) -> bool {
        self.current() == kind
    }

    /// Advances past the current token.
    pub(crate) fn bump(&mut self) {
        if let Some(token) = self.tokens.get(self.pos) {
            self.last_end = token.range.end();
            self.pos += 1;
        }
    }

    /// Consumes the current token if it has the given kind.
    pub(crate) fn eat(&mut self, kind: TokenKind) -> bool {
        if self.at(kind) {
            self.bump();
            true
        } else {
            false
        }
    }

    /// Returns `true` if at end of input.
    pub(crate) fn at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }
}
