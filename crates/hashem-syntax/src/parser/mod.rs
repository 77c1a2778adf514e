//! Parser for Hashem.
//!
//! A hand-written recursive descent parser that turns a [`Source`] into a
//! [`Program`] of function declarations. Parsing stops at the first error;
//! a program with a syntax error is never executed.
//!
//! After a function is parsed, [`crate::resolve`] binds every identifier
//! to a frame slot or to a global function lookup.

mod cursor;
mod grammar;

use smol_str::SmolStr;
use text_size::TextRange;
use thiserror::Error;

use crate::ast::Program;
use crate::lexer::lex;
use crate::scope::{ScopeId, ScopeTree};
use crate::source::Source;

use cursor::Cursor;

/// Syntax error reported before execution begins.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{source_name}:{line}:{column}: {message}")]
pub struct ParseError {
    pub message: String,
    pub source_name: SmolStr,
    pub range: TextRange,
    /// 1-based.
    pub line: u32,
    /// 1-based, in bytes.
    pub column: u32,
}

/// Parse all function declarations in `source`.
pub fn parse(source: &Source) -> Result<Program, ParseError> {
    let tokens = lex(source.text());
    let mut parser = Parser::new(source, Cursor::new(&tokens, source.text()));
    let functions = parser.program()?;
    Ok(Program {
        source: source.clone(),
        functions,
    })
}

pub(crate) struct Parser<'src> {
    source: &'src Source,
    cursor: Cursor<'src>,
    scopes: ScopeTree,
    scope_stack: Vec<ScopeId>,
}

impl<'src> Parser<'src> {
    fn new(source: &'src Source, cursor: Cursor<'src>) -> Self {
        Self {
            source,
            cursor,
            scopes: ScopeTree::new(),
            scope_stack: Vec::new(),
        }
    }

    pub(crate) fn error_at(&self, range: TextRange, message: impl Into<String>) -> ParseError {
        let (line, column) = self.source.line_col(range.start());
        ParseError {
            message: message.into(),
            source_name: SmolStr::new(self.source.name()),
            range,
            line,
            column,
        }
    }

    pub(crate) fn unexpected(&self, expected: &str) -> ParseError {
        let found = self.cursor.current();
        let message = if found == crate::lexer::TokenKind::Error {
            format!(
                "invalid character {:?}, expected {expected}",
                self.cursor.current_text()
            )
        } else {
            format!("expected {expected}, found {}", found.describe())
        };
        self.error_at(self.cursor.current_range(), message)
    }
}
