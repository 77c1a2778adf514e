//! Grammar rules.
//!
//! ```text
//! program   = function* EOF
//! function  = "bebin" IDENT "(" (IDENT ("," IDENT)*)? ")" block
//! block     = "{" stmt* "}"
//! ```
//!
//! Statements live in `statements.rs`, expressions in `expressions.rs`.

mod expressions;
mod statements;

use smol_str::SmolStr;
use text_size::{TextRange, TextSize};

use crate::ast::{Block, FunctionDecl, Ident, NodeTags};
use crate::lexer::TokenKind;
use crate::scope::{ScopeId, ScopeTree};
use crate::source::SourceSection;

use super::{ParseError, Parser};

impl Parser<'_> {
    pub(crate) fn program(&mut self) -> Result<Vec<FunctionDecl>, ParseError> {
        let mut functions: Vec<FunctionDecl> = Vec::new();
        while !self.cursor.at_end() {
            if !self.cursor.at(TokenKind::KwBebin) {
                return Err(self.unexpected("'bebin'"));
            }
            let name_range = self.cursor.current_range();
            let function = self.function()?;
            if functions.iter().any(|existing| existing.name == function.name) {
                return Err(self.error_at(
                    name_range,
                    format!("function '{}' is declared twice", function.name),
                ));
            }
            functions.push(function);
        }
        Ok(functions)
    }

    fn function(&mut self) -> Result<FunctionDecl, ParseError> {
        self.expect(TokenKind::KwBebin)?;
        let start = self.cursor.current_range().start();
        let name = self.expect_ident()?;

        self.scopes = ScopeTree::new();
        self.scope_stack.clear();
        self.scope_stack.push(ScopeId::ROOT);

        self.expect(TokenKind::LParen)?;
        let mut params = Vec::new();
        if !self.cursor.at(TokenKind::RParen) {
            loop {
                let range = self.cursor.current_range();
                let param = self.expect_ident()?;
                if self.scopes.lookup(ScopeId::ROOT, &param).is_some() {
                    return Err(
                        self.error_at(range, format!("duplicate parameter '{param}'"))
                    );
                }
                self.scopes.declare(ScopeId::ROOT, &param);
                params.push(Ident::new(param));
                if !self.cursor.eat(TokenKind::Comma) {
                    break;
                }
            }
        }
        self.expect(TokenKind::RParen)?;

        let body = self.block(ScopeId::ROOT)?;
        self.scope_stack.pop();

        let mut function = FunctionDecl {
            name,
            params,
            body,
            scopes: std::mem::take(&mut self.scopes),
            section: self.section_from(start),
            tags: NodeTags::ROOT,
        };
        crate::resolve::resolve_function(&mut function);
        Ok(function)
    }

    /// Parses a braced block whose declarations land in `scope`.
    pub(crate) fn block(&mut self, scope: ScopeId) -> Result<Block, ParseError> {
        let start = self.cursor.current_range().start();
        self.expect(TokenKind::LBrace)?;
        let mut stmts = Vec::new();
        while !self.cursor.at(TokenKind::RBrace) {
            if self.cursor.at_end() {
                return Err(self.unexpected("'}'"));
            }
            stmts.push(self.statement()?);
        }
        self.expect(TokenKind::RBrace)?;
        Ok(Block {
            scope,
            stmts,
            section: self.section_from(start),
        })
    }

    /// Parses a block in a fresh child of the current scope.
    pub(crate) fn nested_block(&mut self) -> Result<Block, ParseError> {
        let scope = self.open_scope();
        let block = self.block(scope);
        self.scope_stack.pop();
        block
    }

    pub(crate) fn open_scope(&mut self) -> ScopeId {
        let scope = self.scopes.push_child(self.current_scope());
        self.scope_stack.push(scope);
        scope
    }

    pub(crate) fn current_scope(&self) -> ScopeId {
        self.scope_stack.last().copied().unwrap_or(ScopeId::ROOT)
    }

    pub(crate) fn expect(&mut self, kind: TokenKind) -> Result<(), ParseError> {
        if self.cursor.eat(kind) {
            Ok(())
        } else {
            Err(self.unexpected(kind.describe()))
        }
    }

    pub(crate) fn expect_ident(&mut self) -> Result<SmolStr, ParseError> {
        if self.cursor.at(TokenKind::Ident) {
            let name = SmolStr::new(self.cursor.current_text());
            self.cursor.bump();
            Ok(name)
        } else {
            Err(self.unexpected("identifier"))
        }
    }

    /// Section from `start` to the end of the last consumed token.
    pub(crate) fn section_from(&self, start: TextSize) -> SourceSection {
        let end = self.cursor.last_end().max(start);
        self.source.section(TextRange::new(start, end))
    }
}
