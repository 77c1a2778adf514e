//! Statement parsing.
//!
//! ```text
//! stmt = "age" "(" expr ")" "bood" block ("vagarna" (block | if_stmt))?
//!      | "ta" "(" expr ")" "bood" block
//!      | "bede" expr? ";"
//!      | "beshkan" ";" | "edame" ";" | "debugger" ";"
//!      | block
//!      | IDENT "=" expr ";"
//!      | expr ";"
//! ```
//!
//! Statement sections never include the trailing `;`.

use crate::ast::{Block, Ident, NodeTags, Stmt, StmtKind};
use crate::lexer::TokenKind;
use crate::stack::ensure_sufficient_stack;

use super::super::{ParseError, Parser};

impl Parser<'_> {
    pub(crate) fn statement(&mut self) -> Result<Stmt, ParseError> {
        ensure_sufficient_stack(|| self.statement_inner())
    }

    fn statement_inner(&mut self) -> Result<Stmt, ParseError> {
        match self.cursor.current() {
            TokenKind::KwAge => self.if_statement(),
            TokenKind::KwTa => self.while_statement(),
            TokenKind::KwBede => self.return_statement(),
            TokenKind::KwBeshkan => self.keyword_statement(StmtKind::Break),
            TokenKind::KwEdame => self.keyword_statement(StmtKind::Continue),
            TokenKind::KwDebugger => self.keyword_statement(StmtKind::Debugger),
            TokenKind::LBrace => {
                let block = self.nested_block()?;
                Ok(Stmt {
                    section: block.section.clone(),
                    kind: StmtKind::Block(block),
                    tags: NodeTags::empty(),
                })
            }
            TokenKind::Ident if self.cursor.peek_kind_n(1) == TokenKind::Assign => {
                self.assignment()
            }
            _ => self.expression_statement(),
        }
    }

    fn if_statement(&mut self) -> Result<Stmt, ParseError> {
        let start = self.cursor.current_range().start();
        self.expect(TokenKind::KwAge)?;
        let condition = self.condition()?;
        self.expect(TokenKind::KwBood)?;
        let then_block = self.nested_block()?;

        let else_block = if self.cursor.eat(TokenKind::KwVagarna) {
            if self.cursor.at(TokenKind::KwAge) {
                // `vagarna age` chains: the nested `if` gets a block of its own.
                let scope = self.open_scope();
                let nested = self.if_statement();
                self.scope_stack.pop();
                let nested = nested?;
                Some(Block {
                    scope,
                    section: nested.section.clone(),
                    stmts: vec![nested],
                })
            } else {
                Some(self.nested_block()?)
            }
        } else {
            None
        };

        Ok(Stmt {
            kind: StmtKind::If {
                condition,
                then_block,
                else_block,
            },
            section: self.section_from(start),
            tags: NodeTags::empty(),
        })
    }

    fn while_statement(&mut self) -> Result<Stmt, ParseError> {
        let start = self.cursor.current_range().start();
        self.expect(TokenKind::KwTa)?;
        let condition = self.condition()?;
        self.expect(TokenKind::KwBood)?;
        let body = self.nested_block()?;
        Ok(Stmt {
            kind: StmtKind::While { condition, body },
            section: self.section_from(start),
            tags: NodeTags::empty(),
        })
    }

    /// Parenthesized condition; the condition is the suspension point of its `if`/`while`.
    fn condition(&mut self) -> Result<crate::ast::Expr, ParseError> {
        self.expect(TokenKind::LParen)?;
        let mut condition = self.expression()?;
        self.expect(TokenKind::RParen)?;
        condition.tags |= NodeTags::STATEMENT;
        Ok(condition)
    }

    fn return_statement(&mut self) -> Result<Stmt, ParseError> {
        let start = self.cursor.current_range().start();
        self.expect(TokenKind::KwBede)?;
        let value = if self.cursor.at(TokenKind::Semicolon) {
            None
        } else {
            Some(self.expression()?)
        };
        let section = self.section_from(start);
        self.expect(TokenKind::Semicolon)?;
        Ok(Stmt {
            kind: StmtKind::Return(value),
            section,
            tags: NodeTags::STATEMENT,
        })
    }

    fn keyword_statement(&mut self, kind: StmtKind) -> Result<Stmt, ParseError> {
        let start = self.cursor.current_range().start();
        let tags = if matches!(kind, StmtKind::Debugger) {
            NodeTags::STATEMENT | NodeTags::HALT
        } else {
            NodeTags::STATEMENT
        };
        self.cursor.bump();
        let section = self.section_from(start);
        self.expect(TokenKind::Semicolon)?;
        Ok(Stmt {
            kind,
            section,
            tags,
        })
    }

    fn assignment(&mut self) -> Result<Stmt, ParseError> {
        let start = self.cursor.current_range().start();
        let target = Ident::new(self.expect_ident()?);
        self.expect(TokenKind::Assign)?;
        let value = self.expression()?;
        let section = self.section_from(start);
        self.expect(TokenKind::Semicolon)?;
        Ok(Stmt {
            kind: StmtKind::Assign { target, value },
            section,
            tags: NodeTags::STATEMENT,
        })
    }

    fn expression_statement(&mut self) -> Result<Stmt, ParseError> {
        let mut expr = self.expression()?;
        self.expect(TokenKind::Semicolon)?;
        expr.tags |= NodeTags::STATEMENT;
        Ok(Stmt {
            section: expr.section.clone(),
            kind: StmtKind::Expr(expr),
            tags: NodeTags::empty(),
        })
    }
}
