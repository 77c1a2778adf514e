//! Expression parsing using Pratt parsing.
//!
//! Operator precedence (low to high):
//! - `||` (1-2)
//! - `&&` (3-4)
//! - `==`, `!=`, `<`, `<=`, `>`, `>=` (5-6)
//! - `+`, `-` (7-8)
//! - `*`, `/`, `%` (9-10)
//! - unary `-`, `!` (11)
//! - calls and member reads

use smol_str::SmolStr;
use text_size::TextSize;

use crate::ast::{BinaryOp, Expr, ExprKind, Ident, Literal, LogicalOp, NodeTags, UnaryOp};
use crate::lexer::TokenKind;
use crate::stack::ensure_sufficient_stack;

use super::super::{ParseError, Parser};

impl Parser<'_> {
    pub(crate) fn expression(&mut self) -> Result<Expr, ParseError> {
        self.expr_bp(0)
    }

    fn expr_bp(&mut self, min_bp: u8) -> Result<Expr, ParseError> {
        ensure_sufficient_stack(|| self.expr_bp_inner(min_bp))
    }

    fn expr_bp_inner(&mut self, min_bp: u8) -> Result<Expr, ParseError> {
        let start = self.cursor.current_range().start();
        let current = self.cursor.current();
        let mut lhs = if let Some(bp) = current.prefix_binding_power() {
            self.cursor.bump();
            let operand = self.expr_bp(bp)?;
            let op = if current == TokenKind::Bang {
                UnaryOp::Not
            } else {
                UnaryOp::Neg
            };
            self.expr(
                ExprKind::Unary {
                    op,
                    operand: Box::new(operand),
                },
                start,
            )
        } else {
            self.postfix(start)?
        };

        loop {
            let op = self.cursor.current();
            let Some((l_bp, r_bp)) = op.infix_binding_power() else {
                break;
            };
            if l_bp < min_bp {
                break;
            }
            self.cursor.bump();
            let rhs = self.expr_bp(r_bp)?;
            let (left, right) = (Box::new(lhs), Box::new(rhs));
            let kind = match op {
                TokenKind::OrOr => ExprKind::Logical {
                    op: LogicalOp::Or,
                    left,
                    right,
                },
                TokenKind::AndAnd => ExprKind::Logical {
                    op: LogicalOp::And,
                    left,
                    right,
                },
                _ => ExprKind::Binary {
                    op: binary_op(op),
                    left,
                    right,
                },
            };
            lhs = self.expr(kind, start);
        }

        Ok(lhs)
    }

    /// Primary expression followed by any number of calls and member reads.
    fn postfix(&mut self, start: TextSize) -> Result<Expr, ParseError> {
        let mut expr = self.primary()?;
        loop {
            match self.cursor.current() {
                TokenKind::LParen => {
                    self.cursor.bump();
                    let mut args = Vec::new();
                    if !self.cursor.at(TokenKind::RParen) {
                        loop {
                            args.push(self.expression()?);
                            if !self.cursor.eat(TokenKind::Comma) {
                                break;
                            }
                        }
                    }
                    self.expect(TokenKind::RParen)?;
                    let mut call = self.expr(
                        ExprKind::Call {
                            callee: Box::new(expr),
                            args,
                        },
                        start,
                    );
                    call.tags |= NodeTags::CALL;
                    expr = call;
                }
                TokenKind::Dot => {
                    self.cursor.bump();
                    let name = self.expect_ident()?;
                    expr = self.expr(
                        ExprKind::Member {
                            receiver: Box::new(expr),
                            name,
                        },
                        start,
                    );
                }
                _ => return Ok(expr),
            }
        }
    }

    fn primary(&mut self) -> Result<Expr, ParseError> {
        let start = self.cursor.current_range().start();
        let kind = match self.cursor.current() {
            TokenKind::IntLiteral => {
                let value = self.int_literal()?;
                ExprKind::Literal(Literal::Int(value))
            }
            TokenKind::StringLiteral => {
                let text = self.cursor.current_text();
                let value = SmolStr::new(&text[1..text.len() - 1]);
                self.cursor.bump();
                ExprKind::Literal(Literal::Str(value))
            }
            TokenKind::KwTrue | TokenKind::KwFalse => {
                let value = self.cursor.at(TokenKind::KwTrue);
                self.cursor.bump();
                ExprKind::Literal(Literal::Bool(value))
            }
            TokenKind::Ident => ExprKind::Read(Ident::new(self.expect_ident()?)),
            TokenKind::LParen => {
                self.cursor.bump();
                let inner = self.expression()?;
                self.expect(TokenKind::RParen)?;
                return Ok(inner);
            }
            _ => return Err(self.unexpected("expression")),
        };
        Ok(self.expr(kind, start))
    }

    fn int_literal(&mut self) -> Result<i64, ParseError> {
        let range = self.cursor.current_range();
        let digits: String = self
            .cursor
            .current_text()
            .chars()
            .filter(|ch| *ch != '_')
            .collect();
        self.cursor.bump();
        digits
            .parse::<i64>()
            .map_err(|_| self.error_at(range, "integer literal out of range"))
    }

    fn expr(&self, kind: ExprKind, start: TextSize) -> Expr {
        Expr {
            kind,
            section: self.section_from(start),
            tags: NodeTags::EXPRESSION,
        }
    }
}

fn binary_op(kind: TokenKind) -> BinaryOp {
    match kind {
        TokenKind::Plus => BinaryOp::Add,
        TokenKind::Minus => BinaryOp::Sub,
        TokenKind::Star => BinaryOp::Mul,
        TokenKind::Slash => BinaryOp::Div,
        TokenKind::Percent => BinaryOp::Mod,
        TokenKind::EqEq => BinaryOp::Eq,
        TokenKind::NotEq => BinaryOp::Ne,
        TokenKind::Lt => BinaryOp::Lt,
        TokenKind::LtEq => BinaryOp::Le,
        TokenKind::Gt => BinaryOp::Gt,
        TokenKind::GtEq => BinaryOp::Ge,
        other => unreachable!("{other:?} has no infix binding power"),
    }
}
