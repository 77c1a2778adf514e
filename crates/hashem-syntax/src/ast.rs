//! Abstract syntax tree.
//!
//! Node kinds are closed enums. The instrumentation categories a node
//! belongs to are carried separately as [`NodeTags`] and fixed by the
//! parser.

use std::fmt;

use bitflags::bitflags;
use smol_str::SmolStr;

use crate::scope::{ScopeId, ScopeTree, SlotId};
use crate::source::{Source, SourceSection};

bitflags! {
    /// Instrumentation categories of a node.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct NodeTags: u8 {
        /// Function body.
        const ROOT = 1 << 0;
        /// Suspension point for the debugger.
        const STATEMENT = 1 << 1;
        /// Produces a value.
        const EXPRESSION = 1 << 2;
        /// Call site; the debugger stops after it when stepping returns.
        const CALL = 1 << 3;
        /// Explicit `debugger` marker.
        const HALT = 1 << 4;
    }
}

/// Resolution of an identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Binding {
    /// Not yet processed by the resolver.
    Unresolved,
    /// Frame slot of a local or parameter.
    Local(SlotId),
    /// Global function lookup by name.
    Global,
}

/// Identifier occurrence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ident {
    pub name: SmolStr,
    pub binding: Binding,
}

impl Ident {
    pub fn new(name: impl Into<SmolStr>) -> Self {
        Self {
            name: name.into(),
            binding: Binding::Unresolved,
        }
    }
}

/// Literal constant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Literal {
    Int(i64),
    Bool(bool),
    Str(SmolStr),
}

/// Binary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl BinaryOp {
    #[must_use]
    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Mod => "%",
            BinaryOp::Eq => "==",
            BinaryOp::Ne => "!=",
            BinaryOp::Lt => "<",
            BinaryOp::Le => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::Ge => ">=",
        }
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Short-circuit operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicalOp {
    And,
    Or,
}

impl LogicalOp {
    #[must_use]
    pub fn symbol(self) -> &'static str {
        match self {
            LogicalOp::And => "&&",
            LogicalOp::Or => "||",
        }
    }
}

/// Unary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Neg,
    Not,
}

impl UnaryOp {
    #[must_use]
    pub fn symbol(self) -> &'static str {
        match self {
            UnaryOp::Neg => "-",
            UnaryOp::Not => "!",
        }
    }
}

/// Expression node.
#[derive(Debug, Clone)]
pub struct Expr {
    pub kind: ExprKind,
    pub section: SourceSection,
    pub tags: NodeTags,
}

#[derive(Debug, Clone)]
pub enum ExprKind {
    Literal(Literal),
    Read(Ident),
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Logical {
        op: LogicalOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    Call {
        callee: Box<Expr>,
        args: Vec<Expr>,
    },
    Member {
        receiver: Box<Expr>,
        name: SmolStr,
    },
}

/// Statement node.
#[derive(Debug, Clone)]
pub struct Stmt {
    pub kind: StmtKind,
    pub section: SourceSection,
    pub tags: NodeTags,
}

#[derive(Debug, Clone)]
pub enum StmtKind {
    /// Expression evaluated for effect; the expression itself carries the statement tag.
    Expr(Expr),
    Assign {
        target: Ident,
        value: Expr,
    },
    /// The condition carries the statement tag, the `if` itself is transparent.
    If {
        condition: Expr,
        then_block: Block,
        else_block: Option<Block>,
    },
    While {
        condition: Expr,
        body: Block,
    },
    Return(Option<Expr>),
    Break,
    Continue,
    Debugger,
    Block(Block),
}

/// Braced statement list with its own scope.
#[derive(Debug, Clone)]
pub struct Block {
    pub scope: ScopeId,
    pub stmts: Vec<Stmt>,
    pub section: SourceSection,
}

/// Function declaration; its body is the root node of every invocation.
#[derive(Debug, Clone)]
pub struct FunctionDecl {
    pub name: SmolStr,
    pub params: Vec<Ident>,
    pub body: Block,
    pub scopes: ScopeTree,
    /// Covers the function name through the closing brace.
    pub section: SourceSection,
    pub tags: NodeTags,
}

impl FunctionDecl {
    #[must_use]
    pub fn slot_count(&self) -> usize {
        self.scopes.slot_count()
    }
}

/// All function declarations parsed from one source.
#[derive(Debug, Clone)]
pub struct Program {
    pub source: Source,
    pub functions: Vec<FunctionDecl>,
}

impl Program {
    /// Sections of every statement-tagged node, in source order.
    #[must_use]
    pub fn statement_sections(&self) -> Vec<SourceSection> {
        let mut sections = Vec::new();
        for function in &self.functions {
            collect_block(&function.body, &mut sections);
        }
        sections.sort_by_key(SourceSection::start_offset);
        sections
    }
}

fn collect_block(block: &Block, out: &mut Vec<SourceSection>) {
    for stmt in &block.stmts {
        collect_stmt(stmt, out);
    }
}

fn collect_stmt(stmt: &Stmt, out: &mut Vec<SourceSection>) {
    crate::stack::ensure_sufficient_stack(|| collect_stmt_inner(stmt, out));
}

fn collect_stmt_inner(stmt: &Stmt, out: &mut Vec<SourceSection>) {
    if stmt.tags.contains(NodeTags::STATEMENT) {
        out.push(stmt.section.clone());
    }
    match &stmt.kind {
        StmtKind::Expr(expr) => collect_expr_statement(expr, out),
        StmtKind::If {
            condition,
            then_block,
            else_block,
        } => {
            collect_expr_statement(condition, out);
            collect_block(then_block, out);
            if let Some(block) = else_block {
                collect_block(block, out);
            }
        }
        StmtKind::While { condition, body } => {
            collect_expr_statement(condition, out);
            collect_block(body, out);
        }
        StmtKind::Block(block) => collect_block(block, out),
        StmtKind::Assign { .. }
        | StmtKind::Return(_)
        | StmtKind::Break
        | StmtKind::Continue
        | StmtKind::Debugger => {}
    }
}

fn collect_expr_statement(expr: &Expr, out: &mut Vec<SourceSection>) {
    if expr.tags.contains(NodeTags::STATEMENT) {
        out.push(expr.section.clone());
    }
}
