//! Shared helpers for parser tests.
#![allow(dead_code)]

use hashem_syntax::ast::{Block, Expr, ExprKind, FunctionDecl, Stmt, StmtKind};
pub use hashem_syntax::{parse, NodeTags, Program, Source};

pub fn source(text: &str) -> Source {
    Source::new("hashemi", text, "test.hashem")
}

pub fn parse_ok(text: &str) -> Program {
    match parse(&source(text)) {
        Ok(program) => program,
        Err(err) => panic!("unexpected parse error: {err}"),
    }
}

/// Formats every node with its tags and exact source text.
pub fn dump(text: &str) -> String {
    let program = parse_ok(text);
    let mut out = String::new();
    for function in &program.functions {
        dump_function(function, &mut out);
    }
    out
}

fn dump_function(function: &FunctionDecl, out: &mut String) {
    out.push_str(&format!(
        "{} {} {}..{}\n",
        function.name,
        tags(function.tags),
        function.section.start_line(),
        function.section.end_line()
    ));
    dump_block(&function.body, out, 1);
}

fn dump_block(block: &Block, out: &mut String, depth: usize) {
    for stmt in &block.stmts {
        dump_stmt(stmt, out, depth);
    }
}

fn dump_stmt(stmt: &Stmt, out: &mut String, depth: usize) {
    let kind = match &stmt.kind {
        StmtKind::Expr(_) => "Expr",
        StmtKind::Assign { .. } => "Assign",
        StmtKind::If { .. } => "If",
        StmtKind::While { .. } => "While",
        StmtKind::Return(_) => "Return",
        StmtKind::Break => "Break",
        StmtKind::Continue => "Continue",
        StmtKind::Debugger => "Debugger",
        StmtKind::Block(_) => "Block",
    };
    line(out, depth, kind, stmt.tags, stmt.section.characters());
    match &stmt.kind {
        StmtKind::Expr(expr) | StmtKind::Assign { value: expr, .. } => {
            dump_expr(expr, out, depth + 1);
        }
        StmtKind::Return(value) => {
            if let Some(expr) = value {
                dump_expr(expr, out, depth + 1);
            }
        }
        StmtKind::If {
            condition,
            then_block,
            else_block,
        } => {
            dump_expr(condition, out, depth + 1);
            dump_block(then_block, out, depth + 1);
            if let Some(block) = else_block {
                dump_block(block, out, depth + 1);
            }
        }
        StmtKind::While { condition, body } => {
            dump_expr(condition, out, depth + 1);
            dump_block(body, out, depth + 1);
        }
        StmtKind::Block(block) => dump_block(block, out, depth + 1),
        StmtKind::Break | StmtKind::Continue | StmtKind::Debugger => {}
    }
}

fn dump_expr(expr: &Expr, out: &mut String, depth: usize) {
    let kind = match &expr.kind {
        ExprKind::Literal(_) => "Literal",
        ExprKind::Read(_) => "Read",
        ExprKind::Binary { .. } => "Binary",
        ExprKind::Logical { .. } => "Logical",
        ExprKind::Unary { .. } => "Unary",
        ExprKind::Call { .. } => "Call",
        ExprKind::Member { .. } => "Member",
    };
    line(out, depth, kind, expr.tags, expr.section.characters());
    match &expr.kind {
        ExprKind::Literal(_) | ExprKind::Read(_) => {}
        ExprKind::Binary { left, right, .. } | ExprKind::Logical { left, right, .. } => {
            dump_expr(left, out, depth + 1);
            dump_expr(right, out, depth + 1);
        }
        ExprKind::Unary { operand, .. } => dump_expr(operand, out, depth + 1),
        ExprKind::Call { callee, args } => {
            dump_expr(callee, out, depth + 1);
            for arg in args {
                dump_expr(arg, out, depth + 1);
            }
        }
        ExprKind::Member { receiver, .. } => dump_expr(receiver, out, depth + 1),
    }
}

fn line(out: &mut String, depth: usize, kind: &str, node_tags: NodeTags, text: &str) {
    out.push_str(&format!(
        "{}{kind} {} {text:?}\n",
        "  ".repeat(depth),
        tags(node_tags)
    ));
}

fn tags(tags: NodeTags) -> String {
    if tags.is_empty() {
        return "-".to_string();
    }
    tags.iter_names()
        .map(|(name, _)| name)
        .collect::<Vec<_>>()
        .join("|")
}
